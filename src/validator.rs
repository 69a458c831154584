use chrono::{NaiveDateTime, Timelike};
use regex::{Captures, Regex};
use std::sync::OnceLock;
use tracing::info;

/// Meeting start dates are always `MM/dd/yyyy HH:mm:ss`.
pub const MEETING_DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Meeting passwords must be longer than this.
pub const MIN_PASSWORD_LENGTH: usize = 4;

/// Meeting passwords can be at most this long.
pub const MAX_PASSWORD_LENGTH: usize = 256;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9_!#$%&'*+/=?`{|}~^-]+(?:\.[a-zA-Z0-9_!#$%&'*+/=?`{|}~^-]+)*@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$";

static EMAIL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
static MARKUP_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
static ENTITY_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

fn email_regex() -> Option<&'static Regex> {
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

fn markup_regex() -> Option<&'static Regex> {
    MARKUP_REGEX
        .get_or_init(|| Regex::new(r"<[^>]*>").ok())
        .as_ref()
}

fn entity_regex() -> Option<&'static Regex> {
    ENTITY_REGEX
        .get_or_init(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|lt|gt|amp|quot|apos);").ok())
        .as_ref()
}

/// Syntactic email check. Anything that does not match the pattern is invalid.
pub fn is_valid_email_address(address: &str) -> bool {
    match email_regex() {
        Some(re) => re.is_match(address),
        None => false,
    }
}

/// Strict date check: the whole string must parse and name a real calendar
/// date and time. `None` is invalid.
pub fn is_valid_date(input: Option<&str>, format: &str) -> bool {
    let Some(input) = input else {
        return false;
    };

    if let Some(reason) = loose_date_input(input, format) {
        info!("Input date '{}' is invalid for format '{}': {}", input, format, reason);
        return false;
    }

    match NaiveDateTime::parse_from_str(input, format) {
        // chrono reads a seconds value of 60 as a leap second
        Ok(parsed) if parsed.nanosecond() >= 1_000_000_000 => {
            info!("Input date '{}' has no such second", input);
            false
        }
        Ok(_) => true,
        Err(e) => {
            info!(
                "Input date '{}' is invalid for format '{}': {}",
                input, format, e
            );
            false
        }
    }
}

// chrono skips whitespace before numeric fields and accepts signed years.
// Only the whitespace and signs spelled out in the format are allowed.
fn loose_date_input(input: &str, format: &str) -> Option<&'static str> {
    let whitespace_in = |text: &str| text.chars().filter(|c| c.is_whitespace()).count();

    if whitespace_in(input) != whitespace_in(format)
        || input.starts_with(char::is_whitespace)
        || input.ends_with(char::is_whitespace)
        || input.contains("  ")
        || input.chars().any(|c| c.is_whitespace() && c != ' ')
    {
        return Some("unexpected whitespace");
    }

    let signs_in = |text: &str| text.chars().filter(|c| *c == '+' || *c == '-').count();
    if signs_in(input) != signs_in(format) {
        return Some("unexpected sign");
    }

    None
}

/// Password policy: `min_length < len <= max_length`. Note the lower bound is
/// exclusive, so a password of exactly `min_length` characters is rejected.
pub fn is_valid_password(password: Option<&str>, min_length: usize, max_length: usize) -> bool {
    match password {
        Some(pw) => {
            let length = pw.chars().count();
            length > min_length && length <= max_length
        }
        None => false,
    }
}

/// Decode the basic named entities and numeric character references.
/// References that do not name a valid character are left as they are.
fn decode_entities(text: &str) -> String {
    let Some(re) = entity_regex() else {
        return text.to_string();
    };

    re.replace_all(text, |caps: &Captures<'_>| {
        let reference = &caps[1];
        let decoded = match reference {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => {
                let code = match reference.strip_prefix("#x").or_else(|| reference.strip_prefix("#X")) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => reference[1..].parse::<u32>().ok(),
                };
                code.and_then(char::from_u32)
            }
        };
        match decoded {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    })
    .into_owned()
}

/// Strip NUL characters and markup tags from free text. Entities are decoded
/// first, so encoded tags are stripped too.
pub fn sanitize_markup(text: &str) -> String {
    let without_nul: String = decode_entities(text).chars().filter(|c| *c != '\0').collect();
    match markup_regex() {
        Some(re) => re.replace_all(&without_nul, "").trim().to_string(),
        None => without_nul,
    }
}
