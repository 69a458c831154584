//! Service configuration.
//!
//! `WebExConfig` holds the service account every XML request is signed with.
//! It is built once at startup from environment variables (optionally pointing
//! at a `.properties` file) and shared read-only behind an `Arc`. The host
//! password is redacted in Debug output.

use dotenv::dotenv;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::validator::sanitize_markup;

/// Default WebEx vendor domain.
pub const DEFAULT_VENDOR_DOMAIN: &str = "webex.com";

/// Default path of the WebEx XML API on a site.
pub const DEFAULT_API_PATH: &str = "WBXService/XMLService";

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration value: {0}")]
    MissingValue(String),

    #[error("Failed to read config file {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// WebEx site and service account credentials.
#[derive(Clone)]
pub struct WebExConfig {
    /// Site name, the first label of the site host (`{site}.webex.com`).
    pub site_name: String,

    /// WebEx ID of the service account that hosts every meeting.
    pub host_account: String,

    /// Password of the service account.
    pub host_password: String,

    /// Vendor domain (default: "webex.com").
    pub vendor_domain: String,

    /// XML API path on the site (default: "WBXService/XMLService").
    pub api_path: String,

    /// Full endpoint URL, bypassing the site/domain/path composition.
    pub endpoint_override: Option<String>,
}

impl fmt::Debug for WebExConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebExConfig")
            .field("site_name", &self.site_name)
            .field("host_account", &self.host_account)
            .field("host_password", &"[REDACTED]")
            .field("vendor_domain", &self.vendor_domain)
            .field("api_path", &self.api_path)
            .field("endpoint_override", &self.endpoint_override)
            .finish()
    }
}

impl WebExConfig {
    /// Build a config for the given site and account with default domain and path.
    pub fn new(site_name: &str, host_account: &str, host_password: &str) -> Self {
        Self {
            site_name: sanitize_markup(site_name),
            host_account: sanitize_markup(host_account),
            host_password: host_password.to_string(),
            vendor_domain: DEFAULT_VENDOR_DOMAIN.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            endpoint_override: None,
        }
    }

    /// Load configuration from the environment, reading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a map of variables (for testing).
    ///
    /// Credentials come from `WEBEX_SITE_NAME`, `WEBEX_HOST_ACCOUNT` and
    /// `WEBEX_HOST_PASSWORD`. When `WEBEX_CONFIG_FILE` is set, the file's
    /// `siteName`, `hostAccount` and `hostPassword` entries are used for any
    /// credential the environment does not set.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let file_values = match vars.get("WEBEX_CONFIG_FILE") {
            Some(path) => read_properties_file(Path::new(path))?,
            None => HashMap::new(),
        };

        let lookup = |env_key: &str, file_key: &str| -> Result<String, ConfigError> {
            vars.get(env_key)
                .or_else(|| file_values.get(file_key))
                .filter(|value| !value.trim().is_empty())
                .cloned()
                .ok_or_else(|| ConfigError::MissingValue(env_key.to_string()))
        };

        let site_name = lookup("WEBEX_SITE_NAME", "siteName")?;
        let host_account = lookup("WEBEX_HOST_ACCOUNT", "hostAccount")?;
        let host_password = lookup("WEBEX_HOST_PASSWORD", "hostPassword")?;

        let mut config = Self::new(&site_name, &host_account, &host_password);

        if config.site_name.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "WEBEX_SITE_NAME".to_string(),
                reason: "site name is empty after sanitizing".to_string(),
            });
        }

        if let Some(domain) = vars.get("WEBEX_VENDOR_DOMAIN") {
            config.vendor_domain = domain.trim_matches('.').to_string();
        }

        if let Some(path) = vars.get("WEBEX_API_PATH") {
            config.api_path = path.trim_start_matches('/').to_string();
        }

        if let Some(endpoint) = vars.get("WEBEX_API_ENDPOINT") {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    key: "WEBEX_API_ENDPOINT".to_string(),
                    reason: format!("expected an http(s) URL, got '{}'", endpoint),
                });
            }
            config.endpoint_override = Some(endpoint.clone());
        }

        Ok(config)
    }

    /// Fully-qualified XML API endpoint for this site.
    pub fn site_url(&self) -> String {
        match &self.endpoint_override {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "https://{}.{}/{}",
                self.site_name, self.vendor_domain, self.api_path
            ),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub is_production: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        if bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::InvalidValue {
                key: "BIND_ADDRESS".to_string(),
                reason: format!("'{}' is not a socket address", bind_address),
            });
        }

        let is_production = vars
            .get("ENVIRONMENT")
            .map(|val| val.to_lowercase() == "production")
            .unwrap_or(false);

        Ok(Self {
            bind_address,
            is_production,
        })
    }
}

// Reads `key=value` / `key: value` lines, skipping blanks and `#`/`!` comments.
fn read_properties_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    Ok(parse_properties(&contents))
}

fn parse_properties(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let split_at = line.find(['=', ':'])?;
            let (key, value) = line.split_at(split_at);
            Some((key.trim().to_string(), value[1..].trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([
            ("WEBEX_SITE_NAME".to_string(), "acme".to_string()),
            ("WEBEX_HOST_ACCOUNT".to_string(), "host@acme.com".to_string()),
            ("WEBEX_HOST_PASSWORD".to_string(), "s3cret".to_string()),
        ])
    }

    #[test]
    fn test_from_vars_defaults() {
        let config = WebExConfig::from_vars(&base_vars()).unwrap();

        assert_eq!(config.site_name, "acme");
        assert_eq!(config.host_account, "host@acme.com");
        assert_eq!(config.vendor_domain, DEFAULT_VENDOR_DOMAIN);
        assert_eq!(config.api_path, DEFAULT_API_PATH);
        assert_eq!(
            config.site_url(),
            "https://acme.webex.com/WBXService/XMLService"
        );
    }

    #[test]
    fn test_missing_credentials() {
        let mut vars = base_vars();
        vars.remove("WEBEX_HOST_PASSWORD");

        let err = WebExConfig::from_vars(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::MissingValue(key) if key == "WEBEX_HOST_PASSWORD"));
    }

    #[test]
    fn test_endpoint_override() {
        let mut vars = base_vars();
        vars.insert(
            "WEBEX_API_ENDPOINT".to_string(),
            "http://127.0.0.1:9000/xml".to_string(),
        );
        let config = WebExConfig::from_vars(&vars).unwrap();
        assert_eq!(config.site_url(), "http://127.0.0.1:9000/xml");

        vars.insert("WEBEX_API_ENDPOINT".to_string(), "ftp://nope".to_string());
        assert!(matches!(
            WebExConfig::from_vars(&vars),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_site_name_is_sanitized() {
        let mut vars = base_vars();
        vars.insert(
            "WEBEX_SITE_NAME".to_string(),
            "<b>acme</b>".to_string(),
        );
        let config = WebExConfig::from_vars(&vars).unwrap();
        assert_eq!(config.site_name, "acme");
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = WebExConfig::from_vars(&base_vars()).unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_properties_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# webex service account").unwrap();
        writeln!(file, "siteName=filesite").unwrap();
        writeln!(file, "hostAccount = filehost").unwrap();
        writeln!(file, "hostPassword: filepass").unwrap();

        let mut vars = HashMap::new();
        vars.insert(
            "WEBEX_CONFIG_FILE".to_string(),
            file.path().to_str().unwrap().to_string(),
        );
        let config = WebExConfig::from_vars(&vars).unwrap();
        assert_eq!(config.site_name, "filesite");
        assert_eq!(config.host_account, "filehost");
        assert_eq!(config.host_password, "filepass");

        // Environment wins over the file
        vars.insert("WEBEX_SITE_NAME".to_string(), "envsite".to_string());
        let config = WebExConfig::from_vars(&vars).unwrap();
        assert_eq!(config.site_name, "envsite");
    }

    #[test]
    fn test_missing_properties_file() {
        let mut vars = base_vars();
        vars.insert(
            "WEBEX_CONFIG_FILE".to_string(),
            "/nonexistent/webex.properties".to_string(),
        );
        assert!(matches!(
            WebExConfig::from_vars(&vars),
            Err(ConfigError::FileRead { .. })
        ));
    }

    #[test]
    fn test_server_config() {
        let config = ServerConfig::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert!(!config.is_production);

        let vars = HashMap::from([
            ("ENVIRONMENT".to_string(), "Production".to_string()),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:8080".to_string()),
        ]);
        let config = ServerConfig::from_vars(&vars).unwrap();
        assert!(config.is_production);
        assert_eq!(config.bind_address, "127.0.0.1:8080");

        let vars = HashMap::from([("BIND_ADDRESS".to_string(), "nope".to_string())]);
        assert!(ServerConfig::from_vars(&vars).is_err());
    }
}
