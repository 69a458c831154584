pub mod common;
pub mod meeting;
