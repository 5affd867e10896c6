// src/core/net.rs
// Shared HTTP client for the roster API.

use std::time::Duration;

use crate::config::consts::{API_TIMEOUT_SECS, USER_AGENT};

pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(API_TIMEOUT_SECS))
        .build()
}

/// `base` + `path`, tolerating a trailing slash on the base.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_without_double_slash() {
        assert_eq!(join_url("https://example.test/", "/player/7"), "https://example.test/player/7");
        assert_eq!(join_url("https://example.test", "/player/7"), "https://example.test/player/7");
    }
}
