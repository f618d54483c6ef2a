//! Dispatcher settings.

use core_config::{ConfigError, FromEnv, env_first, env_or_default};
use std::path::PathBuf;

pub const DEFAULT_TEST_RECIPIENT: &str = "test@test.com";

/// Settings for the welcome-email debug path.
///
/// Environment variables:
/// - `NOTIFY_TEST_RECIPIENT` (default: `test@test.com`)
/// - `CONFIRM_TOKEN_FILE`, falling back to `path_file`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    /// Registrations with this address get their token dumped to `token_file`.
    pub test_recipient: String,
    pub token_file: Option<PathBuf>,
}

impl NotificationConfig {
    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    pub fn with_test_recipient(mut self, address: impl Into<String>) -> Self {
        self.test_recipient = address.into();
        self
    }

    pub fn is_test_recipient(&self, address: &str) -> bool {
        address == self.test_recipient
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            test_recipient: DEFAULT_TEST_RECIPIENT.to_string(),
            token_file: None,
        }
    }
}

impl FromEnv for NotificationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            test_recipient: env_or_default("NOTIFY_TEST_RECIPIENT", DEFAULT_TEST_RECIPIENT),
            token_file: env_first(&["CONFIRM_TOKEN_FILE", "path_file"])
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(["NOTIFY_TEST_RECIPIENT", "CONFIRM_TOKEN_FILE", "path_file"], || {
            let config = NotificationConfig::from_env().unwrap();
            assert_eq!(config, NotificationConfig::default());
        });
    }

    #[test]
    fn test_legacy_token_file_variable() {
        temp_env::with_vars(
            [("CONFIRM_TOKEN_FILE", None), ("path_file", Some("/tmp/tok.json"))],
            || {
                let config = NotificationConfig::from_env().unwrap();
                assert_eq!(config.token_file, Some(PathBuf::from("/tmp/tok.json")));
            },
        );
    }

    #[test]
    fn test_new_variable_wins() {
        temp_env::with_vars(
            [
                ("CONFIRM_TOKEN_FILE", Some("/var/run/token.json")),
                ("path_file", Some("/tmp/tok.json")),
                ("NOTIFY_TEST_RECIPIENT", Some("qa@example.com")),
            ],
            || {
                let config = NotificationConfig::from_env().unwrap();
                assert_eq!(config.token_file, Some(PathBuf::from("/var/run/token.json")));
                assert!(config.is_test_recipient("qa@example.com"));
                assert!(!config.is_test_recipient(DEFAULT_TEST_RECIPIENT));
            },
        );
    }
}
