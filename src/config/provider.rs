//! SMS provider credentials from environment variables.
//!
//! Secrets never go into `config.toml`; they are read from the environment (or a
//! `.env` file loaded at startup).

use crate::errors::{Error, Result};

/// Credentials for the SMS provider account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsCredentials {
    /// Account identifier, also the basic-auth user
    pub account_sid: String,
    /// Basic-auth secret
    pub auth_token: String,
    /// Sender number registered with the provider
    pub from_number: String,
}

fn required_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config {
            message: format!("{name} is not set"),
        }),
    }
}

impl SmsCredentials {
    /// Reads `SMS_ACCOUNT_SID`, `SMS_AUTH_TOKEN` and `SMS_FROM_NUMBER`.
    ///
    /// # Errors
    /// Returns a configuration error naming the first missing variable.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            account_sid: required_var("SMS_ACCOUNT_SID")?,
            auth_token: required_var("SMS_AUTH_TOKEN")?,
            from_number: required_var("SMS_FROM_NUMBER")?,
        })
    }
}

/// `SMS_DESTINATION` if set, otherwise the configured destination.
#[must_use]
pub fn destination_override(configured: &str) -> String {
    std::env::var("SMS_DESTINATION")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| configured.to_string())
}
