//! Configuration management for the notifier function.

use std::env;

use crate::{Error, Result};

/// Channel prefix the messaging provider expects on WhatsApp addresses.
pub const WHATSAPP_PREFIX: &str = "whatsapp:";

const DEFAULT_API_BASE: &str = "https://api.twilio.com";
const DEFAULT_BUSINESS_NAME: &str = "Joel's Services";

/// Notifier configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Twilio account SID
    pub account_sid: String,
    /// Twilio auth token
    pub auth_token: String,
    /// Sender address, e.g. `whatsapp:+14155238886`
    pub sender: String,
    /// Recipient address, always carrying the `whatsapp:` prefix
    pub recipient: String,
    /// Base URL of the Twilio REST API
    pub api_base: String,
    /// Business name shown in the message header
    pub business_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{} not set", key)))
        };

        Ok(Self {
            account_sid: required("TWILIO_ACCOUNT_SID")?,
            auth_token: required("TWILIO_AUTH_TOKEN")?,
            sender: required("TWILIO_WHATSAPP_NUMBER")?,
            recipient: whatsapp_address(&required("MY_PHONE_NUMBER")?),
            api_base: lookup("TWILIO_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            business_name: lookup("BUSINESS_NAME")
                .unwrap_or_else(|| DEFAULT_BUSINESS_NAME.to_string()),
        })
    }
}

/// Prefix a phone number with the WhatsApp channel unless it already has it.
pub fn whatsapp_address(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with(WHATSAPP_PREFIX) {
        raw.to_string()
    } else {
        format!("{}{}", WHATSAPP_PREFIX, raw)
    }
}
