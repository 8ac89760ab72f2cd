//! Console host configuration.
//!
//! Loaded via the `config` crate from environment variables, e.g.
//! `TENANT__CONTENT_API`, `TENANT__SITE_NAME`, `CHANNEL=sms`.

use helpdesk_kb_client::TenantConfig;
use helpdesk_kb_core::ChannelType;
use serde::Deserialize;

/// Configuration for one console session.
#[derive(Debug, Deserialize)]
pub struct ConsoleConfig {
    /// Knowledge-base tenant to talk to.
    pub tenant: TenantConfig,

    /// Channel to emulate; controls truncation and thumbnails.
    #[serde(default = "default_channel")]
    pub channel: ChannelType,
}

fn default_channel() -> ChannelType {
    ChannelType::Chat
}

impl ConsoleConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
