//! Tenant configuration for one knowledge-base backend.
//!
//! A tenant is the combination of service endpoints, site, and integration
//! credentials. The token cache is keyed per tenant, so every conversation
//! configured against the same backend shares one token.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration identifying one knowledge-base tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Base URL of the content API.
    pub content_api: String,
    /// Base URL of the natural-language search API.
    pub search_api: String,
    /// Base URL of the end-user customer portal, used to build article links.
    pub customer_portal: String,
    /// Site name passed in every auth header.
    pub site_name: String,
    /// Integration user login.
    pub integration_user_name: String,
    /// Integration user password. Never logged.
    pub integration_user_password: String,
    /// Interface identifier passed in the auth header.
    pub interface_id: u32,
    /// Locale used when acquiring tokens.
    #[serde(default = "default_locale")]
    pub locale_id: String,
}

fn default_locale() -> String {
    "en_US".to_string()
}

impl TenantConfig {
    /// Returns the cache key identifying this tenant.
    #[must_use]
    pub fn tenant_key(&self) -> TenantKey {
        TenantKey {
            content_api: self.content_api.clone(),
            site_name: self.site_name.clone(),
            integration_user_name: self.integration_user_name.clone(),
        }
    }

    /// The versioned content API root.
    #[must_use]
    pub fn versioned_content_api(&self) -> String {
        format!("{}/latest", self.content_api.trim_end_matches('/'))
    }

    /// The versioned search API root.
    #[must_use]
    pub fn versioned_search_api(&self) -> String {
        format!("{}/latest", self.search_api.trim_end_matches('/'))
    }

    /// Builds the customer-portal view URL for an answer.
    #[must_use]
    pub fn answer_view_url(&self, answer_id: &str) -> String {
        format!(
            "{}/app/answers/answer_view/a_id/{}",
            self.customer_portal.trim_end_matches('/'),
            urlencoding::encode(answer_id)
        )
    }
}

/// Cache key identifying one tenant.
///
/// Deliberately excludes the password: two configurations differing only in
/// password are the same tenant, and the key is safe to log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantKey {
    /// Content API base URL.
    pub content_api: String,
    /// Site name.
    pub site_name: String,
    /// Integration user login.
    pub integration_user_name: String,
}

impl fmt::Display for TenantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} ({})",
            self.integration_user_name, self.site_name, self.content_api
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TenantConfig {
        TenantConfig {
            content_api: "https://kb.example.com/km/api".to_string(),
            search_api: "https://kb.example.com/srt/api".to_string(),
            customer_portal: "https://portal.example.com/".to_string(),
            site_name: "example".to_string(),
            integration_user_name: "integration".to_string(),
            integration_user_password: "hunter2".to_string(),
            interface_id: 1,
            locale_id: "en_US".to_string(),
        }
    }

    #[test]
    fn versioned_endpoints() {
        let config = config();
        assert_eq!(
            config.versioned_content_api(),
            "https://kb.example.com/km/api/latest"
        );
        assert_eq!(
            config.versioned_search_api(),
            "https://kb.example.com/srt/api/latest"
        );
    }

    #[test]
    fn answer_view_url_is_encoded() {
        let config = config();
        assert_eq!(
            config.answer_view_url("10 01"),
            "https://portal.example.com/app/answers/answer_view/a_id/10%2001"
        );
    }

    #[test]
    fn tenant_key_excludes_password() {
        let key = config().tenant_key();
        let display = key.to_string();
        assert!(display.contains("integration@example"));
        assert!(!display.contains("hunter2"));
    }

    #[test]
    fn same_tenant_despite_password_change() {
        let a = config();
        let mut b = config();
        b.integration_user_password = "rotated".to_string();
        assert_eq!(a.tenant_key(), b.tenant_key());
    }
}
