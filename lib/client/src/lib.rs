//! Knowledge service REST client for the helpdesk-kb components.
//!
//! This crate provides:
//!
//! - **Tenant config**: Endpoint, site, and integration credential bundle
//! - **Token store**: Process-wide token cache with proactive renewal
//! - **Knowledge client**: Auth injection, retry-on-expiry, redacted logging
//! - **Transport seam**: reqwest in production, scripted responses in tests

pub mod config;
pub mod error;
pub mod rest;
pub mod token;
pub mod transport;

pub use config::{TenantConfig, TenantKey};
pub use error::{ApiError, NOT_FOUND_CODE, SESSION_EXPIRED_CODE};
pub use rest::{KM_AUTH_HEADER, KnowledgeClient, RequestOptions};
pub use token::{TOKEN_RENEWAL_INTERVAL, TokenStore};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, ScriptedTransport, Transport};
