//! Search orchestrators for the helpdesk-kb components.
//!
//! This crate provides:
//!
//! - **Article model**: Normalized results with content-type classification
//! - **Find**: Direct lookup by document id or title, with swapped-field fallback
//! - **Question**: Free-text search with intent-match detection

pub mod article;
pub mod error;
pub mod find;
pub mod outcome;
pub mod question;
mod wire;

pub use article::{Article, ClassificationError, EXTERNAL_LINK_TYPE, classify_document_id, classify_title_url};
pub use error::SearchError;
pub use find::{FindArticle, FindQuery};
pub use outcome::{SearchOutcome, SearchVars};
pub use question::QuestionSearch;
