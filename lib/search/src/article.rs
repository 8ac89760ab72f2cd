//! The normalized article model and content-type classification.
//!
//! Both search modes normalize heterogeneous service results into `Article`
//! values. The content type drives which renderer handles the detail view;
//! it is derived from structural conventions in the service's identifiers,
//! which are treated as an external contract and validated rather than
//! assumed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content type assigned to results that only carry an external web link.
///
/// External articles have no answer id and therefore no detail view.
pub const EXTERNAL_LINK_TYPE: &str = "ext_link";

/// One normalized search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Display title.
    pub title: String,
    /// Short excerpt shown under the title.
    pub excerpt: String,
    /// Navigable link (customer portal or external URL).
    pub link: String,
    /// Answer id used to fetch the detail view; `None` for external links.
    pub answer_id: Option<String>,
    /// Lower-cased content type tag driving renderer selection.
    pub content_type: String,
}

impl Article {
    /// Returns true when the article is an external link with no detail view.
    #[must_use]
    pub fn is_external(&self) -> bool {
        self.answer_id.is_none()
    }
}

/// Errors classifying a result's content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// The document id carries no alphabetic type prefix.
    MalformedDocumentId { document_id: String },
    /// The article URL carries no `IM:<TYPE>:` token.
    MissingTypeToken { url: String },
}

impl fmt::Display for ClassificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedDocumentId { document_id } => {
                write!(f, "document id has no type prefix: {document_id}")
            }
            Self::MissingTypeToken { url } => {
                write!(f, "article URL has no IM type token: {url}")
            }
        }
    }
}

impl std::error::Error for ClassificationError {}

/// Derives a content type from a document id's alphabetic prefix.
///
/// The knowledge service prefixes document ids with their content type
/// (`FAQ12`, `SOLUTION3`); the first alphabetic run, lower-cased, is the tag.
pub fn classify_document_id(document_id: &str) -> Result<String, ClassificationError> {
    let run: String = document_id
        .chars()
        .skip_while(|c| !c.is_ascii_alphabetic())
        .take_while(char::is_ascii_alphabetic)
        .collect();
    if run.is_empty() {
        return Err(ClassificationError::MalformedDocumentId {
            document_id: document_id.to_string(),
        });
    }
    Ok(run.to_ascii_lowercase())
}

/// Derives a content type from the `IM:<TYPE>:` token in a title URL.
pub fn classify_title_url(url: &str) -> Result<String, ClassificationError> {
    let missing = || ClassificationError::MissingTypeToken {
        url: url.to_string(),
    };

    let lower = url.to_ascii_lowercase();
    let start = lower.find("im:").ok_or_else(missing)? + "im:".len();
    let rest = &url[start..];
    let end = rest.find(':').ok_or_else(missing)?;
    let tag = &rest[..end];
    if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(missing());
    }
    Ok(tag.to_ascii_lowercase())
}
