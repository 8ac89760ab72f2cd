//! Outcomes a search invocation can transition to.

use helpdesk_kb_core::VarKey;

use crate::article::Article;

/// The next dialog state after a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Multiple results were stored; show the article list.
    ViewResults,
    /// A single or direct answer was stored; show the article view.
    ViewArticle {
        /// Optional line to show before the article (e.g. "I found ...").
        announcement: Option<String>,
    },
    /// Nothing matched.
    NoResults,
}

/// Caller-configured session variable names shared by both search modes.
///
/// The hosting runtime decides where results live; the components only hold
/// typed keys handed to them at configuration time.
#[derive(Debug, Clone)]
pub struct SearchVars {
    /// Where the normalized article list is stored.
    pub results: VarKey<Vec<Article>>,
    /// Where the selected/direct answer id is stored.
    pub answer_id: VarKey<String>,
    /// Whether displayable results exist to return to.
    pub has_results: VarKey<bool>,
}

impl SearchVars {
    /// Builds the key set from caller-supplied variable names.
    #[must_use]
    pub fn named(
        results: impl Into<String>,
        answer_id: impl Into<String>,
        has_results: impl Into<String>,
    ) -> Self {
        Self {
            results: VarKey::named(results),
            answer_id: VarKey::named(answer_id),
            has_results: VarKey::named(has_results),
        }
    }
}
