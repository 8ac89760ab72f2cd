//! Article rendering for the helpdesk-kb components.
//!
//! This crate provides:
//!
//! - **Content parsing**: Metadata plus authored markup into plain data
//! - **Renderers**: Per-content-type section layouts behind a closed registry
//! - **Sections**: The rendered block model with channel-aware truncation

pub mod content;
pub mod faq;
pub mod renderer;
pub mod section;
pub mod solution;

pub use content::{AnswerPayload, ArticleMeta, ContentDocument, ContentParseError, DocSection};
pub use faq::FaqRenderer;
pub use renderer::{ContentRenderer, RenderedArticle, RendererRegistry};
pub use section::Section;
pub use solution::SolutionRenderer;
