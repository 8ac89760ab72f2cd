//! FAQ layout: a metadata section, then the authored question and answer.

use crate::content::{ArticleMeta, ContentDocument};
use crate::renderer::ContentRenderer;
use crate::section::Section;
use helpdesk_kb_core::ChannelType;

/// Renders `faq` articles.
pub struct FaqRenderer;

impl ContentRenderer for FaqRenderer {
    fn content_type(&self) -> &'static str {
        "faq"
    }

    fn render(
        &self,
        meta: &ArticleMeta,
        document: &ContentDocument,
        _channel: ChannelType,
    ) -> Vec<Section> {
        let mut sections = vec![Section::new(
            format!("{}: {}", meta.document_id, meta.title),
            format!("Last Published: {}", meta.publish_day()),
        )];

        // Question and answer arrive already flattened to plain text; rich
        // markup inside the answer never reaches the channel.
        if document.question.is_some() || document.answer.is_some() {
            sections.push(Section::new(
                document.question.clone().unwrap_or_default(),
                document.answer.clone().unwrap_or_default(),
            ));
        }

        sections
    }
}
