//! Solution layout: title and summary up front, then one section per
//! authored `SECTION` block.

use crate::content::{ArticleMeta, ContentDocument};
use crate::renderer::ContentRenderer;
use crate::section::Section;
use helpdesk_kb_core::ChannelType;

/// Renders `solution` articles.
pub struct SolutionRenderer;

impl ContentRenderer for SolutionRenderer {
    fn content_type(&self) -> &'static str {
        "solution"
    }

    fn render(
        &self,
        meta: &ArticleMeta,
        document: &ContentDocument,
        channel: ChannelType,
    ) -> Vec<Section> {
        let summary = document.summary.clone().unwrap_or_default();
        let lead = match document.thumbnail_url.as_deref() {
            // Thumbnails only reach channels that can display them.
            Some(thumbnail) if channel.is_rich() => {
                Section::with_image(meta.title.clone(), summary, thumbnail)
            }
            _ => Section::new(meta.title.clone(), summary),
        };

        std::iter::once(lead)
            .chain(
                document
                    .sections
                    .iter()
                    .map(|block| Section::new(block.header.clone(), block.body.clone())),
            )
            .collect()
    }

    fn article_url(&self, document: &ContentDocument, portal_url: &str) -> String {
        document
            .article_url
            .clone()
            .unwrap_or_else(|| portal_url.to_string())
    }
}
