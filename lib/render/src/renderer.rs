//! Renderer trait and the content-type registry.

use crate::content::{ArticleMeta, ContentDocument};
use crate::section::Section;
use helpdesk_kb_core::ChannelType;
use tracing::debug;

/// Renders one content type into detail-view sections.
///
/// Implementations are pure: all channel and article state arrives as
/// arguments, and the output is a plain section list.
pub trait ContentRenderer: Send + Sync {
    /// The lower-cased content type reference key this renderer handles.
    fn content_type(&self) -> &'static str;

    /// Builds the section list for one article.
    fn render(
        &self,
        meta: &ArticleMeta,
        document: &ContentDocument,
        channel: ChannelType,
    ) -> Vec<Section>;

    /// The link presented alongside the sections.
    ///
    /// Defaults to the portal view URL; renderers may prefer a link authored
    /// into the article body.
    fn article_url(&self, _document: &ContentDocument, portal_url: &str) -> String {
        portal_url.to_string()
    }
}

/// A fully rendered article detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArticle {
    /// Sections, already truncated for the channel.
    pub sections: Vec<Section>,
    /// Link to the full article.
    pub article_url: String,
}

/// Renderer for content types without a structured layout: one section with
/// the title and whatever text the body carries.
struct DefaultRenderer;

impl ContentRenderer for DefaultRenderer {
    fn content_type(&self) -> &'static str {
        ""
    }

    fn render(
        &self,
        meta: &ArticleMeta,
        document: &ContentDocument,
        _channel: ChannelType,
    ) -> Vec<Section> {
        let body = document
            .summary
            .clone()
            .unwrap_or_else(|| document.full_text.clone());
        vec![Section::new(meta.title.clone(), body)]
    }
}

/// The closed set of renderers, keyed by content type.
pub struct RendererRegistry {
    renderers: Vec<Box<dyn ContentRenderer>>,
    fallback: Box<dyn ContentRenderer>,
}

impl RendererRegistry {
    /// The standard registry: FAQ and solution layouts, plus the default
    /// single-section fallback for everything else.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            renderers: vec![
                Box::new(crate::faq::FaqRenderer),
                Box::new(crate::solution::SolutionRenderer),
            ],
            fallback: Box::new(DefaultRenderer),
        }
    }

    /// Whether a dedicated renderer exists for the content type.
    #[must_use]
    pub fn supports(&self, content_type: &str) -> bool {
        self.renderers
            .iter()
            .any(|renderer| renderer.content_type() == content_type)
    }

    /// Renders one article, truncating every section for the channel.
    #[must_use]
    pub fn render(
        &self,
        meta: &ArticleMeta,
        document: &ContentDocument,
        portal_url: &str,
        channel: ChannelType,
    ) -> RenderedArticle {
        let renderer = self
            .renderers
            .iter()
            .find(|renderer| renderer.content_type() == meta.content_type)
            .unwrap_or(&self.fallback);
        debug!(
            content_type = %meta.content_type,
            dedicated = self.supports(&meta.content_type),
            "rendering article detail view"
        );

        let mut sections = renderer.render(meta, document, channel);
        for section in &mut sections {
            section.truncate_for(channel);
        }
        RenderedArticle {
            sections,
            article_url: renderer.article_url(document, portal_url),
        }
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
