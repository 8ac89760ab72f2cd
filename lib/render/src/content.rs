//! Parsing of the extended-answer payload.
//!
//! The knowledge service returns article metadata as JSON with the authored
//! body as embedded markup (`SUMMARY`, repeated `SECTION` blocks with
//! `HEADER`/`BODY`, `THUMBNAIL_URL`, `ARTICLE_URL`, `QUESTION`, `ANSWER`).
//! That element vocabulary is the service's authoring contract; extraction is
//! tolerant of extra wrapping and of entity-encoded rich text inside blocks.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value as JsonValue;
use std::fmt;

/// Errors parsing an extended-answer payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentParseError {
    /// The payload carried no markup (check the authoring configuration).
    MissingMarkup,
    /// A required metadata field was absent or mistyped.
    Meta { field: &'static str },
}

impl fmt::Display for ContentParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMarkup => {
                write!(f, "answer payload carries no article markup")
            }
            Self::Meta { field } => {
                write!(f, "answer payload missing metadata field: {field}")
            }
        }
    }
}

impl std::error::Error for ContentParseError {}

/// Article metadata from the extended-answer payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleMeta {
    /// Answer id, stringified.
    pub answer_id: String,
    /// Article title.
    pub title: String,
    /// Document id (`FAQ12`).
    pub document_id: String,
    /// ISO publish timestamp; date portion shown to users.
    pub publish_date: String,
    /// Lower-cased content type reference key.
    pub content_type: String,
}

impl ArticleMeta {
    /// The date portion of the publish timestamp.
    #[must_use]
    pub fn publish_day(&self) -> &str {
        self.publish_date.split('T').next().unwrap_or_default()
    }
}

/// One `SECTION` block of an authored article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocSection {
    /// Section heading.
    pub header: String,
    /// Section body text.
    pub body: String,
}

/// The authored article body, extracted from markup into plain data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentDocument {
    /// `SUMMARY` text.
    pub summary: Option<String>,
    /// `SECTION` blocks in document order.
    pub sections: Vec<DocSection>,
    /// `THUMBNAIL_URL` text.
    pub thumbnail_url: Option<String>,
    /// `ARTICLE_URL` text, overriding the portal link when present.
    pub article_url: Option<String>,
    /// `QUESTION` text (FAQ articles).
    pub question: Option<String>,
    /// `ANSWER` text with nested rich-text tags flattened (FAQ articles).
    pub answer: Option<String>,
    /// Full text content, for articles using none of the known elements.
    pub full_text: String,
}

impl ContentDocument {
    /// Parses the authored markup.
    ///
    /// # Errors
    ///
    /// Returns `ContentParseError::MissingMarkup` when the markup is empty.
    pub fn parse(markup: &str) -> Result<Self, ContentParseError> {
        if markup.trim().is_empty() {
            return Err(ContentParseError::MissingMarkup);
        }

        let fragment = Html::parse_fragment(markup);

        let summary = element_text(&fragment, "summary");
        let thumbnail_url = element_text(&fragment, "thumbnail_url");
        let article_url = element_text(&fragment, "article_url");
        let question = element_text(&fragment, "question");
        let answer = element_text(&fragment, "answer");

        let mut sections = Vec::new();
        if let Ok(selector) = Selector::parse("section") {
            for section in fragment.select(&selector) {
                sections.push(extract_section(section));
            }
        }

        let full_text = normalized_text(fragment.root_element());

        Ok(Self {
            summary,
            sections,
            thumbnail_url,
            article_url,
            question,
            answer,
            full_text,
        })
    }
}

/// Text of the first matching element, trimmed; `None` when absent or blank.
fn element_text(fragment: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let element = fragment.select(&selector).next()?;
    let text = normalized_text(element);
    (!text.is_empty()).then_some(text)
}

fn normalized_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extracts one section, keeping the header/body split even when the parser
/// has flattened the body element into bare text.
fn extract_section(section: ElementRef<'_>) -> DocSection {
    let header = Selector::parse("header")
        .ok()
        .and_then(|selector| section.select(&selector).next())
        .map(normalized_text)
        .unwrap_or_default();

    // Body = the section's text minus its header text. The markup's BODY
    // element may be flattened by the HTML tree builder, so the body cannot
    // be selected directly.
    let header_selector = Selector::parse("header").ok();
    let body: String = section
        .children()
        .filter_map(|node| {
            if let Some(child) = ElementRef::wrap(node) {
                let is_header = header_selector
                    .as_ref()
                    .map(|selector| selector.matches(&child))
                    .unwrap_or(false);
                (!is_header).then(|| child.text().collect::<String>())
            } else {
                node.value().as_text().map(|text| text.to_string())
            }
        })
        .collect();

    DocSection {
        header,
        body: body.trim().to_string(),
    }
}

/// The complete parsed extended-answer payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerPayload {
    /// Article metadata.
    pub meta: ArticleMeta,
    /// Parsed authored body.
    pub document: ContentDocument,
}

impl AnswerPayload {
    /// Parses the JSON body of a `content/answers/{id}?mode=EXTENDED` call.
    ///
    /// # Errors
    ///
    /// Returns `ContentParseError` when metadata fields are missing or the
    /// markup is absent.
    pub fn parse(body: &JsonValue) -> Result<Self, ContentParseError> {
        let markup = body
            .get("xml")
            .and_then(JsonValue::as_str)
            .ok_or(ContentParseError::MissingMarkup)?;
        let document = ContentDocument::parse(markup)?;

        let meta = ArticleMeta {
            answer_id: stringified(body.get("answerId"))
                .ok_or(ContentParseError::Meta { field: "answerId" })?,
            title: string_field(body, "title").ok_or(ContentParseError::Meta { field: "title" })?,
            document_id: string_field(body, "documentId").unwrap_or_default(),
            publish_date: string_field(body, "publishDate").unwrap_or_default(),
            content_type: body
                .get("contentType")
                .and_then(|content_type| content_type.get("referenceKey"))
                .and_then(JsonValue::as_str)
                .map(str::to_lowercase)
                .ok_or(ContentParseError::Meta {
                    field: "contentType.referenceKey",
                })?,
        };

        Ok(Self { meta, document })
    }
}

fn string_field(body: &JsonValue, field: &str) -> Option<String> {
    body.get(field)
        .and_then(JsonValue::as_str)
        .map(str::to_string)
}

fn stringified(value: Option<&JsonValue>) -> Option<String> {
    match value? {
        JsonValue::String(text) => Some(text.clone()),
        JsonValue::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SOLUTION_MARKUP: &str = "<SOLUTION>\
        <SUMMARY>Reset your password from the portal.</SUMMARY>\
        <SECTION><HEADER>Step one</HEADER><BODY>Open account settings.</BODY></SECTION>\
        <SECTION><HEADER>Step two</HEADER><BODY>Choose a new password.</BODY></SECTION>\
        <THUMBNAIL_URL>https://cdn.example.com/thumb.png</THUMBNAIL_URL>\
        <ARTICLE_URL>https://portal.example.com/full/42</ARTICLE_URL>\
        </SOLUTION>";

    #[test]
    fn parses_summary_and_sections() {
        let document = ContentDocument::parse(SOLUTION_MARKUP).expect("parse");

        assert_eq!(
            document.summary.as_deref(),
            Some("Reset your password from the portal.")
        );
        assert_eq!(document.sections.len(), 2);
        assert_eq!(document.sections[0].header, "Step one");
        assert_eq!(document.sections[0].body, "Open account settings.");
        assert_eq!(document.sections[1].header, "Step two");
        assert_eq!(
            document.thumbnail_url.as_deref(),
            Some("https://cdn.example.com/thumb.png")
        );
        assert_eq!(
            document.article_url.as_deref(),
            Some("https://portal.example.com/full/42")
        );
    }

    #[test]
    fn parses_faq_markup() {
        let markup = "<FAQ><QUESTION>How do I reset?</QUESTION>\
            <ANSWER>Use the <b>portal</b> &amp; follow the steps.</ANSWER></FAQ>";
        let document = ContentDocument::parse(markup).expect("parse");

        assert_eq!(document.question.as_deref(), Some("How do I reset?"));
        // Nested tags flattened, entities decoded.
        assert_eq!(
            document.answer.as_deref(),
            Some("Use the portal & follow the steps.")
        );
    }

    #[test]
    fn empty_markup_is_an_error() {
        assert_eq!(
            ContentDocument::parse("   "),
            Err(ContentParseError::MissingMarkup)
        );
    }

    #[test]
    fn unknown_vocabulary_still_yields_full_text() {
        let document = ContentDocument::parse("<NOTE>Just a note.</NOTE>").expect("parse");
        assert_eq!(document.full_text, "Just a note.");
        assert!(document.summary.is_none());
        assert!(document.sections.is_empty());
    }

    fn payload_body() -> JsonValue {
        json!({
            "answerId": 42,
            "title": "Resetting a password",
            "documentId": "SOL7",
            "publishDate": "2024-03-01T09:30:00Z",
            "contentType": {"referenceKey": "SOLUTION"},
            "xml": SOLUTION_MARKUP,
        })
    }

    #[test]
    fn parses_answer_payload() {
        let payload = AnswerPayload::parse(&payload_body()).expect("parse");

        assert_eq!(payload.meta.answer_id, "42");
        assert_eq!(payload.meta.content_type, "solution");
        assert_eq!(payload.meta.publish_day(), "2024-03-01");
        assert_eq!(payload.document.sections.len(), 2);
    }

    #[test]
    fn payload_without_markup_is_an_error() {
        let mut body = payload_body();
        body.as_object_mut().expect("object").remove("xml");
        assert_eq!(
            AnswerPayload::parse(&body),
            Err(ContentParseError::MissingMarkup)
        );
    }

    #[test]
    fn payload_without_content_type_is_an_error() {
        let mut body = payload_body();
        body.as_object_mut().expect("object").remove("contentType");
        assert!(matches!(
            AnswerPayload::parse(&body),
            Err(ContentParseError::Meta { .. })
        ));
    }
}
