use helpdesk_kb_core::SessionError;
use helpdesk_kb_render::ContentParseError;
use std::fmt;

/// Errors that abort a dialog turn.
///
/// Upstream service failures are not errors at this level: the dialogs map
/// them to the `RestError` transition (or the not-found apology) instead.
#[derive(Debug)]
pub enum DialogError {
    /// The session variable store failed.
    Session(SessionError),
    /// The fetched article could not be parsed.
    Content(ContentParseError),
    /// A postback arrived without the fields its action needs.
    MalformedPostback { reason: String },
}

impl fmt::Display for DialogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session(err) => write!(f, "session store: {err}"),
            Self::Content(err) => write!(f, "article content: {err}"),
            Self::MalformedPostback { reason } => {
                write!(f, "malformed postback: {reason}")
            }
        }
    }
}

impl std::error::Error for DialogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Session(err) => Some(err),
            Self::Content(err) => Some(err),
            Self::MalformedPostback { .. } => None,
        }
    }
}

impl From<SessionError> for DialogError {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

impl From<ContentParseError> for DialogError {
    fn from(err: ContentParseError) -> Self {
        Self::Content(err)
    }
}
