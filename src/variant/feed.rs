//! Read-only messages built from webmail feed entries.
//!
//! A feed entry carries a title, an author, an issue date, a summary and a
//! link back to the web UI. It never lists recipients or the full body, and it
//! cannot be edited.

use chrono::{DateTime, Utc};
use url::Url;

use crate::model::address::EmailAddress;
use crate::model::capability::{Capabilities, Operation};
use crate::model::message::{Message, Preview, WebLink};

/// One entry of a mailbox feed.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FeedMessage {
    subject: String,
    from: EmailAddress,
    send_date: DateTime<Utc>,
    link: Option<Url>,
    preview: Option<String>,
}

impl FeedMessage {
    /// Operations every feed entry supports.
    pub const CAPABILITIES: Capabilities = Capabilities::NONE
        .with(Operation::GetLink)
        .with(Operation::GetPreview);

    pub fn new(subject: impl Into<String>, from: EmailAddress, send_date: DateTime<Utc>) -> Self {
        Self {
            subject: subject.into(),
            from,
            send_date,
            link: None,
            preview: None,
        }
    }

    #[must_use]
    pub fn with_link(mut self, link: Url) -> Self {
        self.link = Some(link);
        self
    }

    /// Attach the entry summary. Blank summaries are treated as absent.
    #[must_use]
    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        let preview = preview.into();
        self.preview = (!preview.trim().is_empty()).then_some(preview);
        self
    }
}

impl Message for FeedMessage {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn send_date(&self) -> DateTime<Utc> {
        self.send_date
    }

    fn from(&self) -> &EmailAddress {
        &self.from
    }

    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn as_preview(&self) -> Option<&dyn Preview> {
        Some(self)
    }

    fn as_web_link(&self) -> Option<&dyn WebLink> {
        Some(self)
    }
}

impl Preview for FeedMessage {
    fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }
}

impl WebLink for FeedMessage {
    fn link(&self) -> Option<&Url> {
        self.link.as_ref()
    }
}
