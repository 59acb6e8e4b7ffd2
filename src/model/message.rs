//! The message trait and its optional capability traits.
//!
//! Every variant implements [`Message`], which carries the fields all backends
//! must supply. Optional functionality is split into small traits, one per
//! feature group. A variant opts into a group by implementing its trait and
//! returning `Some(self)` from the matching `as_*` query, and declares the
//! individual operations it supports through [`Message::capabilities`].
//!
//! Code holding a concrete variant calls the capability traits directly.
//! Code holding a `dyn Message` uses the fail-fast methods on `dyn Message`,
//! which return [`MailError::Unsupported`] for anything the variant lacks:
//!
//! ```
//! use webmail_model::model::message::Message;
//! use webmail_model::variant::feed::FeedMessage;
//! use webmail_model::EmailAddress;
//!
//! let entry = FeedMessage::new("Hello", EmailAddress::new("jane@example.com"), chrono::Utc::now());
//! let message: &dyn Message = &entry;
//! assert_eq!(message.subject(), "Hello");
//! assert!(message.to().unwrap_err().is_unsupported());
//! ```

use chrono::{DateTime, Utc};
use url::Url;

use crate::error::{MailError, Result};
use crate::model::address::EmailAddress;
use crate::model::capability::{Capabilities, Operation};

/// A mail item as seen by callers, independent of the backend that produced it.
pub trait Message: Send + Sync {
    /// Message subject. Empty when the backend has none.
    fn subject(&self) -> &str;

    /// When the message was sent.
    fn send_date(&self) -> DateTime<Utc>;

    /// Sender address.
    fn from(&self) -> &EmailAddress;

    /// Optional operations this variant supports.
    ///
    /// Must return the same set for every instance of a variant, and every
    /// operation in it must have its capability trait exposed through the
    /// matching `as_*` query. A declared operation whose query returns `None`
    /// still fails with [`MailError::Unsupported`].
    fn capabilities(&self) -> Capabilities;

    fn as_read_recipients(&self) -> Option<&dyn ReadRecipients> {
        None
    }

    fn as_write_recipients(&mut self) -> Option<&mut dyn WriteRecipients> {
        None
    }

    fn as_read_body(&self) -> Option<&dyn ReadBody> {
        None
    }

    fn as_write_body(&mut self) -> Option<&mut dyn WriteBody> {
        None
    }

    fn as_preview(&self) -> Option<&dyn Preview> {
        None
    }

    fn as_web_link(&self) -> Option<&dyn WebLink> {
        None
    }

    fn as_write_headers(&mut self) -> Option<&mut dyn WriteHeaders> {
        None
    }
}

/// Enumerate "To:" and "Cc:" recipients.
pub trait ReadRecipients {
    fn to(&self) -> &[EmailAddress];
    fn cc(&self) -> &[EmailAddress];
}

/// Add recipients.
///
/// There is deliberately no Bcc counterpart in [`ReadRecipients`]: blind
/// copies are write-only.
pub trait WriteRecipients {
    fn add_to(&mut self, to: EmailAddress);
    fn add_cc(&mut self, cc: EmailAddress);
    fn add_bcc(&mut self, bcc: EmailAddress);
}

/// Full plain-text body.
pub trait ReadBody {
    fn content_text(&self) -> &str;
}

pub trait WriteBody {
    fn set_content_text(&mut self, content_text: String);
}

/// Short plain-text excerpt of the body.
pub trait Preview {
    /// `None` when the backend supplied no excerpt for this message.
    fn preview(&self) -> Option<&str>;
}

/// Link to the message in the web UI.
pub trait WebLink {
    /// `None` when the backend supplied no link for this message.
    fn link(&self) -> Option<&Url>;
}

/// Replace header fields.
pub trait WriteHeaders {
    fn set_subject(&mut self, subject: String);
    fn set_from(&mut self, from: EmailAddress);
}

/// Resolve a capability query, failing with `Unsupported` unless the variant
/// both declares `op` and exposes the trait.
fn gate<T>(supported: bool, op: Operation, query: Option<T>) -> Result<T> {
    match query {
        Some(found) if supported => Ok(found),
        _ => Err(MailError::unsupported(op)),
    }
}

impl dyn Message + '_ {
    /// `true` if `op` is in [`Message::capabilities`].
    ///
    /// Inherent on `dyn Message`: implementations cannot override it, and the
    /// operations below gate on the same answer.
    pub fn supports(&self, op: Operation) -> bool {
        self.capabilities().contains(op)
    }

    pub fn to(&self) -> Result<&[EmailAddress]> {
        let op = Operation::GetTo;
        Ok(gate(self.supports(op), op, self.as_read_recipients())?.to())
    }

    pub fn cc(&self) -> Result<&[EmailAddress]> {
        let op = Operation::GetCc;
        Ok(gate(self.supports(op), op, self.as_read_recipients())?.cc())
    }

    pub fn link(&self) -> Result<Option<&Url>> {
        let op = Operation::GetLink;
        Ok(gate(self.supports(op), op, self.as_web_link())?.link())
    }

    pub fn preview(&self) -> Result<Option<&str>> {
        let op = Operation::GetPreview;
        Ok(gate(self.supports(op), op, self.as_preview())?.preview())
    }

    pub fn content_text(&self) -> Result<&str> {
        let op = Operation::GetContentText;
        Ok(gate(self.supports(op), op, self.as_read_body())?.content_text())
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) -> Result<()> {
        let op = Operation::SetSubject;
        let supported = self.supports(op);
        gate(supported, op, self.as_write_headers())?.set_subject(subject.into());
        Ok(())
    }

    pub fn set_from(&mut self, from: EmailAddress) -> Result<()> {
        let op = Operation::SetFrom;
        let supported = self.supports(op);
        gate(supported, op, self.as_write_headers())?.set_from(from);
        Ok(())
    }

    pub fn add_to(&mut self, to: EmailAddress) -> Result<()> {
        let op = Operation::AddTo;
        let supported = self.supports(op);
        gate(supported, op, self.as_write_recipients())?.add_to(to);
        Ok(())
    }

    pub fn add_cc(&mut self, cc: EmailAddress) -> Result<()> {
        let op = Operation::AddCc;
        let supported = self.supports(op);
        gate(supported, op, self.as_write_recipients())?.add_cc(cc);
        Ok(())
    }

    pub fn add_bcc(&mut self, bcc: EmailAddress) -> Result<()> {
        let op = Operation::AddBcc;
        let supported = self.supports(op);
        gate(supported, op, self.as_write_recipients())?.add_bcc(bcc);
        Ok(())
    }

    pub fn set_content_text(&mut self, content_text: impl Into<String>) -> Result<()> {
        let op = Operation::SetContentText;
        let supported = self.supports(op);
        gate(supported, op, self.as_write_body())?.set_content_text(content_text.into());
        Ok(())
    }
}
