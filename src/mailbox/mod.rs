//! Mailbox boundary: producers and consumers of [`Message`] values.
//!
//! Readers return finite snapshots; calling [`MailboxReader::messages`] again
//! re-reads the source. Senders take ownership of a composed message and
//! report the outcome of delivery.

pub mod spool;

use std::path::PathBuf;

use crate::error::Result;
use crate::model::address::EmailAddress;
use crate::model::message::Message;
use crate::variant::compose::ComposeMessage;

/// Produces the messages currently in a mailbox.
pub trait MailboxReader {
    fn messages(&self) -> Result<Vec<Box<dyn Message>>>;
}

/// Delivers composed messages.
pub trait MailboxSender {
    /// Deliver `message`. Fails with [`crate::MailError::Incomplete`] when the
    /// message lacks a subject, a body or any recipient.
    fn send(&self, message: ComposeMessage) -> Result<Delivery>;
}

/// Outcome of a successful delivery.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Delivery {
    /// Every envelope recipient, Bcc included.
    pub recipients: Vec<EmailAddress>,
    /// Where the message ended up, if the sender stores it locally.
    pub location: Option<PathBuf>,
}
