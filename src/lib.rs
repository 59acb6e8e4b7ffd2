//! `webmail-model`: a capability-aware message model for webmail clients.
//!
//! Backends produce messages with different abilities: a feed entry knows its
//! link but not its recipients, a downloaded message knows its body but cannot
//! be edited, a compose buffer accepts writes. This crate gives them one
//! [`Message`] interface and reports unsupported operations as
//! [`MailError::Unsupported`] instead of empty values or silent no-ops.

pub mod config;
pub mod credentials;
pub mod error;
pub mod mailbox;
pub mod model;
pub mod parser;
pub mod variant;

pub use error::{MailError, Result};
pub use model::address::EmailAddress;
pub use model::capability::{Capabilities, Operation};
pub use model::message::Message;
