//! Serializable snapshot of a message's readable fields.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{MailError, Result};
use crate::model::address::EmailAddress;
use crate::model::capability::Operation;
use crate::model::message::Message;

/// Outcome of one optional read: the value, or a record that the variant
/// cannot supply it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Field<T> {
    Value(T),
    Unsupported,
}

impl<T> Field<T> {
    /// Fold an optional read into a field. Errors other than `Unsupported`
    /// are propagated.
    fn from_read(read: Result<T>) -> Result<Self> {
        match read {
            Ok(value) => Ok(Field::Value(value)),
            Err(MailError::Unsupported { .. }) => Ok(Field::Unsupported),
            Err(e) => Err(e),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            Field::Unsupported => None,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Field::Unsupported)
    }
}

/// Every readable field of a message, with unsupported reads recorded as such.
#[derive(Debug, Clone, Serialize)]
pub struct MessageSummary {
    pub subject: String,
    pub send_date: DateTime<Utc>,
    pub from: EmailAddress,
    pub to: Field<Vec<EmailAddress>>,
    pub cc: Field<Vec<EmailAddress>>,
    pub link: Field<Option<String>>,
    pub preview: Field<Option<String>>,
    pub content_text: Field<String>,
    /// Names of all supported optional operations, reads and writes.
    pub capabilities: Vec<&'static str>,
}

impl MessageSummary {
    /// Read every field of `message`.
    pub fn of(message: &dyn Message) -> Result<Self> {
        Ok(Self {
            subject: message.subject().to_string(),
            send_date: message.send_date(),
            from: message.from().clone(),
            to: Field::from_read(message.to().map(<[EmailAddress]>::to_vec))?,
            cc: Field::from_read(message.cc().map(<[EmailAddress]>::to_vec))?,
            link: Field::from_read(message.link().map(|l| l.map(|u| u.to_string())))?,
            preview: Field::from_read(message.preview().map(|p| p.map(str::to_string)))?,
            content_text: Field::from_read(message.content_text().map(str::to_string))?,
            capabilities: message.capabilities().iter().map(Operation::name).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_serializes_with_status_tag() {
        let supported: Field<Option<String>> = Field::Value(Some("x".into()));
        let missing: Field<Option<String>> = Field::Value(None);
        let unsupported: Field<Option<String>> = Field::Unsupported;

        assert_eq!(
            serde_json::to_value(&supported).expect("json"),
            serde_json::json!({"status": "value", "value": "x"})
        );
        assert_eq!(
            serde_json::to_value(&missing).expect("json"),
            serde_json::json!({"status": "value", "value": null})
        );
        assert_eq!(
            serde_json::to_value(&unsupported).expect("json"),
            serde_json::json!({"status": "unsupported"})
        );
    }

    #[test]
    fn test_from_read_propagates_other_errors() {
        let err: Result<Field<u8>> = Field::from_read(Err(MailError::Incomplete("x".into())));
        assert!(err.is_err());
        let unsupported = Field::<u8>::from_read(Err(MailError::unsupported(Operation::GetCc)))
            .expect("unsupported is a value");
        assert!(unsupported.is_unsupported());
    }
}
