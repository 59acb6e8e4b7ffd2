//! Local mailbox backed by directories of `.eml` files.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{MailError, Result};
use crate::mailbox::{Delivery, MailboxReader, MailboxSender};
use crate::model::message::Message;
use crate::parser::eml;
use crate::variant::compose::{ComposeMessage, Outgoing};

/// Reads every `.eml` file in a directory (not recursive).
#[derive(Debug, Clone)]
pub struct EmlDirectoryReader {
    dir: PathBuf,
    preview_chars: usize,
    strict: bool,
}

impl EmlDirectoryReader {
    pub fn new(dir: impl Into<PathBuf>, preview_chars: usize) -> Self {
        Self {
            dir: dir.into(),
            preview_chars,
            strict: false,
        }
    }

    /// Fail on the first unparseable file instead of skipping it.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MailboxReader for EmlDirectoryReader {
    /// Messages sorted newest first.
    fn messages(&self) -> Result<Vec<Box<dyn Message>>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MailError::FileNotFound(self.dir.clone())
            } else {
                MailError::io(&self.dir, e)
            }
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| MailError::io(&self.dir, e))?.path();
            if path.is_file() && eml::is_eml_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut messages: Vec<Box<dyn Message>> = Vec::with_capacity(paths.len());
        for path in &paths {
            match eml::parse_eml(path, self.preview_chars) {
                Ok(msg) => messages.push(Box::new(msg)),
                Err(e) if !self.strict => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable message");
                }
                Err(e) => return Err(e),
            }
        }

        messages.sort_by_key(|m| std::cmp::Reverse(m.send_date()));
        debug!(dir = %self.dir.display(), count = messages.len(), "Read mailbox");
        Ok(messages)
    }
}

/// "Sends" mail by writing it as an `.eml` file into an outbox directory.
#[derive(Debug, Clone)]
pub struct SpoolSender {
    outbox: PathBuf,
}

impl SpoolSender {
    pub fn new(outbox: impl Into<PathBuf>) -> Self {
        Self {
            outbox: outbox.into(),
        }
    }

    pub fn outbox(&self) -> &Path {
        &self.outbox
    }
}

impl MailboxSender for SpoolSender {
    fn send(&self, message: ComposeMessage) -> Result<Delivery> {
        let outgoing = message.into_outgoing();
        outgoing.validate()?;

        std::fs::create_dir_all(&self.outbox).map_err(|e| MailError::io(&self.outbox, e))?;
        let path = unique_path(&self.outbox, &spool_filename(&outgoing));
        std::fs::write(&path, outgoing.render()).map_err(|e| MailError::io(&path, e))?;

        let recipients: Vec<_> = outgoing.recipients().cloned().collect();
        info!(
            path = %path.display(),
            recipients = recipients.len(),
            "Spooled message"
        );
        Ok(Delivery {
            recipients,
            location: Some(path),
        })
    }
}

/// Generate a sanitized filename for a spooled message.
///
/// Format: `{date}_{first recipient}_{subject}.eml`, truncated to 200 chars.
fn spool_filename(outgoing: &Outgoing) -> String {
    let date = outgoing.date.format("%Y%m%d_%H%M%S").to_string();
    let to = outgoing
        .recipients()
        .next()
        .map(|a| sanitize_filename_part(a.address(), 30))
        .unwrap_or_else(|| "unknown".to_string());
    let subject = sanitize_filename_part(&outgoing.subject, 80);

    let name = format!("{date}_{to}_{subject}");
    let name: String = name.chars().take(196).collect();
    format!("{name}.eml")
}

/// Append `-1`, `-2`, … before the extension until the name is free.
fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }
    let stem = filename.trim_end_matches(".eml");
    (1..)
        .map(|n| dir.join(format!("{stem}-{n}.eml")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Sanitize a string for use in filenames.
///
/// Replaces invalid characters with `_` and truncates to `max_len`.
pub fn sanitize_filename_part(s: &str, max_len: usize) -> String {
    let sanitized: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '@' {
                c
            } else {
                '_'
            }
        })
        .take(max_len)
        .collect();

    if sanitized.is_empty() {
        "unknown".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::address::EmailAddress;
    use crate::model::message::{WriteBody, WriteHeaders, WriteRecipients};
    use chrono::{TimeZone, Utc};

    fn ready() -> ComposeMessage {
        let mut msg = ComposeMessage::at(
            EmailAddress::new("me@example.com"),
            Utc.with_ymd_and_hms(2009, 3, 14, 9, 26, 53).unwrap(),
        );
        msg.set_subject("Status / update".into());
        msg.set_content_text("All good".into());
        msg.add_to(EmailAddress::new("j.smith@example.com"));
        msg
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename_part("hello world", 20), "hello_world");
        assert_eq!(sanitize_filename_part("a/b\\c:d*e", 20), "a_b_c_d_e");
        assert_eq!(sanitize_filename_part("", 20), "unknown");
    }

    #[test]
    fn test_spool_filename() {
        let name = spool_filename(&ready().into_outgoing());
        assert_eq!(name, "20090314_092653_j.smith@example.com_Status___update.eml");
    }

    #[test]
    fn test_send_writes_unique_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sender = SpoolSender::new(dir.path().join("outbox"));

        let first = sender.send(ready()).expect("send");
        let second = sender.send(ready()).expect("send again");

        let first = first.location.expect("location");
        let second = second.location.expect("location");
        assert_ne!(first, second);
        assert!(second.to_string_lossy().ends_with("-1.eml"));
    }

    #[test]
    fn test_send_rejects_incomplete() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sender = SpoolSender::new(dir.path());
        let msg = ComposeMessage::new(EmailAddress::new("me@example.com"));
        assert!(matches!(sender.send(msg), Err(MailError::Incomplete(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_reader_missing_dir() {
        let reader = EmlDirectoryReader::new("/nonexistent/inbox", 100);
        assert!(matches!(reader.messages(), Err(MailError::FileNotFound(_))));
    }
}
