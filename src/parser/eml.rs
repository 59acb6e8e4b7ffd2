//! Parser for individual `.eml` files (RFC 5322 messages without MBOX framing).

use std::path::Path;

use crate::error::{MailError, Result};
use crate::parser::mime;
use crate::variant::parsed::ParsedMessage;

/// Read and decode a single `.eml` file.
pub fn parse_eml(path: impl AsRef<Path>, preview_chars: usize) -> Result<ParsedMessage> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MailError::FileNotFound(path.to_path_buf())
        } else {
            MailError::io(path, e)
        }
    })?;

    mime::parse_message(&data, &path.display().to_string(), preview_chars)
}

/// `true` if the path has an `.eml` extension (case-insensitive).
pub fn is_eml_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"))
}
