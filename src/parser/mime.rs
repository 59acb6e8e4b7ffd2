//! MIME message decoding: headers, plain-text body and preview extraction.

use chrono::{DateTime, Utc};
use mail_parser::{MessageParser, PartType};
use tracing::debug;

use crate::error::{MailError, Result};
use crate::model::address::EmailAddress;
use crate::variant::parsed::ParsedMessage;

/// Preview length used when the caller has no configured value.
pub const DEFAULT_PREVIEW_CHARS: usize = 100;

/// Decode a complete raw message (headers + body) into a [`ParsedMessage`].
///
/// `source_name` identifies the input in errors. The message must carry a
/// `From:` address and a valid `Date:`; otherwise no message is produced.
pub fn parse_message(raw: &[u8], source_name: &str, preview_chars: usize) -> Result<ParsedMessage> {
    let bytes = skip_from_line(raw);
    let parse_error = |reason: &str| MailError::Parse {
        source_name: source_name.to_string(),
        reason: reason.to_string(),
    };

    let msg = MessageParser::default()
        .parse(bytes)
        .ok_or_else(|| parse_error("not an RFC 5322 message"))?;

    let from = msg
        .from()
        .and_then(|a| a.first())
        .and_then(convert_addr)
        .ok_or_else(|| parse_error("missing From address"))?;

    let send_date = msg
        .date()
        .and_then(|d| DateTime::<Utc>::from_timestamp(d.to_timestamp(), 0))
        .ok_or_else(|| parse_error("missing or invalid Date header"))?;

    let content_text = body_text(&msg);

    let preview = make_preview(&content_text, preview_chars);

    debug!(
        source = source_name,
        body_chars = content_text.chars().count(),
        "Parsed message"
    );

    Ok(ParsedMessage {
        subject: msg.subject().unwrap_or_default().to_string(),
        from,
        send_date,
        to: convert_list(msg.to()),
        cc: convert_list(msg.cc()),
        content_text,
        preview,
        message_id: msg.message_id().map(str::to_string),
    })
}

/// The first `text/plain` body part, or the first HTML part converted to text.
///
/// mail-parser's own `body_text` renders HTML-only bodies itself and keeps the
/// contents of `<style>` and `<script>`, so the part type is checked here.
fn body_text(msg: &mail_parser::Message<'_>) -> String {
    let first_text = msg
        .text_body
        .first()
        .and_then(|&id| msg.parts.get(id as usize));
    match first_text.map(|part| &part.body) {
        Some(PartType::Text(text)) => text.to_string(),
        Some(PartType::Html(html)) => html_to_text(html),
        _ => msg
            .body_html(0)
            .map(|html| html_to_text(&html))
            .unwrap_or_default(),
    }
}

fn convert_addr(addr: &mail_parser::Addr<'_>) -> Option<EmailAddress> {
    let address = addr.address.as_deref()?.trim();
    if address.is_empty() {
        return None;
    }
    Some(EmailAddress::with_name(
        addr.name.as_deref().unwrap_or_default(),
        address,
    ))
}

/// Flatten an address header, including group members, into a list.
fn convert_list(header: Option<&mail_parser::Address<'_>>) -> Vec<EmailAddress> {
    match header {
        Some(mail_parser::Address::List(list)) => list.iter().filter_map(convert_addr).collect(),
        Some(mail_parser::Address::Group(groups)) => groups
            .iter()
            .flat_map(|g| g.addresses.iter())
            .filter_map(convert_addr)
            .collect(),
        None => Vec::new(),
    }
}

/// Collapse whitespace and cut to at most `max_chars` characters.
///
/// A cut preview ends in `…`, which counts towards `max_chars`. Returns `None`
/// for an empty body or a zero length.
pub fn make_preview(text: &str, max_chars: usize) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() || max_chars == 0 {
        return None;
    }
    if collapsed.chars().count() <= max_chars {
        return Some(collapsed);
    }
    let mut cut: String = collapsed.chars().take(max_chars - 1).collect();
    cut.push('…');
    Some(cut)
}

/// Skip an mbox `From ` separator line (and a UTF-8 BOM) at the start of the data.
fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}

/// Convert an HTML body to plain text.
///
/// Block-level tags become line breaks, `<script>` and `<style>` blocks are
/// dropped with their contents, and entities are decoded in a single pass.
pub fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(lt) = rest.find('<') {
        text.push_str(&rest[..lt]);
        let Some(gt) = rest[lt..].find('>') else {
            rest = "";
            break;
        };
        let tag = &rest[lt + 1..lt + gt];
        rest = &rest[lt + gt + 1..];

        let name = tag_name(tag);
        if !tag.starts_with('/') && matches!(name.as_str(), "script" | "style") {
            rest = skip_block(rest, &name);
        } else if LINE_BREAK_TAGS.contains(&name.as_str()) {
            text.push('\n');
        }
    }
    text.push_str(rest);

    // Trim every line and keep at most one blank line between paragraphs.
    let decoded = decode_entities(&text);
    let mut lines: Vec<&str> = Vec::new();
    for line in decoded.lines().map(str::trim) {
        if line.is_empty() && lines.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    lines.join("\n").trim_end().to_string()
}

const LINE_BREAK_TAGS: &[&str] = &[
    "br", "p", "div", "tr", "li", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Lowercased element name of a tag body such as `/P` or `br /`.
fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Skip past the closing tag of `name`, or to the end if it is never closed.
fn skip_block<'a>(html: &'a str, name: &str) -> &'a str {
    let close = format!("</{name}");
    // ASCII lowercasing keeps byte offsets valid for `html`.
    let Some(start) = html.to_ascii_lowercase().find(&close) else {
        return "";
    };
    match html[start..].find('>') {
        Some(gt) => &html[start + gt + 1..],
        None => "",
    }
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| entity(&rest[1..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = name.strip_prefix('#')?;
            let code = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            match char::from_u32(code)? {
                '\u{a0}' => Some(' '),
                ch => Some(ch),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::message::Message;

    const SIMPLE: &[u8] = b"From: Jane Doe <jane@example.com>\r\n\
To: j.smith@example.com, \"Last, First\" <lf@example.com>\r\n\
Cc: team: ann@example.com, bob@example.com;\r\n\
Subject: Hello\r\n\
Date: Sat, 14 Mar 2009 09:26:53 +0000\r\n\
Message-ID: <msg001@example.com>\r\n\
\r\n\
Hi there,\r\n\
   just checking in.\r\n";

    #[test]
    fn test_parse_simple_message() {
        let msg = parse_message(SIMPLE, "simple", DEFAULT_PREVIEW_CHARS).expect("parse");
        assert_eq!(msg.subject(), "Hello");
        assert_eq!(Message::from(&msg).display_name(), Some("Jane Doe"));
        assert_eq!(msg.send_date().to_rfc3339(), "2009-03-14T09:26:53+00:00");
        assert_eq!(msg.to.len(), 2);
        assert_eq!(msg.to[1].display_name(), Some("Last, First"));
        assert_eq!(msg.message_id(), Some("msg001@example.com"));
        assert!(msg.content_text.contains("just checking in."));
        assert_eq!(msg.preview.as_deref(), Some("Hi there, just checking in."));
    }

    #[test]
    fn test_group_members_are_flattened() {
        let msg = parse_message(SIMPLE, "simple", DEFAULT_PREVIEW_CHARS).expect("parse");
        let cc: Vec<_> = msg.cc.iter().map(EmailAddress::address).collect();
        assert_eq!(cc, vec!["ann@example.com", "bob@example.com"]);
    }

    #[test]
    fn test_missing_from_is_rejected() {
        let raw = b"Subject: Orphan\r\nDate: Sat, 14 Mar 2009 09:26:53 +0000\r\n\r\nBody\r\n";
        let err = parse_message(raw, "orphan.eml", 100).unwrap_err();
        assert!(matches!(err, MailError::Parse { .. }));
        assert!(err.to_string().contains("orphan.eml"));
        assert!(err.to_string().contains("From"));
    }

    #[test]
    fn test_missing_date_is_rejected() {
        let raw = b"From: a@example.com\r\nSubject: Undated\r\n\r\nBody\r\n";
        let err = parse_message(raw, "undated", 100).unwrap_err();
        assert!(err.to_string().contains("Date"));
    }

    #[test]
    fn test_html_only_body_is_converted() {
        let raw = b"From: a@example.com\r\n\
Date: Sat, 14 Mar 2009 09:26:53 +0000\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<p>Hello <b>world</b></p><p>Tom &amp; Jerry</p>\r\n";
        let msg = parse_message(raw, "html", 100).expect("parse");
        assert!(msg.content_text.contains("Hello world"));
        assert!(msg.content_text.contains("Tom & Jerry"));
        assert!(!msg.content_text.contains("<p>"));
    }

    #[test]
    fn test_mbox_separator_is_skipped() {
        let mut raw = b"From jane@example.com Sat Mar 14 09:26:53 2009\n".to_vec();
        raw.extend_from_slice(SIMPLE);
        let msg = parse_message(&raw, "mbox", 100).expect("parse");
        assert_eq!(msg.subject(), "Hello");
    }

    #[test]
    fn test_make_preview() {
        assert_eq!(make_preview("  a\n\n b  ", 10).as_deref(), Some("a b"));
        assert_eq!(make_preview("abcdef", 3).as_deref(), Some("ab…"));
        assert_eq!(make_preview("abcdef", 1).as_deref(), Some("…"));
        assert_eq!(make_preview("abc", 3).as_deref(), Some("abc"));
        assert_eq!(make_preview("   ", 10), None);
        assert_eq!(make_preview("abc", 0), None);
    }

    #[test]
    fn test_html_to_text_entities() {
        assert_eq!(html_to_text("Tom &amp; Jerry &lt;3&gt;"), "Tom & Jerry <3>");
        assert_eq!(html_to_text("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_preview_never_exceeds_limit() {
        let text = "word ".repeat(100);
        for max in [1, 2, 10, 99] {
            let preview = make_preview(&text, max).expect("preview");
            assert_eq!(preview.chars().count(), max);
        }
    }

    #[test]
    fn test_html_to_text_drops_script_and_style() {
        let html = "<style>p{color:red}</style><p>Tom &amp; Jerry</p><script>evil()</script>";
        assert_eq!(html_to_text(html), "Tom & Jerry");
        assert_eq!(html_to_text("Café<STYLE>p{}</Style >señor"), "Caféseñor");
        assert_eq!(html_to_text("a<br/>b<BR />c"), "a\nb\nc");
        assert_eq!(html_to_text("x &#233;&#xE9; &bogus; y"), "x éé &bogus; y");
    }

    #[test]
    fn test_html_only_message_drops_script_and_style() {
        let raw = b"From: a@example.com\r\n\
Date: Sat, 14 Mar 2009 09:26:53 +0000\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<style>p{color:red}</style><p>Tom &amp; Jerry</p><script>evil()</script>\r\n";
        let msg = parse_message(raw, "html", 100).expect("parse");
        assert_eq!(msg.content_text, "Tom & Jerry");
        assert_eq!(msg.preview.as_deref(), Some("Tom & Jerry"));
    }

    #[test]
    fn test_plain_part_preferred_over_html() {
        let raw = b"From: a@example.com\r\n\
Date: Sat, 14 Mar 2009 09:26:53 +0000\r\n\
Content-Type: multipart/alternative; boundary=\"b\"\r\n\
\r\n\
--b\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Plain version\r\n\
--b\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<p>HTML version</p>\r\n\
--b--\r\n";
        let msg = parse_message(raw, "alt", 100).expect("parse");
        assert!(msg.content_text.contains("Plain version"));
        assert!(!msg.content_text.contains("HTML version"));
    }
}
