//! Email address values (RFC 5322 §3.4).

use std::hash::{Hash, Hasher};

/// An email address with an optional display name.
///
/// Two addresses are equal when their `address` parts are equal; the display
/// name is presentation only.
///
/// # Examples
/// - `"Jane Doe <jane@example.com>"` → `display_name = Some("Jane Doe")`, `address = "jane@example.com"`
/// - `"jane@example.com"` → `display_name = None`, `address = "jane@example.com"`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EmailAddress {
    /// Human-readable display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    /// The bare email address (`user@domain`).
    address: String,
}

impl EmailAddress {
    /// An address without a display name.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            display_name: None,
            address: address.into().trim().to_string(),
        }
    }

    /// An address with a display name. An empty name is stored as `None`.
    pub fn with_name(display_name: impl Into<String>, address: impl Into<String>) -> Self {
        let name = display_name.into();
        let name = name.trim();
        Self {
            display_name: (!name.is_empty()).then(|| name.to_string()),
            address: address.into().trim().to_string(),
        }
    }

    /// The display name, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// The bare address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Parse a single email address from a header value.
    ///
    /// Supported formats:
    /// - `"user@domain.com"`
    /// - `"<user@domain.com>"`
    /// - `"Display Name <user@domain.com>"`
    /// - `"\"Display, Name\" <user@domain.com>"`
    ///
    /// If no angle brackets are found, the trimmed input is the address.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Some(angle_start) = trimmed.rfind('<') {
            if let Some(angle_end) = trimmed.rfind('>') {
                if angle_end > angle_start {
                    let addr = trimmed[angle_start + 1..angle_end].trim();
                    let name_part = strip_quotes(&trimmed[..angle_start]);
                    return Self::with_name(name_part, addr);
                }
            }
        }

        Self::new(trimmed)
    }

    /// Parse a comma-separated list of addresses, skipping empty entries.
    ///
    /// Handles quoted commas: `"Last, First" <a@b.com>, other@c.com`
    pub fn parse_list(raw: &str) -> Vec<Self> {
        let mut results = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut in_angle = false;

        for ch in raw.chars() {
            match ch {
                '"' => {
                    in_quotes = !in_quotes;
                    current.push(ch);
                }
                '<' if !in_quotes => {
                    in_angle = true;
                    current.push(ch);
                }
                '>' if !in_quotes => {
                    in_angle = false;
                    current.push(ch);
                }
                ',' if !in_quotes && !in_angle => {
                    let addr = Self::parse(&current);
                    if !addr.address.is_empty() {
                        results.push(addr);
                    }
                    current.clear();
                }
                _ => current.push(ch),
            }
        }

        let addr = Self::parse(&current);
        if !addr.address.is_empty() {
            results.push(addr);
        }

        results
    }

    /// `true` if the address has the `local@domain` shape.
    pub fn is_well_formed(&self) -> bool {
        match self.address.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !self.address.chars().any(char::is_whitespace)
            }
            None => false,
        }
    }
}

/// Strip surrounding double-quotes and trim whitespace.
fn strip_quotes(s: &str) -> &str {
    let trimmed = s.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

impl PartialEq for EmailAddress {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for EmailAddress {}

impl Hash for EmailAddress {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}

impl std::str::FromStr for EmailAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.display_name {
            Some(name) if name.contains(',') || name.contains('"') => {
                write!(f, "\"{}\" <{}>", name.replace('"', "\\\""), self.address)
            }
            Some(name) => write!(f, "{} <{}>", name, self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parse_bare_address() {
        let addr = EmailAddress::parse("user@example.com");
        assert_eq!(addr.address(), "user@example.com");
        assert_eq!(addr.display_name(), None);
    }

    #[test]
    fn test_parse_angle_address() {
        let addr = EmailAddress::parse("<user@example.com>");
        assert_eq!(addr.address(), "user@example.com");
        assert_eq!(addr.display_name(), None);
    }

    #[test]
    fn test_parse_name_and_address() {
        let addr = EmailAddress::parse("Jane Doe <jane@example.com>");
        assert_eq!(addr.address(), "jane@example.com");
        assert_eq!(addr.display_name(), Some("Jane Doe"));
    }

    #[test]
    fn test_parse_quoted_name() {
        let addr = EmailAddress::parse("\"Smith, John\" <j.smith@example.com>");
        assert_eq!(addr.address(), "j.smith@example.com");
        assert_eq!(addr.display_name(), Some("Smith, John"));
    }

    #[test]
    fn test_parse_list_with_quoted_comma() {
        let list = EmailAddress::parse_list("\"Smith, John\" <a@b.com>, , other@c.com");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].display_name(), Some("Smith, John"));
        assert_eq!(list[1].address(), "other@c.com");
    }

    #[test]
    fn test_equality_ignores_display_name() {
        let a = EmailAddress::with_name("Jane", "jane@example.com");
        let b = EmailAddress::with_name("J. Doe", "jane@example.com");
        let c = EmailAddress::new("jane@example.com");
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_ne!(a, EmailAddress::new("john@example.com"));

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_empty_name_is_none() {
        let addr = EmailAddress::with_name("  ", "a@b.com");
        assert_eq!(addr.display_name(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            EmailAddress::with_name("Alice", "alice@example.com").to_string(),
            "Alice <alice@example.com>"
        );
        assert_eq!(
            EmailAddress::new("alice@example.com").to_string(),
            "alice@example.com"
        );
        assert_eq!(
            EmailAddress::with_name("Smith, John", "j@example.com").to_string(),
            "\"Smith, John\" <j@example.com>"
        );
    }

    #[test]
    fn test_well_formed() {
        assert!(EmailAddress::new("a@b.com").is_well_formed());
        assert!(!EmailAddress::new("a.b.com").is_well_formed());
        assert!(!EmailAddress::new("@b.com").is_well_formed());
        assert!(!EmailAddress::new("a@").is_well_formed());
        assert!(!EmailAddress::new("a b@c.com").is_well_formed());
    }

    #[test]
    fn test_serde_omits_missing_name() {
        let json = serde_json::to_string(&EmailAddress::new("a@b.com")).expect("serialize");
        assert_eq!(json, r#"{"address":"a@b.com"}"#);
        let back: EmailAddress = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.display_name(), None);
    }
}
