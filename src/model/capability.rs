//! Optional operations and the capability sets variants declare.

use std::fmt;

/// One optional operation of the message model.
///
/// Mandatory operations (`subject`, `send_date`, `from`) are not listed: every
/// variant provides them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum Operation {
    GetTo,
    GetCc,
    GetLink,
    GetPreview,
    GetContentText,
    SetSubject,
    SetFrom,
    AddTo,
    AddCc,
    AddBcc,
    SetContentText,
}

impl Operation {
    /// Every optional operation, reads first.
    pub const ALL: [Operation; 11] = [
        Operation::GetTo,
        Operation::GetCc,
        Operation::GetLink,
        Operation::GetPreview,
        Operation::GetContentText,
        Operation::SetSubject,
        Operation::SetFrom,
        Operation::AddTo,
        Operation::AddCc,
        Operation::AddBcc,
        Operation::SetContentText,
    ];

    /// Stable operation name used in error messages and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            Operation::GetTo => "getTo()",
            Operation::GetCc => "getCc()",
            Operation::GetLink => "getLink()",
            Operation::GetPreview => "getPreview()",
            Operation::GetContentText => "getContentText()",
            Operation::SetSubject => "setSubject()",
            Operation::SetFrom => "setFrom()",
            Operation::AddTo => "addTo()",
            Operation::AddCc => "addCc()",
            Operation::AddBcc => "addBcc()",
            Operation::SetContentText => "setContentText()",
        }
    }

    /// `true` for accessors, `false` for mutators.
    pub fn is_read(self) -> bool {
        matches!(
            self,
            Operation::GetTo
                | Operation::GetCc
                | Operation::GetLink
                | Operation::GetPreview
                | Operation::GetContentText
        )
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of supported [`Operation`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(u16);

impl Capabilities {
    /// The empty set.
    pub const NONE: Capabilities = Capabilities(0);

    /// Add `op` to the set.
    #[must_use]
    pub const fn with(self, op: Operation) -> Self {
        Self(self.0 | op.bit())
    }

    /// `true` if `op` is in the set.
    pub const fn contains(self, op: Operation) -> bool {
        self.0 & op.bit() != 0
    }

    /// Supported operations in [`Operation::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = Operation> {
        Operation::ALL.into_iter().filter(move |&op| self.contains(op))
    }

    /// `true` if the set has no write operations.
    pub fn is_read_only(self) -> bool {
        self.iter().all(Operation::is_read)
    }
}

impl FromIterator<Operation> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        iter.into_iter().fold(Capabilities::NONE, Capabilities::with)
    }
}
