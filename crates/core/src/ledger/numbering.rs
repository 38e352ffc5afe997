//! Human-readable document numbers (`ORD-20260115-1A2B3C4D`).

use chrono::NaiveDate;
use uuid::Uuid;

/// Kind of numbered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Customer order.
    Order,
    /// Invoice.
    Invoice,
}

impl DocumentKind {
    /// Number prefix.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Order => "ORD",
            Self::Invoice => "INV",
        }
    }
}

/// Builds `PREFIX-YYYYMMDD-XXXXXXXX` from the first 8 hex digits of `token`.
///
/// Callers pass a random (v4) token; uniqueness is finally enforced by the
/// database.
#[must_use]
pub fn document_number(kind: DocumentKind, date: NaiveDate, token: Uuid) -> String {
    let simple = token.simple().to_string().to_uppercase();
    format!("{}-{}-{}", kind.prefix(), date.format("%Y%m%d"), &simple[..8])
}
