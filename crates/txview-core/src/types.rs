//! Basic types for the transaction model

use serde::{Deserialize, Serialize};

/// Transaction status
///
/// Only `Authorization` (a pending hold) may be deleted. Statuses the
/// engine does not know are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionStatus {
    /// Pending authorization hold
    Authorization,
    /// Settled transaction
    Settled,
    /// Any other terminal state reported by the source
    Other(String),
}

impl TransactionStatus {
    /// Whether the deletion workflow accepts this status
    pub fn is_deletable(&self) -> bool {
        matches!(self, TransactionStatus::Authorization)
    }
}

impl From<String> for TransactionStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "authorization" => TransactionStatus::Authorization,
            "settled" => TransactionStatus::Settled,
            _ => TransactionStatus::Other(s),
        }
    }
}

impl From<TransactionStatus> for String {
    fn from(status: TransactionStatus) -> Self {
        status.to_string()
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("Empty transaction status".to_string());
        }
        Ok(TransactionStatus::from(s.to_string()))
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Authorization => write!(f, "authorization"),
            TransactionStatus::Settled => write!(f, "settled"),
            TransactionStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Soft-delete marker as delivered by the source
///
/// The source encodes the flag inconsistently (booleans, `"true"`, `"1"`,
/// arbitrary strings), so the raw value is kept and interpreted only by
/// [`DeletedFlag::is_deleted`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeletedFlag {
    /// Field missing or `null`
    #[default]
    Absent,
    /// Boolean encoding
    Flag(bool),
    /// Numeric encoding
    Number(f64),
    /// String encoding
    Text(String),
}

impl DeletedFlag {
    /// Truthiness of the marker: `true`, any non-zero number, any non-empty
    /// string.
    pub fn is_deleted(&self) -> bool {
        match self {
            DeletedFlag::Absent => false,
            DeletedFlag::Flag(flag) => *flag,
            DeletedFlag::Number(n) => *n != 0.0 && !n.is_nan(),
            DeletedFlag::Text(s) => !s.is_empty(),
        }
    }
}

/// Single normalizing predicate for the soft-delete marker
pub fn is_deleted(flag: &DeletedFlag) -> bool {
    flag.is_deleted()
}
