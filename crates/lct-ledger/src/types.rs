use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a backend stores private data.
///
/// The mode is a property of the backend, read by callers that need to
/// decide how to prove private existence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerMode {
    /// Testing backend: private values are stored and readable as-is.
    #[default]
    Direct,
    /// Production backend: only a hash of each private value is guaranteed
    /// to be visible; the value lives in a separate private store.
    Production,
}

impl LedgerMode {
    pub fn is_direct(self) -> bool {
        matches!(self, Self::Direct)
    }
}

/// One entry returned by a range or prefix scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One modification of a key, as recorded by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Transaction that wrote (or deleted) the key.
    pub tx_id: String,
    /// Timestamp of that transaction.
    pub timestamp: DateTime<Utc>,
    /// `true` if the transaction deleted the key.
    pub is_delete: bool,
    /// Value written; empty for deletions.
    pub value: Vec<u8>,
}

/// Smallest string greater than every string starting with `prefix`.
///
/// Returns an empty string (an open upper bound) when no such string exists
/// or `prefix` is empty.
pub fn prefix_end(prefix: &str) -> String {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        let mut next = last as u32 + 1;
        // Skip the surrogate gap.
        if (0xD800..=0xDFFF).contains(&next) {
            next = 0xE000;
        }
        if let Some(c) = char::from_u32(next) {
            chars.push(c);
            return chars.into_iter().collect();
        }
    }
    String::new()
}
