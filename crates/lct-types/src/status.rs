use std::fmt;

use serde::{Deserialize, Serialize};

/// Status class attached to every error that reaches a host.
///
/// The numeric codes follow HTTP conventions so hosts can forward them
/// without a translation table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusClass {
    /// The caller sent something malformed or unknown.
    BadRequest,
    /// The requested entity does not exist.
    NotFound,
    /// The contract or its ledger failed.
    Internal,
}

impl StatusClass {
    /// Numeric code for this class.
    pub const fn code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::Internal => 500,
        }
    }

    /// Returns `true` for classes caused by the caller.
    pub const fn is_client_fault(self) -> bool {
        matches!(self, Self::BadRequest | Self::NotFound)
    }

    /// Map a numeric code back to a class. Unknown codes are internal.
    pub const fn from_code(code: u16) -> Self {
        match code {
            404 => Self::NotFound,
            400..=499 => Self::BadRequest,
            _ => Self::Internal,
        }
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors that carry a status class.
pub trait HasStatus {
    fn status(&self) -> StatusClass;
}
