use std::error::Error;

use serde::{Deserialize, Serialize};

use crate::status::{HasStatus, StatusClass};

/// Flattened, serializable view of an error and its causes.
///
/// Hosts receive this instead of the typed error: a human message, the
/// numeric status class, and the messages of every wrapped cause, outermost
/// first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ChainError {
    pub message: String,
    pub status: u16,
    pub causes: Vec<String>,
}

impl ChainError {
    /// Build from any error carrying a status class.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: Error + HasStatus + 'static,
    {
        let mut chain = error_chain(err);
        let message = chain.remove(0);
        Self {
            message,
            status: err.status().code(),
            causes: chain,
        }
    }

    /// The status class of this error.
    pub fn status_class(&self) -> StatusClass {
        StatusClass::from_code(self.status)
    }
}

/// Collect the display messages of `err` and every `source()` below it.
pub fn error_chain(err: &(dyn Error + 'static)) -> Vec<String> {
    let mut messages = vec![err.to_string()];
    let mut current = err.source();
    while let Some(cause) = current {
        messages.push(cause.to_string());
        current = cause.source();
    }
    messages
}
