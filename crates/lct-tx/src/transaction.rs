//! Transaction definitions.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::argument::Argument;
use crate::dispatch::TxContext;
use crate::error::TxResult;
use crate::value::Args;

/// Business logic of a transaction. Receives only validated arguments and
/// returns the serialized result.
pub type Routine = Arc<dyn Fn(&TxContext<'_>, &Args) -> TxResult<Vec<u8>> + Send + Sync>;

/// Invocation method of a transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

/// An immutable transaction definition.
#[derive(Clone)]
pub struct Transaction {
    pub tag: String,
    pub label: String,
    pub description: String,
    pub method: Method,
    /// Framework metadata transaction, as opposed to business logic.
    pub meta_tx: bool,
    /// Declared read-only. Consumed by hosts; not enforced by dispatch.
    pub read_only: bool,
    pub args: Vec<Argument>,
    pub routine: Routine,
}

impl Transaction {
    pub fn new<F>(tag: impl Into<String>, routine: F) -> Self
    where
        F: Fn(&TxContext<'_>, &Args) -> TxResult<Vec<u8>> + Send + Sync + 'static,
    {
        Self {
            tag: tag.into(),
            label: String::new(),
            description: String::new(),
            method: Method::Post,
            meta_tx: false,
            read_only: false,
            args: Vec::new(),
            routine: Arc::new(routine),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta_tx = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn arg(mut self, arg: Argument) -> Self {
        self.args.push(arg);
        self
    }

    /// Serializable view without the routine.
    pub fn descriptor(&self) -> TxDescriptor {
        TxDescriptor {
            tag: self.tag.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            method: self.method,
            meta_tx: self.meta_tx,
            read_only: self.read_only,
            args: self.args.clone(),
        }
    }

    pub fn summary(&self) -> TxSummary {
        TxSummary {
            tag: self.tag.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
        }
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("tag", &self.tag)
            .field("method", &self.method)
            .field("meta_tx", &self.meta_tx)
            .field("read_only", &self.read_only)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Full description of a transaction, as returned by `getTx`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxDescriptor {
    pub tag: String,
    pub label: String,
    pub description: String,
    pub method: Method,
    pub meta_tx: bool,
    pub read_only: bool,
    pub args: Vec<Argument>,
}

/// Listing entry for a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSummary {
    pub tag: String,
    pub label: String,
    pub description: String,
}
