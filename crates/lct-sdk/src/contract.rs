//! The contract facade.

use std::sync::Arc;

use lct_assets::Schema;
use lct_ledger::{LedgerStub, MemoryLedger};
use lct_tx::{Dispatcher, Transaction, TxError, TxRegistry, TxSummary};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::ContractConfig;
use crate::error::{SdkError, SdkResult};

/// A ready-to-call contract: schema, transactions and configuration.
///
/// The contract owns no ledger; every call names the port it runs against,
/// so one contract can serve any number of ledgers concurrently.
#[derive(Clone, Debug)]
pub struct Contract {
    dispatcher: Dispatcher,
    config: ContractConfig,
}

impl Contract {
    /// Build the registry from `extra` plus the built-ins.
    pub fn new(
        schema: impl Into<Arc<Schema>>,
        extra: Vec<Transaction>,
        config: ContractConfig,
    ) -> SdkResult<Self> {
        let registry = TxRegistry::init(extra, schema.into())?;
        info!(
            contract = %config.dispatch.header.name,
            transactions = registry.len(),
            "contract ready"
        );
        Ok(Self {
            dispatcher: Dispatcher::new(Arc::new(registry), config.dispatch.clone()),
            config,
        })
    }

    /// Run a transaction and decode its output as JSON.
    ///
    /// An empty output decodes to `null`; output that is not JSON is
    /// returned as a string.
    pub fn invoke(&self, port: &dyn LedgerStub, tag: &str, args: &Value) -> SdkResult<Value> {
        let bytes = self.invoke_raw(port, tag, args)?;
        Ok(decode_output(&bytes))
    }

    /// Run a transaction and return its output bytes unchanged.
    pub fn invoke_raw(&self, port: &dyn LedgerStub, tag: &str, args: &Value) -> SdkResult<Vec<u8>> {
        self.dispatcher
            .dispatch_value(port, tag, args)
            .map_err(SdkError::from)
    }

    /// Like [`invoke`](Self::invoke), refusing transactions not declared
    /// read-only.
    pub fn query(&self, port: &dyn LedgerStub, tag: &str, args: &Value) -> SdkResult<Value> {
        let tx = self
            .dispatcher
            .registry()
            .lookup(tag)
            .ok_or_else(|| TxError::UnknownTransaction {
                tag: tag.to_string(),
            })?;
        if !tx.read_only {
            debug!(tx = tag, "query refused");
            return Err(SdkError::NotReadOnly {
                tag: tag.to_string(),
            });
        }
        self.invoke(port, tag, args)
    }

    pub fn transactions(&self) -> Vec<TxSummary> {
        self.dispatcher
            .registry()
            .list()
            .iter()
            .map(Transaction::summary)
            .collect()
    }

    pub fn transaction(&self, tag: &str) -> Option<&Transaction> {
        self.dispatcher.registry().lookup(tag)
    }

    pub fn schema(&self) -> Arc<Schema> {
        self.dispatcher.schema()
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// An empty in-memory ledger in the configured mode.
    pub fn memory_ledger(&self) -> MemoryLedger {
        MemoryLedger::new(self.config.ledger.mode)
    }
}

fn decode_output(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
