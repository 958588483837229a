//! Request dispatch: lookup, argument validation, routine execution.

use std::sync::Arc;

use lct_assets::Schema;
use lct_ledger::LedgerStub;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::DispatchConfig;
use crate::error::{TxError, TxResult};
use crate::registry::{self, Entry, TxRegistry};
use crate::value::Args;

/// What a routine can see of the call it serves.
pub struct TxContext<'a> {
    pub port: &'a dyn LedgerStub,
    pub registry: &'a TxRegistry,
    pub config: &'a DispatchConfig,
}

impl TxContext<'_> {
    pub fn schema(&self) -> &Schema {
        self.registry.schema()
    }
}

/// Routes calls to registered transactions.
///
/// Dispatch is fail-fast and ordered: the tag is looked up before any
/// argument is read, and every declared argument is validated before the
/// routine runs. A routine never observes a call whose arguments failed
/// validation.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    registry: Arc<TxRegistry>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(registry: Arc<TxRegistry>, config: DispatchConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &TxRegistry {
        &self.registry
    }

    pub fn schema(&self) -> Arc<Schema> {
        self.registry.schema_arc()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Run the transaction `tag` with raw arguments and relay its result.
    ///
    /// Raw arguments that the transaction does not declare are ignored.
    pub fn dispatch(
        &self,
        port: &dyn LedgerStub,
        tag: &str,
        raw_args: &Map<String, Value>,
    ) -> TxResult<Vec<u8>> {
        let entry = self
            .registry
            .entry(tag)
            .ok_or_else(|| TxError::UnknownTransaction {
                tag: tag.to_string(),
            })?;

        let args = validate_args(entry, self.registry.schema(), raw_args).map_err(|e| {
            debug!(tx = tag, error = %e, "argument validation failed");
            e
        })?;

        debug!(tx = tag, args = args.len(), "dispatching");
        let ctx = TxContext {
            port,
            registry: &self.registry,
            config: &self.config,
        };
        (entry.tx.routine)(&ctx, &args)
    }

    /// Like [`dispatch`](Self::dispatch), with the arguments as one JSON
    /// value. `null` means no arguments.
    pub fn dispatch_value(
        &self,
        port: &dyn LedgerStub,
        tag: &str,
        raw_args: &Value,
    ) -> TxResult<Vec<u8>> {
        match raw_args {
            Value::Object(map) => self.dispatch(port, tag, map),
            Value::Null => self.dispatch(port, tag, &Map::new()),
            _ => Err(TxError::InvalidArguments {
                reason: "arguments must be a JSON object".into(),
            }),
        }
    }
}

/// Dispatch through the process-wide registry with the default
/// configuration.
pub fn dispatch(port: &dyn LedgerStub, tag: &str, raw_args: &Map<String, Value>) -> TxResult<Vec<u8>> {
    Dispatcher::new(registry::global()?, DispatchConfig::default()).dispatch(port, tag, raw_args)
}

fn validate_args(entry: &Entry, schema: &Schema, raw_args: &Map<String, Value>) -> TxResult<Args> {
    let mut args = Args::new();
    for (arg, arg_type) in entry.tx.args.iter().zip(&entry.arg_types) {
        match raw_args.get(&arg.tag).filter(|v| !v.is_null()) {
            Some(raw) => args.insert(arg.tag.clone(), arg_type.coerce(schema, &arg.tag, raw)?),
            None if arg.required => {
                return Err(TxError::MissingArgument {
                    arg: arg.tag.clone(),
                })
            }
            None => {}
        }
    }
    Ok(args)
}
