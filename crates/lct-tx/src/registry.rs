//! The transaction registry.
//!
//! A registry is built once from the caller's transactions followed by the
//! built-ins, and is read-only afterwards. A process that needs a single
//! shared registry uses [`init_global`] at startup and [`global`] everywhere
//! else.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use lct_assets::Schema;
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::argument::ArgType;
use crate::builtins::builtin_transactions;
use crate::error::{TxError, TxResult};
use crate::transaction::Transaction;

/// A registered transaction with its parsed argument types.
pub(crate) struct Entry {
    pub(crate) tx: Transaction,
    pub(crate) arg_types: Vec<ArgType>,
}

/// Immutable catalog of transactions, indexed by tag.
pub struct TxRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    schema: Arc<Schema>,
}

impl TxRegistry {
    /// Build a registry from `extra` followed by the built-in transactions.
    ///
    /// Fails if any two transactions share a tag (a caller transaction
    /// named like a built-in included), if a transaction declares the same
    /// argument twice, or if an argument names an unknown data type.
    pub fn init(extra: Vec<Transaction>, schema: Arc<Schema>) -> TxResult<Self> {
        let all = extra.into_iter().chain(builtin_transactions());

        let mut entries = Vec::new();
        let mut index = HashMap::new();
        for tx in all {
            if index.contains_key(&tx.tag) {
                return Err(TxError::DuplicateTransaction { tag: tx.tag });
            }
            let mut seen = HashSet::new();
            let mut arg_types = Vec::with_capacity(tx.args.len());
            for arg in &tx.args {
                if !seen.insert(arg.tag.as_str()) {
                    return Err(TxError::DuplicateArgument {
                        tx: tx.tag.clone(),
                        arg: arg.tag.clone(),
                    });
                }
                let arg_type = ArgType::parse(&arg.data_type, &schema).map_err(|data_type| {
                    TxError::UnknownDataType {
                        tx: tx.tag.clone(),
                        arg: arg.tag.clone(),
                        data_type,
                    }
                })?;
                arg_types.push(arg_type);
            }
            index.insert(tx.tag.clone(), entries.len());
            entries.push(Entry { tx, arg_types });
        }

        debug!(transactions = entries.len(), "transaction registry built");
        Ok(Self {
            entries,
            index,
            schema,
        })
    }

    /// Every transaction, in registration order. The returned list is a
    /// copy; changing it does not affect the registry.
    pub fn list(&self) -> Vec<Transaction> {
        self.entries.iter().map(|e| e.tx.clone()).collect()
    }

    pub fn lookup(&self, tag: &str) -> Option<&Transaction> {
        self.entry(tag).map(|e| &e.tx)
    }

    pub(crate) fn entry(&self, tag: &str) -> Option<&Entry> {
        self.index.get(tag).map(|&i| &self.entries[i])
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub(crate) fn schema_arc(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for TxRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxRegistry")
            .field(
                "tags",
                &self.entries.iter().map(|e| e.tx.tag.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Process-wide registry
// ---------------------------------------------------------------------------

static GLOBAL: OnceCell<Arc<TxRegistry>> = OnceCell::new();

/// Build the process-wide registry. Must run once, before any dispatch.
pub fn init_global(extra: Vec<Transaction>, schema: Arc<Schema>) -> TxResult<Arc<TxRegistry>> {
    if GLOBAL.get().is_some() {
        return Err(TxError::AlreadyInitialized);
    }
    let registry = Arc::new(TxRegistry::init(extra, schema)?);
    GLOBAL
        .set(Arc::clone(&registry))
        .map_err(|_| TxError::AlreadyInitialized)?;
    Ok(registry)
}

/// The process-wide registry.
pub fn global() -> TxResult<Arc<TxRegistry>> {
    GLOBAL.get().cloned().ok_or(TxError::RegistryUninitialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::Argument;
    use crate::builtins::BUILTIN_TAGS;
    use lct_assets::{AssetProp, AssetType};

    fn schema() -> Arc<Schema> {
        Arc::new(
            Schema::builder()
                .asset_type(AssetType::new("person").prop(AssetProp::new("id", "string").key()))
                .build()
                .unwrap(),
        )
    }

    fn noop(tag: &str) -> Transaction {
        Transaction::new(tag, |_, _| Ok(Vec::new()))
    }

    #[test]
    fn caller_transactions_come_first() {
        let registry =
            TxRegistry::init(vec![noop("createPerson"), noop("deletePerson")], schema()).unwrap();
        let tags: Vec<_> = registry.list().into_iter().map(|t| t.tag).collect();
        assert_eq!(tags[0], "createPerson");
        assert_eq!(tags[1], "deletePerson");
        assert_eq!(&tags[2..], BUILTIN_TAGS);
        assert_eq!(registry.len(), 2 + BUILTIN_TAGS.len());
    }

    #[test]
    fn empty_extra_has_builtins() {
        let registry = TxRegistry::init(Vec::new(), schema()).unwrap();
        for tag in BUILTIN_TAGS {
            assert!(registry.lookup(tag).is_some(), "missing {tag}");
        }
        assert!(registry.lookup("noSuchTx").is_none());
    }

    #[test]
    fn list_is_a_copy() {
        let registry = TxRegistry::init(vec![noop("a")], schema()).unwrap();
        let mut list = registry.list();
        list.clear();
        assert_eq!(registry.list().len(), 1 + BUILTIN_TAGS.len());
    }

    #[test]
    fn duplicate_caller_tags_fail() {
        let err = TxRegistry::init(vec![noop("a"), noop("a")], schema()).unwrap_err();
        assert!(matches!(err, TxError::DuplicateTransaction { tag } if tag == "a"));
    }

    #[test]
    fn builtin_collision_fails() {
        let err = TxRegistry::init(vec![noop("readAsset")], schema()).unwrap_err();
        assert!(matches!(err, TxError::DuplicateTransaction { tag } if tag == "readAsset"));
    }

    #[test]
    fn duplicate_argument_fails() {
        let tx = noop("a")
            .arg(Argument::new("x", "string"))
            .arg(Argument::new("x", "integer"));
        let err = TxRegistry::init(vec![tx], schema()).unwrap_err();
        assert!(matches!(
            err,
            TxError::DuplicateArgument { ref tx, ref arg } if tx == "a" && arg == "x"
        ));
    }

    #[test]
    fn unknown_data_type_fails_at_build_time() {
        let tx = noop("a").arg(Argument::new("when", "timestamp"));
        let err = TxRegistry::init(vec![tx], schema()).unwrap_err();
        match err {
            TxError::UnknownDataType { tx, arg, data_type } => {
                assert_eq!(tx, "a");
                assert_eq!(arg, "when");
                assert_eq!(data_type, "timestamp");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let tx = noop("b").arg(Argument::new("owner", "->company"));
        assert!(matches!(
            TxRegistry::init(vec![tx], schema()),
            Err(TxError::UnknownDataType { .. })
        ));
    }

    // The process-wide registry is shared by every test in this binary, so
    // its whole lifecycle is checked in one place.
    #[test]
    fn global_lifecycle() {
        let ledger = lct_ledger::MemoryLedger::direct();
        let no_args = serde_json::Map::new();

        assert!(matches!(global(), Err(TxError::RegistryUninitialized)));
        assert!(matches!(
            crate::dispatch::dispatch(&ledger, "a", &no_args),
            Err(TxError::RegistryUninitialized)
        ));

        let registry = init_global(vec![noop("a")], schema()).unwrap();
        assert!(registry.lookup("a").is_some());
        assert!(global().unwrap().lookup("a").is_some());

        assert!(matches!(
            init_global(Vec::new(), schema()),
            Err(TxError::AlreadyInitialized)
        ));
        assert!(global().unwrap().lookup("a").is_some());
        assert_eq!(crate::dispatch::dispatch(&ledger, "a", &no_args).unwrap(), b"");
    }
}
