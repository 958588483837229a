use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use lct_crypto::{ContentHasher, Digest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::composite::{create_composite_key, is_composite_key};
use crate::error::{LedgerError, LedgerResult};
use crate::traits::LedgerStub;
use crate::types::{HistoryEntry, KeyValue, LedgerMode};

/// In-memory ledger backend for tests, demos and single-process hosts.
///
/// All partitions are held behind one `RwLock`. Writes made between
/// [`start_tx`](Self::start_tx) and [`end_tx`](Self::end_tx) are attributed
/// to that transaction in the key history; writes outside a transaction are
/// recorded with an empty transaction id.
pub struct MemoryLedger {
    mode: LedgerMode,
    unavailable: AtomicBool,
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    public: BTreeMap<String, Vec<u8>>,
    private: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    proofs: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    history: HashMap<String, Vec<HistoryEntry>>,
    tx: Option<TxFrame>,
}

struct TxFrame {
    id: String,
    timestamp: DateTime<Utc>,
}

impl LedgerState {
    fn record(&mut self, key: &str, value: Option<&[u8]>) {
        let (tx_id, timestamp) = match &self.tx {
            Some(frame) => (frame.id.clone(), frame.timestamp),
            None => (String::new(), Utc::now()),
        };
        self.history
            .entry(key.to_string())
            .or_default()
            .push(HistoryEntry {
                tx_id,
                timestamp,
                is_delete: value.is_none(),
                value: value.map(<[u8]>::to_vec).unwrap_or_default(),
            });
    }
}

impl MemoryLedger {
    /// Create an empty ledger in the given mode.
    pub fn new(mode: LedgerMode) -> Self {
        Self {
            mode,
            unavailable: AtomicBool::new(false),
            inner: RwLock::new(LedgerState::default()),
        }
    }

    /// Shorthand for a [`LedgerMode::Direct`] ledger.
    pub fn direct() -> Self {
        Self::new(LedgerMode::Direct)
    }

    /// Shorthand for a [`LedgerMode::Production`] ledger.
    pub fn production() -> Self {
        Self::new(LedgerMode::Production)
    }

    /// Begin attributing writes to `tx_id`, stamped with the current time.
    pub fn start_tx(&self, tx_id: impl Into<String>) -> LedgerResult<()> {
        self.start_tx_at(tx_id, Utc::now())
    }

    /// Begin attributing writes to `tx_id` with an explicit timestamp.
    pub fn start_tx_at(
        &self,
        tx_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> LedgerResult<()> {
        let mut state = self.write()?;
        state.tx = Some(TxFrame {
            id: tx_id.into(),
            timestamp,
        });
        Ok(())
    }

    /// Stop attributing writes to the current transaction.
    pub fn end_tx(&self) -> LedgerResult<()> {
        self.write()?.tx = None;
        Ok(())
    }

    /// Store only the existence proof of a private entry, as a peer outside
    /// the collection would see it.
    pub fn record_private_proof(
        &self,
        collection: &str,
        key: &str,
        proof: Digest,
    ) -> LedgerResult<()> {
        non_empty_key(key)?;
        self.write()?
            .proofs
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), proof.to_vec());
        Ok(())
    }

    /// Make every subsequent call fail with [`LedgerError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of keys in the public partition, composite keys included.
    pub fn len(&self) -> usize {
        self.inner.read().map(|s| s.public.len()).unwrap_or_default()
    }

    /// Returns `true` if the public partition is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Export public and private values as JSON.
    ///
    /// History and existence proofs are not exported; proofs are recomputed
    /// by [`from_snapshot`](Self::from_snapshot).
    pub fn snapshot(&self) -> LedgerResult<LedgerSnapshot> {
        let state = self.read()?;
        let public = state
            .public
            .iter()
            .map(|(k, v)| (k.clone(), bytes_to_json(v)))
            .collect();
        let private = state
            .private
            .iter()
            .map(|(collection, entries)| {
                let entries = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), bytes_to_json(v)))
                    .collect();
                (collection.clone(), entries)
            })
            .collect();
        Ok(LedgerSnapshot { public, private })
    }

    /// Build a ledger holding the values of `snapshot`.
    pub fn from_snapshot(mode: LedgerMode, snapshot: &LedgerSnapshot) -> LedgerResult<Self> {
        let ledger = Self::new(mode);
        for (key, value) in &snapshot.public {
            ledger.put_state(key, &json_to_bytes(value)?)?;
        }
        for (collection, entries) in &snapshot.private {
            for (key, value) in entries {
                ledger.put_private_data(collection, key, &json_to_bytes(value)?)?;
            }
        }
        // Seeding is not a transaction.
        ledger.write()?.history.clear();
        debug!(
            ?mode,
            public = snapshot.public.len(),
            collections = snapshot.private.len(),
            "ledger restored from snapshot"
        );
        Ok(ledger)
    }

    fn check_available(&self) -> LedgerResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable);
        }
        Ok(())
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, LedgerState>> {
        self.check_available()?;
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, LedgerState>> {
        self.check_available()?;
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::direct()
    }
}

impl LedgerStub for MemoryLedger {
    fn mode(&self) -> LedgerMode {
        self.mode
    }

    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        Ok(self.read()?.public.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> LedgerResult<()> {
        non_empty_key(key)?;
        if value.is_empty() {
            return self.del_state(key);
        }
        let mut state = self.write()?;
        state.public.insert(key.to_string(), value.to_vec());
        state.record(key, Some(value));
        Ok(())
    }

    fn del_state(&self, key: &str) -> LedgerResult<()> {
        let mut state = self.write()?;
        if state.public.remove(key).is_some() {
            state.record(key, None);
        }
        Ok(())
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> LedgerResult<Vec<KeyValue>> {
        Ok(scan(&self.read()?.public, start, end))
    }

    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[String],
    ) -> LedgerResult<Vec<KeyValue>> {
        let prefix = create_composite_key(object_type, attributes)?;
        let state = self.read()?;
        Ok(state
            .public
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect())
    }

    fn get_history_for_key(&self, key: &str) -> LedgerResult<Vec<HistoryEntry>> {
        Ok(self.read()?.history.get(key).cloned().unwrap_or_default())
    }

    fn get_private_data(&self, collection: &str, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        Ok(self
            .read()?
            .private
            .get(collection)
            .and_then(|c| c.get(key))
            .cloned())
    }

    fn put_private_data(&self, collection: &str, key: &str, value: &[u8]) -> LedgerResult<()> {
        non_empty_key(key)?;
        if value.is_empty() {
            return self.del_private_data(collection, key);
        }
        let proof = ContentHasher::PRIVATE_DATA.hash(value);
        let mut state = self.write()?;
        state
            .private
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), value.to_vec());
        state
            .proofs
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), proof.to_vec());
        Ok(())
    }

    fn del_private_data(&self, collection: &str, key: &str) -> LedgerResult<()> {
        let mut state = self.write()?;
        if let Some(c) = state.private.get_mut(collection) {
            c.remove(key);
        }
        if let Some(c) = state.proofs.get_mut(collection) {
            c.remove(key);
        }
        Ok(())
    }

    fn get_private_data_hash(
        &self,
        collection: &str,
        key: &str,
    ) -> LedgerResult<Option<Vec<u8>>> {
        Ok(self
            .read()?
            .proofs
            .get(collection)
            .and_then(|c| c.get(key))
            .cloned())
    }

    fn get_private_data_by_range(
        &self,
        collection: &str,
        start: &str,
        end: &str,
    ) -> LedgerResult<Vec<KeyValue>> {
        let state = self.read()?;
        Ok(state
            .private
            .get(collection)
            .map(|c| scan(c, start, end))
            .unwrap_or_default())
    }

    fn tx_id(&self) -> LedgerResult<String> {
        self.read()?
            .tx
            .as_ref()
            .map(|frame| frame.id.clone())
            .ok_or(LedgerError::NoActiveTx)
    }

    fn tx_timestamp(&self) -> LedgerResult<DateTime<Utc>> {
        self.read()?
            .tx
            .as_ref()
            .map(|frame| frame.timestamp)
            .ok_or(LedgerError::NoActiveTx)
    }
}

impl std::fmt::Debug for MemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLedger")
            .field("mode", &self.mode)
            .field("public_keys", &self.len())
            .finish()
    }
}

/// Serializable contents of a [`MemoryLedger`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub public: BTreeMap<String, Value>,
    #[serde(default)]
    pub private: BTreeMap<String, BTreeMap<String, Value>>,
}

fn non_empty_key(key: &str) -> LedgerResult<()> {
    if key.is_empty() {
        return Err(LedgerError::InvalidKey {
            key: key.to_string(),
            reason: "key must not be empty".into(),
        });
    }
    Ok(())
}

fn scan(map: &BTreeMap<String, Vec<u8>>, start: &str, end: &str) -> Vec<KeyValue> {
    if !start.is_empty() && !end.is_empty() && start >= end {
        return Vec::new();
    }
    let lower = if start.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Included(start)
    };
    let upper = if end.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(end)
    };
    map.range::<str, _>((lower, upper))
        .filter(|(k, _)| !is_composite_key(k))
        .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
        .collect()
}

fn bytes_to_json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn json_to_bytes(value: &Value) -> LedgerResult<Vec<u8>> {
    match value {
        Value::String(s) => Ok(s.as_bytes().to_vec()),
        other => serde_json::to_vec(other).map_err(|e| LedgerError::Serialization(e.to_string())),
    }
}
