//! Asset reads: current state and key history.

use chrono::{DateTime, Utc};
use lct_assets::{format_datetime, Identity};
use lct_ledger::HistoryEntry;
use serde::Serialize;
use serde_json::Value;

use crate::argument::Argument;
use crate::error::TxError;
use crate::transaction::{Method, Transaction};

use super::{required_key, to_json_bytes};

pub(super) fn read_asset() -> Transaction {
    Transaction::new("readAsset", |ctx, args| {
        let key = required_key(args, "key")?;
        if args.flag("resolve") {
            let asset = key
                .get_recursive(ctx.port, ctx.schema(), &ctx.config.resolve)
                .map_err(|e| TxError::from(e).context("failed to read asset from ledger"))?;
            to_json_bytes(&asset)
        } else {
            key.get_bytes(ctx.port)
                .map_err(|e| TxError::from(e).context("failed to get asset state"))
        }
    })
    .label("Read Asset")
    .description("Read the stored state of an asset")
    .method(Method::Get)
    .meta()
    .read_only()
    .arg(
        Argument::new("key", "@key")
            .required()
            .description("Key of the asset to be read"),
    )
    .arg(Argument::new("resolve", "boolean").description("Resolve references recursively"))
}

/// One entry of `readAssetHistory` output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryRecord {
    tx_id: String,
    timestamp: DateTime<Utc>,
    is_delete: bool,
    value: Value,
}

impl From<&HistoryEntry> for HistoryRecord {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            tx_id: entry.tx_id.clone(),
            timestamp: entry.timestamp,
            is_delete: entry.is_delete,
            value: history_value(&entry.value),
        }
    }
}

/// Deletions carry no value. Bytes that are not JSON come back as a lossy
/// string.
fn history_value(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

pub(super) fn read_asset_history() -> Transaction {
    Transaction::new("readAssetHistory", |ctx, args| {
        let key = required_key(args, "key")?;
        if key.is_private() {
            return Err(TxError::InvalidArgumentType {
                arg: "key".into(),
                expected: "@key".into(),
                reason: format!(
                    "history is not kept for private asset type {}",
                    key.type_tag()
                ),
            });
        }
        let history = ctx
            .port
            .get_history_for_key(key.key())
            .map_err(|e| TxError::from(e).context("failed to read asset history"))?;
        let records: Vec<HistoryRecord> = history.iter().map(HistoryRecord::from).collect();

        match args.get_datetime("timeTarget") {
            None => to_json_bytes(&records),
            Some(target) => {
                let latest = records
                    .into_iter()
                    .filter(|r| r.timestamp <= target)
                    .max_by_key(|r| r.timestamp)
                    .ok_or_else(|| TxError::NotFound {
                        what: format!("state of {key} at {}", format_datetime(&target)),
                    })?;
                to_json_bytes(&latest)
            }
        }
    })
    .label("Read Asset History")
    .description("Every recorded change of an asset, oldest first")
    .method(Method::Get)
    .meta()
    .read_only()
    .arg(
        Argument::new("key", "@key")
            .required()
            .description("Key of the asset"),
    )
    .arg(
        Argument::new("timeTarget", "datetime")
            .description("Return only the latest state at or before this time"),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use lct_assets::{Asset, AssetProp, AssetType, Schema};
    use lct_ledger::{LedgerStub, MemoryLedger};
    use serde_json::{json, Map, Value};

    use super::*;
    use crate::config::DispatchConfig;
    use crate::dispatch::Dispatcher;
    use crate::error::ErrorKind;
    use crate::registry::TxRegistry;

    fn schema() -> Schema {
        Schema::builder()
            .asset_type(
                AssetType::new("person")
                    .prop(AssetProp::new("id", "string").key())
                    .prop(AssetProp::new("name", "string"))
                    .prop(AssetProp::new("friend", "->person")),
            )
            .asset_type(
                AssetType::new("secret")
                    .prop(AssetProp::new("id", "string").key())
                    .reader("org1MSP"),
            )
            .build()
            .unwrap()
    }

    fn dispatcher() -> Dispatcher {
        let registry = TxRegistry::init(Vec::new(), Arc::new(schema())).unwrap();
        Dispatcher::new(Arc::new(registry), DispatchConfig::default())
    }

    fn person(id: &str, name: &str, friend: Option<&str>) -> Asset {
        let mut value = json!({"@assetType": "person", "id": id, "name": name});
        if let Some(f) = friend {
            value["friend"] = json!({"@assetType": "person", "id": f});
        }
        Asset::from_value(&schema(), &value).unwrap()
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // readAsset
    // -----------------------------------------------------------------------

    #[test]
    fn read_asset_returns_stored_bytes() {
        let ledger = MemoryLedger::direct();
        let ada = person("1", "Ada", None);
        ada.put(&ledger).unwrap();

        let out = dispatcher()
            .dispatch(&ledger, "readAsset", &args(json!({"key": ada.key()})))
            .unwrap();
        assert_eq!(Some(out), ledger.get_state(ada.key()).unwrap());
    }

    #[test]
    fn read_asset_resolves_on_request() {
        let ledger = MemoryLedger::direct();
        let ada = person("1", "Ada", None);
        let bob = person("2", "Bob", Some("1"));
        ada.put(&ledger).unwrap();
        bob.put(&ledger).unwrap();

        let out = dispatcher()
            .dispatch(
                &ledger,
                "readAsset",
                &args(json!({"key": {"@assetType": "person", "id": "2"}, "resolve": true})),
            )
            .unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["friend"], ada.to_value());
    }

    #[test]
    fn read_asset_missing_is_not_found() {
        let ledger = MemoryLedger::direct();
        let err = dispatcher()
            .dispatch(
                &ledger,
                "readAsset",
                &args(json!({"key": {"@assetType": "person", "id": "404"}})),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "failed to get asset state");
    }

    #[test]
    fn read_asset_requires_key() {
        let err = dispatcher()
            .dispatch(&MemoryLedger::direct(), "readAsset", &Map::new())
            .unwrap_err();
        assert!(matches!(err, TxError::MissingArgument { arg } if arg == "key"));
    }

    // -----------------------------------------------------------------------
    // readAssetHistory
    // -----------------------------------------------------------------------

    #[test]
    fn history_lists_changes_and_honours_time_target() {
        let ledger = MemoryLedger::direct();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        ledger.start_tx_at("tx1", t1).unwrap();
        person("1", "Ada", None).put(&ledger).unwrap();
        ledger.end_tx().unwrap();
        ledger.start_tx_at("tx2", t2).unwrap();
        person("1", "Ada Lovelace", None).put(&ledger).unwrap();
        ledger.end_tx().unwrap();

        let key = person("1", "Ada", None).to_key();
        let d = dispatcher();

        let out = d
            .dispatch(&ledger, "readAssetHistory", &args(json!({"key": key.key()})))
            .unwrap();
        let all: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(all.as_array().unwrap().len(), 2);
        assert_eq!(all[0]["txId"], "tx1");
        assert_eq!(all[1]["value"]["name"], "Ada Lovelace");

        let out = d
            .dispatch(
                &ledger,
                "readAssetHistory",
                &args(json!({"key": key.key(), "timeTarget": "2024-01-15T00:00:00Z"})),
            )
            .unwrap();
        let at: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(at["txId"], "tx1");
        assert_eq!(at["value"]["name"], "Ada");

        let err = d
            .dispatch(
                &ledger,
                "readAssetHistory",
                &args(json!({"key": key.key(), "timeTarget": "2023-01-01T00:00:00Z"})),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn history_rejects_private_assets() {
        let err = dispatcher()
            .dispatch(
                &MemoryLedger::direct(),
                "readAssetHistory",
                &args(json!({"key": {"@assetType": "secret", "id": "s"}})),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Caller);
    }

    #[test]
    fn history_keeps_non_json_values_and_deletions() {
        let ledger = MemoryLedger::direct();
        let key = person("1", "Ada", None).to_key();

        ledger.start_tx("tx1").unwrap();
        ledger.put_state(key.key(), b"raw \xff").unwrap();
        ledger.end_tx().unwrap();
        ledger.start_tx("tx2").unwrap();
        ledger.del_state(key.key()).unwrap();
        ledger.end_tx().unwrap();

        let out = dispatcher()
            .dispatch(&ledger, "readAssetHistory", &args(json!({"key": key.key()})))
            .unwrap();
        let all: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(all[0]["value"], "raw \u{fffd}");
        assert_eq!(all[1]["isDelete"], true);
        assert_eq!(all[1]["value"], Value::Null);
    }
}
