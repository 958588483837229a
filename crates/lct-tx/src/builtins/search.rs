//! Selector search over the assets of one type.

use lct_assets::Asset;
use lct_types::attrs;
use serde_json::{json, Map, Value};

use crate::argument::Argument;
use crate::error::TxError;
use crate::transaction::{Method, Transaction};

use super::to_json_bytes;

fn bad_query(reason: &str) -> TxError {
    TxError::InvalidArgumentType {
        arg: "query".into(),
        expected: "@object".into(),
        reason: reason.into(),
    }
}

fn matches_selector(asset: &Value, selector: &Map<String, Value>) -> bool {
    selector
        .iter()
        .filter(|(k, _)| k.as_str() != attrs::ASSET_TYPE)
        .all(|(k, v)| asset.get(k) == Some(v))
}

pub(super) fn search() -> Transaction {
    Transaction::new("search", |ctx, args| {
        let query = args
            .get_object("query")
            .ok_or_else(|| TxError::MissingArgument { arg: "query".into() })?;
        let selector = query
            .get("selector")
            .and_then(Value::as_object)
            .ok_or_else(|| bad_query("query must contain a selector object"))?;
        let type_tag = selector
            .get(attrs::ASSET_TYPE)
            .and_then(Value::as_str)
            .ok_or_else(|| bad_query("selector must name an @assetType"))?;
        let limit = match query.get("limit") {
            None | Some(Value::Null) => None,
            Some(v) => Some(
                v.as_u64()
                    .ok_or_else(|| bad_query("limit must be a non-negative integer"))?
                    as usize,
            ),
        };

        let assets = Asset::scan(ctx.port, ctx.schema(), type_tag)
            .map_err(|e| TxError::from(e).context("failed to scan assets"))?;

        let resolve = args.flag("resolve");
        let mut result = Vec::new();
        for asset in assets {
            if limit.is_some_and(|l| result.len() >= l) {
                break;
            }
            let value = asset.to_value();
            if !matches_selector(&value, selector) {
                continue;
            }
            if resolve {
                let resolved = asset
                    .to_key()
                    .get_recursive(ctx.port, ctx.schema(), &ctx.config.resolve)
                    .map_err(|e| TxError::from(e).context("failed to resolve search result"))?;
                result.push(resolved.to_value());
            } else {
                result.push(value);
            }
        }
        to_json_bytes(&json!({ "result": result }))
    })
    .label("Search")
    .description("Find assets of one type whose attributes equal the selector")
    .method(Method::Get)
    .meta()
    .read_only()
    .arg(
        Argument::new("query", "@object")
            .required()
            .description("{\"selector\": {\"@assetType\": ..., attr: value}, \"limit\": n}"),
    )
    .arg(Argument::new("resolve", "boolean").description("Resolve references recursively"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lct_assets::{AssetProp, AssetType, Schema};
    use lct_ledger::MemoryLedger;
    use lct_types::{HasStatus, StatusClass};

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
                    .prop(AssetProp::new("city", "string"))
                    .prop(AssetProp::new("friend", "->person")),
            )
            .asset_type(
                AssetType::new("secret")
                    .prop(AssetProp::new("id", "string").key())
                    .prop(AssetProp::new("level", "integer"))
                    .reader("org1MSP"),
            )
            .build()
            .unwrap()
    }

    fn seeded() -> (Dispatcher, MemoryLedger) {
        let schema = schema();
        let ledger = MemoryLedger::production();
        for value in [
            json!({"@assetType": "person", "id": "1", "city": "Paris"}),
            json!({"@assetType": "person", "id": "2", "city": "Rome"}),
            json!({"@assetType": "person", "id": "3", "city": "Paris",
                   "friend": {"@assetType": "person", "id": "2"}}),
            json!({"@assetType": "secret", "id": "s1", "level": 3}),
        ] {
            Asset::from_value(&schema, &value).unwrap().put(&ledger).unwrap();
        }
        let registry = TxRegistry::init(Vec::new(), Arc::new(schema)).unwrap();
        (
            Dispatcher::new(Arc::new(registry), DispatchConfig::default()),
            ledger,
        )
    }

    fn search(d: &Dispatcher, ledger: &MemoryLedger, args: Value) -> Result<Value, TxError> {
        let out = d.dispatch_value(ledger, "search", &args)?;
        Ok(serde_json::from_slice(&out).unwrap())
    }

    #[test]
    fn filters_by_equality() {
        let (d, ledger) = seeded();
        let out = search(
            &d,
            &ledger,
            json!({"query": {"selector": {"@assetType": "person", "city": "Paris"}}}),
        )
        .unwrap();
        let result = out["result"].as_array().unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|r| r["city"] == "Paris"));
    }

    #[test]
    fn limit_caps_results() {
        let (d, ledger) = seeded();
        let out = search(
            &d,
            &ledger,
            json!({"query": {"selector": {"@assetType": "person"}, "limit": 1}}),
        )
        .unwrap();
        assert_eq!(out["result"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn resolves_on_request() {
        let (d, ledger) = seeded();
        let out = search(
            &d,
            &ledger,
            json!({"query": {"selector": {"@assetType": "person", "id": "3"}}, "resolve": true}),
        )
        .unwrap();
        assert_eq!(out["result"][0]["friend"]["city"], "Rome");
    }

    #[test]
    fn searches_private_collections() {
        let (d, ledger) = seeded();
        let out = search(
            &d,
            &ledger,
            json!({"query": {"selector": {"@assetType": "secret", "level": 3}}}),
        )
        .unwrap();
        assert_eq!(out["result"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn malformed_queries_are_rejected() {
        let (d, ledger) = seeded();
        let no_type = search(&d, &ledger, json!({"query": {"selector": {"city": "Paris"}}}));
        let err = no_type.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Caller);
        assert!(matches!(err, TxError::InvalidArgumentType { ref arg, .. } if arg == "query"));

        let bad_limit = search(
            &d,
            &ledger,
            json!({"query": {"selector": {"@assetType": "person"}, "limit": -1}}),
        );
        assert_eq!(bad_limit.unwrap_err().status(), StatusClass::BadRequest);

        let no_selector = search(&d, &ledger, json!({"query": {"limit": 1}}));
        assert_eq!(no_selector.unwrap_err().kind(), ErrorKind::Caller);

        let unknown = search(&d, &ledger, json!({"query": {"selector": {"@assetType": "car"}}}));
        assert_eq!(unknown.unwrap_err().kind(), ErrorKind::Caller);

        let not_object = search(&d, &ledger, json!({"query": "everything"}));
        assert!(matches!(
            not_object.unwrap_err(),
            TxError::InvalidArgumentType { .. }
        ));
    }
}
