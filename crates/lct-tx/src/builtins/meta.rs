//! Introspection: transactions, header, schema, data types.

use crate::argument::Argument;
use crate::error::TxError;
use crate::transaction::{Method, Transaction};

use super::to_json_bytes;

pub(super) fn get_tx() -> Transaction {
    Transaction::new("getTx", |ctx, args| match args.get_str("txName") {
        None => {
            let list: Vec<_> = ctx.registry.list().iter().map(Transaction::summary).collect();
            to_json_bytes(&list)
        }
        Some(name) => {
            let tx = ctx.registry.lookup(name).ok_or_else(|| TxError::NotFound {
                what: format!("transaction {name:?}"),
            })?;
            to_json_bytes(&tx.descriptor())
        }
    })
    .label("Get Tx")
    .description("List every transaction, or describe one in full")
    .method(Method::Get)
    .meta()
    .read_only()
    .arg(Argument::new("txName", "string").description("Tag of the transaction to describe"))
}

pub(super) fn get_header() -> Transaction {
    Transaction::new("getHeader", |ctx, _| to_json_bytes(&ctx.config.header))
        .label("Get Header")
        .description("Contract name, version and organization")
        .method(Method::Get)
        .meta()
        .read_only()
}

pub(super) fn get_schema() -> Transaction {
    Transaction::new("getSchema", |ctx, args| match args.get_str("assetType") {
        None => to_json_bytes(&ctx.schema().summaries()),
        Some(tag) => {
            let asset_type = ctx.schema().asset_type(tag).ok_or_else(|| TxError::NotFound {
                what: format!("asset type {tag:?}"),
            })?;
            to_json_bytes(asset_type)
        }
    })
    .label("Get Schema")
    .description("List every asset type, or describe one in full")
    .method(Method::Get)
    .meta()
    .read_only()
    .arg(Argument::new("assetType", "string").description("Tag of the asset type to describe"))
}

pub(super) fn get_data_types() -> Transaction {
    Transaction::new("getDataTypes", |ctx, _| to_json_bytes(ctx.schema().data_types()))
        .label("Get Data Types")
        .description("The data-type catalogue")
        .method(Method::Get)
        .meta()
        .read_only()
}
