//! Built-in metadata transactions, appended to every registry.

mod meta;
mod read;
mod search;

use lct_assets::Key;
use serde::Serialize;

use crate::error::{TxError, TxResult};
use crate::transaction::Transaction;
use crate::value::Args;

/// Tags of the built-in transactions, in registration order.
pub const BUILTIN_TAGS: &[&str] = &[
    "getTx",
    "getHeader",
    "getSchema",
    "getDataTypes",
    "readAsset",
    "readAssetHistory",
    "search",
];

pub(crate) fn builtin_transactions() -> Vec<Transaction> {
    vec![
        meta::get_tx(),
        meta::get_header(),
        meta::get_schema(),
        meta::get_data_types(),
        read::read_asset(),
        read::read_asset_history(),
        search::search(),
    ]
}

fn to_json_bytes<T: Serialize + ?Sized>(value: &T) -> TxResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| TxError::Serialization(e.to_string()))
}

fn required_key<'a>(args: &'a Args, tag: &str) -> TxResult<&'a Key> {
    args.get_key(tag).ok_or_else(|| TxError::MissingArgument {
        arg: tag.to_string(),
    })
}
