//! Dispatcher configuration.

use lct_assets::ResolveOptions;
use serde::{Deserialize, Serialize};

/// Contract identification returned by `getHeader`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractHeader {
    pub name: String,
    pub version: String,
    pub org_title: String,
    pub org_url: String,
}

impl Default for ContractHeader {
    fn default() -> Self {
        Self {
            name: "lct-contract".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            org_title: String::new(),
            org_url: String::new(),
        }
    }
}

/// Configuration shared by every dispatched call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub header: ContractHeader,
    /// Limits applied by built-ins that resolve references.
    pub resolve: ResolveOptions,
}
