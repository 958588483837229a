//! Contract configuration and file loading.

use std::fs;
use std::path::Path;

use lct_assets::Schema;
use lct_ledger::{LedgerMode, LedgerSnapshot, MemoryLedger};
use lct_tx::DispatchConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SdkError, SdkResult};

/// Host settings for the ledger backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub mode: LedgerMode,
}

/// Everything a contract host reads from its configuration file.
///
/// ```toml
/// [header]
/// name = "library"
/// version = "1.2.0"
///
/// [resolve]
/// maxDepth = 16
///
/// [ledger]
/// mode = "production"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    #[serde(flatten)]
    pub dispatch: DispatchConfig,
    pub ledger: LedgerConfig,
}

impl ContractConfig {
    pub fn from_toml_str(s: &str) -> SdkResult<Self> {
        toml::from_str(s).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| SdkError::io(path, e))?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), mode = ?config.ledger.mode, "loaded contract config");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> SdkResult<String> {
        toml::to_string_pretty(self).map_err(|e| SdkError::Serialization(e.to_string()))
    }
}

/// Read a schema file (`{"assetTypes": [...]}`).
pub fn load_schema(path: impl AsRef<Path>) -> SdkResult<Schema> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| SdkError::io(path, e))?;
    Ok(Schema::from_json_str(&text)?)
}

/// Read a ledger snapshot file. A missing file yields an empty ledger.
pub fn load_state(path: impl AsRef<Path>, mode: LedgerMode) -> SdkResult<MemoryLedger> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "no state file, starting empty");
        return Ok(MemoryLedger::new(mode));
    }
    let text = fs::read_to_string(path).map_err(|e| SdkError::io(path, e))?;
    let snapshot: LedgerSnapshot =
        serde_json::from_str(&text).map_err(|e| SdkError::Serialization(e.to_string()))?;
    Ok(MemoryLedger::from_snapshot(mode, &snapshot)?)
}

/// Write a ledger snapshot file, replacing any previous one.
pub fn save_state(path: impl AsRef<Path>, ledger: &MemoryLedger) -> SdkResult<()> {
    let path = path.as_ref();
    let snapshot = ledger.snapshot()?;
    let text = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| SdkError::Serialization(e.to_string()))?;
    fs::write(path, text).map_err(|e| SdkError::io(path, e))?;
    debug!(path = %path.display(), entries = ledger.len(), "saved state");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lct_ledger::LedgerStub;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ContractConfig::from_toml_str("").unwrap();
        assert_eq!(config, ContractConfig::default());
        assert_eq!(config.ledger.mode, LedgerMode::Direct);
    }

    #[test]
    fn sections_are_read() {
        let config = ContractConfig::from_toml_str(
            r#"
            [header]
            name = "library"

            [resolve]
            maxDepth = 3

            [ledger]
            mode = "production"
            "#,
        )
        .unwrap();
        assert_eq!(config.dispatch.header.name, "library");
        assert_eq!(config.dispatch.resolve.max_depth, Some(3));
        assert_eq!(config.ledger.mode, LedgerMode::Production);
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = ContractConfig::from_toml_str("[ledger]\nmode = \"eventual\"").unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = ContractConfig::default();
        config.dispatch.header.name = "library".into();
        config.ledger.mode = LedgerMode::Production;
        let text = config.to_toml_string().unwrap();
        assert_eq!(ContractConfig::from_toml_str(&text).unwrap(), config);
    }

    // -----------------------------------------------------------------------
    // Files
    // -----------------------------------------------------------------------

    #[test]
    fn load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[header]\nname = \"from-file\"").unwrap();
        let config = ContractConfig::load(file.path()).unwrap();
        assert_eq!(config.dispatch.header.name, "from-file");
    }

    #[test]
    fn missing_config_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContractConfig::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, SdkError::Io { .. }));
    }

    #[test]
    fn load_schema_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"assetTypes": [{{"tag": "person", "props": [{{"tag": "id", "dataType": "string", "isKey": true}}]}}]}}"#
        )
        .unwrap();
        let schema = load_schema(file.path()).unwrap();
        assert!(schema.asset_type("person").is_some());
    }

    #[test]
    fn state_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let empty = load_state(&path, LedgerMode::Direct).unwrap();
        assert!(empty.is_empty());

        empty.put_state("person:1", br#"{"id":"1"}"#).unwrap();
        empty.put_private_data("secret", "secret:1", br#"{"id":"s"}"#).unwrap();
        save_state(&path, &empty).unwrap();

        let back = load_state(&path, LedgerMode::Production).unwrap();
        assert_eq!(back.mode(), LedgerMode::Production);
        assert_eq!(
            back.get_state("person:1").unwrap(),
            Some(br#"{"id":"1"}"#.to_vec())
        );
        assert!(back.get_private_data_hash("secret", "secret:1").unwrap().is_some());
    }
}
