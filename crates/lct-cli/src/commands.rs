use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use colored::Colorize;
use lct_assets::{Asset, Identity};
use lct_ledger::MemoryLedger;
use lct_sdk::{load_schema, load_state, save_state, Contract, ContractConfig, SdkError};
use lct_types::HasStatus;
use serde_json::{json, Value};
use tracing::debug;

use crate::cli::*;

/// A contract together with the ledger state it runs against.
struct Host {
    contract: Contract,
    ledger: MemoryLedger,
    state: PathBuf,
}

impl Host {
    fn open(cli: &Cli) -> anyhow::Result<Self> {
        let config = match &cli.config {
            Some(path) => ContractConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ContractConfig::default(),
        };
        let schema = load_schema(&cli.schema)
            .with_context(|| format!("failed to load schema {}", cli.schema.display()))?;
        let ledger = load_state(&cli.state, config.ledger.mode)
            .with_context(|| format!("failed to load state {}", cli.state.display()))?;
        let contract = Contract::new(schema, Vec::new(), config)?;
        debug!(state = %cli.state.display(), entries = ledger.len(), "host ready");
        Ok(Self {
            contract,
            ledger,
            state: cli.state.clone(),
        })
    }

    /// Run `f` inside a fresh ledger transaction.
    fn in_tx<T>(&self, f: impl FnOnce(&MemoryLedger) -> T) -> anyhow::Result<T> {
        let tx_id = format!("lct-{}", Utc::now().format("%Y%m%dT%H%M%S%.6fZ"));
        self.ledger.start_tx(tx_id)?;
        let out = f(&self.ledger);
        self.ledger.end_tx()?;
        Ok(out)
    }

    fn save(&self) -> anyhow::Result<()> {
        save_state(&self.state, &self.ledger)
            .with_context(|| format!("failed to save state {}", self.state.display()))
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let host = Host::open(&cli)?;
    let format = cli.format;
    match cli.command {
        Command::Txs => cmd_txs(&host, format),
        Command::Schema(args) => cmd_schema(&host, args, format),
        Command::Query(args) => cmd_call(&host, args, format, false),
        Command::Invoke(args) => cmd_call(&host, args, format, true),
        Command::Put(args) => cmd_put(&host, args, format),
        Command::Config => cmd_config(&host),
    }
}

fn cmd_txs(host: &Host, format: OutputFormat) -> anyhow::Result<()> {
    let summaries = host.contract.transactions();
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string(&summaries)?);
        return Ok(());
    }
    for summary in &summaries {
        let read_only = host
            .contract
            .transaction(&summary.tag)
            .is_some_and(|tx| tx.read_only);
        let marker = if read_only { "query" } else { "invoke" };
        println!(
            "  {} {} {}",
            format!("{:<20}", summary.tag).bold(),
            format!("{marker:<7}").dimmed(),
            summary.label
        );
    }
    Ok(())
}

fn cmd_schema(host: &Host, args: SchemaArgs, format: OutputFormat) -> anyhow::Result<()> {
    let request = match &args.asset_type {
        Some(tag) => json!({ "assetType": tag }),
        None => Value::Null,
    };
    let value = host
        .contract
        .query(&host.ledger, "getSchema", &request)
        .map_err(|e| failure("getSchema", e))?;
    print_value(format, "getSchema", &value)
}

fn cmd_call(host: &Host, call: CallArgs, format: OutputFormat, write: bool) -> anyhow::Result<()> {
    let args: Value = serde_json::from_str(&call.args).context("--args is not valid JSON")?;
    let value = if write {
        host.in_tx(|ledger| host.contract.invoke(ledger, &call.tag, &args))?
    } else {
        host.contract.query(&host.ledger, &call.tag, &args)
    }
    .map_err(|e| failure(&call.tag, e))?;

    if write {
        host.save()?;
    }
    print_value(format, &call.tag, &value)
}

fn cmd_put(host: &Host, put: PutArgs, format: OutputFormat) -> anyhow::Result<()> {
    let value: Value = serde_json::from_str(&put.asset).context("asset is not valid JSON")?;
    let asset = Asset::from_value(&host.contract.schema(), &value)?;
    host.in_tx(|ledger| asset.put(ledger))??;
    host.save()?;

    match format {
        OutputFormat::Json => println!("{}", json!({ "@key": asset.key() })),
        OutputFormat::Text => println!("{} stored {}", "✓".green().bold(), asset.key().yellow()),
    }
    Ok(())
}

fn cmd_config(host: &Host) -> anyhow::Result<()> {
    print!("{}", host.contract.config().to_toml_string()?);
    Ok(())
}

fn failure(tag: &str, err: SdkError) -> anyhow::Error {
    let status = err.status();
    anyhow::Error::new(err).context(format!("{tag} failed with status {status}"))
}

fn print_value(format: OutputFormat, tag: &str, value: &Value) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{value}"),
        OutputFormat::Text => {
            println!("{} {}", "✓".green().bold(), tag.bold());
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use std::path::Path;

    const SCHEMA: &str = r#"{"assetTypes": [
        {"tag": "person", "props": [
            {"tag": "id", "dataType": "string", "isKey": true},
            {"tag": "name", "dataType": "string"}
        ]}
    ]}"#;

    fn run(dir: &Path, args: &[&str]) -> anyhow::Result<()> {
        let schema = dir.join("schema.json");
        let state = dir.join("ledger.json");
        let mut argv = vec![
            "lct".to_string(),
            "--schema".into(),
            schema.display().to_string(),
            "--state".into(),
            state.display().to_string(),
            "--format".into(),
            "json".into(),
        ];
        argv.extend(args.iter().map(|a| a.to_string()));
        run_command(Cli::try_parse_from(argv)?)
    }

    fn workspace() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();
        dir
    }

    fn state(dir: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(dir.join("ledger.json")).unwrap()).unwrap()
    }

    #[test]
    fn put_saves_state() {
        let dir = workspace();
        run(dir.path(), &["put", r#"{"@assetType":"person","id":"1","name":"Ada"}"#]).unwrap();
        let public = state(dir.path())["public"].as_object().cloned().unwrap();
        assert_eq!(public.len(), 1);
        let stored = public.values().next().unwrap();
        assert_eq!(stored["name"], "Ada");
    }

    #[test]
    fn query_reads_without_saving() {
        let dir = workspace();
        run(dir.path(), &["put", r#"{"@assetType":"person","id":"1","name":"Ada"}"#]).unwrap();
        let before = fs::read_to_string(dir.path().join("ledger.json")).unwrap();

        run(
            dir.path(),
            &["query", "readAsset", "-a", r#"{"key":{"@assetType":"person","id":"1"}}"#],
        )
        .unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("ledger.json")).unwrap(), before);
    }

    #[test]
    fn invoke_saves_even_for_builtins() {
        let dir = workspace();
        assert!(!dir.path().join("ledger.json").exists());
        run(dir.path(), &["invoke", "getHeader"]).unwrap();
        assert!(dir.path().join("ledger.json").exists());
    }

    #[test]
    fn failures_carry_status() {
        let dir = workspace();
        let err = run(dir.path(), &["query", "noSuchTx"]).unwrap_err();
        assert!(err.to_string().contains("status 400"));

        let err = run(
            dir.path(),
            &["query", "readAsset", "-a", r#"{"key":{"@assetType":"person","id":"9"}}"#],
        )
        .unwrap_err();
        assert!(err.to_string().contains("status 404"));

        assert!(run(dir.path(), &["invoke", "readAsset", "-a", "not json"]).is_err());
        assert!(run(dir.path(), &["put", r#"{"@assetType":"car"}"#]).is_err());
    }

    #[test]
    fn missing_schema_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(dir.path(), &["txs"]).unwrap_err();
        assert!(err.to_string().contains("failed to load schema"));
    }

    #[test]
    fn listing_commands_succeed() {
        let dir = workspace();
        run(dir.path(), &["txs"]).unwrap();
        run(dir.path(), &["schema"]).unwrap();
        run(dir.path(), &["schema", "person"]).unwrap();
        run(dir.path(), &["config"]).unwrap();
        assert!(run(dir.path(), &["schema", "car"]).is_err());
    }
}
