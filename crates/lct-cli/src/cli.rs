use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lct",
    about = "Ledger Contract Toolkit: run contract transactions against a local ledger state",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Contract configuration (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Asset schema (JSON, `{"assetTypes": [...]}`)
    #[arg(long, global = true, default_value = "schema.json")]
    pub schema: PathBuf,

    /// Ledger state snapshot (JSON); created on first write
    #[arg(long, global = true, default_value = "ledger.json")]
    pub state: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List registered transactions
    Txs,
    /// Show the asset schema, or one asset type
    Schema(SchemaArgs),
    /// Run a read-only transaction; the state is not saved
    Query(CallArgs),
    /// Run any transaction and save the resulting state
    Invoke(CallArgs),
    /// Write an asset into the state
    Put(PutArgs),
    /// Show the effective configuration
    Config,
}

#[derive(Args)]
pub struct SchemaArgs {
    pub asset_type: Option<String>,
}

#[derive(Args)]
pub struct CallArgs {
    pub tag: String,
    /// Arguments as a JSON object
    #[arg(short, long, default_value = "{}")]
    pub args: String,
}

#[derive(Args)]
pub struct PutArgs {
    /// The asset as a JSON object
    pub asset: String,
}
