//! CaskDB CLI
//!
//! Command-line interface for inspecting and editing a CaskDB data file.

use std::path::PathBuf;
use std::process::ExitCode;

use caskdb::record::Recovery;
use caskdb::{Config, DiskStore, SyncStrategy};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

/// CaskDB CLI
#[derive(Parser, Debug)]
#[command(name = "caskdb-cli")]
#[command(about = "CLI for the CaskDB embedded key-value store")]
#[command(version)]
struct Args {
    /// Data file
    #[arg(short, long, default_value = "./cask.db")]
    path: PathBuf,

    /// When to fsync the data file after a write
    #[arg(short, long, value_enum, default_value = "every-write")]
    sync: SyncArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// List all keys
    Keys,

    /// Print key count, file size and recovery report
    Stats,

    /// Scan the data file without modifying it
    Verify,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SyncArg {
    Never,
    EveryWrite,
}

impl From<SyncArg> for SyncStrategy {
    fn from(arg: SyncArg) -> Self {
        match arg {
            SyncArg::Never => SyncStrategy::Never,
            SyncArg::EveryWrite => SyncStrategy::EveryWrite,
        }
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,caskdb=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> caskdb::Result<()> {
    if let Commands::Verify = args.command {
        let result = Recovery::verify(&args.path)?;
        println!("records:         {}", result.records_scanned);
        println!("live keys:       {}", result.live_keys);
        println!("valid length:    {}", result.valid_len);
        println!("torn tail bytes: {}", result.bytes_discarded);
        return Ok(());
    }

    // only `set` may create or repair the data file
    let read_only = !matches!(args.command, Commands::Set { .. });
    let config = Config::builder()
        .path(&args.path)
        .sync_strategy(args.sync.into())
        .read_only(read_only)
        .build();
    let store = DiskStore::open(config)?;

    match args.command {
        Commands::Get { key } => match store.get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("(not found)"),
        },
        Commands::Set { key, value } => {
            store.set(&key, &value)?;
            println!("OK");
        }
        Commands::Keys => {
            let mut keys = store.keys()?;
            keys.sort();
            for key in keys {
                println!("{}", key);
            }
        }
        Commands::Stats => {
            let stats = store.stats()?;
            println!("live keys:       {}", stats.live_keys);
            println!("file length:     {}", stats.file_len);
            println!("records on open: {}", stats.recovery.records_scanned);
            println!("torn tail bytes: {}", stats.recovery.bytes_discarded);
        }
        // handled before opening the store
        Commands::Verify => {}
    }

    store.close()
}
