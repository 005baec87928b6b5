use clap::{Parser, ValueEnum};
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process;

use pin_ledger::{run, Command, JsonFileStore, Ledger, LedgerConfig, MemoryStore};

/// PIN-protected account ledger
#[derive(Parser)]
#[command(name = "pin-ledger", author, version, about, long_about = None)]
struct Cli {
    /// Storage backend
    #[arg(long, value_enum, env = "PIN_LEDGER_STORE", default_value = "file", global = true)]
    store: StoreKind,

    /// Ledger document path (file backend)
    #[arg(long, env = "PIN_LEDGER_PATH", default_value = "data/ledger.json", global = true)]
    path: PathBuf,

    /// Disable write serialization (diagnostics only; concurrent writers may lose updates)
    #[arg(long, global = true)]
    unserialized: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StoreKind {
    Memory,
    File,
}

#[tokio::main]
async fn main() {
    pin_ledger::logging::init();
    let cli = Cli::parse();

    if let Err(err) = run_app(cli).await {
        eprintln!("Error: {}", err);
        process::exit(exit_code(&*err));
    }
}

async fn run_app(cli: Cli) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = LedgerConfig {
        serialize_writes: !cli.unserialized,
    };
    match cli.store {
        StoreKind::Memory => {
            let ledger = Ledger::with_config(MemoryStore::new(), config);
            run(cli.command, &ledger, io::stdout()).await
        }
        StoreKind::File => {
            let ledger = Ledger::with_config(JsonFileStore::new(cli.path), config);
            run(cli.command, &ledger, io::stdout()).await
        }
    }
}

/// 2 for requests the ledger rejected, 1 for everything else.
fn exit_code(err: &(dyn Error + Send + Sync + 'static)) -> i32 {
    match err.downcast_ref::<pin_ledger::Error>() {
        Some(ledger_err) if ledger_err.is_client_error() => 2,
        _ => 1,
    }
}
