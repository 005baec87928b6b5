mod csv_utils;
mod dto;
mod error;
mod ledger;
pub mod logging;
mod runner;
mod stores;

pub use dto::{Account, BalanceRow, BatchRow, Document, OperationType};
pub use error::{Error, Result, StorageError};
pub use ledger::{Ledger, LedgerConfig, Transfer};
pub use runner::{run, Command};
pub use stores::{JsonFileStore, MemoryStore, Store};
