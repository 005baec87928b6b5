//! Front-end commands: each one is run against a [`Ledger`] and its result is
//! written as CSV (with a header row) to the provided writer.

use clap::Subcommand;
use csv_async::{AsyncReaderBuilder, Error as CsvError, Trim};
use rust_decimal::Decimal;
use std::error::Error as StdError;
use std::io::Write;
use std::iter;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

use crate::{
    csv_utils::write_csv,
    dto::{BalanceRow, BatchRow, NameRow, OperationType},
    Error, Ledger, Store,
};

const BUFFER_SIZE: usize = 1024;

type Result<T, E = Box<dyn StdError + Send + Sync>> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// List account names
    Accounts,
    /// Check a PIN and show the balance
    Login { name: String, pin: String },
    /// Show an account balance
    Balance { name: String },
    /// Deposit funds into an account
    Deposit {
        name: String,
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
    },
    /// Transfer funds between two accounts
    Transfer {
        sender: String,
        pin: String,
        receiver: String,
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
    },
    /// Show every account balance
    Statement,
    /// Apply deposits/transfers from a CSV file (type,name,pin,receiver,amount)
    Batch { path: PathBuf },
}

/// Runs a single command and writes its result to `writer`.
///
/// # Errors
/// Returns an error if:
/// * The ledger rejects the operation (see [`Error`])
/// * The batch file cannot be read or is malformed
/// * Writing to the output fails
pub async fn run<S, W>(command: Command, ledger: &Ledger<S>, writer: W) -> Result<()>
where
    S: Store,
    W: Write,
{
    match command {
        Command::Accounts => {
            let names = ledger.account_names().await?;
            write_csv(writer, names.into_iter().map(|name| NameRow { name }))?;
        }
        Command::Login { name, pin } => {
            ledger.authenticate(&name, &pin).await?;
            let balance = ledger.balance(&name).await?;
            let name = stored_name(ledger, name).await?;
            write_csv(writer, iter::once(BalanceRow { name, balance }))?;
        }
        Command::Balance { name } => {
            let balance = ledger.balance(&name).await?;
            let name = stored_name(ledger, name).await?;
            write_csv(writer, iter::once(BalanceRow { name, balance }))?;
        }
        Command::Deposit { name, amount } => {
            let balance = ledger.deposit(&name, amount).await?;
            let name = stored_name(ledger, name).await?;
            write_csv(writer, iter::once(BalanceRow { name, balance }))?;
        }
        Command::Transfer {
            sender,
            pin,
            receiver,
            amount,
        } => {
            let transfer = ledger.transfer(&sender, &pin, &receiver, amount).await?;
            let rows = [
                BalanceRow {
                    name: stored_name(ledger, sender).await?,
                    balance: transfer.sender_balance,
                },
                BalanceRow {
                    name: stored_name(ledger, receiver).await?,
                    balance: transfer.receiver_balance,
                },
            ];
            write_csv(writer, rows.into_iter())?;
        }
        Command::Statement => {
            write_csv(writer, ledger.balances().await?.into_iter())?;
        }
        Command::Batch { path } => {
            run_batch(path, ledger).await?;
            write_csv(writer, ledger.balances().await?.into_iter())?;
        }
    }
    Ok(())
}

/// The account's name as stored, or `name` as given if it no longer resolves.
async fn stored_name<S: Store>(ledger: &Ledger<S>, name: String) -> Result<String, Error> {
    Ok(ledger
        .find_account(&name)
        .await?
        .map_or(name, |account| account.name))
}

/// Streams rows from the batch file through a channel and applies them in order.
///
/// Rows rejected by the ledger for client-side reasons are logged and skipped.
/// Storage failures and malformed CSV abort the batch.
async fn run_batch<S: Store>(path: PathBuf, ledger: &Ledger<S>) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(BUFFER_SIZE);
    let reader_handle = tokio::spawn(read_batch(path, tx));

    let mut line = 1;
    while let Some(row) = rx.recv().await {
        line += 1;
        match apply_row(ledger, row).await {
            Ok(()) => {}
            Err(err) if err.is_client_error() => {
                tracing::warn!(line, error = %err, "batch row skipped");
            }
            Err(err) => return Err(err.into()),
        }
    }

    // Propagate read/parse errors once the reader is done
    reader_handle.await??;
    Ok(())
}

/// Reads and deserializes batch rows from a CSV file.
/// Returns them through the provided channel.
async fn read_batch(
    input_path: impl AsRef<Path> + Send,
    tx: mpsc::Sender<BatchRow>,
) -> Result<(), CsvError> {
    let file = File::open(input_path).await?;
    let mut csv_reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .create_deserializer(file);

    let mut records = csv_reader.deserialize::<BatchRow>();
    while let Some(result) = records.next().await {
        let row = result?;
        if tx.send(row).await.is_err() {
            // Processor stopped early
            break;
        }
    }
    Ok(())
}

async fn apply_row<S: Store>(ledger: &Ledger<S>, row: BatchRow) -> Result<(), Error> {
    match row.op_type {
        OperationType::Deposit => {
            ledger.deposit(&row.name, row.amount).await?;
        }
        OperationType::Transfer => {
            let pin = row.pin.ok_or(Error::InvalidCredentials)?;
            let receiver = row.receiver.ok_or_else(|| Error::not_found(""))?;
            ledger.transfer(&row.name, &pin, &receiver, row.amount).await?;
        }
    }
    Ok(())
}
