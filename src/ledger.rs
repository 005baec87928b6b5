use rust_decimal::Decimal;
use tokio::sync::{Mutex, MutexGuard};

use crate::dto::{names_match, Account, BalanceRow};
use crate::error::{Error, Result};
use crate::stores::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Run each load-mutate-save cycle under a single writer lock.
    ///
    /// Without it, concurrent deposits/transfers on the same account lose updates:
    /// both read the old balance and the later save wins.
    pub serialize_writes: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            serialize_writes: true,
        }
    }
}

/// Balances of both parties right after a transfer committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub sender_balance: Decimal,
    pub receiver_balance: Decimal,
}

/// Account operations over a [`Store`].
///
/// Every call loads the full document, works on that copy and, for mutations,
/// saves the full document back. Nothing is cached between calls.
pub struct Ledger<S> {
    store: S,
    write_lock: Option<Mutex<()>>,
}

impl<S: Store> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, LedgerConfig::default())
    }

    pub fn with_config(store: S, config: LedgerConfig) -> Self {
        Self {
            store,
            write_lock: config.serialize_writes.then(|| Mutex::new(())),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn lock_writes(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.write_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }

    /// First account whose name matches `name` ignoring case.
    pub async fn find_account(&self, name: &str) -> Result<Option<Account>> {
        let document = self.store.load().await?;
        Ok(document.find(name).cloned())
    }

    async fn require_account(&self, name: &str) -> Result<Account> {
        self.find_account(name)
            .await?
            .ok_or_else(|| Error::not_found(name))
    }

    /// Checks `pin` against the account's PIN, case-sensitively.
    pub async fn authenticate(&self, name: &str, pin: &str) -> Result<()> {
        tracing::debug!(account = name, "authenticate");
        let account = self.require_account(name).await?;
        if account.pin != pin {
            tracing::warn!(account = name, "authentication rejected");
            return Err(Error::InvalidCredentials);
        }
        Ok(())
    }

    pub async fn balance(&self, name: &str) -> Result<Decimal> {
        Ok(self.require_account(name).await?.balance)
    }

    /// Adds `amount` to the account and returns the new balance.
    pub async fn deposit(&self, name: &str, amount: Decimal) -> Result<Decimal> {
        tracing::debug!(account = name, %amount, "deposit");
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }

        let _guard = self.lock_writes().await;
        let mut document = self.store.load().await?;
        let account = document
            .find_mut(name)
            .ok_or_else(|| Error::not_found(name))?;
        let balance = account
            .balance
            .checked_add(amount)
            .ok_or(Error::InvalidAmount(amount))?;
        account.balance = balance;

        self.store.save(&document).await?;
        tracing::info!(account = name, %amount, %balance, "deposit committed");
        Ok(balance)
    }

    /// Authenticates the sender, then moves `amount` to the receiver.
    ///
    /// The PIN check and the funds movement are separate load cycles; the
    /// sender's balance is re-read by [`Ledger::move_funds`].
    pub async fn transfer(
        &self,
        sender: &str,
        sender_pin: &str,
        receiver: &str,
        amount: Decimal,
    ) -> Result<Transfer> {
        self.authenticate(sender, sender_pin).await?;
        self.move_funds(sender, receiver, amount).await
    }

    /// Moves `amount` from `sender` to `receiver` in one load/save cycle.
    ///
    /// Does NOT check the sender's PIN. Callers must authenticate first, or use
    /// [`Ledger::transfer`] which does both.
    pub async fn move_funds(
        &self,
        sender: &str,
        receiver: &str,
        amount: Decimal,
    ) -> Result<Transfer> {
        tracing::debug!(sender, receiver, %amount, "transfer");
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }
        if names_match(sender, receiver) {
            return Err(Error::SameAccount);
        }

        let _guard = self.lock_writes().await;
        let mut document = self.store.load().await?;
        let from = document
            .position(sender)
            .ok_or_else(|| Error::not_found(sender))?;
        let to = document
            .position(receiver)
            .ok_or_else(|| Error::not_found(receiver))?;

        let available = document.accounts[from].balance;
        if available < amount {
            tracing::warn!(sender, %available, %amount, "transfer rejected: insufficient funds");
            return Err(Error::InsufficientFunds {
                available,
                requested: amount,
            });
        }
        let transfer = Transfer {
            sender_balance: available
                .checked_sub(amount)
                .ok_or(Error::InvalidAmount(amount))?,
            receiver_balance: document.accounts[to]
                .balance
                .checked_add(amount)
                .ok_or(Error::InvalidAmount(amount))?,
        };
        document.accounts[from].balance = transfer.sender_balance;
        document.accounts[to].balance = transfer.receiver_balance;

        self.store.save(&document).await?;
        tracing::info!(sender, receiver, %amount, "transfer committed");
        Ok(transfer)
    }

    /// Account names in document order.
    pub async fn account_names(&self) -> Result<Vec<String>> {
        Ok(self.store.load().await?.names())
    }

    /// Names and balances of every account, in document order.
    pub async fn balances(&self) -> Result<Vec<BalanceRow>> {
        let document = self.store.load().await?;
        Ok(document.accounts.iter().map(BalanceRow::from).collect())
    }
}
