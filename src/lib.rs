//! Kopeck is a personal finance ledger that records expenses and income
//! against one or more accounts while keeping every account's running balance
//! equal to the signed sum of its transaction history.
//!
//! The heart of the crate is the [Ledger] engine: each mutation inserts,
//! updates, or deletes a transaction row and adjusts the affected account
//! balance inside a single SQLite transaction, retried transparently under
//! write contention. Read-only reports (period listings, per-category totals,
//! per-day totals) run outside the write path.

#![warn(missing_docs)]

use rust_decimal::Decimal;

mod account;
mod category;
mod database_id;
mod db;
mod executor;
mod ledger;
mod money;
mod report;
mod transaction;
mod transaction_type;

pub use account::{Account, DEFAULT_CURRENCY, NewAccount};
pub use category::Category;
pub use database_id::{AccountId, CategoryId, DatabaseId, TransactionId};
pub use db::{configure, initialize as initialize_db, seed_defaults};
pub use executor::{RetryConfig, execute_with_retry};
pub use ledger::{Ledger, NewTransaction, TransactionUpdate};
pub use report::{
    CategoryTotal, DailyTotal, Period, TransactionFilter, TransactionRecord, YearMonth,
};
pub use transaction::Transaction;
pub use transaction_type::TransactionType;

/// The errors that may occur in the ledger.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A transaction amount of zero or less was given.
    ///
    /// Amounts are stored positive; whether money entered or left the account
    /// is carried by the transaction type.
    #[error("transaction amounts must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    /// A transaction was given a type that does not match its category's type.
    #[error("the category \"{category}\" records {expected} transactions, not {requested}")]
    CategoryTypeMismatch {
        /// The name of the category the transaction referenced.
        category: String,
        /// The type the category is declared with.
        expected: TransactionType,
        /// The type the caller asked to record.
        requested: TransactionType,
    },

    /// The named category does not exist in the database.
    #[error("the category \"{0}\" does not exist")]
    CategoryNotFound(String),

    /// The account ID does not refer to an account in the database.
    #[error("the account with ID {0} does not exist")]
    AccountNotFound(AccountId),

    /// The transaction ID does not refer to a transaction in the database.
    #[error("the transaction with ID {0} does not exist")]
    TransactionNotFound(TransactionId),

    /// A transaction was recorded without an account ID and there are no
    /// accounts to fall back to. The caller must create an account first.
    #[error("no accounts are available to record transactions against")]
    NoAccountAvailable,

    /// The specified category name already exists in the database.
    #[error("the category \"{0}\" already exists in the database")]
    DuplicateCategoryName(String),

    /// The specified account name already exists in the database.
    #[error("the account \"{0}\" already exists in the database")]
    DuplicateAccountName(String),

    /// Tried to delete an account that transactions still reference.
    #[error("the account with ID {0} is still referenced by transactions")]
    AccountInUse(AccountId),

    /// Tried to delete a category that transactions still reference.
    #[error("the category with ID {0} is still referenced by transactions")]
    CategoryInUse(CategoryId),

    /// A stored amount could not be parsed as a decimal.
    #[error("could not parse \"{0}\" as a decimal amount")]
    InvalidDecimal(String),

    /// A month string was not in `YYYY-MM` format.
    #[error("could not parse \"{0}\" as a month in YYYY-MM format")]
    InvalidMonth(String),

    /// The database stayed locked by another writer for the whole retry
    /// budget. The caller may retry the operation later.
    #[error("the database is busy, the operation was abandoned after retrying")]
    ResourceBusy,

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
