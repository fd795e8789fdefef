//! Defines the account model and its database queries.

use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    database_id::AccountId,
    money::{decimal_from_column, parse_decimal},
    transaction_type::TransactionType,
};

/// The currency tag assigned to accounts that do not specify one.
pub const DEFAULT_CURRENCY: &str = "BYN";

/// A named pot of money whose balance tracks its transaction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The ID of the account.
    pub id: AccountId,
    /// The unique, human-readable name of the account.
    pub name: String,
    /// The running balance: the signed sum of the account's transactions.
    pub balance: Decimal,
    /// Opaque currency tag. No conversion is performed anywhere.
    pub currency: String,
    /// Optional free-text description.
    pub description: Option<String>,
}

/// A new account to be stored in the database.
///
/// Accounts open with a zero balance so that the stored balance is always
/// recoverable from transaction history alone.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    /// The unique name for the account.
    pub name: String,
    /// The currency tag to store with the account.
    pub currency: String,
    /// Optional free-text description.
    pub description: Option<String>,
}

impl NewAccount {
    /// Create a new account with the default currency and no description.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            currency: DEFAULT_CURRENCY.to_owned(),
            description: None,
        }
    }

    /// Set the currency tag for the account.
    pub fn currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_owned();
        self
    }

    /// Set the description for the account.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }
}

/// Create the accounts table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_accounts_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                balance TEXT NOT NULL DEFAULT '0',
                currency TEXT NOT NULL DEFAULT 'BYN',
                description TEXT
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to an [Account].
pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        balance: decimal_from_column(row, 2)?,
        currency: row.get(3)?,
        description: row.get(4)?,
    })
}

/// Create a new account in the database with a zero balance.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateAccountName] if an account with the same name exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_account(new: &NewAccount, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare(
            "INSERT INTO accounts (name, balance, currency, description)
             VALUES (?1, '0', ?2, ?3)
             RETURNING id, name, balance, currency, description",
        )?
        .query_row(
            params![new.name, new.currency, new.description],
            map_row_to_account,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateAccountName(new.name.clone()),
            error => error.into(),
        })
}

/// Retrieve an account from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::AccountNotFound] if `id` does not refer to a valid account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_account(id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare(
            "SELECT id, name, balance, currency, description FROM accounts WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_row_to_account)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::AccountNotFound(id),
            error => error.into(),
        })
}

/// Retrieve all accounts, ordered by ID.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn list_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare("SELECT id, name, balance, currency, description FROM accounts ORDER BY id ASC")?
        .query_map([], map_row_to_account)?
        .map(|account_result| account_result.map_err(Error::SqlError))
        .collect()
}

/// The account used when a transaction does not specify one: the account
/// with the lowest ID.
///
/// # Errors
/// This function will return a:
/// - [Error::NoAccountAvailable] if there are no accounts in the database,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn default_account_id(connection: &Connection) -> Result<AccountId, Error> {
    connection
        .query_row("SELECT id FROM accounts ORDER BY id ASC LIMIT 1", [], |row| {
            row.get(0)
        })
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::NoAccountAvailable,
            error => error.into(),
        })
}

/// Delete an account that no transactions reference.
///
/// # Errors
/// This function will return a:
/// - [Error::AccountInUse] if transactions still reference the account,
/// - [Error::AccountNotFound] if `id` does not refer to a valid account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_account(id: AccountId, connection: &Connection) -> Result<(), Error> {
    let references: i64 = connection.query_row(
        "SELECT COUNT(id) FROM transactions WHERE account_id = ?1",
        params![id],
        |row| row.get(0),
    )?;

    if references > 0 {
        return Err(Error::AccountInUse(id));
    }

    let rows_affected = connection.execute("DELETE FROM accounts WHERE id = ?1", params![id])?;
    if rows_affected == 0 {
        return Err(Error::AccountNotFound(id));
    }

    Ok(())
}

/// Adjust an account's balance by `delta`.
///
/// The read-modify-write must run inside a write transaction; the ledger
/// engine only calls this through the retry executor.
///
/// # Errors
/// This function will return a:
/// - [Error::AccountNotFound] if `id` does not refer to a valid account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn adjust_balance(id: AccountId, delta: Decimal, connection: &Connection) -> Result<(), Error> {
    let balance: String = connection
        .query_row(
            "SELECT balance FROM accounts WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::AccountNotFound(id),
            error => error.into(),
        })?;

    let balance = parse_decimal(&balance)? + delta;

    connection.execute(
        "UPDATE accounts SET balance = ?1 WHERE id = ?2",
        params![balance.to_string(), id],
    )?;

    Ok(())
}

/// Rebuild an account's balance from its full transaction history and store
/// the result, returning the recomputed balance.
///
/// Incremental maintenance is where drift bugs hide; this is the audit and
/// repair operation.
///
/// # Errors
/// This function will return a:
/// - [Error::AccountNotFound] if `id` does not refer to a valid account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn recompute_balance(id: AccountId, connection: &Connection) -> Result<Decimal, Error> {
    get_account(id, connection)?;

    let effects = connection
        .prepare("SELECT amount, type FROM transactions WHERE account_id = ?1")?
        .query_map(params![id], |row| {
            Ok((decimal_from_column(row, 0)?, row.get::<_, TransactionType>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let total = effects
        .into_iter()
        .fold(Decimal::ZERO, |sum, (amount, kind)| sum + kind.signed(amount));

    connection.execute(
        "UPDATE accounts SET balance = ?1 WHERE id = ?2",
        params![total.to_string(), id],
    )?;

    Ok(total)
}

/// Get the total balance across all accounts.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn total_balance(connection: &Connection) -> Result<Decimal, Error> {
    let balances = connection
        .prepare("SELECT balance FROM accounts")?
        .query_map([], |row| decimal_from_column(row, 0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(balances.into_iter().sum())
}
