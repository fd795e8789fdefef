//! Connection configuration and schema bootstrap for the ledger database.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{Error, account, category, transaction, transaction_type::TransactionType};

/// Apply the per-connection pragmas the ledger relies on.
///
/// Write-ahead logging keeps readers unblocked while a writer holds the
/// database, and `foreign_keys` must be switched on per connection for the
/// schema's references to be enforced.
///
/// # Errors
/// Returns an error if a pragma cannot be applied.
pub fn configure(connection: &Connection) -> Result<(), Error> {
    // journal_mode is a query-style pragma: it reports the resulting mode.
    connection.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
    connection.pragma_update(None, "synchronous", "NORMAL")?;
    connection.pragma_update(None, "foreign_keys", "ON")?;

    Ok(())
}

/// Create the ledger tables in the database.
///
/// Safe to call on an already initialised database.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    account::create_accounts_table(&transaction)?;
    category::create_categories_table(&transaction)?;
    transaction::create_transactions_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Insert the default categories and account, skipping rows that already
/// exist.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn seed_defaults(connection: &Connection) -> Result<(), Error> {
    const DEFAULT_CATEGORIES: [(&str, TransactionType); 3] = [
        ("Food", TransactionType::Expense),
        ("Transport", TransactionType::Expense),
        ("Salary", TransactionType::Income),
    ];

    for (name, kind) in DEFAULT_CATEGORIES {
        connection.execute(
            "INSERT OR IGNORE INTO categories (name, type) VALUES (?1, ?2)",
            (name, kind),
        )?;
    }

    connection.execute(
        "INSERT OR IGNORE INTO accounts (name, balance) VALUES ('Main', '0')",
        (),
    )?;

    Ok(())
}
