//! Defines the transaction model and its database queries.

use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{AccountId, CategoryId, TransactionId},
    money::decimal_from_column,
    transaction_type::TransactionType,
};

/// An expense or income, i.e. an event where money was either spent or
/// earned against an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned. Always positive; the balance
    /// effect's sign comes from `kind`.
    pub amount: Decimal,
    /// The ID of the category the transaction is recorded under.
    pub category_id: CategoryId,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// Whether the transaction is an expense or income.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The ID of the account the transaction is recorded against.
    pub account_id: AccountId,
}

/// Create the transactions table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transactions_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount TEXT NOT NULL,
                category_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                description TEXT,
                type TEXT NOT NULL CHECK(type IN ('expense', 'income')),
                account_id INTEGER NOT NULL,
                FOREIGN KEY(category_id) REFERENCES categories(id),
                FOREIGN KEY(account_id) REFERENCES accounts(id)
                )",
        (),
    )?;

    // Composite index used by the period and aggregation queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date, category_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        amount: decimal_from_column(row, 1)?,
        category_id: row.get(2)?,
        date: row.get(3)?,
        description: row.get(4)?,
        kind: row.get(5)?,
        account_id: row.get(6)?,
    })
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a valid
///   transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, amount, category_id, date, description, type, account_id
             FROM transactions WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::TransactionNotFound(id),
            error => error.into(),
        })
}

/// Insert a transaction row.
///
/// Referential checks against categories and accounts belong to the caller;
/// the ledger engine resolves both before inserting.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
#[allow(clippy::too_many_arguments)]
pub fn insert_transaction(
    amount: Decimal,
    category_id: CategoryId,
    date: Date,
    description: Option<&str>,
    kind: TransactionType,
    account_id: AccountId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO transactions (amount, category_id, date, description, type, account_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, amount, category_id, date, description, type, account_id",
        )?
        .query_row(
            params![amount.to_string(), category_id, date, description, kind, account_id],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Overwrite a transaction row with new field values.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a valid
///   transaction,
/// - or [Error::SqlError] if there is some other SQL error.
#[allow(clippy::too_many_arguments)]
pub fn update_transaction_row(
    id: TransactionId,
    amount: Decimal,
    category_id: CategoryId,
    date: Date,
    description: Option<&str>,
    kind: TransactionType,
    account_id: AccountId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE transactions
         SET amount = ?1, category_id = ?2, date = ?3, description = ?4, type = ?5, account_id = ?6
         WHERE id = ?7",
        params![amount.to_string(), category_id, date, description, kind, account_id, id],
    )?;

    if rows_affected == 0 {
        return Err(Error::TransactionNotFound(id));
    }

    Ok(())
}

/// Remove a transaction row.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a valid
///   transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction_row(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM transactions WHERE id = ?1", params![id])?;

    if rows_affected == 0 {
        return Err(Error::TransactionNotFound(id));
    }

    Ok(())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM transactions;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        account::{NewAccount, create_account},
        category::create_category,
        db,
        transaction_type::TransactionType,
    };

    use super::{
        count_transactions, delete_transaction_row, get_transaction, insert_transaction,
        update_transaction_row,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::configure(&conn).unwrap();
        db::initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = get_test_connection();
        let account = create_account(&NewAccount::new("Main"), &conn).unwrap();
        let category = create_category("Food", TransactionType::Expense, &conn).unwrap();

        let inserted = insert_transaction(
            dec!(12.30),
            category.id,
            date!(2024 - 08 - 07),
            Some("groceries"),
            TransactionType::Expense,
            account.id,
            &conn,
        )
        .unwrap();

        let selected = get_transaction(inserted.id, &conn).unwrap();

        assert_eq!(inserted, selected);
        assert_eq!(selected.amount, dec!(12.30));
        assert_eq!(selected.date, date!(2024 - 08 - 07));
        assert_eq!(selected.description, Some("groceries".to_owned()));
        assert_eq!(selected.kind, TransactionType::Expense);
    }

    #[test]
    fn get_fails_on_invalid_id() {
        let conn = get_test_connection();

        assert_eq!(
            get_transaction(1337, &conn),
            Err(Error::TransactionNotFound(1337))
        );
    }

    #[test]
    fn update_overwrites_all_fields() {
        let conn = get_test_connection();
        let account = create_account(&NewAccount::new("Main"), &conn).unwrap();
        let other_account = create_account(&NewAccount::new("Card"), &conn).unwrap();
        let food = create_category("Food", TransactionType::Expense, &conn).unwrap();
        let salary = create_category("Salary", TransactionType::Income, &conn).unwrap();
        let inserted = insert_transaction(
            dec!(12.30),
            food.id,
            date!(2024 - 08 - 07),
            None,
            TransactionType::Expense,
            account.id,
            &conn,
        )
        .unwrap();

        update_transaction_row(
            inserted.id,
            dec!(1500),
            salary.id,
            date!(2024 - 08 - 01),
            Some("August pay"),
            TransactionType::Income,
            other_account.id,
            &conn,
        )
        .unwrap();

        let got = get_transaction(inserted.id, &conn).unwrap();
        assert_eq!(got.amount, dec!(1500));
        assert_eq!(got.category_id, salary.id);
        assert_eq!(got.date, date!(2024 - 08 - 01));
        assert_eq!(got.description, Some("August pay".to_owned()));
        assert_eq!(got.kind, TransactionType::Income);
        assert_eq!(got.account_id, other_account.id);
    }

    #[test]
    fn update_fails_on_invalid_id() {
        let conn = get_test_connection();
        let account = create_account(&NewAccount::new("Main"), &conn).unwrap();
        let category = create_category("Food", TransactionType::Expense, &conn).unwrap();

        let result = update_transaction_row(
            42,
            dec!(1),
            category.id,
            date!(2024 - 08 - 07),
            None,
            TransactionType::Expense,
            account.id,
            &conn,
        );

        assert_eq!(result, Err(Error::TransactionNotFound(42)));
    }

    #[test]
    fn delete_removes_the_row() {
        let conn = get_test_connection();
        let account = create_account(&NewAccount::new("Main"), &conn).unwrap();
        let category = create_category("Food", TransactionType::Expense, &conn).unwrap();
        let inserted = insert_transaction(
            dec!(5),
            category.id,
            date!(2024 - 08 - 07),
            None,
            TransactionType::Expense,
            account.id,
            &conn,
        )
        .unwrap();

        assert_eq!(delete_transaction_row(inserted.id, &conn), Ok(()));
        assert_eq!(
            get_transaction(inserted.id, &conn),
            Err(Error::TransactionNotFound(inserted.id))
        );
    }

    #[test]
    fn delete_fails_on_invalid_id() {
        let conn = get_test_connection();

        assert_eq!(
            delete_transaction_row(42, &conn),
            Err(Error::TransactionNotFound(42))
        );
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let account = create_account(&NewAccount::new("Main"), &conn).unwrap();
        let category = create_category("Food", TransactionType::Expense, &conn).unwrap();
        let want_count = 20;
        for i in 1..=want_count {
            insert_transaction(
                dec!(1) * rust_decimal::Decimal::from(i),
                category.id,
                date!(2024 - 08 - 07),
                None,
                TransactionType::Expense,
                account.id,
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }
}
