//! Transaction listings with joined category and account names.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    database_id::{AccountId, TransactionId},
    money::decimal_from_column,
    transaction_type::TransactionType,
};

use super::period::Period;

/// Filters for listing transactions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransactionFilter {
    /// The period to restrict the listing to, relative to today.
    pub period: Period,
    /// Restrict the listing to one transaction type.
    pub kind: Option<TransactionType>,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            period: Period::All,
            kind: None,
        }
    }
}

/// A transaction row joined with its category and account names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned.
    pub amount: Decimal,
    /// The name of the category the transaction is recorded under.
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// Whether the transaction is an expense or income.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The name of the account the transaction is recorded against.
    pub account: String,
    /// The ID of the account the transaction is recorded against.
    pub account_id: AccountId,
}

/// Get transactions matching `filter`, newest first.
///
/// `today` anchors the relative period presets.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn list_transactions(
    filter: &TransactionFilter,
    today: Date,
    connection: &Connection,
) -> Result<Vec<TransactionRecord>, Error> {
    let mut query = String::from(
        "SELECT t.id, t.amount, c.name, t.date, t.description, t.type, a.name, a.id \
         FROM transactions t \
         JOIN categories c ON t.category_id = c.id \
         JOIN accounts a ON t.account_id = a.id",
    );
    let mut conditions = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some((start, end)) = filter.period.range(today) {
        conditions.push("t.date BETWEEN ? AND ?");
        params.push(start.to_string());
        params.push(end.to_string());
    }

    if let Some(kind) = filter.kind {
        conditions.push("t.type = ?");
        params.push(kind.as_str().to_owned());
    }

    if !conditions.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&conditions.join(" AND "));
    }

    // Sort by date, then ID to keep transaction order stable after updates.
    query.push_str(" ORDER BY t.date DESC, t.id ASC");

    connection
        .prepare(&query)?
        .query_map(rusqlite::params_from_iter(params), |row| {
            Ok(TransactionRecord {
                id: row.get(0)?,
                amount: decimal_from_column(row, 1)?,
                category: row.get(2)?,
                date: row.get(3)?,
                description: row.get(4)?,
                kind: row.get(5)?,
                account: row.get(6)?,
                account_id: row.get(7)?,
            })
        })?
        .map(|record_result| record_result.map_err(Error::SqlError))
        .collect()
}
