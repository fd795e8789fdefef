//! Category and daily aggregation over transaction history.
//!
//! Amounts are stored as decimal text, so sums are computed here rather
//! than in SQL.

use std::collections::HashMap;

use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

use crate::{Error, money::decimal_from_column, transaction_type::TransactionType};

use super::period::YearMonth;

/// The summed amounts of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The name of the category.
    pub name: String,
    /// The sum of transaction amounts recorded under the category.
    pub total: Decimal,
}

/// Income and expense totals for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    /// The day of the month, starting at 1.
    pub day: u8,
    /// The sum of income amounts on the day.
    pub income: Decimal,
    /// The sum of expense amounts on the day.
    pub expense: Decimal,
}

/// Sum transaction amounts of one type per category name, largest total
/// first.
///
/// Restricts to `month` when given, otherwise spans all history. Categories
/// with no matching transactions are omitted.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Row mapping fails
pub fn category_totals(
    kind: TransactionType,
    month: Option<YearMonth>,
    connection: &Connection,
) -> Result<Vec<CategoryTotal>, Error> {
    let mut query = String::from(
        "SELECT c.name, t.amount FROM transactions t \
         JOIN categories c ON t.category_id = c.id \
         WHERE t.type = ?",
    );
    let mut params: Vec<String> = vec![kind.as_str().to_owned()];

    if let Some(month) = month {
        query.push_str(" AND t.date BETWEEN ? AND ?");
        params.push(month.first_day().to_string());
        params.push(month.last_day().to_string());
    }

    let amounts = connection
        .prepare(&query)?
        .query_map(rusqlite::params_from_iter(params), |row| {
            Ok((row.get::<_, String>(0)?, decimal_from_column(row, 1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut totals: HashMap<String, Decimal> = HashMap::new();
    for (name, amount) in amounts {
        *totals.entry(name).or_insert(Decimal::ZERO) += amount;
    }

    let mut totals: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(name, total)| CategoryTotal { name, total })
        .collect();
    totals.sort_by(|a, b| b.total.cmp(&a.total).then(a.name.cmp(&b.name)));

    Ok(totals)
}

/// Income and expense totals for every calendar day of `month`.
///
/// Days with no activity are present with zero totals, so the result always
/// has one entry per day of the month, in ascending day order.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Row mapping fails
pub fn daily_totals(month: YearMonth, connection: &Connection) -> Result<Vec<DailyTotal>, Error> {
    let rows = connection
        .prepare("SELECT date, amount, type FROM transactions WHERE date BETWEEN ?1 AND ?2")?
        .query_map(params![month.first_day(), month.last_day()], |row| {
            Ok((
                row.get::<_, Date>(0)?,
                decimal_from_column(row, 1)?,
                row.get::<_, TransactionType>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut by_day: HashMap<u8, (Decimal, Decimal)> = HashMap::new();
    for (date, amount, kind) in rows {
        let entry = by_day
            .entry(date.day())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        match kind {
            TransactionType::Income => entry.0 += amount,
            TransactionType::Expense => entry.1 += amount,
        }
    }

    Ok((1..=month.days())
        .map(|day| {
            let (income, expense) = by_day
                .get(&day)
                .copied()
                .unwrap_or((Decimal::ZERO, Decimal::ZERO));
            DailyTotal {
                day,
                income,
                expense,
            }
        })
        .collect())
}
