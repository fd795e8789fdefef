//! The closed expense/income classification shared by categories and
//! transactions.

use std::fmt::{self, Display};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a transaction records money leaving or entering an account.
///
/// A category is declared with a type, and every transaction recorded under
/// it must carry the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money spent from an account.
    Expense,
    /// Money earned into an account.
    Income,
}

impl TransactionType {
    /// The value stored in the database `type` columns.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    /// The effect of `amount` on an account balance: positive for income,
    /// negative for expense.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            other => Err(FromSqlError::Other(
                format!("invalid transaction type {other:?}").into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::TransactionType;

    #[test]
    fn income_keeps_sign() {
        assert_eq!(TransactionType::Income.signed(dec!(12.30)), dec!(12.30));
    }

    #[test]
    fn expense_negates() {
        assert_eq!(TransactionType::Expense.signed(dec!(12.30)), dec!(-12.30));
    }

    #[test]
    fn round_trips_through_sql_text() {
        let connection = rusqlite::Connection::open_in_memory().unwrap();

        let got: TransactionType = connection
            .query_row("SELECT ?1", [TransactionType::Expense], |row| row.get(0))
            .unwrap();

        assert_eq!(got, TransactionType::Expense);
    }
}
