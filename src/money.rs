//! Conversion helpers between SQLite TEXT columns and decimal amounts.
//!
//! Amounts and balances are stored as decimal text rather than REAL so that
//! no money value ever passes through binary floating point.

use std::str::FromStr;

use rusqlite::{Row, types::Type};
use rust_decimal::Decimal;

use crate::Error;

/// Read a TEXT column at `index` as a decimal amount.
pub(crate) fn decimal_from_column(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let text: String = row.get(index)?;

    Decimal::from_str(&text)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

/// Parse a decimal amount from database text.
pub(crate) fn parse_decimal(text: &str) -> Result<Decimal, Error> {
    Decimal::from_str(text).map_err(|_| Error::InvalidDecimal(text.to_owned()))
}
