//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// The ID of a row in the accounts table.
pub type AccountId = DatabaseId;

/// The ID of a row in the categories table.
pub type CategoryId = DatabaseId;

/// The ID of a row in the transactions table.
pub type TransactionId = DatabaseId;
