//! Transaction row storage.
//!
//! These are the raw row operations; balance co-maintenance lives in the
//! ledger engine, which is the only caller of the mutating functions here.

mod core;

pub use core::{
    Transaction, count_transactions, create_transactions_table, delete_transaction_row,
    get_transaction, insert_transaction, map_transaction_row, update_transaction_row,
};
