//! Account management and balance maintenance.
//!
//! An account's stored balance is maintained incrementally by the ledger
//! engine; [recompute_balance] rebuilds it from transaction history for
//! audit and repair.

mod core;

pub use core::{
    Account, DEFAULT_CURRENCY, NewAccount, adjust_balance, create_account, create_accounts_table,
    default_account_id, delete_account, get_account, list_accounts, map_row_to_account,
    recompute_balance, total_balance,
};
