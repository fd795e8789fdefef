//! Read-only projections over the ledger store.
//!
//! Nothing here mutates state; queries run on the shared connection outside
//! any write transaction.

mod period;
mod totals;
mod transactions;

pub use period::{Period, YearMonth};
pub use totals::{CategoryTotal, DailyTotal, category_totals, daily_totals};
pub use transactions::{TransactionFilter, TransactionRecord, list_transactions};
