//! Removing recorded transactions.

use crate::{
    Error, account, database_id::TransactionId, transaction, transaction::Transaction,
};

use super::Ledger;

impl Ledger {
    /// Remove a recorded transaction and reverse its effect on the account
    /// balance, atomically.
    ///
    /// Returns the deleted transaction so the caller can confirm or audit
    /// what was removed.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::TransactionNotFound] if `id` does not refer to a valid
    ///   transaction,
    /// - [Error::ResourceBusy] if the database stayed locked,
    /// - or [Error::SqlError] if there is some other SQL error.
    pub fn delete_transaction(&self, id: TransactionId) -> Result<Transaction, Error> {
        self.execute_write(|tx| {
            let old = transaction::get_transaction(id, tx)?;

            transaction::delete_transaction_row(id, tx)?;
            account::adjust_balance(old.account_id, -old.kind.signed(old.amount), tx)?;

            Ok(old)
        })
    }
}
