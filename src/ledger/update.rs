//! Rewriting recorded transactions.

use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error, account, category,
    database_id::{AccountId, TransactionId},
    transaction,
    transaction_type::TransactionType,
};

use super::Ledger;

/// Replacement field values for a recorded transaction.
///
/// Optional fields that are left unset keep the stored values.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionUpdate {
    /// The new amount. Must be greater than zero.
    pub amount: Decimal,
    /// The name of the category to record the transaction under. The
    /// category's type must equal `kind`.
    pub category: String,
    /// Whether the transaction is an expense or income.
    pub kind: TransactionType,
    /// The account to move the transaction to. Unset keeps the old account.
    pub account_id: Option<AccountId>,
    /// The new date. Unset keeps the old date.
    pub date: Option<Date>,
    /// The new description. Unset keeps the old description.
    pub description: Option<String>,
}

impl TransactionUpdate {
    /// Start an update with the required fields.
    pub fn new(amount: Decimal, category: &str, kind: TransactionType) -> Self {
        Self {
            amount,
            category: category.to_owned(),
            kind,
            account_id: None,
            date: None,
            description: None,
        }
    }

    /// Move the transaction to another account.
    pub fn account_id(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Set a new date for the transaction.
    pub fn date(mut self, date: Date) -> Self {
        self.date = Some(date);
        self
    }

    /// Set a new description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }
}

impl Ledger {
    /// Overwrite a recorded transaction and reconcile the affected account
    /// balances, atomically.
    ///
    /// The old effect is reversed and the new effect applied in the same
    /// unit of work. When the transaction stays on one account the two
    /// deltas collapse into a single balance adjustment, so no intermediate
    /// balance is ever committed.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NonPositiveAmount] if the amount is zero or negative,
    /// - [Error::TransactionNotFound] if `id` does not refer to a valid
    ///   transaction,
    /// - [Error::CategoryNotFound] if the named category does not exist,
    /// - [Error::CategoryTypeMismatch] if the category's type differs from
    ///   the transaction's,
    /// - [Error::AccountNotFound] if an explicit account ID is invalid,
    /// - [Error::ResourceBusy] if the database stayed locked,
    /// - or [Error::SqlError] if there is some other SQL error.
    pub fn update_transaction(
        &self,
        id: TransactionId,
        update: &TransactionUpdate,
    ) -> Result<(), Error> {
        if update.amount <= Decimal::ZERO {
            return Err(Error::NonPositiveAmount(update.amount));
        }

        self.execute_write(|tx| {
            let old = transaction::get_transaction(id, tx)?;

            let category = category::get_category_by_name(&update.category, tx)?;
            if category.kind != update.kind {
                return Err(Error::CategoryTypeMismatch {
                    category: category.name,
                    expected: category.kind,
                    requested: update.kind,
                });
            }

            let account_id = update.account_id.unwrap_or(old.account_id);
            if account_id != old.account_id {
                account::get_account(account_id, tx)?;
            }

            transaction::update_transaction_row(
                id,
                update.amount,
                category.id,
                update.date.unwrap_or(old.date),
                update.description.as_deref().or(old.description.as_deref()),
                update.kind,
                account_id,
                tx,
            )?;

            let old_effect = old.kind.signed(old.amount);
            let new_effect = update.kind.signed(update.amount);

            if account_id == old.account_id {
                account::adjust_balance(account_id, new_effect - old_effect, tx)?;
            } else {
                account::adjust_balance(old.account_id, -old_effect, tx)?;
                account::adjust_balance(account_id, new_effect, tx)?;
            }

            Ok(())
        })
    }
}
