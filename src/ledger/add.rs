//! Recording new transactions.

use rust_decimal::Decimal;
use time::{Date, OffsetDateTime};

use crate::{
    Error, account,
    category,
    database_id::AccountId,
    transaction::{self, Transaction},
    transaction_type::TransactionType,
};

use super::Ledger;

/// A transaction to be recorded against the ledger.
///
/// To record it, pass the value to [Ledger::add_transaction].
///
/// # Examples
///
/// ```ignore
/// use rust_decimal_macros::dec;
/// use time::macros::date;
///
/// let new = NewTransaction::new(dec!(12.30), "Food", TransactionType::Expense)
///     .date(date!(2024 - 08 - 07))
///     .description("groceries");
/// let transaction = ledger.add_transaction(&new)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The amount of money spent or earned. Must be greater than zero; the
    /// balance effect's sign comes from `kind`.
    pub amount: Decimal,
    /// The name of the category to record the transaction under. The
    /// category's type must equal `kind`.
    pub category: String,
    /// Whether the transaction is an expense or income.
    pub kind: TransactionType,
    /// The account to record against. Defaults to the account with the
    /// lowest ID.
    pub account_id: Option<AccountId>,
    /// When the transaction happened. Defaults to today.
    pub date: Option<Date>,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
}

impl NewTransaction {
    /// Start a new transaction with the required fields.
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

    /// Set the account to record the transaction against.
    pub fn account_id(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Set the date the transaction happened.
    pub fn date(mut self, date: Date) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }
}

impl Ledger {
    /// Record a new transaction and apply its effect to the affected
    /// account's balance, atomically.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NonPositiveAmount] if the amount is zero or negative,
    /// - [Error::CategoryNotFound] if the named category does not exist,
    /// - [Error::CategoryTypeMismatch] if the category's type differs from
    ///   the transaction's,
    /// - [Error::AccountNotFound] if an explicit account ID is invalid,
    /// - [Error::NoAccountAvailable] if no account ID was given and there
    ///   are no accounts,
    /// - [Error::ResourceBusy] if the database stayed locked,
    /// - or [Error::SqlError] if there is some other SQL error.
    pub fn add_transaction(&self, new: &NewTransaction) -> Result<Transaction, Error> {
        if new.amount <= Decimal::ZERO {
            return Err(Error::NonPositiveAmount(new.amount));
        }

        let today = OffsetDateTime::now_utc().date();

        self.execute_write(|tx| {
            let category = category::get_category_by_name(&new.category, tx)?;
            if category.kind != new.kind {
                return Err(Error::CategoryTypeMismatch {
                    category: category.name,
                    expected: category.kind,
                    requested: new.kind,
                });
            }

            let account_id = match new.account_id {
                Some(id) => account::get_account(id, tx)?.id,
                None => account::default_account_id(tx)?,
            };

            let record = transaction::insert_transaction(
                new.amount,
                category.id,
                new.date.unwrap_or(today),
                new.description.as_deref(),
                new.kind,
                account_id,
                tx,
            )?;

            account::adjust_balance(account_id, new.kind.signed(new.amount), tx)?;

            Ok(record)
        })
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error, Ledger, NewAccount, RetryConfig, TransactionType,
    };

    use super::NewTransaction;

    fn test_ledger() -> Ledger {
        let connection = Connection::open_in_memory().unwrap();
        let ledger = Ledger::new(connection, RetryConfig::default()).unwrap();
        ledger.create_account(&NewAccount::new("Main")).unwrap();
        ledger
            .create_category("Salary", TransactionType::Income)
            .unwrap();
        ledger
            .create_category("Food", TransactionType::Expense)
            .unwrap();
        ledger
    }

    fn main_balance(ledger: &Ledger) -> Decimal {
        ledger.list_accounts().unwrap()[0].balance
    }

    #[test]
    fn income_increases_balance() {
        let ledger = test_ledger();

        let transaction = ledger
            .add_transaction(&NewTransaction::new(
                dec!(1000),
                "Salary",
                TransactionType::Income,
            ))
            .unwrap();

        assert!(transaction.id > 0);
        assert_eq!(main_balance(&ledger), dec!(1000));
    }

    #[test]
    fn expense_decreases_balance() {
        let ledger = test_ledger();

        ledger
            .add_transaction(&NewTransaction::new(
                dec!(300),
                "Food",
                TransactionType::Expense,
            ))
            .unwrap();

        assert_eq!(main_balance(&ledger), dec!(-300));
    }

    #[test]
    fn rejects_zero_amount() {
        let ledger = test_ledger();

        let result = ledger.add_transaction(&NewTransaction::new(
            Decimal::ZERO,
            "Food",
            TransactionType::Expense,
        ));

        assert_eq!(result, Err(Error::NonPositiveAmount(Decimal::ZERO)));
        assert_eq!(main_balance(&ledger), Decimal::ZERO);
    }

    #[test]
    fn rejects_negative_amount() {
        let ledger = test_ledger();

        let result = ledger.add_transaction(&NewTransaction::new(
            dec!(-5),
            "Food",
            TransactionType::Expense,
        ));

        assert_eq!(result, Err(Error::NonPositiveAmount(dec!(-5))));
    }

    #[test]
    fn rejects_category_type_mismatch() {
        let ledger = test_ledger();

        let result = ledger.add_transaction(&NewTransaction::new(
            dec!(100),
            "Salary",
            TransactionType::Expense,
        ));

        assert_eq!(
            result,
            Err(Error::CategoryTypeMismatch {
                category: "Salary".to_owned(),
                expected: TransactionType::Income,
                requested: TransactionType::Expense,
            })
        );
        assert_eq!(main_balance(&ledger), Decimal::ZERO);
    }

    #[test]
    fn rejects_unknown_category() {
        let ledger = test_ledger();

        let result = ledger.add_transaction(&NewTransaction::new(
            dec!(100),
            "Yachts",
            TransactionType::Expense,
        ));

        assert_eq!(result, Err(Error::CategoryNotFound("Yachts".to_owned())));
    }

    #[test]
    fn rejects_unknown_account() {
        let ledger = test_ledger();

        let result = ledger.add_transaction(
            &NewTransaction::new(dec!(100), "Food", TransactionType::Expense).account_id(42),
        );

        assert_eq!(result, Err(Error::AccountNotFound(42)));
        assert_eq!(main_balance(&ledger), Decimal::ZERO);
    }

    #[test]
    fn defaults_to_lowest_account_id() {
        let ledger = test_ledger();
        ledger.create_account(&NewAccount::new("Savings")).unwrap();
        let accounts = ledger.list_accounts().unwrap();

        let transaction = ledger
            .add_transaction(&NewTransaction::new(
                dec!(100),
                "Salary",
                TransactionType::Income,
            ))
            .unwrap();

        assert_eq!(transaction.account_id, accounts[0].id);
    }

    #[test]
    fn fails_without_any_account() {
        let connection = Connection::open_in_memory().unwrap();
        let ledger = Ledger::new(connection, RetryConfig::default()).unwrap();
        ledger
            .create_category("Food", TransactionType::Expense)
            .unwrap();

        let result = ledger.add_transaction(&NewTransaction::new(
            dec!(100),
            "Food",
            TransactionType::Expense,
        ));

        assert_eq!(result, Err(Error::NoAccountAvailable));
    }

    #[test]
    fn keeps_explicit_date_and_description() {
        let ledger = test_ledger();

        let transaction = ledger
            .add_transaction(
                &NewTransaction::new(dec!(12.30), "Food", TransactionType::Expense)
                    .date(date!(2024 - 08 - 07))
                    .description("groceries"),
            )
            .unwrap();

        assert_eq!(transaction.date, date!(2024 - 08 - 07));
        assert_eq!(transaction.description, Some("groceries".to_owned()));
        assert_eq!(transaction.amount, dec!(12.30));
    }
}
