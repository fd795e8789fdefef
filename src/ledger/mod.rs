//! The ledger engine: transaction mutations with balance co-maintenance.
//!
//! Every mutation runs as one unit of work through the retry executor, so a
//! transaction row change and its account balance adjustment commit or roll
//! back together. Two concurrent mutations against the same account
//! serialize on the connection lock and the store's write lock; a caller
//! never observes a balance that disagrees with committed rows.

mod add;
mod delete;
mod update;

pub use add::NewTransaction;
pub use update::TransactionUpdate;

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Transaction as SqlTransaction};
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    Error, account,
    account::{Account, NewAccount},
    category,
    category::Category,
    database_id::{AccountId, CategoryId},
    db,
    executor::{self, RetryConfig},
    report::{self, CategoryTotal, DailyTotal, TransactionFilter, TransactionRecord, YearMonth},
    transaction_type::TransactionType,
};

/// Handle to the ledger store and its mutation engine.
///
/// Cheap to clone; clones share one database connection and serialize their
/// writes through it.
#[derive(Debug, Clone)]
pub struct Ledger {
    connection: Arc<Mutex<Connection>>,
    retry: RetryConfig,
}

impl Ledger {
    /// Open a ledger over `connection`.
    ///
    /// This configures the connection and creates the schema if it does not
    /// exist yet.
    ///
    /// # Errors
    /// Returns an error if the database cannot be configured or initialised.
    pub fn new(connection: Connection, retry: RetryConfig) -> Result<Self, Error> {
        db::configure(&connection)?;
        db::initialize(&connection)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            retry,
        })
    }

    /// Run a unit of work inside a retried write transaction.
    pub(crate) fn execute_write<T>(
        &self,
        unit: impl FnMut(&SqlTransaction) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        executor::execute_with_retry(&mut connection, &self.retry, unit)
    }

    /// Run a read against the shared connection, outside any write
    /// transaction.
    fn with_connection<T>(
        &self,
        read: impl FnOnce(&Connection) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        read(&connection)
    }

    /// Create a new account with a zero balance.
    ///
    /// # Errors
    /// Returns [Error::DuplicateAccountName] if the name is taken, or
    /// [Error::ResourceBusy] if the database stayed locked.
    pub fn create_account(&self, new: &NewAccount) -> Result<Account, Error> {
        self.execute_write(|tx| account::create_account(new, tx))
    }

    /// Retrieve all accounts, ordered by ID.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if there is an SQL error.
    pub fn list_accounts(&self) -> Result<Vec<Account>, Error> {
        self.with_connection(|conn| account::list_accounts(conn))
    }

    /// Delete an account that no transactions reference.
    ///
    /// # Errors
    /// Returns [Error::AccountInUse] while transactions reference the
    /// account, or [Error::AccountNotFound] if it does not exist.
    pub fn delete_account(&self, id: AccountId) -> Result<(), Error> {
        self.execute_write(|tx| account::delete_account(id, tx))
    }

    /// Create a new category.
    ///
    /// # Errors
    /// Returns [Error::DuplicateCategoryName] if the name is taken, or
    /// [Error::ResourceBusy] if the database stayed locked.
    pub fn create_category(&self, name: &str, kind: TransactionType) -> Result<Category, Error> {
        self.execute_write(|tx| category::create_category(name, kind, tx))
    }

    /// Retrieve categories, optionally restricted to one transaction type.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if there is an SQL error.
    pub fn list_categories(&self, kind: Option<TransactionType>) -> Result<Vec<Category>, Error> {
        self.with_connection(|conn| category::list_categories(kind, conn))
    }

    /// Delete a category that no transactions reference.
    ///
    /// # Errors
    /// Returns [Error::CategoryInUse] while transactions reference the
    /// category, or [Error::NotFound] if it does not exist.
    pub fn delete_category(&self, id: CategoryId) -> Result<(), Error> {
        self.execute_write(|tx| category::delete_category(id, tx))
    }

    /// Rebuild an account's balance from its full transaction history,
    /// returning the recomputed balance.
    ///
    /// # Errors
    /// Returns [Error::AccountNotFound] if the account does not exist.
    pub fn recompute_balance(&self, id: AccountId) -> Result<Decimal, Error> {
        self.execute_write(|tx| account::recompute_balance(id, tx))
    }

    /// Get the total balance across all accounts.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if there is an SQL error.
    pub fn total_balance(&self) -> Result<Decimal, Error> {
        self.with_connection(|conn| account::total_balance(conn))
    }

    /// Retrieve transactions matching `filter`, newest first.
    ///
    /// Period presets are anchored on today's date.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if there is an SQL error.
    pub fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<TransactionRecord>, Error> {
        let today = OffsetDateTime::now_utc().date();
        self.with_connection(|conn| report::list_transactions(filter, today, conn))
    }

    /// Sum transaction amounts of one type per category, largest first.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if there is an SQL error.
    pub fn category_totals(
        &self,
        kind: TransactionType,
        month: Option<YearMonth>,
    ) -> Result<Vec<CategoryTotal>, Error> {
        self.with_connection(|conn| report::category_totals(kind, month, conn))
    }

    /// Income and expense totals for every calendar day of `month`,
    /// including days with no activity.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if there is an SQL error.
    pub fn daily_totals(&self, month: YearMonth) -> Result<Vec<DailyTotal>, Error> {
        self.with_connection(|conn| report::daily_totals(month, conn))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use rusqlite::Connection;
    use rust_decimal_macros::dec;

    use crate::{
        Error, NewAccount, NewTransaction, RetryConfig, TransactionType, TransactionUpdate,
    };

    use super::Ledger;

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

    fn main_balance(ledger: &Ledger) -> rust_decimal::Decimal {
        ledger.list_accounts().unwrap()[0].balance
    }

    #[test]
    fn balance_follows_mutation_sequence() {
        let ledger = test_ledger();

        let salary = ledger
            .add_transaction(&NewTransaction::new(
                dec!(1000),
                "Salary",
                TransactionType::Income,
            ))
            .unwrap();
        assert_eq!(main_balance(&ledger), dec!(1000));

        let food = ledger
            .add_transaction(&NewTransaction::new(
                dec!(300),
                "Food",
                TransactionType::Expense,
            ))
            .unwrap();
        assert_eq!(main_balance(&ledger), dec!(700));

        ledger
            .update_transaction(
                food.id,
                &TransactionUpdate::new(dec!(500), "Food", TransactionType::Expense),
            )
            .unwrap();
        assert_eq!(main_balance(&ledger), dec!(500));

        ledger.delete_transaction(salary.id).unwrap();
        assert_eq!(main_balance(&ledger), dec!(-500));
    }

    #[test]
    fn stored_balance_matches_recomputation_after_mutations() {
        let ledger = test_ledger();

        let first = ledger
            .add_transaction(&NewTransaction::new(
                dec!(1234.56),
                "Salary",
                TransactionType::Income,
            ))
            .unwrap();
        ledger
            .add_transaction(&NewTransaction::new(
                dec!(78.90),
                "Food",
                TransactionType::Expense,
            ))
            .unwrap();
        ledger
            .update_transaction(
                first.id,
                &TransactionUpdate::new(dec!(1200), "Salary", TransactionType::Income),
            )
            .unwrap();

        let account_id = ledger.list_accounts().unwrap()[0].id;
        let stored = main_balance(&ledger);
        let recomputed = ledger.recompute_balance(account_id).unwrap();

        assert_eq!(stored, recomputed);
        assert_eq!(stored, dec!(1121.10));
    }

    #[test]
    fn concurrent_additions_serialize_on_one_account() {
        let ledger = test_ledger();
        let threads = 8;
        let additions_per_thread = 10;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let ledger = ledger.clone();
                thread::spawn(move || {
                    for _ in 0..additions_per_thread {
                        ledger
                            .add_transaction(&NewTransaction::new(
                                dec!(1),
                                "Salary",
                                TransactionType::Income,
                            ))
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(
            main_balance(&ledger),
            rust_decimal::Decimal::from(threads * additions_per_thread)
        );
    }

    #[test]
    fn delete_account_is_refused_while_transactions_reference_it() {
        let ledger = test_ledger();
        let account_id = ledger.list_accounts().unwrap()[0].id;
        ledger
            .add_transaction(&NewTransaction::new(
                dec!(10),
                "Food",
                TransactionType::Expense,
            ))
            .unwrap();

        assert_eq!(
            ledger.delete_account(account_id),
            Err(Error::AccountInUse(account_id))
        );
    }

    #[test]
    fn delete_category_is_refused_while_transactions_reference_it() {
        let ledger = test_ledger();
        let food = ledger
            .list_categories(Some(TransactionType::Expense))
            .unwrap()
            .into_iter()
            .find(|category| category.name == "Food")
            .unwrap();
        ledger
            .add_transaction(&NewTransaction::new(
                dec!(10),
                "Food",
                TransactionType::Expense,
            ))
            .unwrap();

        assert_eq!(
            ledger.delete_category(food.id),
            Err(Error::CategoryInUse(food.id))
        );
    }

    #[test]
    fn total_balance_spans_accounts() {
        let ledger = test_ledger();
        let savings = ledger.create_account(&NewAccount::new("Savings")).unwrap();

        ledger
            .add_transaction(&NewTransaction::new(
                dec!(1000),
                "Salary",
                TransactionType::Income,
            ))
            .unwrap();
        ledger
            .add_transaction(
                &NewTransaction::new(dec!(250), "Salary", TransactionType::Income)
                    .account_id(savings.id),
            )
            .unwrap();

        assert_eq!(ledger.total_balance(), Ok(dec!(1250)));
    }
}
