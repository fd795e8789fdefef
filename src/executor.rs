//! Runs units of work inside retryable SQLite write transactions.
//!
//! Every ledger mutation goes through [execute_with_retry] so that the row
//! change and its balance adjustment commit or roll back together, and so
//! that lock contention from another writer is retried in one place instead
//! of at every call site.

use std::{
    thread,
    time::{Duration, Instant},
};

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::Error;

/// Controls how write transactions are retried under contention.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// How many times a unit of work is attempted before giving up.
    pub max_attempts: u32,
    /// Backoff between attempts; attempt `n` sleeps `base_delay * n`.
    pub base_delay: Duration,
    /// Upper bound on the total time spent across attempts and backoff.
    pub max_wait: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_wait: Duration::from_secs(30),
        }
    }
}

/// Execute `unit` inside an IMMEDIATE transaction, retrying the whole unit on
/// lock contention.
///
/// The transaction takes the write lock up front, so a unit of work never
/// fails a lock upgrade halfway through its writes. Each invocation performs
/// exactly one commit or one rollback: if `unit` returns an error the
/// transaction rolls back on drop and nothing it wrote survives.
///
/// `unit` may run several times and must not have observable side effects
/// outside the database.
///
/// # Errors
/// Returns [Error::ResourceBusy] if the database stayed locked for all
/// attempts or the retry budget ran out of time. Any other error from `unit`
/// is propagated unchanged after rollback.
pub fn execute_with_retry<T, F>(
    connection: &mut Connection,
    config: &RetryConfig,
    mut unit: F,
) -> Result<T, Error>
where
    F: FnMut(&SqlTransaction) -> Result<T, Error>,
{
    let started = Instant::now();

    for attempt in 1..=config.max_attempts {
        match execute_once(connection, &mut unit) {
            Err(error) if is_contention(&error) => {
                if attempt == config.max_attempts {
                    break;
                }

                let delay = config.base_delay * attempt;
                if started.elapsed() + delay > config.max_wait {
                    break;
                }

                tracing::warn!("database busy on attempt {attempt}, retrying in {delay:?}");
                thread::sleep(delay);
            }
            result => return result,
        }
    }

    Err(Error::ResourceBusy)
}

fn execute_once<T, F>(connection: &mut Connection, unit: &mut F) -> Result<T, Error>
where
    F: FnMut(&SqlTransaction) -> Result<T, Error>,
{
    let transaction = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let value = unit(&transaction)?;
    transaction.commit()?;

    Ok(value)
}

fn is_contention(error: &Error) -> bool {
    matches!(
        error,
        Error::SqlError(rusqlite::Error::SqliteFailure(code, _))
            if code.code == rusqlite::ErrorCode::DatabaseBusy
                || code.code == rusqlite::ErrorCode::DatabaseLocked
    )
}
