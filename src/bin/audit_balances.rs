use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use kopeck::{Ledger, RetryConfig};

/// A utility for auditing stored account balances against transaction
/// history.
///
/// Each account's balance is recomputed from scratch; drifted balances are
/// repaired in place and reported.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the ledger SQLite database.
    #[arg(long)]
    db_path: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let args = Args::parse();
    let db_path = Path::new(&args.db_path);

    if !db_path.is_file() {
        eprintln!("File does not exist at {db_path:#?}!");
        exit(1);
    }

    let connection = Connection::open(db_path)?;
    let ledger = Ledger::new(connection, RetryConfig::default())?;

    let mut drifted = 0;
    for account in ledger.list_accounts()? {
        let stored = account.balance;
        let recomputed = ledger.recompute_balance(account.id)?;

        if stored == recomputed {
            tracing::info!(
                "account {} ({}): balance {} verified",
                account.id,
                account.name,
                stored
            );
        } else {
            drifted += 1;
            tracing::warn!(
                "account {} ({}): stored balance {} corrected to {}",
                account.id,
                account.name,
                stored,
                recomputed
            );
        }
    }

    if drifted == 0 {
        tracing::info!("All account balances verified.");
    } else {
        tracing::warn!("{drifted} account balance(s) drifted and were repaired.");
    }

    Ok(())
}

fn setup_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_filter(filter::LevelFilter::INFO),
        )
        .init();
}
