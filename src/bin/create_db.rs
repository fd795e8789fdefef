use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use kopeck::{configure, initialize_db, seed_defaults};

/// A utility for creating and seeding a kopeck ledger database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create a ledger database with the default categories and account.
fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let args = Args::parse();
    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_ledger.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_ledger.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    tracing::info!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;

    configure(&connection)?;
    initialize_db(&connection)?;

    tracing::info!("Seeding default categories and account...");
    seed_defaults(&connection)?;

    tracing::info!("Success!");

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
