use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use truckbooks::{NewTransaction, TransactionKind, create_transaction, initialize_db};

/// A utility for creating a test database for the truckbooks server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating sample ledger entries...");

    let now = OffsetDateTime::now_utc();
    let entries = [
        (
            TransactionKind::Income,
            Some("truck-1"),
            1850.0,
            None,
            Some("Auckland to Wellington freight"),
            30,
        ),
        (
            TransactionKind::Expense,
            Some("truck-1"),
            420.75,
            Some("Fuel"),
            None,
            28,
        ),
        (
            TransactionKind::Income,
            Some("truck-2"),
            960.0,
            None,
            Some("Hamilton livestock run"),
            21,
        ),
        (
            TransactionKind::Expense,
            Some("truck-2"),
            1310.0,
            Some("Repairs"),
            Some("gearbox rebuild"),
            14,
        ),
        (
            TransactionKind::AdjustmentIn,
            None,
            75.5,
            None,
            Some("bank reconciliation"),
            7,
        ),
        (
            TransactionKind::AdjustmentOut,
            None,
            40.0,
            None,
            Some("account fees missed last month"),
            2,
        ),
    ];

    for (kind, truck_id, amount, expense_type, note, days_ago) in entries {
        create_transaction(
            NewTransaction {
                kind,
                truck_id: truck_id.map(str::to_owned),
                amount,
                expense_type: expense_type.map(str::to_owned),
                note: note.map(str::to_owned),
                occurred_at: now - Duration::days(days_ago),
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
