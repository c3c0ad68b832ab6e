//! Defines the core data model and database queries for ledger transactions.

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Error;

/// Alias for the integer type used for mapping to database IDs.
pub type TransactionId = i64;

/// The direction and category of a ledger transaction.
///
/// Amounts are stored as non-negative magnitudes, so the kind carries the
/// sign: income and inward adjustments add to the balance, expenses and
/// outward adjustments subtract from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money earned by a truck.
    Income,
    /// Money spent on a truck.
    Expense,
    /// A manual correction that raises the balance.
    AdjustmentIn,
    /// A manual correction that lowers the balance.
    AdjustmentOut,
}

impl TransactionKind {
    /// The name the kind is stored under in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::AdjustmentIn => "adjustment_in",
            TransactionKind::AdjustmentOut => "adjustment_out",
        }
    }

    /// Look up a kind by its stored name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            "adjustment_in" => Some(TransactionKind::AdjustmentIn),
            "adjustment_out" => Some(TransactionKind::AdjustmentOut),
            _ => None,
        }
    }

    /// The name to display in transaction tables.
    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
            TransactionKind::AdjustmentIn => "Adjustment (in)",
            TransactionKind::AdjustmentOut => "Adjustment (out)",
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let name = value.as_str()?;

        TransactionKind::from_name(name).ok_or_else(|| {
            FromSqlError::Other(format!("unknown transaction kind {name:?}").into())
        })
    }
}

/// One recorded financial event: income, expense, or balance adjustment.
///
/// Transactions are never updated or deleted. Corrections are made by
/// recording new adjustment entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The direction and category of the transaction.
    pub kind: TransactionKind,
    /// The truck this transaction relates to, if any.
    pub truck_id: Option<String>,
    /// The magnitude of the transaction, always non-negative.
    pub amount: f64,
    /// A free-text expense category, e.g. "Fuel". Only meaningful for expenses.
    pub expense_type: Option<String>,
    /// A free-text annotation.
    pub note: Option<String>,
    /// When the transaction was recorded, in UTC.
    pub occurred_at: OffsetDateTime,
}

/// The fields needed to record a new [Transaction].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The direction and category of the transaction.
    pub kind: TransactionKind,
    /// The truck this transaction relates to, if any.
    pub truck_id: Option<String>,
    /// The magnitude of the transaction, always non-negative.
    pub amount: f64,
    /// A free-text expense category, e.g. "Fuel". Only meaningful for expenses.
    pub expense_type: Option<String>,
    /// A free-text annotation.
    pub note: Option<String>,
    /// When the transaction was recorded, in UTC.
    pub occurred_at: OffsetDateTime,
}

/// Create a new transaction in the database.
///
/// The insert is a single statement, so it either commits fully or leaves
/// the database untouched.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO ledger_entry (kind, truck_id, amount, expense_type, note, occurred_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, kind, truck_id, amount, expense_type, note, occurred_at",
        )?
        .query_row(
            (
                new_transaction.kind,
                &new_transaction.truck_id,
                new_transaction.amount,
                &new_transaction.expense_type,
                &new_transaction.note,
                new_transaction.occurred_at,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve every transaction, ordered by when it occurred.
///
/// Entries recorded at the same instant keep their insertion order.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, kind, truck_id, amount, expense_type, note, occurred_at
             FROM ledger_entry
             ORDER BY occurred_at ASC, id ASC",
        )?
        .query_map((), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM ledger_entry;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the ledger table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS ledger_entry (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                truck_id TEXT,
                amount REAL NOT NULL,
                expense_type TEXT,
                note TEXT,
                occurred_at TEXT NOT NULL
                )",
        (),
    )?;

    // Index used by the date-ordered listing queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_ledger_entry_occurred_at ON ledger_entry(occurred_at);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let kind = row.get(1)?;
    let truck_id = row.get(2)?;
    let amount = row.get(3)?;
    let expense_type = row.get(4)?;
    let note = row.get(5)?;
    let occurred_at = row.get(6)?;

    Ok(Transaction {
        id,
        kind,
        truck_id,
        amount,
        expense_type,
        note,
        occurred_at,
    })
}
