//! Derives the account balance from the transaction history.

use crate::transaction::{Transaction, TransactionKind};

/// Compute the net account balance from `transactions`.
///
/// Income and inward adjustments add their amount, expenses and outward
/// adjustments subtract it. Amounts are stored as non-negative magnitudes,
/// so the direction comes entirely from the transaction kind.
///
/// Returns `0.0` for an empty history.
pub fn compute_balance(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .fold(0.0, |balance, transaction| match transaction.kind {
            TransactionKind::Income | TransactionKind::AdjustmentIn => {
                balance + transaction.amount
            }
            TransactionKind::Expense | TransactionKind::AdjustmentOut => {
                balance - transaction.amount
            }
        })
}
