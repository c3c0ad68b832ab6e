//! The API endpoints URIs.

/// The main page: current balance, entry forms, and the full history.
/// Entry forms also POST to this route.
pub const LEDGER_VIEW: &str = "/";
/// The page for displaying the transaction history, optionally windowed.
pub const HISTORY_VIEW: &str = "/history";
