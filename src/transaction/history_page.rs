//! Defines the route handler for the transaction history page, which can
//! display a window of the full history.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::UtcOffset;

use crate::{
    AppState, Error, endpoints,
    flash::Flash,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, alert, base},
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::core::{Transaction, get_all_transactions},
};

use super::table::transaction_table;

/// The query parameters selecting a window of the history.
///
/// Both bounds are 0-based ordinal positions into the time-ordered history
/// and the window is end-exclusive. The bounds arrive as raw text because a
/// bound that does not parse as an integer is treated the same as an absent
/// bound, rather than failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    /// The position of the first transaction to display.
    #[serde(default)]
    line_from: Option<String>,
    /// The position one past the last transaction to display.
    #[serde(default)]
    line_to: Option<String>,
}

impl WindowQuery {
    fn bounds(&self) -> (Option<i64>, Option<i64>) {
        (parse_bound(&self.line_from), parse_bound(&self.line_to))
    }
}

fn parse_bound(raw: &Option<String>) -> Option<i64> {
    raw.as_deref().and_then(|text| text.trim().parse().ok())
}

/// Select the window `[from, to)` of `transactions` by ordinal position.
///
/// Filtering only applies when both bounds are present. Bounds are silently
/// clamped to the available range, so out-of-range or inverted windows yield
/// a truncated or empty slice rather than an error.
fn apply_window(
    transactions: &[Transaction],
    from: Option<i64>,
    to: Option<i64>,
) -> &[Transaction] {
    let (Some(from), Some(to)) = (from, to) else {
        return transactions;
    };

    let len = transactions.len() as i64;
    let start = from.clamp(0, len);
    let end = to.clamp(start, len);

    &transactions[start as usize..end as usize]
}

/// The state needed for the history page.
#[derive(Debug, Clone)]
pub struct HistoryPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HistoryPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the full transaction history, or a window of it.
///
/// If the store cannot be read the page still renders with an empty history
/// and a warning banner.
pub async fn get_history_page(
    State(state): State<HistoryPageState>,
    Query(query): Query<WindowQuery>,
) -> Response {
    let local_offset = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };

    let (transactions, warning) = match load_transactions(&state) {
        Ok(transactions) => (transactions, None),
        Err(error) => {
            tracing::error!("could not load the ledger: {error}");
            (
                Vec::new(),
                Some(Flash::danger(format!("Database error: {error}"))),
            )
        }
    };

    let (from, to) = query.bounds();
    let windowed = apply_window(&transactions, from, to);

    history_view(windowed, warning.as_ref(), local_offset).into_response()
}

fn load_transactions(state: &HistoryPageState) -> Result<Vec<Transaction>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_all_transactions(&connection)
}

fn history_view(
    transactions: &[Transaction],
    warning: Option<&Flash>,
    local_offset: UtcOffset,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::HISTORY_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full lg:max-w-5xl lg:mx-auto space-y-6"
            {
                @if let Some(warning) = warning {
                    (alert(warning))
                }

                section class="rounded bg-gray-50 dark:bg-gray-800 overflow-hidden"
                {
                    header class="flex justify-between flex-wrap items-end px-6 pt-4"
                    {
                        h1 class="text-xl font-bold" { "History" }

                        a href=(endpoints::LEDGER_VIEW) class=(LINK_STYLE)
                        {
                            "Back to Ledger"
                        }
                    }

                    (transaction_table(
                        transactions,
                        local_offset,
                        "No transactions in this window.",
                    ))
                }
            }
        }
    };

    base("History", &content)
}
