//! Defines the route handler for the main ledger page: the current balance,
//! the entry forms, and the full transaction history.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use time::UtcOffset;

use crate::{
    AppState, Error,
    balance::compute_balance,
    endpoints,
    flash::{Flash, take_flash},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        alert, base, format_currency,
    },
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::core::{Transaction, get_all_transactions},
};

use super::table::transaction_table;

/// The state needed for the ledger page.
#[derive(Debug, Clone)]
pub struct LedgerPageState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LedgerPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the ledger page.
///
/// If the store cannot be read the page still renders with an empty history,
/// a zero balance, and a warning banner. Any pending flash message from a
/// form submission is displayed once and cleared.
pub async fn get_ledger_page(
    State(state): State<LedgerPageState>,
    jar: PrivateCookieJar,
) -> Response {
    let (jar, flash) = take_flash(jar);

    let local_offset = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };

    let mut notices: Vec<Flash> = flash.into_iter().collect();

    let transactions = match load_transactions(&state) {
        Ok(transactions) => transactions,
        Err(error) => {
            tracing::error!("could not load the ledger: {error}");
            notices.push(Flash::danger(format!("Database error: {error}")));
            Vec::new()
        }
    };

    let balance = compute_balance(&transactions);

    (
        jar,
        ledger_view(balance, &transactions, &notices, local_offset),
    )
        .into_response()
}

fn load_transactions(state: &LedgerPageState) -> Result<Vec<Transaction>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_all_transactions(&connection)
}

fn ledger_view(
    balance: f64,
    transactions: &[Transaction],
    notices: &[Flash],
    local_offset: UtcOffset,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::LEDGER_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full lg:max-w-5xl lg:mx-auto space-y-6"
            {
                @for notice in notices {
                    (alert(notice))
                }

                section class="rounded bg-gray-50 dark:bg-gray-800 p-6"
                {
                    h2 class="text-sm font-medium uppercase text-gray-500 dark:text-gray-400"
                    {
                        "Current Balance"
                    }

                    p class="text-3xl font-bold" { (format_currency(balance)) }
                }

                section class="grid gap-6 lg:grid-cols-3"
                {
                    (income_form())
                    (expense_form())
                    (adjustment_form())
                }

                section class="rounded bg-gray-50 dark:bg-gray-800 overflow-hidden"
                {
                    header class="flex justify-between flex-wrap items-end px-6 pt-4"
                    {
                        h1 class="text-xl font-bold" { "History" }
                    }

                    (transaction_table(
                        transactions,
                        local_offset,
                        "No transactions recorded yet.",
                    ))
                }
            }
        }
    };

    base("Ledger", &content)
}

fn text_input(id_prefix: &str, name: &str, label: &str) -> Markup {
    let id = format!("{id_prefix}-{name}");

    html! {
        div
        {
            label for=(id) class=(FORM_LABEL_STYLE) { (label) }

            input type="text" name=(name) id=(id) class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

fn amount_input(id_prefix: &str, allow_negative: bool) -> Markup {
    let id = format!("{id_prefix}-amount");

    html! {
        div
        {
            label for=(id) class=(FORM_LABEL_STYLE) { "Amount" }

            @if allow_negative {
                input type="number" name="amount" id=(id) step="0.01"
                    class=(FORM_TEXT_INPUT_STYLE) required;
            } @else {
                input type="number" name="amount" id=(id) step="0.01" min="0.01"
                    class=(FORM_TEXT_INPUT_STYLE) required;
            }
        }
    }
}

fn entry_form(title: &str, form_type: &str, submit_label: &str, fields: Markup) -> Markup {
    html! {
        form
            hx-post=(endpoints::LEDGER_VIEW)
            class="rounded bg-gray-50 dark:bg-gray-800 p-6 space-y-4"
        {
            h2 class="text-lg font-bold" { (title) }

            input type="hidden" name="form_type" value=(form_type);

            (fields)

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
        }
    }
}

fn income_form() -> Markup {
    entry_form(
        "Record Income",
        "income",
        "Add Income",
        html! {
            (amount_input("income", false))
            (text_input("income", "truck_id", "Truck"))
            (text_input("income", "note", "Note"))
        },
    )
}

fn expense_form() -> Markup {
    entry_form(
        "Record Expense",
        "expense",
        "Add Expense",
        html! {
            (amount_input("expense", false))
            (text_input("expense", "truck_id", "Truck"))
            (text_input("expense", "expense_type", "Category"))
            (text_input("expense", "note", "Note"))
        },
    )
}

fn adjustment_form() -> Markup {
    entry_form(
        "Adjust Balance",
        "adjustment",
        "Adjust Balance",
        html! {
            (amount_input("adjustment", true))
            (text_input("adjustment", "note", "Note"))
        },
    )
}


#[cfg(test)]
mod flash_flow_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, build_router, endpoints};

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, "42", "Etc/UTC").unwrap();

        TestServer::builder()
            .save_cookies()
            .try_build(build_router(state))
            .expect("Could not create test server.")
    }

    #[tokio::test]
    async fn successful_income_shows_flash_once() {
        let server = get_test_server();

        server
            .post(endpoints::LEDGER_VIEW)
            .form(&[
                ("form_type", "income"),
                ("amount", "100"),
                ("truck_id", "truck-1"),
                ("note", ""),
            ])
            .await
            .assert_status_see_other();

        let page = server.get(endpoints::LEDGER_VIEW).await.text();
        assert!(page.contains("Income added successfully!"), "got: {page}");
        assert!(page.contains("$100.00"), "got: {page}");

        // The flash is cleared after it has been shown once.
        let page = server.get(endpoints::LEDGER_VIEW).await.text();
        assert!(!page.contains("Income added successfully!"), "got: {page}");
    }

    #[tokio::test]
    async fn invalid_amount_shows_error_flash_and_keeps_ledger_empty() {
        let server = get_test_server();

        server
            .post(endpoints::LEDGER_VIEW)
            .form(&[("form_type", "income"), ("amount", "-1")])
            .await
            .assert_status_see_other();

        let page = server.get(endpoints::LEDGER_VIEW).await.text();
        assert!(page.contains("Error: Amount must be positive"), "got: {page}");
        assert!(page.contains("$0.00"), "got: {page}");
    }

    #[tokio::test]
    async fn unknown_operation_shows_notice() {
        let server = get_test_server();

        server
            .post(endpoints::LEDGER_VIEW)
            .form(&[("form_type", "transfer"), ("amount", "10")])
            .await
            .assert_status_see_other();

        let page = server.get(endpoints::LEDGER_VIEW).await.text();
        assert!(page.contains("Unknown form submitted."), "got: {page}");
    }
}
