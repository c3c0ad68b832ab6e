//! Defines the endpoint for recording a new ledger entry.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error, endpoints,
    flash::{Flash, set_flash},
    transaction::{NewTransaction, TransactionKind, core::create_transaction},
};

use super::intake::{EntryForm, validate_entry};

/// The state needed to record a ledger entry.
#[derive(Debug, Clone)]
pub struct CreateEntryState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateEntryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for recording one income, expense, or adjustment entry.
///
/// Whatever happens, the client is redirected back to the ledger view with a
/// flash message describing the outcome. Validation and storage failures
/// leave the ledger untouched.
pub async fn create_entry_endpoint(
    State(state): State<CreateEntryState>,
    jar: PrivateCookieJar,
    Form(form): Form<EntryForm>,
) -> Response {
    let entry = match validate_entry(form) {
        Ok(entry) => entry,
        Err(Error::UnknownOperation) => {
            return redirect_with_flash(jar, Flash::danger("Unknown form submitted."));
        }
        Err(error) => {
            return redirect_with_flash(jar, Flash::danger(format!("Error: {error}")));
        }
    };

    // The timestamp is stamped once validation has succeeded, so a stored
    // entry is never dated before the request that created it.
    let new_transaction = NewTransaction {
        kind: entry.kind,
        truck_id: entry.truck_id,
        amount: entry.amount,
        expense_type: entry.expense_type,
        note: entry.note,
        occurred_at: OffsetDateTime::now_utc(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return redirect_with_flash(
                jar,
                Flash::danger(format!("Error: {}", Error::DatabaseLockError)),
            );
        }
    };

    match create_transaction(new_transaction, &connection) {
        Ok(transaction) => {
            let message = match transaction.kind {
                TransactionKind::Income => "Income added successfully!",
                TransactionKind::Expense => "Expense added successfully!",
                TransactionKind::AdjustmentIn | TransactionKind::AdjustmentOut => {
                    "Balance adjusted successfully!"
                }
            };

            redirect_with_flash(jar, Flash::success(message))
        }
        Err(error) => {
            tracing::error!("could not record ledger entry: {error}");
            redirect_with_flash(jar, Flash::danger(format!("Error: {error}")))
        }
    }
}

fn redirect_with_flash(jar: PrivateCookieJar, flash: Flash) -> Response {
    (
        set_flash(jar, &flash),
        HxRedirect(endpoints::LEDGER_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{body::Body, extract::State, http::Response, response::IntoResponse};
    use axum_extra::extract::{Form, PrivateCookieJar};
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use time::OffsetDateTime;

    use crate::{
        db::initialize,
        state::create_cookie_key,
        transaction::{
            TransactionKind, count_transactions, create_entry_endpoint, get_all_transactions,
            intake::EntryForm,
        },
    };

    use super::CreateEntryState;

    fn get_test_state() -> CreateEntryState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        CreateEntryState {
            cookie_key: create_cookie_key("42"),
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn entry_form(form_type: &str, amount: &str) -> EntryForm {
        EntryForm {
            form_type: form_type.to_owned(),
            amount: amount.to_owned(),
            truck_id: None,
            expense_type: None,
            note: None,
        }
    }

    async fn post_entry(state: &CreateEntryState, form: EntryForm) -> Response<Body> {
        create_entry_endpoint(
            State(state.clone()),
            PrivateCookieJar::new(state.cookie_key.clone()),
            Form(form),
        )
        .await
        .into_response()
    }

    #[tokio::test]
    async fn can_record_income() {
        let state = get_test_state();
        let start = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap();

        let response = post_entry(
            &state,
            EntryForm {
                truck_id: Some("truck-3".to_owned()),
                note: Some("Wellington run".to_owned()),
                ..entry_form("income", "1250.50")
            },
        )
        .await;

        assert_redirects_to_ledger_view(response);

        let connection = state.db_connection.lock().unwrap();
        let transactions = get_all_transactions(&connection).unwrap();
        assert_eq!(transactions.len(), 1);

        let transaction = &transactions[0];
        assert_eq!(transaction.kind, TransactionKind::Income);
        assert_eq!(transaction.truck_id, Some("truck-3".to_owned()));
        assert_eq!(transaction.amount, 1250.50);
        assert_eq!(transaction.expense_type, None);
        assert_eq!(transaction.note, Some("Wellington run".to_owned()));
        assert!(
            transaction.occurred_at >= start,
            "entry dated {} which is before the request started at {start}",
            transaction.occurred_at
        );
    }

    #[tokio::test]
    async fn can_record_expense_with_category() {
        let state = get_test_state();

        let response = post_entry(
            &state,
            EntryForm {
                truck_id: Some("truck-3".to_owned()),
                expense_type: Some("Repairs".to_owned()),
                ..entry_form("expense", "320")
            },
        )
        .await;

        assert_redirects_to_ledger_view(response);

        let connection = state.db_connection.lock().unwrap();
        let transactions = get_all_transactions(&connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].kind, TransactionKind::Expense);
        assert_eq!(transactions[0].expense_type, Some("Repairs".to_owned()));
    }

    #[tokio::test]
    async fn negative_adjustment_stores_outward_magnitude() {
        let state = get_test_state();

        let response = post_entry(&state, entry_form("adjustment", "-50")).await;

        assert_redirects_to_ledger_view(response);

        let connection = state.db_connection.lock().unwrap();
        let transactions = get_all_transactions(&connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].kind, TransactionKind::AdjustmentOut);
        assert_eq!(transactions[0].amount, 50.0);
    }

    #[tokio::test]
    async fn rejected_amounts_leave_history_unchanged() {
        let state = get_test_state();

        for (form_type, amount) in [
            ("income", "0"),
            ("income", "-10"),
            ("expense", "0"),
            ("expense", "-2.5"),
            ("adjustment", "0"),
            ("income", "not a number"),
        ] {
            let response = post_entry(&state, entry_form(form_type, amount)).await;
            assert_redirects_to_ledger_view(response);
        }

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection).unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_operation_persists_nothing() {
        let state = get_test_state();

        let response = post_entry(&state, entry_form("transfer", "10")).await;

        assert_redirects_to_ledger_view(response);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection).unwrap(), 0);
    }

    #[tokio::test]
    async fn storage_failure_still_redirects() {
        let state = get_test_state();
        state
            .db_connection
            .lock()
            .unwrap()
            .execute("DROP TABLE ledger_entry", ())
            .unwrap();

        let response = post_entry(&state, entry_form("income", "10")).await;

        assert_redirects_to_ledger_view(response);
    }

    #[track_caller]
    fn assert_redirects_to_ledger_view(response: Response<Body>) {
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);

        let location = response
            .headers()
            .get(HX_REDIRECT)
            .expect("expected response to have the header hx-redirect");
        assert_eq!(
            location, "/",
            "got redirect to {location:?}, want redirect to /"
        );
    }
}
