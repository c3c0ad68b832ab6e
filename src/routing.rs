//! Application router configuration.

use axum::{Router, middleware, routing::get};

use crate::{
    AppState, endpoints,
    logging::logging_middleware,
    not_found::get_404_not_found,
    transaction::{create_entry_endpoint, get_history_page, get_ledger_page},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::LEDGER_VIEW,
            get(get_ledger_page).post(create_entry_endpoint),
        )
        .route(endpoints::HISTORY_VIEW, get(get_history_page))
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}
