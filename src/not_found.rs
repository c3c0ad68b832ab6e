use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_page;

pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_page(
            "Page Not Found",
            "404",
            "Sorry, that page does not exist.",
            "Check the address or head back to the ledger.",
        ),
    )
        .into_response()
}
