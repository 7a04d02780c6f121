use axum::{http::StatusCode, routing::get};

use super::Route;

pub fn routes() -> Vec<Route> {
    vec![Route::public("/health", get(health))]
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
