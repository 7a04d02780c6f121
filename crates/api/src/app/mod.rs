//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: repositories and token service shared by handlers
//! - `routes/`: the route table and handlers (one file per resource)
//! - `dto.rs`: request bodies, response views, and the JSON body extractor
//! - `errors.rs`: consistent `{"error": ...}` responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use socialnet_auth::JwtValidator;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Authenticated routes run the token check before their handler; every
/// route is logged.
pub fn build_app(services: services::AppServices) -> Router {
    let jwt: Arc<dyn JwtValidator> = services.jwt.clone();
    let auth_state = middleware::AuthState { jwt };

    let mut router = Router::new();
    for route in routes::table() {
        let method_router = if route.requires_authentication {
            route
                .method_router
                .route_layer(axum::middleware::from_fn_with_state(
                    auth_state.clone(),
                    middleware::authenticate,
                ))
        } else {
            route.method_router
        };
        router = router.route(route.path, method_router);
    }

    router.layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(middleware::log_request))
            .layer(Extension(Arc::new(services))),
    )
}
