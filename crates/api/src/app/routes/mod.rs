//! Route table: one entry per (path, method), flagged when a bearer token
//! is required.

use axum::routing::MethodRouter;

pub mod login;
pub mod posts;
pub mod system;
pub mod users;

pub struct Route {
    pub path: &'static str,
    pub method_router: MethodRouter,
    pub requires_authentication: bool,
}

impl Route {
    pub fn public(path: &'static str, method_router: MethodRouter) -> Self {
        Self {
            path,
            method_router,
            requires_authentication: false,
        }
    }

    pub fn authenticated(path: &'static str, method_router: MethodRouter) -> Self {
        Self {
            path,
            method_router,
            requires_authentication: true,
        }
    }
}

/// Every route the API serves.
pub fn table() -> Vec<Route> {
    let mut routes = system::routes();
    routes.extend(login::routes());
    routes.extend(users::routes());
    routes.extend(posts::routes());
    routes
}
