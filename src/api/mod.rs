//! API Module
//!
//! HTTP handlers and routing for the store's REST surface. Everything but
//! /health runs behind the admission middleware.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
