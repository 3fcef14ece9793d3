//! Creatorify API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! background uploader) so integration tests and the binary entrypoint can
//! both access them.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
