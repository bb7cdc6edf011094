//! filmhub web server library.
//!
//! Exposes the building blocks (config, state, error handling, sessions,
//! flash messages, templates, routes) so integration tests and the binary
//! entrypoint share them.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod cookies;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod render;
pub mod router;
pub mod routes;
pub mod state;
