//! Deckhand web server library.
//!
//! Exposes configuration, state, error handling, routes, views and the
//! WebSocket live-update infrastructure so integration tests and the binary
//! entrypoint share them.

pub mod config;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod live;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod views;
pub mod ws;
