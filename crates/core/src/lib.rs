//! Domain logic for the Deckhand slide project manager.
//!
//! Everything in this crate is free of database and HTTP concerns: slug
//! derivation, the slide status machine, build-log diagnostics, subprocess
//! execution, and the [`project::ProjectService`] that drives the external
//! Slidev tooling.

pub mod build_log;
pub mod config;
pub mod error;
pub mod project;
pub mod slug;
pub mod status;
pub mod tooling;
pub mod types;
