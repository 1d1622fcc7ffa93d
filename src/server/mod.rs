//! HTTP server
//!
//! [`ServerBuilder`] wires a storage backend into [`AppState`] and exposes:
//! - the `/api` resource routes
//! - `/health` and `/healthz`

pub mod builder;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;

pub use builder::ServerBuilder;
pub use state::AppState;
