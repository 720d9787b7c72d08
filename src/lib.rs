//! Eventboard Backend Library
//!
//! Exposes core modules for use by binaries and tests.

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod events;
pub mod middleware;
pub mod models;
