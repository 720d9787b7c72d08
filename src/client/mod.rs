//! Client Module
//! Mission: Typed REST client and persisted session for the CLI

pub mod api;
pub mod session;

pub use api::ApiClient;
pub use session::{Session, SessionStore};
