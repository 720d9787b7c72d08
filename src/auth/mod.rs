//! Authentication Module
//! Mission: Secure API access with JWT tokens and bearer-token middleware

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod user_store;

pub use jwt::JwtHandler;
pub use middleware::require_auth;
pub use user_store::UserStore;
