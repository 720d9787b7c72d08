//! Authentication Middleware
//! Mission: Protect API endpoints with JWT verification

use crate::auth::jwt::JwtHandler;
use crate::error::AppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Middleware that requires a valid bearer token.
///
/// Reads `Authorization: Bearer <token>`, verifies it, and inserts the
/// decoded `Claims` into request extensions for downstream handlers.
/// The store is not consulted: claims are trusted as issued, so role
/// changes only take effect at the next login.
pub async fn require_auth(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthenticated("Not authorized, no token".to_string()))?;

    let claims = jwt_handler
        .verify(token)
        .map_err(|_| AppError::Unauthenticated("Not authorized, token failed".to_string()))?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
