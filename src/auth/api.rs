//! Authentication & Profile API Endpoints
//! Mission: Registration, login, and profile management

use crate::api::routes::AppState;
use crate::auth::models::{
    AuthResponse, Claims, LoginRequest, ProfileResponse, ProfileUpdate, RegisterRequest,
    UserResponse,
};
use crate::error::AppError;
use crate::models::ApiResponse;
use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{info, warn};
use uuid::Uuid;

/// Register endpoint - POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    if payload.username.is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("Please enter all fields".to_string()));
    }

    // Pre-checks give the friendly message; the store's UNIQUE constraints
    // catch the race two concurrent registrations can win together.
    if state.user_store.find_by_email(&payload.email).await?.is_some() {
        return Err(AppError::Conflict(
            "User with that email already exists".to_string(),
        ));
    }
    if state
        .user_store
        .find_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Username is already taken".to_string()));
    }

    let user = state
        .user_store
        .create(&payload.username, &payload.email, &payload.password)
        .await?;

    let token = state.jwt_handler.issue(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: UserResponse::from_user(&user),
            token,
        }),
    ))
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("Please enter all fields".to_string()));
    }

    // Same response for unknown email and bad password
    let user = state
        .user_store
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::Validation("Invalid credentials".to_string()))?;

    if !state.user_store.verify_password(&user, &payload.password).await? {
        warn!("❌ Failed login attempt: {}", payload.email);
        return Err(AppError::Validation("Invalid credentials".to_string()));
    }

    let token = state.jwt_handler.issue(&user)?;

    info!("✅ Login successful: {}", user.username);

    Ok(Json(AuthResponse {
        message: "Logged in successfully".to_string(),
        user: UserResponse::from_user(&user),
        token,
    }))
}

/// Get profile - GET /api/users/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<ProfileResponse>>, AppError> {
    let id = parse_claims_id(&claims)?;

    let user = state
        .user_store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::data(ProfileResponse::from_user(&user))))
}

/// Update profile - PUT /api/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<ApiResponse<ProfileResponse>>, AppError> {
    let id = parse_claims_id(&claims)?;

    let user = state.user_store.update_profile(&id, &payload).await?;

    Ok(Json(ApiResponse::data_with_message(
        ProfileResponse::from_user(&user),
        "Profile updated successfully",
    )))
}

pub(crate) fn parse_claims_id(claims: &Claims) -> Result<Uuid, AppError> {
    Uuid::parse_str(&claims.id)
        .map_err(|_| AppError::Unauthenticated("Not authorized, token failed".to_string()))
}
