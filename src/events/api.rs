//! Event API Endpoints
//! Mission: CRUD and RSVP handlers over the event store

use crate::api::routes::AppState;
use crate::auth::api::parse_claims_id;
use crate::auth::models::Claims;
use crate::error::AppError;
use crate::events::models::{CreateEventRequest, Event, RsvpRequest, UpdateEventRequest};
use crate::models::ApiResponse;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

/// List events - GET /api/events
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Event>>>, AppError> {
    let events = state.event_store.list().await?;
    Ok(Json(ApiResponse::data(events)))
}

/// Create event - POST /api/events
pub async fn create_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Event>>), AppError> {
    let owner = parse_claims_id(&claims)?;

    if payload.title.is_empty()
        || payload.description.is_empty()
        || payload.date.is_empty()
        || payload.time.is_empty()
        || payload.location.is_empty()
    {
        return Err(AppError::Validation(
            "Please provide all the fields".to_string(),
        ));
    }

    let event = state.event_store.create(&owner, &payload).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::data(event))))
}

/// Get event - GET /api/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Event>>, AppError> {
    let id = parse_event_id(&id)?;

    let event = state
        .event_store
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    Ok(Json(ApiResponse::data(event)))
}

/// Update event - PUT /api/events/:id
pub async fn update_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<ApiResponse<Event>>, AppError> {
    let id = parse_event_id(&id)?;
    let caller = parse_claims_id(&claims)?;

    let event = state.event_store.update(&id, &caller, &payload).await?;

    Ok(Json(ApiResponse::data(event)))
}

/// Delete event - DELETE /api/events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let id = parse_event_id(&id)?;
    let caller = parse_claims_id(&claims)?;

    state.event_store.delete(&id, &caller).await?;

    Ok(Json(ApiResponse::message("Event deleted")))
}

/// RSVP to event - PUT /api/events/:id/rsvp (public, no auth)
pub async fn rsvp_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RsvpRequest>,
) -> Result<Json<ApiResponse<Event>>, AppError> {
    let id = parse_event_id(&id)?;

    if payload.email.is_empty() {
        return Err(AppError::Validation("Please provide an email".to_string()));
    }

    let event = state.event_store.add_rsvp(&id, &payload.email).await?;

    Ok(Json(ApiResponse::data_with_message(
        event,
        "RSVP successful",
    )))
}

/// A malformed id answers 404 before the store is touched.
fn parse_event_id(raw: &str) -> Result<uuid::Uuid, AppError> {
    uuid::Uuid::parse_str(raw).map_err(|_| AppError::InvalidId)
}
