//! API Client
//! Mission: Typed access to the REST API for the CLI

use crate::auth::models::{AuthResponse, ProfileResponse, ProfileUpdate};
use crate::events::models::{CreateEventRequest, Event, RsvpRequest, UpdateEventRequest};
use crate::models::ApiResponse;
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

/// HTTP client over the REST API. Authenticated calls take the bearer
/// token explicitly; session management lives in [`super::session`].
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse> {
        let resp = self
            .http
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .send()
            .await?;
        parse_auth(resp).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let resp = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        parse_auth(resp).await
    }

    pub async fn list_events(&self) -> Result<Vec<Event>> {
        let resp = self.http.get(self.url("/api/events")).send().await?;
        parse_data(resp).await
    }

    pub async fn get_event(&self, id: &str) -> Result<Event> {
        let resp = self
            .http
            .get(self.url(&format!("/api/events/{}", id)))
            .send()
            .await?;
        parse_data(resp).await
    }

    pub async fn create_event(&self, token: &str, fields: &CreateEventRequest) -> Result<Event> {
        let resp = self
            .http
            .post(self.url("/api/events"))
            .bearer_auth(token)
            .json(fields)
            .send()
            .await?;
        parse_data(resp).await
    }

    pub async fn update_event(
        &self,
        token: &str,
        id: &str,
        fields: &UpdateEventRequest,
    ) -> Result<Event> {
        let resp = self
            .http
            .put(self.url(&format!("/api/events/{}", id)))
            .bearer_auth(token)
            .json(fields)
            .send()
            .await?;
        parse_data(resp).await
    }

    pub async fn delete_event(&self, token: &str, id: &str) -> Result<String> {
        let resp = self
            .http
            .delete(self.url(&format!("/api/events/{}", id)))
            .bearer_auth(token)
            .send()
            .await?;
        let envelope: ApiResponse<()> = parse_envelope(resp).await?;
        Ok(envelope
            .message
            .unwrap_or_else(|| "Event deleted".to_string()))
    }

    pub async fn rsvp(&self, id: &str, email: &str) -> Result<Event> {
        let resp = self
            .http
            .put(self.url(&format!("/api/events/{}/rsvp", id)))
            .json(&RsvpRequest {
                email: email.to_string(),
            })
            .send()
            .await?;
        parse_data(resp).await
    }

    pub async fn profile(&self, token: &str) -> Result<ProfileResponse> {
        let resp = self
            .http
            .get(self.url("/api/users/profile"))
            .bearer_auth(token)
            .send()
            .await?;
        parse_data(resp).await
    }

    pub async fn update_profile(
        &self,
        token: &str,
        changes: &ProfileUpdate,
    ) -> Result<ProfileResponse> {
        let resp = self
            .http
            .put(self.url("/api/users/profile"))
            .bearer_auth(token)
            .json(changes)
            .send()
            .await?;
        parse_data(resp).await
    }
}

/// Read an `{success, data?, message?}` envelope, surfacing the server's
/// message on failure statuses.
async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<ApiResponse<T>> {
    let status = resp.status();
    let body: serde_json::Value = resp
        .json()
        .await
        .context("Server returned a non-JSON response")?;

    if !status.is_success() {
        let message = body["message"].as_str().unwrap_or("Request failed");
        bail!("{} ({})", message, status);
    }

    serde_json::from_value(body).context("Unexpected response shape")
}

async fn parse_data<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let envelope: ApiResponse<T> = parse_envelope(resp).await?;
    envelope
        .data
        .context("Response envelope carried no data")
}

/// Auth endpoints use their own `{message, user, token}` envelope.
async fn parse_auth(resp: reqwest::Response) -> Result<AuthResponse> {
    let status = resp.status();
    let body: serde_json::Value = resp
        .json()
        .await
        .context("Server returned a non-JSON response")?;

    if !status.is_success() {
        let message = body["message"].as_str().unwrap_or("Request failed");
        bail!("{} ({})", message, status);
    }

    serde_json::from_value(body).context("Unexpected response shape")
}
