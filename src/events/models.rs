//! Event Models
//! Mission: Define event records and their request shapes

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A community event. `owner` is set at creation and never changes;
/// it serializes as `user` to match the wire shape the frontend consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub organizer: String,
    #[serde(rename = "user")]
    pub owner: Uuid,
    pub rsvps: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Event creation body. Everything but `organizer` is required.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEventRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    pub organizer: Option<String>,
}

/// Event update body. Absent or empty fields leave prior values alone.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub organizer: Option<String>,
}

/// RSVP body
#[derive(Debug, Serialize, Deserialize)]
pub struct RsvpRequest {
    #[serde(default)]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_owner_serializes_as_user() {
        let event = Event {
            id: Uuid::new_v4(),
            title: "Cleanup".to_string(),
            description: "d".to_string(),
            date: "2024-05-01".to_string(),
            time: "10:00".to_string(),
            location: "Park".to_string(),
            organizer: "Anonymous".to_string(),
            owner: Uuid::new_v4(),
            rsvps: vec![],
            created_at: Utc::now().to_rfc3339(),
            updated_at: Utc::now().to_rfc3339(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["user"], event.owner.to_string());
        assert!(json.get("owner").is_none());
        assert_eq!(json["rsvps"], serde_json::json!([]));
    }

    #[test]
    fn test_create_request_missing_fields_default_empty() {
        let req: CreateEventRequest = serde_json::from_str(r#"{"title":"Picnic"}"#).unwrap();
        assert_eq!(req.title, "Picnic");
        assert!(req.description.is_empty());
        assert!(req.organizer.is_none());
    }
}
