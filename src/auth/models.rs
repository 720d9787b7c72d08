//! Authentication Models
//! Mission: Define user and authentication data structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub bio: Option<String>,
    pub website: Option<String>,
    pub role: UserRole,
    pub created_at: String,
}

/// User roles. A single stored field; no permission system hangs off it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "admin")]
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(UserRole::User),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: String, // user id
    pub role: UserRole,
    pub exp: usize, // expiration timestamp
}

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Auth response (register/login): its own envelope, not `ApiResponse`
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserResponse,
    pub token: String,
}

/// User response (sanitized)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Profile response: the sanitized user plus the editable extras
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub role: UserRole,
}

impl ProfileResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            bio: user.bio.clone(),
            website: user.website.clone(),
            role: user.role,
        }
    }
}

/// Profile update body. Absent or empty fields leave prior values alone.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            bio: Some("hi".to_string()),
            website: None,
            role: UserRole::User,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_user_role_serialization() {
        let json = serde_json::to_string(&UserRole::User).unwrap();
        assert_eq!(json, r#""user""#);

        let admin: UserRole = serde_json::from_str(r#""admin""#).unwrap();
        assert_eq!(admin, UserRole::Admin);
    }

    #[test]
    fn test_user_role_string_conversion() {
        assert_eq!(UserRole::User.as_str(), "user");
        assert_eq!(UserRole::from_str("ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_str("moderator"), None);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = sample_user();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn test_user_response_excludes_secrets() {
        let user = sample_user();
        let resp = serde_json::to_value(UserResponse::from_user(&user)).unwrap();
        assert_eq!(resp["email"], "alice@example.com");
        assert!(resp.get("password_hash").is_none());
        assert!(resp.get("bio").is_none());
    }
}
