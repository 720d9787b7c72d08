//! User Storage
//! Mission: Store and manage user accounts with SQLite

use crate::auth::models::{ProfileUpdate, User, UserRole};
use crate::error::AppError;
use anyhow::Context;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OpenFlags};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT UNIQUE NOT NULL,
    email TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    bio TEXT,
    website TEXT,
    role TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;

const USER_COLUMNS: &str = "id, username, email, password_hash, bio, website, role, created_at";

/// User storage with SQLite backend. One connection behind a mutex;
/// critical sections are short.
pub struct UserStore {
    conn: Arc<Mutex<Connection>>,
}

impl UserStore {
    /// Open (or create) the database and apply the schema
    pub fn new(db_path: &str) -> anyhow::Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX; // We handle our own locking

        let conn = Connection::open_with_flags(db_path, flags)
            .with_context(|| format!("Failed to open database at {}", db_path))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize users schema")?;

        info!("👤 User store initialized at: {}", db_path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get user by email (the login identifier)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_by_column("email", email)
    }

    /// Get user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.find_by_column("username", username)
    }

    /// Get user by id
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        self.find_by_column("id", &id.to_string())
    }

    fn find_by_column(&self, column: &str, value: &str) -> Result<Option<User>, AppError> {
        let conn = self.conn.lock();
        let sql = format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column);
        let mut stmt = conn.prepare_cached(&sql)?;

        match stmt.query_row(params![value], row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Create a new user. The raw password is bcrypt-hashed before the
    /// insert and dropped with this frame; it is never stored or logged.
    /// Duplicate username/email fails with `Conflict` — the pre-checks in
    /// the handler can race, so the UNIQUE constraints are the real guard
    /// and their violation is translated here.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        raw_password: &str,
    ) -> Result<User, AppError> {
        let password_hash =
            hash(raw_password, DEFAULT_COST).context("Failed to hash password")?;

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            bio: None,
            website: None,
            role: UserRole::default(),
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, bio, website, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user.id.to_string(),
                user.username,
                user.email,
                user.password_hash,
                user.bio,
                user.website,
                user.role.as_str(),
                user.created_at,
            ],
        )
        .map_err(map_unique_violation)?;

        info!("✅ Registered user: {}", user.username);

        Ok(user)
    }

    /// Verify a raw password against a user's stored hash. The hash never
    /// leaves this function.
    pub async fn verify_password(&self, user: &User, raw_password: &str) -> Result<bool, AppError> {
        let valid = verify(raw_password, &user.password_hash)
            .context("Failed to verify password")?;
        Ok(valid)
    }

    /// Apply a profile update. Only provided, non-empty fields overwrite;
    /// absent or empty inputs leave prior values (merge-if-truthy, not
    /// null-clearing).
    pub async fn update_profile(
        &self,
        id: &Uuid,
        changes: &ProfileUpdate,
    ) -> Result<User, AppError> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM users WHERE id = ?1",
            USER_COLUMNS
        ))?;
        let mut user = match stmt.query_row(params![id.to_string()], row_to_user) {
            Ok(user) => user,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(AppError::NotFound("User not found".to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        drop(stmt);

        merge_truthy(&mut user.username, &changes.username);
        merge_truthy(&mut user.email, &changes.email);
        merge_truthy_opt(&mut user.bio, &changes.bio);
        merge_truthy_opt(&mut user.website, &changes.website);

        conn.execute(
            "UPDATE users SET username = ?1, email = ?2, bio = ?3, website = ?4 WHERE id = ?5",
            params![
                user.username,
                user.email,
                user.bio,
                user.website,
                id.to_string()
            ],
        )
        .map_err(map_unique_violation)?;

        Ok(user)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id_str: String = row.get(0)?;
    let role_str: String = row.get(6)?;
    Ok(User {
        id: Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        bio: row.get(4)?,
        website: row.get(5)?,
        role: UserRole::from_str(&role_str).unwrap_or_default(),
        created_at: row.get(7)?,
    })
}

/// Translate a SQLite UNIQUE violation into the conflict the caller
/// would have seen from the pre-check.
fn map_unique_violation(e: rusqlite::Error) -> AppError {
    if let rusqlite::Error::SqliteFailure(ffi_err, ref msg) = e {
        if ffi_err.code == ErrorCode::ConstraintViolation {
            let msg = msg.as_deref().unwrap_or("");
            return if msg.contains("users.email") {
                AppError::Conflict("User with that email already exists".to_string())
            } else if msg.contains("users.username") {
                AppError::Conflict("Username is already taken".to_string())
            } else {
                AppError::Conflict("Duplicate field value entered".to_string())
            };
        }
    }
    e.into()
}

fn merge_truthy(current: &mut String, candidate: &Option<String>) {
    if let Some(v) = candidate {
        if !v.is_empty() {
            *current = v.clone();
        }
    }
}

fn merge_truthy_opt(current: &mut Option<String>, candidate: &Option<String>) {
    if let Some(v) = candidate {
        if !v.is_empty() {
            *current = Some(v.clone());
        }
    }
}
