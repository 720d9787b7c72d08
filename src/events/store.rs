//! Event Storage
//! Mission: Persist event records with an owner reference and RSVP list

use crate::error::AppError;
use crate::events::models::{CreateEventRequest, Event, UpdateEventRequest};
use anyhow::Context;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    date TEXT NOT NULL,
    time TEXT NOT NULL,
    location TEXT NOT NULL,
    organizer TEXT NOT NULL,
    owner TEXT NOT NULL,
    rsvps_json TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

const EVENT_COLUMNS: &str =
    "id, title, description, date, time, location, organizer, owner, rsvps_json, created_at, updated_at";

/// Event storage with SQLite backend. The RSVP list rides along as a
/// JSON array column; dedup-check and append happen under the same lock.
pub struct EventStore {
    conn: Arc<Mutex<Connection>>,
}

impl EventStore {
    /// Open (or create) the database and apply the schema
    pub fn new(db_path: &str) -> anyhow::Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX; // We handle our own locking

        let conn = Connection::open_with_flags(db_path, flags)
            .with_context(|| format!("Failed to open database at {}", db_path))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize events schema")?;

        info!("📅 Event store initialized at: {}", db_path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// List all events. Full scan, no pagination.
    pub async fn list(&self) -> Result<Vec<Event>, AppError> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare_cached(&format!("SELECT {} FROM events", EVENT_COLUMNS))?;

        let events = stmt
            .query_map([], row_to_event)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(events)
    }

    /// Get an event by id
    pub async fn get(&self, id: &Uuid) -> Result<Option<Event>, AppError> {
        let conn = self.conn.lock();
        self.get_locked(&conn, id)
    }

    fn get_locked(&self, conn: &Connection, id: &Uuid) -> Result<Option<Event>, AppError> {
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM events WHERE id = ?1",
            EVENT_COLUMNS
        ))?;

        match stmt.query_row(params![id.to_string()], row_to_event) {
            Ok(event) => Ok(Some(event)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Create an event owned by `owner`. Field presence is validated at
    /// the handler boundary; organizer defaults to "Anonymous".
    pub async fn create(
        &self,
        owner: &Uuid,
        fields: &CreateEventRequest,
    ) -> Result<Event, AppError> {
        let now = Utc::now().to_rfc3339();
        let event = Event {
            id: Uuid::new_v4(),
            title: fields.title.clone(),
            description: fields.description.clone(),
            date: fields.date.clone(),
            time: fields.time.clone(),
            location: fields.location.clone(),
            organizer: fields
                .organizer
                .clone()
                .filter(|o| !o.is_empty())
                .unwrap_or_else(|| "Anonymous".to_string()),
            owner: *owner,
            rsvps: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO events (id, title, description, date, time, location, organizer, owner, rsvps_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                event.id.to_string(),
                event.title,
                event.description,
                event.date,
                event.time,
                event.location,
                event.organizer,
                event.owner.to_string(),
                serde_json::to_string(&event.rsvps).context("Failed to encode RSVP list")?,
                event.created_at,
                event.updated_at,
            ],
        )?;

        info!("📅 Created event: {} ({})", event.title, event.id);

        Ok(event)
    }

    /// Update an event's fields. Only the owner may update; provided
    /// non-empty values overwrite, absent or empty inputs leave prior
    /// values (merge-if-truthy).
    pub async fn update(
        &self,
        id: &Uuid,
        caller: &Uuid,
        fields: &UpdateEventRequest,
    ) -> Result<Event, AppError> {
        let conn = self.conn.lock();

        let mut event = self
            .get_locked(&conn, id)?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if event.owner != *caller {
            return Err(AppError::Forbidden(
                "Not authorized to update this event".to_string(),
            ));
        }

        merge_truthy(&mut event.title, &fields.title);
        merge_truthy(&mut event.description, &fields.description);
        merge_truthy(&mut event.date, &fields.date);
        merge_truthy(&mut event.time, &fields.time);
        merge_truthy(&mut event.location, &fields.location);
        merge_truthy(&mut event.organizer, &fields.organizer);
        event.updated_at = Utc::now().to_rfc3339();

        conn.execute(
            "UPDATE events SET title = ?1, description = ?2, date = ?3, time = ?4, location = ?5, organizer = ?6, updated_at = ?7
             WHERE id = ?8",
            params![
                event.title,
                event.description,
                event.date,
                event.time,
                event.location,
                event.organizer,
                event.updated_at,
                id.to_string(),
            ],
        )?;

        Ok(event)
    }

    /// Delete an event. Only the owner may delete.
    pub async fn delete(&self, id: &Uuid, caller: &Uuid) -> Result<(), AppError> {
        let conn = self.conn.lock();

        let event = self
            .get_locked(&conn, id)?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if event.owner != *caller {
            return Err(AppError::Forbidden(
                "Not authorized to delete this event".to_string(),
            ));
        }

        conn.execute("DELETE FROM events WHERE id = ?1", params![id.to_string()])?;

        info!("🗑️  Deleted event: {}", id);

        Ok(())
    }

    /// Append an RSVP email. No authentication required; duplicates are
    /// rejected. The check and the append run under one lock acquisition,
    /// so two concurrent RSVPs with the same email cannot both land.
    pub async fn add_rsvp(&self, id: &Uuid, email: &str) -> Result<Event, AppError> {
        let conn = self.conn.lock();

        let mut event = self
            .get_locked(&conn, id)?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if event.rsvps.iter().any(|e| e == email) {
            return Err(AppError::DuplicateRsvp);
        }

        event.rsvps.push(email.to_string());
        event.updated_at = Utc::now().to_rfc3339();

        conn.execute(
            "UPDATE events SET rsvps_json = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                serde_json::to_string(&event.rsvps).context("Failed to encode RSVP list")?,
                event.updated_at,
                id.to_string(),
            ],
        )?;

        Ok(event)
    }
}

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<Event> {
    let id_str: String = row.get(0)?;
    let owner_str: String = row.get(7)?;
    let rsvps_json: String = row.get(8)?;

    Ok(Event {
        id: parse_uuid_col(&id_str, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        date: row.get(3)?,
        time: row.get(4)?,
        location: row.get(5)?,
        organizer: row.get(6)?,
        owner: parse_uuid_col(&owner_str, 7)?,
        rsvps: serde_json::from_str(&rsvps_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
        })?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn parse_uuid_col(value: &str, idx: usize) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn merge_truthy(current: &mut String, candidate: &Option<String>) {
    if let Some(v) = candidate {
        if !v.is_empty() {
            *current = v.clone();
        }
    }
}
