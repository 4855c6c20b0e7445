//! SQLite-based storage for users and tasks.
//!
//! Provides persistent storage for:
//! - User records (keyed by OIDC `sub`), including the concentration window
//! - Tasks and their scheduling state
//!
//! Rows whose stored priority/concentration strings fail to parse, or whose
//! duration is not positive, are excluded from scheduling queries rather
//! than failing the whole run.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::task::{Concentration, Priority, Task};

use super::data_dir;

/// A stored user.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub access_token: Option<String>,
    /// Concentration window bounds as wall-clock strings ("HH:MM").
    pub concentration_window: Option<(String, String)>,
}

/// SQLite database for users and tasks.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/timefinder/timefinder.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("timefinder.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (creating if needed) a database file at an explicit path.
    pub fn open_at(path: &std::path::Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                sub                 TEXT PRIMARY KEY,
                email               TEXT NOT NULL,
                name                TEXT,
                access_token        TEXT,
                concentration_start TEXT,
                concentration_end   TEXT
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id            TEXT PRIMARY KEY,
                sub           TEXT NOT NULL,
                name          TEXT NOT NULL,
                priority      TEXT NOT NULL,
                duration_min  INTEGER NOT NULL,
                concentration TEXT NOT NULL,
                is_completed  INTEGER NOT NULL DEFAULT 0,
                is_scheduled  INTEGER NOT NULL DEFAULT 0,
                start_time    TEXT,
                end_time      TEXT,
                created_at    TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_sub ON tasks(sub);
            CREATE INDEX IF NOT EXISTS idx_tasks_sub_completed ON tasks(sub, is_completed);",
        )?;
        Ok(())
    }

    /// Insert or update a user keyed by `sub`.
    pub fn upsert_user(
        &self,
        sub: &str,
        email: &str,
        name: Option<&str>,
        access_token: Option<&str>,
    ) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO users (sub, email, name, access_token)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(sub) DO UPDATE SET
                 email = excluded.email,
                 name = COALESCE(excluded.name, users.name),
                 access_token = COALESCE(excluded.access_token, users.access_token)",
            params![sub, email, name, access_token],
        )?;
        Ok(())
    }

    /// Look up a user by `sub`.
    pub fn find_user(&self, sub: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT sub, email, name, access_token, concentration_start, concentration_end
                 FROM users WHERE sub = ?1",
                params![sub],
                |row| {
                    let start: Option<String> = row.get(4)?;
                    let end: Option<String> = row.get(5)?;
                    Ok(UserRecord {
                        sub: row.get(0)?,
                        email: row.get(1)?,
                        name: row.get(2)?,
                        access_token: row.get(3)?,
                        concentration_window: start.zip(end),
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Set the user's daily concentration window ("HH:MM" bounds).
    pub fn set_concentration_window(
        &self,
        sub: &str,
        start: &str,
        end: &str,
    ) -> Result<(), DatabaseError> {
        let updated = self.conn.execute(
            "UPDATE users SET concentration_start = ?2, concentration_end = ?3
             WHERE sub = ?1",
            params![sub, start, end],
        )?;
        if updated == 0 {
            return Err(DatabaseError::QueryFailed(format!(
                "no user with sub '{sub}'"
            )));
        }
        Ok(())
    }

    /// Add a task for a user, returning the stored task.
    pub fn add_task(
        &self,
        sub: &str,
        name: &str,
        priority: Priority,
        duration_minutes: i64,
        concentration: Concentration,
    ) -> Result<Task, DatabaseError> {
        let task = Task {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            priority,
            duration_minutes,
            concentration,
            is_completed: false,
            is_scheduled: false,
        };
        self.conn.execute(
            "INSERT INTO tasks (id, sub, name, priority, duration_min, concentration,
                                is_completed, is_scheduled, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, ?7)",
            params![
                task.id,
                sub,
                task.name,
                task.priority.as_str(),
                task.duration_minutes,
                task.concentration.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(task)
    }

    /// Incomplete tasks for a user, in insertion order.
    ///
    /// Rows with unknown priority/concentration strings or non-positive
    /// durations are skipped.
    pub fn pending_tasks(&self, sub: &str) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, priority, duration_min, concentration, is_completed, is_scheduled
             FROM tasks WHERE sub = ?1 AND is_completed = 0
             ORDER BY created_at, id",
        )?;

        let rows = stmt.query_map(params![sub], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, bool>(5)?,
                row.get::<_, bool>(6)?,
            ))
        })?;

        let mut tasks = Vec::new();
        for row in rows {
            let (id, name, priority, duration_min, concentration, is_completed, is_scheduled) =
                row?;
            let (Some(priority), Some(concentration)) = (
                Priority::parse(&priority),
                Concentration::parse(&concentration),
            ) else {
                continue;
            };
            if duration_min <= 0 {
                continue;
            }
            tasks.push(Task {
                id,
                name,
                priority,
                duration_minutes: duration_min,
                concentration,
                is_completed,
                is_scheduled,
            });
        }
        Ok(tasks)
    }

    /// Record a committed assignment on the task row.
    pub fn mark_task_scheduled(
        &self,
        task_id: &str,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE tasks SET is_scheduled = 1, start_time = ?2, end_time = ?3
             WHERE id = ?1",
            params![task_id, start.to_rfc3339(), end.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Flip a task's completion flag.
    pub fn set_task_completed(&self, task_id: &str, completed: bool) -> Result<(), DatabaseError> {
        let updated = self.conn.execute(
            "UPDATE tasks SET is_completed = ?2 WHERE id = ?1",
            params![task_id, completed],
        )?;
        if updated == 0 {
            return Err(DatabaseError::QueryFailed(format!(
                "no task with id '{task_id}'"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_user() -> Database {
        let db = Database::open_memory().unwrap();
        db.upsert_user("sub-1", "a@example.com", Some("Ada"), Some("tok"))
            .unwrap();
        db
    }

    #[test]
    fn open_at_unreachable_path_reports_open_failure() {
        let err = Database::open_at(std::path::Path::new(
            "/nonexistent-dir/timefinder/timefinder.db",
        ))
        .unwrap_err();
        assert!(matches!(err, DatabaseError::OpenFailed { .. }));
    }

    #[test]
    fn upsert_user_is_idempotent_and_preserves_fields() {
        let db = db_with_user();
        // Second upsert without name/token must not erase them.
        db.upsert_user("sub-1", "new@example.com", None, None).unwrap();

        let user = db.find_user("sub-1").unwrap().unwrap();
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert_eq!(user.access_token.as_deref(), Some("tok"));
    }

    #[test]
    fn concentration_window_roundtrip() {
        let db = db_with_user();
        db.set_concentration_window("sub-1", "09:00", "12:00").unwrap();

        let user = db.find_user("sub-1").unwrap().unwrap();
        assert_eq!(
            user.concentration_window,
            Some(("09:00".to_string(), "12:00".to_string()))
        );

        assert!(db.set_concentration_window("ghost", "09:00", "12:00").is_err());
    }

    #[test]
    fn pending_tasks_filters_completed() {
        let db = db_with_user();
        let t1 = db
            .add_task("sub-1", "write report", Priority::High, 60, Concentration::High)
            .unwrap();
        db.add_task("sub-1", "emails", Priority::Low, 30, Concentration::Low)
            .unwrap();
        db.set_task_completed(&t1.id, true).unwrap();

        let pending = db.pending_tasks("sub-1").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].name, "emails");
    }

    #[test]
    fn pending_tasks_skips_invalid_rows() {
        let db = db_with_user();
        db.add_task("sub-1", "ok", Priority::Medium, 45, Concentration::Medium)
            .unwrap();
        // Rows written by an older client with values we no longer accept.
        db.conn
            .execute(
                "INSERT INTO tasks (id, sub, name, priority, duration_min, concentration,
                                    is_completed, is_scheduled, created_at)
                 VALUES ('bad-1', 'sub-1', 'bad prio', 'urgent', 30, 'medium', 0, 0, '2024-01-01'),
                        ('bad-2', 'sub-1', 'bad dur', 'high', 0, 'medium', 0, 0, '2024-01-01')",
                [],
            )
            .unwrap();

        let pending = db.pending_tasks("sub-1").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].name, "ok");
    }

    #[test]
    fn mark_task_scheduled_records_times() {
        let db = db_with_user();
        let task = db
            .add_task("sub-1", "deep work", Priority::High, 90, Concentration::High)
            .unwrap();

        let start = Utc::now();
        let end = start + chrono::Duration::minutes(90);
        db.mark_task_scheduled(&task.id, &start, &end).unwrap();

        let (scheduled, stored_start): (bool, Option<String>) = db
            .conn
            .query_row(
                "SELECT is_scheduled, start_time FROM tasks WHERE id = ?1",
                params![task.id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!(scheduled);
        assert_eq!(stored_start, Some(start.to_rfc3339()));
    }
}
