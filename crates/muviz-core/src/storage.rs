use std::path::Path;

use muviz_api::MediaKind;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use crate::error::MuvizError;
use crate::models::FavoriteRecord;

const SCHEMA_V1: &str = include_str!("../../../migrations/001_favorites.sql");
const SCHEMA_V2: &str = include_str!("../../../migrations/002_add_overview.sql");

const FAVORITE_COLUMNS: &str =
    "favorite, mediaId, mediaType, image, title, releaseDate, rating, overview";

/// SQLite-backed storage for local favorites.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, MuvizError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, MuvizError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    // ── Favorites ───────────────────────────────────────────────

    /// Insert a favorite. Fails with `DuplicateFavorite` if the media id is already stored.
    pub fn insert_favorite(&self, record: &FavoriteRecord) -> Result<(), MuvizError> {
        self.conn
            .execute(
                "INSERT INTO favorites_table
                 (favorite, mediaId, mediaType, image, title, releaseDate, rating, overview)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.favorite,
                    record.media_id as i64,
                    record.media_type.as_str(),
                    record.image,
                    record.title,
                    record.release_date,
                    record.rating,
                    record.overview,
                ],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == ErrorCode::ConstraintViolation
                        && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
                {
                    MuvizError::DuplicateFavorite(record.media_id)
                }
                other => other.into(),
            })?;
        Ok(())
    }

    /// Delete a favorite by media id. Returns the number of rows removed (0 if absent).
    pub fn delete_favorite(&self, media_id: u64) -> Result<usize, MuvizError> {
        let n = self.conn.execute(
            "DELETE FROM favorites_table WHERE mediaId = ?1",
            params![media_id as i64],
        )?;
        Ok(n)
    }

    /// Delete every favorite. Returns the number of rows removed.
    pub fn delete_all_favorites(&self) -> Result<usize, MuvizError> {
        let n = self.conn.execute("DELETE FROM favorites_table", [])?;
        Ok(n)
    }

    pub fn is_favorite(&self, media_id: u64) -> Result<bool, MuvizError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM favorites_table WHERE mediaId = ?1",
            params![media_id as i64],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn get_favorite(&self, media_id: u64) -> Result<Option<FavoriteRecord>, MuvizError> {
        self.conn
            .query_row(
                &format!("SELECT {FAVORITE_COLUMNS} FROM favorites_table WHERE mediaId = ?1"),
                params![media_id as i64],
                |row| Ok(row_to_favorite(row)),
            )
            .optional()
            .map_err(Into::into)
    }

    /// All favorites, newest media id first.
    pub fn all_favorites(&self) -> Result<Vec<FavoriteRecord>, MuvizError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FAVORITE_COLUMNS} FROM favorites_table ORDER BY mediaId DESC"
        ))?;
        let rows = stmt
            .query_map([], |row| Ok(row_to_favorite(row)))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    /// Insert the record if absent, delete it if present. Returns the new favorite state.
    pub fn toggle_favorite(&self, record: &FavoriteRecord) -> Result<bool, MuvizError> {
        if self.is_favorite(record.media_id)? {
            self.delete_favorite(record.media_id)?;
            Ok(false)
        } else {
            self.insert_favorite(record)?;
            Ok(true)
        }
    }
}

fn run_migrations(conn: &Connection) -> Result<(), MuvizError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    if version < 2 {
        conn.execute_batch(SCHEMA_V2)?;
        conn.pragma_update(None, "user_version", 2)?;
        tracing::debug!(from = version, to = 2, "favorites schema migrated");
    }
    Ok(())
}

// ── Row mapping helpers ─────────────────────────────────────────

fn row_to_favorite(row: &rusqlite::Row<'_>) -> FavoriteRecord {
    let media_type: String = row.get(2).unwrap_or_default();

    FavoriteRecord {
        favorite: row.get(0).unwrap_or(true),
        media_id: row.get::<_, i64>(1).unwrap_or(0) as u64,
        media_type: MediaKind::from_db_str(&media_type).unwrap_or(MediaKind::Movie),
        image: row.get(3).unwrap_or_default(),
        title: row.get(4).unwrap_or_default(),
        release_date: row.get(5).unwrap_or_default(),
        rating: row.get(6).unwrap_or(0.0),
        overview: row.get(7).unwrap_or(None),
    }
}
