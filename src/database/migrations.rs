//! Schema migrations for the passvault SQLite database.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Each migration runs exactly once and is recorded with a timestamp.

use rusqlite::Connection;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Returns the current schema version from the database (0 if table doesn't exist).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending schema migrations against the provided connection.
///
/// Migrations are versioned — each runs exactly once and is recorded in
/// the `schema_version` table. Safe to call on every startup.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    // Enable WAL and foreign keys (always, not versioned)
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Initial schema: credentials, tags, credential_tags")?;
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Add url and notes columns to credentials")?;
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )?;
    Ok(())
}

/// V1: Create the credential store tables.
///
/// Tag associations cascade from the credential side only: deleting a
/// credential removes its join rows, deleting a tag never touches credentials.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS credentials (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            name TEXT NOT NULL,
            username TEXT NOT NULL,
            secret_ciphertext TEXT NOT NULL,
            url TEXT,
            notes TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_credentials_owner ON credentials(owner_id);

        CREATE TABLE IF NOT EXISTS tags (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            name TEXT NOT NULL,
            UNIQUE(owner_id, name)
        );

        CREATE INDEX IF NOT EXISTS idx_tags_owner ON tags(owner_id);

        CREATE TABLE IF NOT EXISTS credential_tags (
            credential_id TEXT NOT NULL,
            tag_id TEXT NOT NULL,
            PRIMARY KEY (credential_id, tag_id),
            FOREIGN KEY (credential_id) REFERENCES credentials(id) ON DELETE CASCADE,
            FOREIGN KEY (tag_id) REFERENCES tags(id)
        );

        CREATE INDEX IF NOT EXISTS idx_credential_tags_tag ON credential_tags(tag_id);
        ",
    )
}

/// V2: Add columns for older databases that were created before V1 included them.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    // url column on credentials
    if conn.prepare("SELECT url FROM credentials LIMIT 0").is_err() {
        let _ = conn.execute_batch("ALTER TABLE credentials ADD COLUMN url TEXT;");
    }
    // notes column on credentials
    if conn.prepare("SELECT notes FROM credentials LIMIT 0").is_err() {
        let _ = conn.execute_batch("ALTER TABLE credentials ADD COLUMN notes TEXT;");
    }
    Ok(())
}
