//! Database schema definitions
//!
//! This module contains the SQL schema for the Profile-Harvest state database.

/// SQL schema for the database
///
/// Every harvest record is a JSON document stored under a string key. A write
/// replaces the whole document, so a reader never sees a half-updated record.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
