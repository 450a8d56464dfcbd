//! Database schema definitions
//!
//! This module contains the SQL schema for the Profile-Sweep database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per discovered profile; the link is the deduplication key
CREATE TABLE IF NOT EXISTS profiles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    profile_link TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    level TEXT NOT NULL,
    discovered_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// Safe to call on every start; existing data is left untouched.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        let result = initialize_schema(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_profile_link_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let insert = "INSERT INTO profiles (profile_link, display_name, level, discovered_at)
                      VALUES ('https://example.com/id/ab', 'Foo', '5', 'now')";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }
}
