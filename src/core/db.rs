//! Sqlite storage for OAuth refresh tokens
use std::fs;

use anyhow::Result;
use tokio_rusqlite::Connection;

/// Open the async sqlite connection, creating the storage directory
/// if it does not exist yet.
pub async fn async_db(db_path: &str) -> Result<Connection> {
    fs::create_dir_all(db_path)?;
    let conn = Connection::open(format!("{}/mailsweep.db", db_path)).await?;
    Ok(conn)
}

/// Create the schema. Safe to run on every startup.
pub fn initialize_db(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS auth (
            id TEXT PRIMARY KEY,
            service TEXT NOT NULL,
            refresh_token TEXT NOT NULL
        )",
        (),
    )?;
    Ok(())
}
