//! SQLite-backed persistence for user-supplied backend configuration.
//!
//! The console stores four flat key–value entries: the Cognito user pool id,
//! the application id, the API base URL, and the identity token obtained at
//! sign-in. Connections are short-lived and opened per operation; WAL mode
//! and a busy timeout keep concurrent console instances from tripping over
//! each other.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::models::Credentials;

const KEY_USER_POOL_ID: &str = "user-pool-id";
const KEY_APP_ID: &str = "app-id";
const KEY_API_URL: &str = "api-url";
const KEY_ID_TOKEN: &str = "id-token";

/// Get the database file path.
///
/// Checks `BEDROCK_CONSOLE_DB_PATH` first, falls back to
/// `~/.bedrock-console/console.db`.
fn get_db_path() -> Result<PathBuf> {
    if let Ok(custom_path) = env::var("BEDROCK_CONSOLE_DB_PATH") {
        return Ok(PathBuf::from(custom_path));
    }

    let base_dirs = directories::BaseDirs::new().context("Failed to find home directory")?;
    let console_dir = base_dirs.home_dir().join(".bedrock-console");

    if !console_dir.exists() {
        fs::create_dir_all(&console_dir)?;
    }

    Ok(console_dir.join("console.db"))
}

/// Open database connection with WAL mode and retry logic.
///
/// Retries "database locked" errors with a short backoff before giving up.
fn open_db() -> Result<Connection> {
    let db_path = get_db_path()?;

    let mut attempts = 0;
    let max_attempts = 3;

    loop {
        match Connection::open(&db_path) {
            Ok(conn) => {
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.pragma_update(None, "busy_timeout", 5000)?;
                init_schema(&conn)?;
                return Ok(conn);
            }
            Err(e) if e.to_string().contains("locked") && attempts < max_attempts => {
                attempts += 1;
                thread::sleep(Duration::from_millis(100 * attempts));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS credentials (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER
        );
        INSERT OR IGNORE INTO credentials (key, value) VALUES ('schema_version', '1');",
    )?;
    Ok(())
}

fn get_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM credentials WHERE key = ?1")?;
    let result = stmt
        .query_row(params![key], |row| row.get::<_, String>(0))
        .optional()?;
    Ok(result)
}

fn set_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let now = Utc::now().timestamp();
    conn.execute(
        "INSERT INTO credentials (key, value, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, now],
    )?;
    Ok(())
}

fn remove_value(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM credentials WHERE key = ?1", params![key])?;
    Ok(())
}

/// Load the stored backend configuration.
///
/// Returns `Some` only when all three entries exist; a partially written
/// store counts as not configured.
pub fn load_credentials() -> Result<Option<Credentials>> {
    let conn = open_db()?;
    let user_pool_id = get_value(&conn, KEY_USER_POOL_ID)?;
    let app_id = get_value(&conn, KEY_APP_ID)?;
    let api_url = get_value(&conn, KEY_API_URL)?;

    match (user_pool_id, app_id, api_url) {
        (Some(user_pool_id), Some(app_id), Some(api_url)) => Ok(Some(Credentials {
            user_pool_id,
            app_id,
            api_url,
        })),
        _ => Ok(None),
    }
}

/// Write all three configuration entries unconditionally.
pub fn save_credentials(creds: &Credentials) -> Result<()> {
    let conn = open_db()?;
    set_value(&conn, KEY_USER_POOL_ID, &creds.user_pool_id)?;
    set_value(&conn, KEY_APP_ID, &creds.app_id)?;
    set_value(&conn, KEY_API_URL, &creds.api_url)?;
    Ok(())
}

/// Remove the three configuration entries. The identity token, if any,
/// is left in place.
pub fn clear_credentials() -> Result<()> {
    let conn = open_db()?;
    remove_value(&conn, KEY_USER_POOL_ID)?;
    remove_value(&conn, KEY_APP_ID)?;
    remove_value(&conn, KEY_API_URL)?;
    Ok(())
}

/// Fetch the stored identity token.
pub fn load_token() -> Result<Option<String>> {
    let conn = open_db()?;
    get_value(&conn, KEY_ID_TOKEN)
}

/// Persist the identity token.
pub fn store_token(token: &str) -> Result<()> {
    let conn = open_db()?;
    set_value(&conn, KEY_ID_TOKEN, token)
}

/// Remove the stored identity token.
pub fn clear_token() -> Result<()> {
    let conn = open_db()?;
    remove_value(&conn, KEY_ID_TOKEN)
}
