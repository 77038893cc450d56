use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE: &str = "gradecalc.sqlite3";
pub const VISIT_COUNTER_KEY: &str = "visitCount";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace).with_context(|| {
        format!(
            "failed to create workspace {}",
            workspace.to_string_lossy()
        )
    })?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.to_string_lossy()))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS counters(
            key TEXT PRIMARY KEY,
            value INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Counter {
    pub value: i64,
    pub updated_at: Option<String>,
}

/// Bumps `key` by one, creating it at 1, and returns the new value.
pub fn counter_increment(conn: &Connection, key: &str) -> anyhow::Result<i64> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO counters(key, value, updated_at) VALUES(?, 1, ?)
         ON CONFLICT(key) DO UPDATE SET value = value + 1, updated_at = excluded.updated_at",
        (key, &now),
    )?;
    let value: i64 = conn.query_row(
        "SELECT value FROM counters WHERE key = ?",
        [key],
        |r| r.get(0),
    )?;
    Ok(value)
}

pub fn counter_get(conn: &Connection, key: &str) -> anyhow::Result<Option<Counter>> {
    let row = conn
        .query_row(
            "SELECT value, updated_at FROM counters WHERE key = ?",
            [key],
            |r| {
                Ok(Counter {
                    value: r.get(0)?,
                    updated_at: r.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

pub fn settings_get_json(
    conn: &Connection,
    key: &str,
) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value_json FROM settings WHERE key = ?",
            [key],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => {
            let v = serde_json::from_str(&s)
                .with_context(|| format!("setting {} is not valid JSON", key))?;
            Ok(Some(v))
        }
        None => Ok(None),
    }
}

pub fn settings_set_json(
    conn: &Connection,
    key: &str,
    value: &serde_json::Value,
) -> anyhow::Result<()> {
    let s = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        (key, s),
    )?;
    Ok(())
}
