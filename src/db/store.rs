//! SQLite request log store.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, Result as SqlResult};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

use super::models::*;
use crate::uptime::{Outcome, TimeRange};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";

/// Database error types.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("database not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unparseable timestamp: {0:?}")]
    InvalidTimestamp(String),
}

/// Thread-safe database store.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (creating if needed) the store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init()?;
        Ok(store)
    }

    /// Open a store that must already exist, e.g. for reporting.
    pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DbError::NotFound(path.to_path_buf()));
        }
        Self::new(path)
    }

    /// In-memory store, used by tests.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, DbError> {
        let store = Self {
            conn: Arc::new(Mutex::new(Connection::open_in_memory()?)),
        };
        store.init()?;
        Ok(store)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn init(&self) -> Result<(), DbError> {
        self.conn()
            .execute_batch(include_str!("../../migrations/000001_init.up.sql"))
            .map_err(|e| DbError::Migration(format!("Migration 1 failed: {}", e)))?;
        Ok(())
    }

    // --- Writes ---

    /// Append one request log row and return its ID.
    pub fn add_request_log(&self, log: &NewRequestLog) -> Result<i64, DbError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO request_logs (url, name_parameter, response_status, response_text, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                log.url,
                log.name_parameter,
                log.response_status,
                truncate_response_text(&log.response_text),
                log.timestamp.format(TIME_FORMAT).to_string(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    // --- Reads ---

    /// All outcomes in ascending timestamp order.
    ///
    /// Fails on the first row whose timestamp cannot be parsed.
    pub fn fetch_ordered_outcomes(&self) -> Result<Vec<Outcome>, DbError> {
        query_ordered_outcomes(&self.conn())
    }

    /// First and last timestamps and the row count, or `None` when empty.
    pub fn fetch_time_range(&self) -> Result<Option<TimeRange>, DbError> {
        query_time_range(&self.conn())
    }

    /// Time range and outcomes read under one lock, so a concurrent writer
    /// cannot make them disagree.
    pub fn fetch_snapshot(&self) -> Result<Option<(TimeRange, Vec<Outcome>)>, DbError> {
        let conn = self.conn();
        let Some(range) = query_time_range(&conn)? else {
            return Ok(None);
        };
        Ok(Some((range, query_ordered_outcomes(&conn)?)))
    }

    /// Most recent request logs, newest first.
    pub fn recent_logs(&self, limit: u32) -> Result<Vec<RequestLog>, DbError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, url, name_parameter, response_status, response_text
             FROM request_logs ORDER BY timestamp DESC, id DESC LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, u16>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<SqlResult<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, time_str, url, name_parameter, response_status, response_text)| {
                Ok(RequestLog {
                    id,
                    timestamp: parse_db_time(&time_str)
                        .ok_or(DbError::InvalidTimestamp(time_str))?,
                    url,
                    name_parameter,
                    response_status,
                    response_text,
                })
            })
            .collect()
    }
}

fn query_ordered_outcomes(conn: &Connection) -> Result<Vec<Outcome>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT id, timestamp, response_status FROM request_logs ORDER BY timestamp ASC, id ASC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u16>(2)?,
            ))
        })?
        .collect::<SqlResult<Vec<_>>>()?;

    rows.into_iter()
        .map(|(id, time_str, status)| {
            let timestamp = parse_db_time(&time_str).ok_or_else(|| {
                tracing::error!("Row {} has an unparseable timestamp {:?}", id, time_str);
                DbError::InvalidTimestamp(time_str)
            })?;
            Ok(Outcome::new(timestamp, status))
        })
        .collect()
}

fn query_time_range(conn: &Connection) -> Result<Option<TimeRange>, DbError> {
    let (min, max, total): (Option<String>, Option<String>, i64) = conn.query_row(
        "SELECT MIN(timestamp), MAX(timestamp), COUNT(*) FROM request_logs",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    let (Some(min), Some(max)) = (min, max) else {
        return Ok(None);
    };
    if total == 0 {
        return Ok(None);
    }

    Ok(Some(TimeRange {
        start: parse_db_time(&min).ok_or(DbError::InvalidTimestamp(min))?,
        end: parse_db_time(&max).ok_or(DbError::InvalidTimestamp(max))?,
        total: total as u64,
    }))
}

/// Parse a datetime string from the database.
///
/// Only the space-separated UTC form written by `add_request_log` is
/// accepted: the queries order rows by comparing this text, which matches
/// chronological order for no other layout.
fn parse_db_time(s: &str) -> Option<DateTime<Utc>> {
    let formats = ["%Y-%m-%d %H:%M:%S%.9f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
}
