//! 聚合统计

use chrono::{DateTime, NaiveTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Task counts. `pending` is always `total - completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub lists: u64,
    /// Tasks whose `completed_at` falls on the current UTC day
    pub done_today: u64,
}

/// 统计当前数据
pub fn get_stats(conn: &Connection) -> Result<Stats> {
    get_stats_at(conn, Utc::now())
}

/// 以 `now` 为基准统计（"今天" 按 UTC 计算）
pub fn get_stats_at(conn: &Connection, now: DateTime<Utc>) -> Result<Stats> {
    let start_of_day = now.date_naive().and_time(NaiveTime::MIN).and_utc();

    let (total, completed, done_today): (i64, i64, i64) = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(completed), 0),
                COALESCE(SUM(completed_at >= ?1), 0)
         FROM tasks",
        params![start_of_day],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;
    let lists: i64 = conn.query_row("SELECT COUNT(*) FROM lists", [], |row| row.get(0))?;

    // COUNT and SUM over 0/1 columns are never negative
    Ok(Stats {
        total: total as u64,
        completed: completed as u64,
        pending: (total - completed) as u64,
        lists: lists as u64,
        done_today: done_today as u64,
    })
}
