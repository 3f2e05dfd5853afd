use crate::app_dirs::AppDirs;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

/// One recorded selection attempt.
#[derive(Debug, Clone)]
pub struct SelectionStat {
    pub letter: char,
    pub time_to_select_ms: u64,
    pub was_correct: bool,
    pub mode: String,
    pub timestamp: DateTime<Local>,
}

/// Database manager for per-letter selection statistics.
#[derive(Debug)]
pub struct StatsDb {
    conn: Connection,
}

impl StatsDb {
    /// Open (creating if needed) the stats database in the app state dir.
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("snoot_stats.db"));
        Self::open(&db_path)
    }

    /// Open a database at an explicit path. Used by tests.
    pub fn with_path<P: AsRef<Path>>(p: P) -> Result<Self> {
        Self::open(p.as_ref())
    }

    fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(db_path)?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS selection_stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                letter TEXT NOT NULL,
                time_to_select_ms INTEGER NOT NULL,
                was_correct BOOLEAN NOT NULL,
                mode TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_selection_stats_letter ON selection_stats(letter)",
            [],
        )?;

        Ok(StatsDb { conn })
    }

    pub fn record_selection(&self, stat: &SelectionStat) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO selection_stats (letter, time_to_select_ms, was_correct, mode, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                stat.letter.to_string(),
                stat.time_to_select_ms as i64,
                stat.was_correct,
                stat.mode,
                stat.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Fraction of attempts on `letter` that picked a wrong target.
    pub fn miss_rate(&self, letter: char) -> Result<f64> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT COUNT(*) as total,
                   SUM(CASE WHEN was_correct THEN 0 ELSE 1 END) as misses
            FROM selection_stats WHERE letter = ?1
            "#,
        )?;
        let (total, misses): (i64, Option<i64>) =
            stmt.query_row(params![letter.to_string()], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
        if total == 0 {
            return Ok(0.0);
        }
        Ok(misses.unwrap_or(0) as f64 / total as f64)
    }

    /// Mean time from round start to confirmed selection for `letter`,
    /// correct attempts only.
    pub fn avg_time_to_select(&self, letter: char) -> Result<Option<f64>> {
        let mut stmt = self.conn.prepare(
            "SELECT AVG(time_to_select_ms) FROM selection_stats WHERE letter = ?1 AND was_correct = 1",
        )?;
        stmt.query_row(params![letter.to_string()], |row| row.get(0))
    }

    /// Per-letter summary: (letter, avg_time_ms, miss_rate, attempts).
    pub fn letter_summary(&self) -> Result<Vec<(char, f64, f64, i64)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT letter,
                   AVG(time_to_select_ms) as avg_time,
                   1.0 - AVG(CASE WHEN was_correct THEN 1.0 ELSE 0.0 END) as miss_rate,
                   COUNT(*) as attempts
            FROM selection_stats
            GROUP BY letter
            ORDER BY letter
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let letter: String = row.get(0)?;
            Ok((
                letter.chars().next().unwrap_or('?'),
                row.get::<_, f64>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;
        rows.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (tempfile::TempDir, StatsDb) {
        let dir = tempfile::tempdir().unwrap();
        let db = StatsDb::with_path(dir.path().join("stats.db")).unwrap();
        (dir, db)
    }

    fn stat(letter: char, ms: u64, correct: bool) -> SelectionStat {
        SelectionStat {
            letter,
            time_to_select_ms: ms,
            was_correct: correct,
            mode: "Memory".to_string(),
            timestamp: Local::now(),
        }
    }

    #[test]
    fn test_miss_rate_empty_is_zero() {
        let (_dir, db) = temp_db();
        assert_eq!(db.miss_rate('T').unwrap(), 0.0);
    }

    #[test]
    fn test_record_and_miss_rate() {
        let (_dir, db) = temp_db();
        db.record_selection(&stat('T', 1200, true)).unwrap();
        db.record_selection(&stat('T', 1500, false)).unwrap();
        db.record_selection(&stat('T', 1100, true)).unwrap();
        db.record_selection(&stat('K', 2000, false)).unwrap();

        let rate = db.miss_rate('T').unwrap();
        assert!((rate - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(db.miss_rate('K').unwrap(), 1.0);
    }

    #[test]
    fn test_avg_time_uses_correct_attempts_only() {
        let (_dir, db) = temp_db();
        db.record_selection(&stat('E', 1000, true)).unwrap();
        db.record_selection(&stat('E', 3000, true)).unwrap();
        db.record_selection(&stat('E', 9000, false)).unwrap();

        let avg = db.avg_time_to_select('E').unwrap().unwrap();
        assert!((avg - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_avg_time_none_without_data() {
        let (_dir, db) = temp_db();
        assert!(db.avg_time_to_select('Z').unwrap().is_none());
    }

    #[test]
    fn test_letter_summary_orders_by_letter() {
        let (_dir, db) = temp_db();
        db.record_selection(&stat('C', 1000, true)).unwrap();
        db.record_selection(&stat('A', 1500, false)).unwrap();
        db.record_selection(&stat('B', 1200, true)).unwrap();

        let summary = db.letter_summary().unwrap();
        let letters: Vec<char> = summary.iter().map(|s| s.0).collect();
        assert_eq!(letters, vec!['A', 'B', 'C']);
        assert_eq!(summary[0].3, 1);
    }
}
