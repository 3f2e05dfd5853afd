use crate::app_dirs::AppDirs;
use chrono::Local;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

/// One finished session, appended to the CSV log.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    pub date: String,
    pub mode: String,
    pub success: bool,
    pub score: u32,
    pub letters_collected: usize,
    pub elapsed_secs: f64,
}

impl SessionRecord {
    pub fn new(
        mode: String,
        success: bool,
        score: u32,
        letters_collected: usize,
        elapsed_secs: f64,
    ) -> Self {
        Self {
            date: Local::now().format("%c").to_string(),
            mode,
            success,
            score,
            letters_collected,
            elapsed_secs,
        }
    }
}

/// Append-only CSV log of finished sessions.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path =
            AppDirs::session_log_path().unwrap_or_else(|| PathBuf::from("snoot_sessions.csv"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, record: &SessionRecord) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Emit the header only when creating the file
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer
            .serialize(record)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(mode: &str, success: bool) -> SessionRecord {
        SessionRecord::new(mode.to_string(), success, 11, 11, 42.5)
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.csv");
        let log = SessionLog::with_path(&path);

        log.append(&record("Memory", true)).unwrap();
        log.append(&record("Speed", false)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,mode,success,score"));
        assert!(lines[1].contains("Memory"));
        assert!(lines[2].contains("Speed"));
    }

    #[test]
    fn test_append_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("sessions.csv");
        let log = SessionLog::with_path(&path);
        log.append(&record("Practice", true)).unwrap();
        assert!(path.exists());
    }
}
