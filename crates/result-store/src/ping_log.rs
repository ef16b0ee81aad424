// In crates/result-store/src/ping_log.rs

use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A capped, append-only text log of diagnostic pings, one line per ping.
///
/// Appends are serialized so concurrent pings never lose lines.
#[derive(Debug, Clone)]
pub struct PingLog {
    path: PathBuf,
    capacity: usize,
    write_lock: Arc<Mutex<()>>,
}

impl PingLog {
    /// `capacity` is clamped to at least one line.
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity: capacity.max(1),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends one line, dropping the oldest lines so that the log never holds
    /// more than `capacity` entries.
    pub async fn append(&self, line: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut lines = self.read_lines().await?;
        if lines.len() >= self.capacity {
            let excess = lines.len() - (self.capacity - 1);
            lines.drain(..excess);
        }
        lines.push(line.trim().to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }
        let mut contents = lines.join("\n");
        contents.push('\n');
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|source| self.io_error(source))?;

        tracing::debug!(entries = lines.len(), "Ping recorded.");
        Ok(())
    }

    /// All logged lines, oldest first. A log that was never written is empty.
    pub async fn read_all(&self) -> Result<Vec<String>> {
        self.read_lines().await
    }

    async fn read_lines(&self) -> Result<Vec<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> Error {
        Error::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Renders a ping time as a US-style local timestamp, e.g. `1/5/2024, 3:04:05 PM`.
///
/// An out-of-range offset falls back to UTC.
pub fn ping_line(now: DateTime<Utc>, utc_offset_minutes: i32) -> String {
    let offset = utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());
    now.with_timezone(&offset)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}
