/*!
 * Per-unit audit log.
 *
 * The document translator reports skipped, failed and cached units to a
 * `TranslationLogger`. The file-backed logger appends one line per event:
 *
 * `<RFC3339 UTC> | <LEVEL> | <file> | <unit id or -> | <reason> | <source>`
 */

use chrono::{SecondsFormat, Utc};
use log::warn;
use parking_lot::Mutex;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::file_utils::FileManager;

/// Longest source excerpt written to the log, in characters
const SOURCE_EXCERPT_CHARS: usize = 120;

/// Kind of event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Skipped,
    Failed,
    Cached,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Skipped => "SKIPPED",
            Self::Failed => "FAILED",
            Self::Cached => "CACHED",
        };
        f.write_str(label)
    }
}

/// Receiver of per-unit events
pub trait TranslationLogger: Send + Sync {
    /// A unit was left alone
    fn skipped(&self, file: &str, unit_id: Option<&str>, reason: &str, source: &str);

    /// No acceptable translation was found and the source was written instead
    fn failed(&self, file: &str, unit_id: Option<&str>, reason: &str, source: &str);

    /// The translation came from the cache
    fn cached(&self, file: &str, unit_id: Option<&str>, source: &str);
}

/// Logger that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTranslationLogger;

impl TranslationLogger for NullTranslationLogger {
    fn skipped(&self, _file: &str, _unit_id: Option<&str>, _reason: &str, _source: &str) {}

    fn failed(&self, _file: &str, _unit_id: Option<&str>, _reason: &str, _source: &str) {}

    fn cached(&self, _file: &str, _unit_id: Option<&str>, _source: &str) {}
}

/// Logger appending events to a text file
#[derive(Debug)]
pub struct FileTranslationLogger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTranslationLogger {
    /// Log to `path`; the file is created on the first event
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format one log line
    pub fn format_line(
        timestamp: &str,
        level: LogLevel,
        file: &str,
        unit_id: Option<&str>,
        reason: &str,
        source: &str,
    ) -> String {
        format!(
            "{} | {} | {} | {} | {} | {}",
            timestamp,
            level,
            file,
            unit_id.filter(|id| !id.is_empty()).unwrap_or("-"),
            reason,
            excerpt(source)
        )
    }

    fn write(&self, level: LogLevel, file: &str, unit_id: Option<&str>, reason: &str, source: &str) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let line = Self::format_line(&timestamp, level, file, unit_id, reason, source);

        let _guard = self.lock.lock();
        if let Err(e) = FileManager::append_line(&self.path, &line) {
            warn!("Could not write translation log {:?}: {}", self.path, e);
        }
    }
}

impl TranslationLogger for FileTranslationLogger {
    fn skipped(&self, file: &str, unit_id: Option<&str>, reason: &str, source: &str) {
        self.write(LogLevel::Skipped, file, unit_id, reason, source);
    }

    fn failed(&self, file: &str, unit_id: Option<&str>, reason: &str, source: &str) {
        self.write(LogLevel::Failed, file, unit_id, reason, source);
    }

    fn cached(&self, file: &str, unit_id: Option<&str>, source: &str) {
        self.write(LogLevel::Cached, file, unit_id, "cache hit", source);
    }
}

/// Single-line source excerpt, cut at 120 characters
fn excerpt(source: &str) -> String {
    let flat: String = source
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();

    match flat.char_indices().nth(SOURCE_EXCERPT_CHARS) {
        Some((end, _)) => format!("{}…", &flat[..end]),
        None => flat,
    }
}
