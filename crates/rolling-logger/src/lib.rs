//! Rolling Logger
//!
//! File logger for the Tauri backend:
//! - size-rotated log files (`<name>.log`, `<name>.log.1` .. `<name>.log.N`)
//! - a circular buffer of the most recent lines, readable without touching disk
//! - `log` records are bridged into `tracing`, so both macro families end up here

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::MakeWriter;

/// Limits for the rolling file and the in-memory buffer
#[derive(Debug, Clone, Copy)]
pub struct LoggerConfig {
    /// Rotate once the active file reaches this size
    pub max_file_bytes: u64,
    /// Rotated files kept besides the active one
    pub max_files: usize,
    /// Lines kept in memory
    pub recent_capacity: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 1024 * 1024,
            max_files: 3,
            recent_capacity: 500,
        }
    }
}

/// Append-only log file that rotates by size
pub struct RollingFile {
    dir: PathBuf,
    base_name: String,
    max_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
}

impl RollingFile {
    pub fn open(dir: &Path, base_name: &str, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.log", base_name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            dir: dir.to_path_buf(),
            base_name: base_name.to_string(),
            max_bytes,
            max_files,
            file,
            written,
        })
    }

    /// Path of the active file (`index == 0`) or of a rotated one
    pub fn path(&self, index: usize) -> PathBuf {
        if index == 0 {
            self.dir.join(format!("{}.log", self.base_name))
        } else {
            self.dir.join(format!("{}.log.{}", self.base_name, index))
        }
    }

    pub fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.max_files == 0 {
            self.file = File::create(self.path(0))?;
            self.written = 0;
            return Ok(());
        }

        let oldest = self.path(self.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.max_files).rev() {
            let from = self.path(index);
            if from.exists() {
                fs::rename(&from, self.path(index + 1))?;
            }
        }
        fs::rename(self.path(0), self.path(1))?;

        self.file = OpenOptions::new().create(true).append(true).open(self.path(0))?;
        self.written = 0;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Circular buffer of recent log lines
#[derive(Debug, Clone)]
pub struct RecentLines {
    capacity: usize,
    lines: VecDeque<String>,
}

impl RecentLines {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            lines: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

struct Shared {
    file: Mutex<RollingFile>,
    recent: Mutex<RecentLines>,
}

/// `MakeWriter` feeding both the rolling file and the recent-lines buffer
#[derive(Clone)]
pub struct LogSink {
    shared: Arc<Shared>,
}

impl LogSink {
    pub fn new(dir: &Path, base_name: &str, config: LoggerConfig) -> io::Result<Self> {
        let file = RollingFile::open(dir, base_name, config.max_file_bytes, config.max_files)?;
        Ok(Self {
            shared: Arc::new(Shared {
                file: Mutex::new(file),
                recent: Mutex::new(RecentLines::new(config.recent_capacity)),
            }),
        })
    }

    pub fn recent_lines(&self) -> Vec<String> {
        self.shared
            .recent
            .lock()
            .map(|recent| recent.snapshot())
            .unwrap_or_default()
    }
}

/// Writer handed out per event by [`LogSink`]
pub struct SinkWriter {
    shared: Arc<Shared>,
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "log sink lock poisoned")
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.shared.file.lock().map_err(|_| poisoned())?.write_bytes(buf)?;

        let text = String::from_utf8_lossy(buf);
        let mut recent = self.shared.recent.lock().map_err(|_| poisoned())?;
        for line in text.lines().filter(|l| !l.is_empty()) {
            recent.push(line.to_string());
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.shared.file.lock().map_err(|_| poisoned())?.flush()
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter {
            shared: self.shared.clone(),
        }
    }
}

static SINK: OnceLock<LogSink> = OnceLock::new();

/// Install the global logger with default limits
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), String> {
    init_logger_with(log_dir, app_name, LoggerConfig::default())
}

/// Install the global logger: rolling file plus stderr, `log` bridged in
pub fn init_logger_with(log_dir: PathBuf, app_name: &str, config: LoggerConfig) -> Result<(), String> {
    let sink = LogSink::new(&log_dir, app_name, config)
        .map_err(|e| format!("Failed to open log file in {}: {}", log_dir.display(), e))?;

    let level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_writer(sink.clone().and(io::stderr))
        .with_ansi(false)
        .with_max_level(level)
        .try_init()
        .map_err(|e| format!("Failed to install logger: {}", e))?;

    SINK.set(sink).map_err(|_| "Logger already initialized".to_string())?;
    tracing::info!("{} logging to {}", app_name, log_dir.display());
    Ok(())
}

fn ensure_initialized() -> Result<(), String> {
    SINK.get().map(|_| ()).ok_or_else(|| "Logger not initialized".to_string())
}

pub fn info(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Most recent lines written by the global logger (empty before init)
pub fn recent_lines() -> Vec<String> {
    SINK.get().map(LogSink::recent_lines).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> LoggerConfig {
        LoggerConfig {
            max_file_bytes: 64,
            max_files: 2,
            recent_capacity: 3,
        }
    }

    #[test]
    fn test_rotation_keeps_bounded_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RollingFile::open(dir.path(), "app", 64, 2).unwrap();

        for i in 0..20 {
            file.write_bytes(format!("line number {:04}\n", i).as_bytes()).unwrap();
        }
        file.flush().unwrap();

        assert!(file.path(0).exists());
        assert!(file.path(1).exists());
        assert!(file.path(2).exists());
        assert!(!dir.path().join("app.log.3").exists());

        let active = fs::read_to_string(file.path(0)).unwrap();
        assert!(active.ends_with("line number 0019\n"));
        assert!(active.len() as u64 <= 64);
    }

    #[test]
    fn test_recent_lines_is_circular() {
        let mut recent = RecentLines::new(2);
        recent.push("a".into());
        recent.push("b".into());
        recent.push("c".into());
        assert_eq!(recent.snapshot(), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_sink_writer_splits_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LogSink::new(dir.path(), "app", small()).unwrap();
        let mut writer = sink.make_writer();
        writer.write_all(b"one\ntwo\n").unwrap();
        writer.write_all(b"three\nfour\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(sink.recent_lines(), vec!["two", "three", "four"]);
        let content = fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert!(content.contains("four"));
    }

    #[test]
    fn test_tracing_events_reach_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LogSink::new(dir.path(), "MindWell", LoggerConfig::default()).unwrap();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(sink.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("milestone saved");
            tracing::warn!("milestone save failed");
        });

        let content = fs::read_to_string(dir.path().join("MindWell.log")).unwrap();
        assert!(content.contains("milestone saved"));
        assert!(content.contains("WARN"));
        assert_eq!(sink.recent_lines().len(), 2);
    }

    #[test]
    fn test_helpers_require_init() {
        if SINK.get().is_none() {
            assert!(info("hello").is_err());
        }
    }
}
