//! Rolling File Logger
//!
//! Installs a `tracing` subscriber that writes to `<dir>/<app>.log`, rotating
//! to `<app>.log.1 .. <app>.log.N` once the active file reaches a size limit.
//! Records emitted through the `log` facade are bridged into the subscriber.
//! The most recent lines are also kept in a bounded in-memory buffer.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use thiserror::Error;
use tracing_subscriber::fmt::MakeWriter;

static LOGGER: OnceLock<RollingWriter> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to prepare log file: {0}")]
    Io(#[from] io::Error),

    #[error("failed to install subscriber: {0}")]
    Subscriber(String),

    #[error("logger not initialized")]
    NotInitialized,
}

/// Where and how much to log
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    pub log_dir: PathBuf,
    pub app_name: String,
    pub max_bytes: u64,
    pub max_files: usize,
    /// Lines kept in memory for `recent_lines`
    pub buffer_lines: usize,
}

impl LoggerOptions {
    pub fn new(log_dir: impl AsRef<Path>, app_name: &str) -> Self {
        Self {
            log_dir: log_dir.as_ref().to_path_buf(),
            app_name: app_name.to_string(),
            max_bytes: 5 * 1024 * 1024,
            max_files: 5,
            buffer_lines: 200,
        }
    }
}

struct RollingState {
    file: File,
    path: PathBuf,
    written: u64,
    max_bytes: u64,
    max_files: usize,
    recent: VecDeque<String>,
    buffer_lines: usize,
}

impl RollingState {
    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.max_files == 0 {
            self.file = File::create(&self.path)?;
        } else {
            // app.log.(N-1) -> app.log.N, ..., app.log -> app.log.1
            for index in (1..self.max_files).rev() {
                let from = rotated_path(&self.path, index);
                if from.exists() {
                    fs::rename(&from, rotated_path(&self.path, index + 1))?;
                }
            }
            fs::rename(&self.path, rotated_path(&self.path, 1))?;
            self.file = File::create(&self.path)?;
        }

        self.written = 0;
        let marker = format!(
            "--- rotated at {} ---\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f")
        );
        self.file.write_all(marker.as_bytes())?;
        self.written += marker.len() as u64;
        Ok(())
    }

    fn remember(&mut self, buf: &[u8]) {
        if self.buffer_lines == 0 {
            return;
        }
        for line in String::from_utf8_lossy(buf).lines() {
            if self.recent.len() == self.buffer_lines {
                self.recent.pop_front();
            }
            self.recent.push_back(line.to_string());
        }
    }
}

fn rotated_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

/// Size-rotated log file writer, cheap to clone
#[derive(Clone)]
pub struct RollingWriter {
    state: Arc<Mutex<RollingState>>,
}

impl RollingWriter {
    pub fn open(options: &LoggerOptions) -> Result<Self, LoggerError> {
        fs::create_dir_all(&options.log_dir)?;
        let path = options.log_dir.join(format!("{}.log", options.app_name));

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            state: Arc::new(Mutex::new(RollingState {
                file,
                path,
                written,
                max_bytes: options.max_bytes,
                max_files: options.max_files,
                recent: VecDeque::with_capacity(options.buffer_lines),
                buffer_lines: options.buffer_lines,
            })),
        })
    }

    /// Path of the active log file
    pub fn path(&self) -> PathBuf {
        match self.state.lock() {
            Ok(state) => state.path.clone(),
            Err(poisoned) => poisoned.into_inner().path.clone(),
        }
    }

    /// Most recent lines written, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        match self.state.lock() {
            Ok(state) => state.recent.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().recent.iter().cloned().collect(),
        }
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("log writer poisoned"))?;

        if state.written > 0 && state.written + buf.len() as u64 > state.max_bytes {
            state.rotate()?;
        }

        state.file.write_all(buf)?;
        state.written += buf.len() as u64;
        state.remember(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("log writer poisoned"))?;
        state.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Initialize logging with default limits
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), LoggerError> {
    init_logger_with(LoggerOptions::new(log_dir, app_name))
}

/// Initialize logging. Only the first successful call in a process takes effect.
pub fn init_logger_with(options: LoggerOptions) -> Result<(), LoggerError> {
    let writer = RollingWriter::open(&options)?;

    tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_ansi(false)
        .with_target(true)
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .map_err(|e| LoggerError::Subscriber(e.to_string()))?;

    let _ = LOGGER.set(writer);
    tracing::info!(app = %options.app_name, "logger initialized");
    Ok(())
}

/// Log an informational message
pub fn info(msg: &str) -> Result<(), LoggerError> {
    LOGGER.get().ok_or(LoggerError::NotInitialized)?;
    log::info!("{}", msg);
    Ok(())
}

/// Log an error message
pub fn error(msg: &str) -> Result<(), LoggerError> {
    LOGGER.get().ok_or(LoggerError::NotInitialized)?;
    log::error!("{}", msg);
    Ok(())
}

/// Recent lines from the installed logger, empty before initialization
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(RollingWriter::recent_lines).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(dir: &Path, max_bytes: u64, max_files: usize) -> LoggerOptions {
        LoggerOptions {
            max_bytes,
            max_files,
            buffer_lines: 3,
            ..LoggerOptions::new(dir, "test")
        }
    }

    #[test]
    fn test_writes_to_app_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::open(&options(dir.path(), 1024, 2)).unwrap();

        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();

        let content = fs::read_to_string(dir.path().join("test.log")).unwrap();
        assert_eq!(content, "hello\n");
        assert_eq!(writer.path(), dir.path().join("test.log"));
    }

    #[test]
    fn test_rotates_and_caps_file_count() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::open(&options(dir.path(), 16, 2)).unwrap();

        for i in 0..6 {
            writer.write_all(format!("line number {}\n", i).as_bytes()).unwrap();
        }
        writer.flush().unwrap();

        assert!(dir.path().join("test.log").exists());
        assert!(dir.path().join("test.log.1").exists());
        assert!(dir.path().join("test.log.2").exists());
        assert!(!dir.path().join("test.log.3").exists());

        let active = fs::read_to_string(dir.path().join("test.log")).unwrap();
        assert!(active.contains("line number 5"));
    }

    #[test]
    fn test_recent_lines_are_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::open(&options(dir.path(), 1024, 1)).unwrap();

        writer.write_all(b"a\nb\n").unwrap();
        writer.write_all(b"c\nd\n").unwrap();

        assert_eq!(writer.recent_lines(), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_helpers_require_init() {
        // No test in this crate installs the global logger
        assert!(matches!(info("x"), Err(LoggerError::NotInitialized)));
        assert!(recent_lines().is_empty());
    }
}
