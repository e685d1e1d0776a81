//! Rolling File Logger
//!
//! Installs a `tracing` subscriber that writes every record to stderr and to
//! a size-rotated set of log files (`<app>.log`, `<app>.log.1`, ...). The most
//! recent lines are also kept in a circular buffer so an application can show
//! them without touching the disk. Records emitted through the `log` facade
//! are bridged into the same subscriber.

use std::collections::VecDeque;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::MakeWriter;

/// Rotate once the active file reaches this size
pub const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;
/// Number of rotated files kept next to the active one
pub const DEFAULT_MAX_FILES: usize = 5;
/// Lines kept in the in-memory buffer
pub const DEFAULT_RECENT_LINES: usize = 500;

static LOGGER: OnceLock<RollingFileWriter> = OnceLock::new();

/// Logger errors
#[derive(Debug)]
pub enum LoggerError {
    Io(io::Error),
    AlreadyInitialized,
    NotInitialized,
}

impl fmt::Display for LoggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerError::Io(e) => write!(f, "Log file error: {}", e),
            LoggerError::AlreadyInitialized => write!(f, "Logger already initialized"),
            LoggerError::NotInitialized => write!(f, "Logger not initialized"),
        }
    }
}

impl std::error::Error for LoggerError {}

impl From<io::Error> for LoggerError {
    fn from(e: io::Error) -> Self {
        LoggerError::Io(e)
    }
}

/// Initialize the global logger writing under `log_dir`
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), LoggerError> {
    let writer = RollingFileWriter::new(
        log_dir.as_ref(),
        app_name,
        DEFAULT_MAX_BYTES,
        DEFAULT_MAX_FILES,
        DEFAULT_RECENT_LINES,
    )?;

    LOGGER
        .set(writer.clone())
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    tracing_subscriber::fmt()
        .with_timer(LocalTime)
        .with_ansi(false)
        .with_target(true)
        .with_max_level(tracing::Level::INFO)
        .with_writer(io::stderr.and(writer))
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    tracing::info!("Logger started for {} in {}", app_name, log_dir.as_ref().display());
    Ok(())
}

/// Log an info line through the global logger
pub fn info(msg: &str) -> Result<(), LoggerError> {
    LOGGER.get().ok_or(LoggerError::NotInitialized)?;
    tracing::info!("{}", msg);
    Ok(())
}

/// Log a warning line through the global logger
pub fn warn(msg: &str) -> Result<(), LoggerError> {
    LOGGER.get().ok_or(LoggerError::NotInitialized)?;
    tracing::warn!("{}", msg);
    Ok(())
}

/// Log an error line through the global logger
pub fn error(msg: &str) -> Result<(), LoggerError> {
    LOGGER.get().ok_or(LoggerError::NotInitialized)?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Most recent lines written by the global logger, oldest first
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(|w| w.recent_lines()).unwrap_or_default()
}

/// Local wall-clock timestamps for log lines
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

struct RollingState {
    dir: PathBuf,
    app_name: String,
    max_bytes: u64,
    max_files: usize,
    file: Option<File>,
    written: u64,
    recent: VecDeque<String>,
    recent_capacity: usize,
}

impl RollingState {
    fn active_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.app_name))
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.log.{}", self.app_name, index))
    }

    fn open(&mut self) -> io::Result<()> {
        let path = self.active_path();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        self.written = file.metadata()?.len();
        self.file = Some(file);
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file = None;

        if self.max_files == 0 {
            fs::remove_file(self.active_path()).or_else(ignore_missing)?;
            return self.open();
        }

        fs::remove_file(self.rotated_path(self.max_files)).or_else(ignore_missing)?;
        for index in (1..self.max_files).rev() {
            let from = self.rotated_path(index);
            if from.exists() {
                fs::rename(&from, self.rotated_path(index + 1))?;
            }
        }
        fs::rename(self.active_path(), self.rotated_path(1)).or_else(ignore_missing)?;
        self.open()
    }

    fn remember(&mut self, buf: &[u8]) {
        if self.recent_capacity == 0 {
            return;
        }
        for line in String::from_utf8_lossy(buf).lines() {
            if line.is_empty() {
                continue;
            }
            if self.recent.len() == self.recent_capacity {
                self.recent.pop_front();
            }
            self.recent.push_back(line.to_string());
        }
    }

    fn write_record(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        if self.file.is_none() {
            self.open()?;
        }
        if let Some(file) = self.file.as_mut() {
            file.write_all(buf)?;
            self.written += buf.len() as u64;
        }
        self.remember(buf);
        Ok(())
    }
}

fn ignore_missing(e: io::Error) -> io::Result<()> {
    if e.kind() == io::ErrorKind::NotFound {
        Ok(())
    } else {
        Err(e)
    }
}

/// Size-rotated file sink with a circular buffer of recent lines
#[derive(Clone)]
pub struct RollingFileWriter {
    state: Arc<Mutex<RollingState>>,
}

impl RollingFileWriter {
    pub fn new(
        dir: &Path,
        app_name: &str,
        max_bytes: u64,
        max_files: usize,
        recent_capacity: usize,
    ) -> Result<Self, LoggerError> {
        fs::create_dir_all(dir)?;
        let mut state = RollingState {
            dir: dir.to_path_buf(),
            app_name: app_name.to_string(),
            max_bytes,
            max_files,
            file: None,
            written: 0,
            recent: VecDeque::with_capacity(recent_capacity),
            recent_capacity,
        };
        state.open()?;
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
        })
    }

    /// Path of the file currently written to
    pub fn active_path(&self) -> PathBuf {
        match self.state.lock() {
            Ok(state) => state.active_path(),
            Err(poisoned) => poisoned.into_inner().active_path(),
        }
    }

    pub fn recent_lines(&self) -> Vec<String> {
        match self.state.lock() {
            Ok(state) => state.recent.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().recent.iter().cloned().collect(),
        }
    }
}

/// Per-record handle handed out to the fmt layer
pub struct RollingHandle {
    state: Arc<Mutex<RollingState>>,
}

impl Write for RollingHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        state.write_record(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        match state.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for RollingFileWriter {
    type Writer = RollingHandle;

    fn make_writer(&'a self) -> Self::Writer {
        RollingHandle {
            state: Arc::clone(&self.state),
        }
    }
}
