//! Tracing setup: stdout plus one `digitpad_<timestamp>.log` file per launch.
//!
//! Only the newest [`MAX_LOG_FILES`] launch logs are kept. `RUST_LOG` overrides
//! the default `info` filter.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::OnceLock,
    time::SystemTime,
};

use time::{
    OffsetDateTime, UtcOffset,
    format_description::BorrowedFormatItem,
    macros::format_description,
};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs::{self, AppDirError};

pub const MAX_LOG_FILES: usize = 10;
const LOG_FILE_PREFIX: &str = "digitpad_";
const LOG_FILE_EXTENSION: &str = "log";
const DEFAULT_FILTER: &str = "info";

const FILE_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
const LINE_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("No log directory: {0}")]
    AppDir(#[from] AppDirError),
    #[error("Failed to format log file timestamp: {0}")]
    FormatTime(#[from] time::error::Format),
    #[error("Failed to create log file {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to prune logs in {path}: {source}")]
    Prune {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Tracing subscriber already installed: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// The file this launch writes its log to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LaunchLog {
    dir: PathBuf,
    file_name: String,
}

impl LaunchLog {
    fn for_time(dir: &Path, started: OffsetDateTime) -> Result<Self, LoggingError> {
        let stamp = started.format(FILE_STAMP)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            file_name: format!("{LOG_FILE_PREFIX}{stamp}.{LOG_FILE_EXTENSION}"),
        })
    }

    fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Create the file up front so pruning already counts it.
    fn touch(&self) -> Result<(), LoggingError> {
        let path = self.path();
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map(drop)
            .map_err(|source| LoggingError::CreateLogFile { path, source })
    }
}

/// Install the global subscriber and return the path of this launch's log file.
///
/// A second call returns `Ok(None)` and changes nothing.
pub fn init() -> Result<Option<PathBuf>, LoggingError> {
    if LOG_GUARD.get().is_some() {
        return Ok(None);
    }
    let launch = LaunchLog::for_time(&app_dirs::logs_dir()?, started_at())?;
    launch.touch()?;
    prune_launch_logs(&launch.dir, MAX_LOG_FILES)?;

    let (file_writer, guard) =
        tracing_appender::non_blocking(rolling::never(&launch.dir, &launch.file_name));
    let timer = line_timer();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().with_timer(timer.clone()))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(timer)
                .with_writer(file_writer),
        );
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = LOG_GUARD.set(guard);

    let path = launch.path();
    tracing::info!("Logging to {}", path.display());
    Ok(Some(path))
}

fn line_timer() -> fmt::time::OffsetTime<BorrowedFormatItem<'static>> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, LINE_STAMP.into())
}

fn started_at() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn is_launch_log(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    name.starts_with(LOG_FILE_PREFIX)
        && path.extension().and_then(|ext| ext.to_str()) == Some(LOG_FILE_EXTENSION)
}

/// Delete the oldest launch logs so at most `keep` remain; other files are untouched.
fn prune_launch_logs(dir: &Path, keep: usize) -> Result<(), LoggingError> {
    let prune_err = |source| LoggingError::Prune {
        path: dir.to_path_buf(),
        source,
    };
    let mut logs: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir).map_err(prune_err)?.flatten() {
        let path = entry.path();
        if !path.is_file() || !is_launch_log(&path) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        logs.push((modified, path));
    }
    if logs.len() <= keep {
        return Ok(());
    }
    logs.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
    for (_, path) in logs.drain(keep..) {
        tracing::debug!("Removing old log {}", path.display());
        fs::remove_file(&path).map_err(prune_err)?;
    }
    Ok(())
}
