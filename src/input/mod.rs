pub mod csv;

pub use self::csv::CsvLog;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::core::Micros;

/// Files without a known extension below this size are assumed to be logs
pub const LOG_SIZE_GUESS_LIMIT: u64 = 10 * 1024 * 1024;

const LOG_EXTENSIONS: &[&str] = &["txt", "cfl", "log", "csv"];
const VIDEO_EXTENSIONS: &[&str] = &["avi", "mov", "mp4", "mpeg"];
const WORKSPACE_EXTENSIONS: &[&str] = &["json"];

/// What an opened file should be treated as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Log,
    Video,
    Workspaces,
}

/// Classify a file by extension, falling back to its size
pub fn classify_file(path: &Path, size: u64) -> InputFormat {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some(ext) if LOG_EXTENSIONS.contains(&ext) => InputFormat::Log,
        Some(ext) if VIDEO_EXTENSIONS.contains(&ext) => InputFormat::Video,
        Some(ext) if WORKSPACE_EXTENSIONS.contains(&ext) => InputFormat::Workspaces,
        _ if size < LOG_SIZE_GUESS_LIMIT => InputFormat::Log,
        _ => InputFormat::Video,
    }
}

/// Errors raised while loading a log
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read log: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("No time column found in header")]
    MissingTimeColumn,

    #[error("Invalid value '{value}' for '{field}' on line {line}")]
    InvalidValue { line: u64, field: String, value: String },

    #[error("Log contains no frames")]
    NoFrames,

    #[error("Loader task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// A time-indexed recording, possibly holding several flights.
///
/// Time values refer to the currently open segment.
pub trait LogSource: Send {
    /// Identity used as the offset cache key (usually the file name)
    fn identity(&self) -> &str;

    /// Number of segments in the file
    fn segment_count(&self) -> usize;

    /// Open a segment for viewing. Returns false if it cannot be used.
    fn open_segment(&mut self, index: usize) -> bool;

    /// Index of the open segment
    fn segment_index(&self) -> Option<usize>;

    /// Reason a segment cannot be opened, if any
    fn segment_error(&self, _index: usize) -> Option<String> {
        None
    }

    fn min_time(&self) -> Micros;

    fn max_time(&self) -> Micros;

    /// Names of the value columns, in frame order
    fn field_names(&self) -> &[String];

    /// Frame at or immediately before `time`
    fn frame_at(&self, time: Micros) -> Option<&[f64]>;
}

/// Trait for asynchronous log loaders
#[async_trait]
pub trait LogLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<Box<dyn LogSource>, LoadError>;
}

/// Loads CSV flight logs on the blocking pool
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvLoader;

#[async_trait]
impl LogLoader for CsvLoader {
    async fn load(&self, path: &Path) -> Result<Box<dyn LogSource>, LoadError> {
        let log = load_log(path).await?;
        Ok(Box::new(log))
    }
}

/// Parse a CSV log without blocking the runtime
pub async fn load_log(path: impl AsRef<Path>) -> Result<CsvLog, LoadError> {
    let path: PathBuf = path.as_ref().to_path_buf();
    let log = tokio::task::spawn_blocking(move || CsvLog::from_path(&path)).await??;
    info!(
        log = log.identity(),
        segments = log.segment_count(),
        fields = log.field_names().len(),
        "log loaded"
    );
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(classify_file(Path::new("LOG00001.TXT"), 0), InputFormat::Log);
        assert_eq!(classify_file(Path::new("flight.cfl"), 0), InputFormat::Log);
        assert_eq!(classify_file(Path::new("GOPR0001.MP4"), 0), InputFormat::Video);
        assert_eq!(classify_file(Path::new("clip.mov"), 0), InputFormat::Video);
        assert_eq!(classify_file(Path::new("workspaces.json"), 0), InputFormat::Workspaces);
    }

    #[test]
    fn test_classify_unknown_by_size() {
        assert_eq!(classify_file(Path::new("capture.bin"), 1024), InputFormat::Log);
        assert_eq!(classify_file(Path::new("capture"), LOG_SIZE_GUESS_LIMIT), InputFormat::Video);
    }

    #[tokio::test]
    async fn test_load_log_from_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "time,gyroADC[0]\n0,1\n1000,2\n2000,3").unwrap();

        let log = load_log(file.path()).await.unwrap();
        assert_eq!(log.segment_count(), 1);
        assert_eq!(log.field_names(), ["gyroADC[0]".to_string()]);
    }

    #[tokio::test]
    async fn test_loader_reports_missing_file() {
        let result = CsvLoader.load(Path::new("/nonexistent/LOG00001.TXT")).await;
        assert!(matches!(result, Err(LoadError::Io(_))));
    }
}
