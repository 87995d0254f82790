//! File-backed attempt store.

use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, info, warn};

use safecode_core::SecurityCode;

use crate::error::{StorageError, StorageResult};
use crate::log::{ParsedLog, format_record, parse_attempt_log};
use crate::store::AttemptStore;
use crate::tried::TriedSet;

/// Attempt log kept in a plain text file.
///
/// Each [`record`](AttemptStore::record) opens the file in append mode,
/// writes one line and syncs it to disk before returning, so an interrupted
/// process loses at most the attempt that was in flight.
///
/// A missing file loads as an empty log and is created by the first append.
/// If the last line of an existing log has no trailing newline, the next
/// append terminates it first so the two codes never merge.
///
/// # Example
///
/// ```no_run
/// use safecode_core::SecurityCode;
/// use safecode_storage::{AttemptStore, FileAttemptStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = FileAttemptStore::new("codes.txt");
/// let tried = store.load().await?;
/// println!("{} codes already tried", tried.len());
///
/// store.record(SecurityCode::new(1234)?).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileAttemptStore {
    path: PathBuf,
}

impl FileAttemptStore {
    /// Create a store for the log at `path`. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole log, keeping file order and skipped lines.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] for any I/O failure other than the
    /// file not existing.
    pub async fn read_log(&self) -> StorageResult<ParsedLog> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No attempt log yet");
                return Ok(ParsedLog::default());
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        // Invalid UTF-8 only affects the lines it appears on
        let text = String::from_utf8_lossy(&bytes);
        Ok(parse_attempt_log(&text))
    }
}

impl AttemptStore for FileAttemptStore {
    async fn load(&mut self) -> StorageResult<TriedSet> {
        let parsed = self.read_log().await?;
        for record in &parsed.malformed {
            warn!(
                path = %self.path.display(),
                line = record.line,
                content = %record.content,
                "Skipping malformed attempt record"
            );
        }

        let tried = parsed.tried();
        info!(
            path = %self.path.display(),
            records = parsed.record_count(),
            distinct = tried.len(),
            skipped = parsed.malformed.len(),
            "Loaded attempt log"
        );
        Ok(tried)
    }

    async fn record(&mut self, code: SecurityCode) -> StorageResult<()> {
        let append_error = |source| StorageError::Append {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(append_error)?;

        let mut line = format_record(code);
        if ends_unterminated(&mut file).await.map_err(append_error)? {
            warn!(path = %self.path.display(), "Attempt log lacks a final newline; terminating it");
            line.insert(0, '\n');
        }
        file.write_all(line.as_bytes()).await.map_err(append_error)?;
        file.flush().await.map_err(append_error)?;
        file.sync_data().await.map_err(append_error)?;

        debug!(%code, path = %self.path.display(), "Attempt recorded");
        Ok(())
    }
}

/// Whether the file is non-empty and its last byte is not a newline.
async fn ends_unterminated(file: &mut File) -> std::io::Result<bool> {
    let len = file.metadata().await?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] != b'\n')
}
