use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::io::lock::{FileLock, LockError};
use crate::model::TaskDocument;

/// Error type for task document I/O
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize tasks: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("task store unavailable: {0}")]
    Unavailable(String),
}

/// Read and parse the tasks document at `path`.
pub fn read_tasks(path: &Path) -> Result<TaskDocument, StoreError> {
    let text = fs::read_to_string(path).map_err(|e| StoreError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| StoreError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Rewrite the tasks document at `path`.
///
/// Holds the document's advisory lock for the duration of the write and
/// replaces the file atomically, so readers never observe a partial file.
pub fn write_tasks(path: &Path, doc: &TaskDocument) -> Result<(), StoreError> {
    let mut content = serde_json::to_string_pretty(doc)?;
    content.push('\n');

    let _lock = FileLock::acquire_default(path)?;
    atomic_write(path, content.as_bytes()).map_err(|e| StoreError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Persistence seam used by the board handlers.
pub trait TaskStore {
    /// Read the whole document
    fn load(&self) -> Result<TaskDocument, StoreError>;
    /// Rewrite the whole document
    fn save(&mut self, doc: &TaskDocument) -> Result<(), StoreError>;
    /// Human-readable location, for messages and logs
    fn location(&self) -> String;
}

/// The tasks document on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }
}

impl TaskStore for JsonFileStore {
    fn load(&self) -> Result<TaskDocument, StoreError> {
        read_tasks(&self.path)
    }

    fn save(&mut self, doc: &TaskDocument) -> Result<(), StoreError> {
        write_tasks(&self.path, doc)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store; can be told to fail reads or writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub doc: TaskDocument,
    pub fail_reads: bool,
    pub fail_writes: bool,
    /// Number of successful saves
    pub saves: usize,
}

impl MemoryStore {
    pub fn new(doc: TaskDocument) -> Self {
        MemoryStore {
            doc,
            ..Default::default()
        }
    }
}

impl TaskStore for MemoryStore {
    fn load(&self) -> Result<TaskDocument, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unavailable("read refused".into()));
        }
        Ok(self.doc.clone())
    }

    fn save(&mut self, doc: &TaskDocument) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("write refused".into()));
        }
        self.doc = doc.clone();
        self.saves += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
