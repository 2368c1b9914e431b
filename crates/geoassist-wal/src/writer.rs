// WAL writer module - appends encoded records to one log file
//
// Every append is a self-contained open/write/close. Nothing is buffered
// between calls, so once `append_line` returns Ok the whole line has been
// handed to the operating system. The file (and its directory) only come
// into existence on the first append.

use geoassist_core::{Error, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Appends lines to a single log file
#[derive(Debug, Clone)]
pub struct LogWriter {
    path: PathBuf,
}

impl LogWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the log file this writer appends to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line, adding the line terminator
    pub fn append_line(&self, line: &str) -> Result<()> {
        self.ensure_directory_exists()?;

        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io(&self.path, e))?;

        // Single write so the line and its terminator land together
        file.write_all(buf.as_bytes())
            .map_err(|e| Error::io(&self.path, e))?;
        file.flush().map_err(|e| Error::io(&self.path, e))?;

        debug!(path = %self.path.display(), bytes = buf.len(), "appended WAL record");
        Ok(())
    }

    fn ensure_directory_exists(&self) -> Result<()> {
        let Some(dir) = self.path.parent() else {
            return Ok(());
        };
        if dir.as_os_str().is_empty() || dir.exists() {
            return Ok(());
        }

        std::fs::create_dir_all(dir).map_err(|e| Error::CreateDirectory {
            path: dir.to_path_buf(),
            source: e,
        })?;
        debug!(dir = %dir.display(), "created WAL directory");
        Ok(())
    }
}
