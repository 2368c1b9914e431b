// WAL segment discovery
//
// A segment is one log file written by one manager instance, named
// {identifier}{suffix}. Identifiers are fixed-width and monotonic, so
// sorting file names as strings sorts segments by creation time. Anything
// in the directory without the suffix is ignored. Segments are only ever
// listed here, never removed.

use geoassist_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Lists the WAL segment files in a log directory
#[derive(Debug, Clone)]
pub struct SegmentManager {
    log_dir: PathBuf,
    suffix: String,
}

/// Information about a WAL segment file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentInfo {
    /// Path to the segment file
    pub path: PathBuf,
    /// File name, including the suffix
    pub name: String,
    /// File size in bytes
    pub size: u64,
}

impl SegmentManager {
    /// Create a segment manager for files ending in `suffix` under `log_dir`
    pub fn new(log_dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            log_dir: log_dir.into(),
            suffix: suffix.into(),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// File name suffix that marks a segment
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// List all segment files, oldest first
    ///
    /// A missing directory has no segments.
    pub fn list_segments(&self) -> Result<Vec<SegmentInfo>> {
        if !self.log_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut segments: Vec<SegmentInfo> = fs::read_dir(&self.log_dir)
            .map_err(|e| Error::io(&self.log_dir, e))?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| self.parse_segment_info(&entry.path()))
            .collect();

        segments.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(segments)
    }

    fn parse_segment_info(&self, path: &Path) -> Option<SegmentInfo> {
        let name = path.file_name()?.to_str()?;
        if !name.ends_with(&self.suffix) {
            return None;
        }

        let metadata = fs::metadata(path).ok()?;
        if !metadata.is_file() {
            return None;
        }

        Some(SegmentInfo {
            path: path.to_path_buf(),
            name: name.to_string(),
            size: metadata.len(),
        })
    }

    /// The segment with the lexicographically greatest name
    pub fn latest_segment(&self) -> Result<Option<SegmentInfo>> {
        Ok(self.list_segments()?.pop())
    }

    /// The segment with the lexicographically smallest name
    pub fn oldest_segment(&self) -> Result<Option<SegmentInfo>> {
        Ok(self.list_segments()?.into_iter().next())
    }

    pub fn segment_count(&self) -> Result<usize> {
        Ok(self.list_segments()?.len())
    }

    /// Total size of all segments in bytes
    pub fn total_size(&self) -> Result<u64> {
        Ok(self.list_segments()?.iter().map(|s| s.size).sum())
    }

    /// Check if the log directory exists and is a directory
    pub fn is_available(&self) -> bool {
        self.log_dir.is_dir()
    }
}
