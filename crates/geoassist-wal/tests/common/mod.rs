// Common test utilities for WAL integration tests

use geoassist_core::{IndexObject, Point, Result, SpatialIndex};
use geoassist_wal::{
    IdGenerator, SegmentManager, SequentialIdGenerator, WalConfig, WalManager, DEFAULT_FILE_SUFFIX,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Test fixture that creates a temporary WAL directory
pub struct WalTestFixture {
    #[allow(dead_code)]
    pub temp_dir: TempDir,
    pub wal_path: PathBuf,
}

impl WalTestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let wal_path = temp_dir.path().join("wal");
        fs::create_dir_all(&wal_path).expect("Failed to create WAL directory");

        Self { temp_dir, wal_path }
    }

    pub fn wal_dir(&self) -> &PathBuf {
        &self.wal_path
    }

    pub fn config(&self) -> WalConfig {
        WalConfig::new(self.wal_path.clone())
    }

    /// Manager with a time-ordered file name
    #[allow(dead_code)]
    pub fn manager(&self) -> WalManager<String, String> {
        WalManager::new(self.config()).expect("Failed to create WAL manager")
    }

    /// Manager whose file name and record ids come from `ids`
    #[allow(dead_code)]
    pub fn manager_with(&self, ids: Arc<dyn IdGenerator>) -> WalManager<String, String> {
        WalManager::with_id_generator(self.config(), ids).expect("Failed to create WAL manager")
    }

    /// Shared counter producing 00000001, 00000002, ...
    #[allow(dead_code)]
    pub fn sequential_ids() -> Arc<dyn IdGenerator> {
        Arc::new(SequentialIdGenerator::new())
    }

    /// Counter continuing after whatever is already in the WAL directory
    #[allow(dead_code)]
    pub fn resumed_ids(&self) -> Arc<dyn IdGenerator> {
        let segments = SegmentManager::new(&self.wal_path, DEFAULT_FILE_SUFFIX);
        Arc::new(SequentialIdGenerator::resume(&segments).expect("Failed to resume ids"))
    }

    #[allow(dead_code)]
    pub fn list_segments(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.wal_path)
            .expect("Failed to read WAL directory")
            .filter_map(|entry| {
                entry
                    .ok()
                    .and_then(|e| e.file_name().to_str().map(String::from))
            })
            .collect();
        names.sort();
        names
    }

    #[allow(dead_code)]
    pub fn write_raw(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.wal_path.join(name);
        fs::write(&path, contents).expect("Failed to write raw log");
        path
    }
}

impl Default for WalTestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// One call observed by [`RecordingIndex`]
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum Call {
    Insert(IndexObject<String, String>),
    Delete(String),
    Update(String, String),
}

/// Spatial index that only records the calls made to it
#[derive(Debug, Default)]
pub struct RecordingIndex {
    pub calls: Vec<Call>,
}

impl SpatialIndex<String, String> for RecordingIndex {
    fn insert(&mut self, object: IndexObject<String, String>) -> Result<()> {
        self.calls.push(Call::Insert(object));
        Ok(())
    }

    fn delete(&mut self, id: String) -> Result<()> {
        self.calls.push(Call::Delete(id));
        Ok(())
    }

    fn update(&mut self, id: String, data: String) -> Result<()> {
        self.calls.push(Call::Update(id, data));
        Ok(())
    }
}

#[allow(dead_code)]
pub fn object(id: &str, data: &str, latitude: f64, longitude: f64) -> IndexObject<String, String> {
    IndexObject::new(id.to_string(), data.to_string(), Point::new(latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_wal_dir() {
        let fixture = WalTestFixture::new();
        assert!(fixture.wal_dir().exists());
        assert!(fixture.wal_dir().is_dir());
    }
}
