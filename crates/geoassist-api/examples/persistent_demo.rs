//! Demonstrates rebuilding a spatial index from its write-ahead log.
//!
//! Run with: cargo run -p geoassist --example persistent_demo

use geoassist::{DurableIndex, IndexObject, Result, SpatialIndex, WalConfig};
use std::collections::BTreeMap;
use std::path::Path;

/// Toy index keyed by id; a real application would use a k-d tree.
#[derive(Default)]
struct Landmarks(BTreeMap<u32, IndexObject<u32, String>>);

impl SpatialIndex<u32, String> for Landmarks {
    fn insert(&mut self, object: IndexObject<u32, String>) -> Result<()> {
        self.0.insert(*object.id(), object);
        Ok(())
    }

    fn delete(&mut self, id: u32) -> Result<()> {
        self.0.remove(&id);
        Ok(())
    }

    fn update(&mut self, id: u32, data: String) -> Result<()> {
        if let Some(object) = self.0.get_mut(&id) {
            object.set_data(data);
        }
        Ok(())
    }
}

fn landmark(
    id: u32,
    name: &str,
    latitude: f64,
    longitude: f64,
) -> Result<IndexObject<u32, String>> {
    IndexObject::builder()
        .id(id)
        .data(name.to_string())
        .latitude(latitude)
        .longitude(longitude)
        .build()
}

fn print(index: &Landmarks) {
    for object in index.0.values() {
        println!(
            "   {:>2}: {} ({:.4}, {:.4})",
            object.id(),
            object.data(),
            object.point().latitude(),
            object.point().longitude()
        );
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let wal_dir = "./demo_wal";

    println!("=== GeoAssist Persistent Index Demo ===\n");

    if Path::new(wal_dir).exists() {
        std::fs::remove_dir_all(wal_dir)?;
        println!("Cleaned up previous demo logs\n");
    }

    println!("PART 1: Building the index...");
    {
        let mut index = DurableIndex::open(Landmarks::default(), WalConfig::new(wal_dir))?;

        index.insert(landmark(1, "Faisal Mosque", 33.7295, 73.0372)?)?;
        index.insert(landmark(2, "Minar-e-Pakistan", 31.5925, 74.3095)?)?;
        index.insert(landmark(3, "Mazar-e-Quaid", 24.8750, 67.0400)?)?;
        index.update(2, "Minar-e-Pakistan (Iqbal Park)".to_string())?;
        index.delete(3)?;

        println!("   Log file: {}", index.wal().log_file().display());
        print(index.index());
    }
    println!("   Process \"crashed\"\n");

    println!("PART 2: Recovering from the log...");
    {
        let index = DurableIndex::open(Landmarks::default(), WalConfig::new(wal_dir))?;

        for stats in index.recovery_stats() {
            println!(
                "   Replayed {} records ({} inserts, {} updates, {} deletes) from {}",
                stats.records_applied,
                stats.inserts,
                stats.updates,
                stats.deletes,
                stats.path.display()
            );
        }
        print(index.index());
    }

    std::fs::remove_dir_all(wal_dir)?;
    println!("\n=== Demo Complete ===");

    Ok(())
}
