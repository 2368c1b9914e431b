use geoassist::logging::{LogConfig, LogFormat, WAL_TARGET};
use geoassist::{IndexObject, Point, WalConfig, WalManager};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Replay summaries at info, plus one event per appended record
    let _guard = LogConfig::info()
        .with_target(WAL_TARGET, "debug")
        .with_format(LogFormat::Compact)
        .init()?;

    println!("=== GeoAssist Logging Demo ===\n");

    let dir = std::env::temp_dir().join("geoassist_logging_demo");
    let wal: WalManager<u64, String> = WalManager::new(WalConfig::new(&dir))?;

    println!("\n1. Appending records...");
    wal.log_insert(IndexObject::new(
        1,
        "Clifton Beach".to_string(),
        Point::new(24.7925, 67.0300),
    ))?;
    wal.log_update(1, "Sea View".to_string())?;
    wal.log_delete(1)?;

    println!("\n2. Reading the log back...");
    let mut seen = Vec::new();
    for record in geoassist::LogReader::<u64, String>::open(wal.log_file())? {
        seen.push(record?.to_string());
    }
    println!("Records: {:?}", seen);

    std::fs::remove_dir_all(&dir)?;

    println!("\n=== Demo Complete ===");
    Ok(())
}
