//! Simple energization example: load a diagram file and print what is live.

use busbar::prelude::*;
use std::path::Path;

fn main() -> Result<(), BusbarError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/base_case.json".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example simple_energize [path/to/diagram.json]");
        std::process::exit(1);
    }

    let result = BusbarCore::energize_file(path, &EngineOptions::default())?;

    println!("Energization for: {}", result.file.display());
    println!(
        "Devices energized: {}/{}",
        result.stats.energized_devices, result.stats.devices
    );
    println!();

    for id in result.energization.energized_devices() {
        println!("  + {}", id);
    }
    println!();
    for (conductor, kind) in result.energization.conductor_kinds() {
        println!("  {} carries {}", conductor, kind);
    }
    for fault in result.energization.skipped_conductors() {
        println!("  skipped: {}", fault);
    }

    Ok(())
}
