//! DHAV Carver command line entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, File};
use std::io::BufWriter;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dhav_carver::carve::Carver;
use dhav_carver::config::{Cli, Config};
use dhav_carver::input::MappedInput;
use dhav_carver::output::{Exporter, MetadataSink};

fn main() -> Result<()> {
    let config = Config::from_cli(Cli::parse())?;

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_ascii_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("===========================================");
    info!("   DHAV Carver v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!("Configuration:");
    info!("  Input: {}", config.input.display());
    info!("  Output: {}", config.output_dir.display());
    info!("  Skip offset: {}", config.skip_offset);
    if let Some(start) = config.window.start {
        info!("  Start: {}", start);
    }
    if let Some(stop) = config.window.stop {
        info!("  Stop: {}", stop);
    }
    info!("  CSV: {}", config.emit_csv);
    info!("  Dry run: {}", config.dry_run);

    let input = MappedInput::open(&config.input, config.skip_offset)?;
    if input.base_offset() != config.skip_offset {
        info!(
            "Skip offset {} rounded down to {} for mapping",
            config.skip_offset,
            input.base_offset()
        );
    }
    info!(
        "Scanning {} bytes from offset {} of {}",
        input.region().len(),
        input.base_offset(),
        input.file_len()
    );

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory {}", config.output_dir.display()))?;

    let metadata: Option<MetadataSink<BufWriter<File>>> = if config.emit_csv {
        Some(MetadataSink::create(&config.output_dir, config.window)?)
    } else {
        None
    };

    let exporter = Exporter::new(&config.output_dir, config.window, config.dry_run)?;
    let output = Carver::new(input.region(), input.base_offset(), exporter, metadata)
        .with_progress_interval(config.progress_interval)
        .run()?;

    if let Some((_, selection)) = &output.tables {
        info!(
            "Frame tables written ({} selection table)",
            if selection.is_some() { "with" } else { "without" }
        );
    }
    info!("[Carver] {}", output.stats.summary());
    info!("Done.");

    Ok(())
}
