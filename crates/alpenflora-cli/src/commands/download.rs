use anyhow::{Context, Result};
use std::io;
use std::path::Path;

use alpenflora_core::store;
use alpenflora_etl::{download_plates, CommonsClient, Config, ImageDownloader};

pub async fn run_download(
    config: &Config,
    source: Option<String>,
    output_dir: &Path,
    skip_existing: bool,
) -> Result<()> {
    let values = match source.as_deref() {
        Some("-") => store::read_json_array_from(io::stdin().lock(), "<stdin>")?,
        Some(path) => store::read_json_array(Path::new(path))?,
        None => store::read_json_array(&config.harvest_path())?,
    };
    let entries = store::plate_entries(&values);
    log::info!("{} plate(s) listed", entries.len());

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let client = CommonsClient::from_config(config).context("Failed to create Commons client")?;
    let downloader = ImageDownloader::from_config(config).context("Failed to create downloader")?;
    let report = download_plates(&downloader, &client, &entries, output_dir, skip_existing)
        .await
        .context("Failed to download plates")?;

    println!("✓ Saved {} image(s) to {}", report.saved, output_dir.display());
    if report.skipped > 0 {
        println!("  {} already present", report.skipped);
    }
    if report.missing > 0 {
        println!("  {} without image info", report.missing);
    }
    if report.failed > 0 {
        println!("  {} failed", report.failed);
    }

    Ok(())
}
