use anyhow::{Context, Result};
use std::path::PathBuf;

use alpenflora_core::store;
use alpenflora_etl::{harvest_plates, CommonsClient, Config};

pub async fn run_harvest(config: &Config, categories: Vec<String>, output: Option<PathBuf>) -> Result<()> {
    let categories = if categories.is_empty() {
        config.plates.categories.clone()
    } else {
        categories
    };
    let output = output.unwrap_or_else(|| config.harvest_path());

    let client = CommonsClient::from_config(config).context("Failed to create Commons client")?;
    let entries = harvest_plates(&client, &categories)
        .await
        .context("Failed to harvest plates")?;

    store::write_plates(&output, &entries)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let unnamed = entries.iter().filter(|e| e.latin_name.is_none()).count();
    println!("✓ Saved {} plate(s) to {}", entries.len(), output.display());
    if unnamed > 0 {
        println!("  {} without a Latin name", unnamed);
    }

    Ok(())
}
