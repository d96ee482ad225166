use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::ExitCode;

use alpenflora_core::store;
use alpenflora_etl::{Config, TaxonResolver};

/// Exit status when nothing matches the requested name.
pub const NOT_FOUND: u8 = 2;

pub async fn run_taxon(config: &Config, latin: &str, output: Option<PathBuf>) -> Result<ExitCode> {
    let latin = latin.trim();
    anyhow::ensure!(!latin.is_empty(), "Latin name must not be empty");

    let resolver = TaxonResolver::from_config(config).context("Failed to create taxon resolver")?;
    let Some(record) = resolver
        .resolve(latin)
        .await
        .with_context(|| format!("Failed to resolve {latin}"))?
    else {
        eprintln!("No taxon found for '{}'", latin);
        return Ok(ExitCode::from(NOT_FOUND));
    };

    let output = output.unwrap_or_else(|| config.records_path());
    let count = store::append_record(&output, &record)
        .with_context(|| format!("Failed to append to {}", output.display()))?;
    log::info!("{} now holds {} record(s)", output.display(), count);

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(ExitCode::SUCCESS)
}
