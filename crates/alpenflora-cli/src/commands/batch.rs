use anyhow::{Context, Result};
use std::path::PathBuf;

use alpenflora_core::store;
use alpenflora_etl::{resolve_seed_file, Config, TaxonResolver};

pub async fn run_batch(config: &Config, seed: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let seed = seed.unwrap_or_else(|| config.harvest_path());
    let output = output.unwrap_or_else(|| config.batch_output_path());

    let resolver = TaxonResolver::from_config(config).context("Failed to create taxon resolver")?;
    let report = resolve_seed_file(&resolver, &seed, config.http.batch_pause())
        .await
        .with_context(|| format!("Batch from {} failed", seed.display()))?;
    let records = report.successes()?;

    store::write_records(&output, records)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("\n✓ Wrote {} record(s) to {}", records.len(), output.display());
    if report.failure_count() > 0 {
        println!("  {} name(s) failed:", report.failure_count());
        for failure in &report.failures {
            println!("    {}: {}", failure.latin, failure.reason);
        }
    }

    Ok(())
}
