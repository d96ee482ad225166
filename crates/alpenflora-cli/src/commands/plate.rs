use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::ExitCode;

use alpenflora_core::catalog::AssetCatalog;
use alpenflora_etl::{save_plate, Config, ImageDownloader, PlateResolver, SaveOutcome};

use super::taxon::NOT_FOUND;

/// Exit status when at least one plate failed to resolve or save.
const FAILED: u8 = 3;

pub async fn run_plate(
    config: &Config,
    names: &[String],
    assets_dir: Option<PathBuf>,
    force: bool,
) -> Result<ExitCode> {
    let assets_dir = assets_dir.unwrap_or_else(|| config.assets_dir.clone());
    let catalog = AssetCatalog::open(&assets_dir)
        .with_context(|| format!("Cannot use asset catalog {}", assets_dir.display()))?;
    let resolver = PlateResolver::from_config(config).context("Failed to create Commons client")?;
    let downloader = ImageDownloader::from_config(config).context("Failed to create downloader")?;

    let mut missing = 0usize;
    let mut failed = 0usize;

    for name in names {
        let latin = name.trim();
        if latin.is_empty() {
            continue;
        }

        let candidate = match resolver.resolve(latin).await {
            Ok(Some(candidate)) => candidate,
            Ok(None) => {
                println!("✗ {}: no plate found", latin);
                missing += 1;
                continue;
            }
            Err(e) => {
                log::error!("Failed to resolve plate for {:?}: {}", latin, e);
                println!("✗ {}: {}", latin, e);
                failed += 1;
                continue;
            }
        };

        match save_plate(&downloader, &catalog, latin, &candidate, force).await {
            Ok(SaveOutcome::Saved(path)) => println!("✓ {} -> {}", latin, path.display()),
            Ok(SaveOutcome::Skipped(path)) => {
                println!("- {}: {} exists (use --force to replace)", latin, path.display());
            }
            Err(e) => {
                log::error!("Failed to save plate for {:?}: {}", latin, e);
                println!("✗ {}: {}", latin, e);
                failed += 1;
            }
        }
    }

    Ok(ExitCode::from(exit_status(missing, failed)))
}

fn exit_status(missing: usize, failed: usize) -> u8 {
    if failed > 0 {
        FAILED
    } else if missing > 0 {
        NOT_FOUND
    } else {
        0
    }
}
