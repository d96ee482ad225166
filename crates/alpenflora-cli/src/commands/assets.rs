use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use alpenflora_core::catalog::AssetCatalog;
use alpenflora_etl::Config;

/// Import a directory of JPEGs into the asset catalog.
pub fn run_import(config: &Config, images_dir: &Path, assets_dir: Option<PathBuf>) -> Result<()> {
    let assets_dir = assets_dir.unwrap_or_else(|| config.assets_dir.clone());
    let catalog = AssetCatalog::open(&assets_dir)
        .with_context(|| format!("Cannot use asset catalog {}", assets_dir.display()))?;

    let count = catalog.import_images(images_dir)?;
    println!(
        "✓ Imported {} image(s) from {} into {}",
        count,
        images_dir.display(),
        catalog.root().display()
    );
    Ok(())
}
