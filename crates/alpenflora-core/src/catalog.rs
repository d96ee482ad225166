//! Asset catalog layout.
//!
//! An asset catalog is a directory of `<name>.imageset` folders, each
//! holding one image and a `Contents.json` describing it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{Error, Result};

const CONTENTS_FILE: &str = "Contents.json";

#[derive(Debug, Serialize)]
struct Contents<'a> {
    images: [ImageEntry<'a>; 1],
    info: Info<'a>,
}

#[derive(Debug, Serialize)]
struct ImageEntry<'a> {
    filename: &'a str,
    idiom: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    scale: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct Info<'a> {
    author: &'a str,
    version: u32,
}

/// A handle on an existing asset catalog directory.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    root: PathBuf,
}

impl AssetCatalog {
    /// Open the catalog at `root`, which must already exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::NotFound {
                entity: "asset catalog",
                path: root,
            });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the imageset for `name`, without creating it.
    pub fn imageset_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.imageset"))
    }

    /// Create (if needed) and return the imageset directory for `name`.
    pub fn ensure_imageset(&self, name: &str) -> Result<PathBuf> {
        let dir = self.imageset_path(name);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Write the `Contents.json` of an imageset holding a single
    /// universal image.
    pub fn write_contents(
        &self,
        imageset_dir: &Path,
        filename: &str,
        author: &str,
        scale: Option<&'static str>,
    ) -> Result<()> {
        let contents = Contents {
            images: [ImageEntry {
                filename,
                idiom: "universal",
                scale,
            }],
            info: Info { author, version: 1 },
        };
        let mut text = serde_json::to_string_pretty(&contents)?;
        text.push('\n');
        fs::write(imageset_dir.join(CONTENTS_FILE), text)?;
        Ok(())
    }

    /// Turn every JPEG in `images_dir` into its own imageset.
    ///
    /// Existing image files in a target imageset are replaced. Files whose
    /// names are not UTF-8 are skipped. Returns the number of images
    /// imported.
    pub fn import_images(&self, images_dir: &Path) -> Result<usize> {
        if !images_dir.is_dir() {
            return Err(Error::NotFound {
                entity: "images directory",
                path: images_dir.to_path_buf(),
            });
        }

        let mut images: Vec<PathBuf> = WalkDir::new(images_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file() && is_jpeg(path))
            .collect();
        images.sort();

        let mut imported = 0;
        for image in &images {
            let (Some(stem), Some(filename)) = (
                image.file_stem().and_then(|s| s.to_str()),
                image.file_name().and_then(|s| s.to_str()),
            ) else {
                log::warn!("Skipping non UTF-8 file name: {}", image.display());
                continue;
            };

            let dir = self.ensure_imageset(stem)?;
            for existing in fs::read_dir(&dir)? {
                let existing = existing?.path();
                if existing.is_file()
                    && existing.file_name().and_then(|s| s.to_str()) != Some(CONTENTS_FILE)
                {
                    fs::remove_file(&existing)?;
                }
            }
            fs::copy(image, dir.join(filename))?;
            self.write_contents(&dir, filename, "xcode", Some("1x"))?;
            log::debug!("Imported {} into {}", filename, dir.display());
            imported += 1;
        }

        Ok(imported)
    }
}

fn is_jpeg(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        matches!(
            ext.to_string_lossy().to_lowercase().as_ref(),
            "jpg" | "jpeg"
        )
    })
}
