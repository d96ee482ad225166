//! Moving resolved plates to disk.
//!
//! Single plates go into the asset catalog next to a `Contents.json`
//! carrying their attribution; harvested lists are downloaded into a flat
//! directory under sanitized names.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use alpenflora_core::catalog::AssetCatalog;
use alpenflora_core::model::{title_basename, url_file_extension, MediaCandidate, PlateEntry};
use backon::Retryable;
use regex::Regex;
use reqwest::Client;

use crate::config::Config;
use crate::error::{EnrichError, EnrichResult};
use crate::http;
use crate::plate::attribution::attribution;
use crate::plate::extract::is_auxiliary_title;
use crate::plate::MediaRepository;
use crate::resilience::download_backoff;

const SOURCE: &str = "image download";

#[allow(clippy::expect_used)]
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));

/// Downloads image bytes, retrying transient failures with exponential
/// backoff.
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    http: Client,
    attempts: usize,
}

impl ImageDownloader {
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &Config) -> EnrichResult<Self> {
        Ok(Self {
            http: http::build_client(&config.user_agent, config.http.download_timeout())?,
            attempts: config.http.download_attempts.max(1),
        })
    }

    async fn fetch_once(&self, url: &str) -> EnrichResult<Vec<u8>> {
        let response = self.http.get(url).send().await?;
        let response = http::ensure_success(response, SOURCE)?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Fetch `url` into memory.
    pub async fn fetch(&self, url: &str) -> EnrichResult<Vec<u8>> {
        (|| async { self.fetch_once(url).await })
            .retry(download_backoff(self.attempts))
            .when(EnrichError::is_transient)
            .notify(|err, delay| {
                log::warn!("Download of {} failed ({}), retrying in {:?}", url, err, delay);
            })
            .await
    }

    /// Fetch `url` and write it to `target`, creating parent directories.
    pub async fn download_to(&self, url: &str, target: &Path) -> EnrichResult<()> {
        let bytes = self.fetch(url).await?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(target, bytes).await?;
        log::debug!("Wrote {} ({})", target.display(), url);
        Ok(())
    }
}

/// What happened to one plate destined for the asset catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    /// The image already existed and `force` was not set.
    Skipped(PathBuf),
}

/// Store `candidate` as `<latin>.imageset/<latin><ext>` and write its
/// `Contents.json` with the attribution as author.
pub async fn save_plate(
    downloader: &ImageDownloader,
    catalog: &AssetCatalog,
    latin: &str,
    candidate: &MediaCandidate,
    force: bool,
) -> EnrichResult<SaveOutcome> {
    let url = candidate
        .url
        .as_deref()
        .ok_or_else(|| EnrichError::MissingDownloadUrl {
            title: candidate.title.clone(),
        })?;
    let filename = format!("{latin}{}", url_file_extension(url));
    let imageset = catalog.ensure_imageset(latin)?;
    let target = imageset.join(&filename);

    if target.exists() && !force {
        return Ok(SaveOutcome::Skipped(target));
    }

    downloader.download_to(url, &target).await?;
    catalog.write_contents(&imageset, &filename, &attribution(&candidate.rights), None)?;
    Ok(SaveOutcome::Saved(target))
}

/// Tally of a harvest download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub saved: usize,
    /// Targets that already existed.
    pub skipped: usize,
    /// Entries without image info or download URL.
    pub missing: usize,
    pub failed: usize,
}

/// Download every non-auxiliary plate in `entries` into `output_dir`.
///
/// Files are named after the Latin name (or the title's basename). With
/// `skip_existing` an existing target is left alone; otherwise a free
/// `_2`, `_3`, ... name is picked. Individual failures are logged and
/// counted.
pub async fn download_plates<R>(
    downloader: &ImageDownloader,
    repository: &R,
    entries: &[PlateEntry],
    output_dir: &Path,
    skip_existing: bool,
) -> EnrichResult<DownloadReport>
where
    R: MediaRepository + ?Sized,
{
    let mut report = DownloadReport::default();
    let titles: Vec<String> = entries
        .iter()
        .filter(|entry| !entry.title.is_empty())
        .map(|entry| entry.title.clone())
        .collect();
    if titles.is_empty() {
        log::warn!("No file titles to download");
        return Ok(report);
    }

    let metadata = repository.image_infos(&titles).await?;

    for entry in entries {
        let title = entry.title.as_str();
        if title.is_empty() || is_auxiliary_title(title) {
            continue;
        }
        let Some(candidate) = metadata.get(title) else {
            log::warn!("No image info for {:?}", title);
            report.missing += 1;
            continue;
        };
        let Some(url) = candidate.url.as_deref() else {
            log::warn!("Missing URL for {:?}", title);
            report.missing += 1;
            continue;
        };

        let name = entry
            .latin_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| title_basename(title));
        let target = output_dir.join(format!("{}{}", sanitize_name(name), url_file_extension(url)));

        if skip_existing && target.exists() {
            report.skipped += 1;
            continue;
        }
        let target = unique_path(&target);

        match downloader.download_to(url, &target).await {
            Ok(()) => {
                log::info!("Saved {} -> {}", title, target.display());
                report.saved += 1;
            }
            Err(e) => {
                log::warn!("Error downloading {:?}: {}", title, e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// File-system friendly name: underscores become spaces, characters other
/// than word characters, whitespace and `-` are dropped, whitespace is
/// collapsed. Falls back to `image`.
pub fn sanitize_name(name: &str) -> String {
    let spaced = name.trim().replace('_', " ");
    let kept = DISALLOWED.replace_all(&spaced, "");
    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        "image".to_string()
    } else {
        collapsed
    }
}

/// `path` if it is free, else the first free `<stem>_<n><ext>` for n >= 2.
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (2..)
        .map(|idx| path.with_file_name(format!("{stem}_{idx}{ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plate::fakes::FakeRepository;
    use alpenflora_core::model::RightsMetadata;
    use mockito::Server;
    use tempfile::TempDir;

    fn downloader() -> ImageDownloader {
        let mut config = Config::default();
        config.http.download_attempts = 2;
        ImageDownloader::from_config(&config).unwrap()
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Gentiana verna"), "Gentiana verna");
        assert_eq!(sanitize_name(" Gentiana_verna (L.) "), "Gentiana verna L");
        assert_eq!(sanitize_name("Atlas - Frühlings-Enzian"), "Atlas - Frühlings-Enzian");
        assert_eq!(sanitize_name("?!"), "image");
    }

    #[test]
    fn test_unique_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Gentiana verna.jpg");
        assert_eq!(unique_path(&path), path);

        std::fs::write(&path, b"x").unwrap();
        std::fs::write(dir.path().join("Gentiana verna_2.jpg"), b"x").unwrap();
        assert_eq!(unique_path(&path), dir.path().join("Gentiana verna_3.jpg"));
    }

    #[tokio::test]
    async fn test_fetch_retries_transient_failures() {
        let mut server = Server::new_async().await;
        let failing = server
            .mock("GET", "/plate.jpg")
            .with_status(503)
            .expect(2)
            .create_async()
            .await;

        let err = downloader()
            .fetch(&format!("{}/plate.jpg", server.url()))
            .await
            .unwrap_err();

        failing.assert_async().await;
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_save_plate_writes_imageset() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/a/ab/Gentiana_verna.jpeg")
            .with_status(200)
            .with_body(b"JPEGDATA")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let catalog = AssetCatalog::open(dir.path()).unwrap();
        let candidate = MediaCandidate::new("File:Atlas der Alpenflora Gentiana verna.jpg")
            .with_url(format!("{}/a/ab/Gentiana_verna.jpeg", server.url()))
            .with_rights(
                RightsMetadata::new()
                    .with("Artist", "<a>Anton Hartinger</a>")
                    .with("LicenseShortName", "Public domain"),
            );

        let outcome = save_plate(&downloader(), &catalog, "Gentiana verna", &candidate, false)
            .await
            .unwrap();

        let image = dir.path().join("Gentiana verna.imageset/Gentiana verna.jpeg");
        assert_eq!(outcome, SaveOutcome::Saved(image.clone()));
        assert_eq!(std::fs::read(&image).unwrap(), b"JPEGDATA");

        let contents: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("Gentiana verna.imageset/Contents.json"))
                .unwrap(),
        )
        .unwrap();
        assert_eq!(contents["images"][0]["filename"], "Gentiana verna.jpeg");
        assert_eq!(contents["info"]["author"], "Anton Hartinger | Public domain");

        let again = save_plate(&downloader(), &catalog, "Gentiana verna", &candidate, false)
            .await
            .unwrap();
        assert_eq!(again, SaveOutcome::Skipped(image));
    }

    #[tokio::test]
    async fn test_save_plate_without_url_fails() {
        let dir = TempDir::new().unwrap();
        let catalog = AssetCatalog::open(dir.path()).unwrap();
        let candidate = MediaCandidate::new("File:X.jpg");
        let err = save_plate(&downloader(), &catalog, "X", &candidate, true)
            .await
            .unwrap_err();
        assert!(matches!(err, EnrichError::MissingDownloadUrl { .. }));
    }

    #[tokio::test]
    async fn test_download_plates() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/v.jpg")
            .with_status(200)
            .with_body(b"V")
            .create_async()
            .await;

        let repo = FakeRepository::default()
            .with_file(
                MediaCandidate::new("File:Hartinger - Gentiana_verna.jpg")
                    .with_url(format!("{}/v.jpg", server.url())),
            )
            .with_file(MediaCandidate::new("File:Hartinger - No_url.jpg"));
        let entries = vec![
            PlateEntry::new(
                "File:Hartinger - Gentiana_verna.jpg",
                Some("Gentiana verna".to_string()),
                "Volume 1",
            ),
            PlateEntry::new("File:Plate 3.jpg", None, "Volume 1"),
            PlateEntry::new("File:Hartinger - No_url.jpg", None, "Volume 1"),
            PlateEntry::new("File:Hartinger - Unknown.jpg", None, "Volume 1"),
        ];

        let dir = TempDir::new().unwrap();
        let report = download_plates(&downloader(), &repo, &entries, dir.path(), false)
            .await
            .unwrap();
        assert_eq!(
            report,
            DownloadReport {
                saved: 1,
                skipped: 0,
                missing: 2,
                failed: 0
            }
        );
        assert!(dir.path().join("Gentiana verna.jpg").exists());

        let again = download_plates(&downloader(), &repo, &entries, dir.path(), true)
            .await
            .unwrap();
        assert_eq!(again.skipped, 1);
        assert_eq!(again.saved, 0);

        let third = download_plates(&downloader(), &repo, &entries, dir.path(), false)
            .await
            .unwrap();
        assert_eq!(third.saved, 1);
        assert!(dir.path().join("Gentiana verna_2.jpg").exists());
    }
}
