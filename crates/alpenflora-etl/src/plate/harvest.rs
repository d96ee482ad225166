//! Category scan that lists every plate with its inferred Latin name.

use std::collections::HashSet;

use alpenflora_core::model::PlateEntry;

use crate::error::EnrichResult;
use crate::plate::extract::{choose_latin_name, is_auxiliary_title};
use crate::plate::MediaRepository;

/// Scan `categories` in order and return one entry per distinct plate.
///
/// Auxiliary (digit-bearing) titles are dropped before their metadata is
/// requested. A title listed in several categories is attributed to the
/// first one.
pub async fn harvest_plates<R>(repository: &R, categories: &[String]) -> EnrichResult<Vec<PlateEntry>>
where
    R: MediaRepository + ?Sized,
{
    let mut entries = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for category in categories {
        let files = repository.category_files(category).await?;
        if files.is_empty() {
            log::warn!("No files in category {:?}", category);
            continue;
        }

        let plates: Vec<String> = files
            .into_iter()
            .filter(|title| !is_auxiliary_title(title))
            .collect();
        let metadata = repository.image_infos(&plates).await?;

        let before = entries.len();
        for title in plates {
            if seen.contains(&title) {
                continue;
            }
            let rights = metadata.get(&title).map(|candidate| &candidate.rights);
            let latin_name = choose_latin_name(&title, rights);
            if latin_name.is_none() {
                log::warn!("No Latin name for {:?}", title);
            }
            entries.push(PlateEntry::new(title.as_str(), latin_name, category.as_str()));
            seen.insert(title);
        }
        log::info!(
            "{}: {} plate(s)",
            category,
            entries.len() - before
        );
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plate::fakes::FakeRepository;
    use alpenflora_core::model::{MediaCandidate, RightsMetadata};

    #[tokio::test]
    async fn test_harvest_across_categories() {
        let repo = FakeRepository::default()
            .with_category(
                "Volume 1",
                &[
                    "File:Hartinger - Atlas - Gentiana_verna.jpg",
                    "File:Atlas der Alpenflora Tafel 1.jpg",
                    "File:Hartinger - Atlas - Primula.jpg",
                ],
            )
            .with_category("Volume 2", &[])
            .with_category(
                "Volume 3",
                &[
                    "File:Hartinger - Atlas - Gentiana_verna.jpg",
                    "File:Hartinger - Atlas - Arnica_montana.jpg",
                ],
            )
            .with_file(
                MediaCandidate::new("File:Hartinger - Atlas - Primula.jpg").with_rights(
                    RightsMetadata::new().with("ObjectName", "<i>Primula auricula</i>"),
                ),
            );

        let categories: Vec<String> = ["Volume 1", "Volume 2", "Volume 3"]
            .iter()
            .map(|c| (*c).to_string())
            .collect();
        let entries = harvest_plates(&repo, &categories).await.unwrap();

        assert_eq!(
            entries,
            vec![
                PlateEntry::new(
                    "File:Hartinger - Atlas - Gentiana_verna.jpg",
                    Some("Gentiana verna".to_string()),
                    "Volume 1"
                ),
                PlateEntry::new(
                    "File:Hartinger - Atlas - Primula.jpg",
                    Some("Primula".to_string()),
                    "Volume 1"
                ),
                PlateEntry::new(
                    "File:Hartinger - Atlas - Arnica_montana.jpg",
                    Some("Arnica montana".to_string()),
                    "Volume 3"
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_harvest_unknown_category_is_empty() {
        let repo = FakeRepository::default();
        let entries = harvest_plates(&repo, &["Nowhere".to_string()]).await.unwrap();
        assert!(entries.is_empty());
    }
}
