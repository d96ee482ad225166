//! Sequential resolution of many Latin names.

use std::path::Path;
use std::time::Duration;

use alpenflora_core::model::FlowerRecord;
use alpenflora_core::store;

use crate::error::{EnrichError, EnrichResult};
use crate::taxon::resolver::TaxonResolver;
use crate::taxon::{SummarySource, TaxonGraph};

/// A name that could not be resolved, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub latin: String,
    pub reason: String,
}

/// Outcome of a batch run, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<FlowerRecord>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// The resolved records, or [`EnrichError::EmptyBatch`] when nothing
    /// resolved.
    pub fn successes(&self) -> EnrichResult<&[FlowerRecord]> {
        if self.records.is_empty() {
            return Err(EnrichError::EmptyBatch {
                attempted: self.failures.len(),
            });
        }
        Ok(&self.records)
    }
}

/// Load the seed at `seed` and resolve every name in it.
///
/// The seed must be a JSON array with at least one usable `latin_name`;
/// otherwise this fails before any remote call.
pub async fn resolve_seed_file<G, S>(
    resolver: &TaxonResolver<G, S>,
    seed: &Path,
    pause: Duration,
) -> EnrichResult<BatchReport>
where
    G: TaxonGraph,
    S: SummarySource,
{
    let entries = store::read_json_array(seed)?;
    let names = store::seed_names(&entries, &seed.display().to_string())?;
    log::info!("Resolving {} name(s) from {}", names.len(), seed.display());
    Ok(resolve_batch(resolver, &names, pause).await)
}

/// Resolve every name in turn, pausing `pause` between names.
///
/// Neither a missing taxon nor a remote error stops the run; both are
/// logged and recorded as failures.
pub async fn resolve_batch<G, S>(
    resolver: &TaxonResolver<G, S>,
    names: &[String],
    pause: Duration,
) -> BatchReport
where
    G: TaxonGraph,
    S: SummarySource,
{
    let mut report = BatchReport::default();
    let total = names.len();

    for (idx, latin) in names.iter().enumerate() {
        if idx > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        log::info!("[{}/{}] {}", idx + 1, total, latin);

        let reason = match resolver.resolve(latin).await {
            Ok(Some(record)) => {
                report.records.push(record);
                continue;
            }
            Ok(None) => "no taxon found".to_string(),
            Err(e) => e.to_string(),
        };
        log::warn!("Skipping {}: {}", latin, reason);
        report.failures.push(BatchFailure {
            latin: latin.clone(),
            reason,
        });
    }

    log::info!(
        "Resolved {} of {} name(s), {} failed",
        report.records.len(),
        total,
        report.failure_count()
    );
    report
}
