//! Bounded ascent along parent-taxon links.

use std::borrow::Cow;
use std::time::Duration;

use alpenflora_core::model::{EntityId, TaxonEntity, TaxonRank};

use crate::error::EnrichResult;
use crate::taxon::TaxonGraph;

/// Walks up the taxonomy until it meets an entity of the target rank.
///
/// At most `max_hops` entities are examined, the starting one included.
/// The walk has no cycle detection of its own; the hop bound is what
/// terminates it.
#[derive(Debug)]
pub struct RankWalker<'a, G: ?Sized> {
    graph: &'a G,
    max_hops: usize,
    hop_pause: Duration,
}

impl<'a, G: TaxonGraph + ?Sized> RankWalker<'a, G> {
    pub fn new(graph: &'a G, max_hops: usize, hop_pause: Duration) -> Self {
        Self {
            graph,
            max_hops,
            hop_pause,
        }
    }

    /// Latin name of the first ancestor-or-self of `start` with rank
    /// `target`.
    ///
    /// `Ok(None)` means unknown: the bound ran out, a node had no parent,
    /// or the matching entity has no name.
    pub async fn walk(&self, start: &EntityId, target: TaxonRank) -> EnrichResult<Option<String>> {
        if self.max_hops == 0 {
            return Ok(None);
        }
        let entity = self.graph.fetch_entity(start).await?;
        self.walk_from(&entity, target).await
    }

    /// Like [`walk`](Self::walk), starting from an entity that is already
    /// fetched. The start counts as the first hop.
    pub async fn walk_from(
        &self,
        start: &TaxonEntity,
        target: TaxonRank,
    ) -> EnrichResult<Option<String>> {
        let mut current = Cow::Borrowed(start);

        for hop in 1..=self.max_hops {
            if current.rank == target {
                return Ok(current.taxon_name.clone());
            }
            if hop == self.max_hops {
                break;
            }
            let Some(parent) = current.parent.clone() else {
                log::debug!("{} has no parent taxon", current.id);
                return Ok(None);
            };
            if !self.hop_pause.is_zero() {
                tokio::time::sleep(self.hop_pause).await;
            }
            current = Cow::Owned(self.graph.fetch_entity(&parent).await?);
        }

        log::debug!(
            "No {:?} within {} hops of {}",
            target,
            self.max_hops,
            start.id
        );
        Ok(None)
    }
}
