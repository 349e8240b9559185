//! Catalog enrichment of scraped playlist entries
//!
//! Every entry in a batch gets exactly one resolution: matched, unmatched,
//! skipped, failed or timed out. The batch completes once all of them have
//! resolved, and entries come back in their original order no matter which
//! lookups finish first.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::catalog::{CatalogLookup, CatalogQuery};
use crate::types::PlaylistEntry;

/// How a single entry's enrichment resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A catalog candidate matched; artwork copied onto the disk
    Matched,
    /// The lookup succeeded but no candidate matched
    Unmatched,
    /// Entry lacked song, artist or disk name; no lookup issued
    Skipped,
    /// The lookup returned an error
    Failed,
    /// The lookup did not answer within the per-lookup timeout
    TimedOut,
}

/// Per-batch accounting of resolutions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinReport {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub skipped: usize,
    pub failed: usize,
    pub timed_out: usize,
}

impl JoinReport {
    fn record(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::Matched => self.matched += 1,
            Resolution::Unmatched => self.unmatched += 1,
            Resolution::Skipped => self.skipped += 1,
            Resolution::Failed => self.failed += 1,
            Resolution::TimedOut => self.timed_out += 1,
        }
    }

    /// Number of entries that reached a resolution
    pub fn resolved(&self) -> usize {
        self.matched + self.unmatched + self.skipped + self.failed + self.timed_out
    }
}

/// A fully resolved batch
#[derive(Debug, Clone)]
pub struct EnrichedBatch {
    /// Entries in original document order
    pub entries: Vec<PlaylistEntry>,
    pub report: JoinReport,
}

/// Fans catalog lookups out over a batch and joins the results
#[derive(Clone)]
pub struct EnrichmentJoiner {
    catalog: Arc<dyn CatalogLookup>,
    lookup_timeout: Duration,
    max_in_flight: usize,
}

impl EnrichmentJoiner {
    /// Create a joiner
    ///
    /// # Arguments
    /// * `catalog` - Lookup service queried once per identifiable entry
    /// * `lookup_timeout` - Deadline after which a lookup counts as "no match"
    /// * `max_in_flight` - Upper bound on concurrent lookups (at least 1)
    pub fn new(catalog: Arc<dyn CatalogLookup>, lookup_timeout: Duration, max_in_flight: usize) -> Self {
        Self {
            catalog,
            lookup_timeout,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Enriches every entry and returns the batch once all have resolved
    ///
    /// An empty batch completes immediately with an empty result.
    pub async fn join(&self, entries: Vec<PlaylistEntry>) -> EnrichedBatch {
        let total = entries.len();

        let resolved: Vec<(PlaylistEntry, Resolution)> = stream::iter(entries)
            .map(|entry| self.enrich_one(entry))
            .buffered(self.max_in_flight)
            .collect()
            .await;

        let mut report = JoinReport {
            total,
            ..JoinReport::default()
        };
        let entries = resolved
            .into_iter()
            .map(|(entry, resolution)| {
                report.record(resolution);
                entry
            })
            .collect();

        debug_assert_eq!(report.resolved(), report.total);
        tracing::debug!(
            total = report.total,
            matched = report.matched,
            skipped = report.skipped,
            failed = report.failed,
            timed_out = report.timed_out,
            "enrichment batch complete"
        );

        EnrichedBatch { entries, report }
    }

    /// Resolves a single entry
    async fn enrich_one(&self, mut entry: PlaylistEntry) -> (PlaylistEntry, Resolution) {
        if !entry.is_identifiable() {
            return (entry, Resolution::Skipped);
        }

        let query = CatalogQuery::song_title(&entry.song.name);
        let lookup = tokio::time::timeout(self.lookup_timeout, self.catalog.search(&query)).await;

        let resolution = match lookup {
            Ok(Ok(candidates)) => match candidates.iter().find(|track| track.matches(&entry)) {
                Some(track) => {
                    entry.disk.apply(track);
                    Resolution::Matched
                }
                None => Resolution::Unmatched,
            },
            Ok(Err(e)) => {
                tracing::warn!(song = %entry.song.name, error = %e, "catalog lookup failed");
                Resolution::Failed
            }
            Err(_) => {
                tracing::warn!(
                    song = %entry.song.name,
                    timeout = ?self.lookup_timeout,
                    "catalog lookup timed out"
                );
                Resolution::TimedOut
            }
        };

        (entry, resolution)
    }
}
