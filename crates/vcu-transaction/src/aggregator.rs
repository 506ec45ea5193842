//! Catalog aggregator (spec.md §4.3), resolving the §9 Open Question via
//! the `X-Fragment-Total` header (SPEC_FULL.md §4.1/§4.3).

use std::collections::HashMap;

use parking_lot::Mutex;

/// Per-subject fragment-collection progress. Held by the client; the slot
/// stays occupied across fragments of the same catalog reply until
/// [`CatalogAggregator::record_fragment`] reports the reply is complete.
#[derive(Debug, Default)]
pub struct CatalogAggregator {
    progress: Mutex<HashMap<String, usize>>,
}

impl CatalogAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one fragment of `subject`'s reply and report whether the
    /// reply is now complete, per the `X-Fragment-Total` header the
    /// response carried.
    ///
    /// Returns `None` if `fragment_total` was absent — per SPEC_FULL.md
    /// §4.1 every fragmenting response always carries it, so callers
    /// should treat `None` as a protocol violation (log and drop, spec.md
    /// §7 "Parse error").
    pub fn record_fragment(&self, subject: &str, fragment_total: Option<u32>) -> Option<bool> {
        let total = fragment_total? as usize;
        let mut progress = self.progress.lock();
        let seen = progress.entry(subject.to_string()).or_insert(0);
        *seen += 1;
        let is_final = *seen >= total;
        if is_final {
            progress.remove(subject);
        }
        Some(is_final)
    }

    /// Fragments already observed for `subject`, for diagnostics/tests.
    pub fn fragments_seen(&self, subject: &str) -> usize {
        self.progress.lock().get(subject).copied().unwrap_or(0)
    }
}
