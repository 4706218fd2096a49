//! Per-reference site aggregation.
//!
//! A [`SiteAggregator`] lives for exactly one reference sequence. It holds one independent
//! [`PositionCounter`] per partition, and [`SiteAggregator::finish`] consumes it, turning every
//! counter into a sorted [`CountTable`]. Nothing carries over from one reference to the next.

use std::collections::BTreeMap;

use fxhash::FxHashMap;

use ribotab_core::models::{CountTable, Partition, SiteObservation};

///
/// Position -> count accumulator of one partition on one reference
///
#[derive(Debug, Default, Clone)]
pub struct PositionCounter {
    counts: FxHashMap<u64, u64>,
}

impl PositionCounter {
    pub fn new() -> Self {
        PositionCounter::default()
    }

    #[inline]
    pub fn observe(&mut self, position: u64) {
        *self.counts.entry(position).or_insert(0) += 1;
    }

    /// Sort the accumulated positions into a table and drop the counter
    pub fn finish(self, reference: &str) -> CountTable {
        CountTable::from_counts(reference, self.counts)
    }
}

pub struct SiteAggregator<P: Partition> {
    reference: String,
    counters: BTreeMap<P, PositionCounter>,
}

impl<P: Partition> SiteAggregator<P> {
    ///
    /// Start aggregating a reference sequence. Every partition gets a counter up front, so every
    /// partition also gets a (possibly empty) table when the reference is finished.
    ///
    pub fn new(reference: &str, partitions: &[P]) -> Self {
        let counters = partitions
            .iter()
            .map(|partition| (*partition, PositionCounter::new()))
            .collect();

        SiteAggregator {
            reference: reference.to_string(),
            counters,
        }
    }

    ///
    /// Count a site. Returns `false`, leaving every counter untouched, when the site belongs to
    /// another reference or to a partition that was not set up.
    ///
    pub fn observe(&mut self, site: &SiteObservation<'_>) -> bool {
        if site.reference != self.reference {
            return false;
        }

        match P::of(site).and_then(|partition| self.counters.get_mut(&partition)) {
            Some(counter) => {
                counter.observe(site.position);
                true
            }
            None => false,
        }
    }

    ///
    /// Flush every partition of this reference, in partition order.
    ///
    pub fn finish(self) -> Vec<(P, CountTable)> {
        let reference = self.reference;
        self.counters
            .into_iter()
            .map(|(partition, counter)| (partition, counter.finish(&reference)))
            .collect()
    }
}
