use std::collections::BTreeMap;
use std::path::PathBuf;

use log::{info, warn};

use ribotab_core::models::{CountPartition, OutputArtifact, Partition};

use crate::errors::PartitionError;

///
/// Read tallies of one scan over an alignment source
///
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub references: usize,
    pub reads: u64,
    /// unmapped, low mapping quality or (footprints) unexpected length
    pub filtered: u64,
    /// footprints with too few aligned bases to place an A-site
    pub too_short: u64,
    /// sites that matched no configured partition
    pub unassigned: u64,
    pub counted: u64,
}

///
/// Outcome of a conversion run: which partitions produced a compressed, indexed table and which
/// did not. A partial result is still returned; whether it is usable is up to the caller.
///
#[derive(Debug)]
pub struct ConversionReport<P: Partition> {
    /// `<tabix directory>/<stem>`, the prefix all table names start with
    pub prefix: PathBuf,
    pub succeeded: BTreeMap<P, OutputArtifact>,
    pub failed: BTreeMap<P, PartitionError>,
    pub stats: ScanStats,
}

impl<P: Partition> ConversionReport<P> {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Canonical (bgzip compressed) table of a partition, if it was produced
    pub fn compressed_path(&self, partition: &P) -> Option<PathBuf> {
        self.succeeded.get(partition).map(OutputArtifact::compressed)
    }

    pub fn compressed_paths(&self) -> BTreeMap<P, PathBuf> {
        self.succeeded
            .iter()
            .map(|(partition, artifact)| (*partition, artifact.compressed()))
            .collect()
    }

    ///
    /// Log every produced and every failed artifact
    ///
    pub fn log_summary(&self) {
        for (partition, artifact) in &self.succeeded {
            info!(
                "Compressed file with counts for {:?} is {:?}",
                partition,
                artifact.compressed()
            );
        }
        for (partition, err) in &self.failed {
            warn!("No usable counts for {:?}: {}", partition, err);
        }
        info!(
            "Counted {} of {} reads over {} reference sequences ({} filtered, {} too short, {} unassigned)",
            self.stats.counted,
            self.stats.reads,
            self.stats.references,
            self.stats.filtered,
            self.stats.too_short,
            self.stats.unassigned
        );
    }
}

impl ConversionReport<CountPartition> {
    /// The single compressed table of a generic count run
    pub fn path(&self) -> Option<PathBuf> {
        self.compressed_path(&CountPartition)
    }
}
