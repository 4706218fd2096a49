use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use super::read::Strand;
use super::site::SiteObservation;

///
/// Key of an independent output unit. Every partition gets its own count table file, so the key
/// also decides the file name.
///
pub trait Partition: Copy + Ord + Hash + Debug + Send + Sync + 'static {
    ///
    /// Partition a site observation is counted in, or `None` if the observation carries no
    /// information for this kind of partition.
    ///
    fn of(site: &SiteObservation<'_>) -> Option<Self>;

    ///
    /// File name of this partition's raw count table
    ///
    /// # Arguments
    /// - stem: base name of the alignment source the table is derived from
    ///
    fn table_name(&self, stem: &str) -> String;
}

///
/// Ribosome footprint partition: one table per strand and read length
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy, PartialOrd, Ord)]
pub struct FootprintPartition {
    pub strand: Strand,
    pub read_length: u32,
}

impl FootprintPartition {
    pub fn new(strand: Strand, read_length: u32) -> Self {
        FootprintPartition {
            strand,
            read_length,
        }
    }

    ///
    /// All partitions for a set of read lengths: both strands for every length, in key order.
    ///
    pub fn enumerate(read_lengths: &[u32]) -> Vec<FootprintPartition> {
        let mut partitions: Vec<FootprintPartition> = Strand::ALL
            .iter()
            .flat_map(|strand| {
                read_lengths
                    .iter()
                    .map(move |read_length| FootprintPartition::new(*strand, *read_length))
            })
            .collect();
        partitions.sort();
        partitions.dedup();
        partitions
    }
}

impl Partition for FootprintPartition {
    fn of(site: &SiteObservation<'_>) -> Option<Self> {
        match (site.strand, site.read_length) {
            (Some(strand), Some(read_length)) => Some(FootprintPartition::new(strand, read_length)),
            _ => None,
        }
    }

    fn table_name(&self, stem: &str) -> String {
        format!("{}.{}.len{}.tbx", stem, self.strand.tag(), self.read_length)
    }
}

impl Display for FootprintPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.len{}", self.strand.tag(), self.read_length)
    }
}

///
/// Generic read counts: a single table shared by both strands and all read lengths
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy, PartialOrd, Ord, Default)]
pub struct CountPartition;

impl Partition for CountPartition {
    fn of(_site: &SiteObservation<'_>) -> Option<Self> {
        Some(CountPartition)
    }

    fn table_name(&self, stem: &str) -> String {
        stem.to_string()
    }
}

impl Display for CountPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "counts")
    }
}
