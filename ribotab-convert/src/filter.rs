use std::collections::BTreeSet;

use ribotab_core::models::AlignedRead;

use crate::consts::MIN_MAPPING_QUALITY;

///
/// Decides whether a read may contribute a count at all. Rejected reads are not errors, they are
/// just left out of every table.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ReadFilter {
    min_mapping_quality: u8,
    read_lengths: Option<BTreeSet<u32>>,
}

impl Default for ReadFilter {
    fn default() -> Self {
        ReadFilter::generic(MIN_MAPPING_QUALITY)
    }
}

impl ReadFilter {
    /// Accept any mapped read at or above the mapping quality threshold
    pub fn generic(min_mapping_quality: u8) -> Self {
        ReadFilter {
            min_mapping_quality,
            read_lengths: None,
        }
    }

    /// Like [`ReadFilter::generic`], but also require the read length to be one of `read_lengths`
    pub fn footprint(min_mapping_quality: u8, read_lengths: &[u32]) -> Self {
        ReadFilter {
            min_mapping_quality,
            read_lengths: Some(read_lengths.iter().copied().collect()),
        }
    }

    pub fn accepts(&self, read: &AlignedRead) -> bool {
        if !read.is_mapped || read.mapping_quality < self.min_mapping_quality {
            return false;
        }

        match &self.read_lengths {
            Some(lengths) => lengths.contains(&read.read_length),
            None => true,
        }
    }
}
