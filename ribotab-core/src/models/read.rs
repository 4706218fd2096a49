use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::ModelError;

///
/// Strand a read was aligned to
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy, PartialOrd, Ord)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub const ALL: [Strand; 2] = [Strand::Forward, Strand::Reverse];

    ///
    /// Short tag used in output file names
    ///
    pub fn tag(&self) -> &'static str {
        match self {
            Strand::Forward => "fwd",
            Strand::Reverse => "rev",
        }
    }
}

impl FromStr for Strand {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fwd" | "forward" | "+" => Ok(Strand::Forward),
            "rev" | "reverse" | "-" => Ok(Strand::Reverse),
            _ => Err(ModelError::UnknownStrand(s.to_string())),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

///
/// A named reference sequence (chromosome, contig) and its length, as listed in an alignment header
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct ReferenceSequence {
    pub name: String,
    pub length: u64,
}

impl ReferenceSequence {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        ReferenceSequence {
            name: name.into(),
            length,
        }
    }
}

/// Represent a gapless stretch of aligned bases on the reference: [start, start + len)
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct AlignedBlock {
    pub start: u64,
    pub len: u64,
}

impl AlignedBlock {
    pub fn new(start: u64, len: u64) -> Self {
        AlignedBlock { start, len }
    }

    #[inline]
    pub fn end(&self) -> u64 {
        self.start + self.len
    }
}

///
/// One alignment record, reduced to what the conversion pipelines look at.
///
/// Coordinates are 0-based. `blocks` lists the reference intervals that have an aligned read base
/// (match/mismatch operations only), so deletions, skipped introns and clipped bases are not part
/// of any block.
///
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AlignedRead {
    pub reference: Arc<str>,
    pub start: u64,
    pub alignment_length: u64,
    pub strand: Strand,
    pub mapping_quality: u8,
    pub read_length: u32,
    pub is_mapped: bool,
    pub blocks: Vec<AlignedBlock>,
}

impl AlignedRead {
    ///
    /// Build a mapped read from its aligned blocks. The leftmost position and the alignment
    /// length are taken from the first and last block.
    ///
    /// # Arguments
    /// - reference: name of the reference sequence the read is aligned to
    /// - strand: strand of the alignment
    /// - blocks: ordered, non-overlapping aligned blocks
    ///
    pub fn from_blocks(
        reference: impl Into<Arc<str>>,
        strand: Strand,
        blocks: Vec<AlignedBlock>,
    ) -> Result<Self, ModelError> {
        let reference = reference.into();

        let ordered = blocks
            .windows(2)
            .all(|pair| pair[0].end() <= pair[1].start);
        let (first, last) = match (blocks.first(), blocks.last()) {
            (Some(first), Some(last)) if ordered && blocks.iter().all(|b| b.len > 0) => {
                (*first, *last)
            }
            _ => return Err(ModelError::InvalidBlocks(reference.to_string())),
        };

        let read_length = blocks.iter().map(|b| b.len).sum::<u64>() as u32;

        Ok(AlignedRead {
            reference,
            start: first.start,
            alignment_length: last.end() - first.start,
            strand,
            mapping_quality: u8::MAX,
            read_length,
            is_mapped: true,
            blocks,
        })
    }

    ///
    /// A mapped read without gaps covering [start, start + length)
    ///
    pub fn contiguous(
        reference: impl Into<Arc<str>>,
        start: u64,
        length: u64,
        strand: Strand,
    ) -> Self {
        AlignedRead {
            reference: reference.into(),
            start,
            alignment_length: length,
            strand,
            mapping_quality: u8::MAX,
            read_length: length as u32,
            is_mapped: true,
            blocks: vec![AlignedBlock::new(start, length)],
        }
    }

    pub fn with_mapping_quality(mut self, mapping_quality: u8) -> Self {
        self.mapping_quality = mapping_quality;
        self
    }

    pub fn with_read_length(mut self, read_length: u32) -> Self {
        self.read_length = read_length;
        self
    }

    /// Rightmost reference position covered by the alignment (inclusive)
    pub fn last_position(&self) -> u64 {
        // zero-span alignments collapse onto their start
        self.start + self.alignment_length.max(1) - 1
    }

    /// Number of reference positions with an aligned read base
    pub fn mapped_len(&self) -> u64 {
        self.blocks.iter().map(|b| b.len).sum()
    }

    ///
    /// Reference position of the `index`-th aligned base, counting from the leftmost one (0-based).
    ///
    /// Returns `None` when the read has `index` or fewer aligned bases.
    ///
    pub fn mapped_position(&self, index: u64) -> Option<u64> {
        let mut remaining = index;
        for block in &self.blocks {
            if remaining < block.len {
                return Some(block.start + remaining);
            }
            remaining -= block.len;
        }
        None
    }

    ///
    /// Reference position of the `index`-th aligned base counting from the rightmost one, so an
    /// `index` of 0 is the last aligned base.
    ///
    pub fn mapped_position_from_end(&self, index: u64) -> Option<u64> {
        let mut remaining = index;
        for block in self.blocks.iter().rev() {
            if remaining < block.len {
                return Some(block.end() - 1 - remaining);
            }
            remaining -= block.len;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn spliced_read() -> AlignedRead {
        // 10M 100N 5M 2D 15M
        AlignedRead::from_blocks(
            "chr1",
            Strand::Reverse,
            vec![
                AlignedBlock::new(1000, 10),
                AlignedBlock::new(1110, 5),
                AlignedBlock::new(1117, 15),
            ],
        )
        .unwrap()
    }

    #[rstest]
    fn test_strand_from_str() {
        assert_eq!("fwd".parse::<Strand>().unwrap(), Strand::Forward);
        assert_eq!("-".parse::<Strand>().unwrap(), Strand::Reverse);
        assert_eq!(
            "x".parse::<Strand>(),
            Err(ModelError::UnknownStrand("x".to_string()))
        );
    }

    #[rstest]
    fn test_from_blocks_span(spliced_read: AlignedRead) {
        assert_eq!(spliced_read.start, 1000);
        assert_eq!(spliced_read.alignment_length, 132);
        assert_eq!(spliced_read.last_position(), 1131);
        assert_eq!(spliced_read.mapped_len(), 30);
        assert_eq!(spliced_read.read_length, 30);
    }

    #[rstest]
    fn test_from_blocks_rejects_overlaps() {
        let read = AlignedRead::from_blocks(
            "chr1",
            Strand::Forward,
            vec![AlignedBlock::new(10, 10), AlignedBlock::new(15, 10)],
        );
        assert_eq!(read.is_err(), true);

        let read = AlignedRead::from_blocks("chr1", Strand::Forward, vec![]);
        assert_eq!(read.is_err(), true);
    }

    #[rstest]
    fn test_mapped_position_skips_gaps(spliced_read: AlignedRead) {
        assert_eq!(spliced_read.mapped_position(0), Some(1000));
        assert_eq!(spliced_read.mapped_position(9), Some(1009));
        assert_eq!(spliced_read.mapped_position(10), Some(1110));
        assert_eq!(spliced_read.mapped_position(15), Some(1117));
        assert_eq!(spliced_read.mapped_position(29), Some(1131));
        assert_eq!(spliced_read.mapped_position(30), None);
    }

    #[rstest]
    fn test_mapped_position_from_end(spliced_read: AlignedRead) {
        assert_eq!(spliced_read.mapped_position_from_end(0), Some(1131));
        assert_eq!(spliced_read.mapped_position_from_end(14), Some(1117));
        assert_eq!(spliced_read.mapped_position_from_end(15), Some(1114));
        assert_eq!(spliced_read.mapped_position_from_end(20), Some(1009));
        assert_eq!(spliced_read.mapped_position_from_end(30), None);
    }

    #[rstest]
    fn test_contiguous_read() {
        let read = AlignedRead::contiguous("chr2", 100, 30, Strand::Forward);
        assert_eq!(read.last_position(), 129);
        assert_eq!(read.mapped_position(12), Some(112));
        assert_eq!(read.mapped_position_from_end(12), Some(117));
    }
}
