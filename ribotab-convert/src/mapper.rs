use ribotab_core::models::{AlignedRead, SiteObservation, Strand};

use crate::consts::{FORWARD_A_SITE_OFFSET, REVERSE_A_SITE_OFFSET};

///
/// Reduces an accepted read to the one reference position it is counted at.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteMapper {
    /// RNA-seq style: the 5' end of the alignment, strand is dropped
    ReadEnd,
    /// Ribosome footprints: the approximate A-site, keyed by strand and read length
    ASite,
}

impl SiteMapper {
    ///
    /// Map a read to its site. Footprints with too few aligned bases to reach the A-site offset
    /// yield `None` and are skipped.
    ///
    pub fn map<'a>(&self, read: &'a AlignedRead) -> Option<SiteObservation<'a>> {
        match self {
            SiteMapper::ReadEnd => {
                let position = match read.strand {
                    Strand::Forward => read.start,
                    Strand::Reverse => read.last_position(),
                };
                Some(SiteObservation::unstranded(&read.reference, position))
            }
            SiteMapper::ASite => {
                let position = match read.strand {
                    Strand::Forward => read.mapped_position(FORWARD_A_SITE_OFFSET),
                    Strand::Reverse => read.mapped_position_from_end(REVERSE_A_SITE_OFFSET),
                }?;
                Some(SiteObservation::stranded(
                    &read.reference,
                    position,
                    read.strand,
                    read.read_length,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ribotab_core::models::AlignedBlock;
    use rstest::*;

    #[rstest]
    fn test_read_end_forward() {
        let read = AlignedRead::contiguous("chr1", 50, 30, Strand::Forward);
        let site = SiteMapper::ReadEnd.map(&read).unwrap();
        assert_eq!(site, SiteObservation::unstranded("chr1", 50));
    }

    #[rstest]
    fn test_read_end_reverse() {
        let read = AlignedRead::contiguous("chr1", 50, 30, Strand::Reverse);
        let site = SiteMapper::ReadEnd.map(&read).unwrap();
        assert_eq!(site.position, 79);
        assert_eq!(site.strand, None);
    }

    #[rstest]
    fn test_a_site_forward() {
        let read = AlignedRead::contiguous("chr1", 100, 28, Strand::Forward);
        let site = SiteMapper::ASite.map(&read).unwrap();
        assert_eq!(site, SiteObservation::stranded("chr1", 112, Strand::Forward, 28));
    }

    #[rstest]
    fn test_a_site_reverse() {
        let read = AlignedRead::contiguous("chr1", 100, 30, Strand::Reverse);
        let site = SiteMapper::ASite.map(&read).unwrap();
        assert_eq!(site, SiteObservation::stranded("chr1", 117, Strand::Reverse, 30));
    }

    #[rstest]
    fn test_a_site_across_splice_junction() {
        // 10M 200N 20M, the 13th aligned base sits in the second block
        let read = AlignedRead::from_blocks(
            "chr3",
            Strand::Forward,
            vec![AlignedBlock::new(1000, 10), AlignedBlock::new(1210, 20)],
        )
        .unwrap();
        let site = SiteMapper::ASite.map(&read).unwrap();
        assert_eq!(site.position, 1212);
    }

    #[rstest]
    #[case(Strand::Forward, 112)]
    #[case(Strand::Reverse, 100)]
    fn test_a_site_too_short(#[case] strand: Strand, #[case] shortest_site: u64) {
        let read = AlignedRead::contiguous("chr1", 100, 12, strand);
        assert_eq!(SiteMapper::ASite.map(&read), None);

        let read = AlignedRead::contiguous("chr1", 100, 13, strand);
        assert_eq!(
            SiteMapper::ASite.map(&read).map(|s| s.position),
            Some(shortest_site)
        );
    }
}
