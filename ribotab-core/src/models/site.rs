use super::read::Strand;

///
/// The single genomic site an accepted read contributes a count to.
///
/// `read_length` and `strand` are only kept when the assay partitions on them; generic counts leave
/// both unspecified so forward and reverse reads share one table.
///
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct SiteObservation<'a> {
    pub reference: &'a str,
    pub position: u64,
    pub read_length: Option<u32>,
    pub strand: Option<Strand>,
}

impl<'a> SiteObservation<'a> {
    pub fn unstranded(reference: &'a str, position: u64) -> Self {
        SiteObservation {
            reference,
            position,
            read_length: None,
            strand: None,
        }
    }

    pub fn stranded(reference: &'a str, position: u64, strand: Strand, read_length: u32) -> Self {
        SiteObservation {
            reference,
            position,
            read_length: Some(read_length),
            strand: Some(strand),
        }
    }
}
