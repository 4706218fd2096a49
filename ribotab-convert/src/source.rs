use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use noodles::bam;
use noodles::bgzf;
use noodles::core::Region;
use noodles::csi::binning_index::Indexer;
use noodles::csi::binning_index::index::reference_sequence::bin::Chunk;
use noodles::sam;
use noodles::sam::alignment::Record as _;
use noodles::sam::alignment::record::cigar::op::Kind;

use ribotab_core::models::{AlignedBlock, AlignedRead, ReferenceSequence, Strand};
use ribotab_core::utils::append_extension;

use crate::consts::BAM_INDEX_EXTENSION;
use crate::errors::{ConvertError, Result};

pub type ReadIter<'a> = Box<dyn Iterator<Item = io::Result<AlignedRead>> + 'a>;

///
/// A collection of alignments that can be walked one reference sequence at a time.
///
/// Implementations must yield the reads of a reference as one contiguous stream; the pipelines
/// never buffer or reorder across references.
///
pub trait AlignmentSource {
    /// Reference sequences in the order they should be processed
    fn references(&self) -> &[ReferenceSequence];

    /// Lazily stream every read aligned to `reference`
    fn fetch(&mut self, reference: &str) -> io::Result<ReadIter<'_>>;
}

/// `<bam>.bai`
pub fn bam_index_path(bam: &Path) -> PathBuf {
    append_extension(bam, BAM_INDEX_EXTENSION)
}

///
/// Make sure a BAM file has a BAI index and return its path.
///
/// An explicitly given index is used when it exists, then `<bam>.bai`. Only when neither exists
/// is the index built from the BAM file and written to `<bam>.bai`, so calling this repeatedly is
/// cheap.
///
/// # Arguments
/// - bam: path to a coordinate sorted BAM file
/// - index: optional path to an existing index
///
pub fn ensure_bam_index(bam: &Path, index: Option<&Path>) -> Result<PathBuf> {
    if let Some(index) = index.filter(|index| index.is_file()) {
        return Ok(index.to_path_buf());
    }

    let default_index = bam_index_path(bam);
    if default_index.is_file() {
        return Ok(default_index);
    }

    info!("Generating index for {:?}", bam);
    let to_error = |source| ConvertError::AlignmentIndex {
        path: bam.to_path_buf(),
        source,
    };
    let built = build_bam_index(bam).map_err(to_error)?;
    bam::bai::write(&default_index, &built).map_err(to_error)?;

    Ok(default_index)
}

///
/// Build a BAI index by streaming every record of a coordinate sorted BAM file once, recording the
/// virtual file offsets each record spans.
///
fn build_bam_index(bam: &Path) -> io::Result<bam::bai::Index> {
    let mut reader = File::open(bam).map(bam::io::Reader::new)?;
    let header = reader.read_header()?;

    let mut record = bam::Record::default();
    let mut indexer = Indexer::default();
    let mut chunk_start = reader.get_ref().virtual_position();

    while reader.read_record(&mut record)? != 0 {
        let chunk_end = reader.get_ref().virtual_position();

        let context = match (
            record.reference_sequence_id().transpose()?,
            record.alignment_start().transpose()?,
            record.alignment_end().transpose()?,
        ) {
            (Some(id), Some(start), Some(end)) => {
                Some((id, start, end, !record.flags().is_unmapped()))
            }
            _ => None,
        };

        indexer.add_record(context, Chunk::new(chunk_start, chunk_end))?;
        chunk_start = chunk_end;
    }

    Ok(indexer.build(header.reference_sequences().len()))
}

///
/// Indexed BAM file read through noodles
///
pub struct BamSource {
    reader: bam::io::IndexedReader<bgzf::Reader<File>>,
    header: sam::Header,
    references: Vec<ReferenceSequence>,
}

impl BamSource {
    ///
    /// Open a BAM file, building its index first if there is none.
    ///
    pub fn open(path: &Path, index: Option<&Path>) -> Result<Self> {
        let index_path = ensure_bam_index(path, index)?;
        let index = bam::bai::read(&index_path).map_err(|source| ConvertError::AlignmentIndex {
            path: index_path.clone(),
            source,
        })?;

        let to_error = |source| ConvertError::AlignmentSource {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = bam::io::indexed_reader::Builder::default()
            .set_index(index)
            .build_from_path(path)
            .map_err(to_error)?;
        let header = reader.read_header().map_err(to_error)?;

        let references = header
            .reference_sequences()
            .iter()
            .map(|(name, reference)| {
                ReferenceSequence::new(name.to_string(), reference.length().get() as u64)
            })
            .collect();

        Ok(BamSource {
            reader,
            header,
            references,
        })
    }
}

impl AlignmentSource for BamSource {
    fn references(&self) -> &[ReferenceSequence] {
        &self.references
    }

    fn fetch(&mut self, reference: &str) -> io::Result<ReadIter<'_>> {
        let region = Region::new(reference, ..);
        let name: Arc<str> = Arc::from(reference);
        let query = self.reader.query(&self.header, &region)?;

        Ok(Box::new(query.map(move |record| {
            record.and_then(|record| aligned_read_from_record(&name, &record))
        })))
    }
}

///
/// Convert a BAM record into an [`AlignedRead`], walking its CIGAR to find the aligned blocks.
///
pub fn aligned_read_from_record(reference: &Arc<str>, record: &bam::Record) -> io::Result<AlignedRead> {
    let flags = record.flags();
    let strand = if flags.is_reverse_complemented() {
        Strand::Reverse
    } else {
        Strand::Forward
    };
    // 255 means "not available" and is kept as is
    let mapping_quality = record.mapping_quality().map_or(u8::MAX, |quality| quality.get());
    let read_length = record.sequence().len() as u32;

    let start = record.alignment_start().transpose()?;
    let start = match start {
        Some(position) if !flags.is_unmapped() => (usize::from(position) - 1) as u64,
        _ => {
            return Ok(AlignedRead {
                reference: reference.clone(),
                start: 0,
                alignment_length: 0,
                strand,
                mapping_quality,
                read_length,
                is_mapped: false,
                blocks: Vec::new(),
            });
        }
    };

    let mut blocks: Vec<AlignedBlock> = Vec::new();
    let mut cursor = start;
    for op in record.cigar().iter() {
        let op = op?;
        let len = op.len() as u64;
        match op.kind() {
            Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch => {
                // 10=2X5= style runs collapse into one block
                let adjacent = blocks.last().is_some_and(|block| block.end() == cursor);
                if adjacent {
                    let last = blocks.len() - 1;
                    blocks[last].len += len;
                } else {
                    blocks.push(AlignedBlock::new(cursor, len));
                }
                cursor += len;
            }
            Kind::Deletion | Kind::Skip => cursor += len,
            Kind::Insertion | Kind::SoftClip | Kind::HardClip | Kind::Pad => {}
        }
    }

    Ok(AlignedRead {
        reference: reference.clone(),
        start,
        alignment_length: cursor - start,
        strand,
        mapping_quality,
        read_length,
        is_mapped: true,
        blocks,
    })
}

///
/// Reads held in memory, grouped by reference. Useful when alignments come from somewhere other
/// than a BAM file.
///
#[derive(Debug, Default, Clone)]
pub struct InMemorySource {
    references: Vec<ReferenceSequence>,
    reads: Vec<Vec<AlignedRead>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        InMemorySource::default()
    }

    /// Add a reference and the reads aligned to it. References are processed in insertion order.
    pub fn with_reference(mut self, reference: ReferenceSequence, reads: Vec<AlignedRead>) -> Self {
        self.references.push(reference);
        self.reads.push(reads);
        self
    }
}

impl AlignmentSource for InMemorySource {
    fn references(&self) -> &[ReferenceSequence] {
        &self.references
    }

    fn fetch(&mut self, reference: &str) -> io::Result<ReadIter<'_>> {
        let index = self
            .references
            .iter()
            .position(|r| r.name == reference)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Unknown reference sequence: {}", reference),
                )
            })?;

        Ok(Box::new(self.reads[index].iter().cloned().map(Ok)))
    }
}
