use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rayon::ThreadPool;

use ribotab_core::models::{CountPartition, FootprintPartition, Partition};
use ribotab_core::utils::source_stem;

use crate::aggregate::SiteAggregator;
use crate::config::ConvertConfig;
use crate::consts::MIN_MAPPING_QUALITY;
use crate::errors::{ConvertError, PartitionError, Result};
use crate::filter::ReadFilter;
use crate::mapper::SiteMapper;
use crate::report::{ConversionReport, ScanStats};
use crate::source::{AlignmentSource, BamSource};
use crate::tools::{CommandRunner, SystemRunner, Toolchain};
use crate::writer::{TableLayout, TableWriter, remove_artifacts, remove_partial};

///
/// Drives a scan over an alignment source and turns the resulting tables into compressed, indexed
/// artifacts.
///
pub struct Converter<'a, R: CommandRunner> {
    layout: TableLayout,
    toolchain: &'a Toolchain,
    runner: &'a R,
    min_mapping_quality: u8,
    show_progress: bool,
    pool: Option<ThreadPool>,
}

impl<'a, R: CommandRunner> Converter<'a, R> {
    pub fn new(layout: TableLayout, toolchain: &'a Toolchain, runner: &'a R) -> Self {
        Converter {
            layout,
            toolchain,
            runner,
            min_mapping_quality: MIN_MAPPING_QUALITY,
            show_progress: false,
            pool: None,
        }
    }

    pub fn with_min_mapping_quality(mut self, min_mapping_quality: u8) -> Self {
        self.min_mapping_quality = min_mapping_quality;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run compression and indexing on a dedicated pool instead of the global one
    pub fn with_thread_pool(mut self, pool: ThreadPool) -> Self {
        self.pool = Some(pool);
        self
    }

    ///
    /// Count ribosome footprints at their A-site, one table per strand and read length.
    ///
    /// # Arguments
    /// - source: footprint alignments
    /// - read_lengths: accepted footprint lengths; every length gets a forward and a reverse table
    ///
    pub fn convert_footprints<S: AlignmentSource>(
        &self,
        source: &mut S,
        read_lengths: &[u32],
    ) -> Result<ConversionReport<FootprintPartition>> {
        if read_lengths.is_empty() {
            return Err(ConvertError::NoReadLengths);
        }

        let partitions = FootprintPartition::enumerate(read_lengths);
        let filter = ReadFilter::footprint(self.min_mapping_quality, read_lengths);

        self.run(source, &partitions, &filter, SiteMapper::ASite)
    }

    ///
    /// Count reads at their 5' end into a single table covering every reference.
    ///
    pub fn convert_counts<S: AlignmentSource>(
        &self,
        source: &mut S,
    ) -> Result<ConversionReport<CountPartition>> {
        let filter = ReadFilter::generic(self.min_mapping_quality);

        self.run(source, &[CountPartition], &filter, SiteMapper::ReadEnd)
    }

    fn run<S: AlignmentSource, P: Partition>(
        &self,
        source: &mut S,
        partitions: &[P],
        filter: &ReadFilter,
        mapper: SiteMapper,
    ) -> Result<ConversionReport<P>> {
        let mut writer = TableWriter::create(&self.layout, partitions)?;

        let progress = self.progress_bar(source.references().len());
        let stats = match scan(source, partitions, filter, mapper, &mut writer, &progress) {
            Ok(stats) => stats,
            Err(err) => {
                progress.abandon();
                writer.discard();
                return Err(err);
            }
        };
        progress.finish_and_clear();

        let mut failed = BTreeMap::new();
        let mut tables: Vec<(P, PathBuf)> = Vec::with_capacity(partitions.len());
        for (partition, closed) in writer.close() {
            match closed {
                Ok(path) => tables.push((partition, path)),
                Err(err) => {
                    failed.insert(partition, err);
                }
            }
        }

        let finalized = match &self.pool {
            Some(pool) => pool.install(|| self.toolchain.finalize_all(self.runner, tables)),
            None => self.toolchain.finalize_all(self.runner, tables),
        };

        let mut succeeded = BTreeMap::new();
        for (partition, result) in finalized {
            match result {
                Ok(artifact) => {
                    succeeded.insert(partition, artifact);
                }
                Err(err) => {
                    failed.insert(partition, err);
                }
            }
        }

        for (partition, err) in &failed {
            self.clear_failed(partition, err);
        }

        Ok(ConversionReport {
            prefix: self.layout.prefix(),
            succeeded,
            failed,
            stats,
        })
    }

    ///
    /// A failed partition keeps no `.gz` or `.tbi` at its canonical paths. A raw table is only
    /// removed when the tools failed on it; a table that could not be written is left to the writer.
    ///
    fn clear_failed<P: Partition>(&self, partition: &P, err: &PartitionError) {
        let table = self.layout.table_path(partition);
        if !matches!(err, PartitionError::TableWrite { .. }) {
            remove_partial(&table);
        }
        remove_artifacts(&table);
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} references {msg}")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        bar
    }
}

///
/// Stream every reference of `alignments` through filter, mapper and aggregator, appending each
/// reference's tables to `writer` as soon as the reference is done.
///
fn scan<S: AlignmentSource, P: Partition>(
    alignments: &mut S,
    partitions: &[P],
    filter: &ReadFilter,
    mapper: SiteMapper,
    writer: &mut TableWriter<P>,
    progress: &ProgressBar,
) -> Result<ScanStats> {
    let references = alignments.references().to_vec();
    let mut stats = ScanStats::default();

    for reference in &references {
        let fetch_error = |source| ConvertError::ReferenceFetch {
            reference: reference.name.clone(),
            source,
        };

        let mut aggregator = SiteAggregator::new(&reference.name, partitions);
        let reads = alignments.fetch(&reference.name).map_err(fetch_error)?;
        for read in reads {
            let read = read.map_err(fetch_error)?;
            stats.reads += 1;

            if !filter.accepts(&read) {
                stats.filtered += 1;
                continue;
            }

            match mapper.map(&read) {
                Some(site) if aggregator.observe(&site) => stats.counted += 1,
                Some(_) => stats.unassigned += 1,
                None => stats.too_short += 1,
            }
        }

        for (partition, table) in aggregator.finish() {
            writer.append(&partition, &table);
        }

        stats.references += 1;
        progress.set_message(reference.name.clone());
        progress.inc(1);
        info!("Completed {}", reference.name);
    }

    Ok(stats)
}

fn layout_for(bam_file: &Path, config: &ConvertConfig) -> Result<TableLayout> {
    let stem =
        source_stem(bam_file).ok_or_else(|| ConvertError::InvalidSourceName(bam_file.to_path_buf()))?;
    Ok(TableLayout::new(config.tabix_directory(), stem))
}

fn thread_pool(config: &ConvertConfig) -> Result<ThreadPool> {
    Ok(rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads.max(1))
        .build()?)
}

///
/// Convert a ribosome footprint BAM file into bgzip compressed, tabix indexed count tables under
/// `<output_directory>/tabix/`, named `<bam stem>.{fwd,rev}.len<L>.tbx.gz`.
///
/// The BAM index is built first if it does not exist yet. bgzip and tabix are taken from the config
/// or looked up on `$PATH`.
///
/// # Arguments
/// - bam_file: coordinate sorted footprint alignments
/// - bam_index: optional path to an existing BAI index
/// - config: conversion parameters
///
pub fn convert_riboseq(
    bam_file: &Path,
    bam_index: Option<&Path>,
    config: &ConvertConfig,
) -> anyhow::Result<ConversionReport<FootprintPartition>> {
    let toolchain = Toolchain::resolve(config.bgzip_path.as_deref(), config.tabix_path.as_deref())?;
    let layout = layout_for(bam_file, config)?;
    let mut source = BamSource::open(bam_file, bam_index)
        .with_context(|| format!("Failed to open riboseq alignments {:?}", bam_file))?;

    let converter = Converter::new(layout, &toolchain, &SystemRunner)
        .with_min_mapping_quality(config.min_mapping_quality)
        .with_progress(true)
        .with_thread_pool(thread_pool(config)?);

    let report = converter
        .convert_footprints(&mut source, &config.normalized_read_lengths())
        .with_context(|| format!("Failed to convert riboseq alignments {:?}", bam_file))?;
    report.log_summary();

    Ok(report)
}

///
/// Convert an RNA-seq BAM file into a single bgzip compressed, tabix indexed count table
/// `<output_directory>/tabix/<bam stem>.gz`.
///
pub fn convert_rnaseq(
    bam_file: &Path,
    bam_index: Option<&Path>,
    config: &ConvertConfig,
) -> anyhow::Result<ConversionReport<CountPartition>> {
    let toolchain = Toolchain::resolve(config.bgzip_path.as_deref(), config.tabix_path.as_deref())?;
    let layout = layout_for(bam_file, config)?;
    let mut source = BamSource::open(bam_file, bam_index)
        .with_context(|| format!("Failed to open RNA-seq alignments {:?}", bam_file))?;

    let converter = Converter::new(layout, &toolchain, &SystemRunner)
        .with_min_mapping_quality(config.min_mapping_quality)
        .with_progress(true)
        .with_thread_pool(thread_pool(config)?);

    let report = converter
        .convert_counts(&mut source)
        .with_context(|| format!("Failed to convert RNA-seq alignments {:?}", bam_file))?;
    report.log_summary();

    Ok(report)
}
