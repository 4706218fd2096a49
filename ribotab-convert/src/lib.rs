//! # ribotab-convert
//!
//! Turns coordinate sorted alignments into per-position count tables that are compressed with
//! `bgzip` and indexed with `tabix`, so a genome browser or a downstream tool can query counts by
//! region.
//!
//! Two pipelines are provided:
//!
//! - ribosome footprints ([`convert_riboseq`]): every accepted read is reduced to its A-site and
//!   counted into one table per strand and read length.
//! - RNA-seq ([`convert_rnaseq`]): every accepted read is reduced to its 5' end and counted into a
//!   single table.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use ribotab_convert::config::ConvertConfig;
//! use ribotab_convert::convert_riboseq;
//!
//! let config = ConvertConfig::new("results");
//! let report = convert_riboseq(Path::new("sample.bam"), None, &config).unwrap();
//! for (partition, path) in report.compressed_paths() {
//!     println!("{partition}: {}", path.display());
//! }
//! ```
pub mod aggregate;
pub mod config;
pub mod consts;
pub mod errors;
pub mod filter;
pub mod mapper;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod tools;
pub mod writer;

// re-exports
pub use self::errors::{ConvertError, PartitionError};
pub use self::pipeline::{Converter, convert_riboseq, convert_rnaseq};
pub use self::report::{ConversionReport, ScanStats};
pub use self::source::{AlignmentSource, BamSource, InMemorySource};
pub use self::tools::{CommandOutcome, CommandRunner, SystemRunner, Toolchain};
pub use self::writer::TableLayout;
