use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::tools::ToolStage;

///
/// Errors that abort a whole conversion run.
///
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Can't open alignment source {path:?}: {source}")]
    AlignmentSource { path: PathBuf, source: io::Error },

    #[error("Can't build or locate an index for alignment source {path:?}: {source}")]
    AlignmentIndex { path: PathBuf, source: io::Error },

    #[error("Failed reading alignments on reference {reference}: {source}")]
    ReferenceFetch { reference: String, source: io::Error },

    #[error("Can't create output directory {path:?}: {source}")]
    OutputDirectory { path: PathBuf, source: io::Error },

    #[error("Can't derive an output name from alignment source {0:?}")]
    InvalidSourceName(PathBuf),

    #[error("No footprint read lengths configured")]
    NoReadLengths,

    #[error("Could not locate the `{0}` executable. Set its path explicitly or add it to $PATH")]
    ToolNotFound(String),

    #[error("Failed to build the thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

///
/// Errors confined to a single partition. They are reported alongside the artifacts that did
/// succeed and never stop sibling partitions from being produced.
///
#[derive(Error, Debug)]
pub enum PartitionError {
    #[error("Failed to write count table {path:?}: {source}")]
    TableWrite { path: PathBuf, source: io::Error },

    #[error("Could not run {stage} tool {program:?} on {path:?}: {source}")]
    ToolSpawn {
        stage: ToolStage,
        program: PathBuf,
        path: PathBuf,
        source: io::Error,
    },

    #[error("{stage} tool {program:?} exited with {} on {path:?}: {stderr}", describe_exit(.exit_code))]
    ToolFailed {
        stage: ToolStage,
        program: PathBuf,
        path: PathBuf,
        exit_code: Option<i32>,
        stderr: String,
    },
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
