//! bgzip / tabix invocation.
//!
//! Every raw table is compressed in place (`<table>` -> `<table>.gz`) and then indexed
//! (`<table>.gz.tbi`) by external programs. Each run blocks until the child exits. Failures are
//! returned per table, so one bad artifact never stops the others.

use std::ffi::OsString;
use std::fmt::{self, Display};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info, warn};
use rayon::prelude::*;

use ribotab_core::models::{OutputArtifact, Partition};

use crate::consts::{BGZIP_BIN, TABIX_BIN};
use crate::errors::{ConvertError, PartitionError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStage {
    Compress,
    Index,
}

impl Display for ToolStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolStage::Compress => write!(f, "compression"),
            ToolStage::Index => write!(f, "indexing"),
        }
    }
}

///
/// What a finished child process left behind
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stderr: String,
}

impl CommandOutcome {
    pub fn succeeded() -> Self {
        CommandOutcome {
            success: true,
            exit_code: Some(0),
            stderr: String::new(),
        }
    }

    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        CommandOutcome {
            success: false,
            exit_code: Some(exit_code),
            stderr: stderr.into(),
        }
    }
}

///
/// Synchronous command execution. `Err` means the program could not be started at all; a program
/// that ran and failed is an `Ok` outcome with `success == false`.
///
pub trait CommandRunner: Sync {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<CommandOutcome>;
}

/// Runs commands as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<CommandOutcome> {
        debug!("Running {:?} {:?}", program, args);

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        Ok(CommandOutcome {
            success: output.status.success(),
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

///
/// Locations of the compression and indexing programs
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub bgzip: PathBuf,
    pub tabix: PathBuf,
}

impl Toolchain {
    pub fn new(bgzip: impl Into<PathBuf>, tabix: impl Into<PathBuf>) -> Self {
        Toolchain {
            bgzip: bgzip.into(),
            tabix: tabix.into(),
        }
    }

    ///
    /// Use the given program paths, falling back to a `$PATH` lookup for any that are missing.
    ///
    pub fn resolve(bgzip: Option<&Path>, tabix: Option<&Path>) -> Result<Self> {
        let locate = |explicit: Option<&Path>, name: &str| -> Result<PathBuf> {
            match explicit {
                Some(path) => Ok(path.to_path_buf()),
                None => which::which(name).map_err(|_| ConvertError::ToolNotFound(name.to_string())),
            }
        };

        Ok(Toolchain {
            bgzip: locate(bgzip, BGZIP_BIN)?,
            tabix: locate(tabix, TABIX_BIN)?,
        })
    }

    /// `bgzip -f <table>`
    pub fn compress_args(table: &Path) -> Vec<OsString> {
        vec!["-f".into(), table.as_os_str().to_owned()]
    }

    /// `tabix -f -b 2 -e 3 -0 <table>.gz`: start in column 2, end in column 3, 0-based
    pub fn index_args(compressed: &Path) -> Vec<OsString> {
        ["-f", "-b", "2", "-e", "3", "-0"]
            .into_iter()
            .map(OsString::from)
            .chain(std::iter::once(compressed.as_os_str().to_owned()))
            .collect()
    }

    fn run_stage<R: CommandRunner>(
        &self,
        runner: &R,
        stage: ToolStage,
        target: &Path,
    ) -> std::result::Result<(), PartitionError> {
        let (program, args) = match stage {
            ToolStage::Compress => (&self.bgzip, Toolchain::compress_args(target)),
            ToolStage::Index => (&self.tabix, Toolchain::index_args(target)),
        };

        let outcome =
            runner
                .run(program, &args)
                .map_err(|source| PartitionError::ToolSpawn {
                    stage,
                    program: program.clone(),
                    path: target.to_path_buf(),
                    source,
                })?;

        if outcome.success {
            Ok(())
        } else {
            Err(PartitionError::ToolFailed {
                stage,
                program: program.clone(),
                path: target.to_path_buf(),
                exit_code: outcome.exit_code,
                stderr: outcome.stderr,
            })
        }
    }

    ///
    /// Compress a raw table, then index the compressed file. Indexing is not attempted when
    /// compression fails.
    ///
    pub fn finalize<R: CommandRunner>(
        &self,
        runner: &R,
        table: &Path,
    ) -> std::result::Result<OutputArtifact, PartitionError> {
        let artifact = OutputArtifact::new(table);

        self.run_stage(runner, ToolStage::Compress, artifact.table())?;
        self.run_stage(runner, ToolStage::Index, &artifact.compressed())?;

        Ok(artifact)
    }

    ///
    /// Finalize every table. Tables are independent and are processed in parallel on the current
    /// rayon pool; results keep the order of `tables`.
    ///
    pub fn finalize_all<P: Partition, R: CommandRunner>(
        &self,
        runner: &R,
        tables: Vec<(P, PathBuf)>,
    ) -> Vec<(P, std::result::Result<OutputArtifact, PartitionError>)> {
        tables
            .into_par_iter()
            .map(|(partition, table)| {
                let result = self.finalize(runner, &table);
                match &result {
                    Ok(artifact) => info!(
                        "Compressed counts for {:?} are in {:?}",
                        partition,
                        artifact.compressed()
                    ),
                    Err(err) => warn!("Failed to finalize {:?}: {}", partition, err),
                }
                (partition, result)
            })
            .collect()
    }
}
