use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use ribotab_core::models::{CountTable, OutputArtifact, Partition};

use crate::errors::{ConvertError, PartitionError, Result};

///
/// Where a run puts its tables: a directory plus the stem every table name is derived from.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub directory: PathBuf,
    pub stem: String,
}

impl TableLayout {
    pub fn new(directory: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        TableLayout {
            directory: directory.into(),
            stem: stem.into(),
        }
    }

    pub fn table_path<P: Partition>(&self, partition: &P) -> PathBuf {
        self.directory.join(partition.table_name(&self.stem))
    }

    /// Common prefix of all table paths, `<directory>/<stem>`
    pub fn prefix(&self) -> PathBuf {
        self.directory.join(&self.stem)
    }
}

enum StreamState {
    Open(BufWriter<File>),
    Failed(io::Error),
}

struct PartitionStream {
    path: PathBuf,
    state: StreamState,
    /// the raw table at `path` was created by this run
    created: bool,
}

impl PartitionStream {
    fn fail(&mut self, err: io::Error) {
        warn!("Giving up on count table {:?}: {}", self.path, err);
        // the handle is dropped before the partial file is removed
        self.state = StreamState::Failed(err);
        remove_partial(&self.path);
    }
}

pub(crate) fn remove_partial(path: &Path) {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => {
            debug!("Could not remove {:?}: {}", path, err);
        }
        _ => {}
    }
}

///
/// Remove the compressed table and its index sitting at the canonical paths of `table`, so an
/// earlier run's `.gz` or `.tbi` is never mistaken for the output of a failed one.
///
pub fn remove_artifacts(table: &Path) {
    let artifact = OutputArtifact::new(table);
    remove_partial(&artifact.index());
    remove_partial(&artifact.compressed());
}

///
/// Owns one open output stream per partition for the duration of a scan.
///
/// All streams are opened up front, so the set of tables a run produces only depends on the
/// partitions it was configured with. A failing partition is closed and its file removed while
/// the other partitions keep going. Handles are released when the writer is closed, discarded or
/// dropped.
///
pub struct TableWriter<P: Partition> {
    streams: BTreeMap<P, PartitionStream>,
}

impl<P: Partition> TableWriter<P> {
    ///
    /// Create the output directory and open a table for every partition.
    ///
    /// # Arguments
    /// - layout: output directory and file stem
    /// - partitions: every partition the run can produce
    ///
    pub fn create(layout: &TableLayout, partitions: &[P]) -> Result<Self> {
        fs::create_dir_all(&layout.directory).map_err(|source| ConvertError::OutputDirectory {
            path: layout.directory.clone(),
            source,
        })?;

        let mut streams = BTreeMap::new();
        for partition in partitions {
            let path = layout.table_path(partition);
            let (state, created) = match File::create(&path) {
                Ok(file) => (StreamState::Open(BufWriter::new(file)), true),
                Err(err) => {
                    warn!("Can't open count table {:?}: {}", path, err);
                    (StreamState::Failed(err), false)
                }
            };
            streams.insert(
                *partition,
                PartitionStream {
                    path,
                    state,
                    created,
                },
            );
        }

        Ok(TableWriter { streams })
    }

    pub fn path(&self, partition: &P) -> Option<&Path> {
        self.streams.get(partition).map(|stream| stream.path.as_path())
    }

    ///
    /// Append a flushed table to its partition's stream. Returns `false` if the partition is
    /// unknown or has already failed.
    ///
    pub fn append(&mut self, partition: &P, table: &CountTable) -> bool {
        let Some(stream) = self.streams.get_mut(partition) else {
            return false;
        };

        let result = match &mut stream.state {
            StreamState::Open(writer) => table.write_to(writer),
            StreamState::Failed(_) => return false,
        };

        match result {
            Ok(()) => true,
            Err(err) => {
                stream.fail(err);
                false
            }
        }
    }

    ///
    /// Flush and close every stream. Partitions that failed at any point come back as errors and
    /// keep no file this run wrote.
    ///
    pub fn close(self) -> Vec<(P, std::result::Result<PathBuf, PartitionError>)> {
        self.streams
            .into_iter()
            .map(|(partition, stream)| {
                let PartitionStream { path, state, .. } = stream;
                let result = match state {
                    StreamState::Open(mut writer) => match writer.flush() {
                        Ok(()) => Ok(path),
                        Err(err) => {
                            drop(writer);
                            remove_partial(&path);
                            Err(PartitionError::TableWrite { path, source: err })
                        }
                    },
                    // a failed append already removed its file, a failed open never made one
                    StreamState::Failed(err) => Err(PartitionError::TableWrite { path, source: err }),
                };
                (partition, result)
            })
            .collect()
    }

    ///
    /// Close every stream, delete every table this run created and any compressed table or index
    /// left at the same paths. Used when a run aborts, so no half-written table is ever mistaken
    /// for output.
    ///
    pub fn discard(self) {
        for (_, stream) in self.streams {
            let PartitionStream {
                path,
                state,
                created,
            } = stream;
            drop(state);
            if created {
                remove_partial(&path);
            }
            remove_artifacts(&path);
        }
    }
}
