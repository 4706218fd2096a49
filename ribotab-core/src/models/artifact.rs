use std::path::{Path, PathBuf};

use crate::utils::append_extension;

pub const COMPRESSED_EXTENSION: &str = "gz";
pub const INDEX_EXTENSION: &str = "tbi";

///
/// Paths belonging to one partition's output: the raw table, its bgzip compressed form and the
/// tabix index next to it. The compressed table is the canonical output.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct OutputArtifact {
    table: PathBuf,
}

impl OutputArtifact {
    pub fn new(table: impl Into<PathBuf>) -> Self {
        OutputArtifact {
            table: table.into(),
        }
    }

    /// Raw, uncompressed table (removed by the compressor once it succeeds)
    pub fn table(&self) -> &Path {
        &self.table
    }

    /// `<table>.gz`
    pub fn compressed(&self) -> PathBuf {
        append_extension(&self.table, COMPRESSED_EXTENSION)
    }

    /// `<table>.gz.tbi`
    pub fn index(&self) -> PathBuf {
        append_extension(&self.compressed(), INDEX_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_derived_paths() {
        let artifact = OutputArtifact::new("out/tabix/sample.fwd.len28.tbx");

        assert_eq!(
            artifact.compressed(),
            PathBuf::from("out/tabix/sample.fwd.len28.tbx.gz")
        );
        assert_eq!(
            artifact.index(),
            PathBuf::from("out/tabix/sample.fwd.len28.tbx.gz.tbi")
        );
    }
}
