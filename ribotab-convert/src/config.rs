use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_READ_LENGTHS, MIN_MAPPING_QUALITY};

///
/// Resolved parameters of a conversion run. Everything but the output directory has a default,
/// so a config file only needs to name where the tables go.
///
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct ConvertConfig {
    pub output_directory: PathBuf,
    #[serde(default)]
    pub bgzip_path: Option<PathBuf>,
    #[serde(default)]
    pub tabix_path: Option<PathBuf>,
    #[serde(default = "default_read_lengths")]
    pub read_lengths: Vec<u32>,
    #[serde(default = "default_min_mapping_quality")]
    pub min_mapping_quality: u8,
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_read_lengths() -> Vec<u32> {
    DEFAULT_READ_LENGTHS.to_vec()
}

fn default_min_mapping_quality() -> u8 {
    MIN_MAPPING_QUALITY
}

fn default_threads() -> usize {
    1
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl ConvertConfig {
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        ConvertConfig {
            output_directory: output_directory.into(),
            bgzip_path: None,
            tabix_path: None,
            read_lengths: default_read_lengths(),
            min_mapping_quality: default_min_mapping_quality(),
            threads: default_threads(),
        }
    }

    ///
    /// Configured footprint lengths, sorted and without duplicates. An empty list falls back to
    /// the default lengths.
    ///
    pub fn normalized_read_lengths(&self) -> Vec<u32> {
        let mut lengths = if self.read_lengths.is_empty() {
            default_read_lengths()
        } else {
            self.read_lengths.clone()
        };
        lengths.sort_unstable();
        lengths.dedup();
        lengths
    }

    /// Directory the raw and compressed tables are written to
    pub fn tabix_directory(&self) -> PathBuf {
        self.output_directory.join(crate::consts::TABIX_SUBFOLDER)
    }
}

impl TryFrom<&Path> for ConvertConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config = toml::from_str(&toml_str)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    fn test_minimal_toml_uses_defaults() {
        let config: ConvertConfig = toml::from_str(r#"output_directory = "out""#).unwrap();

        assert_eq!(config, ConvertConfig::new("out"));
        assert_eq!(config.min_mapping_quality, 10);
        assert_eq!(config.read_lengths, vec![28, 29, 30, 31]);
        assert_eq!(config.tabix_directory(), PathBuf::from("out/tabix"));
    }

    #[rstest]
    fn test_try_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "output_directory = \"results\"\nread_lengths = [31, 28, 28]\nbgzip_path = \"/opt/htslib/bin/bgzip\"\nthreads = 4"
        )
        .unwrap();

        let config = ConvertConfig::try_from(file.path()).unwrap();

        assert_eq!(config.normalized_read_lengths(), vec![28, 31]);
        assert_eq!(
            config.bgzip_path,
            Some(PathBuf::from("/opt/htslib/bin/bgzip"))
        );
        assert_eq!(config.tabix_path, None);
        assert_eq!(config.threads, 4);
    }

    #[rstest]
    fn test_empty_read_lengths_fall_back_to_defaults() {
        let mut config = ConvertConfig::new("out");
        config.read_lengths = vec![];
        assert_eq!(config.normalized_read_lengths(), vec![28, 29, 30, 31]);
    }

    #[rstest]
    fn test_missing_output_directory_is_an_error() {
        let config = toml::from_str::<ConvertConfig>("threads = 2");
        assert_eq!(config.is_err(), true);
    }
}
