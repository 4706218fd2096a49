use std::ffi::OsString;
use std::path::{Path, PathBuf};

///
/// Append an extension to a path without replacing an existing one,
/// e.g. `sample.tbx` + `gz` -> `sample.tbx.gz`.
///
pub fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut path: OsString = path.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

///
/// Base name of an input file with its last extension removed. Only the final extension goes, so
/// `reads.sorted.bam` becomes `reads.sorted`.
///
pub fn source_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
}
