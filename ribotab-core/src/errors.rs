use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ModelError {
    #[error("Unknown strand tag: {0}. It must be one of `fwd`, `rev`, `+` or `-`")]
    UnknownStrand(String),

    #[error("Aligned blocks must be non-empty, ordered and non-overlapping (read on {0})")]
    InvalidBlocks(String),
}
