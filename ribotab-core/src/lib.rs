//! # Core models for ribotab
//!
//! Plain data types shared by the conversion pipelines: aligned reads as they come out of an
//! alignment source, the single site each accepted read is reduced to, the partition keys that
//! decide which output table a site lands in, and the sorted per-reference count tables that are
//! written to disk.
//!
pub mod errors;
pub mod models;
pub mod utils;

// re-expose core types
pub use errors::*;
pub use models::*;
