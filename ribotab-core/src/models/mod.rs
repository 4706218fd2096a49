pub mod artifact;
pub mod count_table;
pub mod partition;
pub mod read;
pub mod site;

// re-export for cleaner imports
pub use self::artifact::OutputArtifact;
pub use self::count_table::{CountRow, CountTable};
pub use self::partition::{CountPartition, FootprintPartition, Partition};
pub use self::read::{AlignedBlock, AlignedRead, ReferenceSequence, Strand};
pub use self::site::SiteObservation;
