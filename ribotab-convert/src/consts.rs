/// Reads below this mapping quality never contribute a count
pub const MIN_MAPPING_QUALITY: u8 = 10;

/// Footprint lengths used when none are configured
pub const DEFAULT_READ_LENGTHS: [u32; 4] = [28, 29, 30, 31];

// A-site approximation: 13th aligned base from the 5' end of the footprint.
// Forward reads index from the leftmost aligned base, reverse reads from the rightmost.
pub const FORWARD_A_SITE_OFFSET: u64 = 12;
pub const REVERSE_A_SITE_OFFSET: u64 = 12;

/// Subfolder of the output directory that receives the count tables
pub const TABIX_SUBFOLDER: &str = "tabix";

pub const BGZIP_BIN: &str = "bgzip";
pub const TABIX_BIN: &str = "tabix";

pub const BAM_INDEX_EXTENSION: &str = "bai";
