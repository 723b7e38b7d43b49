//! Layout of the pack archive format.
//!
//! ```text
//! archive := MAGIC VERSION record* END_TAG record_count:u64le
//! record  := RECORD_TAG header:bincode(EntryHeader) payload:zstd
//! ```

use std::hash::Hasher;

use bincode::config::Config;
use bincode::{Decode, Encode};
use metrohash::MetroHash64;

pub(crate) const MAGIC: &[u8; 4] = b"PKTR";
pub(crate) const VERSION: u8 = 1;
pub(crate) const RECORD_TAG: u8 = 1;
pub(crate) const END_TAG: u8 = 0;

const MAX_HEADER_SIZE: usize = 64 * 1024;

pub(crate) const DEFAULT_COMPRESSION_LEVEL: i32 = 3;
pub(crate) const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub(crate) struct EntryHeader {
    pub(crate) path: String,
    pub(crate) is_directory: bool,
    pub(crate) uncompressed_size: u64,
    pub(crate) compressed_size: u64,
    pub(crate) checksum: u64,
}

pub(crate) fn header_config() -> impl Config {
    bincode::config::standard().with_limit::<MAX_HEADER_SIZE>()
}

pub(crate) fn checksum(data: &[u8]) -> u64 {
    let mut hasher = MetroHash64::default();
    hasher.write(data);
    hasher.finish()
}

/// Tuning of the pack writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackOptions {
    /// zstd compression level.
    pub compression_level: i32,
    /// Number of payload bytes compressed between two progress reports.
    pub chunk_size: usize,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
