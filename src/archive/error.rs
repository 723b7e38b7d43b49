use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ArchiveError {
    #[snafu(display("Not a pack archive: bad magic bytes"))]
    InvalidMagicError,
    #[snafu(display("Unsupported pack archive version {}", version))]
    UnsupportedVersionError { version: u8 },
    #[snafu(display("Archive is truncated at byte {}", offset))]
    TruncatedError { offset: usize },
    #[snafu(display("Unknown record tag {:#04x} at byte {}", tag, offset))]
    UnknownRecordError { tag: u8, offset: usize },
    #[snafu(display("Archive trailer declares {} records but {} were read", expected, actual))]
    RecordCountMismatchError { expected: u64, actual: u64 },
    #[snafu(display("Failed to encode header of entry '{}'", path))]
    HeaderEncodeError {
        path: String,
        source: bincode::error::EncodeError,
    },
    #[snafu(display("Failed to decode entry header at byte {}", offset))]
    HeaderDecodeError {
        offset: usize,
        source: bincode::error::DecodeError,
    },
    #[snafu(display("Failed to compress entry '{}'", path))]
    CompressError {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to decompress entry '{}'", path))]
    DecompressError {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("Entry '{}' should hold {} bytes but {} were produced", path, expected, actual))]
    SizeMismatchError {
        path: String,
        expected: u64,
        actual: u64,
    },
    #[snafu(display("Checksum mismatch for entry '{}'", path))]
    ChecksumMismatchError { path: String },
}
