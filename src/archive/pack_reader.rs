use std::fmt;
use std::io::Read;
use std::ops::Range;
use std::sync::Arc;

use snafu::{OptionExt, ResultExt, ensure};
use tracing::debug;

use super::error::{
    ChecksumMismatchSnafu, DecompressSnafu, HeaderDecodeSnafu, InvalidMagicSnafu,
    RecordCountMismatchSnafu, SizeMismatchSnafu, TruncatedSnafu, UnknownRecordSnafu,
    UnsupportedVersionSnafu,
};
use super::pack::{END_TAG, EntryHeader, MAGIC, RECORD_TAG, VERSION, checksum, header_config};
use super::{ArchiveError, ArchiveReader, EntryContent, EntryDescriptor};
use crate::source::ArchivedSource;

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Reads a pack archive held in memory. Entry contents stay compressed until
/// their data source is read.
#[derive(Debug, Clone)]
pub struct PackReader {
    archive: Arc<[u8]>,
}

impl PackReader {
    pub fn new(archive: impl Into<Arc<[u8]>>) -> Self {
        Self {
            archive: archive.into(),
        }
    }

    fn parse(&self) -> Result<Vec<EntryDescriptor>, ArchiveError> {
        let bytes = &self.archive[..];
        ensure!(bytes.len() >= MAGIC.len() + 1, TruncatedSnafu { offset: bytes.len() });
        ensure!(bytes.starts_with(MAGIC), InvalidMagicSnafu);
        let version = bytes[MAGIC.len()];
        ensure!(version == VERSION, UnsupportedVersionSnafu { version });

        let mut offset = MAGIC.len() + 1;
        let mut descriptors = Vec::new();
        loop {
            let tag = *bytes.get(offset).context(TruncatedSnafu { offset })?;
            offset += 1;
            match tag {
                RECORD_TAG => {
                    let (header, consumed): (EntryHeader, usize) =
                        bincode::decode_from_slice(&bytes[offset..], header_config())
                            .context(HeaderDecodeSnafu { offset })?;
                    offset += consumed;
                    let end = usize::try_from(header.compressed_size)
                        .ok()
                        .and_then(|size| offset.checked_add(size))
                        .filter(|&end| end <= bytes.len())
                        .context(TruncatedSnafu { offset })?;
                    descriptors.push(self.descriptor(header, offset..end));
                    offset = end;
                }
                END_TAG => {
                    let count: [u8; 8] = bytes
                        .get(offset..offset + 8)
                        .and_then(|slice| slice.try_into().ok())
                        .context(TruncatedSnafu { offset })?;
                    let expected = u64::from_le_bytes(count);
                    let actual = descriptors.len() as u64;
                    ensure!(expected == actual, RecordCountMismatchSnafu { expected, actual });
                    debug!("Read {} entries from pack archive", actual);
                    return Ok(descriptors);
                }
                tag => {
                    return UnknownRecordSnafu {
                        tag,
                        offset: offset - 1,
                    }
                    .fail();
                }
            }
        }
    }

    fn descriptor(&self, header: EntryHeader, range: Range<usize>) -> EntryDescriptor {
        if header.is_directory {
            return EntryDescriptor::directory(header.path);
        }
        let uncompressed_size = header.uncompressed_size;
        let path = header.path.clone();
        let content = PackedEntry {
            archive: Arc::clone(&self.archive),
            range,
            header,
        };
        EntryDescriptor::file(
            path,
            uncompressed_size,
            ArchivedSource::new(Arc::new(content), uncompressed_size),
        )
    }
}

impl ArchiveReader for PackReader {
    async fn entries(&mut self) -> Result<Vec<EntryDescriptor>, ArchiveError> {
        self.parse()
    }
}

struct PackedEntry {
    archive: Arc<[u8]>,
    range: Range<usize>,
    header: EntryHeader,
}

impl fmt::Debug for PackedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedEntry")
            .field("range", &self.range)
            .field("header", &self.header)
            .finish()
    }
}

impl EntryContent for PackedEntry {
    fn read(&self, on_progress: &mut dyn FnMut(u64)) -> Result<Vec<u8>, ArchiveError> {
        let path = self.header.path.as_str();
        let expected = self.header.uncompressed_size;
        let compressed = &self.archive[self.range.clone()];

        // One byte past the declared size is enough to detect oversized payloads.
        let mut decoder = zstd::stream::read::Decoder::new(compressed)
            .context(DecompressSnafu { path })?
            .take(expected.saturating_add(1));

        // The declared size is untrusted until the payload has been decoded.
        let mut data = Vec::with_capacity(expected.min(READ_CHUNK_SIZE as u64) as usize);
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        loop {
            let read = decoder.read(&mut chunk).context(DecompressSnafu { path })?;
            if read == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..read]);
            on_progress(data.len() as u64);
        }

        let actual = data.len() as u64;
        ensure!(actual == expected, SizeMismatchSnafu { path, expected, actual });
        ensure!(checksum(&data) == self.header.checksum, ChecksumMismatchSnafu { path });
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveWriter, DescriptorKind, EntryPayload, PackOptions, PackWriter};
    use crate::source::DataSourceTrait;

    async fn sample_archive(options: PackOptions) -> Vec<u8> {
        let mut writer = PackWriter::new(options);
        writer
            .add_entry("docs/", EntryPayload::Directory, &mut |_| {})
            .await
            .unwrap();
        writer
            .add_entry(
                "docs/readme.md",
                EntryPayload::File(b"# Title\n\nBody text.\n".to_vec()),
                &mut |_| {},
            )
            .await
            .unwrap();
        writer
            .add_entry("empty.txt", EntryPayload::File(Vec::new()), &mut |_| {})
            .await
            .unwrap();
        writer.close().await.unwrap()
    }

    async fn read_file(descriptor: &EntryDescriptor) -> Result<Vec<u8>, crate::source::SourceError> {
        match &descriptor.kind {
            DescriptorKind::File { source, .. } => source.get_data(&mut |_| {}).await,
            DescriptorKind::Directory => panic!("Expected a file descriptor"),
        }
    }

    #[compio::test]
    async fn reads_back_written_entries() {
        let bytes = sample_archive(PackOptions::default()).await;
        let mut reader = PackReader::new(bytes);

        let descriptors = reader.entries().await.expect("Archive should parse");

        let paths: Vec<_> = descriptors.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, ["docs/", "docs/readme.md", "empty.txt"]);
        assert!(descriptors[0].is_directory());
        assert!(matches!(
            descriptors[1].kind,
            DescriptorKind::File { uncompressed_size: 20, .. }
        ));
        assert_eq!(read_file(&descriptors[1]).await.unwrap(), b"# Title\n\nBody text.\n");
        assert!(read_file(&descriptors[2]).await.unwrap().is_empty());
    }

    #[compio::test]
    async fn writer_reports_progress_per_chunk() {
        let data = vec![7u8; 10_000];
        let mut writer = PackWriter::new(PackOptions {
            compression_level: 1,
            chunk_size: 4096,
        });
        let mut reported = Vec::new();

        writer
            .add_entry("blob.bin", EntryPayload::File(data), &mut |done| reported.push(done))
            .await
            .unwrap();

        assert_eq!(reported, [4096, 8192, 10_000]);
    }

    #[compio::test]
    async fn reader_reports_progress() {
        let mut writer = PackWriter::default();
        writer
            .add_entry("big.bin", EntryPayload::File(vec![1u8; 200_000]), &mut |_| {})
            .await
            .unwrap();
        let descriptors = PackReader::new(writer.close().await.unwrap())
            .entries()
            .await
            .unwrap();
        let DescriptorKind::File { source, .. } = &descriptors[0].kind else {
            panic!("Expected a file descriptor");
        };

        let mut reported = Vec::new();
        let data = source.get_data(&mut |done| reported.push(done)).await.unwrap();

        assert_eq!(data.len(), 200_000);
        assert!(reported.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(reported.last(), Some(&200_000));
    }

    #[compio::test]
    async fn rejects_bad_magic() {
        let mut reader = PackReader::new(b"ZIPX\x01\x00".to_vec());
        assert!(matches!(reader.entries().await, Err(ArchiveError::InvalidMagicError)));
    }

    #[compio::test]
    async fn rejects_unknown_version() {
        let mut reader = PackReader::new(b"PKTR\x09\x00".to_vec());
        assert!(matches!(
            reader.entries().await,
            Err(ArchiveError::UnsupportedVersionError { version: 9 })
        ));
    }

    #[compio::test]
    async fn rejects_truncated_archive() {
        let bytes = sample_archive(PackOptions::default()).await;
        for cut in [3, 5, bytes.len() / 2, bytes.len() - 1] {
            let mut reader = PackReader::new(bytes[..cut].to_vec());
            assert!(
                reader.entries().await.is_err(),
                "Archive cut at {cut} bytes should not parse"
            );
        }
    }

    #[compio::test]
    async fn rejects_wrong_record_count() {
        let mut bytes = sample_archive(PackOptions::default()).await;
        let len = bytes.len();
        bytes[len - 8..].copy_from_slice(&5u64.to_le_bytes());

        let mut reader = PackReader::new(bytes);

        assert!(matches!(
            reader.entries().await,
            Err(ArchiveError::RecordCountMismatchError { expected: 5, actual: 3 })
        ));
    }

    #[compio::test]
    async fn rejects_unknown_record_tag() {
        let mut reader = PackReader::new(b"PKTR\x01\x07".to_vec());
        assert!(matches!(
            reader.entries().await,
            Err(ArchiveError::UnknownRecordError { tag: 7, offset: 5 })
        ));
    }

    #[compio::test]
    async fn forged_uncompressed_size_is_an_error() {
        let header = EntryHeader {
            path: "huge.bin".to_string(),
            is_directory: false,
            uncompressed_size: u64::MAX / 2,
            compressed_size: 0,
            checksum: checksum(&[]),
        };
        let mut bytes = MAGIC.to_vec();
        bytes.push(VERSION);
        bytes.push(RECORD_TAG);
        bytes.extend(bincode::encode_to_vec(&header, header_config()).unwrap());
        bytes.push(END_TAG);
        bytes.extend_from_slice(&1u64.to_le_bytes());

        let descriptors = PackReader::new(bytes).entries().await.unwrap();

        assert!(read_file(&descriptors[0]).await.is_err());
    }

    #[compio::test]
    async fn detects_corrupted_payload() {
        let mut writer = PackWriter::new(PackOptions {
            compression_level: 0,
            chunk_size: 1024,
        });
        writer
            .add_entry("file.txt", EntryPayload::File(b"abcdefgh".repeat(8)), &mut |_| {})
            .await
            .unwrap();
        let mut bytes = writer.close().await.unwrap();

        let descriptors = PackReader::new(bytes.clone()).entries().await.unwrap();
        assert!(read_file(&descriptors[0]).await.is_ok());

        // Flip a byte inside the compressed payload, just before the trailer.
        let payload_end = bytes.len() - 9;
        bytes[payload_end - 1] ^= 0xFF;
        let descriptors = PackReader::new(bytes).entries().await.unwrap();

        assert!(read_file(&descriptors[0]).await.is_err());
    }
}
