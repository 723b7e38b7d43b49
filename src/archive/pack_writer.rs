use std::io::Write;

use snafu::ResultExt;
use tracing::debug;

use super::error::{CompressSnafu, HeaderEncodeSnafu};
use super::pack::{END_TAG, EntryHeader, MAGIC, RECORD_TAG, VERSION, checksum, header_config};
use super::{ArchiveError, ArchiveWriter, EntryPayload, PackOptions};

/// Writes a pack archive into memory.
#[derive(Debug)]
pub struct PackWriter {
    buffer: Vec<u8>,
    records: u64,
    options: PackOptions,
}

impl PackWriter {
    pub fn new(options: PackOptions) -> Self {
        let mut buffer = Vec::with_capacity(MAGIC.len() + 1);
        buffer.extend_from_slice(MAGIC);
        buffer.push(VERSION);
        Self {
            buffer,
            records: 0,
            options,
        }
    }

    fn compress(
        &self,
        path: &str,
        data: &[u8],
        on_progress: &mut dyn FnMut(u64),
    ) -> Result<Vec<u8>, ArchiveError> {
        let mut encoder = zstd::stream::write::Encoder::new(Vec::new(), self.options.compression_level)
            .context(CompressSnafu { path })?;

        let mut consumed = 0u64;
        for chunk in data.chunks(self.options.chunk_size.max(1)) {
            encoder.write_all(chunk).context(CompressSnafu { path })?;
            consumed += chunk.len() as u64;
            on_progress(consumed);
        }

        encoder.finish().context(CompressSnafu { path })
    }

    fn push_record(&mut self, header: &EntryHeader, payload: &[u8]) -> Result<(), ArchiveError> {
        let encoded = bincode::encode_to_vec(header, header_config()).context(HeaderEncodeSnafu {
            path: header.path.as_str(),
        })?;
        self.buffer.push(RECORD_TAG);
        self.buffer.extend_from_slice(&encoded);
        self.buffer.extend_from_slice(payload);
        self.records += 1;
        Ok(())
    }
}

impl Default for PackWriter {
    fn default() -> Self {
        Self::new(PackOptions::default())
    }
}

impl ArchiveWriter for PackWriter {
    type Output = Vec<u8>;

    async fn add_entry(
        &mut self,
        path: &str,
        payload: EntryPayload,
        on_progress: &mut dyn FnMut(u64),
    ) -> Result<(), ArchiveError> {
        let (header, compressed) = match payload {
            EntryPayload::Directory => (
                EntryHeader {
                    path: path.to_string(),
                    is_directory: true,
                    uncompressed_size: 0,
                    compressed_size: 0,
                    checksum: checksum(&[]),
                },
                Vec::new(),
            ),
            EntryPayload::File(data) => {
                let compressed = self.compress(path, &data, on_progress)?;
                (
                    EntryHeader {
                        path: path.to_string(),
                        is_directory: false,
                        uncompressed_size: data.len() as u64,
                        compressed_size: compressed.len() as u64,
                        checksum: checksum(&data),
                    },
                    compressed,
                )
            }
        };

        debug!(
            "Packing '{}': {} bytes, {} compressed",
            path, header.uncompressed_size, header.compressed_size
        );
        self.push_record(&header, &compressed)
    }

    async fn close(mut self) -> Result<Vec<u8>, ArchiveError> {
        self.buffer.push(END_TAG);
        self.buffer.extend_from_slice(&self.records.to_le_bytes());
        debug!("Closed pack archive with {} records", self.records);
        Ok(self.buffer)
    }
}
