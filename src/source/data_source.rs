use derive_more::From;
use snafu::Snafu;

use crate::archive::ArchiveError;
use crate::source::{ArchivedSource, BufferSource, DataUriSource, TextSource};

pub trait DataSourceTrait {
    /// Size in bytes of the content this source yields.
    fn size(&self) -> u64;
    /// Produces the full content, reporting the number of bytes made available so far.
    async fn get_data(&self, on_progress: &mut dyn FnMut(u64)) -> Result<Vec<u8>, SourceError>;
}

#[derive(Debug, Clone, From)]
pub enum DataSource {
    Buffer(BufferSource),
    Text(TextSource),
    DataUri(DataUriSource),
    Archived(ArchivedSource),
}

impl DataSourceTrait for DataSource {
    fn size(&self) -> u64 {
        match self {
            DataSource::Buffer(source) => source.size(),
            DataSource::Text(source) => source.size(),
            DataSource::DataUri(source) => source.size(),
            DataSource::Archived(source) => source.size(),
        }
    }

    async fn get_data(&self, on_progress: &mut dyn FnMut(u64)) -> Result<Vec<u8>, SourceError> {
        match self {
            DataSource::Buffer(source) => source.get_data(on_progress).await,
            DataSource::Text(source) => source.get_data(on_progress).await,
            DataSource::DataUri(source) => source.get_data(on_progress).await,
            DataSource::Archived(source) => source.get_data(on_progress).await,
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SourceError {
    #[snafu(display("Malformed data URI: {}", reason))]
    InvalidDataUriError { reason: String },
    #[snafu(display("Failed to decode base64 payload of data URI"))]
    DataUriDecodeError { source: base64::DecodeError },
    #[snafu(display("Failed to read archived entry"))]
    ArchivedReadError { source: ArchiveError },
}
