use std::sync::Arc;

use snafu::ResultExt;

use super::data_source::ArchivedReadSnafu;
use super::{DataSourceTrait, SourceError};
use crate::archive::EntryContent;

/// Lazily decoded content of an entry inside an opened archive.
#[derive(Debug, Clone)]
pub struct ArchivedSource {
    content: Arc<dyn EntryContent>,
    size: u64,
}

impl ArchivedSource {
    pub fn new(content: Arc<dyn EntryContent>, uncompressed_size: u64) -> Self {
        Self {
            content,
            size: uncompressed_size,
        }
    }
}

impl DataSourceTrait for ArchivedSource {
    fn size(&self) -> u64 {
        self.size
    }

    async fn get_data(&self, on_progress: &mut dyn FnMut(u64)) -> Result<Vec<u8>, SourceError> {
        self.content.read(on_progress).context(ArchivedReadSnafu)
    }
}
