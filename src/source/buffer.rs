use std::sync::Arc;

use super::{DataSourceTrait, SourceError};

/// Bytes already held in memory.
#[derive(Debug, Clone)]
pub struct BufferSource {
    bytes: Arc<[u8]>,
}

impl BufferSource {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl DataSourceTrait for BufferSource {
    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    async fn get_data(&self, on_progress: &mut dyn FnMut(u64)) -> Result<Vec<u8>, SourceError> {
        on_progress(self.size());
        Ok(self.bytes.to_vec())
    }
}

/// UTF-8 text; its size is the encoded byte length.
#[derive(Debug, Clone)]
pub struct TextSource {
    text: Arc<str>,
}

impl TextSource {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl DataSourceTrait for TextSource {
    fn size(&self) -> u64 {
        self.text.len() as u64
    }

    async fn get_data(&self, on_progress: &mut dyn FnMut(u64)) -> Result<Vec<u8>, SourceError> {
        on_progress(self.size());
        Ok(self.text.as_bytes().to_vec())
    }
}
