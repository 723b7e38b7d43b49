//! Archive doubles for exercising import and export without a real codec.

use super::{
    ArchiveError, ArchiveReader, ArchiveWriter, EntryContent, EntryDescriptor, EntryPayload,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedEntry {
    pub(crate) path: String,
    pub(crate) payload: EntryPayload,
}

/// Keeps every entry it is handed, reporting progress in two steps per file.
#[derive(Debug, Default)]
pub(crate) struct RecordingWriter {
    pub(crate) entries: Vec<RecordedEntry>,
}

impl RecordingWriter {
    pub(crate) fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.path.as_str()).collect()
    }
}

impl ArchiveWriter for RecordingWriter {
    type Output = Vec<RecordedEntry>;

    async fn add_entry(
        &mut self,
        path: &str,
        payload: EntryPayload,
        on_progress: &mut dyn FnMut(u64),
    ) -> Result<(), ArchiveError> {
        if let EntryPayload::File(data) = &payload {
            let len = data.len() as u64;
            on_progress(len / 2);
            on_progress(len);
        }
        self.entries.push(RecordedEntry {
            path: path.to_string(),
            payload,
        });
        Ok(())
    }

    async fn close(self) -> Result<Vec<RecordedEntry>, ArchiveError> {
        Ok(self.entries)
    }
}

/// Fails when asked to write the entry at `fail_on`.
#[derive(Debug)]
pub(crate) struct FailingWriter {
    pub(crate) fail_on: String,
    pub(crate) written: Vec<String>,
}

impl FailingWriter {
    pub(crate) fn new(fail_on: &str) -> Self {
        Self {
            fail_on: fail_on.to_string(),
            written: Vec::new(),
        }
    }
}

impl ArchiveWriter for FailingWriter {
    type Output = ();

    async fn add_entry(
        &mut self,
        path: &str,
        _payload: EntryPayload,
        _on_progress: &mut dyn FnMut(u64),
    ) -> Result<(), ArchiveError> {
        if path == self.fail_on {
            return Err(ArchiveError::CompressError {
                path: path.to_string(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.written.push(path.to_string());
        Ok(())
    }

    async fn close(self) -> Result<(), ArchiveError> {
        Ok(())
    }
}

/// Hands out a fixed list of descriptors, or fails like a malformed archive.
#[derive(Debug)]
pub(crate) struct DescriptorReader {
    descriptors: Option<Vec<EntryDescriptor>>,
}

impl DescriptorReader {
    pub(crate) fn new(descriptors: Vec<EntryDescriptor>) -> Self {
        Self {
            descriptors: Some(descriptors),
        }
    }

    pub(crate) fn malformed() -> Self {
        Self { descriptors: None }
    }
}

impl ArchiveReader for DescriptorReader {
    async fn entries(&mut self) -> Result<Vec<EntryDescriptor>, ArchiveError> {
        self.descriptors
            .take()
            .ok_or(ArchiveError::InvalidMagicError)
    }
}

/// Archived content whose stored bytes never match their checksum.
#[derive(Debug)]
pub(crate) struct BrokenContent;

impl EntryContent for BrokenContent {
    fn read(&self, _on_progress: &mut dyn FnMut(u64)) -> Result<Vec<u8>, ArchiveError> {
        Err(ArchiveError::ChecksumMismatchError {
            path: "broken".to_string(),
        })
    }
}
