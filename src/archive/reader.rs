use std::fmt;

use super::ArchiveError;
use crate::source::DataSource;

/// One entry as listed by an archive, before it is placed in a tree.
#[derive(Debug, Clone)]
pub struct EntryDescriptor {
    /// Slash-delimited path; directory entries conventionally end with a slash.
    pub path: String,
    pub kind: DescriptorKind,
}

#[derive(Debug, Clone)]
pub enum DescriptorKind {
    Directory,
    File {
        uncompressed_size: u64,
        source: DataSource,
    },
}

impl EntryDescriptor {
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: DescriptorKind::Directory,
        }
    }

    pub fn file(path: impl Into<String>, uncompressed_size: u64, source: impl Into<DataSource>) -> Self {
        Self {
            path: path.into(),
            kind: DescriptorKind::File {
                uncompressed_size,
                source: source.into(),
            },
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, DescriptorKind::Directory)
    }
}

/// Lists the entries of an archive.
pub trait ArchiveReader {
    async fn entries(&mut self) -> Result<Vec<EntryDescriptor>, ArchiveError>;
}

/// Decodes the bytes of one archived entry on demand.
pub trait EntryContent: fmt::Debug {
    fn read(&self, on_progress: &mut dyn FnMut(u64)) -> Result<Vec<u8>, ArchiveError>;
}
