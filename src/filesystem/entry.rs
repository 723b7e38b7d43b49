use crate::source::{DataSource, DataSourceTrait};

/// Payload of an entry: a directory, or a file with its declared size and data source
#[derive(Debug, Clone)]
pub enum EntryKind {
    Directory,
    File { size: u64, source: DataSource },
}

/// Metadata of a single directory or file before it is attached to a tree.
#[derive(Debug, Clone)]
pub struct Entry {
    name: String,
    kind: EntryKind,
}

impl Entry {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }

    /// Creates a file entry whose size is taken from the data source.
    pub fn file(name: impl Into<String>, source: impl Into<DataSource>) -> Self {
        let source = source.into();
        let size = source.size();
        Self::file_with_size(name, size, source)
    }

    /// Creates a file entry with an explicitly declared size, e.g. the
    /// uncompressed size recorded in an archive.
    pub fn file_with_size(name: impl Into<String>, size: u64, source: impl Into<DataSource>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File {
                size,
                source: source.into(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    /// Declared size of the entry itself. Directories always report 0.
    pub fn size(&self) -> u64 {
        match &self.kind {
            EntryKind::Directory => 0,
            EntryKind::File { size, .. } => *size,
        }
    }

    pub fn source(&self) -> Option<&DataSource> {
        match &self.kind {
            EntryKind::Directory => None,
            EntryKind::File { source, .. } => Some(source),
        }
    }
}
