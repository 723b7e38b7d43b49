use super::ArchiveError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPayload {
    Directory,
    File(Vec<u8>),
}

/// Appends entries to an archive one at a time.
///
/// Each `add_entry` call must complete before the next one starts; `close`
/// finalizes the archive and hands back whatever the writer produced.
pub trait ArchiveWriter {
    type Output;

    /// Appends one entry, reporting the number of payload bytes consumed so far.
    async fn add_entry(
        &mut self,
        path: &str,
        payload: EntryPayload,
        on_progress: &mut dyn FnMut(u64),
    ) -> Result<(), ArchiveError>;

    async fn close(self) -> Result<Self::Output, ArchiveError>
    where
        Self: Sized;
}
