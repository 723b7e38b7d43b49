use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use super::{EntryKind, NodeRef, PATH_SEPARATOR, Tree};
use crate::archive::{ArchiveError, ArchiveWriter, EntryPayload};
use crate::source::{DataSource, DataSourceTrait, SourceError};

impl Tree {
    /// Writes every entry of the tree through `writer` and closes it.
    ///
    /// Entries are written depth-first in pre-order, directories before their
    /// contents and siblings in insertion order, one at a time. `on_progress`
    /// receives `(bytes_done, total_bytes)` where the total is the tree's size
    /// at the start of the export. Any failure aborts the export and the
    /// partially written output should be discarded.
    pub async fn export_to<W: ArchiveWriter>(
        &self,
        mut writer: W,
        on_progress: impl FnMut(u64, u64),
    ) -> Result<W::Output, ExportError> {
        self.export_entries(&mut writer, on_progress).await?;
        writer.close().await.context(CloseSnafu)
    }

    /// Same as [`Tree::export_to`] but leaves closing the writer to the caller.
    /// Returns the number of entries written.
    pub async fn export_entries<W: ArchiveWriter>(
        &self,
        writer: &mut W,
        on_progress: impl FnMut(u64, u64),
    ) -> Result<usize, ExportError> {
        Exporter::new(self, writer, on_progress).run().await
    }
}

/// Sequential pre-order writer with a byte counter shared by the whole traversal.
struct Exporter<'a, W, P> {
    tree: &'a Tree,
    writer: &'a mut W,
    on_progress: P,
    running: u64,
    total: u64,
}

impl<'a, W, P> Exporter<'a, W, P>
where
    W: ArchiveWriter,
    P: FnMut(u64, u64),
{
    fn new(tree: &'a Tree, writer: &'a mut W, on_progress: P) -> Self {
        Self {
            tree,
            writer,
            on_progress,
            running: 0,
            total: tree.root().total_size(),
        }
    }

    async fn run(mut self) -> Result<usize, ExportError> {
        debug!("Exporting tree of {} bytes", self.total);
        let tree = self.tree;
        let mut written = 0;
        for node in tree.walk() {
            match node.entry().kind() {
                EntryKind::Directory => self.write_directory(node).await?,
                EntryKind::File { size, source } => {
                    self.write_file(node, *size, source).await?
                }
            }
            written += 1;
        }

        (self.on_progress)(self.running, self.total);
        info!("Exported {} entries ({} bytes)", written, self.running);
        Ok(written)
    }

    async fn write_directory(&mut self, node: NodeRef<'_>) -> Result<(), ExportError> {
        let path = format!("{}{}", node.full_path(), PATH_SEPARATOR);
        debug!("Writing directory '{}'", path);
        self.writer
            .add_entry(&path, EntryPayload::Directory, &mut |_| {})
            .await
            .context(WriteEntrySnafu { path })
    }

    async fn write_file(
        &mut self,
        node: NodeRef<'_>,
        size: u64,
        source: &DataSource,
    ) -> Result<(), ExportError> {
        let path = node.full_path();
        let data = source
            .get_data(&mut |_| {})
            .await
            .context(DataSourceSnafu { path: path.as_str() })?;
        debug!("Writing file '{}' ({} bytes)", path, size);

        let running = self.running;
        let total = self.total;
        let on_progress = &mut self.on_progress;
        let mut report = |written: u64| on_progress(running + written.min(size), total);
        self.writer
            .add_entry(&path, EntryPayload::File(data), &mut report)
            .await
            .context(WriteEntrySnafu { path })?;

        self.running += size;
        (self.on_progress)(self.running, self.total);
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ExportError {
    #[snafu(display("Failed to read the data of '{}'", path))]
    DataSourceError { path: String, source: SourceError },
    #[snafu(display("Failed to write archive entry '{}'", path))]
    WriteEntryError { path: String, source: ArchiveError },
    #[snafu(display("Failed to finalize the archive"))]
    CloseError { source: ArchiveError },
}
