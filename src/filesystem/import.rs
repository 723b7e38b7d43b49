use snafu::{ResultExt, Snafu};
use tracing::{debug, info, warn};

use super::{Entry, PATH_SEPARATOR, Tree, TreeError};
use crate::archive::{ArchiveError, ArchiveReader, DescriptorKind, EntryDescriptor};

impl Tree {
    /// Replaces the content of this tree with the entries listed by `reader`.
    ///
    /// The tree is reset first, so previous nodes and identifiers are gone even
    /// if the import fails; a failed import leaves a tree that should be discarded.
    /// Directories referenced only through descendant paths are created on the
    /// fly. `on_progress` receives `(processed, total)` descriptor counts.
    pub async fn import_from<R: ArchiveReader>(
        &mut self,
        reader: &mut R,
        mut on_progress: impl FnMut(usize, usize),
    ) -> Result<(), ImportError> {
        self.reset();
        let descriptors = reader.entries().await.context(ReadEntriesSnafu)?;
        let total = descriptors.len();
        debug!("Importing {} archive entries", total);

        for (index, descriptor) in descriptors.into_iter().enumerate() {
            let path = descriptor.path.clone();
            self.insert_descriptor(descriptor)
                .context(StructureSnafu { path })?;
            on_progress(index + 1, total);
        }

        info!(
            "Imported {} entries into {} nodes ({} bytes)",
            total,
            self.len(),
            self.root().total_size()
        );
        Ok(())
    }

    fn insert_descriptor(&mut self, descriptor: EntryDescriptor) -> Result<(), TreeError> {
        let EntryDescriptor { path, kind } = descriptor;
        let mut segments: Vec<&str> = path
            .split(PATH_SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .collect();
        let Some(name) = segments.pop() else {
            warn!("Skipping archive entry with empty path '{}'", path);
            return Ok(());
        };

        let parent = segments
            .into_iter()
            .try_fold(self.root_id(), |parent, segment| {
                self.ensure_directory(parent, segment)
            })?;

        match kind {
            DescriptorKind::File {
                uncompressed_size,
                source,
            } if !path.ends_with(PATH_SEPARATOR) => {
                self.add_entry(parent, Entry::file_with_size(name, uncompressed_size, source))?;
            }
            _ => {
                self.ensure_directory(parent, name)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ImportError {
    #[snafu(display("Failed to read the archive entries"))]
    ReadEntriesError { source: ArchiveError },
    #[snafu(display("Cannot place archive entry '{}' in the tree", path))]
    StructureError { path: String, source: TreeError },
}
