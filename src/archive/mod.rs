//! Archive collaborators: the reader and writer contracts the tree imports from
//! and exports to, plus the "pack" codec implementing both.

mod error;
mod pack;
mod pack_reader;
mod pack_writer;
mod reader;
mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ArchiveError;
pub use pack::PackOptions;
pub use pack_reader::PackReader;
pub use pack_writer::PackWriter;
pub use reader::{ArchiveReader, DescriptorKind, EntryContent, EntryDescriptor};
pub use writer::{ArchiveWriter, EntryPayload};
