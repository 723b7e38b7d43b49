//! In-memory directory tree over the logical contents of an archive.
//!
//! A [`Tree`](filesystem::Tree) owns every directory and file entry through an
//! identifier-indexed registry. Files carry a [`DataSource`](source::DataSource)
//! that produces their bytes on demand, so a tree can be imported from an
//! archive, edited, and exported again without materializing every file up front.

#![allow(clippy::enum_variant_names)]
#![allow(async_fn_in_trait)]

pub mod archive;
pub mod config;
pub mod filesystem;
pub mod source;

pub use archive::{ArchiveError, ArchiveReader, ArchiveWriter, PackReader, PackWriter};
pub use filesystem::{Entry, EntryKind, NodeId, NodeMut, NodeRef, Tree, TreeError};
pub use source::{DataSource, DataSourceTrait};
