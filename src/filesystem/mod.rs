//! Filesystem tree representation backed by an identifier registry.
//!
//! This module provides a tree-like structure to represent the contents of an
//! archive, where nodes can be either directories (that can contain other nodes)
//! or files that reference a data source for their bytes. Nodes are addressed by
//! [`NodeId`] and inspected through borrowed [`NodeRef`] handles.

mod entry;
mod error;
mod export;
mod import;
mod node;
mod tree;

pub use entry::{Entry, EntryKind};
pub use error::TreeError;
pub use export::ExportError;
pub use import::ImportError;
pub use node::{NodeId, NodeMut, NodeRef, Walk};
pub use tree::{PATH_SEPARATOR, Tree};
