//! Data sources supplying the bytes of file entries.
//!
//! Every source reports a declared size up front and produces its content on
//! request, either from memory or lazily from an opened archive.

mod archived;
mod buffer;
mod data_source;
mod data_uri;

pub use archived::ArchivedSource;
pub use buffer::{BufferSource, TextSource};
pub use data_source::{DataSource, DataSourceTrait, SourceError};
pub use data_uri::DataUriSource;
