#[allow(clippy::module_inception)]
mod application;
pub mod data;
mod host_tree;
mod listing;
mod runtime_config;

pub use application::{Application, ApplicationError};
pub use runtime_config::RuntimeConfig;
