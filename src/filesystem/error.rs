use snafu::Snafu;

use super::NodeId;

/// Structural failures of tree mutations. A failed mutation leaves the tree unchanged.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TreeError {
    #[snafu(display("Entry '{}' is not a directory", path))]
    NotADirectoryError { path: String },
    #[snafu(display("An entry named '{}' already exists in '{}'", name, parent))]
    DuplicateNameError { name: String, parent: String },
    #[snafu(display("Cannot move '{}' into its own subtree at '{}'", entry, target))]
    CyclicMoveError { entry: String, target: String },
    #[snafu(display("No entry with id {}", id))]
    NotFoundError { id: NodeId },
    #[snafu(display("Invalid entry name '{}'", name))]
    InvalidNameError { name: String },
    #[snafu(display("The root directory cannot be removed"))]
    RootRemovalError,
}
