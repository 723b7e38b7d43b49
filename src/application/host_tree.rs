use std::path::{Path, PathBuf};

use packtree::source::BufferSource;
use packtree::{Entry, NodeId, Tree, TreeError};
use snafu::prelude::*;
use tracing::{debug, warn};

/// Builds a tree mirroring the directory at `root`. Children are added sorted
/// by name so the resulting archive does not depend on directory order.
/// Entries that are neither files nor directories are skipped.
pub async fn tree_from_host_dir(root: &Path) -> Result<Tree, HostTreeError> {
    let mut tree = Tree::new();
    let mut pending: Vec<(PathBuf, NodeId)> = vec![(root.to_path_buf(), tree.root_id())];

    while let Some((dir, parent)) = pending.pop() {
        for (name, path, is_dir) in sorted_children(&dir)? {
            if is_dir {
                let id = tree
                    .add_entry(parent, Entry::directory(name))
                    .context(PlaceEntrySnafu { path: display(&path) })?;
                pending.push((path, id));
            } else {
                let bytes = compio::fs::read(&path)
                    .await
                    .context(ReadFileSnafu { path: display(&path) })?;
                debug!("Loaded '{}' ({} bytes)", path.display(), bytes.len());
                tree.add_entry(parent, Entry::file(name, BufferSource::new(bytes)))
                    .context(PlaceEntrySnafu { path: display(&path) })?;
            }
        }
    }

    Ok(tree)
}

// compio::fs has no directory listing, so entries are listed with std::fs.
fn sorted_children(dir: &Path) -> Result<Vec<(String, PathBuf, bool)>, HostTreeError> {
    let read_dir = std::fs::read_dir(dir).context(ReadDirSnafu { path: display(dir) })?;
    let mut children = Vec::new();
    for dir_entry in read_dir {
        let dir_entry = dir_entry.context(ReadDirSnafu { path: display(dir) })?;
        let path = dir_entry.path();
        let file_type = dir_entry
            .file_type()
            .context(ReadDirSnafu { path: display(&path) })?;
        if !file_type.is_dir() && !file_type.is_file() {
            warn!("Skipping '{}': not a regular file or directory", path.display());
            continue;
        }
        let name = dir_entry
            .file_name()
            .into_string()
            .ok()
            .context(InvalidFileNameSnafu { path: display(&path) })?;
        children.push((name, path, file_type.is_dir()));
    }
    children.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(children)
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[derive(Debug, Snafu)]
pub enum HostTreeError {
    #[snafu(display("Failed to list directory '{}'", path))]
    ReadDirError {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to read file '{}'", path))]
    ReadFileError {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("File name of '{}' is not valid UTF-8", path))]
    InvalidFileNameError { path: String },
    #[snafu(display("Cannot add '{}' to the tree", path))]
    PlaceEntryError { path: String, source: TreeError },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn host_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("src/nested/data.bin"), [0u8; 16]).unwrap();
        fs::write(dir.path().join("README"), "hi").unwrap();
        dir
    }

    #[rstest]
    #[compio::test]
    async fn mirrors_host_directory_sorted(host_dir: TempDir) {
        let tree = tree_from_host_dir(host_dir.path()).await.unwrap();

        let paths: Vec<_> = tree.walk().map(|node| node.full_path()).collect();
        assert_eq!(
            paths,
            ["README", "empty", "src", "src/main.rs", "src/nested", "src/nested/data.bin"]
        );
        assert_eq!(tree.root().total_size(), 2 + 12 + 16);
        assert!(tree.find_by_path("empty").unwrap().is_directory());
    }

    #[compio::test]
    async fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = tree_from_host_dir(&dir.path().join("missing")).await;
        assert!(matches!(result, Err(HostTreeError::ReadDirError { .. })));
    }
}
