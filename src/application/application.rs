use std::path::Path;

use packtree::config::{ConfigError, Settings};
use packtree::filesystem::{ExportError, ImportError};
use packtree::source::SourceError;
use packtree::{DataSourceTrait, NodeId, PackReader, PackWriter, Tree, TreeError};
use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::application::host_tree::{HostTreeError, tree_from_host_dir};
use crate::application::listing;
use crate::cli::Command;

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let mut settings = Settings::read(app_config.config_path.as_deref())
            .await
            .context(SettingsSnafu)?;
        if let Some(level) = app_config.compression_level {
            settings = settings
                .with_compression_level(level)
                .context(SettingsSnafu)?;
        }
        debug!("Loaded settings: {:?}", settings);

        match app_config.command {
            Command::List { archive } => {
                let tree = open_archive(&archive).await?;
                for line in listing::render(&tree) {
                    println!("{line}");
                }
            }
            Command::Pack {
                source_dir,
                archive,
            } => {
                let tree = tree_from_host_dir(&source_dir)
                    .await
                    .context(HostTreeSnafu)?;
                save_archive(&tree, &archive, &settings).await?;
            }
            Command::Extract { archive, dest } => {
                let tree = open_archive(&archive).await?;
                extract(&tree, &dest).await?;
            }
            Command::Mkdir { archive, path } => {
                let mut tree = open_archive(&archive).await?;
                tree.make_directories(&path).context(TreeSnafu)?;
                save_archive(&tree, &archive, &settings).await?;
            }
            Command::Mv {
                archive,
                entry,
                target,
            } => {
                let mut tree = open_archive(&archive).await?;
                let id = lookup(&tree, &entry)?;
                let target = lookup(&tree, &target)?;
                tree.move_to(id, target).context(TreeSnafu)?;
                save_archive(&tree, &archive, &settings).await?;
            }
            Command::Rm { archive, entry } => {
                let mut tree = open_archive(&archive).await?;
                let id = lookup(&tree, &entry)?;
                tree.remove(id).context(TreeSnafu)?;
                save_archive(&tree, &archive, &settings).await?;
            }
        }

        Ok(())
    }
}

fn lookup(tree: &Tree, path: &str) -> Result<NodeId, ApplicationError> {
    tree.find_by_path(path)
        .map(|node| node.id())
        .context(EntryNotFoundSnafu { path })
}

async fn open_archive(path: &Path) -> Result<Tree, ApplicationError> {
    let bytes = compio::fs::read(path).await.context(ReadArchiveSnafu {
        path: path.display().to_string(),
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    let mut tree = Tree::new();
    let mut report = progress_logger("Importing");
    tree.import_from(&mut PackReader::new(bytes), |done, total| {
        report(done as u64, total as u64)
    })
    .await
    .context(ImportSnafu)?;
    Ok(tree)
}

async fn save_archive(tree: &Tree, path: &Path, settings: &Settings) -> Result<(), ApplicationError> {
    let writer = PackWriter::new(settings.pack_options());
    let bytes = tree
        .export_to(writer, progress_logger("Exporting"))
        .await
        .context(ExportSnafu)?;

    compio::fs::write(path, bytes)
        .await
        .0
        .context(WriteArchiveSnafu {
            path: path.display().to_string(),
        })?;
    info!("Wrote archive {}", path.display());
    Ok(())
}

async fn extract(tree: &Tree, dest: &Path) -> Result<(), ApplicationError> {
    compio::fs::create_dir_all(dest).await.context(ExtractSnafu {
        path: dest.display().to_string(),
    })?;

    for node in tree.walk() {
        let host_path = dest.join(node.full_path());
        let path = host_path.display().to_string();
        match node.source() {
            None => {
                compio::fs::create_dir_all(&host_path)
                    .await
                    .context(ExtractSnafu { path })?;
            }
            Some(source) => {
                let data = source
                    .get_data(&mut |_| {})
                    .await
                    .context(ExtractDataSnafu { path: path.as_str() })?;
                compio::fs::write(&host_path, data)
                    .await
                    .0
                    .context(ExtractSnafu { path })?;
            }
        }
    }

    info!("Extracted {} entries to {}", tree.len() - 1, dest.display());
    Ok(())
}

/// Logs progress every time another tenth of the work is done.
fn progress_logger(label: &'static str) -> impl FnMut(u64, u64) {
    let mut last_step = None;
    move |done, total| {
        let step = if total == 0 { 10 } else { done * 10 / total };
        if last_step != Some(step) {
            last_step = Some(step);
            info!("{label}: {}%", step * 10);
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading settings"))]
    SettingsError { source: ConfigError },
    #[snafu(display("Failed to read archive '{}'", path))]
    ReadArchiveError {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write archive '{}'", path))]
    WriteArchiveError {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to import the archive"))]
    ImportError { source: ImportError },
    #[snafu(display("Failed to export the archive"))]
    ExportError { source: ExportError },
    #[snafu(display("No entry at '{}'", path))]
    EntryNotFoundError { path: String },
    #[snafu(display("Invalid tree operation"))]
    TreeError { source: TreeError },
    #[snafu(display("Failed to read the host directory"))]
    HostTreeError { source: HostTreeError },
    #[snafu(display("Failed to extract '{}'", path))]
    ExtractError {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to read the contents of '{}'", path))]
    ExtractDataError { path: String, source: SourceError },
}
