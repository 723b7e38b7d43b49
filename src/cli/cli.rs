use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::data::LogLevel;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Inspect and edit pack archives as directory trees")]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum, global = true)]
    pub log_level: LogLevel,

    /// Settings file, `packtree.yaml` in the working directory by default
    #[clap(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// zstd level used when writing archives, overrides the settings file
    #[clap(long, global = true, allow_negative_numbers = true)]
    pub compression_level: Option<i32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print every entry of an archive with its size
    List { archive: PathBuf },
    /// Create an archive from a host directory
    Pack {
        source_dir: PathBuf,
        archive: PathBuf,
    },
    /// Write the contents of an archive below a host directory
    Extract { archive: PathBuf, dest: PathBuf },
    /// Create a directory, parents included, inside an archive
    Mkdir { archive: PathBuf, path: String },
    /// Move an entry into another directory of the archive
    Mv {
        archive: PathBuf,
        entry: String,
        target: String,
    },
    /// Remove an entry and everything below it
    Rm { archive: PathBuf, entry: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "packtree",
            "mv",
            "out.pack",
            "a/b.txt",
            "a/c",
            "--compression-level",
            "7",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.compression_level, Some(7));
        assert!(matches!(cli.log_level, LogLevel::Debug));
        assert!(matches!(
            cli.command,
            Command::Mv { ref entry, ref target, .. } if entry == "a/b.txt" && target == "a/c"
        ));
    }

    #[test]
    fn rejects_missing_arguments() {
        assert!(Cli::try_parse_from(["packtree", "rm", "out.pack"]).is_err());
    }
}
