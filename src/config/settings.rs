use std::{borrow::Cow, io::Cursor, path::Path};

use compio::{fs::File, io::AsyncReadExt, io::BufReader};
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::archive::PackOptions;

pub const DEFAULT_CONFIG_FILE_NAME: &str = "packtree.yaml";

const COMPRESSION_LEVEL_KEY: &str = "compression_level";
const CHUNK_SIZE_KEY: &str = "chunk_size";

/// Tunables for writing pack archives, read from `packtree.yaml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub compression_level: i32,
    pub chunk_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let options = PackOptions::default();
        Self {
            compression_level: options.compression_level,
            chunk_size: options.chunk_size,
        }
    }
}

impl Settings {
    /// Reads the settings from `path`, or from `packtree.yaml` in the working
    /// directory when no path is given. Only the implicit file may be missing.
    pub async fn read(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_path(path).await,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE_NAME);
                if compio::fs::metadata(path).await.is_err() {
                    debug!("No {} found, using default settings", DEFAULT_CONFIG_FILE_NAME);
                    return Ok(Self::default());
                }
                Self::from_path(path).await
            }
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ConfigError> {
        debug!("Opening config file: {}", path.display());
        let file = File::open(path).await.context(ReadSnafu {
            file_path: path.display().to_string(),
        })?;

        let cursor = Cursor::new(file);
        let mut reader = BufReader::new(cursor);
        let res = reader.read_to_string(String::new()).await;
        match res.0 {
            Ok(n) => debug!("Successfully read config file: {n} bytes"),
            Err(source) => {
                return Err(ConfigError::ReadError {
                    file_path: path.display().to_string(),
                    source,
                });
            }
        }
        res.1.as_str().try_into()
    }

    /// Overrides the compression level, keeping it within what zstd accepts.
    pub fn with_compression_level(mut self, level: i32) -> Result<Self, ConfigError> {
        ensure!(
            zstd::compression_level_range().contains(&level),
            InvalidValueSnafu {
                key: COMPRESSION_LEVEL_KEY,
                reason: format!("{level} is outside the supported zstd levels"),
            }
        );
        self.compression_level = level;
        Ok(self)
    }

    pub fn pack_options(&self) -> PackOptions {
        PackOptions {
            compression_level: self.compression_level,
            chunk_size: self.chunk_size,
        }
    }

    fn from_mapping(top_level: &LinkedHashMap<Yaml, Yaml>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        if let Some(level) = integer_value(top_level, COMPRESSION_LEVEL_KEY)? {
            let level = i32::try_from(level).ok().context(InvalidValueSnafu {
                key: COMPRESSION_LEVEL_KEY,
                reason: format!("{level} does not fit a compression level"),
            })?;
            settings = settings.with_compression_level(level)?;
        }

        if let Some(size) = integer_value(top_level, CHUNK_SIZE_KEY)? {
            settings.chunk_size = usize::try_from(size)
                .ok()
                .filter(|&size| size > 0)
                .context(InvalidValueSnafu {
                    key: CHUNK_SIZE_KEY,
                    reason: format!("{size} is not a positive byte count"),
                })?;
        }

        Ok(settings)
    }
}

fn integer_value(
    mapping: &LinkedHashMap<Yaml, Yaml>,
    key: &'static str,
) -> Result<Option<i64>, ConfigError> {
    match mapping.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key)))) {
        None => Ok(None),
        Some(Yaml::Value(Scalar::Integer(value))) => Ok(Some(*value)),
        Some(other) => InvalidValueSnafu {
            key,
            reason: format!("expected an integer, found {other:?}"),
        }
        .fail(),
    }
}

impl TryFrom<&str> for Settings {
    type Error = ConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents =
            Yaml::load_from_str(contents).map_err(|e| ConfigError::ParseError { source: e })?;
        let Some(document) = documents.first() else {
            debug!("Config file is empty, using default settings");
            return Ok(Self::default());
        };
        ensure!(documents.len() == 1, MalformedConfigSnafu);

        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;
        Self::from_mapping(top_level)
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Config file should contain a single document"))]
    MalformedConfig,
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Invalid value for '{}': {}", key, reason))]
    InvalidValueError { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[compio::test]
    async fn config_returns_error_on_nonexistent_explicit_file() {
        let result = Settings::read(Some(Path::new("nonexistent.yaml"))).await;
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[compio::test]
    async fn config_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE_NAME);
        std::fs::write(&path, "compression_level: 9\nchunk_size: 1024\n").unwrap();

        let settings = Settings::read(Some(&path)).await.unwrap();

        assert_eq!(
            settings,
            Settings {
                compression_level: 9,
                chunk_size: 1024
            }
        );
    }

    #[test]
    fn config_uses_defaults_for_empty_file() {
        let settings: Settings = "".try_into().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn config_ignores_unknown_keys() {
        let settings: Settings = "other: value\nchunk_size: 4096".try_into().unwrap();
        assert_eq!(settings.chunk_size, 4096);
        assert_eq!(settings.compression_level, 3);
    }

    #[test]
    fn config_returns_error_on_invalid_yaml() {
        let result: Result<Settings, _> = "invalid: yaml: content: [unclosed".try_into();
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[rstest]
    #[case("- item1\n- item2")]
    #[case("just a string")]
    fn config_returns_error_when_top_level_is_not_map(#[case] contents: &str) {
        let result: Result<Settings, _> = contents.try_into();
        assert!(matches!(result, Err(ConfigError::TopLevelNotMap)));
    }

    #[rstest]
    #[case("chunk_size: 0")]
    #[case("chunk_size: -5")]
    #[case("chunk_size: large")]
    #[case("compression_level: 1000")]
    #[case("compression_level: fast")]
    fn config_rejects_invalid_values(#[case] contents: &str) {
        let result: Result<Settings, _> = contents.try_into();
        assert!(matches!(result, Err(ConfigError::InvalidValueError { .. })));
    }

    #[test]
    fn compression_level_override_is_validated() {
        let settings = Settings::default().with_compression_level(19).unwrap();
        assert_eq!(settings.pack_options().compression_level, 19);
        assert!(Settings::default().with_compression_level(99).is_err());
    }
}
