use clap::ValueEnum;
use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{application::data::ConflictPolicy, ext::PathDisplayExt};

const SETTINGS_FILE_NAME: &str = "treesmith.yaml";
const MAX_TAB_WIDTH: i64 = 64;

fn get_settings_file_path(dir: &Path) -> PathBuf {
    dir.join(SETTINGS_FILE_NAME)
}

/// Defaults read from `treesmith.yaml`. Anything left unset falls back to
/// the command line or the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub on_conflict: Option<ConflictPolicy>,
    pub assume_yes: Option<bool>,
    pub journal: Option<PathBuf>,
    pub tab_width: Option<usize>,
}

impl Settings {
    /// Reads the settings file in `dir`, if there is one.
    pub async fn read(dir: &Path) -> Result<Self, SettingsError> {
        let path = get_settings_file_path(dir);
        if !path.exists() {
            debug!(
                "No settings file at {}, using defaults",
                path.display_absolute()
            );
            return Ok(Self::default());
        }
        Self::from_path(&path).await
    }

    pub async fn from_path(path: &Path) -> Result<Self, SettingsError> {
        debug!("Reading settings file: {}", path.display_absolute());
        let bytes = fs::read(path).await.context(ReadSnafu {
            file_path: path.display_absolute(),
        })?;
        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.display_absolute(),
        })?;
        contents.as_str().try_into()
    }

    fn apply(&mut self, key: &str, value: &Yaml) -> Result<(), SettingsError> {
        match key {
            "on_conflict" => {
                let text = value.as_str().context(InvalidValueSnafu { key })?;
                let policy = ConflictPolicy::from_str(text, true)
                    .ok()
                    .context(InvalidValueSnafu { key })?;
                self.on_conflict = Some(policy);
            }
            "assume_yes" => match value {
                Yaml::Value(Scalar::Boolean(flag)) => self.assume_yes = Some(*flag),
                _ => return InvalidValueSnafu { key }.fail(),
            },
            "journal" => {
                let text = value.as_str().context(InvalidValueSnafu { key })?;
                self.journal = Some(PathBuf::from(text));
            }
            "tab_width" => match value {
                Yaml::Value(Scalar::Integer(width)) if (1..=MAX_TAB_WIDTH).contains(width) => {
                    self.tab_width = Some(*width as usize)
                }
                _ => return InvalidValueSnafu { key }.fail(),
            },
            other => debug!("Ignoring unknown setting '{}'", other),
        }
        Ok(())
    }

    fn from_mapping(top_level: &LinkedHashMap<Yaml, Yaml>) -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        for (key, value) in top_level {
            match key.as_str() {
                Some(key) => settings.apply(key, value)?,
                None => debug!("Skipping non-string settings key: {:?}", key),
            }
        }
        Ok(settings)
    }
}

impl TryFrom<&str> for Settings {
    type Error = SettingsError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let Some(document) = documents.first() else {
            return Ok(Self::default());
        };
        if matches!(document, Yaml::Value(Scalar::Null)) {
            return Ok(Self::default());
        }

        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;
        Self::from_mapping(top_level)
    }
}

#[derive(Debug, Snafu)]
pub enum SettingsError {
    #[snafu(display("Failed to read the settings file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("The settings file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the settings file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of the settings file should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Invalid value for setting '{}'", key))]
    InvalidValue { key: String },
}
