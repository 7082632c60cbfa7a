use std::{error::Error, fmt::Display, path::PathBuf};

use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "query-stub.toml";

#[derive(Debug, Clone)]
pub enum ConfigError {
    NoModelSource,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoModelSource => {
                write!(f, "No model manifest given, set `path` in {CONFIG_FILE}.")
            }
        }
    }
}

impl Error for ConfigError {}

/// Options controlling the optional parts of a generated stub.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildOptions {
    #[serde(alias = "addClassLevelComment")]
    add_class_level_comment: Option<bool>,
    #[serde(alias = "addTimeStamp")]
    add_time_stamp: Option<bool>,
    #[serde(alias = "generatorVersion")]
    generator_version: Option<String>,
    generator_name: Option<String>,
}

impl BuildOptions {
    pub fn into_build_config(self) -> BuildConfig {
        let defaults = BuildConfig::default();
        BuildConfig {
            add_class_level_comment: self
                .add_class_level_comment
                .unwrap_or(defaults.add_class_level_comment),
            add_time_stamp: self.add_time_stamp.unwrap_or(defaults.add_time_stamp),
            generator_version: self
                .generator_version
                .unwrap_or(defaults.generator_version),
            generator_name: self.generator_name.unwrap_or(defaults.generator_name),
        }
    }
}

impl From<BuildConfig> for BuildOptions {
    fn from(config: BuildConfig) -> Self {
        Self {
            add_class_level_comment: Some(config.add_class_level_comment),
            add_time_stamp: Some(config.add_time_stamp),
            generator_version: Some(config.generator_version),
            generator_name: Some(config.generator_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub add_class_level_comment: bool,
    pub add_time_stamp: bool,
    pub generator_version: String,
    pub generator_name: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            add_class_level_comment: true,
            add_time_stamp: false,
            generator_version: env!("CARGO_PKG_VERSION").to_owned(),
            generator_name: env!("CARGO_PKG_NAME").to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelSource {
    Single(PathBuf),
    List(Vec<PathBuf>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[must_use]
pub struct TomlConfig {
    pub path: ModelSource,
    pub target: PathBuf,
    #[serde(default = "Default::default")]
    pub build: BuildOptions,
}

#[derive(Debug, Clone)]
pub struct QueryStubConfig {
    pub source: Vec<PathBuf>,
    pub target: PathBuf,
    pub build: BuildConfig,
}

impl QueryStubConfig {
    pub fn from_toml_config(config: TomlConfig) -> Result<Self, Box<dyn Error>> {
        let source = match config.path {
            ModelSource::Single(item) => vec![item],
            ModelSource::List(items) => items,
        };
        if source.is_empty() {
            Err(ConfigError::NoModelSource)?
        }

        Ok(Self {
            source,
            target: config.target,
            build: config.build.into_build_config(),
        })
    }
}

pub fn get_config(path: Option<PathBuf>) -> Result<QueryStubConfig, Box<dyn Error>> {
    let path = path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let content = std::fs::read_to_string(&path).map_err(|error| {
        format!("encountered '{error}' attempting to read {}", path.display())
    })?;
    let config: TomlConfig = toml::from_str(&content)?;
    QueryStubConfig::from_toml_config(config)
}
