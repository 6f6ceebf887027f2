use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use super::ConfigParser;

/// A `buildpack.toml` descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildpackConfig {
    pub api: String,
    pub buildpack: ConfigBuildpack,
    #[serde(default)]
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigBuildpack {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigMetadata {
    /// Files (or glob patterns) to ship, relative to the buildpack root.
    #[serde(default)]
    pub include_files: Vec<String>,
    /// Script run in the buildpack root before files are selected.
    #[serde(default)]
    pub pre_package: Option<String>,
}

/// Parses descriptors with `toml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlConfigParser;

impl ConfigParser for TomlConfigParser {
    fn parse(&self, path: &Path) -> anyhow::Result<BuildpackConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(toml::from_str(&contents)?)
    }
}
