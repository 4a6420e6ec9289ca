//! Configuration for the reflector tooling
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (reflector.toml)
//! - Environment variables (REFLECTOR__*)
//!
//! ## Example config file (reflector.toml):
//! ```toml
//! [output]
//! format = "pretty"
//! include_fingerprint = true
//!
//! [descriptors]
//! paths = ["classes"]
//! extensions = ["json", "toml"]
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReflectorConfig {
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Where class specs are read from
    #[serde(default)]
    pub descriptors: DescriptorConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format (pretty or compact)
    #[serde(default)]
    pub format: OutputFormat,

    /// Print the layout fingerprint with each class
    #[serde(default = "default_true")]
    pub include_fingerprint: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// Class spec locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorConfig {
    /// Files or directories searched when none are given on the command line
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// File extensions treated as class specs
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    vec!["json".to_string(), "toml".to_string()]
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pretty,
            include_fingerprint: true,
        }
    }
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            extensions: default_extensions(),
        }
    }
}

impl ReflectorConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the defaults
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["reflector.toml", ".reflector.toml", "config/reflector.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "reflector") {
            let xdg_config = config_dir.config_dir().join("reflector.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("REFLECTOR")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Whether a path looks like a class spec file
    pub fn is_spec_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.descriptors.extensions.iter().any(|allowed| allowed == ext))
            .unwrap_or(false)
    }
}
