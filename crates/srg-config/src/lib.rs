//! Chain files: TOML descriptions of a sequence of mapping layers.
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [[layers]]
//! path = "obf2srg.srg"
//!
//! [[layers]]
//! path = "srg2mcp.csrg"
//! invert = true
//!
//! [[layers]]
//! packages = { "" = "net/minecraft/server" }
//!
//! [output]
//! path = "obf2mcp.srg"
//! ```
//!
//! Layer and output paths are relative to the directory of the chain file.

use std::path::{Path, PathBuf};
use std::sync::Once;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use srg_format::MappingsFormat;
use srg_types::is_valid_identifier;
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Layers in application order; the first layer's names are the keys of
    /// the composed result.
    #[serde(default)]
    pub layers: Vec<LayerConfig>,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayerConfig {
    File(FileLayer),
    Packages(PackageLayer),
}

/// A layer read from a mappings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLayer {
    pub path: PathBuf,

    /// Inferred from the file extension when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<MappingsFormat>,

    /// Invert the file's mappings before chaining.
    #[serde(default)]
    pub invert: bool,
}

impl FileLayer {
    pub fn format(&self) -> Result<MappingsFormat, ConfigError> {
        self.format
            .or_else(|| MappingsFormat::from_extension(&self.path))
            .ok_or_else(|| ConfigError::UnknownFormat(self.path.display().to_string()))
    }
}

/// A rule layer moving whole packages; `""` is the default package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageLayer {
    pub packages: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Standard output when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<MappingsFormat>,
}

impl OutputConfig {
    /// Explicit format, else the output file's extension, else SRG.
    pub fn format(&self) -> MappingsFormat {
        self.format
            .or_else(|| self.path.as_deref().and_then(MappingsFormat::from_extension))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A simple level (`info`, `debug`, ...) or `EnvFilter` directives.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "warn".to_owned()
    }

    /// The configured directives; a bare level is accepted in any case.
    pub(crate) fn directives(&self) -> String {
        let level = self.level.trim();
        if level.is_empty() {
            return Self::default_level();
        }
        match level.parse::<LevelFilter>() {
            Ok(filter) => filter.to_string().to_ascii_lowercase(),
            Err(_) => level.to_owned(),
        }
    }

    fn config_env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(self.directives())
            .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::WARN.into()))
    }

    /// The effective filter: the configured level merged with `RUST_LOG`.
    pub fn env_filter(&self) -> EnvFilter {
        match std::env::var("RUST_LOG") {
            Ok(env) if !env.trim().is_empty() => {
                EnvFilter::try_new(format!("{},{}", self.directives(), env.trim()))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            _ => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid package name `{0}`")]
    InvalidPackage(String),
    #[error("can't infer the mappings format of {0}; set `format` explicitly")]
    UnknownFormat(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_owned())
    }
}

impl ChainConfig {
    /// Load a chain file, resolving relative paths against its directory.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::load_from_str(&text)?;
        if let Some(dir) = path.parent() {
            config.resolve_paths(dir);
        }
        tracing::debug!(
            target: "srg.config",
            path = %path.display(),
            layers = config.layers.len(),
            "loaded chain config"
        );
        Ok(config)
    }

    /// Parse a chain file. Paths are kept as written.
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: ChainConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for layer in &self.layers {
            if let LayerConfig::Packages(layer) = layer {
                for (from, to) in &layer.packages {
                    check_package(from)?;
                    check_package(to)?;
                }
            }
        }
        Ok(())
    }

    /// Make relative layer and output paths relative to `base` instead.
    pub fn resolve_paths(&mut self, base: &Path) {
        for layer in &mut self.layers {
            if let LayerConfig::File(file) = layer {
                file.path = resolve(base, &file.path);
            }
        }
        if let Some(path) = self.output.path.as_mut() {
            *path = resolve(base, path);
        }
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Accepts `""`, and dotted or slashed names made of Java identifiers.
fn check_package(package: &str) -> Result<(), ConfigError> {
    let trimmed = package.trim().trim_matches(|c: char| c == '/' || c == '.');
    if trimmed.is_empty() {
        return Ok(());
    }
    if trimmed.split(['/', '.']).all(is_valid_identifier) {
        Ok(())
    } else {
        Err(ConfigError::InvalidPackage(package.to_owned()))
    }
}

static TRACING_INIT: Once = Once::new();

/// Install a global `fmt` subscriber writing to stderr.
///
/// Only the first call has an effect.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(config.env_filter())
            .with_writer(std::io::stderr)
            .with_ansi(false);
        let installed = if config.json {
            builder.json().try_init().is_ok()
        } else {
            builder.try_init().is_ok()
        };
        if installed {
            tracing::debug!(target: "srg.config", level = %config.level, "tracing initialized");
        }
    });
}
