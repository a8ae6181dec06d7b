//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.wantcheck.toml` files.

use crate::analysis::OutputFormat;
use crate::sanitize::DEFAULT_MARKER;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".wantcheck.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Position sanitizing settings.
    #[serde(default)]
    pub sanitizer: SanitizerConfig,

    /// Package loading settings.
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Analyzer command settings.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
}

/// Position sanitizing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizerConfig {
    /// Path segments marking the start of the stable, relative part.
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            markers: default_markers(),
        }
    }
}

fn default_markers() -> Vec<String> {
    vec![DEFAULT_MARKER.to_string()]
}

/// Package loading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// File extensions to include.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory and file names to skip.
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            excludes: default_excludes(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec![
        "c", "cc", "cpp", "go", "h", "hpp", "java", "js", "jsx", "rs", "ts", "tsx",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_excludes() -> Vec<String> {
    vec!["target", "node_modules", "vendor", "build", "dist"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Analyzer command settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Program to run for each package.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Arguments placed before the package directory.
    #[serde(default)]
    pub args: Vec<String>,

    /// Output format of the program.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref command) = args.command {
            self.analyzer.command = Some(command.clone());
            self.analyzer.args = args.args.clone();
        } else if !args.args.is_empty() {
            self.analyzer.args = args.args.clone();
        }

        if let Some(format) = args.format {
            self.analyzer.format = format;
        }

        if let Some(ref markers) = args.markers {
            self.sanitizer.markers = markers.clone();
        }
        if let Some(ref extensions) = args.extensions {
            self.loader.extensions = extensions.clone();
        }
        if let Some(ref excludes) = args.exclude {
            self.loader.excludes = excludes.clone();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
