//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// wantcheck - check a linter against `want` annotations
///
/// Runs an analysis command over each named package and compares its
/// findings with the `// want "regex"` comments in the package sources.
///
/// Examples:
///   wantcheck --cmd my-lint p
///   wantcheck --cmd my-lint --arg=--strict --dir fixtures a b/...
///   wantcheck --cmd my-lint --format json p
///   wantcheck --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Packages to check, relative to `<dir>/src`
    ///
    /// A trailing `/...` selects the single package beneath a prefix.
    #[arg(value_name = "PACKAGE", required_unless_present = "init_config")]
    pub packages: Vec<String>,

    /// Analysis command to run for each package
    ///
    /// The package directory is appended as the last argument.
    #[arg(long = "cmd", value_name = "PROGRAM", env = "WANTCHECK_CMD")]
    pub command: Option<String>,

    /// Argument passed to the analysis command (repeatable)
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Project root holding `src/`
    #[arg(short, long, default_value = "testdata", value_name = "DIR")]
    pub dir: PathBuf,

    /// Output format of the analysis command (text, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .wantcheck.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Source-root markers stripped from positions (comma-separated)
    #[arg(long, value_name = "MARKERS", value_delimiter = ',')]
    pub markers: Option<Vec<String>>,

    /// File extensions to load (comma-separated)
    ///
    /// Example: --extensions go,c
    #[arg(long, value_name = "EXTS", value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Names to skip when expanding `/...` (comma-separated)
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .wantcheck.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.packages.iter().any(|p| p.trim().is_empty()) {
            return Err("Package names must not be empty".to_string());
        }

        if let Some(ref command) = self.command {
            if command.trim().is_empty() {
                return Err("Analysis command must not be empty".to_string());
            }
        }

        if !self.dir.exists() {
            return Err(format!(
                "Project directory does not exist: {}",
                self.dir.display()
            ));
        }
        if !self.dir.is_dir() {
            return Err(format!(
                "Project path is not a directory: {}",
                self.dir.display()
            ));
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            packages: vec!["p".to_string()],
            command: Some("my-lint".to_string()),
            args: Vec::new(),
            dir: std::env::temp_dir(),
            format: None,
            config: None,
            markers: None,
            extensions: None,
            exclude: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_command_line() {
        let args = Args::try_parse_from([
            "wantcheck",
            "--cmd",
            "my-lint",
            "--arg=--strict",
            "--arg",
            "-x",
            "--format",
            "json",
            "--extensions",
            "go,c",
            "a",
            "b/...",
        ])
        .unwrap();

        assert_eq!(args.command.as_deref(), Some("my-lint"));
        assert_eq!(args.args, vec!["--strict", "-x"]);
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.extensions, Some(vec!["go".to_string(), "c".to_string()]));
        assert_eq!(args.packages, vec!["a", "b/..."]);
        assert_eq!(args.dir, PathBuf::from("testdata"));
    }

    #[test]
    fn test_packages_required() {
        assert!(Args::try_parse_from(["wantcheck", "--cmd", "x"]).is_err());
        assert!(Args::try_parse_from(["wantcheck", "--init-config"]).is_ok());
    }

    #[test]
    fn test_validation_missing_dir() {
        let mut args = make_args();
        args.dir = PathBuf::from("/definitely/not/here");
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_ok() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::WARN);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
