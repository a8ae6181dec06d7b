//! External command analyzer.
//!
//! Runs a linter as a child process and parses its diagnostics, either in
//! the conventional `path:line[:column]: message` text form or as a JSON
//! array of `{ "file", "line", "message" }` objects.

use super::Analyzer;
use crate::error::AnalysisError;
use crate::models::{Finding, Package, Position};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Static regex for `path:line[:column]: message` diagnostics
static DIAGNOSTIC_REGEX: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(?P<file>[^:\s][^:]*):(?P<line>\d+)(?::\d+)?:\s?(?P<message>.*)$").ok()
});

/// How the analyzer prints its findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `path:line[:column]: message` lines (default)
    #[default]
    Text,
    /// JSON array of findings
    Json,
}

#[derive(Debug, Deserialize)]
struct RawFinding {
    file: String,
    line: usize,
    message: String,
}

/// Runs an external program once per package.
///
/// The program receives the package directory as its last argument and runs
/// with that directory as its working directory.
#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    program: String,
    args: Vec<String>,
    format: OutputFormat,
}

impl CommandAnalyzer {
    /// Create an analyzer for `program` with leading `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            format: OutputFormat::default(),
        }
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Analyzer for CommandAnalyzer {
    fn name(&self) -> &str {
        &self.program
    }

    fn analyze(&self, package: &Package) -> Result<Vec<Finding>, AnalysisError> {
        info!("Running {} on {}", self.command_line(), package.dir.display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&package.dir)
            .current_dir(&package.dir)
            .output()
            .map_err(|source| AnalysisError::Spawn {
                command: self.command_line(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let Some(code) = output.status.code() else {
            return Err(AnalysisError::Signaled {
                command: self.command_line(),
            });
        };

        let parsed = match self.format {
            OutputFormat::Text => {
                let mut findings = parse_text_findings(&stdout, &package.dir);
                findings.extend(parse_text_findings(&stderr, &package.dir));
                Ok(findings)
            }
            OutputFormat::Json => parse_json_findings(&stdout, &package.dir),
        };

        // Linters commonly exit non-zero when they report something; only a
        // non-zero exit without any findings counts as a failure.
        match parsed {
            Ok(findings) if code == 0 || !findings.is_empty() => {
                debug!("{} reported {} finding(s)", self.program, findings.len());
                Ok(findings)
            }
            Err(e) if code == 0 => Err(e),
            _ => Err(AnalysisError::Failed {
                command: self.command_line(),
                code,
                stderr: tail(&stderr, 20),
            }),
        }
    }
}

/// Parse `path:line[:column]: message` lines, ignoring anything else.
///
/// Relative paths are resolved against `base`.
pub fn parse_text_findings(output: &str, base: &Path) -> Vec<Finding> {
    let Some(re) = DIAGNOSTIC_REGEX.as_ref() else {
        return Vec::new();
    };

    output
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter_map(|line| re.captures(line))
        .filter_map(|caps| {
            let line = caps["line"].parse().ok()?;
            Some(Finding::new(
                Position::new(resolve(&caps["file"], base), line),
                caps["message"].to_string(),
            ))
        })
        .collect()
}

/// Parse a JSON array of `{ "file", "line", "message" }` objects.
///
/// Empty output means no findings. Relative paths are resolved against
/// `base`.
pub fn parse_json_findings(output: &str, base: &Path) -> Result<Vec<Finding>, AnalysisError> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }

    let raw: Vec<RawFinding> = serde_json::from_str(output)?;
    Ok(raw
        .into_iter()
        .map(|f| Finding::new(Position::new(resolve(&f.file, base), f.line), f.message))
        .collect())
}

fn resolve(file: &str, base: &Path) -> String {
    let path = Path::new(file);
    if path.is_absolute() {
        file.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim_end().lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_text_findings() {
        let output = "# example/pkg\n\
                      a.go:3: unused variable x\n\
                      /abs/b.go:10:4: possible nil deref\r\n\
                      note: something unrelated\n";
        let findings = parse_text_findings(output, Path::new("/w/src/p"));
        assert_eq!(
            findings,
            vec![
                Finding::new(Position::new("/w/src/p/a.go", 3), "unused variable x"),
                Finding::new(Position::new("/abs/b.go", 10), "possible nil deref"),
            ]
        );
    }

    #[test]
    fn test_parse_text_keeps_colons_in_message() {
        let findings = parse_text_findings("x.c:7:1: error: bad cast: int", Path::new("/b"));
        assert_eq!(findings[0].message, "error: bad cast: int");
        assert_eq!(findings[0].position.line, 7);
    }

    #[test]
    fn test_parse_json_findings() {
        let output = r#"[{"file": "a.go", "line": 5, "message": "shadowed"}]"#;
        let findings = parse_json_findings(output, Path::new("/w/src/p")).unwrap();
        assert_eq!(
            findings,
            vec![Finding::new(Position::new("/w/src/p/a.go", 5), "shadowed")]
        );
        assert!(parse_json_findings("  \n", Path::new("/")).unwrap().is_empty());
        assert!(parse_json_findings("not json", Path::new("/")).is_err());
    }

    #[test]
    fn test_tail() {
        assert_eq!(tail("a\nb\nc\n", 2), "b\nc");
        assert_eq!(tail("", 5), "");
    }

    #[cfg(unix)]
    fn package_in(dir: &Path) -> Package {
        Package {
            id: "p".to_string(),
            dir: dir.to_path_buf(),
            files: Vec::new(),
        }
    }

    #[cfg(unix)]
    fn shell(script: &str) -> CommandAnalyzer {
        CommandAnalyzer::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "sh".to_string()],
        )
    }

    #[cfg(unix)]
    #[test]
    fn test_command_findings_with_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = shell("echo 'a.go:2: boom'; exit 3");
        let findings = analyzer.analyze(&package_in(dir.path())).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "boom");
        assert_eq!(
            PathBuf::from(&findings[0].position.file),
            dir.path().join("a.go")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_command_failure_without_findings() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = shell("echo 'cannot parse' >&2; exit 2");
        let err = analyzer.analyze(&package_in(dir.path())).unwrap_err();
        assert!(matches!(err, AnalysisError::Failed { code: 2, .. }));
        assert!(err.to_string().contains("cannot parse"));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = shell(r#"echo '[{"file":"x.go","line":4,"message":"m"}]'"#)
            .with_format(OutputFormat::Json);
        let findings = analyzer.analyze(&package_in(dir.path())).unwrap();
        assert_eq!(findings[0].position.line, 4);
    }

    #[test]
    fn test_missing_program() {
        let analyzer = CommandAnalyzer::new("wantcheck-no-such-program", Vec::new());
        let err = analyzer.analyze(&Package {
            id: "p".to_string(),
            dir: std::env::temp_dir(),
            files: Vec::new(),
        });
        assert!(matches!(err, Err(AnalysisError::Spawn { .. })));
    }
}
