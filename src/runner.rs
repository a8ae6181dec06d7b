//! Top-level checking entry points.
//!
//! For every named package the checker loads it, runs the analyzer,
//! extracts the `want` expectations from the same sources, and reconciles
//! the two. A package that fails to load or analyze is reported and
//! skipped; the remaining packages are still checked.

use crate::analysis::Analyzer;
use crate::expect::extract;
use crate::loader::{LoadConfig, Loader, SourceTreeLoader};
use crate::reconcile::{reconcile, Reconciliation};
use crate::report::Reporter;
use crate::sanitize::Sanitizer;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Checks analyzers against annotated packages.
#[derive(Debug, Clone, Default)]
pub struct Checker<L = SourceTreeLoader> {
    loader: L,
    sanitizer: Sanitizer,
}

impl Checker<SourceTreeLoader> {
    /// Checker over `src/`-rooted trees with the given loading settings.
    pub fn with_load_config(config: LoadConfig) -> Self {
        Self::new(SourceTreeLoader::new(config))
    }
}

impl<L: Loader> Checker<L> {
    /// Create a checker using `loader` and the default sanitizer.
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            sanitizer: Sanitizer::default(),
        }
    }

    /// Replace the position sanitizer.
    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Applies `analyzer` to each named package of the project at `dir`,
    /// reporting every discrepancy to `reporter`.
    ///
    /// Packages are processed in order. The returned vector holds one entry
    /// per package that was loaded and analyzed.
    pub fn run<A, S>(
        &self,
        reporter: &mut dyn Reporter,
        dir: &Path,
        analyzer: &A,
        packages: &[S],
    ) -> Vec<(String, Reconciliation)>
    where
        A: Analyzer + ?Sized,
        S: AsRef<str>,
    {
        let mut outcomes = Vec::with_capacity(packages.len());
        let root = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        let sanitizer = self.sanitizer.rooted(&root);

        for name in packages {
            let name = name.as_ref();
            info!("Checking {} with {}", name, analyzer.name());

            let package = match self.loader.load(dir, name) {
                Ok(package) => package,
                Err(e) => {
                    warn!("Skipping {}: {}", name, e);
                    reporter.report(format_args!("loading {}: {}", name, e));
                    continue;
                }
            };

            let findings = match analyzer.analyze(&package) {
                Ok(findings) => findings,
                Err(e) => {
                    warn!("Skipping {}: {}", name, e);
                    reporter.report(format_args!("analyzing {}: {}", name, e));
                    continue;
                }
            };

            let expectations = extract(&package, &sanitizer, reporter);
            info!(
                "{}: {} finding(s), {} expectation(s)",
                name,
                findings.len(),
                expectations.len()
            );

            let outcome = reconcile(&findings, expectations, &sanitizer, reporter);
            outcomes.push((name.to_string(), outcome));
        }

        outcomes
    }
}

/// Applies `analyzer` to each named package under `dir` using the default
/// loader and sanitizer.
pub fn run<A, S>(reporter: &mut dyn Reporter, dir: &Path, analyzer: &A, packages: &[S])
where
    A: Analyzer + ?Sized,
    S: AsRef<str>,
{
    Checker::<SourceTreeLoader>::default().run(reporter, dir, analyzer, packages);
}

/// Absolute path of the `testdata` directory in the current directory,
/// the conventional project root for fixtures.
pub fn test_data() -> std::io::Result<PathBuf> {
    std::path::absolute("testdata")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnalysisError, LoadError};
    use crate::models::{Finding, Package, Position};
    use crate::workspace::write_files;

    /// Flags code mentioning `unused` or `nil`, ignoring comments.
    fn toy_analyzer(package: &Package) -> Result<Vec<Finding>, AnalysisError> {
        let mut findings = Vec::new();
        for file in &package.files {
            for (i, line) in file.content.lines().enumerate() {
                let line = line.split("//").next().unwrap_or("");
                let position = Position::new(file.path.to_string_lossy(), i + 1);
                if line.contains("unused") {
                    findings.push(Finding::new(position.clone(), "unused variable x"));
                }
                if line.contains("nil") {
                    findings.push(Finding::new(position, "possible nil deref"));
                }
            }
        }
        Ok(findings)
    }

    fn check(files: &[(&str, &str)], packages: &[&str]) -> Vec<String> {
        let ws = write_files(files).unwrap();
        let mut failures: Vec<String> = Vec::new();
        run(&mut failures, ws.path(), &toy_analyzer, packages);
        failures
    }

    #[test]
    fn test_partial_match_passes() {
        let src = "package p\n\nfunc f() {\n\n\tunused := 1 // want \"unused variable\"\n}\n";
        assert!(check(&[("p/a.go", src)], &["p"]).is_empty());
    }

    #[test]
    fn test_expected_finding_not_produced() {
        let src = "package p\n\n\n\nvar x = 1 // want \"unused variable\"\n";
        assert_eq!(
            check(&[("p/a.go", src)], &["p"]),
            vec![r#"p/a.go:5: expected finding matching "unused variable""#.to_string()]
        );
    }

    #[test]
    fn test_unexpected_finding() {
        let src = "package p\n\n\n\n\n\n\nvar x = nil\n";
        assert_eq!(
            check(&[("p/a.go", src)], &["p"]),
            vec!["p/a.go:8: unexpected finding: possible nil deref".to_string()]
        );
    }

    #[test]
    fn test_message_mismatch() {
        let src = "package p\n\nvar x = nil // want \"foo\"\n";
        assert_eq!(
            check(&[("p/a.go", src)], &["p"]),
            vec![
                r#"p/a.go:3: finding "possible nil deref" does not match pattern "foo""#
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_unquoted_annotation() {
        let src = "package p\n\nvar x = nil // want foo\n";
        let failures = check(&[("p/a.go", src)], &["p"]);
        assert_eq!(failures.len(), 2);
        assert!(failures[0].starts_with("p/a.go:3: in 'want' comment:"));
        assert_eq!(failures[1], "p/a.go:3: unexpected finding: possible nil deref");
    }

    #[test]
    fn test_clean_package() {
        let src = "package p\n\n// nothing to report here\nfunc f() {}\n";
        assert!(check(&[("p/a.go", src)], &["p"]).is_empty());
    }

    #[test]
    fn test_load_failure_does_not_stop_run() {
        let src = "package p\n\nvar x = nil\n";
        let failures = check(&[("p/a.go", src)], &["missing", "p"]);
        assert_eq!(failures.len(), 2);
        assert!(failures[0].starts_with("loading missing: "));
        assert_eq!(failures[1], "p/a.go:3: unexpected finding: possible nil deref");
    }

    #[test]
    fn test_analysis_failure_does_not_stop_run() {
        let ws = write_files(&[("a/x.go", "package a\n"), ("b/y.go", "package b\n")][..]).unwrap();
        let failing = |package: &Package| -> Result<Vec<Finding>, AnalysisError> {
            if package.id == "a" {
                Err(AnalysisError::Other("type error".to_string()))
            } else {
                Ok(Vec::new())
            }
        };

        let mut failures: Vec<String> = Vec::new();
        let outcomes = Checker::<SourceTreeLoader>::default().run(
            &mut failures,
            ws.path(),
            &failing,
            &["a", "b"],
        );
        assert_eq!(failures, vec!["analyzing a: type error".to_string()]);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].0, "b");
        assert!(outcomes[0].1.passed());
    }

    #[test]
    fn test_positions_relative_to_nested_project_root() {
        let src = "package demo\n\nvar x = nil\n";
        let ws = write_files(&[("proj/testdata/src/demo/a.go", src)][..]).unwrap();
        let project = ws.src().join("proj/testdata");

        let mut failures: Vec<String> = Vec::new();
        run(&mut failures, &project, &toy_analyzer, &["demo"]);
        assert_eq!(
            failures,
            vec!["demo/a.go:3: unexpected finding: possible nil deref".to_string()]
        );
    }

    #[test]
    fn test_custom_loader() {
        struct Fixed;
        impl Loader for Fixed {
            fn load(&self, _dir: &Path, package: &str) -> Result<Package, LoadError> {
                Ok(Package {
                    id: package.to_string(),
                    dir: PathBuf::from("/tmp/x/src").join(package),
                    files: Vec::new(),
                })
            }
        }

        let analyzer = |_: &Package| -> Result<Vec<Finding>, AnalysisError> {
            Ok(vec![Finding::new(Position::new("/tmp/x/src/q/z.go", 2), "odd")])
        };
        let mut failures: Vec<String> = Vec::new();
        Checker::new(Fixed).run(&mut failures, Path::new("/"), &analyzer, &["q"]);
        assert_eq!(failures, vec!["q/z.go:2: unexpected finding: odd".to_string()]);
    }

    #[test]
    fn test_test_data_fixture() {
        let dir = test_data().unwrap();
        assert!(dir.is_absolute());

        let analyzer = |package: &Package| -> Result<Vec<Finding>, AnalysisError> {
            let file = package.files[0].path.to_string_lossy().to_string();
            Ok(vec![
                Finding::new(Position::new(file.clone(), 7), "unused variable unused"),
                Finding::new(Position::new(file.clone(), 8), "possible nil deref"),
                Finding::new(Position::new(file, 10), "shadowed declaration of name"),
            ])
        };

        let mut failures: Vec<String> = Vec::new();
        let outcomes =
            Checker::<SourceTreeLoader>::default().run(&mut failures, &dir, &analyzer, &["demo"]);
        assert!(failures.is_empty(), "{:?}", failures);
        assert_eq!(outcomes[0].1.matched, 3);
    }
}
