//! Analysis runners.
//!
//! The checker is agnostic of how findings are produced: anything that
//! implements [`Analyzer`] can be verified, including plain closures.

pub mod command;

pub use command::{parse_json_findings, parse_text_findings, CommandAnalyzer, OutputFormat};

use crate::error::AnalysisError;
use crate::models::{Finding, Package};

/// Produces findings for a loaded package.
pub trait Analyzer {
    /// Name used in log output.
    fn name(&self) -> &str {
        "analyzer"
    }

    /// Runs the analysis over `package`.
    fn analyze(&self, package: &Package) -> Result<Vec<Finding>, AnalysisError>;
}

impl<F> Analyzer for F
where
    F: Fn(&Package) -> Result<Vec<Finding>, AnalysisError>,
{
    fn analyze(&self, package: &Package) -> Result<Vec<Finding>, AnalysisError> {
        self(package)
    }
}
