//! wantcheck - verify static-analysis findings against `want` annotations.
//!
//! Analysis authors write fixture sources that declare the findings they
//! expect inline:
//!
//! ```text
//! func f() {
//!     x := 1 // want "unused variable"
//! }
//! ```
//!
//! [`run`] loads each named package, runs the analyzer over it, and reports
//! every finding without a matching annotation, every annotation whose
//! pattern the finding's message does not contain, and every annotation no
//! finding satisfied.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod expect;
pub mod loader;
pub mod models;
pub mod reconcile;
pub mod report;
pub mod runner;
pub mod sanitize;
pub mod workspace;

pub use analysis::{Analyzer, CommandAnalyzer, OutputFormat};
pub use error::{AnalysisError, LoadError, UnquoteError, WorkspaceError};
pub use expect::{extract, ExpectationIndex};
pub use loader::{LoadConfig, Loader, SourceTreeLoader};
pub use models::{Finding, Package, Position};
pub use reconcile::{reconcile, Reconciliation};
pub use report::{ConsoleReporter, PanicReporter, Reporter};
pub use runner::{run, test_data, Checker};
pub use sanitize::Sanitizer;
pub use workspace::{write_files, write_files_in, Workspace};
