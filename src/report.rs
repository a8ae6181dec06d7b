//! Failure reporting.
//!
//! The checker never decides pass/fail itself: it hands each failure to a
//! [`Reporter`] supplied by the caller, which may collect, print, or panic.

use std::fmt;
use std::io::{self, Write};
use tracing::{debug, warn};

/// Sink for formatted failure messages.
pub trait Reporter {
    /// Records one failure.
    fn report(&mut self, message: fmt::Arguments<'_>);
}

impl Reporter for Vec<String> {
    fn report(&mut self, message: fmt::Arguments<'_>) {
        self.push(message.to_string());
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, message: fmt::Arguments<'_>) {
        (**self).report(message);
    }
}

/// Prints failures (to stderr by default) and counts them.
///
/// Each failure is printed once; the log only sees it at debug level.
#[derive(Debug)]
pub struct ConsoleReporter<W = io::Stderr> {
    failures: usize,
    out: W,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::with_writer(io::stderr())
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// Prints to `out` instead of stderr.
    pub fn with_writer(out: W) -> Self {
        Self { failures: 0, out }
    }

    /// Number of failures reported so far.
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, message: fmt::Arguments<'_>) {
        self.failures += 1;
        debug!("failure #{}: {}", self.failures, message);
        if let Err(e) = writeln!(self.out, "❌ {}", message) {
            warn!("failed to print failure: {}", e);
        }
    }
}

/// Panics with every collected failure when dropped, unless none were seen.
///
/// Convenient inside `#[test]` functions:
///
/// ```no_run
/// # use wantcheck::report::PanicReporter;
/// let mut reporter = PanicReporter::new("my analyzer");
/// // wantcheck::run(&mut reporter, ...);
/// ```
#[derive(Debug)]
pub struct PanicReporter {
    context: String,
    failures: Vec<String>,
}

impl PanicReporter {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            failures: Vec::new(),
        }
    }

    /// Failures collected so far.
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Takes the collected failures, disarming the panic on drop.
    pub fn into_failures(mut self) -> Vec<String> {
        std::mem::take(&mut self.failures)
    }
}

impl Reporter for PanicReporter {
    fn report(&mut self, message: fmt::Arguments<'_>) {
        self.failures.push(message.to_string());
    }
}

impl Drop for PanicReporter {
    fn drop(&mut self) {
        if self.failures.is_empty() || std::thread::panicking() {
            return;
        }
        panic!(
            "{}: {} failure(s)\n  {}",
            self.context,
            self.failures.len(),
            self.failures.join("\n  ")
        );
    }
}
