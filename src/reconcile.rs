//! Reconciliation of reported findings against expectations.

use crate::expect::ExpectationIndex;
use crate::models::Finding;
use crate::report::Reporter;
use crate::sanitize::Sanitizer;
use tracing::debug;

/// Outcome counts of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Findings whose message matched the expectation at their position.
    pub matched: usize,
    /// Findings with no expectation at their position.
    pub unexpected: usize,
    /// Findings whose message did not match the expectation's pattern.
    pub mismatched: usize,
    /// Expectations no finding consumed.
    pub unsatisfied: usize,
}

impl Reconciliation {
    /// Number of failures reported, which is every outcome but a match.
    pub fn failures(&self) -> usize {
        self.unexpected + self.mismatched + self.unsatisfied
    }

    /// True when nothing was reported.
    pub fn passed(&self) -> bool {
        self.failures() == 0
    }
}

/// Matches findings against the expectation index and reports discrepancies.
///
/// Each expectation is consumed by the first finding at its position, so a
/// second finding on the same line is reported as unexpected. Patterns match
/// anywhere within the message.
pub fn reconcile(
    findings: &[Finding],
    mut expectations: ExpectationIndex,
    sanitizer: &Sanitizer,
    reporter: &mut dyn Reporter,
) -> Reconciliation {
    let mut outcome = Reconciliation::default();

    for finding in findings {
        let position = sanitizer.sanitized(&finding.position);

        let Some(rx) = expectations.take(&position) else {
            outcome.unexpected += 1;
            reporter.report(format_args!(
                "{}: unexpected finding: {}",
                position, finding.message
            ));
            continue;
        };

        if rx.is_match(&finding.message) {
            debug!("Finding at {} matched {:?}", position, rx.as_str());
            outcome.matched += 1;
        } else {
            outcome.mismatched += 1;
            reporter.report(format_args!(
                "{}: finding {:?} does not match pattern {:?}",
                position,
                finding.message,
                rx.as_str()
            ));
        }
    }

    for (position, rx) in expectations {
        outcome.unsatisfied += 1;
        reporter.report(format_args!(
            "{}: expected finding matching {:?}",
            position,
            rx.as_str()
        ));
    }

    outcome
}
