use log::{debug, warn};
use sfout::{OutputSource, Selector};
use std::io::{self, Write};
use tolerance::{Tolerance, Verdict};

/// One expected value in the output
#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    pub variable: Selector,
    pub expected: f64,
    pub tolerance: Tolerance,
}

impl Check {
    pub fn new(variable: Selector, expected: f64, tolerance: Tolerance) -> Self {
        Check {
            variable,
            expected,
            tolerance,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Passed { actual: f64, verdict: Verdict },
    Failed { actual: f64, verdict: Verdict },
    /// The value couldn't be read out of the output at all
    Missing { reason: String },
}

impl Outcome {
    /// How many failures this outcome adds to a report: 1 or 0
    pub fn failures(&self) -> usize {
        match self {
            Outcome::Passed { .. } => 0,
            Outcome::Failed { .. } | Outcome::Missing { .. } => 1,
        }
    }

    pub fn passed(&self) -> bool {
        self.failures() == 0
    }
}

/// Look up `check.variable` in `source` and hold it to the expected value
pub fn should_be<S>(source: &S, check: &Check) -> Outcome
where
    S: OutputSource + ?Sized,
{
    let actual = match source.scalar(&check.variable) {
        Ok(v) => v,
        Err(e) => {
            let reason = error_line(&e);
            warn!("couldn't read {} from {}: {}", &check.variable, source.describe(), &reason);
            return Outcome::Missing { reason };
        }
    };

    let verdict = check.tolerance.check(actual, check.expected);
    debug!("{}: {} vs {} -> {:?}", &check.variable, actual, check.expected, &verdict);

    if verdict.passed {
        Outcome::Passed { actual, verdict }
    } else {
        Outcome::Failed { actual, verdict }
    }
}

/// An error and its sources on one line
fn error_line(e: &(dyn std::error::Error + 'static)) -> String {
    let mut line = e.to_string();
    let mut cause = e.source();
    while let Some(c) = cause {
        line.push_str(": ");
        line.push_str(&c.to_string());
        cause = c.source();
    }
    line
}

/// The outcomes of running a list of checks against one output
#[derive(Debug, Default)]
pub struct Report {
    pub outcomes: Vec<(Check, Outcome)>,
}

impl Report {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().map(|(_, o)| o.failures()).sum()
    }

    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|(_, o)| o.passed())
    }
}

/// Run every check in order, writing one diagnostic line per check to `wtr`.
/// A failed or unreadable check never stops the ones after it.
pub fn run_checks<S, W>(source: &S, checks: &[Check], mut wtr: W) -> io::Result<Report>
where
    S: OutputSource + ?Sized,
    W: Write,
{
    let mut report = Report::default();

    for check in checks {
        let outcome = should_be(source, check);
        write_outcome(&mut wtr, check, &outcome)?;
        report.outcomes.push((check.clone(), outcome));
    }

    Ok(report)
}

pub fn write_outcome<W: Write>(mut wtr: W, check: &Check, outcome: &Outcome) -> io::Result<()> {
    let expected = Num(check.expected);

    match outcome {
        Outcome::Passed { actual, verdict } => writeln!(
            wtr,
            "    Test passed:   Variable {} should be close to {}, and it is {} (deviation {})",
            &check.variable,
            expected,
            Num(*actual),
            Num(verdict.deviation)
        ),
        Outcome::Failed { actual, verdict } => writeln!(
            wtr,
            "*** TEST FAILED!! Variable {} should be close to {}, but it is instead {} (deviation {} > {})",
            &check.variable,
            expected,
            Num(*actual),
            Num(verdict.deviation),
            Num(verdict.bound)
        ),
        Outcome::Missing { reason } => writeln!(
            wtr,
            "*** TEST FAILED!! Variable {} could not be read: {}",
            &check.variable, reason
        ),
    }
}

/// Shortest round-trip float formatting, switching to exponent notation
/// for very small and very large magnitudes
struct Num(f64);

impl std::fmt::Display for Num {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mag = self.0.abs();
        if self.0 == 0.0 || !self.0.is_finite() || (1e-4..1e16).contains(&mag) {
            write!(f, "{}", self.0)
        } else {
            write!(f, "{:e}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{expected_output, sfincs_output, FSAB_FLOW, HEAT_FLUX};

    fn check(var: &str, expected: f64) -> Check {
        Check::new(Selector::parse(var).unwrap(), expected, Tolerance::default())
    }

    fn example_checks() -> Vec<Check> {
        vec![
            check("FSABFlow[0,0;;;]", FSAB_FLOW),
            check("heatFlux_vm_psiHat[0,0;;;]", HEAT_FLUX),
        ]
    }

    fn run(source: &sfout::MemOutput) -> (Report, String) {
        let mut buf = Vec::new();
        let report = run_checks(source, &example_checks(), &mut buf).unwrap();
        (report, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn expected_values_pass() {
        let (report, text) = run(&expected_output());

        assert!(report.passed());
        assert_eq!(report.failures(), 0);
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|l| l.starts_with("    Test passed:")), "{}", text);
        assert!(text.contains("FSABFlow[0,0;;;] should be close to -0.19232736224836933"), "{}", text);
        assert!(text.contains("should be close to 1.0700691260534577e-7"), "{}", text);
    }

    #[test]
    fn small_drift_passes() {
        let source = sfincs_output(FSAB_FLOW * 1.0005, HEAT_FLUX * 0.9995);
        assert!(run(&source).0.passed());
    }

    #[test]
    fn one_failure_is_counted_and_the_rest_still_run() {
        let source = sfincs_output(-0.2, HEAT_FLUX);
        let (report, text) = run(&source);

        assert!(!report.passed());
        assert_eq!(report.failures(), 1);
        assert!(!report.outcomes[0].1.passed());
        assert!(report.outcomes[1].1.passed());
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("*** TEST FAILED!! Variable FSABFlow[0,0;;;]"));
        assert!(lines.next().unwrap().starts_with("    Test passed:"));
    }

    #[test]
    fn both_failing() {
        let source = sfincs_output(0.19232736224836933, 2.0 * HEAT_FLUX);
        assert_eq!(run(&source).0.failures(), 2);
    }

    #[test]
    fn missing_dataset_is_a_failure() {
        let source = sfout::MemOutput::new("partial").with(
            "FSABFlow",
            sfout::Dataset::new(vec![1, 1], vec![FSAB_FLOW]).unwrap(),
        );
        let (report, text) = run(&source);

        assert_eq!(report.failures(), 1);
        match &report.outcomes[1].1 {
            Outcome::Missing { reason } => assert!(reason.contains("heatFlux_vm_psiHat"), "{}", reason),
            other => panic!("expected a missing value, got {:?}", other),
        }
        assert!(text.contains("Variable heatFlux_vm_psiHat[0,0;;;] could not be read"), "{}", text);
    }

    #[test]
    fn out_of_range_index_is_a_failure() {
        let outcome = should_be(&expected_output(), &check("FSABFlow[0,1;;;]", FSAB_FLOW));
        assert_eq!(outcome.failures(), 1);
        match outcome {
            Outcome::Missing { reason } => assert!(reason.contains("axis 1"), "{}", reason),
            other => panic!("expected a missing value, got {:?}", other),
        }
    }

    #[test]
    fn number_formatting() {
        assert_eq!(Num(-0.19232736224836933).to_string(), "-0.19232736224836933");
        assert_eq!(Num(1.07006912605345766e-07).to_string(), "1.0700691260534577e-7");
        assert_eq!(Num(0.0).to_string(), "0");
        assert_eq!(Num(2.5e20).to_string(), "2.5e20");
    }
}
