use crate::checks::Check;
use log::{debug, info};
use serde_derive::Deserialize;
use sfout::{Selector, SelectorError, DEFAULT_OUTPUT};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tolerance::{Tolerance, ToleranceError, DEFAULT_RELATIVE};

/// File name that marks a directory as a checked example
pub const CHECK_FILE: &str = "checks.toml";

/// Name of the example the built-in checks belong to
pub const BUILTIN_EXAMPLE: &str = "tokamak_1species_FPCollisions_withEr_fullTrajectories";

/// Expected values for the built-in example at `DEFAULT_RELATIVE` tolerance
const BUILTIN_CHECKS: &[(&str, f64)] = &[
    ("FSABFlow[0,0;;;]", -0.19232736224836933),
    ("heatFlux_vm_psiHat[0,0;;;]", 1.07006912605345766E-007),
];

#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("couldn't read check file <{0}>")]
    Io(PathBuf, #[source] io::Error),
    #[error("check file <{0}> is not valid")]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("check #{0} has a bad variable selector")]
    Selector(usize, #[source] SelectorError),
    #[error("check #{0} ({1}) has a bad tolerance")]
    Tolerance(usize, String, #[source] ToleranceError),
    #[error("bad default tolerance")]
    DefaultTolerance(#[source] ToleranceError),
    #[error("no checks in <{0}>")]
    NoChecks(PathBuf),
}

/// Contents of a `checks.toml`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CheckFile {
    output: Option<PathBuf>,
    tolerance: Option<f64>,
    #[serde(rename = "check", default)]
    checks: Vec<RawCheck>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCheck {
    variable: String,
    expected: f64,
    tolerance: Option<f64>,
    #[serde(default)]
    absolute: bool,
}

/// The checks for one example and where its output lives
#[derive(Debug)]
pub struct Suite {
    pub name: String,
    pub output: PathBuf,
    pub checks: Vec<Check>,
}

impl Suite {
    /// The checks for the tokamak example, reading `sfincsOutput.h5` from
    /// the current directory. `tolerance` replaces the default relative
    /// tolerance when given.
    pub fn builtin(tolerance: Option<f64>) -> Result<Self, SuiteError> {
        let raw = BUILTIN_CHECKS
            .iter()
            .map(|&(variable, expected)| RawCheck {
                variable: variable.to_string(),
                expected,
                tolerance: None,
                absolute: false,
            })
            .collect::<Vec<_>>();

        Ok(Suite {
            name: BUILTIN_EXAMPLE.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            checks: build_checks(raw, tolerance.unwrap_or(DEFAULT_RELATIVE))?,
        })
    }

    /// Load a `checks.toml`. A relative `output` is resolved against the
    /// check file's directory. `tolerance` replaces the file's default
    /// tolerance, but not per-check ones.
    pub fn from_file(path: &Path, tolerance: Option<f64>) -> Result<Self, SuiteError> {
        info!("loading checks from {}", path.display());
        let text = fs::read_to_string(path).map_err(|e| SuiteError::Io(path.to_path_buf(), e))?;
        let file: CheckFile =
            toml::from_str(&text).map_err(|e| SuiteError::Parse(path.to_path_buf(), e))?;
        debug!("{:#?}", &file);

        if file.checks.is_empty() {
            return Err(SuiteError::NoChecks(path.to_path_buf()));
        }

        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let output = dir.join(file.output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)));
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let default_tol = tolerance.or(file.tolerance).unwrap_or(DEFAULT_RELATIVE);

        Ok(Suite {
            name,
            output,
            checks: build_checks(file.checks, default_tol)?,
        })
    }
}

fn build_checks(raw: Vec<RawCheck>, default_tol: f64) -> Result<Vec<Check>, SuiteError> {
    Tolerance::relative(default_tol).map_err(SuiteError::DefaultTolerance)?;

    raw.into_iter()
        .enumerate()
        .map(|(i, rc)| -> Result<Check, SuiteError> {
            let n = i + 1;
            let variable = Selector::parse(&rc.variable).map_err(|e| SuiteError::Selector(n, e))?;
            let bound = rc.tolerance.unwrap_or(default_tol);
            let tolerance = if rc.absolute {
                Tolerance::absolute(bound)
            } else {
                Tolerance::relative(bound)
            }
            .map_err(|e| SuiteError::Tolerance(n, rc.variable.clone(), e))?;

            Ok(Check::new(variable, rc.expected, tolerance))
        })
        .collect()
}
