use crate::checks::run_checks;
use crate::suite::{Suite, CHECK_FILE};
use anyhow::{Context, Result};
use log::{error, info};
use sfout::{OutputSource, SourceError};
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every `checks.toml` below `roots`, in path order
pub fn iter_check_files(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = roots
        .iter()
        .flat_map(|entry| {
            WalkDir::new(&entry)
                .into_iter()
                .filter_map(|e| e.ok())
                .map(|e| e.path().to_path_buf())
        })
        .filter(is_check_file)
        .collect();

    files.sort();
    files.dedup();
    files
}

#[inline]
fn is_check_file(file: &PathBuf) -> bool {
    file.is_file() && file.file_name().map(|f| f == CHECK_FILE).unwrap_or(false)
}

#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    pub passed: usize,
    pub total: usize,
}

impl Summary {
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

/// Run the checks of every example found below `roots`.
///
/// An example whose checks or output can't be loaded counts as failed and
/// the remaining examples still run. Only failing to write the report
/// stops the walk.
pub fn run_examples<F, W>(
    roots: &[PathBuf],
    tolerance: Option<f64>,
    open: F,
    mut wtr: W,
) -> Result<Summary>
where
    F: Fn(&Path) -> Result<Box<dyn OutputSource>, SourceError>,
    W: Write,
{
    let mut summary = Summary::default();

    for check_file in iter_check_files(roots) {
        let dir = check_file.parent().unwrap_or_else(|| Path::new(""));
        summary.total += 1;
        writeln!(wtr, "## {}", dir.display()).context("writing report")?;

        let result = Suite::from_file(&check_file, tolerance)
            .context("loading checks")
            .and_then(|suite| {
                let source = open(&suite.output)
                    .with_context(|| format!("opening output for {}", &suite.name))?;
                Ok((suite, source))
            });

        let (suite, source) = match result {
            Ok(loaded) => loaded,
            Err(e) => {
                error!("skipping example <{}> due to:", dir.display());
                errlog::print_chain(&e);
                writeln!(wtr, "*** EXAMPLE FAILED!! {}", errlog::one_line(&e))
                    .context("writing report")?;
                continue;
            }
        };

        let report = run_checks(&*source, &suite.checks, &mut wtr).context("writing report")?;
        info!("{}: {} failure(s)", &suite.name, report.failures());
        if report.passed() {
            summary.passed += 1;
        }
    }

    writeln!(wtr, "\n{}/{} examples passed", summary.passed, summary.total)
        .context("writing report")?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use test_utils::{expected_output, sfincs_output, HEAT_FLUX};

    const TOKAMAK_CHECKS: &str = r#"
[[check]]
variable = "FSABFlow[0,0;;;]"
expected = -0.19232736224836933

[[check]]
variable = "heatFlux_vm_psiHat[0,0;;;]"
expected = 1.07006912605345766e-7
"#;

    fn example(root: &Path, name: &str, output: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CHECK_FILE), TOKAMAK_CHECKS).unwrap();
        fs::write(dir.join("sfincsOutput.h5"), output).unwrap();
    }

    /// Stands in for the HDF5 reader: the fake output file holds a word
    /// saying which in-memory output to hand back
    fn fake_open(path: &Path) -> Result<Box<dyn OutputSource>, SourceError> {
        let open_err = |cause: &str| SourceError::Open {
            path: path.to_path_buf(),
            cause: cause.to_string().into(),
        };
        match fs::read_to_string(path).map_err(|_| open_err("no such file"))?.as_str() {
            "good" => Ok(Box::new(expected_output())),
            "drifted" => Ok(Box::new(sfincs_output(-0.3, HEAT_FLUX))),
            _ => Err(open_err("not an output file")),
        }
    }

    #[test]
    fn finds_check_files_in_order() {
        let dir = TempDir::new().unwrap();
        example(dir.path(), "b_example", "good");
        example(dir.path(), "a_example", "good");
        fs::create_dir_all(dir.path().join("no_checks")).unwrap();

        let found = iter_check_files(&[dir.path().to_path_buf()]);
        assert_eq!(
            found,
            vec![
                dir.path().join("a_example").join(CHECK_FILE),
                dir.path().join("b_example").join(CHECK_FILE),
            ]
        );
    }

    #[test]
    fn all_examples_pass() {
        let dir = TempDir::new().unwrap();
        example(dir.path(), "tokamak", "good");
        example(dir.path(), "tokamak_copy", "good");

        let mut buf = Vec::new();
        let summary = run_examples(&[dir.path().to_path_buf()], None, fake_open, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(summary, Summary { passed: 2, total: 2 });
        assert!(summary.all_passed());
        assert_eq!(text.matches("Test passed").count(), 4, "{}", text);
        assert!(text.ends_with("2/2 examples passed\n"), "{}", text);
    }

    #[test]
    fn failures_and_broken_examples_are_counted() {
        let dir = TempDir::new().unwrap();
        example(dir.path(), "a_good", "good");
        example(dir.path(), "b_drifted", "drifted");
        example(dir.path(), "c_broken", "garbage");
        let no_output = dir.path().join("d_no_output");
        fs::create_dir_all(&no_output).unwrap();
        fs::write(no_output.join(CHECK_FILE), TOKAMAK_CHECKS).unwrap();

        let mut buf = Vec::new();
        let summary = run_examples(&[dir.path().to_path_buf()], None, fake_open, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(summary, Summary { passed: 1, total: 4 });
        assert!(!summary.all_passed());
        assert_eq!(text.matches("*** TEST FAILED!!").count(), 1, "{}", text);
        assert_eq!(text.matches("*** EXAMPLE FAILED!!").count(), 2, "{}", text);
        assert!(text.contains("not an output file"), "{}", text);
        assert!(text.contains("1/4 examples passed"), "{}", text);
    }

    #[test]
    fn loose_tolerance_applies_to_every_example() {
        let dir = TempDir::new().unwrap();
        example(dir.path(), "drifted", "drifted");

        let summary = run_examples(&[dir.path().to_path_buf()], Some(0.6), fake_open, std::io::sink()).unwrap();
        assert!(summary.all_passed());
    }

    #[test]
    fn nothing_to_run() {
        let dir = TempDir::new().unwrap();
        let summary = run_examples(&[dir.path().to_path_buf()], None, fake_open, std::io::sink()).unwrap();
        assert_eq!(summary, Summary { passed: 0, total: 0 });
    }
}
