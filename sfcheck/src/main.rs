mod checks;
mod output;
mod proc_examples;
mod suite;

use anyhow::{Context, Result};
use flexi_logger::{default_format, Logger};
use log::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

use crate::suite::Suite;

#[derive(Debug, StructOpt)]
/// Check that a SFINCS output file holds the expected diagnostic values.
///
/// With no arguments, reads ./sfincsOutput.h5 and runs the checks for the
/// tokamak_1species_FPCollisions_withEr_fullTrajectories example. Exits
/// with status 1 if any check fails.
#[structopt(name = "sfcheck")]
struct Opts {
    /// Simulation output file; defaults to sfincsOutput.h5 (next to the check file, if one is given)
    #[structopt(parse(from_os_str))]
    output: Option<PathBuf>,
    /// TOML file of checks to run instead of the built-in ones
    #[structopt(short, long, parse(from_os_str))]
    checks: Option<PathBuf>,
    /// Default relative tolerance for checks that don't set their own
    #[structopt(short, long)]
    tolerance: Option<f64>,
    /// Run every example below these directories that has a checks.toml
    #[structopt(short, long, parse(from_os_str), conflicts_with_all = &["output", "checks"])]
    examples: Vec<PathBuf>,
    /// File to write check results to, or stdout if not present
    #[structopt(short, long, parse(from_os_str))]
    report: Option<PathBuf>,
    /// Print debug info based on the number of "v"s passed
    #[structopt(short = "v", parse(from_occurrences))]
    verbose: u8,
}

fn main() {
    let opts = Opts::from_args();

    let log_level = match opts.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    Logger::with_str(log_level)
        .format(default_format)
        .start()
        .unwrap_or_else(|e| panic!("Logger initialization failed with {}", e));

    let result = run(opts);
    if let Err(e) = &result {
        errlog::print_chain(e);
    }
    ::std::process::exit(exit_code(&result));
}

/// 0 when every check passed; 1 when any failed or the run errored out
fn exit_code(result: &Result<bool>) -> i32 {
    match result {
        Ok(true) => 0,
        Ok(false) | Err(_) => 1,
    }
}

/// Returns whether every check passed
fn run(opts: Opts) -> Result<bool> {
    debug!("{:#?}", &opts);
    let mut wtr = output::create_file_or_stdout(opts.report.as_ref()).context("opening report output")?;

    let passed = if !opts.examples.is_empty() {
        let summary = proc_examples::run_examples(
            &opts.examples,
            opts.tolerance,
            |p: &Path| sfout::open(p),
            &mut wtr,
        )
        .context("running examples")?;
        if summary.total == 0 {
            warn!("no {} files found in {:?}", suite::CHECK_FILE, &opts.examples);
        }
        summary.all_passed()
    } else {
        let suite = match &opts.checks {
            Some(path) => Suite::from_file(path, opts.tolerance).context("loading checks")?,
            None => Suite::builtin(opts.tolerance).context("building default checks")?,
        };
        let output = opts.output.unwrap_or(suite.output);
        info!("checking {} against {}", output.display(), &suite.name);

        let source = sfout::open(&output).context("opening simulation output")?;
        let report = checks::run_checks(&*source, &suite.checks, &mut wtr).context("writing report")?;
        if !report.passed() {
            info!("{} of {} checks failed", report.failures(), suite.checks.len());
        }
        report.passed()
    };

    wtr.flush().context("writing report")?;
    Ok(passed)
}
