use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use serde::Serialize;

use nflint::config;
use nflint::ledger::{Finding, Ledger, Severity};
use nflint::lint::{LintReport, Linter, ReleaseEnv, Stop};
use nflint::registry::HttpRegistry;
use nflint::workflow::NextflowCli;

#[derive(Parser)]
#[command(
    name = "nflint",
    version,
    about = "Check a Nextflow pipeline against the nf-core guidelines"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lint a pipeline directory
    Lint(LintArgs),
}

#[derive(Parser)]
struct LintArgs {
    /// Pipeline directory
    #[arg(value_name = "PIPELINE_DIR", default_value = ".")]
    dir: PathBuf,
    /// Also check that all version strings agree, as required for a release
    #[arg(long)]
    release: bool,
    /// Write the findings as JSON to this file
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,
    /// Registry request timeout in seconds (overrides .nflint.yml)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
    /// Increase verbosity; -v also lists passed tests
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// JSON report layout.
#[derive(Serialize)]
struct JsonReport<'a> {
    passed: &'a [Finding],
    warned: &'a [Finding],
    failed: &'a [Finding],
    halted: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let Command::Lint(args) = cli.command;

    init_logging(args.verbose);

    match lint(&args) {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Release information exported by the CI service.
fn release_env() -> ReleaseEnv {
    ReleaseEnv {
        tag: std::env::var("TRAVIS_TAG").ok(),
        repo_slug: std::env::var("TRAVIS_REPO_SLUG").ok(),
    }
}

fn lint(args: &LintArgs) -> Result<LintReport> {
    let mut cfg = config::load(&args.dir)?;
    if let Some(secs) = args.timeout {
        cfg.http_timeout = secs;
    }

    let workflow = NextflowCli::new(cfg.nextflow_binary.clone());
    let registry = HttpRegistry::new(&cfg);
    let linter = Linter::new(&workflow, &registry).with_release_env(release_env());

    log::info!("Linting pipeline: '{}'", args.dir.display());
    let report = linter.run(&args.dir, args.release)?;

    print_report(&report, &cfg.errors_url, args.verbose > 0);

    if let Some(path) = &args.json {
        write_json(&report.ledger, report.halted_early(), path)?;
    }

    Ok(report)
}

fn print_report(report: &LintReport, errors_url: &str, show_passed: bool) {
    let ledger = &report.ledger;

    println!();
    println!("{}", ledger.counts());
    if report.release_mode {
        println!("{:>4} Using --release mode linting tests", "");
    }
    match &report.stop {
        Stop::Completed => {}
        Stop::Halted { rule } => println!("{:>4} Stopped after '{rule}'", ""),
        Stop::Critical { message } => println!("{:>4} {}", "", message.as_str().red()),
    }

    for severity in Severity::ALL {
        if severity == Severity::Pass && !show_passed {
            continue;
        }
        let Some(block) = ledger.render_block(severity, errors_url) else {
            continue;
        };
        let (heading, body) = block.split_once('\n').unwrap_or((block.as_str(), ""));
        let heading = match severity {
            Severity::Pass => heading.green(),
            Severity::Warn => heading.yellow(),
            Severity::Fail => heading.red(),
        };
        println!();
        println!("{}", heading.bold());
        println!("{body}");
    }
    println!();
}

fn write_json(ledger: &Ledger, halted: bool, path: &Path) -> Result<()> {
    let report = JsonReport {
        passed: ledger.passed(),
        warned: ledger.warned(),
        failed: ledger.failed(),
        halted,
    };
    let json = serde_json::to_string_pretty(&report).context("failed to serialise lint report")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write JSON report to {}", path.display()))?;
    log::info!("Wrote JSON report to {}", path.display());
    Ok(())
}
