//! calt - CLI driver for the C/AL toolchain.
//!
//! Subcommands wire the lexer, parser and validators to the filesystem:
//! corpus validation with a markdown health report, the CI baseline
//! ratchet, the lexer trace tool, single-file parsing, and the
//! package/baseline version drift check.

mod commands;
mod error;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser as ClapParser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cal_lex::Lexer;
use cal_par::Parser;

use commands::baseline::run_baseline_check;
use commands::corpus::run_corpus;
use commands::report::render_health_report;
use commands::trace::run_trace;
use commands::version_check::{check_version_match, Stream};
use error::{CaltError, Result};

/// calt - C/AL lexer and parser toolchain driver.
#[derive(ClapParser, Debug)]
#[command(name = "calt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate, trace and ratchet C/AL object text", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, env = "CALT_VERBOSE")]
    verbose: bool,

    /// Disable color output
    #[arg(long, global = true, env = "CALT_NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the lexer and validators over a corpus and emit a health report
    Validate(ValidateCommand),

    /// Compare the corpus failure count against the stored baseline
    Baseline(BaselineCommand),

    /// Print the lexer decision trace for one file
    Trace(TraceCommand),

    /// Parse one file and print its diagnostics
    Parse(ParseCommand),

    /// Warn when package.json and the baseline disagree about the version
    VersionCheck(VersionCheckCommand),
}

#[derive(ClapParser, Debug)]
struct ValidateCommand {
    /// Corpus root directory
    #[arg(long, default_value = "test/REAL")]
    root: PathBuf,

    /// Write the markdown report here instead of stdout
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(ClapParser, Debug)]
struct BaselineCommand {
    /// Corpus root directory
    #[arg(long, default_value = "test/REAL")]
    root: PathBuf,

    /// Baseline JSON file with a maxFailures field
    #[arg(long)]
    baseline: PathBuf,
}

#[derive(ClapParser, Debug)]
struct TraceCommand {
    /// File to trace
    file: PathBuf,

    /// Truncate non-keyword token values in the output
    #[arg(long)]
    sanitize: bool,
}

#[derive(ClapParser, Debug)]
struct ParseCommand {
    /// File to parse
    file: PathBuf,
}

#[derive(ClapParser, Debug)]
struct VersionCheckCommand {
    /// Path to package.json
    #[arg(long, default_value = "package.json")]
    package: PathBuf,

    /// Baseline JSON file carrying a version field
    #[arg(long)]
    baseline: PathBuf,

    /// Emit a single-line ::warning:: annotation instead of a human message
    #[arg(long)]
    annotate: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.verbose, cli.no_color) {
        eprintln!("{err}");
        return ExitCode::from(2);
    }

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool, no_color: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let layer = fmt::layer()
        .with_ansi(!no_color)
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| CaltError::Config(format!("failed to initialize logging: {e}")))?;

    Ok(())
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Validate(args) => run_validate(args),
        Commands::Baseline(args) => {
            let code = run_baseline_check(&args.root, &args.baseline);
            Ok(ExitCode::from(code as u8))
        }
        Commands::Trace(args) => {
            run_trace(&args.file, args.sanitize)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Parse(args) => run_parse(args),
        Commands::VersionCheck(args) => {
            match check_version_match(&args.package, &args.baseline, args.annotate) {
                Some(warning) => match warning.stream {
                    Stream::Stdout => println!("{}", warning.output),
                    Stream::Stderr => eprintln!("{}", warning.output),
                },
                None => {}
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_validate(args: ValidateCommand) -> Result<ExitCode> {
    let results = run_corpus(&args.root)?;
    let report = render_health_report(&results, None);

    match args.report {
        Some(path) => {
            fs::write(&path, report)?;
            tracing::info!(report = %path.display(), "health report written");
        }
        None => print!("{report}"),
    }

    let failed = results.iter().filter(|r| !r.passed()).count();
    tracing::info!(
        total = results.len(),
        failed,
        "corpus validation finished"
    );
    Ok(ExitCode::SUCCESS)
}

fn run_parse(args: ParseCommand) -> Result<ExitCode> {
    let bytes = fs::read(&args.file)?;
    let source = String::from_utf8_lossy(&bytes);

    let tokens = Lexer::new(&source).tokenize();
    let mut parser = Parser::new(tokens);
    parser.parse();

    let errors = parser.errors();
    for error in errors {
        // Messages are sanitized at construction; positions are 1-based.
        println!("{}:{}: {}", error.line(), error.column(), error.message);
    }

    if errors.is_empty() {
        tracing::info!(file = %args.file.display(), "parsed with no errors");
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::info!(
            file = %args.file.display(),
            errors = errors.len(),
            "parsed with errors"
        );
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_validate_defaults() {
        let cli = Cli::parse_from(["calt", "validate"]);
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.root, PathBuf::from("test/REAL"));
        assert!(args.report.is_none());
    }

    #[test]
    fn test_cli_parse_validate_with_report() {
        let cli = Cli::parse_from(["calt", "validate", "--root", "corpus", "--report", "out.md"]);
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.root, PathBuf::from("corpus"));
        assert_eq!(args.report, Some(PathBuf::from("out.md")));
    }

    #[test]
    fn test_cli_parse_baseline() {
        let cli = Cli::parse_from(["calt", "baseline", "--baseline", "baseline.json"]);
        let Commands::Baseline(args) = cli.command else {
            panic!("expected baseline");
        };
        assert_eq!(args.baseline, PathBuf::from("baseline.json"));
        assert_eq!(args.root, PathBuf::from("test/REAL"));
    }

    #[test]
    fn test_cli_parse_trace_with_sanitize() {
        let cli = Cli::parse_from(["calt", "trace", "COD1.TXT", "--sanitize"]);
        let Commands::Trace(args) = cli.command else {
            panic!("expected trace");
        };
        assert_eq!(args.file, PathBuf::from("COD1.TXT"));
        assert!(args.sanitize);
    }

    #[test]
    fn test_cli_parse_version_check() {
        let cli = Cli::parse_from([
            "calt",
            "version-check",
            "--baseline",
            "baseline.json",
            "--annotate",
        ]);
        let Commands::VersionCheck(args) = cli.command else {
            panic!("expected version-check");
        };
        assert!(args.annotate);
        assert_eq!(args.package, PathBuf::from("package.json"));
    }

    #[test]
    fn test_cli_global_verbose() {
        let cli = Cli::parse_from(["calt", "--verbose", "validate"]);
        assert!(cli.verbose);
    }
}
