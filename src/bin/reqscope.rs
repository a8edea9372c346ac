use std::process::ExitCode;

use clap::Parser;
use reqscope::cli::{Outcome, ResolveArgs};
use reqscope::{ReqscopeError, Resolver};
use tracing_subscriber::EnvFilter;

/// Print the effective configuration of one request in a collection.
#[derive(Debug, Parser)]
#[command(name = "reqscope", version)]
struct Cli {
    #[command(flatten)]
    resolve: ResolveArgs,

    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("reqscope={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render(outcome: Outcome) -> Result<String, serde_json::Error> {
    match outcome {
        Outcome::Template(text) => Ok(text),
        Outcome::Resolved(config) => serde_json::to_string_pretty(&config),
        Outcome::Variables(variables) => serde_json::to_string_pretty(&variables),
    }
}

fn report(err: &ReqscopeError) {
    eprintln!("error: {err}");
    if let ReqscopeError::UnknownKeys(errors) = err {
        for inner in errors {
            eprintln!("  {inner}");
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.resolve.execute(Resolver::builder()) {
        Ok(outcome) => outcome,
        Err(err) => {
            report(&err);
            return ExitCode::FAILURE;
        }
    };

    match render(outcome) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: failed to render output: {err}");
            ExitCode::FAILURE
        }
    }
}
