mod cli;
mod error;
mod evaluate_cmd;
mod parse_cmd;
mod shared;
mod tz_cmd;

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use cli::{Cli, Commands};
use error::{OutputFormat, parse_output_format, render_error};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!("Parsed CLI args: {:?}", cli);

    match cli.command {
        Commands::Evaluate(args) => execute_evaluate(args),
        Commands::Parse(args) => execute_parse(args),
        Commands::ResolveTz(args) => execute_resolve_tz(args),
    }
}

fn execute_evaluate(args: cli::EvaluateArgs) -> ExitCode {
    let fallback = output_format_hint(&args.output_format);
    let output_format = match parse_output_format(&args.output_format) {
        Ok(format) => format,
        Err(err) => return render_error(&err, fallback),
    };

    match evaluate_cmd::run_evaluate(args, output_format) {
        Ok(code) => code,
        Err(err) => render_error(&err, output_format),
    }
}

fn execute_parse(args: cli::ParseArgs) -> ExitCode {
    let fallback = output_format_hint(&args.output_format);
    let output_format = match parse_output_format(&args.output_format) {
        Ok(format) => format,
        Err(err) => return render_error(&err, fallback),
    };

    match parse_cmd::run_parse(args, output_format) {
        Ok(code) => code,
        Err(err) => render_error(&err, output_format),
    }
}

fn execute_resolve_tz(args: cli::ResolveTzArgs) -> ExitCode {
    let fallback = output_format_hint(&args.output_format);
    let output_format = match parse_output_format(&args.output_format) {
        Ok(format) => format,
        Err(err) => return render_error(&err, fallback),
    };

    match tz_cmd::run_resolve_tz(args, output_format) {
        Ok(code) => code,
        Err(err) => render_error(&err, output_format),
    }
}

fn output_format_hint(s: &str) -> OutputFormat {
    if s.eq_ignore_ascii_case("json") {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    }
}
