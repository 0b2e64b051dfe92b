use std::process::ExitCode;

use serde::Serialize;
use tagsched_core::prelude::resolve_tz;

use crate::cli::ResolveTzArgs;
use crate::error::{CliError, CliResult, EXIT_SUCCESS, OutputFormat};

#[derive(Debug, Serialize)]
struct ResolveTzResult {
    input: String,
    iana_name: String,
}

pub fn run_resolve_tz(args: ResolveTzArgs, output_format: OutputFormat) -> CliResult<ExitCode> {
    let tz = resolve_tz(&args.zone)
        .map_err(|e| CliError::input(format!("Invalid timezone '{}': {}", args.zone, e)))?;

    let result = ResolveTzResult {
        input: args.zone,
        iana_name: tz.name().to_string(),
    };

    match output_format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| CliError::runtime(format!("Failed to serialize JSON: {}", e)))?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("{} -> {}", result.input, result.iana_name);
        }
    }

    Ok(ExitCode::from(EXIT_SUCCESS))
}
