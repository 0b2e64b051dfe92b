use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use serde::Serialize;
use tagsched_core::{BusinessHoursFilter, Resource, TimeFilter};

use crate::cli::EvaluateArgs;
use crate::error::{CliError, CliResult, EXIT_SUCCESS, OutputFormat};
use crate::shared::{build_clock, build_filter_config, parse_variant};

#[derive(Debug, Serialize)]
struct EvaluateResult {
    variant: String,
    matched: Vec<Resource>,
    matched_count: usize,
    enabled_count: usize,
    opted_out_count: usize,
    parse_error_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parse_errors: Vec<ParseErrorEntry>,
}

#[derive(Debug, Serialize)]
struct ParseErrorEntry {
    id: String,
    value: String,
}

pub fn run_evaluate(args: EvaluateArgs, output_format: OutputFormat) -> CliResult<ExitCode> {
    let variant = parse_variant(&args.variant)?;
    let opt_out = if args.opt_out {
        true
    } else if args.no_opt_out {
        false
    } else {
        variant.is_business_hours()
    };
    let config = build_filter_config(
        variant,
        args.tag.clone(),
        args.default_tz.clone(),
        args.weekends,
        args.weekends_only,
        opt_out,
        args.default_hour,
        args.default_minute,
        args.businesshours.clone(),
    );
    let clock = build_clock(&args.now)?;
    let resources = read_resources(&args.input)?;

    let (matched, enabled_count, opted_out_count, parse_errors) = if variant.is_business_hours() {
        let mut filter = BusinessHoursFilter::new(config, clock)?.with_id_field(args.id_field);
        if let Some(dir) = args.log_dir.clone() {
            filter = filter.with_log_dir(dir);
        }
        let (matched, summary) = filter.process(&resources);
        (
            matched,
            summary.enabled_count,
            summary.opted_out.len(),
            summary.parse_errors,
        )
    } else {
        let mut filter = TimeFilter::new(config, clock)?.with_id_field(args.id_field);
        if let Some(dir) = args.log_dir.clone() {
            filter = filter.with_log_dir(dir);
        }
        let (matched, summary) = filter.process(&resources);
        (
            matched,
            summary.enabled_count,
            summary.opted_out.len(),
            summary.parse_errors,
        )
    };

    let result = EvaluateResult {
        variant: args.variant,
        matched_count: matched.len(),
        matched,
        enabled_count,
        opted_out_count,
        parse_error_count: parse_errors.len(),
        parse_errors: parse_errors
            .into_iter()
            .map(|(id, value)| ParseErrorEntry { id, value })
            .collect(),
    };

    match output_format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| CliError::runtime(format!("Failed to serialize JSON: {}", e)))?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("variant:           {}", result.variant);
            println!("matched:           {}", result.matched_count);
            println!("enabled:           {}", result.enabled_count);
            println!("opted out:         {}", result.opted_out_count);
            println!("parse errors:      {}", result.parse_error_count);
            for entry in &result.parse_errors {
                println!("  {} -> {}", entry.id, entry.value);
            }
        }
    }

    Ok(ExitCode::from(EXIT_SUCCESS))
}

fn read_resources(input: &str) -> CliResult<Vec<Resource>> {
    let body = if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::runtime(format!("Failed to read stdin: {}", e)))?;
        buf
    } else {
        fs::read_to_string(input)
            .map_err(|e| CliError::runtime(format!("Failed to read file '{}': {}", input, e)))?
    };

    let values: Vec<serde_json::Value> = serde_json::from_str(&body)
        .map_err(|e| CliError::input(format!("Input is not a JSON array of resources: {}", e)))?;

    values
        .into_iter()
        .map(|v| {
            v.as_object()
                .cloned()
                .ok_or_else(|| CliError::input("Each resource must be a JSON object".to_string()))
        })
        .collect()
}
