use std::process::ExitCode;

use serde::Serialize;
use tagsched_core::parser::ScheduleParser;
use tagsched_core::range::get_ranges;

use crate::cli::ParseArgs;
use crate::error::{CliError, CliResult, EXIT_SUCCESS, OutputFormat};

#[derive(Debug, Serialize)]
struct ParseResult {
    input: String,
    canonical: String,
    tz: String,
    on_toggles: usize,
    off_toggles: usize,
    ranges: Vec<DayRanges>,
}

#[derive(Debug, Serialize)]
struct DayRanges {
    weekday: u8,
    intervals: Vec<Interval>,
}

#[derive(Debug, Serialize)]
struct Interval {
    start: Option<String>,
    end: Option<String>,
}

pub fn run_parse(args: ParseArgs, output_format: OutputFormat) -> CliResult<ExitCode> {
    let parser = ScheduleParser::new();
    let lowered = args.value.to_ascii_lowercase();
    let schedule = parser.parse(&lowered, &args.default_tz).ok_or_else(|| {
        CliError::input(format!(
            "Could not parse schedule value '{}'",
            args.value
        ))
    })?;

    let canonical = tagsched_core::serialize::to_canonical(&schedule);
    let ranges = get_ranges(&schedule);
    let result = ParseResult {
        input: args.value,
        canonical,
        tz: schedule.tz.clone(),
        on_toggles: schedule.on.len(),
        off_toggles: schedule.off.len(),
        ranges: ranges
            .into_iter()
            .map(|(weekday, intervals)| DayRanges {
                weekday,
                intervals: intervals
                    .into_iter()
                    .map(|r| Interval {
                        start: r.start.map(|t| t.to_string()),
                        end: r.end.map(|t| t.to_string()),
                    })
                    .collect(),
            })
            .collect(),
    };

    match output_format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| CliError::runtime(format!("Failed to serialize JSON: {}", e)))?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("canonical: {}", result.canonical);
            println!("tz:        {}", result.tz);
            for day in &result.ranges {
                for interval in &day.intervals {
                    println!(
                        "  weekday {}: {} .. {}",
                        day.weekday,
                        interval.start.as_deref().unwrap_or("?"),
                        interval.end.as_deref().unwrap_or("?")
                    );
                }
            }
        }
    }

    Ok(ExitCode::from(EXIT_SUCCESS))
}
