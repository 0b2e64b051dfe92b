use clap::{Parser, Subcommand};

/// Evaluate tag-driven resource scheduling windows
#[derive(Parser, Debug)]
#[command(name = "tagsched")]
#[command(about = "Evaluate tag-driven resource scheduling windows")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose (debug) logging
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a resource list against an on/off-hour or business-hours filter
    Evaluate(EvaluateArgs),
    /// Parse a tag-value schedule string into its canonical form and range view
    Parse(ParseArgs),
    /// Resolve a timezone alias or IANA zone name
    ResolveTz(ResolveTzArgs),
}

#[derive(clap::Args, Debug)]
pub struct EvaluateArgs {
    /// Filter variant: onhour, offhour, businesshours-on, businesshours-off
    #[arg(long, default_value = "onhour")]
    pub variant: String,

    /// Tag key to read from each resource (defaults vary by variant)
    #[arg(long)]
    pub tag: Option<String>,

    /// Default timezone alias/IANA name (defaults vary by variant)
    #[arg(long)]
    pub default_tz: Option<String>,

    /// Apply the default schedule Mon-Fri instead of all seven days
    #[arg(long)]
    pub weekends: bool,

    /// Apply the default schedule Friday only (source-faithful quirk, wins over --weekends)
    #[arg(long)]
    pub weekends_only: bool,

    /// Treat a missing tag as "apply the default schedule" instead of "skip this resource".
    /// Unset, this defaults to true for businesshours-on/off and false otherwise.
    #[arg(long, conflicts_with = "no_opt_out")]
    pub opt_out: bool,

    /// Force opt_out off, overriding the businesshours-on/off default of true
    #[arg(long)]
    pub no_opt_out: bool,

    /// Default toggle hour for onhour/offhour variants (0-23)
    #[arg(long, default_value_t = 7)]
    pub default_hour: u8,

    /// Default toggle minute for onhour/offhour variants (0-59)
    #[arg(long, default_value_t = 0)]
    pub default_minute: u8,

    /// Business-hours short-form fallback (required for businesshours-* variants)
    #[arg(long)]
    pub businesshours: Option<String>,

    /// Resource-id field name (defaults to InstanceId)
    #[arg(long, default_value = "InstanceId")]
    pub id_field: String,

    /// Directory to write parse_errors.json/opted_out.json into after the pass
    #[arg(long)]
    pub log_dir: Option<String>,

    /// Evaluate as of this RFC3339 instant instead of the system clock
    #[arg(long)]
    pub now: Option<String>,

    /// Input file holding a JSON array of resources (use - for stdin)
    #[arg(long, default_value = "-")]
    pub input: String,

    /// Output format: json, text
    #[arg(long, default_value = "json")]
    pub output_format: String,
}

#[derive(clap::Args, Debug)]
pub struct ParseArgs {
    /// The raw tag-value schedule string, e.g. "on=(m-f,7);off=(m-f,19);tz=pt"
    pub value: String,

    /// Default timezone used when the value omits `tz=`
    #[arg(long, default_value = "et")]
    pub default_tz: String,

    /// Output format: json, text
    #[arg(long, default_value = "json")]
    pub output_format: String,
}

#[derive(clap::Args, Debug)]
pub struct ResolveTzArgs {
    /// Timezone alias (pt, et, ...) or IANA zone name
    pub zone: String,

    /// Output format: json, text
    #[arg(long, default_value = "text")]
    pub output_format: String,
}
