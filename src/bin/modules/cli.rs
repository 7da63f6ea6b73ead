use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

const AUTHORS: &str = "Tony Kan, Ted Yu, William A. Goddard III";
const ABOUT: &str = "A command-line tool for calculating partial atomic charges with electronegativity equalization and related empirical charge models.";
const COPYRIGHT: &str = "Copyright (c) 2025 California Institute of Technology, Materials and Process Simulation Center (MSC)";
const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser)]
#[command(
    author = AUTHORS,
    version,
    about = ABOUT,
    after_help = COPYRIGHT,
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Input file containing one or more molecules in MDL SDF (V2000) format.
    ///
    /// Use '-' to read from standard input. Formal charges are taken from the atom block
    /// charge field, or from `M  CHG` property lines when present.
    #[arg(value_name = "INPUT", required_unless_present = "list_methods")]
    pub input: Option<String>,

    /// List the available methods and exit.
    #[arg(long)]
    pub list_methods: bool,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub calculation: CalculationOptions,

    #[command(flatten)]
    pub logging: LoggingOptions,
}

/// Options for controlling the output format and destination.
#[derive(Args)]
#[command(next_help_heading = "Output Options")]
pub struct OutputOptions {
    /// Output file path.
    ///
    /// If not specified, results are written to standard output.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format for the results.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Number of decimal places to display for charges.
    #[arg(short, long, default_value_t = 6)]
    pub precision: usize,
}

/// Options for choosing and configuring the charge method.
#[derive(Args)]
#[command(next_help_heading = "Calculation Options")]
pub struct CalculationOptions {
    /// Internal name of the charge method (see --list-methods).
    #[arg(short, long, default_value = "eqeq")]
    pub method: String,

    /// Parameter file in TOML format.
    ///
    /// Required by every method that reads parameters; its name lists must match the
    /// method exactly.
    #[arg(short = 'P', long, value_name = "FILE")]
    pub par_file: Option<PathBuf>,

    /// Method option as KEY=VALUE, for example `type=cutoff` or `iters=5`.
    ///
    /// May be given several times.
    #[arg(long = "method-option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub method_options: Vec<(String, String)>,

    /// Retry atoms and bonds that match no parameter key with relaxed bond-order matching.
    #[arg(long)]
    pub permissive_types: bool,
}

/// Options for controlling diagnostic output.
#[derive(Args)]
#[command(next_help_heading = "Logging Options")]
pub struct LoggingOptions {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Silence all log output.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Additionally write logs to this file, without colors.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Output format for the calculation results.
#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed tables with a run summary and per-atom charges.
    Pretty,
    /// Comma-separated values with columns: molecule, index, element, charge.
    Csv,
    /// Plain text: the molecule name on one line, its charges on the next.
    Txt,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing option name in '{s}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
