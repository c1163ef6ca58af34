//! Command-line argument parsing and processing.
//!
//! Flags that take a value read it from the next argument, so negative numbers
//! work as expected (`--lon -80`). Invalid values and unknown options are
//! reported as warnings and lead to the help screen.

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::events::TimeOffsets;
use crate::format::TimeFormat;
use crate::logger::Log;

/// Settings given on the command line. Each one overrides the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub debug_enabled: bool,
    pub date: Option<NaiveDate>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
    pub timezone: Option<f64>,
    pub dst: bool,
    pub format: Option<TimeFormat>,
    pub method: Option<String>,
    pub tune: Option<TimeOffsets>,
    pub config_path: Option<PathBuf>,
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Compute and print the times
    Run(RunOptions),
    /// Print the available calculation methods and exit
    ListMethods,
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown or invalid arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

/// Parse the value following `flag`, advancing the cursor past it.
fn parse_value<T>(
    args: &[String],
    index: &mut usize,
    flag: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    let Some(raw) = args.get(*index + 1) else {
        Log::log_warning(&format!("Missing value for {}", flag));
        return None;
    };
    *index += 1;

    let parsed = parse(raw);
    if parsed.is_none() {
        Log::log_warning(&format!("Invalid value for {}: {}", flag, raw));
    }
    parsed
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first item is taken to be the program name and skipped.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = RunOptions::default();
        let mut display_help = false;
        let mut display_version = false;
        let mut list_methods = false;
        let mut invalid_arg_found = false;

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut i = 0;
        while i < args_vec.len() {
            let arg_str = args_vec[i].as_str();
            // Every value-taking flag reports failure through `ok`
            let ok = match arg_str {
                "--help" | "-h" => {
                    display_help = true;
                    true
                }
                "--version" | "-V" | "-v" => {
                    display_version = true;
                    true
                }
                "--debug" | "-d" => {
                    options.debug_enabled = true;
                    true
                }
                "--list-methods" | "-l" => {
                    list_methods = true;
                    true
                }
                "--dst" => {
                    options.dst = true;
                    true
                }
                "--date" => {
                    options.date = parse_value(&args_vec, &mut i, arg_str, |s| {
                        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
                    });
                    options.date.is_some()
                }
                "--lat" => {
                    options.latitude = parse_value(&args_vec, &mut i, arg_str, |s| s.parse().ok());
                    options.latitude.is_some()
                }
                "--lon" => {
                    options.longitude = parse_value(&args_vec, &mut i, arg_str, |s| s.parse().ok());
                    options.longitude.is_some()
                }
                "--elevation" => {
                    options.elevation = parse_value(&args_vec, &mut i, arg_str, |s| s.parse().ok());
                    options.elevation.is_some()
                }
                "--tz" => {
                    options.timezone = parse_value(&args_vec, &mut i, arg_str, |s| s.parse().ok());
                    options.timezone.is_some()
                }
                "--format" | "-f" => {
                    options.format = parse_value(&args_vec, &mut i, arg_str, |s| s.parse().ok());
                    options.format.is_some()
                }
                "--method" | "-m" => {
                    options.method = parse_value(&args_vec, &mut i, arg_str, |s| Some(s.to_string()));
                    options.method.is_some()
                }
                "--tune" => {
                    options.tune = parse_value(&args_vec, &mut i, arg_str, |s| s.parse().ok());
                    options.tune.is_some()
                }
                "--config" | "-c" => {
                    options.config_path =
                        parse_value(&args_vec, &mut i, arg_str, |s| Some(PathBuf::from(s)));
                    options.config_path.is_some()
                }
                _ => {
                    if arg_str.starts_with('-') {
                        Log::log_warning(&format!("Unknown option: {}", arg_str));
                        false
                    } else {
                        // Positional arguments are ignored
                        true
                    }
                }
            };
            invalid_arg_found |= !ok;
            i += 1;
        }

        let action = if display_version {
            CliAction::ShowVersion
        } else if invalid_arg_found {
            CliAction::ShowHelpDueToError
        } else if display_help {
            CliAction::ShowHelp
        } else if list_methods {
            CliAction::ListMethods
        } else {
            CliAction::Run(options)
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    Log::log_version();
    Log::log_pipe();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    Log::log_version();
    Log::log_block_start(env!("CARGO_PKG_DESCRIPTION"));
    Log::log_block_start("Usage: praytimes [OPTIONS]");
    Log::log_block_start("Options:");
    Log::log_indented("    --date <YYYY-MM-DD>   Date to compute (default: today)");
    Log::log_indented("    --lat <DEGREES>       Latitude, positive north");
    Log::log_indented("    --lon <DEGREES>       Longitude, positive east");
    Log::log_indented("    --elevation <METERS>  Height above sea level");
    Log::log_indented("    --tz <HOURS>          Offset from UTC (default: system timezone)");
    Log::log_indented("    --dst                 Add one hour for daylight saving time");
    Log::log_indented("-f, --format <FORMAT>     24h, 12h, 12hNS or Float");
    Log::log_indented("-m, --method <NAME>       Calculation method");
    Log::log_indented("    --tune <n,n,...>      Nine minute offsets, imsak through midnight");
    Log::log_indented("-c, --config <PATH>       Use this config file");
    Log::log_indented("-l, --list-methods        List calculation methods");
    Log::log_indented("-d, --debug               Enable detailed debug output");
    Log::log_indented("-h, --help                Print help information");
    Log::log_indented("-V, --version             Print version information");
    Log::log_end();
}
