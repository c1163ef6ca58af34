use anyhow::{Context, Result};
use chrono::Local;

use praytimes::args::{CliAction, ParsedArgs, RunOptions, display_help, display_version_info};
use praytimes::constants::EXIT_FAILURE;
use praytimes::timezone::{is_dst, local_timezone};
use praytimes::{Config, Coordinates, Log, MethodCatalog, PrayTimes, TimesRequest};

fn main() -> Result<()> {
    let parsed_args = ParsedArgs::from_env();

    match parsed_args.action {
        CliAction::ShowVersion => display_version_info(),
        CliAction::ShowHelp => display_help(),
        CliAction::ShowHelpDueToError => {
            display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::ListMethods => list_methods(),
        CliAction::Run(options) => {
            Log::set_debug(options.debug_enabled);
            Log::log_version();
            if let Err(e) = run(options) {
                Log::log_pipe();
                Log::log_error(&format!("{:#}", e));
                Log::log_end();
                std::process::exit(EXIT_FAILURE);
            }
        }
    }

    Ok(())
}

fn list_methods() {
    Log::log_version();
    Log::log_decorated("Calculation methods:");
    for method in MethodCatalog::builtin().iter() {
        Log::log_indented(&format!("{:<8} {}", method.id, method.name));
        Log::log_indented(&format!("         {}", method.params));
    }
    Log::log_end();
}

/// Resolve settings from the config file and command line, then print the times.
fn run(options: RunOptions) -> Result<()> {
    let (config, config_path) = match &options.config_path {
        Some(path) => (Config::load_from_path(path)?, path.clone()),
        None => (Config::load()?, Config::get_config_path()?),
    };
    if Log::is_debug() {
        config.log_config(&config_path);
    }

    let mut calculator = PrayTimes::new();
    config.apply_to(&mut calculator)?;
    if let Some(method) = &options.method {
        calculator.set_method(method)?;
    }
    if let Some(tune) = options.tune {
        calculator.tune(tune);
    }

    let mut coordinates = match (options.latitude, options.longitude) {
        (Some(latitude), Some(longitude)) => Coordinates::new(latitude, longitude),
        (None, None) => config
            .coordinates()
            .context("No location configured; pass --lat and --lon or set them in the config")?,
        _ => anyhow::bail!("--lat and --lon must be given together"),
    };
    if let Some(elevation) = options.elevation.or(config.elevation) {
        coordinates.elevation = elevation;
    }

    let date = options.date.unwrap_or_else(|| Local::now().date_naive());

    // An explicit timezone comes with an explicit DST flag; otherwise ask the system
    let (timezone, dst) = match options.timezone.or(config.timezone) {
        Some(timezone) => (timezone, options.dst || config.dst.unwrap_or(false)),
        None => {
            let timezone = local_timezone(date);
            Log::log_debug(&format!("Using system timezone UTC{:+}", timezone));
            (timezone, is_dst(date))
        }
    };

    let mut builder = TimesRequest::builder(date, coordinates)
        .timezone(timezone)
        .dst(dst);
    if let Some(format) = options.format {
        builder = builder.format(format);
    }
    let request = builder.build()?;

    let times = calculator.get_times(&request);

    Log::log_block_start(&format!(
        "Prayer times for {} ({})",
        date.format("%Y-%m-%d"),
        calculator.method()
    ));
    Log::log_indented(&format!(
        "Location: {:.4}, {:.4}  UTC{:+}",
        coordinates.latitude,
        coordinates.longitude,
        request.effective_timezone()
    ));
    Log::log_pipe();
    for (event, value) in times.iter() {
        Log::log_decorated(&format!("{:<9} {}", event.name(), value));
    }
    Log::log_end();

    Ok(())
}
