mod common;
use std::env::{set_var, var};
use std::error::Error;
use std::path::Path;

use chrono::prelude::*;
use clap::{arg, command, Parser};

use common::config::builder::{ConfigContainer, FFMCConfigBuilder};
use common::helpers::{count_complete, get_input, FFMCRunError};
use common::io::readers::prelude::InputHandler;
use common::io::readers::table::TableInputHandler;
use ffmc::{
    constants::is_missing,
    models::output::{Output, OutputVariableName},
    version::LONG_VERSION,
};
use log::{info, trace, warn};
use ndarray::Array1;
use ndarray_stats::QuantileExt;

#[derive(Parser, Debug)]
#[command(
    version,
    long_version=LONG_VERSION,
    about="Fine Fuel Moisture Code model for daily station weather series",
    long_about="Runs the Fine Fuel Moisture Code (FFMC) of the Canadian Fire Weather Index system over a table of daily noon observations.
Each station carries its own FFMC from day to day, starting from the warm state of a previous run or from the configured seed."
)]
struct Args {
    #[arg(required = true, help = "Path to the configuration file", index = 1)]
    config_path: String,

    #[arg(required = true, help = "Path to the station observation table", index = 2)]
    input_path: String,
}

/// Log min, max and mean of the FFMC over the stations with a value
fn log_summary(output: &Output) {
    let values: Array1<f64> = output
        .get(&OutputVariableName::ffmc)
        .iter()
        .copied()
        .filter(|v| !is_missing(*v))
        .collect();

    match (values.min(), values.max(), values.mean()) {
        (Ok(min), Ok(max), Some(mean)) => info!(
            "FFMC on {} stations: min {:.2}, max {:.2}, mean {:.2}",
            values.len(),
            min,
            max,
            mean
        ),
        _ => warn!("No FFMC value for {}", output.time.format("%Y-%m-%d")),
    }
}

fn run_ffmc(
    model_config: &FFMCConfigBuilder,
    handler: &mut dyn InputHandler,
    all_stations: &[String],
) -> Result<(), FFMCRunError> {
    let stations = model_config.stations.as_deref().unwrap_or(all_stations);
    handler
        .set_stations(stations)
        .map_err(|err| format!("Could not select stations: {}", err))?;

    let timeline = handler.get_timeline();
    let date = timeline
        .first()
        .ok_or("Input table has no observations")?;

    let config = model_config.build(date, stations)?;

    let mut output_writer = config
        .get_output_writer()
        .map_err(|_| "Could not configure output writer")?;
    info!("Writing {} outputs", output_writer.len());

    let mut state = config.new_state();
    let len = state.len();

    for time in timeline {
        let step_time = Utc::now();
        info!("Processing {}", time.format("%Y-%m-%d"));
        let input = get_input(handler, &time, len);
        trace!("Complete observations: {}/{}", count_complete(&input), len);

        let c = Utc::now();
        let skipped = state.update(&input);
        if skipped > 0 {
            warn!("{} stations kept the previous FFMC: missing or invalid data", skipped);
        }
        trace!("Updating state took {} seconds", Utc::now() - c);

        let c = Utc::now();
        let output = state.output(&input);
        log_summary(&output);
        trace!("Generating output took {} seconds", Utc::now() - c);

        let c = Utc::now();
        if let Err(err) = output_writer.write_output(config.get_stations(), &output) {
            warn!("Error writing output: {}", err);
        }
        trace!("Writing output took {} seconds", Utc::now() - c);
        trace!("Step took {} seconds", Utc::now() - step_time);
    }
    output_writer.finish()?;

    info!("Writing warm state");
    let warm_state_name = config.write_warm_state(&state)?;
    info!("Warm state written to {}", warm_state_name);
    Ok(())
}

fn get_input_handler(input_path_str: &str) -> Result<Box<dyn InputHandler>, Box<dyn Error>> {
    let input_path = Path::new(&input_path_str);
    if !input_path.is_file() {
        return Err(format!("Input path {} is not valid", input_path_str).into());
    }
    info!(
        "Loading input data from {} using TableInputHandler",
        input_path_str
    );
    let handler = TableInputHandler::new(input_path_str)
        .map_err(|err| format!("Could not load input data: {}", err))?;
    Ok(Box::new(handler))
}

/// main function
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let config_path_str = args.config_path;
    let input_path_str = args.input_path;

    if var("RUST_LOG").is_err() {
        set_var("RUST_LOG", "info")
    }
    pretty_env_logger::init();

    if !Path::new(&config_path_str).is_file() {
        return Err(format!("Config file {} is not a file", config_path_str).into());
    }

    let configs = ConfigContainer::from_file(&config_path_str)
        .map_err(|err| format!("Failed to load config: {}", err))?;

    let mut input_handler = get_input_handler(&input_path_str)?;
    info!("Input files:\n{}", input_handler.info_input());
    let all_stations = input_handler.get_stations();

    for model_config in &configs.models {
        info!("Running model: {:?}", model_config.get_model_name());
        let start_time = Utc::now();

        if let Err(err) = run_ffmc(model_config, input_handler.as_mut(), &all_stations) {
            warn!("Error running model: {}", err);
        }

        let elapsed_time = Utc::now() - start_time;
        info!("Elapsed time: {} seconds", elapsed_time.num_seconds());
    }

    Ok(())
}
