use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufWriter, Write},
};

use chrono::{DateTime, Duration, Utc};
use ffmc::{
    models::output::Output,
    modules::ffmc::{
        config::FFMCModelConfig,
        models::{FFMCState, FFMCWarmState},
    },
};
use log::{info, warn};
use rayon::prelude::*;

use crate::common::{helpers::FFMCRunError, io::models::output::OutputType};

use super::builder::{FFMCConfigBuilder, OutputTypeConfig};

/// How many days before the run date a warm state is looked for
const WARM_STATE_LOOKBACK_DAYS: i64 = 4;

pub struct Config {
    run_date: DateTime<Utc>,
    stations: Vec<String>,
    warm_state_path: String,
    warm_state: Vec<FFMCWarmState>,
    warm_state_time: DateTime<Utc>,
    output_types_defs: Vec<OutputTypeConfig>,
    model_config: FFMCModelConfig,
}

pub struct OutputWriter {
    outputs: Vec<OutputType>,
}

impl OutputWriter {
    pub fn new(outputs_defs: &[OutputTypeConfig], date: &DateTime<Utc>) -> Self {
        Self {
            outputs: outputs_defs
                .iter()
                .filter_map(|t| match OutputType::new(t, date) {
                    Ok(output_type) => Some(output_type),
                    Err(err) => {
                        warn!("Skipping output {}: {}", t.internal_name, err);
                        None
                    }
                })
                .collect(),
        }
    }

    pub fn write_output(&mut self, stations: &[String], output: &Output) -> Result<(), FFMCRunError> {
        self.outputs.par_iter_mut().for_each(|output_type| {
            match output_type.write_variables(stations, output) {
                Ok(_) => (),
                Err(e) => warn!("Error writing output: {}", e),
            }
        });
        Ok(())
    }

    pub fn finish(&mut self) -> Result<(), FFMCRunError> {
        for output_type in self.outputs.iter_mut() {
            output_type.finish()?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }
}

impl Config {
    pub fn new(
        config_defs: &FFMCConfigBuilder,
        date: DateTime<Utc>,
        stations: &[String],
    ) -> Result<Config, FFMCRunError> {
        let model_config = config_defs.model_config();
        let seed = model_config.check_seed(config_defs.ffmc_init)?;

        let (warm_state, warm_state_time) =
            match read_warm_state(&config_defs.warm_state_path, date) {
                Some((values, time)) => (
                    assign_warm_state(&values, stations, seed, &model_config),
                    time,
                ),
                None => (
                    vec![FFMCWarmState { ffmc: seed }; stations.len()],
                    date - Duration::days(1),
                ),
            };

        Ok(Config {
            run_date: date,
            stations: stations.to_vec(),
            warm_state_path: config_defs.warm_state_path.clone(),
            warm_state,
            warm_state_time,
            output_types_defs: config_defs.output_types.clone(),
            model_config,
        })
    }

    pub fn get_stations(&self) -> &[String] {
        &self.stations
    }

    pub fn new_state(&self) -> FFMCState {
        info!("Model version: {}", self.model_config.model_version);
        FFMCState::new(&self.warm_state, &self.warm_state_time, self.model_config.clone())
    }

    pub fn get_output_writer(&self) -> Result<OutputWriter, FFMCRunError> {
        Ok(OutputWriter::new(self.output_types_defs.as_slice(), &self.run_date))
    }

    /// Write the warm state, dated the day after the last step
    pub fn write_warm_state(&self, state: &FFMCState) -> Result<String, FFMCRunError> {
        let warm_state_time = state.time + Duration::days(1);
        let date_string = warm_state_time.format("%Y%m%d%H%M").to_string();
        let warm_state_name = format!("{}{}", self.warm_state_path, date_string);
        let mut warm_state_file = File::create(&warm_state_name)
            .map_err(|error| format!("error creating {}, {}", &warm_state_name, error))?;

        let mut warm_state_writer = BufWriter::new(&mut warm_state_file);

        for (station, warm) in self.stations.iter().zip(state.warm_state()) {
            writeln!(warm_state_writer, "{}\t{}", station, warm.ffmc)
                .map_err(|error| format!("error writing to {}, {}", &warm_state_name, error))?;
        }
        warm_state_writer
            .flush()
            .map_err(|error| format!("error writing to {}, {}", &warm_state_name, error))?;
        Ok(warm_state_name)
    }
}

impl FFMCConfigBuilder {
    pub fn build(&self, date: &DateTime<Utc>, stations: &[String]) -> Result<Config, FFMCRunError> {
        Config::new(self, *date, stations)
    }
}

/// Seed every station from the warm state; stations not in it, or with a value the
/// validation policy rejects, start from `seed`
fn assign_warm_state(
    values: &HashMap<String, f64>,
    stations: &[String],
    seed: f64,
    config: &FFMCModelConfig,
) -> Vec<FFMCWarmState> {
    stations
        .iter()
        .map(|station| {
            let ffmc = match values.get(station) {
                Some(value) => match config.check_seed(*value) {
                    Ok(value) => value,
                    Err(err) => {
                        warn!("Warm state for station {}: {}, using {}", station, err, seed);
                        seed
                    }
                },
                None => {
                    warn!("No warm state for station {}, using {}", station, seed);
                    seed
                }
            };
            FFMCWarmState { ffmc }
        })
        .collect()
}

/// Parse `station ffmc` lines, skipping the ones that cannot be read
fn parse_warm_state<R: BufRead>(reader: R) -> Result<HashMap<String, f64>, io::Error> {
    let mut values: HashMap<String, f64> = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let components: Vec<&str> = line.split_whitespace().collect();
        if components.is_empty() {
            continue;
        }
        let ffmc = match components.get(1).map(|v| v.parse::<f64>()) {
            Some(Ok(ffmc)) => ffmc,
            _ => {
                warn!("Could not parse warm state line '{}'", line);
                continue;
            }
        };
        values.insert(components[0].to_string(), ffmc);
    }
    Ok(values)
}

/// Reads the warm state from the file
/// The warm state is stored in a file with the following structure:
/// base_warm_file_YYYYmmDDHHMM
/// where <base_warm_file> is the base name of the file and `YYYYmmDDHHMM` is the date of the warm state
/// Each line holds a station and its FFMC: `station ffmc`
fn read_warm_state(
    base_warm_file: &str,
    date: DateTime<Utc>,
) -> Option<(HashMap<String, f64>, DateTime<Utc>)> {
    // for the last n days before date, try to read the warm state
    // compose the filename as base_warm_file_YYYYmmDDHHMM
    let found = (0..WARM_STATE_LOOKBACK_DAYS).find_map(|days_before| {
        let current_date = date - Duration::days(days_before);
        let filename = format!("{}{}", base_warm_file, current_date.format("%Y%m%d%H%M"));
        File::open(filename).ok().map(|file| (file, current_date))
    });

    let (file, current_date) = match found {
        Some(found) => found,
        None => {
            warn!(
                "WARNING: Could not find a valid warm state file for run date {}",
                date.format("%Y-%m-%d")
            );
            return None;
        }
    };

    info!(
        "Loading warm state from {}",
        current_date.format("%Y-%m-%d")
    );

    let values = match parse_warm_state(io::BufReader::new(file)) {
        Ok(values) => values,
        Err(err) => {
            warn!("Error reading warm state file: {}", err);
            return None;
        }
    };

    let current_date = current_date - Duration::days(1);
    Some((values, current_date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ffmc::{
        models::input::{Input, Observation},
        modules::ffmc::{
            config::{FFMCModelVersion, ValidationPolicy},
            constants::FFMC_INIT,
        },
    };
    use ndarray::Array1;
    use std::io::Cursor;

    fn builder(warm_state_path: &str) -> FFMCConfigBuilder {
        FFMCConfigBuilder {
            model_name: "test".to_string(),
            warm_state_path: warm_state_path.to_string(),
            model_version: FFMCModelVersion::default(),
            validation: ValidationPolicy::default(),
            ffmc_init: FFMC_INIT,
            stations: None,
            output_types: vec![],
        }
    }

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 7, 1, 0, 0, 0).single().expect("valid date") + Duration::days(n)
    }

    #[test]
    fn warm_state_lines_are_parsed() {
        let values = parse_warm_state(Cursor::new("A\t88.5\nB 70\n\nC\nD abc\n")).expect("readable");
        assert_eq!(values.len(), 2);
        assert_eq!(values["A"], 88.5);
        assert_eq!(values["B"], 70.0);
    }

    #[test]
    fn stations_without_warm_state_use_the_seed() {
        let values = HashMap::from([("A".to_string(), 60.0), ("B".to_string(), 140.0)]);
        let stations = vec!["A".to_string(), "B".to_string(), "C".to_string()];

        let warm = assign_warm_state(&values, &stations, 85.0, &FFMCModelConfig::default());
        assert_eq!(warm, vec![
            FFMCWarmState { ffmc: 60.0 },
            FFMCWarmState { ffmc: 85.0 },
            FFMCWarmState { ffmc: 85.0 },
        ]);

        let config = FFMCModelConfig::default().with_validation(ValidationPolicy::PassThrough);
        let warm = assign_warm_state(&values, &stations, 85.0, &config);
        assert_eq!(warm[1].ffmc, 140.0);
    }

    #[test]
    fn missing_warm_state_starts_from_the_seed() {
        let dir = tempfile::tempdir().expect("temp dir");
        let base = format!("{}/ffmc_", dir.path().display());
        let stations = vec!["A".to_string()];

        let config = builder(&base).build(&day(0), &stations).expect("valid config");
        let state = config.new_state();
        assert_eq!(state.data[0].ffmc, FFMC_INIT);
        assert_eq!(state.time, day(-1));
    }

    #[test]
    fn invalid_seed_is_rejected() {
        let mut defs = builder("/nonexistent/ffmc_");
        defs.ffmc_init = 120.0;
        assert!(defs.build(&day(0), &["A".to_string()]).is_err());
    }

    #[test]
    fn warm_state_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let base = format!("{}/ffmc_", dir.path().display());
        let stations = vec!["A".to_string(), "B".to_string()];

        let config = builder(&base).build(&day(0), &stations).expect("valid config");
        let mut state = config.new_state();
        let input = Input {
            time: day(0),
            data: Array1::from_vec(vec![
                Observation::new(17.0, 42.0, 25.0, 0.0),
                Observation::new(12.0, 80.0, 5.0, 12.5),
            ]),
        };
        state.update(&input);
        let written = config.write_warm_state(&state).expect("warm state written");
        assert!(written.ends_with("ffmc_202307020000"));

        // the next run starts two days later and finds the file with the lookback
        let next = builder(&base).build(&day(2), &stations).expect("valid config");
        let resumed = next.new_state();
        assert_eq!(resumed.time, day(0));
        assert_eq!(resumed.data[0].ffmc, state.data[0].ffmc);
        assert_eq!(resumed.data[1].ffmc, state.data[1].ffmc);

        // outside the lookback the seed is used
        let late = builder(&base).build(&day(6), &stations).expect("valid config");
        assert_eq!(late.new_state().data[0].ffmc, FFMC_INIT);
    }
}
