//! Series drivers: chain the daily update over chronologically ordered observations.
//!
//! Each output depends only on the previous output (the seed for the first day) and
//! the current observation. Ordering, station selection and gap handling belong to the caller.

use rayon::prelude::*;

use crate::{
    error::FFMCError,
    models::input::{Observation, StationSeries},
};

use super::{config::FFMCModelConfig, functions::update_ffmc};

/// FFMC series for one station, seeded with `seed_ffmc` (usually `FFMC_INIT`).
/// Inputs are not validated, see [`run_with_config`].
pub fn run(observations: &[Observation], seed_ffmc: f64) -> Vec<f64> {
    observations
        .iter()
        .scan(seed_ffmc, |ffmc, obs| {
            *ffmc = update_ffmc(obs.temperature, obs.humidity, obs.wind_speed, obs.rain, *ffmc);
            Some(*ffmc)
        })
        .collect()
}

/// FFMC series for one station with the configured formulation and validation policy.
/// The whole series is checked before the first step.
pub fn run_with_config(
    observations: &[Observation],
    seed_ffmc: f64,
    config: &FFMCModelConfig,
) -> Result<Vec<f64>, FFMCError> {
    let seed_ffmc = config.check_seed(seed_ffmc)?;
    observations.iter().try_for_each(|obs| config.check(obs))?;
    Ok(chain(observations, seed_ffmc, config))
}

/// Carry the configured update over already checked observations
fn chain(observations: &[Observation], seed_ffmc: f64, config: &FFMCModelConfig) -> Vec<f64> {
    observations
        .iter()
        .scan(seed_ffmc, |ffmc, obs| {
            *ffmc = config.ffmc(obs.temperature, obs.humidity, obs.wind_speed, obs.rain, *ffmc);
            Some(*ffmc)
        })
        .collect()
}

/// Independent stations run in parallel, one carried chain each.
/// Results keep the order of `stations`.
pub fn run_stations(
    stations: &[StationSeries],
    seed_ffmc: f64,
    config: &FFMCModelConfig,
) -> Result<Vec<(String, Vec<f64>)>, FFMCError> {
    let seed_ffmc = config.check_seed(seed_ffmc)?;
    stations
        .par_iter()
        .map(|series| -> Result<(String, Vec<f64>), FFMCError> {
            series
                .observations
                .iter()
                .enumerate()
                .try_for_each(|(index, obs)| {
                    config
                        .check(obs)
                        .map_err(|err| err.at_station(&series.station, index))
                })?;
            Ok((series.station.clone(), chain(&series.observations, seed_ffmc, config)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::ffmc::{
        config::{FFMCModelVersion, ValidationPolicy},
        constants::FFMC_INIT,
        functions::update_ffmc_1985,
    };

    const EPS: f64 = 1e-9;

    fn four_days() -> Vec<Observation> {
        vec![
            Observation::new(17.0, 42.0, 25.0, 0.0),
            Observation::new(20.0, 30.0, 15.0, 0.0),
            Observation::new(12.0, 80.0, 5.0, 12.5),
            Observation::new(25.0, 20.0, 20.0, 0.0),
        ]
    }

    #[test]
    fn empty_series_is_empty() {
        assert!(run(&[], FFMC_INIT).is_empty());
        let config = FFMCModelConfig::default();
        assert_eq!(run_with_config(&[], FFMC_INIT, &config), Ok(vec![]));
    }

    #[test]
    fn first_step_delegates_to_update() {
        let obs = Observation::new(17.0, 42.0, 25.0, 0.0);
        assert_eq!(run(&[obs], 85.0), vec![update_ffmc(17.0, 42.0, 25.0, 0.0, 85.0)]);
    }

    #[test]
    fn outputs_chain_through_the_previous_day() {
        let days = four_days();
        let first = run(&days[..1], 70.0);
        let both = run(&days[..2], 70.0);
        assert_eq!(both[0], first[0]);
        assert_eq!(both[1], update_ffmc(20.0, 30.0, 15.0, 0.0, first[0]));
    }

    #[test]
    fn reference_series() {
        let ffmc = run(&four_days(), FFMC_INIT);
        let expected = [
            88.71667196917993,
            91.45227814157894,
            38.845380688168284,
            74.60526290650769,
        ];
        assert_eq!(ffmc.len(), expected.len());
        for (got, want) in ffmc.iter().zip(expected) {
            assert!((got - want).abs() < EPS, "got {} want {}", got, want);
        }
    }

    #[test]
    fn repeated_runs_are_identical() {
        let days = four_days();
        let a = run(&days, 77.0);
        let b = run(&days, 77.0);
        assert_eq!(
            a.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            b.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn config_run_matches_plain_run() {
        let days = four_days();
        let config = FFMCModelConfig::default();
        assert_eq!(run_with_config(&days, FFMC_INIT, &config), Ok(run(&days, FFMC_INIT)));

        let config = FFMCModelConfig::from_version(FFMCModelVersion::VanWagnerPickett1985);
        let ffmc = run_with_config(&days, FFMC_INIT, &config).expect("valid series");
        assert_eq!(ffmc[0], update_ffmc_1985(17.0, 42.0, 25.0, 0.0, FFMC_INIT));
        assert_eq!(ffmc[1], update_ffmc_1985(20.0, 30.0, 15.0, 0.0, ffmc[0]));
    }

    #[test]
    fn config_run_rejects_invalid_inputs() {
        let mut days = four_days();
        let config = FFMCModelConfig::default();
        assert_eq!(
            run_with_config(&days, 101.5, &config),
            Err(FFMCError::InvalidFFMC(101.5))
        );

        days[2].rain = -1.0;
        assert_eq!(
            run_with_config(&days, FFMC_INIT, &config),
            Err(FFMCError::NegativeRain(-1.0))
        );

        let lenient = FFMCModelConfig::default().with_validation(ValidationPolicy::PassThrough);
        assert_eq!(run_with_config(&days, FFMC_INIT, &lenient).map(|v| v.len()), Ok(4));
    }

    #[test]
    fn stations_match_independent_runs() {
        let days = four_days();
        let mut reversed = days.clone();
        reversed.reverse();
        let stations = vec![
            StationSeries::new("A", days.clone()),
            StationSeries::new("B", reversed.clone()),
            StationSeries::new("C", vec![]),
        ];
        let config = FFMCModelConfig::default();
        let result = run_stations(&stations, FFMC_INIT, &config).expect("valid stations");

        assert_eq!(result.len(), 3);
        assert_eq!(result[0], ("A".to_owned(), run(&days, FFMC_INIT)));
        assert_eq!(result[1], ("B".to_owned(), run(&reversed, FFMC_INIT)));
        assert_eq!(result[2], ("C".to_owned(), vec![]));
    }

    #[test]
    fn stations_use_the_configured_formulation() {
        let days = four_days();
        let config = FFMCModelConfig::from_version(FFMCModelVersion::VanWagnerPickett1985);
        let result = run_stations(&[StationSeries::new("A", days.clone())], 70.0, &config)
            .expect("valid stations");
        assert_eq!(result[0].1, run_with_config(&days, 70.0, &config).expect("valid series"));
        assert_ne!(result[0].1, run(&days, 70.0));

        assert_eq!(
            run_stations(&[StationSeries::new("A", days)], -1.0, &config),
            Err(FFMCError::InvalidFFMC(-1.0))
        );
    }

    #[test]
    fn stations_report_the_failing_station() {
        let mut bad = four_days();
        bad[1].wind_speed = -4.0;
        let stations = vec![
            StationSeries::new("A", four_days()),
            StationSeries::new("B", bad),
        ];
        let err = run_stations(&stations, FFMC_INIT, &FFMCModelConfig::default())
            .expect_err("station B is invalid");
        assert_eq!(
            err,
            FFMCError::InvalidStation {
                station: "B".to_owned(),
                index: 1,
                source: Box::new(FFMCError::NegativeWindSpeed(-4.0)),
            }
        );
    }
}
