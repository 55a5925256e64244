use chrono::{DateTime, Utc};
use ndarray::Array1;

use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::constants::NODATAVAL;

/// Observation represents the daily weather of a single station
/// If the input unit provided is not the one expected by the model, the caller converts it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// air temperature, 13:00 LT reading [°C]
    pub temperature: f64,
    /// relative humidity [%]
    pub humidity: f64,
    /// mean wind speed [km/h]
    pub wind_speed: f64,
    /// 24h rain [mm]
    pub rain: f64,
}

impl Observation {
    pub fn new(temperature: f64, humidity: f64, wind_speed: f64, rain: f64) -> Self {
        Self {
            temperature,
            humidity,
            wind_speed,
            rain,
        }
    }
}

impl Default for Observation {
    fn default() -> Self {
        Self {
            temperature: NODATAVAL,
            humidity: NODATAVAL,
            wind_speed: NODATAVAL,
            rain: NODATAVAL,
        }
    }
}

/// Chronologically ordered observations of one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSeries {
    pub station: String,
    pub observations: Vec<Observation>,
}

impl StationSeries {
    pub fn new(station: impl Into<String>, observations: Vec<Observation>) -> Self {
        Self {
            station: station.into(),
            observations,
        }
    }
}

/// One time step for all the stations, in station order
pub struct Input {
    pub time: DateTime<Utc>,
    pub data: Array1<Observation>,
}

#[allow(non_camel_case_types)]
#[derive(
    Debug, PartialEq, Eq, Hash, Copy, Clone, EnumString, EnumIter, Display, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum InputVariableName {
    /// Air temperature [°C or K]
    temperature,
    /// Relative humidity [%]
    humidity,
    /// Wind speed [km/h]
    wind_speed,
    /// Rain [mm]
    rain,
}
