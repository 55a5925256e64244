use chrono::{DateTime, Utc};
use ndarray::Array1;
use rayon::prelude::*;
use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumProperty, EnumString};

use crate::constants::NODATAVAL;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputElement {
    /// Fine Fuel Moisture Code
    pub ffmc: f64,

    // ----------------- INPUTS ---------------//
    /// Input temperature in celsius
    pub temperature: f64,
    /// Input relative humidity in %
    pub humidity: f64,
    /// Input wind speed in km/h
    pub wind_speed: f64,
    /// Input rain in mm
    pub rain: f64,
}

impl Default for OutputElement {
    fn default() -> Self {
        Self {
            ffmc: NODATAVAL,
            temperature: NODATAVAL,
            humidity: NODATAVAL,
            wind_speed: NODATAVAL,
            rain: NODATAVAL,
        }
    }
}

#[allow(non_camel_case_types)]
#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Copy,
    Clone,
    EnumString,
    EnumIter,
    EnumProperty,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum OutputVariableName {
    /// Fine Fuel Moisture Code
    #[strum(props(long_name = "Fine Fuel Moisture Code", units = "-"))]
    ffmc,

    /// Input Temperature
    #[strum(props(long_name = "Input Temperature", units = "°C"))]
    temperature,

    /// Input Relative Humidity
    #[strum(props(long_name = "Input Relative Humidity", units = "%"))]
    humidity,

    /// Input Wind Speed
    #[strum(props(long_name = "Input Wind Speed", units = "km/h"))]
    windSpeed,

    /// Input Rain
    #[strum(props(long_name = "Input Rain", units = "mm"))]
    rain,
}

pub struct Output {
    pub time: DateTime<Utc>,
    pub data: Array1<OutputElement>,
}

impl Output {
    pub fn new(time: DateTime<Utc>, data: Array1<OutputElement>) -> Self {
        Self { time, data }
    }

    pub fn get_array(&self, func: fn(&OutputElement) -> f64) -> Array1<f64> {
        let vec = self.data.par_iter().map(func).collect::<Vec<_>>();
        Array1::from_vec(vec)
    }

    pub fn get(&self, variable: &OutputVariableName) -> Array1<f64> {
        use OutputVariableName::*;
        match variable {
            ffmc => self.get_array(|o| o.ffmc),
            temperature => self.get_array(|o| o.temperature),
            humidity => self.get_array(|o| o.humidity),
            windSpeed => self.get_array(|o| o.wind_speed),
            rain => self.get_array(|o| o.rain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::EnumProperty;

    #[test]
    fn variables_parse_case_insensitive() {
        assert_eq!(
            OutputVariableName::from_str("FFMC").expect("should parse"),
            OutputVariableName::ffmc
        );
        assert_eq!(
            OutputVariableName::from_str("windspeed").expect("should parse"),
            OutputVariableName::windSpeed
        );
        assert!(OutputVariableName::from_str("dmc").is_err());
    }

    #[test]
    fn variables_carry_units() {
        assert_eq!(OutputVariableName::rain.get_str("units"), Some("mm"));
        assert_eq!(
            OutputVariableName::ffmc.get_str("long_name"),
            Some("Fine Fuel Moisture Code")
        );
    }

    #[test]
    fn get_extracts_columns() {
        let data = Array1::from_vec(vec![
            OutputElement {
                ffmc: 88.0,
                temperature: 17.0,
                humidity: 42.0,
                wind_speed: 25.0,
                rain: 0.0,
            },
            OutputElement::default(),
        ]);
        let output = Output::new(Utc::now(), data);
        assert_eq!(output.get(&OutputVariableName::ffmc).to_vec(), vec![88.0, NODATAVAL]);
        assert_eq!(
            output.get(&OutputVariableName::windSpeed).to_vec(),
            vec![25.0, NODATAVAL]
        );
    }
}
