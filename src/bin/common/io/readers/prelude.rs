use std::error::Error;

use chrono::{DateTime, Utc};
use ffmc::models::input::InputVariableName;
use ndarray::Array1;

/// Trait defining the behavior of an InputHandler for models
pub trait InputHandler {
    /// restrict the values returned by `get_values` to these stations, in this order
    fn set_stations(&mut self, stations: &[String]) -> Result<(), Box<dyn Error>>;

    /// stations in the order used by `get_values`
    fn get_stations(&self) -> Vec<String>;

    /// get the desired variable at the desired date, one value per station
    fn get_values(&self, var: InputVariableName, date: &DateTime<Utc>) -> Option<Array1<f64>>;

    /// Returns the timeline of the input data
    fn get_timeline(&self) -> Vec<DateTime<Utc>>;

    /// Short description of the loaded input
    fn info_input(&self) -> String;
}
