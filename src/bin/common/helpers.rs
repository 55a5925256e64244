use std::fmt::Display;

use chrono::{DateTime, Utc};
use ndarray::{Array1, Zip};

use ffmc::{
    constants::is_missing,
    error::FFMCError,
    models::input::{Input, InputVariableName, Observation},
};

use crate::common::io::readers::prelude::InputHandler;

fn replace<'a>(
    dst: &'a mut Array1<Observation>,
    src: &Array1<f64>,
    fun: fn(&'a mut Observation) -> &'a mut f64,
) {
    Zip::from(dst).and(src).par_for_each(|d, s| {
        let result = fun(d);
        if is_missing(*result) && !is_missing(*s) {
            *result = *s;
        }
    });
}

fn maybe_replace<'a>(
    dst: &'a mut Array1<Observation>,
    src: &Option<Array1<f64>>,
    fun: fn(&'a mut Observation) -> &'a mut f64,
) {
    if let Some(src) = src {
        replace(dst, src, fun)
    }
}

/// Get the input data from the input handler and save it in the Input struct
/// Temperatures above 200 are taken as Kelvin and converted to Celsius
pub fn get_input(handler: &dyn InputHandler, time: &DateTime<Utc>, len: usize) -> Input {
    let mut data: Array1<Observation> = Array1::default(len);

    if let Some(mut values) = handler.get_values(InputVariableName::temperature, time) {
        values.mapv_inplace(|t| if t > 200.0 { t - 273.15 } else { t }); // convert to Celsius
        replace(&mut data, &values, |i| &mut i.temperature);
    }

    let humidity = handler.get_values(InputVariableName::humidity, time); // supposed in %
    maybe_replace(&mut data, &humidity, |i| &mut i.humidity);

    let wind_speed = handler.get_values(InputVariableName::wind_speed, time); // supposed in km/h
    maybe_replace(&mut data, &wind_speed, |i| &mut i.wind_speed);

    let rain = handler.get_values(InputVariableName::rain, time); // supposed in mm
    maybe_replace(&mut data, &rain, |i| &mut i.rain);

    Input { time: *time, data }
}

/// Count the stations with every reading available
pub fn count_complete(input: &Input) -> usize {
    input
        .data
        .iter()
        .filter(|o| {
            ![o.temperature, o.humidity, o.wind_speed, o.rain]
                .iter()
                .any(|v| is_missing(*v))
        })
        .count()
}

#[derive(Debug)]
pub struct FFMCRunError {
    msg: String,
}

impl From<String> for FFMCRunError {
    fn from(msg: String) -> Self {
        FFMCRunError { msg }
    }
}

impl From<FFMCRunError> for String {
    fn from(value: FFMCRunError) -> String {
        value.msg
    }
}

impl From<&str> for FFMCRunError {
    fn from(msg: &str) -> Self {
        FFMCRunError { msg: msg.into() }
    }
}

impl From<FFMCError> for FFMCRunError {
    fn from(err: FFMCError) -> Self {
        FFMCRunError { msg: err.to_string() }
    }
}

impl Display for FFMCRunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::error::Error for FFMCRunError {}
