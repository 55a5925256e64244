use std::str::FromStr;

use chrono::Utc;
use ndarray::Array1;
use pyo3::{exceptions::PyValueError, prelude::*, wrap_pyfunction, Bound};
use strum::IntoEnumIterator;

use crate::{
    constants::NODATAVAL,
    error::FFMCError,
    models::{
        input::{Input, Observation},
        output::OutputVariableName,
    },
    modules::ffmc::{
        config::{FFMCModelConfig, FFMCModelVersion, ValidationPolicy},
        functions,
        models::{FFMCState, FFMCWarmState},
        series,
    },
    version::LONG_VERSION,
};

fn to_py_err(err: FFMCError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn build_config(model_version: &str, validation: &str) -> PyResult<FFMCModelConfig> {
    let model_version = FFMCModelVersion::from_str(model_version)
        .map_err(|_| PyValueError::new_err(format!("Unknown model version '{model_version}'")))?;
    let validation = ValidationPolicy::from_str(validation)
        .map_err(|_| PyValueError::new_err(format!("Unknown validation policy '{validation}'")))?;
    Ok(FFMCModelConfig::from_version(model_version).with_validation(validation))
}

fn to_observations(rows: Vec<(f64, f64, f64, f64)>) -> Vec<Observation> {
    rows.into_iter()
        .map(|(t, rh, w, r)| Observation::new(t, rh, w, r))
        .collect()
}

/// One day of FFMC from yesterday's value
#[pyfunction]
fn update(t: f64, rh: f64, w: f64, r: f64, ffmc_prev: f64) -> f64 {
    functions::update_ffmc(t, rh, w, r, ffmc_prev)
}

/// FFMC series from (temperature, humidity, wind_speed, rain) rows sorted by date
#[pyfunction]
#[pyo3(signature = (observations, seed_ffmc=85.0, model_version="vw1987", validation="reject"))]
fn run(
    observations: Vec<(f64, f64, f64, f64)>,
    seed_ffmc: f64,
    model_version: &str,
    validation: &str,
) -> PyResult<Vec<f64>> {
    let config = build_config(model_version, validation)?;
    series::run_with_config(&to_observations(observations), seed_ffmc, &config).map_err(to_py_err)
}

#[pyclass(name = "State")]
pub struct PyState {
    inner: FFMCState,
}

#[pymethods]
impl PyState {
    #[new]
    #[pyo3(signature = (ffmc, model_version="vw1987", validation="reject"))]
    fn new(ffmc: Vec<f64>, model_version: &str, validation: &str) -> PyResult<Self> {
        if ffmc.is_empty() {
            return Err(PyValueError::new_err(
                "State creation requires at least one warm state element",
            ));
        }
        let config = build_config(model_version, validation)?;
        for value in &ffmc {
            config.check_seed(*value).map_err(to_py_err)?;
        }
        let warm_state: Vec<FFMCWarmState> = ffmc.into_iter().map(|ffmc| FFMCWarmState { ffmc }).collect();
        Ok(Self {
            inner: FFMCState::new(&warm_state, &Utc::now(), config),
        })
    }

    /// Advance every station by one day. Returns the number of stations left unchanged.
    fn update(&mut self, observations: Vec<(f64, f64, f64, f64)>) -> PyResult<usize> {
        if observations.len() != self.inner.len() {
            return Err(PyValueError::new_err(format!(
                "Expected {} observations, got {}",
                self.inner.len(),
                observations.len()
            )));
        }
        let input = Input {
            time: Utc::now(),
            data: Array1::from_vec(to_observations(observations)),
        };
        Ok(self.inner.update(&input))
    }

    fn ffmc(&self) -> Vec<f64> {
        self.inner.data.iter().map(|s| s.ffmc).collect()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }
}

#[pyfunction]
fn available_output_variables() -> Vec<String> {
    OutputVariableName::iter().map(|v| v.to_string()).collect()
}

#[pyfunction]
fn nodata_value() -> f64 {
    NODATAVAL
}

#[pymodule]
fn ffmc(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyState>()?;
    module.add_function(wrap_pyfunction!(update, module)?)?;
    module.add_function(wrap_pyfunction!(run, module)?)?;
    module.add_function(wrap_pyfunction!(available_output_variables, module)?)?;
    module.add_function(wrap_pyfunction!(nodata_value, module)?)?;

    module.add("FFMC_VERSION", LONG_VERSION)?;
    Ok(())
}
