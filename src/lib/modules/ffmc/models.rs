use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::prelude::*;
use ndarray::{Array1, Zip};
use serde_derive::{Deserialize, Serialize};

use crate::models::{input::Input, output::Output};

use super::{
    config::FFMCModelConfig,
    constants::FFMC_INIT,
    functions::{get_output_fn, update_state_fn},
};

// WARM STATE
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FFMCWarmState {
    pub ffmc: f64,
}

impl Default for FFMCWarmState {
    fn default() -> Self {
        FFMCWarmState { ffmc: FFMC_INIT }
    }
}

// STATE
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FFMCStateElement {
    pub ffmc: f64,
}

/// One carried FFMC per station, stepped together one time step at a time
#[derive(Debug)]
pub struct FFMCState {
    pub time: DateTime<Utc>,
    pub data: Array1<FFMCStateElement>,
    len: usize,
    config: FFMCModelConfig,
}

impl FFMCState {
    /// Create a new state.
    pub fn new(warm_state: &[FFMCWarmState], time: &DateTime<Utc>, config: FFMCModelConfig) -> FFMCState {
        let data = Array1::from_vec(
            warm_state
                .iter()
                .map(|w| FFMCStateElement { ffmc: w.ffmc })
                .collect(),
        );

        FFMCState {
            time: *time,
            data,
            len: warm_state.len(),
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of stations left unchanged because of missing or rejected data
    fn update_state(&mut self, input: &Input) -> usize {
        let skipped = AtomicUsize::new(0);
        let config = &self.config;
        Zip::from(&mut self.data)
            .and(&input.data)
            .par_for_each(|state, input_data| {
                if !update_state_fn(state, input_data, config) {
                    skipped.fetch_add(1, Ordering::Relaxed);
                }
            });
        skipped.into_inner()
    }

    pub fn get_output(&self, input: &Input) -> Output {
        let time = &self.time;

        let output_data = Zip::from(&self.data)
            .and(&input.data)
            .par_map_collect(get_output_fn);

        Output::new(*time, output_data)
    }

    /// Update the state of the stations
    pub fn update(&mut self, input: &Input) -> usize {
        self.time = input.time;
        self.update_state(input)
    }

    pub fn output(&self, input: &Input) -> Output {
        self.get_output(input)
    }

    pub fn warm_state(&self) -> Vec<FFMCWarmState> {
        self.data
            .iter()
            .map(|s| FFMCWarmState { ffmc: s.ffmc })
            .collect()
    }
}
