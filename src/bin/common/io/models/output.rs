use chrono::{DateTime, Utc};

use ffmc::{
    constants::NODATAVAL,
    models::output::{Output, OutputVariableName},
};
use log::debug;
use ndarray::Array1;
use serde_derive::{Deserialize, Serialize};

use crate::common::{
    config::builder::OutputTypeConfig,
    helpers::FFMCRunError,
    io::writers::{json::JsonWriter, prelude::OutputSink, text::TextWriter},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputVariable {
    internal_name: OutputVariableName,
    name: String,
    precision: i32,
}

impl OutputVariable {
    pub fn new(internal_name: OutputVariableName, name: &str, precision: i32) -> Self {
        Self {
            internal_name,
            name: name.to_string(),
            precision,
        }
    }

    /// Values for every station, rounded to 10^precision. Missing values stay NODATAVAL.
    pub fn get_values(&self, output: &Output) -> Array1<f64> {
        let values = output.get(&self.internal_name);
        let cutval = f64::powi(10.0, self.precision);

        // apply cutval
        values.mapv(|v| {
            if v == NODATAVAL || v.is_nan() {
                NODATAVAL
            } else {
                (v / cutval).round() * cutval
            }
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn internal_name(&self) -> OutputVariableName {
        self.internal_name
    }

    /// Number of decimals to print
    pub fn decimals(&self) -> usize {
        if self.precision < 0 {
            (-self.precision) as usize
        } else {
            0
        }
    }
}

pub struct OutputType {
    name: String,
    format: String,
    variables: Vec<OutputVariable>,
    writer: Box<dyn OutputSink>,
}

impl OutputType {
    pub fn new(output_type_def: &OutputTypeConfig, run_date: &DateTime<Utc>) -> Result<Self, FFMCRunError> {
        let name = &output_type_def.name;
        let path = &output_type_def.path;
        let format = &output_type_def.format;

        let writer: Box<dyn OutputSink> = match format.to_uppercase().as_str() {
            "TXT" => Box::new(TextWriter::new(path, name, run_date)),
            "JSON" => Box::new(JsonWriter::new(path, name, run_date)),
            _ => return Err(format!("Unsupported output format {} for {}", format, name).into()),
        };

        Ok(Self {
            name: name.to_string(),
            format: format.to_string(),
            variables: output_type_def.variables.clone(),
            writer,
        })
    }

    pub fn write_variables(&mut self, stations: &[String], output: &Output) -> Result<(), FFMCRunError> {
        debug!("Writing variables for {}, {}", self.name, self.format);
        let res = self.writer.write(output, stations, &self.variables);
        debug!("Done Writing variables for {}, {}", self.name, self.format);
        res
    }

    pub fn finish(&mut self) -> Result<(), FFMCRunError> {
        self.writer.finish()
    }
}
