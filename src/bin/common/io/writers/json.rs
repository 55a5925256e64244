use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use chrono::{DateTime, Utc};
use ffmc::{constants::NODATAVAL, models::output::Output};
use log::debug;
use serde_json::{Map, Value};

use crate::common::{helpers::FFMCRunError, io::models::output::OutputVariable};

use super::prelude::OutputSink;

/// JSON lines: one object per station and step, missing values as null
pub struct JsonWriter {
    file: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl JsonWriter {
    pub fn new(path: &str, name: &str, run_date: &DateTime<Utc>) -> Self {
        let file = PathBuf::from(path).join(format!("{}_{}.jsonl", name, run_date.format("%Y%m%d%H%M")));
        Self { file, writer: None }
    }
}

impl OutputSink for JsonWriter {
    fn write(
        &mut self,
        output: &Output,
        stations: &[String],
        variables: &[OutputVariable],
    ) -> Result<(), FFMCRunError> {
        if self.writer.is_none() {
            debug!("[JSON] Creating {:?}", self.file);
            let file = File::create(&self.file)
                .map_err(|error| format!("error creating {:?}, {}", &self.file, error))?;
            self.writer = Some(BufWriter::new(file));
        }
        let file = &self.file;
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| FFMCRunError::from("output file not open"))?;

        let date = output.time.format("%Y-%m-%d").to_string();
        let columns: Vec<(&str, _)> = variables
            .iter()
            .map(|v| (v.name(), v.get_values(output)))
            .collect();

        for (idx, station) in stations.iter().enumerate() {
            let mut record = Map::new();
            record.insert("station".to_string(), Value::from(station.as_str()));
            record.insert("date".to_string(), Value::from(date.as_str()));
            for (name, values) in &columns {
                let value = values[idx];
                let value = if value == NODATAVAL {
                    Value::Null
                } else {
                    Value::from(value)
                };
                record.insert(name.to_string(), value);
            }
            let line = serde_json::to_string(&Value::Object(record))
                .map_err(|error| format!("error serializing {}: {}", station, error))?;
            writeln!(writer, "{}", line).map_err(|error| format!("error writing to {:?}, {}", file, error))?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), FFMCRunError> {
        if let Some(writer) = self.writer.as_mut() {
            writer
                .flush()
                .map_err(|error| format!("error flushing {:?}, {}", &self.file, error))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmc::models::output::{OutputElement, OutputVariableName};
    use ndarray::Array1;
    use std::fs;

    #[test]
    fn one_object_per_station() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().to_str().expect("utf8 path");
        let run_date = DateTime::parse_from_rfc3339("2023-07-01T00:00:00Z")
            .expect("valid date")
            .with_timezone(&Utc);
        let mut writer = JsonWriter::new(path, "ffmc", &run_date);
        let variables = vec![OutputVariable::new(OutputVariableName::ffmc, "ffmc", -2)];
        let output = Output::new(
            run_date,
            Array1::from_vec(vec![
                OutputElement {
                    ffmc: 88.5,
                    ..OutputElement::default()
                },
                OutputElement::default(),
            ]),
        );
        writer
            .write(&output, &["A".to_string(), "B".to_string()], &variables)
            .expect("write rows");
        writer.finish().expect("flush");

        let content = fs::read_to_string(dir.path().join("ffmc_202307010000.jsonl")).expect("read output");
        let records: Vec<Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).expect("valid json"))
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["station"], "A");
        assert_eq!(records[0]["date"], "2023-07-01");
        assert_eq!(records[0]["ffmc"], 88.5);
        assert!(records[1]["ffmc"].is_null());
    }
}
