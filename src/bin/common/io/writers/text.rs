use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use chrono::{DateTime, Utc};
use ffmc::{constants::NODATAVAL, models::output::Output};
use itertools::Itertools;
use log::debug;
use ndarray::Array1;

use crate::common::{helpers::FFMCRunError, io::models::output::OutputVariable};

use super::prelude::OutputSink;

/// Tab separated table: `station date <variables...>`, one row per station and step
pub struct TextWriter {
    file: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl TextWriter {
    pub fn new(path: &str, name: &str, run_date: &DateTime<Utc>) -> Self {
        let file = PathBuf::from(path).join(format!("{}_{}.txt", name, run_date.format("%Y%m%d%H%M")));
        Self { file, writer: None }
    }

    fn open(&mut self, variables: &[OutputVariable]) -> Result<&mut BufWriter<File>, FFMCRunError> {
        if self.writer.is_none() {
            debug!("[TXT] Creating {:?}", self.file);
            let file = File::create(&self.file)
                .map_err(|error| format!("error creating {:?}, {}", &self.file, error))?;
            let mut writer = BufWriter::new(file);
            let header = ["station", "date"]
                .into_iter()
                .chain(variables.iter().map(|v| v.name()))
                .join("\t");
            writeln!(writer, "{}", header).map_err(|error| format!("error writing to {:?}, {}", &self.file, error))?;
            self.writer = Some(writer);
        }
        self.writer
            .as_mut()
            .ok_or_else(|| FFMCRunError::from("output file not open"))
    }
}

fn format_value(value: f64, decimals: usize) -> String {
    if value == NODATAVAL {
        format!("{}", NODATAVAL)
    } else {
        format!("{:.*}", decimals, value)
    }
}

impl OutputSink for TextWriter {
    fn write(
        &mut self,
        output: &Output,
        stations: &[String],
        variables: &[OutputVariable],
    ) -> Result<(), FFMCRunError> {
        let date = output.time.format("%Y-%m-%d").to_string();
        let columns: Vec<(Array1<f64>, usize)> = variables
            .iter()
            .map(|v| (v.get_values(output), v.decimals()))
            .collect();

        let file = self.file.clone();
        let writer = self.open(variables)?;
        for (idx, station) in stations.iter().enumerate() {
            let values = columns
                .iter()
                .map(|(values, decimals)| format_value(values[idx], *decimals))
                .join("\t");
            let line = if values.is_empty() {
                format!("{}\t{}", station, date)
            } else {
                format!("{}\t{}\t{}", station, date, values)
            };
            writeln!(writer, "{}", line).map_err(|error| format!("error writing to {:?}, {}", &file, error))?;
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
    use std::fs;

    #[test]
    fn rows_are_appended_under_one_header() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().to_str().expect("utf8 path");
        let run_date = DateTime::parse_from_rfc3339("2023-07-01T00:00:00Z")
            .expect("valid date")
            .with_timezone(&Utc);
        let mut writer = TextWriter::new(path, "ffmc", &run_date);
        let variables = vec![
            OutputVariable::new(OutputVariableName::ffmc, "FFMC", -1),
            OutputVariable::new(OutputVariableName::rain, "RAIN", 0),
        ];
        let stations = vec!["A".to_string(), "B".to_string()];

        for day in 0..2 {
            let output = Output::new(
                run_date + chrono::Duration::days(day),
                Array1::from_vec(vec![
                    OutputElement {
                        ffmc: 88.71,
                        rain: 3.0,
                        ..OutputElement::default()
                    },
                    OutputElement::default(),
                ]),
            );
            writer.write(&output, &stations, &variables).expect("write rows");
        }
        writer.finish().expect("flush");

        let content = fs::read_to_string(dir.path().join("ffmc_202307010000.txt")).expect("read output");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "station\tdate\tFFMC\tRAIN");
        assert_eq!(lines[1], "A\t2023-07-01\t88.7\t3");
        assert_eq!(lines[2], "B\t2023-07-01\t-9999\t-9999");
        assert_eq!(lines[3], "A\t2023-07-02\t88.7\t3");
    }
}
