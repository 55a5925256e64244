use std::{
    collections::HashMap,
    error::Error,
    fs::File,
    io::{self, BufRead},
};

use chrono::{DateTime, NaiveDate, Utc};
use ffmc::{
    constants::NODATAVAL,
    models::input::{InputVariableName, Observation},
};
use itertools::Itertools;
use libflate::gzip;
use log::warn;
use ndarray::Array1;

use crate::common::helpers::FFMCRunError;

use super::prelude::InputHandler;

const N_COLUMNS: usize = 6;

/// A row of the station table
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub station: String,
    pub time: DateTime<Utc>,
    pub observation: Observation,
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()?;
    let date = date.and_hms_opt(0, 0, 0)?;
    Some(DateTime::from_naive_utc_and_offset(date, Utc))
}

/// Empty fields, NaN and NA are missing readings
fn parse_value(value: &str) -> Result<f64, String> {
    match value {
        "" | "NA" | "na" | "nan" | "NaN" | "NAN" => Ok(NODATAVAL),
        _ => {
            let parsed = value
                .parse::<f64>()
                .map_err(|err| format!("cannot parse '{value}': {err}"))?;
            if parsed.is_nan() {
                Ok(NODATAVAL)
            } else {
                Ok(parsed)
            }
        }
    }
}

fn split_line(line: &str) -> Vec<&str> {
    if line.contains(',') {
        line.split(',').map(|s| s.trim()).collect()
    } else {
        line.split_whitespace().collect()
    }
}

/// Parse the station table:
/// `station date temperature humidity wind_speed rain`
/// separated by whitespace or commas, one row per station and day.
/// Comment lines start with `#` or `%`; a header line is recognised by its `date` column.
pub fn parse_table<R: BufRead>(reader: R) -> Result<Vec<TableRow>, FFMCRunError> {
    let mut rows: Vec<TableRow> = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|error| format!("error line: {i} \n {error}"))?;
        let line = line.trim();

        if line.starts_with('%') || line.starts_with('#') || line.is_empty() {
            // skip comments and empty lines
            continue;
        }
        let parts = split_line(line);
        if parts.len() < N_COLUMNS {
            return Err(format!(
                "line {}: expected {N_COLUMNS} columns, found {}",
                i + 1,
                parts.len()
            )
            .into());
        }
        if parts[1].eq_ignore_ascii_case("date") {
            continue;
        }

        let time = parse_date(parts[1])
            .ok_or_else(|| format!("line {}: invalid date '{}'", i + 1, parts[1]))?;
        let values = parts[2..N_COLUMNS]
            .iter()
            .map(|v| parse_value(v))
            .collect::<Result<Vec<f64>, String>>()
            .map_err(|err| format!("line {}: {err}", i + 1))?;

        rows.push(TableRow {
            station: parts[0].to_string(),
            time,
            observation: Observation::new(values[0], values[1], values[2], values[3]),
        });
    }
    Ok(rows)
}

/// Station table input, plain text or gzip compressed (`.gz`)
pub struct TableInputHandler {
    path: String,
    stations: Vec<String>,
    timeline: Vec<DateTime<Utc>>,
    data: HashMap<(String, DateTime<Utc>), Observation>,
}

impl TableInputHandler {
    pub fn new(path: &str) -> Result<Self, FFMCRunError> {
        let file = File::open(path).map_err(|error| format!("Could not open file {}: {}", path, error))?;
        let reader = io::BufReader::new(file);
        if path.ends_with(".gz") {
            let decoder = gzip::Decoder::new(reader)
                .map_err(|error| format!("Could not decompress {}: {}", path, error))?;
            Self::from_reader(io::BufReader::new(decoder), path)
        } else {
            Self::from_reader(reader, path)
        }
    }

    pub fn from_reader<R: BufRead>(reader: R, path: &str) -> Result<Self, FFMCRunError> {
        let rows = parse_table(reader)?;

        let stations: Vec<String> = rows.iter().map(|r| r.station.clone()).unique().collect();
        let timeline: Vec<DateTime<Utc>> = rows.iter().map(|r| r.time).sorted().dedup().collect();

        let mut data: HashMap<(String, DateTime<Utc>), Observation> = HashMap::new();
        for row in rows {
            if let Some(previous) = data.insert((row.station.clone(), row.time), row.observation) {
                warn!(
                    "Duplicated row for station {} at {}, replacing {:?}",
                    row.station,
                    row.time.format("%Y-%m-%d"),
                    previous
                );
            }
        }

        Ok(Self {
            path: path.to_string(),
            stations,
            timeline,
            data,
        })
    }

    fn value(obs: &Observation, var: InputVariableName) -> f64 {
        match var {
            InputVariableName::temperature => obs.temperature,
            InputVariableName::humidity => obs.humidity,
            InputVariableName::wind_speed => obs.wind_speed,
            InputVariableName::rain => obs.rain,
        }
    }
}

impl InputHandler for TableInputHandler {
    fn set_stations(&mut self, stations: &[String]) -> Result<(), Box<dyn Error>> {
        let missing: Vec<&String> = stations
            .iter()
            .filter(|s| !self.data.keys().any(|(station, _)| station == *s))
            .collect();
        if !missing.is_empty() {
            return Err(format!("Stations not found in {}: {}", self.path, missing.iter().join(", ")).into());
        }
        self.stations = stations.to_vec();
        Ok(())
    }

    fn get_stations(&self) -> Vec<String> {
        self.stations.clone()
    }

    fn get_values(&self, var: InputVariableName, date: &DateTime<Utc>) -> Option<Array1<f64>> {
        if self.timeline.binary_search(date).is_err() {
            return None;
        }
        let values = self
            .stations
            .iter()
            .map(|station| {
                self.data
                    .get(&(station.clone(), *date))
                    .map(|obs| Self::value(obs, var))
                    .unwrap_or(NODATAVAL)
            })
            .collect::<Array1<f64>>();
        Some(values)
    }

    fn get_timeline(&self) -> Vec<DateTime<Utc>> {
        self.timeline.clone()
    }

    fn info_input(&self) -> String {
        let (first, last) = match (self.timeline.first(), self.timeline.last()) {
            (Some(first), Some(last)) => (first.format("%Y-%m-%d").to_string(), last.format("%Y-%m-%d").to_string()),
            _ => ("-".to_string(), "-".to_string()),
        };
        format!(
            "{}: {} stations, {} days from {} to {}",
            self.path,
            self.stations.len(),
            self.timeline.len(),
            first,
            last
        )
    }
}
