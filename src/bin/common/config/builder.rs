use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, Read};
use std::str::FromStr;

use ffmc::{
    models::output::OutputVariableName,
    modules::ffmc::{
        config::{FFMCModelConfig, FFMCModelVersion, ValidationPolicy},
        constants::FFMC_INIT,
    },
};
use serde_derive::{Deserialize, Serialize};

use crate::common::{helpers::FFMCRunError, io::models::output::OutputVariable};

pub type ConfigMap = HashMap<String, Vec<String>>;

const MODEL_NAME_KEY: &str = "MODELNAME";
const WARM_STATE_PATH_KEY: &str = "STATO0";
const MODEL_VERSION_KEY: &str = "MODEL_VERSION";
const VALIDATION_KEY: &str = "VALIDATION";
const FFMC_INIT_KEY: &str = "FFMCINIT";
const STATION_KEY: &str = "STATION";
const OUTPUTS_KEY: &str = "MODEL";
const VARIABLES_KEY: &str = "VARIABLE";

trait ConfigMapExt {
    /// Get the first value of a key in the config map
    fn first(&self, key: &str) -> Option<String>;
    fn all(&self, key: &str) -> Option<Vec<String>>;
}

impl ConfigMapExt for ConfigMap {
    fn first(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|values| values.first().cloned())
    }

    fn all(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).cloned()
    }
}

/// Parse `KEY=VALUE` lines. Keys can repeat; `%` and `#` start a comment line.
pub fn parse_config<R: BufRead>(reader: R, file_name: &str) -> Result<ConfigMap, FFMCRunError> {
    let mut config_map: ConfigMap = ConfigMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|error| format!("error line: {i} \n {error}"))?;
        let line = line.trim().to_string();

        if line.starts_with('%') || line.starts_with('#') || line.is_empty() {
            // skip comments and empty lines
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or(format!("error parsing config file {file_name} at line {i}."))?;
        let (key, value) = (key.trim(), value.trim());

        config_map
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }
    Ok(config_map)
}

pub fn read_config(file_name: impl Into<String>) -> Result<ConfigMap, FFMCRunError> {
    let file_name = file_name.into();
    // open file as text and read it using a buffered reader
    let file = File::open(&file_name).map_err(|error| format!("error opening config file: {error}"))?;
    parse_config(io::BufReader::new(file), &file_name)
}

fn default_seed() -> f64 {
    FFMC_INIT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputTypeConfig {
    pub internal_name: String,
    pub name: String,
    pub path: String,
    pub format: String,
    pub variables: Vec<OutputVariable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FFMCConfigBuilder {
    pub model_name: String,
    pub warm_state_path: String,
    #[serde(default)]
    pub model_version: FFMCModelVersion,
    #[serde(default)]
    pub validation: ValidationPolicy,
    #[serde(default = "default_seed")]
    pub ffmc_init: f64,
    /// station subset, in output order; all the stations in the input when absent
    #[serde(default)]
    pub stations: Option<Vec<String>>,
    pub output_types: Vec<OutputTypeConfig>,
}

impl FFMCConfigBuilder {
    pub fn model_config(&self) -> FFMCModelConfig {
        FFMCModelConfig::from_version(self.model_version).with_validation(self.validation)
    }

    pub fn get_model_name(&self) -> &str {
        &self.model_name
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigContainer {
    pub models: Vec<FFMCConfigBuilder>,
}

impl ConfigContainer {
    pub fn from_file(config_file: &str) -> Result<ConfigContainer, FFMCRunError> {
        // Check the file extension to determine which method to use
        if config_file.ends_with(".yaml") || config_file.ends_with(".yml") {
            Self::from_yaml(config_file)
        } else if config_file.ends_with(".txt") {
            Self::from_txt_file(config_file)
        } else {
            Err(FFMCRunError::from(format!(
                "Unsupported config file format: {}",
                config_file
            )))
        }
    }

    pub fn from_yaml(config_file: &str) -> Result<Self, FFMCRunError> {
        let mut file = File::open(config_file)
            .map_err(|err| format!("Cannot open config file {}: {}", config_file, err))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|err| format!("Cannot read config file {}: {}", config_file, err))?;

        Self::from_yaml_str(&contents).map_err(|err| format!("Cannot parse config file {}: {}", config_file, err).into())
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, FFMCRunError> {
        let conf: ConfigContainer =
            serde_yaml::from_str(contents).map_err(|err| format!("{}", err))?;
        Ok(conf)
    }

    fn parse_output_types(
        output_types_defs: &[String],
        variables_defs: &[String],
    ) -> Result<Vec<OutputTypeConfig>, FFMCRunError> {
        let mut output_types_vec: Vec<OutputTypeConfig> = Vec::new();

        for out_type_def in output_types_defs {
            let parts = out_type_def.split(':').collect::<Vec<&str>>();
            if parts.len() != 4 {
                return Err(format!("Invalid output definition {out_type_def}").into());
            }
            let (internal_name, name, path, format) = (parts[0], parts[1], parts[2], parts[3]);

            output_types_vec.push(OutputTypeConfig {
                internal_name: internal_name.into(),
                name: name.into(),
                path: path.into(),
                format: format.into(),
                variables: Vec::new(),
            });
        }

        for variable_def in variables_defs {
            let parts = variable_def.split(':').collect::<Vec<&str>>();
            if parts.len() != 4 {
                return Err(format!("Invalid variable definition {variable_def}").into());
            }
            let (output_type, internal_name, name, precision) = (parts[0], parts[1], parts[2], parts[3]);

            let precision = precision
                .parse::<i32>()
                .map_err(|_| format!("Invalid precision {precision}"))?;
            let internal_name = OutputVariableName::from_str(internal_name)
                .map_err(|_| format!("Invalid Variable Name {internal_name}"))?;

            let output_type = output_types_vec
                .iter_mut()
                .find(|_type| _type.internal_name == output_type)
                .ok_or(format!("Unknown output {output_type} for variable {name}"))?;
            output_type
                .variables
                .push(OutputVariable::new(internal_name, name, precision));
        }

        Ok(output_types_vec)
    }

    pub fn from_config_map(config_map: &ConfigMap) -> Result<ConfigContainer, FFMCRunError> {
        // try to get the model name, expect it to be there
        let model_name = config_map
            .first(MODEL_NAME_KEY)
            .ok_or(format!("Error: {MODEL_NAME_KEY} not found in config"))?;

        let warm_state_path = config_map
            .first(WARM_STATE_PATH_KEY)
            .ok_or(format!("Error: {WARM_STATE_PATH_KEY} not found in config"))?;

        let model_version = match config_map.first(MODEL_VERSION_KEY) {
            Some(value) => FFMCModelVersion::from_str(&value)
                .map_err(|_| format!("Invalid {MODEL_VERSION_KEY} {value}"))?,
            None => FFMCModelVersion::default(),
        };

        let validation = match config_map.first(VALIDATION_KEY) {
            Some(value) => ValidationPolicy::from_str(&value)
                .map_err(|_| format!("Invalid {VALIDATION_KEY} {value}"))?,
            None => ValidationPolicy::default(),
        };

        let ffmc_init = match config_map.first(FFMC_INIT_KEY) {
            Some(value) => value
                .parse::<f64>()
                .map_err(|_| format!("Invalid {FFMC_INIT_KEY} {value}"))?,
            None => FFMC_INIT,
        };

        let stations = config_map.all(STATION_KEY).map(|values| {
            values
                .iter()
                .flat_map(|v| v.split(','))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<String>>()
        });

        let output_types_defs = config_map
            .all(OUTPUTS_KEY)
            .ok_or(format!("KEY {OUTPUTS_KEY} not found"))?;

        let variables_defs = config_map
            .all(VARIABLES_KEY)
            .ok_or(format!("KEY {VARIABLES_KEY} not found"))?;

        let output_types = Self::parse_output_types(&output_types_defs, &variables_defs)?;

        let config = FFMCConfigBuilder {
            model_name,
            warm_state_path,
            model_version,
            validation,
            ffmc_init,
            stations,
            output_types,
        };

        Ok(ConfigContainer {
            models: vec![config],
        })
    }

    fn from_txt_file(config_file: &str) -> Result<ConfigContainer, FFMCRunError> {
        let config_map = read_config(config_file)?;
        Self::from_config_map(&config_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TXT_CONFIG: &str = "\
% ffmc run
MODELNAME=stations
STATO0=/tmp/warm/ffmc_
MODEL_VERSION=vw1985
FFMCINIT=80
STATION=ST01,ST02
STATION=ST03
MODEL=daily:ffmc:/tmp/out:TXT
VARIABLE=daily:ffmc:FFMC:-2
VARIABLE=daily:rain:RAIN:-1
";

    const YAML_CONFIG: &str = "
models:
  - model_name: stations
    warm_state_path: /tmp/warm/ffmc_
    validation: passthrough
    output_types:
      - internal_name: daily
        name: ffmc
        path: /tmp/out
        format: JSON
        variables:
          - internal_name: ffmc
            name: FFMC
            precision: -2
";

    #[test]
    fn txt_config_is_parsed() {
        let map = parse_config(Cursor::new(TXT_CONFIG), "test.txt").expect("valid config");
        let container = ConfigContainer::from_config_map(&map).expect("valid config");
        let model = &container.models[0];

        assert_eq!(model.get_model_name(), "stations");
        assert_eq!(model.warm_state_path, "/tmp/warm/ffmc_");
        assert_eq!(model.model_version, FFMCModelVersion::VanWagnerPickett1985);
        assert_eq!(model.validation, ValidationPolicy::Reject);
        assert_eq!(model.ffmc_init, 80.0);
        assert_eq!(
            model.stations,
            Some(vec!["ST01".to_string(), "ST02".to_string(), "ST03".to_string()])
        );
        assert_eq!(model.output_types.len(), 1);
        assert_eq!(model.output_types[0].format, "TXT");
        assert_eq!(
            model.output_types[0].variables,
            vec![
                OutputVariable::new(OutputVariableName::ffmc, "FFMC", -2),
                OutputVariable::new(OutputVariableName::rain, "RAIN", -1),
            ]
        );
    }

    #[test]
    fn yaml_config_uses_defaults() {
        let container = ConfigContainer::from_yaml_str(YAML_CONFIG).expect("valid config");
        let model = &container.models[0];
        assert_eq!(model.model_version, FFMCModelVersion::VanWagner1987);
        assert_eq!(model.validation, ValidationPolicy::PassThrough);
        assert_eq!(model.ffmc_init, FFMC_INIT);
        assert_eq!(model.stations, None);
        assert_eq!(model.output_types[0].variables[0].internal_name(), OutputVariableName::ffmc);
    }

    #[test]
    fn malformed_configs_are_errors() {
        assert!(parse_config(Cursor::new("MODELNAME stations\n"), "bad.txt").is_err());

        let map = parse_config(Cursor::new("MODELNAME=a\nSTATO0=b\nMODEL=x:y:z:TXT\n"), "bad.txt")
            .expect("valid lines");
        assert!(ConfigContainer::from_config_map(&map).is_err());

        let map = parse_config(
            Cursor::new("MODELNAME=a\nSTATO0=b\nMODEL=x:y:z:TXT\nVARIABLE=x:dmc:DMC:-1\n"),
            "bad.txt",
        )
        .expect("valid lines");
        assert!(ConfigContainer::from_config_map(&map).is_err());

        assert!(ConfigContainer::from_file("config.ini").is_err());
    }
}
