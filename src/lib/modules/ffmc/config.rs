use std::str::FromStr;

use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{error::FFMCError, models::input::Observation};

use super::functions::{update_ffmc, update_ffmc_1985, validate_ffmc, validate_observation};

type FFMCFnType = fn(f64, f64, f64, f64, f64) -> f64;

/// Formulation of the daily FFMC update
#[derive(
    Debug, Default, PartialEq, Eq, Hash, Copy, Clone, EnumString, EnumIter, Display, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum FFMCModelVersion {
    /// single equilibrium switch on the drying EMC (Van Wagner, 1987)
    #[default]
    #[strum(serialize = "vw1987")]
    #[serde(rename = "vw1987")]
    VanWagner1987,
    /// drying, wetting and neutral regimes (Van Wagner and Pickett, 1985)
    #[strum(serialize = "vw1985")]
    #[serde(rename = "vw1985")]
    VanWagnerPickett1985,
}

/// What to do with inputs outside the physical domain
#[derive(
    Debug, Default, PartialEq, Eq, Hash, Copy, Clone, EnumString, EnumIter, Display, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum ValidationPolicy {
    /// negative wind or rain, non finite readings and seeds outside [0, 101] are errors
    #[default]
    #[strum(serialize = "reject")]
    #[serde(rename = "reject")]
    Reject,
    /// everything goes to the formulas as is
    #[strum(serialize = "passthrough")]
    #[serde(rename = "passthrough")]
    PassThrough,
}

/// configuration structure for model config
/// can be used to store functions and constants
#[derive(Debug, Clone)]
pub struct FFMCModelConfig {
    pub model_version: FFMCModelVersion,
    pub validation: ValidationPolicy,

    ffmc_fn: FFMCFnType,
}

impl FFMCModelConfig {
    /// Unknown version strings fall back to the default formulation
    pub fn new(model_version_str: &str) -> Self {
        let model_version = FFMCModelVersion::from_str(model_version_str).unwrap_or_default();
        Self::from_version(model_version)
    }

    pub fn from_version(model_version: FFMCModelVersion) -> Self {
        let ffmc_fn: FFMCFnType = match model_version {
            FFMCModelVersion::VanWagner1987 => update_ffmc,
            FFMCModelVersion::VanWagnerPickett1985 => update_ffmc_1985,
        };

        FFMCModelConfig {
            model_version,
            validation: ValidationPolicy::default(),
            ffmc_fn,
        }
    }

    pub fn with_validation(mut self, validation: ValidationPolicy) -> Self {
        self.validation = validation;
        self
    }

    pub fn ffmc(
        &self,
        temperature: f64,
        humidity: f64,
        wind_speed: f64,
        rain: f64,
        ffmc: f64,
    ) -> f64 {
        (self.ffmc_fn)(temperature, humidity, wind_speed, rain, ffmc)
    }

    pub fn check(&self, obs: &Observation) -> Result<(), FFMCError> {
        match self.validation {
            ValidationPolicy::Reject => validate_observation(obs),
            ValidationPolicy::PassThrough => Ok(()),
        }
    }

    pub fn check_seed(&self, ffmc: f64) -> Result<f64, FFMCError> {
        match self.validation {
            ValidationPolicy::Reject => validate_ffmc(ffmc),
            ValidationPolicy::PassThrough => Ok(ffmc),
        }
    }
}

impl Default for FFMCModelConfig {
    fn default() -> Self {
        Self::from_version(FFMCModelVersion::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_strings_select_the_update_function() {
        let config = FFMCModelConfig::new("vw1985");
        assert_eq!(config.model_version, FFMCModelVersion::VanWagnerPickett1985);
        assert_eq!(
            config.ffmc(17.0, 42.0, 25.0, 0.0, 85.0),
            update_ffmc_1985(17.0, 42.0, 25.0, 0.0, 85.0)
        );

        let config = FFMCModelConfig::new("VW1987");
        assert_eq!(config.model_version, FFMCModelVersion::VanWagner1987);

        let config = FFMCModelConfig::new("legacy");
        assert_eq!(config.model_version, FFMCModelVersion::VanWagner1987);
        assert_eq!(
            config.ffmc(17.0, 42.0, 25.0, 0.0, 85.0),
            update_ffmc(17.0, 42.0, 25.0, 0.0, 85.0)
        );
    }

    #[test]
    fn passthrough_accepts_out_of_domain_inputs() {
        let obs = Observation::new(20.0, 45.0, -3.0, -1.0);
        let strict = FFMCModelConfig::default();
        assert_eq!(strict.check(&obs), Err(FFMCError::NegativeWindSpeed(-3.0)));
        assert!(strict.check_seed(120.0).is_err());

        let lenient = FFMCModelConfig::default().with_validation(ValidationPolicy::PassThrough);
        assert!(lenient.check(&obs).is_ok());
        assert_eq!(lenient.check_seed(120.0), Ok(120.0));
    }

    #[test]
    fn policy_parses_from_text() {
        assert_eq!(
            ValidationPolicy::from_str("PassThrough").expect("should parse"),
            ValidationPolicy::PassThrough
        );
        assert_eq!(ValidationPolicy::Reject.to_string(), "reject");
        assert_eq!(FFMCModelVersion::VanWagner1987.to_string(), "vw1987");
    }
}
