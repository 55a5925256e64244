use std::fmt::Display;

/// Errors raised when an input falls outside the physical domain of the model
#[derive(Debug, Clone, PartialEq)]
pub enum FFMCError {
    /// wind speed below zero [km/h]
    NegativeWindSpeed(f64),
    /// 24h rain below zero [mm]
    NegativeRain(f64),
    /// NaN or infinite reading, with the name of the variable
    NonFiniteInput(&'static str, f64),
    /// FFMC outside [0, 101]
    InvalidFFMC(f64),
    /// error raised while processing a station series
    InvalidStation { station: String, index: usize, source: Box<FFMCError> },
}

impl FFMCError {
    /// Attach the station name and the position in its series to an error
    pub fn at_station(self, station: &str, index: usize) -> Self {
        FFMCError::InvalidStation {
            station: station.to_owned(),
            index,
            source: Box::new(self),
        }
    }
}

impl Display for FFMCError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FFMCError::NegativeWindSpeed(w) => {
                write!(f, "invalid input: negative wind speed {w} km/h")
            }
            FFMCError::NegativeRain(r) => write!(f, "invalid input: negative rain {r} mm"),
            FFMCError::NonFiniteInput(name, value) => {
                write!(f, "invalid input: {name} is not finite ({value})")
            }
            FFMCError::InvalidFFMC(ffmc) => {
                write!(f, "invalid input: FFMC {ffmc} outside [0, 101]")
            }
            FFMCError::InvalidStation {
                station,
                index,
                source,
            } => write!(f, "station {station}, observation {index}: {source}"),
        }
    }
}

impl std::error::Error for FFMCError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FFMCError::InvalidStation { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn station_error_names_station_and_index() {
        let err = FFMCError::NegativeRain(-1.0).at_station("ST01", 3);
        assert_eq!(
            err.to_string(),
            "station ST01, observation 3: invalid input: negative rain -1 mm"
        );
        assert!(err.source().is_some());
    }
}
