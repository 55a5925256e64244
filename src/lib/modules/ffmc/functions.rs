use crate::{
    constants::is_missing,
    error::FFMCError,
    models::{input::Observation, output::OutputElement},
};

use super::{config::FFMCModelConfig, constants::*, models::FFMCStateElement};

// SCALE TRANSFORMS
/// Moisture content [%] from an FFMC value.
/// The denominator stays positive for any FFMC in [0, 101].
pub fn from_ffmc_to_moisture(ffmc: f64) -> f64 {
    (FFMC_S1 * (101.0 - ffmc)) / (FFMC_S2 + ffmc)
}

/// FFMC value from a moisture content [%].
/// The denominator stays positive for any moisture reached from FFMC in [0, 101].
pub fn from_moisture_to_ffmc(moisture: f64) -> f64 {
    (FFMC_S3 * (250.0 - moisture)) / (FFMC_S1 + moisture)
}

/// Clamp to [0, 101]. NaN goes through untouched.
pub fn clamp_ffmc(ffmc: f64) -> f64 {
    if ffmc > FFMC_MAX {
        FFMC_MAX
    } else if ffmc < FFMC_MIN {
        FFMC_MIN
    } else {
        ffmc
    }
}

pub fn clamp_humidity(hum: f64) -> f64 {
    if hum > 100.0 {
        100.0
    } else if hum < 0.0 {
        0.0
    } else {
        hum
    }
}

// RAIN PHASE
/// Cap to FFMC_MAX_MOISTURE. NaN goes through untouched.
fn cap_moisture(moisture: f64) -> f64 {
    if moisture > FFMC_MAX_MOISTURE {
        FFMC_MAX_MOISTURE
    } else {
        moisture
    }
}

/// Rain absorption on the moisture content. Only meaningful for rain above FFMC_MIN_RAIN,
/// so the effective rain is strictly positive.
pub fn moisture_rain_effect(moisture: f64, rain: f64) -> f64 {
    let rain_eff: f64 = rain - FFMC_MIN_RAIN;
    let moisture_new: f64 = moisture
        + FFMC_R1 * rain_eff * f64::exp(-100.0 / (FFMC_R0 - moisture)) * (1.0 - f64::exp(-FFMC_R2 / rain_eff))
        + FFMC_R3 * f64::powf(moisture - FFMC_NORMAL_COND, FFMC_R4) * f64::sqrt(rain_eff);
    cap_moisture(moisture_new)
}

/// Van Wagner and Pickett (1985): the sovra-saturation term applies only above FFMC_NORMAL_COND
pub fn moisture_rain_effect_1985(moisture: f64, rain: f64) -> f64 {
    let rain_eff: f64 = rain - FFMC_MIN_RAIN;
    let mut moisture_new: f64 = moisture
        + FFMC_R1 * rain_eff * f64::exp(-100.0 / (FFMC_R0 - moisture)) * (1.0 - f64::exp(-FFMC_R2 / rain_eff));
    if moisture > FFMC_NORMAL_COND {
        moisture_new += FFMC_R3 * f64::powf(moisture - FFMC_NORMAL_COND, FFMC_R4) * f64::sqrt(rain_eff);
    }
    cap_moisture(moisture_new)
}

// NO-RAIN PHASE
/// Drying equilibrium moisture content. Expects humidity already clamped to [0, 100].
pub fn emc_drying(hum: f64, temp: f64) -> f64 {
    FFMC_A1D * f64::powf(hum, FFMC_A2D)
        + (FFMC_A3D * f64::exp((hum - 100.0) / 10.0))
        + (FFMC_A4D * (FFMC_T0 - temp) * (1.0 - f64::exp(-FFMC_A5D * hum)))
}

/// Wetting equilibrium moisture content. Expects humidity already clamped to [0, 100].
pub fn emc_wetting(hum: f64, temp: f64) -> f64 {
    FFMC_A1W * f64::powf(hum, FFMC_A2W)
        + (FFMC_A3W * f64::exp((hum - 100.0) / 10.0))
        + (FFMC_A4W * (FFMC_T0 - temp) * (1.0 - f64::exp(-FFMC_A5W * hum)))
}

/// Log rate `kl` for a humidity term: `hum` for one regime, `100 - hum` for the other
pub fn log_drying_rate(hum_term: f64, w_speed: f64) -> f64 {
    FFMC_B1 * (1.0 - f64::powf(hum_term / 100.0, FFMC_B2))
        + (FFMC_B3 * f64::sqrt(w_speed) * (1.0 - f64::powf(hum_term / 100.0, FFMC_B5)))
}

/// Rate constant `kw` from the log rate and the temperature
pub fn rate_constant(log_rate: f64, temp: f64) -> f64 {
    log_rate * FFMC_B6 * f64::exp(FFMC_B7 * temp)
}

pub fn update_moisture(moisture: f64, hum: f64, temp: f64, w_speed: f64) -> f64 {
    let emc_dry = emc_drying(hum, temp);
    if moisture < emc_dry {
        let kl = log_drying_rate(hum, w_speed);
        let kw = rate_constant(kl, temp);
        emc_dry - (emc_dry - moisture) * f64::powf(10.0, -kw)
    } else {
        // moisture == emc_dry lands here too; the jump from emc_dry to emc_wet is kept as is
        let emc_wet = emc_wetting(hum, temp);
        let kl = log_drying_rate(100.0 - hum, w_speed);
        let kw = rate_constant(kl, temp);
        emc_wet + (moisture - emc_wet) * f64::powf(10.0, -kw)
    }
}

pub fn update_moisture_1985(moisture: f64, hum: f64, temp: f64, w_speed: f64) -> f64 {
    let emc_dry = emc_drying(hum, temp);
    let emc_wet = emc_wetting(hum, temp);
    if moisture > emc_dry {
        // drying process
        let k_dry = rate_constant(log_drying_rate(hum, w_speed), temp);
        emc_dry + (moisture - emc_dry) * f64::powf(10.0, -k_dry)
    } else if moisture < emc_wet {
        // wetting process
        let k_wet = rate_constant(log_drying_rate(100.0 - hum, w_speed), temp);
        emc_wet - (emc_wet - moisture) * f64::powf(10.0, -k_wet)
    } else {
        moisture
    }
}

// DAILY UPDATE
/// One day of FFMC.
///
/// * `temp` - air temperature [°C], usually the 13:00 LT reading
/// * `hum` - relative humidity [%], clamped to [0, 100]
/// * `w_speed` - mean wind speed [km/h]
/// * `rain` - 24h rain [mm]
/// * `ffmc` - yesterday's FFMC, expected in [0, 101] and not checked
///
/// Negative wind or rain are passed straight to the formulas: negative wind yields NaN.
/// Use [`validate_observation`] or [`FFMCModelConfig`] to reject them.
pub fn update_ffmc(temp: f64, hum: f64, w_speed: f64, rain: f64, ffmc: f64) -> f64 {
    let moisture = from_ffmc_to_moisture(ffmc);
    let moisture = if rain > FFMC_MIN_RAIN {
        moisture_rain_effect(moisture, rain)
    } else {
        moisture
    };
    let hum = clamp_humidity(hum);
    let moisture = update_moisture(moisture, hum, temp, w_speed);
    clamp_ffmc(from_moisture_to_ffmc(moisture))
}

/// One day of FFMC with the Van Wagner and Pickett (1985) formulation
pub fn update_ffmc_1985(temp: f64, hum: f64, w_speed: f64, rain: f64, ffmc: f64) -> f64 {
    let moisture = from_ffmc_to_moisture(ffmc);
    let moisture = if rain > FFMC_MIN_RAIN {
        moisture_rain_effect_1985(moisture, rain)
    } else {
        moisture
    };
    let hum = clamp_humidity(hum);
    let moisture = update_moisture_1985(moisture, hum, temp, w_speed);
    clamp_ffmc(from_moisture_to_ffmc(moisture))
}

// VALIDATION
pub fn validate_ffmc(ffmc: f64) -> Result<f64, FFMCError> {
    if !ffmc.is_finite() {
        return Err(FFMCError::NonFiniteInput("ffmc", ffmc));
    }
    if !(FFMC_MIN..=FFMC_MAX).contains(&ffmc) {
        return Err(FFMCError::InvalidFFMC(ffmc));
    }
    Ok(ffmc)
}

pub fn validate_observation(obs: &Observation) -> Result<(), FFMCError> {
    let readings = [
        ("temperature", obs.temperature),
        ("humidity", obs.humidity),
        ("wind_speed", obs.wind_speed),
        ("rain", obs.rain),
    ];
    if let Some((name, value)) = readings.iter().find(|(_, v)| !v.is_finite()) {
        return Err(FFMCError::NonFiniteInput(*name, *value));
    }
    if obs.wind_speed < 0.0 {
        return Err(FFMCError::NegativeWindSpeed(obs.wind_speed));
    }
    if obs.rain < 0.0 {
        return Err(FFMCError::NegativeRain(obs.rain));
    }
    Ok(())
}

// UPDATE STATES
/// Advance one station by one step. Returns false when the station was left unchanged.
pub fn update_state_fn(
    state: &mut FFMCStateElement,
    input: &Observation,
    config: &FFMCModelConfig,
) -> bool {
    let rain = input.rain;
    let humidity = input.humidity;
    let temperature = input.temperature;
    let wind_speed = input.wind_speed;

    if is_missing(rain) || is_missing(humidity) || is_missing(temperature) || is_missing(wind_speed) {
        // keep current ffmc if we don't have all the data
        return false;
    }
    if config.check(input).is_err() {
        return false;
    }

    state.ffmc = config.ffmc(temperature, humidity, wind_speed, rain, state.ffmc);
    true
}

// COMPUTE OUTPUTS
pub fn get_output_fn(state: &FFMCStateElement, input: &Observation) -> OutputElement {
    OutputElement {
        ffmc: state.ffmc,
        temperature: input.temperature,
        humidity: input.humidity,
        wind_speed: input.wind_speed,
        rain: input.rain,
    }
}
