pub const FFMC_INIT: f64 = 85.0;

pub const FFMC_MIN: f64 = 0.0;
pub const FFMC_MAX: f64 = 101.0;

// FFMC CONSTANTS
pub const FFMC_S1: f64 = 147.2;
pub const FFMC_S2: f64 = 59.5;
pub const FFMC_S3: f64 = 59.5;
pub const FFMC_MAX_MOISTURE: f64 = 250.0;
// Rain phase constants
pub const FFMC_MIN_RAIN: f64 = 0.5; // daily cumulated rain (mm)
pub const FFMC_NORMAL_COND: f64 = 150.0;
pub const FFMC_R0: f64 = 251.0;
pub const FFMC_R1: f64 = 42.5;
pub const FFMC_R2: f64 = 6.93;
pub const FFMC_R3: f64 = 0.0015;
pub const FFMC_R4: f64 = 2.0;
// No-rain phase constants
pub const FFMC_A1D: f64 = 0.942;
pub const FFMC_A2D: f64 = 0.679;
pub const FFMC_A3D: f64 = 11.0;
pub const FFMC_A4D: f64 = 0.18;
pub const FFMC_A5D: f64 = 0.115;
pub const FFMC_A1W: f64 = 0.618;
pub const FFMC_A2W: f64 = 0.753;
pub const FFMC_A3W: f64 = 10.0;
pub const FFMC_A4W: f64 = 0.18;
pub const FFMC_A5W: f64 = 0.115;
pub const FFMC_T0: f64 = 21.1;
pub const FFMC_B1: f64 = 0.424;
pub const FFMC_B2: f64 = 1.7;
pub const FFMC_B3: f64 = 0.0694;
pub const FFMC_B5: f64 = 8.0;
pub const FFMC_B6: f64 = 0.581;
pub const FFMC_B7: f64 = 0.0365;
