pub const NODATAVAL: f64 = -9999.0;

/// Returns true when a reading carries the no-data marker or is not a number
pub fn is_missing(value: f64) -> bool {
    value.is_nan() || value <= (NODATAVAL + 1.0)
}
