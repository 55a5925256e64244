pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\n",
    "Fine Fuel Moisture Code model, Van Wagner formulations 1985/1987"
);
