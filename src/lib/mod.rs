pub mod constants;
pub mod error;
pub mod models;
pub mod modules;
pub mod version;

#[cfg(feature = "python-bindings")]
pub mod python;

pub use modules::ffmc::functions::update_ffmc;
pub use modules::ffmc::series::{run, run_stations, run_with_config};
