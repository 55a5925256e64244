pub mod config;
pub mod constants;
pub mod functions;
pub mod models;
pub mod series;
