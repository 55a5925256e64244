pub mod json;
pub mod prelude;
pub mod text;
