pub mod prelude;
pub mod table;
