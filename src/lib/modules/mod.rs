pub mod ffmc;
