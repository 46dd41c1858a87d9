pub mod indicators;
pub mod precision;
