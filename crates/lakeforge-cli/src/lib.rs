pub mod runner;
pub mod tables;
