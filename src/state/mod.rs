pub mod config;
pub mod container;
pub mod measurement;
pub mod series;
