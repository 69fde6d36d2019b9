// Common library shared by the dashboard: data source, table, analyses, charts

pub mod analysis;
pub mod charts;
pub mod config;
pub mod errors;
pub mod models;
pub mod source;
pub mod table;
pub mod telemetry;
