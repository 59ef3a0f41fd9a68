pub mod models;
pub mod probes;
