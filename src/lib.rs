//! Disaster Watch Library
//!
//! Geolocation, the two remote functions, the SOS and weather flow controllers,
//! risk derivation and the terminal UI. The binary only wires these together.

pub mod app;
pub mod cli;
pub mod data;
pub mod location;
pub mod risk;
pub mod settings;
pub mod sos;
pub mod ui;
pub mod weather;

#[cfg(test)]
pub(crate) mod testing;
