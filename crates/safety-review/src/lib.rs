//! Core library for the aviation-safety peer-review assessment engine.

pub mod assessments;
pub mod config;
pub mod error;
pub mod telemetry;
