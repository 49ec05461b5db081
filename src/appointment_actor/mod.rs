//! Appointment-specific collection logic: merge guard and errors.

pub mod entity;
pub mod error;

pub use error::*;
