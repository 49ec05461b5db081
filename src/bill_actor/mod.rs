//! Bill-specific collection logic: paid-bill immutability and errors.

pub mod entity;
pub mod error;

pub use error::*;
