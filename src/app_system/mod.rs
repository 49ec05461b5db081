//! System orchestration, startup, and shutdown logic.

pub mod clinic_system;
pub mod config;
pub mod tracing;

pub use clinic_system::ClinicSystem;
pub use config::Config;
pub use tracing::setup_tracing;
