mod actors;
mod api;
mod app_system;
mod clients;
mod collection_actor;
mod domain;
mod messages;
mod stats;
mod storage;

mod appointment_actor;
mod bill_actor;

#[cfg(test)]
mod mock_framework;

use tracing::{error, info, Instrument};

use crate::app_system::{setup_tracing, ClinicSystem, Config};
use crate::domain::AppointmentFilter;

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("Starting clinic client");

    let config = Config::from_env();
    let system = ClinicSystem::new(config).map_err(|e| e.to_string())?;

    let email = std::env::var("CLINIC_EMAIL").unwrap_or_else(|_| "demo@clinic.test".to_string());
    let password = std::env::var("CLINIC_PASSWORD").unwrap_or_else(|_| "password".to_string());

    let span = tracing::info_span!("login");
    let user = async {
        info!("Logging in");
        system
            .coordinator_client
            .login(email, password)
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    info!(user = %user.name, role = %user.role(), "Authenticated");

    let span = tracing::info_span!("collections");
    async {
        // Login already kicked off background loads; these waits make the demo
        // deterministic before we read the views.
        match system.coordinator_client.refresh_appointments().await {
            Ok(applied) => info!(applied, "Appointment refresh settled"),
            Err(e) => error!(error = %e, "Appointment refresh failed"),
        }
        match system.coordinator_client.refresh_bills().await {
            Ok(applied) => info!(applied, "Bill refresh settled"),
            Err(e) => error!(error = %e, "Bill refresh failed"),
        }

        let visible = system
            .appointment_client
            .set_filter(AppointmentFilter::All)
            .await
            .map_err(|e| e.to_string())?;
        info!(count = visible.len(), "Appointments loaded");
        Ok::<(), String>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("dashboard");
    async {
        match system.coordinator_client.dashboard_stats().await {
            Ok(stats) => info!(?stats, "Dashboard statistics"),
            Err(e) => error!(error = %e, "Stats unavailable"),
        }
    }
    .instrument(span)
    .await;

    let span = tracing::info_span!("logout");
    async {
        if let Err(e) = system.coordinator_client.logout().await {
            error!(error = %e, "Logout failed");
        }
    }
    .instrument(span)
    .await;

    system.shutdown().await?;
    Ok(())
}
