use std::sync::Arc;
use tracing::{error, info};

use super::Config;
use crate::actors::{CoordinatorService, SessionService};
use crate::api::{ApiError, ClinicApi, HttpClinicApi};
use crate::clients::{AppointmentClient, BillClient, CoordinatorClient, SessionClient};
use crate::collection_actor::CollectionActor;
use crate::domain::{Appointment, Bill};
use crate::storage::UserStore;

const MAILBOX_SIZE: usize = 32;

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, and handling
/// shutdown.
pub struct ClinicSystem {
    pub coordinator_client: CoordinatorClient,
    pub session_client: SessionClient,
    pub appointment_client: AppointmentClient,
    pub bill_client: BillClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl ClinicSystem {
    /// Builds the system against the real HTTP backend.
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let api = Arc::new(HttpClinicApi::new(
            config.api_base_url.clone(),
            config.request_timeout,
        )?);
        Ok(Self::with_api(config, api))
    }

    /// Builds the system against any [`ClinicApi`] implementation. Tests wire
    /// a scripted backend through here.
    pub fn with_api(config: Config, api: Arc<dyn ClinicApi>) -> Self {
        // 1. Collection actors, one per record type.
        let (appointment_actor, appointment_collection) =
            CollectionActor::<Appointment>::new(MAILBOX_SIZE);
        let appointment_client = AppointmentClient::new(appointment_collection);
        let appointment_handle = tokio::spawn(appointment_actor.run());

        let (bill_actor, bill_collection) = CollectionActor::<Bill>::new(MAILBOX_SIZE);
        let bill_client = BillClient::new(bill_collection);
        let bill_handle = tokio::spawn(bill_actor.run());

        // 2. Session service with its persisted user record.
        let store = UserStore::new(config.storage_dir.clone());
        let (session_service, session_client) =
            SessionService::new(MAILBOX_SIZE, api.clone(), store);
        let session_handle = tokio::spawn(session_service.run());

        // 3. Coordinator on top of everything.
        let (coordinator_service, coordinator_client) = CoordinatorService::new(
            MAILBOX_SIZE,
            api,
            session_client.clone(),
            appointment_client.clone(),
            bill_client.clone(),
            config.fetch_retries,
            config.retry_backoff,
        );
        let coordinator_handle = tokio::spawn(coordinator_service.run());

        Self {
            coordinator_client,
            session_client,
            appointment_client,
            bill_client,
            handles: vec![
                appointment_handle,
                bill_handle,
                session_handle,
                coordinator_handle,
            ],
        }
    }

    /// Stops the coordinator first so no new work reaches the other actors,
    /// then the session service, then closes the collection channels by
    /// dropping their clients.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        self.coordinator_client.shutdown().await;
        self.session_client.shutdown().await;

        drop(self.coordinator_client);
        drop(self.session_client);
        drop(self.appointment_client);
        drop(self.bill_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
