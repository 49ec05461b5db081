use tracing::{debug, instrument};

use crate::appointment_actor::AppointmentError;
use crate::collection_actor::{CollectionClient, FrameworkError, ViewState};
use crate::domain::{Appointment, AppointmentFilter};

/// Client for the appointment collection actor, translating framework errors
/// into the appointment vocabulary.
#[derive(Clone)]
pub struct AppointmentClient {
    inner: CollectionClient<Appointment>,
}

impl AppointmentClient {
    pub fn new(inner: CollectionClient<Appointment>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, records))]
    pub async fn replace(
        &self,
        seq: u64,
        records: Vec<Appointment>,
    ) -> Result<bool, AppointmentError> {
        debug!(count = records.len(), "Sending request");
        self.inner.replace(seq, records).await.map_err(framework_error)
    }

    #[instrument(skip(self))]
    pub async fn set_filter(
        &self,
        filter: AppointmentFilter,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Sending request");
        self.inner.set_filter(filter).await.map_err(framework_error)
    }

    #[instrument(skip(self))]
    pub async fn select(&self, id: Option<String>) -> Result<Option<Appointment>, AppointmentError> {
        debug!("Sending request");
        self.inner.select(id).await.map_err(framework_error)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: String) -> Result<Option<Appointment>, AppointmentError> {
        debug!("Sending request");
        self.inner.get(id).await.map_err(framework_error)
    }

    #[instrument(skip(self, record))]
    pub async fn merge(
        &self,
        record: Appointment,
    ) -> Result<ViewState<Appointment>, AppointmentError> {
        debug!(id = %record.id, "Sending request");
        self.inner.merge(record).await.map_err(framework_error)
    }

    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> Result<ViewState<Appointment>, AppointmentError> {
        debug!("Sending request");
        self.inner.snapshot().await.map_err(framework_error)
    }

    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), AppointmentError> {
        debug!("Sending request");
        self.inner.clear().await.map_err(framework_error)
    }
}

fn framework_error(e: FrameworkError) -> AppointmentError {
    match e {
        FrameworkError::Unavailable => {
            AppointmentError::ActorCommunicationError("collection actor unavailable".to_string())
        }
        FrameworkError::NotFound(id) => AppointmentError::NotFound(id),
        FrameworkError::Rejected(msg) => AppointmentError::UpdateRejected(msg),
    }
}
