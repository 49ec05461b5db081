use tracing::{debug, instrument};

use crate::bill_actor::BillError;
use crate::collection_actor::{CollectionClient, FrameworkError, ViewState};
use crate::domain::{Bill, BillFilter};

/// Client for the bill collection actor.
#[derive(Clone)]
pub struct BillClient {
    inner: CollectionClient<Bill>,
}

impl BillClient {
    pub fn new(inner: CollectionClient<Bill>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, records))]
    pub async fn replace(&self, seq: u64, records: Vec<Bill>) -> Result<bool, BillError> {
        debug!(count = records.len(), "Sending request");
        self.inner.replace(seq, records).await.map_err(framework_error)
    }

    #[instrument(skip(self))]
    pub async fn set_filter(&self, filter: BillFilter) -> Result<Vec<Bill>, BillError> {
        debug!("Sending request");
        self.inner.set_filter(filter).await.map_err(framework_error)
    }

    #[instrument(skip(self))]
    pub async fn select(&self, id: Option<String>) -> Result<Option<Bill>, BillError> {
        debug!("Sending request");
        self.inner.select(id).await.map_err(framework_error)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: String) -> Result<Option<Bill>, BillError> {
        debug!("Sending request");
        self.inner.get(id).await.map_err(framework_error)
    }

    #[instrument(skip(self, record))]
    pub async fn merge(&self, record: Bill) -> Result<ViewState<Bill>, BillError> {
        debug!(id = %record.id, "Sending request");
        self.inner.merge(record).await.map_err(framework_error)
    }

    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> Result<ViewState<Bill>, BillError> {
        debug!("Sending request");
        self.inner.snapshot().await.map_err(framework_error)
    }

    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), BillError> {
        debug!("Sending request");
        self.inner.clear().await.map_err(framework_error)
    }
}

fn framework_error(e: FrameworkError) -> BillError {
    match e {
        FrameworkError::Unavailable => {
            BillError::ActorCommunicationError("collection actor unavailable".to_string())
        }
        FrameworkError::NotFound(id) => BillError::NotFound(id),
        FrameworkError::Rejected(msg) => BillError::UpdateRejected(msg),
    }
}
