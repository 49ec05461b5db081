use std::fmt::{Debug, Display};
use std::hash::Hash;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

// =============================================================================
// 1. THE ABSTRACTION (Record trait: the seam between domain and actor)
// =============================================================================

/// Trait any remotely-fetched entity must implement to be managed by
/// [`CollectionActor`].
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type Filter: Clone + Copy + Default + PartialEq + Send + Sync + Debug + Display;

    fn id(&self) -> &Self::Id;

    /// Whether this record is visible under the given filter.
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Accept a server-confirmed update of this record.
    ///
    /// The guard for illegal transitions lives here: a rejected update leaves
    /// `self` untouched and the error string is surfaced to the caller.
    fn apply(&mut self, update: Self) -> Result<(), String>;
}

/// Order-preserving status filter. Pure: filtering twice with the same filter
/// yields the same result as once, and the default filter is the identity.
pub fn apply_filter<T: Record>(records: &[T], filter: &T::Filter) -> Vec<T> {
    records
        .iter()
        .filter(|r| r.matches(filter))
        .cloned()
        .collect()
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("collection actor unavailable")]
    Unavailable,
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("update rejected: {0}")]
    Rejected(String),
}

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Full picture of a collection at one point in time: the role-scoped records,
/// the visible subset under the active filter, and the current selection.
#[derive(Debug, Clone)]
pub struct ViewState<T: Record> {
    pub records: Vec<T>,
    pub visible: Vec<T>,
    pub filter: T::Filter,
    pub selected: Option<T>,
}

#[derive(Debug)]
pub enum CollectionRequest<T: Record> {
    /// Atomically replace the whole collection with the result of fetch `seq`.
    /// A stale `seq` (not newer than the last applied one) is discarded and
    /// answered with `Ok(false)`.
    Replace {
        seq: u64,
        records: Vec<T>,
        respond_to: Response<bool>,
    },
    SetFilter {
        filter: T::Filter,
        respond_to: Response<Vec<T>>,
    },
    Select {
        id: Option<T::Id>,
        respond_to: Response<Option<T>>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    /// Merge one server-confirmed mutation result into the collection:
    /// replaces exactly the matching record, re-derives the visible view, and
    /// refreshes the selection if the mutated record was selected.
    Merge {
        record: T,
        respond_to: Response<ViewState<T>>,
    },
    Snapshot {
        respond_to: Response<ViewState<T>>,
    },
    /// Discard all session-scoped state (records, filter, selection).
    Clear {
        respond_to: Response<()>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR
// =============================================================================

/// Owns one role-scoped collection and its derived view.
///
/// Records are kept in a `Vec` so the server's insertion order survives
/// filtering and merging.
pub struct CollectionActor<T: Record> {
    receiver: mpsc::Receiver<CollectionRequest<T>>,
    records: Vec<T>,
    filter: T::Filter,
    selected: Option<T::Id>,
    last_applied_seq: u64,
}

impl<T: Record> CollectionActor<T> {
    pub fn new(buffer_size: usize) -> (Self, CollectionClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            records: Vec::new(),
            filter: T::Filter::default(),
            selected: None,
            last_applied_seq: 0,
        };
        let client = CollectionClient { sender };
        (actor, client)
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CollectionRequest::Replace {
                    seq,
                    records,
                    respond_to,
                } => {
                    if seq <= self.last_applied_seq {
                        debug!(seq, last = self.last_applied_seq, "Discarding stale fetch result");
                        let _ = respond_to.send(Ok(false));
                        continue;
                    }
                    self.last_applied_seq = seq;
                    self.records = records;
                    // Drop a selection that no longer resolves.
                    if let Some(id) = &self.selected {
                        if !self.records.iter().any(|r| r.id() == id) {
                            self.selected = None;
                        }
                    }
                    let _ = respond_to.send(Ok(true));
                }
                CollectionRequest::SetFilter { filter, respond_to } => {
                    self.filter = filter;
                    let _ = respond_to.send(Ok(apply_filter(&self.records, &self.filter)));
                }
                CollectionRequest::Select { id, respond_to } => match id {
                    None => {
                        self.selected = None;
                        let _ = respond_to.send(Ok(None));
                    }
                    Some(id) => match self.records.iter().find(|r| *r.id() == id) {
                        Some(record) => {
                            self.selected = Some(id);
                            let _ = respond_to.send(Ok(Some(record.clone())));
                        }
                        None => {
                            let _ = respond_to
                                .send(Err(FrameworkError::NotFound(id.to_string())));
                        }
                    },
                },
                CollectionRequest::Get { id, respond_to } => {
                    let record = self.records.iter().find(|r| *r.id() == id).cloned();
                    let _ = respond_to.send(Ok(record));
                }
                CollectionRequest::Merge { record, respond_to } => {
                    let result = self.merge(record);
                    let _ = respond_to.send(result);
                }
                CollectionRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.view()));
                }
                CollectionRequest::Clear { respond_to } => {
                    self.records.clear();
                    self.filter = T::Filter::default();
                    self.selected = None;
                    let _ = respond_to.send(Ok(()));
                }
            }
        }
    }

    fn merge(&mut self, record: T) -> Result<ViewState<T>, FrameworkError> {
        let id = record.id().clone();
        match self.records.iter_mut().find(|r| *r.id() == id) {
            Some(existing) => existing
                .apply(record)
                .map_err(FrameworkError::Rejected)?,
            None => return Err(FrameworkError::NotFound(id.to_string())),
        }
        Ok(self.view())
    }

    fn view(&self) -> ViewState<T> {
        let selected = self
            .selected
            .as_ref()
            .and_then(|id| self.records.iter().find(|r| r.id() == id).cloned());
        ViewState {
            records: self.records.clone(),
            visible: apply_filter(&self.records, &self.filter),
            filter: self.filter,
            selected,
        }
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct CollectionClient<T: Record> {
    sender: mpsc::Sender<CollectionRequest<T>>,
}

impl<T: Record> CollectionClient<T> {
    #[cfg(test)]
    pub fn from_sender(sender: mpsc::Sender<CollectionRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        msg: CollectionRequest<T>,
        response: oneshot::Receiver<Result<R, FrameworkError>>,
    ) -> Result<R, FrameworkError> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| FrameworkError::Unavailable)?;
        response.await.map_err(|_| FrameworkError::Unavailable)?
    }

    pub async fn replace(&self, seq: u64, records: Vec<T>) -> Result<bool, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.request(
            CollectionRequest::Replace {
                seq,
                records,
                respond_to,
            },
            response,
        )
        .await
    }

    pub async fn set_filter(&self, filter: T::Filter) -> Result<Vec<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.request(CollectionRequest::SetFilter { filter, respond_to }, response)
            .await
    }

    pub async fn select(&self, id: Option<T::Id>) -> Result<Option<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.request(CollectionRequest::Select { id, respond_to }, response)
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.request(CollectionRequest::Get { id, respond_to }, response)
            .await
    }

    pub async fn merge(&self, record: T) -> Result<ViewState<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.request(CollectionRequest::Merge { record, respond_to }, response)
            .await
    }

    pub async fn snapshot(&self) -> Result<ViewState<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.request(CollectionRequest::Snapshot { respond_to }, response)
            .await
    }

    pub async fn clear(&self) -> Result<(), FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.request(CollectionRequest::Clear { respond_to }, response)
            .await
    }
}

// =============================================================================
// 5. TESTS
// =============================================================================
