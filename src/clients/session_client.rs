use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use crate::actors::SessionError;
use crate::domain::User;
use crate::messages::SessionRequest;

/// Client for interacting with the session actor.
#[derive(Clone)]
pub struct SessionClient {
    sender: mpsc::Sender<SessionRequest>,
}

impl SessionClient {
    pub fn new(sender: mpsc::Sender<SessionRequest>) -> Self {
        Self { sender }
    }

    // Credentials are hand-written rather than macro-generated so the
    // password never reaches the instrumentation fields.

    #[instrument(fields(email = %email), skip(self, email, password))]
    pub async fn login(&self, email: String, password: String) -> Result<User, SessionError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(SessionRequest::Login {
                email,
                password,
                respond_to,
            })
            .await
            .map_err(|_| SessionError::ActorCommunicationError("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| SessionError::ActorCommunicationError("Actor dropped".to_string()))?
    }

    #[instrument(fields(email = %email), skip(self, email, password, name))]
    pub async fn register(
        &self,
        email: String,
        password: String,
        name: String,
    ) -> Result<User, SessionError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(SessionRequest::Register {
                email,
                password,
                name,
                respond_to,
            })
            .await
            .map_err(|_| SessionError::ActorCommunicationError("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| SessionError::ActorCommunicationError("Actor dropped".to_string()))?
    }

    /// Fire-and-forget; a closed mailbox means the actor is already gone.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(SessionRequest::Shutdown).await;
    }
}

client_method!(SessionClient => fn logout() -> () as SessionRequest::Logout, Error = SessionError);
client_method!(SessionClient => fn current_user() -> Option<User> as SessionRequest::CurrentUser, Error = SessionError);
