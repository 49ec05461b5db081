use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::SessionError;
use crate::api::{ApiError, ClinicApi, LoginRequest, RegisterRequest};
use crate::clients::SessionClient;
use crate::domain::User;
use crate::messages::{ServiceResponse, SessionRequest};
use crate::storage::UserStore;

/// Owns the authenticated user for the whole system.
///
/// The stored user record is read once at startup, written on successful
/// login/register, and removed at logout. Authentication failures leave the
/// session untouched.
pub struct SessionService {
    receiver: mpsc::Receiver<SessionRequest>,
    api: Arc<dyn ClinicApi>,
    store: UserStore,
    current: Option<User>,
}

impl SessionService {
    pub fn new(
        buffer_size: usize,
        api: Arc<dyn ClinicApi>,
        store: UserStore,
    ) -> (Self, SessionClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let current = store.load();
        if let Some(user) = &current {
            info!(user = %user.name, role = %user.role(), "Restored stored session");
        }
        let service = Self {
            receiver,
            api,
            store,
            current,
        };
        (service, SessionClient::new(sender))
    }

    #[instrument(name = "session_service", skip(self))]
    pub async fn run(mut self) {
        info!("SessionService starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                SessionRequest::Login {
                    email,
                    password,
                    respond_to,
                } => {
                    self.handle_login(email, password, respond_to).await;
                }
                SessionRequest::Register {
                    email,
                    password,
                    name,
                    respond_to,
                } => {
                    self.handle_register(email, password, name, respond_to).await;
                }
                SessionRequest::Logout { respond_to } => {
                    self.handle_logout(respond_to).await;
                }
                SessionRequest::CurrentUser { respond_to } => {
                    debug!("Processing current_user request");
                    let _ = respond_to.send(Ok(self.current.clone()));
                }
                SessionRequest::Shutdown => {
                    info!("SessionService shutting down");
                    break;
                }
            }
        }
        info!("SessionService stopped");
    }

    #[instrument(fields(email = %email), skip(self, email, password, respond_to))]
    async fn handle_login(
        &mut self,
        email: String,
        password: String,
        respond_to: ServiceResponse<User, SessionError>,
    ) {
        info!("Processing login request");
        let request = LoginRequest { email, password };
        match self.api.login(&request).await {
            Ok(user) => {
                self.install(user.clone());
                info!(user = %user.name, role = %user.role(), "Login successful");
                let _ = respond_to.send(Ok(user));
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                let _ = respond_to.send(Err(auth_error(e)));
            }
        }
    }

    #[instrument(fields(email = %email), skip(self, email, password, name, respond_to))]
    async fn handle_register(
        &mut self,
        email: String,
        password: String,
        name: String,
        respond_to: ServiceResponse<User, SessionError>,
    ) {
        info!("Processing register request");
        let request = RegisterRequest {
            email,
            password,
            name,
        };
        match self.api.register(&request).await {
            Ok(user) => {
                self.install(user.clone());
                info!(user = %user.name, "Registration successful");
                let _ = respond_to.send(Ok(user));
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                let _ = respond_to.send(Err(auth_error(e)));
            }
        }
    }

    /// Clears local state even when the server call fails, matching the
    /// source behavior: a logout never leaves a half-authenticated client.
    #[instrument(skip(self, respond_to))]
    async fn handle_logout(&mut self, respond_to: ServiceResponse<(), SessionError>) {
        info!("Processing logout request");
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "Logout API call failed, clearing local session anyway");
        }
        if let Err(e) = self.store.remove() {
            warn!(error = %e, "Failed to remove stored user record");
        }
        self.current = None;
        let _ = respond_to.send(Ok(()));
    }

    fn install(&mut self, user: User) {
        // Storage trouble is not a reason to refuse a server-accepted login.
        if let Err(e) = self.store.save(&user) {
            warn!(error = %e, "Failed to persist user record");
        }
        self.current = Some(user);
    }
}

/// Credential rejections become blocking auth failures; transport problems
/// keep their own shape so the caller can distinguish them.
fn auth_error(e: ApiError) -> SessionError {
    match e {
        ApiError::Rejected { message, .. } => SessionError::AuthFailed(message),
        ApiError::Unauthorized => SessionError::AuthFailed("Invalid credentials".to_string()),
        other => SessionError::Api(other),
    }
}
