use chrono::NaiveDate;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use crate::actors::CoordinatorError;
use crate::domain::{Appointment, AppointmentStatus, Bill, DoctorSummary, User};
use crate::messages::CoordinatorRequest;
use crate::stats::DashboardStats;

/// Client for the coordinator actor. This is the surface the rest of the
/// application talks to: auth, collection refreshes, the orchestrated
/// mutations, and the dashboard statistics.
#[derive(Clone)]
pub struct CoordinatorClient {
    sender: mpsc::Sender<CoordinatorRequest>,
}

impl CoordinatorClient {
    pub fn new(sender: mpsc::Sender<CoordinatorRequest>) -> Self {
        Self { sender }
    }

    #[instrument(fields(email = %email), skip(self, email, password))]
    pub async fn login(&self, email: String, password: String) -> Result<User, CoordinatorError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CoordinatorRequest::Login {
                email,
                password,
                respond_to,
            })
            .await
            .map_err(|_| {
                CoordinatorError::ActorCommunicationError("Actor closed".to_string())
            })?;
        response.await.map_err(|_| {
            CoordinatorError::ActorCommunicationError("Actor dropped".to_string())
        })?
    }

    #[instrument(fields(email = %email), skip(self, email, password, name))]
    pub async fn register(
        &self,
        email: String,
        password: String,
        name: String,
    ) -> Result<User, CoordinatorError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CoordinatorRequest::Register {
                email,
                password,
                name,
                respond_to,
            })
            .await
            .map_err(|_| {
                CoordinatorError::ActorCommunicationError("Actor closed".to_string())
            })?;
        response.await.map_err(|_| {
            CoordinatorError::ActorCommunicationError("Actor dropped".to_string())
        })?
    }

    /// Fire-and-forget; a closed mailbox means the actor is already gone.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(CoordinatorRequest::Shutdown).await;
    }
}

client_method!(CoordinatorClient => fn logout() -> () as CoordinatorRequest::Logout, Error = CoordinatorError);
client_method!(CoordinatorClient => fn refresh_appointments() -> bool as CoordinatorRequest::RefreshAppointments, Error = CoordinatorError);
client_method!(CoordinatorClient => fn refresh_bills() -> bool as CoordinatorRequest::RefreshBills, Error = CoordinatorError);
client_method!(CoordinatorClient => fn doctors() -> Vec<DoctorSummary> as CoordinatorRequest::Doctors, Error = CoordinatorError);
client_method!(CoordinatorClient => fn book_appointment(doctor_id: String, date: NaiveDate, reason: String) -> Appointment as CoordinatorRequest::BookAppointment, Error = CoordinatorError);
client_method!(CoordinatorClient => fn update_appointment_status(id: String, status: AppointmentStatus) -> Appointment as CoordinatorRequest::UpdateAppointmentStatus, Error = CoordinatorError);
client_method!(CoordinatorClient => fn generate_bill(appointment_id: String, amount: f64, notes: Option<String>) -> Bill as CoordinatorRequest::GenerateBill, Error = CoordinatorError);
client_method!(CoordinatorClient => fn pay_bill(id: String) -> Bill as CoordinatorRequest::PayBill, Error = CoordinatorError);
client_method!(CoordinatorClient => fn dashboard_stats() -> DashboardStats as CoordinatorRequest::Stats, Error = CoordinatorError);
