//! The remote API boundary: trait seam, request/response DTOs, and the
//! reqwest-backed implementation.

pub mod error;
pub mod http;

pub use error::ApiError;
pub use http::HttpClinicApi;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Appointment, AppointmentStatus, Bill, DoctorSummary, Role, User};

/// Which slice of the appointment collection a fetch targets.
///
/// Patients see their own records, doctors their own schedule, staff all of
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentScope {
    Patient,
    Doctor,
    All,
}

impl AppointmentScope {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Patient => AppointmentScope::Patient,
            Role::Doctor => AppointmentScope::Doctor,
            Role::Staff => AppointmentScope::All,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            AppointmentScope::Patient => "/appointments/patient",
            AppointmentScope::Doctor => "/appointments/doctor",
            AppointmentScope::All => "/appointments",
        }
    }
}

/// Which slice of the bill collection a fetch targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillScope {
    Patient,
    All,
}

impl BillScope {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Patient => BillScope::Patient,
            // Doctors and staff both see the full set; pendingBills on their
            // dashboards counts across it.
            Role::Doctor | Role::Staff => BillScope::All,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            BillScope::Patient => "/bills/patient",
            BillScope::All => "/bills",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub doctor_id: String,
    pub date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdateRequest {
    pub status: AppointmentStatus,
}

/// Body for `POST /bills`. Field names follow the server contract
/// (`appointment` and `patient` are ids).
#[derive(Debug, Clone, Serialize)]
pub struct NewBillRequest {
    pub appointment: String,
    pub patient: String,
    pub amount: f64,
    pub notes: Option<String>,
}

/// The clinic backend as seen by this client. Implemented over HTTP in
/// production and scripted in tests.
#[async_trait]
pub trait ClinicApi: Send + Sync {
    async fn login(&self, req: &LoginRequest) -> Result<User, ApiError>;
    async fn register(&self, req: &RegisterRequest) -> Result<User, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;

    async fn doctors(&self) -> Result<Vec<DoctorSummary>, ApiError>;

    async fn appointments(&self, scope: AppointmentScope) -> Result<Vec<Appointment>, ApiError>;
    async fn book_appointment(&self, req: &BookAppointmentRequest)
        -> Result<Appointment, ApiError>;
    async fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, ApiError>;

    async fn bills(&self, scope: BillScope) -> Result<Vec<Bill>, ApiError>;
    async fn create_bill(&self, req: &NewBillRequest) -> Result<Bill, ApiError>;
    async fn pay_bill(&self, id: &str) -> Result<Bill, ApiError>;
}
