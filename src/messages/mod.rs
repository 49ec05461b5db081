use chrono::NaiveDate;
use tokio::sync::oneshot;

use crate::actors::{CoordinatorError, SessionError};
use crate::domain::{Appointment, AppointmentStatus, Bill, DoctorSummary, User};
use crate::stats::DashboardStats;

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Typed message enums for actor communication. Each variant includes
/// parameters and a oneshot channel for responses.

#[derive(Debug)]
pub enum SessionRequest {
    Login {
        email: String,
        password: String,
        respond_to: ServiceResponse<User, SessionError>,
    },
    Register {
        email: String,
        password: String,
        name: String,
        respond_to: ServiceResponse<User, SessionError>,
    },
    Logout {
        respond_to: ServiceResponse<(), SessionError>,
    },
    CurrentUser {
        respond_to: ServiceResponse<Option<User>, SessionError>,
    },
    Shutdown,
}

#[derive(Debug)]
pub enum CoordinatorRequest {
    Login {
        email: String,
        password: String,
        respond_to: ServiceResponse<User, CoordinatorError>,
    },
    Register {
        email: String,
        password: String,
        name: String,
        respond_to: ServiceResponse<User, CoordinatorError>,
    },
    Logout {
        respond_to: ServiceResponse<(), CoordinatorError>,
    },
    /// Re-fetch the role-scoped appointment collection. Answers `Ok(false)`
    /// when the result arrived stale and was discarded.
    RefreshAppointments {
        respond_to: ServiceResponse<bool, CoordinatorError>,
    },
    RefreshBills {
        respond_to: ServiceResponse<bool, CoordinatorError>,
    },
    Doctors {
        respond_to: ServiceResponse<Vec<DoctorSummary>, CoordinatorError>,
    },
    BookAppointment {
        doctor_id: String,
        date: NaiveDate,
        reason: String,
        respond_to: ServiceResponse<Appointment, CoordinatorError>,
    },
    UpdateAppointmentStatus {
        id: String,
        status: AppointmentStatus,
        respond_to: ServiceResponse<Appointment, CoordinatorError>,
    },
    GenerateBill {
        appointment_id: String,
        amount: f64,
        notes: Option<String>,
        respond_to: ServiceResponse<Bill, CoordinatorError>,
    },
    PayBill {
        id: String,
        respond_to: ServiceResponse<Bill, CoordinatorError>,
    },
    Stats {
        respond_to: ServiceResponse<DashboardStats, CoordinatorError>,
    },
    Shutdown,
}
