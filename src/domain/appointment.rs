use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an appointment.
///
/// `Completed`, `Cancelled` and `Missed` are terminal: once reached, no further
/// transition is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Missed,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::Missed
        )
    }

    /// Whether a transition from `self` to `next` is permitted.
    ///
    /// Any non-terminal status may move to completed, missed or cancelled;
    /// pending may additionally be confirmed. Terminal statuses allow nothing.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        if self.is_terminal() || *self == next {
            return false;
        }
        match next {
            AppointmentStatus::Confirmed => *self == AppointmentStatus::Pending,
            AppointmentStatus::Completed
            | AppointmentStatus::Cancelled
            | AppointmentStatus::Missed => true,
            AppointmentStatus::Pending => false,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Missed => "missed",
        };
        write!(f, "{}", s)
    }
}

/// A booked appointment as returned by the API.
///
/// Created server-side on booking; mutated only through the status-update
/// operation and never deleted client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub date: NaiveDate,
    pub reason: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Status predicate for the appointment list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppointmentFilter {
    #[default]
    All,
    Status(AppointmentStatus),
}

impl fmt::Display for AppointmentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentFilter::All => write!(f, "all"),
            AppointmentFilter::Status(s) => write!(f, "{}", s),
        }
    }
}
