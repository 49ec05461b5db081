use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bill issued by staff for a completed appointment.
///
/// Becomes immutable once paid, except for the paid timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub appointment_id: String,
    pub patient_id: String,
    #[serde(default)]
    pub patient_name: Option<String>,
    pub amount: f64,
    /// Itemized services, in the order the server issued them. Empty when the
    /// server omits the breakdown.
    #[serde(default)]
    pub services: Vec<BillService>,
    #[serde(default)]
    pub notes: Option<String>,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub date_paid: Option<NaiveDate>,
}

/// Line item on a bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillService {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub cost: f64,
}

/// Payment predicate for the bill list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BillFilter {
    #[default]
    All,
    Paid,
    Unpaid,
}

impl fmt::Display for BillFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillFilter::All => write!(f, "all"),
            BillFilter::Paid => write!(f, "paid"),
            BillFilter::Unpaid => write!(f, "unpaid"),
        }
    }
}
