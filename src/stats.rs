use chrono::NaiveDate;
use std::collections::HashSet;

use crate::domain::{Appointment, AppointmentStatus, Bill, Role};

/// Aggregate counters for the dashboard.
///
/// Always recomputed in full from the source collections; nothing here is
/// incremented in place, so the counters can never drift from the data.
/// Role-gated counters are `None` for roles that do not see them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    /// Appointments still ahead: pending or confirmed.
    pub upcoming: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub missed: usize,
    /// Appointments on the given calendar date (doctor/staff only).
    pub today: Option<usize>,
    /// Unpaid bills (doctor/staff only).
    pub pending_bills: Option<usize>,
    /// Distinct patients across the visible appointments (doctor/staff only).
    pub total_patients: Option<usize>,
}

impl DashboardStats {
    /// `today` is passed in rather than read from the clock so callers decide
    /// the timezone and tests are deterministic.
    pub fn compute(
        role: Role,
        appointments: &[Appointment],
        bills: &[Bill],
        today: NaiveDate,
    ) -> Self {
        let count = |status: AppointmentStatus| {
            appointments.iter().filter(|a| a.status == status).count()
        };

        let upcoming = appointments
            .iter()
            .filter(|a| {
                matches!(
                    a.status,
                    AppointmentStatus::Pending | AppointmentStatus::Confirmed
                )
            })
            .count();

        let staff_view = matches!(role, Role::Doctor | Role::Staff);

        let today_count = staff_view.then(|| appointments.iter().filter(|a| a.date == today).count());
        let pending_bills = staff_view.then(|| bills.iter().filter(|b| !b.paid).count());
        let total_patients = staff_view.then(|| {
            appointments
                .iter()
                .map(|a| a.patient_id.as_str())
                .collect::<HashSet<_>>()
                .len()
        });

        Self {
            upcoming,
            completed: count(AppointmentStatus::Completed),
            cancelled: count(AppointmentStatus::Cancelled),
            missed: count(AppointmentStatus::Missed),
            today: today_count,
            pending_bills,
            total_patients,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn appt(id: &str, patient: &str, status: AppointmentStatus, date: NaiveDate) -> Appointment {
        Appointment {
            id: id.to_string(),
            patient_id: patient.to_string(),
            doctor_id: "d1".to_string(),
            patient_name: "Pat".to_string(),
            doctor_name: "Dr. Grey".to_string(),
            date,
            reason: "checkup".to_string(),
            status,
            notes: None,
        }
    }

    fn bill(id: &str, paid: bool) -> Bill {
        Bill {
            id: id.to_string(),
            appointment_id: "a1".to_string(),
            patient_id: "p1".to_string(),
            patient_name: None,
            amount: 50.0,
            services: Vec::new(),
            notes: None,
            paid,
            created_at: Utc.with_ymd_and_hms(2026, 8, 20, 9, 0, 0).unwrap(),
            date_paid: None,
        }
    }

    #[test]
    fn counters_partition_the_collection() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        let appointments = vec![
            appt("1", "p1", AppointmentStatus::Pending, today),
            appt("2", "p2", AppointmentStatus::Confirmed, yesterday),
            appt("3", "p1", AppointmentStatus::Completed, yesterday),
            appt("4", "p3", AppointmentStatus::Cancelled, today),
            appt("5", "p2", AppointmentStatus::Missed, yesterday),
        ];
        let bills = vec![bill("b1", false), bill("b2", true), bill("b3", false)];

        let stats = DashboardStats::compute(Role::Staff, &appointments, &bills, today);
        assert_eq!(stats.upcoming, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.missed, 1);
        // Every appointment has exactly one status, so the four buckets cover
        // the whole collection.
        assert_eq!(
            stats.upcoming + stats.completed + stats.cancelled + stats.missed,
            appointments.len()
        );
        assert_eq!(stats.today, Some(2));
        assert_eq!(stats.pending_bills, Some(2));
        assert_eq!(stats.total_patients, Some(3));
    }

    #[test]
    fn patient_role_hides_staff_counters() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let appointments = vec![appt("1", "p1", AppointmentStatus::Pending, today)];
        let stats = DashboardStats::compute(Role::Patient, &appointments, &[], today);
        assert_eq!(stats.upcoming, 1);
        assert_eq!(stats.today, None);
        assert_eq!(stats.pending_bills, None);
        assert_eq!(stats.total_patients, None);
    }

    #[test]
    fn doctor_role_sees_staff_counters() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let stats = DashboardStats::compute(Role::Doctor, &[], &[bill("b1", false)], today);
        assert_eq!(stats.pending_bills, Some(1));
        assert_eq!(stats.total_patients, Some(0));
        assert_eq!(stats.today, Some(0));
    }

    #[test]
    fn empty_collections_produce_zeroes() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let stats = DashboardStats::compute(Role::Patient, &[], &[], today);
        assert_eq!(stats.upcoming, 0);
        assert_eq!(stats.completed, 0);
    }
}
