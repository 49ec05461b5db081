use chrono::Local;
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use super::CoordinatorError;
use crate::api::{
    ApiError, AppointmentScope, BillScope, BookAppointmentRequest, ClinicApi, NewBillRequest,
};
use crate::appointment_actor::AppointmentError;
use crate::bill_actor::BillError;
use crate::clients::{AppointmentClient, BillClient, CoordinatorClient, SessionClient};
use crate::domain::{Appointment, AppointmentStatus, Role, User};
use crate::messages::{CoordinatorRequest, ServiceResponse};
use crate::stats::DashboardStats;

/// Root orchestration actor.
///
/// Owns the role-scoped load commands (with the fetch sequence guard and
/// bounded retry), the confirm-then-merge mutations with their role checks,
/// and the dashboard statistics operation. Network-bound work runs in spawned
/// tasks that own their response channel, so the mailbox stays responsive
/// while requests are in flight; auth operations are handled inline because
/// they are modal for the caller.
pub struct CoordinatorService {
    receiver: mpsc::Receiver<CoordinatorRequest>,
    api: Arc<dyn ClinicApi>,
    session: SessionClient,
    appointments: AppointmentClient,
    bills: BillClient,
    appointment_seq: Arc<AtomicU64>,
    bill_seq: Arc<AtomicU64>,
    mutations_in_flight: Arc<Mutex<HashSet<String>>>,
    fetch_retries: u32,
    retry_backoff: Duration,
}

impl CoordinatorService {
    pub fn new(
        buffer_size: usize,
        api: Arc<dyn ClinicApi>,
        session: SessionClient,
        appointments: AppointmentClient,
        bills: BillClient,
        fetch_retries: u32,
        retry_backoff: Duration,
    ) -> (Self, CoordinatorClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            api,
            session,
            appointments,
            bills,
            appointment_seq: Arc::new(AtomicU64::new(0)),
            bill_seq: Arc::new(AtomicU64::new(0)),
            mutations_in_flight: Arc::new(Mutex::new(HashSet::new())),
            fetch_retries,
            retry_backoff,
        };
        (service, CoordinatorClient::new(sender))
    }

    #[instrument(name = "coordinator_service", skip(self))]
    pub async fn run(mut self) {
        info!("CoordinatorService starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CoordinatorRequest::Login {
                    email,
                    password,
                    respond_to,
                } => {
                    self.handle_login(email, password, respond_to).await;
                }
                CoordinatorRequest::Register {
                    email,
                    password,
                    name,
                    respond_to,
                } => {
                    self.handle_register(email, password, name, respond_to).await;
                }
                CoordinatorRequest::Logout { respond_to } => {
                    self.handle_logout(respond_to).await;
                }
                CoordinatorRequest::RefreshAppointments { respond_to } => {
                    self.spawn_appointment_refresh(Some(respond_to));
                }
                CoordinatorRequest::RefreshBills { respond_to } => {
                    self.spawn_bill_refresh(Some(respond_to));
                }
                CoordinatorRequest::Doctors { respond_to } => {
                    self.spawn_doctors(respond_to);
                }
                CoordinatorRequest::BookAppointment {
                    doctor_id,
                    date,
                    reason,
                    respond_to,
                } => {
                    self.spawn_book_appointment(doctor_id, date, reason, respond_to);
                }
                CoordinatorRequest::UpdateAppointmentStatus {
                    id,
                    status,
                    respond_to,
                } => {
                    self.spawn_status_update(id, status, respond_to);
                }
                CoordinatorRequest::GenerateBill {
                    appointment_id,
                    amount,
                    notes,
                    respond_to,
                } => {
                    self.spawn_generate_bill(appointment_id, amount, notes, respond_to);
                }
                CoordinatorRequest::PayBill { id, respond_to } => {
                    self.spawn_pay_bill(id, respond_to);
                }
                CoordinatorRequest::Stats { respond_to } => {
                    self.handle_stats(respond_to).await;
                }
                CoordinatorRequest::Shutdown => {
                    info!("CoordinatorService shutting down");
                    break;
                }
            }
        }
        info!("CoordinatorService stopped");
    }

    // -------------------------------------------------------------------------
    // Auth (inline: modal for the caller, and identity changes drive the loads)
    // -------------------------------------------------------------------------

    #[instrument(skip(self, email, password, respond_to))]
    async fn handle_login(
        &mut self,
        email: String,
        password: String,
        respond_to: ServiceResponse<User, CoordinatorError>,
    ) {
        info!("Processing login request");
        match self.session.login(email, password).await {
            Ok(user) => {
                // Identity changed: reload both collections for the new role.
                self.spawn_appointment_refresh(None);
                self.spawn_bill_refresh(None);
                let _ = respond_to.send(Ok(user));
            }
            Err(e) => {
                let _ = respond_to.send(Err(e.into()));
            }
        }
    }

    #[instrument(skip(self, email, password, name, respond_to))]
    async fn handle_register(
        &mut self,
        email: String,
        password: String,
        name: String,
        respond_to: ServiceResponse<User, CoordinatorError>,
    ) {
        info!("Processing register request");
        match self.session.register(email, password, name).await {
            Ok(user) => {
                self.spawn_appointment_refresh(None);
                self.spawn_bill_refresh(None);
                let _ = respond_to.send(Ok(user));
            }
            Err(e) => {
                let _ = respond_to.send(Err(e.into()));
            }
        }
    }

    #[instrument(skip(self, respond_to))]
    async fn handle_logout(&mut self, respond_to: ServiceResponse<(), CoordinatorError>) {
        info!("Processing logout request");
        let result = async {
            self.session.logout().await?;
            self.appointments.clear().await?;
            self.bills.clear().await?;
            Ok(())
        }
        .await;
        if let Err(e) = &result {
            error!(error = %e, "Logout failed");
        }
        let _ = respond_to.send(result);
    }

    #[instrument(skip(self, respond_to))]
    async fn handle_stats(&self, respond_to: ServiceResponse<DashboardStats, CoordinatorError>) {
        debug!("Processing stats request");
        let result = async {
            let user = require_user(&self.session).await?;
            let appointments = self
                .appointments
                .snapshot()
                .await
                .map_err(CoordinatorError::Appointment)?;
            let bills = self.bills.snapshot().await.map_err(CoordinatorError::Bill)?;
            Ok(DashboardStats::compute(
                user.role(),
                &appointments.records,
                &bills.records,
                Local::now().date_naive(),
            ))
        }
        .await;
        let _ = respond_to.send(result);
    }

    // -------------------------------------------------------------------------
    // Background loads (task owns the response channel)
    // -------------------------------------------------------------------------

    /// Allocates the fetch sequence number here, in mailbox order, so a
    /// later-issued refresh always outranks an earlier one no matter how their
    /// network calls interleave.
    fn spawn_appointment_refresh(
        &self,
        respond_to: Option<ServiceResponse<bool, CoordinatorError>>,
    ) {
        let seq = self.appointment_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let api = self.api.clone();
        let session = self.session.clone();
        let appointments = self.appointments.clone();
        let retries = self.fetch_retries;
        let backoff = self.retry_backoff;
        tokio::spawn(async move {
            let result =
                load_appointments(api, session, appointments, seq, retries, backoff).await;
            if let Err(e) = &result {
                warn!(error = %e, seq, "Appointment load failed, prior collection retained");
            }
            if let Some(respond_to) = respond_to {
                let _ = respond_to.send(result);
            }
        });
    }

    fn spawn_bill_refresh(&self, respond_to: Option<ServiceResponse<bool, CoordinatorError>>) {
        let seq = self.bill_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let api = self.api.clone();
        let session = self.session.clone();
        let bills = self.bills.clone();
        let retries = self.fetch_retries;
        let backoff = self.retry_backoff;
        tokio::spawn(async move {
            let result = load_bills(api, session, bills, seq, retries, backoff).await;
            if let Err(e) = &result {
                warn!(error = %e, seq, "Bill load failed, prior collection retained");
            }
            if let Some(respond_to) = respond_to {
                let _ = respond_to.send(result);
            }
        });
    }

    fn spawn_doctors(
        &self,
        respond_to: ServiceResponse<Vec<crate::domain::DoctorSummary>, CoordinatorError>,
    ) {
        let api = self.api.clone();
        let session = self.session.clone();
        let retries = self.fetch_retries;
        let backoff = self.retry_backoff;
        tokio::spawn(async move {
            let result = async {
                require_user(&session).await?;
                let doctors = fetch_with_retry(retries, backoff, || {
                    let api = api.clone();
                    async move { api.doctors().await }
                })
                .await?;
                Ok(doctors)
            }
            .await;
            let _ = respond_to.send(result);
        });
    }

    // -------------------------------------------------------------------------
    // Mutations (confirm-then-merge: nothing local changes before the server
    // accepts)
    // -------------------------------------------------------------------------

    fn spawn_status_update(
        &self,
        id: String,
        status: AppointmentStatus,
        respond_to: ServiceResponse<Appointment, CoordinatorError>,
    ) {
        let guard = match self.begin_mutation(format!("appointment:{}", id)) {
            Some(guard) => guard,
            None => {
                let _ = respond_to.send(Err(CoordinatorError::MutationInFlight(id)));
                return;
            }
        };
        let api = self.api.clone();
        let session = self.session.clone();
        let appointments = self.appointments.clone();
        tokio::spawn(async move {
            let result = async {
                let user = require_user(&session).await?;
                require_role(&user, Role::Doctor, "update appointment status")?;
                let current = appointments
                    .get(id.clone())
                    .await?
                    .ok_or_else(|| AppointmentError::NotFound(id.clone()))?;
                if current.status.is_terminal() {
                    return Err(AppointmentError::TerminalStatus {
                        id: id.clone(),
                        status: current.status,
                    }
                    .into());
                }
                if !current.status.can_transition_to(status) {
                    return Err(AppointmentError::UpdateRejected(format!(
                        "appointment {} cannot move from {} to {}",
                        id, current.status, status
                    ))
                    .into());
                }
                let updated = api.update_appointment_status(&id, status).await?;
                appointments.merge(updated.clone()).await?;
                info!(appointment_id = %id, status = %status, "Appointment status updated");
                Ok(updated)
            }
            .await;
            if let Err(e) = &result {
                warn!(error = %e, appointment_id = %id, "Status update failed, no local change");
            }
            // Release the key before answering so the caller can resubmit
            // immediately after seeing the result.
            drop(guard);
            let _ = respond_to.send(result);
        });
    }

    fn spawn_pay_bill(
        &self,
        id: String,
        respond_to: ServiceResponse<crate::domain::Bill, CoordinatorError>,
    ) {
        let guard = match self.begin_mutation(format!("bill:{}", id)) {
            Some(guard) => guard,
            None => {
                let _ = respond_to.send(Err(CoordinatorError::MutationInFlight(id)));
                return;
            }
        };
        let api = self.api.clone();
        let session = self.session.clone();
        let bills = self.bills.clone();
        tokio::spawn(async move {
            let result = async {
                let user = require_user(&session).await?;
                require_role(&user, Role::Patient, "pay a bill")?;
                let current = bills
                    .get(id.clone())
                    .await?
                    .ok_or_else(|| BillError::NotFound(id.clone()))?;
                if current.paid {
                    return Err(BillError::AlreadyPaid(id.clone()).into());
                }
                let paid = api.pay_bill(&id).await?;
                bills.merge(paid.clone()).await?;
                info!(bill_id = %id, "Bill paid");
                Ok(paid)
            }
            .await;
            if let Err(e) = &result {
                warn!(error = %e, bill_id = %id, "Bill payment failed, no local change");
            }
            drop(guard);
            let _ = respond_to.send(result);
        });
    }

    fn spawn_book_appointment(
        &self,
        doctor_id: String,
        date: chrono::NaiveDate,
        reason: String,
        respond_to: ServiceResponse<Appointment, CoordinatorError>,
    ) {
        let api = self.api.clone();
        let session = self.session.clone();
        let appointments = self.appointments.clone();
        let seq_counter = self.appointment_seq.clone();
        let retries = self.fetch_retries;
        let backoff = self.retry_backoff;
        tokio::spawn(async move {
            let result = async {
                let user = require_user(&session).await?;
                require_role(&user, Role::Patient, "book an appointment")?;
                let request = BookAppointmentRequest {
                    doctor_id,
                    date,
                    reason,
                };
                let created = api.book_appointment(&request).await?;
                info!(appointment_id = %created.id, "Appointment booked");
                // The new record enters the collection through a fresh
                // sequenced load, keeping the merger's replace-exactly-one
                // contract strict.
                let seq = seq_counter.fetch_add(1, Ordering::SeqCst) + 1;
                load_appointments(api, session, appointments, seq, retries, backoff).await?;
                Ok(created)
            }
            .await;
            if let Err(e) = &result {
                warn!(error = %e, "Booking failed");
            }
            let _ = respond_to.send(result);
        });
    }

    fn spawn_generate_bill(
        &self,
        appointment_id: String,
        amount: f64,
        notes: Option<String>,
        respond_to: ServiceResponse<crate::domain::Bill, CoordinatorError>,
    ) {
        let api = self.api.clone();
        let session = self.session.clone();
        let appointments = self.appointments.clone();
        let bills = self.bills.clone();
        let seq_counter = self.bill_seq.clone();
        let retries = self.fetch_retries;
        let backoff = self.retry_backoff;
        tokio::spawn(async move {
            let result = async {
                let user = require_user(&session).await?;
                require_role(&user, Role::Staff, "generate a bill")?;
                let appointment = appointments
                    .get(appointment_id.clone())
                    .await?
                    .ok_or_else(|| AppointmentError::NotFound(appointment_id.clone()))?;
                if appointment.status != AppointmentStatus::Completed {
                    return Err(CoordinatorError::AppointmentNotBillable {
                        id: appointment_id.clone(),
                        status: appointment.status,
                    });
                }
                let request = NewBillRequest {
                    appointment: appointment_id.clone(),
                    patient: appointment.patient_id.clone(),
                    amount,
                    notes,
                };
                let bill = api.create_bill(&request).await?;
                info!(bill_id = %bill.id, appointment_id = %appointment_id, "Bill generated");
                let seq = seq_counter.fetch_add(1, Ordering::SeqCst) + 1;
                load_bills(api, session, bills, seq, retries, backoff).await?;
                Ok(bill)
            }
            .await;
            if let Err(e) = &result {
                warn!(error = %e, "Bill generation failed");
            }
            let _ = respond_to.send(result);
        });
    }

    /// Registers a mutation key, refusing duplicates. Runs synchronously in
    /// the actor loop so duplicate suppression follows mailbox order.
    fn begin_mutation(&self, key: String) -> Option<MutationGuard> {
        let mut in_flight = self
            .mutations_in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if !in_flight.insert(key.clone()) {
            debug!(key = %key, "Duplicate mutation suppressed");
            return None;
        }
        Some(MutationGuard {
            set: self.mutations_in_flight.clone(),
            key,
        })
    }
}

/// Releases the mutation key when the owning task finishes, on any path.
struct MutationGuard {
    set: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for MutationGuard {
    fn drop(&mut self) {
        let mut in_flight = self.set.lock().unwrap_or_else(|e| e.into_inner());
        in_flight.remove(&self.key);
    }
}

// =============================================================================
// Load helpers
// =============================================================================

async fn require_user(session: &SessionClient) -> Result<User, CoordinatorError> {
    session
        .current_user()
        .await?
        .ok_or(CoordinatorError::NotAuthenticated)
}

fn require_role(user: &User, required: Role, action: &'static str) -> Result<(), CoordinatorError> {
    if user.role() != required {
        return Err(CoordinatorError::PermissionDenied {
            action,
            role: user.role(),
        });
    }
    Ok(())
}

/// Fetches the role-scoped appointment collection and hands it to the
/// collection actor under the given sequence number. `Ok(false)` means the
/// result arrived stale and was discarded; the fresher collection stays.
async fn load_appointments(
    api: Arc<dyn ClinicApi>,
    session: SessionClient,
    appointments: AppointmentClient,
    seq: u64,
    retries: u32,
    backoff: Duration,
) -> Result<bool, CoordinatorError> {
    let user = require_user(&session).await?;
    let scope = AppointmentScope::for_role(user.role());
    debug!(seq, scope = scope.path(), "Loading appointments");
    let records = fetch_with_retry(retries, backoff, || {
        let api = api.clone();
        async move { api.appointments(scope).await }
    })
    .await?;
    let applied = appointments.replace(seq, records).await?;
    Ok(applied)
}

async fn load_bills(
    api: Arc<dyn ClinicApi>,
    session: SessionClient,
    bills: BillClient,
    seq: u64,
    retries: u32,
    backoff: Duration,
) -> Result<bool, CoordinatorError> {
    let user = require_user(&session).await?;
    let scope = BillScope::for_role(user.role());
    debug!(seq, scope = scope.path(), "Loading bills");
    let records = fetch_with_retry(retries, backoff, || {
        let api = api.clone();
        async move { api.bills(scope).await }
    })
    .await?;
    let applied = bills.replace(seq, records).await?;
    Ok(applied)
}

/// Bounded retry with exponential backoff for transient fetch failures.
/// Non-transient errors and exhausted budgets surface immediately.
async fn fetch_with_retry<T, F, Fut>(
    retries: u32,
    backoff: Duration,
    op: F,
) -> Result<T, ApiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < retries => {
                attempt += 1;
                let delay = backoff * 2u32.saturating_pow(attempt - 1);
                warn!(error = %e, attempt, delay_ms = delay.as_millis() as u64, "Transient fetch failure, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[tokio::test]
    async fn fetch_with_retry_recovers_from_transient_failure() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();
        let result = fetch_with_retry(2, Duration::from_millis(1), move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ApiError::Network("connection reset".to_string()))
                } else {
                    Ok(42u32)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(42));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fetch_with_retry_gives_up_after_budget() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();
        let result: Result<u32, ApiError> =
            fetch_with_retry(1, Duration::from_millis(1), move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ApiError::Timeout)
                }
            })
            .await;
        assert_eq!(result, Err(ApiError::Timeout));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fetch_with_retry_does_not_retry_rejections() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();
        let result: Result<u32, ApiError> =
            fetch_with_retry(3, Duration::from_millis(1), move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ApiError::Rejected {
                        status: 400,
                        message: "bad request".to_string(),
                    })
                }
            })
            .await;
        assert!(matches!(result, Err(ApiError::Rejected { .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
