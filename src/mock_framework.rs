//! # Mock Framework
//!
//! Utilities for testing clients and the full system in isolation.
//!
//! Use [`create_mock_collection_client`] to test a client against a channel
//! you control, and [`MockApi`] to script the backend's responses for full
//! system tests. Shared fixtures for users, appointments, and bills live here
//! too.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use tokio::sync::mpsc;

use crate::api::{
    ApiError, AppointmentScope, BillScope, BookAppointmentRequest, ClinicApi, LoginRequest,
    NewBillRequest, RegisterRequest,
};
use crate::collection_actor::{CollectionClient, CollectionRequest, Record, Response};
use crate::domain::{
    Appointment, AppointmentStatus, Bill, DoctorProfile, DoctorSummary, PatientProfile, Profile,
    StaffProfile, User,
};

// =============================================================================
// Mock collection client
// =============================================================================

/// Creates a mock collection client and a receiver for asserting requests.
///
/// # Testing Strategy
/// When a test only exercises client-side logic, we don't spin up a full
/// `CollectionActor`. The mock client sends messages to a channel the test
/// controls, so the test can inspect each request and script the actor's
/// answer (success, failure, delay) deterministically.
pub fn create_mock_collection_client<T: Record>(
    buffer_size: usize,
) -> (CollectionClient<T>, mpsc::Receiver<CollectionRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (CollectionClient::from_sender(sender), receiver)
}

/// Helper to verify that the next message is a Replace request
pub async fn expect_replace<T: Record>(
    receiver: &mut mpsc::Receiver<CollectionRequest<T>>,
) -> Option<(u64, Vec<T>, Response<bool>)> {
    match receiver.recv().await {
        Some(CollectionRequest::Replace {
            seq,
            records,
            respond_to,
        }) => Some((seq, records, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Merge request
pub async fn expect_merge<T: Record>(
    receiver: &mut mpsc::Receiver<CollectionRequest<T>>,
) -> Option<(T, Response<crate::collection_actor::ViewState<T>>)> {
    match receiver.recv().await {
        Some(CollectionRequest::Merge { record, respond_to }) => Some((record, respond_to)),
        _ => None,
    }
}

// =============================================================================
// Scripted backend
// =============================================================================

/// One recorded call against [`MockApi`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Login(String),
    Register(String),
    Logout,
    Doctors,
    Appointments(AppointmentScope),
    BookAppointment(String),
    UpdateStatus(String, AppointmentStatus),
    Bills(BillScope),
    CreateBill(String),
    PayBill(String),
}

type Script<T> = Mutex<VecDeque<(Result<T, ApiError>, Option<Duration>)>>;

/// Scripted [`ClinicApi`]: every operation pops the next queued response for
/// that operation, optionally sleeping first to simulate a slow network. An
/// unscripted call fails loudly so a test never silently passes on a request
/// it didn't anticipate. Every call is recorded for assertion.
#[derive(Default)]
pub struct MockApi {
    calls: Mutex<Vec<ApiCall>>,
    logins: Script<User>,
    registers: Script<User>,
    logouts: Script<()>,
    doctors: Script<Vec<DoctorSummary>>,
    appointments: Script<Vec<Appointment>>,
    bookings: Script<Appointment>,
    status_updates: Script<Appointment>,
    bills: Script<Vec<Bill>>,
    created_bills: Script<Bill>,
    payments: Script<Bill>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn push_login(&self, result: Result<User, ApiError>) {
        self.logins.lock().unwrap().push_back((result, None));
    }

    pub fn push_register(&self, result: Result<User, ApiError>) {
        self.registers.lock().unwrap().push_back((result, None));
    }

    pub fn push_logout(&self, result: Result<(), ApiError>) {
        self.logouts.lock().unwrap().push_back((result, None));
    }

    pub fn push_doctors(&self, result: Result<Vec<DoctorSummary>, ApiError>) {
        self.doctors.lock().unwrap().push_back((result, None));
    }

    pub fn push_appointments(&self, result: Result<Vec<Appointment>, ApiError>) {
        self.appointments.lock().unwrap().push_back((result, None));
    }

    /// Scripts an appointment fetch that takes `delay` to answer.
    pub fn push_appointments_delayed(
        &self,
        result: Result<Vec<Appointment>, ApiError>,
        delay: Duration,
    ) {
        self.appointments
            .lock()
            .unwrap()
            .push_back((result, Some(delay)));
    }

    pub fn push_booking(&self, result: Result<Appointment, ApiError>) {
        self.bookings.lock().unwrap().push_back((result, None));
    }

    pub fn push_status_update(&self, result: Result<Appointment, ApiError>) {
        self.status_updates.lock().unwrap().push_back((result, None));
    }

    /// Scripts a status update that takes `delay` to answer.
    pub fn push_status_update_delayed(
        &self,
        result: Result<Appointment, ApiError>,
        delay: Duration,
    ) {
        self.status_updates
            .lock()
            .unwrap()
            .push_back((result, Some(delay)));
    }

    pub fn push_bills(&self, result: Result<Vec<Bill>, ApiError>) {
        self.bills.lock().unwrap().push_back((result, None));
    }

    pub fn push_created_bill(&self, result: Result<Bill, ApiError>) {
        self.created_bills.lock().unwrap().push_back((result, None));
    }

    pub fn push_payment(&self, result: Result<Bill, ApiError>) {
        self.payments.lock().unwrap().push_back((result, None));
    }

    async fn take<T>(queue: &Script<T>, op: &str) -> Result<T, ApiError> {
        // The guard must drop before any await point.
        let entry = queue.lock().unwrap().pop_front();
        match entry {
            Some((result, Some(delay))) => {
                tokio::time::sleep(delay).await;
                result
            }
            Some((result, None)) => result,
            None => Err(ApiError::Network(format!(
                "no scripted response for {}",
                op
            ))),
        }
    }
}

#[async_trait]
impl ClinicApi for MockApi {
    async fn login(&self, req: &LoginRequest) -> Result<User, ApiError> {
        self.record(ApiCall::Login(req.email.clone()));
        Self::take(&self.logins, "login").await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<User, ApiError> {
        self.record(ApiCall::Register(req.email.clone()));
        Self::take(&self.registers, "register").await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.record(ApiCall::Logout);
        // Logout succeeds unless a test scripts otherwise.
        let entry = self.logouts.lock().unwrap().pop_front();
        match entry {
            Some((result, _)) => result,
            None => Ok(()),
        }
    }

    async fn doctors(&self) -> Result<Vec<DoctorSummary>, ApiError> {
        self.record(ApiCall::Doctors);
        Self::take(&self.doctors, "doctors").await
    }

    async fn appointments(&self, scope: AppointmentScope) -> Result<Vec<Appointment>, ApiError> {
        self.record(ApiCall::Appointments(scope));
        Self::take(&self.appointments, "appointments").await
    }

    async fn book_appointment(
        &self,
        req: &BookAppointmentRequest,
    ) -> Result<Appointment, ApiError> {
        self.record(ApiCall::BookAppointment(req.doctor_id.clone()));
        Self::take(&self.bookings, "book_appointment").await
    }

    async fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, ApiError> {
        self.record(ApiCall::UpdateStatus(id.to_string(), status));
        Self::take(&self.status_updates, "update_appointment_status").await
    }

    async fn bills(&self, scope: BillScope) -> Result<Vec<Bill>, ApiError> {
        self.record(ApiCall::Bills(scope));
        Self::take(&self.bills, "bills").await
    }

    async fn create_bill(&self, req: &NewBillRequest) -> Result<Bill, ApiError> {
        self.record(ApiCall::CreateBill(req.appointment.clone()));
        Self::take(&self.created_bills, "create_bill").await
    }

    async fn pay_bill(&self, id: &str) -> Result<Bill, ApiError> {
        self.record(ApiCall::PayBill(id.to_string()));
        Self::take(&self.payments, "pay_bill").await
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn patient_user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        name: name.to_string(),
        profile: Profile::Patient(PatientProfile::default()),
    }
}

pub fn doctor_user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        name: name.to_string(),
        profile: Profile::Doctor(DoctorProfile {
            specialization: "Cardiology".to_string(),
            availability: Vec::new(),
        }),
    }
}

pub fn staff_user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        name: name.to_string(),
        profile: Profile::Staff(StaffProfile {
            department: "Front Desk".to_string(),
        }),
    }
}

pub fn appointment(id: &str, patient_id: &str, status: AppointmentStatus) -> Appointment {
    Appointment {
        id: id.to_string(),
        patient_id: patient_id.to_string(),
        doctor_id: "d1".to_string(),
        patient_name: "Pat".to_string(),
        doctor_name: "Dr. Grey".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        reason: "checkup".to_string(),
        status,
        notes: None,
    }
}

pub fn bill(id: &str, appointment_id: &str, paid: bool) -> Bill {
    Bill {
        id: id.to_string(),
        appointment_id: appointment_id.to_string(),
        patient_id: "p1".to_string(),
        patient_name: Some("Pat".to_string()),
        amount: 120.0,
        services: Vec::new(),
        notes: None,
        paid,
        created_at: Utc.with_ymd_and_hms(2026, 8, 20, 9, 0, 0).unwrap(),
        date_paid: paid.then(|| NaiveDate::from_ymd_opt(2026, 8, 21).unwrap()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_collection_client_round_trip() {
        let (client, mut receiver) = create_mock_collection_client::<Appointment>(10);

        let records = vec![appointment("1", "p1", AppointmentStatus::Pending)];
        let expected = records.clone();
        let replace_task =
            tokio::spawn(async move { client.replace(1, records).await });

        let (seq, sent, responder) = expect_replace(&mut receiver)
            .await
            .expect("Expected Replace request");
        assert_eq!(seq, 1);
        assert_eq!(sent, expected);
        responder.send(Ok(true)).unwrap();

        assert_eq!(replace_task.await.unwrap(), Ok(true));
    }

    #[tokio::test]
    async fn mock_collection_client_scripts_merge_responses() {
        let (client, mut receiver) = create_mock_collection_client::<Appointment>(10);

        let confirmed = appointment("1", "p1", AppointmentStatus::Confirmed);
        let expected = confirmed.clone();
        let merge_task = tokio::spawn(async move { client.merge(confirmed).await });

        let (record, responder) = expect_merge(&mut receiver)
            .await
            .expect("Expected Merge request");
        assert_eq!(record, expected);
        responder
            .send(Ok(crate::collection_actor::ViewState {
                records: vec![expected.clone()],
                visible: vec![expected.clone()],
                filter: Default::default(),
                selected: None,
            }))
            .unwrap();

        let view = merge_task.await.unwrap().unwrap();
        assert_eq!(view.records, vec![expected]);
    }

    #[tokio::test]
    async fn unscripted_call_fails_loudly() {
        let api = MockApi::new();
        let err = api.doctors().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(api.calls(), vec![ApiCall::Doctors]);
    }
}
