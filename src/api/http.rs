use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{
    ApiError, AppointmentScope, AuthResponse, BillScope, BookAppointmentRequest, ClinicApi,
    LoginRequest, NewBillRequest, RegisterRequest, StatusUpdateRequest,
};
use crate::domain::{Appointment, AppointmentStatus, Bill, DoctorSummary, User};

/// Error body the backend uses for every failed request.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// reqwest-backed [`ClinicApi`].
///
/// The auth session is a server cookie, so the client carries a cookie store
/// and every call shares it. Each request gets the configured timeout.
pub struct HttpClinicApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClinicApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_response(response).await
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(path, "POST");
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_response(response).await
    }

    async fn patch_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(path, "PATCH");
        let response = self
            .client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_response(response).await
    }
}

fn map_transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else if e.is_decode() {
        ApiError::Decode(e.to_string())
    } else {
        ApiError::Network(e.to_string())
    }
}

/// Maps a failed status to the error taxonomy; decodes the body on success.
async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        let message = match response.text().await {
            Ok(body) => rejection_message(status.as_u16(), &body),
            Err(_) => status.to_string(),
        };
        return Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// The backend reports failures as `{"error": "..."}`; fall back to the raw
/// body when it does not.
fn rejection_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.is_empty() => format!("HTTP {}", status),
        Err(_) => body.to_string(),
    }
}

#[async_trait]
impl ClinicApi for HttpClinicApi {
    async fn login(&self, req: &LoginRequest) -> Result<User, ApiError> {
        let auth: AuthResponse = self.post_json("/auth/login", req).await?;
        Ok(auth.user)
    }

    async fn register(&self, req: &RegisterRequest) -> Result<User, ApiError> {
        let auth: AuthResponse = self.post_json("/auth/register", req).await?;
        Ok(auth.user)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        debug!("POST /auth/logout");
        let response = self
            .client
            .post(self.url("/auth/logout"))
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: status.to_string(),
            });
        }
        Ok(())
    }

    async fn doctors(&self) -> Result<Vec<DoctorSummary>, ApiError> {
        self.get_json("/user/doctors").await
    }

    async fn appointments(&self, scope: AppointmentScope) -> Result<Vec<Appointment>, ApiError> {
        self.get_json(scope.path()).await
    }

    async fn book_appointment(
        &self,
        req: &BookAppointmentRequest,
    ) -> Result<Appointment, ApiError> {
        self.post_json("/appointments", req).await
    }

    async fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, ApiError> {
        let path = format!("/appointments/{}/status", id);
        self.patch_json(&path, &StatusUpdateRequest { status }).await
    }

    async fn bills(&self, scope: BillScope) -> Result<Vec<Bill>, ApiError> {
        self.get_json(scope.path()).await
    }

    async fn create_bill(&self, req: &NewBillRequest) -> Result<Bill, ApiError> {
        self.post_json("/bills", req).await
    }

    async fn pay_bill(&self, id: &str) -> Result<Bill, ApiError> {
        let path = format!("/bills/{}/pay", id);
        self.patch_json(&path, &serde_json::json!({})).await
    }
}
