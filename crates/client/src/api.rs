//! Typed client for the marketplace REST boundary.
//!
//! Status mapping: 401 → `Auth` (the session is no longer trustworthy),
//! 404 → `NotFound`, 5xx and transport failures → `Network`, everything else
//! flows through the response envelope where `success == false` becomes a
//! `Domain` error.

use serde::{Deserialize, Serialize};
use serde_json::json;

use freightline_auth::UserIdentity;
use freightline_core::{ClientError, ClientResult, FreightId, VehicleId};

use crate::envelope::ApiEnvelope;

/// Payload returned by a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    pub user: UserIdentity,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Registration payload, keyed by role.
///
/// One tagged variant per role instead of parallel form blobs switched by a
/// flag; the variant picks the endpoint and the field set at the same time.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RegisterRequest {
    Company {
        email: String,
        password: String,
        company_name: String,
    },
    Driver {
        email: String,
        password: String,
        name: String,
    },
}

impl RegisterRequest {
    fn endpoint(&self) -> &'static str {
        match self {
            RegisterRequest::Company { .. } => "/api/v1/auth/register/company",
            RegisterRequest::Driver { .. } => "/api/v1/auth/register/driver",
        }
    }
}

/// Freight detail as served by `GET /api/v1/freights/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freight {
    pub id: FreightId,
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub cargo_description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// One row of the company freights list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightSummary {
    pub id: FreightId,
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Company dashboard stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyStats {
    pub active_freights: u64,
    pub total_freights: u64,
    pub pending_interests: u64,
}

impl CompanyStats {
    /// The all-zero fallback a dashboard degrades to when the stats source
    /// fails.
    pub fn zero() -> Self {
        Self {
            active_freights: 0,
            total_freights: 0,
            pending_interests: 0,
        }
    }
}

/// HTTP client for the marketplace API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Attach a bearer token for authenticated calls.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// `POST /api/v1/auth/login`.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginPayload> {
        let resp = self
            .http
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({"email": email, "password": password}))
            .send()
            .await
            .map_err(transport_error)?;

        let envelope: ApiEnvelope<LoginPayload> = decode(resp).await?;
        envelope.into_data()
    }

    /// `POST /api/v1/auth/register/{company,driver}`.
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<String> {
        let resp = self
            .http
            .post(self.url(request.endpoint()))
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let envelope: ApiEnvelope<serde_json::Value> = decode(resp).await?;
        envelope.into_ack()
    }

    /// `GET /api/v1/freights/:id` (Bearer).
    pub async fn freight_detail(&self, id: FreightId) -> ClientResult<Freight> {
        let resp = self
            .authed(self.http.get(self.url(&format!("/api/v1/freights/{id}"))))?
            .send()
            .await
            .map_err(transport_error)?;

        let envelope: ApiEnvelope<Freight> = decode(resp).await?;
        envelope.into_data()
    }

    /// `POST /api/v1/freights/:id/interest` (Bearer).
    ///
    /// The vehicle is a required, explicit choice; there is no default.
    pub async fn submit_interest(
        &self,
        id: FreightId,
        vehicle_id: VehicleId,
        message: &str,
    ) -> ClientResult<String> {
        let resp = self
            .authed(
                self.http
                    .post(self.url(&format!("/api/v1/freights/{id}/interest")))
                    .json(&json!({"vehicle_id": vehicle_id, "message": message})),
            )?
            .send()
            .await
            .map_err(transport_error)?;

        let envelope: ApiEnvelope<serde_json::Value> = decode(resp).await?;
        envelope.into_ack()
    }

    /// `GET /api/v1/company/stats` (Bearer).
    pub async fn company_stats(&self) -> ClientResult<CompanyStats> {
        let resp = self
            .authed(self.http.get(self.url("/api/v1/company/stats")))?
            .send()
            .await
            .map_err(transport_error)?;

        let envelope: ApiEnvelope<CompanyStats> = decode(resp).await?;
        envelope.into_data()
    }

    /// `GET /api/v1/company/freights` (Bearer).
    pub async fn company_freights(&self) -> ClientResult<Vec<FreightSummary>> {
        let resp = self
            .authed(self.http.get(self.url("/api/v1/company/freights")))?
            .send()
            .await
            .map_err(transport_error)?;

        let envelope: ApiEnvelope<Vec<FreightSummary>> = decode(resp).await?;
        envelope.into_data()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> ClientResult<reqwest::RequestBuilder> {
        match &self.token {
            Some(token) => Ok(req.bearer_auth(token)),
            None => Err(ClientError::auth("no access token for authenticated call")),
        }
    }
}

/// Map an HTTP response to the envelope, translating status codes first.
async fn decode<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> ClientResult<ApiEnvelope<T>> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ClientError::auth("credential rejected (401)"));
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound);
    }
    if status.is_server_error() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::network(format!("server error ({status}): {body}")));
    }

    // Remaining statuses (2xx and 4xx business rejections) carry an
    // envelope body.
    resp.json::<ApiEnvelope<T>>()
        .await
        .map_err(|e| ClientError::validation(format!("malformed response envelope: {e}")))
}

fn transport_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::network(format!("request timed out: {err}"))
    } else {
        ClientError::network(err.to_string())
    }
}
