//! Application composition.
//!
//! `AppState` is what a rendering shell holds: the explicitly constructed
//! session store (no global singleton), the API client factory, and the slot
//! builders for each protected view. Views own their orchestrator; the state
//! here only wires sessions and requests together.

use std::sync::Arc;

use serde_json::{Value, json};

use freightline_auth::Session;
use freightline_core::{ClientError, ClientResult, FreightId};
use freightline_fetch::FetchSlot;
use freightline_session::{SessionStore, TokenPersistence};

use crate::api::{ApiClient, CompanyStats, RegisterRequest};
use crate::router::{Navigation, navigate};

/// Slot key for the company dashboard stats source.
pub const SLOT_STATS: &str = "stats";
/// Slot key for the company dashboard freights list.
pub const SLOT_FREIGHTS: &str = "freights";
/// Slot key for the freight detail view.
pub const SLOT_FREIGHT: &str = "freight";

/// Shared application state, injected into the router and views.
pub struct AppState {
    store: Arc<SessionStore>,
    base_url: String,
}

impl AppState {
    pub fn new(base_url: impl Into<String>, persistence: Arc<dyn TokenPersistence>) -> Self {
        Self {
            store: Arc::new(SessionStore::new(persistence)),
            base_url: base_url.into(),
        }
    }

    /// Compose from the environment (`FREIGHTLINE_API_URL`).
    pub fn from_env(persistence: Arc<dyn TokenPersistence>) -> Self {
        let base_url = std::env::var("FREIGHTLINE_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        Self::new(base_url, persistence)
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Rehydrate the session. Must complete before the first navigation.
    pub async fn initialize(&self) {
        self.store.initialize().await;
    }

    /// API client carrying the current session's bearer token, if any.
    pub fn api(&self) -> ApiClient {
        let client = ApiClient::new(self.base_url.clone());
        match self.store.current_session().access_token() {
            Some(token) => client.with_bearer(token),
            None => client,
        }
    }

    /// Evaluate a navigation attempt against the current session.
    pub fn navigate(&self, path: &str) -> Navigation {
        navigate(&self.store.current_session(), path)
    }

    /// Log in and commit the session.
    ///
    /// A rejected login (`Domain` error) propagates to the caller for inline
    /// display and leaves the session untouched.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        let payload = self.api().login(email, password).await?;
        tracing::info!(role = %payload.user.role(), "login succeeded");
        self.store
            .login(payload.user, payload.access_token, payload.refresh_token)
            .await;
        Ok(self.store.current_session())
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<String> {
        self.api().register(request).await
    }

    pub async fn logout(&self) {
        self.store.logout().await;
    }

    /// Apply the auth-failure policy: a 401 on any authenticated call means
    /// the session is no longer trustworthy, so force a logout. Returns
    /// whether the error was consumed (caller should redirect to login).
    pub async fn handle_auth_failure(&self, err: &ClientError) -> bool {
        if !err.is_auth() {
            return false;
        }
        tracing::warn!("authenticated call rejected, dropping session: {err}");
        self.store.logout().await;
        true
    }

    /// Fetch set for the company dashboard: stats and freights list, each
    /// independently callable and independently degradable.
    pub fn company_dashboard_slots(&self) -> Vec<FetchSlot> {
        let stats_api = self.api();
        let freights_api = self.api();

        vec![
            FetchSlot::new(
                SLOT_STATS,
                to_json(CompanyStats::zero()),
                async move { stats_api.company_stats().await.map(to_json) },
            ),
            FetchSlot::new(SLOT_FREIGHTS, json!([]), async move {
                freights_api.company_freights().await.map(to_json)
            }),
        ]
    }

    /// Fetch set for the freight detail view.
    pub fn freight_detail_slots(&self, id: FreightId) -> Vec<FetchSlot> {
        let api = self.api();
        vec![FetchSlot::new(SLOT_FREIGHT, json!(null), async move {
            api.freight_detail(id).await.map(to_json)
        })]
    }
}

fn to_json<T: serde::Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
