//! `freightline-client`
//!
//! **Responsibility:** the composition layer of the marketplace client.
//!
//! This crate ties the session store, route gate and fetch orchestration to
//! the REST boundary: the typed [`ApiClient`], the navigation glue, and the
//! [`AppState`] a rendering shell would hold. It is a **thin shell** around
//! the marketplace API; rendering itself lives elsewhere.

pub mod api;
pub mod app;
pub mod envelope;
pub mod router;
pub mod telemetry;

pub use api::{ApiClient, CompanyStats, Freight, FreightSummary, LoginPayload, RegisterRequest};
pub use app::AppState;
pub use envelope::ApiEnvelope;
pub use router::{Navigation, navigate};
