//! `freightline-fetch`
//!
//! **Responsibility:** per-view concurrent data loading.
//!
//! A view declares its independent data sources as [`FetchSlot`]s; the
//! [`DataOrchestrator`] starts them all at once, folds their outcomes into a
//! [`ViewLoadState`] stream, contains per-slot failures, and suppresses any
//! resolution that lands after the view has been disposed.

pub mod lifetime;
pub mod orchestrator;
pub mod state;

pub use lifetime::ViewLifetime;
pub use orchestrator::{DataOrchestrator, ViewHandle};
pub use state::{FetchSlot, ViewLoadState};
