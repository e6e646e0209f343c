//! `freightline-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every other
//! crate in the client (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{ClientError, ClientResult};
pub use id::{FreightId, UserId, VehicleId};
