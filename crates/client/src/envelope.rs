use serde::Deserialize;

use freightline_core::{ClientError, ClientResult};

/// The marketplace API response envelope: `{ success, message, data }`.
///
/// `success == false` is a server-reported business failure and maps to
/// [`ClientError::Domain`] carrying the server message.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload of a successful envelope.
    pub fn into_data(self) -> ClientResult<T> {
        if !self.success {
            return Err(ClientError::domain(
                self.message.unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| ClientError::validation("response envelope missing data"))
    }

    /// Unwrap an envelope whose only payload is its message (registration,
    /// interest submission).
    pub fn into_ack(self) -> ClientResult<String> {
        if !self.success {
            return Err(ClientError::domain(
                self.message.unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        Ok(self.message.unwrap_or_default())
    }
}
