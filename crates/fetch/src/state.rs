use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use serde_json::Value;

use freightline_core::{ClientError, ClientResult};

/// One independent data source in a view's fetch set.
///
/// The `fallback` is what the view renders for this slice when the fetch
/// fails; failure never removes the key from the result.
pub struct FetchSlot {
    pub(crate) key: String,
    pub(crate) fallback: Value,
    pub(crate) run: Pin<Box<dyn Future<Output = ClientResult<Value>> + Send>>,
}

impl FetchSlot {
    pub fn new(
        key: impl Into<String>,
        fallback: Value,
        run: impl Future<Output = ClientResult<Value>> + Send + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            fallback,
            run: Box::pin(run),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl core::fmt::Debug for FetchSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FetchSlot")
            .field("key", &self.key)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

/// Unified load state of one view activation.
///
/// `pending` stays true until every slot has resolved. After that, `values`
/// has an entry for every slot key (real data or the declared fallback) and
/// `errors` has an entry for exactly the slots that failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewLoadState {
    pub pending: bool,
    pub values: HashMap<String, Value>,
    pub errors: HashMap<String, ClientError>,
}

impl ViewLoadState {
    pub(crate) fn pending() -> Self {
        Self {
            pending: true,
            values: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub(crate) fn settled() -> Self {
        Self::default()
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn error(&self, key: &str) -> Option<&ClientError> {
        self.errors.get(key)
    }
}
