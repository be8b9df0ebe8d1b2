//! Sync Errors
//!
//! Transport-level failures of a backend call. Application-level refusals
//! (`success: false`) are ordinary responses, not errors.

use std::time::Duration;

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum SyncError {
    /// fetch rejected (offline, DNS, CORS, aborted)
    #[error("network request failed: {0}")]
    Network(String),

    /// Response arrived but the body was not the JSON we expected
    #[error("malformed response (HTTP {status}): {source}")]
    Malformed {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// Browser API missing (no window, no fetch)
    #[error("{0} is unavailable")]
    Unavailable(&'static str),
}

impl SyncError {
    /// Wrap a rejected JS promise / thrown value
    pub fn from_js(value: JsValue) -> Self {
        let text = value
            .as_string()
            .or_else(|| js_sys::JSON::stringify(&value).ok().and_then(|s| s.as_string()))
            .unwrap_or_else(|| format!("{:?}", value));
        SyncError::Network(text)
    }
}
