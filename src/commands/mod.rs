//! Backend Command Wrappers
//!
//! Frontend bindings to the StudyFlow JSON API, organized by domain.

mod stats;
mod task;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use crate::error::SyncError;
use crate::models::{Priority, PriorityResponse, TaskId, ToggleStatusResponse};

/// Task mutations the sync controller depends on
#[async_trait(?Send)]
pub trait TaskApi {
    async fn toggle_status(&self, task_id: &TaskId) -> Result<ToggleStatusResponse, SyncError>;

    async fn update_priority(
        &self,
        task_id: &TaskId,
        priority: Priority,
    ) -> Result<PriorityResponse, SyncError>;
}

/// fetch-backed API client
#[derive(Debug, Clone, Default)]
pub struct HttpApi {
    base: String,
}

impl HttpApi {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Absolute URL for an `/api/...` path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.trim_end_matches('/'), path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SyncError> {
        fetch_json("GET", &self.url(path), None).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<String>,
    ) -> Result<T, SyncError> {
        fetch_json("POST", &self.url(path), body).await
    }
}

// ========================
// Transport
// ========================

/// One JSON round trip. The body is decoded whatever the HTTP status, since
/// the backend reports refusals as `{success: false, ...}` with 4xx codes.
async fn fetch_json<T: DeserializeOwned>(
    method: &str,
    url: &str,
    body: Option<String>,
) -> Result<T, SyncError> {
    let window = web_sys::window().ok_or(SyncError::Unavailable("window"))?;

    let init = RequestInit::new();
    init.set_method(method);
    if let Some(body) = body {
        init.set_body(&JsValue::from_str(&body));
    }

    let request = Request::new_with_str_and_init(url, &init).map_err(SyncError::from_js)?;
    let headers = request.headers();
    headers.set("Accept", "application/json").map_err(SyncError::from_js)?;
    headers.set("Content-Type", "application/json").map_err(SyncError::from_js)?;

    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(SyncError::from_js)?;
    let response: Response = response.dyn_into().map_err(SyncError::from_js)?;

    let text = JsFuture::from(response.text().map_err(SyncError::from_js)?)
        .await
        .map_err(SyncError::from_js)?;
    decode_body(response.status(), &text.as_string().unwrap_or_default())
}

fn decode_body<T: DeserializeOwned>(status: u16, text: &str) -> Result<T, SyncError> {
    serde_json::from_str(text).map_err(|source| SyncError::Malformed { status, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_refusal_with_error_status() {
        let resp: ToggleStatusResponse =
            decode_body(404, r#"{"success": false, "message": "Task not found"}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.message.as_deref(), Some("Task not found"));
    }

    #[test]
    fn test_decode_html_is_malformed() {
        let html = "<!doctype html><h1>Server Error</h1>";
        let err = decode_body::<PriorityResponse>(500, html).unwrap_err();
        assert!(matches!(err, SyncError::Malformed { status: 500, .. }));
    }

    #[test]
    fn test_url_respects_base() {
        assert_eq!(HttpApi::default().url("/api/tasks"), "/api/tasks");
        let api = HttpApi::new("http://localhost:5000/");
        assert_eq!(api.url("/api/tasks"), "http://localhost:5000/api/tasks");
    }
}
