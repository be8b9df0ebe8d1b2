//! Page Configuration
//!
//! Optional overrides embedded by the server as
//! `<script type="application/json" id="studyflow-config">{...}</script>`.
//! Every field has a default, so an absent or partial block is fine.

use std::time::Duration;

use serde::Deserialize;

pub const CONFIG_ELEMENT_ID: &str = "studyflow-config";

/// What to do with a priority select when the server refuses the change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityFailurePolicy {
    /// Leave the user's selection in place, badge untouched
    #[default]
    KeepSelection,
    /// Put the select back to the last confirmed priority
    Revert,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Prefix for API paths; empty means same origin
    pub api_base: String,
    pub request_timeout_ms: u64,
    pub toast_dismiss_ms: u64,
    pub points_animation_ms: u64,
    pub priority_failure: PriorityFailurePolicy,
    pub log_level: String,
    pub quick_task_modal_id: String,
    pub pomodoro_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            request_timeout_ms: 10_000,
            toast_dismiss_ms: 5_000,
            points_animation_ms: 2_000,
            priority_failure: PriorityFailurePolicy::KeepSelection,
            log_level: "info".to_string(),
            quick_task_modal_id: "quickTaskModal".to_string(),
            pomodoro_url: "/pomodoro".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Read the config block from the page, falling back to defaults
    pub fn from_document(doc: &web_sys::Document) -> Self {
        let Some(raw) = doc
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        else {
            return Self::default();
        };

        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring #{}: {}", CONFIG_ELEMENT_ID, e);
                Self::default()
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

/// Milliseconds as the i32 browser timers take
pub fn timer_ms(ms: u64) -> i32 {
    i32::try_from(ms).unwrap_or(i32::MAX)
}
