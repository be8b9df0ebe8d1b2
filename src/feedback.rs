//! Feedback Emitter
//!
//! Toasts and "+N points!" bursts. Presentation lives in `leptos-toast`;
//! this module maps severities onto it and owns the user-facing wording.

use leptos_toast::{push_burst, push_toast, Tone, ToastSignals};

use crate::models::Severity;

pub const TOGGLE_FAILED: &str = "Failed to update task";
pub const PRIORITY_FAILED: &str = "Failed to update priority";
pub const PRIORITY_UPDATED: &str = "Priority updated";
pub const TASK_UPDATED: &str = "Task updated";
pub const NETWORK_ERROR: &str = "Network error occurred";
pub const STILL_SAVING: &str = "Still saving, please wait";

/// Sink for user-visible feedback events
pub trait Feedback {
    fn notify(&self, message: &str, severity: Severity);

    fn award_points(&self, points: u32);
}

pub fn points_text(points: u32) -> String {
    format!("+{} points!", points)
}

/// Server message if it has one, otherwise our fallback
pub fn message_or<'a>(server: Option<&'a str>, fallback: &'a str) -> &'a str {
    server.map(str::trim).filter(|m| !m.is_empty()).unwrap_or(fallback)
}

fn tone(severity: Severity) -> Tone {
    match severity {
        Severity::Success => Tone::Success,
        Severity::Error => Tone::Danger,
        Severity::Info => Tone::Info,
    }
}

/// Feedback rendered by the page's `ToastLayer`
#[derive(Clone, Copy)]
pub struct ToastFeedback {
    toasts: ToastSignals,
}

impl ToastFeedback {
    pub fn new(toasts: ToastSignals) -> Self {
        Self { toasts }
    }
}

impl Feedback for ToastFeedback {
    fn notify(&self, message: &str, severity: Severity) {
        push_toast(&self.toasts, message, tone(severity));
    }

    fn award_points(&self, points: u32) {
        push_burst(&self.toasts, points_text(points));
    }
}
