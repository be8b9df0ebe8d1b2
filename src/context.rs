//! Application Context
//!
//! Page-wide collaborators, built once at startup and handed to whoever
//! needs them.

use std::rc::Rc;

use leptos_toast::{create_toast_signals, ToastSignals};

use crate::commands::HttpApi;
use crate::config::{timer_ms, AppConfig};
use crate::feedback::ToastFeedback;
use crate::sync::{BrowserTimer, SyncSettings, TaskSync};

/// The sync controller as wired on a real page
pub type PageSync = TaskSync<HttpApi, ToastFeedback, BrowserTimer>;

#[derive(Clone)]
pub struct AppContext {
    pub config: Rc<AppConfig>,
    pub api: HttpApi,
    pub sync: Rc<PageSync>,
    /// Backing signals of the mounted `ToastLayer`
    pub toasts: ToastSignals,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        let toasts = create_toast_signals(
            timer_ms(config.toast_dismiss_ms),
            timer_ms(config.points_animation_ms),
        );
        let api = HttpApi::new(config.api_base.clone());
        let sync = TaskSync::new(
            api.clone(),
            ToastFeedback::new(toasts),
            BrowserTimer,
            SyncSettings::from(&config),
        );
        Self {
            config: Rc::new(config),
            api,
            sync: Rc::new(sync),
            toasts,
        }
    }
}
