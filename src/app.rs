//! StudyFlow Page Controller
//!
//! Startup wiring: config, logging, feedback layer, control bindings,
//! widgets and the stats refresh.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_toast::ToastLayer;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Document;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::{dispatcher, format, logging, stats, widgets};

/// Start now, or once the DOM is parsed
pub fn boot() {
    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    if doc.ready_state() != "loading" {
        start(&doc);
        return;
    }

    let ready = doc.clone();
    let on_ready = Closure::<dyn FnMut()>::once(move || start(&ready));
    let _ = doc
        .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref());
    on_ready.forget();
}

fn start(doc: &Document) {
    let config = AppConfig::from_document(doc);
    logging::init(config.log_level());

    let ctx = AppContext::new(config);

    let toasts = ctx.toasts;
    mount_to_body(move || view! { <ToastLayer toasts=toasts /> });

    dispatcher::bind_task_controls(doc, &ctx);
    dispatcher::bind_shortcuts(doc, &ctx);

    format::decorate_timestamps(doc, format::now_utc());
    widgets::init_charts(doc, &ctx);
    widgets::init_calendar(doc, &ctx);

    let doc = doc.clone();
    let api = ctx.api.clone();
    spawn_local(async move {
        stats::load_user_stats(&doc, &api).await;
    });

    log::info!("StudyFlow ready");
}
