//! Widget Collaborators
//!
//! Thin bindings to the page's Chart.js, FullCalendar and Bootstrap modal
//! globals. Each widget is optional: if its library global or its host
//! element is missing, it is skipped.

use leptos::task::spawn_local;
use serde::Serialize;
use serde_json::{json, Value};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

use crate::context::AppContext;
use crate::format::weekday_label;
use crate::models::{DashboardStats, SubjectHours};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = Chart)]
    type ChartJs;

    #[wasm_bindgen(constructor, js_class = "Chart", catch)]
    fn new(canvas: &Element, config: &JsValue) -> Result<ChartJs, JsValue>;
}

#[wasm_bindgen(js_namespace = FullCalendar)]
extern "C" {
    #[wasm_bindgen(js_name = Calendar)]
    type Calendar;

    #[wasm_bindgen(constructor, js_class = "Calendar", catch)]
    fn new(el: &Element, options: &JsValue) -> Result<Calendar, JsValue>;

    #[wasm_bindgen(method, js_class = "Calendar")]
    fn render(this: &Calendar);
}

#[wasm_bindgen(js_namespace = bootstrap)]
extern "C" {
    #[wasm_bindgen(js_name = Modal)]
    type BootstrapModal;

    #[wasm_bindgen(constructor, js_class = "Modal", catch)]
    fn new(el: &Element) -> Result<BootstrapModal, JsValue>;

    #[wasm_bindgen(method, js_class = "Modal")]
    fn show(this: &BootstrapModal);
}

pub const SUBJECT_COLORS: [&str; 8] = [
    "#0d6efd", "#198754", "#ffc107", "#dc3545", "#0dcaf0", "#6f42c1", "#fd7e14", "#20c997",
];

fn has_global(name: &str) -> bool {
    js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str(name)).unwrap_or(false)
}

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

/// serde_json -> plain JS object (not Map)
fn to_js(value: &Value) -> Result<JsValue, JsValue> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

// ========================
// Chart Configs
// ========================

pub fn study_hours_chart(stats: &DashboardStats) -> Value {
    let labels: Vec<String> = stats.weekly_stats.iter().map(|d| weekday_label(&d.date)).collect();
    let hours: Vec<f64> = stats.weekly_stats.iter().map(|d| d.hours).collect();
    json!({
        "type": "line",
        "data": {
            "labels": labels,
            "datasets": [{
                "label": "Study Hours",
                "data": hours,
                "borderColor": "#0d6efd",
                "backgroundColor": "rgba(13, 110, 253, 0.1)",
                "borderWidth": 3,
                "fill": true,
                "tension": 0.4
            }]
        },
        "options": {
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": { "legend": { "display": false } },
            "scales": {
                "y": { "beginAtZero": true, "grid": { "color": "rgba(0,0,0,0.1)" } },
                "x": { "grid": { "display": false } }
            }
        }
    })
}

pub fn subject_chart(rows: &[SubjectHours]) -> Value {
    let labels: Vec<&str> = rows.iter().map(|r| r.subject.as_str()).collect();
    let hours: Vec<f64> = rows.iter().map(|r| r.hours).collect();
    let colors = &SUBJECT_COLORS[..rows.len().min(SUBJECT_COLORS.len())];
    json!({
        "type": "doughnut",
        "data": {
            "labels": labels,
            "datasets": [{
                "data": hours,
                "backgroundColor": colors,
                "borderWidth": 0
            }]
        },
        "options": {
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": { "legend": { "position": "bottom" } }
        }
    })
}

pub fn calendar_options(events_url: &str) -> Value {
    json!({
        "initialView": "dayGridMonth",
        "headerToolbar": {
            "left": "prev,next today",
            "center": "title",
            "right": "dayGridMonth,timeGridWeek,listWeek"
        },
        "events": events_url
    })
}

// ========================
// Initialization
// ========================

fn draw(canvas: &Element, config: &Value) -> Result<(), JsValue> {
    ChartJs::new(canvas, &to_js(config)?)?;
    Ok(())
}

/// Draw `#studyHoursChart` and `#subjectChart` when Chart.js is loaded
pub fn init_charts(doc: &Document, ctx: &AppContext) {
    if !has_global("Chart") {
        return;
    }

    if let Some(canvas) = doc.get_element_by_id("studyHoursChart") {
        let api = ctx.api.clone();
        spawn_local(async move {
            match api.dashboard_stats().await {
                Ok(stats) => {
                    if let Err(e) = draw(&canvas, &study_hours_chart(&stats)) {
                        log::error!("study hours chart: {:?}", e);
                    }
                }
                Err(e) => log::error!("study hours chart: {}", e),
            }
        });
    }

    if let Some(canvas) = doc.get_element_by_id("subjectChart") {
        let api = ctx.api.clone();
        spawn_local(async move {
            match api.subject_hours().await {
                Ok(rows) => {
                    if let Err(e) = draw(&canvas, &subject_chart(&rows)) {
                        log::error!("subject chart: {:?}", e);
                    }
                }
                Err(e) => log::error!("subject chart: {}", e),
            }
        });
    }
}

/// Month calendar in `#calendar`; clicking a day opens the quick-add modal
pub fn init_calendar(doc: &Document, ctx: &AppContext) {
    if !has_global("FullCalendar") {
        return;
    }
    let Some(el) = doc.get_element_by_id("calendar") else {
        return;
    };
    if let Err(e) = mount_calendar(&el, ctx) {
        log::error!("calendar: {:?}", e);
    }
}

fn mount_calendar(el: &Element, ctx: &AppContext) -> Result<(), JsValue> {
    let options = to_js(&calendar_options(&ctx.api.url("/api/tasks")))?;

    let modal_id = ctx.config.quick_task_modal_id.clone();
    let on_date_click =
        Closure::<dyn FnMut(JsValue)>::new(move |_info: JsValue| open_modal(&modal_id));
    js_sys::Reflect::set(&options, &JsValue::from_str("dateClick"), on_date_click.as_ref())?;
    on_date_click.forget();

    Calendar::new(el, &options)?.render();
    Ok(())
}

/// Show a Bootstrap modal by element id, if both exist
pub fn open_modal(id: &str) {
    if !has_global("bootstrap") {
        return;
    }
    let Some(el) = document().and_then(|doc| doc.get_element_by_id(id)) else {
        log::debug!("no #{} on this page", id);
        return;
    };
    match BootstrapModal::new(&el) {
        Ok(modal) => modal.show(),
        Err(e) => log::error!("modal #{}: {:?}", id, e),
    }
}
