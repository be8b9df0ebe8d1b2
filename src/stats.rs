//! User Stats
//!
//! Navbar points badge and level progress bar, refreshed once on load.

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::commands::HttpApi;
use crate::models::UserStats;

pub fn points_badge_html(total_points: i64) -> String {
    format!(r#"<i class="bi bi-star-fill me-1"></i>{} pts"#, total_points)
}

pub fn progress_width(percentage: f64) -> String {
    let pct = if percentage.is_finite() { percentage.clamp(0.0, 100.0) } else { 0.0 };
    format!("{}%", pct)
}

fn render(doc: &Document, stats: &UserStats) {
    if let Some(badge) = doc.query_selector(".navbar .badge").ok().flatten() {
        badge.set_inner_html(&points_badge_html(stats.total_points));
    }
    let bar = doc
        .query_selector(".level-progress")
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    if let Some(bar) = bar {
        let _ = bar.style().set_property("width", &progress_width(stats.progress_percentage));
    }
}

pub async fn load_user_stats(doc: &Document, api: &HttpApi) {
    match api.user_stats().await {
        Ok(resp) if resp.success => match resp.stats {
            Some(stats) => {
                log::debug!(
                    "{} points, {}% to next level",
                    stats.total_points,
                    stats.progress_percentage
                );
                render(doc, &stats);
            }
            None => log::warn!("user stats response without stats"),
        },
        Ok(_) => log::warn!("user stats refused"),
        Err(e) => log::error!("loading user stats: {}", e),
    }
}
