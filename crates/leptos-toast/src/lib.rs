//! Leptos Toast Utilities
//!
//! Stacked, self-dismissing toasts plus one-shot floating "burst" badges.
//! Every notice owns its own row in a queue and removes itself after its
//! time-to-live, so concurrent notices stack instead of replacing each other.

use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Visual tone of a notice (maps to a Bootstrap `bg-*` class)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Success,
    Danger,
    Info,
    Warning,
}

impl Tone {
    pub fn css(&self) -> &'static str {
        match self {
            Tone::Success => "success",
            Tone::Danger => "danger",
            Tone::Info => "info",
            Tone::Warning => "warning",
        }
    }
}

/// A single visible notice
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub text: String,
    pub tone: Tone,
}

impl Notice {
    /// Class list for a toast row
    pub fn toast_class(&self) -> String {
        format!("toast show align-items-center text-white bg-{} border-0", self.tone.css())
    }
}

/// Ordered notices, oldest first
#[derive(Clone, Debug, Default)]
pub struct NoticeQueue {
    items: Vec<Notice>,
    next_id: u64,
}

impl NoticeQueue {
    /// Append a notice, returning its id
    pub fn push(&mut self, text: impl Into<String>, tone: Tone) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Notice { id, text: text.into(), tone });
        id
    }

    /// Remove a notice. Unknown ids are ignored (already dismissed).
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    pub fn items(&self) -> &[Notice] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Toast state signals
#[derive(Clone, Copy)]
pub struct ToastSignals {
    pub toasts_read: ReadSignal<NoticeQueue>,
    pub toasts_write: WriteSignal<NoticeQueue>,
    pub bursts_read: ReadSignal<NoticeQueue>,
    pub bursts_write: WriteSignal<NoticeQueue>,
    /// Toast time-to-live in milliseconds
    pub toast_ttl_ms: i32,
    /// Burst time-to-live in milliseconds
    pub burst_ttl_ms: i32,
}

pub fn create_toast_signals(toast_ttl_ms: i32, burst_ttl_ms: i32) -> ToastSignals {
    let (toasts_read, toasts_write) = signal(NoticeQueue::default());
    let (bursts_read, bursts_write) = signal(NoticeQueue::default());
    ToastSignals {
        toasts_read,
        toasts_write,
        bursts_read,
        bursts_write,
        toast_ttl_ms,
        burst_ttl_ms,
    }
}

/// Run `f` once after `ms` milliseconds
fn schedule(ms: i32, f: impl FnOnce() + 'static) {
    if let Some(win) = web_sys::window() {
        let cb = wasm_bindgen::closure::Closure::<dyn FnMut()>::once(f);
        let _ = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), ms);
        cb.forget();
    }
}

/// Show a toast; it dismisses itself after `toast_ttl_ms`
pub fn push_toast(toasts: &ToastSignals, text: impl Into<String>, tone: Tone) -> u64 {
    let mut id = 0;
    toasts.toasts_write.update(|q| id = q.push(text, tone));
    let signals = *toasts;
    schedule(signals.toast_ttl_ms, move || dismiss_toast(&signals, id));
    id
}

/// Dismiss a toast early (close button)
pub fn dismiss_toast(toasts: &ToastSignals, id: u64) {
    toasts.toasts_write.update(|q| {
        q.dismiss(id);
    });
}

/// Show a floating burst; it removes itself after `burst_ttl_ms`
pub fn push_burst(toasts: &ToastSignals, text: impl Into<String>) -> u64 {
    let mut id = 0;
    toasts.bursts_write.update(|q| id = q.push(text, Tone::Warning));
    let bursts_write = toasts.bursts_write;
    schedule(toasts.burst_ttl_ms, move || {
        bursts_write.update(|q| {
            q.dismiss(id);
        });
    });
    id
}

const BURST_KEYFRAMES: &str = "@keyframes pointsBounce {
    0% { transform: translate(-50%, -50%) scale(0); opacity: 0; }
    50% { transform: translate(-50%, -50%) scale(1.2); opacity: 1; }
    100% { transform: translate(-50%, -50%) scale(1) translateY(-100px); opacity: 0; }
}";

/// Burst style; the animation length tracks the burst time-to-live
fn burst_style(ttl_ms: i32) -> String {
    format!(
        "position: fixed; top: 50%; left: 50%; transform: translate(-50%, -50%); \
         background: linear-gradient(135deg, #ffc107, #fd7e14); color: white; \
         padding: 1rem 2rem; border-radius: 50px; font-weight: bold; font-size: 1.2rem; \
         z-index: 9999; animation: pointsBounce {}ms ease-out forwards;",
        ttl_ms
    )
}

/// Renders the toast stack and any active bursts
#[component]
pub fn ToastLayer(toasts: ToastSignals) -> impl IntoView {
    let burst_ttl_ms = toasts.burst_ttl_ms;

    view! {
        <style>{BURST_KEYFRAMES}</style>
        <div class="toast-container position-fixed top-0 end-0 p-3" style="z-index: 1055;">
            <For
                each=move || toasts.toasts_read.get().items().to_vec()
                key=|notice| notice.id
                children=move |notice| {
                    let id = notice.id;
                    let class = notice.toast_class();
                    let text = notice.text;
                    view! {
                        <div class=class role="alert">
                            <div class="d-flex">
                                <div class="toast-body">{text}</div>
                                <button
                                    type="button"
                                    class="btn-close btn-close-white me-2 m-auto"
                                    on:click=move |_| dismiss_toast(&toasts, id)
                                ></button>
                            </div>
                        </div>
                    }
                }
            />
        </div>
        <For
            each=move || toasts.bursts_read.get().items().to_vec()
            key=|notice| notice.id
            children=move |notice| {
                view! {
                    <div class="points-animation" style=burst_style(burst_ttl_ms)>{notice.text}</div>
                }
            }
        />
    }
}
