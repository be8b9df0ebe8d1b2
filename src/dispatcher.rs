//! Interaction Dispatcher
//!
//! Binds `change` on every task control to the sync controller, and the
//! global `keydown` to the page shortcuts.

use std::rc::Rc;

use leptos::task::spawn_local;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, KeyboardEvent};

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::controls::{PrioritySelect, StatusCheckbox};
use crate::mutator::TaskControl;
use crate::widgets;

pub const STATUS_SELECTOR: &str = ".task-checkbox";
pub const PRIORITY_SELECTOR: &str = ".priority-select";

/// Elements matching `selector`, in document order
pub fn select_all(doc: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = doc.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

// ========================
// Task Controls
// ========================

/// Attach one change handler per task control. Returns how many were bound.
pub fn bind_task_controls(doc: &Document, ctx: &AppContext) -> usize {
    let mut bound = 0;

    for el in select_all(doc, STATUS_SELECTOR) {
        let Some(control) = StatusCheckbox::bind(el) else {
            log::warn!("skipping {} without data-task-id", STATUS_SELECTOR);
            continue;
        };
        let sync = Rc::clone(&ctx.sync);
        let handler = control.clone();
        let on_change = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
            let checked = handler.is_checked();
            let sync = Rc::clone(&sync);
            let control = handler.clone();
            spawn_local(async move {
                sync.toggle_status(&control, checked).await;
            });
        });
        let _ = control
            .input()
            .add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref());
        on_change.forget();
        bound += 1;
    }

    for el in select_all(doc, PRIORITY_SELECTOR) {
        let Some(control) = PrioritySelect::bind(el) else {
            log::warn!("skipping {} without data-task-id", PRIORITY_SELECTOR);
            continue;
        };
        let sync = Rc::clone(&ctx.sync);
        let handler = control.clone();
        let on_change = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
            let Some(priority) = handler.selected() else {
                log::warn!("{} has unknown value {:?}", handler.task(), handler.select().value());
                return;
            };
            let sync = Rc::clone(&sync);
            let control = handler.clone();
            spawn_local(async move {
                sync.update_priority(&control, priority).await;
            });
        });
        let _ = control
            .select()
            .add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref());
        on_change.forget();
        bound += 1;
    }

    log::info!("bound {} task controls", bound);
    bound
}

// ========================
// Keyboard Shortcuts
// ========================

/// Modifier that acts as "command" on this platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandModifier {
    Meta,
    Ctrl,
}

impl CommandModifier {
    pub fn for_platform(platform: &str) -> Self {
        let apple = ["Mac", "iPhone", "iPad", "iPod"].iter().any(|p| platform.contains(p));
        if apple {
            CommandModifier::Meta
        } else {
            CommandModifier::Ctrl
        }
    }

    fn detect() -> Self {
        let platform = web_sys::window()
            .and_then(|w| w.navigator().platform().ok())
            .unwrap_or_default();
        Self::for_platform(&platform)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Cmd/Ctrl+K
    QuickAddTask,
    /// Cmd/Ctrl+P
    Pomodoro,
}

impl Shortcut {
    pub fn matching(key: &str, ctrl: bool, meta: bool, modifier: CommandModifier) -> Option<Self> {
        let held = match modifier {
            CommandModifier::Meta => meta,
            CommandModifier::Ctrl => ctrl,
        };
        if !held {
            return None;
        }
        // Shift yields "K"/"P"; those combos stay with the browser
        match key {
            "k" => Some(Shortcut::QuickAddTask),
            "p" => Some(Shortcut::Pomodoro),
            _ => None,
        }
    }
}

fn run_shortcut(shortcut: Shortcut, config: &AppConfig) {
    log::debug!("shortcut {:?}", shortcut);
    match shortcut {
        Shortcut::QuickAddTask => widgets::open_modal(&config.quick_task_modal_id),
        Shortcut::Pomodoro => {
            if let Some(win) = web_sys::window() {
                let _ = win.location().set_href(&config.pomodoro_url);
            }
        }
    }
}

/// Single document-level keydown handler
pub fn bind_shortcuts(doc: &Document, ctx: &AppContext) {
    let modifier = CommandModifier::detect();
    let config = Rc::clone(&ctx.config);
    let on_keydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |ev: KeyboardEvent| {
        let shortcut = Shortcut::matching(&ev.key(), ev.ctrl_key(), ev.meta_key(), modifier);
        let Some(shortcut) = shortcut else {
            return;
        };
        ev.prevent_default();
        run_shortcut(shortcut, &config);
    });
    let _ = doc.add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref());
    on_keydown.forget();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_modifier() {
        assert_eq!(CommandModifier::for_platform("MacIntel"), CommandModifier::Meta);
        assert_eq!(CommandModifier::for_platform("iPhone"), CommandModifier::Meta);
        assert_eq!(CommandModifier::for_platform("Win32"), CommandModifier::Ctrl);
        assert_eq!(CommandModifier::for_platform("Linux x86_64"), CommandModifier::Ctrl);
        assert_eq!(CommandModifier::for_platform(""), CommandModifier::Ctrl);
    }

    #[test]
    fn test_shortcuts_need_command_modifier() {
        let ctrl = CommandModifier::Ctrl;
        assert_eq!(Shortcut::matching("k", true, false, ctrl), Some(Shortcut::QuickAddTask));
        assert_eq!(Shortcut::matching("p", true, false, ctrl), Some(Shortcut::Pomodoro));
        assert_eq!(Shortcut::matching("k", false, false, ctrl), None);
        // Meta is not "command" off Apple platforms
        assert_eq!(Shortcut::matching("k", false, true, ctrl), None);
        let meta = CommandModifier::Meta;
        assert_eq!(Shortcut::matching("k", false, true, meta), Some(Shortcut::QuickAddTask));
    }

    #[test]
    fn test_other_keys_pass_through() {
        assert_eq!(Shortcut::matching("s", true, true, CommandModifier::Ctrl), None);
        assert_eq!(Shortcut::matching("Enter", true, false, CommandModifier::Ctrl), None);
    }

    #[test]
    fn test_shifted_keys_stay_with_browser() {
        // Ctrl+Shift+K / Ctrl+Shift+P report uppercase keys
        assert_eq!(Shortcut::matching("K", true, false, CommandModifier::Ctrl), None);
        assert_eq!(Shortcut::matching("P", true, false, CommandModifier::Ctrl), None);
        assert_eq!(Shortcut::matching("P", false, true, CommandModifier::Meta), None);
    }
}
