//! Page Controls
//!
//! `TaskControl` implementations over the server-rendered task list.
//! Decoration hooks (`.task-item`, `.task-title`, `.priority-badge`) are
//! optional; when one is missing that part of the update is skipped.

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlInputElement, HtmlSelectElement};

use crate::models::{Priority, TaskId, TaskRef};
use crate::mutator::TaskControl;

/// Attribute holding the last server-confirmed value
const COMMITTED_ATTR: &str = "data-committed";
const TASK_ID_ATTR: &str = "data-task-id";
const SPINNER_CLASS: &str = "loading-spinner";

fn task_id_of(el: &Element) -> Option<TaskId> {
    el.get_attribute(TASK_ID_ATTR)
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(TaskId::new)
}

/// Spinner next to the control, inside its parent
fn set_spinner(control: &Element, on: bool) {
    let Some(parent) = control.parent_element() else {
        return;
    };
    let existing = parent.query_selector(&format!(".{}", SPINNER_CLASS)).ok().flatten();
    match (on, existing) {
        (true, None) => {
            let Some(doc) = control.owner_document() else {
                return;
            };
            if let Ok(spinner) = doc.create_element("div") {
                spinner.set_class_name(SPINNER_CLASS);
                let _ = spinner.set_attribute("style", "margin-left: 10px;");
                let _ = parent.append_child(&spinner);
            }
        }
        (false, Some(spinner)) => spinner.remove(),
        _ => {}
    }
}

// ========================
// Status Checkbox
// ========================

/// `.task-checkbox[data-task-id]`
#[derive(Clone)]
pub struct StatusCheckbox {
    task: TaskRef,
    input: HtmlInputElement,
}

impl StatusCheckbox {
    /// Bind to a checkbox, seeding its committed state from what is rendered
    pub fn bind(el: Element) -> Option<Self> {
        let task_id = task_id_of(&el)?;
        let input = el.dyn_into::<HtmlInputElement>().ok()?;
        if input.get_attribute(COMMITTED_ATTR).is_none() {
            let _ = input.set_attribute(COMMITTED_ATTR, &input.checked().to_string());
        }
        Some(Self { task: TaskRef::status(task_id), input })
    }

    pub fn input(&self) -> &HtmlInputElement {
        &self.input
    }

    pub fn is_checked(&self) -> bool {
        self.input.checked()
    }
}

impl TaskControl for StatusCheckbox {
    type Value = bool;
    const DECORATES_OPTIMISTICALLY: bool = true;

    fn task(&self) -> &TaskRef {
        &self.task
    }

    fn committed(&self) -> bool {
        match self.input.get_attribute(COMMITTED_ATTR).as_deref() {
            Some("true") => true,
            Some("false") => false,
            // Browser already flipped the box before `change` fired
            _ => !self.input.checked(),
        }
    }

    fn remember(&self, value: &bool) {
        let _ = self.input.set_attribute(COMMITTED_ATTR, &value.to_string());
    }

    fn show(&self, value: &bool) {
        self.input.set_checked(*value);
    }

    fn decorate(&self, completed: &bool) {
        let Some(item) = self.input.closest(".task-item").ok().flatten() else {
            return;
        };
        let classes = item.class_list();
        let _ = if *completed { classes.add_1("completed") } else { classes.remove_1("completed") };

        let title = item
            .query_selector(".task-title")
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        if let Some(title) = title {
            let style = title.style();
            let (decoration, opacity) =
                if *completed { ("line-through", "0.7") } else { ("none", "1") };
            let _ = style.set_property("text-decoration", decoration);
            let _ = style.set_property("opacity", opacity);
        }
    }

    fn set_pending(&self, pending: bool) {
        self.input.set_disabled(pending);
        set_spinner(&self.input, pending);
    }
}

// ========================
// Priority Select
// ========================

/// `.priority-select[data-task-id]` with a sibling `.priority-badge`
#[derive(Clone)]
pub struct PrioritySelect {
    task: TaskRef,
    select: HtmlSelectElement,
}

impl PrioritySelect {
    pub fn bind(el: Element) -> Option<Self> {
        let task_id = task_id_of(&el)?;
        let select = el.dyn_into::<HtmlSelectElement>().ok()?;
        if select.get_attribute(COMMITTED_ATTR).is_none() {
            let _ = select.set_attribute(COMMITTED_ATTR, &select.value());
        }
        Some(Self { task: TaskRef::priority(task_id), select })
    }

    pub fn select(&self) -> &HtmlSelectElement {
        &self.select
    }

    /// Currently selected priority, if the option value is one we know
    pub fn selected(&self) -> Option<Priority> {
        Priority::from_str(&self.select.value())
    }

    fn badge(&self) -> Option<Element> {
        self.select.parent_element()?.query_selector(".priority-badge").ok().flatten()
    }
}

impl TaskControl for PrioritySelect {
    type Value = Priority;
    const DECORATES_OPTIMISTICALLY: bool = false;

    fn task(&self) -> &TaskRef {
        &self.task
    }

    fn committed(&self) -> Priority {
        self.select
            .get_attribute(COMMITTED_ATTR)
            .and_then(|raw| Priority::from_str(&raw))
            .or_else(|| self.selected())
            .unwrap_or(Priority::Medium)
    }

    fn remember(&self, value: &Priority) {
        let _ = self.select.set_attribute(COMMITTED_ATTR, value.as_str());
    }

    fn show(&self, value: &Priority) {
        self.select.set_value(value.as_str());
    }

    fn decorate(&self, value: &Priority) {
        if let Some(badge) = self.badge() {
            badge.set_class_name(&value.badge_class());
            badge.set_text_content(Some(value.label()));
        }
    }

    fn set_pending(&self, pending: bool) {
        self.select.set_disabled(pending);
        set_spinner(&self.select, pending);
    }
}
