//! Optimistic Mutator
//!
//! Applies a tentative value to a task control before the server answers,
//! then either commits the confirmed value or puts the previous one back.
//! None of these functions do I/O.

use std::fmt::Debug;

use crate::models::TaskRef;

/// A page control bound to one task attribute.
///
/// `show` touches only the control itself (checked / selected value);
/// `decorate` touches the surrounding presentation (styling, badge).
pub trait TaskControl {
    type Value: Clone + PartialEq + Debug;

    /// Whether the decoration follows the tentative value before confirmation
    const DECORATES_OPTIMISTICALLY: bool;

    fn task(&self) -> &TaskRef;

    /// Last server-confirmed value
    fn committed(&self) -> Self::Value;

    fn remember(&self, value: &Self::Value);

    fn show(&self, value: &Self::Value);

    fn decorate(&self, value: &Self::Value);

    /// Loading indicator on/off; a pending control does not accept input
    fn set_pending(&self, pending: bool);
}

/// The value a user just picked, plus what to go back to
#[derive(Debug, Clone, PartialEq)]
pub struct MutationIntent<V> {
    pub tentative: V,
    pub previous: V,
}

impl<V: Clone> MutationIntent<V> {
    /// Intent relative to the control's last confirmed value
    pub fn for_control<C>(control: &C, tentative: V) -> Self
    where
        C: TaskControl<Value = V>,
    {
        Self { tentative, previous: control.committed() }
    }
}

/// What `apply` overwrote, needed by `revert`
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Capture<V> {
    previous: V,
    decorated: bool,
}

pub fn apply<C: TaskControl>(control: &C, intent: &MutationIntent<C::Value>) -> Capture<C::Value> {
    control.show(&intent.tentative);
    if C::DECORATES_OPTIMISTICALLY {
        control.decorate(&intent.tentative);
    }
    Capture {
        previous: intent.previous.clone(),
        decorated: C::DECORATES_OPTIMISTICALLY,
    }
}

/// Render the server-confirmed value, which wins over the tentative one
pub fn commit<C: TaskControl>(control: &C, confirmed: &C::Value) {
    control.show(confirmed);
    control.decorate(confirmed);
    control.remember(confirmed);
}

pub fn revert<C: TaskControl>(control: &C, capture: Capture<C::Value>) {
    control.show(&capture.previous);
    if capture.decorated {
        control.decorate(&capture.previous);
    }
}
