//! Task Sync Controller
//!
//! Runs one optimistic mutation end to end: claim the control, apply the
//! tentative value, call the backend, then commit or revert and tell the user.
//!
//! Per control the lifecycle is `Idle -> Pending -> {Committed, Reverted} -> Idle`.
//! Only an idle control accepts a new mutation; the in-flight registry
//! enforces that, and its guard restores `Idle` on every exit path.

use std::cell::RefCell;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use futures::future::{self, Either, LocalBoxFuture};
use futures::FutureExt;

use crate::commands::TaskApi;
use crate::config::{AppConfig, PriorityFailurePolicy};
use crate::error::SyncError;
use crate::feedback::{self, Feedback};
use crate::models::{Priority, Severity, TaskRef};
use crate::mutator::{self, Capture, MutationIntent, TaskControl};

/// How a mutation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Server confirmed; control shows the confirmed value
    Committed,
    /// Failed; control is back at its previous value
    Reverted,
    /// Failed; selection left as the user set it (priority keep-selection policy)
    Kept,
    /// Control already had a mutation in flight; it is re-shown at its
    /// committed value and no request is sent
    Ignored,
}

/// Source of request deadlines
pub trait Timer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// setTimeout-backed timer
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimer;

impl Timer for BrowserTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        gloo_timers::future::sleep(duration).boxed_local()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncSettings {
    pub request_timeout: Duration,
    pub priority_failure: PriorityFailurePolicy,
}

impl From<&AppConfig> for SyncSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            priority_failure: config.priority_failure,
        }
    }
}

// ========================
// In-flight Registry
// ========================

/// Controls with a request outstanding, one entry per rendered control
#[derive(Default)]
struct InFlight {
    tasks: RefCell<HashSet<TaskRef>>,
}

impl InFlight {
    /// Claim `control`, or `None` if it is already pending
    fn begin<'a, C: TaskControl>(&'a self, control: &'a C) -> Option<PendingGuard<'a, C>> {
        if !self.tasks.borrow_mut().insert(control.task().clone()) {
            return None;
        }
        control.set_pending(true);
        Some(PendingGuard { registry: self, control })
    }

    #[cfg(test)]
    fn contains(&self, task: &TaskRef) -> bool {
        self.tasks.borrow().contains(task)
    }
}

/// Loading indicator + claim, both released on drop
struct PendingGuard<'a, C: TaskControl> {
    registry: &'a InFlight,
    control: &'a C,
}

impl<C: TaskControl> Drop for PendingGuard<'_, C> {
    fn drop(&mut self) {
        self.control.set_pending(false);
        self.registry.tasks.borrow_mut().remove(self.control.task());
    }
}

// ========================
// Controller
// ========================

pub struct TaskSync<A, F, T> {
    api: A,
    feedback: F,
    timer: T,
    settings: SyncSettings,
    in_flight: InFlight,
}

impl<A: TaskApi, F: Feedback, T: Timer> TaskSync<A, F, T> {
    pub fn new(api: A, feedback: F, timer: T, settings: SyncSettings) -> Self {
        Self {
            api,
            feedback,
            timer,
            settings,
            in_flight: InFlight::default(),
        }
    }

    /// Checkbox changed to `checked`
    pub async fn toggle_status<C>(&self, control: &C, checked: bool) -> Resolution
    where
        C: TaskControl<Value = bool>,
    {
        let Some(_pending) = self.in_flight.begin(control) else {
            return self.busy(control);
        };

        let task = control.task();
        let intent = MutationIntent::for_control(control, checked);
        let capture = mutator::apply(control, &intent);

        match self.within_deadline(self.api.toggle_status(&task.task_id)).await {
            Ok(resp) if resp.success => {
                let confirmed = match &resp.status {
                    Some(status) => status.is_completed(),
                    None => {
                        log::debug!("{} confirmed without a status, keeping {}", task, checked);
                        checked
                    }
                };
                mutator::commit(control, &confirmed);
                log::info!("{} committed (completed={})", task, confirmed);

                let message =
                    feedback::message_or(resp.message.as_deref(), feedback::TASK_UPDATED);
                self.feedback.notify(message, Severity::Success);
                if let Some(points) = resp.reward() {
                    self.feedback.award_points(points);
                }
                Resolution::Committed
            }
            Ok(resp) => {
                log::warn!("{} refused: {:?}", task, resp.message);
                self.rollback(control, capture, resp.message.as_deref(), feedback::TOGGLE_FAILED)
            }
            Err(e) => {
                log::error!("{} toggle failed: {}", task, e);
                self.rollback(control, capture, None, feedback::NETWORK_ERROR)
            }
        }
    }

    /// Select changed to `priority`
    pub async fn update_priority<C>(&self, control: &C, priority: Priority) -> Resolution
    where
        C: TaskControl<Value = Priority>,
    {
        let Some(_pending) = self.in_flight.begin(control) else {
            return self.busy(control);
        };

        let task = control.task();
        let intent = MutationIntent::for_control(control, priority);
        let capture = mutator::apply(control, &intent);

        match self.within_deadline(self.api.update_priority(&task.task_id, priority)).await {
            Ok(resp) if resp.success => {
                // The server echoes nothing back; the client's choice is authoritative
                mutator::commit(control, &priority);
                log::info!("{} committed ({})", task, priority.as_str());

                let message =
                    feedback::message_or(resp.message.as_deref(), feedback::PRIORITY_UPDATED);
                self.feedback.notify(message, Severity::Success);
                Resolution::Committed
            }
            Ok(resp) => {
                log::warn!("{} refused: {:?}", task, resp.message);
                let server = resp.message.as_deref();
                self.priority_failed(control, capture, server, feedback::PRIORITY_FAILED)
            }
            Err(e) => {
                log::error!("{} priority update failed: {}", task, e);
                self.priority_failed(control, capture, None, feedback::NETWORK_ERROR)
            }
        }
    }

    fn priority_failed<C>(
        &self,
        control: &C,
        capture: Capture<Priority>,
        server: Option<&str>,
        fallback: &str,
    ) -> Resolution
    where
        C: TaskControl<Value = Priority>,
    {
        match self.settings.priority_failure {
            PriorityFailurePolicy::Revert => self.rollback(control, capture, server, fallback),
            PriorityFailurePolicy::KeepSelection => {
                self.feedback.notify(feedback::message_or(server, fallback), Severity::Error);
                Resolution::Kept
            }
        }
    }

    fn rollback<C: TaskControl>(
        &self,
        control: &C,
        capture: Capture<C::Value>,
        server: Option<&str>,
        fallback: &str,
    ) -> Resolution {
        mutator::revert(control, capture);
        self.feedback.notify(feedback::message_or(server, fallback), Severity::Error);
        Resolution::Reverted
    }

    /// A change reached a control whose mutation is still in flight. The
    /// browser has already updated the control, so put back the committed value.
    fn busy<C: TaskControl>(&self, control: &C) -> Resolution {
        log::debug!("{} busy, ignoring change", control.task());
        control.show(&control.committed());
        self.feedback.notify(feedback::STILL_SAVING, Severity::Info);
        Resolution::Ignored
    }

    /// Race the request against the configured timeout
    async fn within_deadline<R>(
        &self,
        request: impl Future<Output = Result<R, SyncError>>,
    ) -> Result<R, SyncError> {
        let deadline = self.timer.sleep(self.settings.request_timeout);
        futures::pin_mut!(request);
        match future::select(request, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(SyncError::Timeout(self.settings.request_timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use std::rc::Rc;

    use async_trait::async_trait;
    use futures::channel::oneshot;
    use futures::executor::{block_on, LocalPool};
    use futures::task::LocalSpawnExt;

    use super::*;
    use crate::feedback::recording::{Event, RecordingFeedback};
    use crate::models::{PriorityResponse, TaskId, TaskStatus, ToggleStatusResponse};
    use crate::mutator::fake::{checkbox, select, FakeCheckbox};

    type Reply<R> = Result<R, SyncError>;

    enum Scripted<R> {
        Now(Reply<R>),
        Later(oneshot::Receiver<Reply<R>>),
    }

    async fn resolve<R>(next: Option<Scripted<R>>) -> Reply<R> {
        match next {
            Some(Scripted::Now(reply)) => reply,
            Some(Scripted::Later(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(SyncError::Network("reply dropped".to_string()))),
            None => Err(SyncError::Network("no scripted reply".to_string())),
        }
    }

    #[derive(Default)]
    struct ScriptedApi {
        toggles: RefCell<HashMap<String, VecDeque<Scripted<ToggleStatusResponse>>>>,
        priorities: RefCell<VecDeque<Scripted<PriorityResponse>>>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedApi {
        fn script_toggle(&self, id: &str, next: Scripted<ToggleStatusResponse>) {
            self.toggles.borrow_mut().entry(id.to_string()).or_default().push_back(next);
        }

        fn toggle_reply(&self, id: &str, reply: Reply<ToggleStatusResponse>) {
            self.script_toggle(id, Scripted::Now(reply));
        }

        fn toggle_later(&self, id: &str) -> oneshot::Sender<Reply<ToggleStatusResponse>> {
            let (tx, rx) = oneshot::channel();
            self.script_toggle(id, Scripted::Later(rx));
            tx
        }

        fn priority_reply(&self, reply: Reply<PriorityResponse>) {
            self.priorities.borrow_mut().push_back(Scripted::Now(reply));
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    #[async_trait(?Send)]
    impl TaskApi for ScriptedApi {
        async fn toggle_status(&self, task_id: &TaskId) -> Result<ToggleStatusResponse, SyncError> {
            self.calls.borrow_mut().push(format!("toggle {}", task_id));
            let next = self
                .toggles
                .borrow_mut()
                .get_mut(task_id.as_str())
                .and_then(|q| q.pop_front());
            resolve(next).await
        }

        async fn update_priority(
            &self,
            task_id: &TaskId,
            priority: Priority,
        ) -> Result<PriorityResponse, SyncError> {
            self.calls.borrow_mut().push(format!("priority {} {}", task_id, priority.as_str()));
            let next = self.priorities.borrow_mut().pop_front();
            resolve(next).await
        }
    }

    enum TestTimer {
        Never,
        Expired,
    }

    impl Timer for TestTimer {
        fn sleep(&self, _duration: Duration) -> LocalBoxFuture<'static, ()> {
            match self {
                TestTimer::Never => future::pending().boxed_local(),
                TestTimer::Expired => future::ready(()).boxed_local(),
            }
        }
    }

    type TestSync = TaskSync<ScriptedApi, RecordingFeedback, TestTimer>;

    fn settings(priority_failure: PriorityFailurePolicy) -> SyncSettings {
        SyncSettings {
            request_timeout: Duration::from_secs(10),
            priority_failure,
        }
    }

    fn controller() -> TestSync {
        TaskSync::new(
            ScriptedApi::default(),
            RecordingFeedback::default(),
            TestTimer::Never,
            settings(PriorityFailurePolicy::KeepSelection),
        )
    }

    fn toggled(status: &str, points: Option<i64>, message: &str) -> Reply<ToggleStatusResponse> {
        Ok(ToggleStatusResponse {
            success: true,
            message: Some(message.to_string()),
            status: Some(TaskStatus(status.to_string())),
            points_earned: points,
        })
    }

    fn refused(message: Option<&str>) -> Reply<ToggleStatusResponse> {
        Ok(ToggleStatusResponse {
            success: false,
            message: message.map(str::to_string),
            status: None,
            points_earned: None,
        })
    }

    fn network_down<R>() -> Reply<R> {
        Err(SyncError::Network("TypeError: Failed to fetch".to_string()))
    }

    /// Browser flips the box, then `change` hands us the new state
    fn click(control: &FakeCheckbox) -> bool {
        let checked = !control.shown();
        control.user_sets(checked);
        checked
    }

    // ========================
    // Status toggle
    // ========================

    #[test]
    fn test_toggle_success_awards_points() {
        let sync = controller();
        sync.api.toggle_reply("42", toggled("completed", Some(10), "Task completed"));
        let control = checkbox("42", false);

        let checked = click(&control);
        let outcome = block_on(sync.toggle_status(&control, checked));

        assert_eq!(outcome, Resolution::Committed);
        assert!(control.shown());
        assert!(control.decorated());
        assert!(control.committed());
        assert_eq!(
            sync.feedback.events(),
            vec![Event::Toast("Task completed".to_string(), Severity::Success), Event::Points(10)]
        );
        assert_eq!(*control.pending_log.borrow(), vec![true, false]);
    }

    #[test]
    fn test_toggle_network_error_reverts() {
        let sync = controller();
        sync.api.toggle_reply("7", network_down());
        let control = checkbox("7", false);

        let checked = click(&control);
        let outcome = block_on(sync.toggle_status(&control, checked));

        assert_eq!(outcome, Resolution::Reverted);
        assert!(!control.shown());
        assert!(!control.decorated());
        assert_eq!(
            sync.feedback.events(),
            vec![Event::Toast(feedback::NETWORK_ERROR.to_string(), Severity::Error)]
        );
        assert!(sync.feedback.points().is_empty());
        assert!(!control.is_pending());
    }

    #[test]
    fn test_toggle_refusal_uses_server_message() {
        let sync = controller();
        sync.api.toggle_reply("9", refused(Some("Task not found")));
        sync.api.toggle_reply("9", refused(None));
        let control = checkbox("9", true);

        let checked = click(&control);
        assert_eq!(block_on(sync.toggle_status(&control, checked)), Resolution::Reverted);
        assert!(control.shown());

        let checked = click(&control);
        assert_eq!(block_on(sync.toggle_status(&control, checked)), Resolution::Reverted);
        assert!(control.shown());

        assert_eq!(
            sync.feedback.events(),
            vec![
                Event::Toast("Task not found".to_string(), Severity::Error),
                Event::Toast(feedback::TOGGLE_FAILED.to_string(), Severity::Error),
            ]
        );
    }

    #[test]
    fn test_toggle_server_status_wins() {
        let sync = controller();
        sync.api.toggle_reply("5", toggled("pending", Some(0), "Task marked as pending"));
        let control = checkbox("5", false);

        // User checked it, server reports the task as pending
        let checked = click(&control);
        assert_eq!(block_on(sync.toggle_status(&control, checked)), Resolution::Committed);
        assert!(!control.shown());
        assert!(!control.decorated());
        assert!(sync.feedback.points().is_empty());
    }

    #[test]
    fn test_uncheck_gives_no_burst() {
        let sync = controller();
        sync.api.toggle_reply("11", toggled("pending", None, "Task marked as pending"));
        let control = checkbox("11", true);

        let checked = click(&control);
        block_on(sync.toggle_status(&control, checked));
        assert!(!control.committed());
        assert!(sync.feedback.points().is_empty());
    }

    #[test]
    fn test_timeout_reverts_with_network_error() {
        let sync = TaskSync::new(
            ScriptedApi::default(),
            RecordingFeedback::default(),
            TestTimer::Expired,
            settings(PriorityFailurePolicy::KeepSelection),
        );
        let _never_sent = sync.api.toggle_later("13");
        let control = checkbox("13", false);

        let checked = click(&control);
        assert_eq!(block_on(sync.toggle_status(&control, checked)), Resolution::Reverted);
        assert!(!control.shown());
        assert_eq!(
            sync.feedback.events(),
            vec![Event::Toast(feedback::NETWORK_ERROR.to_string(), Severity::Error)]
        );
        assert!(!sync.in_flight.contains(control.task()));
    }

    #[test]
    fn test_pending_while_in_flight_and_second_click_ignored() {
        let mut pool = LocalPool::new();
        let sync = Rc::new(controller());
        let control = Rc::new(checkbox("21", false));
        let reply = sync.api.toggle_later("21");
        let result = Rc::new(RefCell::new(None));

        let checked = click(&control);
        {
            let (sync, control, result) = (sync.clone(), control.clone(), result.clone());
            pool.spawner()
                .spawn_local(async move {
                    let outcome = sync.toggle_status(&*control, checked).await;
                    *result.borrow_mut() = Some(outcome);
                })
                .unwrap();
        }
        pool.run_until_stalled();

        assert!(control.is_pending());
        assert!(sync.in_flight.contains(control.task()));
        assert!(control.shown());

        // A second interaction while pending is refused without an API call,
        // and the box goes back to its committed state
        let again = click(&control);
        assert_eq!(block_on(sync.toggle_status(&*control, again)), Resolution::Ignored);
        assert_eq!(sync.api.calls(), vec!["toggle 21".to_string()]);
        assert!(control.is_pending());
        assert_eq!(control.shown(), control.committed());
        assert_eq!(
            sync.feedback.events(),
            vec![Event::Toast(feedback::STILL_SAVING.to_string(), Severity::Info)]
        );

        reply.send(toggled("completed", Some(25), "Task completed!")).unwrap();
        pool.run_until_stalled();

        assert_eq!(*result.borrow(), Some(Resolution::Committed));
        assert!(!control.is_pending());
        assert!(!sync.in_flight.contains(control.task()));
        assert!(control.shown());
        assert_eq!(sync.feedback.points(), vec![25]);
    }

    #[test]
    fn test_idle_again_after_resolution() {
        let sync = controller();
        sync.api.toggle_reply("8", network_down());
        sync.api.toggle_reply("8", toggled("completed", Some(5), "Task completed"));
        let control = checkbox("8", false);

        let checked = click(&control);
        assert_eq!(block_on(sync.toggle_status(&control, checked)), Resolution::Reverted);
        let checked = click(&control);
        assert_eq!(block_on(sync.toggle_status(&control, checked)), Resolution::Committed);
        assert!(control.shown());
    }

    #[test]
    fn test_two_tasks_resolve_independently() {
        let mut pool = LocalPool::new();
        let sync = Rc::new(controller());
        let first = Rc::new(checkbox("1", false));
        let second = Rc::new(checkbox("2", true));
        let first_reply = sync.api.toggle_later("1");
        let second_reply = sync.api.toggle_later("2");

        for control in [first.clone(), second.clone()] {
            let checked = click(&control);
            let sync = sync.clone();
            pool.spawner()
                .spawn_local(async move {
                    sync.toggle_status(&*control, checked).await;
                })
                .unwrap();
        }
        pool.run_until_stalled();
        assert!(first.is_pending() && second.is_pending());

        // Answers arrive in reverse order
        second_reply.send(network_down()).unwrap();
        pool.run_until_stalled();
        assert!(second.shown());
        assert!(!second.is_pending());
        assert!(first.is_pending());

        first_reply.send(toggled("completed", Some(10), "Task completed")).unwrap();
        pool.run_until_stalled();
        assert!(first.shown());
        assert!(first.committed());
        assert!(!first.is_pending());
        assert!(second.committed());
    }

    fn spawn_click(pool: &LocalPool, sync: &Rc<TestSync>, control: &Rc<FakeCheckbox>) {
        let checked = click(control);
        let (sync, control) = (sync.clone(), control.clone());
        pool.spawner()
            .spawn_local(async move {
                sync.toggle_status(&*control, checked).await;
            })
            .unwrap();
    }

    #[test]
    fn test_two_checkboxes_for_one_task_settle_separately() {
        let mut pool = LocalPool::new();
        let sync = Rc::new(controller());
        let list = Rc::new(checkbox("5", false));
        let dashboard = Rc::new(checkbox("5", false));
        let list_reply = sync.api.toggle_later("5");
        let dashboard_reply = sync.api.toggle_later("5");

        spawn_click(&pool, &sync, &list);
        pool.run_until_stalled();
        assert!(list.is_pending());
        assert!(!dashboard.is_pending());

        // The other rendering of task 5 is its own control, not a busy one
        spawn_click(&pool, &sync, &dashboard);
        pool.run_until_stalled();
        assert!(dashboard.is_pending());
        assert_eq!(sync.api.calls(), vec!["toggle 5".to_string(), "toggle 5".to_string()]);

        list_reply.send(network_down()).unwrap();
        pool.run_until_stalled();
        assert!(!list.shown());

        dashboard_reply.send(toggled("completed", Some(10), "Task completed")).unwrap();
        pool.run_until_stalled();
        assert!(dashboard.shown());

        for control in [&list, &dashboard] {
            assert_eq!(control.shown(), control.committed());
            assert_eq!(control.decorated(), control.committed());
            assert!(!control.is_pending());
            assert!(!sync.in_flight.contains(control.task()));
        }
    }

    // ========================
    // Priority update
    // ========================

    #[test]
    fn test_priority_success_updates_badge() {
        let sync = controller();
        sync.api.priority_reply(Ok(PriorityResponse {
            success: true,
            message: Some("Priority updated".to_string()),
        }));
        let control = select("3", Priority::Medium);
        control.user_sets(Priority::High);

        assert_eq!(block_on(sync.update_priority(&control, Priority::High)), Resolution::Committed);
        assert_eq!(control.shown(), Priority::High);
        assert_eq!(control.decorated(), Priority::High);
        assert_eq!(control.committed(), Priority::High);
        assert_eq!(sync.api.calls(), vec!["priority 3 high".to_string()]);
        assert_eq!(
            sync.feedback.events(),
            vec![Event::Toast("Priority updated".to_string(), Severity::Success)]
        );
    }

    #[test]
    fn test_priority_refusal_keeps_selection_and_badge() {
        let sync = controller();
        sync.api.priority_reply(Ok(PriorityResponse { success: false, message: None }));
        let control = select("3", Priority::Medium);
        control.user_sets(Priority::Urgent);

        assert_eq!(block_on(sync.update_priority(&control, Priority::Urgent)), Resolution::Kept);
        assert_eq!(control.shown(), Priority::Urgent);
        assert_eq!(control.decorated(), Priority::Medium);
        assert_eq!(control.committed(), Priority::Medium);
        assert_eq!(
            sync.feedback.events(),
            vec![Event::Toast(feedback::PRIORITY_FAILED.to_string(), Severity::Error)]
        );
        assert!(!control.is_pending());
    }

    #[test]
    fn test_priority_revert_policy() {
        let sync = TaskSync::new(
            ScriptedApi::default(),
            RecordingFeedback::default(),
            TestTimer::Never,
            settings(PriorityFailurePolicy::Revert),
        );
        sync.api.priority_reply(network_down());
        let control = select("4", Priority::Low);
        control.user_sets(Priority::High);

        assert_eq!(block_on(sync.update_priority(&control, Priority::High)), Resolution::Reverted);
        assert_eq!(control.shown(), Priority::Low);
        assert_eq!(control.decorated(), Priority::Low);
        assert_eq!(
            sync.feedback.events(),
            vec![Event::Toast(feedback::NETWORK_ERROR.to_string(), Severity::Error)]
        );
    }

    #[test]
    fn test_priority_and_status_of_same_task_are_separate_controls() {
        let mut pool = LocalPool::new();
        let sync = Rc::new(controller());
        let status = Rc::new(checkbox("6", false));
        let reply = sync.api.toggle_later("6");

        let checked = click(&status);
        {
            let (sync, status) = (sync.clone(), status.clone());
            pool.spawner()
                .spawn_local(async move {
                    sync.toggle_status(&*status, checked).await;
                })
                .unwrap();
        }
        pool.run_until_stalled();

        sync.api.priority_reply(Ok(PriorityResponse { success: true, message: None }));
        let priority = select("6", Priority::Low);
        let outcome = block_on(sync.update_priority(&priority, Priority::High));
        assert_eq!(outcome, Resolution::Committed);
        assert!(status.is_pending());

        drop(reply);
        pool.run_until_stalled();
        assert!(!status.shown());
        assert!(!status.is_pending());
    }
}
