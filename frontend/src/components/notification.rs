use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use stylist::css;
use yew::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Success,
    Error,
}

impl Severity {
    pub fn class(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }

    pub fn background(self) -> &'static str {
        match self {
            Severity::Success => "#4CAF50",
            Severity::Error => "#FF6B6B",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub exiting: bool,
}

/// Toasts currently on screen, oldest first. Holds at most `capacity`;
/// pushing past it evicts the oldest.
#[derive(Debug, Clone)]
pub struct ToastStack {
    toasts: VecDeque<Toast>,
    capacity: usize,
    next_id: u64,
}

impl ToastStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            toasts: VecDeque::new(),
            capacity: capacity.max(1),
            next_id: 0,
        }
    }

    /// Returns the new toast's id and the id of any toast evicted to make
    /// room for it.
    pub fn push(&mut self, message: impl Into<String>, severity: Severity) -> (u64, Option<u64>) {
        let evicted = if self.toasts.len() >= self.capacity {
            self.toasts.pop_front().map(|t| t.id)
        } else {
            None
        };
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push_back(Toast {
            id,
            message: message.into(),
            severity,
            exiting: false,
        });
        (id, evicted)
    }

    /// Starts the exit animation. Returns false if the toast is gone.
    pub fn begin_exit(&mut self, id: u64) -> bool {
        match self.toasts.iter_mut().find(|t| t.id == id) {
            Some(toast) => {
                toast.exiting = true;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

/// Next step of a toast's life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStep {
    BeginExit,
    Remove,
}

/// A timer the host should start: after `delay_ms`, run `next` on toast `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub id: u64,
    pub delay_ms: u32,
    pub next: ToastStep,
}

/// Outcome of one lifecycle event. `cancel` names a toast whose pending
/// timer must be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transition {
    pub schedule: Option<Schedule>,
    pub cancel: Option<u64>,
    pub changed: bool,
}

/// Toast stack plus its timing: push, visible, exiting, removed.
#[derive(Debug, Clone)]
pub struct ToastLifecycle {
    stack: ToastStack,
    visible_ms: u32,
    exit_ms: u32,
}

impl ToastLifecycle {
    pub fn new(capacity: usize, visible_ms: u32, exit_ms: u32) -> Self {
        Self {
            stack: ToastStack::new(capacity),
            visible_ms,
            exit_ms,
        }
    }

    pub fn stack(&self) -> &ToastStack {
        &self.stack
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity) -> Transition {
        let (id, evicted) = self.stack.push(message, severity);
        Transition {
            schedule: Some(Schedule {
                id,
                delay_ms: self.visible_ms,
                next: ToastStep::BeginExit,
            }),
            cancel: evicted,
            changed: true,
        }
    }

    pub fn advance(&mut self, id: u64, step: ToastStep) -> Transition {
        match step {
            ToastStep::BeginExit => {
                if !self.stack.begin_exit(id) {
                    return Transition::default();
                }
                Transition {
                    schedule: Some(Schedule {
                        id,
                        delay_ms: self.exit_ms,
                        next: ToastStep::Remove,
                    }),
                    cancel: None,
                    changed: true,
                }
            }
            ToastStep::Remove => Transition {
                schedule: None,
                cancel: Some(id),
                changed: self.stack.remove(id),
            },
        }
    }
}

/// Where page code drops toasts. Filled in by [`ToastHost`] once it is
/// created; notifications sent before that are only logged.
#[derive(Clone, Default)]
pub struct ToastSink(Rc<RefCell<Option<Callback<(String, Severity)>>>>);

impl PartialEq for ToastSink {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl ToastSink {
    pub fn notify(&self, message: &str, severity: Severity) {
        match self.0.borrow().as_ref() {
            Some(callback) => callback.emit((message.to_string(), severity)),
            None => log::warn!("toast host not mounted, dropping: {}", message),
        }
    }

    fn connect(&self, callback: Callback<(String, Severity)>) {
        *self.0.borrow_mut() = Some(callback);
    }

    fn disconnect(&self) {
        self.0.borrow_mut().take();
    }
}

#[derive(Properties, PartialEq)]
pub struct ToastHostProps {
    pub sink: ToastSink,
    #[prop_or(5)]
    pub capacity: usize,
    #[prop_or(3_000)]
    pub visible_ms: u32,
    #[prop_or(300)]
    pub exit_ms: u32,
}

pub enum ToastMsg {
    Push(String, Severity),
    Step(u64, ToastStep),
}

/// Renders the toast stack and owns every dismissal timer. Dropping the
/// component cancels them.
pub struct ToastHost {
    lifecycle: ToastLifecycle,
    timers: HashMap<u64, Timeout>,
}

impl Component for ToastHost {
    type Message = ToastMsg;
    type Properties = ToastHostProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        props
            .sink
            .connect(ctx.link().callback(|(message, severity): (String, Severity)| {
                ToastMsg::Push(message, severity)
            }));
        Self {
            lifecycle: ToastLifecycle::new(props.capacity, props.visible_ms, props.exit_ms),
            timers: HashMap::new(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let transition = match msg {
            ToastMsg::Push(message, severity) => self.lifecycle.push(message, severity),
            ToastMsg::Step(id, step) => self.lifecycle.advance(id, step),
        };
        if let Some(id) = transition.cancel {
            self.timers.remove(&id);
        }
        if let Some(Schedule { id, delay_ms, next }) = transition.schedule {
            let link = ctx.link().clone();
            self.timers.insert(
                id,
                Timeout::new(delay_ms, move || link.send_message(ToastMsg::Step(id, next))),
            );
        }
        transition.changed
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        let container = css!(
            r#"
            position: fixed;
            top: 100px;
            right: 20px;
            z-index: 10000;
            display: flex;
            flex-direction: column;
            gap: 10px;
            "#
        );
        let toast = css!(
            r#"
            padding: 15px 25px;
            color: white;
            border-radius: 10px;
            box-shadow: 0 5px 15px rgba(0,0,0,0.2);
            max-width: 350px;
            animation: slideIn 0.3s ease-out;

            &.exiting {
                animation: slideOut 0.3s ease-out forwards;
            }
            "#
        );

        html! {
            <div class={container}>
                <style>
                    {r#"
                        @keyframes slideIn {
                            from { transform: translateX(100%); opacity: 0; }
                            to { transform: translateX(0); opacity: 1; }
                        }
                        @keyframes slideOut {
                            from { transform: translateX(0); opacity: 1; }
                            to { transform: translateX(100%); opacity: 0; }
                        }
                    "#}
                </style>
                { for self.lifecycle.stack().iter().map(|t| html! {
                    <div
                        key={t.id}
                        class={classes!(toast.clone(), "notification", t.severity.class(), t.exiting.then(|| "exiting"))}
                        style={format!("background: {};", t.severity.background())}
                        role="status"
                    >
                        { t.message.clone() }
                    </div>
                }) }
            </div>
        }
    }

    fn destroy(&mut self, ctx: &Context<Self>) {
        ctx.props().sink.disconnect();
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_severity_is_success() {
        assert_eq!(Severity::default(), Severity::Success);
        assert_eq!(Severity::Error.background(), "#FF6B6B");
    }

    #[test]
    fn toasts_stack_in_order() {
        let mut stack = ToastStack::new(5);
        stack.push("one", Severity::Success);
        stack.push("two", Severity::Error);
        stack.push("one", Severity::Success);
        let messages: Vec<&str> = stack.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["one", "two", "one"]);
    }

    #[test]
    fn sixth_toast_evicts_oldest() {
        let mut stack = ToastStack::new(5);
        for i in 0..5 {
            let (_, evicted) = stack.push(format!("t{}", i), Severity::Success);
            assert_eq!(evicted, None);
        }
        let (id, evicted) = stack.push("t5", Severity::Success);
        assert_eq!(evicted, Some(0));
        assert_eq!(id, 5);
        assert_eq!(stack.len(), 5);
        assert_eq!(stack.iter().next().map(|t| t.id), Some(1));
    }

    #[test]
    fn exit_then_remove() {
        let mut stack = ToastStack::new(5);
        let (id, _) = stack.push("copied", Severity::Success);
        assert!(stack.begin_exit(id));
        assert!(stack.iter().all(|t| t.exiting));
        assert!(stack.remove(id));
        assert!(stack.is_empty());
        assert!(!stack.begin_exit(id));
        assert!(!stack.remove(id));
    }

    #[test]
    fn zero_capacity_still_shows_one() {
        let mut stack = ToastStack::new(0);
        stack.push("a", Severity::Success);
        let (_, evicted) = stack.push("b", Severity::Success);
        assert_eq!(evicted, Some(0));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn push_schedules_exit_then_removal() {
        let mut toasts = ToastLifecycle::new(5, 3_000, 300);
        let pushed = toasts.push("copied", Severity::Success);
        assert_eq!(
            pushed.schedule,
            Some(Schedule { id: 0, delay_ms: 3_000, next: ToastStep::BeginExit })
        );
        assert_eq!(pushed.cancel, None);

        let exiting = toasts.advance(0, ToastStep::BeginExit);
        assert!(exiting.changed);
        assert_eq!(
            exiting.schedule,
            Some(Schedule { id: 0, delay_ms: 300, next: ToastStep::Remove })
        );
        assert!(toasts.stack().iter().all(|t| t.exiting));

        let removed = toasts.advance(0, ToastStep::Remove);
        assert!(removed.changed);
        assert_eq!(removed.schedule, None);
        assert!(toasts.stack().is_empty());
    }

    #[test]
    fn eviction_cancels_the_evicted_timer() {
        let mut toasts = ToastLifecycle::new(2, 3_000, 300);
        toasts.push("a", Severity::Success);
        toasts.push("b", Severity::Success);
        let third = toasts.push("c", Severity::Error);
        assert_eq!(third.cancel, Some(0));

        // a late timer for the evicted toast changes nothing
        let late = toasts.advance(0, ToastStep::BeginExit);
        assert_eq!(late, Transition::default());
        assert_eq!(toasts.stack().len(), 2);
    }

    #[test]
    fn unconnected_sink_drops_quietly() {
        let sink = ToastSink::default();
        sink.notify("nobody listening", Severity::Error);
        assert!(sink == sink.clone());
        assert!(sink != ToastSink::default());
    }
}
