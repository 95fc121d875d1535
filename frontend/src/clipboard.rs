//! Copy-contract-address button.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::js_sys::Reflect;
use web_sys::{Clipboard, Document, Element, Event, HtmlElement, Navigator};

use crate::components::notification::{Severity, ToastSink};
use crate::config::Selectors;
use crate::dom::{self, Listener};
use crate::error::Result;

pub const COPIED_HTML: &str = "<i class=\"fas fa-check\"></i> Copied!";
pub const COPIED_BACKGROUND: &str = "var(--success)";
pub const SUCCESS_MESSAGE: &str = "Contract address copied to clipboard!";
pub const FAILURE_MESSAGE: &str = "Failed to copy address. Please try again.";

pub const UNAVAILABLE_REASON: &str = "clipboard API unavailable (insecure context?)";

/// Result of a copy attempt, decoupled from the DOM so it can be checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed(String),
}

impl CopyOutcome {
    /// `navigator.clipboard` is missing outside secure contexts.
    pub fn unavailable() -> Self {
        CopyOutcome::Failed(UNAVAILABLE_REASON.to_string())
    }

    pub fn toast(&self) -> (&'static str, Severity) {
        match self {
            CopyOutcome::Copied => (SUCCESS_MESSAGE, Severity::Success),
            CopyOutcome::Failed(_) => (FAILURE_MESSAGE, Severity::Error),
        }
    }
}

/// What the copy button should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonFace {
    Copied,
    Original(String),
}

impl ButtonFace {
    pub fn html(&self) -> &str {
        match self {
            ButtonFace::Copied => COPIED_HTML,
            ButtonFace::Original(html) => html,
        }
    }

    pub fn background(&self) -> &'static str {
        match self {
            ButtonFace::Copied => COPIED_BACKGROUND,
            ButtonFace::Original(_) => "",
        }
    }
}

/// Copy button feedback. The original markup is captured once, so a click
/// while "Copied!" is showing still restores the real label.
#[derive(Debug, Clone)]
pub struct CopyFeedback {
    original_html: String,
    showing_copied: bool,
}

impl CopyFeedback {
    pub fn new(original_html: impl Into<String>) -> Self {
        Self {
            original_html: original_html.into(),
            showing_copied: false,
        }
    }

    pub fn is_showing_copied(&self) -> bool {
        self.showing_copied
    }

    /// Only a successful copy touches the button.
    pub fn on_outcome(&mut self, outcome: &CopyOutcome) -> Option<ButtonFace> {
        match outcome {
            CopyOutcome::Copied => {
                self.showing_copied = true;
                Some(ButtonFace::Copied)
            }
            CopyOutcome::Failed(_) => None,
        }
    }

    pub fn restore(&mut self) -> ButtonFace {
        self.showing_copied = false;
        ButtonFace::Original(self.original_html.clone())
    }

    /// Restores the label on teardown, if it is still swapped.
    pub fn release(&mut self) -> Option<ButtonFace> {
        if self.showing_copied {
            Some(self.restore())
        } else {
            None
        }
    }
}

struct Button {
    element: HtmlElement,
    feedback: RefCell<CopyFeedback>,
    restore: RefCell<Option<Timeout>>,
}

impl Button {
    fn render(&self, face: &ButtonFace) {
        self.element.set_inner_html(face.html());
        dom::set_style(&self.element, "background", face.background());
    }

    fn reset(&self) {
        let face = self.feedback.borrow_mut().restore();
        self.render(&face);
    }
}

pub struct ClipboardNotifier {
    contract: Element,
    button: Rc<Button>,
    sink: ToastSink,
    feedback_ms: u32,
}

impl ClipboardNotifier {
    pub fn new(
        document: &Document,
        selectors: &Selectors,
        sink: ToastSink,
        feedback_ms: u32,
    ) -> Result<Self> {
        let element = dom::require_html(document, &selectors.copy_button)?;
        Ok(Self {
            contract: dom::require(document, &selectors.contract_text)?,
            button: Rc::new(Button {
                feedback: RefCell::new(CopyFeedback::new(element.inner_html())),
                element,
                restore: RefCell::new(None),
            }),
            sink,
            feedback_ms,
        })
    }

    pub fn listen(self: &Rc<Self>) -> Result<Listener> {
        let notifier = self.clone();
        Listener::new(
            &self.button.element.clone().into(),
            "click",
            move |_: Event| notifier.copy(),
        )
    }

    /// Starts an asynchronous copy; feedback arrives when the platform
    /// settles the clipboard promise.
    pub fn copy(self: &Rc<Self>) {
        let notifier = self.clone();
        spawn_local(async move {
            let outcome = notifier.write().await;
            notifier.finish(outcome);
        });
    }

    async fn write(&self) -> CopyOutcome {
        let text = self.contract.text_content().unwrap_or_default();
        let window = match dom::window() {
            Ok(window) => window,
            Err(e) => return CopyOutcome::Failed(e.to_string()),
        };
        let Some(clipboard) = clipboard_api(&window.navigator()) else {
            return CopyOutcome::unavailable();
        };
        match JsFuture::from(clipboard.write_text(&text)).await {
            Ok(_) => CopyOutcome::Copied,
            Err(e) => CopyOutcome::Failed(describe(&e)),
        }
    }

    fn finish(&self, outcome: CopyOutcome) {
        if let CopyOutcome::Failed(reason) = &outcome {
            gloo_console::error!("Failed to copy: ", reason.clone());
            log::error!("clipboard write rejected: {}", reason);
        }
        let face = self.button.feedback.borrow_mut().on_outcome(&outcome);
        if let Some(face) = face {
            self.show(&face);
        }
        let (message, severity) = outcome.toast();
        self.sink.notify(message, severity);
    }

    fn show(&self, face: &ButtonFace) {
        let button = &self.button;
        button.render(face);

        let restore_target = button.clone();
        let timeout = Timeout::new(self.feedback_ms, move || restore_target.reset());
        // replacing drops, and so cancels, a restore still pending
        button.restore.borrow_mut().replace(timeout);
    }
}

impl Drop for ClipboardNotifier {
    fn drop(&mut self) {
        self.button.restore.borrow_mut().take();
        let face = self.button.feedback.borrow_mut().release();
        if let Some(face) = face {
            self.button.render(&face);
        }
    }
}

/// `navigator.clipboard`, or `None` where the page may not use it.
fn clipboard_api(navigator: &Navigator) -> Option<Clipboard> {
    let value = Reflect::get(navigator, &JsValue::from_str("clipboard")).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }
    value.dyn_into::<Clipboard>().ok()
}

fn describe(value: &JsValue) -> String {
    crate::error::LandingError::from(value.clone()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABEL: &str = "<i class=\"fas fa-copy\"></i> Copy";

    #[test]
    fn success_swaps_to_copied_then_restores() {
        let mut feedback = CopyFeedback::new(LABEL);
        let face = feedback.on_outcome(&CopyOutcome::Copied);
        assert_eq!(face, Some(ButtonFace::Copied));
        assert!(feedback.is_showing_copied());
        assert_eq!(ButtonFace::Copied.html(), COPIED_HTML);
        assert_eq!(ButtonFace::Copied.background(), COPIED_BACKGROUND);

        let restored = feedback.restore();
        assert_eq!(restored.html(), LABEL);
        assert_eq!(restored.background(), "");
        assert!(!feedback.is_showing_copied());
    }

    #[test]
    fn second_click_while_copied_still_restores_original() {
        let mut feedback = CopyFeedback::new(LABEL);
        feedback.on_outcome(&CopyOutcome::Copied);
        feedback.on_outcome(&CopyOutcome::Copied);
        assert_eq!(feedback.restore(), ButtonFace::Original(LABEL.to_string()));
    }

    #[test]
    fn failure_leaves_button_alone() {
        let mut feedback = CopyFeedback::new(LABEL);
        let outcome = CopyOutcome::Failed("NotAllowedError".to_string());
        assert_eq!(feedback.on_outcome(&outcome), None);
        assert!(!feedback.is_showing_copied());
        assert_eq!(outcome.toast(), (FAILURE_MESSAGE, Severity::Error));
    }

    #[test]
    fn missing_clipboard_api_is_an_error_toast() {
        let outcome = CopyOutcome::unavailable();
        assert_eq!(outcome, CopyOutcome::Failed(UNAVAILABLE_REASON.to_string()));
        assert_eq!(outcome.toast(), (FAILURE_MESSAGE, Severity::Error));
        assert_eq!(CopyFeedback::new(LABEL).on_outcome(&outcome), None);
    }

    #[test]
    fn success_toast_text() {
        assert_eq!(CopyOutcome::Copied.toast(), (SUCCESS_MESSAGE, Severity::Success));
    }

    #[test]
    fn release_only_restores_a_swapped_label() {
        let mut feedback = CopyFeedback::new(LABEL);
        assert_eq!(feedback.release(), None);
        feedback.on_outcome(&CopyOutcome::Copied);
        assert_eq!(feedback.release(), Some(ButtonFace::Original(LABEL.to_string())));
        assert_eq!(feedback.release(), None);
    }
}
