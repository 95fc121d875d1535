//! One-shot fade/slide-in of content blocks as they enter the viewport.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{
    Document, Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, Window,
};

use crate::dom;
use crate::error::Result;

pub const THRESHOLD: f64 = 0.1;
pub const ROOT_MARGIN: &str = "0px 0px -100px 0px";

pub const HIDDEN_OPACITY: &str = "0";
pub const HIDDEN_TRANSFORM: &str = "translateY(20px)";
pub const TRANSITION: &str = "opacity 0.6s ease, transform 0.6s ease";
pub const VISIBLE_OPACITY: &str = "1";
pub const VISIBLE_TRANSFORM: &str = "translate(0)";

/// Which observed elements have been revealed. Nothing ever flips back.
#[derive(Debug, Clone)]
pub struct RevealTracker {
    revealed: Vec<bool>,
}

impl RevealTracker {
    pub fn new(count: usize) -> Self {
        Self {
            revealed: vec![false; count],
        }
    }

    /// Returns true when this report should push the element to visible.
    pub fn on_intersection(&mut self, index: usize, is_intersecting: bool) -> bool {
        match self.revealed.get_mut(index) {
            Some(revealed) if is_intersecting && !*revealed => {
                *revealed = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    pub fn opacity(&self, index: usize) -> &'static str {
        if self.is_revealed(index) {
            VISIBLE_OPACITY
        } else {
            HIDDEN_OPACITY
        }
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|r| **r).count()
    }
}

/// Rect overlap test used by the check that runs just after mount.
pub fn in_viewport(rect_top: f64, rect_bottom: f64, viewport_height: f64) -> bool {
    rect_top < viewport_height && rect_bottom > 0.0
}

fn show(el: &HtmlElement) {
    dom::set_style(el, "animation-play-state", "running");
    dom::set_style(el, "opacity", VISIBLE_OPACITY);
    dom::set_style(el, "transform", VISIBLE_TRANSFORM);
}

struct Shared {
    elements: Vec<HtmlElement>,
    tracker: RefCell<RevealTracker>,
}

impl Shared {
    fn reveal(&self, index: usize, is_intersecting: bool) {
        if self.tracker.borrow_mut().on_intersection(index, is_intersecting) {
            if let Some(el) = self.elements.get(index) {
                show(el);
            }
        }
    }
}

pub struct RevealObserver {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
    _initial_check: Timeout,
    shared: Rc<Shared>,
}

impl RevealObserver {
    pub fn install(
        window: &Window,
        document: &Document,
        selector: &str,
        initial_check_ms: u32,
    ) -> Result<Self> {
        let elements = dom::query_all::<HtmlElement>(document, selector)?;
        for el in &elements {
            dom::set_style(el, "opacity", HIDDEN_OPACITY);
            dom::set_style(el, "transform", HIDDEN_TRANSFORM);
            dom::set_style(el, "transition", TRANSITION);
        }
        let shared = Rc::new(Shared {
            tracker: RefCell::new(RevealTracker::new(elements.len())),
            elements,
        });

        let callback = {
            let shared = shared.clone();
            Closure::wrap(Box::new(move |entries: Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    let target: Element = entry.target();
                    let index = shared
                        .elements
                        .iter()
                        .position(|el| AsRef::<Element>::as_ref(el) == &target);
                    if let Some(index) = index {
                        shared.reveal(index, entry.is_intersecting());
                    }
                }
            }) as Box<dyn FnMut(Array, IntersectionObserver)>)
        };

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(THRESHOLD));
        options.set_root_margin(ROOT_MARGIN);
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
        for el in &shared.elements {
            observer.observe(el);
        }

        let initial_check = {
            let shared = shared.clone();
            let window = window.clone();
            Timeout::new(initial_check_ms, move || {
                let height = dom::viewport_height(&window);
                for (index, el) in shared.elements.iter().enumerate() {
                    let rect = el.get_bounding_client_rect();
                    shared.reveal(index, in_viewport(rect.top(), rect.bottom(), height));
                }
            })
        };

        log::debug!("observing {} elements for reveal", shared.elements.len());
        Ok(Self {
            observer,
            _callback: callback,
            _initial_check: initial_check,
            shared,
        })
    }

    pub fn revealed_count(&self) -> usize {
        self.shared.tracker.borrow().revealed_count()
    }
}

impl Drop for RevealObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_intersecting_stays_hidden() {
        let mut tracker = RevealTracker::new(3);
        assert!(!tracker.on_intersection(0, false));
        assert_eq!(tracker.opacity(0), "0");
        assert_eq!(tracker.revealed_count(), 0);
    }

    #[test]
    fn first_intersection_reveals_once() {
        let mut tracker = RevealTracker::new(2);
        assert!(tracker.on_intersection(1, true));
        assert_eq!(tracker.opacity(1), "1");
        // already visible, nothing to push again
        assert!(!tracker.on_intersection(1, true));
    }

    #[test]
    fn leaving_viewport_never_hides() {
        let mut tracker = RevealTracker::new(1);
        tracker.on_intersection(0, true);
        for intersecting in [false, false, true, false] {
            tracker.on_intersection(0, intersecting);
            assert!(tracker.is_revealed(0));
            assert_eq!(tracker.opacity(0), "1");
        }
    }

    #[test]
    fn unknown_index_is_ignored() {
        let mut tracker = RevealTracker::new(1);
        assert!(!tracker.on_intersection(7, true));
        assert!(!tracker.is_revealed(7));
    }

    #[test]
    fn viewport_overlap() {
        assert!(in_viewport(10.0, 200.0, 800.0));
        assert!(in_viewport(-100.0, 1.0, 800.0));
        assert!(!in_viewport(800.0, 1000.0, 800.0));
        assert!(!in_viewport(-300.0, 0.0, 800.0));
    }
}
