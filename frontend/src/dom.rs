//! Thin helpers over `web-sys` shared by every page unit.
//!
//! The [`Listener`] handle is the only way units subscribe to DOM events: it
//! removes its callback when dropped, so tearing a unit down is just dropping
//! it.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, ScrollBehavior, ScrollToOptions, Window,
};

use crate::error::{LandingError, Result};

pub fn window() -> Result<Window> {
    web_sys::window().ok_or(LandingError::NoWindow)
}

pub fn document() -> Result<Document> {
    window()?.document().ok_or(LandingError::NoDocument)
}

pub fn body(document: &Document) -> Result<HtmlElement> {
    document.body().ok_or_else(|| LandingError::missing("body"))
}

pub fn query(document: &Document, selector: &str) -> Result<Option<Element>> {
    Ok(document.query_selector(selector)?)
}

pub fn require(document: &Document, selector: &str) -> Result<Element> {
    query(document, selector)?.ok_or_else(|| LandingError::missing(selector))
}

pub fn require_html(document: &Document, selector: &str) -> Result<HtmlElement> {
    require(document, selector)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| LandingError::WrongElementType {
            selector: selector.to_string(),
            expected: "HTMLElement",
        })
}

/// Every element matching `selector`, in document order.
pub fn query_all<T: JsCast>(document: &Document, selector: &str) -> Result<Vec<T>> {
    let list = document.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect())
}

/// Sets one inline style property, logging instead of failing.
pub fn set_style(el: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = el.style().set_property(property, value) {
        log::debug!("set {} failed: {:?}", property, e);
    }
}

pub fn smooth_scroll_window(window: &Window, top: f64) {
    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
}

pub fn smooth_scroll_element_x(el: &Element, left: f64) {
    let options = ScrollToOptions::new();
    options.set_left(left);
    options.set_behavior(ScrollBehavior::Smooth);
    el.scroll_to_with_scroll_to_options(&options);
}

pub fn viewport_height(window: &Window) -> f64 {
    window
        .inner_height()
        .ok()
        .and_then(|h| h.as_f64())
        .unwrap_or(0.0)
}

/// An event subscription that unregisters itself on drop.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new<F>(target: &EventTarget, event: &'static str, handler: F) -> Result<Self>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}
