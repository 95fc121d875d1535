//! Cosmetic page effects and platform odds and ends: hover lift, buy-link
//! loading state, broken image handling, logo swap, lazy images, service
//! worker and colour scheme.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::js_sys::{Array, Reflect};
use web_sys::{
    Document, Event, HtmlAnchorElement, HtmlElement, HtmlImageElement, IntersectionObserver,
    IntersectionObserverEntry, Navigator, Window,
};

use crate::dom::{self, Listener};
use crate::error::Result;

pub const LIFT_TRANSFORM: &str = "translateY(-3px)";
pub const REST_TRANSFORM: &str = "translateY(0)";
pub const LOADING_HTML: &str = "<i class=\"fas fa-spinner fa-spin\"></i> Loading...";
pub const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";

const PLACEHOLDER_SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 100 100\">\
<circle cx=\"50\" cy=\"50\" r=\"45\" fill=\"#FF6B6B\"/>\
<path d=\"M30,65 Q50,30 70,65\" stroke=\"white\" stroke-width=\"8\" fill=\"none\"/>\
<circle cx=\"40\" cy=\"45\" r=\"5\" fill=\"white\"/>\
<circle cx=\"60\" cy=\"45\" r=\"5\" fill=\"white\"/></svg>";

pub fn hover_transform(hovered: bool) -> &'static str {
    if hovered {
        LIFT_TRANSFORM
    } else {
        REST_TRANSFORM
    }
}

/// Links that get a spinner while the next page loads.
pub fn is_loading_link(href: &str) -> bool {
    href.contains("uniswap") || href.contains("#buy")
}

/// Vector logo used when the real logo fails to load.
pub fn placeholder_logo_url() -> String {
    format!(
        "data:image/svg+xml,{}",
        urlencoding::encode(PLACEHOLDER_SVG)
    )
}

pub struct HoverLift {
    _listeners: Vec<Listener>,
}

impl HoverLift {
    pub fn install(document: &Document, selector: &str) -> Result<Self> {
        let mut listeners = Vec::new();
        for el in dom::query_all::<HtmlElement>(document, selector)? {
            for (event, hovered) in [("mouseenter", true), ("mouseleave", false)] {
                let target = el.clone();
                listeners.push(Listener::new(&el.clone().into(), event, move |_: Event| {
                    dom::set_style(&target, "transform", hover_transform(hovered));
                })?);
            }
        }
        Ok(Self {
            _listeners: listeners,
        })
    }
}

struct LoadingLink {
    element: HtmlAnchorElement,
    original_html: RefCell<Option<String>>,
    reset: RefCell<Option<Timeout>>,
}

impl LoadingLink {
    fn start(self: &Rc<Self>, reset_ms: u32) {
        if !is_loading_link(&self.element.href()) {
            return;
        }
        if self.original_html.borrow().is_none() {
            *self.original_html.borrow_mut() = Some(self.element.inner_html());
        }
        self.element.set_inner_html(LOADING_HTML);
        dom::set_style(&self.element, "pointer-events", "none");

        let link = self.clone();
        self.reset
            .borrow_mut()
            .replace(Timeout::new(reset_ms, move || link.restore()));
    }

    fn restore(&self) {
        if let Some(html) = self.original_html.borrow_mut().take() {
            self.element.set_inner_html(&html);
        }
        dom::set_style(&self.element, "pointer-events", "auto");
    }
}

pub struct LoadingLinks {
    links: Vec<Rc<LoadingLink>>,
    _listeners: Vec<Listener>,
}

impl LoadingLinks {
    pub fn install(document: &Document, selector: &str, reset_ms: u32) -> Result<Self> {
        let mut links = Vec::new();
        let mut listeners = Vec::new();
        for element in dom::query_all::<HtmlAnchorElement>(document, selector)? {
            let link = Rc::new(LoadingLink {
                element,
                original_html: RefCell::new(None),
                reset: RefCell::new(None),
            });
            let handler = link.clone();
            listeners.push(Listener::new(
                &link.element.clone().into(),
                "click",
                move |_: Event| handler.start(reset_ms),
            )?);
            links.push(link);
        }
        Ok(Self {
            links,
            _listeners: listeners,
        })
    }
}

impl Drop for LoadingLinks {
    fn drop(&mut self) {
        for link in &self.links {
            if link.reset.borrow_mut().take().is_some() {
                link.restore();
            }
        }
    }
}

/// Error state of one image; it is dimmed on the first failure only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFallback {
    #[default]
    Pending,
    Dimmed,
}

impl ImageFallback {
    /// Returns true when this error should dim the image.
    pub fn on_error(&mut self) -> bool {
        match self {
            ImageFallback::Pending => {
                *self = ImageFallback::Dimmed;
                true
            }
            ImageFallback::Dimmed => false,
        }
    }
}

/// Dims every image that fails to load. Dropping it clears the handlers
/// that never fired.
pub struct BrokenImages {
    images: Vec<HtmlImageElement>,
    _handlers: Vec<Closure<dyn FnMut()>>,
}

impl BrokenImages {
    pub fn install(document: &Document) -> Result<Self> {
        let images = dom::query_all::<HtmlImageElement>(document, "img")?;
        let mut handlers = Vec::with_capacity(images.len());
        for img in &images {
            let target = img.clone();
            let mut state = ImageFallback::default();
            let handler = Closure::wrap(Box::new(move || {
                if !state.on_error() {
                    return;
                }
                gloo_console::warn!("Failed to load image:", target.src());
                dom::set_style(&target, "opacity", "0.5");
                dom::set_style(&target, "filter", "grayscale(1)");
            }) as Box<dyn FnMut()>);
            img.set_onerror(Some(handler.as_ref().unchecked_ref()));
            handlers.push(handler);
        }
        log::debug!("watching {} images for load errors", images.len());
        Ok(Self {
            images,
            _handlers: handlers,
        })
    }
}

impl Drop for BrokenImages {
    fn drop(&mut self) {
        for img in &self.images {
            img.set_onerror(None);
        }
    }
}

/// Points every logo image at `logo_url`, falling back to the built-in
/// placeholder if it does not load. An empty url does nothing.
pub fn load_actual_logo(document: &Document, selector: &str, logo_url: &str) -> Result<usize> {
    if logo_url.is_empty() {
        return Ok(0);
    }
    let logos = dom::query_all::<HtmlImageElement>(document, selector)?;
    for img in &logos {
        let target = img.clone();
        let handler = Closure::once_into_js(move || {
            log::warn!("logo {} failed, using placeholder", target.src());
            target.set_onerror(None);
            target.set_src(&placeholder_logo_url());
        });
        img.set_onerror(Some(handler.unchecked_ref()));
        img.set_src(logo_url);
    }
    Ok(logos.len())
}

/// Swaps `data-src` into `src` once each image nears the viewport.
pub struct LazyImages {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl LazyImages {
    pub fn install(document: &Document) -> Result<Self> {
        let callback = Closure::wrap(Box::new(|entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }
                let target = entry.target();
                if let Some(img) = target.dyn_ref::<HtmlImageElement>() {
                    if let Some(src) = img.get_attribute("data-src") {
                        img.set_src(&src);
                        let _ = img.remove_attribute("data-src");
                    }
                }
                observer.unobserve(&target);
            }
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let observer = IntersectionObserver::new(callback.as_ref().unchecked_ref())?;
        let images = dom::query_all::<HtmlImageElement>(document, "img[data-src]")?;
        for img in &images {
            observer.observe(img);
        }
        log::debug!("{} lazy images pending", images.len());
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for LazyImages {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Whether `navigator[name]` exists. Insecure origins and some private
/// modes omit APIs the bindings assume are present.
fn navigator_has(navigator: &Navigator, name: &str) -> bool {
    Reflect::has(navigator, &JsValue::from_str(name)).unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Unsupported,
    Now,
    OnLoad,
}

pub fn registration_plan(supported: bool, ready_state: &str) -> Registration {
    if !supported {
        Registration::Unsupported
    } else if ready_state == "complete" {
        Registration::Now
    } else {
        Registration::OnLoad
    }
}

/// Registers the service worker once the window has finished loading.
/// Failures only reach the console.
pub fn register_service_worker(
    window: &Window,
    document: &Document,
    url: &str,
) -> Result<Option<Listener>> {
    let supported = navigator_has(&window.navigator(), "serviceWorker");
    let plan = registration_plan(supported, &document.ready_state());
    if plan == Registration::Unsupported {
        log::info!("Service Worker not supported here, skipping registration");
        return Ok(None);
    }
    let url = url.to_string();
    let register = {
        let window = window.clone();
        move || {
            let container = window.navigator().service_worker();
            let promise = container.register(&url);
            spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log::info!("Service Worker registration failed: {:?}", e);
                }
            });
        }
    };

    if plan == Registration::Now {
        register();
        return Ok(None);
    }
    let mut register = Some(register);
    let listener = Listener::new(&window.clone().into(), "load", move |_: Event| {
        if let Some(register) = register.take() {
            register();
        }
    })?;
    Ok(Some(listener))
}

/// Queried for future theming; nothing reacts to it yet.
pub fn prefers_dark_scheme(window: &Window) -> bool {
    match window.match_media(DARK_SCHEME_QUERY) {
        Ok(Some(query)) => query.matches(),
        Ok(None) => false,
        Err(e) => {
            log::debug!("matchMedia failed: {:?}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_lifts_and_rests() {
        assert_eq!(hover_transform(true), "translateY(-3px)");
        assert_eq!(hover_transform(false), "translateY(0)");
    }

    #[test]
    fn only_exchange_and_buy_anchor_links_load() {
        assert!(is_loading_link("https://app.uniswap.org/swap?outputCurrency=0xabc"));
        assert!(is_loading_link("https://example.com/#buy"));
        assert!(!is_loading_link("https://example.com/buying-guide"));
        assert!(!is_loading_link("#tokenomics"));
    }

    #[test]
    fn image_is_dimmed_on_first_error_only() {
        let mut state = ImageFallback::default();
        assert!(state.on_error());
        assert_eq!(state, ImageFallback::Dimmed);
        assert!(!state.on_error());
    }

    #[test]
    fn service_worker_skipped_without_api() {
        assert_eq!(registration_plan(false, "complete"), Registration::Unsupported);
        assert_eq!(registration_plan(false, "loading"), Registration::Unsupported);
    }

    #[test]
    fn service_worker_waits_for_load() {
        assert_eq!(registration_plan(true, "complete"), Registration::Now);
        assert_eq!(registration_plan(true, "interactive"), Registration::OnLoad);
        assert_eq!(registration_plan(true, "loading"), Registration::OnLoad);
    }

    #[test]
    fn placeholder_is_an_escaped_svg_data_url() {
        let url = placeholder_logo_url();
        assert!(url.starts_with("data:image/svg+xml,%3Csvg"));
        assert!(url.contains("%23FF6B6B"));
        assert!(!url.contains('#'));
        assert!(!url.contains(' '));
    }
}
