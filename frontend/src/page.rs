//! Mounts every unit against the live document and owns them until
//! teardown.

use std::rc::Rc;

use web_sys::{Document, Window};
use yew::AppHandle;

use crate::carousel::CarouselController;
use crate::clipboard::ClipboardNotifier;
use crate::components::notification::{ToastHost, ToastHostProps, ToastSink};
use crate::config::LandingConfig;
use crate::dom::{self, Listener};
use crate::effects::{self, BrokenImages, HoverLift, LazyImages, LoadingLinks};
use crate::error::Result;
use crate::header::HeaderEffects;
use crate::nav::Navigation;
use crate::reveal::RevealObserver;
use crate::ticker::TickerHandle;

pub const TOAST_ROOT_ID: &str = "toast-root";

/// Turns a failed optional unit into a warning.
fn optional<T>(name: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(unit) => Some(unit),
        Err(e) => {
            log::warn!("{} not installed: {}", name, e);
            None
        }
    }
}

/// Everything the page script installed. Dropping it removes listeners,
/// cancels timers, disconnects observers and removes injected nodes.
pub struct Page {
    config: LandingConfig,
    document: Document,
    clipboard: Option<Rc<ClipboardNotifier>>,
    _clipboard_listener: Option<Listener>,
    navigation: Option<Navigation>,
    _header: Option<HeaderEffects>,
    reveal: Option<RevealObserver>,
    ticker: Option<TickerHandle>,
    carousel: Option<CarouselController>,
    _hover: Option<HoverLift>,
    _loading_links: Option<LoadingLinks>,
    _broken_images: Option<BrokenImages>,
    _lazy_images: Option<LazyImages>,
    _service_worker: Option<Listener>,
    prefers_dark: bool,
    toast_host: Option<AppHandle<ToastHost>>,
}

impl Page {
    pub fn mount(window: &Window, document: &Document, config: LandingConfig) -> Result<Self> {
        let body = dom::body(document)?;
        let toasts = ToastSink::default();

        let toast_root = document.create_element("div")?;
        toast_root.set_id(TOAST_ROOT_ID);
        body.append_child(&toast_root)?;
        let toast_host = yew::Renderer::<ToastHost>::with_root_and_props(
            toast_root,
            ToastHostProps {
                sink: toasts.clone(),
                capacity: config.max_toasts,
                visible_ms: config.timings.toast_visible_ms,
                exit_ms: config.timings.toast_exit_ms,
            },
        )
        .render();

        let selectors = &config.selectors;
        let timings = &config.timings;

        let clipboard = optional(
            "clipboard",
            ClipboardNotifier::new(document, selectors, toasts.clone(), timings.copied_feedback_ms),
        )
        .map(Rc::new);
        let clipboard_listener = clipboard
            .as_ref()
            .and_then(|c| optional("clipboard listener", c.listen()));

        let navigation = optional("navigation", Navigation::install(document, selectors));
        let header = optional("header", HeaderEffects::install(window, document, selectors));
        let reveal = optional(
            "reveal",
            RevealObserver::install(
                window,
                document,
                &selectors.animated,
                timings.reveal_initial_check_ms,
            ),
        );
        let ticker = optional(
            "price ticker",
            TickerHandle::install(document, selectors, timings.ticker_interval_ms),
        );
        let carousel = optional(
            "carousel",
            CarouselController::install(document, selectors, timings.carousel_interval_ms),
        );
        let hover = optional("hover", HoverLift::install(document, &selectors.hover_lift));
        let loading_links = optional(
            "loading links",
            LoadingLinks::install(document, &selectors.loading_links, timings.loading_reset_ms),
        );
        let broken_images = optional("image fallback", BrokenImages::install(document));
        let lazy_images = optional("lazy images", LazyImages::install(document));
        let service_worker = config
            .service_worker_url
            .as_deref()
            .and_then(|url| {
                optional(
                    "service worker",
                    effects::register_service_worker(window, document, url),
                )
            })
            .flatten();

        let prefers_dark = effects::prefers_dark_scheme(window);
        log::debug!("prefers dark colour scheme: {}", prefers_dark);

        Ok(Self {
            document: document.clone(),
            clipboard,
            _clipboard_listener: clipboard_listener,
            navigation,
            _header: header,
            reveal,
            ticker,
            carousel,
            _hover: hover,
            _loading_links: loading_links,
            _broken_images: broken_images,
            _lazy_images: lazy_images,
            _service_worker: service_worker,
            prefers_dark,
            toast_host: Some(toast_host),
            config,
        })
    }

    pub fn copy_contract(&self) -> Result<()> {
        match &self.clipboard {
            Some(clipboard) => {
                clipboard.copy();
                Ok(())
            }
            None => Err(crate::error::LandingError::missing(
                &self.config.selectors.copy_button,
            )),
        }
    }

    pub fn load_actual_logo(&self, logo_url: &str) -> Result<usize> {
        effects::load_actual_logo(&self.document, &self.config.selectors.logos, logo_url)
    }

    pub fn prefers_dark(&self) -> bool {
        self.prefers_dark
    }

    /// Which units made it onto the page, for the startup log line.
    pub fn summary(&self) -> String {
        let units = [
            ("clipboard", self.clipboard.is_some()),
            ("navigation", self.navigation.is_some()),
            ("carousel", self.carousel.is_some()),
        ];
        let mut parts: Vec<String> = units
            .iter()
            .map(|(name, ok)| format!("{}={}", name, if *ok { "on" } else { "off" }))
            .collect();
        parts.push(match &self.reveal {
            Some(reveal) => format!("revealed={}", reveal.revealed_count()),
            None => "reveal=off".to_string(),
        });
        parts.push(match &self.ticker {
            Some(ticker) => format!("price={}", crate::ticker::format_price(ticker.price())),
            None => "ticker=off".to_string(),
        });
        parts.join(" ")
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        if let Some(host) = self.toast_host.take() {
            host.destroy();
        }
        if let Some(root) = self.document.get_element_by_id(TOAST_ROOT_ID) {
            root.remove();
        }
    }
}
