use std::cell::RefCell;

use log::info;
use wasm_bindgen::prelude::*;
use web_sys::Event;

mod config;
mod dom;
mod error;
pub mod carousel;
pub mod clipboard;
pub mod effects;
pub mod header;
pub mod nav;
pub mod page;
pub mod reveal;
pub mod ticker;
pub mod components {
    pub mod notification;
}

pub use config::{LandingConfig, Selectors, Timings};
pub use error::{LandingError, Result};

use dom::Listener;
use page::Page;

thread_local! {
    static PAGE: RefCell<Option<Page>> = RefCell::new(None);
    static DOM_READY: RefCell<Option<Listener>> = RefCell::new(None);
}

fn mount(config: LandingConfig) -> Result<()> {
    // an earlier page still owns the injected carousel buttons and toast root
    unmount();
    let window = dom::window()?;
    let document = dom::document()?;
    let page = Page::mount(&window, &document, config)?;
    info!(
        "landing page mounted: {} dark={}",
        page.summary(),
        page.prefers_dark()
    );
    PAGE.with(|slot| slot.borrow_mut().replace(page));
    Ok(())
}

fn mount_from_document() {
    let config = match dom::document() {
        Ok(document) => LandingConfig::from_document(&document),
        Err(e) => {
            gloo_console::error!("landing page not mounted:", e.to_string());
            return;
        }
    };
    if let Err(e) = mount(config) {
        gloo_console::error!("landing page not mounted:", e.to_string());
    }
}

#[wasm_bindgen(start)]
pub fn start() -> std::result::Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(config::log_level()) {
        gloo_console::warn!("logger already set:", e.to_string());
    }

    info!("Starting landing page script");
    let document = dom::document()?;
    if document.ready_state() != "loading" {
        mount_from_document();
        return Ok(());
    }

    let mut pending = Some(());
    let listener = Listener::new(&document.into(), "DOMContentLoaded", move |_: Event| {
        if pending.take().is_some() {
            mount_from_document();
        }
    })?;
    DOM_READY.with(|slot| slot.borrow_mut().replace(listener));
    Ok(())
}

/// Copies the contract address, as the copy button does.
#[wasm_bindgen(js_name = copyContract)]
pub fn copy_contract() -> std::result::Result<(), JsValue> {
    PAGE.with(|slot| match slot.borrow().as_ref() {
        Some(page) => page.copy_contract().map_err(JsValue::from),
        None => Err(LandingError::NotMounted.into()),
    })
}

/// Points the logo images at `logo_url`, falling back to a placeholder.
/// Works before the page is mounted too.
#[wasm_bindgen(js_name = loadActualLogo)]
pub fn load_actual_logo(logo_url: &str) -> std::result::Result<(), JsValue> {
    let swapped = PAGE.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|page| page.load_actual_logo(logo_url))
    });
    let swapped = match swapped {
        Some(result) => result?,
        None => effects::load_actual_logo(
            &dom::document()?,
            &Selectors::default().logos,
            logo_url,
        )?,
    };
    log::debug!("logo swapped on {} images", swapped);
    Ok(())
}

fn unmount() {
    let page = PAGE.with(|slot| slot.borrow_mut().take());
    if page.is_some() {
        drop(page);
        info!("landing page torn down");
    }
}

/// Removes every listener, timer, observer and injected node.
#[wasm_bindgen]
pub fn teardown() {
    DOM_READY.with(|slot| slot.borrow_mut().take());
    unmount();
}

/// Tears down and mounts again with `config` (a plain JS object shaped like
/// the inline config block; `undefined` means defaults).
#[wasm_bindgen]
pub fn remount(config: JsValue) -> std::result::Result<(), JsValue> {
    let config = LandingConfig::from_js(config)?;
    mount(config)?;
    Ok(())
}
