//! Mobile menu and in-page anchor navigation.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent, Node};

use crate::config::Selectors;
use crate::dom::{self, Listener};
use crate::error::Result;

pub const ACTIVE_CLASS: &str = "active";

/// What closed the menu. Only used for logging, every trigger closes the
/// same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTrigger {
    LinkClick,
    OutsideClick,
    Escape,
    Teardown,
}

/// Everything the DOM needs to mirror the menu state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuView {
    pub open: bool,
    pub aria_expanded: bool,
    pub scroll_locked: bool,
}

impl MenuView {
    pub fn aria_value(&self) -> &'static str {
        if self.aria_expanded {
            "true"
        } else {
            "false"
        }
    }

    pub fn body_overflow(&self) -> &'static str {
        if self.scroll_locked {
            "hidden"
        } else {
            ""
        }
    }
}

#[derive(Debug, Default)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> MenuView {
        self.open = !self.open;
        self.view()
    }

    pub fn close(&mut self, trigger: CloseTrigger) -> MenuView {
        if self.open {
            log::debug!("menu closed by {:?}", trigger);
        }
        self.open = false;
        self.view()
    }

    pub fn view(&self) -> MenuView {
        MenuView {
            open: self.open,
            aria_expanded: self.open,
            scroll_locked: self.open,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorAction {
    /// Bare `#`: leave the click alone.
    Skip,
    /// Scroll to the element matching this selector.
    ScrollTo(String),
}

pub fn resolve_anchor(href: &str) -> AnchorAction {
    if href == "#" || !href.starts_with('#') {
        AnchorAction::Skip
    } else {
        AnchorAction::ScrollTo(href.to_string())
    }
}

/// Document offset to scroll to so the target sits just under the fixed
/// header.
pub fn scroll_target(rect_top: f64, page_y_offset: f64, header_height: f64) -> f64 {
    rect_top + page_y_offset - header_height
}

struct NavElements {
    document: Document,
    header: Option<HtmlElement>,
    menu_button: Element,
    nav_links: Element,
    body: HtmlElement,
}

impl NavElements {
    fn apply(&self, view: MenuView) {
        let classes = [&self.nav_links, &self.menu_button];
        for el in classes {
            let _ = el
                .class_list()
                .toggle_with_force(ACTIVE_CLASS, view.open);
        }
        let _ = self
            .menu_button
            .set_attribute("aria-expanded", view.aria_value());
        dom::set_style(&self.body, "overflow", view.body_overflow());
    }

    fn header_height(&self) -> f64 {
        self.header
            .as_ref()
            .map(|h| f64::from(h.offset_height()))
            .unwrap_or(0.0)
    }
}

/// Installed navigation: owns the menu state and every listener it
/// registered.
pub struct Navigation {
    state: Rc<RefCell<MenuState>>,
    elements: Rc<NavElements>,
    _listeners: Vec<Listener>,
}

impl Navigation {
    pub fn install(document: &Document, selectors: &Selectors) -> Result<Self> {
        let elements = Rc::new(NavElements {
            document: document.clone(),
            header: dom::query(document, &selectors.header)?
                .and_then(|el| el.dyn_into::<HtmlElement>().ok()),
            menu_button: dom::require(document, &selectors.menu_button)?,
            nav_links: dom::require(document, &selectors.nav_links)?,
            body: dom::body(document)?,
        });
        let state = Rc::new(RefCell::new(MenuState::default()));
        let mut listeners = Vec::new();

        {
            let state = state.clone();
            let elements = elements.clone();
            listeners.push(Listener::new(
                &elements.menu_button.clone().into(),
                "click",
                move |_: Event| {
                    let view = state.borrow_mut().toggle();
                    elements.apply(view);
                },
            )?);
        }

        for link in dom::query_all::<Element>(document, &selectors.nav_link_anchors)? {
            let state = state.clone();
            let elements = elements.clone();
            listeners.push(Listener::new(&link.into(), "click", move |_: Event| {
                let view = state.borrow_mut().close(CloseTrigger::LinkClick);
                elements.apply(view);
            })?);
        }

        {
            let state = state.clone();
            let elements = elements.clone();
            listeners.push(Listener::new(
                &document.clone().into(),
                "click",
                move |event: Event| {
                    let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
                    let inside = elements.nav_links.contains(target.as_ref())
                        || elements.menu_button.contains(target.as_ref());
                    if !inside {
                        let view = state.borrow_mut().close(CloseTrigger::OutsideClick);
                        elements.apply(view);
                    }
                },
            )?);
        }

        {
            let state = state.clone();
            let elements = elements.clone();
            listeners.push(Listener::new(
                &document.clone().into(),
                "keydown",
                move |event: Event| {
                    let Some(key) = event.dyn_ref::<KeyboardEvent>().map(|e| e.key()) else {
                        return;
                    };
                    if key == "Escape" {
                        let view = state.borrow_mut().close(CloseTrigger::Escape);
                        elements.apply(view);
                    }
                },
            )?);
        }

        for anchor in dom::query_all::<Element>(document, &selectors.in_page_anchors)? {
            let state = state.clone();
            let elements = elements.clone();
            let href_source = anchor.clone();
            listeners.push(Listener::new(&anchor.into(), "click", move |event: Event| {
                let href = href_source.get_attribute("href").unwrap_or_default();
                if let AnchorAction::ScrollTo(selector) = resolve_anchor(&href) {
                    event.prevent_default();
                    if let Err(e) = scroll_to_anchor(&elements, &state, &selector) {
                        log::warn!("anchor {} not scrolled: {}", selector, e);
                    }
                }
            })?);
        }

        log::debug!("navigation installed ({} listeners)", listeners.len());
        Ok(Self {
            state,
            elements,
            _listeners: listeners,
        })
    }

}

impl Drop for Navigation {
    fn drop(&mut self) {
        let view = self.state.borrow_mut().close(CloseTrigger::Teardown);
        self.elements.apply(view);
    }
}

fn scroll_to_anchor(
    elements: &NavElements,
    state: &RefCell<MenuState>,
    selector: &str,
) -> Result<()> {
    let Some(target) = dom::query(&elements.document, selector)? else {
        return Ok(());
    };

    let view = state.borrow_mut().close(CloseTrigger::LinkClick);
    elements.apply(view);

    let window = dom::window()?;
    let top = scroll_target(
        target.get_bounding_client_rect().top(),
        window.page_y_offset()?,
        elements.header_height(),
    );
    dom::smooth_scroll_window(&window, top);

    window
        .history()?
        .push_state_with_url(&JsValue::NULL, "", Some(selector))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_opens_then_closes() {
        let mut menu = MenuState::default();
        let open = menu.toggle();
        assert!(open.open && open.aria_expanded && open.scroll_locked);
        assert_eq!(open.body_overflow(), "hidden");
        assert_eq!(open.aria_value(), "true");

        let closed = menu.toggle();
        assert!(!closed.open && !closed.aria_expanded && !closed.scroll_locked);
        assert_eq!(closed.body_overflow(), "");
    }

    #[test]
    fn every_trigger_closes_and_unlocks() {
        for trigger in [
            CloseTrigger::LinkClick,
            CloseTrigger::OutsideClick,
            CloseTrigger::Escape,
            CloseTrigger::Teardown,
        ] {
            let mut menu = MenuState::default();
            menu.toggle();
            let view = menu.close(trigger);
            assert!(!view.open);
            assert!(!view.scroll_locked);
            assert_eq!(view.aria_value(), "false");
        }
    }

    #[test]
    fn closing_a_closed_menu_is_a_no_op() {
        let mut menu = MenuState::default();
        let before = menu.view();
        let after = menu.close(CloseTrigger::Escape);
        assert_eq!(before, after);
        assert!(!menu.is_open());
    }

    #[test]
    fn aria_always_mirrors_open_flag() {
        let mut menu = MenuState::default();
        let ops = [0, 0, 1, 0, 2, 2, 0, 3, 0, 0];
        for op in ops {
            let view = match op {
                0 => menu.toggle(),
                1 => menu.close(CloseTrigger::LinkClick),
                2 => menu.close(CloseTrigger::OutsideClick),
                _ => menu.close(CloseTrigger::Escape),
            };
            assert_eq!(view.open, view.aria_expanded);
            assert_eq!(view.open, view.scroll_locked);
            assert_eq!(view.open, menu.is_open());
        }
    }

    #[test]
    fn bare_hash_is_skipped() {
        assert_eq!(resolve_anchor("#"), AnchorAction::Skip);
        assert_eq!(
            resolve_anchor("#tokenomics"),
            AnchorAction::ScrollTo("#tokenomics".to_string())
        );
        assert_eq!(resolve_anchor("https://example.com"), AnchorAction::Skip);
    }

    #[test]
    fn target_is_compensated_for_header() {
        assert_eq!(scroll_target(400.0, 1200.0, 80.0), 1520.0);
        assert_eq!(scroll_target(-50.0, 300.0, 80.0), 170.0);
    }
}
