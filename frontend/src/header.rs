//! Header restyling, hide-on-scroll and hero parallax.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Document, Event, HtmlElement, Window};

use crate::config::Selectors;
use crate::dom::{self, Listener};
use crate::error::Result;

pub const SCROLLED_THRESHOLD: f64 = 100.0;
pub const HIDE_THRESHOLD: f64 = 200.0;
pub const PARALLAX_RATE: f64 = -0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStyle {
    Top,
    Scrolled,
}

impl HeaderStyle {
    pub fn background(self) -> &'static str {
        match self {
            HeaderStyle::Top => "rgba(255, 255, 255, 0.95)",
            HeaderStyle::Scrolled => "rgba(255, 255, 255, 0.98)",
        }
    }

    pub fn box_shadow(self) -> &'static str {
        match self {
            HeaderStyle::Top => "0 5px 20px rgba(0, 0, 0, 0.05)",
            HeaderStyle::Scrolled => "0 5px 20px rgba(0, 0, 0, 0.1)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderView {
    pub style: HeaderStyle,
    pub visible: bool,
}

impl HeaderView {
    pub fn transform(&self) -> &'static str {
        if self.visible {
            "translateY(0)"
        } else {
            "translateY(-100%)"
        }
    }
}

/// Keeps the previous sample so direction can be inferred. There is no
/// hysteresis: a one pixel move down past 200px hides the header.
#[derive(Debug, Default)]
pub struct ScrollReactor {
    last_scroll: f64,
}

impl ScrollReactor {
    pub fn on_scroll(&mut self, current: f64) -> HeaderView {
        let view = if current < SCROLLED_THRESHOLD {
            HeaderView {
                style: HeaderStyle::Top,
                visible: true,
            }
        } else {
            let scrolling_down = current > self.last_scroll;
            HeaderView {
                style: HeaderStyle::Scrolled,
                visible: !(scrolling_down && current > HIDE_THRESHOLD),
            }
        };
        self.last_scroll = current;
        view
    }

    pub fn last_scroll(&self) -> f64 {
        self.last_scroll
    }
}

pub fn parallax_offset(scroll_y: f64) -> f64 {
    scroll_y * PARALLAX_RATE
}

pub fn parallax_background_position(scroll_y: f64) -> String {
    format!("center {}px", parallax_offset(scroll_y))
}

pub struct HeaderEffects {
    _listeners: Vec<Listener>,
}

impl HeaderEffects {
    pub fn install(window: &Window, document: &Document, selectors: &Selectors) -> Result<Self> {
        let mut listeners = Vec::new();

        match dom::query(document, &selectors.header)?.and_then(|h| h.dyn_into::<HtmlElement>().ok()) {
            Some(header) => {
                let reactor = Rc::new(RefCell::new(ScrollReactor::default()));
                let source = window.clone();
                listeners.push(Listener::new(&window.clone().into(), "scroll", move |_: Event| {
                    let current = source.page_y_offset().unwrap_or(0.0);
                    let view = reactor.borrow_mut().on_scroll(current);
                    dom::set_style(&header, "background", view.style.background());
                    dom::set_style(&header, "box-shadow", view.style.box_shadow());
                    dom::set_style(&header, "transform", view.transform());
                })?);
            }
            None => log::warn!("no {} on page, header effects disabled", selectors.header),
        }

        // The hero is looked up on every event, it may be swapped out later.
        let source = window.clone();
        let hero_selector = selectors.hero.clone();
        let document = document.clone();
        listeners.push(Listener::new(&window.clone().into(), "scroll", move |_: Event| {
            let hero = document
                .query_selector(&hero_selector)
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into::<HtmlElement>().ok());
            if let Some(hero) = hero {
                let scrolled = source.page_y_offset().unwrap_or(0.0);
                dom::set_style(&hero, "background-position", &parallax_background_position(scrolled));
            }
        })?);

        Ok(Self {
            _listeners: listeners,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_top_is_visible_with_top_style() {
        let mut reactor = ScrollReactor::default();
        let view = reactor.on_scroll(50.0);
        assert_eq!(view.style, HeaderStyle::Top);
        assert!(view.visible);
        assert_eq!(view.transform(), "translateY(0)");
    }

    #[test]
    fn threshold_itself_counts_as_scrolled() {
        let mut reactor = ScrollReactor::default();
        assert_eq!(reactor.on_scroll(100.0).style, HeaderStyle::Scrolled);
        assert_eq!(reactor.on_scroll(99.0).style, HeaderStyle::Top);
    }

    #[test]
    fn scrolling_down_between_thresholds_keeps_header() {
        let mut reactor = ScrollReactor::default();
        reactor.on_scroll(120.0);
        let view = reactor.on_scroll(180.0);
        assert_eq!(view.style, HeaderStyle::Scrolled);
        assert!(view.visible);
    }

    #[test]
    fn scrolling_down_past_hide_threshold_hides() {
        let mut reactor = ScrollReactor::default();
        reactor.on_scroll(150.0);
        let view = reactor.on_scroll(400.0);
        assert!(!view.visible);
        assert_eq!(view.transform(), "translateY(-100%)");
    }

    #[test]
    fn any_upward_move_shows_again() {
        let mut reactor = ScrollReactor::default();
        reactor.on_scroll(800.0);
        assert!(!reactor.on_scroll(900.0).visible);
        assert!(reactor.on_scroll(899.0).visible);
        // single pixel wobble flips it back
        assert!(!reactor.on_scroll(900.0).visible);
    }

    #[test]
    fn returning_to_top_resets_style() {
        let mut reactor = ScrollReactor::default();
        reactor.on_scroll(500.0);
        reactor.on_scroll(900.0);
        let view = reactor.on_scroll(10.0);
        assert_eq!(view.style, HeaderStyle::Top);
        assert!(view.visible);
        assert_eq!(reactor.last_scroll(), 10.0);
    }

    #[test]
    fn parallax_moves_at_half_speed_upwards() {
        assert_eq!(parallax_offset(0.0), 0.0);
        assert_eq!(parallax_offset(300.0), -150.0);
        assert_eq!(parallax_background_position(300.0), "center -150px");
    }
}
