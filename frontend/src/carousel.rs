//! Meme carousel: clamped horizontal offset moved by injected buttons, arrow
//! keys, swipes and an auto-scroll timer that bounces between the ends.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent, TouchEvent};

use crate::config::Selectors;
use crate::dom::{self, Listener};
use crate::error::{LandingError, Result};

/// One item width plus the gap between items.
pub const STEP: i32 = 280;
pub const SWIPE_THRESHOLD: i32 = 50;
pub const BUTTON_CLASS: &str = "carousel-btn";

const BUTTON_CSS: &str = "position: absolute; top: 50%; transform: translateY(-50%); \
    background: white; border: none; width: 40px; height: 40px; border-radius: 50%; \
    box-shadow: 0 5px 15px rgba(0,0,0,0.1); cursor: pointer; font-size: 1.2rem; \
    color: var(--primary); z-index: 10; transition: all 0.3s ease;";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

impl Direction {
    fn sign(self) -> i32 {
        match self {
            Direction::Backward => -1,
            Direction::Forward => 1,
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Direction::Backward),
            "ArrowRight" => Some(Direction::Forward),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Carousel {
    offset: i32,
    max_scroll: i32,
    direction: i32,
}

impl Carousel {
    pub fn new(max_scroll: i32) -> Self {
        Self {
            offset: 0,
            max_scroll: max_scroll.max(0),
            direction: 1,
        }
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn max_scroll(&self) -> i32 {
        self.max_scroll
    }

    pub fn direction(&self) -> i32 {
        self.direction
    }

    /// Content or viewport width changed.
    pub fn set_max_scroll(&mut self, max_scroll: i32) {
        self.max_scroll = max_scroll.max(0);
        self.offset = self.clamp(self.offset);
    }

    fn clamp(&self, offset: i32) -> i32 {
        offset.clamp(0, self.max_scroll)
    }

    pub fn step(&mut self, direction: Direction) -> i32 {
        self.offset = self.clamp(self.offset + STEP * direction.sign());
        self.offset
    }

    pub fn on_key(&mut self, key: &str) -> Option<i32> {
        Direction::from_key(key).map(|direction| self.step(direction))
    }

    /// `start_x - end_x` beyond the threshold moves one step; a finger moving
    /// left advances.
    pub fn on_swipe(&mut self, start_x: i32, end_x: i32) -> Option<i32> {
        let diff = start_x - end_x;
        if diff.abs() <= SWIPE_THRESHOLD {
            return None;
        }
        let direction = if diff > 0 {
            Direction::Forward
        } else {
            Direction::Backward
        };
        Some(self.step(direction))
    }

    pub fn auto_advance(&mut self) -> i32 {
        if self.offset >= self.max_scroll {
            self.direction = -1;
        } else if self.offset <= 0 {
            self.direction = 1;
        }
        self.offset = self.clamp(self.offset + STEP * self.direction);
        self.offset
    }
}

struct Shared {
    element: Element,
    state: RefCell<Carousel>,
    touch_start_x: RefCell<i32>,
}

impl Shared {
    fn max_scroll(&self) -> i32 {
        self.element.scroll_width() - self.element.client_width()
    }

    /// Applies a state transition, re-reading the scroll bounds first and
    /// smooth-scrolling to the result.
    fn apply(&self, action: impl FnOnce(&mut Carousel) -> Option<i32>) {
        let mut state = self.state.borrow_mut();
        state.set_max_scroll(self.max_scroll());
        if let Some(offset) = action(&mut *state) {
            dom::smooth_scroll_element_x(&self.element, f64::from(offset));
        }
    }
}

fn make_button(document: &Document, direction: Direction) -> Result<HtmlElement> {
    let (icon, side, label) = match direction {
        Direction::Backward => ("fa-chevron-left", "left", "Scroll left"),
        Direction::Forward => ("fa-chevron-right", "right", "Scroll right"),
    };
    let button = document
        .create_element("button")?
        .dyn_into::<HtmlElement>()
        .map_err(|_| LandingError::Js("button is not an HTMLElement".to_string()))?;
    button.set_inner_html(&format!("<i class=\"fas {}\"></i>", icon));
    button.set_class_name(&format!("{} {}", BUTTON_CLASS, side));
    button.set_attribute("aria-label", label)?;
    button.style().set_css_text(BUTTON_CSS);
    dom::set_style(&button, side, "10px");
    Ok(button)
}

pub struct CarouselController {
    shared: Rc<Shared>,
    buttons: Vec<HtmlElement>,
    _listeners: Vec<Listener>,
    _auto_scroll: Interval,
}

impl CarouselController {
    /// Injects the two buttons and wires every input. Refuses to run on a
    /// carousel that already has injected buttons.
    pub fn install(document: &Document, selectors: &Selectors, interval_ms: u32) -> Result<Self> {
        let element = dom::require(document, &selectors.carousel)?;
        let parent = element
            .parent_element()
            .and_then(|p| p.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| LandingError::missing(format!("{} parent", selectors.carousel)))?;
        if parent
            .query_selector(&format!(".{}", BUTTON_CLASS))?
            .is_some()
        {
            return Err(LandingError::Js(
                "carousel buttons already injected".to_string(),
            ));
        }

        let shared = Rc::new(Shared {
            state: RefCell::new(Carousel::new(
                element.scroll_width() - element.client_width(),
            )),
            element,
            touch_start_x: RefCell::new(0),
        });

        dom::set_style(&parent, "position", "relative");
        let mut buttons = Vec::new();
        let mut listeners = Vec::new();
        for direction in [Direction::Backward, Direction::Forward] {
            let button = make_button(document, direction)?;
            parent.append_child(&button)?;
            let shared = shared.clone();
            listeners.push(Listener::new(&button.clone().into(), "click", move |_: Event| {
                shared.apply(|c| Some(c.step(direction)));
            })?);
            buttons.push(button);
        }

        {
            let shared = shared.clone();
            let document = document.clone();
            let region = selectors.carousel_region.clone();
            listeners.push(Listener::new(
                &document.clone().into(),
                "keydown",
                move |event: Event| {
                    let Some(key) = event.dyn_ref::<KeyboardEvent>().map(|e| e.key()) else {
                        return;
                    };
                    let focused_inside = document
                        .active_element()
                        .and_then(|el| el.closest(&region).ok().flatten())
                        .is_some();
                    if focused_inside {
                        shared.apply(|c| c.on_key(&key));
                    }
                },
            )?);
        }

        {
            let shared = shared.clone();
            listeners.push(Listener::new(
                &shared.element.clone().into(),
                "touchstart",
                {
                    let shared = shared.clone();
                    move |event: Event| {
                        if let Some(x) = first_touch_x(&event) {
                            *shared.touch_start_x.borrow_mut() = x;
                        }
                    }
                },
            )?);
            listeners.push(Listener::new(
                &shared.element.clone().into(),
                "touchend",
                move |event: Event| {
                    if let Some(end_x) = first_touch_x(&event) {
                        let start_x = *shared.touch_start_x.borrow();
                        shared.apply(|c| c.on_swipe(start_x, end_x));
                    }
                },
            )?);
        }

        let auto_scroll = {
            let shared = shared.clone();
            Interval::new(interval_ms, move || {
                shared.apply(|c| Some(c.auto_advance()));
            })
        };

        Ok(Self {
            shared,
            buttons,
            _listeners: listeners,
            _auto_scroll: auto_scroll,
        })
    }
}

impl Drop for CarouselController {
    fn drop(&mut self) {
        for button in &self.buttons {
            button.remove();
        }
    }
}

fn first_touch_x(event: &Event) -> Option<i32> {
    event
        .dyn_ref::<TouchEvent>()
        .and_then(|e| e.changed_touches().get(0))
        .map(|touch| touch.screen_x())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_at_zero_stays_at_zero() {
        let mut carousel = Carousel::new(1000);
        assert_eq!(carousel.step(Direction::Backward), 0);
    }

    #[test]
    fn right_clamps_at_max() {
        let mut carousel = Carousel::new(500);
        assert_eq!(carousel.step(Direction::Forward), 280);
        assert_eq!(carousel.step(Direction::Forward), 500);
        assert_eq!(carousel.step(Direction::Forward), 500);
        assert_eq!(carousel.step(Direction::Backward), 220);
    }

    #[test]
    fn arrow_keys_step_and_other_keys_do_nothing() {
        let mut carousel = Carousel::new(1000);
        assert_eq!(carousel.on_key("ArrowRight"), Some(280));
        assert_eq!(carousel.on_key("ArrowLeft"), Some(0));
        assert_eq!(carousel.on_key("Enter"), None);
        assert_eq!(carousel.offset(), 0);
    }

    #[test]
    fn short_swipes_are_ignored() {
        let mut carousel = Carousel::new(1000);
        assert_eq!(carousel.on_swipe(200, 150), None);
        assert_eq!(carousel.on_swipe(150, 200), None);
        assert_eq!(carousel.offset(), 0);
    }

    #[test]
    fn swipe_left_advances_swipe_right_goes_back() {
        let mut carousel = Carousel::new(1000);
        assert_eq!(carousel.on_swipe(300, 100), Some(280));
        assert_eq!(carousel.on_swipe(100, 300), Some(0));
    }

    #[test]
    fn auto_advance_bounces_between_ends() {
        let mut carousel = Carousel::new(600);
        let offsets: Vec<i32> = (0..6).map(|_| carousel.auto_advance()).collect();
        assert_eq!(offsets, vec![280, 560, 600, 320, 40, 0]);
        assert_eq!(carousel.auto_advance(), 280);
        assert_eq!(carousel.direction(), 1);
    }

    #[test]
    fn auto_advance_with_nothing_to_scroll() {
        let mut carousel = Carousel::new(0);
        for _ in 0..4 {
            assert_eq!(carousel.auto_advance(), 0);
        }
    }

    #[test]
    fn negative_bounds_treated_as_zero() {
        let carousel = Carousel::new(-40);
        assert_eq!(carousel.max_scroll(), 0);
    }

    #[test]
    fn shrinking_reclamps_offset() {
        let mut carousel = Carousel::new(1000);
        carousel.step(Direction::Forward);
        carousel.step(Direction::Forward);
        carousel.set_max_scroll(300);
        assert_eq!(carousel.offset(), 300);
    }
}
