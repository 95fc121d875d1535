//! Simulated token price display. There is no price feed: each tick applies
//! a random move of at most five percent to the previous value.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use web_sys::{Document, Element, HtmlElement};

use crate::config::Selectors;
use crate::dom;
use crate::error::Result;

pub const BASE_PRICE: f64 = 0.000_000_1;
pub const SEED_SPREAD: f64 = 0.000_000_05;
pub const MAX_MOVE_PERCENT: f64 = 5.0;
pub const PRICE_DECIMALS: usize = 10;

/// Source of uniform numbers in `[0, 1)`.
pub trait Entropy {
    fn next_unit(&mut self) -> f64;
}

/// `Math.random()` from the host page.
pub struct MathRandom;

impl Entropy for MathRandom {
    fn next_unit(&mut self) -> f64 {
        web_sys::js_sys::Math::random()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn icon_class(self) -> &'static str {
        match self {
            Trend::Up => "fas fa-arrow-up",
            Trend::Down => "fas fa-arrow-down",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Trend::Up => "var(--success)",
            Trend::Down => "var(--primary)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickerView {
    pub price_text: String,
    pub change_text: String,
    pub trend: Trend,
}

pub fn format_price(price: f64) -> String {
    format!("${:.*}", PRICE_DECIMALS, price)
}

pub fn parse_price(text: &str) -> Option<f64> {
    text.trim()
        .trim_start_matches('$')
        .replace(',', "")
        .parse()
        .ok()
}

pub fn format_change(change: f64) -> String {
    // -0.0 would otherwise print as "+-0.00%"
    let change = if change == 0.0 { 0.0 } else { change };
    let sign = if change >= 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, change)
}

pub fn trend_of(change: f64) -> Trend {
    if change >= 0.0 {
        Trend::Up
    } else {
        Trend::Down
    }
}

/// Maps a unit random draw onto a percentage move in `[-5, 5)`.
pub fn unit_to_percent(unit: f64) -> f64 {
    (unit - 0.5) * MAX_MOVE_PERCENT * 2.0
}

/// Snaps a price to what the display can show, so the stored value and the
/// rendered text always agree.
fn snap(price: f64) -> f64 {
    parse_price(&format_price(price)).unwrap_or(price)
}

#[derive(Debug, Clone)]
pub struct PriceTicker {
    price: f64,
    last_change: f64,
}

impl PriceTicker {
    pub fn new(price: f64) -> Self {
        Self {
            price: snap(price),
            last_change: 0.0,
        }
    }

    /// Starting price near [`BASE_PRICE`].
    pub fn seeded(entropy: &mut impl Entropy) -> Self {
        let variation = (entropy.next_unit() - 0.5) * SEED_SPREAD;
        Self::new(BASE_PRICE + variation)
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn last_change(&self) -> f64 {
        self.last_change
    }

    pub fn apply(&mut self, change_percent: f64) -> TickerView {
        self.price = snap(self.price * (1.0 + change_percent / 100.0));
        self.last_change = change_percent;
        self.view()
    }

    pub fn tick(&mut self, entropy: &mut impl Entropy) -> TickerView {
        let change = unit_to_percent(entropy.next_unit());
        self.apply(change)
    }

    pub fn view(&self) -> TickerView {
        TickerView {
            price_text: format_price(self.price),
            change_text: format_change(self.last_change),
            trend: trend_of(self.last_change),
        }
    }
}

struct TickerElements {
    price: Element,
    change: HtmlElement,
    icon: HtmlElement,
}

impl TickerElements {
    fn render(&self, view: &TickerView) {
        self.price.set_text_content(Some(&view.price_text));
        self.change.set_text_content(Some(&view.change_text));
        dom::set_style(&self.change, "color", view.trend.color());
        self.icon.set_class_name(view.trend.icon_class());
        dom::set_style(&self.icon, "color", view.trend.color());
    }
}

pub struct TickerHandle {
    ticker: Rc<RefCell<PriceTicker>>,
    _interval: Interval,
}

impl TickerHandle {
    pub fn install(document: &Document, selectors: &Selectors, interval_ms: u32) -> Result<Self> {
        let elements = TickerElements {
            price: dom::require(document, &selectors.current_price)?,
            change: dom::require_html(document, &selectors.price_change)?,
            icon: dom::require_html(document, &selectors.price_icon)?,
        };

        let mut entropy = MathRandom;
        let mut ticker = PriceTicker::seeded(&mut entropy);
        elements.price.set_text_content(Some(&format_price(ticker.price())));
        let view = ticker.tick(&mut entropy);
        elements.render(&view);

        let ticker = Rc::new(RefCell::new(ticker));
        let interval = {
            let ticker = ticker.clone();
            Interval::new(interval_ms, move || {
                let view = ticker.borrow_mut().tick(&mut MathRandom);
                elements.render(&view);
            })
        };

        Ok(Self {
            ticker,
            _interval: interval,
        })
    }

    pub fn price(&self) -> f64 {
        self.ticker.borrow().price()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<f64>);

    impl Entropy for Fixed {
        fn next_unit(&mut self) -> f64 {
            self.0.remove(0)
        }
    }

    #[test]
    fn price_has_exactly_ten_decimals() {
        let text = format_price(0.000_000_123_456_789_9);
        assert_eq!(text, "$0.0000001235");
        assert_eq!(text.split('.').nth(1).map(str::len), Some(10));
    }

    #[test]
    fn parse_accepts_dollar_and_commas() {
        assert_eq!(parse_price("$1,234.5"), Some(1234.5));
        assert_eq!(parse_price(" $0.0000001000 "), Some(0.0000001));
        assert_eq!(parse_price("n/a"), None);
    }

    #[test]
    fn next_price_is_displayed_times_delta() {
        for displayed in [0.0000001, 0.000000123, 1.5, 42.0] {
            for d in [-5.0, -1.25, 0.0, 2.5, 4.99] {
                let mut ticker = PriceTicker::new(displayed);
                let p = parse_price(&ticker.view().price_text).unwrap();
                let view = ticker.apply(d);
                assert_eq!(view.price_text, format_price(p * (1.0 + d / 100.0)));
            }
        }
    }

    #[test]
    fn stored_price_matches_rendered_text() {
        let mut ticker = PriceTicker::new(BASE_PRICE);
        for d in [3.3, -4.1, 0.7, -0.2] {
            let view = ticker.apply(d);
            assert_eq!(parse_price(&view.price_text), Some(ticker.price()));
        }
    }

    #[test]
    fn change_label_sign_matches_trend() {
        for change in [-4.99, -0.5, -0.001, 0.0, -0.0, 0.001, 3.2, 5.0] {
            let label = format_change(change);
            let trend = trend_of(change);
            if label.starts_with('-') {
                assert_eq!(trend, Trend::Down, "{}", label);
            } else {
                assert!(label.starts_with('+'), "{}", label);
                assert_eq!(trend, Trend::Up, "{}", label);
            }
        }
    }

    #[test]
    fn zero_change_is_upward() {
        assert_eq!(format_change(0.0), "+0.00%");
        assert_eq!(format_change(-0.0), "+0.00%");
        assert_eq!(trend_of(0.0), Trend::Up);
        assert_eq!(Trend::Up.icon_class(), "fas fa-arrow-up");
    }

    #[test]
    fn random_draws_stay_within_five_percent() {
        assert_eq!(unit_to_percent(0.0), -5.0);
        assert_eq!(unit_to_percent(0.5), 0.0);
        assert!(unit_to_percent(0.999_999) < 5.0);
    }

    #[test]
    fn seed_lands_near_base() {
        let low = PriceTicker::seeded(&mut Fixed(vec![0.0]));
        let high = PriceTicker::seeded(&mut Fixed(vec![0.999_999]));
        assert!((low.price() - 0.000_000_075).abs() < 1e-10);
        assert!(high.price() <= 0.000_000_125);
    }

    #[test]
    fn tick_uses_entropy() {
        let mut ticker = PriceTicker::new(1.0);
        let view = ticker.tick(&mut Fixed(vec![0.75]));
        assert_eq!(ticker.last_change(), 2.5);
        assert_eq!(view.price_text, "$1.0250000000");
        assert_eq!(view.change_text, "+2.50%");
        assert_eq!(view.trend, Trend::Up);

        let view = ticker.tick(&mut Fixed(vec![0.25]));
        assert_eq!(view.change_text, "-2.50%");
        assert_eq!(view.trend, Trend::Down);
        assert_eq!(view.trend.color(), "var(--primary)");
    }
}
