use log::Level;
use serde::Deserialize;
use wasm_bindgen::JsValue;
use web_sys::Document;

use crate::error::Result;

/// Id of the optional inline `<script type="application/json">` block that
/// overrides the defaults below.
pub const CONFIG_ELEMENT_ID: &str = "landing-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

/// Selectors for the DOM contract the page script relies on.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub header: String,
    pub menu_button: String,
    pub nav_links: String,
    pub nav_link_anchors: String,
    pub in_page_anchors: String,
    pub contract_text: String,
    pub copy_button: String,
    pub current_price: String,
    pub price_change: String,
    pub price_icon: String,
    pub carousel: String,
    pub carousel_region: String,
    pub hero: String,
    pub animated: String,
    pub hover_lift: String,
    pub loading_links: String,
    pub logos: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            header: "header".to_string(),
            menu_button: ".mobile-menu-btn".to_string(),
            nav_links: ".nav-links".to_string(),
            nav_link_anchors: ".nav-links a".to_string(),
            in_page_anchors: "a[href^=\"#\"]".to_string(),
            contract_text: "#contract".to_string(),
            copy_button: "#copy-btn".to_string(),
            current_price: "#current-price".to_string(),
            price_change: "#price-change".to_string(),
            price_icon: "#price-icon".to_string(),
            carousel: ".meme-carousel".to_string(),
            carousel_region: "#community".to_string(),
            hero: ".hero".to_string(),
            animated: ".tokenomics-card, .step, .timeline-item, .legend-item, .pie-chart"
                .to_string(),
            hover_lift: ".btn, .copy-btn, .social-icon".to_string(),
            loading_links: "a[href*=\"uniswap\"], a[href*=\"buy\"]".to_string(),
            logos: ".logo-img, .hero-logo, .footer-logo-img".to_string(),
        }
    }
}

/// Delays and periods, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub copied_feedback_ms: u32,
    pub toast_visible_ms: u32,
    pub toast_exit_ms: u32,
    pub ticker_interval_ms: u32,
    pub carousel_interval_ms: u32,
    pub reveal_initial_check_ms: u32,
    pub loading_reset_ms: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            copied_feedback_ms: 2_000,
            toast_visible_ms: 3_000,
            toast_exit_ms: 300,
            ticker_interval_ms: 15_000,
            carousel_interval_ms: 5_000,
            reveal_initial_check_ms: 100,
            loading_reset_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LandingConfig {
    pub selectors: Selectors,
    pub timings: Timings,
    pub max_toasts: usize,
    pub service_worker_url: Option<String>,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            selectors: Selectors::default(),
            timings: Timings::default(),
            max_toasts: 5,
            service_worker_url: Some("/sw.js".to_string()),
        }
    }
}

impl LandingConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_js(value: JsValue) -> Result<Self> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_wasm_bindgen::from_value(value)?)
    }

    /// Reads the inline config block if the page has one. A malformed block
    /// is logged and ignored.
    pub fn from_document(document: &Document) -> Self {
        let Some(raw) = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        else {
            return Self::default();
        };

        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring #{}: {}", CONFIG_ELEMENT_ID, e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = LandingConfig::from_json("{}").unwrap();
        assert_eq!(config, LandingConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = LandingConfig::from_json(
            r##"{"timings": {"ticker_interval_ms": 1000}, "selectors": {"carousel": "#memes"}}"##,
        )
        .unwrap();
        assert_eq!(config.timings.ticker_interval_ms, 1000);
        assert_eq!(config.timings.carousel_interval_ms, 5_000);
        assert_eq!(config.selectors.carousel, "#memes");
        assert_eq!(config.selectors.header, "header");
        assert_eq!(config.max_toasts, 5);
    }

    #[test]
    fn service_worker_can_be_disabled() {
        let config = LandingConfig::from_json(r#"{"service_worker_url": null}"#).unwrap();
        assert_eq!(config.service_worker_url, None);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        assert!(LandingConfig::from_json(r#"{"theme": "dark"}"#).is_ok());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(LandingConfig::from_json("{ nope").is_err());
    }
}
