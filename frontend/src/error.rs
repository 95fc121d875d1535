use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Error, Debug)]
pub enum LandingError {
    #[error("no global `window` available")]
    NoWindow,

    #[error("no `document` on window")]
    NoDocument,

    #[error("element not found: {selector}")]
    MissingElement { selector: String },

    #[error("element {selector} is not a {expected}")]
    WrongElementType {
        selector: String,
        expected: &'static str,
    },

    #[error("javascript error: {0}")]
    Js(String),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("config conversion error: {0}")]
    ConfigValue(#[from] serde_wasm_bindgen::Error),

    #[error("page is not mounted")]
    NotMounted,
}

impl LandingError {
    pub fn missing(selector: impl Into<String>) -> Self {
        LandingError::MissingElement {
            selector: selector.into(),
        }
    }
}

impl From<JsValue> for LandingError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                value
                    .dyn_ref::<web_sys::js_sys::Error>()
                    .map(|e| String::from(e.message()))
            })
            .unwrap_or_else(|| format!("{:?}", value));
        LandingError::Js(message)
    }
}

impl From<LandingError> for JsValue {
    fn from(err: LandingError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LandingError>;
