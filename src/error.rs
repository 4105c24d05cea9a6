//! Errors raised at the edges of the layout engine.
//!
//! The layout pass itself never fails; these cover decoding input handed over
//! from JavaScript and rejecting unusable configuration.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum GenogramError {
    #[error("invalid {what}: {source}")]
    InvalidInput {
        what: &'static str,
        #[source]
        source: serde_wasm_bindgen::Error,
    },

    #[error("invalid layout configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_wasm_bindgen::Error,
    },
}

impl GenogramError {
    pub(crate) fn input(what: &'static str) -> impl FnOnce(serde_wasm_bindgen::Error) -> Self {
        move |source| Self::InvalidInput { what, source }
    }

    pub(crate) fn serialize(what: &'static str) -> impl FnOnce(serde_wasm_bindgen::Error) -> Self {
        move |source| Self::Serialize { what, source }
    }
}

impl From<GenogramError> for JsValue {
    fn from(err: GenogramError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenogramError>;
