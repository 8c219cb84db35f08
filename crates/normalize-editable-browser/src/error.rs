//! Errors raised while binding a live region.

use normalize_editable_core::{DomError, NormalizeError};
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("no window")]
    NoWindow,

    #[error("no document")]
    NoDocument,

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

impl From<DomError> for BindError {
    fn from(e: DomError) -> Self {
        BindError::Normalize(NormalizeError::Dom(e))
    }
}

/// Readable message for a thrown JS value: the `Error` message when it is
/// one, otherwise its debug form.
pub(crate) fn js_message(value: JsValue) -> String {
    match gloo_utils::errors::JsError::try_from(value) {
        Ok(err) => err.to_string(),
        Err(not_error) => not_error.to_string(),
    }
}

pub(crate) fn platform_error(value: JsValue) -> DomError {
    DomError::Platform(js_message(value))
}
