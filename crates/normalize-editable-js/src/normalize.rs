//! Normalize - the region normalizer exposed to JavaScript.

use normalize_editable_browser::{NormalizeHandle, PlaceholderChange, bind};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::types::JsNormalizeOptions;

/// Keeps a contenteditable element in a consistent block structure and shows
/// a placeholder while it is empty.
#[wasm_bindgen]
pub struct Normalize {
    handle: NormalizeHandle,
}

#[wasm_bindgen]
impl Normalize {
    /// Bind to `element`. `options` may be omitted.
    #[wasm_bindgen(constructor)]
    pub fn new(element: HtmlElement, options: JsValue) -> Result<Normalize, JsError> {
        let options: JsNormalizeOptions = if options.is_undefined() || options.is_null() {
            JsNormalizeOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| JsError::new(&format!("Invalid options: {}", e)))?
        };

        let handle = bind(&element, options.into())
            .map_err(|e| JsError::new(&format!("Failed to bind region: {}", e)))?;
        Ok(Self { handle })
    }

    /// Change the placeholder text.
    #[wasm_bindgen(js_name = setPlaceholder)]
    pub fn set_placeholder(&self, text: &str) -> Result<(), JsError> {
        self.handle
            .set_placeholder(text)
            .map_err(|e| JsError::new(&format!("Failed to set placeholder: {}", e)))
    }

    /// Whether the region currently shows the placeholder.
    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.handle.is_placeholder_shown()
    }

    /// Call `callback` with `"shown"` or `"hidden"` whenever the placeholder
    /// appears or disappears.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: js_sys::Function) {
        self.handle.on_change(move |change| {
            let state = match change {
                PlaceholderChange::Shown => "shown",
                PlaceholderChange::Hidden => "hidden",
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(state)) {
                tracing::warn!("onChange callback threw: {:?}", e);
            }
        });
    }

    /// Stop listening to the element. Returns `false` if already unbound.
    #[wasm_bindgen]
    pub fn unbind(&self) -> bool {
        self.handle.unbind()
    }

    #[wasm_bindgen(getter)]
    pub fn element(&self) -> HtmlElement {
        self.handle.region().clone()
    }
}
