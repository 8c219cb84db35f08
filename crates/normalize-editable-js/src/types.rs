//! Types exposed to JavaScript via wasm-bindgen.

use normalize_editable_core::{EnterMode, NormalizeOptions, SuperKey};
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// What Enter does while content is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub enum JsEnterMode {
    SplitBlock,
    Guard,
}

/// Which physical modifier a `super` shortcut means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub enum JsSuperKey {
    Ctrl,
    Meta,
}

/// Options accepted by the `Normalize` constructor. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsNormalizeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[tsify(optional)]
    pub placeholder: Option<String>,
    /// Markup for the placeholder block; must contain exactly one `<p>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[tsify(optional)]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[tsify(optional)]
    pub placeholder_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[tsify(optional)]
    pub enter: Option<JsEnterMode>,
    /// Detected from the platform when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[tsify(optional)]
    pub super_key: Option<JsSuperKey>,
}

impl From<JsEnterMode> for EnterMode {
    fn from(mode: JsEnterMode) -> Self {
        match mode {
            JsEnterMode::SplitBlock => EnterMode::SplitBlock,
            JsEnterMode::Guard => EnterMode::Guard,
        }
    }
}

impl From<JsSuperKey> for SuperKey {
    fn from(key: JsSuperKey) -> Self {
        match key {
            JsSuperKey::Ctrl => SuperKey::Ctrl,
            JsSuperKey::Meta => SuperKey::Meta,
        }
    }
}

impl From<JsNormalizeOptions> for NormalizeOptions {
    fn from(js: JsNormalizeOptions) -> Self {
        let mut options = NormalizeOptions::default();
        if let Some(placeholder) = js.placeholder {
            options.placeholder = placeholder;
        }
        if let Some(template) = js.template {
            options.template = template;
        }
        if let Some(class) = js.placeholder_class {
            options.placeholder_class = class;
        }
        if let Some(enter) = js.enter {
            options.enter = enter.into();
        }
        options.super_key = js.super_key.map(SuperKey::from);
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_options_keep_defaults() {
        let js = JsNormalizeOptions {
            placeholder: Some("Type here".into()),
            enter: Some(JsEnterMode::Guard),
            ..Default::default()
        };
        let options = NormalizeOptions::from(js);
        assert_eq!(options.placeholder, "Type here");
        assert_eq!(options.enter, EnterMode::Guard);
        assert_eq!(options.template, NormalizeOptions::default().template);
        assert_eq!(options.super_key, None);
    }
}
