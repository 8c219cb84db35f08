//! Normalizer configuration.

use serde::{Deserialize, Serialize};

use crate::template::DEFAULT_TEMPLATE;

/// Default placeholder: a single zero-width space.
pub const DEFAULT_PLACEHOLDER: &str = "\u{200B}";

/// Default class marking the placeholder paragraph.
pub const DEFAULT_PLACEHOLDER_CLASS: &str = "placeholder";

/// How Enter is handled while the region holds real content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnterMode {
    /// Split the current block at the caret into a new template block.
    #[default]
    SplitBlock,
    /// Only suppress Enter while the placeholder is shown.
    Guard,
}

/// Which physical modifier `super` means in key combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuperKey {
    Ctrl,
    Meta,
}

impl SuperKey {
    pub fn for_platform(is_mac: bool) -> Self {
        if is_mac { SuperKey::Meta } else { SuperKey::Ctrl }
    }

    pub fn is_meta(self) -> bool {
        matches!(self, SuperKey::Meta)
    }
}

/// Options accepted when binding a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizeOptions {
    /// Text shown while the region is empty.
    pub placeholder: String,
    /// Block markup cloned for the placeholder and for new blocks.
    pub template: String,
    pub placeholder_class: String,
    pub enter: EnterMode,
    /// `None` lets the host decide (the browser crate sniffs the platform).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub super_key: Option<SuperKey>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            template: DEFAULT_TEMPLATE.to_string(),
            placeholder_class: DEFAULT_PLACEHOLDER_CLASS.to_string(),
            enter: EnterMode::default(),
            super_key: None,
        }
    }
}

impl NormalizeOptions {
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_placeholder_class(mut self, class: impl Into<String>) -> Self {
        self.placeholder_class = class.into();
        self
    }

    pub fn with_enter(mut self, enter: EnterMode) -> Self {
        self.enter = enter;
        self
    }

    pub fn with_super_key(mut self, super_key: SuperKey) -> Self {
        self.super_key = Some(super_key);
        self
    }
}
