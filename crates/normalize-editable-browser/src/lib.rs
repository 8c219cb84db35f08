//! Browser DOM layer for normalize-editable.
//!
//! Implements the core's platform traits over `web-sys` and binds a
//! [`Normalizer`] to a live contenteditable element. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `dom`: `RegionDom` over `web_sys::Node`
//! - `cursor`: Selection API caret placement
//! - `frame`: `requestAnimationFrame` scheduling
//! - `events`: keydown and content event conversion
//! - `bind`: listener wiring and the [`NormalizeHandle`]
//! - `platform`: OS detection for the `super` modifier
//!
//! # Re-exports
//!
//! This crate re-exports `normalize-editable-core` for convenience, so
//! consumers only need to depend on `normalize-editable-browser`.

pub use normalize_editable_core;
pub use normalize_editable_core::*;

pub mod bind;
pub mod cursor;
pub mod dom;
pub mod error;
pub mod events;
pub mod frame;
pub mod platform;

pub use bind::{NormalizeHandle, bind};
pub use cursor::BrowserCursor;
pub use dom::BrowserDom;
pub use error::BindError;
pub use events::{parse_dom_key, region_event_for};
pub use frame::{RafScheduler, request_or_run};
pub use platform::{Platform, platform};
