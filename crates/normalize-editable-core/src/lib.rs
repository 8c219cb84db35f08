//! normalize-editable-core: placeholder/content normalization for editable
//! regions, without browser dependencies.
//!
//! This crate provides:
//! - `RegionDom`, `TextCursor`, `FrameScheduler` platform traits
//! - `Normalizer<D, C>` - the placeholder/content state machine and its key interception
//! - `Session` - frame scheduling and change observers around a normalizer
//! - `ShortcutMap` - key-combination dispatch to typed reactions
//! - `FrameThrottle` - once-per-frame call coalescing
//! - `MemoryDom` / `ManualFrames` - in-memory platform for tests and headless hosts

pub mod dom;
pub mod error;
pub mod keys;
pub mod markup;
pub mod memory;
pub mod normalizer;
pub mod options;
pub mod platform;
pub mod session;
pub mod shortcuts;
pub mod template;
pub mod text;
pub mod throttle;

pub use dom::{ClassList, Selector, closest};
pub use error::{CursorError, DomError, MarkupError, NormalizeError, ShortcutError};
pub use keys::{Key, KeyCombo, KeyEvent, KeydownResult, Modifiers};
pub use markup::{Markup, parse_markup};
pub use memory::{ManualFrames, MemoryDom, MemorySelection, NodeId};
pub use normalizer::{
    CONTENT_EVENTS, EventResponse, FrameReport, Handler, Normalizer, PlaceholderChange,
    RegionEvent, Transition, UpdateTrigger,
};
pub use options::{EnterMode, NormalizeOptions, SuperKey};
pub use platform::{Caret, FrameScheduler, RegionDom, TextCursor};
pub use session::{Session, SessionHandle};
pub use shortcuts::{Pattern, SEQUENCE_TIMEOUT, ShortcutMap};
pub use smol_str::SmolStr;
pub use template::{DEFAULT_TEMPLATE, PlaceholderBlock, Template};
pub use text::trim;
pub use throttle::FrameThrottle;
