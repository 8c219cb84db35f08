//! The editable-region normalizer.
//!
//! Keeps a contenteditable region in one of two shapes: placeholder-only
//! (`added`), or real content. Key interception runs synchronously on
//! keydown; content re-evaluation and caret-to-front run at most once per
//! frame through [`FrameThrottle`]s and are flushed by [`Normalizer::run_frame`].

use crate::dom::{
    ClassList, Selector, closest, contains, find_descendant, split_paragraph_at,
    strip_trailing_text, top_level_block,
};
use crate::error::{DomError, NormalizeError};
use crate::keys::{KeyEvent, KeydownResult};
use crate::options::{EnterMode, NormalizeOptions, SuperKey};
use crate::platform::{RegionDom, TextCursor};
use crate::shortcuts::ShortcutMap;
use crate::template::{PlaceholderBlock, Template};
use crate::text::trim;
use crate::throttle::FrameThrottle;

/// What an intercepted key combination does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Suppress the native action while the placeholder is shown.
    Guard,
    /// Guard, then split the current block when real content is present.
    Enter,
}

/// Key combinations intercepted on every region.
pub const KEY_TABLE: &[(&str, Reaction)] = &[
    ("backspace, delete", Reaction::Guard),
    ("enter", Reaction::Enter),
    ("super + a", Reaction::Guard),
    ("right, down", Reaction::Guard),
];

/// Which throttled routine an event feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Promotion/demotion re-evaluation.
    Update,
    /// Caret-to-front while the placeholder is shown.
    Front,
}

/// DOM event types a host must forward, and the routine each one feeds.
pub const CONTENT_EVENTS: &[(&str, Handler)] = &[
    ("keydown", Handler::Update),
    ("paste", Handler::Update),
    ("cut", Handler::Update),
    ("mousedown", Handler::Front),
    ("mousemove", Handler::Front),
    ("touchstart", Handler::Front),
    ("touchmove", Handler::Front),
    ("touchend", Handler::Front),
    ("focus", Handler::Front),
];

/// An event delivered to the region.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionEvent {
    KeyDown(KeyEvent),
    Paste,
    Cut,
    PointerDown,
    PointerMove,
    TouchStart,
    TouchMove,
    TouchEnd,
    Focus,
}

impl RegionEvent {
    /// Map a non-keyboard DOM event type to its event. Keydown needs the
    /// key data and is built by the host.
    pub fn from_type(name: &str) -> Option<Self> {
        let event = match name {
            "paste" => RegionEvent::Paste,
            "cut" => RegionEvent::Cut,
            "mousedown" => RegionEvent::PointerDown,
            "mousemove" => RegionEvent::PointerMove,
            "touchstart" => RegionEvent::TouchStart,
            "touchmove" => RegionEvent::TouchMove,
            "touchend" => RegionEvent::TouchEnd,
            "focus" => RegionEvent::Focus,
            _ => return None,
        };
        Some(event)
    }

    pub fn handler(&self) -> Handler {
        match self {
            RegionEvent::KeyDown(_) | RegionEvent::Paste | RegionEvent::Cut => Handler::Update,
            _ => Handler::Front,
        }
    }

    fn trigger(&self) -> Option<UpdateTrigger> {
        match self {
            RegionEvent::KeyDown(ev) => Some(UpdateTrigger::Key(ev.clone())),
            RegionEvent::Paste => Some(UpdateTrigger::Paste),
            RegionEvent::Cut => Some(UpdateTrigger::Cut),
            _ => None,
        }
    }
}

/// The event that caused a content re-evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateTrigger {
    Key(KeyEvent),
    Paste,
    Cut,
}

/// Outcome of one content evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Placeholder replaced by real content.
    Promoted,
    /// Real content gone; placeholder shown again.
    Demoted,
    /// Placeholder was shown but its text had been damaged; restored.
    Repaired,
    Unchanged,
    /// Modifier-only key, or the normalizer is unbound.
    Skipped,
}

/// Placeholder visibility change, reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderChange {
    Shown,
    Hidden,
}

/// Synchronous result of [`Normalizer::handle_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventResponse {
    pub keydown: KeydownResult,
    /// The host must schedule one frame and call [`Normalizer::run_frame`] in it.
    pub request_frame: bool,
}

impl EventResponse {
    const IGNORED: Self = Self {
        keydown: KeydownResult::NotHandled,
        request_frame: false,
    };
}

/// What a frame flush did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// Result of the pending content evaluation. `None` when nothing was
    /// pending, or the evaluation failed (logged).
    pub update: Option<Transition>,
    /// Whether the caret was moved to the placeholder's start.
    pub front: bool,
}

/// Placeholder/content state machine bound to one region.
pub struct Normalizer<D: RegionDom, C> {
    dom: D,
    cursor: C,
    region: D::Node,
    template: Template,
    block: PlaceholderBlock<D::Node>,
    placeholder: String,
    placeholder_class: String,
    enter_mode: EnterMode,
    added: bool,
    bound: bool,
    shortcuts: ShortcutMap<Reaction>,
    update: FrameThrottle<UpdateTrigger>,
    front: FrameThrottle<()>,
    changes: Vec<PlaceholderChange>,
}

impl<D, C> Normalizer<D, C>
where
    D: RegionDom,
    C: TextCursor<D::Node>,
{
    /// Bind to `region`, adopting its first paragraph or inserting a
    /// placeholder block when the region is empty.
    pub fn new(
        dom: D,
        cursor: C,
        region: D::Node,
        options: &NormalizeOptions,
    ) -> Result<Self, NormalizeError> {
        if !dom.is_element(&region) {
            return Err(NormalizeError::InvalidRegion);
        }
        let template = Template::parse(&options.template)?;

        let is_mac = options.super_key.is_some_and(SuperKey::is_meta);
        let mut shortcuts = ShortcutMap::new(is_mac);
        for (combo, reaction) in KEY_TABLE {
            shortcuts.bind(combo, *reaction)?;
        }

        let adopted = dom.children(&region).into_iter().find_map(|child| {
            find_descendant(&dom, &child, "p").map(|paragraph| PlaceholderBlock {
                wrapper: child,
                paragraph,
            })
        });
        let text = dom.text_content(&region);
        let region_empty = trim(&text).is_empty() || text == options.placeholder;
        let block = match adopted {
            Some(block) => block,
            None => template.instantiate(&dom)?,
        };

        let mut normalizer = Self {
            dom,
            cursor,
            region,
            template,
            block,
            placeholder: options.placeholder.clone(),
            placeholder_class: options.placeholder_class.clone(),
            enter_mode: options.enter,
            added: false,
            bound: true,
            shortcuts,
            update: FrameThrottle::new(),
            front: FrameThrottle::new(),
            changes: Vec::new(),
        };

        if region_empty {
            if !normalizer.block_in_place() {
                normalizer.clear_blank_text()?;
                let first = normalizer.dom.first_child(&normalizer.region);
                normalizer.dom.insert_before(
                    &normalizer.region,
                    &normalizer.block.wrapper,
                    first.as_ref(),
                )?;
            }
            normalizer.dress_placeholder()?;
            normalizer.added = true;
        }

        tracing::debug!(
            added = normalizer.added,
            enter = ?normalizer.enter_mode,
            "normalizer bound"
        );
        Ok(normalizer)
    }

    /// Route one event. Keydown interception is decided immediately; the
    /// throttled routines are queued for the next frame.
    pub fn handle_event(&mut self, event: &RegionEvent) -> EventResponse {
        if !self.bound {
            return EventResponse::IGNORED;
        }
        tracing::trace!(?event, "region event");

        let keydown = match event {
            RegionEvent::KeyDown(ev) => self.intercept(ev),
            _ => KeydownResult::NotHandled,
        };

        let frame_pending = self.update.is_pending() || self.front.is_pending();
        match event.trigger() {
            Some(trigger) => {
                self.update.call(trigger);
            }
            None => {
                self.front.call(());
            }
        }

        EventResponse {
            keydown,
            request_frame: !frame_pending,
        }
    }

    /// Flush both throttles: content evaluation first, then caret-to-front.
    pub fn run_frame(&mut self) -> FrameReport {
        let update = self.update.take().and_then(|trigger| {
            self.evaluate(&trigger)
                .inspect_err(|e| tracing::warn!(error = %e, "content evaluation failed"))
                .ok()
        });
        let front = self.front.take().is_some() && self.caret_to_front();
        FrameReport { update, front }
    }

    /// Run the promotion/demotion policy once, unthrottled.
    pub fn evaluate(&mut self, trigger: &UpdateTrigger) -> Result<Transition, DomError> {
        if !self.bound {
            return Ok(Transition::Skipped);
        }
        if let UpdateTrigger::Key(ev) = trigger {
            if ev.is_modifier_only() {
                return Ok(Transition::Skipped);
            }
        }

        let text = self.dom.text_content(&self.region);
        let blank = trim(&text).is_empty() || text == self.placeholder;
        let single_block = self.dom.children(&self.region).len() <= 1;

        if self.added {
            if text == self.placeholder {
                return Ok(Transition::Unchanged);
            }
            if !blank {
                self.promote()?;
                return Ok(Transition::Promoted);
            }
            if single_block {
                tracing::warn!("placeholder text damaged, restoring");
                self.demote()?;
                return Ok(Transition::Repaired);
            }
            return Ok(Transition::Unchanged);
        }

        if blank && single_block {
            self.demote()?;
            return Ok(Transition::Demoted);
        }
        Ok(Transition::Unchanged)
    }

    /// Change the placeholder string, updating the visible text when shown.
    pub fn set_placeholder(&mut self, text: impl Into<String>) -> Result<(), DomError> {
        self.placeholder = text.into();
        if self.added {
            self.dom
                .set_text_content(&self.block.paragraph, &self.placeholder)?;
        }
        Ok(())
    }

    /// Drop every binding and pending frame work. Later events are ignored
    /// and the DOM is left as it is. Returns `false` when already unbound.
    pub fn unbind(&mut self) -> bool {
        if !self.bound {
            return false;
        }
        let removed = self.shortcuts.unbind(None, None).unwrap_or_default();
        self.update.cancel();
        self.front.cancel();
        self.bound = false;
        tracing::debug!(shortcuts = removed, "normalizer unbound");
        true
    }

    /// Visibility changes since the last call.
    pub fn take_changes(&mut self) -> Vec<PlaceholderChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn is_placeholder_shown(&self) -> bool {
        self.added
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn block(&self) -> &PlaceholderBlock<D::Node> {
        &self.block
    }

    pub fn region(&self) -> &D::Node {
        &self.region
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn enter_mode(&self) -> EnterMode {
        self.enter_mode
    }

    fn intercept(&mut self, event: &KeyEvent) -> KeydownResult {
        let mut result = KeydownResult::NotHandled;
        for reaction in self.shortcuts.dispatch(event) {
            if self.react(reaction).is_handled() {
                result = KeydownResult::Handled;
            }
        }
        result
    }

    fn react(&mut self, reaction: Reaction) -> KeydownResult {
        if self.added {
            return KeydownResult::Handled;
        }
        match (reaction, self.enter_mode) {
            (Reaction::Guard, _) | (Reaction::Enter, EnterMode::Guard) => KeydownResult::NotHandled,
            (Reaction::Enter, EnterMode::SplitBlock) => {
                if let Err(e) = self.split_block() {
                    tracing::warn!(error = %e, "block split failed");
                }
                KeydownResult::Handled
            }
        }
    }

    fn promote(&mut self) -> Result<(), DomError> {
        let paragraph = self.block.paragraph.clone();
        ClassList::new(&self.dom, &paragraph).remove(&self.placeholder_class)?;
        strip_trailing_text(&self.dom, &paragraph, &self.placeholder)?;
        self.added = false;
        if let Err(e) = self.cursor.collapse_to_end(&paragraph) {
            tracing::warn!(error = %e, "could not move caret to end");
        }
        self.changes.push(PlaceholderChange::Hidden);
        tracing::debug!("placeholder promoted to content");
        Ok(())
    }

    fn demote(&mut self) -> Result<(), DomError> {
        if !contains(&self.dom, &self.block.wrapper, &self.block.paragraph) {
            tracing::warn!("placeholder paragraph lost, rebuilding block");
            self.block = self.template.instantiate(&self.dom)?;
        }
        if !self.block_in_place() {
            let first = self.dom.first_child(&self.region);
            self.dom
                .insert_before(&self.region, &self.block.wrapper, first.as_ref())?;
        }
        for child in self.dom.child_nodes(&self.region) {
            if child != self.block.wrapper {
                tracing::warn!(?child, "removing stray region child");
                self.dom.remove(&child)?;
            }
        }

        self.dress_placeholder()?;
        self.dom.normalize(&self.region)?;

        let was_added = std::mem::replace(&mut self.added, true);
        if let Err(e) = self.cursor.collapse_to_start(&self.block.paragraph) {
            tracing::warn!(error = %e, "could not move caret to start");
        }
        if !was_added {
            self.changes.push(PlaceholderChange::Shown);
            tracing::debug!("content demoted to placeholder");
        }
        Ok(())
    }

    fn dress_placeholder(&self) -> Result<(), DomError> {
        ClassList::new(&self.dom, &self.block.paragraph).add(&self.placeholder_class)?;
        self.dom
            .set_text_content(&self.block.paragraph, &self.placeholder)
    }

    fn block_in_place(&self) -> bool {
        self.dom.parent(&self.block.wrapper).as_ref() == Some(&self.region)
    }

    /// Drop whitespace-only text children. Elements are left alone.
    fn clear_blank_text(&self) -> Result<(), DomError> {
        for child in self.dom.child_nodes(&self.region) {
            if self.dom.is_text(&child) && trim(&self.dom.text_content(&child)).is_empty() {
                self.dom.remove(&child)?;
            }
        }
        Ok(())
    }

    fn caret_to_front(&self) -> bool {
        if !self.added {
            return false;
        }
        match self.cursor.collapse_to_start(&self.block.paragraph) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "could not move caret to front");
                false
            }
        }
    }

    /// Split the block under the caret into a fresh template block.
    fn split_block(&mut self) -> Result<(), NormalizeError> {
        if let Err(e) = self.cursor.delete_selection() {
            tracing::warn!(error = %e, "could not delete selection before split");
        }
        let caret = self
            .cursor
            .caret()
            .inspect_err(|e| tracing::warn!(error = %e, "no caret for split"))
            .ok()
            .flatten()
            .filter(|c| contains(&self.dom, &self.region, &c.node));

        let fresh = self.template.instantiate(&self.dom)?;
        let paragraph = caret.as_ref().and_then(|c| {
            closest(&self.dom, &c.node, &Selector::parse("p"), true, Some(&self.region))
        });

        let anchor = match (&caret, &paragraph) {
            (Some(caret), Some(paragraph)) => {
                split_paragraph_at(&self.dom, paragraph, caret, &fresh.paragraph)?;
                self.keep_open(paragraph)?;
                top_level_block(&self.dom, paragraph, &self.region)
            }
            (Some(caret), None) => top_level_block(&self.dom, &caret.node, &self.region),
            _ => None,
        };
        self.keep_open(&fresh.paragraph)?;

        let reference = anchor.and_then(|a| self.dom.next_sibling(&a));
        self.dom
            .insert_before(&self.region, &fresh.wrapper, reference.as_ref())?;
        if let Err(e) = self.cursor.collapse_to_start(&fresh.paragraph) {
            tracing::warn!(error = %e, "could not move caret into new block");
        }
        tracing::debug!("block split");
        Ok(())
    }

    /// Give an emptied paragraph a `<br>` so it keeps its line.
    fn keep_open(&self, paragraph: &D::Node) -> Result<(), DomError> {
        if self.dom.text_content(paragraph).is_empty() && self.dom.children(paragraph).is_empty() {
            let br = self.dom.create_element("br")?;
            self.dom.append_child(paragraph, &br)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{Key, Modifiers};
    use crate::memory::{MemoryDom, NodeId};

    fn bind(html: &str, options: &NormalizeOptions) -> (MemoryDom, NodeId, Normalizer<MemoryDom, MemoryDom>) {
        let dom = MemoryDom::new();
        let region = dom.parse_into_new("div", html).unwrap();
        let n = Normalizer::new(dom.clone(), dom.clone(), region, options).unwrap();
        (dom, region, n)
    }

    #[test]
    fn test_rejects_text_region() {
        let dom = MemoryDom::new();
        let text = dom.text("x");
        let err = Normalizer::new(dom.clone(), dom.clone(), text, &NormalizeOptions::default());
        assert!(matches!(err, Err(NormalizeError::InvalidRegion)));
    }

    #[test]
    fn test_bad_template() {
        let dom = MemoryDom::new();
        let region = dom.element("div");
        let opts = NormalizeOptions::default().with_template("<div></div>");
        let err = Normalizer::new(dom.clone(), dom.clone(), region, &opts);
        assert!(matches!(err, Err(NormalizeError::Template(_))));
    }

    #[test]
    fn test_keydown_interception_follows_state() {
        let (dom, _, mut n) = bind("", &NormalizeOptions::default());
        assert!(n.is_placeholder_shown());

        for key in [Key::Backspace, Key::Delete, Key::Enter, Key::ArrowRight, Key::ArrowDown] {
            let r = n.handle_event(&RegionEvent::KeyDown(KeyEvent::plain(key)));
            assert_eq!(r.keydown, KeydownResult::Handled);
        }
        let select_all = KeyEvent::new(Key::character("a"), Modifiers::CTRL);
        assert!(n.handle_event(&RegionEvent::KeyDown(select_all.clone())).keydown.is_handled());
        let left = KeyEvent::plain(Key::ArrowLeft);
        assert!(!n.handle_event(&RegionEvent::KeyDown(left)).keydown.is_handled());

        n.handle_event(&RegionEvent::Focus);
        n.run_frame();
        dom.type_text("x").unwrap();
        let r = n.handle_event(&RegionEvent::KeyDown(KeyEvent::plain(Key::character("x"))));
        assert!(r.request_frame);
        assert_eq!(n.run_frame().update, Some(Transition::Promoted));

        let keys = [KeyEvent::plain(Key::Backspace), select_all];
        for key in keys {
            assert!(!n.handle_event(&RegionEvent::KeyDown(key)).keydown.is_handled());
        }
    }

    #[test]
    fn test_mac_super_key() {
        let opts = NormalizeOptions::default().with_super_key(SuperKey::Meta);
        let (_, _, mut n) = bind("", &opts);
        let ctrl_a = KeyEvent::new(Key::character("a"), Modifiers::CTRL);
        let cmd_a = KeyEvent::new(Key::character("a"), Modifiers::META);
        assert!(!n.handle_event(&RegionEvent::KeyDown(ctrl_a)).keydown.is_handled());
        assert!(n.handle_event(&RegionEvent::KeyDown(cmd_a)).keydown.is_handled());
    }

    #[test]
    fn test_guard_enter_mode_leaves_enter_native() {
        let opts = NormalizeOptions::default().with_enter(EnterMode::Guard);
        let (_, _, mut n) = bind("<div><p>hi</p></div>", &opts);
        assert!(!n.is_placeholder_shown());
        let r = n.handle_event(&RegionEvent::KeyDown(KeyEvent::plain(Key::Enter)));
        assert_eq!(r.keydown, KeydownResult::NotHandled);
    }

    #[test]
    fn test_one_frame_for_both_throttles() {
        let (_, _, mut n) = bind("", &NormalizeOptions::default());
        assert!(n.handle_event(&RegionEvent::Focus).request_frame);
        assert!(!n.handle_event(&RegionEvent::Paste).request_frame);
        assert!(!n.handle_event(&RegionEvent::PointerDown).request_frame);

        let report = n.run_frame();
        assert_eq!(report.update, Some(Transition::Unchanged));
        assert!(report.front);
        assert_eq!(n.run_frame(), FrameReport::default());
    }

    #[test]
    fn test_unbind_is_idempotent_and_final() {
        let (dom, region, mut n) = bind("", &NormalizeOptions::default());
        n.handle_event(&RegionEvent::Paste);
        assert!(n.unbind());
        assert!(!n.unbind());
        assert_eq!(n.run_frame(), FrameReport::default());

        let before = dom.to_html(&region);
        let r = n.handle_event(&RegionEvent::KeyDown(KeyEvent::plain(Key::Backspace)));
        assert_eq!(r, EventResponse::IGNORED);
        assert_eq!(dom.to_html(&region), before);
    }

    #[test]
    fn test_event_table_covers_every_type() {
        for (name, handler) in CONTENT_EVENTS {
            match RegionEvent::from_type(name) {
                Some(event) => assert_eq!(event.handler(), *handler),
                None => assert_eq!(*name, "keydown"),
            }
        }
    }
}
