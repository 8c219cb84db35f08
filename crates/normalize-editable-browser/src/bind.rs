//! Binding a normalizer to a live contenteditable element.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_events::{EventListener, EventListenerOptions};
use normalize_editable_core::{
    CONTENT_EVENTS, KeydownResult, NormalizeOptions, Normalizer, PlaceholderChange, Session,
};
use web_sys::{HtmlElement, Node};

use crate::cursor::BrowserCursor;
use crate::dom::BrowserDom;
use crate::error::BindError;
use crate::events::region_event_for;
use crate::frame::RafScheduler;
use crate::platform::platform;

type BrowserSession = Session<BrowserDom, BrowserCursor, RafScheduler>;

struct Bound {
    session: BrowserSession,
    listeners: RefCell<Vec<EventListener>>,
}

/// A normalizer bound to a region. Dropping the handle unbinds it.
pub struct NormalizeHandle {
    bound: Rc<Bound>,
    region: HtmlElement,
}

/// Normalize `region` and start listening to its events.
///
/// When `options.super_key` is unset it is filled in from the detected
/// platform.
pub fn bind(region: &HtmlElement, mut options: NormalizeOptions) -> Result<NormalizeHandle, BindError> {
    let window = web_sys::window().ok_or(BindError::NoWindow)?;
    let document = window.document().ok_or(BindError::NoDocument)?;
    if options.super_key.is_none() {
        options.super_key = Some(platform().super_key());
    }

    let dom = BrowserDom::new(document.clone());
    let cursor = BrowserCursor::new(window, document);
    let node: Node = region.clone().into();
    let normalizer = Normalizer::new(dom, cursor, node, &options)?;

    let bound = Rc::new(Bound {
        session: Session::new(normalizer, RafScheduler),
        listeners: RefCell::new(Vec::new()),
    });

    let listeners = CONTENT_EVENTS
        .iter()
        .map(|&(event_type, _)| listen(region, event_type, Rc::downgrade(&bound)))
        .collect();
    *bound.listeners.borrow_mut() = listeners;

    tracing::debug!(events = CONTENT_EVENTS.len(), "region bound");
    Ok(NormalizeHandle {
        bound,
        region: region.clone(),
    })
}

fn listen(region: &HtmlElement, event_type: &'static str, bound: Weak<Bound>) -> EventListener {
    let callback = move |event: &web_sys::Event| {
        let Some(bound) = bound.upgrade() else {
            return;
        };
        let Some(region_event) = region_event_for(event_type, event) else {
            return;
        };
        if bound.session.dispatch(&region_event) == KeydownResult::Handled {
            event.prevent_default();
            event.stop_propagation();
        }
    };

    if event_type == "keydown" {
        EventListener::new_with_options(
            region,
            event_type,
            EventListenerOptions::enable_prevent_default(),
            callback,
        )
    } else {
        EventListener::new(region, event_type, callback)
    }
}

impl NormalizeHandle {
    pub fn region(&self) -> &HtmlElement {
        &self.region
    }

    /// Change the placeholder string, updating the visible text when shown.
    pub fn set_placeholder(&self, text: &str) -> Result<(), BindError> {
        self.bound.session.set_placeholder(text)?;
        Ok(())
    }

    pub fn is_placeholder_shown(&self) -> bool {
        self.bound.session.is_placeholder_shown()
    }

    /// Register a placeholder visibility observer.
    pub fn on_change(&self, observer: impl Fn(PlaceholderChange) + 'static) {
        self.bound.session.on_change(observer);
    }

    /// Detach every listener and shortcut. Safe to call from inside an event
    /// callback: listeners are dropped after the current task. Returns `false`
    /// when already unbound.
    pub fn unbind(&self) -> bool {
        let unbound = self.bound.session.unbind();
        let listeners = std::mem::take(&mut *self.bound.listeners.borrow_mut());
        if !listeners.is_empty() {
            wasm_bindgen_futures::spawn_local(async move {
                drop(listeners);
            });
        }
        unbound
    }
}

impl Drop for NormalizeHandle {
    fn drop(&mut self) {
        self.unbind();
    }
}
