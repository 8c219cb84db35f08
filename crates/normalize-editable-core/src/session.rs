//! Event-loop wiring for a [`Normalizer`].
//!
//! A session owns the normalizer behind `Rc<RefCell<..>>`, requests frames
//! from a [`FrameScheduler`] when the normalizer asks for one, and notifies
//! observers of placeholder visibility changes once the normalizer is no
//! longer borrowed. Observers may therefore call back into the session.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::{DomError, NormalizeError};
use crate::keys::KeydownResult;
use crate::normalizer::{FrameReport, Normalizer, PlaceholderChange, RegionEvent};
use crate::options::NormalizeOptions;
use crate::platform::{FrameScheduler, RegionDom, TextCursor};

type Observer = Rc<dyn Fn(PlaceholderChange)>;

struct Shared<D: RegionDom, C> {
    normalizer: RefCell<Normalizer<D, C>>,
    observers: RefCell<Vec<Observer>>,
}

impl<D, C> Shared<D, C>
where
    D: RegionDom,
    C: TextCursor<D::Node>,
{
    fn flush(&self) -> FrameReport {
        let (report, changes) = {
            let mut normalizer = self.normalizer.borrow_mut();
            let report = normalizer.run_frame();
            (report, normalizer.take_changes())
        };
        if !changes.is_empty() {
            let observers = self.observers.borrow().clone();
            for change in changes {
                for observer in &observers {
                    observer(change);
                }
            }
        }
        report
    }

    fn unbind(&self) -> bool {
        let unbound = self.normalizer.borrow_mut().unbind();
        if unbound {
            self.observers.borrow_mut().clear();
        }
        unbound
    }
}

/// A bound region driven by a frame scheduler.
pub struct Session<D: RegionDom, C, S> {
    shared: Rc<Shared<D, C>>,
    scheduler: S,
}

impl<D, C, S> Session<D, C, S>
where
    D: RegionDom + 'static,
    C: TextCursor<D::Node> + 'static,
    S: FrameScheduler,
{
    pub fn new(normalizer: Normalizer<D, C>, scheduler: S) -> Self {
        Self {
            shared: Rc::new(Shared {
                normalizer: RefCell::new(normalizer),
                observers: RefCell::new(Vec::new()),
            }),
            scheduler,
        }
    }

    /// Build the normalizer and wrap it in one step.
    pub fn bind(
        dom: D,
        cursor: C,
        region: D::Node,
        options: &NormalizeOptions,
        scheduler: S,
    ) -> Result<Self, NormalizeError> {
        Ok(Self::new(Normalizer::new(dom, cursor, region, options)?, scheduler))
    }

    /// Deliver an event. A frame is requested when the normalizer needs one;
    /// the returned value tells keydown hosts whether to prevent the default.
    pub fn dispatch(&self, event: &RegionEvent) -> KeydownResult {
        let response = self.shared.normalizer.borrow_mut().handle_event(event);
        if response.request_frame {
            let weak: Weak<Shared<D, C>> = Rc::downgrade(&self.shared);
            self.scheduler.request_frame(Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.flush();
                }
            }));
        }
        response.keydown
    }

    /// Flush pending frame work now, outside the scheduler.
    pub fn flush_frame(&self) -> FrameReport {
        self.shared.flush()
    }

    /// Register a visibility observer.
    pub fn on_change(&self, observer: impl Fn(PlaceholderChange) + 'static) {
        self.shared.observers.borrow_mut().push(Rc::new(observer));
    }

    pub fn set_placeholder(&self, text: impl Into<String>) -> Result<(), DomError> {
        self.shared.normalizer.borrow_mut().set_placeholder(text)
    }

    /// Unbind the normalizer and drop observers. Returns `false` when
    /// already unbound.
    pub fn unbind(&self) -> bool {
        self.shared.unbind()
    }

    pub fn is_placeholder_shown(&self) -> bool {
        self.shared.normalizer.borrow().is_placeholder_shown()
    }

    /// Inspect the normalizer.
    pub fn with_normalizer<R>(&self, f: impl FnOnce(&Normalizer<D, C>) -> R) -> R {
        f(&self.shared.normalizer.borrow())
    }

    /// A handle that dispatches into this session from event callbacks.
    pub fn handle(&self) -> SessionHandle<D, C> {
        SessionHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }
}

/// Weak reference to a session's normalizer, for use inside callbacks that
/// must not keep the session alive.
pub struct SessionHandle<D: RegionDom, C> {
    shared: Weak<Shared<D, C>>,
}

impl<D: RegionDom, C> Clone for SessionHandle<D, C> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<D, C> SessionHandle<D, C>
where
    D: RegionDom,
    C: TextCursor<D::Node>,
{
    /// Unbind from inside an observer or event callback. Returns `false`
    /// when the session is gone or already unbound.
    pub fn unbind(&self) -> bool {
        self.shared.upgrade().is_some_and(|shared| shared.unbind())
    }

    pub fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }
}
