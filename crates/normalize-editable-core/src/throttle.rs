//! Per-frame call coalescing.
//!
//! A burst of calls within one rendering frame collapses into a single
//! trailing invocation that sees the arguments of the last call.

/// Coalescing state.
#[derive(Debug, Clone, PartialEq)]
enum ThrottleState<A> {
    Idle,
    Pending(A),
}

/// Coalesces calls until the next frame flush.
#[derive(Debug, Clone)]
pub struct FrameThrottle<A> {
    state: ThrottleState<A>,
    coalesced: usize,
}

impl<A> Default for FrameThrottle<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> FrameThrottle<A> {
    pub fn new() -> Self {
        Self {
            state: ThrottleState::Idle,
            coalesced: 0,
        }
    }

    /// Record a call. Returns `true` on the idle-to-pending edge, when the
    /// caller must schedule a frame; later calls in the same frame only
    /// replace the stored arguments.
    pub fn call(&mut self, args: A) -> bool {
        let was_idle = matches!(self.state, ThrottleState::Idle);
        if !was_idle {
            self.coalesced += 1;
        }
        self.state = ThrottleState::Pending(args);
        was_idle
    }

    /// Flush at frame time, yielding the last arguments if a call is pending.
    pub fn take(&mut self) -> Option<A> {
        match std::mem::replace(&mut self.state, ThrottleState::Idle) {
            ThrottleState::Idle => None,
            ThrottleState::Pending(args) => {
                if self.coalesced > 0 {
                    tracing::trace!(coalesced = self.coalesced, "frame throttle flushed burst");
                }
                self.coalesced = 0;
                Some(args)
            }
        }
    }

    /// Drop a pending call without running it.
    pub fn cancel(&mut self) {
        self.state = ThrottleState::Idle;
        self.coalesced = 0;
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, ThrottleState::Pending(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_keeps_last_args() {
        let mut t = FrameThrottle::new();
        assert!(t.call(1));
        assert!(!t.call(2));
        assert!(!t.call(3));
        assert!(t.is_pending());

        assert_eq!(t.take(), Some(3));
        assert_eq!(t.take(), None);

        // Next frame starts a fresh burst.
        assert!(t.call(4));
    }

    #[test]
    fn test_cancel() {
        let mut t = FrameThrottle::new();
        t.call("x");
        t.cancel();
        assert!(!t.is_pending());
        assert_eq!(t.take(), None);
    }
}
