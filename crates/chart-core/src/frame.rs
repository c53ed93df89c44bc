// File: crates/chart-core/src/frame.rs
// Summary: Frame-clock capability the animator schedules against, plus a manual clock and a priming adapter.

use std::cell::Cell;
use std::rc::Rc;

/// Handle for one requested frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Platform display-refresh driver. The host delivers the resulting callback
/// by calling [`crate::Animator::tick`].
pub trait FrameClock {
    /// Ask for one callback on the next refresh.
    fn request_frame(&mut self) -> FrameId;

    fn cancel_frame(&mut self, id: FrameId);

    /// Make sure the clock is actually ticking before the first request.
    /// Most clocks need nothing here.
    fn prime(&mut self) {}
}

#[derive(Default)]
struct ClockStats {
    requests: Cell<u64>,
    cancellations: Cell<u64>,
    primes: Cell<u64>,
    pending: Cell<Option<FrameId>>,
}

/// Clock driven by hand: requests are only recorded, and the host decides
/// when to tick. Clones share the same counters, so keep one clone to
/// observe what the animator asked for.
#[derive(Clone, Default)]
pub struct ManualFrameClock {
    stats: Rc<ClockStats>,
}

impl ManualFrameClock {
    pub fn new() -> Self { Self::default() }

    /// Total frames requested so far.
    pub fn requests(&self) -> u64 { self.stats.requests.get() }

    pub fn cancellations(&self) -> u64 { self.stats.cancellations.get() }

    pub fn primes(&self) -> u64 { self.stats.primes.get() }

    /// Outstanding request, if any, without consuming it.
    pub fn pending(&self) -> Option<FrameId> { self.stats.pending.get() }

    /// Consume the outstanding request. A host loop ticks once per `Some`.
    pub fn take_pending(&self) -> Option<FrameId> { self.stats.pending.take() }
}

impl FrameClock for ManualFrameClock {
    fn request_frame(&mut self) -> FrameId {
        let n = self.stats.requests.get() + 1;
        self.stats.requests.set(n);
        let id = FrameId(n);
        self.stats.pending.set(Some(id));
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.stats.cancellations.set(self.stats.cancellations.get() + 1);
        if self.stats.pending.get() == Some(id) {
            self.stats.pending.set(None);
        }
    }

    fn prime(&mut self) {
        self.stats.primes.set(self.stats.primes.get() + 1);
    }
}

/// Wraps a clock whose platform suspends frame delivery while nothing is
/// observed. `primer` forces one observable change before every loop start.
pub struct PrimedClock<C, P> {
    inner: C,
    primer: P,
}

impl<C: FrameClock, P: FnMut()> PrimedClock<C, P> {
    pub fn new(inner: C, primer: P) -> Self { Self { inner, primer } }

    pub fn into_inner(self) -> C { self.inner }
}

impl<C: FrameClock, P: FnMut()> FrameClock for PrimedClock<C, P> {
    fn request_frame(&mut self) -> FrameId { self.inner.request_frame() }

    fn cancel_frame(&mut self, id: FrameId) { self.inner.cancel_frame(id) }

    fn prime(&mut self) {
        (self.primer)();
        self.inner.prime();
    }
}
