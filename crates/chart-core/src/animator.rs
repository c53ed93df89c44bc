// File: crates/chart-core/src/animator.rs
// Summary: Frame-loop scheduler that animates shared numeric cells in batches and stops when idle.
// Notes:
// - `Animator` is a cheap handle over shared single-threaded state. Callbacks
//   (`on_frame`, batch completions, after-animation hooks) run with no internal
//   borrow held, so they may start or dispose animations themselves.
// - Tick order: advance tracks, run `on_frame`, fire completed batches, run
//   after-animation hooks if idle, then request the next frame iff work remains.

use std::cell::RefCell;
use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use log::{debug, trace};

use crate::error::{ChartError, Result};
use crate::frame::{FrameClock, FrameId};
use crate::motion::{AnimatedValue, DecayConfig, SpringConfig, Step, TimingConfig, Trajectory};

/// Batch completion hook. The flag is true when every member settled
/// naturally and false if any was superseded by a newer trajectory.
pub type FinishCallback = Box<dyn FnOnce(bool)>;

type FrameCallback = Rc<RefCell<Box<dyn FnMut()>>>;

type BatchId = u64;

struct Batch {
    remaining: usize,
    all_settled: bool,
    on_finish: Option<FinishCallback>,
}

struct Track {
    target: AnimatedValue,
    generation: u64,
    trajectory: Trajectory,
    batch: BatchId,
}

struct AnimatorState {
    on_frame: FrameCallback,
    clock: Box<dyn FrameClock>,
    frame_id: Option<FrameId>,
    tracks: Vec<Track>,
    batches: HashMap<BatchId, Batch>,
    next_batch: BatchId,
    after_animations: Vec<Box<dyn FnOnce()>>,
    disposals: u64,
    /// Set while `tick` runs; the tick itself requests the next frame.
    ticking: bool,
}

impl AnimatorState {
    /// Start the loop from idle. The clock is primed only here.
    fn start_loop(&mut self) {
        if self.frame_id.is_none() {
            self.clock.prime();
            self.frame_id = Some(self.clock.request_frame());
            trace!("frame loop started ({} batches pending)", self.batches.len());
        }
    }

    fn request_next(&mut self) {
        if self.frame_id.is_none() {
            self.frame_id = Some(self.clock.request_frame());
        }
    }
}

/// Drives `on_frame` once per display refresh for as long as any batch is pending.
#[derive(Clone)]
pub struct Animator {
    state: Rc<RefCell<AnimatorState>>,
}

impl Animator {
    pub fn new(on_frame: impl FnMut() + 'static, clock: impl FrameClock + 'static) -> Self {
        let on_frame: Box<dyn FnMut()> = Box::new(on_frame);
        Self {
            state: Rc::new(RefCell::new(AnimatorState {
                on_frame: Rc::new(RefCell::new(on_frame)),
                clock: Box::new(clock),
                frame_id: None,
                tracks: Vec::new(),
                batches: HashMap::new(),
                next_batch: 0,
                after_animations: Vec::new(),
                disposals: 0,
                ticking: false,
            })),
        }
    }

    /// Spring one value toward `to`.
    pub fn spring(&self, target: &AnimatedValue, to: f64, config: SpringConfig, on_finish: Option<FinishCallback>) {
        self.start_batch(std::slice::from_ref(target), |_| Trajectory::spring(to, config), on_finish);
    }

    /// Spring each of `targets[i]` toward `values[i]` as one batch.
    pub fn spring_many(
        &self,
        targets: &[AnimatedValue],
        values: &[f64],
        config: SpringConfig,
        on_finish: Option<FinishCallback>,
    ) -> Result<()> {
        check_arity(targets, values)?;
        self.start_batch(targets, |i| Trajectory::spring(values[i], config), on_finish);
        Ok(())
    }

    /// Animate one value to `to` over a fixed duration.
    pub fn timing(&self, target: &AnimatedValue, to: f64, config: TimingConfig, on_finish: Option<FinishCallback>) {
        self.start_batch(std::slice::from_ref(target), |_| Trajectory::timing(to, config), on_finish);
    }

    pub fn timing_many(
        &self,
        targets: &[AnimatedValue],
        values: &[f64],
        config: TimingConfig,
        on_finish: Option<FinishCallback>,
    ) -> Result<()> {
        check_arity(targets, values)?;
        self.start_batch(targets, |i| Trajectory::timing(values[i], config), on_finish);
        Ok(())
    }

    /// Coast from the current value with the configured velocity until it dies out.
    pub fn decay(&self, target: &AnimatedValue, config: DecayConfig, on_finish: Option<FinishCallback>) {
        self.start_batch(std::slice::from_ref(target), |_| Trajectory::decay(config), on_finish);
    }

    pub fn decay_many(&self, targets: &[AnimatedValue], config: DecayConfig, on_finish: Option<FinishCallback>) {
        self.start_batch(targets, |_| Trajectory::decay(config), on_finish);
    }

    /// Set `target` now and schedule a frame so the change is drawn with
    /// whatever else is in flight.
    pub fn direct(&self, target: &AnimatedValue, value: f64) {
        target.write(value);
        self.start_batch(std::slice::from_ref(target), |_| Trajectory::Direct, None);
    }

    pub fn direct_many(&self, targets: &[AnimatedValue], values: &[f64]) -> Result<()> {
        check_arity(targets, values)?;
        for (t, &v) in targets.iter().zip(values) {
            t.write(v);
        }
        self.start_batch(targets, |_| Trajectory::Direct, None);
        Ok(())
    }

    /// Run `callback` once no batch is pending; immediately when already idle.
    pub fn run_after_animations(&self, callback: impl FnOnce() + 'static) {
        {
            let mut st = self.state.borrow_mut();
            if !st.batches.is_empty() {
                st.after_animations.push(Box::new(callback));
                return;
            }
        }
        callback();
    }

    pub fn is_animating(&self) -> bool { !self.state.borrow().batches.is_empty() }

    pub fn pending_batches(&self) -> usize { self.state.borrow().batches.len() }

    /// Drop every pending batch without firing its callback and stop the loop.
    /// With `reset_on_frame` the frame callback is swapped for a no-op.
    /// Safe to call repeatedly.
    pub fn dispose(&self, reset_on_frame: bool) {
        let dropped = {
            let mut st = self.state.borrow_mut();
            if let Some(id) = st.frame_id.take() {
                st.clock.cancel_frame(id);
            }
            if reset_on_frame {
                let noop: Box<dyn FnMut()> = Box::new(|| {});
                st.on_frame = Rc::new(RefCell::new(noop));
            }
            st.disposals += 1;
            st.ticking = false;
            debug!("animator disposed ({} batches dropped)", st.batches.len());
            (
                mem::take(&mut st.tracks),
                mem::take(&mut st.batches),
                mem::take(&mut st.after_animations),
            )
        };
        drop(dropped);
    }

    /// Deliver the frame callback for `now_ms`. Ignored when no frame is outstanding.
    pub fn tick(&self, now_ms: f64) {
        let (on_frame, finished, epoch) = {
            let mut st = self.state.borrow_mut();
            let st = &mut *st;
            if st.frame_id.take().is_none() {
                trace!("tick at {now_ms} ignored; no frame requested");
                return;
            }
            st.ticking = true;

            let mut completions: Vec<(BatchId, bool)> = Vec::new();
            st.tracks.retain_mut(|track| {
                if !track.target.is_current(track.generation) {
                    completions.push((track.batch, false));
                    return false;
                }
                match track.trajectory.step(track.target.get(), now_ms) {
                    Step::Running(v) => {
                        track.target.write(v);
                        true
                    }
                    Step::Settled(v) => {
                        track.target.write(v);
                        completions.push((track.batch, true));
                        false
                    }
                }
            });

            let mut finished = Vec::new();
            for (id, settled) in completions {
                let Some(batch) = st.batches.get_mut(&id) else { continue };
                batch.remaining -= 1;
                batch.all_settled &= settled;
                if batch.remaining == 0 {
                    if let Some(batch) = st.batches.remove(&id) {
                        finished.push((batch.on_finish, batch.all_settled));
                    }
                }
            }
            (st.on_frame.clone(), finished, st.disposals)
        };

        match on_frame.try_borrow_mut() {
            Ok(mut cb) => (*cb)(),
            Err(_) => trace!("on_frame already running; skipped nested frame"),
        }

        let disposed = || self.state.borrow().disposals != epoch;
        for (cb, settled) in finished {
            if disposed() {
                trace!("animator disposed mid-frame; dropping completions");
                return;
            }
            if let Some(cb) = cb {
                cb(settled);
            }
        }
        if disposed() {
            return;
        }

        let after = {
            let mut st = self.state.borrow_mut();
            if st.batches.is_empty() { mem::take(&mut st.after_animations) } else { Vec::new() }
        };
        for cb in after {
            cb();
        }

        let mut st = self.state.borrow_mut();
        st.ticking = false;
        if st.batches.is_empty() {
            trace!("frame loop idle");
        } else {
            st.request_next();
        }
    }

    fn start_batch(
        &self,
        targets: &[AnimatedValue],
        mut trajectory: impl FnMut(usize) -> Trajectory,
        on_finish: Option<FinishCallback>,
    ) {
        if targets.is_empty() {
            if let Some(cb) = on_finish {
                cb(true);
            }
            return;
        }
        let mut st = self.state.borrow_mut();
        let id = st.next_batch;
        st.next_batch += 1;
        st.batches.insert(id, Batch { remaining: targets.len(), all_settled: true, on_finish });
        for (i, target) in targets.iter().enumerate() {
            let generation = target.claim();
            st.tracks.push(Track { target: target.clone(), generation, trajectory: trajectory(i), batch: id });
        }
        if !st.ticking {
            st.start_loop();
        }
    }
}

fn check_arity(targets: &[AnimatedValue], values: &[f64]) -> Result<()> {
    if targets.len() != values.len() {
        return Err(ChartError::ArityMismatch { targets: targets.len(), values: values.len() });
    }
    Ok(())
}
