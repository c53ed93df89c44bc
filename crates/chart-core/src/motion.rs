// File: crates/chart-core/src/motion.rs
// Summary: Animated value cells and per-value trajectories (spring, timing, decay, direct).
// Notes:
// - Values are single-threaded shared cells; cloning an `AnimatedValue` shares the cell.
// - Starting a trajectory on a cell supersedes whatever trajectory was driving it.
//   The superseded one reports itself interrupted on its next step.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

struct ValueCell {
    value: Cell<f64>,
    generation: Cell<u64>,
}

/// Host-owned numeric cell that the animator writes into each frame.
#[derive(Clone)]
pub struct AnimatedValue {
    cell: Rc<ValueCell>,
}

impl AnimatedValue {
    pub fn new(value: f64) -> Self {
        Self { cell: Rc::new(ValueCell { value: Cell::new(value), generation: Cell::new(0) }) }
    }

    pub fn get(&self) -> f64 { self.cell.value.get() }

    /// Host write. Cancels any trajectory currently driving this value.
    pub fn set(&self, value: f64) {
        self.claim();
        self.cell.value.set(value);
    }

    /// True when both handles refer to the same cell.
    pub fn ptr_eq(&self, other: &AnimatedValue) -> bool { Rc::ptr_eq(&self.cell, &other.cell) }

    pub(crate) fn claim(&self) -> u64 {
        let next = self.cell.generation.get().wrapping_add(1);
        self.cell.generation.set(next);
        next
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool { self.cell.generation.get() == generation }

    pub(crate) fn write(&self, value: f64) { self.cell.value.set(value); }
}

impl std::fmt::Debug for AnimatedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AnimatedValue").field(&self.get()).finish()
    }
}

/// Damped-oscillator parameters. Velocity is in units per second.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub damping: f64,
    pub mass: f64,
    pub stiffness: f64,
    pub velocity: f64,
    pub overshoot_clamping: bool,
    pub rest_displacement_threshold: f64,
    pub rest_speed_threshold: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            damping: 10.0,
            mass: 1.0,
            stiffness: 100.0,
            velocity: 0.0,
            overshoot_clamping: false,
            rest_displacement_threshold: 0.01,
            rest_speed_threshold: 2.0,
        }
    }
}

impl SpringConfig {
    /// Snappy, non-oscillating spring used for the chart's price range.
    pub fn chart_range() -> Self {
        Self { damping: 50.0, mass: 0.1, stiffness: 50.0, ..Self::default() }
    }

    /// Scale the rest thresholds to the larger of two travel distances so a
    /// large move settles as quickly (relative to its size) as a small one.
    /// The configured thresholds act as a floor.
    pub fn normalized(self, distance_a: f64, distance_b: f64) -> Self {
        let travel = distance_a.abs().max(distance_b.abs());
        let scale = travel / 10_000.0;
        Self {
            rest_displacement_threshold: self.rest_displacement_threshold.max(scale),
            rest_speed_threshold: self.rest_speed_threshold.max(scale * 200.0),
            ..self
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
}

impl Easing {
    /// Map progress `t` in [0, 1] onto the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 { 2.0 * t * t } else { 1.0 - (-2.0 * t + 2.0).powi(2) / 2.0 }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => {
                if t < 0.5 { 4.0 * t * t * t } else { 1.0 - (-2.0 * t + 2.0).powi(3) / 2.0 }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub duration_ms: f64,
    pub easing: Easing,
}

impl Default for TimingConfig {
    fn default() -> Self { Self { duration_ms: 300.0, easing: Easing::EaseInOut } }
}

/// Momentum decay. The velocity (units per second) shrinks by `deceleration`
/// every millisecond until it drops below `velocity_eps`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    pub velocity: f64,
    pub deceleration: f64,
    pub velocity_eps: f64,
    pub clamp: Option<(f64, f64)>,
}

impl Default for DecayConfig {
    fn default() -> Self { Self { velocity: 0.0, deceleration: 0.998, velocity_eps: 1.0, clamp: None } }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Step {
    Running(f64),
    Settled(f64),
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Origin {
    start_ms: f64,
    from: f64,
}

/// State of one value's trajectory. The start time and origin are captured
/// on the first frame the trajectory sees.
#[derive(Clone, Debug)]
pub(crate) enum Trajectory {
    Spring { to: f64, config: SpringConfig, origin: Option<Origin> },
    Timing { to: f64, config: TimingConfig, origin: Option<Origin> },
    Decay { config: DecayConfig, origin: Option<Origin> },
    Direct,
}

impl Trajectory {
    pub(crate) fn spring(to: f64, config: SpringConfig) -> Self { Trajectory::Spring { to, config, origin: None } }

    pub(crate) fn timing(to: f64, config: TimingConfig) -> Self { Trajectory::Timing { to, config, origin: None } }

    pub(crate) fn decay(config: DecayConfig) -> Self { Trajectory::Decay { config, origin: None } }

    pub(crate) fn step(&mut self, current: f64, now_ms: f64) -> Step {
        match self {
            Trajectory::Spring { to, config, origin } => {
                let o = *origin.get_or_insert(Origin { start_ms: now_ms, from: current });
                spring_step(o, *to, config, now_ms)
            }
            Trajectory::Timing { to, config, origin } => {
                let o = *origin.get_or_insert(Origin { start_ms: now_ms, from: current });
                timing_step(o, *to, config, now_ms)
            }
            Trajectory::Decay { config, origin } => {
                let o = *origin.get_or_insert(Origin { start_ms: now_ms, from: current });
                decay_step(o, config, now_ms)
            }
            Trajectory::Direct => Step::Settled(current),
        }
    }
}

fn spring_step(o: Origin, to: f64, c: &SpringConfig, now_ms: f64) -> Step {
    // Without positive damping the oscillation never decays below the rest thresholds.
    if c.mass <= 0.0 || c.stiffness <= 0.0 || c.damping <= 0.0 {
        return Step::Settled(to);
    }
    let t = ((now_ms - o.start_ms) / 1000.0).max(0.0);
    let d0 = o.from - to;
    let v0 = c.velocity;
    let omega0 = (c.stiffness / c.mass).sqrt();
    let zeta = c.damping / (2.0 * (c.stiffness * c.mass).sqrt());

    // Displacement from the target and its derivative.
    let (d, v) = if zeta < 1.0 {
        let a = zeta * omega0;
        let omega1 = omega0 * (1.0 - zeta * zeta).sqrt();
        let b = (v0 + a * d0) / omega1;
        let env = (-a * t).exp();
        let (sin, cos) = (omega1 * t).sin_cos();
        (env * (d0 * cos + b * sin), env * (v0 * cos - (a * b + d0 * omega1) * sin))
    } else {
        // Critically damped curve; heavier damping settles along the same path.
        let env = (-omega0 * t).exp();
        let k = v0 + omega0 * d0;
        (env * (d0 + k * t), env * (v0 - omega0 * k * t))
    };
    let x = to + d;

    let overshot = c.overshoot_clamping && ((o.from < to && x > to) || (o.from > to && x < to));
    let at_rest = v.abs() <= c.rest_speed_threshold && d.abs() <= c.rest_displacement_threshold;
    if overshot || at_rest { Step::Settled(to) } else { Step::Running(x) }
}

fn timing_step(o: Origin, to: f64, c: &TimingConfig, now_ms: f64) -> Step {
    if c.duration_ms <= 0.0 {
        return Step::Settled(to);
    }
    let progress = (now_ms - o.start_ms) / c.duration_ms;
    if progress >= 1.0 {
        return Step::Settled(to);
    }
    Step::Running(o.from + (to - o.from) * c.easing.apply(progress))
}

fn decay_step(o: Origin, c: &DecayConfig, now_ms: f64) -> Step {
    let elapsed = (now_ms - o.start_ms).max(0.0);
    let decel = c.deceleration.clamp(0.0, 0.999_999);
    let (x, v) = if decel <= 0.0 {
        (o.from, 0.0)
    } else {
        let kv = decel.powf(elapsed);
        // Integral of v0 * decel^t over [0, elapsed] ms, in seconds.
        (o.from + c.velocity / 1000.0 * (kv - 1.0) / decel.ln(), c.velocity * kv)
    };

    if let Some((lo, hi)) = c.clamp {
        if x <= lo { return Step::Settled(lo); }
        if x >= hi { return Step::Settled(hi); }
    }
    if v.abs() < c.velocity_eps { Step::Settled(x) } else { Step::Running(x) }
}
