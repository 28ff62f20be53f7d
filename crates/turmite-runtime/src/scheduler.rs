//! Step scheduler — real-time pacing of logical ticks.
//!
//! The scheduler decides how many ticks a simulation owes at a given
//! wall-clock instant. Each invocation of [`Scheduler::advance`]:
//! 1. Runs pheromone decay once per elapsed decay interval
//! 2. Steps the simulation while the deadline lies in the past, bounded by
//!    the per-invocation cap
//! 3. Moves the deadline forward by one tick duration per tick, or to
//!    `now + duration` when the cap was hit
//!
//! Time is passed in explicitly (milliseconds as `f64`), so the same code
//! serves the async driver, the CLI and deterministic tests.

use crate::simulation::{SimEvent, Simulation, SimulationConfig};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

pub const MIN_STEPS_PER_SECOND: f64 = 1.0;
pub const MID_STEPS_PER_SECOND: f64 = 60.0;
pub const MAX_STEPS_PER_SECOND: f64 = 100_000.0;
/// Missed decay intervals applied by one `advance`; older ones are skipped.
pub const MAX_DECAYS_PER_ADVANCE: u32 = 10;

const SLIDER_MIN: f64 = 1.0;
const SLIDER_MID: f64 = 50.0;
const SLIDER_MAX: f64 = 100.0;
const SLIDER_POWER: i32 = 3;

/// Map a 1..100 speed control onto steps per second.
///
/// The lower half is linear from 1 to 60, the upper half a cubic curve from
/// 60 to 100000.
pub fn map_slider_to_speed(slider: f64) -> f64 {
    let slider = if slider.is_finite() {
        slider.clamp(SLIDER_MIN, SLIDER_MAX)
    } else {
        SLIDER_MID
    };

    if slider == SLIDER_MID {
        MID_STEPS_PER_SECOND
    } else if slider < SLIDER_MID {
        let speed = MIN_STEPS_PER_SECOND
            + (slider - SLIDER_MIN) * (MID_STEPS_PER_SECOND - MIN_STEPS_PER_SECOND)
                / (SLIDER_MID - SLIDER_MIN);
        speed.max(MIN_STEPS_PER_SECOND)
    } else {
        let normalized = (slider - SLIDER_MID) / (SLIDER_MAX - SLIDER_MID);
        let speed = MID_STEPS_PER_SECOND
            + normalized.powi(SLIDER_POWER) * (MAX_STEPS_PER_SECOND - MID_STEPS_PER_SECOND);
        speed.min(MAX_STEPS_PER_SECOND)
    }
}

/// How fast the simulation should run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRate {
    /// Position of a 1..100 speed control.
    Slider(f64),
    /// Steps per second, clamped to `[1, 100000]`.
    StepsPerSecond(f64),
}

impl Default for TargetRate {
    fn default() -> Self {
        TargetRate::Slider(SLIDER_MID)
    }
}

impl TargetRate {
    pub fn steps_per_second(self) -> f64 {
        match self {
            TargetRate::Slider(value) => map_slider_to_speed(value),
            TargetRate::StepsPerSecond(sps) if sps.is_finite() => {
                sps.clamp(MIN_STEPS_PER_SECOND, MAX_STEPS_PER_SECOND)
            }
            TargetRate::StepsPerSecond(_) => MID_STEPS_PER_SECOND,
        }
    }

    /// Milliseconds per tick.
    pub fn tick_duration_ms(self) -> f64 {
        1_000.0 / self.steps_per_second()
    }

    pub fn clamped(self) -> Self {
        match self {
            TargetRate::Slider(value) if value.is_finite() => {
                TargetRate::Slider(value.clamp(SLIDER_MIN, SLIDER_MAX))
            }
            TargetRate::Slider(_) => TargetRate::default(),
            TargetRate::StepsPerSecond(_) => TargetRate::StepsPerSecond(self.steps_per_second()),
        }
    }
}

/// Source of wall-clock milliseconds.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Monotonic clock measured from its creation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1_000.0
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Lifecycle of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Stopped,
    Running,
    Paused,
}

/// What one [`Scheduler::advance`] call did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdvanceReport {
    pub ticks: u64,
    pub decays: u32,
    pub died: usize,
    pub halted: usize,
    pub food_injected: usize,
    /// The tick cap was reached and the deadline was re-anchored to now.
    pub capped: bool,
}

impl AdvanceReport {
    fn tally(&mut self, events: &[SimEvent]) {
        for event in events {
            match event {
                SimEvent::Died { .. } => self.died += 1,
                SimEvent::Halted { .. } => self.halted += 1,
                SimEvent::FoodInjected { .. } => self.food_injected += 1,
                _ => {}
            }
        }
    }
}

/// Paces a simulation against wall-clock time.
#[derive(Debug, Clone)]
pub struct Scheduler {
    target: TargetRate,
    decay_interval_ms: f64,
    decay_rate: f64,
    max_ticks: u64,
    state: RunState,
    next_tick_at: f64,
    last_decay_at: f64,
    paused_at: Option<f64>,
}

impl Scheduler {
    pub fn new(target: TargetRate) -> Self {
        Self::from_config(&SimulationConfig {
            target_rate: target,
            ..SimulationConfig::default()
        })
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        let config = config.clamped();
        Self {
            target: config.target_rate,
            decay_interval_ms: config.decay_interval_ms as f64,
            decay_rate: config.decay_rate,
            max_ticks: config.max_ticks_per_invocation,
            state: RunState::Stopped,
            next_tick_at: 0.0,
            last_decay_at: 0.0,
            paused_at: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn target_rate(&self) -> TargetRate {
        self.target
    }

    /// Takes effect on the next invocation.
    pub fn set_target_rate(&mut self, target: TargetRate) {
        self.target = target.clamped();
        tracing::debug!(steps_per_second = self.target.steps_per_second(), "target rate changed");
    }

    pub fn tick_duration_ms(&self) -> f64 {
        self.target.tick_duration_ms()
    }

    /// Start from stopped. Returns `false` when already started.
    pub fn start(&mut self, now: f64) -> bool {
        if self.state != RunState::Stopped {
            return false;
        }
        self.state = RunState::Running;
        self.next_tick_at = now;
        self.last_decay_at = now;
        self.paused_at = None;
        tracing::info!(steps_per_second = self.target.steps_per_second(), "scheduler started");
        true
    }

    /// Stop. Idempotent.
    pub fn stop(&mut self) {
        if self.state == RunState::Stopped {
            return;
        }
        self.state = RunState::Stopped;
        self.paused_at = None;
        tracing::info!("scheduler stopped");
    }

    /// Freeze the deadline. Returns `false` unless running.
    pub fn pause(&mut self, now: f64) -> bool {
        if self.state != RunState::Running {
            return false;
        }
        self.state = RunState::Paused;
        self.paused_at = Some(now);
        tracing::info!("scheduler paused");
        true
    }

    /// Shift the deadline by the paused duration so no backlog is owed.
    pub fn resume(&mut self, now: f64) -> bool {
        let Some(paused_at) = self.paused_at.take() else {
            return false;
        };
        let paused_for = (now - paused_at).max(0.0);
        self.next_tick_at += paused_for;
        self.last_decay_at += paused_for;
        self.state = RunState::Running;
        tracing::info!(paused_ms = paused_for, "scheduler resumed");
        true
    }

    /// Milliseconds until the next tick is due, `None` unless running.
    pub fn time_until_next(&self, now: f64) -> Option<f64> {
        match self.state {
            RunState::Running => Some((self.next_tick_at - now).max(0.0)),
            _ => None,
        }
    }

    /// Bring the simulation up to date with `now`.
    pub fn advance(&mut self, sim: &mut Simulation, now: f64) -> AdvanceReport {
        let mut report = AdvanceReport::default();
        if self.state != RunState::Running {
            return report;
        }

        while now - self.last_decay_at >= self.decay_interval_ms {
            if report.decays >= MAX_DECAYS_PER_ADVANCE {
                self.last_decay_at = now;
                tracing::warn!(cap = MAX_DECAYS_PER_ADVANCE, "decay cap reached; skipping missed intervals");
                break;
            }
            sim.decay_pheromones(self.decay_rate);
            self.last_decay_at += self.decay_interval_ms;
            report.decays += 1;
        }

        let duration = self.tick_duration_ms();
        while now >= self.next_tick_at && report.ticks < self.max_ticks {
            let events = sim.tick();
            report.tally(&events);
            report.ticks += 1;
            self.next_tick_at += duration;
        }

        if report.ticks >= self.max_ticks && now >= self.next_tick_at {
            report.capped = true;
            self.next_tick_at = now + duration;
            tracing::warn!(cap = self.max_ticks, "tick cap reached; dropping backlog");
        }
        report
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(TargetRate::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turmite_agents::prelude::*;

    fn sim() -> Simulation {
        let config = SimulationConfig {
            cols: 64,
            rows: 64,
            seed: Some(5),
            food_interval: 0,
            ..SimulationConfig::default()
        };
        Simulation::from_config(config, ColonyConfig::default(), presets::langtons_ant())
    }

    #[test]
    fn slider_mapping_segments() {
        assert_eq!(map_slider_to_speed(1.0), 1.0);
        assert_eq!(map_slider_to_speed(50.0), 60.0);
        assert_eq!(map_slider_to_speed(100.0), 100_000.0);
        assert!((map_slider_to_speed(25.5) - 30.5).abs() < 1e-9);
        assert!((map_slider_to_speed(75.0) - 12_552.5).abs() < 1e-9);
        assert_eq!(map_slider_to_speed(-4.0), 1.0);
        assert_eq!(map_slider_to_speed(f64::NAN), 60.0);

        let mut previous = 0.0;
        for slider in 1..=100 {
            let speed = map_slider_to_speed(slider as f64);
            assert!(speed >= previous);
            previous = speed;
        }
    }

    #[test]
    fn steps_per_second_is_clamped() {
        assert_eq!(TargetRate::StepsPerSecond(0.0).steps_per_second(), 1.0);
        assert_eq!(TargetRate::StepsPerSecond(1e9).steps_per_second(), 100_000.0);
        assert_eq!(TargetRate::default().steps_per_second(), 60.0);
    }

    #[test]
    fn sixty_steps_per_second_for_one_second() {
        let mut sim = sim();
        let mut scheduler = Scheduler::new(TargetRate::StepsPerSecond(60.0));
        assert!(scheduler.start(0.0));

        let mut ticks = 0;
        for ms in 1..=1_000 {
            ticks += scheduler.advance(&mut sim, ms as f64).ticks;
        }
        assert!((59..=61).contains(&ticks), "ran {} ticks", ticks);
        assert_eq!(sim.current_tick(), ticks);
    }

    #[test]
    fn stopped_or_paused_scheduler_does_nothing() {
        let mut sim = sim();
        let mut scheduler = Scheduler::default();
        assert_eq!(scheduler.advance(&mut sim, 500.0), AdvanceReport::default());

        scheduler.start(0.0);
        scheduler.pause(10.0);
        assert_eq!(scheduler.advance(&mut sim, 5_000.0).ticks, 0);
        assert_eq!(scheduler.time_until_next(5_000.0), None);
    }

    #[test]
    fn resume_shifts_the_deadline() {
        let mut sim = sim();
        let mut scheduler = Scheduler::new(TargetRate::StepsPerSecond(10.0));
        scheduler.start(0.0);
        assert_eq!(scheduler.advance(&mut sim, 250.0).ticks, 3);

        assert!(scheduler.pause(250.0));
        assert!(!scheduler.pause(260.0));
        assert!(scheduler.resume(10_250.0));
        assert!(!scheduler.resume(10_300.0));

        // next deadline was 300, shifted by the 10 s pause
        assert_eq!(scheduler.advance(&mut sim, 10_299.0).ticks, 0);
        assert_eq!(scheduler.advance(&mut sim, 10_300.0).ticks, 1);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut scheduler = Scheduler::default();
        assert!(scheduler.start(0.0));
        assert!(!scheduler.start(5.0));
        scheduler.stop();
        scheduler.stop();
        assert_eq!(scheduler.state(), RunState::Stopped);
        assert!(scheduler.start(7.0));
    }

    #[test]
    fn tick_cap_drops_the_backlog() {
        let mut sim = sim();
        let config = SimulationConfig {
            max_ticks_per_invocation: 100,
            target_rate: TargetRate::StepsPerSecond(1_000.0),
            ..SimulationConfig::default()
        };
        let mut scheduler = Scheduler::from_config(&config);
        scheduler.start(0.0);

        let report = scheduler.advance(&mut sim, 10_000.0);
        assert_eq!(report.ticks, 100);
        assert!(report.capped);
        assert_eq!(scheduler.time_until_next(10_000.0), Some(1.0));
        assert_eq!(scheduler.advance(&mut sim, 10_000.5).ticks, 0);
    }

    #[test]
    fn decay_runs_once_per_interval() {
        let mut sim = sim();
        sim.grid_mut()
            .get_mut(0, 0)
            .unwrap()
            .add_pheromone(PheromoneChannel::C, 1.0);
        let mut scheduler = Scheduler::new(TargetRate::StepsPerSecond(1.0));
        scheduler.start(0.0);

        assert_eq!(scheduler.advance(&mut sim, 999.0).decays, 0);
        assert_eq!(scheduler.advance(&mut sim, 1_000.0).decays, 1);
        assert_eq!(scheduler.advance(&mut sim, 3_500.0).decays, 2);
        let level = sim.grid().get(0, 0).unwrap().pheromone(PheromoneChannel::C);
        assert!((level - 0.85).abs() < 1e-9);
    }

    #[test]
    fn decay_catch_up_after_a_clock_jump_is_bounded() {
        let mut sim = sim();
        sim.grid_mut()
            .get_mut(0, 0)
            .unwrap()
            .add_pheromone(PheromoneChannel::A, 100.0);
        let config = SimulationConfig {
            max_ticks_per_invocation: 1,
            target_rate: TargetRate::StepsPerSecond(1.0),
            ..SimulationConfig::default()
        };
        let mut scheduler = Scheduler::from_config(&config);
        scheduler.start(0.0);

        let day = 86_400_000.0;
        let report = scheduler.advance(&mut sim, day);
        assert_eq!(report.decays, MAX_DECAYS_PER_ADVANCE);
        let level = sim.grid().get(0, 0).unwrap().pheromone(PheromoneChannel::A);
        assert!((level - 99.5).abs() < 1e-9);

        assert_eq!(scheduler.advance(&mut sim, day + 500.0).decays, 0);
        assert_eq!(scheduler.advance(&mut sim, day + 1_000.0).decays, 1);
    }

    #[test]
    fn rate_changes_apply_on_the_next_invocation() {
        let mut sim = sim();
        let mut scheduler = Scheduler::new(TargetRate::StepsPerSecond(1.0));
        scheduler.start(0.0);
        assert_eq!(scheduler.advance(&mut sim, 0.0).ticks, 1);

        scheduler.set_target_rate(TargetRate::Slider(100.0));
        assert_eq!(scheduler.tick_duration_ms(), 0.01);
        // the deadline already scheduled at 1000 ms still stands
        assert_eq!(scheduler.advance(&mut sim, 999.0).ticks, 0);
        assert_eq!(scheduler.advance(&mut sim, 1_000.0).ticks, 1);
    }
}
