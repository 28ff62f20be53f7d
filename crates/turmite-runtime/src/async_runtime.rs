//! Async runtime support — the simulation and render loops as two tasks.
//!
//! The driver runs two cooperatively scheduled tasks on one single-threaded
//! event loop: a simulation task that polls the [`Scheduler`] and applies
//! control messages, and a render task that hands the renderer a frame at
//! its own cadence. They share one `Rc<RefCell<Simulation>>`; no borrow is
//! ever held across an await point.
//!
//! # Feature Flag
//!
//! This module requires the `async` feature:
//! ```toml
//! turmite-runtime = { version = "1.0", features = ["async"] }
//! ```
//!
//! # Note on Send bounds
//!
//! The shared simulation lives in an `Rc`, so the tasks are spawned with
//! `spawn_local` and must run inside a `LocalSet`.
//!
//! # Example
//!
//! ```rust,ignore
//! use turmite_runtime::prelude::*;
//! use tokio::task::LocalSet;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let local = LocalSet::new();
//!     local.run_until(async {
//!         let sim = Rc::new(RefCell::new(Simulation::new()));
//!         let handle = spawn_driver(
//!             Rc::clone(&sim),
//!             Scheduler::default(),
//!             SystemClock::new(),
//!             FrameCounter::default(),
//!             DriverConfig::default(),
//!         );
//!         tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//!         handle.stop();
//!         let (report, _) = handle.join().await.unwrap();
//!     }).await;
//! }
//! ```

#![cfg(feature = "async")]

use crate::render::Renderer;
use crate::scheduler::{Clock, Scheduler, TargetRate};
use crate::simulation::Simulation;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use turmite_agents::prelude::RuleTable;

/// Messages the simulation task accepts while running.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    /// Swap the shared rules and re-seed the colony.
    RulesChanged(RuleTable),
    SetTargetRate(TargetRate),
    Pause,
    Resume,
    /// End both tasks. Repeated stops are ignored.
    Stop,
}

/// Cadence of the two driver tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// How often the simulation task asks the scheduler for due ticks.
    pub poll_interval_ms: u64,
    /// How often the render task draws.
    pub frame_interval_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 4,
            frame_interval_ms: 16,
        }
    }
}

/// Totals from a finished driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverReport {
    pub ticks: u64,
    pub frames: usize,
}

/// Control side of a running driver.
pub struct DriverHandle<R> {
    control: mpsc::UnboundedSender<ControlMessage>,
    simulation: JoinHandle<u64>,
    render: JoinHandle<(usize, R)>,
}

impl<R> DriverHandle<R> {
    /// Queue a control message. Returns `false` once the driver has stopped.
    pub fn send(&self, message: ControlMessage) -> bool {
        self.control.send(message).is_ok()
    }

    pub fn rules_changed(&self, rules: RuleTable) -> bool {
        self.send(ControlMessage::RulesChanged(rules))
    }

    pub fn set_target_rate(&self, target: TargetRate) -> bool {
        self.send(ControlMessage::SetTargetRate(target))
    }

    pub fn pause(&self) -> bool {
        self.send(ControlMessage::Pause)
    }

    pub fn resume(&self) -> bool {
        self.send(ControlMessage::Resume)
    }

    pub fn stop(&self) -> bool {
        self.send(ControlMessage::Stop)
    }

    /// Wait for both tasks and hand the renderer back.
    pub async fn join(self) -> Result<(DriverReport, R), JoinError> {
        drop(self.control);
        let (ticks, render) = futures::future::join(self.simulation, self.render).await;
        let (frames, renderer) = render?;
        Ok((
            DriverReport {
                ticks: ticks?,
                frames,
            },
            renderer,
        ))
    }
}

/// Start the simulation and render tasks.
///
/// The scheduler is started against `clock` before anything is spawned.
/// Must be called within a `LocalSet` context.
pub fn spawn_driver<C, R>(
    sim: Rc<RefCell<Simulation>>,
    mut scheduler: Scheduler,
    clock: C,
    mut renderer: R,
    config: DriverConfig,
) -> DriverHandle<R>
where
    C: Clock + 'static,
    R: Renderer + 'static,
{
    let (control, mut inbox) = mpsc::unbounded_channel();
    let (stopped_tx, mut stopped_rx) = watch::channel(false);
    scheduler.start(clock.now_ms());

    let sim_for_render = Rc::clone(&sim);
    let simulation = tokio::task::spawn_local(async move {
        let mut poll = tokio::time::interval(Duration::from_millis(config.poll_interval_ms.max(1)));
        let mut ticks = 0;
        loop {
            tokio::select! {
                message = inbox.recv() => match message {
                    Some(ControlMessage::Stop) | None => break,
                    Some(message) => apply(&mut scheduler, &sim, message, clock.now_ms()),
                },
                _ = poll.tick() => {
                    let report = scheduler.advance(&mut sim.borrow_mut(), clock.now_ms());
                    ticks += report.ticks;
                }
            }
        }
        scheduler.stop();
        let _ = stopped_tx.send(true);
        ticks
    });

    let render = tokio::task::spawn_local(async move {
        let mut frame = tokio::time::interval(Duration::from_millis(config.frame_interval_ms.max(1)));
        let mut frames = 0;
        loop {
            tokio::select! {
                _ = stopped_rx.changed() => break,
                _ = frame.tick() => {
                    sim_for_render.borrow_mut().render_with(&mut renderer);
                    frames += 1;
                }
            }
        }
        (frames, renderer)
    });

    DriverHandle {
        control,
        simulation,
        render,
    }
}

fn apply(scheduler: &mut Scheduler, sim: &RefCell<Simulation>, message: ControlMessage, now: f64) {
    match message {
        ControlMessage::RulesChanged(rules) => {
            sim.borrow_mut().replace_rules(rules);
        }
        ControlMessage::SetTargetRate(target) => scheduler.set_target_rate(target),
        ControlMessage::Pause => {
            scheduler.pause(now);
        }
        ControlMessage::Resume => {
            scheduler.resume(now);
        }
        ControlMessage::Stop => scheduler.stop(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::FrameCounter;
    use crate::scheduler::ManualClock;
    use crate::simulation::SimulationConfig;
    use tokio::task::LocalSet;
    use turmite_agents::prelude::*;

    async fn run_test<F, Fut>(f: F)
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = ()>,
    {
        let local = LocalSet::new();
        local.run_until(f()).await;
    }

    fn small_sim() -> Simulation {
        let config = SimulationConfig {
            cols: 32,
            rows: 32,
            seed: Some(17),
            food_interval: 0,
            ..SimulationConfig::default()
        };
        Simulation::from_config(config, ColonyConfig::default(), presets::langtons_ant())
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(40)).await;
    }

    #[tokio::test]
    async fn driver_paces_against_the_clock() {
        run_test(|| async {
            let sim = Rc::new(RefCell::new(small_sim()));
            let clock = ManualClock::new();
            let handle = spawn_driver(
                Rc::clone(&sim),
                Scheduler::new(TargetRate::StepsPerSecond(60.0)),
                clock.clone(),
                FrameCounter::default(),
                DriverConfig {
                    poll_interval_ms: 1,
                    frame_interval_ms: 5,
                },
            );

            clock.set(1_000.0);
            settle().await;
            assert!(handle.stop());
            let (report, counter) = handle.join().await.unwrap();

            assert!((59..=61).contains(&report.ticks), "ran {} ticks", report.ticks);
            assert_eq!(sim.borrow().current_tick(), report.ticks);
            assert!(report.frames >= 1);
            assert_eq!(counter.frames, report.frames);
        })
        .await;
    }

    #[tokio::test]
    async fn paused_driver_owes_nothing() {
        run_test(|| async {
            let sim = Rc::new(RefCell::new(small_sim()));
            let clock = ManualClock::new();
            let handle = spawn_driver(
                Rc::clone(&sim),
                Scheduler::new(TargetRate::StepsPerSecond(60.0)),
                clock.clone(),
                FrameCounter::default(),
                DriverConfig::default(),
            );

            handle.pause();
            settle().await;
            clock.set(5_000.0);
            settle().await;
            let before_resume = sim.borrow().current_tick();
            assert!(before_resume <= 1);

            handle.resume();
            settle().await;
            clock.set(5_100.0);
            settle().await;
            handle.stop();
            let (report, _) = handle.join().await.unwrap();
            assert!(report.ticks - before_resume <= 8, "burst of {} ticks", report.ticks);
        })
        .await;
    }

    #[tokio::test]
    async fn rules_changed_reseeds_the_world() {
        run_test(|| async {
            let sim = Rc::new(RefCell::new(small_sim()));
            let clock = ManualClock::new();
            let handle = spawn_driver(
                Rc::clone(&sim),
                Scheduler::default(),
                clock.clone(),
                FrameCounter::default(),
                DriverConfig::default(),
            );

            assert!(handle.rules_changed(presets::snowflake()));
            settle().await;
            assert_eq!(sim.borrow().rules(), &presets::snowflake());

            handle.stop();
            handle.stop();
            let (_, counter) = handle.join().await.unwrap();
            assert!(counter.full_redraws >= 1);
        })
        .await;
    }
}
