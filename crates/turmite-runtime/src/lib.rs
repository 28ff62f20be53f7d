//! # Turmite Runtime
//!
//! Simulation state, real-time step scheduling and persistence.
//!
//! The runtime owns the world: the grid, the shared rule table and the ant
//! population live in one [`simulation::Simulation`]. A
//! [`scheduler::Scheduler`] decides how many ticks are owed at a given
//! wall-clock instant, a [`render::Renderer`] sees the world between ticks,
//! and with the `async` feature both run as separate tasks on one
//! single-threaded event loop.

pub mod simulation;
pub mod scheduler;
pub mod render;
pub mod colony_builder;
pub mod session;
#[cfg(feature = "async")]
pub mod async_runtime;
pub mod prelude;
