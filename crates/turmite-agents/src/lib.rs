//! # Turmite Agents
//!
//! Ant agents for turmite colony simulations.
//!
//! Each ant runs two layers every tick:
//!
//! - **Automaton** — read the cell color, resolve a transition from its own
//!   rule table or the shared one, write, turn, step
//! - **Body** — energy, hunger, foraging, a task state machine, pheromone
//!   trails and a short event memory
//!
//! Archetypes (Worker, Scout, Soldier, Queen, Generic) fix the body's
//! constants. [`spawn`] builds whole colonies with the standard type mix and
//! placement strategies.

pub mod ant;
pub mod step;
pub mod spawn;
pub mod serialize;
pub mod prelude;
