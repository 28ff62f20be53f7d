//! # Turmite
//!
//! Multi-agent turmites on a toroidal grid.
//!
//! A turmite is a Turing-machine-like agent: it reads the color under it,
//! looks up `(state, color)` in a rule table, writes a color, turns or
//! moves, and changes state. Langton's ant is the one-state, two-color
//! case. Colonies mix archetypes (workers, scouts, soldiers, a queen) whose
//! energy, foraging and pheromone trails run alongside the rule table.
//!
//! ## Quick Start
//!
//! ```rust
//! use turmite::prelude::*;
//!
//! // One Langton's ant in the middle of a 100×100 torus
//! let mut sim = ColonyBuilder::new().seed(7).food_interval(0).build().unwrap();
//!
//! // Run the simulation
//! sim.run(1_000);
//!
//! let stats = sim.stats();
//! assert_eq!(stats.tick, 1_000);
//! assert!(stats.colored_cells > 0);
//! ```
//!
//! ## Architecture
//!
//! - [`turmite_core`] - Cells, grid, dirty set, rule tables and presets
//! - [`turmite_agents`] - Ants, archetypes, the task machine and colony spawning
//! - [`turmite_runtime`] - Simulation, step scheduler, sessions, async driver
//!
//! ## Rule tables
//!
//! | Op | Symbol | Effect |
//! |----|--------|--------|
//! | TurnLeft / TurnRight / UTurn | `L` `R` `U` | rotate, then step |
//! | Forward | `N` | step |
//! | Stay | `S` | no step |
//! | FaceNorth / East / South / West | `^` `>` `v` `<` | set heading, then step |
//! | RandomFace | `?` | random heading, then step |
//!
//! A `nextState` of `-1` halts the ant. Missing entries fall back to the
//! state's color-0 entry, then to "write the same color, go forward".
//!
//! ## Pacing
//!
//! ```rust
//! use turmite::prelude::*;
//!
//! let mut sim = Simulation::new();
//! let mut scheduler = Scheduler::new(TargetRate::StepsPerSecond(60.0));
//! scheduler.start(0.0);
//! let report = scheduler.advance(&mut sim, 500.0);
//! assert!(report.ticks >= 30);
//! ```

// Re-export all subcrates
pub use turmite_agents as agents;
pub use turmite_core as core;
pub use turmite_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use turmite::prelude::*;
/// ```
pub mod prelude {
    pub use turmite_runtime::prelude::*;
}
