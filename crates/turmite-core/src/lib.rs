//! # Turmite Core
//!
//! Core types for turmite colony simulations.
//!
//! A turmite is a Turing machine whose tape is a 2D grid: every tick it reads
//! the color under its head, looks up a transition keyed by
//! `(internal state, observed color)`, writes a new color, turns, and steps.
//! This crate defines the pieces every other crate shares:
//!
//! - **Cell** — one grid location: color, pheromone channels, food, charge, obstacle
//! - **Grid** — a fixed `cols × rows` toroidal field of cells
//! - **DirtySet** — coordinates touched since the last render
//! - **RuleTable** — `state → color → transition`, with the fallback resolution policy
//! - **Presets** — the named rule tables shipped with the engine
//!
//! ## Quick Start
//!
//! ```rust
//! use turmite_core::prelude::*;
//!
//! let grid = Grid::new(16, 16);
//! let rules = presets::langtons_ant();
//!
//! let cell = grid.get(8, 8).unwrap();
//! let transition = rules.resolve(0, cell.color());
//! assert_eq!(transition.write_color, 1);
//! assert_eq!(transition.move_op, MoveOp::TurnRight);
//!
//! assert!(grid.get(16, 0).is_none());
//! ```

pub mod types;
pub mod cell;
pub mod grid;
pub mod rules;
pub mod presets;
pub mod error;
pub mod prelude;
