//! Turmite Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use turmite_core::prelude::*;
//! ```

// Re-export commonly used types
pub use crate::types::{AgentId, Facing, Position, Tick};

pub use crate::cell::{Cell, PheromoneChannel, Pheromones, COLOR_COUNT, MAX_COLOR, MAX_FOOD, MAX_PHEROMONE};
pub use crate::grid::{DirtySet, Grid, MAX_DIMENSION};
pub use crate::rules::{MoveOp, RuleTable, Transition, HALT_STATE};

// Preset library is used through its module path: `presets::langtons_ant()`
pub use crate::presets;

// Re-export error types
pub use crate::error::{ConfigError, Result, SessionError, TurmiteError};
