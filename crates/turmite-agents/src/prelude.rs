//! Turmite Agents Prelude — convenient imports for common usage.
//!
//! ```rust
//! use turmite_agents::prelude::*;
//! ```

// Re-export agent types
pub use crate::ant::{
    Ant, AntStatus, Archetype, ArchetypeProfile, Inventory, ItemKind, MemoryEntry, MemoryEvent,
    MemoryKind, Task, TaskData, HOME_TOLERANCE, MAX_MEMORY,
};
pub use crate::step::{StepContext, StepOutcome};
pub use crate::spawn::{spawn_colony, ColonyConfig, InitialFacing, Placement};
pub use crate::serialize::AntRecord;

// Re-export from core
pub use turmite_core::prelude::*;
