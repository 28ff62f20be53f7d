//! Turmite Runtime Prelude — convenient imports for common usage.
//!
//! ```rust
//! use turmite_runtime::prelude::*;
//! ```

// Re-export simulation
pub use crate::simulation::{
    AgentSnapshot, SimEvent, Simulation, SimulationConfig, SimulationSnapshot, SimulationStats,
};

// Re-export scheduling
pub use crate::scheduler::{
    map_slider_to_speed, AdvanceReport, Clock, ManualClock, RunState, Scheduler, SystemClock,
    TargetRate, MAX_DECAYS_PER_ADVANCE, MAX_STEPS_PER_SECOND,
};

// Re-export rendering seam
pub use crate::render::{FrameCounter, RenderView, Renderer};

// Re-export colony builder
pub use crate::colony_builder::ColonyBuilder;

// Re-export session
pub use crate::session::{
    load_session, restore_session, save_session, SessionMetadata, SessionState, SESSION_VERSION,
};

// Re-export async runtime when feature is enabled
#[cfg(feature = "async")]
pub use crate::async_runtime::{
    spawn_driver, ControlMessage, DriverConfig, DriverHandle, DriverReport,
};

// Re-export from agents
pub use turmite_agents::prelude::*;
