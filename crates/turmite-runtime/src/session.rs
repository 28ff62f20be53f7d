//! Session persistence — save/load a whole world as JSON.
//!
//! A session file holds metadata, the shared rule table, every cell and
//! every ant, plus the configs the world was built with. All fields are
//! optional on load: missing cells come back blank, missing ants come back
//! as an empty colony.

use crate::simulation::{Simulation, SimulationConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use turmite_agents::prelude::*;

/// Bumped when the file layout changes incompatibly.
pub const SESSION_VERSION: u32 = 1;

/// Serializable state of a simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub metadata: SessionMetadata,
    #[serde(default)]
    pub rules: RuleTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<Grid>,
    #[serde(default)]
    pub ants: Vec<Ant>,
    #[serde(default)]
    pub config: SimulationConfig,
    #[serde(default)]
    pub colony: ColonyConfig,
}

/// Session metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionMetadata {
    pub session_id: String,
    pub version: u32,
    pub tick: Tick,
    pub cols: usize,
    pub rows: usize,
    pub agent_count: usize,
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self {
            session_id: String::new(),
            version: SESSION_VERSION,
            tick: 0,
            cols: 0,
            rows: 0,
            agent_count: 0,
        }
    }
}

impl SessionState {
    /// Capture the current state of a simulation.
    pub fn capture(sim: &Simulation) -> Self {
        Self {
            metadata: SessionMetadata {
                session_id: uuid::Uuid::new_v4().to_string(),
                version: SESSION_VERSION,
                tick: sim.current_tick(),
                cols: sim.grid().cols(),
                rows: sim.grid().rows(),
                agent_count: sim.alive_count(),
            },
            rules: sim.rules().clone(),
            grid: Some(sim.grid().clone()),
            ants: sim.ants().to_vec(),
            config: sim.config().clone(),
            colony: sim.colony_config().clone(),
        }
    }

    /// Rebuild a simulation from this state.
    ///
    /// Without a usable stored grid, a blank one is sized from the metadata,
    /// then from the stored config.
    pub fn into_simulation(self) -> Simulation {
        let grid = self.grid.filter(|g| !g.is_empty()).unwrap_or_else(|| {
            let (cols, rows) = if self.metadata.cols > 0 && self.metadata.rows > 0 {
                (
                    self.metadata.cols.min(MAX_DIMENSION),
                    self.metadata.rows.min(MAX_DIMENSION),
                )
            } else {
                (self.config.cols.max(1), self.config.rows.max(1))
            };
            Grid::new(cols, rows)
        });
        let rules = if self.rules.is_empty() {
            presets::langtons_ant()
        } else {
            self.rules
        };
        Simulation::restore(
            self.config,
            self.colony,
            rules,
            grid,
            self.ants,
            self.metadata.tick,
        )
    }
}

/// Save a simulation to a JSON file, creating parent directories.
pub fn save_session(sim: &Simulation, path: &Path) -> Result<SessionMetadata> {
    let state = SessionState::capture(sim);
    let json = serde_json::to_string_pretty(&state)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;

    tracing::info!(
        path = %path.display(),
        tick = state.metadata.tick,
        agents = state.metadata.agent_count,
        "session saved"
    );
    Ok(state.metadata)
}

/// Load a saved session from JSON.
pub fn load_session(path: &Path) -> Result<SessionState> {
    if !path.exists() {
        return Err(TurmiteError::session_not_found(path.display().to_string()));
    }
    let json = std::fs::read_to_string(path)?;
    let state: SessionState = serde_json::from_str(&json)
        .map_err(|e| TurmiteError::Session(SessionError::Corrupt(e.to_string())))?;

    if state.metadata.version > SESSION_VERSION {
        return Err(TurmiteError::Session(SessionError::VersionMismatch {
            expected: SESSION_VERSION.to_string(),
            found: state.metadata.version.to_string(),
        }));
    }

    tracing::info!(
        path = %path.display(),
        tick = state.metadata.tick,
        agents = state.ants.len(),
        "session loaded"
    );
    Ok(state)
}

/// Load a session and rebuild its simulation in one go.
pub fn restore_session(path: &Path) -> Result<Simulation> {
    load_session(path).map(SessionState::into_simulation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SimEvent;
    use tempfile::TempDir;

    fn busy_world() -> Simulation {
        let config = SimulationConfig {
            cols: 30,
            rows: 20,
            seed: Some(42),
            food_interval: 10,
            ..SimulationConfig::default()
        };
        let colony = ColonyConfig {
            population: 12,
            placement: Placement::Random,
            individual_rules: true,
            max_states: 3,
            max_colors: 3,
            ..ColonyConfig::default()
        };
        let mut sim = Simulation::from_config(config, colony, presets::symmetrical());
        sim.run(40);
        sim
    }

    #[test]
    fn save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("session.json");
        let sim = busy_world();

        let metadata = save_session(&sim, &path).unwrap();
        assert_eq!(metadata.tick, 40);
        assert_eq!(metadata.agent_count, sim.alive_count());

        let restored = restore_session(&path).unwrap();
        assert_eq!(restored.current_tick(), 40);
        assert_eq!(restored.grid(), sim.grid());
        assert_eq!(restored.ants(), sim.ants());
        assert_eq!(restored.rules(), sim.rules());
        assert_eq!(restored.colony_config(), sim.colony_config());
        assert!(restored.dirty().needs_full_redraw());
    }

    #[test]
    fn restored_world_keeps_running() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("session.json");
        save_session(&busy_world(), &path).unwrap();

        let mut restored = restore_session(&path).unwrap();
        restored.run(10);
        assert_eq!(restored.current_tick(), 50);
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = load_session(&tmp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, TurmiteError::Session(SessionError::NotFound(_))));
    }

    #[test]
    fn garbage_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_session(&path).unwrap_err();
        assert!(matches!(err, TurmiteError::Session(SessionError::Corrupt(_))));
    }

    #[test]
    fn newer_version_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("future.json");
        std::fs::write(&path, r#"{"metadata": {"version": 99}}"#).unwrap();
        let err = load_session(&path).unwrap_err();
        assert!(matches!(
            err,
            TurmiteError::Session(SessionError::VersionMismatch { ref expected, ref found })
                if expected == "1" && found == "99"
        ));
    }

    #[test]
    fn sparse_file_fills_in_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sparse.json");
        std::fs::write(
            &path,
            r#"{"metadata": {"tick": 7, "cols": 12, "rows": 9},
                "ants": [{"x": 3, "y": 4, "type": "Worker"}]}"#,
        )
        .unwrap();

        let sim = restore_session(&path).unwrap();
        assert_eq!(sim.current_tick(), 7);
        assert_eq!((sim.grid().cols(), sim.grid().rows()), (12, 9));
        assert_eq!(sim.rules(), &presets::langtons_ant());
        assert_eq!(sim.ants().len(), 1);
        assert_eq!(sim.ants()[0].energy(), 80.0);
    }

    #[test]
    fn sizeless_grid_falls_back_to_config_size() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sizeless.json");
        std::fs::write(&path, r#"{"grid": {}, "ants": [{"x": 1, "y": 1}]}"#).unwrap();

        let mut sim = restore_session(&path).unwrap();
        assert_eq!((sim.grid().cols(), sim.grid().rows()), (100, 100));
        let events = sim.tick();
        assert!(events
            .iter()
            .any(|e| matches!(e, SimEvent::TickComplete { tick: 1, .. })));
        assert_eq!(sim.current_tick(), 1);
    }

    #[test]
    fn oversized_metadata_is_capped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("oversized.json");
        std::fs::write(&path, r#"{"metadata": {"cols": 100000, "rows": 3}}"#).unwrap();

        let sim = restore_session(&path).unwrap();
        assert_eq!((sim.grid().cols(), sim.grid().rows()), (MAX_DIMENSION, 3));
    }
}
