//! Colony builder.
//!
//! Collects world, colony and pacing settings, resolves the rule table
//! (explicit table, preset name, or a random table) and builds a
//! [`Simulation`], optionally resuming from a saved session instead.
//!
//! # Example
//!
//! ```rust
//! use turmite_runtime::prelude::*;
//!
//! let mut sim = ColonyBuilder::new()
//!     .grid_size(64, 48)
//!     .seed(9)
//!     .preset("snowflake")
//!     .population(5)
//!     .placement(Placement::Grid)
//!     .build()
//!     .unwrap();
//!
//! sim.run(100);
//! assert_eq!(sim.current_tick(), 100);
//! ```

use crate::scheduler::{Scheduler, TargetRate};
use crate::session::restore_session;
use crate::simulation::{Simulation, SimulationConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use turmite_agents::prelude::*;

/// Where the shared rule table comes from.
#[derive(Debug, Clone, PartialEq)]
enum RuleSource {
    Table(RuleTable),
    Preset(String),
    Random { states: usize, colors: usize },
}

/// Builder for simulations.
#[derive(Debug, Clone)]
pub struct ColonyBuilder {
    config: SimulationConfig,
    colony: ColonyConfig,
    rules: RuleSource,
    resume_from: Option<PathBuf>,
}

impl Default for ColonyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ColonyBuilder {
    /// Defaults: 100×100, one ant, Langton's ant.
    pub fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
            colony: ColonyConfig::default(),
            rules: RuleSource::Table(presets::langtons_ant()),
            resume_from: None,
        }
    }

    /// Replace every world setting at once.
    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace every colony setting at once.
    pub fn with_colony(mut self, colony: ColonyConfig) -> Self {
        self.colony = colony;
        self
    }

    pub fn grid_size(mut self, cols: usize, rows: usize) -> Self {
        self.config.cols = cols;
        self.config.rows = rows;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn rules(mut self, rules: RuleTable) -> Self {
        self.rules = RuleSource::Table(rules);
        self
    }

    /// Resolved on [`build`](Self::build); unknown names fail there.
    pub fn preset(mut self, name: impl Into<String>) -> Self {
        self.rules = RuleSource::Preset(name.into());
        self
    }

    /// A random shared table drawn from the builder's seed.
    pub fn random_rules(mut self, states: usize, colors: usize) -> Self {
        self.rules = RuleSource::Random { states, colors };
        self
    }

    pub fn population(mut self, population: usize) -> Self {
        self.colony.population = population;
        self
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.colony.placement = placement;
        self
    }

    pub fn facing(mut self, facing: InitialFacing) -> Self {
        self.colony.facing = facing;
        self
    }

    /// Give every ant its own random table with up to `max_states` states
    /// and `max_colors` colors.
    pub fn individual_rules(mut self, max_states: usize, max_colors: usize) -> Self {
        self.colony.individual_rules = true;
        self.colony.max_states = max_states;
        self.colony.max_colors = max_colors;
        self
    }

    pub fn preserve_individual_rules(mut self, enabled: bool) -> Self {
        self.colony.preserve_individual_rules = enabled;
        self
    }

    pub fn target_rate(mut self, target: TargetRate) -> Self {
        self.config.target_rate = target;
        self
    }

    /// Ticks between food injections; 0 disables injection.
    pub fn food_interval(mut self, ticks: u64) -> Self {
        self.config.food_interval = ticks;
        self
    }

    pub fn pheromone_decay(mut self, interval_ms: u64, rate: f64) -> Self {
        self.config.decay_interval_ms = interval_ms;
        self.config.decay_rate = rate;
        self
    }

    pub fn rest_recovery(mut self, per_tick: f64) -> Self {
        self.config.rest_recovery = per_tick;
        self
    }

    /// Load this session on build instead of seeding a fresh colony.
    pub fn resume_from<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.resume_from = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the simulation.
    pub fn build(self) -> Result<Simulation> {
        if let Some(path) = &self.resume_from {
            return restore_session(path);
        }
        let rules = match self.rules {
            RuleSource::Table(rules) => rules,
            RuleSource::Preset(name) => presets::by_name(&name)?,
            RuleSource::Random { states, colors } => {
                let mut rng = match self.config.seed {
                    Some(seed) => StdRng::seed_from_u64(seed ^ 0x5eed),
                    None => StdRng::from_entropy(),
                };
                RuleTable::random(states.max(1), colors.clamp(2, COLOR_COUNT), &mut rng)
            }
        };
        Ok(Simulation::from_config(self.config, self.colony, rules))
    }

    /// Build the simulation together with a scheduler paced by the same
    /// config.
    pub fn build_with_scheduler(self) -> Result<(Simulation, Scheduler)> {
        let sim = self.build()?;
        let scheduler = Scheduler::from_config(sim.config());
        Ok((sim, scheduler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::save_session;

    #[test]
    fn builder_defaults_match_simulation_defaults() {
        let sim = ColonyBuilder::new().seed(1).build().unwrap();
        assert_eq!(sim.grid().cols(), 100);
        assert_eq!(sim.alive_count(), 1);
        assert_eq!(sim.rules(), &presets::langtons_ant());
    }

    #[test]
    fn unknown_preset_fails_on_build() {
        let err = ColonyBuilder::new().preset("glider").build().err().unwrap();
        assert!(matches!(err, TurmiteError::UnknownPreset(_)));
    }

    #[test]
    fn colony_settings_flow_through() {
        let sim = ColonyBuilder::new()
            .grid_size(40, 30)
            .seed(4)
            .population(500)
            .placement(Placement::Random)
            .facing(InitialFacing::North)
            .individual_rules(4, 5)
            .build()
            .unwrap();
        assert_eq!(sim.alive_count(), 100);
        assert!(sim.ants().iter().all(|a| a.facing() == Facing::North));
        assert!(sim.ants().iter().all(|a| a.individual_rules().is_some()));
    }

    #[test]
    fn random_rules_are_reproducible() {
        let a = ColonyBuilder::new().seed(8).random_rules(3, 4).build().unwrap();
        let b = ColonyBuilder::new().seed(8).random_rules(3, 4).build().unwrap();
        assert_eq!(a.rules(), b.rules());
        assert_eq!(a.rules().state_count(), 3);
        assert_eq!(a.rules().color_count(), 4);
    }

    #[test]
    fn scheduler_shares_pacing() {
        let (_, scheduler) = ColonyBuilder::new()
            .seed(2)
            .target_rate(TargetRate::StepsPerSecond(250.0))
            .build_with_scheduler()
            .unwrap();
        assert_eq!(scheduler.tick_duration_ms(), 4.0);
    }

    #[test]
    fn resume_from_session() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("saved.json");
        let mut sim = ColonyBuilder::new().seed(3).grid_size(20, 20).build().unwrap();
        sim.run(12);
        save_session(&sim, &path).unwrap();

        let resumed = ColonyBuilder::new().resume_from(&path).build().unwrap();
        assert_eq!(resumed.current_tick(), 12);
        assert_eq!(resumed.grid(), sim.grid());
    }
}
