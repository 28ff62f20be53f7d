//! Simulation — the explicit state of one turmite world.
//!
//! A simulation owns the grid, the shared rule table, the ant population,
//! the tick counter, the dirty set and the random source. Nothing lives in
//! globals; the scheduler and the renderer both work through this struct.
//!
//! Each tick:
//! 1. Food is injected every `food_interval` ticks
//! 2. Every ant steps once, in population order
//! 3. Ants that ran out of energy are removed after the pass
//! 4. The tick counter advances
//!
//! Pheromone decay is driven by wall-clock time and therefore lives in the
//! scheduler, which calls [`Simulation::decay_pheromones`].

use crate::render::{RenderView, Renderer};
use crate::scheduler::TargetRate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use turmite_agents::prelude::*;

/// Events kept in [`Simulation::event_history`].
pub const HISTORY_CAPACITY: usize = 1_000;

/// Event emitted by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimEvent {
    /// An ant ran out of energy and was removed.
    Died { id: AgentId, archetype: Archetype, position: Position, age: u64 },
    /// An ant entered the HALT state.
    Halted { id: AgentId, position: Position },
    /// Food was dropped onto an empty-ish cell.
    FoodInjected { position: Position, amount: f64 },
    /// The colony was re-seeded and the grid cleared.
    Reset { population: usize },
    /// The grid was cleared; ants kept.
    GridCleared,
    /// A tick completed.
    TickComplete { tick: Tick, alive: usize, dead_this_tick: usize },
}

/// Tunable world parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub cols: usize,
    pub rows: usize,
    /// Seed for every random decision. `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Wall-clock milliseconds between pheromone decays (default: 1000).
    pub decay_interval_ms: u64,
    /// Amount removed from every channel per decay (default: 0.05).
    pub decay_rate: f64,
    /// Ticks between food injections, 0 disables (default: 500).
    pub food_interval: u64,
    /// Deposits per injection, inclusive range (default: 1..=3).
    pub food_deposits: (u32, u32),
    /// Units per deposit, inclusive range (default: 10..=29).
    pub food_amount: (u32, u32),
    /// Cells already holding this much food are skipped (default: 20).
    pub food_skip_threshold: f64,
    /// Upper bound on ticks per scheduler invocation (default: 100000).
    pub max_ticks_per_invocation: u64,
    pub target_rate: TargetRate,
    /// Energy regained per tick while resting (default: 0.25).
    pub rest_recovery: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cols: 100,
            rows: 100,
            seed: None,
            decay_interval_ms: 1_000,
            decay_rate: 0.05,
            food_interval: 500,
            food_deposits: (1, 3),
            food_amount: (10, 29),
            food_skip_threshold: 20.0,
            max_ticks_per_invocation: 100_000,
            target_rate: TargetRate::default(),
            rest_recovery: 0.25,
        }
    }
}

impl SimulationConfig {
    /// Bring out-of-range values back into range.
    pub fn clamped(&self) -> Self {
        let order = |(a, b): (u32, u32)| (a.min(b), a.max(b));
        Self {
            cols: self.cols.clamp(1, MAX_DIMENSION),
            rows: self.rows.clamp(1, MAX_DIMENSION),
            decay_interval_ms: self.decay_interval_ms.max(1),
            decay_rate: finite_or(self.decay_rate, 0.05).max(0.0),
            food_deposits: order(self.food_deposits),
            food_amount: order(self.food_amount),
            food_skip_threshold: finite_or(self.food_skip_threshold, 20.0),
            max_ticks_per_invocation: self.max_ticks_per_invocation.max(1),
            target_rate: self.target_rate.clamped(),
            rest_recovery: finite_or(self.rest_recovery, 0.25).max(0.0),
            ..self.clone()
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Statistics about the simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationStats {
    pub tick: Tick,
    pub alive: usize,
    pub died: usize,
    pub total_spawned: usize,
    pub halted: usize,
    pub by_archetype: BTreeMap<Archetype, usize>,
    pub by_task: BTreeMap<Task, usize>,
    pub total_food: f64,
    pub colored_cells: usize,
}

/// What a renderer needs to draw one ant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub position: Position,
    pub facing: Facing,
    pub archetype: Archetype,
    pub task: Task,
    pub energy: f64,
    pub rule_state: i32,
}

impl From<&Ant> for AgentSnapshot {
    fn from(ant: &Ant) -> Self {
        Self {
            id: ant.id(),
            position: ant.position(),
            facing: ant.facing(),
            archetype: ant.archetype(),
            task: ant.task(),
            energy: ant.energy(),
            rule_state: ant.rule_state(),
        }
    }
}

/// A serializable snapshot of the simulation at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSnapshot {
    pub tick: Tick,
    pub cols: usize,
    pub rows: usize,
    pub agents: Vec<AgentSnapshot>,
    pub stats: SimulationStats,
}

/// One turmite world.
pub struct Simulation {
    config: SimulationConfig,
    colony: ColonyConfig,
    grid: Grid,
    rules: RuleTable,
    ants: Vec<Ant>,
    tick: Tick,
    dirty: DirtySet,
    rng: StdRng,
    total_died: usize,
    total_spawned: usize,
    event_history: VecDeque<(Tick, SimEvent)>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.tick)
            .field("cols", &self.grid.cols())
            .field("rows", &self.grid.rows())
            .field("ants", &self.ants.len())
            .field("states", &self.rules.state_count())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// A 100×100 world with one Langton's ant at the center.
    pub fn new() -> Self {
        Self::from_config(
            SimulationConfig::default(),
            ColonyConfig::default(),
            presets::langtons_ant(),
        )
    }

    /// Build a world and seed its colony.
    pub fn from_config(config: SimulationConfig, colony: ColonyConfig, rules: RuleTable) -> Self {
        let config = config.clamped();
        let colony = colony.clamped();
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let rules = if rules.is_empty() {
            presets::langtons_ant()
        } else {
            rules
        };
        let ants = spawn_colony(&colony, config.cols, config.rows, &[], &mut rng);
        let mut dirty = DirtySet::new();
        dirty.mark_all();

        tracing::info!(
            cols = config.cols,
            rows = config.rows,
            population = ants.len(),
            states = rules.state_count(),
            "simulation created"
        );

        Self {
            grid: Grid::new(config.cols, config.rows),
            total_spawned: ants.len(),
            config,
            colony,
            rules,
            ants,
            tick: 0,
            dirty,
            rng,
            total_died: 0,
            event_history: VecDeque::new(),
        }
    }

    /// Rebuild a world from persisted parts. The grid's own size wins over
    /// the size recorded in `config`; an empty grid is replaced by a blank
    /// one of the configured size.
    pub fn restore(
        config: SimulationConfig,
        colony: ColonyConfig,
        rules: RuleTable,
        grid: Grid,
        ants: Vec<Ant>,
        tick: Tick,
    ) -> Self {
        let mut config = config.clamped();
        let grid = if grid.is_empty() {
            Grid::new(config.cols, config.rows)
        } else {
            grid
        };
        config.cols = grid.cols();
        config.rows = grid.rows();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(tick)),
            None => StdRng::from_entropy(),
        };
        let mut dirty = DirtySet::new();
        dirty.mark_all();

        Self {
            total_spawned: ants.len(),
            config,
            colony: colony.clamped(),
            grid,
            rules,
            ants,
            tick,
            dirty,
            rng,
            total_died: 0,
            event_history: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn colony_config(&self) -> &ColonyConfig {
        &self.colony
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid access. The next frame is redrawn in full.
    pub fn grid_mut(&mut self) -> &mut Grid {
        self.dirty.mark_all();
        &mut self.grid
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    pub fn ants_mut(&mut self) -> &mut [Ant] {
        &mut self.ants
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn alive_count(&self) -> usize {
        self.ants.len()
    }

    pub fn dirty(&self) -> &DirtySet {
        &self.dirty
    }

    /// Hand the accumulated dirty set to the caller and start a new one.
    pub fn take_dirty(&mut self) -> DirtySet {
        self.dirty.take()
    }

    pub fn event_history(&self) -> impl Iterator<Item = &(Tick, SimEvent)> {
        self.event_history.iter()
    }

    /// Add an ant to the population.
    pub fn spawn(&mut self, ant: Ant) -> AgentId {
        let id = ant.id();
        self.ants.push(ant);
        self.total_spawned += 1;
        id
    }

    /// Run one tick.
    pub fn tick(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();

        // Phase 1: Food injection
        if self.config.food_interval > 0 && self.tick % self.config.food_interval == 0 {
            events.extend(self.inject_food());
        }

        // Phase 2: Every ant steps once
        let mut to_die = Vec::new();
        {
            let mut ctx = StepContext {
                grid: &mut self.grid,
                rules: &self.rules,
                dirty: &mut self.dirty,
                tick: self.tick,
                rng: &mut self.rng,
                rest_recovery: self.config.rest_recovery,
            };
            for (idx, ant) in self.ants.iter_mut().enumerate() {
                let was_halted = ant.is_halted();
                match ant.step(&mut ctx) {
                    StepOutcome::Died => to_die.push(idx),
                    StepOutcome::Active if !was_halted && ant.is_halted() => {
                        tracing::debug!(id = %ant.id().0, position = %ant.position(), "ant halted");
                        events.push(SimEvent::Halted {
                            id: ant.id(),
                            position: ant.position(),
                        });
                    }
                    _ => {}
                }
            }
        }

        // Phase 3: Remove dead ants
        let dead_count = to_die.len();
        for idx in to_die.into_iter().rev() {
            let ant = self.ants.remove(idx);
            tracing::debug!(
                id = %ant.id().0,
                archetype = %ant.archetype(),
                age = ant.age(),
                "ant died from energy depletion"
            );
            events.push(SimEvent::Died {
                id: ant.id(),
                archetype: ant.archetype(),
                position: ant.position(),
                age: ant.age(),
            });
            self.total_died += 1;
        }

        // Phase 4: Advance tick
        self.tick += 1;
        events.push(SimEvent::TickComplete {
            tick: self.tick,
            alive: self.ants.len(),
            dead_this_tick: dead_count,
        });

        for event in &events {
            self.record(event.clone());
        }
        events
    }

    /// Run the simulation for N ticks.
    pub fn run(&mut self, ticks: u64) -> Vec<Vec<SimEvent>> {
        (0..ticks).map(|_| self.tick()).collect()
    }

    fn record(&mut self, event: SimEvent) {
        if self.event_history.len() == HISTORY_CAPACITY {
            self.event_history.pop_front();
        }
        self.event_history.push_back((self.tick, event));
    }

    /// Drop 1–3 random food deposits, skipping cells that already hold plenty.
    pub fn inject_food(&mut self) -> Vec<SimEvent> {
        if self.grid.is_empty() {
            return Vec::new();
        }
        let (min_deposits, max_deposits) = self.config.food_deposits;
        let (min_amount, max_amount) = self.config.food_amount;
        let deposits = self.rng.gen_range(min_deposits..=max_deposits);

        let mut events = Vec::new();
        for _ in 0..deposits {
            let x = self.rng.gen_range(0..self.grid.cols()) as i32;
            let y = self.rng.gen_range(0..self.grid.rows()) as i32;
            let amount = f64::from(self.rng.gen_range(min_amount..=max_amount));
            let Some(cell) = self.grid.get_mut(x, y) else {
                continue;
            };
            if cell.food() >= self.config.food_skip_threshold {
                continue;
            }
            cell.add_food(amount);
            let position = Position::new(x, y);
            self.dirty.mark(position);
            tracing::debug!(%position, amount, "food injected");
            events.push(SimEvent::FoodInjected { position, amount });
        }
        events
    }

    /// Decay every pheromone channel by `rate`. Cells whose "has any
    /// pheromone" status flips are marked dirty; returns how many flipped.
    pub fn decay_pheromones(&mut self, rate: f64) -> usize {
        let mut flipped = Vec::new();
        for (pos, cell) in self.grid.iter_mut() {
            let before = cell.has_pheromones();
            cell.decay_pheromones(rate);
            if before != cell.has_pheromones() {
                flipped.push(pos);
            }
        }
        for pos in &flipped {
            self.dirty.mark(*pos);
        }
        flipped.len()
    }

    /// Swap the shared rule table and re-seed the world.
    ///
    /// Per-ant tables survive only when the colony is configured to keep them.
    pub fn replace_rules(&mut self, rules: RuleTable) -> SimEvent {
        if !rules.is_empty() {
            self.rules = rules;
        }
        self.reset()
    }

    /// Replace the colony configuration and re-seed the world.
    pub fn set_colony_config(&mut self, colony: ColonyConfig) -> SimEvent {
        self.colony = colony.clamped();
        self.reset()
    }

    /// Clear the grid, zero the counters and spawn a fresh colony.
    pub fn reset(&mut self) -> SimEvent {
        let preserved: Vec<RuleTable> =
            if self.colony.preserve_individual_rules && self.colony.uses_individual_rules() {
                self.ants
                    .iter_mut()
                    .filter_map(|ant| ant.take_individual_rules())
                    .collect()
            } else {
                Vec::new()
            };

        self.grid.clear();
        self.ants = spawn_colony(
            &self.colony,
            self.grid.cols(),
            self.grid.rows(),
            &preserved,
            &mut self.rng,
        );
        self.tick = 0;
        self.total_died = 0;
        self.total_spawned = self.ants.len();
        self.event_history.clear();
        self.dirty.mark_all();

        tracing::info!(
            population = self.ants.len(),
            preserved = preserved.len(),
            states = self.rules.state_count(),
            "simulation reset"
        );
        let event = SimEvent::Reset {
            population: self.ants.len(),
        };
        self.record(event.clone());
        event
    }

    /// Reset every cell while keeping the population where it is.
    pub fn clear_grid(&mut self) -> SimEvent {
        self.grid.clear();
        self.dirty.mark_all();
        tracing::info!("grid cleared");
        self.record(SimEvent::GridCleared);
        SimEvent::GridCleared
    }

    /// Hand the renderer a read-only view, then clear the dirty set.
    pub fn render_with<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        let view = RenderView {
            tick: self.tick,
            grid: &self.grid,
            ants: &self.ants,
            dirty: &self.dirty,
        };
        renderer.render(&view);
        self.dirty.clear();
    }

    pub fn stats(&self) -> SimulationStats {
        let mut by_archetype = BTreeMap::new();
        let mut by_task = BTreeMap::new();
        for ant in &self.ants {
            *by_archetype.entry(ant.archetype()).or_insert(0) += 1;
            *by_task.entry(ant.task()).or_insert(0) += 1;
        }
        SimulationStats {
            tick: self.tick,
            alive: self.ants.len(),
            died: self.total_died,
            total_spawned: self.total_spawned,
            halted: self.ants.iter().filter(|a| a.is_halted()).count(),
            by_archetype,
            by_task,
            total_food: self.grid.total_food(),
            colored_cells: self.grid.colored_cells(),
        }
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            tick: self.tick,
            cols: self.grid.cols(),
            rows: self.grid.rows(),
            agents: self.ants.iter().map(AgentSnapshot::from).collect(),
            stats: self.stats(),
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}
