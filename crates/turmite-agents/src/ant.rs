//! Ant — a turmite with a body.
//!
//! On top of the automaton state (position, facing, rule state) every ant
//! carries an archetype, an energy budget, a current task, an optional
//! inventory, and a short memory of recent events. Energy running out is a
//! lifecycle transition: the colony removes the ant after the tick.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use turmite_core::prelude::*;

/// Memory capacity; the oldest entry is evicted first.
pub const MAX_MEMORY: usize = 10;
/// Euclidean distance from home that still counts as "at home".
pub const HOME_TOLERANCE: f64 = 2.0;

/// Behavioral profile of an ant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Archetype {
    Worker,
    Scout,
    Soldier,
    Queen,
    #[default]
    #[serde(other)]
    Generic,
}

/// Constant parameters fixed by an archetype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeProfile {
    pub max_energy: f64,
    pub energy_per_step: f64,
    pub carry_capacity: f64,
    pub preferred_tasks: &'static [Task],
    /// How far a scout ventures before heading home.
    pub exploration_radius: Option<f64>,
    /// Patrol radius around home.
    pub territory_radius: Option<f64>,
}

const WORKER: ArchetypeProfile = ArchetypeProfile {
    max_energy: 80.0,
    energy_per_step: 0.1,
    carry_capacity: 10.0,
    preferred_tasks: &[Task::SeekingFood, Task::ReturningHome, Task::Wandering],
    exploration_radius: None,
    territory_radius: None,
};

const SCOUT: ArchetypeProfile = ArchetypeProfile {
    max_energy: 120.0,
    energy_per_step: 0.15,
    carry_capacity: 5.0,
    preferred_tasks: &[Task::Exploring, Task::Wandering],
    exploration_radius: Some(50.0),
    territory_radius: None,
};

const SOLDIER: ArchetypeProfile = ArchetypeProfile {
    max_energy: 150.0,
    energy_per_step: 0.2,
    carry_capacity: 0.0,
    preferred_tasks: &[Task::Patrolling, Task::Defending],
    exploration_radius: None,
    territory_radius: Some(20.0),
};

const QUEEN: ArchetypeProfile = ArchetypeProfile {
    max_energy: 200.0,
    energy_per_step: 0.05,
    carry_capacity: 0.0,
    preferred_tasks: &[Task::LayingEggs, Task::Resting],
    exploration_radius: None,
    territory_radius: None,
};

const GENERIC: ArchetypeProfile = ArchetypeProfile {
    max_energy: 100.0,
    energy_per_step: 0.1,
    carry_capacity: 5.0,
    preferred_tasks: &[Task::Wandering],
    exploration_radius: None,
    territory_radius: None,
};

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::Worker,
        Archetype::Scout,
        Archetype::Soldier,
        Archetype::Queen,
        Archetype::Generic,
    ];

    pub fn profile(self) -> &'static ArchetypeProfile {
        match self {
            Archetype::Worker => &WORKER,
            Archetype::Scout => &SCOUT,
            Archetype::Soldier => &SOLDIER,
            Archetype::Queen => &QUEEN,
            Archetype::Generic => &GENERIC,
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Archetype::Worker => "Worker",
            Archetype::Scout => "Scout",
            Archetype::Soldier => "Soldier",
            Archetype::Queen => "Queen",
            Archetype::Generic => "Generic",
        };
        f.write_str(name)
    }
}

/// What an ant is currently trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Task {
    #[default]
    Wandering,
    SeekingFood,
    ReturningHome,
    Exploring,
    Patrolling,
    Defending,
    LayingEggs,
    Resting,
}

impl Task {
    pub const ALL: [Task; 8] = [
        Task::Wandering,
        Task::SeekingFood,
        Task::ReturningHome,
        Task::Exploring,
        Task::Patrolling,
        Task::Defending,
        Task::LayingEggs,
        Task::Resting,
    ];

    /// Parse the persisted name; `None` for anything unknown.
    pub fn from_name(name: &str) -> Option<Task> {
        Task::ALL.into_iter().find(|task| task.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Task::Wandering => "WANDERING",
            Task::SeekingFood => "SEEKING_FOOD",
            Task::ReturningHome => "RETURNING_HOME",
            Task::Exploring => "EXPLORING",
            Task::Patrolling => "PATROLLING",
            Task::Defending => "DEFENDING",
            Task::LayingEggs => "LAYING_EGGS",
            Task::Resting => "RESTING",
        }
    }

    /// Multiplier applied to the archetype's per-step energy cost.
    pub fn energy_factor(self) -> f64 {
        match self {
            Task::SeekingFood | Task::Exploring => 1.2,
            Task::Resting => 0.5,
            _ => 1.0,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Food,
    #[serde(other)]
    Unknown,
}

/// What an ant is carrying.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Inventory {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub amount: f64,
}

/// Per-task scratch data, reset on every task change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskData {
    pub cooldown: u32,
}

/// An event an ant remembers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemoryEvent {
    #[serde(rename_all = "camelCase")]
    TaskChange {
        old_task: Task,
        new_task: Task,
        location: Position,
    },
    ObstacleHit { location: Position },
    FoodFound { location: Position, amount: f64 },
    FoodDelivered { location: Position, amount: f64 },
    Movement {
        from: Position,
        to: Position,
        direction: Facing,
    },
}

/// Discriminant of [`MemoryEvent`], for memory queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryKind {
    TaskChange,
    ObstacleHit,
    FoodFound,
    FoodDelivered,
    Movement,
}

impl MemoryEvent {
    pub fn kind(&self) -> MemoryKind {
        match self {
            MemoryEvent::TaskChange { .. } => MemoryKind::TaskChange,
            MemoryEvent::ObstacleHit { .. } => MemoryKind::ObstacleHit,
            MemoryEvent::FoodFound { .. } => MemoryKind::FoodFound,
            MemoryEvent::FoodDelivered { .. } => MemoryKind::FoodDelivered,
            MemoryEvent::Movement { .. } => MemoryKind::Movement,
        }
    }
}

/// A remembered event stamped with the tick it happened on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub step: Tick,
    #[serde(flatten)]
    pub event: MemoryEvent,
}

/// One-line view of an ant for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AntStatus {
    #[serde(rename = "type")]
    pub archetype: Archetype,
    pub energy: i64,
    pub task: Task,
    pub carrying: String,
    pub age: u64,
    pub memory_entries: usize,
    pub distance_from_home: i64,
}

impl fmt::Display for AntStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<8} energy {:>4}  {:<15} carrying {:<12} age {:>6}  mem {:>2}  home +{}",
            self.archetype.to_string(),
            self.energy,
            self.task.as_str(),
            self.carrying,
            self.age,
            self.memory_entries,
            self.distance_from_home
        )
    }
}

/// A single turmite agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Ant {
    pub(crate) id: AgentId,
    pub(crate) position: Position,
    pub(crate) facing: Facing,
    pub(crate) rule_state: i32,
    pub(crate) archetype: Archetype,
    pub(crate) energy: f64,
    pub(crate) max_energy: f64,
    pub(crate) task: Task,
    pub(crate) task_data: TaskData,
    pub(crate) inventory: Option<Inventory>,
    pub(crate) memory: VecDeque<MemoryEntry>,
    pub(crate) home: Position,
    pub(crate) individual_rules: Option<RuleTable>,
    pub(crate) age: u64,
    pub(crate) steps_without_food: u64,
    pub(crate) last_food_location: Option<Position>,
}

impl Ant {
    /// A fresh ant at `position`; its home is where it starts.
    pub fn new(position: Position, facing: Facing, archetype: Archetype) -> Self {
        let profile = archetype.profile();
        Self {
            id: AgentId::new(),
            position,
            facing,
            rule_state: 0,
            archetype,
            energy: profile.max_energy,
            max_energy: profile.max_energy,
            task: Task::Wandering,
            task_data: TaskData::default(),
            inventory: None,
            memory: VecDeque::with_capacity(MAX_MEMORY + 1),
            home: position,
            individual_rules: None,
            age: 0,
            steps_without_food: 0,
            last_food_location: None,
        }
    }

    pub fn with_id(mut self, id: AgentId) -> Self {
        self.id = id;
        self
    }

    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.individual_rules = Some(rules);
        self
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn set_facing(&mut self, facing: Facing) {
        self.facing = facing;
    }

    pub fn rule_state(&self) -> i32 {
        self.rule_state
    }

    pub fn set_rule_state(&mut self, state: i32) {
        self.rule_state = state;
    }

    /// HALT freezes the automaton; the ant still ages.
    pub fn is_halted(&self) -> bool {
        self.rule_state == HALT_STATE
    }

    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    pub fn profile(&self) -> &'static ArchetypeProfile {
        self.archetype.profile()
    }

    pub fn carry_capacity(&self) -> f64 {
        self.profile().carry_capacity
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn max_energy(&self) -> f64 {
        self.max_energy
    }

    /// Set energy directly, clamped to `[0, max_energy]`.
    pub fn set_energy(&mut self, energy: f64) {
        self.energy = energy.clamp(0.0, self.max_energy);
    }

    /// Spend energy. Returns whether the ant is still alive.
    pub fn consume_energy(&mut self, amount: f64) -> bool {
        self.energy = (self.energy - amount).max(0.0);
        self.energy > 0.0
    }

    pub fn gain_energy(&mut self, amount: f64) {
        self.energy = (self.energy + amount).min(self.max_energy);
    }

    pub fn is_dead(&self) -> bool {
        self.energy <= 0.0
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn task_data(&self) -> &TaskData {
        &self.task_data
    }

    /// Switch task, clear task data and remember the change.
    pub fn set_task(&mut self, task: Task, step: Tick) {
        let old_task = self.task;
        self.task = task;
        self.task_data = TaskData::default();
        self.remember(
            step,
            MemoryEvent::TaskChange {
                old_task,
                new_task: task,
                location: self.position,
            },
        );
    }

    pub fn inventory(&self) -> Option<&Inventory> {
        self.inventory.as_ref()
    }

    pub fn carried_amount(&self) -> f64 {
        self.inventory.map(|i| i.amount).unwrap_or(0.0)
    }

    pub fn is_carrying(&self, kind: ItemKind) -> bool {
        self.inventory.map(|i| i.kind == kind).unwrap_or(false)
    }

    /// Put up to `amount` of `kind` into the inventory. Returns what fit.
    pub fn pick_up(&mut self, kind: ItemKind, amount: f64) -> f64 {
        let capacity = self.carry_capacity();
        if amount <= 0.0 || capacity <= 0.0 {
            return 0.0;
        }
        match self.inventory.as_mut() {
            None => {
                let picked = amount.min(capacity);
                self.inventory = Some(Inventory { kind, amount: picked });
                picked
            }
            Some(inv) if inv.kind == kind => {
                let picked = amount.min((capacity - inv.amount).max(0.0));
                inv.amount += picked;
                picked
            }
            Some(_) => 0.0,
        }
    }

    /// Remove `amount` (everything when `None`) from the inventory.
    pub fn drop_item(&mut self, amount: Option<f64>) -> Option<Inventory> {
        let inv = self.inventory.as_mut()?;
        let dropped = amount.unwrap_or(inv.amount).min(inv.amount);
        inv.amount -= dropped;
        let kind = inv.kind;
        if inv.amount <= 0.0 {
            self.inventory = None;
        }
        Some(Inventory { kind, amount: dropped })
    }

    pub fn memory(&self) -> impl Iterator<Item = &MemoryEntry> {
        self.memory.iter()
    }

    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    pub fn remember(&mut self, step: Tick, event: MemoryEvent) {
        self.memory.push_back(MemoryEntry { step, event });
        while self.memory.len() > MAX_MEMORY {
            self.memory.pop_front();
        }
    }

    /// Memories of `kind` no older than `max_age` ticks, newest first.
    pub fn recent_memory(&self, kind: MemoryKind, now: Tick, max_age: u64) -> Vec<&MemoryEntry> {
        let mut entries: Vec<&MemoryEntry> = self
            .memory
            .iter()
            .filter(|e| e.event.kind() == kind && now.saturating_sub(e.step) <= max_age)
            .collect();
        entries.sort_by(|a, b| b.step.cmp(&a.step));
        entries
    }

    pub fn home(&self) -> Position {
        self.home
    }

    pub fn distance_to_home(&self) -> f64 {
        self.position.distance_to(&self.home)
    }

    pub fn is_at_home(&self) -> bool {
        self.distance_to_home() <= HOME_TOLERANCE
    }

    pub fn individual_rules(&self) -> Option<&RuleTable> {
        self.individual_rules.as_ref()
    }

    pub fn take_individual_rules(&mut self) -> Option<RuleTable> {
        self.individual_rules.take()
    }

    pub fn set_individual_rules(&mut self, rules: Option<RuleTable>) {
        self.individual_rules = rules;
    }

    /// The table this ant steps with: its own if it has one, else `shared`.
    pub fn rules<'a>(&'a self, shared: &'a RuleTable) -> &'a RuleTable {
        self.individual_rules.as_ref().unwrap_or(shared)
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn steps_without_food(&self) -> u64 {
        self.steps_without_food
    }

    pub fn last_food_location(&self) -> Option<Position> {
        self.last_food_location
    }

    /// Advance counters and pay this tick's energy cost.
    ///
    /// Resting costs half and regains `rest_recovery` on top.
    pub fn age_one_step(&mut self, rest_recovery: f64) {
        self.age += 1;
        self.steps_without_food += 1;

        let cost = self.profile().energy_per_step * self.task.energy_factor();
        self.consume_energy(cost);
        if self.task == Task::Resting && self.energy > 0.0 {
            self.gain_energy(rest_recovery);
        }

        self.task_data.cooldown = self.task_data.cooldown.saturating_sub(1);
    }

    pub fn status(&self) -> AntStatus {
        let carrying = match self.inventory {
            Some(Inventory { kind, amount }) => {
                let name = match kind {
                    ItemKind::Food => "food",
                    ItemKind::Unknown => "item",
                };
                format!("{} ({})", name, amount)
            }
            None => "nothing".to_string(),
        };
        AntStatus {
            archetype: self.archetype,
            energy: self.energy.round() as i64,
            task: self.task,
            carrying,
            age: self.age,
            memory_entries: self.memory.len(),
            distance_from_home: self.distance_to_home().round() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker() -> Ant {
        Ant::new(Position::new(10, 10), Facing::East, Archetype::Worker)
    }

    #[test]
    fn profiles_fix_starting_energy() {
        for archetype in Archetype::ALL {
            let ant = Ant::new(Position::default(), Facing::North, archetype);
            assert_eq!(ant.energy(), archetype.profile().max_energy);
            assert_eq!(ant.task(), Task::Wandering);
        }
        assert_eq!(Archetype::Queen.profile().max_energy, 200.0);
        assert_eq!(Archetype::Soldier.profile().carry_capacity, 0.0);
        assert_eq!(Archetype::Scout.profile().exploration_radius, Some(50.0));
    }

    #[test]
    fn memory_evicts_oldest_first() {
        let mut ant = worker();
        for step in 0..15 {
            ant.remember(step, MemoryEvent::ObstacleHit { location: Position::new(step as i32, 0) });
        }
        assert_eq!(ant.memory_len(), MAX_MEMORY);
        assert_eq!(ant.memory().next().unwrap().step, 5);
    }

    #[test]
    fn recent_memory_is_newest_first_within_window() {
        let mut ant = worker();
        ant.remember(10, MemoryEvent::FoodFound { location: Position::new(1, 1), amount: 3.0 });
        ant.remember(50, MemoryEvent::ObstacleHit { location: Position::new(2, 2) });
        ant.remember(80, MemoryEvent::FoodFound { location: Position::new(3, 3), amount: 4.0 });

        let recent = ant.recent_memory(MemoryKind::FoodFound, 100, 100);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].step, 80);

        let recent = ant.recent_memory(MemoryKind::FoodFound, 150, 100);
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn pick_up_respects_capacity() {
        let mut ant = worker();
        assert_eq!(ant.pick_up(ItemKind::Food, 6.0), 6.0);
        assert_eq!(ant.pick_up(ItemKind::Food, 6.0), 4.0);
        assert_eq!(ant.carried_amount(), 10.0);
        assert_eq!(ant.pick_up(ItemKind::Unknown, 1.0), 0.0);

        let dropped = ant.drop_item(None).unwrap();
        assert_eq!(dropped.amount, 10.0);
        assert!(ant.inventory().is_none());
        assert!(ant.drop_item(None).is_none());
    }

    #[test]
    fn soldiers_carry_nothing() {
        let mut ant = Ant::new(Position::default(), Facing::North, Archetype::Soldier);
        assert_eq!(ant.pick_up(ItemKind::Food, 5.0), 0.0);
        assert!(ant.inventory().is_none());
    }

    #[test]
    fn task_change_is_remembered() {
        let mut ant = worker();
        ant.set_task(Task::SeekingFood, 7);
        let entry = ant.memory().last().unwrap();
        assert_eq!(entry.step, 7);
        assert_eq!(
            entry.event,
            MemoryEvent::TaskChange {
                old_task: Task::Wandering,
                new_task: Task::SeekingFood,
                location: Position::new(10, 10),
            }
        );
    }

    #[test]
    fn aging_scales_cost_by_task() {
        let mut ant = worker();
        ant.age_one_step(0.0);
        assert!((ant.energy() - 79.9).abs() < 1e-9);

        ant.task = Task::SeekingFood;
        ant.age_one_step(0.0);
        assert!((ant.energy() - (79.9 - 0.12)).abs() < 1e-9);
        assert_eq!(ant.age(), 2);
        assert_eq!(ant.steps_without_food(), 2);
    }

    #[test]
    fn home_tolerance_is_euclidean() {
        let mut ant = worker();
        ant.set_position(Position::new(12, 10));
        assert!(ant.is_at_home());
        ant.set_position(Position::new(12, 12));
        assert!(!ant.is_at_home());
    }

    #[test]
    fn status_summary_rounds() {
        let mut ant = worker();
        ant.set_energy(41.6);
        ant.pick_up(ItemKind::Food, 3.0);
        ant.set_position(Position::new(13, 14));
        let status = ant.status();
        assert_eq!(status.energy, 42);
        assert_eq!(status.carrying, "food (3)");
        assert_eq!(status.distance_from_home, 5);
    }

    #[test]
    fn memory_entries_use_type_tags() {
        let entry = MemoryEntry {
            step: 3,
            event: MemoryEvent::TaskChange {
                old_task: Task::Wandering,
                new_task: Task::Resting,
                location: Position::new(1, 2),
            },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "TASK_CHANGE");
        assert_eq!(json["newTask"], "RESTING");
        assert_eq!(json["step"], 3);
    }
}
