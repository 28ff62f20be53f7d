//! Ant state serialization for session persistence.
//!
//! The persisted layout is flat and camel-cased:
//! `{x, y, dir, state, type, energy, maxEnergy, task, backpack, memory,
//! taskData, homeLocation, age, individualRule}`. Every field is optional on
//! load so partial or older saves still restore.

use crate::ant::{Ant, Archetype, Inventory, MemoryEntry, Task, TaskData, MAX_MEMORY};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use turmite_core::prelude::*;

/// On-disk form of an [`Ant`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AntRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<AgentId>,
    pub x: i32,
    pub y: i32,
    pub dir: Facing,
    pub state: i32,
    #[serde(rename = "type")]
    pub archetype: Archetype,
    /// Missing energy restores a full tank.
    pub energy: Option<f64>,
    pub max_energy: Option<f64>,
    #[serde(deserialize_with = "task_or_wandering")]
    pub task: Task,
    pub backpack: Option<Inventory>,
    /// Kept raw so one unreadable entry does not reject the whole ant.
    pub memory: Vec<serde_json::Value>,
    pub task_data: TaskData,
    pub home_location: Option<Position>,
    pub age: u64,
    pub individual_rule: Option<RuleTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps_without_food: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_food_location: Option<Position>,
}

impl From<&Ant> for AntRecord {
    fn from(ant: &Ant) -> Self {
        Self {
            id: Some(ant.id),
            x: ant.position.x,
            y: ant.position.y,
            dir: ant.facing,
            state: ant.rule_state,
            archetype: ant.archetype,
            energy: Some(ant.energy),
            max_energy: Some(ant.max_energy),
            task: ant.task,
            backpack: ant.inventory,
            memory: ant
                .memory
                .iter()
                .filter_map(|entry| serde_json::to_value(entry).ok())
                .collect(),
            task_data: ant.task_data,
            home_location: Some(ant.home),
            age: ant.age,
            individual_rule: ant.individual_rules.clone(),
            steps_without_food: Some(ant.steps_without_food),
            last_food_location: ant.last_food_location,
        }
    }
}

impl From<Ant> for AntRecord {
    fn from(ant: Ant) -> Self {
        AntRecord::from(&ant)
    }
}

impl From<AntRecord> for Ant {
    fn from(record: AntRecord) -> Self {
        let position = Position::new(record.x, record.y);
        let mut ant = Ant::new(position, record.dir, record.archetype);
        if let Some(id) = record.id {
            ant.id = id;
        }

        let max_energy = record
            .max_energy
            .filter(|m| m.is_finite() && *m > 0.0)
            .unwrap_or(ant.max_energy);
        ant.max_energy = max_energy;
        ant.energy = record
            .energy
            .filter(|e| e.is_finite())
            .unwrap_or(max_energy)
            .clamp(0.0, max_energy);

        ant.rule_state = record.state;
        ant.task = record.task;
        ant.task_data = record.task_data;
        let capacity = ant.carry_capacity();
        ant.inventory = record
            .backpack
            .map(|b| Inventory {
                amount: if b.amount.is_finite() { b.amount.min(capacity) } else { 0.0 },
                ..b
            })
            .filter(|b| b.amount > 0.0);
        ant.home = record.home_location.unwrap_or(position);
        ant.age = record.age;
        ant.steps_without_food = record.steps_without_food.unwrap_or(0);
        ant.individual_rules = record.individual_rule;
        ant.last_food_location = record.last_food_location;

        let entries: Vec<MemoryEntry> = record
            .memory
            .into_iter()
            .filter_map(|raw| serde_json::from_value(raw).ok())
            .collect();
        let skip = entries.len().saturating_sub(MAX_MEMORY);
        ant.memory = entries.into_iter().skip(skip).collect::<VecDeque<_>>();
        ant
    }
}

/// Unknown or malformed task names load as `WANDERING`.
fn task_or_wandering<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Task, D::Error> {
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw.as_str().and_then(Task::from_name).unwrap_or_default())
}

impl Serialize for Ant {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        AntRecord::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ant {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        AntRecord::deserialize(deserializer).map(Ant::from)
    }
}
