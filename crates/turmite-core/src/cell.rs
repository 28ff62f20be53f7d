//! Cell — the environmental state of a single grid location.
//!
//! Every bounded field is clamped on every mutation, including
//! deserialization, so a cell can never hold an out-of-range value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Highest color index a cell can hold.
pub const MAX_COLOR: u8 = 11;
/// Number of distinct cell colors.
pub const COLOR_COUNT: usize = MAX_COLOR as usize + 1;
/// Upper bound for every pheromone channel.
pub const MAX_PHEROMONE: f64 = 100.0;
/// Upper bound for the food store of a cell.
pub const MAX_FOOD: f64 = 100.0;

/// One of the three pheromone trails a cell carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PheromoneChannel {
    /// Home/food trail.
    #[serde(rename = "trail_A")]
    A,
    /// Exploration/territory trail.
    #[serde(rename = "trail_B")]
    B,
    /// Presence/communication trail.
    #[serde(rename = "trail_C")]
    C,
}

impl PheromoneChannel {
    pub const ALL: [PheromoneChannel; 3] = [PheromoneChannel::A, PheromoneChannel::B, PheromoneChannel::C];
}

/// Pheromone levels for the three channels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pheromones {
    #[serde(rename = "trail_A", default)]
    pub trail_a: f64,
    #[serde(rename = "trail_B", default)]
    pub trail_b: f64,
    #[serde(rename = "trail_C", default)]
    pub trail_c: f64,
}

impl Pheromones {
    pub fn get(&self, channel: PheromoneChannel) -> f64 {
        match channel {
            PheromoneChannel::A => self.trail_a,
            PheromoneChannel::B => self.trail_b,
            PheromoneChannel::C => self.trail_c,
        }
    }

    fn slot(&mut self, channel: PheromoneChannel) -> &mut f64 {
        match channel {
            PheromoneChannel::A => &mut self.trail_a,
            PheromoneChannel::B => &mut self.trail_b,
            PheromoneChannel::C => &mut self.trail_c,
        }
    }

    fn clamped(self) -> Self {
        Self {
            trail_a: clamp_level(self.trail_a, MAX_PHEROMONE),
            trail_b: clamp_level(self.trail_b, MAX_PHEROMONE),
            trail_c: clamp_level(self.trail_c, MAX_PHEROMONE),
        }
    }
}

/// The state of a single grid location.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "CellRecord")]
pub struct Cell {
    color: u8,
    pheromones: Pheromones,
    food: f64,
    charge: i8,
    obstacle: bool,
    metadata: BTreeMap<String, serde_json::Value>,
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(&self) -> u8 {
        self.color
    }

    /// Set the color, clamped to `[0, MAX_COLOR]`.
    pub fn set_color(&mut self, color: i32) {
        self.color = color.clamp(0, MAX_COLOR as i32) as u8;
    }

    pub fn pheromones(&self) -> &Pheromones {
        &self.pheromones
    }

    pub fn pheromone(&self, channel: PheromoneChannel) -> f64 {
        self.pheromones.get(channel)
    }

    /// Add to one channel; the result is clamped to `[0, MAX_PHEROMONE]`.
    pub fn add_pheromone(&mut self, channel: PheromoneChannel, amount: f64) {
        if !amount.is_finite() {
            return;
        }
        let slot = self.pheromones.slot(channel);
        *slot = clamp_level(*slot + amount, MAX_PHEROMONE);
    }

    /// Subtract `rate` from every channel, floored at zero.
    pub fn decay_pheromones(&mut self, rate: f64) {
        if !rate.is_finite() {
            return;
        }
        for channel in PheromoneChannel::ALL {
            let slot = self.pheromones.slot(channel);
            *slot = clamp_level(*slot - rate, MAX_PHEROMONE);
        }
    }

    pub fn has_pheromones(&self) -> bool {
        PheromoneChannel::ALL.iter().any(|c| self.pheromone(*c) > 0.0)
    }

    pub fn food(&self) -> f64 {
        self.food
    }

    /// Add food, clamped to `[0, MAX_FOOD]`.
    pub fn add_food(&mut self, amount: f64) {
        if !amount.is_finite() {
            return;
        }
        self.food = clamp_level(self.food + amount, MAX_FOOD);
    }

    /// Remove up to `amount` food and return what was actually removed.
    pub fn consume_food(&mut self, amount: f64) -> f64 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let consumed = amount.min(self.food);
        self.food = clamp_level(self.food - consumed, MAX_FOOD);
        consumed
    }

    pub fn charge(&self) -> i8 {
        self.charge
    }

    /// Set the charge, clamped to `{-1, 0, 1}`.
    pub fn set_charge(&mut self, charge: i32) {
        self.charge = charge.clamp(-1, 1) as i8;
    }

    pub fn is_obstacle(&self) -> bool {
        self.obstacle
    }

    pub fn is_passable(&self) -> bool {
        !self.obstacle
    }

    pub fn set_obstacle(&mut self, obstacle: bool) {
        self.obstacle = obstacle;
    }

    /// Free-form extension data, round-tripped through sessions untouched.
    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut BTreeMap<String, serde_json::Value> {
        &mut self.metadata
    }
}

fn clamp_level(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}

/// Lenient on-disk form of a cell. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CellRecord {
    color: i64,
    pheromones: Pheromones,
    food: f64,
    charge: i64,
    obstacle: bool,
    metadata: BTreeMap<String, serde_json::Value>,
}

impl From<CellRecord> for Cell {
    fn from(record: CellRecord) -> Self {
        Self {
            color: record.color.clamp(0, MAX_COLOR as i64) as u8,
            pheromones: record.pheromones.clamped(),
            food: clamp_level(record.food, MAX_FOOD),
            charge: record.charge.clamp(-1, 1) as i8,
            obstacle: record.obstacle,
            metadata: record.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn assert_in_bounds(cell: &Cell) {
        assert!(cell.color() <= MAX_COLOR);
        for channel in PheromoneChannel::ALL {
            let level = cell.pheromone(channel);
            assert!((0.0..=MAX_PHEROMONE).contains(&level), "{:?} = {}", channel, level);
        }
        assert!((0.0..=MAX_FOOD).contains(&cell.food()));
        assert!((-1..=1).contains(&cell.charge()));
    }

    #[test]
    fn defaults_are_empty() {
        let cell = Cell::new();
        assert_eq!(cell.color(), 0);
        assert!(!cell.has_pheromones());
        assert_eq!(cell.food(), 0.0);
        assert_eq!(cell.charge(), 0);
        assert!(cell.is_passable());
    }

    #[test]
    fn random_mutations_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut cell = Cell::new();
        for _ in 0..5_000 {
            match rng.gen_range(0..6) {
                0 => cell.set_color(rng.gen_range(-50..50)),
                1 => {
                    let channel = PheromoneChannel::ALL[rng.gen_range(0..3)];
                    cell.add_pheromone(channel, rng.gen_range(-300.0..300.0));
                }
                2 => cell.decay_pheromones(rng.gen_range(-5.0..50.0)),
                3 => cell.add_food(rng.gen_range(-200.0..200.0)),
                4 => {
                    cell.consume_food(rng.gen_range(-20.0..80.0));
                }
                _ => cell.set_charge(rng.gen_range(-10..10)),
            }
            assert_in_bounds(&cell);
        }
    }

    #[test]
    fn consume_returns_actual_amount() {
        let mut cell = Cell::new();
        cell.add_food(12.0);
        assert_eq!(cell.consume_food(5.0), 5.0);
        assert_eq!(cell.consume_food(50.0), 7.0);
        assert_eq!(cell.consume_food(1.0), 0.0);
        assert_eq!(cell.food(), 0.0);
    }

    #[test]
    fn decay_floors_at_zero() {
        let mut cell = Cell::new();
        cell.add_pheromone(PheromoneChannel::A, 0.03);
        cell.add_pheromone(PheromoneChannel::C, 1.0);
        cell.decay_pheromones(0.05);
        assert_eq!(cell.pheromone(PheromoneChannel::A), 0.0);
        assert!((cell.pheromone(PheromoneChannel::C) - 0.95).abs() < 1e-9);
    }

    #[test]
    fn deserialization_clamps_and_defaults() {
        let cell: Cell = serde_json::from_str(
            r#"{"color": 40, "pheromones": {"trail_A": 500}, "charge": -3, "food": -2}"#,
        )
        .unwrap();
        assert_eq!(cell.color(), MAX_COLOR);
        assert_eq!(cell.pheromone(PheromoneChannel::A), MAX_PHEROMONE);
        assert_eq!(cell.pheromone(PheromoneChannel::B), 0.0);
        assert_eq!(cell.charge(), -1);
        assert_eq!(cell.food(), 0.0);
        assert!(!cell.is_obstacle());

        let empty: Cell = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, Cell::new());
    }

    #[test]
    fn serialized_layout_uses_trail_names() {
        let mut cell = Cell::new();
        cell.add_pheromone(PheromoneChannel::B, 2.0);
        let json = serde_json::to_value(&cell).unwrap();
        assert_eq!(json["pheromones"]["trail_B"], 2.0);
        assert_eq!(json["obstacle"], false);
        assert!(json["metadata"].is_object());
    }

    #[test]
    fn decayed_levels_survive_json_exactly() {
        let mut cell = Cell::new();
        for _ in 0..11 {
            cell.add_pheromone(PheromoneChannel::C, 0.1);
        }
        cell.add_pheromone(PheromoneChannel::A, 1.0999999999999999);
        cell.decay_pheromones(0.05);

        let json = serde_json::to_string(&cell).unwrap();
        let restored: Cell = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cell);
    }
}
