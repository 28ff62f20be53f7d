//! Shared types used across all turmite crates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The current tick of the simulation.
pub type Tick = u64;

/// Unique identifier for an agent in the colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic ID (for testing and seeded colonies).
    pub fn from_seed(seed: u64) -> Self {
        Self(Uuid::from_u128(seed as u128))
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

/// An integer grid coordinate.
///
/// Agents may hold coordinates outside the grid between a move and the next
/// wrap, so both components are signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance, as used for home tolerance and exploration radius.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Wrap onto a `cols × rows` torus.
    pub fn wrapped(self, cols: usize, rows: usize) -> Self {
        if cols == 0 || rows == 0 {
            return self;
        }
        Self {
            x: self.x.rem_euclid(cols as i32),
            y: self.y.rem_euclid(rows as i32),
        }
    }

    /// The neighbouring coordinate one step in `facing` (unwrapped).
    pub fn step(self, facing: Facing) -> Self {
        let (dx, dy) = facing.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal heading. Persisted as `0=N, 1=E, 2=S, 3=W`.
///
/// Screen coordinates: north decreases `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub enum Facing {
    North,
    #[default]
    East,
    South,
    West,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::North, Facing::East, Facing::South, Facing::West];

    pub fn index(self) -> u8 {
        match self {
            Facing::North => 0,
            Facing::East => 1,
            Facing::South => 2,
            Facing::West => 3,
        }
    }

    pub fn from_index(index: i64) -> Self {
        Self::ALL[index.rem_euclid(4) as usize]
    }

    /// Unit displacement for one step in this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Facing::North => (0, -1),
            Facing::East => (1, 0),
            Facing::South => (0, 1),
            Facing::West => (-1, 0),
        }
    }

    /// Rotate 90° clockwise.
    pub fn right(self) -> Self {
        Self::from_index(self.index() as i64 + 1)
    }

    /// Rotate 90° counter-clockwise.
    pub fn left(self) -> Self {
        Self::from_index(self.index() as i64 + 3)
    }

    pub fn reversed(self) -> Self {
        Self::from_index(self.index() as i64 + 2)
    }
}

impl From<i64> for Facing {
    fn from(value: i64) -> Self {
        Facing::from_index(value)
    }
}

impl From<Facing> for u8 {
    fn from(value: Facing) -> Self {
        value.index()
    }
}
