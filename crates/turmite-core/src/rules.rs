//! Rule tables and transition resolution.
//!
//! A rule table maps `state → [transition per observed color]`. Tables
//! coming from users or files are often sparse, so resolution never fails:
//!
//! 1. `table[state][color]` if present
//! 2. otherwise `table[state][0]` if present
//! 3. otherwise the identity transition `{observed color, Forward, 0}`

use crate::cell::COLOR_COUNT;
use crate::types::Facing;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// `next_state` value that freezes an agent's automaton.
pub const HALT_STATE: i32 = -1;

/// How an agent turns and whether it steps after a transition.
///
/// Persisted with the single-character notation used in rule files:
/// `L R U N S` (relative) and `^ > v < ?` (absolute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MoveOp {
    TurnLeft,
    TurnRight,
    UTurn,
    #[default]
    Forward,
    /// Keep facing and position.
    Stay,
    FaceNorth,
    FaceEast,
    FaceSouth,
    FaceWest,
    /// Face a uniformly random cardinal direction.
    RandomFace,
}

impl MoveOp {
    pub const ALL: [MoveOp; 10] = [
        MoveOp::TurnLeft,
        MoveOp::TurnRight,
        MoveOp::Forward,
        MoveOp::UTurn,
        MoveOp::Stay,
        MoveOp::FaceNorth,
        MoveOp::FaceEast,
        MoveOp::FaceSouth,
        MoveOp::FaceWest,
        MoveOp::RandomFace,
    ];

    /// Moves used when generating per-agent random tables.
    pub const BASIC: [MoveOp; 5] = [
        MoveOp::Stay,
        MoveOp::TurnLeft,
        MoveOp::TurnRight,
        MoveOp::Forward,
        MoveOp::UTurn,
    ];

    pub fn symbol(self) -> char {
        match self {
            MoveOp::TurnLeft => 'L',
            MoveOp::TurnRight => 'R',
            MoveOp::UTurn => 'U',
            MoveOp::Forward => 'N',
            MoveOp::Stay => 'S',
            MoveOp::FaceNorth => '^',
            MoveOp::FaceEast => '>',
            MoveOp::FaceSouth => 'v',
            MoveOp::FaceWest => '<',
            MoveOp::RandomFace => '?',
        }
    }

    /// Parse a move symbol. Unknown symbols behave as `Forward`.
    pub fn from_symbol(symbol: char) -> Self {
        match symbol {
            'L' => MoveOp::TurnLeft,
            'R' => MoveOp::TurnRight,
            'U' => MoveOp::UTurn,
            'S' => MoveOp::Stay,
            '^' => MoveOp::FaceNorth,
            '>' => MoveOp::FaceEast,
            'v' => MoveOp::FaceSouth,
            '<' => MoveOp::FaceWest,
            '?' => MoveOp::RandomFace,
            _ => MoveOp::Forward,
        }
    }

    pub fn is_relative(self) -> bool {
        matches!(
            self,
            MoveOp::TurnLeft | MoveOp::TurnRight | MoveOp::UTurn | MoveOp::Forward | MoveOp::Stay
        )
    }

    /// The facing after this op, and whether the agent then steps forward.
    pub fn apply<R: Rng + ?Sized>(self, facing: Facing, rng: &mut R) -> (Facing, bool) {
        let next = match self {
            MoveOp::TurnLeft => facing.left(),
            MoveOp::TurnRight => facing.right(),
            MoveOp::UTurn => facing.reversed(),
            MoveOp::Forward | MoveOp::Stay => facing,
            MoveOp::FaceNorth => Facing::North,
            MoveOp::FaceEast => Facing::East,
            MoveOp::FaceSouth => Facing::South,
            MoveOp::FaceWest => Facing::West,
            MoveOp::RandomFace => Facing::from_index(rng.gen_range(0..4)),
        };
        (next, self != MoveOp::Stay)
    }
}

impl From<String> for MoveOp {
    fn from(value: String) -> Self {
        value.chars().next().map(MoveOp::from_symbol).unwrap_or_default()
    }
}

impl From<MoveOp> for String {
    fn from(value: MoveOp) -> Self {
        value.symbol().to_string()
    }
}

impl fmt::Display for MoveOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One rule-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transition {
    #[serde(rename = "writeColor")]
    pub write_color: i32,
    #[serde(rename = "move")]
    pub move_op: MoveOp,
    #[serde(rename = "nextState")]
    pub next_state: i32,
}

impl Transition {
    pub fn new(write_color: i32, move_op: MoveOp, next_state: i32) -> Self {
        Self {
            write_color,
            move_op,
            next_state,
        }
    }

    /// Rewrites the observed color, steps forward, returns to state 0.
    pub fn identity(observed_color: u8) -> Self {
        Self::new(observed_color as i32, MoveOp::Forward, 0)
    }

    pub fn halts(&self) -> bool {
        self.next_state == HALT_STATE
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new(0, MoveOp::Forward, 0)
    }
}

/// `state → transitions indexed by observed color`.
///
/// Persisted as `{"0": [{"writeColor": 1, "move": "R", "nextState": 0}, ...]}`.
/// `null` entries are holes and resolve through the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable(BTreeMap<i32, Vec<Option<Transition>>>);

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from dense per-state rows.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (i32, Vec<Transition>)>,
    {
        Self(
            rows.into_iter()
                .map(|(state, row)| (state, row.into_iter().map(Some).collect()))
                .collect(),
        )
    }

    /// Set one entry, growing the state's row with holes as needed.
    pub fn insert(&mut self, state: i32, color: u8, transition: Transition) {
        let row = self.0.entry(state).or_default();
        let index = color as usize;
        if row.len() <= index {
            row.resize(index + 1, None);
        }
        row[index] = Some(transition);
    }

    pub fn get(&self, state: i32, color: u8) -> Option<&Transition> {
        self.0
            .get(&state)
            .and_then(|row| row.get(color as usize))
            .and_then(|t| t.as_ref())
    }

    /// Resolve the transition for `(state, observed color)` with fallback.
    pub fn resolve(&self, state: i32, color: u8) -> Transition {
        if let Some(t) = self.get(state, color) {
            return *t;
        }
        if let Some(t) = self.get(state, 0) {
            return *t;
        }
        Transition::identity(color)
    }

    pub fn state_count(&self) -> usize {
        self.0.len()
    }

    /// Widest row in the table, i.e. the number of colors it distinguishes.
    pub fn color_count(&self) -> usize {
        self.0.values().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn states(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.keys().copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = (i32, &[Option<Transition>])> + '_ {
        self.0.iter().map(|(s, row)| (*s, row.as_slice()))
    }

    /// A random table over every move op, as produced by "randomize rules".
    pub fn random<R: Rng + ?Sized>(states: usize, colors: usize, rng: &mut R) -> Self {
        Self::random_with(states, colors, &MoveOp::ALL, rng)
    }

    /// A random per-agent table: `1..=max_states` states, `2..=max_colors`
    /// colors, basic moves only. Bounds are clamped into the supported range.
    pub fn random_individual<R: Rng + ?Sized>(max_states: usize, max_colors: usize, rng: &mut R) -> Self {
        let max_states = max_states.clamp(1, 10);
        let max_colors = max_colors.clamp(2, COLOR_COUNT);
        let states = rng.gen_range(1..=max_states);
        let colors = rng.gen_range(2..=max_colors);
        Self::random_with(states, colors, &MoveOp::BASIC, rng)
    }

    fn random_with<R: Rng + ?Sized>(states: usize, colors: usize, moves: &[MoveOp], rng: &mut R) -> Self {
        let states = states.max(1);
        let colors = colors.clamp(1, COLOR_COUNT);
        let rows = (0..states).map(|state| {
            let row = (0..colors)
                .map(|_| {
                    let write = rng.gen_range(0..colors) as i32;
                    let move_op = *moves.choose(rng).unwrap_or(&MoveOp::Forward);
                    let next = rng.gen_range(0..states) as i32;
                    Transition::new(write, move_op, next)
                })
                .collect();
            (state as i32, row)
        });
        Self::from_rows(rows.collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn falls_back_to_color_zero_then_identity() {
        let mut table = RuleTable::new();
        let zero = Transition::new(3, MoveOp::TurnLeft, 1);
        table.insert(2, 0, zero);

        assert_eq!(table.resolve(2, 5), zero);
        assert_eq!(
            table.resolve(4, 5),
            Transition::new(5, MoveOp::Forward, 0)
        );
    }

    #[test]
    fn null_entries_are_holes() {
        let table: RuleTable = serde_json::from_str(
            r#"{"0": [null, {"writeColor": 2, "move": "R", "nextState": 0}]}"#,
        )
        .unwrap();
        assert_eq!(table.resolve(0, 1).write_color, 2);
        assert_eq!(table.resolve(0, 0), Transition::identity(0));
    }

    #[test]
    fn rotation_table_for_relative_ops() {
        let mut rng = StdRng::seed_from_u64(1);
        let start = Position::new(5, 5);
        for facing in Facing::ALL {
            for (op, expected) in [
                (MoveOp::TurnLeft, facing.left()),
                (MoveOp::TurnRight, facing.right()),
                (MoveOp::UTurn, facing.reversed()),
                (MoveOp::Forward, facing),
                (MoveOp::Stay, facing),
            ] {
                let (next, moves) = op.apply(facing, &mut rng);
                assert_eq!(next, expected, "{:?} from {:?}", op, facing);
                let landed = if moves { start.step(next) } else { start };
                let (dx, dy) = expected.delta();
                if op == MoveOp::Stay {
                    assert_eq!(landed, start);
                } else {
                    assert_eq!(landed, Position::new(5 + dx, 5 + dy));
                }
            }
        }

        let (next, moves) = MoveOp::TurnRight.apply(Facing::East, &mut rng);
        assert_eq!(next, Facing::South);
        assert!(moves);
        assert_eq!(Position::new(5, 5).step(next), Position::new(5, 6));
    }

    #[test]
    fn absolute_ops_ignore_current_facing() {
        let mut rng = StdRng::seed_from_u64(2);
        for facing in Facing::ALL {
            assert_eq!(MoveOp::FaceNorth.apply(facing, &mut rng).0, Facing::North);
            assert_eq!(MoveOp::FaceWest.apply(facing, &mut rng).0, Facing::West);
        }
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(MoveOp::RandomFace.apply(Facing::North, &mut rng).0);
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn move_notation_round_trips_and_tolerates_unknowns() {
        for op in MoveOp::ALL {
            assert_eq!(MoveOp::from_symbol(op.symbol()), op);
        }
        let op: MoveOp = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(op, MoveOp::Forward);
        assert_eq!(serde_json::to_string(&MoveOp::FaceSouth).unwrap(), "\"v\"");
    }

    #[test]
    fn partial_transition_defaults() {
        let t: Transition = serde_json::from_str(r#"{"move": "L"}"#).unwrap();
        assert_eq!(t, Transition::new(0, MoveOp::TurnLeft, 0));
    }

    #[test]
    fn random_individual_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let table = RuleTable::random_individual(3, 4, &mut rng);
            assert!((1..=3).contains(&table.state_count()));
            let colors = table.color_count();
            assert!((2..=4).contains(&colors));
            for (_, row) in table.rows() {
                assert_eq!(row.len(), colors);
                for t in row.iter().flatten() {
                    assert!(MoveOp::BASIC.contains(&t.move_op));
                    assert!((t.write_color as usize) < colors);
                    assert!((t.next_state as usize) < table.state_count());
                }
            }
        }
    }
}
