//! Named rule tables shipped with the engine.

use crate::error::{Result, TurmiteError};
use crate::rules::{MoveOp, RuleTable, Transition, HALT_STATE};

/// A preset: a stable lookup key, a display name and its rule table.
#[derive(Debug, Clone)]
pub struct Preset {
    pub key: &'static str,
    pub name: &'static str,
    pub rules: RuleTable,
}

const H: i32 = HALT_STATE;

fn t(write_color: i32, symbol: char, next_state: i32) -> Transition {
    Transition::new(write_color, MoveOp::from_symbol(symbol), next_state)
}

fn table(rows: Vec<Vec<Transition>>) -> RuleTable {
    RuleTable::from_rows(rows.into_iter().enumerate().map(|(s, row)| (s as i32, row)))
}

/// Single-state table: color `c` writes `c + 1` (wrapping) and turns per `turns`.
fn cyclic(turns: &str) -> RuleTable {
    let n = turns.chars().count() as i32;
    table(vec![turns
        .chars()
        .enumerate()
        .map(|(c, turn)| t((c as i32 + 1) % n, turn, 0))
        .collect()])
}

/// Langton's ant: `RL`. Also the default table.
pub fn langtons_ant() -> RuleTable {
    cyclic("RL")
}

pub fn constructor() -> RuleTable {
    table(vec![
        vec![t(0, 'S', 2), t(0, 'S', 2)],
        vec![t(1, 'L', 2), t(0, 'R', 1)],
        vec![t(0, 'N', 1), t(0, 'U', 2)],
    ])
}

pub fn symmetrical() -> RuleTable {
    cyclic("RRLLRR")
}

pub fn snowflake() -> RuleTable {
    table(vec![
        vec![t(1, 'L', 1), t(1, 'R', 0)],
        vec![t(1, 'U', 1), t(1, 'U', 2)],
        vec![t(0, 'N', 2), t(0, 'U', 0)],
    ])
}

/// Paints two eyes (color 1) and a mouth (color 9), then halts.
pub fn smiley_face() -> RuleTable {
    let path = [
        (1, '>'), (0, '>'), (0, '>'), (0, '>'), (1, 'v'),
        (0, 'v'), (9, '<'), (0, 'v'), (9, '<'), (9, '<'),
        (9, '<'), (0, '^'), (9, '>'), (0, '>'),
    ];
    let mut rows: Vec<Vec<Transition>> = path
        .iter()
        .enumerate()
        .map(|(s, &(w, m))| vec![t(w, m, s as i32 + 1)])
        .collect();
    rows.push(vec![t(0, '^', H)]);
    table(rows)
}

pub fn archimedes_spiral() -> RuleTable {
    cyclic("LRRRRLLLRRR")
}

pub fn logarithmic_spiral() -> RuleTable {
    cyclic("RLLLLRRRLLLR")
}

pub fn square_filler() -> RuleTable {
    cyclic("LRRRRRLLR")
}

/// Two-state binary counter walking left and right.
pub fn simple_turing_machine() -> RuleTable {
    table(vec![
        vec![t(1, '>', 1), t(0, '<', 2)],
        vec![t(1, '<', 3), t(0, '>', 0)],
        vec![t(1, '<', 3), t(0, '>', 0)],
        vec![t(1, '>', 1), t(0, '<', 2)],
    ])
}

/// 3-state busy beaver: halts after 13 steps leaving 6 ones.
pub fn busy_beaver_3() -> RuleTable {
    table(vec![
        vec![t(1, '>', 1), t(1, '<', 2)],
        vec![t(1, '<', 0), t(1, '>', 1)],
        vec![t(1, '<', 1), t(1, '>', H)],
    ])
}

pub fn busy_beaver_4() -> RuleTable {
    table(vec![
        vec![t(1, '>', 1), t(1, '<', 1)],
        vec![t(1, '<', 0), t(0, '<', 2)],
        vec![t(1, '>', H), t(1, '<', 3)],
        vec![t(1, '>', 3), t(0, '>', 0)],
    ])
}

pub fn busy_beaver_5() -> RuleTable {
    table(vec![
        vec![t(1, '>', 1), t(1, '<', 2)],
        vec![t(1, '>', 2), t(1, '>', 1)],
        vec![t(1, '>', 3), t(0, '<', 4)],
        vec![t(1, '<', 0), t(1, '<', 3)],
        vec![t(1, '>', H), t(0, '<', 0)],
    ])
}

const CATALOG: &[(&str, &str, fn() -> RuleTable)] = &[
    ("langtons", "Langton's Ant", langtons_ant),
    ("constructor", "Constructor", constructor),
    ("symmetrical", "Symmetrical", symmetrical),
    ("snowflake", "Snowflake", snowflake),
    ("smiley_face", "Smiley Face", smiley_face),
    ("archimedes_spiral", "Archimedes Spiral", archimedes_spiral),
    ("logarithmic_spiral", "Logarithmic Spiral", logarithmic_spiral),
    ("square_filler", "Square Filler", square_filler),
    ("simple_turing_machine", "Simple Turing Machine", simple_turing_machine),
    ("busy_beaver_3", "Busy Beaver 3", busy_beaver_3),
    ("busy_beaver_4", "Busy Beaver 4", busy_beaver_4),
    ("busy_beaver_5", "Busy Beaver 5", busy_beaver_5),
];

/// Lookup keys of every preset, in catalog order.
pub fn names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|(key, _, _)| *key)
}

/// Every preset, in catalog order.
pub fn all() -> Vec<Preset> {
    CATALOG
        .iter()
        .map(|&(key, name, build)| Preset {
            key,
            name,
            rules: build(),
        })
        .collect()
}

/// Look up a preset by key. Dashes and case are ignored, and `spiral` is
/// accepted for the Archimedes spiral.
pub fn by_name(name: &str) -> Result<RuleTable> {
    let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
    let key = match normalized.as_str() {
        "spiral" => "archimedes_spiral",
        "langton" | "langtons_ant" => "langtons",
        other => other,
    };
    CATALOG
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, _, build)| build())
        .ok_or_else(|| TurmiteError::unknown_preset(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn langton_matches_canonical_table() {
        let rules = langtons_ant();
        assert_eq!(rules.resolve(0, 0), Transition::new(1, MoveOp::TurnRight, 0));
        assert_eq!(rules.resolve(0, 1), Transition::new(0, MoveOp::TurnLeft, 0));
    }

    #[test]
    fn cyclic_tables_wrap_to_zero() {
        let rules = logarithmic_spiral();
        assert_eq!(rules.color_count(), 12);
        assert_eq!(rules.resolve(0, 11), Transition::new(0, MoveOp::TurnRight, 0));
        assert_eq!(rules.resolve(0, 4), Transition::new(5, MoveOp::TurnLeft, 0));
    }

    #[test]
    fn smiley_face_halts_at_the_end() {
        let rules = smiley_face();
        assert_eq!(rules.state_count(), 15);
        assert!(rules.resolve(14, 0).halts());
        assert_eq!(rules.resolve(6, 0).write_color, 9);
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(by_name("busy-beaver-3").unwrap(), busy_beaver_3());
        assert_eq!(by_name("Spiral").unwrap(), archimedes_spiral());
        assert!(matches!(
            by_name("glider"),
            Err(TurmiteError::UnknownPreset(ref n)) if n == "glider"
        ));
        assert_eq!(names().count(), all().len());
    }
}
