//! Colony initialization: archetype mix, placement and initial facing.
//!
//! Every value in [`ColonyConfig`] is clamped into range before use, so a
//! bad configuration degrades to the nearest valid colony instead of failing.

use crate::ant::{Ant, Archetype};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use turmite_core::prelude::*;

pub const MIN_POPULATION: usize = 1;
pub const MAX_POPULATION: usize = 100;
pub const MAX_RANDOM_STATES: usize = 10;

/// Attempts at finding a free cell for random placement.
const RANDOM_PLACEMENT_ATTEMPTS: usize = 2000;
/// Attempts at shifting a grid-placed ant along its row.
const GRID_SHIFT_ATTEMPTS: i32 = 100;

/// Where the colony starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// A square block around the grid center.
    #[default]
    #[serde(alias = "center-cluster", alias = "center_cluster")]
    Center,
    /// Evenly spaced lattice over the whole grid.
    Grid,
    /// Uniformly random free cells.
    Random,
}

/// Initial heading of every ant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialFacing {
    North,
    #[default]
    East,
    South,
    West,
    /// Drawn independently per ant.
    Random,
}

impl InitialFacing {
    pub fn pick<R: Rng + ?Sized>(self, rng: &mut R) -> Facing {
        match self {
            InitialFacing::North => Facing::North,
            InitialFacing::East => Facing::East,
            InitialFacing::South => Facing::South,
            InitialFacing::West => Facing::West,
            InitialFacing::Random => Facing::from_index(rng.gen_range(0..4)),
        }
    }
}

/// Colony configuration consumed by the initializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Number of ants, clamped to `[1, 100]`.
    pub population: usize,
    pub placement: Placement,
    pub facing: InitialFacing,
    /// Give each ant its own random rule table (only when population > 1).
    pub individual_rules: bool,
    /// Upper bound on states of random per-ant tables, clamped to `[1, 10]`.
    pub max_states: usize,
    /// Upper bound on colors of random per-ant tables, clamped to `[2, 12]`.
    pub max_colors: usize,
    /// Keep existing per-ant tables when the shared rules change.
    pub preserve_individual_rules: bool,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            population: 1,
            placement: Placement::Center,
            facing: InitialFacing::East,
            individual_rules: false,
            max_states: 2,
            max_colors: 2,
            preserve_individual_rules: true,
        }
    }
}

impl ColonyConfig {
    /// Clamp every bound into its valid range.
    pub fn clamped(&self) -> Self {
        Self {
            population: self.population.clamp(MIN_POPULATION, MAX_POPULATION),
            max_states: self.max_states.clamp(1, MAX_RANDOM_STATES),
            max_colors: self.max_colors.clamp(2, COLOR_COUNT),
            ..self.clone()
        }
    }

    /// Per-ant tables are only handed out to colonies of more than one ant.
    pub fn uses_individual_rules(&self) -> bool {
        self.individual_rules && self.population.clamp(MIN_POPULATION, MAX_POPULATION) > 1
    }
}

/// 20% scouts, 10% soldiers, one queen above ten ants, every other slot a
/// worker (about 70%), shuffled. The queen's slot comes out of the workers.
pub fn archetype_mix<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Archetype> {
    let queens = usize::from(count > 10);
    let scouts = count * 2 / 10;
    let soldiers = count / 10;
    let workers = count - queens - scouts - soldiers;

    let mut mix = Vec::with_capacity(count);
    mix.extend(std::iter::repeat(Archetype::Worker).take(workers));
    mix.extend(std::iter::repeat(Archetype::Scout).take(scouts));
    mix.extend(std::iter::repeat(Archetype::Soldier).take(soldiers));
    mix.extend(std::iter::repeat(Archetype::Queen).take(queens));
    mix.shuffle(rng);
    mix
}

/// Start positions for `count` ants on a `cols × rows` grid.
pub fn placements<R: Rng + ?Sized>(
    count: usize,
    placement: Placement,
    cols: usize,
    rows: usize,
    rng: &mut R,
) -> Vec<Position> {
    if cols == 0 || rows == 0 {
        return Vec::new();
    }
    let (max_x, max_y) = (cols as i32 - 1, rows as i32 - 1);
    let clamp = |x: i32, y: i32| Position::new(x.clamp(0, max_x), y.clamp(0, max_y));
    let mut occupied: HashSet<Position> = HashSet::with_capacity(count);
    let mut out = Vec::with_capacity(count);

    match placement {
        Placement::Center => {
            let cluster = (count as f64).sqrt().ceil().max(1.0) as usize;
            let offset = (cluster / 2) as i32;
            let (cx, cy) = ((cols / 2) as i32, (rows / 2) as i32);
            for i in 0..count {
                let x = cx - offset + (i % cluster) as i32;
                let y = cy - offset + (i / cluster) as i32;
                out.push(clamp(x, y));
            }
        }
        Placement::Grid => {
            let ratio = cols as f64 / rows as f64;
            let mut lattice_cols = ((count as f64 * ratio).sqrt().ceil() as usize).clamp(1, cols);
            let mut lattice_rows = count.div_ceil(lattice_cols).min(rows);
            if lattice_cols * lattice_rows < count {
                lattice_rows = count.div_ceil(lattice_cols);
                if lattice_cols * lattice_rows < count {
                    lattice_cols = count.div_ceil(lattice_rows);
                }
            }
            let spacing_x = cols as f64 / (lattice_cols + 1) as f64;
            let spacing_y = rows as f64 / (lattice_rows + 1) as f64;
            for i in 0..count {
                let col = (i % lattice_cols) as f64;
                let row = (i / lattice_cols) as f64;
                let start = clamp(
                    (spacing_x * (col + 1.0)).floor() as i32,
                    (spacing_y * (row + 1.0)).floor() as i32,
                );
                let mut pos = start;
                let mut attempts = 0;
                while occupied.contains(&pos) && attempts < GRID_SHIFT_ATTEMPTS {
                    pos = Position::new((start.x + attempts).rem_euclid(cols as i32), start.y);
                    attempts += 1;
                }
                occupied.insert(pos);
                out.push(pos);
            }
        }
        Placement::Random => {
            for _ in 0..count {
                let mut pos = clamp(rng.gen_range(0..cols) as i32, rng.gen_range(0..rows) as i32);
                let mut attempts = 1;
                while occupied.contains(&pos) && attempts < RANDOM_PLACEMENT_ATTEMPTS {
                    pos = Position::new(rng.gen_range(0..cols) as i32, rng.gen_range(0..rows) as i32);
                    attempts += 1;
                }
                if occupied.contains(&pos) {
                    tracing::warn!(%pos, "no free cell found for random placement, overlapping");
                }
                occupied.insert(pos);
                out.push(pos);
            }
        }
    }
    out
}

/// Build a colony for a `cols × rows` grid.
///
/// `preserved` holds per-ant tables from a previous colony; the i-th ant
/// reuses the i-th table when individual rules are enabled.
pub fn spawn_colony<R: Rng + ?Sized>(
    config: &ColonyConfig,
    cols: usize,
    rows: usize,
    preserved: &[RuleTable],
    rng: &mut R,
) -> Vec<Ant> {
    let config = config.clamped();
    let individual = config.uses_individual_rules();
    let archetypes = archetype_mix(config.population, rng);
    let positions = placements(config.population, config.placement, cols, rows, rng);

    let ants: Vec<Ant> = positions
        .into_iter()
        .zip(archetypes)
        .enumerate()
        .map(|(i, (pos, archetype))| {
            let facing = config.facing.pick(rng);
            let mut ant = Ant::new(pos, facing, archetype).with_id(AgentId::from_seed(rng.gen()));
            if individual {
                let rules = preserved.get(i).cloned().unwrap_or_else(|| {
                    RuleTable::random_individual(config.max_states, config.max_colors, rng)
                });
                ant.set_individual_rules(Some(rules));
            }
            ant
        })
        .collect();

    tracing::debug!(
        population = ants.len(),
        workers = ants.iter().filter(|a| a.archetype() == Archetype::Worker).count(),
        scouts = ants.iter().filter(|a| a.archetype() == Archetype::Scout).count(),
        soldiers = ants.iter().filter(|a| a.archetype() == Archetype::Soldier).count(),
        queens = ants.iter().filter(|a| a.archetype() == Archetype::Queen).count(),
        individual,
        "spawned colony"
    );
    ants
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn count(mix: &[Archetype], archetype: Archetype) -> usize {
        mix.iter().filter(|a| **a == archetype).count()
    }

    #[test]
    fn mix_proportions() {
        let mut rng = StdRng::seed_from_u64(1);
        let mix = archetype_mix(20, &mut rng);
        assert_eq!(mix.len(), 20);
        assert_eq!(count(&mix, Archetype::Worker), 13);
        assert_eq!(count(&mix, Archetype::Scout), 4);
        assert_eq!(count(&mix, Archetype::Soldier), 2);
        assert_eq!(count(&mix, Archetype::Queen), 1);

        let mix = archetype_mix(10, &mut rng);
        assert_eq!(count(&mix, Archetype::Queen), 0);
        assert_eq!(count(&mix, Archetype::Worker), 7);

        let mix = archetype_mix(25, &mut rng);
        assert_eq!(count(&mix, Archetype::Queen), 1);
        assert_eq!(count(&mix, Archetype::Worker), 17);

        let mix = archetype_mix(1, &mut rng);
        assert_eq!(mix, vec![Archetype::Worker]);
    }

    #[test]
    fn center_cluster_is_square_around_center() {
        let mut rng = StdRng::seed_from_u64(1);
        let spots = placements(9, Placement::Center, 100, 100, &mut rng);
        assert_eq!(spots[0], Position::new(49, 49));
        assert_eq!(spots[4], Position::new(50, 50));
        assert_eq!(spots[8], Position::new(51, 51));

        let single = placements(1, Placement::Center, 100, 100, &mut rng);
        assert_eq!(single, vec![Position::new(50, 50)]);
    }

    #[test]
    fn grid_and_random_placements_are_distinct() {
        let mut rng = StdRng::seed_from_u64(5);
        for placement in [Placement::Grid, Placement::Random] {
            let spots = placements(40, placement, 50, 30, &mut rng);
            let unique: HashSet<_> = spots.iter().collect();
            assert_eq!(unique.len(), 40, "{:?}", placement);
            assert!(spots.iter().all(|p| (0..50).contains(&p.x) && (0..30).contains(&p.y)));
        }
    }

    #[test]
    fn config_is_clamped() {
        let config = ColonyConfig {
            population: 500,
            max_states: 0,
            max_colors: 40,
            ..Default::default()
        }
        .clamped();
        assert_eq!(config.population, MAX_POPULATION);
        assert_eq!(config.max_states, 1);
        assert_eq!(config.max_colors, COLOR_COUNT);

        let zero = ColonyConfig { population: 0, ..Default::default() }.clamped();
        assert_eq!(zero.population, 1);
    }

    #[test]
    fn individual_rules_need_more_than_one_ant() {
        let mut rng = StdRng::seed_from_u64(2);
        let solo = ColonyConfig { individual_rules: true, ..Default::default() };
        let ants = spawn_colony(&solo, 30, 30, &[], &mut rng);
        assert!(ants[0].individual_rules().is_none());

        let crowd = ColonyConfig { population: 4, individual_rules: true, ..Default::default() };
        let ants = spawn_colony(&crowd, 30, 30, &[], &mut rng);
        assert!(ants.iter().all(|a| a.individual_rules().is_some()));
    }

    #[test]
    fn preserved_rules_are_reused_in_order() {
        let mut rng = StdRng::seed_from_u64(4);
        let kept = vec![presets::busy_beaver_3(), presets::snowflake()];
        let config = ColonyConfig { population: 3, individual_rules: true, ..Default::default() };
        let ants = spawn_colony(&config, 30, 30, &kept, &mut rng);
        assert_eq!(ants[0].individual_rules(), Some(&kept[0]));
        assert_eq!(ants[1].individual_rules(), Some(&kept[1]));
        assert!(ants[2].individual_rules().is_some());
    }

    #[test]
    fn fixed_facing_applies_to_everyone() {
        let mut rng = StdRng::seed_from_u64(8);
        let config = ColonyConfig {
            population: 6,
            facing: InitialFacing::South,
            placement: Placement::Grid,
            ..Default::default()
        };
        let ants = spawn_colony(&config, 40, 40, &[], &mut rng);
        assert!(ants.iter().all(|a| a.facing() == Facing::South));
        assert!(ants.iter().all(|a| a.home() == a.position()));
    }
}
