//! One logical tick for one ant.
//!
//! The effects run in a fixed order:
//!
//! 1. age, pay energy, tick cooldowns
//! 2. die if energy is gone
//! 3. wrap position onto the torus
//! 4. interact with the cell (food, home, charge) and update the task
//! 5. bounce off obstacles
//! 6. resolve and apply the rule-table transition, deposit pheromones
//! 7. remember the move
//!
//! Halted ants stop after step 2.

use crate::ant::{Ant, Archetype, ItemKind, MemoryEvent, Task};
use rand::Rng;
use turmite_core::prelude::*;

/// Fraction of max energy below which an ant is forced to rest.
pub const EMERGENCY_ENERGY: f64 = 0.2;
/// Fraction of max energy at which a resting ant gets up again.
pub const RESTED_ENERGY: f64 = 0.9;
/// Inventory fill fraction that sends a forager home.
pub const RETURN_LOAD: f64 = 0.8;
/// Hunger above which a wandering ant picks up food it walks over.
pub const OPPORTUNISTIC_HUNGER: u64 = 50;
/// Hunger above which a wandering worker starts seeking food.
pub const SEEK_HUNGER: u64 = 30;
/// Hunger above which a seeking ant gives up.
pub const GIVE_UP_HUNGER: u64 = 200;
/// Per-tick chance that a wandering scout starts exploring.
pub const EXPLORE_CHANCE: f64 = 0.1;

/// Everything an ant may touch while stepping.
pub struct StepContext<'a, R: Rng + ?Sized> {
    pub grid: &'a mut Grid,
    /// Shared rule table; read-only for the whole tick.
    pub rules: &'a RuleTable,
    pub dirty: &'a mut DirtySet,
    pub tick: Tick,
    pub rng: &'a mut R,
    /// Energy regained per tick while resting.
    pub rest_recovery: f64,
}

/// What happened to the ant this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Stepped normally (or bounced off an obstacle).
    Active,
    /// Aged but frozen in the HALT state.
    Halted,
    /// Energy ran out; the colony removes the ant after the pass.
    Died,
}

impl Ant {
    /// Run one tick.
    pub fn step<R: Rng + ?Sized>(&mut self, ctx: &mut StepContext<'_, R>) -> StepOutcome {
        self.age_one_step(ctx.rest_recovery);
        if self.is_dead() {
            return StepOutcome::Died;
        }
        if self.is_halted() {
            return StepOutcome::Halted;
        }

        self.position = ctx.grid.wrap(self.position);
        let here = self.position;

        self.interact(ctx);

        let Some(cell) = ctx.grid.at_mut(here) else {
            return StepOutcome::Active;
        };

        if !cell.is_passable() {
            self.facing = self.facing.reversed();
            self.remember(ctx.tick, MemoryEvent::ObstacleHit { location: here });
            return StepOutcome::Active;
        }

        let observed = cell.color();
        let transition = self.rules(ctx.rules).resolve(self.rule_state, observed);
        let written = transition.write_color.clamp(0, MAX_COLOR as i32);
        if written != observed as i32 {
            cell.set_color(written);
            ctx.dirty.mark(here);
        }

        self.deposit_pheromones(cell);

        self.rule_state = transition.next_state;
        let (facing, moves) = transition.move_op.apply(self.facing, &mut *ctx.rng);
        self.facing = facing;
        if moves {
            self.position = ctx.grid.wrap(here.step(facing));
        }

        self.remember(
            ctx.tick,
            MemoryEvent::Movement {
                from: here,
                to: self.position,
                direction: self.facing,
            },
        );
        StepOutcome::Active
    }

    /// Food pickup, home drop-off, charge, then the task machine.
    fn interact<R: Rng + ?Sized>(&mut self, ctx: &mut StepContext<'_, R>) {
        let here = self.position;
        let Some(cell) = ctx.grid.at_mut(here) else {
            return;
        };

        let capacity = self.carry_capacity();
        let foraging = self.task == Task::SeekingFood
            || (self.task == Task::Wandering && self.steps_without_food > OPPORTUNISTIC_HUNGER);
        let can_hold_food = self.inventory.is_none() || self.is_carrying(ItemKind::Food);
        if foraging && capacity > 0.0 && cell.food() > 0.0 && can_hold_food {
            let room = capacity - self.carried_amount();
            let taken = cell.consume_food(room);
            let picked = self.pick_up(ItemKind::Food, taken);
            if picked > 0.0 {
                self.steps_without_food = 0;
                self.gain_energy(picked * 2.0);
                self.last_food_location = Some(here);
                if self.carried_amount() >= capacity * RETURN_LOAD {
                    self.set_task(Task::ReturningHome, ctx.tick);
                }
                self.remember(ctx.tick, MemoryEvent::FoodFound { location: here, amount: picked });
                ctx.dirty.mark(here);
            }
        }

        if self.is_at_home() && self.is_carrying(ItemKind::Food) {
            if let Some(dropped) = self.drop_item(None) {
                cell.add_food(dropped.amount);
                self.gain_energy(dropped.amount);
                self.set_task(Task::Wandering, ctx.tick);
                self.remember(
                    ctx.tick,
                    MemoryEvent::FoodDelivered { location: here, amount: dropped.amount },
                );
                ctx.dirty.mark(here);
            }
        }

        match cell.charge().signum() {
            1 => self.gain_energy(1.0),
            -1 => {
                self.consume_energy(1.0);
            }
            _ => {}
        }

        self.update_task(ctx.tick, &mut *ctx.rng);
    }

    /// Emergency rest takes priority over every per-task transition.
    fn update_task<R: Rng + ?Sized>(&mut self, tick: Tick, rng: &mut R) {
        if self.energy < self.max_energy * EMERGENCY_ENERGY && self.task != Task::Resting {
            self.set_task(Task::Resting, tick);
            return;
        }

        let next = match self.task {
            Task::Wandering => {
                let hungry_worker =
                    self.steps_without_food > SEEK_HUNGER && self.archetype == Archetype::Worker;
                let weak_forager =
                    self.energy < self.max_energy * 0.5 && self.carry_capacity() > 0.0;
                if hungry_worker || weak_forager {
                    Some(Task::SeekingFood)
                } else if self.archetype == Archetype::Scout && rng.gen_bool(EXPLORE_CHANCE) {
                    Some(Task::Exploring)
                } else {
                    None
                }
            }
            Task::SeekingFood => {
                if self.carried_amount() >= self.carry_capacity() * RETURN_LOAD
                    && self.inventory.is_some()
                {
                    Some(Task::ReturningHome)
                } else if self.steps_without_food > GIVE_UP_HUNGER {
                    Some(Task::Wandering)
                } else {
                    None
                }
            }
            Task::ReturningHome => {
                if self.is_at_home() || self.inventory.is_none() {
                    Some(Task::Wandering)
                } else {
                    None
                }
            }
            Task::Exploring => {
                let radius = self.profile().exploration_radius;
                match radius {
                    Some(r) if self.archetype == Archetype::Scout && self.distance_to_home() > r => {
                        Some(Task::ReturningHome)
                    }
                    _ => None,
                }
            }
            Task::Resting => {
                if self.energy >= self.max_energy * RESTED_ENERGY {
                    Some(Task::Wandering)
                } else {
                    None
                }
            }
            Task::Patrolling | Task::Defending | Task::LayingEggs => None,
        };

        if let Some(task) = next {
            self.set_task(task, tick);
        }
    }

    /// Task trail plus the universal presence trail.
    fn deposit_pheromones(&self, cell: &mut Cell) {
        match self.task {
            Task::SeekingFood => cell.add_pheromone(PheromoneChannel::B, 0.5),
            Task::ReturningHome if self.is_carrying(ItemKind::Food) => {
                cell.add_pheromone(PheromoneChannel::A, 1.0)
            }
            Task::Exploring => cell.add_pheromone(PheromoneChannel::B, 1.0),
            Task::Patrolling => cell.add_pheromone(PheromoneChannel::C, 0.8),
            _ => {}
        }
        cell.add_pheromone(PheromoneChannel::C, 0.1);
    }
}
