//! Grid — a fixed-size toroidal field of cells.
//!
//! Movement wraps around the edges, raw lookups do not: `get` outside
//! `[0, cols) × [0, rows)` returns `None`. Callers that want toroidal
//! addressing wrap the coordinate first with [`Grid::wrap`].

use crate::cell::Cell;
use crate::types::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Largest width or height a grid is built with.
pub const MAX_DIMENSION: usize = 2048;

/// A dense `cols × rows` array of cells, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "GridRecord")]
pub struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Cell::default(); cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.cols || y >= self.rows {
            return None;
        }
        Some(y * self.cols + x)
    }

    /// The cell at `(x, y)`, or `None` when out of range.
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        self.index(x, y).map(move |i| &mut self.cells[i])
    }

    pub fn at(&self, pos: Position) -> Option<&Cell> {
        self.get(pos.x, pos.y)
    }

    pub fn at_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.get_mut(pos.x, pos.y)
    }

    /// Replace the cell at `(x, y)`. Silently ignored when out of range.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Wrap a coordinate onto the torus.
    pub fn wrap(&self, pos: Position) -> Position {
        pos.wrapped(self.cols, self.rows)
    }

    pub fn center(&self) -> Position {
        Position::new((self.cols / 2) as i32, (self.rows / 2) as i32)
    }

    /// All cells with their coordinates, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        let cols = self.cols.max(1);
        self.cells.iter().enumerate().map(move |(i, cell)| {
            (Position::new((i % cols) as i32, (i / cols) as i32), cell)
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Position, &mut Cell)> + '_ {
        let cols = self.cols.max(1);
        self.cells.iter_mut().enumerate().map(move |(i, cell)| {
            (Position::new((i % cols) as i32, (i / cols) as i32), cell)
        })
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Reset every cell to its default state. Dimensions are kept.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = Cell::default());
    }

    pub fn colored_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.color() != 0).count()
    }

    pub fn total_food(&self) -> f64 {
        self.cells.iter().map(|c| c.food()).sum()
    }
}

/// Lenient on-disk form: a short or missing cell list is padded with
/// default cells, a long one truncated. Dimensions are capped at
/// [`MAX_DIMENSION`]; a missing or zero dimension yields an empty grid,
/// which the loader replaces with one of the configured size.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GridRecord {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl From<GridRecord> for Grid {
    fn from(record: GridRecord) -> Self {
        let cols = record.cols.min(MAX_DIMENSION);
        let rows = record.rows.min(MAX_DIMENSION);
        let Some(len) = cols.checked_mul(rows).filter(|len| *len > 0) else {
            return Grid::new(0, 0);
        };
        let mut cells = record.cells;
        cells.resize(len, Cell::default());
        Self { cols, rows, cells }
    }
}

/// Coordinates touched since the last render.
///
/// A renderer either repaints the listed cells or, when
/// [`DirtySet::needs_full_redraw`] is set, the whole grid.
#[derive(Debug, Clone, Default)]
pub struct DirtySet {
    cells: HashSet<Position>,
    full: bool,
}

impl DirtySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, pos: Position) {
        if !self.full {
            self.cells.insert(pos);
        }
    }

    /// Request a full repaint (after a reset, load or clear).
    pub fn mark_all(&mut self) {
        self.full = true;
        self.cells.clear();
    }

    pub fn needs_full_redraw(&self) -> bool {
        self.full
    }

    pub fn contains(&self, pos: &Position) -> bool {
        self.full || self.cells.contains(pos)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        !self.full && self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.cells.iter()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.full = false;
    }

    /// Hand the current set to a renderer and start a fresh one.
    pub fn take(&mut self) -> DirtySet {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_do_not_wrap() {
        let grid = Grid::new(10, 8);
        assert!(grid.get(0, 0).is_some());
        assert!(grid.get(9, 7).is_some());
        assert!(grid.get(10, 0).is_none());
        assert!(grid.get(0, 8).is_none());
        assert!(grid.get(-1, 3).is_none());
    }

    #[test]
    fn set_out_of_range_is_ignored() {
        let mut grid = Grid::new(4, 4);
        let mut cell = Cell::new();
        cell.set_color(3);
        grid.set(4, 0, cell.clone());
        grid.set(-1, -1, cell.clone());
        assert_eq!(grid.colored_cells(), 0);

        grid.set(2, 1, cell);
        assert_eq!(grid.get(2, 1).unwrap().color(), 3);
        assert_eq!(grid.colored_cells(), 1);
    }

    #[test]
    fn wrap_east_edge() {
        let grid = Grid::new(20, 10);
        let edge = Position::new(19, 4);
        assert_eq!(grid.wrap(edge.step(crate::types::Facing::East)), Position::new(0, 4));
    }

    #[test]
    fn iter_yields_row_major_positions() {
        let grid = Grid::new(3, 2);
        let positions: Vec<Position> = grid.iter().map(|(p, _)| p).collect();
        assert_eq!(positions[0], Position::new(0, 0));
        assert_eq!(positions[2], Position::new(2, 0));
        assert_eq!(positions[3], Position::new(0, 1));
        assert_eq!(positions.len(), 6);
    }

    #[test]
    fn short_cell_list_is_padded_on_load() {
        let grid: Grid =
            serde_json::from_str(r#"{"cols": 3, "rows": 3, "cells": [{"color": 2}]}"#).unwrap();
        assert_eq!(grid.len(), 9);
        assert_eq!(grid.get(0, 0).unwrap().color(), 2);
        assert_eq!(grid.get(2, 2).unwrap().color(), 0);
    }

    #[test]
    fn sizeless_or_huge_dimensions_load_safely() {
        let grid: Grid = serde_json::from_str("{}").unwrap();
        assert!(grid.is_empty());
        assert_eq!((grid.cols(), grid.rows()), (0, 0));

        let grid: Grid = serde_json::from_str(r#"{"cols": 5, "rows": 0}"#).unwrap();
        assert!(grid.is_empty());

        let huge = format!(r#"{{"cols": {}, "rows": 2}}"#, usize::MAX);
        let grid: Grid = serde_json::from_str(&huge).unwrap();
        assert_eq!((grid.cols(), grid.rows()), (MAX_DIMENSION, 2));
        assert_eq!(grid.len(), MAX_DIMENSION * 2);
    }

    #[test]
    fn dirty_set_take_resets() {
        let mut dirty = DirtySet::new();
        dirty.mark(Position::new(1, 1));
        dirty.mark(Position::new(1, 1));
        assert_eq!(dirty.len(), 1);

        let frame = dirty.take();
        assert!(frame.contains(&Position::new(1, 1)));
        assert!(dirty.is_empty());

        dirty.mark_all();
        assert!(dirty.needs_full_redraw());
        assert!(dirty.contains(&Position::new(5, 5)));
    }
}
