//! Render collaborator seam.
//!
//! A renderer is handed a read-only view of the world once per frame: the
//! full grid, the ants, and the cells touched since the previous frame. The
//! simulation clears the dirty set after every render.

use turmite_agents::prelude::*;

/// Same-thread, read-only view of a simulation for one frame.
pub struct RenderView<'a> {
    pub tick: Tick,
    pub grid: &'a Grid,
    pub ants: &'a [Ant],
    /// Cells whose state changed since the last frame.
    pub dirty: &'a DirtySet,
}

impl RenderView<'_> {
    /// Cells a renderer must repaint: everything after a reset, otherwise
    /// the dirty cells.
    pub fn cells_to_paint(&self) -> Vec<Position> {
        if self.dirty.needs_full_redraw() {
            self.grid.iter().map(|(pos, _)| pos).collect()
        } else {
            self.dirty.iter().copied().collect()
        }
    }
}

/// Draws frames.
pub trait Renderer {
    fn render(&mut self, view: &RenderView<'_>);
}

/// Counts frames and painted cells without drawing anything.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrameCounter {
    pub frames: usize,
    pub full_redraws: usize,
    pub cells_painted: usize,
    pub last_tick: Tick,
}

impl Renderer for FrameCounter {
    fn render(&mut self, view: &RenderView<'_>) {
        self.frames += 1;
        if view.dirty.needs_full_redraw() {
            self.full_redraws += 1;
        }
        self.cells_painted += view.cells_to_paint().len();
        self.last_tick = view.tick;
    }
}
