//! ANSI terminal renderer.
//!
//! Keeps a color buffer for a viewport centered on the grid, repaints only
//! the cells the simulation reports as changed, and overlays the ants.

use colored::{Color, Colorize};
use std::io::Write;
use turmite::prelude::*;

const PALETTE: [Color; COLOR_COUNT] = [
    Color::Black,
    Color::White,
    Color::Red,
    Color::Green,
    Color::Blue,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::BrightRed,
    Color::BrightGreen,
    Color::BrightBlue,
    Color::BrightYellow,
];

fn glyph(facing: Facing) -> char {
    match facing {
        Facing::North => '^',
        Facing::East => '>',
        Facing::South => 'v',
        Facing::West => '<',
    }
}

/// Draws a window of the world to stdout.
pub struct TerminalRenderer {
    origin: Position,
    width: usize,
    height: usize,
    colors: Vec<u8>,
    frames: usize,
    cleared: bool,
}

impl TerminalRenderer {
    pub fn new(grid: &Grid, max_width: usize, max_height: usize) -> Self {
        let width = grid.cols().min(max_width.max(1));
        let height = grid.rows().min(max_height.max(1));
        let center = grid.center();
        Self {
            origin: Position::new(center.x - (width / 2) as i32, center.y - (height / 2) as i32),
            width,
            height,
            colors: vec![0; width * height],
            frames: 0,
            cleared: false,
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Buffer index of a grid position inside the viewport.
    fn slot(&self, pos: Position) -> Option<usize> {
        let x = pos.x - self.origin.x;
        let y = pos.y - self.origin.y;
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Copy changed cells into the buffer. Returns how many were visible.
    fn update(&mut self, view: &RenderView<'_>) -> usize {
        let mut painted = 0;
        for pos in view.cells_to_paint() {
            if let (Some(slot), Some(cell)) = (self.slot(pos), view.grid.at(pos)) {
                self.colors[slot] = cell.color();
                painted += 1;
            }
        }
        painted
    }

    fn compose(&self, view: &RenderView<'_>) -> String {
        let mut ants: Vec<Option<char>> = vec![None; self.colors.len()];
        for ant in view.ants {
            if let Some(slot) = self.slot(ant.position()) {
                ants[slot] = Some(glyph(ant.facing()));
            }
        }

        let mut frame = String::with_capacity(self.colors.len() * 12);
        for row in 0..self.height {
            for col in 0..self.width {
                let slot = row * self.width + col;
                let background = PALETTE[self.colors[slot] as usize % COLOR_COUNT];
                let text = match ants[slot] {
                    Some(c) => format!("{} ", c).bold().color(Color::BrightWhite),
                    None => "  ".normal(),
                };
                if self.colors[slot] == 0 {
                    frame.push_str(&text.to_string());
                } else {
                    frame.push_str(&text.on_color(background).to_string());
                }
            }
            frame.push('\n');
        }

        let halted = view.ants.iter().filter(|a| a.is_halted()).count();
        frame.push_str(&format!(
            "{} tick {}  ants {}  halted {}  (ctrl-c to stop)\x1b[K\n",
            "turmite".green().bold(),
            view.tick.to_string().cyan(),
            view.ants.len().to_string().cyan(),
            halted
        ));
        frame
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, view: &RenderView<'_>) {
        self.update(view);
        let frame = self.compose(view);
        let mut out = std::io::stdout().lock();
        let prefix = if self.cleared { "\x1b[H" } else { "\x1b[2J\x1b[H" };
        if let Err(e) = write!(out, "{}{}", prefix, frame).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "failed to draw frame");
        }
        self.cleared = true;
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(cols: usize, rows: usize) -> Simulation {
        let config = SimulationConfig {
            cols,
            rows,
            seed: Some(3),
            food_interval: 0,
            ..SimulationConfig::default()
        };
        Simulation::from_config(config, ColonyConfig::default(), presets::langtons_ant())
    }

    fn view(sim: &Simulation) -> RenderView<'_> {
        RenderView {
            tick: sim.current_tick(),
            grid: sim.grid(),
            ants: sim.ants(),
            dirty: sim.dirty(),
        }
    }

    #[test]
    fn viewport_is_centered_and_bounded() {
        let sim = world(200, 100);
        let renderer = TerminalRenderer::new(sim.grid(), 40, 20);
        assert_eq!((renderer.width, renderer.height), (40, 20));
        assert!(renderer.slot(sim.grid().center()).is_some());
        assert!(renderer.slot(Position::new(0, 0)).is_none());

        let small = TerminalRenderer::new(world(10, 6).grid(), 40, 20);
        assert_eq!((small.width, small.height), (10, 6));
    }

    #[test]
    fn buffer_follows_dirty_cells() {
        let mut sim = world(12, 12);
        let mut renderer = TerminalRenderer::new(sim.grid(), 100, 100);
        assert_eq!(renderer.update(&view(&sim)), 144);
        sim.take_dirty();

        let start = sim.ants()[0].position();
        sim.tick();
        assert_eq!(renderer.update(&view(&sim)), 1);
        let slot = renderer.slot(start).unwrap();
        assert_eq!(renderer.colors[slot], 1);
    }

    #[test]
    fn frame_shows_ants_and_status() {
        let sim = world(8, 8);
        let renderer = TerminalRenderer::new(sim.grid(), 100, 100);
        let frame = renderer.compose(&view(&sim));
        let facing = glyph(sim.ants()[0].facing());
        assert!(frame.contains(facing));
        assert!(frame.contains("tick"));
        assert_eq!(frame.lines().count(), 9);
    }
}
