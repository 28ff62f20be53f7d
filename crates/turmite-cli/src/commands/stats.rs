//! Show colony statistics.

use anyhow::{bail, Result};
use colored::Colorize;
use turmite::prelude::*;

use crate::config::current_session_path;

pub fn run(list_ants: bool) -> Result<()> {
    let session_path = current_session_path()?;

    if !session_path.exists() {
        bail!("No session found. Run {} first.", "turmite run".cyan());
    }

    let sim = restore_session(&session_path)?;
    let stats = sim.stats();
    let cells = sim.grid().len().max(1);

    println!("{}", "Turmite Colony Statistics".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "World".blue().bold());
    println!("  Tick:              {}", stats.tick.to_string().cyan());
    println!(
        "  Grid:              {}×{}",
        sim.grid().cols(),
        sim.grid().rows()
    );
    println!(
        "  Colored cells:     {} ({:.1}%)",
        stats.colored_cells.to_string().cyan(),
        stats.colored_cells as f64 / cells as f64 * 100.0
    );
    println!("  Food on grid:      {:.1}", stats.total_food);
    println!(
        "  Rule states:       {}",
        sim.rules().state_count().to_string().cyan()
    );
    println!();

    println!("{}", "Population".blue().bold());
    println!("  Alive:             {}", stats.alive.to_string().green());
    println!("  Died:              {}", stats.died.to_string().red());
    println!("  Spawned:           {}", stats.total_spawned);
    println!("  Halted:            {}", stats.halted.to_string().yellow());
    println!();

    println!("{}", "Archetypes".blue().bold());
    for (archetype, count) in &stats.by_archetype {
        println!("  {:<18} {}", format!("{}:", archetype), count.to_string().cyan());
    }
    println!();

    println!("{}", "Tasks".blue().bold());
    for (task, count) in &stats.by_task {
        println!("  {:<18} {}", format!("{}:", task), count.to_string().cyan());
    }

    if list_ants {
        println!();
        println!("{}", "Ants".blue().bold());
        for ant in sim.ants() {
            let pos = ant.position();
            println!("  ({:>3},{:>3}) {}", pos.x, pos.y, ant.status());
        }
    }

    println!();
    println!("{}", "═".repeat(40).dimmed());

    Ok(())
}
