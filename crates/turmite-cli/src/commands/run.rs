//! Run ticks unpaced and save the result.

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use turmite::prelude::*;

use crate::config::{current_session_path, current_simulation, data_dir, Config};

pub fn run(ticks: u64, fresh: bool, verbose: bool) -> Result<()> {
    let config = Config::load()?;

    println!("{} Loading colony...", "→".blue());
    let mut sim = current_simulation(&config, fresh)?;
    let initial = sim.stats();
    println!(
        "  Tick {}, {} ants, {} colored cells",
        initial.tick.to_string().cyan(),
        initial.alive.to_string().cyan(),
        initial.colored_cells.to_string().cyan()
    );

    println!("{} Running {} ticks...", "→".blue(), ticks.to_string().cyan());

    let pb = ProgressBar::new(ticks);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ticks")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    for _ in 0..ticks {
        for event in sim.tick() {
            if !verbose {
                continue;
            }
            match event {
                SimEvent::Died { archetype, position, age, .. } => pb.println(format!(
                    "  {} {} died at ({}, {}) aged {}",
                    "✗".red(),
                    archetype,
                    position.x,
                    position.y,
                    age
                )),
                SimEvent::Halted { position, .. } => pb.println(format!(
                    "  {} ant halted at ({}, {})",
                    "•".yellow(),
                    position.x,
                    position.y
                )),
                _ => {}
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");

    std::fs::create_dir_all(data_dir()?)?;
    save_session(&sim, &current_session_path()?)?;

    let stats = sim.stats();
    println!();
    println!("{} Simulation complete!", "✓".green().bold());
    println!(
        "  Tick: {} → {}",
        initial.tick.to_string().yellow(),
        stats.tick.to_string().green()
    );
    println!(
        "  Ants: {} → {} ({} died)",
        initial.alive.to_string().yellow(),
        stats.alive.to_string().green(),
        stats.died
    );
    println!(
        "  Colored cells: {} → {}",
        initial.colored_cells.to_string().yellow(),
        stats.colored_cells.to_string().green()
    );

    Ok(())
}
