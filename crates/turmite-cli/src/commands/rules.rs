//! Rule table and grid commands on the current session.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use turmite::prelude::*;

use super::presets::print_table;
use crate::config::{current_session_path, current_simulation, data_dir, user_rules_dir, Config};

/// Load the current session (or a fresh world), apply `change`, save.
fn update_current<F>(change: F) -> Result<Simulation>
where
    F: FnOnce(&mut Simulation) -> SimEvent,
{
    let config = Config::load()?;
    let mut sim = current_simulation(&config, false)?;
    let event = change(&mut sim);
    tracing::debug!(?event, "session updated");

    std::fs::create_dir_all(data_dir()?)?;
    save_session(&sim, &current_session_path()?)?;
    Ok(sim)
}

pub fn preset(name: &str) -> Result<()> {
    let rules = presets::by_name(name)?;
    let sim = update_current(|sim| sim.replace_rules(rules))?;
    println!(
        "{} Rules set to {} ({} ants re-seeded)",
        "✓".green().bold(),
        name.cyan(),
        sim.alive_count()
    );
    Ok(())
}

/// Resolve `file` as a path, falling back to the user rules directory.
fn resolve_rules_file(file: &str) -> Option<PathBuf> {
    let direct = PathBuf::from(file);
    if direct.exists() {
        return Some(direct);
    }
    let dir = user_rules_dir()?;
    [dir.join(file), dir.join(format!("{}.json", file))]
        .into_iter()
        .find(|p| p.exists())
}

pub fn load(file: &str) -> Result<()> {
    let Some(path) = resolve_rules_file(file) else {
        bail!("Rule file not found: {}", file);
    };
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let rules: RuleTable = serde_json::from_str(&content)
        .with_context(|| format!("Invalid rule table in {}", path.display()))?;
    if rules.is_empty() {
        bail!("Rule table in {} has no states", path.display());
    }

    let sim = update_current(|sim| sim.replace_rules(rules))?;
    println!(
        "{} Rules loaded from {} ({} states)",
        "✓".green().bold(),
        path.display().to_string().cyan(),
        sim.rules().state_count()
    );
    Ok(())
}

pub fn random(states: usize, colors: usize) -> Result<()> {
    let states = states.clamp(1, 10);
    let colors = colors.clamp(2, COLOR_COUNT);
    let rules = RuleTable::random(states, colors, &mut rand::thread_rng());
    let sim = update_current(|sim| sim.replace_rules(rules))?;
    println!(
        "{} Random rules: {} states × {} colors",
        "✓".green().bold(),
        states.to_string().cyan(),
        colors.to_string().cyan()
    );
    print_table(sim.rules());
    Ok(())
}

pub fn show() -> Result<()> {
    let config = Config::load()?;
    let sim = current_simulation(&config, false)?;
    println!(
        "{} Shared rules ({} states, {} colors)",
        "→".blue(),
        sim.rules().state_count(),
        sim.rules().color_count()
    );
    print_table(sim.rules());

    let individual = sim
        .ants()
        .iter()
        .filter(|a| a.individual_rules().is_some())
        .count();
    if individual > 0 {
        println!("  {} {} ants carry their own table", "•".yellow(), individual);
    }
    Ok(())
}

pub fn clear() -> Result<()> {
    let sim = update_current(|sim| sim.clear_grid())?;
    println!(
        "{} Grid cleared ({} ants kept)",
        "✓".green().bold(),
        sim.alive_count()
    );
    Ok(())
}
