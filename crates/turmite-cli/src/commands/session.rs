//! Session management commands.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use turmite::prelude::*;

use crate::config::{current_session_path, sessions_dir};

pub fn save(name: &str) -> Result<()> {
    let current_path = current_session_path()?;

    if !current_path.exists() {
        bail!("No active session. Run {} first.", "turmite run".cyan());
    }

    let sessions = sessions_dir()?;
    std::fs::create_dir_all(&sessions)?;

    let session_path = sessions.join(format!("{}.json", name));
    std::fs::copy(&current_path, &session_path)
        .with_context(|| format!("Failed to save session: {}", name))?;

    println!("{} Session saved: {}", "✓".green().bold(), name.cyan());

    Ok(())
}

pub fn load(name: &str) -> Result<()> {
    let session_path = sessions_dir()?.join(format!("{}.json", name));

    if !session_path.exists() {
        bail!("Session not found: {}", name);
    }

    // Validate before it replaces the current session
    let state = load_session(&session_path)?;

    let current_path = current_session_path()?;
    std::fs::copy(&session_path, &current_path)
        .with_context(|| format!("Failed to load session: {}", name))?;

    println!("{} Session loaded: {}", "✓".green().bold(), name.cyan());
    println!("  Tick: {}", state.metadata.tick.to_string().cyan());
    println!(
        "  Grid: {}×{}",
        state.metadata.cols.to_string().cyan(),
        state.metadata.rows.to_string().cyan()
    );
    println!("  Ants: {}", state.ants.len().to_string().cyan());

    Ok(())
}

pub fn list() -> Result<()> {
    let sessions = sessions_dir()?;

    if !sessions.exists() {
        println!("{} No saved sessions.", "•".yellow());
        return Ok(());
    }

    let mut found = false;
    println!("{} Saved sessions:", "→".blue());
    println!();

    let mut paths: Vec<_> = std::fs::read_dir(&sessions)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|e| e == "json").unwrap_or(false))
        .collect();
    paths.sort();

    for path in paths {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        match load_session(&path) {
            Ok(state) => {
                println!(
                    "  {} {} (tick {}, {} ants, {}×{})",
                    "•".blue(),
                    name.white().bold(),
                    state.metadata.tick,
                    state.ants.len(),
                    state.metadata.cols,
                    state.metadata.rows
                );
                found = true;
            }
            Err(e) => {
                tracing::warn!(session = %name, error = %e, "skipping unreadable session");
            }
        }
    }

    if !found {
        println!("  {} No saved sessions.", "•".yellow());
    }

    Ok(())
}
