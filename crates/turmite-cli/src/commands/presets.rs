//! List the built-in rule presets and any user rule files.

use anyhow::Result;
use colored::Colorize;
use turmite::prelude::*;

use crate::config::user_rules_dir;

pub fn run(show: Option<&str>) -> Result<()> {
    if let Some(name) = show {
        let rules = presets::by_name(name)?;
        println!("{} {}", "→".blue(), name.cyan().bold());
        print_table(&rules);
        return Ok(());
    }

    println!("{}", "Built-in presets".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    for preset in presets::all() {
        println!(
            "  {:<24} {} ({} states, {} colors)",
            preset.key.cyan(),
            preset.name,
            preset.rules.state_count(),
            preset.rules.color_count()
        );
    }

    if let Some(dir) = user_rules_dir().filter(|d| d.exists()) {
        let mut files: Vec<_> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().map(|e| e == "json").unwrap_or(false))
            .collect();
        files.sort();
        if !files.is_empty() {
            println!();
            println!("{} ({})", "User rule files".white().bold(), dir.display());
            for path in files {
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                println!("  {}", name.cyan());
            }
        }
    }

    Ok(())
}

/// One line per state: `writeColor move nextState` for each observed color.
pub fn print_table(rules: &RuleTable) {
    for (state, row) in rules.rows() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(color, entry)| match entry {
                Some(t) => format!("{}:{}", color, format_transition(t)),
                None => format!("{}:{}", color, "---".dimmed()),
            })
            .collect();
        println!("  {} {}", format!("s{:<2}", state).blue(), cells.join("  "));
    }
}

fn format_transition(t: &Transition) -> String {
    let next = if t.halts() {
        "H".red().to_string()
    } else {
        t.next_state.to_string()
    };
    format!("{}{}{}", t.write_color, t.move_op.symbol(), next)
}
