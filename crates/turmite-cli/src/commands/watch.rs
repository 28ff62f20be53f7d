//! Watch the colony run in the terminal at the configured pace.

use anyhow::{Context, Result};
use colored::Colorize;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;
use turmite::prelude::*;

use crate::config::{current_session_path, current_simulation, data_dir, Config};
use crate::terminal::TerminalRenderer;

pub fn run(seconds: Option<u64>, rate: Option<f64>, slider: Option<f64>, fresh: bool) -> Result<()> {
    let config = Config::load()?;
    let sim = current_simulation(&config, fresh)?;

    let target = match (rate, slider) {
        (Some(sps), _) => TargetRate::StepsPerSecond(sps),
        (None, Some(position)) => TargetRate::Slider(position),
        (None, None) => sim.config().target_rate,
    };
    let scheduler = Scheduler::new(target);
    let renderer = TerminalRenderer::new(sim.grid(), config.watch.max_width, config.watch.max_height);
    let driver_config = DriverConfig {
        poll_interval_ms: config.watch.poll_interval_ms,
        frame_interval_ms: config.watch.frame_interval_ms,
    };
    tracing::info!(steps_per_second = target.steps_per_second(), "watching colony");

    let shared = Rc::new(RefCell::new(sim));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;
    let local = LocalSet::new();

    let (report, renderer) = local.block_on(&runtime, async {
        let handle = spawn_driver(
            Rc::clone(&shared),
            scheduler,
            SystemClock::new(),
            renderer,
            driver_config,
        );
        match seconds {
            Some(secs) => {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "ctrl-c handler unavailable");
                }
            }
        }
        handle.stop();
        handle.join().await
    })?;

    let sim = shared.borrow();
    std::fs::create_dir_all(data_dir()?)?;
    save_session(&sim, &current_session_path()?)?;

    println!();
    println!("{} Stopped at tick {}", "✓".green().bold(), sim.current_tick().to_string().cyan());
    println!(
        "  {} ticks, {} frames drawn ({} by the terminal)",
        report.ticks,
        report.frames,
        renderer.frames()
    );
    println!("  {} ants alive", sim.alive_count().to_string().cyan());

    Ok(())
}
