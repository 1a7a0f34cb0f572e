//! Platformer - headless movement playground
//!
//! Loads settings, builds a small level and plays a scripted session through
//! the movement controller, logging what the character does.

mod session;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use session::{default_script, Session};
use settings::GameSettings;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    info!("Starting platformer session...");

    let settings = match std::env::args().nth(1) {
        Some(path) => GameSettings::load_from(&PathBuf::from(path)),
        None => GameSettings::load(),
    };

    let report = Session::new(&settings, default_script())?.run();

    info!(
        frames = report.frames,
        fixed_steps = report.fixed_steps,
        jumps = report.jumps,
        jump_cuts = report.jump_cuts,
        landings = report.landings,
        turns = report.turns,
        items = ?report.items,
        position = ?report.final_position,
        "Done"
    );
    Ok(())
}
