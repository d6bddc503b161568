//! Headless walk demo: a random grid, one entity, a handful of scripted
//! clicks. Each click is searched and walked before the next.
//!
//! Run: cargo run --bin walk [config.json]

use std::error::Error;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tilepath_core::glam::Vec3;
use tilepath_demos::{ScriptedClicks, Sim, SimConfig};
use tilepath_paths::SearchOutcome;

const CLICKS: usize = 6;
const MAX_TICKS_PER_CLICK: usize = 20_000;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(&path)?,
        None => SimConfig::default(),
    };
    let mut sim = Sim::new(&config)?;
    let mut pointer = ScriptedClicks::new(script(&sim, config.seed));

    while !pointer.is_empty() {
        let Some(target) = sim.click(&mut pointer) else {
            log::info!("click hit nothing");
            continue;
        };
        let ticks = sim.run_until_settled(MAX_TICKS_PER_CLICK);
        match sim.outcome() {
            SearchOutcome::Found(path) if path.is_empty() => {
                log::info!("{target}: already adjacent")
            }
            SearchOutcome::Found(path) => log::info!(
                "{target}: walked {} tiles in {ticks} ticks, now at {}",
                path.len(),
                sim.entity_tile().map_or_else(|| "nowhere".to_string(), |t| t.to_string())
            ),
            SearchOutcome::Unreachable => log::info!("{target}: unreachable"),
            SearchOutcome::Idle => log::info!("{target}: nothing to do"),
            SearchOutcome::Pending => log::warn!("{target}: still searching after {ticks} ticks"),
        }
    }
    log::info!("done after {} ticks", sim.ticks());
    Ok(())
}

/// Random in-grid clicks, plus one that misses the geometry and one that
/// lands off the grid.
fn script(sim: &Sim, seed: u64) -> Vec<Option<Vec3>> {
    let grid = sim.grid();
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let half_x = grid.width() as f32 * grid.scale() / 2.0;
    let half_z = grid.depth() as f32 * grid.scale() / 2.0;

    let mut clicks: Vec<Option<Vec3>> = (0..CLICKS)
        .map(|_| {
            Some(Vec3::new(
                rng.random_range(-half_x..half_x),
                0.0,
                rng.random_range(-half_z..half_z),
            ))
        })
        .collect();
    clicks.insert(2, None);
    clicks.push(Some(Vec3::new(half_x * 3.0, 0.0, 0.0)));
    clicks
}
