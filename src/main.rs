//! Orbit Merge headless runner
//!
//! Plays a scripted session (a launch whenever a ball is held) and prints a
//! JSON summary of the final board.
//!
//! Usage: `orbit-merge [bubble|bowl|open|CONFIG.json] [FRAMES]`

use std::f32::consts::FRAC_PI_2;

use serde::Serialize;

use orbit_merge::polar_to_cartesian;
use orbit_merge::sim::{Ball, SimEvent};
use orbit_merge::{Session, SimConfig, Variant, Viewport};

const DEFAULT_FRAMES: u64 = 60 * 60;
const VIEWPORT: Viewport = Viewport {
    width: 1280.0,
    height: 720.0,
};

#[derive(Debug, Serialize)]
struct Summary<'a> {
    frames: u64,
    launches: u32,
    merges: u32,
    escaped: u32,
    highest_level: usize,
    game_over: bool,
    balls: &'a [Ball],
}

fn load_config(arg: Option<&str>) -> Result<SimConfig, orbit_merge::ConfigError> {
    match arg {
        None => Ok(SimConfig::for_viewport(Variant::default(), &VIEWPORT)),
        Some(name) => match Variant::from_str(name) {
            Some(variant) => Ok(SimConfig::for_viewport(variant, &VIEWPORT)),
            None => SimConfig::load(name),
        },
    }
}

fn main() {
    env_logger::init();
    log::info!("Orbit Merge (headless) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match load_config(args.first().map(String::as_str)) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let frames = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let mut session = Session::new(config, VIEWPORT, 0x5eed);
    let mut launches = 0u32;
    let mut merges = 0u32;
    let mut escaped = 0u32;

    for _ in 0..frames {
        if session.state().held.is_some() && !session.is_aiming() {
            // Pull up and slightly sideways so balls fan out around the core
            let spread = ((launches as f32 * 0.618).fract() - 0.5) * 1.2;
            let stretch = 60.0 + 20.0 * (launches % 3) as f32;
            let spawn = session.viewport().spawn_point();
            if session.pointer_down(spawn) {
                session.pointer_move(spawn + polar_to_cartesian(stretch, -FRAC_PI_2 + spread));
                if let Some(path) = session.predicted_path() {
                    log::debug!("Aim preview: {} points", path.count());
                }
                session.pointer_up();
            }
        }

        session.step_frame();

        for event in session.drain_events() {
            match event {
                SimEvent::Launched { .. } => launches += 1,
                SimEvent::Merged { level, .. } => {
                    merges += 1;
                    log::info!("Merge #{} reached level {}", merges, level);
                }
                SimEvent::Escaped { .. } => escaped += 1,
                SimEvent::GameOver => log::warn!("Game over"),
                SimEvent::Spawned { .. } => {}
            }
        }

        if session.is_game_over() {
            break;
        }
    }

    let state = session.state();
    let summary = Summary {
        frames: state.time_ticks,
        launches,
        merges,
        escaped,
        highest_level: state.balls.iter().map(|b| b.level).max().unwrap_or(0),
        game_over: state.is_game_over(),
        balls: &state.balls,
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize summary: {}", e),
    }
}
