//! Headless demo driver
//!
//! Runs a few seconds of attract ambience, then a scripted run until the
//! city wins, and prints a JSON run summary. Frame pacing lives here - the
//! sim exposes `tick(dt)` and owns no timer of its own.

use serde::Serialize;

use volt_runner::consts::SIM_DT;
use volt_runner::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    distance: f32,
    score: u64,
    pickups: u64,
    rows_live: usize,
    events_seen: usize,
}

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(42);
    let mut state = GameState::new(seed);
    log::info!("volt-runner demo starting (seed {seed})");

    let mut events_seen = 0usize;

    // Two seconds of attract ambience.
    for _ in 0..240 {
        tick(&mut state, &TickInput::default(), SIM_DT);
        events_seen += state.drain_events().len();
    }

    // Start the run and weave until something tall gets in the way.
    let start = TickInput {
        start: true,
        ..Default::default()
    };
    tick(&mut state, &start, SIM_DT);
    events_seen += state.drain_events().len();

    let max_ticks = 120 * 120;
    for i in 0..max_ticks {
        let input = TickInput {
            left: (i / 180) % 2 == 0,
            right: (i / 180) % 2 == 1,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        for event in state.drain_events() {
            events_seen += 1;
            match event {
                GameEvent::CollectiblePicked { pos } => {
                    log::info!("orb collected at ({:.1}, {:.1}, {:.1})", pos.x, pos.y, pos.z);
                }
                GameEvent::CollisionOccurred { pos } => {
                    log::info!("impact at ({:.1}, {:.1}, {:.1})", pos.x, pos.y, pos.z);
                }
                _ => {}
            }
        }
        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    let summary = RunSummary {
        seed,
        ticks: state.time_ticks,
        distance: state.run_distance(),
        score: state.score,
        pickups: state.pickups_collected,
        rows_live: state.rows.len(),
        events_seen,
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("summary serialization failed: {err}"),
    }
}
