//! Fixed timestep simulation tick
//!
//! One call advances the whole world by `dt`: craft motion, the sliding row
//! window, the pooled populations, the ribbon strip, then collision - in
//! that order, so collision always sees this frame's block tops.

use glam::Vec3;
use rand::Rng;

use super::collision::check_collision;
use super::noise_field::CorridorSide;
use super::rowgen::RowMode;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Input intent for a single tick, read once by the host. The core
/// registers no listeners of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Leave the attract screen and start a run
    pub start: bool,
    /// Start a new run from the game-over screen
    pub restart: bool,
}

/// Spawn/retire parameters for the sliding row window. The attract screen
/// and active play use different parameters through identical mechanics.
#[derive(Debug, Clone, Copy)]
pub struct RowWindow {
    pub spacing: f32,
    pub look_ahead: f32,
    pub retire_margin: f32,
    pub mode: RowMode,
}

impl RowWindow {
    /// Degenerate parameters would grow the row set without bound inside a
    /// single tick; they are programming errors, not runtime faults.
    pub fn new(spacing: f32, look_ahead: f32, retire_margin: f32, mode: RowMode) -> Self {
        assert!(spacing > 0.0, "row spacing must be positive");
        assert!(look_ahead >= spacing, "look-ahead shorter than row spacing");
        assert!(retire_margin >= 0.0, "retire margin must be non-negative");
        Self {
            spacing,
            look_ahead,
            retire_margin,
            mode,
        }
    }

    fn active() -> Self {
        Self::new(ROW_SPACING, ROW_LOOK_AHEAD, ROW_RETIRE_MARGIN, RowMode::Normal)
    }

    fn attract() -> Self {
        Self::new(
            ROW_SPACING,
            ATTRACT_LOOK_AHEAD,
            ATTRACT_RETIRE_MARGIN,
            RowMode::EdgeTall,
        )
    }
}

/// Advance the sliding window: spawn rows out to the look-ahead distance,
/// retire rows fallen behind the craft, then apply this frame's
/// oscillation. Row destruction releases everything the row owns; the
/// shared shape cache is untouched.
pub fn advance_rows(state: &mut GameState, window: &RowWindow) {
    while state.next_row_z >= state.craft.pos.z - window.look_ahead {
        let z = state.next_row_z;
        let mode = match window.mode {
            // The opening stretch of a run is guaranteed clear.
            RowMode::Normal if state.run_start_z - z <= SAFE_ZONE_DEPTH => RowMode::SafeZone,
            m => m,
        };
        let row = state.generator.generate(z, mode, state.score);
        state.rows.push(row);
        state.events.push(GameEvent::RowSpawned { z });

        // Collectibles ride row spawns, parked over a corridor so a clean
        // line through the safe band can reach them.
        if mode == RowMode::Normal && state.rng.random_bool(COLLECTIBLE_CHANCE) {
            let side = if state.rng.random_bool(0.5) {
                CorridorSide::Left
            } else {
                CorridorSide::Right
            };
            let x = state.generator.noise().corridor_center(side, z);
            state.orbs.spawn(Vec3::new(x, FLIGHT_ALTITUDE, z), &mut state.rng);
        }

        state.next_row_z -= window.spacing;
    }

    let retire_z = state.craft.pos.z + window.retire_margin;
    let events = &mut state.events;
    state.rows.retain(|row| {
        if row.z > retire_z {
            events.push(GameEvent::RowRetired { z: row.z });
            false
        } else {
            true
        }
    });

    let time = state.time_secs();
    for row in &mut state.rows {
        row.update_oscillation(time);
    }
}

/// Advance the game state by one fixed timestep.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;
    let time = state.time_secs();

    match state.phase {
        GamePhase::Attract => {
            // Ambience autopilot: weave down the canyon.
            state.craft.pos.z -= ATTRACT_FORWARD_SPEED * dt;
            state.craft.pos.x = (time * ATTRACT_WEAVE_RATE).sin() * ATTRACT_WEAVE_SPAN;

            advance_rows(state, &RowWindow::attract());

            if state.time_ticks % TRAIL_EMIT_INTERVAL == 0 {
                let pos = state.craft.pos;
                state.trail.emit(pos, &mut state.rng);
            }
            state.trail.update(dt);
            state.debris.update(dt);

            state.ribbon.append(state.craft.pos);
            state.ribbon.rebuild();

            if input.start {
                state.begin_run();
            }
        }

        GamePhase::Playing => {
            // Constant forward speed, smoothed lateral intent.
            let intent = (input.right as i32 - input.left as i32) as f32;
            let target = intent * LATERAL_SPEED;
            let step = (target - state.craft.lateral_vel).clamp(-LATERAL_ACCEL * dt, LATERAL_ACCEL * dt);
            state.craft.lateral_vel += step;
            let max_x = LATERAL_HALF_SPREAD - 1.0;
            state.craft.pos.x = (state.craft.pos.x + state.craft.lateral_vel * dt).clamp(-max_x, max_x);
            state.craft.pos.z -= FORWARD_SPEED * dt;

            let window = RowWindow::active();
            advance_rows(state, &window);

            if state.time_ticks % TRAIL_EMIT_INTERVAL == 0 {
                let pos = state.craft.pos;
                state.trail.emit(pos, &mut state.rng);
            }
            state.trail.update(dt);
            state.debris.update(dt);

            let craft_pos = state.craft.pos;
            let retire_z = craft_pos.z + window.retire_margin;
            let picked = state.orbs.update(dt, craft_pos, time, retire_z);
            if picked > 0 {
                state.pickups_collected += picked as u64;
                state.events.push(GameEvent::CollectiblePicked { pos: craft_pos });
            }

            state.ribbon.append(state.craft.pos);
            state.ribbon.rebuild();

            let new_score =
                state.run_distance().max(0.0) as u64 + state.pickups_collected * COLLECTIBLE_SCORE;
            if new_score != state.score {
                state.score = new_score;
                state.events.push(GameEvent::ScoreChanged { score: new_score });
            }

            // Collision runs last so it evaluates this frame's oscillation.
            if let Some(hit) = check_collision(&state.craft, &state.rows) {
                let pos = state.craft.pos;
                state.debris.burst(pos, &mut state.rng);
                state.events.push(GameEvent::CollisionOccurred { pos: hit });
                state.events.push(GameEvent::RunEnded { score: state.score });
                state.phase = GamePhase::GameOver;
                log::info!(
                    "collision at z {:.1}, distance {:.0}, score {}",
                    hit.z,
                    state.run_distance(),
                    state.score
                );
            }
        }

        GamePhase::GameOver => {
            // The skyline keeps moving behind the end screen.
            for row in &mut state.rows {
                row.update_oscillation(time);
            }
            state.trail.update(dt);
            state.debris.update(dt);

            if input.restart {
                state.begin_run();
            }
        }
    }
}
