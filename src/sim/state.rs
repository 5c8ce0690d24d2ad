//! Game state and outbound events
//!
//! Everything a run owns lives here: the craft, the active row window, the
//! pooled populations, the ribbon ring, and the event queue the host drains.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collectibles::CollectibleSystem;
use super::particles::{ExplosionSystem, TrailSystem};
use super::ribbon::RibbonTrail;
use super::rowgen::{Row, RowGenerator};
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Idle screen: the craft flies itself down an ambience canyon
    Attract,
    /// Active run
    Playing,
    /// Run ended by collision
    GameOver,
}

/// The player craft. Altitude is fixed; forward speed is constant and the
/// player steers laterally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Craft {
    pub pos: Vec3,
    pub lateral_vel: f32,
    pub half_width: f32,
    pub hit_radius: f32,
}

impl Default for Craft {
    fn default() -> Self {
        Self {
            pos: Vec3::new(0.0, FLIGHT_ALTITUDE, 0.0),
            lateral_vel: 0.0,
            half_width: CRAFT_HALF_WIDTH,
            hit_radius: CRAFT_HIT_RADIUS,
        }
    }
}

/// Fire-and-forget notifications for the host collaborators (renderer,
/// audio, haptics, UI). Pushed during `tick`, drained by the host after;
/// the core never waits on a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RowSpawned { z: f32 },
    RowRetired { z: f32 },
    CollectiblePicked { pos: Vec3 },
    CollisionOccurred { pos: Vec3 },
    ScoreChanged { score: u64 },
    RunEnded { score: u64 },
}

/// Complete simulation state for one session.
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    pub score: u64,
    pub pickups_collected: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub craft: Craft,
    /// Active rows, oldest (furthest behind) first
    pub rows: Vec<Row>,
    /// Generation frontier: the next row spawns here
    pub next_row_z: f32,
    /// Craft z when the current run began
    pub run_start_z: f32,
    pub generator: RowGenerator,
    pub trail: TrailSystem,
    pub debris: ExplosionSystem,
    pub orbs: CollectibleSystem,
    pub ribbon: RibbonTrail,
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a new session in the attract phase.
    pub fn new(seed: u64) -> Self {
        let craft = Craft::default();
        let next_row_z = craft.pos.z + FRONTIER_START_OFFSET;
        Self {
            seed,
            phase: GamePhase::Attract,
            score: 0,
            pickups_collected: 0,
            time_ticks: 0,
            craft,
            rows: Vec::new(),
            next_row_z,
            run_start_z: 0.0,
            generator: RowGenerator::new(seed),
            trail: TrailSystem::new(),
            debris: ExplosionSystem::new(),
            orbs: CollectibleSystem::new(),
            ribbon: RibbonTrail::new(RIBBON_CAPACITY),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Seconds of simulated time.
    pub fn time_secs(&self) -> f32 {
        self.time_ticks as f32 * SIM_DT
    }

    /// Forward distance travelled since the current run began.
    pub fn run_distance(&self) -> f32 {
        self.run_start_z - self.craft.pos.z
    }

    /// Tear the world down synchronously: every row destroyed, every
    /// checked-out pooled node back in its pool, ring and frontier reset.
    /// Runs to completion before the next tick can observe anything.
    pub fn reset_world(&mut self) {
        for row in self.rows.drain(..) {
            self.events.push(GameEvent::RowRetired { z: row.z });
        }
        self.trail.clear();
        self.debris.clear();
        self.orbs.clear();
        self.ribbon.clear();
        self.craft = Craft::default();
        self.run_start_z = self.craft.pos.z;
        self.next_row_z = self.craft.pos.z + FRONTIER_START_OFFSET;
    }

    /// Start a fresh active run.
    pub fn begin_run(&mut self) {
        self.reset_world();
        self.score = 0;
        self.pickups_collected = 0;
        self.phase = GamePhase::Playing;
        log::info!("run started (seed {})", self.seed);
    }

    /// Hand the tick's accumulated notifications to the host.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
