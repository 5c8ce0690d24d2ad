//! Obstacle row generation
//!
//! A row is one lateral slice of the city at a fixed forward coordinate.
//! Generation runs three passes over a fixed cell grid: sample, de-clump,
//! build. The same (seed, z, mode, score tier) always yields the same row.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f32::consts::TAU;

use super::noise_field::{CorridorSide, NoiseField, corridor_ceiling, snap_below_dead_band};
use crate::consts::*;

/// Outline colors cycle with score as a visual progress indicator.
pub const OUTLINE_PALETTE: [[f32; 4]; 6] = [
    [0.2, 0.9, 1.0, 1.0],  // cyan
    [1.0, 0.35, 0.8, 1.0], // magenta
    [1.0, 0.85, 0.2, 1.0], // amber
    [0.3, 1.0, 0.5, 1.0],  // green
    [0.7, 0.4, 1.0, 1.0],  // violet
    [1.0, 0.5, 0.25, 1.0], // ember
];

/// Generation profile for one row. The profiles are mutually exclusive by
/// construction; each defines its own complete height rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowMode {
    /// Noise terrain with both safe corridors carved through it.
    Normal,
    /// Guaranteed-clear starting stretch: every height clamped low.
    SafeZone,
    /// Attract-screen canyon: flat center, towers growing toward the edges.
    EdgeTall,
}

/// Handle to shared, deduplicated block geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeId(pub u32);

/// Interns block dimensions quantized to a coarse grid, so every block with
/// the same quantized (w, h, d) shares one geometry entry. Append-only;
/// the shape space is finite in practice, so growth is monitored, not
/// bounded.
#[derive(Debug, Default)]
pub struct ShapeCache {
    map: HashMap<(i32, i32, i32), ShapeId>,
    next: u32,
}

impl ShapeCache {
    pub fn intern(&mut self, width: f32, height: f32, depth: f32) -> ShapeId {
        let key = (quantize(width), quantize(height), quantize(depth));
        *self.map.entry(key).or_insert_with(|| {
            let id = ShapeId(self.next);
            self.next += 1;
            id
        })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn quantize(v: f32) -> i32 {
    (v / SHAPE_QUANT).round() as i32
}

/// One obstacle cell. `current_top` is the live top height after this
/// frame's oscillation; it never drops below the base height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub x: f32,
    pub z: f32,
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    pub moving: bool,
    pub osc_amplitude: f32,
    pub osc_speed: f32,
    pub osc_phase: f32,
    pub current_top: f32,
    pub shade: u8,
    pub outline_tier: u8,
    pub shape: ShapeId,
}

impl Block {
    /// Oscillation lifts the top from the base height, never below it, so
    /// the minimum-clearance invariant survives motion.
    pub fn update_oscillation(&mut self, time: f32) {
        if self.moving {
            let wave = 0.5 * (1.0 + (time * self.osc_speed + self.osc_phase).sin());
            self.current_top = self.height + self.osc_amplitude * wave;
        }
    }
}

/// A generation unit: the ordered blocks at one forward coordinate.
/// Insertion order is generation order, not spatial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub z: f32,
    pub blocks: Vec<Block>,
}

impl Row {
    pub fn update_oscillation(&mut self, time: f32) {
        for block in &mut self.blocks {
            block.update_oscillation(time);
        }
    }
}

/// Builds rows from the noise field, corridor rules, and per-row RNG
/// streams. Owns the shared shape cache explicitly - no module-level state.
pub struct RowGenerator {
    seed: u64,
    noise: NoiseField,
    shapes: ShapeCache,
}

impl RowGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            noise: NoiseField::new(seed as u32),
            shapes: ShapeCache::default(),
        }
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    pub fn shapes(&self) -> &ShapeCache {
        &self.shapes
    }

    /// Build the row at forward coordinate `z`.
    pub fn generate(&mut self, z: f32, mode: RowMode, score: u64) -> Row {
        let row_seed = self.seed ^ row_key(z).wrapping_mul(2654435761);
        let mut rng = Pcg32::seed_from_u64(row_seed);

        // Pass 1: jitter and sample each cell across the lateral spread.
        struct Cell {
            x: f32,
            width: f32,
            depth: f32,
            height: f32,
        }
        let mut cells: Vec<Cell> = Vec::with_capacity(CELLS_PER_ROW);
        for i in 0..CELLS_PER_ROW {
            let slot = -LATERAL_HALF_SPREAD + i as f32 * CELL_STEP;
            let x = slot + rng.random_range(-CELL_JITTER..CELL_JITTER);
            let width = rng.random_range(BLOCK_WIDTH_MIN..BLOCK_WIDTH_MAX);
            let depth = rng.random_range(BLOCK_DEPTH_MIN..BLOCK_DEPTH_MAX);
            let height = self.cell_height(x, z, mode);
            cells.push(Cell { x, width, depth, height });
        }

        // Pass 2: de-clump. A tower within the minimum cell gap of the
        // previously accepted tower is demoted to a random short height.
        let mut last_tall: Option<usize> = None;
        for i in 0..cells.len() {
            if cells[i].height < TALL_HEIGHT_MIN {
                continue;
            }
            match last_tall {
                Some(prev) if i - prev < TALL_MIN_GAP_CELLS => {
                    cells[i].height = rng.random_range(MIN_BLOCK_HEIGHT..SHORT_HEIGHT_MAX);
                }
                _ => last_tall = Some(i),
            }
        }

        // Pass 3: motion, cosmetics, shared shapes. Each cell draws from its
        // own stream of the row's seed family.
        let outline_tier = ((score / OUTLINE_SCORE_INTERVAL) % OUTLINE_PALETTE.len() as u64) as u8;
        let mut blocks = Vec::with_capacity(cells.len());
        for (i, cell) in cells.iter().enumerate() {
            let mut cell_rng =
                Pcg32::seed_from_u64(row_seed ^ (i as u64 + 1).wrapping_mul(0x9E37_79B9));
            // The opening stretch stays static: a riser could lift its top
            // into the flight band.
            let moving = mode != RowMode::SafeZone && cell_rng.random_bool(MOVING_BLOCK_CHANCE);
            let (osc_amplitude, osc_speed, osc_phase) = if moving {
                (
                    cell_rng.random_range(OSC_AMPLITUDE_MIN..OSC_AMPLITUDE_MAX),
                    cell_rng.random_range(OSC_SPEED_MIN..OSC_SPEED_MAX),
                    cell_rng.random_range(0.0..TAU),
                )
            } else {
                (0.0, 0.0, 0.0)
            };
            let shade = cell_rng.random_range(0..BLOCK_SHADE_COUNT) as u8;
            let shape = self.shapes.intern(cell.width, cell.height, cell.depth);
            blocks.push(Block {
                x: cell.x,
                z,
                width: cell.width,
                depth: cell.depth,
                height: cell.height,
                moving,
                osc_amplitude,
                osc_speed,
                osc_phase,
                current_top: cell.height,
                shade,
                outline_tier,
                shape,
            });
        }

        Row { z, blocks }
    }

    fn cell_height(&self, x: f32, z: f32, mode: RowMode) -> f32 {
        match mode {
            RowMode::SafeZone => self.noise.sample_height(x, z).min(SAFE_ZONE_CEILING),
            RowMode::EdgeTall => {
                let t = (x.abs() / LATERAL_HALF_SPREAD).min(1.0);
                let h = self.noise.sample_height(x, z) * t * t;
                snap_below_dead_band(h.max(MIN_BLOCK_HEIGHT))
            }
            RowMode::Normal => {
                let mut h = self.noise.sample_height(x, z);
                // Both corridor clamps apply independently; the minimum wins
                // wherever the bands overlap.
                for side in [CorridorSide::Left, CorridorSide::Right] {
                    let dist = (x - self.noise.corridor_center(side, z)).abs();
                    if dist < CORRIDOR_HALF_WIDTH {
                        h = h.min(corridor_ceiling(dist));
                    }
                }
                snap_below_dead_band(h.max(MIN_BLOCK_HEIGHT))
            }
        }
    }
}

fn row_key(z: f32) -> u64 {
    (z * 16.0).round() as i64 as u64
}
