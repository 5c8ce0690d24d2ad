//! Coherent-noise channels and obstacle height sampling
//!
//! Two blended 2D channels shape the skyline; two more drive the lateral
//! wander of the safe corridors. All four are keyed off the run seed plus a
//! fixed per-purpose offset and instantiated once per run.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::consts::*;

/// Which of the two safe corridors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorridorSide {
    Left,
    Right,
}

/// The per-run noise channels. Cheap to sample, reused for every row.
pub struct NoiseField {
    /// Large-scale city topology
    low: Fbm<Perlin>,
    /// Local roughness
    high: Fbm<Perlin>,
    wander_left: Perlin,
    wander_right: Perlin,
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        let low = Fbm::<Perlin>::new(seed)
            .set_octaves(3)
            .set_persistence(0.5)
            .set_lacunarity(2.0);
        let high = Fbm::<Perlin>::new(seed.wrapping_add(1000)).set_octaves(2);
        Self {
            low,
            high,
            wander_left: Perlin::new(seed.wrapping_add(2000)),
            wander_right: Perlin::new(seed.wrapping_add(3000)),
        }
    }

    /// Blended, shaped, two-band remapped height before any floor or snap.
    ///
    /// The weighted blend is raised to a shaping exponent to bias toward low
    /// values; the band above the cutoff remaps into the tall range. That
    /// split, not a single linear scale, is what makes the skyline mostly
    /// short with occasional towers.
    fn raw_height(&self, x: f32, z: f32) -> f32 {
        let low = map01(self.low.get([
            (x / LOW_NOISE_SCALE) as f64,
            (z / LOW_NOISE_SCALE) as f64,
        ]));
        let high = map01(self.high.get([
            (x / HIGH_NOISE_SCALE) as f64,
            (z / HIGH_NOISE_SCALE) as f64,
        ]));
        let shaped =
            (low * LOW_NOISE_WEIGHT + high * HIGH_NOISE_WEIGHT).powf(HEIGHT_SHAPE_EXPONENT);
        if shaped > TALL_CUTOFF {
            let t = (shaped - TALL_CUTOFF) / (1.0 - TALL_CUTOFF);
            TALL_HEIGHT_MIN + t * (TALL_HEIGHT_MAX - TALL_HEIGHT_MIN)
        } else {
            let t = shaped / TALL_CUTOFF;
            MIN_BLOCK_HEIGHT + t * (SHORT_HEIGHT_MAX - MIN_BLOCK_HEIGHT)
        }
    }

    /// Obstacle height at world (x, z): floored to the minimum clearance and
    /// snapped out of the flight-altitude dead-band.
    pub fn sample_height(&self, x: f32, z: f32) -> f32 {
        snap_below_dead_band(self.raw_height(x, z).max(MIN_BLOCK_HEIGHT))
    }

    /// Lateral center of a safe corridor at forward coordinate z. Wanders
    /// smoothly within the base offset plus-or-minus the wander amplitude.
    pub fn corridor_center(&self, side: CorridorSide, z: f32) -> f32 {
        let (channel, base) = match side {
            CorridorSide::Left => (&self.wander_left, -CORRIDOR_BASE_OFFSET),
            CorridorSide::Right => (&self.wander_right, CORRIDOR_BASE_OFFSET),
        };
        let wander = channel.get([(z / CORRIDOR_WANDER_SCALE) as f64, 0.5]) as f32;
        base + wander * CORRIDOR_WANDER_AMPLITUDE
    }
}

/// Map a [-1, 1] noise value to [0, 1].
fn map01(v: f64) -> f32 {
    (((v + 1.0) * 0.5) as f32).clamp(0.0, 1.0)
}

/// Height ceiling inside a corridor band: the safe ceiling at the center,
/// rising quadratically until the clamp vanishes at the band edge.
/// Monotone non-decreasing in `dist`.
pub fn corridor_ceiling(dist: f32) -> f32 {
    let t = (dist / CORRIDOR_HALF_WIDTH).clamp(0.0, 1.0);
    CORRIDOR_SAFE_CEILING + t * t * (TALL_HEIGHT_MAX - CORRIDOR_SAFE_CEILING)
}

/// Snap a height out of the flight dead-band, always downward: a gap the
/// craft can fly through beats a lip it clips.
pub fn snap_below_dead_band(h: f32) -> f32 {
    let lo = FLIGHT_ALTITUDE - DEAD_BAND_MARGIN;
    let hi = FLIGHT_ALTITUDE + DEAD_BAND_MARGIN;
    if h >= lo && h < hi { lo } else { h }
}
