//! Craft-vs-block collision detection
//!
//! Narrow-phase only: the row window bounds how much geometry exists near
//! the craft, so a per-row z gate plus per-block slab tests is the whole
//! detector. No broad-phase index.

use glam::Vec3;

use super::rowgen::Row;
use super::state::Craft;
use crate::consts::*;

/// Test the craft against every block in rows near its forward coordinate.
/// Returns the top-center of the first block hit.
///
/// Every comparison here rejects; a NaN coordinate fails every rejection
/// and falls through to the hit branch, ending the run like any collision.
pub fn check_collision(craft: &Craft, rows: &[Row]) -> Option<Vec3> {
    for row in rows {
        if (row.z - craft.pos.z).abs() > COLLISION_ROW_TOLERANCE {
            continue;
        }
        for block in &row.blocks {
            if (block.x - craft.pos.x).abs() > block.width * 0.5 + craft.half_width {
                continue;
            }
            if (block.z - craft.pos.z).abs() > block.depth * 0.5 + craft.hit_radius {
                continue;
            }
            if block.current_top <= craft.pos.y - craft.hit_radius {
                continue;
            }
            return Some(Vec3::new(block.x, block.current_top, block.z));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rowgen::{Block, ShapeId};

    fn block(x: f32, z: f32, top: f32) -> Block {
        Block {
            x,
            z,
            width: 3.0,
            depth: 3.0,
            height: top,
            moving: false,
            osc_amplitude: 0.0,
            osc_speed: 0.0,
            osc_phase: 0.0,
            current_top: top,
            shade: 0,
            outline_tier: 0,
            shape: ShapeId(0),
        }
    }

    fn row(z: f32, blocks: Vec<Block>) -> Row {
        Row { z, blocks }
    }

    fn craft_at(x: f32, z: f32) -> Craft {
        Craft {
            pos: Vec3::new(x, FLIGHT_ALTITUDE, z),
            ..Craft::default()
        }
    }

    #[test]
    fn test_tall_block_in_path_hits() {
        let rows = vec![row(0.0, vec![block(0.0, 0.0, 8.0)])];
        assert!(check_collision(&craft_at(0.0, 0.0), &rows).is_some());
    }

    #[test]
    fn test_block_below_collision_plane_misses() {
        // Top right at the snapped dead-band floor: strictly under the
        // craft's belly.
        let top = FLIGHT_ALTITUDE - DEAD_BAND_MARGIN;
        let rows = vec![row(0.0, vec![block(0.0, 0.0, top)])];
        assert!(check_collision(&craft_at(0.0, 0.0), &rows).is_none());
    }

    #[test]
    fn test_lateral_and_forward_rejection() {
        let rows = vec![row(0.0, vec![block(0.0, 0.0, 8.0)])];
        // width/2 + half_width = 1.5 + 1.2 = 2.7
        assert!(check_collision(&craft_at(2.8, 0.0), &rows).is_none());
        assert!(check_collision(&craft_at(2.6, 0.0), &rows).is_some());
        // depth/2 + hit_radius = 1.5 + 0.8 = 2.3
        assert!(check_collision(&craft_at(0.0, 2.4), &rows).is_none());
        assert!(check_collision(&craft_at(0.0, 2.2), &rows).is_some());
    }

    #[test]
    fn test_rows_outside_z_tolerance_are_skipped() {
        let rows = vec![row(-10.0, vec![block(0.0, -10.0, 8.0)])];
        assert!(check_collision(&craft_at(0.0, 0.0), &rows).is_none());
    }

    #[test]
    fn test_oscillating_block_hits_only_when_risen() {
        let mut b = block(0.0, 0.0, SHORT_HEIGHT_MAX);
        b.moving = true;
        b.osc_amplitude = 1.8;
        b.osc_speed = 1.0;
        b.osc_phase = -std::f32::consts::FRAC_PI_2;

        // Phase puts the wave at its trough at t = 0: top == base height.
        b.update_oscillation(0.0);
        let rows = vec![row(0.0, vec![b.clone()])];
        assert!(check_collision(&craft_at(0.0, 0.0), &rows).is_none());

        // Half a period later the wave peaks: base + amplitude = 4.6, well
        // into the flight band.
        b.update_oscillation(std::f32::consts::PI);
        let rows = vec![row(0.0, vec![b])];
        assert!(check_collision(&craft_at(0.0, 0.0), &rows).is_some());
    }

    #[test]
    fn test_nan_position_is_a_terminal_collision() {
        let rows = vec![row(-200.0, vec![block(12.0, -200.0, 0.5)])];
        let mut craft = Craft::default();
        craft.pos = Vec3::splat(f32::NAN);
        assert!(check_collision(&craft, &rows).is_some());
    }
}
