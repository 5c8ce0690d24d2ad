//! Ribbon trail geometry
//!
//! A fixed-capacity ring of recent craft positions, rebuilt every frame
//! into an indexed triangle strip that tapers and fades toward its tail.
//! The vertex and index buffers are allocated once at full capacity; growth
//! from empty to full only moves the active draw ranges.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::consts::*;

/// GPU-ready strip vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct RibbonVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Strip base color; alpha comes from the per-pair fade.
pub const RIBBON_COLOR: [f32; 3] = [0.35, 0.9, 1.0];

pub struct RibbonTrail {
    points: Vec<Vec3>,
    /// Next write slot in the ring
    head: usize,
    count: usize,
    capacity: usize,
    vertices: Vec<RibbonVertex>,
    indices: Vec<u32>,
    active_vertices: usize,
    active_indices: usize,
}

impl RibbonTrail {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "ribbon needs at least two points");
        Self {
            points: vec![Vec3::ZERO; capacity],
            head: 0,
            count: 0,
            capacity,
            vertices: vec![RibbonVertex::zeroed(); (capacity - 1) * 2],
            indices: vec![0; (capacity - 1) * 6],
            active_vertices: 0,
            active_indices: 0,
        }
    }

    /// Append the newest craft position, overwriting the oldest on wrap.
    pub fn append(&mut self, pos: Vec3) {
        self.points[self.head] = pos;
        self.head = (self.head + 1) % self.capacity;
        self.count = (self.count + 1).min(self.capacity);
    }

    /// i-th stored point, oldest first.
    pub fn point(&self, i: usize) -> Vec3 {
        debug_assert!(i < self.count);
        self.points[(self.head + self.capacity - self.count + i) % self.capacity]
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.count = 0;
        self.active_vertices = 0;
        self.active_indices = 0;
    }

    /// Rebuild the strip buffers in place from the current history,
    /// oldest to newest.
    pub fn rebuild(&mut self) {
        let n = self.count;
        self.active_vertices = n.saturating_sub(1) * 2;
        self.active_indices = n.saturating_sub(1) * 6;
        if n < 2 {
            return;
        }

        // One vertex pair per point after the oldest; the oldest position is
        // the vanishing tail and carries no pair of its own.
        let pairs = n - 1;
        for j in 0..pairs {
            let prev = self.point(j);
            let here = self.point(j + 1);
            // 0 = oldest/thin/transparent, 1 = newest/wide/opaque.
            let ratio = (j + 1) as f32 / (n - 1) as f32;

            let dir = (here - prev).normalize_or_zero();
            let mut side = dir.cross(Vec3::Y).normalize_or_zero();
            if side == Vec3::ZERO {
                side = Vec3::X;
            }
            let half = RIBBON_HALF_WIDTH * ratio;
            let color = [RIBBON_COLOR[0], RIBBON_COLOR[1], RIBBON_COLOR[2], ratio];
            self.vertices[2 * j] = RibbonVertex {
                position: (here - side * half).to_array(),
                color,
            };
            self.vertices[2 * j + 1] = RibbonVertex {
                position: (here + side * half).to_array(),
                color,
            };
        }

        // One quad per pair. The trailing quad repeats the newest pair
        // (zero area, skipped by the rasterizer) so the index count tracks
        // the pair count without a special case.
        for q in 0..pairs {
            let a = (2 * q) as u32;
            let c = (2 * (q + 1).min(pairs - 1)) as u32;
            self.indices[q * 6..q * 6 + 6].copy_from_slice(&[a, a + 1, c, a + 1, c + 1, c]);
        }
    }

    pub fn active_vertex_count(&self) -> usize {
        self.active_vertices
    }

    pub fn active_index_count(&self) -> usize {
        self.active_indices
    }

    pub fn vertices(&self) -> &[RibbonVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}
