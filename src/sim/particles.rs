//! Pooled transient particles: engine trail puffs and explosion debris
//!
//! Both systems tick with the same discipline: advance every particle once,
//! swap survivors toward the front, drain the dead tail back into the pool.
//! No collection is allocated per tick.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use std::f32::consts::{FRAC_PI_2, TAU};

use super::pool::ObjectPool;
use crate::consts::*;

/// A pooled renderable sprite. The handle (`id`) is stable for the node's
/// whole lifetime; reset hides it and zeroes per-use state.
#[derive(Debug, Clone, Default)]
pub struct SpriteNode {
    pub id: u32,
    pub pos: Vec3,
    pub scale: f32,
    pub opacity: f32,
    pub spin: Vec3,
    pub visible: bool,
}

impl SpriteNode {
    fn with_id(id: u32) -> Self {
        Self { id, ..Self::default() }
    }

    /// Return-to-pool normalization: keep the handle, clear everything else.
    pub(crate) fn reset(&mut self) {
        *self = Self::with_id(self.id);
    }
}

/// Shared pool shape for every sprite-backed population.
pub(crate) fn sprite_pool(floor: usize) -> ObjectPool<SpriteNode> {
    let mut next_id = 0u32;
    let mut pool = ObjectPool::new(
        move || {
            next_id += 1;
            SpriteNode::with_id(next_id)
        },
        SpriteNode::reset,
    );
    pool.preallocate(floor);
    pool
}

/// One live particle; owns its pooled node while checked out.
#[derive(Debug)]
pub struct Particle {
    pub node: SpriteNode,
    pub vel: Vec3,
    pub tumble: Vec3,
    pub life: f32,
    pub max_life: f32,
}

/// Short-lived puffs shed behind the craft's engines. Linear motion; the
/// remaining-life ratio drives both opacity and scale.
pub struct TrailSystem {
    pool: ObjectPool<SpriteNode>,
    particles: Vec<Particle>,
}

impl TrailSystem {
    pub fn new() -> Self {
        Self {
            pool: sprite_pool(TRAIL_POOL_FLOOR),
            particles: Vec::with_capacity(TRAIL_POOL_FLOOR),
        }
    }

    pub fn emit(&mut self, pos: Vec3, rng: &mut Pcg32) {
        let mut node = self.pool.acquire();
        node.pos = pos
            + Vec3::new(
                rng.random_range(-0.25..0.25),
                rng.random_range(-0.15..0.15),
                0.0,
            );
        node.scale = TRAIL_PARTICLE_SCALE;
        node.opacity = 1.0;
        node.visible = true;
        self.particles.push(Particle {
            node,
            // Puffs drift up and fall away behind the craft.
            vel: Vec3::new(0.0, rng.random_range(0.2..0.8), rng.random_range(1.5..3.0)),
            tumble: Vec3::ZERO,
            life: TRAIL_PARTICLE_LIFE,
            max_life: TRAIL_PARTICLE_LIFE,
        });
    }

    pub fn update(&mut self, dt: f32) {
        let mut kept = 0;
        for i in 0..self.particles.len() {
            let p = &mut self.particles[i];
            p.life -= dt;
            p.node.pos += p.vel * dt;
            let ratio = (p.life / p.max_life).max(0.0);
            p.node.opacity = ratio;
            p.node.scale = TRAIL_PARTICLE_SCALE * ratio;
            if p.life > 0.0 {
                self.particles.swap(kept, i);
                kept += 1;
            }
        }
        for dead in self.particles.drain(kept..) {
            self.pool.release(dead.node);
        }
    }

    /// Release every live particle (run reset).
    pub fn clear(&mut self) {
        for p in self.particles.drain(..) {
            self.pool.release(p.node);
        }
    }

    pub fn live(&self) -> &[Particle] {
        &self.particles
    }

    pub fn pool(&self) -> &ObjectPool<SpriteNode> {
        &self.pool
    }
}

impl Default for TrailSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Debris thrown by a hull impact: hemispherical launch cone, constant
/// gravity, per-particle tumble.
pub struct ExplosionSystem {
    pool: ObjectPool<SpriteNode>,
    particles: Vec<Particle>,
}

impl ExplosionSystem {
    pub fn new() -> Self {
        Self {
            pool: sprite_pool(EXPLOSION_POOL_FLOOR),
            particles: Vec::with_capacity(EXPLOSION_POOL_FLOOR),
        }
    }

    pub fn burst(&mut self, pos: Vec3, rng: &mut Pcg32) {
        for _ in 0..EXPLOSION_PARTICLE_COUNT {
            let azimuth = rng.random_range(0.0..TAU);
            let elevation = rng.random_range(0.15..FRAC_PI_2);
            let speed = rng.random_range(4.0..14.0);
            let (sin_a, cos_a) = azimuth.sin_cos();
            let (sin_e, cos_e) = elevation.sin_cos();
            let dir = Vec3::new(cos_a * cos_e, sin_e, sin_a * cos_e);

            let mut node = self.pool.acquire();
            node.pos = pos;
            node.scale = rng.random_range(0.15..0.4);
            node.opacity = 1.0;
            node.visible = true;

            let life = rng.random_range(EXPLOSION_LIFE_MIN..EXPLOSION_LIFE_MAX);
            self.particles.push(Particle {
                node,
                vel: dir * speed,
                tumble: Vec3::new(
                    rng.random_range(-4.0..4.0),
                    rng.random_range(-4.0..4.0),
                    rng.random_range(-4.0..4.0),
                ),
                life,
                max_life: life,
            });
        }
    }

    pub fn update(&mut self, dt: f32) {
        let mut kept = 0;
        for i in 0..self.particles.len() {
            let p = &mut self.particles[i];
            p.life -= dt;
            p.vel.y -= EXPLOSION_GRAVITY * dt;
            p.node.pos += p.vel * dt;
            p.node.spin += p.tumble * dt;
            p.node.opacity = (p.life / p.max_life).max(0.0);
            if p.life > 0.0 {
                self.particles.swap(kept, i);
                kept += 1;
            }
        }
        for dead in self.particles.drain(kept..) {
            self.pool.release(dead.node);
        }
    }

    pub fn clear(&mut self) {
        for p in self.particles.drain(..) {
            self.pool.release(p.node);
        }
    }

    pub fn live(&self) -> &[Particle] {
        &self.particles
    }

    pub fn pool(&self) -> &ObjectPool<SpriteNode> {
        &self.pool
    }
}

impl Default for ExplosionSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(1)
    }

    #[test]
    fn test_trail_fades_and_shrinks_with_life_ratio() {
        let mut trail = TrailSystem::new();
        let mut rng = rng();
        trail.emit(Vec3::new(0.0, 4.0, 0.0), &mut rng);

        let dt = TRAIL_PARTICLE_LIFE / 3.0;
        trail.update(dt);
        let p = &trail.live()[0];
        let ratio = p.life / p.max_life;
        assert!(ratio < 1.0 && ratio > 0.0);
        assert!((p.node.opacity - ratio).abs() < 1e-6);
        assert!((p.node.scale - TRAIL_PARTICLE_SCALE * ratio).abs() < 1e-6);
    }

    #[test]
    fn test_dead_trail_particles_return_to_pool() {
        let mut trail = TrailSystem::new();
        let mut rng = rng();
        for _ in 0..5 {
            trail.emit(Vec3::ZERO, &mut rng);
        }
        assert_eq!(trail.pool().available(), TRAIL_POOL_FLOOR - 5);

        trail.update(TRAIL_PARTICLE_LIFE + 0.01);
        assert!(trail.live().is_empty());
        assert_eq!(trail.pool().available(), trail.pool().constructed());
    }

    #[test]
    fn test_compaction_keeps_survivors_without_allocating_new_nodes() {
        let mut trail = TrailSystem::new();
        let mut rng = rng();
        trail.emit(Vec3::ZERO, &mut rng);
        trail.update(TRAIL_PARTICLE_LIFE * 0.5);
        trail.emit(Vec3::ZERO, &mut rng);

        // Old puff dies, fresh one survives.
        trail.update(TRAIL_PARTICLE_LIFE * 0.6);
        assert_eq!(trail.live().len(), 1);
        assert_eq!(trail.pool().constructed(), TRAIL_POOL_FLOOR);
    }

    #[test]
    fn test_explosion_gravity_and_tumble() {
        let mut debris = ExplosionSystem::new();
        let mut rng = rng();
        debris.burst(Vec3::new(0.0, 4.0, -10.0), &mut rng);
        assert_eq!(debris.live().len(), EXPLOSION_PARTICLE_COUNT);

        let before: Vec<f32> = debris.live().iter().map(|p| p.vel.y).collect();
        let dt = 0.1;
        debris.update(dt);
        for (p, vy) in debris.live().iter().zip(before) {
            assert!((p.vel.y - (vy - EXPLOSION_GRAVITY * dt)).abs() < 1e-4);
            assert!(p.node.spin.length() > 0.0 || p.tumble.length() < 1e-6);
        }
    }

    #[test]
    fn test_explosion_cone_points_upward() {
        let mut debris = ExplosionSystem::new();
        let mut rng = rng();
        debris.burst(Vec3::ZERO, &mut rng);
        for p in debris.live() {
            assert!(p.vel.y > 0.0, "launch velocity must be in the upper hemisphere");
        }
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut debris = ExplosionSystem::new();
        let mut rng = rng();
        debris.burst(Vec3::ZERO, &mut rng);
        debris.clear();
        assert!(debris.live().is_empty());
        assert_eq!(debris.pool().available(), debris.pool().constructed());
    }
}
