//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collectibles;
pub mod collision;
pub mod noise_field;
pub mod particles;
pub mod pool;
pub mod ribbon;
pub mod rowgen;
pub mod state;
pub mod tick;

pub use collectibles::{Collectible, CollectibleSystem};
pub use collision::check_collision;
pub use noise_field::{CorridorSide, NoiseField};
pub use particles::{ExplosionSystem, Particle, SpriteNode, TrailSystem};
pub use pool::ObjectPool;
pub use ribbon::{RibbonTrail, RibbonVertex};
pub use rowgen::{Block, Row, RowGenerator, RowMode, ShapeCache, ShapeId};
pub use state::{Craft, GameEvent, GamePhase, GameState};
pub use tick::{RowWindow, TickInput, advance_rows, tick};
