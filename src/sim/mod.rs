//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (60 Hz)
//! - Stable iteration order (spawn order, deferred removal)
//! - No rendering, audio, or platform dependencies

pub mod collision;
pub mod enemy;
pub mod events;
pub mod item;
pub mod level;
pub mod player;
pub mod projectile;
pub mod tile;

pub use collision::Rect;
pub use enemy::{Enemy, EnemyKind, EnemyVisual, ShellState};
pub use events::{Event, MusicTrack};
pub use item::{Debris, Item, ItemKind};
pub use level::{InputState, Level, LevelMeta};
pub use player::{Player, PlayerVisual};
pub use projectile::Fireball;
pub use tile::{Contents, Tile, TileGrid, TileKind};
