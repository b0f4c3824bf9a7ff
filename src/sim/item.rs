//! Pickup items and brick debris
//!
//! Pickups spawned out of a tile share an emerge phase: they rise a fixed
//! distance out of their spawning block before ordinary physics applies.
//! Coins popped out of a block are a special case; they never collide with
//! the player (the coin was credited at spawn time) and expire on a timer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{lands_on, overlaps_tile, tile_rect, Rect};
use super::tile::TileGrid;
use crate::consts::*;

/// Tagged pickup variant; the player switches over this when applying the
/// effect, no type inspection anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Mushroom { one_up: bool },
    Flower,
    Star,
    Coin { from_block: bool },
}

/// A collectible in the level's item collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub alive: bool,
    pub frame: u32,
    /// Still rising out of the spawning tile
    pub emerging: bool,
    emerge_from: f32,
    /// Remaining lifetime of a block coin
    ttl: u32,
}

const ITEM_SIZE: f32 = 16.0;

impl Item {
    fn spawn(kind: ItemKind, pos: Vec2, vel: Vec2, emerging: bool, ttl: u32) -> Self {
        Self {
            kind,
            pos,
            vel,
            alive: true,
            frame: 0,
            emerging,
            emerge_from: pos.y,
            ttl,
        }
    }

    pub fn mushroom(pos: Vec2, one_up: bool) -> Self {
        Self::spawn(
            ItemKind::Mushroom { one_up },
            pos,
            Vec2::new(MUSHROOM_SPEED, 0.0),
            true,
            0,
        )
    }

    pub fn flower(pos: Vec2) -> Self {
        Self::spawn(ItemKind::Flower, pos, Vec2::ZERO, true, 0)
    }

    pub fn star(pos: Vec2) -> Self {
        Self::spawn(ItemKind::Star, pos, Vec2::new(STAR_SPEED, 0.0), true, 0)
    }

    /// Coin launched out of a bumped block; already credited, purely visual.
    pub fn block_coin(pos: Vec2) -> Self {
        Self::spawn(
            ItemKind::Coin { from_block: true },
            pos,
            Vec2::new(0.0, BLOCK_COIN_LAUNCH),
            false,
            BLOCK_COIN_TICKS,
        )
    }

    /// Coin placed directly in the level grid.
    pub fn placed_coin(pos: Vec2) -> Self {
        Self::spawn(ItemKind::Coin { from_block: false }, pos, Vec2::ZERO, false, 0)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_entity(self.pos, ITEM_SIZE, ITEM_SIZE)
    }

    /// Block coins never interact with the player.
    pub fn is_block_coin(&self) -> bool {
        matches!(self.kind, ItemKind::Coin { from_block: true })
    }

    pub fn update(&mut self, grid: &TileGrid) {
        self.frame += 1;
        match self.kind {
            ItemKind::Coin { from_block: true } => {
                self.ttl = self.ttl.saturating_sub(1);
                self.vel.y += BLOCK_COIN_GRAVITY;
                self.pos.y += self.vel.y;
                if self.ttl == 0 {
                    self.alive = false;
                }
            }
            ItemKind::Coin { from_block: false } => {}
            ItemKind::Flower => {
                self.emerge();
            }
            ItemKind::Mushroom { .. } | ItemKind::Star => {
                if self.emerge() {
                    return;
                }
                self.vel.y = (self.vel.y + GRAVITY).min(MAX_FALL);
                self.pos += self.vel;
                let bounce = if matches!(self.kind, ItemKind::Star) {
                    STAR_BOUNCE
                } else {
                    0.0
                };
                for (col, row) in grid.nearby_solid(self.pos.x, self.pos.y) {
                    let trect = tile_rect(col, row);
                    if !overlaps_tile(self.pos, ITEM_SIZE, ITEM_SIZE, &trect) {
                        continue;
                    }
                    if lands_on(trect.y as f32, self.pos.y, ITEM_SIZE, self.vel.y) {
                        self.pos.y = trect.y as f32 - ITEM_SIZE;
                        self.vel.y = bounce;
                    } else if self.vel.x != 0.0 {
                        self.vel.x = -self.vel.x;
                    }
                }
                if self.pos.y > VIEW_H + 32.0 {
                    self.alive = false;
                }
            }
        }
    }

    /// Advance the emerge phase. Returns true while still emerging.
    fn emerge(&mut self) -> bool {
        if !self.emerging {
            return false;
        }
        self.pos.y -= EMERGE_SPEED;
        if self.emerge_from - self.pos.y >= EMERGE_DISTANCE {
            self.emerging = false;
        }
        true
    }
}

/// A fragment of a broken brick. Pure ballistic motion, no tile collision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Debris {
    pub pos: Vec2,
    pub vel: Vec2,
    pub alive: bool,
}

impl Debris {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            alive: true,
        }
    }

    pub fn update(&mut self) {
        self.vel.y += DEBRIS_GRAVITY;
        self.pos += self.vel;
        if self.pos.y > VIEW_H + 32.0 {
            self.alive = false;
        }
    }
}
