//! Player-fired projectiles
//!
//! A fireball skips along the ground: it falls under a capped gravity,
//! rebounds off floor tops, and dies on any other tile contact or on
//! leaving the level bounds. Enemy hits are resolved by the level, not here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{lands_on, overlaps_tile, tile_rect, Rect};
use super::tile::TileGrid;
use crate::consts::*;

const FIREBALL_SIZE: f32 = 8.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Fireball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub alive: bool,
    pub frame: u32,
}

impl Fireball {
    pub fn new(pos: Vec2, direction: f32) -> Self {
        Self {
            pos,
            vel: Vec2::new(FIREBALL_SPEED * direction, 0.0),
            alive: true,
            frame: 0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_entity(self.pos, FIREBALL_SIZE, FIREBALL_SIZE)
    }

    pub fn update(&mut self, grid: &TileGrid, level_width_px: f32) {
        self.frame += 1;
        self.vel.y = (self.vel.y + GRAVITY).min(FIREBALL_MAX_FALL);
        self.pos += self.vel;
        for (col, row) in grid.nearby_solid(self.pos.x, self.pos.y) {
            let trect = tile_rect(col, row);
            if !overlaps_tile(self.pos, FIREBALL_SIZE, FIREBALL_SIZE, &trect) {
                continue;
            }
            if lands_on(trect.y as f32, self.pos.y, FIREBALL_SIZE, self.vel.y) {
                self.pos.y = trect.y as f32 - FIREBALL_SIZE;
                self.vel.y = FIREBALL_BOUNCE;
            } else {
                self.alive = false;
            }
        }
        if self.pos.x < 0.0 || self.pos.x > level_width_px || self.pos.y > VIEW_H {
            self.alive = false;
        }
    }
}
