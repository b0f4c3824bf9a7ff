//! Rectangle collision primitives against the tile grid
//!
//! Two overlap tests coexist on purpose. Entity-to-entity contact (stomps,
//! pickups, projectile hits) truncates continuous positions into integer
//! pixel rectangles, which reproduces the whole-pixel contact feel of the
//! original engine. Simple entities test their continuous boxes against
//! tiles instead, so the crossing check in [`lands_on`] is exact and a
//! walker resting flush on a floor re-contacts it every tick.
//!
//! Simple entities resolve vertically when falling across a tile's top edge
//! and treat everything else as a wall hit; the player instead picks an axis
//! per overlapping tile by comparing center deltas on integer rects, with
//! ties going to the vertical axis. That tie-break reproduces known
//! corner-catching quirks and is load-bearing for level geometry, so it is
//! kept as-is.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::TILE;

/// Integer pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Truncate an entity's continuous position into its pixel box.
    pub fn from_entity(pos: Vec2, w: f32, h: f32) -> Self {
        Self {
            x: pos.x as i32,
            y: pos.y as i32,
            w: w as i32,
            h: h as i32,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> i32 {
        self.x + self.w / 2
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.h / 2
    }

    /// Strict overlap: shared edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Pixel rectangle of the tile at the given grid cell.
pub fn tile_rect(col: i32, row: i32) -> Rect {
    Rect::new(col * TILE, row * TILE, TILE, TILE)
}

/// Continuous-position overlap test of an entity box against a tile cell,
/// strict on all edges.
pub fn overlaps_tile(pos: Vec2, w: f32, h: f32, tile: &Rect) -> bool {
    pos.x < tile.right() as f32
        && pos.x + w > tile.x as f32
        && pos.y < tile.bottom() as f32
        && pos.y + h > tile.y as f32
}

/// Landing test for simple falling entities: true when the entity is moving
/// down and its bottom edge was at or above the tile's top edge before this
/// tick's move. `tile_top` is the tile's top in pixels.
pub fn lands_on(tile_top: f32, y: f32, h: f32, vy: f32) -> bool {
    vy > 0.0 && y + h - vy <= tile_top
}
