//! Tile grid and the bump/break/spawn interaction protocol
//!
//! Tiles are created once at level load and never destroyed; a broken brick
//! transitions to the empty kind instead. Solidity is always derived from the
//! kind, never stored, and the `used` flag only ever goes false -> true
//! (multi-coin bricks flip it once their last charge is spent).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::Event;
use super::item::{Debris, Item};
use crate::consts::*;

/// Static terrain classification of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Empty,
    Ground,
    Brick,
    Question,
    /// A question or multi-coin brick with nothing left to give
    Used,
    Hard,
    PipeTopLeft,
    PipeTopRight,
    PipeLeft,
    PipeRight,
    /// Decorative scenery, never collides
    Background,
    /// Flagpole marker cell
    Flag,
    /// Castle doorway marker cell
    CastleEnd,
}

impl TileKind {
    /// Whether entities collide with this kind. Derived, never overridden.
    pub fn is_solid(self) -> bool {
        !matches!(
            self,
            TileKind::Empty | TileKind::Background | TileKind::Flag | TileKind::CastleEnd
        )
    }
}

/// What pops out of a brick or question tile when bumped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Contents {
    #[default]
    None,
    Coin,
    Mushroom,
    Star,
    OneUp,
    /// Repeated coin yields, tracked by `Tile::coin_count`
    MultiCoin,
}

/// One grid cell. Position is implicit in its grid index.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub used: bool,
    /// Bump animation rise, decays 4 -> 0; a nonzero value blocks re-bumping
    pub bump_offset: u8,
    pub contents: Contents,
    pub coin_count: u8,
}

impl Tile {
    pub fn new(kind: TileKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn with_contents(kind: TileKind, contents: Contents) -> Self {
        let coin_count = if contents == Contents::MultiCoin {
            MULTI_COIN_CHARGES
        } else {
            0
        };
        Self {
            kind,
            used: false,
            bump_offset: 0,
            contents,
            coin_count,
        }
    }

    pub fn solid(&self) -> bool {
        self.kind.is_solid()
    }
}

/// Everything a bump produces, applied by the level after the player's
/// collision scan completes.
#[derive(Debug, Default)]
pub struct BumpEffects {
    pub items: Vec<Item>,
    pub debris: Vec<Debris>,
    pub coins: u32,
    pub events: Vec<Event>,
}

/// Run the tile interaction protocol for an upward hit on the tile at grid
/// cell (col, row). Only bricks and unused question tiles react; everything
/// else ignores the hit. A tile mid-bump (nonzero offset) ignores it too.
pub fn bump(tile: &mut Tile, col: i32, row: i32, player_big: bool) -> BumpEffects {
    let mut fx = BumpEffects::default();
    if tile.bump_offset > 0 {
        return fx;
    }
    let x = (col * TILE) as f32;
    let y = (row * TILE) as f32;

    match tile.kind {
        TileKind::Brick => {
            if tile.contents != Contents::None && !tile.used {
                fx.events.push(Event::Bump);
                tile.bump_offset = BUMP_OFFSET;
                if tile.contents == Contents::MultiCoin {
                    tile.coin_count = tile.coin_count.saturating_sub(1);
                    fx.items.push(Item::block_coin(Vec2::new(x, y - TILE as f32)));
                    fx.coins += 1;
                    fx.events.push(Event::Coin);
                    if tile.coin_count == 0 {
                        tile.used = true;
                        tile.kind = TileKind::Used;
                    }
                } else {
                    tile.used = true;
                    spawn_contents(tile.contents, x, y, player_big, &mut fx);
                }
            } else if player_big {
                fx.events.push(Event::Break);
                tile.kind = TileKind::Empty;
                for (dx, dy) in [(-1.0, -4.0), (1.0, -4.0), (-2.0, -2.0), (2.0, -2.0)] {
                    fx.debris.push(Debris::new(
                        Vec2::new(x + 4.0, y + 4.0),
                        Vec2::new(dx, dy),
                    ));
                }
            } else {
                fx.events.push(Event::Bump);
                tile.bump_offset = BUMP_OFFSET;
            }
        }
        TileKind::Question if !tile.used => {
            fx.events.push(Event::Bump);
            tile.bump_offset = BUMP_OFFSET;
            tile.used = true;
            spawn_contents(tile.contents, x, y, player_big, &mut fx);
        }
        _ => {}
    }
    fx
}

fn spawn_contents(contents: Contents, x: f32, y: f32, player_big: bool, fx: &mut BumpEffects) {
    match contents {
        Contents::None | Contents::Coin => {
            fx.items.push(Item::block_coin(Vec2::new(x, y - TILE as f32)));
            fx.coins += 1;
            fx.events.push(Event::Coin);
        }
        Contents::Mushroom => {
            // Never waste a growth power-up on an already-big player
            if player_big {
                fx.items.push(Item::flower(Vec2::new(x, y)));
            } else {
                fx.items.push(Item::mushroom(Vec2::new(x, y), false));
            }
            fx.events.push(Event::Sprout);
        }
        Contents::Star => {
            fx.items.push(Item::star(Vec2::new(x, y)));
            fx.events.push(Event::Sprout);
        }
        Contents::OneUp => {
            fx.items.push(Item::mushroom(Vec2::new(x, y), true));
            fx.events.push(Event::Sprout);
        }
        Contents::MultiCoin => {}
    }
}

/// Dense row-major tile storage with O(1) cell lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    width: i32,
    height: i32,
    cells: Vec<Tile>,
}

/// Tile window half-extent, in columns, for nearby-tile queries
const WINDOW_COLS: i32 = 2;
/// Tile window half-extent, in rows, for nearby-tile queries
const WINDOW_ROWS: i32 = 3;

impl TileGrid {
    pub fn new(width: i32, height: i32) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        Self {
            width: width.max(0),
            height: height.max(0),
            cells: vec![Tile::default(); len],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn get(&self, col: i32, row: i32) -> Option<&Tile> {
        if col < 0 || row < 0 || col >= self.width || row >= self.height {
            return None;
        }
        self.cells.get((row * self.width + col) as usize)
    }

    pub fn get_mut(&mut self, col: i32, row: i32) -> Option<&mut Tile> {
        if col < 0 || row < 0 || col >= self.width || row >= self.height {
            return None;
        }
        self.cells.get_mut((row * self.width + col) as usize)
    }

    pub fn set(&mut self, col: i32, row: i32, tile: Tile) {
        if let Some(cell) = self.get_mut(col, row) {
            *cell = tile;
        }
    }

    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        self.get(col, row).is_some_and(|t| t.solid())
    }

    /// Whether the tile containing the given pixel is solid. Out-of-bounds
    /// points are empty space.
    pub fn solid_at_point(&self, px: f32, py: f32) -> bool {
        let col = (px / TILE as f32).floor() as i32;
        let row = (py / TILE as f32).floor() as i32;
        self.is_solid(col, row)
    }

    /// Grid coordinates of every solid tile in a fixed window around the
    /// given position, in row-major order. This is the bounded spatial
    /// filter every collision scan uses; it never walks the whole level.
    pub fn nearby_solid(&self, x: f32, y: f32) -> Vec<(i32, i32)> {
        let tx = (x / TILE as f32).floor() as i32;
        let ty = (y / TILE as f32).floor() as i32;
        let mut out = Vec::new();
        for row in (ty - WINDOW_ROWS)..=(ty + WINDOW_ROWS) {
            for col in (tx - WINDOW_COLS)..=(tx + WINDOW_COLS) {
                if self.is_solid(col, row) {
                    out.push((col, row));
                }
            }
        }
        out
    }

    /// Advance every tile's bump animation by one tick.
    pub fn decay_bumps(&mut self) {
        for tile in &mut self.cells {
            if tile.bump_offset > 0 {
                tile.bump_offset -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::item::ItemKind;

    fn settle(tile: &mut Tile) {
        tile.bump_offset = 0;
    }

    #[test]
    fn test_solidity_derived_from_kind() {
        assert!(Tile::new(TileKind::Ground).solid());
        assert!(Tile::new(TileKind::Used).solid());
        assert!(Tile::new(TileKind::PipeLeft).solid());
        assert!(!Tile::new(TileKind::Empty).solid());
        assert!(!Tile::new(TileKind::Flag).solid());
        assert!(!Tile::new(TileKind::Background).solid());
    }

    #[test]
    fn test_question_spawns_once() {
        let mut tile = Tile::with_contents(TileKind::Question, Contents::Mushroom);
        let fx = bump(&mut tile, 4, 5, false);
        assert_eq!(fx.items.len(), 1);
        assert!(matches!(fx.items[0].kind, ItemKind::Mushroom { one_up: false }));
        assert!(fx.events.contains(&Event::Sprout));
        assert!(tile.used);

        settle(&mut tile);
        let fx = bump(&mut tile, 4, 5, false);
        assert!(fx.items.is_empty(), "used question tile must stay inert");
    }

    #[test]
    fn test_question_spawns_flower_for_big_player() {
        let mut tile = Tile::with_contents(TileKind::Question, Contents::Mushroom);
        let fx = bump(&mut tile, 0, 0, true);
        assert!(matches!(fx.items[0].kind, ItemKind::Flower));
    }

    #[test]
    fn test_question_default_coin() {
        let mut tile = Tile::with_contents(TileKind::Question, Contents::Coin);
        let fx = bump(&mut tile, 2, 3, false);
        assert_eq!(fx.coins, 1);
        assert!(matches!(fx.items[0].kind, ItemKind::Coin { from_block: true }));
        assert!(tile.used);
    }

    #[test]
    fn test_multi_coin_brick_yields_exact_charges() {
        let mut tile = Tile::with_contents(TileKind::Brick, Contents::MultiCoin);
        let mut coins = 0;
        for _ in 0..MULTI_COIN_CHARGES {
            settle(&mut tile);
            let fx = bump(&mut tile, 1, 1, false);
            coins += fx.coins;
        }
        assert_eq!(coins, MULTI_COIN_CHARGES as u32);
        assert_eq!(tile.kind, TileKind::Used);
        assert!(tile.used);

        settle(&mut tile);
        let fx = bump(&mut tile, 1, 1, false);
        assert_eq!(fx.coins, 0, "depleted brick must be permanently inert");
    }

    #[test]
    fn test_multi_coin_brick_stays_live_until_depleted() {
        let mut tile = Tile::with_contents(TileKind::Brick, Contents::MultiCoin);
        settle(&mut tile);
        bump(&mut tile, 0, 0, false);
        assert!(!tile.used);
        assert_eq!(tile.kind, TileKind::Brick);
    }

    #[test]
    fn test_big_player_breaks_plain_brick() {
        let mut tile = Tile::new(TileKind::Brick);
        let fx = bump(&mut tile, 2, 2, true);
        assert_eq!(tile.kind, TileKind::Empty);
        assert!(!tile.solid());
        assert_eq!(fx.debris.len(), 4);
        assert!(fx.events.contains(&Event::Break));
    }

    #[test]
    fn test_small_player_only_bounces_plain_brick() {
        let mut tile = Tile::new(TileKind::Brick);
        let fx = bump(&mut tile, 2, 2, false);
        assert_eq!(tile.kind, TileKind::Brick);
        assert_eq!(tile.bump_offset, BUMP_OFFSET);
        assert!(fx.debris.is_empty());
        assert!(fx.events.contains(&Event::Bump));
    }

    #[test]
    fn test_bump_blocked_while_animating() {
        let mut tile = Tile::with_contents(TileKind::Brick, Contents::MultiCoin);
        let first = bump(&mut tile, 0, 0, false);
        assert_eq!(first.coins, 1);
        let second = bump(&mut tile, 0, 0, false);
        assert_eq!(second.coins, 0);
        assert!(second.events.is_empty());
    }

    #[test]
    fn test_inert_kinds_ignore_bump() {
        for kind in [TileKind::Ground, TileKind::Hard, TileKind::Used, TileKind::PipeTopLeft] {
            let mut tile = Tile::new(kind);
            let fx = bump(&mut tile, 0, 0, true);
            assert!(fx.items.is_empty());
            assert!(fx.events.is_empty());
            assert_eq!(tile.kind, kind);
        }
    }

    #[test]
    fn test_grid_out_of_bounds_queries_are_empty() {
        let grid = TileGrid::new(4, 4);
        assert!(grid.get(-1, 0).is_none());
        assert!(grid.get(0, 99).is_none());
        assert!(!grid.solid_at_point(-50.0, 10.0));
        assert!(grid.nearby_solid(-500.0, -500.0).is_empty());
    }

    #[test]
    fn test_nearby_window_bounds() {
        let mut grid = TileGrid::new(20, 20);
        for col in 0..20 {
            grid.set(col, 10, Tile::new(TileKind::Ground));
        }
        // Entity in cell (10, 8): row 10 is inside the +/-3 row window
        let hits = grid.nearby_solid(160.0, 128.0);
        assert_eq!(hits.len(), 5, "columns 8..=12 of row 10");
        assert!(hits.contains(&(8, 10)));
        assert!(hits.contains(&(12, 10)));
        assert!(!hits.contains(&(7, 10)));
    }

    #[test]
    fn test_bump_decay() {
        let mut grid = TileGrid::new(2, 2);
        let mut tile = Tile::new(TileKind::Brick);
        tile.bump_offset = BUMP_OFFSET;
        grid.set(0, 0, tile);
        for expected in (0..BUMP_OFFSET).rev() {
            grid.decay_bumps();
            assert_eq!(grid.get(0, 0).unwrap().bump_offset, expected);
        }
        grid.decay_bumps();
        assert_eq!(grid.get(0, 0).unwrap().bump_offset, 0);
    }
}
