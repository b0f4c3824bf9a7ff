//! Level state and per-tick orchestration
//!
//! The level owns every tile, enemy, item, and debris particle, and runs the
//! fixed order each tick: player control and tile resolution, tile bump
//! decay, enemy updates and contact outcomes, item updates and pickups,
//! debris, camera chase, projectile hits, and finally win detection.
//! Collections are walked by index and compacted after each pass so nothing
//! is skipped or double-processed when members die mid-iteration.
//!
//! Score and coin deltas plus the event queue accumulate across the tick and
//! are drained by the embedding session.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::events::Event;
use super::item::{Debris, Item};
use super::player::Player;
use super::tile::{self, Contents, Tile, TileGrid, TileKind};
use crate::consts::*;

/// One tick's worth of digital input. `run` doubles as the fire trigger.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub run: bool,
    pub jump: bool,
    pub duck: bool,
    pub start: bool,
}

/// Level metadata supplied by the loader alongside the cell grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LevelMeta {
    pub underground: bool,
    pub underwater: bool,
    pub castle: bool,
    pub time_limit: f32,
}

impl Default for LevelMeta {
    fn default() -> Self {
        Self {
            underground: false,
            underwater: false,
            castle: false,
            time_limit: LEVEL_TIME,
        }
    }
}

impl LevelMeta {
    pub fn castle() -> Self {
        Self {
            castle: true,
            time_limit: CASTLE_TIME,
            ..Default::default()
        }
    }
}

/// A level in progress: the tile grid, every live entity, the camera, and
/// the tick's accumulated outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub grid: TileGrid,
    pub enemies: Vec<Enemy>,
    pub items: Vec<Item>,
    pub debris: Vec<Debris>,
    /// Horizontal scroll, monotonically non-decreasing while the player
    /// lives, clamped to the level bounds
    pub camera: f32,
    /// Remaining time, fractional
    pub time: f32,
    pub width_px: f32,
    pub underground: bool,
    pub underwater: bool,
    pub castle: bool,
    /// Absent means win detection is permanently inactive for this level
    pub flagpole_x: Option<f32>,
    pub castle_x: Option<f32>,
    pub flag_descent: f32,
    score_delta: u32,
    coin_delta: u32,
    #[serde(skip)]
    events: Vec<Event>,
}

impl Level {
    /// Build a level from rows of cell codes. Unrecognized codes are empty
    /// space, never an error. The playable width derives from the first row;
    /// longer rows below it still collide but sit past the camera clamp.
    pub fn from_ascii<S: AsRef<str>>(rows: &[S], meta: LevelMeta) -> Self {
        let width_cells = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        let grid_w = rows
            .iter()
            .map(|r| r.as_ref().chars().count())
            .max()
            .unwrap_or(0) as i32;
        let grid_h = rows.len() as i32;
        let mut grid = TileGrid::new(grid_w, grid_h);
        let mut enemies = Vec::new();
        let mut items = Vec::new();
        let mut flagpole_x = None;
        let mut castle_x = None;
        let mut unknown = 0u32;

        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.as_ref().chars().enumerate() {
                let (col, row) = (col as i32, row as i32);
                let x = (col * TILE) as f32;
                let y = (row * TILE) as f32;
                match ch {
                    ' ' => {}
                    '#' => grid.set(col, row, Tile::new(TileKind::Ground)),
                    'B' => grid.set(col, row, Tile::new(TileKind::Brick)),
                    '?' => grid.set(col, row, Tile::with_contents(TileKind::Question, Contents::Coin)),
                    'M' => grid.set(col, row, Tile::with_contents(TileKind::Question, Contents::Mushroom)),
                    'S' => grid.set(col, row, Tile::with_contents(TileKind::Question, Contents::Star)),
                    '1' => grid.set(col, row, Tile::with_contents(TileKind::Brick, Contents::OneUp)),
                    'C' => grid.set(col, row, Tile::with_contents(TileKind::Brick, Contents::MultiCoin)),
                    'H' => grid.set(col, row, Tile::new(TileKind::Hard)),
                    '[' => grid.set(col, row, Tile::new(TileKind::PipeTopLeft)),
                    ']' => grid.set(col, row, Tile::new(TileKind::PipeTopRight)),
                    '{' => grid.set(col, row, Tile::new(TileKind::PipeLeft)),
                    '}' => grid.set(col, row, Tile::new(TileKind::PipeRight)),
                    'o' => items.push(Item::placed_coin(Vec2::new(x, y))),
                    'g' => enemies.push(Enemy::walker(Vec2::new(x, y))),
                    'k' => enemies.push(Enemy::shelled(Vec2::new(x, y), false, false)),
                    'r' => enemies.push(Enemy::shelled(Vec2::new(x, y), true, false)),
                    'w' => enemies.push(Enemy::shelled(Vec2::new(x, y), false, true)),
                    'p' => enemies.push(Enemy::plant(Vec2::new(x, y - 8.0))),
                    'P' => {
                        flagpole_x = Some(x);
                        grid.set(col, row, Tile::new(TileKind::Flag));
                    }
                    'K' => {
                        castle_x = Some(x);
                        grid.set(col, row, Tile::new(TileKind::CastleEnd));
                    }
                    _ => unknown += 1,
                }
            }
        }
        if unknown > 0 {
            log::warn!("{unknown} unrecognized level cells treated as empty space");
        }
        log::info!(
            "level loaded: {grid_w}x{grid_h} cells, {} enemies, {} items",
            enemies.len(),
            items.len()
        );

        Self {
            grid,
            enemies,
            items,
            debris: Vec::new(),
            camera: 0.0,
            time: meta.time_limit,
            width_px: (width_cells as i32 * TILE) as f32,
            underground: meta.underground,
            underwater: meta.underwater,
            castle: meta.castle,
            flagpole_x,
            castle_x,
            flag_descent: 0.0,
            score_delta: 0,
            coin_delta: 0,
            events: Vec::new(),
        }
    }

    /// Advance the whole simulation by one tick.
    pub fn tick(&mut self, player: &mut Player, input: &InputState) {
        let mut events = std::mem::take(&mut self.events);

        // Player control, physics, and tile resolution; the protocol runs on
        // whatever undersides were struck, after the scan
        let bumped = player.update(input, &self.grid, self.camera, &mut events);
        for (col, row) in bumped {
            self.apply_bump(col, row, player.big, &mut events);
        }

        self.grid.decay_bumps();

        // Enemies, sequentially: earlier outcomes (a stomp bounce, a damage
        // lock) are visible to later enemies in the same tick
        for i in 0..self.enemies.len() {
            let grid = &self.grid;
            self.enemies[i].update(grid);
            let enemy = &mut self.enemies[i];
            if !enemy.alive || player.dead {
                continue;
            }
            if !player.rect().overlaps(&enemy.rect()) {
                continue;
            }
            if player.star_power > 0 {
                enemy.alive = false;
                self.score_delta += SCORE_ENEMY;
                events.push(Event::Kick);
            } else if enemy.is_hazard() {
                if enemy.hazard_active() {
                    player.hurt(&mut events);
                }
            } else if enemy.is_squashed() {
                // Already beaten; inert until it expires
            } else if player.vel.y > 0.0
                && player.rect().bottom() < enemy.rect().center_y() + 4
            {
                let ev = enemy.stomp();
                events.push(ev);
                player.vel.y = STOMP_BOUNCE;
                self.score_delta += SCORE_ENEMY;
            } else if enemy.shell_idle() {
                let dir = if player.pos.x < enemy.pos.x { 1.0 } else { -1.0 };
                enemy.kick(dir);
                events.push(Event::Kick);
                self.score_delta += SCORE_ENEMY;
            } else {
                player.hurt(&mut events);
            }
        }
        self.enemies.retain(|e| e.alive);

        // Items
        for i in 0..self.items.len() {
            let grid = &self.grid;
            self.items[i].update(grid);
            let item = &self.items[i];
            if !item.alive || player.dead || item.is_block_coin() {
                continue;
            }
            if player.rect().overlaps(&item.rect()) {
                let kind = item.kind;
                player.apply_pickup(kind, &mut events);
                self.score_delta += SCORE_ITEM;
                self.items[i].alive = false;
            }
        }
        self.items.retain(|i| i.alive);

        for d in &mut self.debris {
            d.update();
        }
        self.debris.retain(|d| d.alive);

        // Camera chases the player with a fixed lookahead and never retreats
        if !player.dead {
            let target = player.pos.x - (VIEW_W / 3.0).floor();
            self.camera = self.camera.max(target.min(self.width_px - VIEW_W));
            self.camera = self.camera.max(0.0);
        }

        // Player projectiles: advance, then each destroys the first
        // non-hazard enemy it touches
        for fb in player.fireballs.iter_mut() {
            fb.update(&self.grid, self.width_px);
        }
        for fb in player.fireballs.iter_mut() {
            if !fb.alive {
                continue;
            }
            for enemy in self.enemies.iter_mut() {
                if enemy.alive && !enemy.is_hazard() && fb.rect().overlaps(&enemy.rect()) {
                    enemy.alive = false;
                    fb.alive = false;
                    self.score_delta += SCORE_ENEMY;
                    events.push(Event::Kick);
                    break;
                }
            }
        }
        player.fireballs.retain(|f| f.alive);
        self.enemies.retain(|e| e.alive);

        if !player.dead && !player.win {
            if let Some(fx) = self.flagpole_x {
                if player.pos.x >= fx - 8.0 {
                    player.win = true;
                    events.push(Event::Flagpole);
                    events.push(Event::LevelComplete);
                }
            }
            if !player.win && self.castle {
                if let Some(cx) = self.castle_x {
                    if player.pos.x >= cx - 8.0 {
                        player.win = true;
                        events.push(Event::CastleComplete);
                    }
                }
            }
        }

        self.events = events;
    }

    fn apply_bump(&mut self, col: i32, row: i32, player_big: bool, events: &mut Vec<Event>) {
        let fx = match self.grid.get_mut(col, row) {
            Some(tile) => tile::bump(tile, col, row, player_big),
            None => return,
        };
        self.items.extend(fx.items);
        self.debris.extend(fx.debris);
        self.coin_delta += fx.coins;
        events.extend(fx.events);
    }

    /// Advance the flag during the win sequence.
    pub fn lower_flag(&mut self) {
        if self.flagpole_x.is_some() {
            self.flag_descent = (self.flag_descent + FLAG_DESCENT_SPEED).min(FLAG_MAX_DESCENT);
        }
    }

    /// Take this tick's score delta.
    pub fn drain_score(&mut self) -> u32 {
        std::mem::take(&mut self.score_delta)
    }

    /// Take this tick's coin delta.
    pub fn drain_coins(&mut self) -> u32 {
        std::mem::take(&mut self.coin_delta)
    }

    /// Take this tick's event tags.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::{EnemyKind, ShellState};
    use crate::sim::item::ItemKind;

    const FLAT: &[&str] = &[
        "                                        ",
        "                                        ",
        "                                        ",
        "                                        ",
        "                                        ",
        "                                        ",
        "                                        ",
        "                                        ",
        "                                        ",
        "                                        ",
        "                                        ",
        "                                        ",
        "########################################",
        "########################################",
    ];

    fn flat_level() -> Level {
        Level::from_ascii(FLAT, LevelMeta::default())
    }

    fn grounded_player(level: &mut Level, x: f32) -> Player {
        // Floor top is row 12 -> y = 192; small player stands at 176
        let mut p = Player::new(Vec2::new(x, 176.0));
        let idle = InputState::default();
        for _ in 0..10 {
            level.tick(&mut p, &idle);
            if p.on_ground {
                break;
            }
        }
        assert!(p.on_ground);
        p
    }

    #[test]
    fn test_parse_tolerates_unknown_codes() {
        let level = Level::from_ascii(&["@X*x!", "#####"], LevelMeta::default());
        for col in 0..5 {
            assert_eq!(level.grid.get(col, 0).unwrap().kind, TileKind::Empty);
            assert_eq!(level.grid.get(col, 1).unwrap().kind, TileKind::Ground);
        }
    }

    #[test]
    fn test_parse_spawns() {
        let level = Level::from_ascii(
            &["?M1C", "g k p", "#####", "  P K"],
            LevelMeta::default(),
        );
        assert_eq!(level.grid.get(0, 0).unwrap().contents, Contents::Coin);
        assert_eq!(level.grid.get(1, 0).unwrap().contents, Contents::Mushroom);
        assert_eq!(level.grid.get(2, 0).unwrap().kind, TileKind::Brick);
        assert_eq!(level.grid.get(3, 0).unwrap().coin_count, MULTI_COIN_CHARGES);
        assert_eq!(level.enemies.len(), 3);
        assert_eq!(level.flagpole_x, Some(32.0));
        assert_eq!(level.castle_x, Some(64.0));
        // Plant spawns half a tile above its cell
        assert_eq!(level.enemies[2].pos.y, 16.0 - 8.0);
    }

    #[test]
    fn test_missing_flagpole_disables_win() {
        let mut level = flat_level();
        assert!(level.flagpole_x.is_none());
        let mut p = grounded_player(&mut level, 600.0);
        let idle = InputState::default();
        for _ in 0..30 {
            level.tick(&mut p, &idle);
        }
        assert!(!p.win);
    }

    #[test]
    fn test_flagpole_win_freezes_player() {
        let mut rows: Vec<String> = FLAT.iter().map(|r| r.to_string()).collect();
        rows[8].replace_range(30..31, "P");
        let mut level = Level::from_ascii(&rows, LevelMeta::default());
        let mut p = grounded_player(&mut level, 32.0);
        p.pos.x = 30.0 * 16.0 - 4.0;
        let idle = InputState::default();
        level.tick(&mut p, &idle);
        assert!(p.win);
        let events = level.drain_events();
        assert!(events.contains(&Event::Flagpole));
        assert!(events.contains(&Event::LevelComplete));
    }

    #[test]
    fn test_stomp_outcome() {
        let mut level = flat_level();
        let mut p = Player::new(Vec2::new(100.0, 140.0));
        level.enemies.push(Enemy::walker(Vec2::new(100.0, 176.0)));
        let idle = InputState::default();
        let mut stomped = false;
        for _ in 0..60 {
            level.tick(&mut p, &idle);
            if level.drain_events().contains(&Event::Stomp) {
                stomped = true;
                break;
            }
        }
        assert!(stomped, "falling onto a walker stomps it");
        assert_eq!(p.vel.y, STOMP_BOUNCE);
        assert!(level.enemies[0].is_squashed());
        assert_eq!(level.drain_score(), SCORE_ENEMY);
    }

    #[test]
    fn test_stomp_scores_and_enemy_expires() {
        let mut level = flat_level();
        let mut p = Player::new(Vec2::new(100.0, 140.0));
        level.enemies.push(Enemy::walker(Vec2::new(100.0, 176.0)));
        let idle = InputState::default();
        let mut score = 0;
        for _ in 0..120 {
            level.tick(&mut p, &idle);
            score += level.drain_score();
        }
        assert_eq!(score, SCORE_ENEMY);
        assert!(level.enemies.is_empty(), "squashed walker was compacted away");
    }

    #[test]
    fn test_side_contact_hurts_player() {
        let mut level = flat_level();
        let mut p = grounded_player(&mut level, 100.0);
        p.big = true;
        level.enemies.push(Enemy::walker(Vec2::new(120.0, 176.0)));
        let input = InputState {
            right: true,
            ..Default::default()
        };
        for _ in 0..60 {
            level.tick(&mut p, &input);
            if !p.big {
                break;
            }
        }
        assert!(!p.big, "side contact downgraded the player");
        assert!(!p.dead, "one hit never skips a size step");
        assert!(p.invincible > 0);
    }

    #[test]
    fn test_star_power_kills_on_contact() {
        let mut level = flat_level();
        let mut p = grounded_player(&mut level, 100.0);
        p.star_power = STAR_TICKS;
        level.enemies.push(Enemy::walker(Vec2::new(112.0, 176.0)));
        let idle = InputState::default();
        level.tick(&mut p, &idle);
        assert!(level.enemies.is_empty());
        assert!(level.drain_events().contains(&Event::Kick));
        assert_eq!(level.drain_score(), SCORE_ENEMY);
        assert!(!p.dead);
    }

    #[test]
    fn test_idle_shell_side_kick() {
        let mut level = flat_level();
        let mut p = grounded_player(&mut level, 100.0);
        let mut shell = Enemy::shelled(Vec2::new(112.0, 168.0), false, false);
        shell.stomp();
        level.enemies.push(shell);
        let idle = InputState::default();
        level.tick(&mut p, &idle);
        assert!(matches!(
            level.enemies[0].kind,
            EnemyKind::Shelled {
                shell: ShellState::Moving,
                ..
            }
        ));
        assert_eq!(level.enemies[0].facing, 1.0, "kicked away from the player");
        assert!(level.drain_events().contains(&Event::Kick));
    }

    #[test]
    fn test_bump_spawns_item_and_credits_coin() {
        let mut rows: Vec<String> = FLAT.iter().map(|r| r.to_string()).collect();
        // Question block three tiles above the floor, over the player
        rows[9].replace_range(6..7, "?");
        let mut level = Level::from_ascii(&rows, LevelMeta::default());
        let mut p = grounded_player(&mut level, 96.0);
        let jump = InputState {
            jump: true,
            ..Default::default()
        };
        let mut coins = 0;
        let mut saw_coin_event = false;
        for _ in 0..60 {
            level.tick(&mut p, &jump);
            coins += level.drain_coins();
            if level.drain_events().contains(&Event::Coin) {
                saw_coin_event = true;
            }
        }
        assert_eq!(coins, 1);
        assert!(saw_coin_event);
        assert!(level.grid.get(6, 9).unwrap().used);
        assert_eq!(level.grid.get(6, 9).unwrap().kind, TileKind::Question);
    }

    #[test]
    fn test_pickup_applies_and_scores() {
        let mut level = flat_level();
        let mut p = grounded_player(&mut level, 100.0);
        let mut item = Item::mushroom(Vec2::new(104.0, 176.0), false);
        item.emerging = false;
        level.items.push(item);
        let idle = InputState::default();
        level.tick(&mut p, &idle);
        assert!(p.big);
        assert_eq!(level.drain_score(), SCORE_ITEM);
        assert!(level.items.is_empty());
    }

    #[test]
    fn test_block_coins_are_not_collectible() {
        let mut level = flat_level();
        let mut p = grounded_player(&mut level, 100.0);
        level.items.push(Item::block_coin(Vec2::new(100.0, 170.0)));
        let idle = InputState::default();
        level.tick(&mut p, &idle);
        assert_eq!(level.drain_score(), 0);
        assert!(!level.items.is_empty());
    }

    #[test]
    fn test_camera_follows_and_never_retreats() {
        let mut level = flat_level();
        let mut p = grounded_player(&mut level, 32.0);
        let right = InputState {
            right: true,
            run: true,
            ..Default::default()
        };
        let left = InputState {
            left: true,
            ..Default::default()
        };
        let mut prev = level.camera;
        for _ in 0..400 {
            level.tick(&mut p, &right);
            assert!(level.camera >= prev);
            assert!(level.camera >= 0.0);
            assert!(level.camera <= level.width_px - VIEW_W);
            prev = level.camera;
        }
        assert!(level.camera > 0.0);
        for _ in 0..120 {
            level.tick(&mut p, &left);
            assert!(level.camera >= prev, "camera never scrolls back");
            prev = level.camera;
        }
    }

    #[test]
    fn test_fireball_destroys_first_enemy_only() {
        let mut level = flat_level();
        let mut p = grounded_player(&mut level, 32.0);
        p.big = true;
        p.fire = true;
        level.enemies.push(Enemy::walker(Vec2::new(80.0, 176.0)));
        level.enemies.push(Enemy::walker(Vec2::new(300.0, 176.0)));
        let fire = InputState {
            run: true,
            ..Default::default()
        };
        level.tick(&mut p, &fire);
        assert_eq!(p.fireballs.len(), 1);
        let idle = InputState::default();
        let mut kicked = false;
        for _ in 0..30 {
            level.tick(&mut p, &idle);
            if level.drain_events().contains(&Event::Kick) {
                kicked = true;
                break;
            }
        }
        assert!(kicked);
        assert_eq!(level.enemies.len(), 1, "one projectile, one enemy");
        assert!(p.fireballs.is_empty(), "the projectile died with the hit");
    }

    #[test]
    fn test_fireball_ignores_hazard_plant() {
        let mut level = flat_level();
        let mut p = grounded_player(&mut level, 32.0);
        let mut plant = Enemy::plant(Vec2::new(96.0, 168.0));
        // Force it fully extended
        if let EnemyKind::Plant { extension, .. } = &mut plant.kind {
            *extension = PLANT_MAX_EXTENSION;
        }
        level.enemies.push(plant);
        p.fireballs.push(crate::sim::Fireball::new(Vec2::new(80.0, 148.0), 1.0));
        let idle = InputState::default();
        level.tick(&mut p, &idle);
        assert_eq!(level.enemies.len(), 1, "plants shrug off projectiles");
    }

    #[test]
    fn test_hidden_plant_is_harmless() {
        let mut level = flat_level();
        let mut p = grounded_player(&mut level, 100.0);
        // Hidden plant overlapping the player's feet
        level.enemies.push(Enemy::plant(Vec2::new(100.0, 176.0)));
        let idle = InputState::default();
        level.tick(&mut p, &idle);
        assert!(!p.dead);
        assert_eq!(p.invincible, 0, "no contact damage while fully retracted");
    }

    #[test]
    fn test_brick_break_emits_debris() {
        let mut rows: Vec<String> = FLAT.iter().map(|r| r.to_string()).collect();
        rows[9].replace_range(6..7, "B");
        let mut level = Level::from_ascii(&rows, LevelMeta::default());
        let mut p = grounded_player(&mut level, 96.0);
        p.big = true;
        // One idle tick so the taller box settles onto the floor
        level.tick(&mut p, &InputState::default());
        let jump = InputState {
            jump: true,
            ..Default::default()
        };
        let mut broke = false;
        for _ in 0..60 {
            level.tick(&mut p, &jump);
            if level.drain_events().contains(&Event::Break) {
                broke = true;
                break;
            }
        }
        assert!(broke);
        assert_eq!(level.grid.get(6, 9).unwrap().kind, TileKind::Empty);
        assert_eq!(level.debris.len(), 4);
    }

    #[test]
    fn test_state_round_trips_through_serde() {
        let mut level = flat_level();
        level.enemies.push(Enemy::walker(Vec2::new(100.0, 176.0)));
        let mut p = grounded_player(&mut level, 32.0);
        let input = InputState {
            right: true,
            ..Default::default()
        };
        for _ in 0..30 {
            level.tick(&mut p, &input);
        }
        let json = serde_json::to_string(&level).unwrap();
        let restored: Level = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.camera, level.camera);
        assert_eq!(restored.enemies.len(), level.enemies.len());
        assert_eq!(restored.grid.width(), level.grid.width());
    }

    #[test]
    fn test_item_kind_is_plain_data() {
        // The pickup switch is a tagged enum, stable across serialization
        let kind = ItemKind::Mushroom { one_up: true };
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(serde_json::from_str::<ItemKind>(&json).unwrap(), kind);
    }
}
