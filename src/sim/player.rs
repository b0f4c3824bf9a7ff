//! Input-driven player controller
//!
//! A size/power state machine layered over the shared integrator. Transient
//! locks (growing, shrinking, dead, win) suspend normal control outright;
//! at most one drives the suspension on any tick, in that priority order.
//!
//! Horizontal control is asymmetric: accelerating toward the held direction
//! uses walk or run acceleration against the matching cap, holding against
//! the direction of travel applies the sharper skid deceleration, and
//! releasing decays toward zero. Jump strength scales with horizontal speed
//! through a three-tier launch table, and holding the button stretches the
//! reduced-gravity window for up to a fixed number of ticks.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{tile_rect, Rect};
use super::events::Event;
use super::item::ItemKind;
use super::level::InputState;
use super::projectile::Fireball;
use super::tile::TileGrid;
use crate::consts::*;

const PLAYER_WIDTH: f32 = 14.0;
const SMALL_HEIGHT: f32 = 16.0;
const BIG_HEIGHT: f32 = 32.0;

/// Read-only render state for the presentation layer.
#[derive(Debug, Clone, Copy)]
pub struct PlayerVisual {
    /// Blink phase says skip drawing this tick
    pub hidden: bool,
    pub big: bool,
    pub fire: bool,
    pub ducking: bool,
    pub facing: f32,
    pub frame: u32,
    pub starring: bool,
    pub dead: bool,
    pub win: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub big: bool,
    /// Fire capability, independent of size once big
    pub fire: bool,
    pub star_power: u32,
    pub invincible: u32,
    pub grow_timer: u32,
    pub shrink_timer: u32,
    pub facing: f32,
    pub on_ground: bool,
    jumping: bool,
    jump_held: bool,
    jump_timer: u32,
    pub ducking: bool,
    pub dead: bool,
    pub death_timer: u32,
    pub win: bool,
    pub win_timer: u32,
    pub frame: u32,
    anim_timer: u32,
    pub fireballs: Vec<Fireball>,
    fire_latch: bool,
    /// Current bounding-box height, tracked for collision snapping
    h: f32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            big: false,
            fire: false,
            star_power: 0,
            invincible: 0,
            grow_timer: 0,
            shrink_timer: 0,
            facing: 1.0,
            on_ground: false,
            jumping: false,
            jump_held: false,
            jump_timer: 0,
            ducking: false,
            dead: false,
            death_timer: 0,
            win: false,
            win_timer: 0,
            frame: 0,
            anim_timer: 0,
            fireballs: Vec::new(),
            fire_latch: false,
            h: SMALL_HEIGHT,
        }
    }

    /// Bounding box: 16 tall when small or ducking, 32 when big. A ducking
    /// big player keeps the lower half of the tall frame.
    pub fn rect(&self) -> Rect {
        let h = if !self.big || self.ducking {
            SMALL_HEIGHT as i32
        } else {
            BIG_HEIGHT as i32
        };
        let y_off = if self.big { BIG_HEIGHT as i32 - h } else { 0 };
        Rect::new(
            self.pos.x as i32 + 1,
            self.pos.y as i32 + y_off,
            PLAYER_WIDTH as i32,
            h,
        )
    }

    /// Advance one tick. Returns the grid cells whose undersides the player
    /// struck; the level runs the tile interaction protocol on them.
    pub fn update(
        &mut self,
        input: &InputState,
        grid: &TileGrid,
        camera: f32,
        events: &mut Vec<Event>,
    ) -> Vec<(i32, i32)> {
        let mut bumped = Vec::new();

        if self.dead {
            self.death_timer += 1;
            if self.death_timer < DEATH_FREEZE_TICKS {
                return bumped;
            }
            self.vel.y = (self.vel.y + DEATH_GRAVITY).min(DEATH_MAX_FALL);
            self.pos.y += self.vel.y;
            return bumped;
        }
        if self.win {
            self.win_timer += 1;
            return bumped;
        }
        if self.grow_timer > 0 {
            self.grow_timer -= 1;
            return bumped;
        }
        if self.shrink_timer > 0 {
            self.shrink_timer -= 1;
            return bumped;
        }
        self.invincible = self.invincible.saturating_sub(1);
        self.star_power = self.star_power.saturating_sub(1);
        self.anim_timer += 1;

        self.ducking = input.duck && self.big && self.on_ground;
        let (accel, max_speed) = if input.run {
            (RUN_ACCEL, RUN_MAX)
        } else {
            (WALK_ACCEL, WALK_MAX)
        };

        if input.right && !self.ducking {
            self.facing = 1.0;
            if self.vel.x < 0.0 {
                self.vel.x = (self.vel.x + SKID_DECEL).min(0.0);
            } else {
                self.vel.x = (self.vel.x + accel).min(max_speed);
            }
        } else if input.left && !self.ducking {
            self.facing = -1.0;
            if self.vel.x > 0.0 {
                self.vel.x = (self.vel.x - SKID_DECEL).max(0.0);
            } else {
                self.vel.x = (self.vel.x - accel).max(-max_speed);
            }
        } else if self.vel.x > 0.0 {
            self.vel.x = (self.vel.x - RELEASE_DECEL).max(0.0);
        } else if self.vel.x < 0.0 {
            self.vel.x = (self.vel.x + RELEASE_DECEL).min(0.0);
        }

        if input.jump && self.on_ground && !self.jumping {
            self.jumping = true;
            self.jump_held = true;
            self.jump_timer = 0;
            let speed = self.vel.x.abs();
            self.vel.y = if speed < 1.0 {
                JUMP_VEL[0]
            } else if speed < 2.0 {
                JUMP_VEL[1]
            } else {
                JUMP_VEL[2]
            };
            events.push(if self.big { Event::JumpBig } else { Event::Jump });
        }
        if !input.jump {
            self.jump_held = false;
        }

        let gravity = if self.jumping && self.jump_held && self.jump_timer < JUMP_HOLD_TICKS {
            self.jump_timer += 1;
            GRAVITY_HOLDING
        } else if self.vel.y < 0.0 && !self.jump_held {
            GRAVITY_FAST
        } else {
            GRAVITY
        };
        self.vel.y = (self.vel.y + gravity).min(MAX_FALL);

        self.pos += self.vel;

        if !self.on_ground {
            self.frame = 2;
        } else if self.vel.x.abs() > 0.5 {
            if self.anim_timer % 8 == 0 {
                self.frame = (self.frame + 1) % 3;
            }
        } else {
            self.frame = 0;
        }

        self.on_ground = false;
        self.h = if !self.big || self.ducking {
            SMALL_HEIGHT
        } else {
            BIG_HEIGHT
        };

        for (col, row) in grid.nearby_solid(self.pos.x, self.pos.y) {
            let trect = tile_rect(col, row);
            let rect = self.rect();
            if !rect.overlaps(&trect) {
                continue;
            }
            // Axis pick by center deltas; ties resolve vertically
            let dx = rect.center_x() - trect.center_x();
            let dy = rect.center_y() - trect.center_y();
            if dx.abs() > dy.abs() {
                if self.vel.x > 0.0 {
                    self.pos.x = trect.x as f32 - PLAYER_WIDTH - 1.0;
                } else if self.vel.x < 0.0 {
                    self.pos.x = trect.right() as f32 - 1.0;
                }
                self.vel.x = 0.0;
            } else if self.vel.y > 0.0 {
                self.pos.y = trect.y as f32 - self.h;
                self.vel.y = 0.0;
                self.on_ground = true;
                self.jumping = false;
            } else if self.vel.y < 0.0 {
                self.pos.y = trect.bottom() as f32;
                self.vel.y = 0.0;
                bumped.push((col, row));
            }
        }

        if self.pos.x < 0.0 {
            self.pos.x = 0.0;
            self.vel.x = 0.0;
        }
        // The camera never retreats, so neither can the player
        if self.pos.x < camera - 8.0 {
            self.pos.x = camera - 8.0;
        }
        if self.pos.y > VIEW_H + 16.0 {
            self.die(events);
        }

        let fire_edge = input.run && !self.fire_latch;
        self.fire_latch = input.run;
        if fire_edge && self.fire && !self.ducking && self.fireballs.len() < MAX_FIREBALLS {
            let spawn = Vec2::new(
                self.pos.x + if self.facing > 0.0 { 12.0 } else { -4.0 },
                self.rect().y as f32 + 8.0,
            );
            self.fireballs.push(Fireball::new(spawn, self.facing));
            events.push(Event::Fireball);
        }

        bumped
    }

    /// Begin the death sequence: freeze, then launch upward and fall
    /// forever. The session watches for the fall below the viewport.
    pub fn die(&mut self, events: &mut Vec<Event>) {
        if !self.dead {
            self.dead = true;
            self.death_timer = 0;
            self.vel.y = DEATH_LAUNCH;
            events.push(Event::Die);
        }
    }

    /// Take contact damage: one size step down, or death when small.
    /// Ignored outright while invulnerable or star-powered.
    pub fn hurt(&mut self, events: &mut Vec<Event>) {
        if self.invincible > 0 || self.star_power > 0 {
            return;
        }
        if self.fire {
            self.fire = false;
            self.invincible = INVULN_TICKS;
            self.shrink_timer = SHRINK_TICKS;
        } else if self.big {
            self.big = false;
            self.invincible = INVULN_TICKS;
            self.shrink_timer = SHRINK_TICKS;
        } else {
            self.die(events);
        }
    }

    /// Apply a collected pickup's effect.
    pub fn apply_pickup(&mut self, kind: ItemKind, events: &mut Vec<Event>) {
        match kind {
            ItemKind::Mushroom { one_up: true } => {
                events.push(Event::OneUp);
            }
            ItemKind::Mushroom { one_up: false } => {
                if !self.big {
                    self.big = true;
                    self.grow_timer = GROW_TICKS;
                    events.push(Event::PowerUp);
                }
            }
            ItemKind::Flower => {
                self.big = true;
                self.fire = true;
                self.grow_timer = GROW_TICKS;
                events.push(Event::PowerUp);
            }
            ItemKind::Star => {
                self.star_power = STAR_TICKS;
                events.push(Event::PowerUp);
            }
            ItemKind::Coin { .. } => {}
        }
    }

    pub fn visual(&self) -> PlayerVisual {
        let lock_blink = self.grow_timer + self.shrink_timer;
        let hidden = (self.dead && self.death_timer < DEATH_FREEZE_TICKS)
            || (self.invincible > 0 && (self.invincible / 4) % 2 == 0)
            || (lock_blink > 0 && (lock_blink / 4) % 2 == 0);
        PlayerVisual {
            hidden,
            big: self.big,
            fire: self.fire,
            ducking: self.ducking,
            facing: self.facing,
            frame: self.frame,
            starring: self.star_power > 0,
            dead: self.dead,
            win: self.win,
        }
    }
}
