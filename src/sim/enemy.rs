//! Enemy behavior state machines
//!
//! Three families share one entity shell: ground walkers (walk, reverse at
//! walls, fall off ledges), shelled walkers (walk / idle shell / moving
//! shell, with ledge-aware and flying variants), and hazard plants (a cyclic
//! extend/retract machine bolted to a pipe). All of them reuse the same
//! integrator and tile window scan as every other moving entity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{lands_on, overlaps_tile, tile_rect, Rect};
use super::events::Event;
use super::tile::TileGrid;
use crate::consts::*;

/// Shell machine of a shelled walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShellState {
    Walking,
    /// Collapsed and stationary; kickable; reverts to walking on a timer
    Idle,
    /// Kicked; slides at shell speed and never re-idles on wall contact
    Moving,
}

/// Vertical cycle of a hazard plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlantPhase {
    Hidden,
    Rising,
    Waiting,
    Lowering,
}

/// Behavior-specific state, tagged per family.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum EnemyKind {
    Walker {
        /// Nonzero while squashed; the walker is inert and expires at zero
        squash_timer: u32,
    },
    Shelled {
        /// Ledge-aware variant: probes ahead and turns before falling
        dangerous: bool,
        /// Flying variant: bobs on a sine instead of falling, until stomped
        winged: bool,
        shell: ShellState,
        shell_timer: u32,
    },
    Plant {
        base_y: f32,
        phase: PlantPhase,
        timer: u32,
        extension: f32,
    },
}

/// Read-only render state, kind-specific.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyVisual {
    Walker { squashed: bool },
    Shelled { shell: ShellState, dangerous: bool, winged: bool },
    Plant { extension: f32 },
}

const WALKING_HEIGHT: f32 = 24.0;
const SHELL_HEIGHT: f32 = 16.0;

/// A non-player simulation actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub vel: Vec2,
    pub w: f32,
    pub h: f32,
    pub alive: bool,
    pub on_ground: bool,
    /// -1.0 or 1.0
    pub facing: f32,
    pub frame: u32,
    pub kind: EnemyKind,
}

impl Enemy {
    fn base(pos: Vec2, kind: EnemyKind) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            w: 16.0,
            h: 16.0,
            alive: true,
            on_ground: false,
            facing: -1.0,
            frame: 0,
            kind,
        }
    }

    pub fn walker(pos: Vec2) -> Self {
        let mut e = Self::base(pos, EnemyKind::Walker { squash_timer: 0 });
        e.vel.x = -WALKER_SPEED;
        e
    }

    pub fn shelled(pos: Vec2, dangerous: bool, winged: bool) -> Self {
        let mut e = Self::base(
            pos,
            EnemyKind::Shelled {
                dangerous,
                winged,
                shell: ShellState::Walking,
                shell_timer: 0,
            },
        );
        e.h = WALKING_HEIGHT;
        e.vel.x = -WALKER_SPEED;
        e
    }

    pub fn plant(pos: Vec2) -> Self {
        Self::base(
            pos,
            EnemyKind::Plant {
                base_y: pos.y,
                phase: PlantPhase::Hidden,
                timer: 0,
                extension: 0.0,
            },
        )
    }

    pub fn rect(&self) -> Rect {
        Rect::from_entity(self.pos, self.w, self.h)
    }

    /// Hazard plants hurt on contact and shrug off projectiles and stomps.
    pub fn is_hazard(&self) -> bool {
        matches!(self.kind, EnemyKind::Plant { .. })
    }

    /// Contact with a plant only matters while some of it is out of the pipe.
    pub fn hazard_active(&self) -> bool {
        match self.kind {
            EnemyKind::Plant { extension, .. } => extension > 0.0,
            _ => false,
        }
    }

    pub fn is_squashed(&self) -> bool {
        matches!(self.kind, EnemyKind::Walker { squash_timer } if squash_timer > 0)
    }

    pub fn shell_idle(&self) -> bool {
        matches!(
            self.kind,
            EnemyKind::Shelled {
                shell: ShellState::Idle,
                ..
            }
        )
    }

    pub fn visual(&self) -> EnemyVisual {
        match self.kind {
            EnemyKind::Walker { squash_timer } => EnemyVisual::Walker {
                squashed: squash_timer > 0,
            },
            EnemyKind::Shelled {
                dangerous,
                winged,
                shell,
                ..
            } => EnemyVisual::Shelled {
                shell,
                dangerous,
                winged,
            },
            EnemyKind::Plant { extension, .. } => EnemyVisual::Plant { extension },
        }
    }

    pub fn update(&mut self, grid: &TileGrid) {
        match self.kind {
            EnemyKind::Walker { .. } => self.update_walker(grid),
            EnemyKind::Shelled { .. } => self.update_shelled(grid),
            EnemyKind::Plant { .. } => self.update_plant(),
        }
    }

    fn update_walker(&mut self, grid: &TileGrid) {
        if let EnemyKind::Walker { squash_timer } = &mut self.kind {
            if *squash_timer > 0 {
                *squash_timer -= 1;
                if *squash_timer == 0 {
                    self.alive = false;
                }
                return;
            }
        }
        self.frame += 1;
        self.vel.y = (self.vel.y + GRAVITY).min(MAX_FALL);
        self.pos += self.vel;
        self.on_ground = false;
        for (col, row) in grid.nearby_solid(self.pos.x, self.pos.y) {
            let trect = tile_rect(col, row);
            if !overlaps_tile(self.pos, self.w, self.h, &trect) {
                continue;
            }
            if lands_on(trect.y as f32, self.pos.y, self.h, self.vel.y) {
                self.pos.y = trect.y as f32 - self.h;
                self.vel.y = 0.0;
                self.on_ground = true;
            } else if self.vel.x != 0.0 {
                self.vel.x = -self.vel.x;
            }
        }
        if self.pos.y > VIEW_H + 32.0 {
            self.alive = false;
        }
    }

    fn update_shelled(&mut self, grid: &TileGrid) {
        self.frame += 1;
        let EnemyKind::Shelled {
            dangerous,
            winged,
            mut shell,
            mut shell_timer,
        } = self.kind
        else {
            return;
        };

        if shell == ShellState::Idle {
            shell_timer += 1;
            if shell_timer > SHELL_IDLE_TICKS {
                shell = ShellState::Walking;
                shell_timer = 0;
                self.h = WALKING_HEIGHT;
                self.pos.y -= WALKING_HEIGHT - SHELL_HEIGHT;
            }
            self.kind = EnemyKind::Shelled {
                dangerous,
                winged,
                shell,
                shell_timer,
            };
            return;
        }

        match shell {
            ShellState::Moving => self.vel.x = SHELL_SPEED * self.facing,
            ShellState::Walking => self.vel.x = WALKER_SPEED * self.facing,
            ShellState::Idle => {}
        }
        if winged && shell == ShellState::Walking {
            self.vel.y = (self.frame as f32 / 20.0).sin() * 1.5;
        } else {
            self.vel.y = (self.vel.y + GRAVITY).min(MAX_FALL);
        }
        self.pos += self.vel;
        self.on_ground = false;

        for (col, row) in grid.nearby_solid(self.pos.x, self.pos.y) {
            let trect = tile_rect(col, row);
            if !overlaps_tile(self.pos, self.w, self.h, &trect) {
                continue;
            }
            if lands_on(trect.y as f32, self.pos.y, self.h, self.vel.y) {
                self.pos.y = trect.y as f32 - self.h;
                self.vel.y = 0.0;
                self.on_ground = true;
            } else if shell == ShellState::Moving {
                self.facing = -self.facing;
            } else {
                // Reverse, then nudge out of the wall so it does not
                // re-trigger next tick
                self.facing = -self.facing;
                self.pos.x -= self.vel.x;
            }
        }

        // Ledge probe one step ahead at foot level
        if dangerous && shell == ShellState::Walking && self.on_ground {
            let probe_x = self.pos.x + if self.facing > 0.0 { self.w } else { -4.0 };
            if !grid.solid_at_point(probe_x, self.pos.y + self.h + 4.0) {
                self.facing = -self.facing;
            }
        }

        if self.pos.y > VIEW_H + 32.0 {
            self.alive = false;
        }

        self.kind = EnemyKind::Shelled {
            dangerous,
            winged,
            shell,
            shell_timer,
        };
    }

    fn update_plant(&mut self) {
        let EnemyKind::Plant {
            base_y,
            phase,
            timer,
            extension,
        } = &mut self.kind
        else {
            return;
        };
        *timer += 1;
        match *phase {
            PlantPhase::Hidden => {
                if *timer > PLANT_HIDE_TICKS {
                    *phase = PlantPhase::Rising;
                    *timer = 0;
                }
            }
            PlantPhase::Rising => {
                *extension = (*extension + PLANT_MOVE_SPEED).min(PLANT_MAX_EXTENSION);
                if *extension >= PLANT_MAX_EXTENSION {
                    *phase = PlantPhase::Waiting;
                    *timer = 0;
                }
            }
            PlantPhase::Waiting => {
                if *timer > PLANT_WAIT_TICKS {
                    *phase = PlantPhase::Lowering;
                    *timer = 0;
                }
            }
            PlantPhase::Lowering => {
                *extension = (*extension - PLANT_MOVE_SPEED).max(0.0);
                if *extension <= 0.0 {
                    *phase = PlantPhase::Hidden;
                    *timer = 0;
                }
            }
        }
        self.pos.y = *base_y - *extension;
    }

    /// Apply a stomp. Returns the event tag the level should emit.
    pub fn stomp(&mut self) -> Event {
        match &mut self.kind {
            EnemyKind::Walker { squash_timer } => {
                *squash_timer = SQUASH_TICKS;
                Event::Stomp
            }
            EnemyKind::Shelled { winged, shell, .. } => {
                if *shell == ShellState::Idle {
                    *shell = ShellState::Moving;
                    Event::Kick
                } else {
                    if *shell == ShellState::Walking {
                        self.h = SHELL_HEIGHT;
                        self.pos.y += WALKING_HEIGHT - SHELL_HEIGHT;
                    }
                    *shell = ShellState::Idle;
                    *winged = false;
                    Event::Stomp
                }
            }
            // Plants cannot be stomped; the level never routes one here
            EnemyKind::Plant { .. } => Event::Stomp,
        }
    }

    /// Side-kick an idle shell into motion.
    pub fn kick(&mut self, direction: f32) {
        if let EnemyKind::Shelled { shell, .. } = &mut self.kind {
            self.facing = direction;
            *shell = ShellState::Moving;
        }
    }
}
