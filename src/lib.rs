//! Tilerunner - a deterministic side-scrolling platformer simulation kernel
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, tile collision, entity state machines)
//! - `session`: Lives/score/retry flow wrapping the kernel, owns the music slot
//!
//! The kernel consumes a per-tick input snapshot and a parsed level grid, and
//! produces updated state plus a queue of discrete event tags for the
//! presentation layer (sound effects, music switches, scoring). It performs
//! no rendering, audio, or I/O of its own.

pub mod session;
pub mod sim;

pub use session::{Session, SessionDirective, SessionPhase};
pub use sim::{Event, InputState, Level, LevelMeta, MusicTrack, Player};

/// Simulation constants, in pixels per tick (velocities) and pixels per
/// tick squared (accelerations), at the fixed 60 Hz step.
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_HZ: u32 = 60;
    /// Tile edge length in pixels
    pub const TILE: i32 = 16;
    /// Viewport width in pixels
    pub const VIEW_W: f32 = 256.0;
    /// Viewport height in pixels
    pub const VIEW_H: f32 = 240.0;

    /// Horizontal acceleration while walking
    pub const WALK_ACCEL: f32 = 0.046875;
    /// Horizontal acceleration while running
    pub const RUN_ACCEL: f32 = 0.0703125;
    /// Deceleration when no direction is held
    pub const RELEASE_DECEL: f32 = 0.046875;
    /// Deceleration when holding against the direction of travel
    pub const SKID_DECEL: f32 = 0.15625;
    /// Walking speed cap
    pub const WALK_MAX: f32 = 1.3125;
    /// Running speed cap
    pub const RUN_MAX: f32 = 2.0625;

    /// Default downward acceleration
    pub const GRAVITY: f32 = 0.1875;
    /// Reduced gravity while ascending with jump held
    pub const GRAVITY_HOLDING: f32 = 0.09375;
    /// Increased gravity while ascending after an early jump release
    pub const GRAVITY_FAST: f32 = 0.25;
    /// Terminal fall speed
    pub const MAX_FALL: f32 = 4.0;

    /// Initial jump velocity, indexed by horizontal speed tier
    /// (|vx| < 1, |vx| < 2, faster)
    pub const JUMP_VEL: [f32; 3] = [-4.0, -4.0, -5.0];
    /// Ticks the jump button can extend the reduced-gravity window
    pub const JUMP_HOLD_TICKS: u32 = 24;
    /// Upward bounce applied to the player after a stomp
    pub const STOMP_BOUNCE: f32 = -4.0;

    /// Walking speed of ground and shelled enemies
    pub const WALKER_SPEED: f32 = 0.5;
    /// Speed of a kicked shell
    pub const SHELL_SPEED: f32 = 3.0;
    /// Ticks a squashed walker lingers before removal
    pub const SQUASH_TICKS: u32 = 30;
    /// Ticks an idle shell waits before reverting to walking
    pub const SHELL_IDLE_TICKS: u32 = 180;

    /// Ticks a hazard plant stays hidden between cycles
    pub const PLANT_HIDE_TICKS: u32 = 60;
    /// Ticks a hazard plant stays fully extended
    pub const PLANT_WAIT_TICKS: u32 = 90;
    /// Extension/retraction speed of a hazard plant
    pub const PLANT_MOVE_SPEED: f32 = 0.5;
    /// Full extension height of a hazard plant
    pub const PLANT_MAX_EXTENSION: f32 = 24.0;

    /// Horizontal speed of a fired projectile
    pub const FIREBALL_SPEED: f32 = 4.0;
    /// Terminal fall speed of a projectile
    pub const FIREBALL_MAX_FALL: f32 = 3.0;
    /// Upward velocity of a projectile's floor bounce
    pub const FIREBALL_BOUNCE: f32 = -3.0;
    /// Maximum simultaneously live projectiles per player
    pub const MAX_FIREBALLS: usize = 2;

    /// Horizontal roll speed of a mushroom pickup
    pub const MUSHROOM_SPEED: f32 = 1.0;
    /// Horizontal roll speed of a star pickup
    pub const STAR_SPEED: f32 = 1.5;
    /// Upward velocity of a star's floor rebound
    pub const STAR_BOUNCE: f32 = -5.0;
    /// Rise speed of an emerging pickup
    pub const EMERGE_SPEED: f32 = 0.5;
    /// Total rise distance of an emerging pickup
    pub const EMERGE_DISTANCE: f32 = 16.0;

    /// Lifetime of a coin popped out of a block
    pub const BLOCK_COIN_TICKS: u32 = 30;
    /// Launch velocity of a coin popped out of a block
    pub const BLOCK_COIN_LAUNCH: f32 = -6.0;
    /// Gravity applied to a launched block coin
    pub const BLOCK_COIN_GRAVITY: f32 = 0.3;
    /// Gravity applied to brick debris
    pub const DEBRIS_GRAVITY: f32 = 0.25;
    /// Coin charges in a multi-coin brick
    pub const MULTI_COIN_CHARGES: u8 = 10;
    /// Tile rise at the start of a bump animation
    pub const BUMP_OFFSET: u8 = 4;

    /// Post-damage invulnerability window
    pub const INVULN_TICKS: u32 = 120;
    /// Star power duration
    pub const STAR_TICKS: u32 = 600;
    /// Control lock while growing
    pub const GROW_TICKS: u32 = 45;
    /// Control lock while shrinking
    pub const SHRINK_TICKS: u32 = 45;
    /// Control freeze at the start of the death sequence
    pub const DEATH_FREEZE_TICKS: u32 = 30;
    /// Upward launch applied when the death sequence starts
    pub const DEATH_LAUNCH: f32 = -8.0;
    /// Gravity during the death fall
    pub const DEATH_GRAVITY: f32 = 0.3;
    /// Terminal speed of the death fall
    pub const DEATH_MAX_FALL: f32 = 8.0;

    /// Coins required for an extra life
    pub const COINS_PER_LIFE: u32 = 100;
    /// Remaining time at which the hurry warning fires
    pub const TIME_WARNING: f32 = 100.0;
    /// Time budget for a regular level
    pub const LEVEL_TIME: f32 = 400.0;
    /// Time budget for a castle level
    pub const CASTLE_TIME: f32 = 300.0;
    /// Flag descent per tick during the win sequence
    pub const FLAG_DESCENT_SPEED: f32 = 2.0;
    /// Total flag descent
    pub const FLAG_MAX_DESCENT: f32 = 128.0;

    /// Points for a stomp, shell kick, star kill, or projectile kill
    pub const SCORE_ENEMY: u32 = 100;
    /// Points for collecting any item
    pub const SCORE_ITEM: u32 = 1000;
    /// Points per drained time unit during the win countdown
    pub const SCORE_TIME_BONUS: u32 = 100;
}
