//! Game session: the canonical consumer of the simulation kernel
//!
//! Owns everything that outlives a single level attempt: lives, total score,
//! the coin counter and its extra-life conversion, the death/retry and
//! level-complete flows, the pause latch, and the single music-track slot
//! the kernel's event tags feed. Level data stays external; when a directive
//! asks for a restart or the next level, the caller supplies a fresh
//! [`Level`] through [`Session::start_level`].

use glam::Vec2;

use crate::consts::*;
use crate::sim::{Event, InputState, Level, MusicTrack, Player};

/// Where the session is in the life/level flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Playing,
    /// The player fell out; waiting before the retry decision
    Dying,
    /// Win sequence: flag descent and the time-bonus countdown
    LevelComplete,
    GameOver,
}

/// What the caller should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDirective {
    Continue,
    /// Rebuild the current level and call `start_level`
    RestartLevel,
    /// Supply the next level via `start_level`
    AdvanceLevel,
    /// The game-over presentation has run its course
    GameOver,
}

/// Fixed player spawn within a level.
const SPAWN: Vec2 = Vec2::new(32.0, VIEW_H - 64.0);

#[derive(Debug)]
pub struct Session {
    pub phase: SessionPhase,
    pub lives: u32,
    pub score: u32,
    pub coins: u32,
    pub paused: bool,
    pause_latch: bool,
    hurry_warned: bool,
    timer: u32,
    /// Single music slot for the presentation layer; the kernel only emits
    /// event tags, it never owns playback state
    pub music: Option<MusicTrack>,
    pub level: Level,
    pub player: Player,
    /// Event tags from the most recent tick
    pub events: Vec<Event>,
}

impl Session {
    pub fn new(level: Level) -> Self {
        let music = Some(environment_track(&level));
        Self {
            phase: SessionPhase::Playing,
            lives: 3,
            score: 0,
            coins: 0,
            paused: false,
            pause_latch: false,
            hurry_warned: false,
            timer: 0,
            music,
            player: Player::new(SPAWN),
            level,
            events: Vec::new(),
        }
    }

    /// Begin a level attempt: fresh player, fresh timers, environment music.
    pub fn start_level(&mut self, level: Level) {
        self.level = level;
        self.player = Player::new(SPAWN);
        self.phase = SessionPhase::Playing;
        self.paused = false;
        self.hurry_warned = false;
        self.timer = 0;
        self.music = Some(environment_track(&self.level));
    }

    /// Advance one tick of the whole game.
    pub fn tick(&mut self, input: &InputState) -> SessionDirective {
        self.events.clear();
        match self.phase {
            SessionPhase::Playing => self.tick_playing(input),
            SessionPhase::Dying => {
                self.timer += 1;
                if self.timer > 120 {
                    self.lives = self.lives.saturating_sub(1);
                    if self.lives == 0 {
                        self.phase = SessionPhase::GameOver;
                        self.timer = 0;
                        self.music = Some(MusicTrack::GameOver);
                    } else {
                        return SessionDirective::RestartLevel;
                    }
                }
                SessionDirective::Continue
            }
            SessionPhase::LevelComplete => {
                self.timer += 1;
                self.level.lower_flag();
                if self.timer > 60 && self.level.time > 0.0 {
                    self.level.time -= 2.0;
                    self.score += SCORE_TIME_BONUS;
                }
                if self.timer > 180 && self.level.time <= 0.0 {
                    return SessionDirective::AdvanceLevel;
                }
                SessionDirective::Continue
            }
            SessionPhase::GameOver => {
                self.timer += 1;
                if self.timer > 300 {
                    return SessionDirective::GameOver;
                }
                SessionDirective::Continue
            }
        }
    }

    fn tick_playing(&mut self, input: &InputState) -> SessionDirective {
        if input.start && !self.pause_latch {
            self.paused = !self.paused;
        }
        self.pause_latch = input.start;
        if self.paused {
            return SessionDirective::Continue;
        }

        self.level.tick(&mut self.player, input);
        self.score += self.level.drain_score();
        self.coins += self.level.drain_coins();
        self.events.extend(self.level.drain_events());

        // Life-granting pickups signaled by the kernel
        let item_lives = self.events.iter().filter(|e| **e == Event::OneUp).count();
        self.lives += item_lives as u32;

        if self.coins >= COINS_PER_LIFE {
            self.coins -= COINS_PER_LIFE;
            self.lives += 1;
            self.events.push(Event::OneUp);
        }

        self.level.time -= 1.0 / TICK_HZ as f32;
        if self.level.time <= 0.0 {
            self.player.die(&mut self.events);
        } else if self.level.time <= TIME_WARNING && !self.hurry_warned {
            self.hurry_warned = true;
            self.events.push(Event::Warning);
        }

        if self.player.win {
            self.phase = SessionPhase::LevelComplete;
            self.timer = 0;
        } else if self.player.dead && self.player.pos.y > VIEW_H + 32.0 {
            self.phase = SessionPhase::Dying;
            self.timer = 0;
        }

        self.music = self.select_music();
        SessionDirective::Continue
    }

    fn select_music(&self) -> Option<MusicTrack> {
        if self.player.dead {
            return None;
        }
        if self.player.win {
            return Some(if self.level.castle {
                MusicTrack::CastleComplete
            } else {
                MusicTrack::LevelComplete
            });
        }
        if self.player.star_power > 0 {
            return Some(MusicTrack::Star);
        }
        if self.level.time <= TIME_WARNING {
            return Some(MusicTrack::Hurry);
        }
        Some(environment_track(&self.level))
    }
}

fn environment_track(level: &Level) -> MusicTrack {
    if level.castle {
        MusicTrack::Castle
    } else if level.underwater {
        MusicTrack::Underwater
    } else if level.underground {
        MusicTrack::Underground
    } else {
        MusicTrack::Overworld
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::LevelMeta;

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

    fn session() -> Session {
        Session::new(Level::from_ascii(FLAT, LevelMeta::default()))
    }

    #[test]
    fn test_pause_latch_toggles_once_per_press() {
        let mut s = session();
        let start = InputState {
            start: true,
            ..Default::default()
        };
        let idle = InputState::default();

        s.tick(&start);
        assert!(s.paused);
        // Held key does not re-toggle
        s.tick(&start);
        assert!(s.paused);
        s.tick(&idle);
        s.tick(&start);
        assert!(!s.paused);
    }

    #[test]
    fn test_paused_session_freezes_simulation() {
        let mut s = session();
        let start = InputState {
            start: true,
            ..Default::default()
        };
        s.tick(&start);
        let time = s.level.time;
        let pos = s.player.pos;
        for _ in 0..30 {
            s.tick(&InputState::default());
        }
        assert_eq!(s.level.time, time);
        assert_eq!(s.player.pos, pos);
    }

    #[test]
    fn test_time_counts_down_and_warns_once() {
        let mut s = session();
        s.level.time = TIME_WARNING + 0.01;
        let idle = InputState::default();
        s.tick(&idle);
        assert!(s.events.contains(&Event::Warning));
        assert_eq!(s.music, Some(MusicTrack::Hurry));
        s.tick(&idle);
        assert!(!s.events.contains(&Event::Warning), "warning fires once");
    }

    #[test]
    fn test_time_expiry_kills_player() {
        let mut s = session();
        s.level.time = 0.01;
        let idle = InputState::default();
        s.tick(&idle);
        assert!(s.player.dead);
        assert!(s.events.contains(&Event::Die));
        assert_eq!(s.music, None);
    }

    #[test]
    fn test_coins_convert_to_lives() {
        let mut s = session();
        s.coins = COINS_PER_LIFE;
        let idle = InputState::default();
        let lives = s.lives;
        s.tick(&idle);
        assert_eq!(s.lives, lives + 1);
        assert_eq!(s.coins, 0);
        assert!(s.events.contains(&Event::OneUp));
    }

    #[test]
    fn test_death_flow_restarts_with_one_less_life() {
        let mut s = session();
        let idle = InputState::default();
        s.player.die(&mut Vec::new());
        // Let the corpse fall below the viewport
        let mut directive = SessionDirective::Continue;
        for _ in 0..600 {
            directive = s.tick(&idle);
            if directive != SessionDirective::Continue {
                break;
            }
        }
        assert_eq!(directive, SessionDirective::RestartLevel);
        assert_eq!(s.lives, 2);
    }

    #[test]
    fn test_death_flow_reaches_game_over() {
        let mut s = session();
        s.lives = 1;
        let idle = InputState::default();
        s.player.die(&mut Vec::new());
        let mut directive = SessionDirective::Continue;
        for _ in 0..1200 {
            directive = s.tick(&idle);
            if directive != SessionDirective::Continue {
                break;
            }
        }
        assert_eq!(directive, SessionDirective::GameOver);
        assert_eq!(s.lives, 0);
        assert_eq!(s.phase, SessionPhase::GameOver);
    }

    #[test]
    fn test_level_complete_drains_time_into_score() {
        let mut s = session();
        s.level.flagpole_x = Some(64.0);
        s.level.time = 10.0;
        s.player.win = true;
        let idle = InputState::default();
        let mut directive = SessionDirective::Continue;
        // One playing tick flips the phase
        s.tick(&idle);
        assert_eq!(s.phase, SessionPhase::LevelComplete);
        let score_before = s.score;
        for _ in 0..400 {
            directive = s.tick(&idle);
            if directive != SessionDirective::Continue {
                break;
            }
        }
        assert_eq!(directive, SessionDirective::AdvanceLevel);
        assert!(s.score > score_before, "remaining time became score");
        assert!(s.level.time <= 0.0);
        assert!(s.level.flag_descent > 0.0);
    }

    #[test]
    fn test_music_tracks_environment_and_star() {
        let underground = Level::from_ascii(
            FLAT,
            LevelMeta {
                underground: true,
                ..Default::default()
            },
        );
        let mut s = Session::new(underground);
        assert_eq!(s.music, Some(MusicTrack::Underground));

        let idle = InputState::default();
        s.player.star_power = STAR_TICKS;
        s.tick(&idle);
        assert_eq!(s.music, Some(MusicTrack::Star));
    }

    #[test]
    fn test_start_level_resets_attempt_state() {
        let mut s = session();
        s.player.big = true;
        s.paused = true;
        s.hurry_warned = true;
        s.start_level(Level::from_ascii(FLAT, LevelMeta::castle()));
        assert!(!s.player.big, "a fresh attempt spawns a fresh player");
        assert!(!s.paused);
        assert_eq!(s.music, Some(MusicTrack::Castle));
        assert_eq!(s.level.time, CASTLE_TIME);
    }
}
