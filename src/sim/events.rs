//! Discrete outbound event tags
//!
//! The kernel never owns playback or scoring state; it appends tags to the
//! level's per-tick queue and the embedding session (or presentation layer)
//! drains them. Each tag is fire-and-forget.

/// One discrete outcome of a simulation tick, for audio/scoring hookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Small player jumped
    Jump,
    /// Big player jumped
    JumpBig,
    /// An enemy was stomped
    Stomp,
    /// A tile bounced without breaking or spawning
    Bump,
    /// A brick was destroyed
    Break,
    /// A coin was credited
    Coin,
    /// A pickup sprouted out of a tile
    Sprout,
    /// A power-up took effect
    PowerUp,
    /// A projectile was fired
    Fireball,
    /// A shell was kicked or an enemy was knocked out
    Kick,
    /// An extra life was granted
    OneUp,
    /// The player entered a pipe
    Pipe,
    /// The player died
    Die,
    /// The player reached the flagpole
    Flagpole,
    /// Remaining time crossed the warning threshold
    Warning,
    /// A regular level was cleared
    LevelComplete,
    /// A castle level was cleared
    CastleComplete,
}

/// Background music tracks the session can select. The kernel never touches
/// these; the session derives the active track from level flags and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicTrack {
    Overworld,
    Underground,
    Underwater,
    Castle,
    Star,
    Hurry,
    LevelComplete,
    CastleComplete,
    GameOver,
}
