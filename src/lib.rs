//! Island Hopper - the portfolio page's side-scrolling mini-game
//!
//! Core modules:
//! - `sim`: Deterministic platformer simulation (physics, procedural
//!   generation, collisions, game phases)
//! - `reveal`: Scroll-reveal scheduler with a bounded number of concurrent
//!   transitions
//! - `highscore`: Durable best-score storage
//!
//! All browser coupling (DOM, frame scheduling, observers, LocalStorage I/O)
//! lives in the binary shell; everything here is platform-free and testable.

pub mod highscore;
pub mod reveal;
pub mod sim;

pub use highscore::HighScore;
pub use reveal::RevealScheduler;

/// Game configuration constants
///
/// Movement constants are per-tick deltas, tuned for one tick per animation
/// frame at a nominal 60 Hz.
pub mod consts {
    /// Playfield dimensions (px)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 300.0;

    /// Character sprite size and fixed horizontal position
    pub const PLAYER_SIZE: f32 = 32.0;
    pub const PLAYER_X: f32 = 50.0;
    /// Vertical spawn position
    pub const PLAYER_START_Y: f32 = 150.0;
    /// Falling past this y ends the run
    pub const FALL_THRESHOLD: f32 = 300.0;

    /// World scroll speed bounds (px per tick)
    pub const BASE_GAME_SPEED: f32 = 0.9;
    pub const MAX_GAME_SPEED: f32 = 2.7;
    /// Sessions start slightly above base speed
    pub const START_SPEED_BOOST: f32 = 1.1;
    /// Platforms slow to this fraction of game speed while the player is
    /// airborne, to make jump timing more forgiving
    pub const AIRBORNE_SPEED_FACTOR: f32 = 0.85;

    /// Gravity acceleration (px per tick²)
    pub const GRAVITY: f32 = 0.22;
    /// Jump impulse (negative is up)
    pub const JUMP_FORCE: f32 = -8.3;
    /// One-time leftward platform shift on jump (forward-momentum illusion)
    pub const JUMP_NUDGE: f32 = 5.0;

    /// Platform defaults
    pub const PLATFORM_HEIGHT: f32 = 20.0;
    /// Baseline platform surface height
    pub const GROUND_Y: f32 = 200.0;
    /// Generated platform surfaces stay within this band
    pub const MIN_PLATFORM_Y: f32 = 175.0;
    pub const MAX_PLATFORM_Y: f32 = 225.0;
    /// Width of the wide starting platform
    pub const START_PLATFORM_WIDTH: f32 = 250.0;
    /// Platforms generated at session start (plus the starting platform)
    pub const INITIAL_PLATFORM_COUNT: usize = 10;
    /// Generation triggers when the active count drops below this
    pub const PLATFORM_LOW_WATER: usize = 5;
    /// Entities whose right edge passes this far off the left edge are removed
    pub const OFFSCREEN_MARGIN: f32 = 50.0;

    /// Cloud population cap
    pub const CLOUD_TARGET: usize = 8;
    /// Per-tick chance of spawning a replacement cloud
    pub const CLOUD_SPAWN_CHANCE: f32 = 0.01;
    /// Cloud scroll speed (px per tick), independent of game speed
    pub const CLOUD_SPEED: f32 = 0.5;

    /// Score gained per tick
    pub const SCORE_PER_TICK: f32 = 0.03;

    /// Jump debounce window (ticks, ~300 ms)
    pub const JUMP_COOLDOWN_TICKS: u64 = 18;
    /// Landing animation duration before reverting to running (~300 ms)
    pub const LANDING_ANIM_TICKS: u32 = 18;
    /// Jump flash duration (~200 ms)
    pub const JUMP_FLASH_TICKS: u32 = 12;
    /// Forward-momentum arc duration after a jump (~320 ms)
    pub const MOMENTUM_TICKS: u64 = 19;
}
