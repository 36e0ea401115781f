//! Game state and core simulation types
//!
//! Everything the renderer needs per frame is readable from `GameState`; the
//! shell treats it as a read-only snapshot between ticks.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Current phase of gameplay
///
/// `Idle` doubles as the suspended state: scrolling the game out of view
/// while running flips the phase back to `Idle` with every entity preserved,
/// and scrolling back in resumes from exactly that state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No frames scheduled; either no session yet or a suspended one
    Idle,
    /// Active gameplay, one tick per frame
    Running,
    /// Run ended; input restarts
    GameOver,
}

/// Character animation state, driving presentation only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterAnim {
    Running,
    Jumping,
    Landing,
    Falling,
}

impl CharacterAnim {
    /// CSS class the shell applies for this state
    pub fn as_class(&self) -> &'static str {
        match self {
            CharacterAnim::Running => "running",
            CharacterAnim::Jumping => "jumping",
            CharacterAnim::Landing => "landing",
            CharacterAnim::Falling => "falling",
        }
    }
}

/// A scrolling island platform
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Platform {
    /// Top-left corner in world space; only `x` changes after creation
    pub pos: Vec2,
    pub width: f32,
}

impl Platform {
    pub fn right_edge(&self) -> f32 {
        self.pos.x + self.width
    }
}

/// A decorative, non-colliding cloud
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cloud {
    pub pos: Vec2,
    pub size: f32,
    pub opacity: f32,
}

/// The player character
///
/// Horizontal position is fixed at `PLAYER_X`; the world scrolls past.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub is_jumping: bool,
    /// Set on the tick a landing happens, consumed at end of tick
    pub just_landed: bool,
    /// Tick index of the last accepted jump (for the debounce window)
    pub last_jump_tick: Option<u64>,
    pub anim: CharacterAnim,
    /// Ticks remaining on the landing animation
    pub anim_ticks: u32,
    /// Ticks remaining on the jump flash
    pub flash_ticks: u32,
}

impl Player {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, PLAYER_START_Y),
            vel: Vec2::ZERO,
            is_jumping: false,
            just_landed: false,
            last_jump_tick: None,
            anim: CharacterAnim::Running,
            anim_ticks: 0,
            flash_ticks: 0,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + PLAYER_SIZE
    }

    pub fn flash_active(&self) -> bool {
        self.flash_ticks > 0
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

fn skipped_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete game state (deterministic, snapshotable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Live RNG stream (reseeded from `seed` on deserialize)
    #[serde(skip, default = "skipped_rng")]
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Fractional score; the displayed value is `floor(score)`
    pub score: f32,
    /// Best score across sessions, loaded once at startup
    pub high_score: u32,
    /// Set on the game-over tick when this run beat the stored best
    pub high_score_improved: bool,
    /// Current world scroll speed, monotone within a session
    pub game_speed: f32,
    /// Simulation tick counter, reset per session
    pub time_ticks: u64,
    pub player: Player,
    pub platforms: Vec<Platform>,
    pub clouds: Vec<Cloud>,
    /// False until the first session starts; distinguishes a fresh `Idle`
    /// from a suspended one
    pub session_started: bool,
}

impl GameState {
    /// Create an idle game state with the given seed and stored best score
    pub fn new(seed: u64, high_score: u32) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Idle,
            score: 0.0,
            high_score,
            high_score_improved: false,
            game_speed: BASE_GAME_SPEED,
            time_ticks: 0,
            player: Player::new(),
            platforms: Vec::new(),
            clouds: Vec::new(),
            session_started: false,
        }
    }

    /// Displayed score
    pub fn score_display(&self) -> u32 {
        self.score.floor() as u32
    }

    /// Right edge of the rightmost active platform, or the field edge when
    /// the set is empty, so generation always appends off-screen
    pub fn rightmost_platform_edge(&self) -> f32 {
        self.platforms
            .iter()
            .map(Platform::right_edge)
            .fold(FIELD_WIDTH, f32::max)
    }

    /// Progress through the forward-momentum arc since the last jump, 0..=1
    pub fn jump_progress(&self) -> f32 {
        match self.player.last_jump_tick {
            Some(t) if self.player.is_jumping => {
                (self.time_ticks.saturating_sub(t) as f32 / MOMENTUM_TICKS as f32).min(1.0)
            }
            _ => 1.0,
        }
    }
}
