//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per scheduled frame, fixed per-tick constants
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod procgen;
pub mod state;
pub mod tick;

pub use state::{CharacterAnim, Cloud, GamePhase, GameState, Platform, Player};
pub use tick::{enter_view, leave_view, primary_action, start_session, tick, try_jump};
