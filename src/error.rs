//! Error types for run setup, shop purchases and persistence.
//!
//! The simulation itself never fails at runtime: fuel and boost are clamped
//! at the source and terminal conditions are reported through `StepResult`.

use std::fmt;

/// Top-level error enum for the game core.
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// No level with this id exists in the level table.
    UnknownLevel(u32),

    /// The level exists but earlier levels have not earned enough stars.
    LevelLocked(u32),

    /// No vehicle archetype with this id exists.
    UnknownVehicle(String),

    /// The vehicle exists but the player has not unlocked it yet.
    VehicleLocked(String),

    /// A purchase cost more coins than the player owns.
    InsufficientCoins {
        /// Price of the item.
        needed: u32,
        /// Current coin balance.
        available: u32,
    },

    /// The upgrade track is already at its maximum level.
    UpgradeMaxed {
        vehicle: String,
        track: &'static str,
    },

    /// The save blob could not be written or encoded.
    Storage(String),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::UnknownLevel(id) => write!(f, "level {} not found", id),
            GameError::LevelLocked(id) => write!(f, "level {} is locked", id),
            GameError::UnknownVehicle(id) => write!(f, "vehicle '{}' not found", id),
            GameError::VehicleLocked(id) => write!(f, "vehicle '{}' is locked", id),
            GameError::InsufficientCoins { needed, available } => write!(
                f,
                "not enough coins: need {}, have {}",
                needed, available
            ),
            GameError::UpgradeMaxed { vehicle, track } => {
                write!(f, "{} upgrade for '{}' is already maxed", track, vehicle)
            }
            GameError::Storage(msg) => write!(f, "storage error: {}", msg),
        }
    }
}

impl std::error::Error for GameError {}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::Storage(err.to_string())
    }
}

/// Convenience result alias for the game core.
pub type GameResult<T> = Result<T, GameError>;
