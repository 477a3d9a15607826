//! Run state and core simulation types
//!
//! Everything that changes during one run lives in [`RunState`]. The physics
//! step reads it and returns a [`StepResult`]; the controller folds the result
//! back in with [`RunState::apply`].

use serde::{Deserialize, Serialize};

use super::step::StepResult;
use crate::vehicles::EffectiveVehicle;

/// Current phase of the run controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// No run in progress (menus)
    Idle,
    /// Active gameplay
    Running,
    /// Run suspended; no physics ticks are consumed
    Paused,
    /// Run ended
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndCause {
    Finish,
    Flip,
    Fuel,
}

impl EndCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndCause::Finish => "finish",
            EndCause::Flip => "flip",
            EndCause::Fuel => "fuel",
        }
    }
}

impl std::fmt::Display for EndCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub level_id: u32,
    pub vehicle: EffectiveVehicle,
    pub fuel: f32,
    pub boost: f32,
    pub rpm: f32,
    /// Coins picked up this run (not yet banked)
    pub coins_collected: u32,
    /// Furthest x reached this run, never decreasing
    pub distance: f32,
    /// Stored best for this level when the run started
    pub best_distance: f32,
    pub finish_x: f32,
    /// Simulated time (seconds)
    pub elapsed: f32,
    pub low_fuel: bool,
    pub ended: bool,
    pub reached_finish: bool,
    pub cause: Option<EndCause>,
}

impl RunState {
    /// Fresh run: full tank, empty boost
    pub fn new(level_id: u32, vehicle: EffectiveVehicle, finish_x: f32, best_distance: f32) -> Self {
        Self {
            level_id,
            fuel: vehicle.physical.fuel_capacity,
            vehicle,
            boost: 0.0,
            rpm: 0.0,
            coins_collected: 0,
            distance: 0.0,
            best_distance,
            finish_x,
            elapsed: 0.0,
            low_fuel: false,
            ended: false,
            reached_finish: false,
            cause: None,
        }
    }

    pub fn fuel_capacity(&self) -> f32 {
        self.vehicle.physical.fuel_capacity
    }

    /// Best distance including this run
    pub fn best_with_current(&self) -> f32 {
        self.best_distance.max(self.distance)
    }

    /// Fold a step result into the run
    pub fn apply(&mut self, result: &StepResult, dt: f32) {
        self.rpm = result.rpm;
        self.fuel = result.fuel;
        self.boost = result.boost;
        self.coins_collected += result.collected_coins;
        self.distance = self.distance.max(result.distance);
        self.low_fuel = result.low_fuel;
        self.elapsed += dt;
        if result.ended && !self.ended {
            self.ended = true;
            self.reached_finish = result.reached_finish;
            self.cause = result.cause;
        }
    }
}
