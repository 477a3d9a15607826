//! Platform abstraction layer
//!
//! Contracts between the run controller and the host:
//! - Input intents (keyboard/touch → gas, brake, boost)
//! - Presentation (renderer, HUD, audio, run-ended event)
//! - Gameplay start/stop notifications for the hosting platform

use glam::Vec2;
use serde::Serialize;

use crate::sim::{Control, EndCause, World};

/// Source of per-tick control intents
pub trait InputSource {
    fn gas(&self) -> bool;
    fn brake(&self) -> bool;
    fn boost(&self) -> bool;

    /// Sample all three intents at once
    fn control(&self) -> Control {
        Control {
            gas: self.gas(),
            brake: self.brake(),
            boost: self.boost(),
        }
    }
}

/// Held-key input state fed by host key and touch events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub gas: bool,
    pub brake: bool,
    pub boost: bool,
}

impl KeyState {
    /// Apply a key event by its `KeyboardEvent.code`. Unknown codes are
    /// ignored; returns whether the code was recognised.
    pub fn set_key(&mut self, code: &str, pressed: bool) -> bool {
        match code {
            "ArrowRight" | "KeyD" => self.gas = pressed,
            "ArrowLeft" | "KeyA" => self.brake = pressed,
            "Space" => self.boost = pressed,
            _ => return false,
        }
        true
    }

    /// Replace gas/brake from active touches, given as fractions of the
    /// canvas width. The left 40% brakes, the right 40% accelerates.
    pub fn set_touches(&mut self, touches: &[f32]) {
        self.gas = touches.iter().any(|&x| x > 0.6);
        self.brake = touches.iter().any(|&x| x < 0.4);
    }

    /// Release everything (blur, touch end)
    pub fn release_all(&mut self) {
        *self = Self::default();
    }
}

impl InputSource for KeyState {
    fn gas(&self) -> bool {
        self.gas
    }

    fn brake(&self) -> bool {
        self.brake
    }

    fn boost(&self) -> bool {
        self.boost
    }
}

/// Input that always drives forward (demo and headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct Autopilot;

impl InputSource for Autopilot {
    fn gas(&self) -> bool {
        true
    }

    fn brake(&self) -> bool {
        false
    }

    fn boost(&self) -> bool {
        true
    }
}

/// Discrete sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sound {
    Coin,
    Fuel,
    Boost,
    Crash,
    Win,
}

/// Values shown on the in-run HUD
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HudState {
    /// Banked coins plus coins picked up this run
    pub coins: u32,
    pub distance: f32,
    pub best_distance: f32,
    pub rpm: f32,
    pub fuel: f32,
    pub fuel_max: f32,
    pub boost: f32,
    pub boost_max: f32,
    pub low_fuel: bool,
}

/// Payload raised once when a run ends
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunEnded {
    pub level_id: u32,
    pub level_name: String,
    pub vehicle_id: String,
    pub distance: f32,
    pub best_distance: f32,
    pub coins_earned: u32,
    pub stars: u8,
    pub reached_finish: bool,
    pub cause: EndCause,
}

/// Everything the controller tells the host. All methods default to no-ops
/// so a host only implements what it presents.
pub trait Frontend {
    /// Draw the world from `camera` (once per running tick)
    fn render(&mut self, _camera: Vec2, _world: &World) {}

    fn update_hud(&mut self, _hud: &HudState) {}

    fn start_engine(&mut self) {}

    fn stop_engine(&mut self) {}

    /// Continuous engine sound modulation
    fn update_engine(&mut self, _rpm: f32, _gas: bool) {}

    fn play(&mut self, _sound: Sound) {}

    fn run_ended(&mut self, _event: &RunEnded) {}

    /// Hosting platform hooks (ad SDKs pause around gameplay)
    fn gameplay_start(&mut self) {}

    fn gameplay_stop(&mut self) {}
}

/// Frontend that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFrontend;

impl Frontend for NullFrontend {}
