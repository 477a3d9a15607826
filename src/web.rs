//! Browser facade
//!
//! Exposes the run controller to JavaScript. The page forwards key, touch and
//! animation-frame events; drawing, HUD and audio stay in JS and read JSON
//! snapshots queued here.

use glam::Vec2;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::error::GameError;
use crate::game::RunController;
use crate::persistence::LocalStorageStore;
use crate::platform::{Frontend, HudState, KeyState, RunEnded, Sound};
use crate::settings::Settings;
use crate::sim::{BodyRole, RunPhase, Shape, World};
use crate::vehicles::UpgradeTrack;

/// Install the panic hook and console logger when the module loads
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Hill Climb starting...");
}

fn js_error(err: GameError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// One body as the page draws it
#[derive(Serialize)]
struct SceneBody {
    role: BodyRole,
    shape: Shape,
    x: f32,
    y: f32,
    angle: f32,
}

#[derive(Serialize)]
struct Scene {
    camera: Vec2,
    bodies: Vec<SceneBody>,
    /// Suspension lines as anchor pairs
    springs: Vec<(Vec2, Vec2)>,
}

#[derive(Serialize)]
struct EngineSnapshot {
    rpm: f32,
    gas: bool,
    gain: f32,
}

#[derive(Serialize)]
struct SoundBatch {
    gain: f32,
    sounds: Vec<Sound>,
}

/// Frontend that queues everything for the page to pick up
#[derive(Default)]
struct QueuedFrontend {
    scene: Option<Scene>,
    hud: Option<HudState>,
    engine: Option<(f32, bool)>,
    sounds: Vec<Sound>,
    ended: Option<RunEnded>,
}

impl Frontend for QueuedFrontend {
    fn render(&mut self, camera: Vec2, world: &World) {
        let bodies = world
            .bodies()
            .iter()
            .filter(|b| b.role != BodyRole::Collected)
            .map(|b| SceneBody {
                role: b.role,
                shape: b.shape,
                x: b.position.x,
                y: b.position.y,
                angle: b.angle,
            })
            .collect();
        let springs = world
            .springs()
            .iter()
            .filter_map(|spring| spring.endpoints(world))
            .collect();
        self.scene = Some(Scene {
            camera,
            bodies,
            springs,
        });
    }

    fn update_hud(&mut self, hud: &HudState) {
        self.hud = Some(hud.clone());
    }

    fn stop_engine(&mut self) {
        self.engine = None;
    }

    fn update_engine(&mut self, rpm: f32, gas: bool) {
        self.engine = Some((rpm, gas));
    }

    fn play(&mut self, sound: Sound) {
        self.sounds.push(sound);
    }

    fn run_ended(&mut self, event: &RunEnded) {
        self.ended = Some(event.clone());
    }
}

/// Game handle owned by the page
#[wasm_bindgen]
pub struct WebGame {
    controller: RunController<LocalStorageStore, QueuedFrontend>,
    keys: KeyState,
    last_time: f64,
    focused: bool,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        let settings = Settings::load();
        WebGame {
            controller: RunController::new(LocalStorageStore::new(), QueuedFrontend::default(), settings),
            keys: KeyState::default(),
            last_time: 0.0,
            focused: true,
        }
    }

    pub fn start_run(&mut self, level_id: u32, vehicle_id: &str) -> Result<(), JsValue> {
        self.last_time = 0.0;
        self.controller.start_run(level_id, vehicle_id).map_err(js_error)
    }

    pub fn start_selected(&mut self) -> Result<(), JsValue> {
        self.last_time = 0.0;
        self.controller.start_selected().map_err(js_error)
    }

    pub fn restart(&mut self) -> Result<(), JsValue> {
        self.last_time = 0.0;
        self.controller.restart().map_err(js_error)
    }

    pub fn quit(&mut self) {
        self.controller.quit();
    }

    pub fn pause(&mut self) -> bool {
        self.keys.release_all();
        self.controller.pause()
    }

    pub fn resume(&mut self) -> bool {
        // Don't feed the paused time into the next frame
        self.last_time = 0.0;
        self.controller.resume()
    }

    /// Window lost focus: release keys, mute if configured and pause if
    /// configured. Returns whether the run was paused.
    pub fn blur(&mut self) -> bool {
        self.keys.release_all();
        self.focused = false;
        self.controller.settings().pause_on_blur && self.controller.pause()
    }

    /// Window regained focus. A paused run stays paused until `resume`.
    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn select_level(&mut self, level_id: u32) -> Result<(), JsValue> {
        self.controller.select_level(level_id).map_err(js_error)
    }

    pub fn select_vehicle(&mut self, vehicle_id: &str) -> Result<(), JsValue> {
        self.controller.select_vehicle(vehicle_id).map_err(js_error)
    }

    pub fn unlock_vehicle(&mut self, vehicle_id: &str) -> Result<bool, JsValue> {
        self.controller.unlock_vehicle(vehicle_id).map_err(js_error)
    }

    /// Rewarded unlock
    pub fn grant_vehicle(&mut self, vehicle_id: &str) -> Result<bool, JsValue> {
        self.controller.grant_vehicle(vehicle_id).map_err(js_error)
    }

    /// Rewarded coins. Returns the new balance.
    pub fn grant_coins(&mut self, amount: u32) -> u32 {
        self.controller.grant_coins(amount)
    }

    pub fn purchase_upgrade(&mut self, vehicle_id: &str, track: &str) -> Result<u8, JsValue> {
        let track = UpgradeTrack::parse(track)
            .ok_or_else(|| JsValue::from_str(&format!("unknown upgrade track '{}'", track)))?;
        self.controller
            .purchase_upgrade(vehicle_id, track)
            .map_err(js_error)
    }

    pub fn key_down(&mut self, code: &str) -> bool {
        self.keys.set_key(code, true)
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.keys.set_key(code, false)
    }

    /// Active touches as fractions of the canvas width
    pub fn set_touches(&mut self, touches: Vec<f32>) {
        self.keys.set_touches(&touches);
    }

    /// Advance one animation frame (timestamp in ms). Returns true if the run
    /// ended on this frame.
    pub fn frame(&mut self, time_ms: f64) -> bool {
        let dt = if self.last_time > 0.0 {
            ((time_ms - self.last_time) / 1000.0) as f32
        } else {
            0.0
        };
        self.last_time = time_ms;
        self.controller.update(dt, &self.keys).is_some()
    }

    pub fn phase(&self) -> String {
        match self.controller.phase() {
            RunPhase::Idle => "idle",
            RunPhase::Running => "running",
            RunPhase::Paused => "paused",
            RunPhase::GameOver => "gameover",
        }
        .to_string()
    }

    pub fn scene_json(&self) -> Option<String> {
        let scene = self.controller.frontend().scene.as_ref()?;
        serde_json::to_string(scene).ok()
    }

    pub fn hud_json(&self) -> Option<String> {
        let hud = self.controller.frontend().hud.as_ref()?;
        serde_json::to_string(hud).ok()
    }

    /// Engine sound parameters, or null when the engine is off
    pub fn engine_json(&self) -> Option<String> {
        let (rpm, gas) = self.controller.frontend().engine?;
        let gain = self.controller.settings().engine_gain(self.focused);
        serde_json::to_string(&EngineSnapshot { rpm, gas, gain }).ok()
    }

    /// Sound cues since the last call with the gain to play them at
    pub fn take_sounds_json(&mut self) -> String {
        let gain = self.controller.settings().sfx_gain(self.focused);
        let sounds = std::mem::take(&mut self.controller.frontend_mut().sounds);
        serde_json::to_string(&SoundBatch { gain, sounds })
            .unwrap_or_else(|_| r#"{"gain":0,"sounds":[]}"#.to_string())
    }

    /// The current run's state, or null outside a run
    pub fn run_json(&self) -> Option<String> {
        let state = self.controller.run_state()?;
        serde_json::to_string(state).ok()
    }

    pub fn selected_level(&self) -> u32 {
        self.controller.selected_level()
    }

    pub fn selected_vehicle(&self) -> String {
        self.controller.selected_vehicle().to_string()
    }

    /// The run-ended payload, once
    pub fn take_run_ended_json(&mut self) -> Option<String> {
        let event = self.controller.frontend_mut().ended.take()?;
        serde_json::to_string(&event).ok()
    }

    pub fn save_json(&self) -> String {
        serde_json::to_string(self.controller.save_data()).unwrap_or_default()
    }

    pub fn settings_json(&self) -> String {
        self.controller.settings().to_json().unwrap_or_default()
    }

    /// Replace settings from JSON and store them
    pub fn set_settings_json(&mut self, json: &str) -> Result<(), JsValue> {
        let settings = Settings::from_json(json).map_err(|e| js_error(e.into()))?;
        settings.save();
        self.controller.set_settings(settings);
        Ok(())
    }
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}
