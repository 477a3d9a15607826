//! Run controller
//!
//! Owns the physics world, the player's progress and the presentation
//! collaborator, and drives the run state machine:
//! `Idle → Running ⇄ Paused → GameOver → Running (restart) | Idle (quit)`.

use glam::Vec2;

use crate::consts::BOOST_MAX;
use crate::error::{GameError, GameResult};
use crate::levels::{LevelDef, level_by_id};
use crate::persistence::{ProgressStore, SaveData};
use crate::platform::{Frontend, HudState, InputSource, RunEnded, Sound};
use crate::settings::Settings;
use crate::sim::{
    Control, RunPhase, RunState, StepResult, VehicleInstance, World, attach_vehicle,
    generate_terrain, populate_world, step_physics,
};
use crate::vehicles::{EffectiveVehicle, UpgradeTrack, vehicle_by_id};

/// Fraction of the track that earns the second star
const TWO_STAR_FRACTION: f32 = 0.8;

/// Stars for a finished run: one always, two from 80% of the track, three
/// only when the finish line was reached
pub fn compute_stars(distance: f32, finish_x: f32, reached_finish: bool) -> u8 {
    if reached_finish {
        3
    } else if distance >= finish_x * TWO_STAR_FRACTION {
        2
    } else {
        1
    }
}

/// Result of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub event: RunEnded,
    /// Coin balance after banking this run
    pub total_coins: u32,
    /// Simulated seconds
    pub elapsed: f32,
}

/// The run in progress
struct ActiveRun {
    level: &'static LevelDef,
    rig: VehicleInstance,
    state: RunState,
    camera: Vec2,
}

/// Run state machine over a progress store and a frontend
pub struct RunController<S: ProgressStore, F: Frontend> {
    settings: Settings,
    store: S,
    save: SaveData,
    frontend: F,
    world: World,
    phase: RunPhase,
    level_id: u32,
    vehicle_id: String,
    run: Option<ActiveRun>,
    last_summary: Option<RunSummary>,
}

impl<S: ProgressStore, F: Frontend> RunController<S, F> {
    pub fn new(store: S, frontend: F, settings: Settings) -> Self {
        let save = SaveData::load_from(&store);
        let mut world = World::new();
        world.set_substeps(settings.physics_substeps);
        Self {
            level_id: save.last_selected_level,
            vehicle_id: save.last_selected_vehicle.clone(),
            settings,
            store,
            save,
            frontend,
            world,
            phase: RunPhase::Idle,
            run: None,
            last_summary: None,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace settings; solver substeps apply from the next tick
    pub fn set_settings(&mut self, settings: Settings) {
        self.world.set_substeps(settings.physics_substeps);
        self.settings = settings;
    }

    pub fn save_data(&self) -> &SaveData {
        &self.save
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.frontend
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn run_state(&self) -> Option<&RunState> {
        self.run.as_ref().map(|r| &r.state)
    }

    pub fn rig(&self) -> Option<&VehicleInstance> {
        self.run.as_ref().map(|r| &r.rig)
    }

    pub fn camera(&self) -> Option<Vec2> {
        self.run.as_ref().map(|r| r.camera)
    }

    pub fn selected_level(&self) -> u32 {
        self.level_id
    }

    pub fn selected_vehicle(&self) -> &str {
        &self.vehicle_id
    }

    pub fn last_summary(&self) -> Option<&RunSummary> {
        self.last_summary.as_ref()
    }

    /// HUD values for the current run
    pub fn hud(&self) -> Option<HudState> {
        let run = self.run.as_ref()?;
        let state = &run.state;
        Some(HudState {
            coins: self.save.coins().saturating_add(state.coins_collected),
            distance: state.distance,
            best_distance: state.best_with_current(),
            rpm: state.rpm,
            fuel: state.fuel,
            fuel_max: state.fuel_capacity(),
            boost: state.boost,
            boost_max: BOOST_MAX,
            low_fuel: state.low_fuel,
        })
    }

    // === Selection and shop ===

    /// Remember an unlocked level for the next run
    pub fn select_level(&mut self, level_id: u32) -> GameResult<()> {
        self.unlocked_level(level_id)?;
        self.level_id = level_id;
        self.save.set_last_selected(level_id, &self.vehicle_id);
        self.persist();
        Ok(())
    }

    /// Remember an unlocked vehicle for the next run
    pub fn select_vehicle(&mut self, vehicle_id: &str) -> GameResult<()> {
        let vehicle = vehicle_by_id(vehicle_id)?;
        if !self.save.is_vehicle_unlocked(vehicle.id) {
            return Err(GameError::VehicleLocked(vehicle.id.to_string()));
        }
        self.vehicle_id = vehicle.id.to_string();
        self.save.set_last_selected(self.level_id, vehicle.id);
        self.persist();
        Ok(())
    }

    pub fn unlock_vehicle(&mut self, vehicle_id: &str) -> GameResult<bool> {
        let unlocked = self.save.unlock_vehicle(vehicle_id)?;
        if unlocked {
            self.persist();
        }
        Ok(unlocked)
    }

    pub fn purchase_upgrade(&mut self, vehicle_id: &str, track: UpgradeTrack) -> GameResult<u8> {
        let level = self.save.purchase_upgrade(vehicle_id, track)?;
        self.persist();
        Ok(level)
    }

    /// Rewarded unlock: the vehicle is granted without paying
    pub fn grant_vehicle(&mut self, vehicle_id: &str) -> GameResult<bool> {
        let granted = self.save.grant_vehicle(vehicle_id)?;
        if granted {
            self.persist();
        }
        Ok(granted)
    }

    /// Rewarded coins. Returns the new balance.
    pub fn grant_coins(&mut self, amount: u32) -> u32 {
        self.save.add_coins(amount as i64);
        self.persist();
        log::info!("Granted {} coins", amount);
        self.save.coins()
    }

    fn unlocked_level(&self, level_id: u32) -> GameResult<&'static LevelDef> {
        let level = level_by_id(level_id)?;
        if !self.save.is_level_unlocked(level.id) {
            return Err(GameError::LevelLocked(level.id));
        }
        Ok(level)
    }

    // === Run lifecycle ===

    /// Build the level and vehicle and start driving.
    ///
    /// Fails without touching the world or the save if the level or vehicle
    /// is unknown or still locked.
    pub fn start_run(&mut self, level_id: u32, vehicle_id: &str) -> GameResult<()> {
        let level = self.unlocked_level(level_id)?;
        let archetype = vehicle_by_id(vehicle_id)?;
        if !self.save.is_vehicle_unlocked(archetype.id) {
            return Err(GameError::VehicleLocked(archetype.id.to_string()));
        }

        self.level_id = level.id;
        self.vehicle_id = archetype.id.to_string();

        self.world.clear();
        self.world.set_gravity(level.gravity);
        self.world.set_substeps(self.settings.physics_substeps);

        let layout = generate_terrain(level);
        populate_world(&mut self.world, &layout);

        let vehicle = EffectiveVehicle::new(archetype, &self.save.upgrades(archetype.id));
        let rig = attach_vehicle(&mut self.world, &vehicle);
        let camera = self
            .world
            .get(rig.chassis)
            .map_or(Vec2::ZERO, |c| c.position);
        let state = RunState::new(
            level.id,
            vehicle,
            layout.finish_x,
            self.save.best_distance(level.id),
        );

        log::info!(
            "Run start: level {} '{}' with {}",
            level.id,
            level.name,
            archetype.id
        );

        self.run = Some(ActiveRun {
            level,
            rig,
            state,
            camera,
        });
        self.last_summary = None;
        self.phase = RunPhase::Running;
        self.frontend.start_engine();
        self.frontend.gameplay_start();
        Ok(())
    }

    /// Start the selected level and vehicle
    pub fn start_selected(&mut self) -> GameResult<()> {
        let vehicle_id = self.vehicle_id.clone();
        self.start_run(self.level_id, &vehicle_id)
    }

    /// Throw away the current run and start the same level again
    pub fn restart(&mut self) -> GameResult<()> {
        self.discard_run();
        self.start_selected()
    }

    /// Throw away the current run and go back to the menus
    pub fn quit(&mut self) {
        self.discard_run();
        self.phase = RunPhase::Idle;
        self.frontend.gameplay_stop();
    }

    fn discard_run(&mut self) {
        if self.phase == RunPhase::Running || self.phase == RunPhase::Paused {
            self.frontend.stop_engine();
        }
        self.world.clear();
        self.run = None;
    }

    /// Suspend a running run. Returns whether the phase changed.
    pub fn pause(&mut self) -> bool {
        if self.phase != RunPhase::Running {
            return false;
        }
        self.phase = RunPhase::Paused;
        self.frontend.gameplay_stop();
        true
    }

    /// Resume a paused run. Returns whether the phase changed.
    pub fn resume(&mut self) -> bool {
        if self.phase != RunPhase::Paused {
            return false;
        }
        self.phase = RunPhase::Running;
        self.frontend.gameplay_start();
        true
    }

    /// Advance one host frame. Returns the summary if the run ended on this
    /// frame.
    pub fn update(&mut self, dt: f32, input: &dyn InputSource) -> Option<RunSummary> {
        if self.phase != RunPhase::Running {
            return None;
        }
        let dt = self.settings.clamp_dt(dt);
        let run = self.run.as_mut()?;

        let intents = input.control();
        let control = Control {
            boost: intents.boost && run.state.boost > 0.0,
            ..intents
        };

        let result = step_physics(
            &mut self.world,
            &run.rig,
            &run.state,
            control,
            dt,
            &self.settings,
        );
        run.state.apply(&result, dt);

        if let Some(chassis) = self.world.get(run.rig.chassis) {
            let follow = Vec2::new(self.settings.camera_follow_x, self.settings.camera_follow_y);
            run.camera += (chassis.position - run.camera) * follow;
        }
        let camera = run.camera;
        let rpm = run.state.rpm;

        if let Some(hud) = self.hud() {
            self.frontend.update_hud(&hud);
        }
        self.frontend.render(camera, &self.world);
        self.frontend.update_engine(rpm, control.gas);
        play_cues(&mut self.frontend, &result);

        if result.ended {
            return self.finish_run(&result);
        }
        None
    }

    /// Bank rewards, persist and announce the end of the run
    fn finish_run(&mut self, result: &StepResult) -> Option<RunSummary> {
        let run = self.run.as_ref()?;
        let state = &run.state;
        let cause = state.cause.or(result.cause)?;

        self.phase = RunPhase::GameOver;
        self.frontend.stop_engine();

        let total_coins = self.save.coins().saturating_add(state.coins_collected);
        self.save.set_coins(total_coins as i64);
        let best = state.best_with_current();
        self.save.set_best_distance(state.level_id, best);
        let stars = compute_stars(state.distance, state.finish_x, state.reached_finish);
        self.save.set_level_stars(state.level_id, stars);

        let summary = RunSummary {
            event: RunEnded {
                level_id: state.level_id,
                level_name: run.level.name.to_string(),
                vehicle_id: state.vehicle.id.clone(),
                distance: state.distance,
                best_distance: best,
                coins_earned: state.coins_collected,
                stars,
                reached_finish: state.reached_finish,
                cause,
            },
            total_coins: self.save.coins(),
            elapsed: state.elapsed,
        };

        self.persist();

        self.frontend.play(if summary.event.reached_finish {
            Sound::Win
        } else {
            Sound::Crash
        });
        self.frontend.run_ended(&summary.event);

        log::info!(
            "Run end: level {} {} at {:.0}px, {} coins, {} stars",
            summary.event.level_id,
            cause,
            summary.event.distance,
            summary.event.coins_earned,
            stars
        );

        self.last_summary = Some(summary.clone());
        Some(summary)
    }

    fn persist(&mut self) {
        if let Err(e) = self.save.save_to(&mut self.store) {
            log::warn!("Failed to save progress: {}", e);
        }
    }
}

fn play_cues<F: Frontend>(frontend: &mut F, result: &StepResult) {
    if result.collected_coins > 0 {
        frontend.play(Sound::Coin);
    }
    if result.collected_fuel {
        frontend.play(Sound::Fuel);
    }
    if result.used_boost {
        frontend.play(Sound::Boost);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::platform::{Autopilot, KeyState};
    use crate::sim::{BodyRole, EndCause};
    use crate::vehicles::DEFAULT_VEHICLE_ID;

    const DT: f32 = 1.0 / 60.0;

    #[derive(Default)]
    struct RecordingFrontend {
        sounds: Vec<Sound>,
        events: Vec<RunEnded>,
        huds: Vec<HudState>,
        renders: usize,
        engine_running: bool,
    }

    impl Frontend for RecordingFrontend {
        fn render(&mut self, _camera: Vec2, _world: &World) {
            self.renders += 1;
        }

        fn update_hud(&mut self, hud: &HudState) {
            self.huds.push(hud.clone());
        }

        fn start_engine(&mut self) {
            self.engine_running = true;
        }

        fn stop_engine(&mut self) {
            self.engine_running = false;
        }

        fn play(&mut self, sound: Sound) {
            self.sounds.push(sound);
        }

        fn run_ended(&mut self, event: &RunEnded) {
            self.events.push(event.clone());
        }
    }

    fn controller() -> RunController<MemoryStore, RecordingFrontend> {
        RunController::new(
            MemoryStore::new(),
            RecordingFrontend::default(),
            Settings::default(),
        )
    }

    fn started() -> RunController<MemoryStore, RecordingFrontend> {
        let mut game = controller();
        game.start_run(1, DEFAULT_VEHICLE_ID).unwrap();
        game
    }

    #[test]
    fn test_stars_boundaries() {
        let finish_x = 2600.0;
        assert_eq!(compute_stars(finish_x * 0.8, finish_x, false), 2);
        assert_eq!(compute_stars(2079.0, finish_x, false), 1);
        assert_eq!(compute_stars(0.0, finish_x, false), 1);
        assert_eq!(compute_stars(10.0, finish_x, true), 3);
        assert_eq!(compute_stars(finish_x, finish_x, true), 3);
    }

    #[test]
    fn test_start_unknown_level_fails_cleanly() {
        let mut game = controller();
        assert_eq!(
            game.start_run(99, DEFAULT_VEHICLE_ID),
            Err(GameError::UnknownLevel(99))
        );
        assert_eq!(game.phase(), RunPhase::Idle);
        assert!(game.world().is_empty());
        assert_eq!(game.store().writes, 0);
    }

    #[test]
    fn test_start_locked_vehicle_fails() {
        let mut game = controller();
        assert_eq!(
            game.start_run(1, "tank"),
            Err(GameError::VehicleLocked("tank".to_string()))
        );
        assert!(matches!(
            game.start_run(1, "hovercraft"),
            Err(GameError::UnknownVehicle(_))
        ));
        assert_eq!(game.phase(), RunPhase::Idle);
    }

    #[test]
    fn test_locked_level_is_refused() {
        let mut game = controller();
        assert_eq!(
            game.start_run(30, DEFAULT_VEHICLE_ID),
            Err(GameError::LevelLocked(30))
        );
        assert_eq!(game.select_level(4), Err(GameError::LevelLocked(4)));
        assert_eq!(game.phase(), RunPhase::Idle);
        assert!(game.world().is_empty());
        assert_eq!(game.store().writes, 0);
        assert_eq!(game.selected_level(), 1);

        // Two stars on level 3 open level 4
        game.save.set_level_stars(3, 2);
        game.select_level(4).unwrap();
        game.start_selected().unwrap();
        assert_eq!(game.run_state().unwrap().level_id, 4);
    }

    #[test]
    fn test_rewarded_grants_persist() {
        let mut game = controller();
        assert_eq!(game.grant_vehicle("tank"), Ok(true));
        assert_eq!(game.grant_vehicle("tank"), Ok(false));
        assert_eq!(game.grant_coins(50), 50);
        assert_eq!(game.grant_coins(50), 100);
        assert!(matches!(
            game.grant_vehicle("hovercraft"),
            Err(GameError::UnknownVehicle(_))
        ));

        let reloaded = SaveData::load_from(game.store());
        assert!(reloaded.is_vehicle_unlocked("tank"));
        assert_eq!(reloaded.coins(), 100);
        game.start_run(1, "tank").unwrap();
    }

    #[test]
    fn test_start_builds_run() {
        let game = started();
        assert_eq!(game.phase(), RunPhase::Running);
        assert_eq!(game.world().count_role(BodyRole::Chassis), 1);
        assert_eq!(game.world().count_role(BodyRole::Wheel), 2);
        assert_eq!(game.world().count_role(BodyRole::Finish), 1);
        let state = game.run_state().unwrap();
        assert_eq!(state.fuel, 100.0);
        assert_eq!(state.boost, 0.0);
        assert!(game.frontend().engine_running);
    }

    #[test]
    fn test_upgrades_apply_at_start() {
        let mut game = controller();
        game.save.set_coins(1000);
        game.purchase_upgrade(DEFAULT_VEHICLE_ID, UpgradeTrack::Fuel).unwrap();
        game.start_run(1, DEFAULT_VEHICLE_ID).unwrap();
        assert!((game.run_state().unwrap().fuel - 110.0).abs() < 1e-4);
    }

    #[test]
    fn test_update_feeds_frontend() {
        let mut game = started();
        let mut keys = KeyState::default();
        keys.set_key("ArrowRight", true);
        for _ in 0..10 {
            game.update(DT, &keys);
        }
        let frontend = game.frontend();
        assert_eq!(frontend.renders, 10);
        assert_eq!(frontend.huds.len(), 10);
        let hud = frontend.huds.last().unwrap();
        assert!(hud.fuel < 100.0);
        assert_eq!(hud.fuel_max, 100.0);
        assert_eq!(hud.boost_max, BOOST_MAX);
        // Boost is empty, so holding it does nothing
        assert!(!frontend.sounds.contains(&Sound::Boost));
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut game = started();
        game.update(1.0, &KeyState::default());
        let elapsed = game.run_state().unwrap().elapsed;
        assert!((elapsed - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_pause_stops_ticks() {
        let mut game = started();
        assert!(game.pause());
        assert!(!game.pause());
        assert_eq!(game.update(DT, &Autopilot), None);
        assert_eq!(game.run_state().unwrap().elapsed, 0.0);
        assert_eq!(game.frontend().renders, 0);

        assert!(game.resume());
        game.update(DT, &Autopilot);
        assert!(game.run_state().unwrap().elapsed > 0.0);
    }

    #[test]
    fn test_fuel_out_ends_run() {
        let mut game = started();
        game.save.set_coins(50);
        {
            let run = game.run.as_mut().unwrap();
            run.state.fuel = 0.001;
            run.state.coins_collected = 7;
        }
        let summary = game.update(DT, &KeyState::default()).unwrap();

        assert_eq!(game.phase(), RunPhase::GameOver);
        assert_eq!(summary.event.cause, EndCause::Fuel);
        assert_eq!(summary.event.stars, 1);
        assert_eq!(summary.event.coins_earned, 7);
        assert_eq!(summary.total_coins, 57);
        assert_eq!(game.save_data().coins(), 57);
        assert_eq!(game.save_data().level_stars(1), 1);

        let frontend = game.frontend();
        assert_eq!(frontend.events.len(), 1);
        assert_eq!(frontend.sounds.last(), Some(&Sound::Crash));
        assert!(!frontend.engine_running);

        // Progress reached the store
        let reloaded = SaveData::load_from(game.store());
        assert_eq!(reloaded.coins(), 57);

        // No more ticks after the end
        assert_eq!(game.update(DT, &Autopilot), None);
        assert_eq!(game.frontend().events.len(), 1);
    }

    #[test]
    fn test_reaching_finish_gives_three_stars() {
        let mut game = started();
        let layout = generate_terrain(level_by_id(1).unwrap());
        let p = EffectiveVehicle::stock(vehicle_by_id(DEFAULT_VEHICLE_ID).unwrap()).physical;
        {
            // Wheels on the ground a short drive before the line
            let run = game.run.as_ref().unwrap();
            let x = run.state.finish_x - 100.0;
            let y = layout.surface_y(x) - p.wheel_radius - p.wheel_y_offset;
            run.rig.set_pose(&mut game.world, Vec2::new(x, y), 0.0);
        }
        let mut keys = KeyState::default();
        keys.set_key("ArrowRight", true);
        let mut summary = None;
        for _ in 0..300 {
            summary = game.update(DT, &keys);
            if summary.is_some() {
                break;
            }
        }
        let summary = summary.unwrap();
        assert!(summary.event.reached_finish);
        assert_eq!(summary.event.cause, EndCause::Finish);
        assert_eq!(summary.event.stars, 3);
        assert_eq!(summary.event.level_name, "Country Road");
        assert_eq!(game.save_data().level_stars(1), 3);
        assert!(game.save_data().best_distance(1) >= 2500.0);
        assert_eq!(game.frontend().sounds.last(), Some(&Sound::Win));
    }

    #[test]
    fn test_stars_never_drop() {
        let mut game = started();
        game.save.set_level_stars(1, 3);
        game.run.as_mut().unwrap().state.fuel = 0.001;
        let summary = game.update(DT, &KeyState::default()).unwrap();
        assert_eq!(summary.event.stars, 1);
        assert_eq!(game.save_data().level_stars(1), 3);
    }

    #[test]
    fn test_restart_rebuilds_world() {
        let mut game = started();
        let bodies = game.world().len();
        game.run.as_mut().unwrap().state.fuel = 0.001;
        game.update(DT, &KeyState::default());
        assert_eq!(game.phase(), RunPhase::GameOver);

        game.restart().unwrap();
        assert_eq!(game.phase(), RunPhase::Running);
        assert_eq!(game.world().len(), bodies);
        assert_eq!(game.run_state().unwrap().fuel, 100.0);
        assert_eq!(game.selected_level(), 1);
    }

    #[test]
    fn test_quit_clears_world() {
        let mut game = started();
        game.quit();
        assert_eq!(game.phase(), RunPhase::Idle);
        assert!(game.world().is_empty());
        assert!(game.run_state().is_none());
        assert!(!game.frontend().engine_running);
    }

    #[test]
    fn test_selection_is_remembered() {
        let mut game = controller();
        game.save.set_level_stars(4, 2);
        game.select_level(5).unwrap();
        game.select_vehicle("dirt_bike").unwrap();
        assert_eq!(game.select_level(77), Err(GameError::UnknownLevel(77)));
        assert_eq!(
            game.select_vehicle("tank"),
            Err(GameError::VehicleLocked("tank".to_string()))
        );

        let reloaded = SaveData::load_from(game.store());
        assert_eq!(reloaded.last_selected_level, 5);
        assert_eq!(reloaded.last_selected_vehicle, "dirt_bike");

        game.start_selected().unwrap();
        assert_eq!(game.run_state().unwrap().vehicle.id, "dirt_bike");
        assert_eq!(game.run_state().unwrap().level_id, 5);
    }

    #[test]
    fn test_hud_includes_banked_coins() {
        let mut game = started();
        game.save.set_coins(40);
        game.run.as_mut().unwrap().state.coins_collected = 3;
        assert_eq!(game.hud().unwrap().coins, 43);
    }

    #[test]
    fn test_autopilot_run_ends() {
        let mut game = started();
        let mut summary = None;
        for _ in 0..(60 * 700) {
            summary = game.update(DT, &Autopilot);
            if summary.is_some() {
                break;
            }
        }
        let summary = summary.unwrap();
        assert_eq!(game.phase(), RunPhase::GameOver);
        // The first level is gentle enough to drive most of the way
        assert!(summary.event.distance > 2000.0, "distance = {}", summary.event.distance);
        assert!(summary.event.stars >= 2);
        assert!(game.frontend().events.len() == 1);
    }
}
