//! Hill Climb entry point
//!
//! The browser build starts from `web::start`. Natively this runs one headless
//! autopilot run on a profile that has cleared every earlier level and owns
//! the vehicle, and prints the run-ended payload:
//!
//! ```text
//! hill-climb [LEVEL_ID] [VEHICLE_ID]
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use hill_climb::persistence::{MemoryStore, SaveData};
    use hill_climb::platform::{Autopilot, NullFrontend};
    use hill_climb::vehicles::DEFAULT_VEHICLE_ID;
    use hill_climb::{RunController, Settings};

    /// Simulated frame length
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Give up after this many simulated seconds
    const MAX_SECONDS: u32 = 15 * 60;

    env_logger::init();
    log::info!("Hill Climb (native) starting...");

    let mut args = std::env::args().skip(1);
    let level_id = match args.next().map(|a| a.parse::<u32>()) {
        None => 1,
        Some(Ok(id)) => id,
        Some(Err(e)) => {
            eprintln!("invalid level id: {}", e);
            eprintln!("usage: hill-climb [LEVEL_ID] [VEHICLE_ID]");
            std::process::exit(2);
        }
    };
    let vehicle_id = args.next().unwrap_or_else(|| DEFAULT_VEHICLE_ID.to_string());

    let mut store = MemoryStore::new();
    let mut profile = SaveData::default();
    for id in 1..level_id {
        profile.set_level_stars(id, 3);
    }
    // Unknown ids are reported by start_run below
    let _ = profile.grant_vehicle(&vehicle_id);
    if let Err(e) = profile.save_to(&mut store) {
        log::error!("Cannot seed profile: {}", e);
        std::process::exit(1);
    }

    let mut game = RunController::new(store, NullFrontend, Settings::default());
    if let Err(e) = game.start_run(level_id, &vehicle_id) {
        log::error!("Cannot start run: {}", e);
        std::process::exit(1);
    }

    for _ in 0..MAX_SECONDS * 60 {
        if let Some(summary) = game.update(FRAME_DT, &Autopilot) {
            match serde_json::to_string_pretty(&summary.event) {
                Ok(json) => println!("{}", json),
                Err(e) => log::error!("Failed to encode summary: {}", e),
            }
            log::info!(
                "{:.1}s simulated, {} coins banked",
                summary.elapsed,
                summary.total_coins
            );
            return;
        }
    }

    log::warn!("Run did not end within {} simulated seconds", MAX_SECONDS);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}
