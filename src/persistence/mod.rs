//! Player progress persistence
//!
//! Features:
//! - JSON blob compatible with the browser save key
//! - Pluggable stores (in-memory, browser LocalStorage)
//! - Corrupt or missing saves fall back to a fresh profile
//! - Bests and stars only ever go up

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::levels;
use crate::vehicles::{DEFAULT_VEHICLE_ID, UpgradeLevels, UpgradeTrack, vehicle_by_id};

/// LocalStorage key of the save blob
pub const SAVE_KEY: &str = "hillclimb_canvas_save_v1";

/// Vehicles unlocked on a fresh profile
const STARTER_VEHICLES: [&str; 3] = ["rusty_hatchback", "monster_truck", "dirt_bike"];

/// Where the save blob lives
pub trait ProgressStore {
    /// Read the raw blob, `None` if nothing was saved yet
    fn load(&self) -> GameResult<Option<String>>;

    /// Replace the raw blob
    fn save(&mut self, blob: &str) -> GameResult<()>;
}

/// Store that keeps the blob in memory (tests, native runs)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blob: Option<String>,
    /// Number of successful saves
    pub writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> GameResult<Option<String>> {
        Ok(self.blob.clone())
    }

    fn save(&mut self, blob: &str) -> GameResult<()> {
        self.blob = Some(blob.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Browser LocalStorage store
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn new() -> Self {
        Self {
            key: SAVE_KEY.to_string(),
        }
    }

    fn storage() -> GameResult<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| GameError::Storage("LocalStorage unavailable".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl ProgressStore for LocalStorageStore {
    fn load(&self) -> GameResult<Option<String>> {
        Self::storage()?
            .get_item(&self.key)
            .map_err(|_| GameError::Storage(format!("failed to read '{}'", self.key)))
    }

    fn save(&mut self, blob: &str) -> GameResult<()> {
        Self::storage()?
            .set_item(&self.key, blob)
            .map_err(|_| GameError::Storage(format!("failed to write '{}'", self.key)))
    }
}

/// Everything persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveData {
    pub coins: u32,
    pub unlocked_vehicles: BTreeMap<String, bool>,
    pub best_distances: BTreeMap<u32, f32>,
    pub level_stars: BTreeMap<u32, u8>,
    pub best_distance_overall: f32,
    pub last_selected_vehicle: String,
    pub last_selected_level: u32,
    /// Coins knocked off a vehicle's price
    pub vehicle_discounts: BTreeMap<String, u32>,
    pub upgrades: BTreeMap<String, UpgradeLevels>,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            coins: 0,
            unlocked_vehicles: STARTER_VEHICLES
                .iter()
                .map(|id| (id.to_string(), true))
                .collect(),
            best_distances: BTreeMap::new(),
            level_stars: BTreeMap::new(),
            best_distance_overall: 0.0,
            last_selected_vehicle: DEFAULT_VEHICLE_ID.to_string(),
            last_selected_level: 1,
            vehicle_discounts: BTreeMap::new(),
            upgrades: BTreeMap::new(),
        }
    }
}

impl SaveData {
    /// Load progress from a store. Missing, unreadable or corrupt saves give
    /// a fresh profile.
    pub fn load_from(store: &dyn ProgressStore) -> Self {
        match store.load() {
            Ok(Some(blob)) => match serde_json::from_str::<SaveData>(&blob) {
                Ok(data) => {
                    log::info!("Loaded save ({} coins)", data.coins);
                    data
                }
                Err(e) => {
                    log::warn!("Corrupt save, starting fresh: {}", e);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("No save found, starting fresh");
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not read save, starting fresh: {}", e);
                Self::default()
            }
        }
    }

    /// Write progress to a store
    pub fn save_to(&self, store: &mut dyn ProgressStore) -> GameResult<()> {
        let blob = serde_json::to_string(self)?;
        store.save(&blob)
    }

    // === Coins ===

    pub fn coins(&self) -> u32 {
        self.coins
    }

    /// Set the balance, clamped to the valid range
    pub fn set_coins(&mut self, value: i64) {
        self.coins = value.clamp(0, u32::MAX as i64) as u32;
    }

    /// Add (or with a negative amount, remove) coins
    pub fn add_coins(&mut self, amount: i64) {
        self.set_coins(self.coins as i64 + amount);
    }

    // === Vehicles ===

    pub fn is_vehicle_unlocked(&self, id: &str) -> bool {
        self.unlocked_vehicles.get(id).copied().unwrap_or(false)
            || vehicle_by_id(id).is_ok_and(|v| v.default_unlocked)
    }

    /// Unlock without paying (rewards). Returns `false` if it was already
    /// unlocked.
    pub fn grant_vehicle(&mut self, id: &str) -> GameResult<bool> {
        let vehicle = vehicle_by_id(id)?;
        if self.is_vehicle_unlocked(vehicle.id) {
            return Ok(false);
        }
        self.unlocked_vehicles.insert(vehicle.id.to_string(), true);
        log::info!("Granted {}", vehicle.id);
        Ok(true)
    }

    /// Current price of a vehicle after discounts
    pub fn vehicle_price(&self, id: &str) -> GameResult<u32> {
        let vehicle = vehicle_by_id(id)?;
        Ok(vehicle.cost.saturating_sub(self.vehicle_discount(id)))
    }

    /// Buy a vehicle. Returns `false` if it was already unlocked.
    pub fn unlock_vehicle(&mut self, id: &str) -> GameResult<bool> {
        let price = self.vehicle_price(id)?;
        if self.is_vehicle_unlocked(id) {
            return Ok(false);
        }
        if self.coins < price {
            return Err(GameError::InsufficientCoins {
                needed: price,
                available: self.coins,
            });
        }
        self.coins -= price;
        self.unlocked_vehicles.insert(id.to_string(), true);
        log::info!("Unlocked {} for {} coins", id, price);
        Ok(true)
    }

    pub fn vehicle_discount(&self, id: &str) -> u32 {
        self.vehicle_discounts.get(id).copied().unwrap_or(0)
    }

    // === Upgrades ===

    pub fn upgrades(&self, vehicle_id: &str) -> UpgradeLevels {
        self.upgrades.get(vehicle_id).copied().unwrap_or_default()
    }

    /// Buy the next level of an upgrade track. Returns the new level.
    pub fn purchase_upgrade(&mut self, vehicle_id: &str, track: UpgradeTrack) -> GameResult<u8> {
        let vehicle = vehicle_by_id(vehicle_id)?;
        if !self.is_vehicle_unlocked(vehicle.id) {
            return Err(GameError::VehicleLocked(vehicle.id.to_string()));
        }
        let mut levels = self.upgrades(vehicle.id);
        let cost = levels.next_cost(track).ok_or_else(|| GameError::UpgradeMaxed {
            vehicle: vehicle.id.to_string(),
            track: track.as_str(),
        })?;
        if self.coins < cost {
            return Err(GameError::InsufficientCoins {
                needed: cost,
                available: self.coins,
            });
        }
        self.coins -= cost;
        let level = levels.get_mut(track);
        *level += 1;
        let new_level = *level;
        self.upgrades.insert(vehicle.id.to_string(), levels);
        log::info!(
            "Upgraded {} {} to level {}",
            vehicle.id,
            track.as_str(),
            new_level
        );
        Ok(new_level)
    }

    // === Levels ===

    pub fn best_distance(&self, level_id: u32) -> f32 {
        self.best_distances.get(&level_id).copied().unwrap_or(0.0)
    }

    /// Record a distance; keeps the larger of the old and new values
    pub fn set_best_distance(&mut self, level_id: u32, distance: f32) {
        let best = self.best_distance(level_id).max(distance);
        self.best_distances.insert(level_id, best);
        self.best_distance_overall = self.best_distance_overall.max(distance);
    }

    pub fn level_stars(&self, level_id: u32) -> u8 {
        self.level_stars.get(&level_id).copied().unwrap_or(0)
    }

    /// Record stars; keeps the larger of the old and new values
    pub fn set_level_stars(&mut self, level_id: u32, stars: u8) {
        let best = self.level_stars(level_id).max(stars);
        self.level_stars.insert(level_id, best);
    }

    pub fn is_level_unlocked(&self, level_id: u32) -> bool {
        levels::is_level_unlocked(level_id, &self.level_stars)
    }

    pub fn set_last_selected(&mut self, level_id: u32, vehicle_id: &str) {
        self.last_selected_level = level_id;
        self.last_selected_vehicle = vehicle_id.to_string();
    }
}
