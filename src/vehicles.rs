//! Vehicle archetypes and upgrades
//!
//! Archetypes are immutable templates. Before a run the chosen archetype is
//! combined with the player's upgrade levels into an [`EffectiveVehicle`],
//! which is the only thing the simulation reads.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

/// Vehicle category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleKind {
    Car,
    Bike,
}

/// Rating stats shown in the garage (1-10), UI only
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingStats {
    pub speed: u8,
    pub acceleration: u8,
    pub fuel_efficiency: u8,
    pub grip: u8,
    pub traction: u8,
}

/// Body and accent colors for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Palette {
    pub body: &'static str,
    pub accent: &'static str,
}

/// Stats consumed by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalStats {
    pub torque: f32,
    pub fuel_capacity: f32,
    /// Divisor applied to fuel drain (higher burns less)
    pub fuel_efficiency: f32,
    pub body_width: f32,
    pub body_height: f32,
    pub wheel_base: f32,
    pub wheel_radius: f32,
    /// Wheel center offset below the chassis center
    pub wheel_y_offset: f32,
    pub suspension_length: f32,
    pub density: f32,
}

/// Immutable vehicle template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleArchetype {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: VehicleKind,
    pub rating: RatingStats,
    pub physical: PhysicalStats,
    pub cost: u32,
    pub default_unlocked: bool,
    pub palette: Palette,
}

/// Id of the vehicle selected on a fresh save
pub const DEFAULT_VEHICLE_ID: &str = "rusty_hatchback";

#[allow(clippy::too_many_arguments)]
const fn vehicle(
    id: &'static str,
    name: &'static str,
    kind: VehicleKind,
    rating: [u8; 5],
    torque: f32,
    fuel_capacity: f32,
    cost: u32,
    default_unlocked: bool,
    dims: [f32; 6],
    density: f32,
    palette: (&'static str, &'static str),
) -> VehicleArchetype {
    let [speed, acceleration, fuel_efficiency, grip, traction] = rating;
    let [body_width, body_height, wheel_base, wheel_radius, wheel_y_offset, suspension_length] =
        dims;
    VehicleArchetype {
        id,
        name,
        kind,
        rating: RatingStats {
            speed,
            acceleration,
            fuel_efficiency,
            grip,
            traction,
        },
        physical: PhysicalStats {
            torque,
            fuel_capacity,
            fuel_efficiency: fuel_efficiency as f32,
            body_width,
            body_height,
            wheel_base,
            wheel_radius,
            wheel_y_offset,
            suspension_length,
            density,
        },
        cost,
        default_unlocked,
        palette: Palette {
            body: palette.0,
            accent: palette.1,
        },
    }
}

use VehicleKind::{Bike, Car};

/// All vehicles. `dims` is [body width, body height, wheel base, wheel radius,
/// wheel y offset, suspension length].
pub static VEHICLES: [VehicleArchetype; 20] = [
    vehicle("rusty_hatchback", "Rusty Hatchback", Car, [5, 5, 5, 5, 5], 0.030, 100.0, 0, true,
        [110.0, 35.0, 75.0, 16.0, 18.0, 26.0], 0.004, ("#c8914a", "#7a3b2e")),
    vehicle("monster_truck", "Monster Truck", Car, [3, 4, 4, 9, 9], 0.050, 80.0, 500, true,
        [104.0, 30.0, 96.0, 26.0, 30.0, 38.0], 0.007, ("#2e6fd4", "#0a1a3a")),
    vehicle("rally_racer", "Rally Racer", Car, [8, 7, 4, 4, 4], 0.042, 90.0, 900, false,
        [115.0, 30.0, 82.0, 17.0, 16.0, 28.0], 0.0038, ("#e63030", "#ff9900")),
    vehicle("muscle_car", "Muscle Car", Car, [9, 7, 3, 5, 5], 0.048, 85.0, 1100, false,
        [118.0, 32.0, 88.0, 18.0, 18.0, 27.0], 0.0045, ("#f79820", "#a04000")),
    vehicle("jeep_4x4", "Jeep 4x4", Car, [5, 5, 5, 8, 8], 0.040, 110.0, 1000, false,
        [112.0, 38.0, 80.0, 22.0, 22.0, 34.0], 0.005, ("#2a8c6e", "#0d3d2a")),
    vehicle("sports_coupe", "Sports Coupe", Car, [10, 8, 3, 5, 4], 0.046, 80.0, 1300, false,
        [120.0, 28.0, 88.0, 16.0, 14.0, 24.0], 0.0035, ("#00aaee", "#003388")),
    vehicle("dune_buggy", "Dune Buggy", Car, [7, 9, 6, 7, 7], 0.044, 90.0, 1200, false,
        [100.0, 28.0, 78.0, 22.0, 20.0, 32.0], 0.004, ("#e8c030", "#a06010")),
    vehicle("tank", "Tank", Car, [3, 3, 2, 10, 10], 0.065, 70.0, 2000, false,
        [130.0, 38.0, 90.0, 16.0, 20.0, 24.0], 0.010, ("#5a7040", "#283018")),
    vehicle("pickup_truck", "Pickup Truck", Car, [6, 6, 5, 7, 7], 0.038, 110.0, 1000, false,
        [116.0, 36.0, 84.0, 18.0, 20.0, 30.0], 0.005, ("#cc3344", "#6a0010")),
    vehicle("electric_car", "Electric Car", Car, [8, 8, 10, 6, 6], 0.044, 120.0, 1500, false,
        [112.0, 30.0, 82.0, 16.0, 15.0, 25.0], 0.0038, ("#30c8cc", "#1050aa")),
    vehicle("dirt_bike", "Dirt Bike", Bike, [7, 8, 7, 7, 6], 0.032, 70.0, 0, true,
        [70.0, 28.0, 70.0, 18.0, 18.0, 28.0], 0.003, ("#e87030", "#c02010")),
    vehicle("chopper", "Chopper", Bike, [5, 4, 5, 6, 6], 0.028, 90.0, 700, false,
        [90.0, 26.0, 90.0, 18.0, 18.0, 24.0], 0.0038, ("#c01030", "#1a0420")),
    vehicle("sport_bike", "Sport Bike", Bike, [10, 10, 5, 7, 6], 0.038, 75.0, 1600, false,
        [72.0, 26.0, 72.0, 17.0, 16.0, 26.0], 0.003, ("#1a30c0", "#00cccc")),
    vehicle("scrambler", "Scrambler", Bike, [7, 7, 7, 7, 7], 0.030, 80.0, 900, false,
        [74.0, 28.0, 72.0, 18.0, 18.0, 28.0], 0.003, ("#28a060", "#a0d030")),
    vehicle("mini_moto", "Mini Moto", Bike, [6, 8, 8, 6, 6], 0.026, 60.0, 600, false,
        [60.0, 22.0, 58.0, 14.0, 14.0, 20.0], 0.0028, ("#7050d0", "#c060ff")),
    vehicle("enduro_bike", "Enduro Bike", Bike, [7, 7, 9, 7, 7], 0.030, 100.0, 1100, false,
        [76.0, 28.0, 74.0, 20.0, 20.0, 32.0], 0.003, ("#e060a0", "#ff9060")),
    vehicle("cafe_racer", "Cafe Racer", Bike, [8, 7, 6, 8, 7], 0.032, 75.0, 1000, false,
        [74.0, 26.0, 72.0, 17.0, 16.0, 25.0], 0.0032, ("#d4aa00", "#3a5010")),
    vehicle("bmx", "BMX", Bike, [5, 8, 10, 6, 5], 0.022, 60.0, 500, false,
        [60.0, 22.0, 56.0, 15.0, 15.0, 20.0], 0.0025, ("#ff5588", "#ffbb44")),
    vehicle("cruiser_bike", "Cruiser", Bike, [6, 5, 6, 8, 8], 0.028, 90.0, 950, false,
        [88.0, 26.0, 86.0, 17.0, 17.0, 24.0], 0.0035, ("#d0c040", "#604000")),
    vehicle("supermoto", "Supermoto", Bike, [8, 8, 7, 8, 7], 0.034, 75.0, 1300, false,
        [72.0, 26.0, 70.0, 17.0, 16.0, 26.0], 0.003, ("#f0f0f0", "#2040c0")),
];

/// Look up a vehicle archetype by id
pub fn vehicle_by_id(id: &str) -> GameResult<&'static VehicleArchetype> {
    VEHICLES
        .iter()
        .find(|v| v.id == id)
        .ok_or_else(|| GameError::UnknownVehicle(id.to_string()))
}

/// Highest level of any upgrade track
pub const MAX_UPGRADE_LEVEL: u8 = 5;

/// Upgrade tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeTrack {
    Engine,
    Fuel,
    Tires,
    Suspension,
}

impl UpgradeTrack {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeTrack::Engine => "engine",
            UpgradeTrack::Fuel => "fuel",
            UpgradeTrack::Tires => "tires",
            UpgradeTrack::Suspension => "suspension",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "engine" => Some(UpgradeTrack::Engine),
            "fuel" => Some(UpgradeTrack::Fuel),
            "tires" => Some(UpgradeTrack::Tires),
            "suspension" => Some(UpgradeTrack::Suspension),
            _ => None,
        }
    }
}

/// Persistent upgrade levels for one vehicle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeLevels {
    #[serde(default)]
    pub engine: u8,
    #[serde(default)]
    pub fuel: u8,
    #[serde(default)]
    pub tires: u8,
    #[serde(default)]
    pub suspension: u8,
}

impl UpgradeLevels {
    pub fn get(&self, track: UpgradeTrack) -> u8 {
        match track {
            UpgradeTrack::Engine => self.engine,
            UpgradeTrack::Fuel => self.fuel,
            UpgradeTrack::Tires => self.tires,
            UpgradeTrack::Suspension => self.suspension,
        }
    }

    pub fn get_mut(&mut self, track: UpgradeTrack) -> &mut u8 {
        match track {
            UpgradeTrack::Engine => &mut self.engine,
            UpgradeTrack::Fuel => &mut self.fuel,
            UpgradeTrack::Tires => &mut self.tires,
            UpgradeTrack::Suspension => &mut self.suspension,
        }
    }

    /// Coins needed to buy the next level of `track`
    pub fn next_cost(&self, track: UpgradeTrack) -> Option<u32> {
        let level = self.get(track);
        (level < MAX_UPGRADE_LEVEL).then(|| 150 * (level as u32 + 1))
    }

    /// Levels above the maximum are treated as the maximum
    fn clamped(&self, track: UpgradeTrack) -> f32 {
        self.get(track).min(MAX_UPGRADE_LEVEL) as f32
    }
}

/// An archetype with upgrade multipliers applied, ready for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveVehicle {
    pub id: String,
    pub physical: PhysicalStats,
}

impl EffectiveVehicle {
    /// Apply upgrade multipliers to an archetype
    pub fn new(archetype: &VehicleArchetype, upgrades: &UpgradeLevels) -> Self {
        let mut p = archetype.physical;

        p.torque *= 1.0 + 0.10 * upgrades.clamped(UpgradeTrack::Engine);

        let fuel = upgrades.clamped(UpgradeTrack::Fuel);
        p.fuel_capacity *= 1.0 + 0.10 * fuel;
        p.fuel_efficiency *= 1.0 + 0.05 * fuel;

        // Bigger tires sit lower so the chassis keeps its ground clearance
        let radius = p.wheel_radius * (1.0 + 0.04 * upgrades.clamped(UpgradeTrack::Tires));
        p.wheel_y_offset += radius - p.wheel_radius;
        p.wheel_radius = radius;

        p.suspension_length *= 1.0 + 0.08 * upgrades.clamped(UpgradeTrack::Suspension);

        Self {
            id: archetype.id.to_string(),
            physical: p,
        }
    }

    /// Effective vehicle without upgrades
    #[cfg(test)]
    pub(crate) fn stock(archetype: &VehicleArchetype) -> Self {
        Self::new(archetype, &UpgradeLevels::default())
    }
}
