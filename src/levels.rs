//! Level definitions
//!
//! Static table of all playable levels. Each level carries the parameters the
//! terrain generator needs plus a seed derived from its id, so a level always
//! produces the same hills and pickups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::LEVEL_SEED_FACTOR;
use crate::error::{GameError, GameResult};

/// Difficulty tier of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Advanced => "advanced",
        }
    }
}

/// Immutable level definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelDef {
    pub id: u32,
    pub name: &'static str,
    pub difficulty: Difficulty,
    /// Horizontal length of the track; the finish line sits at this x
    pub length: f32,
    /// Noise frequency over the normalized track position
    pub terrain_frequency: f32,
    /// Peak height deviation from the baseline
    pub terrain_amplitude: f32,
    /// Per-step spawn probabilities
    pub coin_density: f32,
    pub fuel_density: f32,
    pub boost_density: f32,
    /// Gravity scalar (1.0 = standard)
    pub gravity: f32,
    /// Visual theme tag for the renderer
    pub theme: &'static str,
    pub seed: u32,
}

#[allow(clippy::too_many_arguments)]
const fn level(
    id: u32,
    name: &'static str,
    difficulty: Difficulty,
    length: f32,
    terrain_frequency: f32,
    terrain_amplitude: f32,
    coin_density: f32,
    fuel_density: f32,
    boost_density: f32,
    gravity: f32,
    theme: &'static str,
) -> LevelDef {
    LevelDef {
        id,
        name,
        difficulty,
        length,
        terrain_frequency,
        terrain_amplitude,
        coin_density,
        fuel_density,
        boost_density,
        gravity,
        theme,
        seed: id.wrapping_mul(LEVEL_SEED_FACTOR),
    }
}

use Difficulty::*;

/// All levels, ordered by id
pub static LEVELS: [LevelDef; 30] = [
    level(1, "Country Road", Easy, 2600.0, 0.7, 80.0, 0.18, 0.09, 0.05, 1.2, "pastelFields"),
    level(2, "Grassy Hill", Easy, 2700.0, 0.8, 90.0, 0.2, 0.09, 0.05, 1.2, "pastelHills"),
    level(3, "Sunny Beach", Easy, 2600.0, 0.6, 60.0, 0.19, 0.1, 0.05, 1.1, "beach"),
    level(4, "Farm Fields", Easy, 2600.0, 0.7, 70.0, 0.18, 0.09, 0.05, 1.2, "farm"),
    level(5, "Seaside Cliffs", Easy, 2800.0, 0.9, 100.0, 0.17, 0.08, 0.05, 1.2, "cliffs"),
    level(6, "Meadow Run", Easy, 2600.0, 0.7, 70.0, 0.18, 0.09, 0.05, 1.2, "meadow"),
    level(7, "Rolling Plains", Easy, 2700.0, 0.8, 90.0, 0.17, 0.09, 0.05, 1.2, "plains"),
    level(8, "Orchard Path", Easy, 2600.0, 0.7, 70.0, 0.18, 0.09, 0.05, 1.2, "orchard"),
    level(9, "Lakeside Drive", Easy, 2700.0, 0.7, 70.0, 0.18, 0.08, 0.05, 1.2, "lake"),
    level(10, "Gentle Forest", Easy, 2800.0, 0.8, 80.0, 0.17, 0.08, 0.05, 1.2, "forest"),
    level(11, "Rocky Mountain", Normal, 3200.0, 1.1, 120.0, 0.15, 0.07, 0.05, 1.3, "mountain"),
    level(12, "Desert Dunes", Normal, 3300.0, 1.0, 140.0, 0.15, 0.07, 0.06, 1.2, "desert"),
    level(13, "Jungle Trail", Normal, 3200.0, 1.0, 110.0, 0.15, 0.07, 0.05, 1.3, "jungle"),
    level(14, "Snowy Pass", Normal, 3200.0, 1.0, 120.0, 0.14, 0.06, 0.05, 1.25, "snow"),
    level(15, "Canyon Run", Normal, 3300.0, 1.1, 130.0, 0.14, 0.06, 0.05, 1.3, "canyon"),
    level(16, "Volcanic Ridge", Normal, 3400.0, 1.2, 140.0, 0.13, 0.06, 0.06, 1.35, "volcano"),
    level(17, "Arctic Tundra", Normal, 3400.0, 1.1, 130.0, 0.13, 0.06, 0.05, 1.2, "arctic"),
    level(18, "Rainforest Rush", Normal, 3300.0, 1.0, 120.0, 0.14, 0.06, 0.06, 1.3, "rainforest"),
    level(19, "Muddy Swamp", Normal, 3200.0, 1.0, 120.0, 0.15, 0.07, 0.06, 1.3, "swamp"),
    level(20, "Stormy Cliffs", Normal, 3500.0, 1.1, 140.0, 0.13, 0.05, 0.06, 1.35, "storm"),
    level(21, "Asteroid Field", Hard, 3800.0, 1.4, 170.0, 0.11, 0.05, 0.07, 0.8, "asteroid"),
    level(22, "Underground Cave", Hard, 3600.0, 1.3, 160.0, 0.11, 0.05, 0.07, 1.4, "cave"),
    level(23, "Underwater Tunnel", Hard, 3600.0, 1.2, 150.0, 0.11, 0.05, 0.07, 0.7, "underwater"),
    level(24, "Space Launch", Hard, 3800.0, 1.4, 170.0, 0.10, 0.05, 0.07, 0.6, "space"),
    level(25, "Lava World", Hard, 3800.0, 1.4, 170.0, 0.10, 0.05, 0.07, 1.5, "lava"),
    level(26, "Nightmare Highway", Advanced, 4000.0, 1.5, 180.0, 0.09, 0.04, 0.08, 1.3, "nightmare"),
    level(27, "Chaos Canyon", Advanced, 4000.0, 1.5, 180.0, 0.09, 0.04, 0.08, 1.4, "chaos"),
    level(28, "Zero Gravity Moon", Advanced, 4000.0, 1.5, 180.0, 0.09, 0.04, 0.08, 0.4, "moon"),
    level(29, "Inferno Descent", Advanced, 4000.0, 1.5, 190.0, 0.09, 0.04, 0.08, 1.6, "inferno"),
    level(30, "The Final Summit", Advanced, 4200.0, 1.6, 200.0, 0.08, 0.04, 0.08, 1.5, "final"),
];

/// Look up a level by id
pub fn level_by_id(id: u32) -> GameResult<&'static LevelDef> {
    LEVELS
        .iter()
        .find(|l| l.id == id)
        .ok_or(GameError::UnknownLevel(id))
}

/// Whether a level can be played given the stars earned so far.
///
/// The first three levels are always open. Later levels open once the
/// previous level has two stars, or once the stars collected on all earlier
/// levels add up to at least the level's id.
pub fn is_level_unlocked(id: u32, level_stars: &BTreeMap<u32, u8>) -> bool {
    if id <= 3 {
        return true;
    }
    let prev_stars = level_stars.get(&(id - 1)).copied().unwrap_or(0);
    let total_before: u32 = level_stars
        .iter()
        .filter(|(level_id, _)| **level_id < id)
        .map(|(_, stars)| *stars as u32)
        .sum();
    prev_stars >= 2 || total_before >= id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_derived_from_id() {
        let level = level_by_id(1).unwrap();
        assert_eq!(level.seed, 9973);
        assert_eq!(level_by_id(30).unwrap().seed, 30 * 9973);
    }

    #[test]
    fn test_ids_are_contiguous() {
        for (i, level) in LEVELS.iter().enumerate() {
            assert_eq!(level.id as usize, i + 1);
            assert!(level.length > 0.0);
        }
    }

    #[test]
    fn test_unknown_level_fails() {
        assert_eq!(level_by_id(99), Err(GameError::UnknownLevel(99)));
        assert_eq!(level_by_id(0), Err(GameError::UnknownLevel(0)));
    }

    #[test]
    fn test_level_unlock_rules() {
        let mut stars = BTreeMap::new();
        assert!(is_level_unlocked(1, &stars));
        assert!(is_level_unlocked(3, &stars));
        assert!(!is_level_unlocked(4, &stars));

        // Two stars on the previous level opens the next
        stars.insert(3, 2);
        assert!(is_level_unlocked(4, &stars));
        assert!(!is_level_unlocked(5, &stars));

        // Enough total stars also opens it
        stars.insert(1, 1);
        stars.insert(2, 1);
        stars.insert(4, 1);
        assert!(is_level_unlocked(5, &stars));
    }
}
