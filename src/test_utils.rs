//! Test utilities for landing and mission simulation tests.
//!
//! Provides fixtures for building gravity fields, terrain and missions, and
//! assertions for the dwell-timer invariants.

use bevy::math::DVec2;
use bevy::prelude::*;

use crate::physics::{GravityField, GravitySource};
use crate::terrain::{Surface, Terrain};

/// Fixtures for creating test worlds.
pub mod fixtures {
    use super::*;
    use crate::mission::{MissionConfig, MissionController};

    /// Spawn `n` distinct entity handles to use as gravity source owners.
    pub fn owners(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    /// A moon of radius 10 at the origin with the default well
    /// (peak 2, radius 100, fraction 0.4).
    ///
    /// Returns the field, the owner handle and the terrain.
    pub fn single_moon() -> (GravityField, Entity, Terrain) {
        let owner = owners(1)[0];
        let mut field = GravityField::new();
        field.add_source(GravitySource::new(owner, 2.0, 100.0, 0.4));

        let mut terrain = Terrain::new();
        terrain.add_surface(Surface::new(DVec2::ZERO, 10.0));

        (field, owner, terrain)
    }

    /// A three-target mission with default thresholds.
    pub fn standard_mission() -> MissionController {
        MissionController::new(MissionConfig::default(), 3)
    }
}

/// Assertions for landing bookkeeping.
pub mod assertions {
    /// Assert that a sequence of dwell readings never increases.
    ///
    /// # Panics
    /// Panics with the first offending pair.
    pub fn assert_non_increasing(readings: &[f64]) {
        for pair in readings.windows(2) {
            assert!(
                pair[1] <= pair[0] + 1e-12,
                "Dwell timer increased from {:.6} to {:.6}",
                pair[0],
                pair[1]
            );
        }
    }

    /// Assert that a sequence of dwell readings never decreases.
    ///
    /// # Panics
    /// Panics with the first offending pair.
    pub fn assert_non_decreasing(readings: &[f64]) {
        for pair in readings.windows(2) {
            assert!(
                pair[1] + 1e-12 >= pair[0],
                "Dwell timer decreased from {:.6} to {:.6}",
                pair[0],
                pair[1]
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_owners_are_distinct() {
        let handles = fixtures::owners(4);
        for (i, a) in handles.iter().enumerate() {
            for b in &handles[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_single_moon_pulls_at_peak_distance() {
        let (field, owner, terrain) = fixtures::single_moon();
        let acc = field.sample_acceleration(DVec2::new(0.0, 40.0), |o| {
            (o == owner).then_some(DVec2::ZERO)
        });
        assert_relative_eq!(acc.length(), 2.0, epsilon = 1e-12);
        assert!(terrain.overlaps(DVec2::new(0.0, 10.05), 0.1));
    }

    #[test]
    fn test_standard_mission_starts_on_first_target() {
        let mission = fixtures::standard_mission();
        assert_eq!(mission.active_target(), Some(0));
    }
}
