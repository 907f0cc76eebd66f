//! Moonhopper - lunar lander simulation core
//!
//! A library crate providing the gravity field, trajectory prediction,
//! landing detection and mission flow of a moon-hopping lander game, as
//! bevy plugins that also work as plain structs.

use bevy::prelude::*;

pub mod collision;
pub mod contact;
pub mod fuel;
pub mod landing;
pub mod mission;
pub mod outcome;
pub mod physics;
pub mod prediction;
pub mod progress;
pub mod terrain;
pub mod time;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use collision::CollisionPlugin;
use contact::ContactPlugin;
use fuel::FuelPlugin;
use landing::LandingPlugin;
use mission::MissionPlugin;
use physics::PhysicsPlugin;
use prediction::PredictionPlugin;
use terrain::TerrainPlugin;
use time::TimeControlPlugin;
use types::SimulationSet;

/// All simulation plugins, with the fixed-tick sets ordered
/// gravity, contact, landing, mission.
pub struct MoonhopperPlugin;

impl Plugin for MoonhopperPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Gravity,
                SimulationSet::Contact,
                SimulationSet::Landing,
                SimulationSet::Mission,
            )
                .chain(),
        )
        .add_plugins((
            PhysicsPlugin,
            FuelPlugin,
            TerrainPlugin,
            CollisionPlugin,
            ContactPlugin,
            LandingPlugin,
            MissionPlugin,
            TimeControlPlugin,
            PredictionPlugin,
        ));
    }
}
