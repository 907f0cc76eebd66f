//! Trajectory prediction for the ship.
//!
//! This module forecasts where the ship will go by integrating a disposable
//! copy of its state through the gravity field. The forecast is truncated at
//! the first segment that runs into an obstruction, so a renderer can draw
//! a line that ends exactly on the surface it will hit.

use bevy::math::DVec2;
use bevy::prelude::*;

use crate::physics::{GravityField, GravityWell, acceleration_for_mass, semi_implicit_euler};
use crate::terrain::{Obstruction, Terrain};
use crate::types::{BodyState, Ship};

/// Plugin providing trajectory prediction functionality.
pub struct PredictionPlugin;

impl Plugin for PredictionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PredictionSettings>()
            .add_systems(Update, update_predicted_paths);
    }
}

/// Configuration for trajectory prediction.
#[derive(Resource, Clone, Debug)]
pub struct PredictionSettings {
    /// Simulated time per integration step (seconds).
    pub step_duration: f64,
    /// Number of points in an unobstructed forecast, including the start.
    pub step_count: usize,
    /// Clear forecasts that never hit anything.
    pub only_show_obstructed: bool,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            step_duration: 0.1,
            step_count: 100,
            only_show_obstructed: true,
        }
    }
}

/// Prediction-only copy of a body's state.
///
/// Created fresh for each prediction pass and discarded afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimBody {
    pub pos: DVec2,
    pub vel: DVec2,
    pub mass: f64,
}

impl From<&BodyState> for SimBody {
    fn from(state: &BodyState) -> Self {
        Self {
            pos: state.pos,
            vel: state.vel,
            mass: state.mass,
        }
    }
}

/// Forecast path of a body.
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct PredictedPath {
    /// Positions in order, starting with the body's current position.
    pub points: Vec<DVec2>,
    /// Whether the path was cut short by an obstruction. When set, the last
    /// point is the exact obstruction point.
    pub obstructed: bool,
}

impl PredictedPath {
    /// Final point of the forecast, if any.
    pub fn end(&self) -> Option<DVec2> {
        self.points.last().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.obstructed = false;
    }
}

/// Integrate `body` through the field for up to `step_count` points.
///
/// Uses the same semi-implicit Euler step as the live integrator. The first
/// point is always the initial position. Each new segment is checked with
/// `obstruction` before it is accepted; a blocked segment contributes the
/// obstruction point as the final point and ends the forecast.
///
/// Prediction never touches live state: `body` is consumed by value.
pub fn predict_path<P, O>(
    field: &GravityField,
    position_of: P,
    body: SimBody,
    step_duration: f64,
    step_count: usize,
    obstruction: &O,
) -> PredictedPath
where
    P: Fn(Entity) -> Option<DVec2>,
    O: Obstruction + ?Sized,
{
    let mut path = PredictedPath {
        points: Vec::with_capacity(step_count),
        obstructed: false,
    };

    if step_count == 0 {
        return path;
    }

    path.points.push(body.pos);

    if !(body.mass > 0.0 && body.mass.is_finite()) {
        warn!("Cannot predict path for body with mass {}", body.mass);
        return path;
    }
    if !(step_duration > 0.0 && step_duration.is_finite()) {
        warn!("Cannot predict path with step duration {}", step_duration);
        return path;
    }

    let mut pos = body.pos;
    let mut vel = body.vel;

    for _ in 1..step_count {
        let prev = pos;

        let acc = acceleration_for_mass(field.sample_acceleration(pos, &position_of), body.mass);
        (pos, vel) = semi_implicit_euler(pos, vel, acc, step_duration);

        let segment = pos - prev;
        let distance = segment.length();
        if distance > 0.0 {
            let direction = segment / distance;
            if let Some(hit) = obstruction.obstruct(prev, direction, distance) {
                path.points.push(hit);
                path.obstructed = true;
                break;
            }
        }

        path.points.push(pos);
    }

    path
}

/// Recompute the forecast of every ship from a snapshot of its state.
fn update_predicted_paths(
    mut commands: Commands,
    mut ships: Query<(Entity, &BodyState, Option<&mut PredictedPath>), With<Ship>>,
    wells: Query<&BodyState, With<GravityWell>>,
    field: Res<GravityField>,
    terrain: Res<Terrain>,
    settings: Res<PredictionSettings>,
) {
    let position_of = |owner: Entity| wells.get(owner).ok().map(|body| body.pos);

    for (entity, state, existing) in ships.iter_mut() {
        let mut path = predict_path(
            &field,
            position_of,
            SimBody::from(state),
            settings.step_duration,
            settings.step_count,
            &*terrain,
        );

        if settings.only_show_obstructed && !path.obstructed {
            path.clear();
        }

        match existing {
            Some(mut current) => {
                if *current != path {
                    *current = path;
                }
            }
            None => {
                commands.entity(entity).insert(path);
            }
        }
    }
}
