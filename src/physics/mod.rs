//! Gravity field and live body integration.
//!
//! Moons carry a [`GravityWell`] component that is mirrored into the
//! [`GravityField`] resource. Every fixed tick, bodies marked
//! [`GravityAffected`] are advanced through the field with semi-implicit
//! Euler, the same scheme trajectory prediction uses.

mod gravity;
mod integrator;

#[cfg(test)]
mod proptest_physics;

use bevy::prelude::*;

pub use gravity::{GravityField, GravitySource};
pub use integrator::{acceleration_for_mass, semi_implicit_euler};

use crate::types::{BodyState, GravityAffected, Kinematic, SimulationSet};

/// Plugin providing the gravity field and live integration.
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GravityField>().add_systems(
            FixedUpdate,
            (
                register_gravity_wells,
                unregister_gravity_wells,
                integrate_bodies,
            )
                .chain()
                .in_set(SimulationSet::Gravity),
        );
    }
}

/// Gravity parameters of a body that pulls on others.
///
/// The owning entity's [`BodyState`] position is used as the source center.
#[derive(Component, Clone, Copy, Debug)]
pub struct GravityWell {
    pub peak_acceleration: f64,
    pub influence_radius: f64,
    /// Fraction of the radius where the pull peaks, in [0, 1].
    pub peak_fraction: f64,
}

impl Default for GravityWell {
    fn default() -> Self {
        Self {
            peak_acceleration: 2.0,
            influence_radius: 100.0,
            peak_fraction: 0.4,
        }
    }
}

impl GravityWell {
    fn source_for(&self, owner: Entity) -> GravitySource {
        GravitySource::new(
            owner,
            self.peak_acceleration,
            self.influence_radius,
            self.peak_fraction,
        )
    }
}

/// Mirror new or edited wells into the field (re-registration overwrites).
fn register_gravity_wells(
    wells: Query<(Entity, &GravityWell), Changed<GravityWell>>,
    mut field: ResMut<GravityField>,
) {
    for (entity, well) in wells.iter() {
        field.add_source(well.source_for(entity));
    }
}

/// Drop sources whose well was removed or despawned.
fn unregister_gravity_wells(
    mut removed: RemovedComponents<GravityWell>,
    mut field: ResMut<GravityField>,
) {
    for entity in removed.read() {
        field.remove_source(entity);
    }
}

/// Advance every gravity-affected body by one fixed step.
///
/// Thrust and other velocity changes must be ordered before this system.
pub(crate) fn integrate_bodies(
    mut bodies: Query<
        &mut BodyState,
        (With<GravityAffected>, Without<Kinematic>, Without<GravityWell>),
    >,
    wells: Query<&BodyState, With<GravityWell>>,
    field: Res<GravityField>,
    time: Res<Time>,
) {
    let dt = time.delta_secs_f64();
    if dt <= 0.0 {
        return;
    }

    let position_of = |owner: Entity| wells.get(owner).ok().map(|body| body.pos);

    for mut body in bodies.iter_mut() {
        let field_acc = field.sample_acceleration(body.pos, position_of);
        let acc = acceleration_for_mass(field_acc, body.mass);
        let (pos, vel) = semi_implicit_euler(body.pos, body.vel, acc, dt);
        body.pos = pos;
        body.vel = vel;
    }
}
