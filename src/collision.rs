//! Collision response between the ship hull and moon surfaces.
//!
//! The ship's hull is a circle. When it sinks into a surface it is pushed
//! back out, the inward velocity is removed and sliding is damped. The
//! first tick of every new contact sends an [`ImpactMessage`] with the
//! relative speed, which the landing session uses for crash detection and
//! landing quality.

use bevy::math::DVec2;
use bevy::prelude::*;

use crate::contact::sample_ship_contact;
use crate::terrain::Terrain;
use crate::types::{BodyState, Kinematic, SimulationSet};

/// Message sent when a hull starts touching a surface.
#[derive(Message, Clone, Debug)]
pub struct ImpactMessage {
    /// Body that collided.
    pub entity: Entity,
    /// Speed relative to the (static) surface at the moment of contact.
    pub relative_speed: f64,
    /// Surface point under the hull.
    pub contact_point: DVec2,
}

/// Collision shape of a body.
#[derive(Component, Clone, Copy, Debug)]
#[require(HullContact)]
pub struct Hull {
    pub radius: f64,
    /// Tangential damping rate while touching (per second).
    pub friction: f64,
}

impl Default for Hull {
    fn default() -> Self {
        Self {
            radius: 0.85,
            friction: 2.0,
        }
    }
}

/// Whether the hull touched a surface on the previous tick.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct HullContact {
    pub touching: bool,
}

/// Plugin providing hull collision response.
pub struct CollisionPlugin;

impl Plugin for CollisionPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ImpactMessage>().add_systems(
            FixedUpdate,
            resolve_surface_contacts
                .in_set(SimulationSet::Contact)
                .before(sample_ship_contact),
        );
    }
}

/// Result of pushing a hull out of the terrain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub pos: DVec2,
    pub vel: DVec2,
    pub contact_point: DVec2,
}

/// Push a hull out of every surface it overlaps.
///
/// Returns `None` when the hull touches nothing.
pub fn resolve_hull(terrain: &Terrain, hull: &Hull, pos: DVec2, vel: DVec2, dt: f64) -> Option<Resolution> {
    let mut pos = pos;
    let mut vel = vel;
    let mut contact_point = None;

    for surface in terrain.surfaces() {
        let offset = pos - surface.center;
        let penetration = surface.radius + hull.radius - offset.length();
        if penetration <= 0.0 {
            continue;
        }

        let normal = offset.try_normalize().unwrap_or(DVec2::Y);
        pos += normal * penetration;

        let inward = vel.dot(normal);
        if inward < 0.0 {
            vel -= normal * inward;
        }

        let along = normal * vel.dot(normal);
        let damping = (1.0 - hull.friction * dt).max(0.0);
        vel = along + (vel - along) * damping;

        contact_point = Some(surface.center + normal * surface.radius);
    }

    contact_point.map(|contact_point| Resolution { pos, vel, contact_point })
}

/// Resolve hull penetration and report new contacts.
pub(crate) fn resolve_surface_contacts(
    mut bodies: Query<(Entity, &Hull, &mut HullContact, &mut BodyState), Without<Kinematic>>,
    terrain: Res<Terrain>,
    time: Res<Time>,
    mut impacts: MessageWriter<ImpactMessage>,
) {
    let dt = time.delta_secs_f64();

    for (entity, hull, mut contact, mut body) in bodies.iter_mut() {
        let Some(resolution) = resolve_hull(&terrain, hull, body.pos, body.vel, dt) else {
            contact.touching = false;
            continue;
        };

        if !contact.touching {
            let relative_speed = body.speed();
            debug!("Impact for {:?} at {:.3}", entity, relative_speed);
            impacts.write(ImpactMessage {
                entity,
                relative_speed,
                contact_point: resolution.contact_point,
            });
        }

        contact.touching = true;
        body.pos = resolution.pos;
        body.vel = resolution.vel;
    }
}
