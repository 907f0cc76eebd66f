//! Multi-source gravity field with a ramped falloff law.
//!
//! Each source pulls with zero strength at its own center, ramps linearly up
//! to its peak acceleration at `influence_radius * peak_fraction`, then ramps
//! linearly back down to zero at the edge of its influence radius. The field
//! is the plain superposition of every registered source.

use std::collections::HashMap;

use bevy::math::DVec2;
use bevy::prelude::*;

/// A single gravity source attached to an external body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GravitySource {
    /// Body that owns this source. Its position is looked up on every query.
    pub owner: Entity,
    /// Maximum acceleration magnitude (reached at the peak distance).
    pub peak_acceleration: f64,
    /// Distance beyond which the source has no effect.
    pub influence_radius: f64,
    /// Fraction of `influence_radius` at which the pull is strongest.
    pub peak_fraction: f64,
}

impl GravitySource {
    pub fn new(
        owner: Entity,
        peak_acceleration: f64,
        influence_radius: f64,
        peak_fraction: f64,
    ) -> Self {
        Self {
            owner,
            peak_acceleration,
            influence_radius,
            peak_fraction,
        }
    }

    /// Distance from the source at which acceleration is maximal.
    #[inline]
    pub fn peak_distance(&self) -> f64 {
        self.influence_radius * self.peak_fraction
    }

    fn is_valid(&self) -> bool {
        self.peak_acceleration.is_finite()
            && self.peak_acceleration >= 0.0
            && self.influence_radius.is_finite()
            && self.influence_radius > 0.0
            && self.peak_fraction.is_finite()
    }

    /// Acceleration magnitude at `distance` from the source.
    ///
    /// With `peak_fraction` of exactly 0 or 1 one of the ramps has zero
    /// width; the magnitude at the peak distance is then the peak itself.
    #[inline]
    pub fn magnitude_at(&self, distance: f64) -> f64 {
        // Negated comparison also rejects NaN distances
        if !(distance <= self.influence_radius) {
            return 0.0;
        }

        let peak_distance = self.peak_distance();

        if distance <= peak_distance {
            if peak_distance > 0.0 {
                self.peak_acceleration * (distance / peak_distance)
            } else {
                self.peak_acceleration
            }
        } else {
            let span = self.influence_radius - peak_distance;
            if span > 0.0 {
                self.peak_acceleration * (1.0 - (distance - peak_distance) / span)
            } else {
                self.peak_acceleration
            }
        }
    }

    /// Acceleration this source imparts on a body at `point`, given the
    /// source's current position.
    #[inline]
    pub fn acceleration_at(&self, source_pos: DVec2, point: DVec2) -> DVec2 {
        let delta = source_pos - point;

        // Coincident points have no direction and contribute nothing
        let Some(direction) = delta.try_normalize() else {
            return DVec2::ZERO;
        };

        direction * self.magnitude_at(delta.length())
    }
}

/// Registry of gravity sources, at most one per owner.
///
/// Mutated only through [`GravityField::add_source`] and
/// [`GravityField::remove_source`]; sampled every physics step by the live
/// integrator and by trajectory prediction.
#[derive(Resource, Clone, Debug, Default)]
pub struct GravityField {
    sources: HashMap<Entity, GravitySource>,
}

impl GravityField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source, replacing any existing source with the same owner.
    ///
    /// `peak_fraction` is clamped into [0, 1]. Sources with a non-positive
    /// radius or negative strength are rejected with a warning.
    pub fn add_source(&mut self, source: GravitySource) {
        if !source.is_valid() {
            warn!(
                "Rejecting gravity source for {:?}: peak={}, radius={}, fraction={}",
                source.owner, source.peak_acceleration, source.influence_radius, source.peak_fraction
            );
            return;
        }

        let source = GravitySource {
            peak_fraction: source.peak_fraction.clamp(0.0, 1.0),
            ..source
        };

        if self.sources.insert(source.owner, source).is_some() {
            debug!("Updated gravity source for {:?}", source.owner);
        } else {
            debug!("Registered gravity source for {:?}", source.owner);
        }
    }

    /// Unregister the source owned by `owner`.
    ///
    /// Unknown owners are a no-op with a warning. Returns whether a source
    /// was removed.
    pub fn remove_source(&mut self, owner: Entity) -> bool {
        if self.sources.remove(&owner).is_some() {
            debug!("Removed gravity source for {:?}", owner);
            true
        } else {
            warn!("Gravity source for {:?} does not exist", owner);
            false
        }
    }

    /// Get the source owned by `owner`, if registered.
    pub fn get(&self, owner: Entity) -> Option<&GravitySource> {
        self.sources.get(&owner)
    }

    /// Iterate over all registered sources (unordered).
    pub fn sources(&self) -> impl Iterator<Item = &GravitySource> {
        self.sources.values()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Drop every source (level teardown).
    pub fn clear(&mut self) {
        self.sources.clear();
    }

    /// Net acceleration at `point`.
    ///
    /// `position_of` resolves a source owner to its current position. Owners
    /// that cannot be resolved are skipped with a warning, and an empty field
    /// yields zero acceleration.
    pub fn sample_acceleration<P>(&self, point: DVec2, position_of: P) -> DVec2
    where
        P: Fn(Entity) -> Option<DVec2>,
    {
        if self.sources.is_empty() {
            warn_once!("Gravity field has no sources; acceleration is zero");
            return DVec2::ZERO;
        }

        let mut acc = DVec2::ZERO;

        for source in self.sources() {
            let Some(source_pos) = position_of(source.owner) else {
                warn_once!("Gravity source owner {:?} has no position", source.owner);
                continue;
            };
            acc += source.acceleration_at(source_pos, point);
        }

        acc
    }
}
