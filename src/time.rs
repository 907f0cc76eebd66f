//! Global time scale and fixed-step control.
//!
//! The mission controller owns a [`TimeControl`] value; this plugin copies it
//! into bevy's virtual and fixed clocks every frame. A paused or frozen game
//! runs with a time scale of zero, which also stops the fixed tick.

use bevy::prelude::*;

use crate::mission::{MissionController, tick_mission_clock};
use crate::types::DEFAULT_FIXED_TIMESTEP;

/// Plugin applying the mission's time control to bevy's clocks.
pub struct TimeControlPlugin;

impl Plugin for TimeControlPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, apply_time_control.after(tick_mission_clock));
    }
}

/// Requested time scale and fixed simulation step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeControl {
    /// Game seconds per real second.
    pub time_scale: f64,
    /// Fixed tick length in game seconds.
    pub fixed_timestep: f64,
}

impl Default for TimeControl {
    fn default() -> Self {
        Self::normal(DEFAULT_FIXED_TIMESTEP)
    }
}

impl TimeControl {
    /// Full speed with the given fixed step.
    pub fn normal(fixed_timestep: f64) -> Self {
        Self {
            time_scale: 1.0,
            fixed_timestep,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.time_scale <= 0.0
    }
}

/// Slow-motion freeze after a mission failure.
///
/// A normalized timer runs from 0 to 1 over `duration` real seconds while the
/// time scale falls linearly from 1 to 0 and the fixed step shrinks towards
/// `frozen_step`. At the end the scale is pinned at 0 and the fixed step
/// restored; further advances do nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dilation {
    progress: f64,
    duration: f64,
    normal_step: f64,
    frozen_step: f64,
    stopped: bool,
}

impl Dilation {
    pub fn new(duration: f64, normal_step: f64, frozen_step: f64) -> Self {
        Self {
            progress: 0.0,
            duration,
            normal_step,
            frozen_step,
            stopped: false,
        }
    }

    /// Normalized progress in [0, 1].
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Advance by `real_dt` seconds and write the interpolated values.
    ///
    /// Returns true on the call that stops the sequence.
    pub fn advance(&mut self, real_dt: f64, time: &mut TimeControl) -> bool {
        if self.stopped {
            return false;
        }

        self.progress = if self.duration > 0.0 {
            (self.progress + real_dt / self.duration).min(1.0)
        } else {
            1.0
        };

        if self.progress >= 1.0 {
            self.stopped = true;
            time.time_scale = 0.0;
            time.fixed_timestep = self.normal_step;
            return true;
        }

        let t = self.progress;
        time.time_scale = 1.0 - t;
        time.fixed_timestep = self.normal_step + (self.frozen_step - self.normal_step) * t;
        false
    }
}

/// Copy the mission's time control into bevy's clocks when it changes.
fn apply_time_control(
    mission: Res<MissionController>,
    mut virtual_time: ResMut<Time<Virtual>>,
    mut fixed_time: ResMut<Time<Fixed>>,
) {
    let control = mission.time_control();

    let scale = control.time_scale.max(0.0);
    if scale.is_finite() && virtual_time.relative_speed_f64() != scale {
        virtual_time.set_relative_speed_f64(scale);
    }

    let step = control.fixed_timestep;
    if step > 0.0 && step.is_finite() && fixed_time.timestep().as_secs_f64() != step {
        fixed_time.set_timestep_seconds(step);
    }
}
