//! Particle kinematic state and the single-particle integration step.
//!
//! Each particle carries its own clock stamp so the integration delta is
//! derived from the global clock value it is updated with, not from a
//! fixed timestep.
//!
//! # Example
//!
//! ```
//! use gridswarm::{Particle, Vec3};
//!
//! let mut p = Particle::new(Vec3::ZERO, 0.0);
//! p.set_velocity(Vec3::X);
//! p.set_acceleration(Vec3::Y);
//! p.update(2.0);
//!
//! assert_eq!(p.position(), Vec3::new(2.0, 0.0, 0.0));
//! assert_eq!(p.velocity(), Vec3::new(1.0, 2.0, 0.0));
//! ```

use glam::{Vec3, Vec4};

/// Divisor mapping distance from the origin to the red color channel.
pub const COLOR_DISTANCE_SCALE: f32 = 150.0;

/// Color every particle starts with (green with a touch of blue, opaque).
pub const INITIAL_COLOR: Vec4 = Vec4::new(0.0, 1.0, 0.3, 1.0);

/// A single particle advected by the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    position: Vec3,
    velocity: Vec3,
    acceleration: Vec3,
    /// Channel 0 is derived from position on every update.
    color: Vec4,
    last_update_time: f32,
}

impl Particle {
    /// Create a particle at rest at `position`, stamped with clock value `time`.
    pub fn new(position: Vec3, time: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            color: INITIAL_COLOR,
            last_update_time: time,
        }
    }

    /// Builder-style initial acceleration.
    pub fn with_acceleration(mut self, acceleration: Vec3) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Advance this particle to clock value `new_time`.
    ///
    /// Semi-implicit ordering: position moves with the velocity from before
    /// this call, then velocity takes the acceleration, both over the same
    /// delta. Afterwards the red channel is set to
    /// `|position| / COLOR_DISTANCE_SCALE` and the color is renormalized.
    pub fn update(&mut self, new_time: f32) {
        let delta_time = new_time - self.last_update_time;
        self.last_update_time = new_time;

        self.position += self.velocity * delta_time;
        self.velocity += self.acceleration * delta_time;

        self.color.x = self.position.length() / COLOR_DISTANCE_SCALE;
        self.color = self.color.normalize_or_zero();
    }

    /// World-space position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Velocity in world units per clock tick.
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Acceleration applied on the next update.
    #[inline]
    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    /// RGBA color, unit length after the first update unless it collapsed to zero.
    #[inline]
    pub fn color(&self) -> Vec4 {
        self.color
    }

    /// Clock value of the last [`update`](Self::update).
    #[inline]
    pub fn last_update_time(&self) -> f32 {
        self.last_update_time
    }

    /// Overwrite the acceleration; the force policy calls this every tick.
    pub fn set_acceleration(&mut self, acceleration: Vec3) {
        self.acceleration = acceleration;
    }

    /// Overwrite the velocity.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Move the particle without touching its velocity.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Whether every kinematic and color component is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.acceleration.is_finite()
            && self.color.is_finite()
    }

    /// Put the particle back at the origin at rest, keeping its clock stamp.
    ///
    /// The color restarts from [`INITIAL_COLOR`], renormalized like any
    /// updated color so the output buffer only ever carries unit colors.
    pub(crate) fn reset_kinematics(&mut self) {
        self.position = Vec3::ZERO;
        self.velocity = Vec3::ZERO;
        self.acceleration = Vec3::ZERO;
        self.color = INITIAL_COLOR.normalize_or_zero();
    }
}
