//! Force rules deciding each particle's acceleration for the coming tick.
//!
//! Rules run in a fixed order and each one may overwrite the acceleration
//! an earlier rule assigned. Mode flags are not mutually exclusive, so the
//! last rule that applies wins:
//!
//! 1. [`ForceRule::Jitter`] - random drift. Always applies; when dispersion
//!    is off it also freezes the particle's velocity first.
//! 2. [`ForceRule::PointForce`] - steer toward the attraction point, or away
//!    from it when repelling. Applies when bring-to-point is on.
//! 3. [`ForceRule::Capture`] - a particle that reached the capture radius is
//!    slowed and re-scattered. Applies when bring-to-point is on and
//!    oscillation is off.
//!
//! Mesh targets are not a rule; see [`attract_to_mesh`](crate::mesh::attract_to_mesh).
//!
//! # Example
//!
//! ```
//! use gridswarm::{ForceContext, ForcePolicy, Particle, SimConfig, Vec3};
//! use rand::rngs::SmallRng;
//! use rand::SeedableRng;
//!
//! let config = SimConfig { bring_to_point: true, ..Default::default() };
//! let ctx = ForceContext::new(&config, Vec3::ZERO);
//! let mut rng = SmallRng::seed_from_u64(7);
//!
//! let mut p = Particle::new(Vec3::new(20.0, 0.0, 0.0), 0.0);
//! ForcePolicy::default().apply(&mut p, &ctx, &mut rng);
//!
//! assert!(p.acceleration().x < 0.0);
//! ```

use glam::Vec3;
use rand::Rng;

use crate::config::{ForceTuning, SimConfig};
use crate::particle::Particle;

/// Random unit direction drawn from the centered unit cube.
///
/// Each component is uniform in `[-0.5, 0.5)` before normalization, so the
/// distribution is biased toward the cube diagonals. A zero draw yields
/// `Vec3::ZERO`.
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.gen::<f32>() - 0.5,
        rng.gen::<f32>() - 0.5,
        rng.gen::<f32>() - 0.5,
    )
    .normalize_or_zero()
}

/// Read-only inputs shared by every particle's force evaluation in a tick.
#[derive(Clone, Copy, Debug)]
pub struct ForceContext<'a> {
    pub config: &'a SimConfig,
    pub attraction_point: Vec3,
}

impl<'a> ForceContext<'a> {
    pub fn new(config: &'a SimConfig, attraction_point: Vec3) -> Self {
        Self {
            config,
            attraction_point,
        }
    }

    #[inline]
    fn tuning(&self) -> &ForceTuning {
        &self.config.tuning
    }
}

/// A single step of the force policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForceRule {
    /// Random acceleration of magnitude `tick_jitter`.
    ///
    /// With dispersion off the velocity is zeroed before the jitter is set,
    /// which keeps idle particles hovering in place.
    Jitter,

    /// Constant-magnitude pull toward the attraction point.
    ///
    /// Direction is `attraction_point - position`, or its opposite when
    /// `repel` is set. Magnitude is `point_strength`.
    PointForce,

    /// Slow down and re-scatter particles inside `capture_radius`.
    ///
    /// Velocity is multiplied by `capture_damping` and the acceleration is
    /// replaced by fresh jitter. Disabled while oscillating, so particles
    /// keep swinging through the point.
    Capture,
}

impl ForceRule {
    /// Whether this rule runs for the given configuration.
    pub fn is_active(&self, config: &SimConfig) -> bool {
        match self {
            ForceRule::Jitter => true,
            ForceRule::PointForce => config.bring_to_point,
            ForceRule::Capture => config.bring_to_point && !config.oscillate,
        }
    }

    /// Apply this rule to one particle. Inactive rules leave it untouched.
    pub fn apply<R: Rng + ?Sized>(&self, particle: &mut Particle, ctx: &ForceContext, rng: &mut R) {
        if !self.is_active(ctx.config) {
            return;
        }
        let tuning = ctx.tuning();

        match self {
            ForceRule::Jitter => {
                if !ctx.config.disperse {
                    particle.set_velocity(Vec3::ZERO);
                }
                particle.set_acceleration(random_direction(rng) * tuning.tick_jitter);
            }
            ForceRule::PointForce => {
                let mut delta = particle.position() - ctx.attraction_point;
                if !ctx.config.repel {
                    delta = -delta;
                }
                particle.set_acceleration(delta.normalize_or_zero() * tuning.point_strength);
            }
            ForceRule::Capture => {
                let distance = particle.position().distance(ctx.attraction_point);
                if distance < tuning.capture_radius {
                    particle.set_velocity(particle.velocity() * tuning.capture_damping);
                    particle.set_acceleration(random_direction(rng) * tuning.tick_jitter);
                }
            }
        }
    }
}

/// Ordered list of force rules evaluated once per particle per tick.
#[derive(Clone, Debug, PartialEq)]
pub struct ForcePolicy {
    rules: Vec<ForceRule>,
}

impl Default for ForcePolicy {
    fn default() -> Self {
        Self {
            rules: vec![ForceRule::Jitter, ForceRule::PointForce, ForceRule::Capture],
        }
    }
}

impl ForcePolicy {
    /// Policy with a custom rule order.
    pub fn new(rules: Vec<ForceRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ForceRule] {
        &self.rules
    }

    /// Run every rule in order on `particle`.
    pub fn apply<R: Rng + ?Sized>(&self, particle: &mut Particle, ctx: &ForceContext, rng: &mut R) {
        for rule in &self.rules {
            rule.apply(particle, ctx, rng);
        }
    }
}
