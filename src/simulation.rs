//! Simulation context and the per-tick step.
//!
//! [`Simulation`] owns everything that changes between ticks: the particle
//! grid, the attraction point, the tick clock and the random source. The
//! configuration snapshot is passed in on every call, so a step is fully
//! determined by the context, the config and the seed.
//!
//! # Example
//!
//! ```
//! use gridswarm::prelude::*;
//!
//! let mut config = SimConfig { num_particles: 4, ..Default::default() };
//! config.bring_to_point = true;
//!
//! let mut sim = Simulation::new(42);
//! sim.load_scene(&config);
//!
//! let frame = sim.step(&config);
//! assert_eq!(frame.count, 16);
//! assert_eq!(frame.positions.len(), 16 * 3);
//! assert_eq!(frame.colors.len(), 16 * 4);
//! assert_eq!(sim.time(), 1.0);
//! ```

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::{SimConfig, MAX_PARTICLES_PER_SIDE};
use crate::error::MeshError;
use crate::frame::Frame;
use crate::mesh::{self, MeshLibrary};
use crate::particle::Particle;
use crate::rules::{random_direction, ForceContext, ForcePolicy};
use crate::time::FrameClock;

/// Commands issued between ticks by the control panel or the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Rebuild the grid from the config's particle count.
    LoadScene,
    /// Snap particles onto the selected mesh.
    AttractToMesh,
    /// Zero every particle's velocity.
    ResetVelocities,
    /// Flip the dispersion flag in the config.
    ToggleDisperse,
    /// Flip the bring-to-point flag in the config.
    ToggleBringToPoint,
    /// Move the attraction point to a world position.
    PointerDown(Vec3),
    /// Send the attraction point back to the origin.
    PointerUp,
}

/// The simulation context.
pub struct Simulation<R: Rng = SmallRng> {
    particles: Vec<Particle>,
    attraction_point: Vec3,
    clock: FrameClock,
    policy: ForcePolicy,
    rng: R,
    frame: Frame,
}

impl Simulation<SmallRng> {
    /// Create an empty simulation with a seeded random source.
    pub fn new(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Simulation<R> {
    /// Create an empty simulation drawing randomness from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self {
            particles: Vec::new(),
            attraction_point: Vec3::ZERO,
            clock: FrameClock::new(),
            policy: ForcePolicy::default(),
            rng,
            frame: Frame::new(),
        }
    }

    /// Replace the force policy.
    pub fn with_policy(mut self, policy: ForcePolicy) -> Self {
        self.policy = policy;
        self
    }

    // ========== Accessors ==========

    /// Particles in grid order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access to the particle array, for tools and tests.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Number of particles in the current scene.
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Current attraction point (the origin while the pointer is up).
    pub fn attraction_point(&self) -> Vec3 {
        self.attraction_point
    }

    /// Current global clock value.
    pub fn time(&self) -> f32 {
        self.clock.time()
    }

    /// The tick clock.
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Mutable tick clock, e.g. to pause the simulation.
    pub fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }

    /// The force rules applied each tick.
    pub fn policy(&self) -> &ForcePolicy {
        &self.policy
    }

    /// Output of the most recent step.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    // ========== Commands ==========

    /// Discard all particles and lay out a fresh `n × n` grid.
    ///
    /// Particle `(i, j)` sits at `(i, j, 0)` at rest. When `config.disperse`
    /// is set it starts with a random acceleration of magnitude
    /// `load_jitter`, otherwise with none.
    ///
    /// The side length is capped at [`MAX_PARTICLES_PER_SIDE`] for configs
    /// that skipped [`SimConfig::validate`].
    pub fn load_scene(&mut self, config: &SimConfig) {
        let n = config.num_particles.min(MAX_PARTICLES_PER_SIDE);
        if n < config.num_particles {
            log::warn!(
                "grid side {} exceeds {MAX_PARTICLES_PER_SIDE}, loading {n}x{n}",
                config.num_particles
            );
        }
        let time = self.clock.time();
        let jitter = config.tuning.load_jitter;

        self.particles.clear();
        self.particles.reserve((n as usize) * (n as usize));
        for i in 0..n {
            for j in 0..n {
                let acceleration = if config.disperse {
                    random_direction(&mut self.rng) * jitter
                } else {
                    Vec3::ZERO
                };
                let position = Vec3::new(i as f32, j as f32, 0.0);
                self.particles
                    .push(Particle::new(position, time).with_acceleration(acceleration));
            }
        }
        log::debug!("loaded {n}x{n} scene ({} particles)", self.particles.len());
    }

    /// Snap particles onto `vertices` in index order (see [`mesh::attract_to_mesh`]).
    pub fn attract_to_mesh(&mut self, vertices: &[glam::Vec4], config: &SimConfig) -> usize {
        let moved = mesh::attract_to_mesh(
            &mut self.particles,
            vertices,
            config.tuning.mesh_scale,
            config.tuning.mesh_damping,
        );
        log::debug!("attracted {moved} of {} particles to mesh", self.particles.len());
        moved
    }

    /// Snap particles onto the mesh the config selects.
    pub fn attract_to_selected_mesh(
        &mut self,
        config: &SimConfig,
        library: &MeshLibrary,
    ) -> Result<usize, MeshError> {
        let vertices = library.get(config.mesh_selector)?;
        Ok(self.attract_to_mesh(vertices, config))
    }

    /// Zero every particle's velocity.
    pub fn reset_velocities(&mut self) {
        for particle in &mut self.particles {
            particle.set_velocity(Vec3::ZERO);
        }
    }

    /// Move the attraction point.
    pub fn pointer_down(&mut self, point: Vec3) {
        self.attraction_point = point;
    }

    /// Return the attraction point to the origin.
    pub fn pointer_up(&mut self) {
        self.attraction_point = Vec3::ZERO;
    }

    /// Dispatch a command between ticks.
    pub fn apply(
        &mut self,
        command: Command,
        config: &mut SimConfig,
        library: &MeshLibrary,
    ) -> Result<(), MeshError> {
        match command {
            Command::LoadScene => self.load_scene(config),
            Command::AttractToMesh => {
                self.attract_to_selected_mesh(config, library)?;
            }
            Command::ResetVelocities => self.reset_velocities(),
            Command::ToggleDisperse => config.toggle_disperse(),
            Command::ToggleBringToPoint => config.toggle_bring_to_point(),
            Command::PointerDown(point) => self.pointer_down(point),
            Command::PointerUp => self.pointer_up(),
        }
        Ok(())
    }

    // ========== Tick ==========

    /// Run one tick over every particle.
    ///
    /// Each particle gets its acceleration from the force policy, is
    /// integrated to the current clock value and is appended to the output
    /// buffers in index order. The clock then advances by one. While the
    /// clock is paused the previous frame is returned untouched.
    pub fn step(&mut self, config: &SimConfig) -> &Frame {
        if self.clock.is_paused() {
            return &self.frame;
        }

        let time = self.clock.time();
        let ctx = ForceContext::new(config, self.attraction_point);

        self.frame.clear(self.particles.len());
        for particle in &mut self.particles {
            self.policy.apply(particle, &ctx, &mut self.rng);
            particle.update(time);
        }
        self.collect_frame();

        self.clock.advance();
        &self.frame
    }

    /// Parallel variant of [`step`](Self::step).
    ///
    /// One seed is drawn from the context's random source per tick; particle
    /// `i` draws from its own generator seeded with that seed and `i`, so
    /// the result depends only on the context seed, not on scheduling.
    #[cfg(feature = "parallel")]
    pub fn step_parallel(&mut self, config: &SimConfig) -> &Frame {
        use rayon::prelude::*;

        if self.clock.is_paused() {
            return &self.frame;
        }

        let time = self.clock.time();
        let ctx = ForceContext::new(config, self.attraction_point);
        let tick_seed: u64 = self.rng.gen();
        let policy = &self.policy;

        self.particles
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, particle)| {
                let mut rng = SmallRng::seed_from_u64(particle_seed(tick_seed, i));
                policy.apply(particle, &ctx, &mut rng);
                particle.update(time);
            });

        self.frame.clear(self.particles.len());
        self.collect_frame();

        self.clock.advance();
        &self.frame
    }

    /// Write every particle into the frame, resetting any that went non-finite.
    fn collect_frame(&mut self) {
        let mut resets = 0;
        for particle in &mut self.particles {
            if !particle.is_finite() {
                particle.reset_kinematics();
                resets += 1;
            }
            self.frame.push(particle.position(), particle.color());
        }
        if resets > 0 {
            log::warn!("reset {resets} non-finite particles at t={}", self.clock.time());
        }
        self.frame.resets = resets;
    }
}

/// Mix a tick seed with a particle index (splitmix64 finalizer).
#[cfg(feature = "parallel")]
fn particle_seed(tick_seed: u64, index: usize) -> u64 {
    let mut z = tick_seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn config(n: u32) -> SimConfig {
        SimConfig {
            num_particles: n,
            ..Default::default()
        }
    }

    #[test]
    fn test_load_scene_grid_layout() {
        let mut sim = Simulation::new(1);
        sim.load_scene(&config(3));

        assert_eq!(sim.particle_count(), 9);
        for i in 0..3 {
            for j in 0..3 {
                let p = &sim.particles()[i * 3 + j];
                assert_eq!(p.position(), Vec3::new(i as f32, j as f32, 0.0));
                assert_eq!(p.velocity(), Vec3::ZERO);
                assert_eq!(p.acceleration(), Vec3::ZERO);
            }
        }
    }

    #[test]
    fn test_load_scene_dispersed_acceleration() {
        let mut sim = Simulation::new(1);
        let config = SimConfig {
            num_particles: 5,
            disperse: true,
            ..Default::default()
        };
        sim.load_scene(&config);

        for p in sim.particles() {
            assert!((p.acceleration().length() - 0.001).abs() < 1e-6);
            assert_eq!(p.velocity(), Vec3::ZERO);
        }
    }

    #[test]
    fn test_load_scene_caps_oversized_grid() {
        let mut sim = Simulation::new(1);
        let mut cfg = config(200_000);
        let library = MeshLibrary::new();

        sim.apply(Command::LoadScene, &mut cfg, &library).unwrap();
        let side = MAX_PARTICLES_PER_SIDE as usize;
        assert_eq!(sim.particle_count(), side * side);
        assert_eq!(
            sim.particles().last().unwrap().position(),
            Vec3::new((side - 1) as f32, (side - 1) as f32, 0.0)
        );
    }

    #[test]
    fn test_load_scene_replaces_particles() {
        let mut sim = Simulation::new(1);
        sim.load_scene(&config(10));
        sim.load_scene(&config(2));
        assert_eq!(sim.particle_count(), 4);
    }

    #[test]
    fn test_empty_scene_step() {
        let mut sim = Simulation::new(1);
        sim.load_scene(&config(0));

        let frame = sim.step(&config(0));
        assert!(frame.is_empty());
        assert!(frame.positions.is_empty());
        assert!(frame.colors.is_empty());
        assert_eq!(sim.time(), 1.0);
    }

    #[test]
    fn test_step_uses_current_array_not_config_size() {
        let mut sim = Simulation::new(1);
        sim.load_scene(&config(3));

        // Slider moved without reloading the scene.
        let frame = sim.step(&config(50));
        assert_eq!(frame.count, 9);
    }

    #[test]
    fn test_particles_stamped_with_load_time() {
        let mut sim = Simulation::new(1);
        let cfg = config(2);
        sim.load_scene(&cfg);
        sim.step(&cfg);
        sim.step(&cfg);
        sim.load_scene(&cfg);

        assert!(sim.particles().iter().all(|p| p.last_update_time() == 2.0));
    }

    #[test]
    fn test_step_outputs_match_particles() {
        let mut sim = Simulation::new(9);
        let cfg = SimConfig {
            num_particles: 4,
            disperse: true,
            ..Default::default()
        };
        sim.load_scene(&cfg);
        for _ in 0..5 {
            sim.step(&cfg);
        }

        let frame = sim.frame();
        for (i, p) in sim.particles().iter().enumerate() {
            let v = frame.vertex_at(i).unwrap();
            assert_eq!(v.offset, p.position().to_array());
            assert_eq!(v.color, p.color().to_array());
        }
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let cfg = SimConfig {
            num_particles: 6,
            disperse: true,
            bring_to_point: true,
            ..Default::default()
        };
        let run = |seed| {
            let mut sim = Simulation::new(seed);
            sim.load_scene(&cfg);
            sim.pointer_down(Vec3::new(2.0, 2.0, 0.0));
            for _ in 0..20 {
                sim.step(&cfg);
            }
            sim.frame().clone()
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn test_pointer_moves_attraction_point() {
        let mut sim = Simulation::new(1);
        sim.pointer_down(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(sim.attraction_point(), Vec3::new(1.0, 2.0, 3.0));
        sim.pointer_up();
        assert_eq!(sim.attraction_point(), Vec3::ZERO);
    }

    #[test]
    fn test_reset_velocities() {
        let mut sim = Simulation::new(1);
        sim.load_scene(&config(2));
        for p in sim.particles_mut() {
            p.set_velocity(Vec3::ONE);
        }
        sim.reset_velocities();
        assert!(sim.particles().iter().all(|p| p.velocity() == Vec3::ZERO));
    }

    #[test]
    fn test_attract_to_selected_mesh() {
        let mut sim = Simulation::new(1);
        let cfg = config(3);
        sim.load_scene(&cfg);
        let library = MeshLibrary::new();

        let moved = sim.attract_to_selected_mesh(&cfg, &library).unwrap();
        assert_eq!(moved, 8);
        assert_eq!(sim.particles()[0].position(), Vec3::splat(-5.0));
        // Ninth particle has no vertex and stays on the grid.
        assert_eq!(sim.particles()[8].position(), Vec3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn test_apply_commands() {
        let mut sim = Simulation::new(1);
        let mut cfg = config(2);
        let mut library = MeshLibrary::new();

        sim.apply(Command::LoadScene, &mut cfg, &library).unwrap();
        assert_eq!(sim.particle_count(), 4);

        sim.apply(Command::ToggleDisperse, &mut cfg, &library).unwrap();
        sim.apply(Command::ToggleBringToPoint, &mut cfg, &library).unwrap();
        assert!(cfg.disperse && cfg.bring_to_point);

        sim.apply(Command::PointerDown(Vec3::X), &mut cfg, &library).unwrap();
        assert_eq!(sim.attraction_point(), Vec3::X);
        sim.apply(Command::PointerUp, &mut cfg, &library).unwrap();
        assert_eq!(sim.attraction_point(), Vec3::ZERO);

        cfg.mesh_selector = crate::mesh::MeshSelector::Custom;
        assert_eq!(
            sim.apply(Command::AttractToMesh, &mut cfg, &library),
            Err(MeshError::Empty(crate::mesh::MeshSelector::Custom))
        );
        library.insert(cfg.mesh_selector, vec![Vec4::new(1.0, 1.0, 1.0, 1.0)]);
        sim.apply(Command::AttractToMesh, &mut cfg, &library).unwrap();
        assert_eq!(sim.particles()[0].position(), Vec3::splat(10.0));
    }

    #[test]
    fn test_non_finite_particle_is_reset_not_fatal() {
        let mut sim = Simulation::new(1);
        let cfg = SimConfig {
            num_particles: 2,
            disperse: true,
            ..Default::default()
        };
        sim.load_scene(&cfg);
        sim.particles_mut()[1].set_velocity(Vec3::new(f32::INFINITY, 0.0, 0.0));

        let frame = sim.step(&cfg).clone();
        assert_eq!(frame.count, 4);
        assert_eq!(frame.resets, 1);
        assert!(frame.positions.iter().all(|v| v.is_finite()));
        assert_eq!(sim.particles()[1].position(), Vec3::ZERO);

        let reset = frame.vertex_at(1).unwrap();
        assert_eq!(reset.offset, [0.0; 3]);
        assert!((Vec4::from_array(reset.color).length() - 1.0).abs() < 1e-5);

        // The loop carries on normally afterwards.
        assert_eq!(sim.step(&cfg).resets, 0);
    }

    #[test]
    fn test_paused_step_keeps_state() {
        let mut sim = Simulation::new(1);
        let cfg = config(2);
        sim.load_scene(&cfg);
        sim.step(&cfg);
        sim.clock_mut().pause();
        let before = sim.particles().to_vec();
        sim.step(&cfg);
        assert_eq!(sim.particles(), &before[..]);
        assert_eq!(sim.time(), 1.0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_step_is_reproducible() {
        let cfg = SimConfig {
            num_particles: 8,
            disperse: true,
            bring_to_point: true,
            ..Default::default()
        };
        let run = || {
            let mut sim = Simulation::new(77);
            sim.load_scene(&cfg);
            for _ in 0..10 {
                sim.step_parallel(&cfg);
            }
            sim.frame().clone()
        };
        let a = run();
        assert_eq!(a, run());
        assert_eq!(a.count, 64);
    }
}
