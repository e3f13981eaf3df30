//! The animated particle field.
//!
//! [`ParticleField`] owns the simulation state for one viewport and turns
//! each admitted tick into a list of render commands. Entities are plain
//! records ([`Particle`], [`Aurora`]) advanced by free functions over
//! slices. [`FieldController`] wraps a field in its mount lifecycle.

mod aurora;
mod backdrop;
mod controller;
mod governor;
mod grid;
mod particle;
mod resize;
mod seeding;

pub use aurora::{Aurora, step_aurora};
pub use backdrop::static_backdrop;
pub use controller::{FieldController, FieldState, FrameOutput};
pub use governor::{FrameGovernor, PointerThrottle, target_fps};
pub use grid::SpatialGrid;
pub use particle::{Particle, step_particle, step_particles};
pub use resize::ResizeFilter;
pub use seeding::{AuroraPreset, QualityTier, SeedPlan};

use inkfield_protocol::{GroupKind, Point, RenderCommand, Theme, ThemeToken, Viewport};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::constants::{
    CONNECTION_COLOR_ALPHA, CONNECTION_DISTANCE_SQ, CONNECTION_FADE_ALPHA, GRID_ALPHA, GRID_SPACING,
    MAX_CONNECTIONS_PER_PARTICLE, MEDIUM_VIEWPORT_WIDTH, SPATIAL_CELL_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("non-finite geometry at ({x}, {y})")]
    NonFinite { x: f64, y: f64 },
}

/// Options the host supplies when mounting a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    pub theme: Theme,
    /// Low-capability devices get the static backdrop and no simulation.
    pub low_capability: bool,
}

/// A line drawn between two particles in one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
}

impl Connection {
    /// Opacity fades linearly to zero at the connection threshold.
    pub fn alpha(&self) -> f32 {
        let fade = 1.0 - self.distance / CONNECTION_DISTANCE_SQ.sqrt();
        CONNECTION_COLOR_ALPHA * (fade.max(0.0) * CONNECTION_FADE_ALPHA) as f32
    }
}

/// Pair up nearby particles.
///
/// Each unordered pair is visited once, from its lower index. A pair is
/// only connected while both endpoints are under the per-particle cap, so
/// no particle ever ends up with more than
/// [`MAX_CONNECTIONS_PER_PARTICLE`] lines. `grid` must be current.
pub fn connect(particles: &[Particle], grid: &SpatialGrid) -> Vec<Connection> {
    let mut degree = vec![0usize; particles.len()];
    let mut out = Vec::new();

    for (i, p) in particles.iter().enumerate() {
        if degree[i] >= MAX_CONNECTIONS_PER_PARTICLE {
            continue;
        }
        for j in grid.neighbors(p.x, p.y) {
            if j <= i || degree[j] >= MAX_CONNECTIONS_PER_PARTICLE {
                continue;
            }
            let Some(q) = particles.get(j) else {
                continue;
            };
            let dx = p.x - q.x;
            let dy = p.y - q.y;
            let dist_sq = dx * dx + dy * dy;
            if dist_sq < CONNECTION_DISTANCE_SQ {
                out.push(Connection {
                    a: i,
                    b: j,
                    distance: dist_sq.sqrt(),
                });
                degree[i] += 1;
                degree[j] += 1;
                if degree[i] >= MAX_CONNECTIONS_PER_PARTICLE {
                    break;
                }
            }
        }
    }
    out
}

/// Simulation state for one viewport.
#[derive(Debug, Clone)]
pub struct ParticleField {
    viewport: Viewport,
    theme: Theme,
    plan: SeedPlan,
    particles: Vec<Particle>,
    auroras: Vec<Aurora>,
    grid: SpatialGrid,
    governor: FrameGovernor,
    pointer: Option<Point>,
    rng: StdRng,
}

impl ParticleField {
    /// Seed a field for `viewport`. The same `seed` always produces the
    /// same initial population.
    pub fn new(viewport: Viewport, theme: Theme, seed: u64) -> Self {
        let mut field = Self {
            viewport,
            theme,
            plan: SeedPlan::for_viewport(&viewport, theme),
            particles: Vec::new(),
            auroras: Vec::new(),
            grid: SpatialGrid::new(SPATIAL_CELL_SIZE),
            governor: FrameGovernor::new(),
            pointer: None,
            rng: StdRng::seed_from_u64(seed),
        };
        field.reseed(viewport);
        field
    }

    /// Drop both populations and seed fresh ones sized for `viewport`.
    pub fn reseed(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.plan = SeedPlan::for_viewport(&viewport, self.theme);
        let (particles, auroras) = self.plan.seed(&mut self.rng, &viewport);
        self.particles = particles;
        self.auroras = auroras;
        debug!(
            width = viewport.width,
            height = viewport.height,
            tier = ?self.plan.tier,
            particles = self.particles.len(),
            auroras = self.auroras.len(),
            "seeded particle field"
        );
    }

    pub fn set_pointer(&mut self, pointer: Option<Point>) {
        self.pointer = pointer;
    }

    /// Run one frame if the governor admits it.
    ///
    /// `now` is the host's frame timestamp in milliseconds. Returns `None`
    /// for skipped frames; the caller reschedules either way.
    pub fn tick(&mut self, now: f64) -> Option<Vec<RenderCommand>> {
        if !self.governor.admit(now, self.viewport.width) {
            trace!(now, "frame under budget, skipped");
            return None;
        }
        Some(self.step())
    }

    /// Advance the simulation one tick unconditionally and draw it.
    pub fn step(&mut self) -> Vec<RenderCommand> {
        let Viewport { width, height, .. } = self.viewport;
        let mut commands = Vec::with_capacity(self.particles.len() * 3 + 64);

        let bounds = self.viewport.bounds();
        commands.push(match self.theme {
            Theme::Light => RenderCommand::FillRect {
                rect: bounds,
                color: ThemeToken::Background,
                alpha: 1.0,
            },
            Theme::Dark => RenderCommand::Clear { rect: bounds },
        });

        if width > MEDIUM_VIEWPORT_WIDTH {
            reference_grid(width, height, &mut commands);
        }

        commands.push(RenderCommand::BeginGroup {
            kind: GroupKind::Auroras,
        });
        for aurora in &mut self.auroras {
            step_aurora(aurora, width, height);
            match aurora.gradient() {
                Ok(cmd) => commands.push(cmd),
                Err(err) => trace!(%err, "skipping aurora"),
            }
        }
        commands.push(RenderCommand::EndGroup);

        step_particles(&mut self.particles, width, height, self.pointer);
        self.grid.rebuild(&self.particles);

        commands.push(RenderCommand::BeginGroup {
            kind: GroupKind::Particles,
        });
        commands.extend(self.particles.iter().map(Particle::draw));
        commands.push(RenderCommand::EndGroup);

        commands.push(RenderCommand::BeginGroup {
            kind: GroupKind::Connections,
        });
        for link in connect(&self.particles, &self.grid) {
            let (a, b) = (&self.particles[link.a], &self.particles[link.b]);
            commands.push(RenderCommand::DrawLine {
                from: a.position(),
                to: b.position(),
                color: ThemeToken::Connection,
                width: 1.0,
                alpha: link.alpha(),
            });
        }
        commands.push(RenderCommand::EndGroup);

        commands
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn plan(&self) -> &SeedPlan {
        &self.plan
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn auroras(&self) -> &[Aurora] {
        &self.auroras
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }
}

fn reference_grid(width: f64, height: f64, out: &mut Vec<RenderCommand>) {
    out.push(RenderCommand::BeginGroup {
        kind: GroupKind::ReferenceGrid,
    });
    let line = |from: Point, to: Point| RenderCommand::DrawLine {
        from,
        to,
        color: ThemeToken::GridLine,
        width: 1.0,
        alpha: GRID_ALPHA,
    };
    let mut x = 0.0;
    while x <= width {
        out.push(line(Point::new(x, 0.0), Point::new(x, height)));
        x += GRID_SPACING;
    }
    let mut y = 0.0;
    while y <= height {
        out.push(line(Point::new(0.0, y), Point::new(width, y)));
        y += GRID_SPACING;
    }
    out.push(RenderCommand::EndGroup);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64) -> Particle {
        Particle {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            radius: 1.0,
            opacity: 1.0,
            target_opacity: 1.0,
        }
    }

    fn links(particles: &[Particle]) -> Vec<Connection> {
        let mut grid = SpatialGrid::new(SPATIAL_CELL_SIZE);
        grid.rebuild(particles);
        connect(particles, &grid)
    }

    #[test]
    fn dense_cluster_respects_cap() {
        let particles: Vec<Particle> = (0..12)
            .map(|i| at(100.0 + (i % 4) as f64 * 5.0, 100.0 + (i / 4) as f64 * 5.0))
            .collect();
        let connections = links(&particles);
        let mut degree = vec![0; particles.len()];
        for c in &connections {
            degree[c.a] += 1;
            degree[c.b] += 1;
        }
        assert!(degree.iter().all(|&d| d <= MAX_CONNECTIONS_PER_PARTICLE));
        assert!(!connections.is_empty());
    }

    #[test]
    fn distant_pairs_are_not_connected() {
        // 123 apart: just over sqrt(15000)
        let connections = links(&[at(10.0, 10.0), at(133.0, 10.0)]);
        assert!(connections.is_empty());
        let near = links(&[at(10.0, 10.0), at(130.0, 10.0)]);
        assert_eq!(near.len(), 1);
        assert!(near[0].alpha() > 0.0);
    }

    #[test]
    fn pairs_are_counted_once() {
        let connections = links(&[at(10.0, 10.0), at(20.0, 10.0)]);
        assert_eq!(connections.len(), 1);
        assert_eq!((connections[0].a, connections[0].b), (0, 1));
    }

    #[test]
    fn alpha_fades_with_distance() {
        let close = Connection {
            a: 0,
            b: 1,
            distance: 0.0,
        };
        assert!((close.alpha() - 0.036).abs() < 1e-6);
        let far = Connection {
            distance: CONNECTION_DISTANCE_SQ.sqrt(),
            ..close
        };
        assert_eq!(far.alpha(), 0.0);
    }

    #[test]
    fn same_seed_same_population() {
        let vp = Viewport::new(1200.0, 800.0, 1.0);
        let a = ParticleField::new(vp, Theme::Light, 42);
        let b = ParticleField::new(vp, Theme::Light, 42);
        assert_eq!(a.particles(), b.particles());
        assert_eq!(a.auroras(), b.auroras());
    }

    #[test]
    fn grid_only_on_wide_viewports() {
        let has_grid = |w: f64| {
            let mut field = ParticleField::new(Viewport::new(w, 600.0, 1.0), Theme::Light, 1);
            field.step().iter().any(|c| {
                matches!(
                    c,
                    RenderCommand::BeginGroup {
                        kind: GroupKind::ReferenceGrid
                    }
                )
            })
        };
        assert!(has_grid(1001.0));
        assert!(!has_grid(1000.0));
    }

    #[test]
    fn theme_selects_background() {
        let vp = Viewport::new(800.0, 600.0, 1.0);
        let mut light = ParticleField::new(vp, Theme::Light, 3);
        let mut dark = ParticleField::new(vp, Theme::Dark, 3);
        assert!(matches!(light.step()[0], RenderCommand::FillRect { .. }));
        assert!(matches!(dark.step()[0], RenderCommand::Clear { .. }));
    }

    #[test]
    fn tick_skips_under_budget() {
        let mut field = ParticleField::new(Viewport::new(800.0, 600.0, 1.0), Theme::Light, 9);
        assert!(field.tick(0.0).is_some());
        assert!(field.tick(10.0).is_none());
        assert!(field.tick(25.0).is_some());
    }

    #[test]
    fn non_finite_aurora_is_skipped() {
        let mut field = ParticleField::new(Viewport::new(800.0, 600.0, 1.0), Theme::Light, 5);
        field.auroras[0].x = f64::NAN;
        let gradients = field
            .step()
            .iter()
            .filter(|c| matches!(c, RenderCommand::FillRadialGradient { .. }))
            .count();
        assert_eq!(gradients, field.auroras().len() - 1);
    }
}
