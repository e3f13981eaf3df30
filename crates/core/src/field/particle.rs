use inkfield_protocol::{Point, RenderCommand, ThemeToken};
use rand::Rng;

use crate::constants::{PARTICLE_FADE_STEP, POINTER_PUSH, POINTER_RADIUS};

/// A drifting dot in the particle network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    pub opacity: f32,
    pub target_opacity: f32,
}

impl Particle {
    /// Seed a particle somewhere in a `width`×`height` viewport. It starts
    /// invisible and fades in toward a random target opacity.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64) -> Self {
        Self {
            x: rng.r#gen::<f64>() * width,
            y: rng.r#gen::<f64>() * height,
            vx: (rng.r#gen::<f64>() - 0.5) * 0.5,
            vy: (rng.r#gen::<f64>() - 0.5) * 0.5,
            radius: rng.r#gen::<f64>() * 2.0 + 0.5,
            opacity: 0.0,
            target_opacity: rng.r#gen::<f32>() * 0.6 + 0.2,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn draw(&self) -> RenderCommand {
        RenderCommand::FillCircle {
            center: self.position(),
            radius: self.radius,
            color: ThemeToken::Particle,
            alpha: self.opacity,
        }
    }
}

/// Advance one particle by a tick.
///
/// Order matters: the pointer push is applied before edge reflection so a
/// particle shoved past an edge is clamped back in the same tick.
pub fn step_particle(p: &mut Particle, width: f64, height: f64, pointer: Option<Point>) {
    if p.opacity < p.target_opacity {
        p.opacity = (p.opacity + PARTICLE_FADE_STEP).min(p.target_opacity);
    }

    p.x += p.vx;
    p.y += p.vy;

    if let Some(pointer) = pointer {
        repel(p, pointer);
    }

    if p.x < 0.0 {
        p.x = 0.0;
        p.vx = p.vx.abs();
    } else if p.x > width {
        p.x = width;
        p.vx = -p.vx.abs();
    }
    if p.y < 0.0 {
        p.y = 0.0;
        p.vy = p.vy.abs();
    } else if p.y > height {
        p.y = height;
        p.vy = -p.vy.abs();
    }
}

/// Displace a particle away from the pointer, harder the closer it is.
fn repel(p: &mut Particle, pointer: Point) {
    let dx = pointer.x - p.x;
    let dy = pointer.y - p.y;
    let dist_sq = dx * dx + dy * dy;
    if dist_sq >= POINTER_RADIUS * POINTER_RADIUS {
        return;
    }
    let dist = dist_sq.sqrt();
    if dist > 0.0 {
        let force = (POINTER_RADIUS - dist) / POINTER_RADIUS;
        p.x -= dx / dist * force * POINTER_PUSH;
        p.y -= dy / dist * force * POINTER_PUSH;
    }
}

pub fn step_particles(particles: &mut [Particle], width: f64, height: f64, pointer: Option<Point>) {
    for p in particles {
        step_particle(p, width, height, pointer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still(x: f64, y: f64) -> Particle {
        Particle {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            radius: 1.0,
            opacity: 0.0,
            target_opacity: 0.5,
        }
    }

    #[test]
    fn reflects_and_clamps_at_edges() {
        let mut p = Particle {
            vx: -2.0,
            vy: 3.0,
            ..still(1.0, 99.0)
        };
        step_particle(&mut p, 200.0, 100.0, None);
        assert_eq!((p.x, p.y), (0.0, 100.0));
        assert_eq!((p.vx, p.vy), (2.0, -3.0));
    }

    #[test]
    fn pointer_pushes_particle_away() {
        let mut p = still(50.0, 50.0);
        step_particle(&mut p, 200.0, 200.0, Some(Point::new(60.0, 50.0)));
        // dist 10 → force 0.9 → push 1.35 to the left
        assert!((p.x - (50.0 - 1.35)).abs() < 1e-9);
        assert_eq!(p.y, 50.0);
    }

    #[test]
    fn pointer_outside_radius_has_no_effect() {
        let mut p = still(50.0, 50.0);
        step_particle(&mut p, 200.0, 200.0, Some(Point::new(150.0, 50.0)));
        assert_eq!(p.x, 50.0);
    }

    #[test]
    fn push_past_edge_is_clamped() {
        let mut p = still(0.5, 50.0);
        step_particle(&mut p, 200.0, 200.0, Some(Point::new(5.0, 50.0)));
        assert_eq!(p.x, 0.0);
    }

    #[test]
    fn opacity_fades_in_without_overshoot() {
        let mut p = still(10.0, 10.0);
        for _ in 0..200 {
            step_particle(&mut p, 100.0, 100.0, None);
        }
        assert_eq!(p.opacity, p.target_opacity);
    }
}
