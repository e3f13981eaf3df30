//! Population sizing by viewport tier and theme.

use inkfield_protocol::{Theme, ThemeToken, Viewport};
use rand::Rng;

use super::aurora::Aurora;
use super::particle::Particle;
use crate::constants::{MEDIUM_VIEWPORT_WIDTH, WIDE_VIEWPORT_WIDTH};

/// Quality bracket derived from viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    /// Desktop monitors.
    Wide,
    /// Laptops.
    Medium,
    /// Tablets and narrow windows.
    Narrow,
}

impl QualityTier {
    pub fn for_width(width: f64) -> Self {
        if width >= WIDE_VIEWPORT_WIDTH {
            Self::Wide
        } else if width >= MEDIUM_VIEWPORT_WIDTH {
            Self::Medium
        } else {
            Self::Narrow
        }
    }

    /// Viewport area per particle.
    pub fn area_divisor(self) -> f64 {
        match self {
            Self::Wide => 12_000.0,
            Self::Medium | Self::Narrow => 20_000.0,
        }
    }

    pub fn max_particles(self) -> usize {
        match self {
            Self::Wide => 60,
            Self::Medium => 35,
            Self::Narrow => 20,
        }
    }

    pub fn aurora_count(self) -> usize {
        match self {
            Self::Wide => 3,
            Self::Medium | Self::Narrow => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuroraPreset {
    pub color: ThemeToken,
    pub alpha: f32,
}

const LIGHT_AURORAS: [AuroraPreset; 3] = [
    AuroraPreset {
        color: ThemeToken::AuroraViolet,
        alpha: 0.12,
    },
    AuroraPreset {
        color: ThemeToken::AuroraBlue,
        alpha: 0.08,
    },
    AuroraPreset {
        color: ThemeToken::AuroraEmerald,
        alpha: 0.04,
    },
];

const DARK_AURORAS: [AuroraPreset; 2] = [
    AuroraPreset {
        color: ThemeToken::AuroraViolet,
        alpha: 0.06,
    },
    AuroraPreset {
        color: ThemeToken::AuroraBlue,
        alpha: 0.04,
    },
];

/// What to seed for a viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedPlan {
    pub tier: QualityTier,
    pub particle_count: usize,
    pub auroras: Vec<AuroraPreset>,
}

impl SeedPlan {
    pub fn for_viewport(viewport: &Viewport, theme: Theme) -> Self {
        let tier = QualityTier::for_width(viewport.width);
        let by_area = (viewport.area().max(0.0) / tier.area_divisor()).floor() as usize;
        let presets: &[AuroraPreset] = match theme {
            Theme::Light => &LIGHT_AURORAS,
            Theme::Dark => &DARK_AURORAS,
        };
        Self {
            tier,
            particle_count: by_area.min(tier.max_particles()),
            auroras: presets.iter().copied().take(tier.aurora_count()).collect(),
        }
    }

    pub fn seed<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        viewport: &Viewport,
    ) -> (Vec<Particle>, Vec<Aurora>) {
        let (w, h) = (viewport.width, viewport.height);
        let particles = (0..self.particle_count)
            .map(|_| Particle::random(rng, w, h))
            .collect();
        let auroras = self
            .auroras
            .iter()
            .map(|&preset| Aurora::random(rng, w, h, preset))
            .collect();
        (particles, auroras)
    }
}
