use serde::{Deserialize, Serialize};

/// Color scheme the host is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Semantic color tokens resolved by the renderer's active theme.
///
/// Opacity is never baked into a token; every command carries its own alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    GridLine,

    // Particle field
    Particle,
    Connection,
    AuroraViolet,
    AuroraBlue,
    AuroraEmerald,

    // Static fallback layer
    BackdropGlow,
    BackdropDot,

    // Signature pad
    Ink,
    PadBackground,
}
