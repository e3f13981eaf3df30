//! Token resolution for the software renderers (raster and SVG).

use inkfield_protocol::{Theme, ThemeToken};

/// Resolve a semantic token to an opaque sRGB triple.
pub fn resolve(token: ThemeToken, theme: Theme) -> [u8; 3] {
    use ThemeToken::*;
    match theme {
        Theme::Light => match token {
            Background | PadBackground => [0xff, 0xff, 0xff],
            GridLine | Particle | Connection | AuroraViolet | BackdropDot => [0x7c, 0x3a, 0xed],
            AuroraBlue => [0x3b, 0x82, 0xf6],
            AuroraEmerald => [0x10, 0xb9, 0x81],
            BackdropGlow => [0xdd, 0xd6, 0xfe],
            Ink => [0x00, 0x00, 0x00],
        },
        Theme::Dark => match token {
            Background => [0x0f, 0x11, 0x17],
            GridLine | BackdropDot => [0xff, 0xff, 0xff],
            Particle | Connection => [0xa7, 0x8b, 0xfa],
            AuroraViolet => [0x7c, 0x3a, 0xed],
            AuroraBlue => [0x3b, 0x82, 0xf6],
            AuroraEmerald => [0x10, 0xb9, 0x81],
            BackdropGlow => [0x8b, 0x5c, 0xf6],
            // The signature pad stays paper-white in both themes.
            PadBackground => [0xff, 0xff, 0xff],
            Ink => [0x00, 0x00, 0x00],
        },
    }
}

/// `#rrggbb` form of [`resolve`].
pub fn hex(token: ThemeToken, theme: Theme) -> String {
    let [r, g, b] = resolve(token, theme);
    format!("#{r:02x}{g:02x}{b:02x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_color_follows_theme() {
        assert_eq!(hex(ThemeToken::Particle, Theme::Light), "#7c3aed");
        assert_eq!(hex(ThemeToken::Particle, Theme::Dark), "#a78bfa");
        assert_eq!(
            resolve(ThemeToken::Ink, Theme::Dark),
            resolve(ThemeToken::Ink, Theme::Light)
        );
    }
}
