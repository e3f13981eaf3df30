use egui::Color32;
use inkfield_core::palette;
use inkfield_protocol::{Theme, ThemeToken};

/// Resolve a token for `theme` with the command's own alpha applied.
pub fn color(token: ThemeToken, theme: Theme, alpha: f32) -> Color32 {
    let [r, g, b] = palette::resolve(token, theme);
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

pub fn visuals(theme: Theme) -> egui::Visuals {
    match theme {
        Theme::Light => egui::Visuals::light(),
        Theme::Dark => egui::Visuals::dark(),
    }
}

pub fn toggled(theme: Theme) -> Theme {
    match theme {
        Theme::Light => Theme::Dark,
        Theme::Dark => Theme::Light,
    }
}
