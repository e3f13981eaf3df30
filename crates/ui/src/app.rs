use eframe::egui;
use inkfield_core::contract::{Contract, ContractError, SignerRole};
use inkfield_core::field::{FieldController, FieldOptions};
use inkfield_core::signature::{
    SignatureConsumer, SignatureDialog, SignatureImage, SignaturePad, StrokePoint,
};
use inkfield_core::surface::SurfaceMetrics;
use inkfield_protocol::{HostRequest, LayoutSize, Theme, ThemeToken};

use crate::renderer;
use crate::theme;

const PAD_SIZE: egui::Vec2 = egui::vec2(480.0, 200.0);

/// Host side of the request protocol, clocked by egui's input time.
#[derive(Default)]
struct FrameHost {
    frame: Option<u64>,
    /// (id, due time in seconds)
    timers: Vec<(u64, f64)>,
    listeners: Vec<u64>,
}

impl FrameHost {
    fn apply(&mut self, requests: &[HostRequest], now: f64) {
        for req in requests {
            match *req {
                HostRequest::RequestFrame { id } => self.frame = Some(id),
                HostRequest::CancelFrame { id } => {
                    if self.frame == Some(id) {
                        self.frame = None;
                    }
                }
                HostRequest::ScheduleTimer { id, delay_ms, .. } => {
                    self.timers.push((id, now + f64::from(delay_ms) / 1000.0));
                }
                HostRequest::CancelTimer { id } => self.timers.retain(|&(t, _)| t != id),
                HostRequest::AttachListener { id, .. } => self.listeners.push(id),
                HostRequest::DetachListener { id } => self.listeners.retain(|&l| l != id),
            }
        }
    }

    fn take_due_timers(&mut self, now: f64) -> Vec<u64> {
        let (due, pending): (Vec<(u64, f64)>, Vec<_>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|&(_, at)| at <= now);
        self.timers = pending;
        due.into_iter().map(|(id, _)| id).collect()
    }
}

/// The animated background and the host state mirroring it.
struct Background {
    controller: FieldController,
    host: FrameHost,
    layout: Option<LayoutSize>,
    commands: Vec<inkfield_protocol::RenderCommand>,
}

impl Background {
    fn new(options: FieldOptions, dpr: f32) -> Self {
        Self {
            controller: FieldController::new(options, f64::from(dpr), 0x1f_2e_3d),
            host: FrameHost::default(),
            layout: None,
            commands: Vec::new(),
        }
    }

    /// Advance host callbacks for this repaint.
    fn update(&mut self, layout: LayoutSize, pointer: Option<egui::Pos2>, now: f64) {
        match self.layout {
            None => {
                let out = self.controller.mount(layout);
                self.host.apply(&out.requests, now);
                self.commands = out.commands;
            }
            Some(prev) if prev != layout => {
                if self.controller.options().low_capability {
                    self.commands = self.controller.static_layer(layout);
                } else {
                    let requests = self.controller.on_resize();
                    self.host.apply(&requests, now);
                }
            }
            Some(_) => {}
        }
        self.layout = Some(layout);

        for id in self.host.take_due_timers(now) {
            let requests = self.controller.on_timer(id, layout);
            self.host.apply(&requests, now);
        }
        if let Some(pos) = pointer.filter(|_| !self.host.listeners.is_empty()) {
            self.controller
                .on_pointer_move(f64::from(pos.x), f64::from(pos.y), now * 1000.0);
        }
        if let Some(id) = self.host.frame.take() {
            let out = self.controller.on_frame(id, now * 1000.0);
            self.host.apply(&out.requests, now);
            if !out.commands.is_empty() {
                self.commands = out.commands;
            }
        }
    }

    fn is_animating(&self) -> bool {
        self.host.frame.is_some() || !self.host.timers.is_empty()
    }

    fn dispose(&mut self) {
        let requests = self.controller.dispose();
        self.host.apply(&requests, 0.0);
    }
}

/// Collects the outcome of one signature dialog.
struct PendingSignature {
    role: SignerRole,
    saved: Option<SignatureImage>,
}

impl SignatureConsumer for PendingSignature {
    fn on_save(&mut self, image: SignatureImage) {
        self.saved = Some(image);
    }

    fn on_cancel(&mut self) {}
}

/// Main application state.
pub struct InkfieldApp {
    theme: Theme,
    low_capability: bool,
    background: Background,
    contract: Contract,
    dialog: Option<SignatureDialog<PendingSignature>>,
    /// Status line shown in the bottom panel.
    status: Option<String>,
}

impl InkfieldApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let theme = Theme::Light;
        cc.egui_ctx.set_visuals(theme::visuals(theme));
        let dpr = cc.egui_ctx.pixels_per_point();
        Self {
            theme,
            low_capability: false,
            background: Background::new(
                FieldOptions {
                    theme,
                    low_capability: false,
                },
                dpr,
            ),
            contract: Contract::new(),
            dialog: None,
            status: None,
        }
    }

    fn restart_background(&mut self, ctx: &egui::Context) {
        self.background.dispose();
        self.background = Background::new(
            FieldOptions {
                theme: self.theme,
                low_capability: self.low_capability,
            },
            ctx.pixels_per_point(),
        );
    }

    fn open_dialog(&mut self, role: SignerRole, ctx: &egui::Context) {
        if let Err(err) = self.contract.can_sign(role) {
            self.status = Some(err.to_string());
            return;
        }
        let layout = LayoutSize::new(f64::from(PAD_SIZE.x), f64::from(PAD_SIZE.y));
        match SurfaceMetrics::from_layout(layout, f64::from(ctx.pixels_per_point())) {
            Ok(metrics) => {
                self.dialog = Some(SignatureDialog::new(
                    SignaturePad::new(metrics),
                    PendingSignature { role, saved: None },
                ));
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    fn contract_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("contract")
            .default_width(340.0)
            .show(ctx, |ui| {
                ui.heading("Contract");
                ui.label(format!("Status: {:?}", self.contract.status()));
                ui.separator();

                let output = egui::ScrollArea::vertical()
                    .max_height(260.0)
                    .show(ui, |ui| {
                        for clause in 1..=12 {
                            ui.label(format!(
                                "Clause {clause}. The parties agree to the scope, schedule, and \
                                 payment terms described in the accompanying briefing."
                            ));
                            ui.add_space(6.0);
                        }
                    });
                let gate = self.contract.read_gate_mut();
                gate.check_fits(
                    f64::from(output.content_size.y),
                    f64::from(output.inner_rect.height()),
                );
                gate.on_scroll(
                    f64::from(output.state.offset.y),
                    f64::from(output.content_size.y),
                    f64::from(output.inner_rect.height()),
                );
                if !self.contract.read_gate().is_satisfied() {
                    ui.colored_label(
                        egui::Color32::from_rgb(0xea, 0x58, 0x0c),
                        "Read the whole document to sign.",
                    );
                }

                ui.separator();
                for role in [SignerRole::Admin, SignerRole::Client] {
                    ui.horizontal(|ui| {
                        let signed = self.contract.signature(role).is_some();
                        let label = if signed { "Re-sign" } else { "Sign" };
                        if ui
                            .add_enabled(
                                self.contract.can_sign(role).is_ok(),
                                egui::Button::new(format!("{label} as {role:?}")),
                            )
                            .clicked()
                        {
                            self.open_dialog(role, ctx);
                        }
                        if ui
                            .add_enabled(signed, egui::Button::new("Submit"))
                            .clicked()
                        {
                            self.status = Some(match self.contract.submit(role, epoch_ms()) {
                                Ok(update) => format!(
                                    "{:?} submitted; contract is now {:?}",
                                    update.role, update.status
                                ),
                                Err(err) => err.to_string(),
                            });
                        }
                    });
                }
            });
    }

    fn signature_window(&mut self, ctx: &egui::Context) {
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };
        let now_ms = ctx.input(|i| i.time) * 1000.0;

        egui::Window::new("Signature")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                let (rect, response) = ui.allocate_exact_size(PAD_SIZE, egui::Sense::drag());
                let painter = ui.painter_at(rect);
                painter.rect_filled(
                    rect,
                    egui::CornerRadius::ZERO,
                    theme::color(ThemeToken::PadBackground, Theme::Light, 1.0),
                );
                renderer::render_commands(
                    &painter,
                    dialog.pad().commands(),
                    rect.min,
                    Theme::Light,
                );

                if let Some(pos) = response.interact_pointer_pos() {
                    let local = pos - rect.min;
                    let point = StrokePoint::new(f64::from(local.x), f64::from(local.y), now_ms);
                    if response.drag_started() {
                        dialog.begin_stroke(point);
                    } else if response.dragged() {
                        dialog.extend_stroke(point);
                    }
                }
                if response.drag_stopped() {
                    dialog.end_stroke();
                }

                if let Some(err) = dialog.error() {
                    ui.colored_label(egui::Color32::from_rgb(0xdc, 0x26, 0x26), err);
                }
                ui.horizontal(|ui| {
                    if ui.button("Clear").clicked() {
                        dialog.clear();
                    }
                    if ui.button("Cancel").clicked() {
                        dialog.cancel();
                    }
                    if ui.button("Confirm").clicked() {
                        // A rejection stays visible in the window.
                        let _ = dialog.confirm();
                    }
                });
            });

        if dialog.is_finished()
            && let Some(dialog) = self.dialog.take()
        {
            self.finish_dialog(dialog.into_consumer());
        }
    }

    fn finish_dialog(&mut self, outcome: PendingSignature) {
        let Some(image) = outcome.saved else {
            self.status = Some("Signature cancelled".to_owned());
            return;
        };
        #[cfg(not(target_arch = "wasm32"))]
        let copy_error = save_png_copy(&image).err();
        #[cfg(target_arch = "wasm32")]
        let copy_error: Option<std::io::Error> = None;

        let attached = self.contract.attach_signature(outcome.role, image);
        self.status = Some(signature_status(outcome.role, &attached, copy_error.as_ref()));
    }
}

fn signature_status(
    role: SignerRole,
    attached: &Result<(), ContractError>,
    copy_error: Option<&std::io::Error>,
) -> String {
    let mut status = match attached {
        Ok(()) => format!("{role:?} signature captured"),
        Err(err) => err.to_string(),
    };
    if let Some(err) = copy_error {
        status.push_str(&format!("; could not save copy: {err}"));
    }
    status
}

/// Offer to keep a copy of the signature on disk. Declining the dialog is
/// not an error.
#[cfg(not(target_arch = "wasm32"))]
fn save_png_copy(image: &SignatureImage) -> std::io::Result<()> {
    match rfd::FileDialog::new()
        .add_filter("PNG image", &["png"])
        .set_file_name("signature.png")
        .save_file()
    {
        Some(path) => std::fs::write(path, &image.png),
        None => Ok(()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

#[cfg(target_arch = "wasm32")]
fn epoch_ms() -> u64 {
    js_sys::Date::now() as u64
}

impl eframe::App for InkfieldApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("inkfield");
                ui.separator();
                let theme_label = match self.theme {
                    Theme::Light => "☀ Light",
                    Theme::Dark => "🌙 Dark",
                };
                if ui.button(theme_label).clicked() {
                    self.theme = theme::toggled(self.theme);
                    ctx.set_visuals(theme::visuals(self.theme));
                    self.restart_background(ctx);
                }
                if ui
                    .checkbox(&mut self.low_capability, "Low-power mode")
                    .changed()
                {
                    self.restart_background(ctx);
                }
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("{:?}", self.background.controller.state()));
                if let Some(field) = self.background.controller.field() {
                    ui.label(format!(
                        "{} particles · {} auroras",
                        field.particles().len(),
                        field.auroras().len()
                    ));
                }
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status);
                }
            });
        });

        self.contract_panel(ctx);

        let background_fill = theme::color(ThemeToken::Background, self.theme, 1.0);
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(background_fill))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let layout = LayoutSize::new(f64::from(rect.width()), f64::from(rect.height()));
                let (now, hover) = ui.input(|i| (i.time, i.pointer.hover_pos()));
                let pointer = hover
                    .filter(|p| rect.contains(*p))
                    .map(|p| (p - rect.min).to_pos2());
                self.background.update(layout, pointer, now);
                renderer::render_commands(
                    ui.painter(),
                    &self.background.commands,
                    rect.min,
                    self.theme,
                );
            });

        self.signature_window(ctx);

        if self.background.is_animating() {
            ctx.request_repaint();
        }
    }
}

impl Drop for InkfieldApp {
    fn drop(&mut self) {
        self.background.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkfield_protocol::TimerKind;

    #[test]
    fn timers_fire_once_when_due() {
        let mut host = FrameHost::default();
        host.apply(
            &[HostRequest::ScheduleTimer {
                id: 4,
                kind: TimerKind::ResizeDebounce,
                delay_ms: 100,
            }],
            1.0,
        );
        assert!(host.take_due_timers(1.05).is_empty());
        assert_eq!(host.take_due_timers(1.2), vec![4]);
        assert!(host.take_due_timers(2.0).is_empty());
    }

    #[test]
    fn failed_copy_is_reported_alongside_capture() {
        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let status = signature_status(SignerRole::Client, &Ok(()), Some(&denied));
        assert!(status.starts_with("Client signature captured"));
        assert!(status.contains("could not save copy"));

        let status = signature_status(SignerRole::Admin, &Ok(()), None);
        assert_eq!(status, "Admin signature captured");
    }
}
