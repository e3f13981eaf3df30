use std::io::{Stdout, stdout};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context as _, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use inkfield_core::field::{FieldController, FieldOptions};
use inkfield_core::signature::{
    Callbacks, SignatureDialog, SignatureImage, SignaturePad, StrokePoint,
};
use inkfield_core::surface::SurfaceMetrics;
use inkfield_protocol::{LayoutSize, RenderCommand, Theme, ThemeToken};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    widgets::{Block, canvas::Canvas},
};

use crate::host::{Due, TerminalHost};
use crate::renderer;

/// Logical units per terminal cell. Cells are roughly twice as tall as
/// they are wide.
const CELL_WIDTH: f64 = 10.0;
const CELL_HEIGHT: f64 = 20.0;

type Term = Terminal<CrosstermBackend<Stdout>>;

fn enter() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn leave(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Logical size of the content area below the one-line header.
fn content_layout(area: Rect) -> LayoutSize {
    LayoutSize::new(
        f64::from(area.width) * CELL_WIDTH,
        f64::from(area.height.saturating_sub(1)) * CELL_HEIGHT,
    )
}

fn draw_frame(
    terminal: &mut Term,
    title: &str,
    commands: &[RenderCommand],
    layout: LayoutSize,
    background: Color,
    theme: Theme,
) -> Result<()> {
    terminal.draw(|frame| {
        let area = frame.area();
        let header = Block::default()
            .title(title.to_owned())
            .style(Style::default().fg(Color::White).bg(Color::DarkGray));
        frame.render_widget(header, Rect::new(0, 0, area.width, 1));

        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .background_color(background)
            .x_bounds([0.0, layout.width])
            .y_bounds([0.0, layout.height])
            .paint(|ctx| renderer::paint(ctx, commands, layout.height, theme));
        frame.render_widget(
            canvas,
            Rect::new(0, 1, area.width, area.height.saturating_sub(1)),
        );
    })?;
    Ok(())
}

pub fn run_field(theme: Theme, low_capability: bool) -> Result<()> {
    let mut terminal = enter()?;
    let result = field_loop(&mut terminal, theme, low_capability);
    leave(&mut terminal)?;
    result
}

fn field_loop(terminal: &mut Term, theme: Theme, low_capability: bool) -> Result<()> {
    let options = FieldOptions {
        theme,
        low_capability,
    };
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64);
    let mut controller = FieldController::new(options, 1.0, seed);
    let mut host = TerminalHost::new();

    let mut layout = content_layout(terminal.size()?.into());
    let mounted = controller.mount(layout);
    host.apply(&mounted.requests);
    let mut commands = mounted.commands;

    let background = renderer::fill(ThemeToken::Background, theme);
    loop {
        while let Some(due) = host.next_due() {
            match due {
                Due::Timer(id) => host.apply(&controller.on_timer(id, layout)),
                Due::Frame(id) => {
                    let out = controller.on_frame(id, host.now_ms());
                    host.apply(&out.requests);
                    if !out.commands.is_empty() {
                        commands = out.commands;
                    }
                    break;
                }
            }
        }

        let title = format!(
            " inkfield · {:?} · {} particles · q quit ",
            controller.state(),
            controller.field().map_or(0, |f| f.particles().len()),
        );
        draw_frame(terminal, &title, &commands, layout, background, theme)?;

        if event::poll(Duration::from_millis(8))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        break;
                    }
                }
                Event::Resize(cols, rows) => {
                    layout = content_layout(Rect::new(0, 0, cols, rows));
                    if low_capability {
                        commands = controller.static_layer(layout);
                    } else {
                        host.apply(&controller.on_resize());
                    }
                }
                Event::Mouse(mouse) if host.is_listening() => {
                    if let MouseEventKind::Moved = mouse.kind {
                        let x = f64::from(mouse.column) * CELL_WIDTH;
                        let y = f64::from(mouse.row.saturating_sub(1)) * CELL_HEIGHT;
                        controller.on_pointer_move(x, y, host.now_ms());
                    }
                }
                _ => {}
            }
        }
    }

    host.apply(&controller.dispose());
    debug_assert!(host.holds_nothing());
    Ok(())
}

pub fn run_signature(out: &Path, svg: Option<&Path>) -> Result<()> {
    let mut terminal = enter()?;
    let result = signature_loop(&mut terminal, out, svg);
    leave(&mut terminal)?;
    let saved = result?;
    match saved {
        Some(image) => eprintln!(
            "saved {}x{} signature to {}",
            image.width,
            image.height,
            out.display()
        ),
        None => eprintln!("signature cancelled"),
    }
    Ok(())
}

fn signature_loop(
    terminal: &mut Term,
    out: &Path,
    svg: Option<&Path>,
) -> Result<Option<SignatureImage>> {
    let layout = content_layout(terminal.size()?.into());
    let metrics = SurfaceMetrics::from_layout(layout, 1.0)
        .context("terminal too small for a signature pad")?;

    let mut saved: Option<SignatureImage> = None;
    let mut dialog = SignatureDialog::new(
        SignaturePad::new(metrics),
        Callbacks {
            on_save: |image: SignatureImage| saved = Some(image),
            on_cancel: || {},
        },
    );
    let started = Instant::now();
    let now = || started.elapsed().as_secs_f64() * 1000.0;
    let background = renderer::fill(ThemeToken::PadBackground, Theme::Light);

    while !dialog.is_finished() {
        let title = match dialog.error() {
            Some(err) => format!(" {err} · c clear · enter save · esc cancel "),
            None => format!(
                " sign with the mouse · {:.0} drawn · c clear · enter save · esc cancel ",
                dialog.pad().total_length()
            ),
        };
        draw_frame(
            terminal,
            &title,
            dialog.pad().commands(),
            layout,
            background,
            Theme::Light,
        )?;

        if !event::poll(Duration::from_millis(16))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => dialog.cancel(),
                KeyCode::Char('c') => dialog.clear(),
                KeyCode::Enter => {
                    // A rejection is shown in the header; keep signing.
                    if dialog.confirm().is_ok()
                        && let Some(path) = svg
                    {
                        let document = dialog.pad().export_svg()?;
                        std::fs::write(path, document)
                            .with_context(|| format!("writing {}", path.display()))?;
                    }
                }
                _ => {}
            },
            Event::Mouse(mouse) => {
                let point = StrokePoint::new(
                    f64::from(mouse.column) * CELL_WIDTH + CELL_WIDTH / 2.0,
                    f64::from(mouse.row.saturating_sub(1)) * CELL_HEIGHT + CELL_HEIGHT / 2.0,
                    now(),
                );
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => dialog.begin_stroke(point),
                    MouseEventKind::Drag(MouseButton::Left) => dialog.extend_stroke(point),
                    MouseEventKind::Up(MouseButton::Left) => dialog.end_stroke(),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    drop(dialog);
    if let Some(image) = &saved {
        std::fs::write(out, &image.png).with_context(|| format!("writing {}", out.display()))?;
    }
    Ok(saved)
}
