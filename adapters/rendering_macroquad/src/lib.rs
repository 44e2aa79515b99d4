#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed presenter for the Meteor Defence LED panel.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature; the buzzer state is drawn as part of the status
//! overlay instead of being played back.

use anyhow::Result;
use macroquad::input::{is_key_pressed, KeyCode};
use meteor_defence_rendering::{
    palette_color, Color, FrameInput, FrameStatus, LedFrame, PanelMetrics, Presentation,
    RenderingBackend,
};
use meteor_defence_core::PixelColour;
use std::time::Duration;

/// Snapshot of edge-triggered keyboard input observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardInput {
    /// Left arrow or `A` moves the base left.
    move_left: bool,
    /// Right arrow or `D` moves the base right.
    move_right: bool,
    /// Space or up arrow fires a projectile.
    fire: bool,
    /// `P` toggles the paused state.
    pause_toggle: bool,
    /// `R` starts a new game.
    restart: bool,
    /// `Q` or `Escape` quits the session.
    quit: bool,
}

impl KeyboardInput {
    fn poll() -> Self {
        Self {
            move_left: is_key_pressed(KeyCode::Left) || is_key_pressed(KeyCode::A),
            move_right: is_key_pressed(KeyCode::Right) || is_key_pressed(KeyCode::D),
            fire: is_key_pressed(KeyCode::Space) || is_key_pressed(KeyCode::Up),
            pause_toggle: is_key_pressed(KeyCode::P),
            restart: is_key_pressed(KeyCode::R),
            quit: is_key_pressed(KeyCode::Q) || is_key_pressed(KeyCode::Escape),
        }
    }

    const fn into_frame_input(self) -> FrameInput {
        FrameInput {
            move_left: self.move_left,
            move_right: self.move_right,
            fire: self.fire,
            pause_toggle: self.pause_toggle,
            restart: self.restart,
            quit: self.quit,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug)]
pub struct MacroquadBackend {
    window_width: i32,
    window_height: i32,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            window_width: 480,
            window_height: 860,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend with the default portrait window.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures an explicit window size.
    #[must_use]
    pub const fn with_window_size(mut self, width: i32, height: i32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_frame: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut LedFrame) -> Option<FrameStatus> + 'static,
    {
        let Presentation {
            window_title,
            clear_color,
            frame,
        } = presentation;

        let config = macroquad::window::Conf {
            window_title,
            window_width: self.window_width,
            window_height: self.window_height,
            ..macroquad::window::Conf::default()
        };

        macroquad::Window::from_config(config, async move {
            let background = to_macroquad_color(clear_color);
            let mut frame = frame;

            loop {
                let keyboard = KeyboardInput::poll();
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let Some(status) = update_frame(frame_dt, keyboard.into_frame_input(), &mut frame)
                else {
                    break;
                };

                macroquad::window::clear_background(background);
                let metrics = PanelMetrics::for_viewport(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                draw_panel(&frame, &metrics);
                draw_status(&status, &metrics);

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

fn draw_panel(frame: &LedFrame, metrics: &PanelMetrics) {
    let radius = metrics.cell_size() * 0.42;

    for (x, y, colour) in frame.game_pixels() {
        let centre = metrics.cell_centre(x, y);
        let body = palette_color(colour);

        if colour != PixelColour::Black {
            // Soft halo sells the LED look.
            let mut halo = body.lighten(0.3);
            halo.alpha = 0.25;
            macroquad::shapes::draw_circle(
                centre.x,
                centre.y,
                radius * 1.5,
                to_macroquad_color(halo),
            );
        }
        macroquad::shapes::draw_circle(centre.x, centre.y, radius, to_macroquad_color(body));
    }
}

fn draw_status(status: &FrameStatus, metrics: &PanelMetrics) {
    let origin = metrics.origin();
    let panel = metrics.panel_size();
    let text_size = (metrics.cell_size() * 0.8).max(16.0);
    let text_color = macroquad::color::Color::new(0.9, 0.9, 0.9, 1.0);

    macroquad::text::draw_text(
        &format!("Score: {}", status.score),
        origin.x,
        origin.y - text_size * 0.8,
        text_size,
        text_color,
    );
    macroquad::text::draw_text(
        &format!("Lives: {}", status.lives.max(0)),
        origin.x,
        origin.y - text_size * 0.8 + text_size,
        text_size,
        text_color,
    );

    if let Some(frequency) = status.tone_hz {
        macroquad::text::draw_text(
            &format!("{frequency} Hz"),
            origin.x + panel.x - text_size * 3.0,
            origin.y - text_size * 0.8,
            text_size,
            macroquad::color::Color::new(0.6, 0.8, 1.0, 1.0),
        );
    }

    let banner = if status.game_over {
        Some("GAME OVER - press R")
    } else if status.paused {
        Some("PAUSED - press P")
    } else {
        None
    };
    if let Some(banner) = banner {
        macroquad::text::draw_text(
            banner,
            origin.x,
            origin.y + panel.y + text_size * 1.2,
            text_size,
            macroquad::color::Color::new(1.0, 0.55, 0.1, 1.0),
        );
    }
}
