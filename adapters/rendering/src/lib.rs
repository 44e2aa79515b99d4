#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Meteor Defence adapters.
//!
//! The core emits events and read-only cell views; this crate turns them
//! into an LED-panel frame plus the overlay animation, and defines the
//! backend trait a windowing adapter implements. The physical panel is
//! mounted rotated, so the frame stores matrix-space pixels and exposes
//! both coordinate systems.

use anyhow::Result as AnyResult;
use glam::Vec2;
use meteor_defence_core::{Event, PackedCell, PixelColour, FIELD_HEIGHT, FIELD_WIDTH};
use std::time::Duration;

/// Matrix rows; one per game row (matrix x runs along game y).
pub const MATRIX_ROWS: usize = FIELD_HEIGHT as usize;

/// Matrix columns; one per game column, mirrored.
pub const MATRIX_COLUMNS: usize = FIELD_WIDTH as usize;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// RGBA rendition of a palette entry.
#[must_use]
pub fn palette_color(colour: PixelColour) -> Color {
    match colour {
        PixelColour::Black => Color::from_rgb_u8(0x10, 0x10, 0x12),
        PixelColour::Green => Color::from_rgb_u8(0x2f, 0xd0, 0x32),
        PixelColour::Red => Color::from_rgb_u8(0xe0, 0x20, 0x20),
        PixelColour::Yellow => Color::from_rgb_u8(0xff, 0xd2, 0x1f),
        PixelColour::Orange => Color::from_rgb_u8(0xff, 0x8c, 0x00),
        PixelColour::LightOrange => Color::from_rgb_u8(0xff, 0xc0, 0x4d),
    }
}

/// One frame of the 16×8 LED panel.
///
/// Pixels are stored in matrix space: row = game y, column = 7 − game x.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedFrame {
    pixels: [[PixelColour; MATRIX_COLUMNS]; MATRIX_ROWS],
}

impl Default for LedFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl LedFrame {
    /// Creates an unlit frame.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pixels: [[PixelColour::Black; MATRIX_COLUMNS]; MATRIX_ROWS],
        }
    }

    /// Turns every pixel off.
    pub fn clear(&mut self) {
        self.pixels = [[PixelColour::Black; MATRIX_COLUMNS]; MATRIX_ROWS];
    }

    /// Lights the pixel for a game-space coordinate; off-field writes are
    /// ignored, which keeps edge-clipped shapes simple for callers.
    pub fn set_game_pixel(&mut self, x: u8, y: u8, colour: PixelColour) {
        if x < FIELD_WIDTH && y < FIELD_HEIGHT {
            self.pixels[y as usize][(FIELD_WIDTH - 1 - x) as usize] = colour;
        }
    }

    /// Lights the pixel for a packed cell; invalid cells are ignored.
    pub fn set_cell(&mut self, cell: PackedCell, colour: PixelColour) {
        if cell.is_valid() {
            self.set_game_pixel(cell.x(), cell.y(), colour);
        }
    }

    /// Pixel at a game-space coordinate.
    #[must_use]
    pub fn game_pixel(&self, x: u8, y: u8) -> PixelColour {
        if x < FIELD_WIDTH && y < FIELD_HEIGHT {
            self.pixels[y as usize][(FIELD_WIDTH - 1 - x) as usize]
        } else {
            PixelColour::Black
        }
    }

    /// Pixel at a matrix-space coordinate.
    #[must_use]
    pub fn matrix_pixel(&self, row: usize, column: usize) -> PixelColour {
        self.pixels
            .get(row)
            .and_then(|cells| cells.get(column))
            .copied()
            .unwrap_or(PixelColour::Black)
    }

    /// Iterator over every game-space pixel and its colour.
    pub fn game_pixels(&self) -> impl Iterator<Item = (u8, u8, PixelColour)> + '_ {
        (0..FIELD_WIDTH).flat_map(move |x| {
            (0..FIELD_HEIGHT).map(move |y| (x, y, self.game_pixel(x, y)))
        })
    }
}

/// Rebuilds a frame from the current cell views.
///
/// Draw order matches the panel driver: base first, then asteroids, then
/// projectiles, so a projectile crossing an occupied cell wins the pixel.
pub fn populate_frame(
    frame: &mut LedFrame,
    base: &[PackedCell],
    asteroids: &[PackedCell],
    projectiles: &[PackedCell],
) {
    frame.clear();
    for cell in base {
        frame.set_cell(*cell, PixelColour::Yellow);
    }
    for cell in asteroids {
        frame.set_cell(*cell, PixelColour::Green);
    }
    for cell in projectiles {
        frame.set_cell(*cell, PixelColour::Red);
    }
}

const EXPLOSION_STEP_MS: u64 = 10;
const EXPLOSION_SEQUENCE: &[PixelColour] = &[
    PixelColour::Orange,
    PixelColour::LightOrange,
    PixelColour::Orange,
    PixelColour::Black,
];

/// Row below which the explosion's lower arm is suppressed, keeping the
/// flash out of the base rows.
const EXPLOSION_FLOOR_ROW: u8 = 3;

#[derive(Clone, Copy, Debug)]
struct Explosion {
    cell: PackedCell,
    sequence: usize,
    stepped_ms: u64,
}

/// Plus-shaped hit flash overlaid on the frame.
///
/// At most one explosion animates at a time; a hit while one is active is
/// dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct Explosions {
    active: Option<Explosion>,
}

impl Explosions {
    /// Creates an idle animator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events, arming the flash on a shot-down asteroid.
    pub fn handle(&mut self, events: &[Event], now_ms: u64) {
        for event in events {
            if let Event::AsteroidShotDown { cell } = event {
                if self.active.is_none() {
                    self.active = Some(Explosion {
                        cell: *cell,
                        sequence: 0,
                        stepped_ms: now_ms,
                    });
                }
            }
        }
    }

    /// Advances the animation on the polled clock.
    pub fn advance(&mut self, now_ms: u64) {
        if let Some(explosion) = &mut self.active {
            if now_ms >= explosion.stepped_ms + EXPLOSION_STEP_MS {
                explosion.sequence += 1;
                explosion.stepped_ms = now_ms;
                if explosion.sequence >= EXPLOSION_SEQUENCE.len() {
                    self.active = None;
                }
            }
        }
    }

    /// Paints the current animation step onto the frame.
    pub fn overlay(&self, frame: &mut LedFrame) {
        let Some(explosion) = self.active else {
            return;
        };
        let colour = EXPLOSION_SEQUENCE[explosion.sequence];
        let (x, y) = (explosion.cell.x(), explosion.cell.y());

        frame.set_game_pixel(x, y, colour);
        if let Some(left) = x.checked_sub(1) {
            frame.set_game_pixel(left, y, colour);
        }
        frame.set_game_pixel(x + 1, y, colour);
        frame.set_game_pixel(x, y + 1, colour);
        if y >= EXPLOSION_FLOOR_ROW + 1 {
            frame.set_game_pixel(x, y - 1, colour);
        }
    }

    /// True while a flash is mid-sequence.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

/// Screen-space layout of the upright 8×16 panel inside a viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelMetrics {
    origin: Vec2,
    cell_size: f32,
}

impl PanelMetrics {
    /// Fits the panel into the viewport with a small margin, centred.
    #[must_use]
    pub fn for_viewport(width: f32, height: f32) -> Self {
        let columns = MATRIX_COLUMNS as f32;
        let rows = MATRIX_ROWS as f32;
        let cell_size = ((width / columns).min(height / rows) * 0.9).max(1.0);
        let panel = Vec2::new(columns, rows) * cell_size;
        let origin = (Vec2::new(width, height) - panel) * 0.5;
        Self { origin, cell_size }
    }

    /// Side length of one LED cell in screen units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Top-left corner of the panel in screen units.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Screen-space centre of a game cell. Game row 0 sits at the bottom,
    /// screen y grows downward, so rows flip.
    #[must_use]
    pub fn cell_centre(&self, x: u8, y: u8) -> Vec2 {
        let column = f32::from(x) + 0.5;
        let row = (MATRIX_ROWS as f32 - 1.0 - f32::from(y)) + 0.5;
        self.origin + Vec2::new(column, row) * self.cell_size
    }

    /// Screen-space size of the whole panel.
    #[must_use]
    pub fn panel_size(&self) -> Vec2 {
        Vec2::new(MATRIX_COLUMNS as f32, MATRIX_ROWS as f32) * self.cell_size
    }
}

/// Input snapshot gathered by adapters before updating the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Whether a move-left press was detected this frame.
    pub move_left: bool,
    /// Whether a move-right press was detected this frame.
    pub move_right: bool,
    /// Whether a fire press was detected this frame.
    pub fire: bool,
    /// Whether a pause toggle was detected this frame.
    pub pause_toggle: bool,
    /// Whether a restart press was detected this frame.
    pub restart: bool,
    /// Whether the player asked to quit.
    pub quit: bool,
}

/// Session readout the presenter overlays on top of the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameStatus {
    /// Current score.
    pub score: u32,
    /// Lives remaining.
    pub lives: i8,
    /// Whether the world is paused.
    pub paused: bool,
    /// Whether the game has ended.
    pub game_over: bool,
    /// Buzzer frequency active this frame, if any.
    pub tone_hz: Option<u16>,
}

/// Static presentation parameters handed to a backend.
#[derive(Debug)]
pub struct Presentation {
    /// Title for the backend's window, where applicable.
    pub window_title: String,
    /// Color used to clear the viewport each frame.
    pub clear_color: Color,
    /// Frame the backend presents and the session updates.
    pub frame: LedFrame,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            window_title: String::from("Meteor Defence"),
            clear_color: Color::from_rgb_u8(0x08, 0x08, 0x0a),
            frame: LedFrame::new(),
        }
    }
}

/// Rendering backends drive the frame loop and surface player input.
pub trait RenderingBackend {
    /// Runs the presentation until the update callback requests an exit by
    /// returning `None`, or the player closes the window.
    fn run<F>(self, presentation: Presentation, update_frame: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut LedFrame) -> Option<FrameStatus> + 'static;
}
