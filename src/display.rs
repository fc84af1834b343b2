//! Pixel sinks: the interactive terminal renderer (braille / true-color /
//! half-block / ASCII, reusing the teacher's glyph-packing schemes) and a PNG
//! writer for the `--save` flag. Both implement [`crate::render::DisplaySink`].

use crate::error::AssetLoadError;
use crate::math::Color;
use crate::render::DisplaySink;
use crossterm::event::{self, Event, KeyCode};
use crossterm::style::{self, Stylize};
use crossterm::terminal;
use std::io::{self, Write};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Unicode braille patterns (2x4 dots per cell) with ANSI true-color.
    Braille,
    /// ANSI 24-bit true-color using full-block characters.
    TrueColor,
    /// Half-block rendering with separate fg/bg colors — 2 vertical pixels per cell.
    HalfBlock,
    /// ASCII grayscale density ramp.
    Ascii,
}

struct FrameView<'a> {
    width: u32,
    height: u32,
    pixels: &'a [Color],
}

impl<'a> FrameView<'a> {
    #[inline]
    fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }
}

/// Renders progressively into the current terminal, polling for an Escape
/// keypress at each `update()` call (the cooperative-cancellation flag the
/// render driver checks at every pass boundary).
pub struct TerminalSink {
    mode: OutputMode,
    closed: bool,
    raw_mode_enabled: bool,
}

impl TerminalSink {
    pub fn new(mode: OutputMode) -> Self {
        let raw_mode_enabled = terminal::enable_raw_mode().is_ok();
        Self {
            mode,
            closed: false,
            raw_mode_enabled,
        }
    }

    fn poll_escape(&mut self) {
        while event::poll(Duration::from_secs(0)).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.code == KeyCode::Esc {
                    self.closed = true;
                }
            }
        }
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        if self.raw_mode_enabled {
            let _ = terminal::disable_raw_mode();
        }
    }
}

impl DisplaySink for TerminalSink {
    fn closed(&self) -> bool {
        self.closed
    }

    fn update(&mut self, frame: &[Color], width: u32, height: u32) {
        self.poll_escape();
        if self.closed {
            return;
        }
        let view = FrameView { width, height, pixels: frame };
        let stdout = io::stdout();
        let mut out = io::BufWriter::new(stdout.lock());
        let _ = write!(out, "\x1b[H");
        match self.mode {
            OutputMode::TrueColor => display_truecolor(&mut out, &view),
            OutputMode::HalfBlock => display_halfblock(&mut out, &view),
            OutputMode::Ascii => display_ascii(&mut out, &view),
            OutputMode::Braille => display_braille(&mut out, &view),
        }
        let _ = out.flush();
    }
}

fn display_truecolor(out: &mut impl Write, fb: &FrameView) {
    for y in 0..fb.height {
        for x in 0..fb.width {
            let (r, g, b) = fb.get(x, y).to_rgb8();
            let _ = write!(out, "{}", "█".with(style::Color::Rgb { r, g, b }));
        }
        let _ = writeln!(out);
    }
}

fn display_halfblock(out: &mut impl Write, fb: &FrameView) {
    let rows = fb.height / 2;
    for row in 0..rows {
        for x in 0..fb.width {
            let (tr, tg, tb) = fb.get(x, row * 2).to_rgb8();
            let (br, bg, bb) = fb.get(x, row * 2 + 1).to_rgb8();
            let _ = write!(
                out,
                "{}",
                "▀"
                    .with(style::Color::Rgb { r: tr, g: tg, b: tb })
                    .on(style::Color::Rgb { r: br, g: bg, b: bb })
            );
        }
        let _ = writeln!(out);
    }
}

fn display_ascii(out: &mut impl Write, fb: &FrameView) {
    const RAMP: &[u8] = b" .:-=+*#%@";
    for y in 0..fb.height {
        for x in 0..fb.width {
            let c = fb.get(x, y);
            let lum = 0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z;
            let idx = (lum.clamp(0.0, 0.999) * RAMP.len() as f64) as usize;
            let _ = write!(out, "{}", RAMP[idx] as char);
        }
        let _ = writeln!(out);
    }
}

/// Braille pattern rendering — each Unicode braille char (U+2800..U+28FF) encodes
/// a 2x4 dot matrix, achieving 2x horizontal and 4x vertical subpixel resolution.
fn display_braille(out: &mut impl Write, fb: &FrameView) {
    let cell_w = 2u32;
    let cell_h = 4u32;
    let cols = fb.width / cell_w;
    let rows = fb.height / cell_h;

    const OFFSETS: [(u32, u32, u8); 8] = [
        (0, 0, 0),
        (0, 1, 1),
        (0, 2, 2),
        (1, 0, 3),
        (1, 1, 4),
        (1, 2, 5),
        (0, 3, 6),
        (1, 3, 7),
    ];

    for row in 0..rows {
        for col in 0..cols {
            let bx = col * cell_w;
            let by = row * cell_h;
            let mut pattern: u8 = 0;
            let mut avg_color = Color::zero();
            let mut lit_count = 0u32;

            for &(dx, dy, bit) in &OFFSETS {
                let px = bx + dx;
                let py = by + dy;
                if px < fb.width && py < fb.height {
                    let c = fb.get(px, py);
                    let lum = 0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z;
                    if lum > 0.15 {
                        pattern |= 1 << bit;
                        avg_color += c;
                        lit_count += 1;
                    }
                }
            }
            if lit_count > 0 {
                avg_color /= lit_count as f64;
            }
            let braille_char = char::from_u32(0x2800 + pattern as u32).unwrap_or(' ');
            let (r, g, b) = avg_color.to_rgb8();
            let _ = write!(
                out,
                "{}",
                braille_char.to_string().with(style::Color::Rgb { r, g, b })
            );
        }
        let _ = writeln!(out);
    }
}

/// Encodes a display-ready (already gamma-corrected, clamped) frame as an
/// 8-bit PNG via the `image` crate.
pub fn write_png(frame: &[Color], width: u32, height: u32, path: &str) -> Result<(), AssetLoadError> {
    let mut bytes = Vec::with_capacity(frame.len() * 3);
    for c in frame {
        let (r, g, b) = c.to_rgb8();
        bytes.extend_from_slice(&[r, g, b]);
    }
    image::save_buffer(path, &bytes, width, height, image::ColorType::Rgb8).map_err(|source| {
        AssetLoadError::Image {
            path: path.to_string(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSink {
        frames: usize,
    }

    impl DisplaySink for NullSink {
        fn update(&mut self, frame: &[Color], _width: u32, _height: u32) {
            self.frames += 1;
            let _ = frame;
        }
    }

    #[test]
    fn null_sink_counts_updates() {
        let mut sink = NullSink { frames: 0 };
        sink.update(&[Color::zero(); 4], 2, 2);
        sink.update(&[Color::zero(); 4], 2, 2);
        assert_eq!(sink.frames, 2);
    }
}
