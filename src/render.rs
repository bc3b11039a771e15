use crate::camera::Camera;
use crate::canvas::{Canvas, Rgb};
use crate::config::Encoding;
use crate::draw::Label;
use anyhow::Context;
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use glam::Vec2;
use std::io::{self, Write};

const UPPER_HALF: char = '\u{2580}';
/// Weight of the brightest sample against the area average when a terminal
/// pixel covers several canvas pixels. Keeps 1 px stars visible.
const PEAK_WEIGHT: f32 = 0.5;
const BRAILLE_INK: f32 = 24.0;
const LABEL_GLOW: f32 = 0.6;
const LABEL_PAD_GLOW: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.cells[self.idx(x, y)])
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
}

fn rgb_color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

fn color_rgb(c: Color) -> Rgb {
    match c {
        Color::Rgb { r, g, b } => Rgb::new(r, g, b),
        Color::White => Rgb::WHITE,
        _ => Rgb::BLACK,
    }
}

/// What a cell looks like from a distance: the mix of its colours.
fn cell_tone(c: Cell, encoding: Encoding) -> Rgb {
    match encoding {
        Encoding::Blocks => color_rgb(c.fg).mix(color_rgb(c.bg), 0.5),
        Encoding::Braille if c.ch == ' ' => color_rgb(c.bg),
        Encoding::Braille => color_rgb(c.fg),
    }
}

/// Maps terminal pixels to canvas pixels: letterbox fit of the logical
/// surface into the terminal pixel grid, then the inverse camera transform.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Projection {
    /// logical surface size (the canvas size)
    surface: Vec2,
    /// terminal pixels per surface pixel
    scale: f32,
    /// top-left of the fitted surface, in terminal pixels
    origin: Vec2,
    camera: Camera,
}

impl Projection {
    pub(crate) fn fit(surface: Vec2, pixels: Vec2, camera: Camera) -> Self {
        let scale = (pixels.x / surface.x).min(pixels.y / surface.y).max(1e-6);
        let origin = (pixels - surface * scale) * 0.5;
        Self {
            surface,
            scale,
            origin,
            camera,
        }
    }

    fn unclipped(&self, p: Vec2) -> Vec2 {
        self.camera.to_canvas((p - self.origin) / self.scale, self.surface)
    }

    /// Canvas position seen at terminal pixel `p`, or `None` in the letterbox.
    pub(crate) fn to_canvas(&self, p: Vec2) -> Option<Vec2> {
        let s = (p - self.origin) / self.scale;
        if s.x < 0.0 || s.y < 0.0 || s.x >= self.surface.x || s.y >= self.surface.y {
            return None;
        }
        Some(self.camera.to_canvas(s, self.surface))
    }

    pub(crate) fn to_pixels(&self, canvas: Vec2) -> Vec2 {
        self.camera.to_surface(canvas, self.surface) * self.scale + self.origin
    }

    /// Colour of terminal pixel (x, y): box filter over every canvas pixel
    /// in its footprint, average blended with the peak.
    fn sample(&self, canvas: &Canvas, x: u32, y: u32) -> Rgb {
        let p = Vec2::new(x as f32, y as f32);
        if self.to_canvas(p + Vec2::splat(0.5)).is_none() {
            return Rgb::BLACK;
        }
        let a = self.unclipped(p);
        let b = self.unclipped(p + Vec2::ONE);
        let (x0, y0) = (a.x.floor() as i32, a.y.floor() as i32);
        let x1 = (b.x.ceil() as i32).max(x0 + 1);
        let y1 = (b.y.ceil() as i32).max(y0 + 1);

        let (mut sr, mut sg, mut sb) = (0u32, 0u32, 0u32);
        let mut peak = Rgb::BLACK;
        let mut taken = 0u32;
        for cy in y0..y1 {
            for cx in x0..x1 {
                let px = canvas.get(cx, cy).unwrap_or(Rgb::BLACK);
                sr += px.r as u32;
                sg += px.g as u32;
                sb += px.b as u32;
                taken += 1;
                if px.luma() > peak.luma() {
                    peak = px;
                }
            }
        }
        let avg = Rgb::new((sr / taken) as u8, (sg / taken) as u8, (sb / taken) as u8);
        avg.mix(peak, PEAK_WEIGHT)
    }
}

/// Terminal pixel grid for a cell grid.
pub(crate) fn pixel_size(cols: u16, rows: u16, encoding: Encoding) -> Vec2 {
    match encoding {
        Encoding::Blocks => Vec2::new(cols as f32, rows as f32 * 2.0),
        Encoding::Braille => Vec2::new(cols as f32 * 2.0, rows as f32 * 4.0),
    }
}

fn cell_of_pixel(p: Vec2, encoding: Encoding) -> (i32, i32) {
    match encoding {
        Encoding::Blocks => (p.x.floor() as i32, (p.y / 2.0).floor() as i32),
        Encoding::Braille => ((p.x / 2.0).floor() as i32, (p.y / 4.0).floor() as i32),
    }
}

/// Upper-half blocks: foreground paints the top pixel, background the bottom.
pub(crate) fn encode_blocks(canvas: &Canvas, proj: &Projection, out: &mut CellBuffer) {
    for cy in 0..out.h {
        for cx in 0..out.w {
            let top = proj.sample(canvas, cx as u32, cy as u32 * 2);
            let bottom = proj.sample(canvas, cx as u32, cy as u32 * 2 + 1);
            out.set(
                cx,
                cy,
                Cell {
                    ch: UPPER_HALF,
                    fg: rgb_color(top),
                    bg: rgb_color(bottom),
                },
            );
        }
    }
}

/* -----------------------------
   Braille encoding: 2×4 pixels -> U+2800..U+28FF
------------------------------ */

fn braille_bit(dx: u32, dy: u32) -> u8 {
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

pub(crate) fn encode_braille(canvas: &Canvas, proj: &Projection, out: &mut CellBuffer) {
    for cy in 0..out.h as u32 {
        for cx in 0..out.w as u32 {
            let mut mask: u8 = 0;
            let (mut sum_r, mut sum_g, mut sum_b) = (0u32, 0u32, 0u32);
            let mut ink = 0u32;

            for dy in 0..4 {
                for dx in 0..2 {
                    let p = proj.sample(canvas, cx * 2 + dx, cy * 4 + dy);
                    if p.luma() >= BRAILLE_INK {
                        mask |= braille_bit(dx, dy);
                        sum_r += p.r as u32;
                        sum_g += p.g as u32;
                        sum_b += p.b as u32;
                        ink += 1;
                    }
                }
            }

            let cell = if ink == 0 {
                Cell {
                    ch: ' ',
                    fg: Color::White,
                    bg: Color::Black,
                }
            } else {
                Cell {
                    ch: char::from_u32(0x2800 + mask as u32).unwrap_or(' '),
                    fg: rgb_color(Rgb::new(
                        (sum_r / ink) as u8,
                        (sum_g / ink) as u8,
                        (sum_b / ink) as u8,
                    )),
                    bg: Color::Black,
                }
            };
            out.set(cx as u16, cy as u16, cell);
        }
    }
}

/// Writes labels centred on their projected anchors. The glow colour is
/// blended into the background of the text cells and, more weakly, into
/// one padding cell either side.
pub(crate) fn overlay_labels(
    out: &mut CellBuffer,
    labels: &[Label],
    proj: &Projection,
    encoding: Encoding,
) {
    for label in labels {
        let (ax, ay) = cell_of_pixel(proj.to_pixels(label.anchor), encoding);
        if ay < 0 || ay >= out.h as i32 {
            continue;
        }
        let len = label.text.chars().count() as i32;
        let x0 = ax - len / 2;

        for (x, strength) in [(x0 - 1, LABEL_PAD_GLOW), (x0 + len, LABEL_PAD_GLOW)] {
            if x < 0 || x >= out.w as i32 {
                continue;
            }
            let (x, y) = (x as u16, ay as u16);
            if let Some(mut cell) = out.get(x, y) {
                let tone = cell_tone(cell, encoding);
                let bg = rgb_color(tone.mix(label.glow, strength));
                if encoding == Encoding::Blocks {
                    // keep the half-block look: both halves take the glow
                    cell.fg = rgb_color(color_rgb(cell.fg).mix(label.glow, strength));
                }
                cell.bg = bg;
                out.set(x, y, cell);
            }
        }

        for (i, ch) in label.text.chars().enumerate() {
            let x = x0 + i as i32;
            if x < 0 || x >= out.w as i32 {
                continue;
            }
            let (x, y) = (x as u16, ay as u16);
            if let Some(cell) = out.get(x, y) {
                let tone = cell_tone(cell, encoding);
                out.set(
                    x,
                    y,
                    Cell {
                        ch,
                        fg: rgb_color(label.fg),
                        bg: rgb_color(tone.mix(label.glow, LABEL_GLOW)),
                    },
                );
            }
        }
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x as usize + i;
        if xx >= buf.w as usize {
            break;
        }
        buf.set(xx as u16, y, Cell { ch, fg, bg });
    }
}

/// Undoes everything `Terminal::begin` turns on except raw mode.
fn restore<W: Write>(out: &mut W) -> io::Result<()> {
    queue!(
        out,
        BeginSynchronizedUpdate,
        ResetColor,
        Clear(ClearType::All),
        cursor::Show,
        EnableLineWrap,
        EndSynchronizedUpdate,
        LeaveAlternateScreen
    )?;
    out.flush()
}

/// Runs terminal setup; if any step fails the screen and raw mode are put
/// back before the error is returned.
fn rollback_on_error<W: Write, T>(
    out: &mut W,
    setup: impl FnOnce(&mut W) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    setup(out).map_err(|e| {
        let _ = restore(out);
        let _ = terminal::disable_raw_mode();
        e
    })
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin(title: &str) -> anyhow::Result<Self> {
        let mut out = io::stdout();
        let (cols, rows) = rollback_on_error(&mut out, |out| {
            execute!(
                out,
                EnterAlternateScreen,
                SetTitle(title),
                cursor::Hide,
                DisableLineWrap,
                Clear(ClearType::All)
            )
            .context("could not enter the alternate screen")?;
            terminal::enable_raw_mode().context("could not enable raw mode")?;
            terminal::size().context("could not read terminal size")
        })?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        restore(&mut self.out)?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    /// Writes changed cells only, inside a synchronized update.
    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}
