/// Rendering layer: all terminal I/O lives here.
///
/// The core draws in an 800x600-style logical playfield; [`TerminalCanvas`]
/// scales every call onto the terminal grid and queues crossterm commands.
/// Sprites are drawn as coloured glyph blocks chosen by sheet file name.
use std::io::{self, Write};
use std::path::Path;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use yars_revenge::body::Rect;
use yars_revenge::canvas::{Align, Canvas};
use yars_revenge::game::GameManager;
use yars_revenge::sprite::Frame;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_SHIP: Color = Color::Yellow;
const C_MOVER: Color = Color::Red;
const C_SPINNER: Color = Color::Magenta;
const C_SHOOTER: Color = Color::DarkRed;
const C_CELL: Color = Color::DarkYellow;
const C_HOMER: Color = Color::White;
const C_BULLET: Color = Color::Cyan;
const C_CANNON: Color = Color::Green;
const C_TEXT: Color = Color::White;
const C_UNKNOWN: Color = Color::DarkGrey;

/// Arrow per facing row, clockwise from north.
const SHIP_GLYPHS: [char; 8] = ['▲', '◥', '▶', '◢', '▼', '◣', '◀', '◤'];

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, game: &GameManager) -> io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let screen = &game.config().screen;

    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let mut canvas = TerminalCanvas::new(out, cols, rows, screen.width, screen.height);
    game.draw(&mut canvas);
    canvas.finish()?;

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()
}

// ── Canvas ────────────────────────────────────────────────────────────────────

/// A [`Canvas`] over a crossterm writer. The first I/O error is kept and
/// reported by [`TerminalCanvas::finish`]; later draw calls are skipped.
pub struct TerminalCanvas<'a, W: Write> {
    out: &'a mut W,
    cols: u16,
    rows: u16,
    world_width: i32,
    world_height: i32,
    error: Option<io::Error>,
}

impl<'a, W: Write> TerminalCanvas<'a, W> {
    pub fn new(out: &'a mut W, cols: u16, rows: u16, world_width: i32, world_height: i32) -> Self {
        TerminalCanvas {
            out,
            cols: cols.max(1),
            rows: rows.max(1),
            world_width: world_width.max(1),
            world_height: world_height.max(1),
            error: None,
        }
    }

    pub fn finish(self) -> io::Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn column(&self, x: i32) -> i64 {
        i64::from(x) * i64::from(self.cols) / i64::from(self.world_width)
    }

    fn row(&self, y: i32) -> i64 {
        i64::from(y) * i64::from(self.rows) / i64::from(self.world_height)
    }

    /// Terminal cells covered by `rect`, at least one cell wide and tall.
    /// `None` when it is entirely off screen.
    fn cells(&self, rect: Rect) -> Option<(u16, u16, u16, u16)> {
        let left = self.column(rect.left);
        let top = self.row(rect.top);
        let right = self.column(rect.right()).max(left + 1);
        let bottom = self.row(rect.bottom()).max(top + 1);

        let clamp_x = |v: i64| v.clamp(0, i64::from(self.cols)) as u16;
        let clamp_y = |v: i64| v.clamp(0, i64::from(self.rows)) as u16;
        let (left, right) = (clamp_x(left), clamp_x(right));
        let (top, bottom) = (clamp_y(top), clamp_y(bottom));
        (left < right && top < bottom).then_some((left, top, right, bottom))
    }

    fn paint(&mut self, rect: Rect, glyph: char, colour: Color) {
        let Some((left, top, right, bottom)) = self.cells(rect) else {
            return;
        };
        let line: String = std::iter::repeat(glyph).take(usize::from(right - left)).collect();
        for row in top..bottom {
            self.queue(left, row, &line, colour);
        }
    }

    fn queue(&mut self, col: u16, row: u16, text: &str, colour: Color) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = print_at(self.out, col, row, text, colour) {
            self.error = Some(err);
        }
    }
}

fn print_at<W: Write>(out: &mut W, col: u16, row: u16, text: &str, colour: Color) -> io::Result<()> {
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(colour))?;
    out.queue(Print(text))?;
    Ok(())
}

impl<W: Write> Canvas for TerminalCanvas<'_, W> {
    fn blit(&mut self, frame: &Frame, rect: Rect) {
        let (glyph, colour) = glyph_for(frame);
        self.paint(rect, glyph, colour);
    }

    fn fill(&mut self, rect: Rect, colour: (u8, u8, u8)) {
        if colour == (0, 0, 0) {
            return;
        }
        let (r, g, b) = colour;
        self.paint(rect, '░', Color::Rgb { r, g, b });
    }

    fn text(&mut self, text: &str, x: i32, y: i32, align: Align) {
        let width = text.chars().count() as i64;
        let col = self.column(x);
        let start = match align {
            Align::Left => col,
            Align::Center => col - width / 2,
            Align::Right => col - width,
        };
        let row = self.row(y).clamp(0, i64::from(self.rows) - 1) as u16;
        let start = start.clamp(0, i64::from(self.cols) - 1) as u16;
        self.queue(start, row, text, C_TEXT);
    }
}

/// Glyph and colour for a sprite, keyed by the sheet's file stem.
fn glyph_for(frame: &Frame) -> (char, Color) {
    let stem = Path::new(&*frame.sheet)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    match stem {
        "ship" => (SHIP_GLYPHS[frame.row % SHIP_GLYPHS.len()], C_SHIP),
        "mover_base" => ('▓', C_MOVER),
        "spinner" => ('✱', C_SPINNER),
        "shooter" => ('◆', C_SHOOTER),
        "cell" => ('▒', C_CELL),
        "homer" => ('•', C_HOMER),
        "bullet" => ('·', C_BULLET),
        "cannon" => ('■', C_CANNON),
        _ => ('?', C_UNKNOWN),
    }
}
