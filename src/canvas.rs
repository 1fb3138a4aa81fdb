/// The boundary with the presentation layer: decoded input in, draw calls out.
use crate::body::{Body, Rect};
use crate::sprite::Frame;
use crate::vector::Direction;

/// One tick's worth of already-decoded input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Input {
    /// The held direction, if any.
    pub direction: Option<Direction>,
    /// Action (shoot / confirm) pressed this tick.
    pub action: bool,
    pub quit: bool,
}

impl Input {
    pub fn idle() -> Self {
        Input::default()
    }

    pub fn moving(direction: Direction) -> Self {
        Input {
            direction: Some(direction),
            ..Input::default()
        }
    }

    pub fn action() -> Self {
        Input {
            action: true,
            ..Input::default()
        }
    }

    pub fn quit() -> Self {
        Input {
            quit: true,
            ..Input::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    /// `(x, y)` is the middle of the text's left edge.
    Left,
    /// `(x, y)` is the text's center.
    Center,
    /// `(x, y)` is the middle of the text's right edge.
    Right,
}

/// Drawing surface supplied by the presentation layer.
pub trait Canvas {
    /// Draws one sprite-sheet frame with its top-left at `rect`'s.
    fn blit(&mut self, frame: &Frame, rect: Rect);

    /// Fills a rectangle with a solid colour.
    fn fill(&mut self, rect: Rect, colour: (u8, u8, u8));

    fn text(&mut self, text: &str, x: i32, y: i32, align: Align);
}

/// Blits `body` if it has anything to show.
pub fn draw_body<C: Canvas + ?Sized>(canvas: &mut C, body: &Body) {
    if let Some(frame) = body.frame() {
        canvas.blit(frame, body.rect());
    }
}
