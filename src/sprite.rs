/// Sprite sheets, frame handles and direction-indexed animation.
///
/// Image data never enters the core: a [`Frame`] only names the sheet and
/// the cell inside it, and the presentation layer resolves it to pixels.
/// Masks are kept here because collisions are decided by the core.
use std::rc::Rc;

use crate::body::{Body, Mask};
use crate::vector::Direction;

/// Opaque handle to one cell of a sprite sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub sheet: Rc<str>,
    pub row: usize,
    pub col: usize,
}

/// Masks for every cell of a sheet, indexed `[row][col]`.
///
/// Facing sheets have one row per [`Direction`], in clockwise order from
/// north; single-row sheets are used for sprites that never turn.
#[derive(Debug)]
pub struct SpriteSheet {
    name: Rc<str>,
    frame_width: usize,
    frame_height: usize,
    masks: Vec<Vec<Rc<Mask>>>,
}

impl SpriteSheet {
    /// A sheet whose frames are fully solid rectangles.
    pub fn solid(name: &str, frame_width: usize, frame_height: usize, rows: usize, cols: usize) -> Self {
        let mask = Rc::new(Mask::filled(frame_width, frame_height));
        let masks = (0..rows.max(1))
            .map(|_| vec![Rc::clone(&mask); cols.max(1)])
            .collect();
        SpriteSheet {
            name: Rc::from(name),
            frame_width,
            frame_height,
            masks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame_width(&self) -> usize {
        self.frame_width
    }

    pub fn frame_height(&self) -> usize {
        self.frame_height
    }

    pub fn rows(&self) -> usize {
        self.masks.len()
    }

    /// Frame count of the given row (rows are clamped into range).
    pub fn cols(&self, row: usize) -> usize {
        self.masks[row.min(self.masks.len() - 1)].len()
    }

    /// Mask and frame handle for a cell, clamping out-of-range indices.
    pub fn frame(&self, row: usize, col: usize) -> (Rc<Mask>, Frame) {
        let row = row.min(self.masks.len() - 1);
        let col = col % self.masks[row].len();
        (
            Rc::clone(&self.masks[row][col]),
            Frame {
                sheet: Rc::clone(&self.name),
                row,
                col,
            },
        )
    }

    /// A still body showing the sheet's first frame.
    pub fn still_body(&self) -> Body {
        let (mask, frame) = self.frame(0, 0);
        Body::new(mask, Some(frame))
    }
}

// ── Animation ─────────────────────────────────────────────────────────────────

/// Cycles through the frames of the row matching the current facing,
/// one frame every `delay` ticks.
#[derive(Clone, Debug)]
pub struct Animation {
    sheet: Rc<SpriteSheet>,
    delay: u32,
    facing: Direction,
    frame: usize,
    step: u32,
}

impl Animation {
    pub fn new(sheet: Rc<SpriteSheet>, delay: u32) -> Self {
        Animation {
            sheet,
            delay,
            facing: Direction::North,
            frame: 0,
            step: 0,
        }
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn set_facing(&mut self, facing: Direction) {
        self.facing = facing;
    }

    pub fn current_frame(&self) -> usize {
        self.frame
    }

    /// Advances the frame counter by one tick.
    pub fn tick(&mut self) {
        self.step += 1;
        if self.step >= self.delay {
            self.step = 0;
            self.frame = (self.frame + 1) % self.sheet.cols(self.row());
        }
    }

    /// Copies the current frame and mask onto `body`.
    pub fn apply(&self, body: &mut Body) {
        let (mask, frame) = self.sheet.frame(self.row(), self.frame);
        body.set_frame(mask, Some(frame));
    }

    /// A body showing the current frame.
    pub fn body(&self) -> Body {
        let (mask, frame) = self.sheet.frame(self.row(), self.frame);
        Body::new(mask, Some(frame))
    }

    fn row(&self) -> usize {
        if self.sheet.rows() >= Direction::ALL.len() {
            self.facing.index()
        } else {
            0
        }
    }
}
