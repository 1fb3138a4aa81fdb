/// Geometry and pixel-exact collision.
///
/// A [`Body`] is what every actor state owns: a real-valued center, an
/// integer bounding [`Rect`] derived from it, the [`Mask`] used for hit tests
/// and the [`Frame`] the presentation layer should blit.
use std::rc::Rc;

use crate::sprite::Frame;
use crate::vector::Vector2;

// ── Rect ──────────────────────────────────────────────────────────────────────

/// Integer screen rectangle. `right` and `bottom` are exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Rect {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub fn center_x(&self) -> i32 {
        self.left + self.width / 2
    }

    pub fn center_y(&self) -> i32 {
        self.top + self.height / 2
    }

    pub fn center(&self) -> Vector2 {
        Vector2::new(self.center_x() as f64, self.center_y() as f64)
    }

    pub fn top_left(&self) -> (i32, i32) {
        (self.left, self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

// ── Mask ──────────────────────────────────────────────────────────────────────

/// Row-major bit grid; `true` means the pixel is solid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Mask {
    pub fn empty(width: usize, height: usize) -> Self {
        Mask {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    pub fn filled(width: usize, height: usize) -> Self {
        Mask {
            width,
            height,
            bits: vec![true; width * height],
        }
    }

    /// Builds a mask from text rows where `#` or `x` marks a solid pixel.
    /// Shorter rows are padded with empty pixels.
    pub fn from_rows(rows: &[&str]) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut mask = Mask::empty(width, rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if c == '#' || c == 'x' {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    /// Builds a mask from an alpha channel; pixels above 127 are solid.
    /// Missing alpha values count as transparent.
    pub fn from_alpha(width: usize, height: usize, alpha: &[u8]) -> Self {
        let bits = (0..width * height)
            .map(|i| alpha.get(i).is_some_and(|&a| a > 127))
            .collect();
        Mask {
            width,
            height,
            bits,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, solid: bool) {
        if x < self.width && y < self.height {
            self.bits[y * self.width + x] = solid;
        }
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// True if any solid pixel of `other`, placed at `(dx, dy)` relative to
    /// this mask's top-left, lands on a solid pixel of this mask.
    pub fn overlap(&self, other: &Mask, dx: i32, dy: i32) -> bool {
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = (self.width as i32).min(dx + other.width as i32);
        let y1 = (self.height as i32).min(dy + other.height as i32);

        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x as usize, y as usize)
                    && other.get((x - dx) as usize, (y - dy) as usize)
                {
                    return true;
                }
            }
        }
        false
    }
}

// ── Body ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Body {
    center: Vector2,
    width: i32,
    height: i32,
    mask: Rc<Mask>,
    frame: Option<Frame>,
}

impl Body {
    /// A body whose size is taken from its mask, centered on the origin.
    pub fn new(mask: Rc<Mask>, frame: Option<Frame>) -> Self {
        Body {
            center: Vector2::ZERO,
            width: mask.width() as i32,
            height: mask.height() as i32,
            mask,
            frame,
        }
    }

    pub fn with_center(mut self, center: Vector2) -> Self {
        self.center = center;
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.center.x.round() as i32 - self.width / 2,
            self.center.y.round() as i32 - self.height / 2,
            self.width,
            self.height,
        )
    }

    pub fn center(&self) -> Vector2 {
        self.center
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Swaps the displayed frame and its mask; the center stays put.
    pub fn set_frame(&mut self, mask: Rc<Mask>, frame: Option<Frame>) {
        self.width = mask.width() as i32;
        self.height = mask.height() as i32;
        self.mask = mask;
        self.frame = frame;
    }

    pub fn set_center(&mut self, center: Vector2) {
        self.center = center;
    }

    pub fn translate(&mut self, delta: Vector2) {
        self.center += delta;
    }

    pub fn set_left(&mut self, left: i32) {
        self.center.x = (left + self.width / 2) as f64;
    }

    pub fn set_right(&mut self, right: i32) {
        self.set_left(right - self.width);
    }

    pub fn set_top(&mut self, top: i32) {
        self.center.y = (top + self.height / 2) as f64;
    }

    pub fn set_bottom(&mut self, bottom: i32) {
        self.set_top(bottom - self.height);
    }

    pub fn set_center_y(&mut self, y: f64) {
        self.center.y = y;
    }

    pub fn set_top_left(&mut self, left: i32, top: i32) {
        self.set_left(left);
        self.set_top(top);
    }

    pub fn set_top_right(&mut self, right: i32, top: i32) {
        self.set_right(right);
        self.set_top(top);
    }

    pub fn set_mid_left(&mut self, left: i32, center_y: i32) {
        self.set_left(left);
        self.center.y = center_y as f64;
    }
}

/// Pixel-exact hit test between two bodies.
pub fn collide(a: &Body, b: &Body) -> bool {
    let ra = a.rect();
    let rb = b.rect();
    if !ra.intersects(&rb) {
        return false;
    }
    a.mask().overlap(b.mask(), rb.left - ra.left, rb.top - ra.top)
}
