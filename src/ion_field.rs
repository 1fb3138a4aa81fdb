/// The neutral zone: a rectangle of flickering colour noise.
///
/// Purely decorative; nothing collides with it. The shrinking variant is
/// the explosion shown when a level is cleared.
use rand::Rng;

use crate::body::Rect;

/// Noise colours. Half the entries are black so the field looks sparse.
pub const ION_PALETTE: [(u8, u8, u8); 14] = [
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (255, 0, 0),
    (0, 255, 0),
    (0, 0, 255),
    (200, 150, 0),
    (200, 200, 0),
    (150, 0, 200),
    (0, 150, 200),
];

#[derive(Clone, Debug)]
pub struct IonField {
    area: Rect,
    noise_width: i32,
    noise_height: i32,
    delay: u32,
    tick: u32,
    /// Palette index per noise block, row-major.
    noise: Vec<u8>,
}

impl IonField {
    pub fn new(area: Rect, noise_width: i32, noise_height: i32, delay: u32) -> Self {
        let mut field = IonField {
            area,
            noise_width: noise_width.max(1),
            noise_height: noise_height.max(1),
            delay: delay.max(1),
            tick: 0,
            noise: Vec::new(),
        };
        field.noise = vec![0; field.block_count()];
        field
    }

    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.tick += 1;
        if self.tick % self.delay == 0 {
            self.generate_noise(rng);
        }
    }

    pub fn generate_noise<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let count = self.block_count();
        self.noise.clear();
        self.noise
            .extend((0..count).map(|_| rng.gen_range(0..ION_PALETTE.len()) as u8));
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Every noise block with its palette index, clipped to the field.
    pub fn blocks(&self) -> impl Iterator<Item = (Rect, u8)> + '_ {
        let cols = self.block_cols();
        self.noise.iter().enumerate().map(move |(i, &colour)| {
            let col = (i % cols.max(1)) as i32;
            let row = (i / cols.max(1)) as i32;
            let left = self.area.left + col * self.noise_width;
            let top = self.area.top + row * self.noise_height;
            let width = self.noise_width.min(self.area.right() - left);
            let height = self.noise_height.min(self.area.bottom() - top);
            (Rect::new(left, top, width, height), colour)
        })
    }

    fn block_cols(&self) -> usize {
        ceil_div(self.area.width, self.noise_width)
    }

    fn block_rows(&self) -> usize {
        ceil_div(self.area.height, self.noise_height)
    }

    fn block_count(&self) -> usize {
        self.block_cols() * self.block_rows()
    }

    /// Cuts `amount` pixels off the height, `from_top` of them off the top.
    /// Existing noise rows are kept, trimmed evenly from both ends.
    fn shrink(&mut self, amount: i32, from_top: i32) {
        let before = self.block_rows();
        let shrink = amount.min(self.area.height).max(0);
        self.area.height -= shrink;
        self.area.top += from_top.min(shrink);

        let after = self.block_rows();
        let cols = self.block_cols();
        let dropped = before.saturating_sub(after);
        let head = (dropped / 2) * cols;
        self.noise.drain(..head.min(self.noise.len()));
        self.noise.truncate(after * cols);
    }
}

fn ceil_div(total: i32, step: i32) -> usize {
    if total <= 0 {
        0
    } else {
        ((total + step - 1) / step) as usize
    }
}

// ── Shrinking variant ─────────────────────────────────────────────────────────

/// An ion field that collapses toward its horizontal midline every tick.
#[derive(Clone, Debug)]
pub struct ShrinkingIonField {
    field: IonField,
    shrink_rate: i32,
    crop_top: i32,
}

impl ShrinkingIonField {
    pub fn new(field: IonField, shrink_rate: i32) -> Self {
        ShrinkingIonField {
            field,
            shrink_rate,
            crop_top: shrink_rate / 2,
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.field.shrink(self.shrink_rate, self.crop_top);
        self.field.update(rng);
    }

    pub fn is_collapsed(&self) -> bool {
        self.field.area().height <= 0
    }

    pub fn field(&self) -> &IonField {
        &self.field
    }
}
