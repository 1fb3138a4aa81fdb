/// The destructible cell shield wrapped around the enemy base.
///
/// Cells keep a fixed offset from the base's top-left corner, given by a
/// rectangular [`Formation`] and the formation cell pinned to that corner
/// (the anchor). Cells are only ever removed, never added, so the grid
/// shape is fixed for the shield's lifetime.
use std::rc::Rc;

use tracing::debug;

use crate::body::{collide, Body, Rect};
use crate::error::{Error, Result};
use crate::sprite::SpriteSheet;

/// Offsets destroyed by [`Shield::remove_cross`]: the struck cell plus its
/// E, NE, SE and second-E neighbours, as (row, col) deltas.
const CROSS: [(isize, isize); 5] = [(0, 0), (0, 1), (-1, 1), (1, 1), (0, 2)];

// ── Formation ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormationCell {
    Empty,
    Present,
}

/// A validated shield layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Formation {
    cells: Vec<Vec<FormationCell>>,
    anchor: (usize, usize),
}

impl Formation {
    /// Builds a formation from `0` (empty) / `1` (present) rows.
    /// Any other entry is a configuration error.
    pub fn from_layout(layout: &[Vec<u8>], anchor: (usize, usize)) -> Result<Self> {
        let cols = layout.first().map_or(0, Vec::len);
        if cols == 0 {
            return Err(Error::EmptyFormation);
        }

        let mut cells = Vec::with_capacity(layout.len());
        for (row, entries) in layout.iter().enumerate() {
            if entries.len() != cols {
                return Err(Error::RaggedFormation {
                    row,
                    expected: cols,
                    found: entries.len(),
                });
            }
            let parsed = entries
                .iter()
                .enumerate()
                .map(|(col, &value)| match value {
                    0 => Ok(FormationCell::Empty),
                    1 => Ok(FormationCell::Present),
                    _ => Err(Error::MalformedFormation { row, col, value }),
                })
                .collect::<Result<Vec<_>>>()?;
            cells.push(parsed);
        }

        let (anchor_row, anchor_col) = anchor;
        if anchor_row >= cells.len() || anchor_col >= cols {
            return Err(Error::AnchorOutOfBounds {
                row: anchor_row,
                col: anchor_col,
                rows: cells.len(),
                cols,
            });
        }

        Ok(Formation { cells, anchor })
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells[0].len()
    }

    pub fn anchor(&self) -> (usize, usize) {
        self.anchor
    }

    pub fn is_present(&self, row: usize, col: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .is_some_and(|&c| c == FormationCell::Present)
    }

    pub fn present_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&c| c == FormationCell::Present)
            .count()
    }
}

// ── Cells ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub const fn new(row: usize, col: usize) -> Self {
        CellPos { row, col }
    }
}

#[derive(Clone, Debug)]
pub struct Cell {
    pos: CellPos,
    row_offset: i32,
    col_offset: i32,
    body: Body,
    marked: bool,
    marked_ticks: u32,
}

impl Cell {
    pub fn pos(&self) -> CellPos {
        self.pos
    }

    /// Grid distance from the anchor, as (rows, cols).
    pub fn offset(&self) -> (i32, i32) {
        (self.row_offset, self.col_offset)
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    pub fn is_marked(&self) -> bool {
        self.marked
    }

    fn mark(&mut self) {
        self.marked = true;
        self.marked_ticks = 0;
    }

    fn follow(&mut self, target: &Rect, cell_width: i32, cell_height: i32) {
        self.body.set_top_left(
            target.left + self.col_offset * cell_width,
            target.top + self.row_offset * cell_height,
        );
    }

    fn tick_mark(&mut self, mark_ticks: u32) {
        if self.marked {
            if self.marked_ticks >= mark_ticks {
                self.marked = false;
            } else {
                self.marked_ticks += 1;
            }
        }
    }
}

/// What a body bumping into a cell achieved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strike {
    /// The cell was fresh and is now marked.
    Marked,
    /// The cell was marked and has been eaten; the eat cooldown started.
    Eaten,
    /// The cell is marked but the shield is still digesting.
    Cooldown,
    /// No cell at that position.
    Missing,
}

// ── Shield ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct ShieldArgs {
    pub sheet: Rc<SpriteSheet>,
    /// Ticks after an eat during which no other cell may be eaten.
    pub eat_delay: u32,
    /// Ticks a marked cell stays marked.
    pub mark_ticks: u32,
}

#[derive(Debug)]
pub struct Shield {
    grid: Vec<Vec<Option<Cell>>>,
    anchor: (usize, usize),
    cell_width: i32,
    cell_height: i32,
    eat_delay: u32,
    mark_ticks: u32,
    delay: u32,
}

impl Shield {
    /// Lays the formation out around `target`'s current position.
    pub fn new(formation: &Formation, args: &ShieldArgs, target: &Rect) -> Self {
        let (anchor_row, anchor_col) = formation.anchor();
        let cell_width = args.sheet.frame_width() as i32;
        let cell_height = args.sheet.frame_height() as i32;

        let grid = (0..formation.rows())
            .map(|row| {
                (0..formation.cols())
                    .map(|col| {
                        formation.is_present(row, col).then(|| {
                            let mut cell = Cell {
                                pos: CellPos::new(row, col),
                                row_offset: row as i32 - anchor_row as i32,
                                col_offset: col as i32 - anchor_col as i32,
                                body: args.sheet.still_body(),
                                marked: false,
                                marked_ticks: 0,
                            };
                            cell.follow(target, cell_width, cell_height);
                            cell
                        })
                    })
                    .collect()
            })
            .collect();

        Shield {
            grid,
            anchor: formation.anchor(),
            cell_width,
            cell_height,
            eat_delay: args.eat_delay,
            mark_ticks: args.mark_ticks,
            delay: 0,
        }
    }

    /// One tick. Cells only track `target` while `followable`; mark timers
    /// and the eat cooldown run regardless.
    pub fn update(&mut self, target: &Rect, followable: bool) {
        let (width, height, mark_ticks) = (self.cell_width, self.cell_height, self.mark_ticks);
        for cell in self.grid.iter_mut().flatten().flatten() {
            if followable {
                cell.follow(target, width, height);
            }
            cell.tick_mark(mark_ticks);
        }

        self.delay = self.delay.saturating_sub(1);
    }

    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    pub fn cols(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    pub fn anchor(&self) -> (usize, usize) {
        self.anchor
    }

    /// Live cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.grid.iter().flatten().flatten()
    }

    pub fn len(&self) -> usize {
        self.cells().count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells().next().is_none()
    }

    pub fn get(&self, pos: CellPos) -> Option<&Cell> {
        self.grid.get(pos.row)?.get(pos.col)?.as_ref()
    }

    /// Live cells touching `body`, in row-major order.
    pub fn colliding(&self, body: &Body) -> Vec<CellPos> {
        self.cells()
            .filter(|cell| collide(body, &cell.body))
            .map(Cell::pos)
            .collect()
    }

    pub fn first_colliding(&self, body: &Body) -> Option<CellPos> {
        self.cells().find(|cell| collide(body, &cell.body)).map(Cell::pos)
    }

    /// Destroys one cell. Returns it if there was one.
    pub fn remove(&mut self, pos: CellPos) -> Option<Cell> {
        self.grid.get_mut(pos.row)?.get_mut(pos.col)?.take()
    }

    /// Destroys the cell at `pos` and its E, NE, SE and second-E
    /// neighbours. Positions off the grid are skipped. Returns how many
    /// cells were destroyed.
    pub fn remove_cross(&mut self, pos: CellPos) -> usize {
        let removed = CROSS
            .iter()
            .filter_map(|&(dr, dc)| {
                let row = pos.row.checked_add_signed(dr)?;
                let col = pos.col.checked_add_signed(dc)?;
                self.remove(CellPos::new(row, col))
            })
            .count();
        debug!(row = pos.row, col = pos.col, removed, "shield cross removal");
        removed
    }

    /// Marks a fresh cell or eats a marked one, as described by [`Strike`].
    pub fn strike(&mut self, pos: CellPos) -> Strike {
        let can_eat = self.can_eat();
        let Some(cell) = self.grid.get_mut(pos.row).and_then(|r| r.get_mut(pos.col)) else {
            return Strike::Missing;
        };
        let Some(live) = cell.as_mut() else {
            return Strike::Missing;
        };

        if !live.marked {
            live.mark();
            debug!(row = pos.row, col = pos.col, "shield cell marked");
            return Strike::Marked;
        }
        if !can_eat {
            return Strike::Cooldown;
        }

        *cell = None;
        self.start_delay(self.eat_delay);
        debug!(row = pos.row, col = pos.col, "shield cell eaten");
        Strike::Eaten
    }

    pub fn can_eat(&self) -> bool {
        self.delay == 0
    }

    pub fn start_delay(&mut self, ticks: u32) {
        self.delay = ticks;
    }

    pub fn delay(&self) -> u32 {
        self.delay
    }
}
