/// 2D vector math and the eight compass directions.
///
/// Screen coordinates: x grows east, y grows south, so NORTH is `(0, -1)`.
/// Compass directions are unit-per-axis, which means the diagonals have a
/// magnitude of √2. Movement code relies on that (a diagonal step moves the
/// full speed along both axes).
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// tan(22.5°): below this |y/x| ratio a vector rounds to horizontal.
const TAN_22_5: f64 = 0.414_213_562_373_095_03;
/// tan(67.5°): above this |y/x| ratio a vector rounds to vertical.
const TAN_67_5: f64 = 2.414_213_562_373_095;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Vector2 { x, y }
    }

    pub fn magnitude(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction. The zero vector is returned unchanged.
    pub fn normalize(self) -> Vector2 {
        let mag = self.magnitude();
        if mag == 0.0 {
            self
        } else {
            Vector2::new(self.x / mag, self.y / mag)
        }
    }

    pub fn scale(self, scalar: f64) -> Vector2 {
        Vector2::new(self.x * scalar, self.y * scalar)
    }

    pub fn dist(self, other: Vector2) -> f64 {
        (self - other).magnitude()
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Vector pointing from `start` to `end`.
pub fn get_direction(start: Vector2, end: Vector2) -> Vector2 {
    end - start
}

impl Add for Vector2 {
    type Output = Vector2;
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;
    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;
    fn mul(self, rhs: f64) -> Vector2 {
        self.scale(rhs)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;
    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

// ── Compass directions ────────────────────────────────────────────────────────

/// The eight compass directions in canonical clockwise order starting at north.
/// The discriminant doubles as the row index into facing sprite sheets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Direction {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn vector(self) -> Vector2 {
        let (x, y) = match self {
            Direction::North => (0.0, -1.0),
            Direction::NorthEast => (1.0, -1.0),
            Direction::East => (1.0, 0.0),
            Direction::SouthEast => (1.0, 1.0),
            Direction::South => (0.0, 1.0),
            Direction::SouthWest => (-1.0, 1.0),
            Direction::West => (-1.0, 0.0),
            Direction::NorthWest => (-1.0, -1.0),
        };
        Vector2::new(x, y)
    }

    /// 45° clockwise.
    pub fn turn_right(self) -> Direction {
        Direction::from_index(self.index() + 1)
    }

    /// 45° counter-clockwise.
    pub fn turn_left(self) -> Direction {
        Direction::from_index(self.index() + 7)
    }

    pub fn opposite(self) -> Direction {
        Direction::from_index(self.index() + 4)
    }

    pub fn is_cardinal(self) -> bool {
        self.index() % 2 == 0
    }

    /// Exact inverse of [`Direction::vector`]; anything else yields `None`.
    pub fn from_vector(v: Vector2) -> Option<Direction> {
        Self::ALL.iter().copied().find(|d| d.vector() == v)
    }

    fn from_signs(x: f64, y: f64) -> Direction {
        match (sign(x), sign(y)) {
            (0, -1) => Direction::North,
            (1, -1) => Direction::NorthEast,
            (1, 0) => Direction::East,
            (1, 1) => Direction::SouthEast,
            (0, 1) => Direction::South,
            (-1, 1) => Direction::SouthWest,
            (-1, 0) => Direction::West,
            _ => Direction::NorthWest,
        }
    }
}

/// Like `f64::signum` but treats both zeros as 0.
fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// `copysign(1, v)`: -0.0 counts as negative, +0.0 as positive.
fn unit_sign(v: f64) -> f64 {
    1.0_f64.copysign(v)
}

// ── Rounding ──────────────────────────────────────────────────────────────────

/// Nearest cardinal direction. Horizontal wins when |x| == |y|.
///
/// The zero vector rounds to EAST so the result is never degenerate.
pub fn round_to_90(v: Vector2) -> Direction {
    if v.x.abs() >= v.y.abs() {
        Direction::from_signs(unit_sign(v.x), 0.0)
    } else {
        Direction::from_signs(0.0, unit_sign(v.y))
    }
}

/// Nearest of the eight compass directions, favouring cardinals on the
/// 22.5° boundaries.
///
/// The zero vector rounds to SOUTH so the result is never degenerate.
pub fn round_to_45(v: Vector2) -> Direction {
    if v.x == 0.0 {
        return Direction::from_signs(0.0, unit_sign(v.y));
    }

    let ratio = (v.y / v.x).abs();

    if ratio < TAN_22_5 {
        Direction::from_signs(unit_sign(v.x), 0.0)
    } else if ratio > TAN_67_5 {
        Direction::from_signs(0.0, unit_sign(v.y))
    } else {
        Direction::from_signs(unit_sign(v.x), unit_sign(v.y))
    }
}
