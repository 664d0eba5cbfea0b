use core::fmt;

use serde::{Deserialize, Serialize};

/// Single coordinate axis used for board height, width, rows and columns.
pub type Coord = u16;

/// Count type used for bomb budgets and total-cell counts.
pub type CellCount = u32;

/// Board dimensions as `(height, width)`.
pub type Size = (Coord, Coord);

/// A cell address on the grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: Coord,
    pub column: Coord,
}

impl Position {
    pub const fn new(row: Coord, column: Coord) -> Self {
        Self { row, column }
    }

    /// Whether this position lies inside a board of the given size.
    pub const fn is_within(self, (height, width): Size) -> bool {
        self.row < height && self.column < width
    }

    /// Moore neighbors of this position, clipped at the board edges.
    pub fn neighbors(self, size: Size) -> NeighborIter {
        NeighborIter::new(self, size)
    }
}

impl From<(Coord, Coord)> for Position {
    fn from((row, column): (Coord, Coord)) -> Self {
        Self::new(row, column)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Position {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.row.into(), self.column.into()]
    }
}

impl ToNdIndex for Size {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

const DISPLACEMENTS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `position`, returning a value only when it remains in bounds.
fn apply_delta(position: Position, delta: (i32, i32), bounds: Size) -> Option<Position> {
    let (d_row, d_column) = delta;

    let row = position.row.checked_add_signed(d_row.try_into().ok()?)?;
    let column = position.column.checked_add_signed(d_column.try_into().ok()?)?;

    let next = Position::new(row, column);
    next.is_within(bounds).then_some(next)
}

#[derive(Debug)]
pub struct NeighborIter {
    center: Position,
    bounds: Size,
    index: u8,
}

impl NeighborIter {
    fn new(center: Position, bounds: Size) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&delta) = DISPLACEMENTS.get(usize::from(self.index)) {
            self.index += 1;
            if let Some(next) = apply_delta(self.center, delta, self.bounds) {
                return Some(next);
            }
        }
        None
    }
}
