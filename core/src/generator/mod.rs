use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;
pub use fixed::*;
pub use random::*;

mod fixed;
mod random;

pub trait BombGenerator {
    fn generate(self, config: &BoardConfig) -> Result<BombLayout>;
}

/// Risk placement of a board together with the derived nearby-risk counts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BombLayout {
    risk: Array2<bool>,
    nearby: Array2<u8>,
    draws: CellCount,
    risk_count: CellCount,
}

impl BombLayout {
    pub fn empty(size: Size) -> Self {
        Self {
            risk: Array2::default(size.to_nd_index()),
            nearby: Array2::zeros(size.to_nd_index()),
            draws: 0,
            risk_count: 0,
        }
    }

    /// Consumes one draw at `position`.
    ///
    /// Returns `false` on a duplicate draw, which leaves the counts untouched.
    pub fn place(&mut self, position: Position) -> Result<bool> {
        let size = self.size();
        if !position.is_within(size) {
            return Err(BoardError::InvalidLayout);
        }

        self.draws += 1;
        if self.risk[position.to_nd_index()] {
            log::trace!("duplicate bomb draw at {position}");
            return Ok(false);
        }

        self.risk[position.to_nd_index()] = true;
        self.risk_count += 1;
        for neighbor in position.neighbors(size) {
            self.nearby[neighbor.to_nd_index()] += 1;
        }
        Ok(true)
    }

    pub fn size(&self) -> Size {
        let (height, width) = self.risk.dim();
        // dimensions were built from a `Size`
        (height as Coord, width as Coord)
    }

    pub fn has_risk(&self, position: Position) -> Result<bool> {
        self.risk
            .get(position.to_nd_index())
            .copied()
            .ok_or(BoardError::InvalidCoordinate {
                row: position.row,
                column: position.column,
            })
    }

    pub fn nearby_risk_count(&self, position: Position) -> Result<u8> {
        self.nearby
            .get(position.to_nd_index())
            .copied()
            .ok_or(BoardError::InvalidCoordinate {
                row: position.row,
                column: position.column,
            })
    }

    pub(crate) fn risk_mask(&self) -> &Array2<bool> {
        &self.risk
    }

    pub(crate) fn nearby_counts(&self) -> &Array2<u8> {
        &self.nearby
    }

    /// Distinct risk-bearing cells.
    pub fn risk_count(&self) -> CellCount {
        self.risk_count
    }

    /// Draws consumed, including duplicates.
    pub fn draws(&self) -> CellCount {
        self.draws
    }

    pub fn risk_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.risk
            .indexed_iter()
            .filter(|&(_, &risk)| risk)
            .map(|((row, column), _)| Position::new(row as Coord, column as Coord))
    }

    pub fn config(&self) -> BoardConfig {
        let (height, width) = self.size();
        BoardConfig::new(height, width, self.draws)
    }
}
