//! Concurrent flood-fill reveal engine for a mine-sweeping grid.
//!
//! Every cell runs as its own set of tokio tasks, linked to its Moore
//! neighbors by one mailbox per direction. Pressing a zero cell starts a
//! wave that spreads across the graph and finishes once every reached cell
//! has echoed back; the changes of that run are delivered as one [`Batch`].

use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use event::*;
pub use generator::*;
pub use types::*;

mod adjacency;
mod board;
mod cell;
mod error;
mod event;
mod generator;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub height: Coord,
    pub width: Coord,
    /// Number of placement draws; duplicates make the distinct count smaller.
    pub bombs: CellCount,
    /// Fixed placement seed. `None` seeds from the clock.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl BoardConfig {
    pub const fn new(height: Coord, width: Coord, bombs: CellCount) -> Self {
        Self {
            height,
            width,
            bombs,
            seed: None,
        }
    }

    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub const fn beginner() -> Self {
        Self::new(9, 9, 10)
    }

    pub const fn size(&self) -> Size {
        (self.height, self.width)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.height, self.width)
    }

    pub fn validate(&self) -> Result<()> {
        if self.height == 0 || self.width == 0 {
            return Err(BoardError::InvalidDimensions {
                height: self.height,
                width: self.width,
            });
        }
        Ok(())
    }

    pub fn validate_position(&self, row: Coord, column: Coord) -> Result<Position> {
        let position = Position::new(row, column);
        if position.is_within(self.size()) {
            Ok(position)
        } else {
            Err(BoardError::InvalidCoordinate { row, column })
        }
    }

    /// The configured seed, or one derived from the current time.
    pub fn resolved_seed(&self) -> u64 {
        use web_time::{SystemTime, UNIX_EPOCH};

        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_nanos() as u64)
                .unwrap_or_default()
        })
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::beginner()
    }
}
