use thiserror::Error;

use crate::{Coord, RunId};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Invalid coordinate ({row}, {column})")]
    InvalidCoordinate { row: Coord, column: Coord },
    #[error("Invalid board dimensions {height}x{width}")]
    InvalidDimensions { height: Coord, width: Coord },
    #[error("Bomb layout references cells outside the board")]
    InvalidLayout,
    #[error("Board must be created inside a tokio runtime")]
    NoRuntime,
    #[error("Flood-fill run {0} aborted before completing")]
    RunAborted(RunId),
}

pub type Result<T> = core::result::Result<T, BoardError>;
