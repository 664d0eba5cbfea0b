use core::fmt;

use serde::{Deserialize, Serialize};

use crate::*;

/// Player-visible state of a cell, as reported to consumers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    NotOpen,
    Opened,
    Bomb,
}

impl CellState {
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::NotOpen)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::NotOpen
    }
}

/// A single cell's transition, emitted at most once per cell over a board's lifetime.
///
/// `x` is the column and `y` the row, matching how renderers address the grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub x: Coord,
    pub y: Coord,
    pub state: CellState,
    pub nearby_risk_count: u8,
}

impl ChangeEvent {
    pub const fn bomb(position: Position) -> Self {
        Self {
            x: position.column,
            y: position.row,
            state: CellState::Bomb,
            nearby_risk_count: 0,
        }
    }

    pub const fn opened(position: Position, nearby_risk_count: u8) -> Self {
        Self {
            x: position.column,
            y: position.row,
            state: CellState::Opened,
            nearby_risk_count,
        }
    }

    pub const fn position(&self) -> Position {
        Position::new(self.y, self.x)
    }
}

/// Identifier of one flood-fill run, allocated in press order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Every change produced by exactly one run. Event order carries no meaning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub run: RunId,
    pub events: Vec<ChangeEvent>,
}

impl Batch {
    pub fn new(run: RunId, events: Vec<ChangeEvent>) -> Self {
        Self { run, events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChangeEvent> {
        self.events.iter()
    }

    pub fn event_at(&self, position: Position) -> Option<&ChangeEvent> {
        self.events.iter().find(|event| event.position() == position)
    }

    pub fn hit_bomb(&self) -> bool {
        self.events
            .iter()
            .any(|event| event.state == CellState::Bomb)
    }
}

impl IntoIterator for Batch {
    type Item = ChangeEvent;
    type IntoIter = std::vec::IntoIter<ChangeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
