use core::fmt;

use echosweep_core::{Batch, CellState, ChangeEvent, Size, ToNdIndex};
use ndarray::Array2;

/// Text rendering surface built purely from received change events.
#[derive(Clone, Debug)]
pub(crate) struct TextView {
    cells: Array2<Option<ChangeEvent>>,
}

impl TextView {
    pub(crate) fn new(size: Size) -> Self {
        Self {
            cells: Array2::from_elem(size.to_nd_index(), None),
        }
    }

    pub(crate) fn apply(&mut self, batch: &Batch) {
        for event in batch.iter() {
            match self.cells.get_mut(event.position().to_nd_index()) {
                Some(slot) => *slot = Some(*event),
                None => log::warn!("event outside view: {event:?}"),
            }
        }
    }

    pub(crate) fn opened(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}

const fn glyph(event: Option<ChangeEvent>) -> char {
    match event {
        None => '#',
        Some(ChangeEvent {
            state: CellState::Bomb,
            ..
        }) => '*',
        Some(ChangeEvent {
            nearby_risk_count: 0,
            ..
        }) => '.',
        Some(ChangeEvent {
            nearby_risk_count: n,
            ..
        }) if n <= 8 => (b'0' + n) as char,
        Some(_) => '?',
    }
}

impl fmt::Display for TextView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.rows() {
            let line: String = row.iter().map(|&cell| glyph(cell)).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

pub(crate) fn summary(batch: &Batch) -> String {
    if batch.is_empty() {
        return format!("run {}: nothing changed", batch.run);
    }
    let outcome = if batch.hit_bomb() { "BOOM" } else { "safe" };
    format!("run {}: {} cells changed ({outcome})", batch.run, batch.len())
}
