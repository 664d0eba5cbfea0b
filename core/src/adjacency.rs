//! Moore-neighborhood wiring between cell actors.
//!
//! Every ordered pair of adjacent cells gets its own one-directional mailbox,
//! so each undirected adjacency is a pair of independent queues. A mailbox
//! carries at most one request and one reply for the whole board lifetime,
//! which keeps unbounded channels effectively bounded.

use std::collections::BTreeMap;

use ndarray::Array2;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::*;

/// Message travelling along one directed edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Signal {
    /// Asks the receiver to join the wave of `RunId`.
    Propagate(RunId),
    /// Answers an earlier `Propagate` from the receiver.
    Echo(RunId),
}

pub(crate) type Outbox = UnboundedSender<Signal>;
pub(crate) type Inbox = UnboundedReceiver<Signal>;

/// Mailbox ends owned by one cell, keyed by the neighbor at the other end.
#[derive(Debug, Default)]
pub(crate) struct Links {
    pub(crate) outbound: BTreeMap<Position, Outbox>,
    pub(crate) inbound: BTreeMap<Position, Inbox>,
}

impl Links {
    /// Initial value of the cell's pending-reply counter.
    pub(crate) fn pending_replies(&self) -> usize {
        self.outbound.len()
    }
}

pub(crate) fn wire(size: Size) -> Array2<Links> {
    let (height, width) = size;
    let mut links: Array2<Links> = Array2::default(size.to_nd_index());

    for row in 0..height {
        for column in 0..width {
            let here = Position::new(row, column);
            for there in here.neighbors(size) {
                let (tx, rx) = mpsc::unbounded_channel();
                links[here.to_nd_index()].outbound.insert(there, tx);
                links[there.to_nd_index()].inbound.insert(here, rx);
            }
        }
    }

    log::trace!("wired {}x{} adjacency graph", height, width);
    links
}
