//! A single cell actor and its side of the wave/echo protocol.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tokio::sync::Notify;

use crate::adjacency::{Inbox, Outbox, Signal};
use crate::*;

/// Board-wide append-only log of emitted changes, tagged by run.
///
/// The mutex is only ever held for a push or a drain, never across an await.
#[derive(Debug, Default)]
pub(crate) struct ChangeBuffer {
    pending: Mutex<Vec<(RunId, ChangeEvent)>>,
}

impl ChangeBuffer {
    pub(crate) fn append(&self, run: RunId, event: ChangeEvent) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((run, event));
    }

    /// Removes and returns every event recorded for `run`.
    pub(crate) fn drain_run(&self, run: RunId) -> Vec<ChangeEvent> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let mut drained = Vec::new();
        pending.retain(|&(owner, event)| {
            if owner == run {
                drained.push(event);
                false
            } else {
                true
            }
        });
        drained
    }
}

#[derive(Debug)]
pub(crate) struct Cell {
    position: Position,
    has_risk: bool,
    nearby_risk_count: u8,
    claimed: AtomicBool,
    outbound: BTreeMap<Position, Outbox>,
    pending_replies: AtomicUsize,
    echoes_complete: Notify,
    emitted: OnceLock<ChangeEvent>,
    changes: Arc<ChangeBuffer>,
}

impl Cell {
    pub(crate) fn new(
        position: Position,
        has_risk: bool,
        nearby_risk_count: u8,
        outbound: BTreeMap<Position, Outbox>,
        pending_replies: usize,
        changes: Arc<ChangeBuffer>,
    ) -> Self {
        Self {
            position,
            has_risk,
            nearby_risk_count,
            claimed: AtomicBool::new(false),
            outbound,
            pending_replies: AtomicUsize::new(pending_replies),
            echoes_complete: Notify::new(),
            emitted: OnceLock::new(),
            changes,
        }
    }

    pub(crate) fn state(&self) -> CellState {
        self.emitted
            .get()
            .map(|event| event.state)
            .unwrap_or_default()
    }

    pub(crate) fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    /// Resolves this cell as part of `run`.
    ///
    /// `incoming_from` is the neighbor whose request started this call, or
    /// `None` at the root of a press. Returns the emitted change, or `None`
    /// when another caller already claimed the cell.
    pub(crate) async fn resolve(
        &self,
        incoming_from: Option<Position>,
        run: RunId,
    ) -> Option<ChangeEvent> {
        if !self.try_claim() {
            log::trace!("run {run}: {} already claimed", self.position);
            return None;
        }

        let event = if self.has_risk {
            ChangeEvent::bomb(self.position)
        } else if self.nearby_risk_count > 0 {
            ChangeEvent::opened(self.position, self.nearby_risk_count)
        } else {
            self.propagate(incoming_from, run).await;
            ChangeEvent::opened(self.position, 0)
        };

        self.emit(run, event);
        Some(event)
    }

    /// Services the mailbox from `from` until it closes.
    pub(crate) async fn serve(self: Arc<Self>, from: Position, mut inbox: Inbox) {
        while let Some(signal) = inbox.recv().await {
            match signal {
                Signal::Propagate(run) => {
                    self.resolve(Some(from), run).await;
                    self.send(from, Signal::Echo(run));
                }
                Signal::Echo(run) => {
                    log::trace!("run {run}: {} got echo from {from}", self.position);
                    self.receive_echo();
                }
            }
        }
        log::trace!("{}: mailbox from {from} closed", self.position);
    }

    fn try_claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Fans the wave out to every neighbor except `skip` and waits for all echoes.
    async fn propagate(&self, skip: Option<Position>, run: RunId) {
        // the sender is never asked back, so its reply slot is released up front
        if let Some(parent) = skip
            && self.outbound.contains_key(&parent)
        {
            self.release_reply_slot();
        }

        let targets: Vec<Position> = self
            .outbound
            .keys()
            .copied()
            .filter(|&neighbor| Some(neighbor) != skip)
            .collect();
        if targets.is_empty() {
            return;
        }

        log::trace!(
            "run {run}: {} propagating to {} neighbors",
            self.position,
            targets.len()
        );
        for neighbor in targets {
            self.send(neighbor, Signal::Propagate(run));
        }

        self.echoes_complete.notified().await;
    }

    fn receive_echo(&self) {
        if self.release_reply_slot() {
            self.echoes_complete.notify_one();
        }
    }

    /// Decrements the pending-reply counter, returning whether it reached zero.
    fn release_reply_slot(&self) -> bool {
        match self
            .pending_replies
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(previous) => previous == 1,
            Err(_) => {
                log::error!("{}: reply received with none pending", self.position);
                false
            }
        }
    }

    fn send(&self, to: Position, signal: Signal) {
        let delivered = self
            .outbound
            .get(&to)
            .is_some_and(|outbox| outbox.send(signal).is_ok());
        if delivered {
            return;
        }

        log::error!("{}: link to {to} is broken, dropping {signal:?}", self.position);
        if let Signal::Propagate(_) = signal {
            // count the unreachable neighbor as answered so the wave still ends
            self.receive_echo();
        }
    }

    fn emit(&self, run: RunId, event: ChangeEvent) {
        if self.emitted.set(event).is_err() {
            log::error!("{}: second emission suppressed", self.position);
            return;
        }
        self.changes.append(run, event);
    }
}
