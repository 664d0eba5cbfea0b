//! Board orchestration: construction, presses and batch delivery.

use core::fmt;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::stream::Stream;
use ndarray::Array2;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::adjacency::{self, Links};
use crate::cell::{Cell, ChangeBuffer};
use crate::*;

/// Cloneable handle to a running board.
///
/// Cell actors live on the tokio runtime the board was created in and are
/// aborted once the last handle is dropped.
#[derive(Clone)]
pub struct Board {
    inner: Arc<BoardInner>,
}

struct BoardInner {
    config: BoardConfig,
    layout: BombLayout,
    cells: Array2<Arc<Cell>>,
    changes: Arc<ChangeBuffer>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<Batch>>>,
    next_run: AtomicU64,
    runtime: Handle,
    servicers: Vec<JoinHandle<()>>,
}

impl Board {
    /// Creates a board with randomly placed bombs, seeded from the clock.
    pub fn create(height: Coord, width: Coord, bombs: CellCount) -> Result<Self> {
        Self::with_config(BoardConfig::new(height, width, bombs))
    }

    pub fn with_config(config: BoardConfig) -> Result<Self> {
        Self::with_generator(config, RandomBombGenerator::from_config(&config))
    }

    pub fn with_generator(config: BoardConfig, generator: impl BombGenerator) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| BoardError::NoRuntime)?;

        let links = adjacency::wire(config.size());
        let layout = generator.generate(&config)?;
        // generators may ignore the requested budget, so keep the draws actually made
        let config = BoardConfig {
            bombs: layout.draws(),
            ..config
        };
        Self::assemble(config, layout, links, runtime)
    }

    /// Creates a board from a prebuilt layout. The bomb budget is the layout's draw count.
    pub fn with_layout(layout: BombLayout) -> Result<Self> {
        let config = layout.config();
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| BoardError::NoRuntime)?;

        let links = adjacency::wire(config.size());
        Self::assemble(config, layout, links, runtime)
    }

    fn assemble(
        config: BoardConfig,
        layout: BombLayout,
        mut links: Array2<Links>,
        runtime: Handle,
    ) -> Result<Self> {
        if layout.size() != config.size() {
            log::error!(
                "layout is {:?} but the board is {:?}",
                layout.size(),
                config.size()
            );
            return Err(BoardError::InvalidLayout);
        }

        let changes = Arc::new(ChangeBuffer::default());
        let mut inboxes = Vec::new();

        let cells = Array2::from_shape_fn(config.size().to_nd_index(), |(row, column)| {
            let position = Position::new(row as Coord, column as Coord);
            let links = core::mem::take(&mut links[[row, column]]);
            let pending_replies = links.pending_replies();

            let cell = Arc::new(Cell::new(
                position,
                layout.risk_mask()[[row, column]],
                layout.nearby_counts()[[row, column]],
                links.outbound,
                pending_replies,
                Arc::clone(&changes),
            ));
            inboxes.extend(
                links
                    .inbound
                    .into_iter()
                    .map(|(from, inbox)| (Arc::clone(&cell), from, inbox)),
            );
            cell
        });

        let servicers: Vec<_> = inboxes
            .into_iter()
            .map(|(cell, from, inbox)| runtime.spawn(cell.serve(from, inbox)))
            .collect();
        log::debug!(
            "board {}x{} ready: {} bombs from {} draws, {} mailbox servicers",
            config.height,
            config.width,
            layout.risk_count(),
            layout.draws(),
            servicers.len()
        );

        Ok(Self {
            inner: Arc::new(BoardInner {
                config,
                layout,
                cells,
                changes,
                subscribers: Mutex::new(Vec::new()),
                next_run: AtomicU64::new(0),
                runtime,
                servicers,
            }),
        })
    }

    /// Presses the cell at `(row, column)` and runs its wave to completion.
    ///
    /// The resulting batch is returned and also delivered to every
    /// subscriber. Pressing a cell that is already resolved yields an empty
    /// batch. The wave runs on its own task, so dropping the returned future
    /// does not interrupt it.
    pub async fn press(&self, row: Coord, column: Coord) -> Result<Batch> {
        let position = self.inner.config.validate_position(row, column)?;
        let run = RunId(self.inner.next_run.fetch_add(1, Ordering::Relaxed));

        let inner = Arc::clone(&self.inner);
        self.inner
            .runtime
            .spawn(async move { inner.run_wave(position, run).await })
            .await
            .map_err(|_| BoardError::RunAborted(run))
    }

    /// Subscribes to batches of presses completed from now on, in completion order.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        Subscription { batches: rx }
    }

    pub fn config(&self) -> BoardConfig {
        self.inner.config
    }

    pub fn height(&self) -> Coord {
        self.inner.config.height
    }

    pub fn width(&self) -> Coord {
        self.inner.config.width
    }

    /// Placement draws the layout consumed, duplicates included.
    pub fn bomb_budget(&self) -> CellCount {
        self.inner.config.bombs
    }

    /// Distinct risk-bearing cells; at most [`Board::bomb_budget`].
    pub fn risk_count(&self) -> CellCount {
        self.inner.layout.risk_count()
    }

    pub fn layout(&self) -> &BombLayout {
        &self.inner.layout
    }

    pub fn cell_state(&self, row: Coord, column: Coord) -> Result<CellState> {
        let position = self.inner.config.validate_position(row, column)?;
        Ok(self.inner.cells[position.to_nd_index()].state())
    }

    /// Player-visible state of every cell, indexed `[row, column]`.
    pub fn snapshot(&self) -> Array2<CellState> {
        self.inner.cells.map(|cell| cell.state())
    }
}

impl BoardInner {
    async fn run_wave(&self, position: Position, run: RunId) -> Batch {
        let cell = &self.cells[position.to_nd_index()];
        if cell.is_claimed() {
            log::debug!("run {run}: {position} is already resolved");
        }

        cell.resolve(None, run).await;

        let batch = Batch::new(run, self.changes.drain_run(run));
        log::debug!(
            "run {run}: press at {position} changed {} cells",
            batch.len()
        );
        self.publish(&batch);
        batch
    }

    fn publish(&self, batch: &Batch) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(batch.clone()).is_ok());
    }
}

impl Drop for BoardInner {
    fn drop(&mut self) {
        for servicer in &self.servicers {
            servicer.abort();
        }
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("config", &self.inner.config)
            .field("risk_count", &self.inner.layout.risk_count())
            .field("next_run", &self.inner.next_run.load(Ordering::Relaxed))
            .finish()
    }
}

/// Consumer-paced stream of batches, one per completed press.
///
/// Ends once every handle to the board has been dropped.
#[derive(Debug)]
pub struct Subscription {
    batches: mpsc::UnboundedReceiver<Batch>,
}

impl Subscription {
    pub async fn next_batch(&mut self) -> Option<Batch> {
        self.batches.recv().await
    }

    /// Returns an already delivered batch without waiting.
    pub fn try_next_batch(&mut self) -> Option<Batch> {
        self.batches.try_recv().ok()
    }
}

impl Stream for Subscription {
    type Item = Batch;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().batches.poll_recv(cx)
    }
}
