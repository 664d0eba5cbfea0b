use std::collections::{BTreeMap, BTreeSet, VecDeque};

use echosweep_core::*;
use futures_util::StreamExt;

fn fixed_board(height: Coord, width: Coord, bombs: &[(Coord, Coord)]) -> Board {
    let generator = FixedBombGenerator::new(bombs.iter().copied().map(Position::from));
    Board::with_generator(BoardConfig::new(height, width, 0), generator)
        .expect("fixed board should build")
}

fn positions(batch: &Batch) -> BTreeSet<Position> {
    batch.iter().map(ChangeEvent::position).collect()
}

/// Zero region reachable from `start`, plus its nonzero border.
fn expected_reveal(layout: &BombLayout, start: Position) -> BTreeSet<Position> {
    let size = layout.size();
    let mut revealed = BTreeSet::from([start]);
    let mut to_visit = VecDeque::from([start]);

    while let Some(position) = to_visit.pop_front() {
        if layout.has_risk(position).unwrap() || layout.nearby_risk_count(position).unwrap() > 0 {
            continue;
        }
        for neighbor in position.neighbors(size) {
            if !layout.has_risk(neighbor).unwrap() && revealed.insert(neighbor) {
                to_visit.push_back(neighbor);
            }
        }
    }
    revealed
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn empty_board_opens_entirely_from_center() {
    let board = fixed_board(3, 3, &[]);

    let batch = board.press(1, 1).await.unwrap();

    assert_eq!(batch.len(), 9);
    for row in 0..3 {
        for column in 0..3 {
            let event = batch.event_at(Position::new(row, column)).unwrap();
            assert_eq!(event.state, CellState::Opened);
            assert_eq!(event.nearby_risk_count, 0);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn corner_bomb_bounds_the_flood() {
    let board = fixed_board(3, 3, &[(0, 0)]);

    let batch = board.press(2, 2).await.unwrap();

    assert_eq!(batch.len(), 8);
    assert!(batch.event_at(Position::new(0, 0)).is_none());
    for (row, column) in [(0, 1), (1, 0), (1, 1)] {
        let event = batch.event_at(Position::new(row, column)).unwrap();
        assert_eq!(event.state, CellState::Opened);
        assert_eq!(event.nearby_risk_count, 1);
    }
    for (row, column) in [(0, 2), (1, 2), (2, 0), (2, 1), (2, 2)] {
        let event = batch.event_at(Position::new(row, column)).unwrap();
        assert_eq!(event.state, CellState::Opened);
        assert_eq!(event.nearby_risk_count, 0);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pressing_a_bomb_reports_only_the_bomb() {
    let board = fixed_board(3, 3, &[(1, 1)]);

    let batch = board.press(1, 1).await.unwrap();

    assert_eq!(batch.events, vec![ChangeEvent::bomb(Position::new(1, 1))]);
    assert!(batch.hit_bomb());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn nonzero_press_opens_a_single_cell() {
    let board = fixed_board(3, 3, &[(0, 0)]);

    let batch = board.press(1, 1).await.unwrap();

    assert_eq!(batch.events, vec![ChangeEvent::opened(Position::new(1, 1), 1)]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn repress_yields_empty_batch() {
    let board = fixed_board(4, 4, &[(3, 3)]);

    let first = board.press(0, 0).await.unwrap();
    assert!(!first.is_empty());

    for (row, column) in [(0, 0), (1, 1), (2, 2), (3, 2)] {
        let again = board.press(row, column).await.unwrap();
        assert!(again.is_empty(), "({row}, {column}) produced {again:?}");
    }

    let bomb = board.press(3, 3).await.unwrap();
    assert_eq!(bomb.len(), 1);
    assert!(board.press(3, 3).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn random_boards_reveal_exact_components_and_emit_once() {
    let config = BoardConfig::new(12, 15, 24);

    for seed in 0..12 {
        let layout = RandomBombGenerator::new(seed).generate(&config).unwrap();
        let board = Board::with_layout(layout.clone()).unwrap();
        let mut seen: BTreeMap<Position, ChangeEvent> = BTreeMap::new();

        for row in 0..config.height {
            for column in 0..config.width {
                let position = Position::new(row, column);
                let fresh = board.cell_state(row, column).unwrap() == CellState::NotOpen;
                let batch = board.press(row, column).await.unwrap();

                if fresh && !layout.has_risk(position).unwrap() {
                    let expected: BTreeSet<_> = expected_reveal(&layout, position)
                        .into_iter()
                        .filter(|p| !seen.contains_key(p))
                        .collect();
                    assert_eq!(positions(&batch), expected, "seed {seed} at {position}");
                }

                for event in batch {
                    let previous = seen.insert(event.position(), event);
                    assert!(previous.is_none(), "seed {seed}: {event:?} emitted twice");
                }
            }
        }

        assert_eq!(seen.len(), usize::from(config.height) * usize::from(config.width));
        for (position, event) in &seen {
            if layout.has_risk(*position).unwrap() {
                assert_eq!(event.state, CellState::Bomb);
            } else {
                assert_eq!(event.state, CellState::Opened);
                assert_eq!(
                    Ok(event.nearby_risk_count),
                    layout.nearby_risk_count(*position)
                );
            }
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_presses_on_disjoint_regions_partition_events() {
    let wall: Vec<(Coord, Coord)> = (0..5).map(|row| (row, 5)).collect();
    let board = fixed_board(5, 11, &wall);

    let (left, right) = tokio::join!(board.press(2, 0), board.press(2, 10));
    let (left, right) = (left.unwrap(), right.unwrap());

    let left = positions(&left);
    let right = positions(&right);
    assert_eq!(left.len(), 25);
    assert_eq!(right.len(), 25);
    assert!(left.is_disjoint(&right));
    assert!(left.iter().all(|p| p.column <= 4));
    assert!(right.iter().all(|p| p.column >= 6));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_presses_on_one_region_share_it_exactly() {
    let board = fixed_board(20, 20, &[]);

    let presses = [(0, 0), (19, 19), (0, 19), (19, 0), (10, 10)];
    let batches = futures_util::future::join_all(
        presses.iter().map(|&(row, column)| board.press(row, column)),
    )
    .await;

    let mut all = BTreeSet::new();
    for batch in batches {
        for position in positions(&batch.unwrap()) {
            assert!(all.insert(position), "{position} appeared in two batches");
        }
    }
    assert_eq!(all.len(), 400);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn subscription_delivers_one_batch_per_press() {
    let board = fixed_board(4, 4, &[(0, 3)]);
    let subscription = board.subscribe();

    let presses = [(3, 0), (0, 3), (3, 0)];
    let mut returned = Vec::new();
    for (row, column) in presses {
        returned.push(board.press(row, column).await.unwrap());
    }
    drop(board);

    let delivered: Vec<Batch> = subscription.collect().await;
    assert_eq!(delivered, returned);
    assert!(delivered[2].is_empty());
    assert!(delivered.windows(2).all(|pair| pair[0].run < pair[1].run));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn invalid_press_leaves_board_untouched() {
    let board = fixed_board(2, 2, &[]);
    let mut subscription = board.subscribe();

    let err = board.press(5, 5).await.unwrap_err();

    assert_eq!(err, BoardError::InvalidCoordinate { row: 5, column: 5 });
    assert!(subscription.try_next_batch().is_none());
    assert!(board.snapshot().iter().all(|state| !state.is_open()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn seeded_boards_are_reproducible() {
    let config = BoardConfig::new(9, 9, 10).with_seed(1234);

    let a = Board::with_config(config).unwrap();
    let b = Board::with_config(config).unwrap();

    assert_eq!(a.layout(), b.layout());
    assert!(a.risk_count() <= a.bomb_budget());
    assert_eq!(a.press(4, 4).await.unwrap().len(), b.press(4, 4).await.unwrap().len());
}
