use std::cell::RefCell;
use std::rc::Rc;

use snake_board::board::{Board, BoardListener, StepOutcome};
use snake_board::input::{Direction, DirectionQueue};
use snake_board::level::CellKind;
use snake_board::snake::Position;

#[derive(Clone, Default)]
struct Recorder {
    events: Rc<RefCell<Vec<&'static str>>>,
}

impl BoardListener for Recorder {
    fn on_snake_crashed(&mut self) {
        self.events.borrow_mut().push("crashed");
    }

    fn on_item_picked_up(&mut self) {
        self.events.borrow_mut().push("picked_up");
    }
}

fn open_board(seed: u64) -> (Board, Recorder) {
    let rows = vec![vec![0; 5]; 5];
    let mut board = Board::construct_level_with_seed(&rows, 5, 5, seed).expect("board builds");
    let recorder = Recorder::default();
    board.subscribe(Box::new(recorder.clone()));
    board
        .add_snake(Direction::Right, 3)
        .expect("snake fits on an open 5x5 board");
    (board, recorder)
}

fn body(board: &Board) -> Vec<Position> {
    board
        .snake_tiles()
        .iter()
        .map(|tile| tile.position)
        .collect()
}

fn assert_board_invariants(board: &Board) {
    assert_eq!(board.count_cells(CellKind::Snake), board.snake_len());
    assert_eq!(board.count_cells(CellKind::Pickup), 1);
    for tile in board.snake_tiles() {
        assert_eq!(board.cell_kind(tile.position), Some(CellKind::Snake));
    }
}

#[test]
fn seeded_snake_occupies_center_and_trails_left() {
    let (board, _) = open_board(1);

    assert_eq!(
        body(&board),
        vec![
            Position::new(2, 2),
            Position::new(1, 2),
            Position::new(0, 2)
        ]
    );
    assert_board_invariants(&board);
}

#[test]
fn step_right_without_pickup_keeps_length() {
    let (mut board, recorder) = open_board(2);
    board
        .place_pickup(Position::new(0, 0))
        .expect("cell is empty");

    assert_eq!(board.update_board(Direction::Right), Ok(StepOutcome::Moved));

    assert_eq!(
        body(&board),
        vec![
            Position::new(3, 2),
            Position::new(2, 2),
            Position::new(1, 2)
        ]
    );
    assert_eq!(board.cell_kind(Position::new(0, 2)), Some(CellKind::Empty));
    assert!(recorder.events.borrow().is_empty());
    assert_board_invariants(&board);
}

#[test]
fn step_right_onto_forced_pickup_grows_at_old_tail() {
    let (mut board, recorder) = open_board(3);
    board
        .place_pickup(Position::new(3, 2))
        .expect("cell is empty");

    assert_eq!(
        board.update_board(Direction::Right),
        Ok(StepOutcome::PickedUp)
    );

    assert_eq!(board.snake_len(), 4);
    assert_eq!(board.snake_tiles()[3].position, Position::new(0, 2));
    assert_eq!(*recorder.events.borrow(), vec!["picked_up"]);

    let pickup = board.pickup_position().expect("pickup is in play");
    assert!(!body(&board).contains(&pickup));
    assert_eq!(board.cell_kind(pickup), Some(CellKind::Pickup));
    assert_board_invariants(&board);
}

#[test]
fn stepping_off_the_left_edge_crashes_without_changes() {
    let rows = vec![vec![0; 5]; 5];
    let mut board = Board::construct_level_with_seed(&rows, 5, 5, 4).expect("board builds");
    let recorder = Recorder::default();
    board.subscribe(Box::new(recorder.clone()));
    board.add_snake(Direction::Left, 1).expect("snake fits");
    board
        .place_pickup(Position::new(4, 4))
        .expect("cell is empty");

    assert_eq!(board.update_board(Direction::Left), Ok(StepOutcome::Moved));
    assert_eq!(board.update_board(Direction::Left), Ok(StepOutcome::Moved));
    assert_eq!(body(&board), vec![Position::new(0, 2)]);

    let cells_before: Vec<_> = (0..5)
        .flat_map(|y| (0..5).map(move |x| Position::new(x, y)))
        .map(|position| board.cell_kind(position))
        .collect();

    assert_eq!(board.update_board(Direction::Left), Ok(StepOutcome::Crashed));

    let cells_after: Vec<_> = (0..5)
        .flat_map(|y| (0..5).map(move |x| Position::new(x, y)))
        .map(|position| board.cell_kind(position))
        .collect();
    assert_eq!(cells_before, cells_after);
    assert_eq!(body(&board), vec![Position::new(0, 2)]);
    assert_eq!(*recorder.events.borrow(), vec!["crashed"]);
}

#[test]
fn obstacles_never_receive_the_pickup() {
    let mut rows = vec![vec![0; 6]; 6];
    for (y, row) in rows.iter_mut().enumerate() {
        for (x, cell) in row.iter_mut().enumerate() {
            if (x + y) % 3 == 0 && !(y == 3 && x >= 1) {
                *cell = 1;
            }
        }
    }
    let mut board = Board::construct_level_with_seed(&rows, 6, 6, 5).expect("board builds");
    board.add_snake(Direction::Right, 2).expect("snake fits");

    for _ in 0..50 {
        let position = board.random_empty_tile().expect("board has empty cells");
        assert_eq!(board.cell_kind(position), Some(CellKind::Empty));
    }
    assert_board_invariants(&board);
}

#[test]
fn resolver_driven_walk_keeps_invariants() {
    let (mut board, recorder) = open_board(6);
    board
        .place_pickup(Position::new(4, 4))
        .expect("cell is empty");
    let mut queue = DirectionQueue::new(Direction::Right);

    // Loop through the top-left corner; the pickup sits off the path.
    let script = [
        Some(Direction::Up),
        None,
        Some(Direction::Left),
        None,
        Some(Direction::Down),
        None,
        Some(Direction::Right),
    ];

    for command in script {
        if let Some(direction) = command {
            assert!(queue.submit(direction));
        }
        let before = board.snake_len();
        let outcome = board
            .update_board(queue.next_direction())
            .expect("board has room for the pickup");

        match outcome {
            StepOutcome::Moved => assert_eq!(board.snake_len(), before),
            StepOutcome::PickedUp => assert_eq!(board.snake_len(), before + 1),
            StepOutcome::Crashed => panic!("scripted walk should not crash"),
        }
        assert_board_invariants(&board);
    }

    assert!(!recorder.events.borrow().contains(&"crashed"));
}

#[test]
fn reversal_commands_never_change_the_queue() {
    let mut queue = DirectionQueue::new(Direction::Right);

    assert!(!queue.submit(Direction::Left));
    assert_eq!(queue.pending().count(), 0);

    assert!(queue.submit(Direction::Down));
    assert!(!queue.submit(Direction::Up));
    assert_eq!(queue.pending().copied().collect::<Vec<_>>(), vec![Direction::Down]);
}
