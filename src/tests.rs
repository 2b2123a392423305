#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use itertools::Itertools;
    use ndarray::Array2;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;
    use strum::VariantArray;

    use crate::board::{Board, Move, RobotPosition};
    use crate::builder::{BoardBuilder, BoardError, BuilderInvalidReason};
    use crate::catalog::TileCatalog;
    use crate::cell::Walls;
    use crate::color::Color::{self, Blue, Green, Grey, Red, Yellow};
    use crate::location::Location;
    use crate::round::PlayerId;
    use crate::solver::{Solver, SolverFailure};
    use crate::step::Step;
    use crate::tile::{Goal, Slot, Tile, TileKind};
    use crate::wire::{BoardData, GameData, RoundEvent};

    fn board(rows: &[&[u8]], goals: &[(usize, Color)], robots: &[Color]) -> Board {
        Board::from_parts(
            rows.iter().map(|row| row.to_vec()).collect(),
            goals.iter().map(|(number, color)| Goal::new(*number, *color)).collect(),
            robots.to_vec(),
        ).unwrap()
    }

    fn at(robot: Color, row: usize, column: usize) -> RobotPosition {
        RobotPosition::new(robot, Location(row, column))
    }

    fn to(robot: Color, row: usize, column: usize) -> Move {
        Move::new(robot, Location(row, column))
    }

    fn gear() -> Tile {
        TileCatalog::reference().get(TileKind::Gear).unwrap().clone()
    }

    /// Length of a shortest route, by breadth-first search over every reachable arrangement.
    fn shortest(board: &Board, positions: &[RobotPosition], goal: &Goal) -> Option<usize> {
        let mut seen = HashSet::from([positions.to_vec()]);
        let mut queue = VecDeque::from([(positions.to_vec(), 0)]);

        while let Some((current, depth)) = queue.pop_front() {
            if board.is_solved(&current, goal) {
                return Some(depth);
            }
            for index in 0..current.len() {
                for step in Step::VARIANTS {
                    let Some(stop) = board.slide(&current, current[index].robot, *step) else {
                        continue;
                    };
                    let mut next = current.clone();
                    next[index].position = stop;
                    if seen.insert(next.clone()) {
                        queue.push_back((next, depth + 1));
                    }
                }
            }
        }

        None
    }

    #[test]
    fn wall_masks_turn_clockwise() {
        let expected = [
            (0, 0), (1, 2), (2, 4), (4, 8), (8, 1),
            (3, 6), (6, 12), (12, 9), (9, 3),
            (5, 10), (10, 5),
            (7, 14), (14, 13), (13, 11), (11, 7),
            (15, 15),
        ];
        for (before, after) in expected {
            assert_eq!(Walls::new(before).unwrap().rotated_clockwise().bits(), after, "rotating {before}");
        }
        assert_eq!(Walls::new(16), None);
    }

    #[test]
    fn step_between() {
        assert_eq!(Step::between(Location(3, 1), Location(0, 1)), Some(Step::Up));
        assert_eq!(Step::between(Location(3, 1), Location(3, 2)), Some(Step::Right));
        assert_eq!(Step::between(Location(0, 1), Location(3, 1)), Some(Step::Down));
        assert_eq!(Step::between(Location(3, 1), Location(3, 0)), Some(Step::Left));
        assert_eq!(Step::between(Location(3, 1), Location(2, 2)), None);
        assert_eq!(Step::between(Location(3, 1), Location(3, 1)), None);
    }

    #[test]
    fn rotate_gear_once() {
        let mut tile = gear();
        tile.rotate(1);

        let expected = [
            [1, 5, 3, 9, 1, 1, 1, 3],
            [0, 3, 8, 0, 0, 0, 0, 2],
            [0, 0, 0, 6, 8, 0, 0, 2],
            [0, 0, 0, 1, 0, 0, 0, 6],
            [0, 0, 0, 0, 0, 0, 0, 3],
            [0, 0, 0, 0, 2, 12, 0, 2],
            [4, 0, 4, 0, 0, 1, 0, 2],
            [15, 10, 9, 0, 0, 0, 0, 2],
        ];
        assert_eq!(tile.cells().map(|walls| walls.bits()), Array2::from_shape_fn((8, 8), |(row, column)| expected[row][column]));
        assert_eq!(tile.goals(), &[Goal::new(45, Blue), Goal::new(19, Green), Goal::new(58, Red), Goal::new(9, Yellow)]);
        assert_eq!(tile.slot(), Slot::TopRight);
    }

    #[test]
    fn quarter_turns_between_slots() {
        assert_eq!(Slot::TopLeft.turns_to(Slot::BottomRight), 2);
        assert_eq!(Slot::BottomLeft.turns_to(Slot::TopLeft), 1);
        assert_eq!(Slot::TopRight.turns_to(Slot::TopLeft), 3);
        assert_eq!(Slot::from_index(2), Some(Slot::BottomRight));
        assert_eq!(Slot::from_index(4), None);
    }

    proptest! {
        #[test]
        fn four_quarter_turns_restore_a_tile(
            walls in proptest::collection::vec(0u8..16, 25),
            numbers in proptest::collection::vec(0usize..25, 0..6),
        ) {
            let cells = Array2::from_shape_vec((5, 5), walls.into_iter().map(|bits| Walls::new(bits).unwrap()).collect()).unwrap();
            let goals = numbers.into_iter().map(|number| Goal::new(number, Red)).collect();
            let original = Tile::new(cells, goals, TileKind::Star, Slot::BottomLeft).unwrap();

            let mut turned = original.clone();
            turned.rotate(1).rotate(1).rotate(1).rotate(1);
            prop_assert_eq!(&turned, &original);

            turned.rotate(3).rotate(1);
            prop_assert_eq!(&turned, &original);

            turned.rotate(4);
            prop_assert_eq!(&turned, &original);
        }
    }

    #[test]
    fn reference_catalog_assembles_in_place() {
        let catalog = TileCatalog::reference();
        let board = BoardBuilder::from_tiles(catalog.tiles().to_vec()).unwrap();

        assert_eq!(board.size(), 16);
        assert_eq!(board.goals().len(), 17);
        assert_eq!(board.robot_colors(), &[Blue, Green, Red, Yellow, Grey]);

        // one goal from each quadrant
        assert!(board.goals().contains(&Goal::new(37, Blue)));
        assert!(board.goals().contains(&Goal::new(43, Red)));
        assert!(board.goals().contains(&Goal::new(158, Yellow)));
        assert!(board.goals().contains(&Goal::new(145, Yellow)));

        assert_eq!(board.walls_at(Location(0, 0)).map(Walls::bits), Some(9));
        assert_eq!(board.walls_at(Location(0, 8)).map(Walls::bits), Some(1));
        assert_eq!(board.walls_at(Location(8, 0)).map(Walls::bits), Some(8));
        assert_eq!(board.walls_at(Location(15, 15)).map(Walls::bits), Some(6));
        assert_eq!(board.walls_at(Location(16, 0)), None);
    }

    #[test]
    fn generated_boards() {
        let catalog = TileCatalog::reference();
        let boards = (0..8)
            .map(|seed| BoardBuilder::generate(&catalog, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap())
            .collect_vec();

        for board in &boards {
            assert_eq!(board.size(), 16);
            assert_eq!(board.cells().dim(), (16, 16));
            assert_eq!(board.goals().len(), 17);
            assert_eq!(board.robot_colors().len(), 5);
            assert_eq!(board.robot_colors().iter().copied().sorted().collect_vec(), Color::VARIANTS.iter().copied().sorted().collect_vec());
            for centre in [Location(7, 7), Location(7, 8), Location(8, 7), Location(8, 8)] {
                assert_eq!(board.walls_at(centre), Some(Walls::ENCLOSED));
            }
            assert!(board.goals().iter().all(|goal| !board.walls_at(goal.location(16)).unwrap().is_enclosed()));
        }

        assert!(boards.iter().any(|board| *board != boards[0]));
    }

    #[test]
    fn builder_rejects_bad_tile_sets() {
        let catalog = TileCatalog::reference();

        let three = catalog.tiles()[..3].to_vec();
        assert_eq!(BoardBuilder::from_tiles(three), Err(BoardError::Configuration(vec![BuilderInvalidReason::WrongTileCount(3)])));

        let mut builder = BoardBuilder::new();
        builder.place(gear(), Slot::TopLeft).place(gear(), Slot::TopLeft);
        assert_eq!(builder.is_valid(), Some(&vec![BuilderInvalidReason::SlotTaken(Slot::TopLeft)]));
        assert!(builder.build().is_err());

        let mut builder = BoardBuilder::new();
        builder.place(gear(), Slot::BottomRight);
        assert_eq!(builder.is_valid(), None);
        assert_eq!(builder.build(), Err(BoardError::Configuration(vec![
            BuilderInvalidReason::SlotEmpty(Slot::TopLeft),
            BuilderInvalidReason::SlotEmpty(Slot::TopRight),
            BuilderInvalidReason::SlotEmpty(Slot::BottomLeft),
        ])));

        let small = Tile::new(Array2::from_elem((2, 2), Walls::NONE), vec![], TileKind::Planet, Slot::TopRight).unwrap();
        let mut builder = BoardBuilder::new();
        builder.place(gear(), Slot::TopLeft).place(small.clone(), Slot::TopRight);
        assert_eq!(builder.is_valid(), Some(&vec![BuilderInvalidReason::SizeMismatch]));

        let mut mixed = catalog.tiles().to_vec();
        mixed.push(small);
        assert_eq!(TileCatalog::new(mixed), Err(BoardError::Configuration(vec![BuilderInvalidReason::SizeMismatch])));
        assert_eq!(TileCatalog::new(vec![gear(), gear()]), Err(BoardError::Configuration(vec![BuilderInvalidReason::TooFewKinds(1)])));
    }

    #[test]
    fn tile_grids_must_be_square() {
        assert_eq!(
            Tile::new(Array2::from_elem((2, 3), Walls::NONE), vec![], TileKind::Gear, Slot::TopLeft),
            Err(BoardError::Configuration(vec![BuilderInvalidReason::NotSquare])),
        );
        assert_eq!(
            Tile::new(Array2::from_elem((2, 2), Walls::NONE), vec![Goal::new(4, Red)], TileKind::Gear, Slot::TopLeft),
            Err(BoardError::Configuration(vec![BuilderInvalidReason::GoalOutOfBounds(Goal::new(4, Red))])),
        );
    }

    #[test]
    fn supplied_boards_are_validated() {
        assert_eq!(
            Board::from_parts(vec![vec![16, 0], vec![0, 0]], vec![Goal::new(4, Red), Goal::new(0, Blue)], vec![Red, Red]),
            Err(BoardError::Configuration(vec![
                BuilderInvalidReason::WallOutOfRange { location: Location(0, 0), value: 16 },
                BuilderInvalidReason::GoalOutOfBounds(Goal::new(4, Red)),
                BuilderInvalidReason::DuplicateRobot(Red),
                BuilderInvalidReason::MissingRobot(Blue),
            ])),
        );
        assert_eq!(
            Board::from_parts(vec![vec![0, 0], vec![0]], vec![], vec![]),
            Err(BoardError::Configuration(vec![BuilderInvalidReason::NotSquare])),
        );
        assert_eq!(
            Board::from_parts(vec![], vec![], vec![]),
            Err(BoardError::Configuration(vec![BuilderInvalidReason::EmptyGrid])),
        );
    }

    #[test]
    fn slide_until_blocked() {
        let board = board(&[&[9, 1, 3], &[8, 0, 2], &[12, 4, 6]], &[], &[Red]);

        let corner = [at(Red, 2, 0)];
        assert_eq!(board.slide(&corner, Red, Step::Up), Some(Location(0, 0)));
        assert_eq!(board.slide(&corner, Red, Step::Right), Some(Location(2, 2)));
        assert_eq!(board.slide(&corner, Red, Step::Down), Some(Location(2, 0)));
        assert_eq!(board.slide(&corner, Red, Step::Left), Some(Location(2, 0)));
        assert!(board.is_valid_move(&to(Red, 0, 0), &corner));

        let centre = [at(Red, 1, 1)];
        assert_eq!(board.slide(&centre, Red, Step::Up), Some(Location(0, 1)));
        assert_eq!(board.slide(&centre, Red, Step::Left), Some(Location(1, 0)));
        assert_eq!(board.slide(&centre, Blue, Step::Left), None);
    }

    #[test]
    fn valid_moves() {
        let board = board(&[&[5, 1, 1, 3], &[8, 0, 0, 2], &[8, 0, 0, 2], &[12, 4, 4, 14]], &[], &[Red, Blue]);
        let positions = [at(Red, 1, 1), at(Blue, 3, 1)];

        for legal in [to(Red, 0, 1), to(Red, 1, 0), to(Red, 1, 3), to(Red, 2, 1)] {
            assert!(board.is_valid_move(&legal, &positions), "{legal:?}");
        }

        // diagonal, diagonal, onto the blue robot, short of the wall
        for illegal in [to(Red, 0, 0), to(Red, 2, 2), to(Red, 3, 1), to(Red, 1, 2)] {
            assert!(!board.is_valid_move(&illegal, &positions), "{illegal:?}");
        }
        assert!(!board.is_valid_move(&to(Yellow, 0, 0), &positions));
        assert!(!board.is_valid_move(&to(Red, 1, 1), &positions));

        // the destination's own left wall stops blue one cell early
        assert!(!board.is_valid_move(&to(Blue, 3, 3), &positions));
        assert!(board.is_valid_move(&to(Blue, 3, 2), &positions));
    }

    proptest! {
        #[test]
        fn diagonal_moves_are_never_valid(
            red in (0usize..4, 0usize..4),
            row_shift in 1usize..4,
            column_shift in 1usize..4,
        ) {
            let board = board(&[&[9, 1, 1, 3], &[8, 0, 0, 2], &[8, 0, 0, 2], &[12, 4, 4, 6]], &[], &[Red]);
            let target = Location((red.0 + row_shift) % 4, (red.1 + column_shift) % 4);
            prop_assert!(!board.is_valid_move(&Move::new(Red, target), &[at(Red, red.0, red.1)]));
        }

        #[test]
        fn every_slide_is_a_valid_move(
            cells in (0usize..25, 0usize..25).prop_filter("robots share a cell", |(red, blue)| red != blue),
            step in proptest::sample::select(Step::VARIANTS),
        ) {
            let board = board(&[&[9, 1, 3, 1, 3], &[8, 0, 0, 0, 2], &[8, 1, 0, 15, 2], &[8, 0, 0, 0, 2], &[12, 4, 4, 6, 6]], &[], &[Red, Blue]);
            let red = Location::from_number(cells.0, 5);
            let blue = Location::from_number(cells.1, 5);
            prop_assume!(red != Location(2, 3) && blue != Location(2, 3));

            let positions = [RobotPosition::new(Red, red), RobotPosition::new(Blue, blue)];
            let stop = board.slide(&positions, Red, step).unwrap();
            prop_assert_eq!(board.is_valid_move(&Move::new(Red, stop), &positions), stop != red);
        }
    }

    #[test]
    fn apply_and_verify() {
        let board = board(&[&[5, 1, 1, 3], &[8, 0, 0, 2], &[8, 0, 0, 2], &[12, 4, 4, 6]], &[(2, Red)], &[Red, Blue]);
        let positions = [at(Red, 3, 0), at(Blue, 3, 3)];
        let goal = Goal::new(2, Red);

        let solution = [to(Red, 3, 2), to(Red, 0, 2)];
        assert_eq!(board.solve(&positions, &goal, &solution), Some(vec![at(Red, 0, 2), at(Blue, 3, 3)]));

        // legal, but the goal is not reached
        assert_eq!(board.apply_moves(&solution[..1], &positions), Some(vec![at(Red, 3, 2), at(Blue, 3, 3)]));
        assert_eq!(board.solve(&positions, &goal, &solution[..1]), None);

        // the second move is illegal, so nothing of the first survives
        assert_eq!(board.apply_moves(&[to(Red, 3, 2), to(Red, 1, 2)], &positions), None);
        assert!(!board.is_solved(&positions, &goal));
    }

    #[test]
    fn random_helpers() {
        let board = board(&[&[9, 3], &[12, 6]], &[(0, Red), (3, Blue)], &[Red, Blue]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        for _ in 0..20 {
            assert_eq!(board.random_goal_excluding(&[Goal::new(0, Red)], &mut rng), Some(Goal::new(3, Blue)));
        }
        assert_eq!(board.random_goal_excluding(&[Goal::new(0, Red), Goal::new(3, Blue)], &mut rng), None);
        // same cell, other colour, still available
        assert_eq!(board.random_goal_excluding(&[Goal::new(3, Red), Goal::new(0, Red)], &mut rng), Some(Goal::new(3, Blue)));

        let generated = BoardBuilder::generate(&TileCatalog::reference(), &mut rng).unwrap();
        for _ in 0..20 {
            let positions = generated.random_open_positions(&mut rng).unwrap();
            assert_eq!(positions.iter().map(|placed| placed.robot).collect_vec(), generated.robot_colors());
            assert!(positions.iter().map(|placed| placed.position).all_unique());
            assert!(positions.iter().all(|placed| !generated.walls_at(placed.position).unwrap().is_enclosed()));
        }

        let walled = board_without_space();
        assert_eq!(walled.random_open_positions(&mut rng), Err(BoardError::InsufficientSpace { open: 0, robots: 1 }));
    }

    fn board_without_space() -> Board {
        board(&[&[15]], &[], &[Red])
    }

    #[test]
    fn solve_example() {
        let board = board(&[&[5, 1, 1, 3], &[8, 0, 0, 2], &[8, 0, 0, 2], &[12, 4, 4, 6]], &[(2, Red)], &[Red, Blue]);
        let positions = [at(Red, 3, 0), at(Blue, 3, 3)];

        let route = Solver::from(&board).solve(&positions, &Goal::new(2, Red)).unwrap();
        assert_eq!(route, vec![to(Red, 3, 2), to(Red, 0, 2)]);
    }

    #[test]
    fn solve_needs_another_robot() {
        let board = board(
            &[&[9, 1, 3, 1, 3], &[8, 0, 0, 0, 2], &[8, 1, 0, 15, 2], &[8, 0, 0, 0, 2], &[12, 4, 4, 6, 6]],
            &[(2, Red)],
            &[Red, Blue, Yellow],
        );
        let positions = [at(Red, 3, 1), at(Blue, 2, 0), at(Yellow, 1, 3)];
        let goal = Goal::new(2, Red);

        let route = Solver::from(&board).solve(&positions, &goal).unwrap();
        assert_eq!(route.len(), 3);
        assert_eq!(route.last().map(|mv| mv.robot), Some(Red));
        assert!(board.solve(&positions, &goal, &route).is_some());
        assert_eq!(shortest(&board, &positions, &goal), Some(3));
    }

    #[test]
    fn solver_edge_cases() {
        let open = board(&[&[9, 1, 3], &[8, 0, 2], &[12, 4, 6]], &[(0, Red), (4, Red)], &[Red]);

        assert_eq!(Solver::from(&open).solve(&[at(Red, 0, 0)], &Goal::new(0, Red)), Ok(vec![]));
        // nothing can stop a lone robot in the middle
        assert_eq!(
            Solver::from(&open).with_max_depth(6).solve(&[at(Red, 0, 0)], &Goal::new(4, Red)),
            Err(SolverFailure::DepthExceeded { max_depth: 6 }),
        );
        assert_eq!(Solver::from(&open).solve(&[at(Blue, 0, 0)], &Goal::new(0, Red)), Err(SolverFailure::Unsolvable));

        let walled = board(&[&[9, 1, 3, 1, 3], &[8, 0, 0, 0, 2], &[8, 1, 0, 15, 2], &[8, 0, 0, 0, 2], &[12, 4, 4, 6, 6]], &[(13, Red)], &[Red]);
        assert_eq!(Solver::from(&walled).solve(&[at(Red, 0, 0)], &Goal::new(13, Red)), Err(SolverFailure::Unsolvable));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn solver_routes_are_shortest(
            cells in (0usize..16, 0usize..16).prop_filter("robots share a cell", |(red, blue)| red != blue),
            blue_goal: bool,
        ) {
            let board = board(&[&[5, 1, 1, 3], &[8, 0, 0, 2], &[8, 0, 0, 2], &[12, 4, 4, 6]], &[(2, Red), (12, Blue)], &[Red, Blue]);
            let positions = [
                RobotPosition::new(Red, Location::from_number(cells.0, 4)),
                RobotPosition::new(Blue, Location::from_number(cells.1, 4)),
            ];
            let goal = if blue_goal { Goal::new(12, Blue) } else { Goal::new(2, Red) };

            let route = Solver::from(&board).solve(&positions, &goal).unwrap();
            prop_assert!(board.solve(&positions, &goal, &route).is_some());
            prop_assert_eq!(Some(route.len()), shortest(&board, &positions, &goal));
        }
    }

    #[test]
    fn render_small_board() {
        let board = board(&[&[9, 3], &[12, 6]], &[(3, Red)], &[Red]);

        assert_eq!(board.render(&[at(Red, 0, 0)]), "+---+---+
| R   . |
+   +   +
| .   r |
+---+---+
");
        assert_eq!(format!("{}", board_without_space()), "+---+
|###|
+---+
");
    }

    #[test]
    fn wire_format() {
        let board = board(&[&[9, 3], &[12, 6]], &[(3, Red)], &[Red]);
        let game = GameData::new(&board, &[at(Red, 0, 1)], Some(Goal::new(3, Red)));

        assert_eq!(serde_json::to_value(RoundEvent::StartNewGame(game)).unwrap(), json!({
            "action": "start_new_game",
            "cells": [[9, 3], [12, 6]],
            "goals": [{"number": 3, "color": "red"}],
            "robotColors": ["red"],
            "robotPositions": [{"robot": "red", "position": {"row": 0, "column": 1}}],
            "currentGoal": {"number": 3, "color": "red"},
        }));

        assert_eq!(serde_json::to_value(RoundEvent::SolutionIn {
            seconds_left: 5,
            current_winner: "alice".into(),
            current_winner_id: PlayerId(7),
            current_nr_moves: 3,
        }).unwrap(), json!({
            "action": "solution_in",
            "secondsLeft": 5,
            "currentWinner": "alice",
            "currentWinnerId": 7,
            "currentNrMoves": 3,
        }));
        assert_eq!(serde_json::to_value(RoundEvent::GameFinished).unwrap(), json!({"action": "game_finished"}));

        let submitted: Vec<Move> = serde_json::from_value(json!([{"robot": "grey", "to": {"row": 2, "column": 15}}])).unwrap();
        assert_eq!(submitted, vec![to(Grey, 2, 15)]);

        let supplied: BoardData = serde_json::from_value(json!({
            "cells": [[9, 3], [12, 6]],
            "goals": [{"number": 3, "color": "red"}],
            "robotColors": ["red"],
        })).unwrap();
        assert_eq!(Board::try_from(supplied), Ok(board));
    }
}
