use maze_escape_core::{
    Cell, CellCoord, CombatOutcome, Command, DecisionTicket, DoorLock, EngineState, Event,
    FightKind, GuardianId, MoveRejection,
};
use maze_escape_world::{
    self as world, query, EngineConfig, FixedRoll, LevelBuilder, Penalty, Puzzle, RandomSource,
    World,
};

const OPEN_FIELD: [&str; 5] = ["P....", ".....", "..#..", ".....", "....E"];

fn build_world(rows: &[&str], config: EngineConfig, random: impl RandomSource + 'static) -> World {
    let level = LevelBuilder::from_rows(rows)
        .expect("layout parses")
        .build()
        .expect("level validates");
    World::new(level, config, Box::new(random))
}

fn door_world(config: EngineConfig) -> World {
    let level = LevelBuilder::from_rows(&["PD.", "...", "..E"])
        .expect("layout parses")
        .puzzle(CellCoord::new(1, 0), Puzzle::new("What opens a lock?", "key"))
        .build()
        .expect("level validates");
    World::new(level, config, Box::new(FixedRoll::always_lose()))
}

fn click(world: &mut World, column: u32, row: u32) -> Vec<Event> {
    send(
        world,
        Command::AttemptMove {
            target: CellCoord::new(column, row),
        },
    )
}

fn send(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    assert!(
        query::invariants_hold(world),
        "invariants must hold after every command"
    );
    events
}

fn answer(world: &mut World, ticket: DecisionTicket, text: &str) -> Vec<Event> {
    send(
        world,
        Command::AnswerPuzzle {
            ticket,
            answer: text.to_owned(),
        },
    )
}

fn choose(world: &mut World, ticket: DecisionTicket, choice: &str) -> Vec<Event> {
    send(
        world,
        Command::ChooseFight {
            ticket,
            choice: choice.to_owned(),
        },
    )
}

fn pending(world: &World) -> DecisionTicket {
    query::pending_ticket(world).expect("a decision should be pending")
}

fn door_state(world: &World, column: u32, row: u32) -> Cell {
    query::maze(world)
        .cell(CellCoord::new(column, row))
        .expect("cell inside the maze")
}

#[test]
fn adjacency_is_irreflexive_and_symmetric() {
    let world = build_world(&OPEN_FIELD, EngineConfig::default(), FixedRoll::always_lose());
    let maze = query::maze(&world);
    let cells: Vec<CellCoord> = maze.iter().map(|(coord, _)| coord).collect();

    for &a in &cells {
        assert!(!maze.is_adjacent(a, a), "{a:?} must not neighbour itself");
        for &b in &cells {
            assert_eq!(maze.is_adjacent(a, b), maze.is_adjacent(b, a));
        }
    }
}

#[test]
fn walking_to_the_exit_wins_the_game() {
    let mut world = build_world(&OPEN_FIELD, EngineConfig::default(), FixedRoll::always_lose());
    let path = [(1, 0), (2, 0), (3, 0), (4, 0), (4, 1), (4, 2), (4, 3), (4, 4)];

    let mut from = CellCoord::new(0, 0);
    let mut last_events = Vec::new();
    for (column, row) in path {
        let to = CellCoord::new(column, row);
        last_events = click(&mut world, column, row);
        assert_eq!(last_events[0], Event::PlayerMoved { from, to });
        assert_eq!(query::player(&world).position, to);
        from = to;
    }

    assert_eq!(
        last_events,
        vec![
            Event::PlayerMoved {
                from: CellCoord::new(4, 3),
                to: CellCoord::new(4, 4),
            },
            Event::GameWon,
            Event::StateChanged {
                from: EngineState::Running,
                to: EngineState::Won,
            },
        ]
    );
    assert_eq!(query::state(&world), EngineState::Won);
}

#[test]
fn won_game_rejects_every_further_move() {
    let mut world = build_world(&["PE", ".."], EngineConfig::default(), FixedRoll::always_lose());
    let _ = click(&mut world, 1, 0);
    assert_eq!(query::state(&world), EngineState::Won);

    let events = click(&mut world, 1, 1);
    assert_eq!(
        events,
        vec![Event::MoveRejected {
            target: CellCoord::new(1, 1),
            reason: MoveRejection::NotRunning(EngineState::Won),
        }]
    );
    assert_eq!(query::player(&world).position, CellCoord::new(1, 0));
    assert!(query::legal_targets(&world).is_empty());
}

#[test]
fn rejected_moves_leave_the_player_in_place() {
    let mut world = build_world(&OPEN_FIELD, EngineConfig::default(), FixedRoll::always_lose());

    let cases = [
        ((2, 0), MoveRejection::NotAdjacent),
        ((1, 1), MoveRejection::NotAdjacent),
        ((0, 0), MoveRejection::NotAdjacent),
        ((9, 0), MoveRejection::OutOfBounds),
    ];
    for ((column, row), reason) in cases {
        let events = click(&mut world, column, row);
        assert_eq!(
            events,
            vec![Event::MoveRejected {
                target: CellCoord::new(column, row),
                reason,
            }]
        );
        assert_eq!(query::player(&world).position, CellCoord::new(0, 0));
    }
}

#[test]
fn walls_block_movement() {
    let mut world = build_world(&["P#", ".E"], EngineConfig::default(), FixedRoll::always_lose());
    let events = click(&mut world, 1, 0);
    assert_eq!(
        events,
        vec![Event::MoveRejected {
            target: CellCoord::new(1, 0),
            reason: MoveRejection::Blocked,
        }]
    );
    assert_eq!(query::state(&world), EngineState::Running);
}

#[test]
fn locked_door_opens_only_for_the_right_answer() {
    let mut world = door_world(EngineConfig::default());
    let door = CellCoord::new(1, 0);

    let events = click(&mut world, 1, 0);
    let ticket = pending(&world);
    assert_eq!(
        events,
        vec![
            Event::PuzzlePosed {
                ticket,
                door,
                question: "What opens a lock?".to_owned(),
            },
            Event::StateChanged {
                from: EngineState::Running,
                to: EngineState::AwaitingPuzzleAnswer,
            },
        ]
    );
    assert_eq!(query::player(&world).position, CellCoord::new(0, 0));

    let events = answer(&mut world, ticket, "wrong");
    assert_eq!(
        events,
        vec![
            Event::PuzzleFailed { door },
            Event::StateChanged {
                from: EngineState::AwaitingPuzzleAnswer,
                to: EngineState::Running,
            },
        ]
    );
    assert_eq!(query::state(&world), EngineState::Running);
    assert_eq!(door_state(&world, 1, 0), Cell::Door(DoorLock::Locked));
    assert_eq!(query::player(&world).score, 0);

    let _ = click(&mut world, 1, 0);
    let ticket = pending(&world);
    let events = answer(&mut world, ticket, "  KEY ");
    assert_eq!(
        events,
        vec![
            Event::PuzzleSolved { door, bonus: 10 },
            Event::ScoreChanged { score: 10 },
            Event::StateChanged {
                from: EngineState::AwaitingPuzzleAnswer,
                to: EngineState::Running,
            },
        ]
    );
    assert_eq!(door_state(&world, 1, 0), Cell::Door(DoorLock::Unlocked));
    assert_eq!(query::player(&world).position, CellCoord::new(0, 0));

    let events = click(&mut world, 1, 0);
    assert_eq!(
        events,
        vec![Event::PlayerMoved {
            from: CellCoord::new(0, 0),
            to: door,
        }]
    );
}

#[test]
fn solving_a_puzzle_unlocks_only_its_door() {
    let level = LevelBuilder::from_rows(&["PD.", "D..", "..E"])
        .expect("layout parses")
        .puzzle(CellCoord::new(1, 0), Puzzle::new("first", "one"))
        .puzzle(CellCoord::new(0, 1), Puzzle::new("second", "two"))
        .build()
        .expect("level validates");
    let mut world = World::new(level, EngineConfig::default(), Box::new(FixedRoll::always_lose()));

    let _ = click(&mut world, 0, 1);
    let ticket = pending(&world);
    let _ = answer(&mut world, ticket, "two");

    assert_eq!(door_state(&world, 0, 1), Cell::Door(DoorLock::Unlocked));
    assert_eq!(door_state(&world, 1, 0), Cell::Door(DoorLock::Locked));
}

#[test]
fn stale_and_repeated_answers_are_ignored() {
    let mut world = door_world(EngineConfig::default());
    let _ = click(&mut world, 1, 0);
    let ticket = pending(&world);

    let stale = DecisionTicket::new(ticket.get() + 100);
    let events = answer(&mut world, stale, "key");
    assert_eq!(events, vec![Event::DecisionIgnored { ticket: stale }]);
    assert_eq!(query::state(&world), EngineState::AwaitingPuzzleAnswer);
    assert_eq!(door_state(&world, 1, 0), Cell::Door(DoorLock::Locked));

    let _ = answer(&mut world, ticket, "key");
    assert_eq!(query::player(&world).score, 10);

    let events = answer(&mut world, ticket, "key");
    assert_eq!(events, vec![Event::DecisionIgnored { ticket }]);
    assert_eq!(query::player(&world).score, 10, "bonus must be awarded once");
}

#[test]
fn clicks_are_rejected_while_a_decision_is_pending() {
    let mut world = door_world(EngineConfig::default());
    let _ = click(&mut world, 1, 0);

    let events = click(&mut world, 0, 1);
    assert_eq!(
        events,
        vec![Event::MoveRejected {
            target: CellCoord::new(0, 1),
            reason: MoveRejection::NotRunning(EngineState::AwaitingPuzzleAnswer),
        }]
    );
    assert_eq!(query::player(&world).position, CellCoord::new(0, 0));
}

#[test]
fn wrong_answer_penalty_can_end_the_game() {
    let config = EngineConfig {
        starting_lives: 1,
        wrong_answer_penalty: Penalty { score: 0, lives: 1 },
        ..EngineConfig::default()
    };
    let mut world = door_world(config);
    let _ = click(&mut world, 1, 0);
    let ticket = pending(&world);

    let events = answer(&mut world, ticket, "nope");
    assert_eq!(
        events,
        vec![
            Event::PuzzleFailed {
                door: CellCoord::new(1, 0)
            },
            Event::LifeLost { remaining: 0 },
            Event::GameLost,
            Event::StateChanged {
                from: EngineState::AwaitingPuzzleAnswer,
                to: EngineState::Lost,
            },
        ]
    );
    assert_eq!(door_state(&world, 1, 0), Cell::Door(DoorLock::Locked));
}

#[test]
fn score_penalty_leaves_lives_untouched() {
    let config = EngineConfig {
        wrong_answer_penalty: Penalty { score: 5, lives: 0 },
        ..EngineConfig::default()
    };
    let starting_lives = config.starting_lives;
    let mut world = door_world(config);
    let _ = click(&mut world, 1, 0);
    let ticket = pending(&world);

    let events = answer(&mut world, ticket, "nope");
    assert_eq!(
        events,
        vec![
            Event::PuzzleFailed {
                door: CellCoord::new(1, 0)
            },
            Event::ScoreChanged { score: 0 },
            Event::StateChanged {
                from: EngineState::AwaitingPuzzleAnswer,
                to: EngineState::Running,
            },
        ]
    );
    assert_eq!(query::player(&world).lives, starting_lives);
}

#[test]
fn losing_the_last_life_in_combat_loses_the_game() {
    let config = EngineConfig {
        starting_lives: 1,
        ..EngineConfig::default()
    };
    let mut world = build_world(&["PG.", "...", "..E"], config, FixedRoll::always_lose());
    let guardian = GuardianId::new(0);

    let events = click(&mut world, 1, 0);
    let ticket = pending(&world);
    assert_eq!(
        events,
        vec![
            Event::FightChoiceRequested {
                ticket,
                guardian,
                at: CellCoord::new(1, 0),
            },
            Event::StateChanged {
                from: EngineState::Running,
                to: EngineState::AwaitingFightChoice,
            },
        ]
    );

    let events = choose(&mut world, ticket, "luck");
    assert_eq!(
        events,
        vec![
            Event::CombatResolved {
                guardian,
                kind: FightKind::Luck,
                outcome: CombatOutcome::Defeat,
            },
            Event::LifeLost { remaining: 0 },
            Event::GameLost,
            Event::StateChanged {
                from: EngineState::AwaitingFightChoice,
                to: EngineState::Lost,
            },
        ]
    );
    assert_eq!(query::state(&world), EngineState::Lost);
    assert_eq!(query::player(&world).lives, 0);
    assert_eq!(query::player(&world).position, CellCoord::new(0, 0));

    let before = query::snapshot(&world);
    let events = click(&mut world, 0, 1);
    assert_eq!(
        events,
        vec![Event::MoveRejected {
            target: CellCoord::new(0, 1),
            reason: MoveRejection::NotRunning(EngineState::Lost),
        }]
    );
    let events = choose(&mut world, ticket, "luck");
    assert_eq!(events, vec![Event::DecisionIgnored { ticket }]);
    assert_eq!(query::snapshot(&world), before, "lost game must stay frozen");
}

#[test]
fn losing_a_fight_costs_exactly_one_life() {
    let mut world = build_world(&["PG.", "...", "..E"], EngineConfig::default(), FixedRoll::always_lose());

    let _ = click(&mut world, 1, 0);
    let ticket = pending(&world);
    let _ = choose(&mut world, ticket, "logic");

    let player = query::player(&world);
    assert_eq!(player.lives, 2);
    assert_eq!(player.position, CellCoord::new(0, 0));
    assert_eq!(query::state(&world), EngineState::Running);
    assert_eq!(query::guardians(&world).len(), 1, "guardian stays after a loss");
}

#[test]
fn winning_a_fight_removes_only_the_engaged_guardian() {
    let mut world = build_world(&["PG.", "G..", "..E"], EngineConfig::default(), FixedRoll::always_win());
    let untouched = query::guardian_at(&world, CellCoord::new(0, 1)).expect("second guardian");

    let _ = click(&mut world, 1, 0);
    let ticket = pending(&world);
    let events = choose(&mut world, ticket, "Luck");

    assert_eq!(
        events[..3],
        [
            Event::CombatResolved {
                guardian: GuardianId::new(0),
                kind: FightKind::Luck,
                outcome: CombatOutcome::Victory,
            },
            Event::GuardianDefeated {
                guardian: GuardianId::new(0),
                at: CellCoord::new(1, 0),
            },
            Event::ScoreChanged { score: 20 },
        ]
    );
    assert_eq!(query::guardians(&world), vec![untouched]);
    assert_eq!(query::player(&world).position, CellCoord::new(0, 0));
    assert_eq!(query::player(&world).lives, 3);

    let events = click(&mut world, 1, 0);
    assert_eq!(
        events,
        vec![Event::PlayerMoved {
            from: CellCoord::new(0, 0),
            to: CellCoord::new(1, 0),
        }]
    );
}

#[test]
fn logic_fight_is_won_with_enough_score() {
    let level = LevelBuilder::from_rows(&["PDG", "...", "..E"])
        .expect("layout parses")
        .puzzle(CellCoord::new(1, 0), Puzzle::new("q", "a"))
        .build()
        .expect("level validates");
    let mut world = World::new(level, EngineConfig::default(), Box::new(FixedRoll::always_lose()));

    let _ = click(&mut world, 1, 0);
    let ticket = pending(&world);
    let _ = answer(&mut world, ticket, "a");
    let _ = click(&mut world, 1, 0);
    assert_eq!(query::player(&world).score, 10);

    let _ = click(&mut world, 2, 0);
    let ticket = pending(&world);
    let events = choose(&mut world, ticket, "logic");
    assert!(events.contains(&Event::CombatResolved {
        guardian: GuardianId::new(0),
        kind: FightKind::Logic,
        outcome: CombatOutcome::Victory,
    }));
    assert!(query::guardians(&world).is_empty());
}

#[test]
fn unknown_fight_choice_cancels_the_encounter() {
    let mut world = build_world(&["PG.", "...", "..E"], EngineConfig::default(), FixedRoll::always_lose());
    let _ = click(&mut world, 1, 0);
    let ticket = pending(&world);

    let events = choose(&mut world, ticket, "dance");
    assert_eq!(
        events,
        vec![
            Event::FightCancelled {
                guardian: GuardianId::new(0)
            },
            Event::StateChanged {
                from: EngineState::AwaitingFightChoice,
                to: EngineState::Running,
            },
        ]
    );
    assert_eq!(query::player(&world).lives, 3);
    assert_eq!(query::guardians(&world).len(), 1);
    assert!(query::pending_ticket(&world).is_none());
}

#[test]
fn tickets_are_never_reused() {
    let mut world = build_world(&["PG.", "...", "..E"], EngineConfig::default(), FixedRoll::always_lose());
    let _ = click(&mut world, 1, 0);
    let first = pending(&world);
    let _ = choose(&mut world, first, "run");
    let _ = click(&mut world, 1, 0);
    let second = pending(&world);

    assert_ne!(first, second);
    let events = choose(&mut world, first, "luck");
    assert_eq!(events, vec![Event::DecisionIgnored { ticket: first }]);
    assert_eq!(query::pending_ticket(&world), Some(second));
}

#[test]
fn guardians_can_be_repositioned_onto_free_ground() {
    let mut world = build_world(&["PG.", "..#", "..E"], EngineConfig::default(), FixedRoll::always_lose());
    let guardian = GuardianId::new(0);

    let events = send(
        &mut world,
        Command::RepositionGuardian {
            guardian,
            to: CellCoord::new(1, 1),
        },
    );
    assert_eq!(
        events,
        vec![Event::GuardianRepositioned {
            guardian,
            from: CellCoord::new(1, 0),
            to: CellCoord::new(1, 1),
        }]
    );

    for blocked in [CellCoord::new(2, 1), CellCoord::new(0, 0), CellCoord::new(7, 7)] {
        let events = send(
            &mut world,
            Command::RepositionGuardian {
                guardian,
                to: blocked,
            },
        );
        assert!(events.is_empty(), "{blocked:?} should be refused");
    }
    assert_eq!(
        query::guardian_at(&world, CellCoord::new(1, 1)).map(|snapshot| snapshot.id),
        Some(guardian)
    );
}

#[test]
fn snapshot_and_legal_targets_follow_the_world() {
    let mut world = build_world(&["PG.", "#..", "..E"], EngineConfig::default(), FixedRoll::always_lose());

    let snapshot = query::snapshot(&world);
    assert_eq!(snapshot.size(), 3);
    assert_eq!(snapshot.state(), EngineState::Running);
    assert_eq!(snapshot.cell(CellCoord::new(0, 1)), Some(Cell::Wall));
    assert_eq!(snapshot.guardians().len(), 1);
    assert_eq!(query::legal_targets(&world), vec![CellCoord::new(1, 0)]);

    let _ = click(&mut world, 1, 0);
    assert!(query::legal_targets(&world).is_empty());
    assert_eq!(
        query::snapshot(&world).state(),
        EngineState::AwaitingFightChoice
    );
}

#[test]
fn zero_starting_lives_are_raised_to_one() {
    let config = EngineConfig {
        starting_lives: 0,
        ..EngineConfig::default()
    };
    let world = build_world(&OPEN_FIELD, config, FixedRoll::always_lose());
    assert_eq!(query::player(&world).lives, 1);
}

#[test]
fn difficulty_offset_raises_guardian_difficulty() {
    let config = EngineConfig {
        guardian_difficulty_offset: 2,
        ..EngineConfig::default()
    };
    let world = build_world(&["PG", ".E"], config, FixedRoll::always_lose());
    assert_eq!(query::guardians(&world)[0].difficulty, 3);
}

#[test]
fn seeded_worlds_resolve_luck_identically() {
    let outcomes = |seed: u64| {
        let level = LevelBuilder::from_rows(&["PG.", "...", "..E"])
            .expect("layout parses")
            .build()
            .expect("level validates");
        let config = EngineConfig {
            starting_lives: 50,
            ..EngineConfig::default()
        };
        let mut world = World::with_seed(level, config, seed);
        let mut log = Vec::new();
        for _ in 0..20 {
            if query::guardians(&world).is_empty() {
                break;
            }
            let _ = click(&mut world, 1, 0);
            let ticket = pending(&world);
            log.extend(choose(&mut world, ticket, "luck"));
        }
        log
    };

    assert_eq!(outcomes(7), outcomes(7));
}
