use outpost::position::Position;
use outpost::status::{
    GameStatus, is_checkmate, is_draw, is_fivefold, is_seventyfive_move, is_stalemate,
    is_terminal, position_status,
};

#[test]
fn knight_shuffle_reaches_threefold() {
    let mut position = Position::new();

    // Each cycle of Nf3 Nf6 Ng1 Ng8 returns to the starting position.
    let cycle = ["g1f3", "g8f6", "f3g1", "f6g8"];

    for uci in cycle {
        position.make_uci(uci).expect("legal shuffle move");
    }
    // second occurrence of the start position: not yet threefold
    assert!(!position.threefold());
    assert!(!is_draw(&position));

    for uci in cycle {
        position.make_uci(uci).expect("legal shuffle move");
    }
    // third occurrence, with eight reversible plies on the clock
    assert!(position.halfmove_clock >= 8);
    assert_eq!(position.repetition_count(), 3);
    assert!(position.threefold());
    assert!(is_draw(&position));
    assert!(is_terminal(&position));
    assert_eq!(position_status(&position), GameStatus::DrawThreefold);
}

#[test]
fn threefold_state_unwinds_with_unmake() {
    let mut position = Position::new();
    for uci in [
        "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8",
    ] {
        position.make_uci(uci).expect("legal shuffle move");
    }
    assert!(position.threefold());

    position.unmake();
    assert!(!position.threefold());
    assert_eq!(position.history.len(), 7);
}

#[test]
fn pawn_move_resets_the_repetition_window() {
    let mut position = Position::new();
    for uci in [
        "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8",
    ] {
        position.make_uci(uci).expect("legal shuffle move");
    }
    assert!(position.threefold());

    // a pawn push zeroes the clock; the old repetitions no longer count
    position.make_uci("e2e4").expect("legal pawn move");
    assert_eq!(position.halfmove_clock, 0);
    assert!(!position.threefold());
    assert!(!is_draw(&position));
}

#[test]
fn fifty_move_counter_reaches_a_draw_through_play() {
    let mut position: Position = "4k3/8/8/8/8/8/8/4K2R w - - 98 80"
        .parse()
        .expect("valid FEN");
    assert!(!position.fiftymoves());

    position.make_uci("h1h2").expect("legal rook move");
    assert!(!position.fiftymoves());

    position.make_uci("e8d8").expect("legal king move");
    assert!(position.fiftymoves());
    assert!(is_draw(&position));
    assert_eq!(position_status(&position), GameStatus::DrawFiftyMove);
}

#[test]
fn checkmate_beats_the_fifty_move_claim() {
    // back-rank mate delivered exactly as the clock reaches 100
    let mut position: Position = "6k1/5ppp/8/8/8/8/8/4R1K1 w - - 99 80"
        .parse()
        .expect("valid FEN");
    position.make_uci("e1e8").expect("mating rook lift");
    assert!(position.halfmove_clock >= 100);
    assert!(is_checkmate(&position));
    assert!(!is_draw(&position));
    assert_eq!(position_status(&position), GameStatus::Checkmate);
}

#[test]
fn scholars_mate_is_checkmate() {
    let mut position = Position::new();
    for uci in ["e2e4", "e7e5", "d1h5", "b8c6", "f1c4", "g8f6", "h5f7"] {
        position.make_uci(uci).expect("legal mating-line move");
    }
    assert!(is_checkmate(&position));
    assert!(!is_stalemate(&position));
    assert!(is_terminal(&position));
    assert!(position.legal_moves().is_empty());
}

#[test]
fn stalemate_is_terminal_but_not_draw_by_rule() {
    let position: Position = "7k/5Q2/6K1/8/8/8/8/8 b - - 12 60".parse().expect("valid");
    assert!(is_stalemate(&position));
    assert!(!is_checkmate(&position));
    assert!(is_terminal(&position));
    // neither repetition nor fifty moves: the claimable-draw predicate is off
    assert!(!is_draw(&position));
    assert_eq!(position_status(&position), GameStatus::Stalemate);
}

#[test]
fn automatic_draw_thresholds() {
    let position: Position = "4k3/8/8/8/8/8/8/4K2R w - - 150 120"
        .parse()
        .expect("valid FEN");
    assert!(is_seventyfive_move(&position));
    assert_eq!(position_status(&position), GameStatus::DrawSeventyFiveMove);

    let mut position = Position::new();
    let cycle = ["g1f3", "g8f6", "f3g1", "f6g8"];
    for _ in 0..4 {
        for uci in cycle {
            position.make_uci(uci).expect("legal shuffle move");
        }
    }
    // fifth occurrence of the starting position
    assert_eq!(position.repetition_count(), 5);
    assert!(is_fivefold(&position));
    assert_eq!(position_status(&position), GameStatus::DrawFivefold);
}

#[test]
fn startpos_facts() {
    let position = Position::new();
    assert!(!is_checkmate(&position));
    assert!(!is_stalemate(&position));
    assert_eq!(position.legal_moves().len(), 20);
    assert_eq!(position_status(&position), GameStatus::InPlay);
}
