//! Wiring tests: the position signal drives the pure mappings, and the
//! move-commit collaborator applies moves through the rules engine.

use chess::{PieceColor, Square};
use client_tui::app::App;

fn sq(s: &str) -> Square {
    Square::parse(s).unwrap()
}

#[test]
fn committed_moves_advance_the_position() {
    let app = App::new(chess::INITIAL_FEN, PieceColor::White).unwrap();

    app.signals.moved.set((sq("e2"), sq("e4")));

    let fen = app.position.get().unwrap();
    assert!(fen.starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b"));
    assert_eq!(app.signals.turn.get(), Some(PieceColor::Black));

    let placement = app.signals.pieces.get().unwrap();
    assert!(placement.contains_key(&sq("e4")));
    assert!(!placement.contains_key(&sq("e2")));
}

#[test]
fn start_position_derives_all_board_inputs() {
    let app = App::new(chess::INITIAL_FEN, PieceColor::White).unwrap();

    assert_eq!(app.signals.turn.get(), Some(PieceColor::White));
    assert_eq!(app.signals.check.get(), Some(false));
    assert_eq!(app.signals.pieces.get().map(|p| p.len()), Some(32));
    let dests = app.signals.dests.get().unwrap();
    assert!(dests.get(&sq("e2")).is_some_and(|list| list.contains(&sq("e4"))));
}

#[test]
fn invalid_start_position_is_an_error() {
    assert!(App::new("not a position", PieceColor::White).is_err());
}

#[test]
fn flip_toggles_the_viewing_side() {
    let app = App::new(chess::INITIAL_FEN, PieceColor::White).unwrap();
    assert_eq!(app.signals.orientation.get(), Some(PieceColor::White));
    app.flip();
    assert_eq!(app.signals.orientation.get(), Some(PieceColor::Black));
    app.flip();
    assert_eq!(app.signals.orientation.get(), Some(PieceColor::White));
}

#[test]
fn rejected_moves_leave_the_position_unchanged() {
    let app = App::new(chess::INITIAL_FEN, PieceColor::White).unwrap();
    let before = app.position.get().unwrap();

    // the board never publishes these, but the collaborator still refuses
    app.signals.moved.set((sq("e2"), sq("e5")));

    assert_eq!(app.position.get().unwrap(), before);
}
