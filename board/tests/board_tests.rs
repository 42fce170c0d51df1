//! Drives the full board controller through scene and engines with an
//! explicit clock: drag lifecycle, legality, placement matching, and
//! orientation handling.

use std::cell::RefCell;
use std::rc::Rc;

use board::geometry::square_to_percent;
use board::{
    Board, BoardCtx, BoardSignals, Bounds, DragPhase, NodeKind, Scene,
};
use chess::{fen, rules, Piece, PieceColor, PieceKind, Placement, Square};
use reactive::{AnimationEngine, DragEngine};

fn sq(s: &str) -> Square {
    Square::parse(s).unwrap()
}

struct Fixture {
    ctx: BoardCtx,
    board: Board,
    signals: BoardSignals,
    moved_log: Rc<RefCell<Vec<(Square, Square)>>>,
}

impl Fixture {
    /// A board with bounds covering 0..800 per axis, so pointer coordinates
    /// coincide with percent coordinates.
    fn empty() -> Self {
        let ctx = BoardCtx {
            scene: Scene::new_handle(),
            anim: Rc::new(AnimationEngine::new()),
            drag: Rc::new(DragEngine::new()),
        };
        let signals = BoardSignals::new();
        let board = Board::new(ctx.clone(), signals.clone());
        board.set_bounds(Bounds::new(0.0, 0.0, 800.0, 800.0));

        let moved_log = Rc::new(RefCell::new(Vec::new()));
        signals.moved.subscribe({
            let moved_log = Rc::clone(&moved_log);
            move |&pair: &(Square, Square), _| moved_log.borrow_mut().push(pair)
        });

        Self {
            ctx,
            board,
            signals,
            moved_log,
        }
    }

    fn with_position(fen_str: &str) -> Self {
        let fixture = Self::empty();
        fixture.publish(fen_str);
        fixture.board.flush();
        // let the entrance animations land so tests start from a quiet board
        fixture.ctx.anim.tick(1_000.0);
        fixture
    }

    /// The wiring layer's job: derive the board inputs from a position.
    fn publish(&self, fen_str: &str) {
        self.signals.turn.set(rules::side_to_move(fen_str).unwrap());
        self.signals
            .dests
            .set(rules::legal_destinations(fen_str).unwrap());
        self.signals.check.set(rules::in_check(fen_str).unwrap());
        self.signals.pieces.set(fen::placement(fen_str).unwrap());
    }

    fn pointer_down_at(&self, square: Square) {
        let (x, y) = center(square);
        self.board.pointer_down(x, y);
    }

    fn drop_at(&self, square: Square) {
        let (x, y) = center(square);
        self.ctx.drag.pointer_up(x, y);
    }

    fn piece_at(&self, square: Square) -> Option<board::PieceHandle> {
        self.board
            .visual_pieces()
            .into_iter()
            .find(|piece| piece.position.get() == square)
    }

    fn occupied_squares(&self) -> Vec<Square> {
        let mut squares: Vec<Square> = self
            .board
            .visual_pieces()
            .iter()
            .map(|piece| piece.position.get())
            .collect();
        squares.sort();
        squares
    }
}

/// Pointer position over the center of a square as drawn for white.
fn center(square: Square) -> (f64, f64) {
    let (x, y) = square_to_percent(square, PieceColor::White);
    (x + 50.0, y + 50.0)
}

#[test]
fn legal_drag_commits_the_move() {
    let f = Fixture::with_position(fen::INITIAL_FEN);

    f.pointer_down_at(sq("e2"));
    assert!(matches!(f.board.drag_phase(), DragPhase::Active { .. }));
    f.board.flush();

    let (mx, my) = center(sq("e3"));
    f.ctx.drag.pointer_moved(mx, my);
    f.drop_at(sq("e4"));
    assert!(matches!(f.board.drag_phase(), DragPhase::Settling { .. }));
    f.board.flush();

    // no commit until the drop animation lands
    assert!(f.moved_log.borrow().is_empty());
    f.ctx.anim.tick(2_000.0);

    assert_eq!(*f.moved_log.borrow(), vec![(sq("e2"), sq("e4"))]);
    assert!(matches!(f.board.drag_phase(), DragPhase::Idle));
    // the replacement piece already sits at the destination
    assert!(f.piece_at(sq("e4")).is_some());
    assert!(f.piece_at(sq("e2")).is_none());

    // the external collaborator applies the move and republishes
    let next = rules::apply_move(fen::INITIAL_FEN, sq("e2"), sq("e4")).unwrap();
    f.publish(&next);
    f.board.flush();
    assert_eq!(f.board.visual_pieces().len(), 32);
    assert_eq!(
        f.piece_at(sq("e4")).map(|p| p.piece),
        Some(Piece::new(PieceColor::White, PieceKind::Pawn))
    );
}

#[test]
fn illegal_drop_snaps_back_without_commit() {
    let f = Fixture::with_position(fen::INITIAL_FEN);
    let before = f.occupied_squares();

    f.pointer_down_at(sq("e2"));
    f.board.flush();
    f.drop_at(sq("e5"));
    f.board.flush();
    f.ctx.anim.tick(2_000.0);

    assert!(f.moved_log.borrow().is_empty());
    assert!(matches!(f.board.drag_phase(), DragPhase::Idle));
    assert_eq!(f.occupied_squares(), before);
    // the original piece is visible again
    let origin = f.piece_at(sq("e2")).unwrap();
    assert_eq!(origin.ghost.get(), Some(false));
}

#[test]
fn drag_on_empty_square_is_declined() {
    let f = Fixture::with_position(fen::INITIAL_FEN);
    f.pointer_down_at(sq("e5"));
    assert!(matches!(f.board.drag_phase(), DragPhase::Idle));
}

#[test]
fn turn_gating_rejects_the_idle_side() {
    let f = Fixture::with_position(fen::INITIAL_FEN);
    // black pawn while it is white's turn: no session, no ghost
    f.pointer_down_at(sq("e7"));
    assert!(matches!(f.board.drag_phase(), DragPhase::Idle));
    f.board.flush();

    let piece_nodes = {
        let scene = f.ctx.scene.borrow();
        scene
            .children(f.board.board_node())
            .into_iter()
            .filter(|&node| scene.kind(node) == Some(NodeKind::Piece))
            .count()
    };
    assert_eq!(piece_nodes, 32);
}

#[test]
fn re_entrant_start_is_ignored_while_a_session_is_active() {
    let f = Fixture::with_position(fen::INITIAL_FEN);
    f.pointer_down_at(sq("e2"));
    f.board.flush();
    let DragPhase::Active { ghost: first, .. } = f.board.drag_phase() else {
        panic!("expected an active session");
    };

    f.pointer_down_at(sq("d2"));
    let DragPhase::Active { ghost: second, .. } = f.board.drag_phase() else {
        panic!("session should survive the re-entrant start");
    };
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn settling_window_rejects_new_drags() {
    let f = Fixture::with_position(fen::INITIAL_FEN);
    f.pointer_down_at(sq("e2"));
    f.board.flush();
    f.drop_at(sq("e4"));

    f.pointer_down_at(sq("d2"));
    assert!(matches!(f.board.drag_phase(), DragPhase::Settling { .. }));

    f.ctx.anim.tick(2_000.0);
    assert!(matches!(f.board.drag_phase(), DragPhase::Idle));
    assert_eq!(f.moved_log.borrow().len(), 1);
}

#[test]
fn escape_cancels_and_restores_the_origin() {
    let f = Fixture::with_position(fen::INITIAL_FEN);
    f.pointer_down_at(sq("e2"));
    f.board.flush();
    let origin = f.piece_at(sq("e2")).unwrap();
    assert_eq!(origin.ghost.get(), Some(true));

    f.ctx.drag.cancel();
    f.board.flush();
    f.ctx.anim.tick(2_000.0);

    assert!(matches!(f.board.drag_phase(), DragPhase::Idle));
    assert!(f.moved_log.borrow().is_empty());
    assert_eq!(origin.ghost.get(), Some(false));
    assert_eq!(origin.scale.get(), Some(1.0));
}

#[test]
fn placement_matching_prefers_the_nearest_piece() {
    let f = Fixture::empty();
    f.signals.turn.set(PieceColor::White);

    let rook = Piece::new(PieceColor::White, PieceKind::Rook);
    let mut first = Placement::new();
    first.insert(sq("a1"), rook);
    first.insert(sq("h8"), rook);
    f.signals.pieces.set(first);
    f.board.flush();

    let at_a1 = f.piece_at(sq("a1")).unwrap();
    let at_h8 = f.piece_at(sq("h8")).unwrap();

    let mut second = Placement::new();
    second.insert(sq("a2"), rook);
    second.insert(sq("g8"), rook);
    f.signals.pieces.set(second);
    f.board.flush();

    // nearest assignment, not the long diagonal swap
    assert_eq!(at_a1.position.get(), sq("a2"));
    assert_eq!(at_h8.position.get(), sq("g8"));
}

#[test]
fn identity_survives_placement_updates() {
    let f = Fixture::with_position(fen::INITIAL_FEN);
    let king = f.piece_at(sq("e1")).unwrap();

    let next = rules::apply_move(fen::INITIAL_FEN, sq("g1"), sq("f3")).unwrap();
    f.publish(&next);
    f.board.flush();

    let king_after = f.piece_at(sq("e1")).unwrap();
    assert!(Rc::ptr_eq(&king, &king_after));
}

#[test]
fn coalesced_updates_only_materialize_the_latest_state() {
    let f = Fixture::empty();
    let rook = Piece::new(PieceColor::White, PieceKind::Rook);

    let mut burst_a = Placement::new();
    burst_a.insert(sq("a1"), rook);
    burst_a.insert(sq("h1"), rook);
    let mut burst_b = Placement::new();
    burst_b.insert(sq("d4"), rook);

    // two synchronous updates, one flush: the intermediate state never
    // reaches the scene
    f.signals.pieces.set(burst_a);
    f.signals.pieces.set(burst_b);
    f.board.flush();

    let scene = f.ctx.scene.borrow();
    let piece_nodes = scene
        .children(f.board.board_node())
        .into_iter()
        .filter(|&node| scene.kind(node) == Some(NodeKind::Piece))
        .count();
    assert_eq!(piece_nodes, 1);
}

#[test]
fn orientation_flip_reanimates_every_piece() {
    let f = Fixture::with_position(fen::INITIAL_FEN);
    let before = f.occupied_squares();
    assert!(f.ctx.anim.is_idle());

    f.signals.orientation.set(PieceColor::Black);
    f.board.flush();

    // one fresh translation job per piece
    assert_eq!(f.ctx.anim.active_count(), 32);
    f.ctx.anim.tick(3_000.0);
    assert_eq!(f.occupied_squares(), before);

    // spot-check the drawn position under the flipped mapping
    let scene = f.ctx.scene.borrow();
    let king_node = scene
        .children(f.board.board_node())
        .into_iter()
        .find(|&node| {
            scene.kind(node) == Some(NodeKind::Piece)
                && scene.has_class(node, "white")
                && scene.has_class(node, "king")
        })
        .unwrap();
    let transform = scene.transform(king_node);
    assert_eq!(
        (transform.x, transform.y),
        square_to_percent(sq("e1"), PieceColor::Black)
    );
}

#[test]
fn drag_start_shows_origin_and_destination_markers() {
    let f = Fixture::with_position(fen::INITIAL_FEN);
    f.pointer_down_at(sq("e2"));
    f.board.flush();

    let scene = f.ctx.scene.borrow();
    let children = scene.children(f.board.board_node());
    let origin_marks = children
        .iter()
        .filter(|&&node| scene.has_class(node, "orig"))
        .count();
    let dest_marks = children
        .iter()
        .filter(|&&node| scene.has_class(node, "dest"))
        .count();
    assert_eq!(origin_marks, 1);
    // e2 pawn: e3 and e4
    assert_eq!(dest_marks, 2);
}

#[test]
fn markers_clear_after_the_drop_settles() {
    let f = Fixture::with_position(fen::INITIAL_FEN);
    f.pointer_down_at(sq("e2"));
    f.board.flush();
    f.drop_at(sq("e4"));
    f.board.flush();
    f.ctx.anim.tick(2_000.0);
    f.board.flush();

    let scene = f.ctx.scene.borrow();
    let children = scene.children(f.board.board_node());
    assert!(!children.iter().any(|&node| scene.has_class(node, "orig")));
    assert!(!children.iter().any(|&node| scene.has_class(node, "dest")));
    // the committed move leaves its trace
    let last_move_marks = children
        .iter()
        .filter(|&&node| scene.has_class(node, "last-move"))
        .count();
    assert_eq!(last_move_marks, 2);
}

#[test]
fn check_marks_the_checked_king() {
    // After 1.e4 e5 2.Qh5 Nc6 3.Qxf7+: black to move and in check.
    let fen_str = "r1bqkbnr/pppp1Qpp/2n5/4p3/4P3/8/PPPP1PPP/RNB1KBNR b KQkq - 0 3";
    let f = Fixture::with_position(fen_str);

    let scene = f.ctx.scene.borrow();
    let check_node = scene
        .children(f.board.board_node())
        .into_iter()
        .find(|&node| scene.has_class(node, "check"))
        .expect("check marker present");
    let transform = scene.transform(check_node);
    assert_eq!(
        (transform.x, transform.y),
        square_to_percent(sq("e8"), PieceColor::White)
    );
}

#[test]
fn ghost_piece_appears_only_while_dragging() {
    let f = Fixture::with_position(fen::INITIAL_FEN);

    let count_dragging = |f: &Fixture| {
        let scene = f.ctx.scene.borrow();
        scene
            .children(f.board.board_node())
            .into_iter()
            .filter(|&node| scene.has_class(node, "dragging"))
            .count()
    };

    assert_eq!(count_dragging(&f), 0);
    f.pointer_down_at(sq("e2"));
    f.board.flush();
    assert_eq!(count_dragging(&f), 1);

    f.drop_at(sq("e4"));
    f.ctx.anim.tick(2_000.0);
    f.board.flush();
    assert_eq!(count_dragging(&f), 0);
}
