//! The board controller: owns the live visual collection, runs the drag
//! state machine, and keeps the scene synchronized with the external
//! position/turn/destination/orientation signals through the reconciler.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use chess::{Dests, PieceColor, PieceKind, Placement, Square};
use reactive::{AnimationEngine, DragAction, DragEngine, Signal};

use crate::geometry::{
    normalized_to_square, pointer_to_ghost_percent, square_to_percent, Bounds,
};
use crate::piece::{self, PieceHandle, VisualPiece, XyAction};
use crate::reconcile::reconcile;
use crate::scene::{NodeId, NodeKind, SceneHandle};
use crate::squares::{self, MarkerHandle, MarkerKind, VisualSquare};

/// Shared engine handles, constructed once at application start and passed
/// to every component that needs them.
#[derive(Clone)]
pub struct BoardCtx {
    pub scene: SceneHandle,
    pub anim: Rc<AnimationEngine>,
    pub drag: Rc<DragEngine>,
}

/// The board's external signal surface.
///
/// `pieces`/`turn`/`dests`/`check` are derived from the position notation by
/// the wiring layer; `orientation` is the viewing side; `last_move` is read
/// for highlight markers and written when a drag commits; `moved` is the
/// move-commit event consumed by the external move-application collaborator.
#[derive(Clone)]
pub struct BoardSignals {
    pub pieces: Signal<Placement>,
    pub turn: Signal<PieceColor>,
    pub dests: Signal<Dests>,
    pub check: Signal<bool>,
    pub orientation: Signal<PieceColor>,
    pub last_move: Signal<Option<(Square, Square)>>,
    pub moved: Signal<(Square, Square)>,
}

impl BoardSignals {
    pub fn new() -> Self {
        Self {
            pieces: Signal::new(),
            turn: Signal::new(),
            dests: Signal::new(),
            check: Signal::new(),
            orientation: Signal::with(PieceColor::White),
            last_move: Signal::new(),
            moved: Signal::new(),
        }
    }
}

impl Default for BoardSignals {
    fn default() -> Self {
        Self::new()
    }
}

/// The drag lifecycle as the board sees it.
///
/// `Settling` is the window between a drop and the end of its animation;
/// further drag actions are rejected until it clears.
#[derive(Clone)]
pub enum DragPhase {
    Idle,
    Active { ghost: PieceHandle, origin: PieceHandle },
    Settling { ghost: PieceHandle },
}

impl PartialEq for DragPhase {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Idle, Self::Idle) => true,
            (
                Self::Active { ghost: ag, origin: ao },
                Self::Active { ghost: bg, origin: bo },
            ) => Rc::ptr_eq(ag, bg) && Rc::ptr_eq(ao, bo),
            (Self::Settling { ghost: ag }, Self::Settling { ghost: bg }) => Rc::ptr_eq(ag, bg),
            _ => false,
        }
    }
}

impl fmt::Debug for DragPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Active { .. } => write!(f, "Active"),
            Self::Settling { .. } => write!(f, "Settling"),
        }
    }
}

/// One entry of the board's reconciled visual union. Identity is the shared
/// pointer, which is what lets the reconciler reuse live nodes.
#[derive(Clone)]
enum Visual {
    Piece(PieceHandle),
    Marker(MarkerHandle),
}

impl PartialEq for Visual {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Piece(a), Self::Piece(b)) => Rc::ptr_eq(a, b),
            (Self::Marker(a), Self::Marker(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

struct Inner {
    pieces: Vec<PieceHandle>,
    shown: Vec<Visual>,
    hover: Option<PieceHandle>,
    origin_mark: Option<MarkerHandle>,
    dest_marks: Vec<MarkerHandle>,
    lastmove_marks: Vec<MarkerHandle>,
    check_mark: Option<MarkerHandle>,
    bounds: Option<Bounds>,
    // change-detection caches for the coalesced flush
    orientation: PieceColor,
    placement: Option<Placement>,
    last_move: Option<(Square, Square)>,
    check_square: Option<Square>,
    files_seq: Vec<char>,
    ranks_seq: Vec<char>,
}

struct Ctrl {
    ctx: BoardCtx,
    signals: BoardSignals,
    inner: Rc<RefCell<Inner>>,
    session: Signal<DragPhase>,
    dirty: Rc<Cell<bool>>,
    // handle to ourselves for completion callbacks that must not keep the
    // controller alive
    weak: Weak<Ctrl>,
}

pub struct Board {
    ctrl: Rc<Ctrl>,
    drag_feed: Signal<DragAction>,
    root: NodeId,
    board_node: NodeId,
    files_node: NodeId,
    ranks_node: NodeId,
}

impl Board {
    pub fn new(ctx: BoardCtx, signals: BoardSignals) -> Self {
        let (root, board_node, files_node, ranks_node) = {
            let mut scene = ctx.scene.borrow_mut();
            let scene_root = scene.root();
            let root = scene.create(NodeKind::Container);
            scene.set_class(root, "board-wrap", true);
            let board_node = scene.create(NodeKind::Container);
            scene.set_class(board_node, "board", true);
            let files_node = scene.create(NodeKind::Container);
            scene.set_class(files_node, "files", true);
            let ranks_node = scene.create(NodeKind::Container);
            scene.set_class(ranks_node, "ranks", true);
            scene.append_child(scene_root, root);
            scene.append_child(root, board_node);
            scene.append_child(root, files_node);
            scene.append_child(root, ranks_node);
            (root, board_node, files_node, ranks_node)
        };

        let orientation = signals.orientation.get().unwrap_or(PieceColor::White);
        let ctrl = Rc::new_cyclic(|weak| Ctrl {
            weak: weak.clone(),
            ctx,
            signals,
            inner: Rc::new(RefCell::new(Inner {
                pieces: Vec::new(),
                shown: Vec::new(),
                hover: None,
                origin_mark: None,
                dest_marks: Vec::new(),
                lastmove_marks: Vec::new(),
                check_mark: None,
                bounds: None,
                orientation,
                placement: None,
                last_move: None,
                check_square: None,
                files_seq: Vec::new(),
                ranks_seq: Vec::new(),
            })),
            session: Signal::with(DragPhase::Idle),
            dirty: Rc::new(Cell::new(true)),
        });

        // Every input change just marks the board dirty; the flush observes
        // only the latest values, coalescing bursts into one reconcile pass.
        dirty_on(&ctrl.signals.pieces, &ctrl.dirty);
        dirty_on(&ctrl.signals.turn, &ctrl.dirty);
        dirty_on(&ctrl.signals.dests, &ctrl.dirty);
        dirty_on(&ctrl.signals.check, &ctrl.dirty);
        dirty_on(&ctrl.signals.orientation, &ctrl.dirty);
        dirty_on(&ctrl.signals.last_move, &ctrl.dirty);
        dirty_on(&ctrl.session, &ctrl.dirty);

        let drag_feed = Signal::new();
        drag_feed.subscribe({
            let ctrl = Rc::clone(&ctrl);
            move |action: &DragAction, _| ctrl.on_drag(action)
        });

        Self {
            ctrl,
            drag_feed,
            root,
            board_node,
            files_node,
            ranks_node,
        }
    }

    /// Pointer pressed in host coordinates. Starts a drag when inside the
    /// board rect.
    pub fn pointer_down(&self, x: f64, y: f64) {
        let inside = self
            .ctrl
            .inner
            .borrow()
            .bounds
            .is_some_and(|bounds| bounds.contains(x, y));
        if inside {
            self.ctrl.ctx.drag.begin_drag(&self.drag_feed, x, y);
        }
    }

    /// The host reports the board rect here whenever it resizes.
    pub fn set_bounds(&self, bounds: Bounds) {
        self.ctrl.inner.borrow_mut().bounds = Some(bounds);
    }

    /// Apply every pending state change in one reconciler pass. Call once
    /// per host loop iteration.
    pub fn flush(&self) {
        if !self.ctrl.dirty.replace(false) {
            return;
        }
        let ctrl = &self.ctrl;
        let orientation = ctrl.signals.orientation.get().unwrap_or(PieceColor::White);

        {
            let mut inner = ctrl.inner.borrow_mut();
            let orientation_changed = orientation != inner.orientation;
            if orientation_changed {
                inner.orientation = orientation;
                // every piece re-animates to its square under the new mapping
                for piece in &inner.pieces {
                    piece.animate_to(piece.position.get(), orientation);
                }
                // markers carry no animation state: rebuild them where they
                // stand so they materialize at the flipped coordinates
                inner.origin_mark = inner
                    .origin_mark
                    .take()
                    .map(|mark| VisualSquare::spawn(mark.kind, mark.square));
                let dest_marks: Vec<MarkerHandle> = inner
                    .dest_marks
                    .iter()
                    .map(|mark| VisualSquare::spawn(mark.kind, mark.square))
                    .collect();
                inner.dest_marks = dest_marks;
            }

            if let Some(placement) = ctrl.signals.pieces.get() {
                if inner.placement.as_ref() != Some(&placement) {
                    set_pieces(&mut inner, &placement, orientation);
                    inner.placement = Some(placement);
                }
            }

            let last_move = ctrl.signals.last_move.get().flatten();
            if last_move != inner.last_move || orientation_changed {
                inner.last_move = last_move;
                inner.lastmove_marks = match last_move {
                    Some((from, to)) => vec![
                        VisualSquare::spawn(MarkerKind::LastMove, from),
                        VisualSquare::spawn(MarkerKind::LastMove, to),
                    ],
                    None => Vec::new(),
                };
            }

            // the checked side's king gets a check marker
            let check = ctrl.signals.check.get().unwrap_or(false);
            let check_square = if check {
                let turn = ctrl.signals.turn.get();
                inner.placement.as_ref().zip(turn).and_then(|(placement, turn)| {
                    placement
                        .iter()
                        .find(|(_, p)| p.kind == PieceKind::King && p.color == turn)
                        .map(|(square, _)| *square)
                })
            } else {
                None
            };
            if check_square != inner.check_square || orientation_changed {
                inner.check_square = check_square;
                inner.check_mark =
                    check_square.map(|square| VisualSquare::spawn(MarkerKind::Check, square));
            }
        }

        // Union in stacking order: last-move (and check), pieces, origin,
        // destinations, drag ghost.
        let (old, target) = {
            let mut inner = ctrl.inner.borrow_mut();
            let mut target: Vec<Visual> = Vec::new();
            target.extend(inner.lastmove_marks.iter().cloned().map(Visual::Marker));
            if let Some(mark) = &inner.check_mark {
                target.push(Visual::Marker(Rc::clone(mark)));
            }
            target.extend(inner.pieces.iter().cloned().map(Visual::Piece));
            if let Some(mark) = &inner.origin_mark {
                target.push(Visual::Marker(Rc::clone(mark)));
            }
            target.extend(inner.dest_marks.iter().cloned().map(Visual::Marker));
            match ctrl.session.get() {
                Some(DragPhase::Active { ghost, .. }) | Some(DragPhase::Settling { ghost }) => {
                    target.push(Visual::Piece(ghost));
                }
                _ => {}
            }
            let old = std::mem::replace(&mut inner.shown, target.clone());
            (old, target)
        };

        reconcile(&ctrl.ctx.scene, self.board_node, &old, &target, |visual| {
            match visual {
                Visual::Piece(handle) => {
                    piece::materialize(&ctrl.ctx, handle, &ctrl.signals.orientation)
                }
                Visual::Marker(handle) => {
                    squares::materialize_marker(&ctrl.ctx, handle, orientation)
                }
            }
        });

        // Coordinate label strips: a relabel is a reconcile too, reusing
        // nodes where the sequences share members.
        let (files_target, ranks_target) = label_sequences(orientation);
        let files_old = ctrl.inner.borrow().files_seq.clone();
        if files_old != files_target {
            reconcile(&ctrl.ctx.scene, self.files_node, &files_old, &files_target, |c| {
                label_node(&ctrl.ctx, *c)
            });
            ctrl.inner.borrow_mut().files_seq = files_target;
        }
        let ranks_old = ctrl.inner.borrow().ranks_seq.clone();
        if ranks_old != ranks_target {
            reconcile(&ctrl.ctx.scene, self.ranks_node, &ranks_old, &ranks_target, |c| {
                label_node(&ctrl.ctx, *c)
            });
            ctrl.inner.borrow_mut().ranks_seq = ranks_target;
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn board_node(&self) -> NodeId {
        self.board_node
    }

    pub fn files_node(&self) -> NodeId {
        self.files_node
    }

    pub fn ranks_node(&self) -> NodeId {
        self.ranks_node
    }

    pub fn signals(&self) -> &BoardSignals {
        &self.ctrl.signals
    }

    pub fn drag_phase(&self) -> DragPhase {
        self.ctrl.session.get().unwrap_or(DragPhase::Idle)
    }

    /// Snapshot of the live piece list (the drag ghost is not in it).
    pub fn visual_pieces(&self) -> Vec<PieceHandle> {
        self.ctrl.inner.borrow().pieces.clone()
    }
}

fn dirty_on<T: Clone + PartialEq + 'static>(signal: &Signal<T>, dirty: &Rc<Cell<bool>>) {
    let dirty = Rc::clone(dirty);
    signal.subscribe(move |_, _| dirty.set(true));
}

impl Ctrl {
    fn phase(&self) -> DragPhase {
        self.session.get().unwrap_or(DragPhase::Idle)
    }

    fn orientation(&self) -> PieceColor {
        self.signals.orientation.get().unwrap_or(PieceColor::White)
    }

    fn on_drag(&self, action: &DragAction) {
        match *action {
            DragAction::Start { x, y } => self.drag_start(x, y),
            DragAction::Move { x, y } => self.drag_move(x, y),
            DragAction::Drop { x, y } => self.drag_drop(x, y),
            DragAction::Cancel => self.drag_cancel(),
        }
    }

    fn drag_start(&self, x: f64, y: f64) {
        // an active session wins over a re-entrant start
        if !matches!(self.phase(), DragPhase::Idle) {
            return;
        }
        let Some(bounds) = self.inner.borrow().bounds else {
            return;
        };
        let (nx, ny) = bounds.normalize(x, y);
        let orientation = self.orientation();
        let Some(square) = normalized_to_square(nx, ny, orientation) else {
            return;
        };
        let found = self
            .inner
            .borrow()
            .pieces
            .iter()
            .find(|candidate| candidate.position.get() == square)
            .cloned();
        let Some(origin) = found else {
            return;
        };
        // only the side to move picks up pieces
        let Some(turn) = self.signals.turn.get() else {
            return;
        };
        if origin.piece.color != turn {
            return;
        }

        tracing::debug!(square = %square, "drag start");

        let ghost = VisualPiece::spawn(origin.piece, origin.position.get());
        ghost.dragging.set(true);
        let (gx, gy) = pointer_to_ghost_percent(nx, ny);
        ghost.xy.set(XyAction::Animate {
            x: gx,
            y: gy,
            on_end: None,
        });

        origin.ghost.set(true);
        origin.scale.set(0.8);

        {
            let mut inner = self.inner.borrow_mut();
            inner.origin_mark = Some(VisualSquare::spawn(MarkerKind::Origin, square));
            let dests = self.signals.dests.get().unwrap_or_default();
            inner.dest_marks = dests
                .get(&square)
                .into_iter()
                .flatten()
                .map(|&dest| VisualSquare::spawn(MarkerKind::Dest, dest))
                .collect();
        }

        self.session.set(DragPhase::Active { ghost, origin });
        self.dirty.set(true);
    }

    fn drag_move(&self, x: f64, y: f64) {
        let DragPhase::Active { ghost, origin } = self.phase() else {
            return;
        };
        let Some(bounds) = self.inner.borrow().bounds else {
            return;
        };
        let (nx, ny) = bounds.normalize(x, y);
        let (gx, gy) = pointer_to_ghost_percent(nx, ny);
        ghost.xy.set(XyAction::Lerp { x: gx, y: gy });

        // hover feedback on the piece under the cursor (never the origin)
        let over = normalized_to_square(nx, ny, self.orientation());
        let next_hover = over.and_then(|square| {
            self.inner
                .borrow()
                .pieces
                .iter()
                .find(|candidate| {
                    !Rc::ptr_eq(candidate, &origin) && candidate.position.get() == square
                })
                .cloned()
        });
        let prev_hover = self.inner.borrow().hover.clone();

        let same = match (&prev_hover, &next_hover) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if same {
            return;
        }

        if let Some(prev) = prev_hover {
            prev.scale.set(1.0);
            prev.deg.set(0.0);
        }
        if let Some(next) = &next_hover {
            next.deg.set(20.0);
            if next.piece.color != ghost.piece.color {
                // opposing piece shrinks to suggest capture
                next.scale.set(0.8);
            }
        }
        self.inner.borrow_mut().hover = next_hover;
    }

    fn drag_drop(&self, x: f64, y: f64) {
        let DragPhase::Active { ghost, origin } = self.phase() else {
            return;
        };
        let origin_square = origin.position.get();

        let dest = self
            .inner
            .borrow()
            .bounds
            .and_then(|bounds| {
                let (nx, ny) = bounds.normalize(x, y);
                normalized_to_square(nx, ny, self.orientation())
            })
            .filter(|dest| *dest != origin_square);
        let legal_dest = dest.filter(|dest| {
            self.signals
                .dests
                .get()
                .unwrap_or_default()
                .get(&origin_square)
                .is_some_and(|list| list.contains(dest))
        });

        if let Some(dest_square) = legal_dest {
            tracing::debug!(from = %origin_square, to = %dest_square, "drop commits");
            // vacate the origin and any captured visual; the replacement is
            // synthesized when the settle animation lands
            self.inner.borrow_mut().pieces.retain(|candidate| {
                !Rc::ptr_eq(candidate, &origin) && candidate.position.get() != dest_square
            });
            self.signals
                .last_move
                .set(Some((origin_square, dest_square)));
            self.settle(ghost, dest_square, Some((origin_square, dest_square)));
        } else {
            tracing::debug!(from = %origin_square, "drop snaps back");
            origin.ghost.set(false);
            origin.scale.set(1.0);
            self.settle(ghost, origin_square, None);
        }
    }

    fn drag_cancel(&self) {
        let DragPhase::Active { ghost, origin } = self.phase() else {
            return;
        };
        origin.ghost.set(false);
        origin.scale.set(1.0);
        self.settle(ghost, origin.position.get(), None);
    }

    /// Animate the ghost to its resolved square and finish the session when
    /// the animation lands. `commit` carries the origin/destination pair of
    /// a legal move, `None` for snap-backs and cancels.
    fn settle(&self, ghost: PieceHandle, square: Square, commit: Option<(Square, Square)>) {
        let ghost_piece = ghost.piece;
        self.session.set(DragPhase::Settling {
            ghost: Rc::clone(&ghost),
        });

        let (tx, ty) = square_to_percent(square, self.orientation());
        let on_end: Rc<dyn Fn()> = {
            let ctrl = self.weak.clone();
            Rc::new(move || {
                let Some(ctrl) = ctrl.upgrade() else {
                    return;
                };
                let hover = ctrl.inner.borrow_mut().hover.take();
                if let Some(hovered) = hover {
                    hovered.scale.set(1.0);
                    hovered.deg.set(0.0);
                }
                {
                    let mut inner = ctrl.inner.borrow_mut();
                    inner.origin_mark = None;
                    inner.dest_marks.clear();
                    if let Some((_, dest)) = commit {
                        inner
                            .pieces
                            .push(VisualPiece::spawn_placed(ghost_piece, dest));
                    }
                }
                ctrl.session.set(DragPhase::Idle);
                ctrl.dirty.set(true);
                if let Some((from, dest)) = commit {
                    ctrl.signals.moved.set((from, dest));
                }
            })
        };
        ghost.xy.set(XyAction::Animate {
            x: tx,
            y: ty,
            on_end: Some(on_end),
        });
        self.dirty.set(true);
    }
}

/// Greedy nearest-match placement reconciliation: each target square reuses
/// the unclaimed visual of the same color and role closest to it, so moves
/// travel plausibly instead of teleporting. Deliberately not a globally
/// optimal assignment.
fn set_pieces(inner: &mut Inner, placement: &Placement, orientation: PieceColor) {
    let mut available = inner.pieces.clone();
    let mut next = Vec::with_capacity(placement.len());

    for (&square, &target) in placement.iter() {
        let best = available
            .iter()
            .enumerate()
            .filter(|(_, candidate)| candidate.piece == target)
            .min_by_key(|(_, candidate)| candidate.position.get().distance_sq(square))
            .map(|(index, _)| index);
        match best {
            Some(index) => {
                let reused = available.remove(index);
                if reused.position.get() != square {
                    reused.position.set(square);
                    reused.animate_to(square, orientation);
                }
                next.push(reused);
            }
            None => next.push(VisualPiece::spawn(target, square)),
        }
    }

    tracing::debug!(
        kept = next.len(),
        dropped = available.len(),
        "placement reconciled"
    );
    inner.pieces = next;
}

/// Label sequences as displayed top-to-bottom / left-to-right for an
/// orientation.
fn label_sequences(orientation: PieceColor) -> (Vec<char>, Vec<char>) {
    let files: Vec<char> = ('a'..='h').collect();
    let ranks: Vec<char> = ('1'..='8').collect();
    match orientation {
        PieceColor::White => (files, ranks.into_iter().rev().collect()),
        PieceColor::Black => (files.into_iter().rev().collect(), ranks),
    }
}

fn label_node(ctx: &BoardCtx, text: char) -> NodeId {
    let mut scene = ctx.scene.borrow_mut();
    let node = scene.create(NodeKind::Label);
    scene.set_class(node, "label", true);
    scene.set_text(node, &text.to_string());
    node
}
