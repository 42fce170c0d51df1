//! Per-piece visual state: one long-lived animated entity per on-screen
//! piece, driven entirely through its signals.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use chess::{Piece, PieceColor, Square};
use rand::Rng;
use reactive::{lerp, AnimationJob, Signal};

use crate::board::BoardCtx;
use crate::geometry::square_to_percent;
use crate::scene::{NodeId, NodeKind, Transform};

/// Translation animation duration.
pub const TRANSLATE_MS: f64 = 266.0;
/// Rotation / scale animation duration.
pub const SPIN_MS: f64 = 333.0;

/// Drag-follow moves this fraction of the remaining gap per pointer event.
const FOLLOW_X: f64 = 0.7;
const FOLLOW_Y: f64 = 0.55;

/// Upper bound of the randomized entrance tilt, in degrees.
const ENTRANCE_TILT_DEG: f64 = 16.0;

/// Pending translate action for a piece.
#[derive(Clone)]
pub enum XyAction {
    /// Move a fraction of the way toward the target immediately
    /// (drag-follow, not engine-driven).
    Lerp { x: f64, y: f64 },
    /// Start an eased translation toward the target, cancelling any
    /// in-flight one first.
    Animate {
        x: f64,
        y: f64,
        on_end: Option<Rc<dyn Fn()>>,
    },
    /// Stop the in-flight translation without snapping anywhere.
    Cancel,
}

// Completion callbacks don't participate in change detection.
impl PartialEq for XyAction {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Lerp { x: ax, y: ay }, Self::Lerp { x: bx, y: by }) => ax == bx && ay == by,
            (Self::Animate { x: ax, y: ay, .. }, Self::Animate { x: bx, y: by, .. }) => {
                ax == bx && ay == by
            }
            (Self::Cancel, Self::Cancel) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for XyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lerp { x, y } => write!(f, "Lerp({x}, {y})"),
            Self::Animate { x, y, on_end } => {
                write!(f, "Animate({x}, {y}, on_end: {})", on_end.is_some())
            }
            Self::Cancel => write!(f, "Cancel"),
        }
    }
}

/// The persistent on-screen representation of one physical piece.
///
/// Identity is the shared pointer: a `VisualPiece` survives position changes
/// for the same physical piece, which is what keeps its animation continuous
/// across placement updates. Owned exclusively by the board's live list.
pub struct VisualPiece {
    pub piece: Piece,
    pub position: Cell<Square>,
    /// Skip the entrance jitter and sit on the square at once. Set for the
    /// replacement piece synthesized when a drop animation lands, which
    /// would otherwise flicker.
    pub place_immediately: bool,
    pub xy: Signal<XyAction>,
    pub deg: Signal<f64>,
    pub scale: Signal<f64>,
    pub ghost: Signal<bool>,
    pub dragging: Signal<bool>,
}

pub type PieceHandle = Rc<VisualPiece>;

impl VisualPiece {
    fn spawn_with(piece: Piece, position: Square, place_immediately: bool) -> PieceHandle {
        Rc::new(Self {
            piece,
            position: Cell::new(position),
            place_immediately,
            xy: Signal::new(),
            deg: Signal::new(),
            scale: Signal::new(),
            ghost: Signal::new(),
            dragging: Signal::new(),
        })
    }

    pub fn spawn(piece: Piece, position: Square) -> PieceHandle {
        Self::spawn_with(piece, position, false)
    }

    /// A piece that appears settled on its square, no entrance animation.
    pub fn spawn_placed(piece: Piece, position: Square) -> PieceHandle {
        Self::spawn_with(piece, position, true)
    }

    /// Emit an eased translation to `square` as drawn under `orientation`.
    pub fn animate_to(&self, square: Square, orientation: PieceColor) {
        let (x, y) = square_to_percent(square, orientation);
        self.xy.set(XyAction::Animate {
            x,
            y,
            on_end: None,
        });
    }
}

type JobSlot = Rc<RefCell<Option<Signal<AnimationJob>>>>;

fn cancel_job(ctx: &BoardCtx, slot: &JobSlot) {
    if let Some(job) = slot.borrow_mut().take() {
        ctx.anim.remove(&job);
    }
}

/// Start an eased job on one animation channel, replacing whatever was
/// in flight there.
fn start_job(
    ctx: &BoardCtx,
    slot: &JobSlot,
    start: (f64, f64),
    end: (f64, f64),
    duration_ms: f64,
    on_end: Option<Rc<dyn Fn()>>,
    apply: Rc<dyn Fn(f64, f64)>,
) {
    cancel_job(ctx, slot);
    let mut job = AnimationJob::new(start, end, ctx.anim.now_ms(), duration_ms);
    if let Some(on_end) = on_end {
        job = job.with_on_end(on_end);
    }
    let signal = Signal::with(job);
    signal.subscribe(move |job: &AnimationJob, _| {
        let (x, y) = job.sample();
        apply(x, y);
    });
    ctx.anim.add(&signal);
    *slot.borrow_mut() = Some(signal);
}

/// Materialize a piece into a live node and wire its signal subscriptions.
/// Returns the node; the subscriptions live as long as the piece's signals.
pub fn materialize(ctx: &BoardCtx, piece: &PieceHandle, orientation: &Signal<PieceColor>) -> NodeId {
    let node = {
        let mut scene = ctx.scene.borrow_mut();
        let node = scene.create(NodeKind::Piece);
        scene.set_class(node, "piece", true);
        scene.set_class(node, piece.piece.color.as_str(), true);
        scene.set_class(node, piece.piece.kind.as_str(), true);
        node
    };

    let orient = orientation.get().unwrap_or(PieceColor::White);
    let (square_x, square_y) = square_to_percent(piece.position.get(), orient);

    // Local mirror of the last-applied transform; animation jobs interpolate
    // from these.
    let x = Rc::new(Cell::new(square_x));
    let y = Rc::new(Cell::new(square_y));
    let deg = Rc::new(Cell::new(0.0_f64));
    let scale = Rc::new(Cell::new(1.0_f64));

    let translate: Rc<dyn Fn(f64, f64)> = {
        let scene = Rc::clone(&ctx.scene);
        let (x, y) = (Rc::clone(&x), Rc::clone(&y));
        Rc::new(move |nx, ny| {
            x.set(nx);
            y.set(ny);
            scene.borrow_mut().set_transform(node, Transform::translate(nx, ny));
        })
    };
    let rotate: Rc<dyn Fn(f64)> = {
        let scene = Rc::clone(&ctx.scene);
        let deg = Rc::clone(&deg);
        Rc::new(move |d| {
            deg.set(d);
            scene.borrow_mut().set_transform(node, Transform::rotate(d));
        })
    };
    let rescale: Rc<dyn Fn(f64)> = {
        let scene = Rc::clone(&ctx.scene);
        let scale = Rc::clone(&scale);
        Rc::new(move |s| {
            scale.set(s);
            scene.borrow_mut().set_transform(node, Transform::rescale(s));
        })
    };

    // Entrance pose: a little random tilt and overscale that animates out,
    // unless the piece is a settled replacement.
    if piece.place_immediately {
        translate(square_x, square_y);
        rotate(0.0);
        rescale(1.0);
    } else {
        let mut rng = rand::rng();
        translate(square_x, square_y);
        rotate(rng.random_range(0.0..ENTRANCE_TILT_DEG));
        rescale(1.0 + 0.4 - rng.random_range(0.0..0.2));
    }

    // Translate channel.
    let xy_slot: JobSlot = Rc::new(RefCell::new(None));
    let handle_xy: Rc<dyn Fn(&XyAction)> = {
        let ctx = ctx.clone();
        let xy_slot = Rc::clone(&xy_slot);
        let (x, y) = (Rc::clone(&x), Rc::clone(&y));
        let translate = Rc::clone(&translate);
        Rc::new(move |action| match action {
            XyAction::Lerp { x: tx, y: ty } => {
                cancel_job(&ctx, &xy_slot);
                translate(lerp(x.get(), *tx, FOLLOW_X), lerp(y.get(), *ty, FOLLOW_Y));
            }
            XyAction::Animate { x: tx, y: ty, on_end } => {
                start_job(
                    &ctx,
                    &xy_slot,
                    (x.get(), y.get()),
                    (*tx, *ty),
                    TRANSLATE_MS,
                    on_end.clone(),
                    {
                        let translate = Rc::clone(&translate);
                        Rc::new(move |vx, vy| translate(vx, vy))
                    },
                );
            }
            XyAction::Cancel => cancel_job(&ctx, &xy_slot),
        })
    };
    piece.xy.subscribe({
        let handle_xy = Rc::clone(&handle_xy);
        move |action, _| handle_xy(action)
    });

    // Rotation channel.
    let deg_slot: JobSlot = Rc::new(RefCell::new(None));
    let start_deg: Rc<dyn Fn(f64)> = {
        let ctx = ctx.clone();
        let deg_slot = Rc::clone(&deg_slot);
        let deg = Rc::clone(&deg);
        let rotate = Rc::clone(&rotate);
        Rc::new(move |target| {
            start_job(
                &ctx,
                &deg_slot,
                (deg.get(), 0.0),
                (target, 0.0),
                SPIN_MS,
                None,
                {
                    let rotate = Rc::clone(&rotate);
                    Rc::new(move |d, _| rotate(d))
                },
            );
        })
    };
    piece.deg.subscribe({
        let start_deg = Rc::clone(&start_deg);
        move |target, _| start_deg(*target)
    });

    // Scale channel.
    let scale_slot: JobSlot = Rc::new(RefCell::new(None));
    let start_scale: Rc<dyn Fn(f64)> = {
        let ctx = ctx.clone();
        let scale_slot = Rc::clone(&scale_slot);
        let scale = Rc::clone(&scale);
        let rescale = Rc::clone(&rescale);
        Rc::new(move |target| {
            start_job(
                &ctx,
                &scale_slot,
                (scale.get(), 0.0),
                (target, 0.0),
                SPIN_MS,
                None,
                {
                    let rescale = Rc::clone(&rescale);
                    Rc::new(move |s, _| rescale(s))
                },
            );
        })
    };
    piece.scale.subscribe({
        let start_scale = Rc::clone(&start_scale);
        move |target, _| start_scale(*target)
    });

    // Display flags.
    piece.ghost.subscribe({
        let scene = Rc::clone(&ctx.scene);
        move |on, _| scene.borrow_mut().set_class(node, "ghost", *on)
    });
    piece.dragging.subscribe({
        let scene = Rc::clone(&ctx.scene);
        move |on, _| scene.borrow_mut().set_class(node, "dragging", *on)
    });

    // Replay anything already pending on the signals (the board may have
    // acted on this piece before the reconciler materialized it), otherwise
    // settle into the default pose.
    match piece.xy.get() {
        Some(action) => handle_xy(&action),
        None => piece.xy.set(XyAction::Animate {
            x: square_x,
            y: square_y,
            on_end: None,
        }),
    }
    match piece.deg.get() {
        Some(target) if target != deg.get() => start_deg(target),
        Some(_) => {}
        None => piece.deg.set(0.0),
    }
    match piece.scale.get() {
        Some(target) if target != scale.get() => start_scale(target),
        Some(_) => {}
        None => piece.scale.set(1.0),
    }
    if piece.ghost.get() == Some(true) {
        ctx.scene.borrow_mut().set_class(node, "ghost", true);
    }
    if piece.dragging.get() == Some(true) {
        ctx.scene.borrow_mut().set_class(node, "dragging", true);
    }

    node
}
