//! The rendering and interaction core: a retained scene tree behind a narrow
//! visual-primitive surface, a sequence reconciler that patches it with
//! minimal churn, per-piece animation controllers, and the board controller
//! state machine that turns drag actions into committed moves.

pub mod board;
pub mod geometry;
pub mod piece;
pub mod reconcile;
pub mod scene;
pub mod squares;

pub use board::{Board, BoardCtx, BoardSignals, DragPhase};
pub use geometry::Bounds;
pub use piece::{PieceHandle, VisualPiece, XyAction};
pub use reconcile::{diff, reconcile, Diff};
pub use scene::{NodeId, NodeKind, Scene, SceneHandle, Transform};
pub use squares::{MarkerHandle, MarkerKind, VisualSquare};
