//! Highlight-overlay visuals: origin square, legal destinations, last move,
//! check. Ephemeral and non-animated, rebuilt on every drag-state or
//! position transition, so they carry no identity across updates.

use std::rc::Rc;

use chess::{PieceColor, Square};

use crate::board::BoardCtx;
use crate::geometry::square_to_percent;
use crate::scene::{NodeId, NodeKind, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Origin,
    Dest,
    LastMove,
    Check,
}

impl MarkerKind {
    pub fn class(self) -> &'static str {
        match self {
            Self::Origin => "orig",
            Self::Dest => "dest",
            Self::LastMove => "last-move",
            Self::Check => "check",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualSquare {
    pub kind: MarkerKind,
    pub square: Square,
}

pub type MarkerHandle = Rc<VisualSquare>;

impl VisualSquare {
    pub fn spawn(kind: MarkerKind, square: Square) -> MarkerHandle {
        Rc::new(Self { kind, square })
    }
}

/// Materialize a marker at its square as drawn under `orientation`.
pub fn materialize_marker(
    ctx: &BoardCtx,
    marker: &MarkerHandle,
    orientation: PieceColor,
) -> NodeId {
    let mut scene = ctx.scene.borrow_mut();
    let node = scene.create(NodeKind::Marker);
    scene.set_class(node, "square", true);
    scene.set_class(node, marker.kind.class(), true);
    let (x, y) = square_to_percent(marker.square, orientation);
    scene.set_transform(node, Transform::translate(x, y));
    node
}
