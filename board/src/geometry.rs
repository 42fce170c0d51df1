//! Pure board geometry: square <-> percent mapping under an orientation, and
//! pointer normalization.
//!
//! Piece transforms are expressed in percent of one square's span, so a file
//! step is 100 and the whole board runs 0..800 per axis.

use chess::{File, PieceColor, Rank, Square};

pub const SQUARE_SPAN: f64 = 100.0;
pub const BOARD_SPAN: f64 = 800.0;

/// Screen rectangle of the board in the host's pointer units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    /// Pointer position as a 0..1 fraction of the rect per axis.
    pub fn normalize(&self, px: f64, py: f64) -> (f64, f64) {
        ((px - self.x) / self.width, (py - self.y) / self.height)
    }
}

/// Top-left corner of a square, in percent, as drawn under `orientation`.
pub fn square_to_percent(square: Square, orientation: PieceColor) -> (f64, f64) {
    let mut x = square.file.index() as f64;
    let mut y = 7.0 - square.rank.index() as f64;
    if orientation == PieceColor::Black {
        x = 7.0 - x;
        y = 7.0 - y;
    }
    (x * SQUARE_SPAN, y * SQUARE_SPAN)
}

/// The square under a normalized pointer position, or `None` outside the
/// board.
pub fn normalized_to_square(nx: f64, ny: f64, orientation: PieceColor) -> Option<Square> {
    let (mut x, mut y) = (nx, ny);
    if orientation == PieceColor::White {
        y = 1.0 - y;
    } else {
        x = 1.0 - x;
    }
    if !(0.0..1.0).contains(&x) || !(0.0..1.0).contains(&y) {
        return None;
    }
    let file = File::from_index((x * 8.0).floor() as usize)?;
    let rank = Rank::from_index((y * 8.0).floor() as usize)?;
    Some(Square::new(file, rank))
}

/// Percent position centering the drag ghost under a normalized pointer.
pub fn pointer_to_ghost_percent(nx: f64, ny: f64) -> (f64, f64) {
    (
        nx * BOARD_SPAN - SQUARE_SPAN / 2.0,
        ny * BOARD_SPAN - SQUARE_SPAN / 2.0,
    )
}
