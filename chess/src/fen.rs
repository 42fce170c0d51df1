//! Position-notation parsing for rendering.
//!
//! Only the piece-placement field is interpreted here; the trailing metadata
//! fields (side to move, castling rights, ...) are opaque to the renderer and
//! pass through verbatim to the rules engine.

use crate::square::{File, Rank, Square};
use crate::types::{Piece, PieceColor, PieceKind, Placement};

pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("empty position string")]
    Empty,
    #[error("invalid piece character '{0}'")]
    InvalidPiece(char),
    #[error("piece placement runs off the board")]
    OffBoard,
}

/// Parse the piece-placement field of a FEN-like string into a placement map.
///
/// Ranks come most-significant first (rank 8 down to rank 1), `/` separated;
/// digit runs are empty squares. Uppercase is white, lowercase black.
pub fn placement(fen: &str) -> Result<Placement, FenError> {
    let board_field = fen.split_whitespace().next().ok_or(FenError::Empty)?;

    let mut pieces = Placement::new();
    let mut file = 0usize;
    let mut rank = 7usize;

    for c in board_field.chars() {
        match c {
            '/' => {
                rank = rank.checked_sub(1).ok_or(FenError::OffBoard)?;
                file = 0;
            }
            '1'..='8' => {
                file += (c as u8 - b'0') as usize;
                if file > 8 {
                    return Err(FenError::OffBoard);
                }
            }
            _ => {
                let kind = PieceKind::from_char(c).ok_or(FenError::InvalidPiece(c))?;
                let color = if c.is_ascii_lowercase() {
                    PieceColor::Black
                } else {
                    PieceColor::White
                };
                let square = Square::new(
                    File::from_index(file).ok_or(FenError::OffBoard)?,
                    Rank::from_index(rank).ok_or(FenError::OffBoard)?,
                );
                pieces.insert(square, Piece::new(color, kind));
                file += 1;
            }
        }
    }

    Ok(pieces)
}
