//! The rules facade: pure functions over a position-notation string.
//!
//! This is the only module that talks to cozy-chess. Callers validate
//! legality through `legal_destinations` before `apply_move`; an illegal
//! pair is still a hard error here, never a silent no-op.

use cozy_chess::Board;

use crate::square::Square;
use crate::types::{Dests, PieceColor};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    #[error("invalid position notation")]
    InvalidPosition,
    #[error("illegal move {from}{to}")]
    IllegalMove { from: Square, to: Square },
}

fn parse_board(fen: &str) -> Result<Board, RulesError> {
    fen.parse().map_err(|_| RulesError::InvalidPosition)
}

fn all_moves(board: &Board) -> Vec<cozy_chess::Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

/// Castling moves come out of cozy-chess king-takes-rook style. Returns the
/// conventional two-square king destination for such a move, `None` for
/// everything else.
fn castle_alias(board: &Board, mv: cozy_chess::Move) -> Option<cozy_chess::Square> {
    let mover = board.piece_on(mv.from)?;
    if mover != cozy_chess::Piece::King || board.color_on(mv.to) != Some(board.side_to_move()) {
        return None;
    }
    let file = if (mv.to.file() as usize) > (mv.from.file() as usize) {
        cozy_chess::File::G
    } else {
        cozy_chess::File::C
    };
    Some(cozy_chess::Square::new(file, mv.from.rank()))
}

/// Side to move of the position.
pub fn side_to_move(fen: &str) -> Result<PieceColor, RulesError> {
    Ok(parse_board(fen)?.side_to_move().into())
}

/// Is the side to move currently in check?
pub fn in_check(fen: &str) -> Result<bool, RulesError> {
    Ok(!parse_board(fen)?.checkers().is_empty())
}

/// Legal destination squares per origin.
///
/// Castling appears both as the king's conventional two-square destination
/// and as the rook's square (the convention drag-and-drop consumers expect:
/// dropping the king on either square castles).
pub fn legal_destinations(fen: &str) -> Result<Dests, RulesError> {
    let board = parse_board(fen)?;
    let mut dests = Dests::new();

    for mv in all_moves(&board) {
        let from: Square = mv.from.into();
        let entry = dests.entry(from).or_default();
        let to: Square = mv.to.into();
        if !entry.contains(&to) {
            entry.push(to);
        }
        if let Some(alias) = castle_alias(&board, mv) {
            let alias: Square = alias.into();
            if !entry.contains(&alias) {
                entry.push(alias);
            }
        }
    }

    Ok(dests)
}

/// Apply the move `from -> to` and return the next position notation.
///
/// Pawns reaching the last rank promote to a queen: the interaction surface
/// offers no promotion picker, and the destination set already contains the
/// promoting push/capture.
pub fn apply_move(fen: &str, from: Square, to: Square) -> Result<String, RulesError> {
    let mut board = parse_board(fen)?;
    let cozy_from: cozy_chess::Square = from.into();
    let cozy_to: cozy_chess::Square = to.into();

    let candidates: Vec<cozy_chess::Move> = all_moves(&board)
        .into_iter()
        .filter(|mv| {
            mv.from == cozy_from
                && (mv.to == cozy_to || castle_alias(&board, *mv) == Some(cozy_to))
        })
        .collect();

    let chosen = candidates
        .iter()
        .find(|mv| mv.promotion == Some(cozy_chess::Piece::Queen))
        .or_else(|| candidates.iter().find(|mv| mv.promotion.is_none()))
        .or_else(|| candidates.first())
        .copied()
        .ok_or(RulesError::IllegalMove { from, to })?;

    board
        .try_play(chosen)
        .map_err(|_| RulesError::IllegalMove { from, to })?;
    Ok(board.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::{placement, INITIAL_FEN};

    fn sq(s: &str) -> Square {
        Square::parse(s).unwrap()
    }

    #[test]
    fn white_moves_first() {
        assert_eq!(side_to_move(INITIAL_FEN), Ok(PieceColor::White));
    }

    #[test]
    fn initial_position_is_not_check() {
        assert_eq!(in_check(INITIAL_FEN), Ok(false));
    }

    #[test]
    fn scholar_mate_threat_is_check() {
        // After 1.e4 e5 2.Qh5 Nc6 3.Qxf7+: black to move, in check.
        let fen = "r1bqkbnr/pppp1Qpp/2n5/4p3/4P3/8/PPPP1PPP/RNB1KBNR b KQkq - 0 3";
        assert_eq!(in_check(fen), Ok(true));
    }

    #[test]
    fn opening_pawn_destinations() {
        let dests = legal_destinations(INITIAL_FEN).unwrap();
        let e2 = dests.get(&sq("e2")).unwrap();
        assert!(e2.contains(&sq("e3")));
        assert!(e2.contains(&sq("e4")));
        assert!(!e2.contains(&sq("e5")));

        let total: usize = dests.values().map(Vec::len).sum();
        assert_eq!(total, 20);
    }

    #[test]
    fn apply_move_advances_the_position() {
        let next = apply_move(INITIAL_FEN, sq("e2"), sq("e4")).unwrap();
        assert_eq!(side_to_move(&next), Ok(PieceColor::Black));
        let pieces = placement(&next).unwrap();
        assert!(pieces.contains_key(&sq("e4")));
        assert!(!pieces.contains_key(&sq("e2")));
    }

    #[test]
    fn illegal_move_is_an_error() {
        assert_eq!(
            apply_move(INITIAL_FEN, sq("e2"), sq("e5")),
            Err(RulesError::IllegalMove {
                from: sq("e2"),
                to: sq("e5")
            })
        );
    }

    #[test]
    fn malformed_position_propagates() {
        assert_eq!(side_to_move("not a position"), Err(RulesError::InvalidPosition));
        assert_eq!(legal_destinations("8/8"), Err(RulesError::InvalidPosition));
    }

    #[test]
    fn castling_offers_both_destinations() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let dests = legal_destinations(fen).unwrap();
        let king = dests.get(&sq("e1")).unwrap();
        assert!(king.contains(&sq("g1")));
        assert!(king.contains(&sq("c1")));
        assert!(king.contains(&sq("h1")));
        assert!(king.contains(&sq("a1")));
    }

    #[test]
    fn castling_via_conventional_destination() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let next = apply_move(fen, sq("e1"), sq("g1")).unwrap();
        let pieces = placement(&next).unwrap();
        assert_eq!(
            pieces.get(&sq("g1")).map(|p| p.kind),
            Some(crate::types::PieceKind::King)
        );
        assert_eq!(
            pieces.get(&sq("f1")).map(|p| p.kind),
            Some(crate::types::PieceKind::Rook)
        );
    }

    #[test]
    fn promotion_auto_queens() {
        let fen = "8/P7/8/8/8/8/8/k6K w - - 0 1";
        let next = apply_move(fen, sq("a7"), sq("a8")).unwrap();
        let pieces = placement(&next).unwrap();
        assert_eq!(
            pieces.get(&sq("a8")).map(|p| p.kind),
            Some(crate::types::PieceKind::Queen)
        );
    }
}
