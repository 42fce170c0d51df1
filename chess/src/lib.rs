//! Board-domain value types and the rules facade.
//!
//! Everything outside this crate sees project-owned types; cozy-chess is an
//! internal implementation detail of the `rules` module.

pub mod fen;
pub mod rules;
pub mod square;
pub mod types;

pub use fen::{FenError, INITIAL_FEN};
pub use rules::RulesError;
pub use square::{File, Rank, Square};
pub use types::{Dests, Piece, PieceColor, PieceKind, Placement};
