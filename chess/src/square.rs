//! Files, ranks, and squares as project-owned value types.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    Seventh,
    Eighth,
}

/// A board square. Immutable value type; equality and ordering are
/// structural (file-major).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub file: File,
    pub rank: Rank,
}

impl File {
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn to_char(self) -> char {
        (b'a' + self as u8) as char
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='h' => Self::from_index((c as u8 - b'a') as usize),
            _ => None,
        }
    }
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::First,
        Rank::Second,
        Rank::Third,
        Rank::Fourth,
        Rank::Fifth,
        Rank::Sixth,
        Rank::Seventh,
        Rank::Eighth,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn to_char(self) -> char {
        (b'1' + self as u8) as char
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '1'..='8' => Self::from_index((c as u8 - b'1') as usize),
            _ => None,
        }
    }
}

impl Square {
    pub fn new(file: File, rank: Rank) -> Self {
        Self { file, rank }
    }

    /// Parse coordinate notation ("e4"). Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let file = File::from_char(chars.next()?)?;
        let rank = Rank::from_char(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Self { file, rank })
    }

    /// Squared file/rank distance, the metric of the nearest-match heuristic.
    pub fn distance_sq(self, other: Self) -> i32 {
        let df = self.file.index() as i32 - other.file.index() as i32;
        let dr = self.rank.index() as i32 - other.rank.index() as i32;
        df * df + dr * dr
    }

    pub fn all() -> impl Iterator<Item = Square> {
        File::ALL
            .iter()
            .flat_map(|&file| Rank::ALL.iter().map(move |&rank| Square { file, rank }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file.to_char(), self.rank.to_char())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid square notation '{0}'")]
pub struct SquareParseError(String);

impl FromStr for Square {
    type Err = SquareParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| SquareParseError(s.to_string()))
    }
}

impl From<cozy_chess::Square> for Square {
    fn from(sq: cozy_chess::Square) -> Self {
        Self {
            // Indices agree by construction on both sides (A..H, 1..8).
            file: File::ALL[sq.file() as usize],
            rank: Rank::ALL[sq.rank() as usize],
        }
    }
}

impl From<Square> for cozy_chess::Square {
    fn from(sq: Square) -> Self {
        cozy_chess::Square::new(
            cozy_chess::File::index(sq.file.index()),
            cozy_chess::Rank::index(sq.rank.index()),
        )
    }
}
