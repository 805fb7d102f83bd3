use std::error::Error;
use std::fmt;

use crate::square::Square;

/// Errors from parsing a square out of algebraic text or a raw index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareParseError {
    /// Square text must be exactly two characters ("e4").
    InvalidLength,
    /// File character outside 'a'..='h'.
    InvalidFile(char),
    /// Rank character outside '1'..='8'.
    InvalidRank(char),
    /// Raw index above 63.
    IndexOutOfRange(u8),
}

impl fmt::Display for SquareParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareParseError::InvalidLength => write!(f, "square text must be two characters"),
            SquareParseError::InvalidFile(c) => write!(f, "invalid file character '{}'", c),
            SquareParseError::InvalidRank(c) => write!(f, "invalid rank character '{}'", c),
            SquareParseError::IndexOutOfRange(i) => write!(f, "square index {} out of range", i),
        }
    }
}

impl Error for SquareParseError {}

/// Errors from parsing a FEN string into a position.
///
/// `set_fen` reports the first failure it finds; the position is left in
/// its cleared state whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenParseError {
    /// The FEN string does not contain all six fields.
    MissingField(&'static str),
    /// Unexpected trailing text after the six fields.
    TrailingInput,
    /// The board field does not describe exactly eight ranks.
    BadRankCount(usize),
    /// A rank does not describe exactly eight squares.
    BadRankWidth { rank: usize, width: usize },
    /// A character in the board field is neither a piece glyph nor a digit.
    InvalidPieceChar(char),
    /// The side-to-move field is not "w" or "b".
    InvalidSideToMove(String),
    /// The castling field contains a character outside "KQkq-" or misuses "-".
    InvalidCastling(String),
    /// A castling flag is set although its king or rook is off its origin square.
    CastlingRightsMismatch(char),
    /// The en-passant field is neither "-" nor a valid square.
    InvalidEnPassant(String),
    /// The en-passant square is inconsistent with a just-played double push.
    EnPassantMismatch(Square),
    /// A clock field is not a nonnegative decimal integer.
    InvalidClock(&'static str, String),
    /// Each side must have exactly one king.
    KingCount { white: u32, black: u32 },
    /// Pawns may not stand on the first or eighth rank.
    PawnOnBackRank,
    /// The side that is not to move may not be in check.
    OpponentInCheck,
}

impl fmt::Display for FenParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenParseError::MissingField(name) => write!(f, "missing FEN field: {}", name),
            FenParseError::TrailingInput => write!(f, "unexpected text after fullmove number"),
            FenParseError::BadRankCount(n) => write!(f, "expected 8 ranks, found {}", n),
            FenParseError::BadRankWidth { rank, width } => {
                write!(f, "rank {} describes {} squares, expected 8", rank, width)
            }
            FenParseError::InvalidPieceChar(c) => write!(f, "invalid piece character '{}'", c),
            FenParseError::InvalidSideToMove(s) => write!(f, "invalid side to move \"{}\"", s),
            FenParseError::InvalidCastling(s) => write!(f, "invalid castling field \"{}\"", s),
            FenParseError::CastlingRightsMismatch(c) => {
                write!(f, "castling right '{}' without king and rook in place", c)
            }
            FenParseError::InvalidEnPassant(s) => write!(f, "invalid en-passant field \"{}\"", s),
            FenParseError::EnPassantMismatch(sq) => {
                write!(f, "en-passant square {} without a double-pushed pawn", sq)
            }
            FenParseError::InvalidClock(name, s) => {
                write!(f, "invalid {} \"{}\"", name, s)
            }
            FenParseError::KingCount { white, black } => {
                write!(f, "expected one king per side, found {}/{}", white, black)
            }
            FenParseError::PawnOnBackRank => write!(f, "pawn on rank 1 or rank 8"),
            FenParseError::OpponentInCheck => {
                write!(f, "side not to move is in check")
            }
        }
    }
}

impl Error for FenParseError {}

/// Errors from resolving long-algebraic move text against a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    /// Move text must be 4 or 5 characters ("e2e4", "e7e8q").
    InvalidLength(usize),
    /// A square inside the move text failed to parse.
    InvalidSquare(SquareParseError),
    /// The promotion suffix is not one of "nbrq".
    InvalidPromotion(char),
    /// The text is well-formed but names no legal move in this position.
    IllegalMove(String),
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidLength(n) => {
                write!(f, "move text must be 4 or 5 characters, got {}", n)
            }
            MoveParseError::InvalidSquare(e) => write!(f, "bad square in move text: {}", e),
            MoveParseError::InvalidPromotion(c) => {
                write!(f, "invalid promotion character '{}'", c)
            }
            MoveParseError::IllegalMove(s) => write!(f, "illegal move string \"{}\"", s),
        }
    }
}

impl Error for MoveParseError {}

impl From<SquareParseError> for MoveParseError {
    fn from(e: SquareParseError) -> Self {
        MoveParseError::InvalidSquare(e)
    }
}
