// FEN parsing and emission over the six standard fields.

use super::{CASTLE_ALL, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece, Position};
use crate::bitboard::{BitboardExt, RANK_1, RANK_8};
use crate::errors::FenParseError;
use crate::moves::square_control::is_square_attacked;
use crate::square::Square;

/// O(1) FEN glyph → (piece, color) map.
const CHAR_TO_PC: [Option<(Piece, Color)>; 128] = {
    let mut table: [Option<(Piece, Color)>; 128] = [None; 128];

    // Uppercase = White
    table['P' as usize] = Some((Piece::Pawn, Color::White));
    table['N' as usize] = Some((Piece::Knight, Color::White));
    table['B' as usize] = Some((Piece::Bishop, Color::White));
    table['R' as usize] = Some((Piece::Rook, Color::White));
    table['Q' as usize] = Some((Piece::Queen, Color::White));
    table['K' as usize] = Some((Piece::King, Color::White));

    // Lowercase = Black
    table['p' as usize] = Some((Piece::Pawn, Color::Black));
    table['n' as usize] = Some((Piece::Knight, Color::Black));
    table['b' as usize] = Some((Piece::Bishop, Color::Black));
    table['r' as usize] = Some((Piece::Rook, Color::Black));
    table['q' as usize] = Some((Piece::Queen, Color::Black));
    table['k' as usize] = Some((Piece::King, Color::Black));

    table
};

const PC_TO_CHAR: [[char; 6]; 2] = [
    ['P', 'N', 'B', 'R', 'Q', 'K'],
    ['p', 'n', 'b', 'r', 'q', 'k'],
];

#[inline]
pub(super) fn piece_char(color: Color, piece: Piece) -> char {
    PC_TO_CHAR[color as usize][piece as usize]
}

pub(super) fn castling_string(rights: u8) -> String {
    if rights == 0 {
        return "-".to_string();
    }
    let mut s = String::with_capacity(4);
    for (flag, glyph) in [
        (CASTLE_WK, 'K'),
        (CASTLE_WQ, 'Q'),
        (CASTLE_BK, 'k'),
        (CASTLE_BQ, 'q'),
    ] {
        if rights & flag != 0 {
            s.push(glyph);
        }
    }
    s
}

impl Position {
    /// Parse a FEN string into this position.
    ///
    /// All state is replaced, the history is cleared, and the hash is
    /// recomputed from scratch. On any error the position is left in the
    /// `clear()`ed state.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), FenParseError> {
        self.clear();
        if let Err(e) = self.parse_fen_fields(fen) {
            self.clear();
            return Err(e);
        }
        self.history.clear();
        self.refresh_zobrist();
        Ok(())
    }

    fn parse_fen_fields(&mut self, fen: &str) -> Result<(), FenParseError> {
        let mut fields = fen.split_whitespace();

        let board = fields
            .next()
            .ok_or(FenParseError::MissingField("board"))?;
        self.parse_board_field(board)?;

        match fields
            .next()
            .ok_or(FenParseError::MissingField("side to move"))?
        {
            "w" => self.side_to_move = Color::White,
            "b" => self.side_to_move = Color::Black,
            other => return Err(FenParseError::InvalidSideToMove(other.to_string())),
        }

        let castling = fields
            .next()
            .ok_or(FenParseError::MissingField("castling rights"))?;
        self.parse_castling_field(castling)?;

        let ep = fields
            .next()
            .ok_or(FenParseError::MissingField("en passant"))?;
        self.parse_en_passant_field(ep)?;

        let halfmove = fields
            .next()
            .ok_or(FenParseError::MissingField("halfmove clock"))?;
        self.halfmove_clock = halfmove
            .parse::<u32>()
            .map_err(|_| FenParseError::InvalidClock("halfmove clock", halfmove.to_string()))?;

        let fullmove = fields
            .next()
            .ok_or(FenParseError::MissingField("fullmove number"))?;
        self.fullmove_number = fullmove
            .parse::<u32>()
            .map_err(|_| FenParseError::InvalidClock("fullmove number", fullmove.to_string()))?;

        if fields.next().is_some() {
            return Err(FenParseError::TrailingInput);
        }

        let idle = self.side_to_move.opposite();
        if is_square_attacked(self, self.king_square(idle), self.side_to_move, self.occupied()) {
            return Err(FenParseError::OpponentInCheck);
        }

        Ok(())
    }

    fn parse_board_field(&mut self, board: &str) -> Result<(), FenParseError> {
        let ranks: Vec<&str> = board.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenParseError::BadRankCount(ranks.len()));
        }

        // FEN lists rank 8 first
        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for ch in rank_text.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    if skip == 0 || skip > 8 {
                        return Err(FenParseError::InvalidPieceChar(ch));
                    }
                    file += skip as u8;
                } else {
                    let (piece, color) = CHAR_TO_PC
                        .get(ch as usize)
                        .copied()
                        .flatten()
                        .ok_or(FenParseError::InvalidPieceChar(ch))?;
                    if file > 7 {
                        return Err(FenParseError::BadRankWidth {
                            rank: rank as usize + 1,
                            width: file as usize + 1,
                        });
                    }
                    self.place_piece(color, piece, Square::from_file_rank(file, rank));
                    file += 1;
                }
                if file > 8 {
                    return Err(FenParseError::BadRankWidth {
                        rank: rank as usize + 1,
                        width: file as usize,
                    });
                }
            }
            if file != 8 {
                return Err(FenParseError::BadRankWidth {
                    rank: rank as usize + 1,
                    width: file as usize,
                });
            }
        }

        let white_kings = self.bb(Color::White, Piece::King).count();
        let black_kings = self.bb(Color::Black, Piece::King).count();
        if white_kings != 1 || black_kings != 1 {
            return Err(FenParseError::KingCount {
                white: white_kings,
                black: black_kings,
            });
        }

        if self.pieces[Piece::Pawn as usize] & (RANK_1 | RANK_8) != 0 {
            return Err(FenParseError::PawnOnBackRank);
        }

        Ok(())
    }

    fn parse_castling_field(&mut self, castling: &str) -> Result<(), FenParseError> {
        if castling == "-" {
            self.castling_rights = 0;
            return Ok(());
        }
        if castling.is_empty() || castling.len() > 4 {
            return Err(FenParseError::InvalidCastling(castling.to_string()));
        }

        let mut rights = 0u8;
        for ch in castling.chars() {
            let flag = match ch {
                'K' => CASTLE_WK,
                'Q' => CASTLE_WQ,
                'k' => CASTLE_BK,
                'q' => CASTLE_BQ,
                _ => return Err(FenParseError::InvalidCastling(castling.to_string())),
            };
            if rights & flag != 0 {
                return Err(FenParseError::InvalidCastling(castling.to_string()));
            }

            let (color, king_sq, rook_sq) = match flag {
                CASTLE_WK => (Color::White, Square::E1, Square::H1),
                CASTLE_WQ => (Color::White, Square::E1, Square::A1),
                CASTLE_BK => (Color::Black, Square::E8, Square::H8),
                _ => (Color::Black, Square::E8, Square::A8),
            };
            if !self.bb(color, Piece::King).has_sq(king_sq)
                || !self.bb(color, Piece::Rook).has_sq(rook_sq)
            {
                return Err(FenParseError::CastlingRightsMismatch(ch));
            }

            rights |= flag;
        }
        debug_assert!(rights & !CASTLE_ALL == 0);
        self.castling_rights = rights;
        Ok(())
    }

    fn parse_en_passant_field(&mut self, ep: &str) -> Result<(), FenParseError> {
        if ep == "-" {
            self.en_passant = None;
            return Ok(());
        }

        let sq: Square = ep
            .parse()
            .map_err(|_| FenParseError::InvalidEnPassant(ep.to_string()))?;

        // The target must sit behind a pawn that just double-pushed.
        let (rank, pawn_sq) = match self.side_to_move {
            Color::White => (5, sq.backward(Color::White)),
            Color::Black => (2, sq.backward(Color::Black)),
        };
        if sq.rank() != rank {
            return Err(FenParseError::EnPassantMismatch(sq));
        }
        let enemy_pawns = self.bb(self.side_to_move.opposite(), Piece::Pawn);
        if !enemy_pawns.has_sq(pawn_sq) || self.occupied().has_sq(sq) {
            return Err(FenParseError::EnPassantMismatch(sq));
        }

        self.en_passant = Some(sq);
        Ok(())
    }

    /// Emit the position as a FEN string. Inverts `set_fen` on valid positions.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        for rank in (0..8).rev() {
            let mut empty_run = 0u8;
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_at(sq) {
                    Some((color, piece)) => {
                        if empty_run > 0 {
                            fen.push((b'0' + empty_run) as char);
                            empty_run = 0;
                        }
                        fen.push(piece_char(color, piece));
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                fen.push((b'0' + empty_run) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        fen.push_str(&castling_string(self.castling_rights));

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_string()),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    const KIWI_FEN: &str =
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    #[test]
    fn startpos_round_trip() {
        let mut p = Position::new_empty();
        p.set_fen(START_FEN).expect("valid startpos");
        assert_eq!(p, Position::new());
        assert_eq!(p.to_fen(), START_FEN);
    }

    #[test]
    fn kiwipete_round_trip() {
        let mut p = Position::new_empty();
        p.set_fen(KIWI_FEN).expect("valid kiwipete");
        assert_eq!(p.to_fen(), KIWI_FEN);
        p.validate().expect("kiwipete invariants");
    }

    #[test]
    fn en_passant_field_round_trip() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let mut p = Position::new_empty();
        p.set_fen(fen).expect("valid FEN with ep");
        assert_eq!(p.en_passant, Some(Square::E3));
        assert_eq!(p.to_fen(), fen);
    }

    #[test]
    fn parse_failure_leaves_cleared_state() {
        let mut p = Position::new();
        let err = p.set_fen("rnbqkbnr/pppppppp/8/8 w KQkq - 0 1");
        assert!(err.is_err());
        assert_eq!(p.occupied(), 0);
        assert_eq!(p.castling_rights, 0);
        assert_eq!(p.zobrist, p.compute_zobrist_full());
    }

    #[test]
    fn rejects_malformed_fields() {
        let mut p = Position::new_empty();
        assert!(p.set_fen("").is_err());
        assert!(
            p.set_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1")
                .is_err()
        );
        assert!(
            p.set_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQxq - 0 1")
                .is_err()
        );
        assert!(
            p.set_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e9 0 1")
                .is_err()
        );
        assert!(
            p.set_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1")
                .is_err()
        );
        assert!(
            p.set_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 extra")
                .is_err()
        );
    }

    #[test]
    fn rejects_bad_board_shapes() {
        let mut p = Position::new_empty();
        // nine squares on one rank
        assert!(
            p.set_fen("rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
                .is_err()
        );
        // two white kings
        assert!(
            p.set_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNK w KQkq - 0 1")
                .is_err()
        );
        // pawn on the eighth rank
        assert!(p.set_fen("P3k3/8/8/8/8/8/8/4K3 w - - 0 1").is_err());
    }

    #[test]
    fn rejects_castling_rights_without_pieces_in_place() {
        let mut p = Position::new_empty();
        // white king on e2: no white rights possible
        assert!(
            p.set_fen("r3k2r/8/8/8/8/8/4K3/R6R w KQkq - 0 1")
                .is_err()
        );
        // rook missing from h1
        assert!(
            p.set_fen("r3k2r/8/8/8/8/8/8/R3K3 w K - 0 1")
                .is_err()
        );
        // same position without the stale right parses fine
        assert!(
            p.set_fen("r3k2r/8/8/8/8/8/8/R3K3 w Qkq - 0 1")
                .is_ok()
        );
    }

    #[test]
    fn rejects_inconsistent_en_passant() {
        let mut p = Position::new_empty();
        // ep square on the wrong rank
        assert!(
            p.set_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e4 0 1")
                .is_err()
        );
        // no pawn behind the target
        assert!(
            p.set_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq e3 0 1")
                .is_err()
        );
    }

    #[test]
    fn rejects_opponent_in_check() {
        let mut p = Position::new_empty();
        // white queen gives check but black is not to move
        assert!(p.set_fen("4k3/4Q3/8/8/8/8/8/4K3 w - - 0 1").is_err());
    }

    #[test]
    fn castling_string_order_is_fixed() {
        assert_eq!(castling_string(CASTLE_ALL), "KQkq");
        assert_eq!(castling_string(CASTLE_WQ | CASTLE_BK), "Qk");
        assert_eq!(castling_string(0), "-");
    }
}
