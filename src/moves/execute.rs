use crate::errors::MoveParseError;
use crate::hash::zobrist::{ep_file_key, xor_castling_rights_delta, zobrist_keys};
use crate::moves::types::{Move, NullUndo, Undo};
use crate::position::castling::rook_origin_right;
use crate::position::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece, Position};
use crate::square::Square;

/// Castling rook origin/destination by king destination index.
#[inline(always)]
fn rook_castle_squares(king_to_idx: u8) -> Option<(Square, Square)> {
    match king_to_idx {
        6 => Some((Square::H1, Square::F1)),  // White O-O
        2 => Some((Square::A1, Square::D1)),  // White O-O-O
        62 => Some((Square::H8, Square::F8)), // Black O-O
        58 => Some((Square::A8, Square::D8)), // Black O-O-O
        _ => None,
    }
}

impl Position {
    /// Apply `mv`, pushing an undo record onto the history.
    ///
    /// The move is trusted to come from `legal_moves()` (or equivalent);
    /// feeding a fabricated move is a caller bug. Use `make_uci` for the
    /// validating text entry point.
    pub fn make(&mut self, mv: Move) {
        let keys = zobrist_keys();
        let us = self.side_to_move;
        let them = us.opposite();

        self.history.push(Undo {
            zobrist: self.zobrist,
            mv,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            castling_rights: self.castling_rights,
        });

        // Drop the old en-passant file from the hash before anything else.
        if let Some(ep) = self.en_passant.take() {
            self.zobrist ^= ep_file_key(keys, ep);
        }

        // Captures leave first so the destination is free.
        if mv.is_en_passant() {
            debug_assert_eq!(mv.capture, Some(Piece::Pawn));
            self.remove_piece(them, Piece::Pawn, mv.to.backward(us));
        } else if let Some(captured) = mv.capture {
            self.remove_piece(them, captured, mv.to);
        }

        self.remove_piece(us, mv.piece, mv.from);
        match mv.promotion {
            Some(promo) => {
                debug_assert_eq!(mv.piece, Piece::Pawn, "only pawns promote");
                self.place_piece(us, promo, mv.to);
            }
            None => self.place_piece(us, mv.piece, mv.to),
        }

        if mv.is_castling() {
            match rook_castle_squares(mv.to.index()) {
                Some((rook_from, rook_to)) => {
                    self.remove_piece(us, Piece::Rook, rook_from);
                    self.place_piece(us, Piece::Rook, rook_to);
                }
                None => debug_assert!(false, "castle flag with king destination {}", mv.to),
            }
        }

        if mv.is_double_pawn_push() {
            let ep_sq = mv.from.forward(us);
            self.en_passant = Some(ep_sq);
            self.zobrist ^= ep_file_key(keys, ep_sq);
        }

        // Rights are lost when the king moves, a rook leaves its corner,
        // or a rook is captured on its corner.
        let old_rights = self.castling_rights;
        let mut lost = 0u8;
        if mv.piece == Piece::King {
            lost |= match us {
                Color::White => CASTLE_WK | CASTLE_WQ,
                Color::Black => CASTLE_BK | CASTLE_BQ,
            };
        }
        if mv.piece == Piece::Rook {
            lost |= rook_origin_right(us, mv.from.index());
        }
        if mv.capture == Some(Piece::Rook) && !mv.is_en_passant() {
            lost |= rook_origin_right(them, mv.to.index());
        }
        let new_rights = old_rights & !lost;
        if new_rights != old_rights {
            self.castling_rights = new_rights;
            xor_castling_rights_delta(&mut self.zobrist, keys, old_rights, new_rights);
        }

        if mv.capture.is_some() || mv.piece == Piece::Pawn {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        self.side_to_move = them;
        self.zobrist ^= keys.side_to_move;

        #[cfg(debug_assertions)]
        self.assert_hash();
    }

    /// Reverse the most recent `make`, restoring the position bit-exactly.
    pub fn unmake(&mut self) {
        let undo = self.history.pop().expect("unmake without matching make");
        let mv = undo.mv;
        let mover = self.side_to_move.opposite();

        match mv.promotion {
            Some(promo) => {
                self.remove_piece(mover, promo, mv.to);
                self.place_piece(mover, Piece::Pawn, mv.from);
            }
            None => {
                self.remove_piece(mover, mv.piece, mv.to);
                self.place_piece(mover, mv.piece, mv.from);
            }
        }

        if mv.is_en_passant() {
            self.place_piece(mover.opposite(), Piece::Pawn, mv.to.backward(mover));
        } else if let Some(captured) = mv.capture {
            self.place_piece(mover.opposite(), captured, mv.to);
        }

        if mv.is_castling() {
            if let Some((rook_from, rook_to)) = rook_castle_squares(mv.to.index()) {
                self.remove_piece(mover, Piece::Rook, rook_to);
                self.place_piece(mover, Piece::Rook, rook_from);
            }
        }

        self.side_to_move = mover;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.castling_rights = undo.castling_rights;
        if mover == Color::Black {
            self.fullmove_number -= 1;
        }
        self.zobrist = undo.zobrist;

        #[cfg(debug_assertions)]
        self.assert_hash();
    }

    /// Pass the turn without moving: flips the side, clears en passant,
    /// and zeroes the halfmove clock. Returns the state to hand back to
    /// `unmake_null`; the history stack is untouched.
    pub fn make_null(&mut self) -> NullUndo {
        let keys = zobrist_keys();
        let undo = NullUndo {
            zobrist: self.zobrist,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
        };

        if let Some(ep) = self.en_passant.take() {
            self.zobrist ^= ep_file_key(keys, ep);
        }
        self.halfmove_clock = 0;
        self.side_to_move = self.side_to_move.opposite();
        self.zobrist ^= keys.side_to_move;

        #[cfg(debug_assertions)]
        self.assert_hash();

        undo
    }

    /// Reverse a `make_null`.
    pub fn unmake_null(&mut self, undo: NullUndo) {
        self.side_to_move = self.side_to_move.opposite();
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.zobrist = undo.zobrist;

        #[cfg(debug_assertions)]
        self.assert_hash();
    }

    /// Resolve long-algebraic text ("e2e4", "e7e8q") against the legal
    /// moves of this position. The position itself is never touched.
    pub fn parse_move(&self, text: &str) -> Result<Move, MoveParseError> {
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(MoveParseError::InvalidLength(text.chars().count()));
        }

        let _from: Square = text[0..2].parse()?;
        let _to: Square = text[2..4].parse()?;
        if text.len() == 5 {
            let promo = text.as_bytes()[4] as char;
            if !matches!(promo, 'n' | 'b' | 'r' | 'q') {
                return Err(MoveParseError::InvalidPromotion(promo));
            }
        }

        self.legal_moves()
            .into_iter()
            .find(|mv| mv.to_uci() == text)
            .ok_or_else(|| MoveParseError::IllegalMove(text.to_string()))
    }

    /// Validating entry point: parse the text against `legal_moves()` and
    /// make the move it names.
    pub fn make_uci(&mut self, text: &str) -> Result<Move, MoveParseError> {
        let mv = self.parse_move(text)?;
        self.make(mv);
        Ok(mv)
    }

    /// Re-verify a candidate move against the current position. This is a
    /// correctness net, not a speed path.
    pub fn is_legal(&self, mv: Move) -> bool {
        self.legal_moves().contains(&mv)
    }
}
