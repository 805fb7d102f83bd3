use crate::bitboard::{BitboardExt, RANK_1, RANK_2, RANK_7, RANK_8};
use crate::moves::king::KING_ATTACKS;
use crate::moves::knight::KNIGHT_ATTACKS;
use crate::moves::pawn::pawn_attacks;
use crate::moves::sliders::{bishop_attacks, bishop_rays, ray_between, rook_attacks, rook_rays};
use crate::moves::square_control::{attackers_to, is_square_attacked};
use crate::moves::types::{
    CAPTURE, DOUBLE_PAWN_PUSH, EN_PASSANT, KINGSIDE_CASTLE, Move, MoveBuffer, PROMOTION,
    PROMOTION_CAPTURE, QUEENSIDE_CASTLE, QUIET_MOVE,
};
use crate::position::{Color, Piece, Position};
use crate::square::Square;

// Castling constants: squares between king and rook that must be empty,
// and the king's transit/destination squares that must be safe.
const WHITE_KINGSIDE_BETWEEN: u64 = 0x0000_0000_0000_0060; // f1 g1
const WHITE_QUEENSIDE_BETWEEN: u64 = 0x0000_0000_0000_000E; // b1 c1 d1
const BLACK_KINGSIDE_BETWEEN: u64 = 0x6000_0000_0000_0000; // f8 g8
const BLACK_QUEENSIDE_BETWEEN: u64 = 0x0E00_0000_0000_0000; // b8 c8 d8

// Promotion array
const PROMOS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

impl Position {
    /// Opponent pieces currently attacking the side-to-move's king.
    pub fn checkers(&self) -> u64 {
        let us = self.side_to_move;
        attackers_to(self, self.king_square(us), us.opposite(), self.occupied())
    }

    /// Friendly pieces pinned to the side-to-move's king.
    pub fn pinned(&self) -> u64 {
        let (diagonal, linear) = self.pin_rays();
        (diagonal | linear) & self.occupancy(self.side_to_move)
    }

    /// Pin rays against the side-to-move's king, split by slider axis.
    ///
    /// Each returned mask is the union of king-to-pinner rays (pinner
    /// included) on which exactly one friendly piece stands. A piece on
    /// its ray may only move within that ray.
    pub(crate) fn pin_rays(&self) -> (u64, u64) {
        let us = self.side_to_move;
        let them = us.opposite();
        let king_sq = self.king_square(us);
        let k = king_sq.index() as usize;
        let occ = self.occupied();
        let ours = self.occupancy(us);

        // Friendly pieces on the first ring of king rays, then xray past
        // them to find the sliders that would pin them.
        let diag_blockers = bishop_attacks(k, occ) & ours;
        let line_blockers = rook_attacks(k, occ) & ours;

        let queens = self.bb(them, Piece::Queen);
        let diag_pinners =
            bishop_attacks(k, occ & !diag_blockers) & (self.bb(them, Piece::Bishop) | queens);
        let line_pinners =
            rook_attacks(k, occ & !line_blockers) & (self.bb(them, Piece::Rook) | queens);

        let mut diagonal = 0u64;
        for pinner in diag_pinners.squares() {
            let ray = ray_between(king_sq, pinner);
            if (ray & ours).count() == 1 {
                diagonal |= ray;
            }
        }
        let mut linear = 0u64;
        for pinner in line_pinners.squares() {
            let ray = ray_between(king_sq, pinner);
            if (ray & ours).count() == 1 {
                linear |= ray;
            }
        }
        (diagonal, linear)
    }

    /// All legal moves from this position, freshly allocated.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        generate_legal(self, &mut moves);
        moves
    }

    /// Legal captures (including en passant and capture-promotions).
    pub fn legal_captures(&self) -> Vec<Move> {
        let mut moves = self.legal_moves();
        moves.retain(|mv| mv.is_capture());
        moves
    }

    /// Legal non-captures; disjoint complement of `legal_captures`.
    pub fn legal_noncaptures(&self) -> Vec<Move> {
        let mut moves = self.legal_moves();
        moves.retain(|mv| !mv.is_capture());
        moves
    }
}

/// Generate exactly the legal moves of `position` into `moves`.
///
/// King moves and castling always come first; with more than one checker
/// nothing else is possible, with a single checker all other moves are
/// restricted to capturing it or blocking its ray, and pinned pieces stay
/// on their pin rays throughout.
pub fn generate_legal(position: &Position, moves: &mut impl MoveBuffer) {
    moves.clear();

    let checkers = position.checkers();
    gen_king_moves(position, checkers, moves);

    if checkers.count() > 1 {
        return;
    }

    let check_mask = if checkers != 0 {
        let king_sq = position.king_square(position.side_to_move);
        let checker = Square::from_index(checkers.lsb());
        ray_between(king_sq, checker) | checkers
    } else {
        u64::MAX
    };

    let (diagonal_pins, linear_pins) = position.pin_rays();
    let all_pins = diagonal_pins | linear_pins;

    gen_pawn_moves(position, check_mask, diagonal_pins, linear_pins, moves);
    gen_knight_moves(position, check_mask, all_pins, moves);
    gen_slider_moves::<true>(position, check_mask, diagonal_pins, linear_pins, moves);
    gen_slider_moves::<false>(position, check_mask, diagonal_pins, linear_pins, moves);
}

/// Emit `targets` as quiet/capture moves of `piece` from `from`.
#[inline(always)]
fn push_piece_moves(
    position: &Position,
    from: Square,
    piece: Piece,
    targets: u64,
    moves: &mut impl MoveBuffer,
) {
    let enemy = position.opponent_occupancy(position.side_to_move);
    for to in targets.squares() {
        if enemy.has_sq(to) {
            moves.push(Move {
                from,
                to,
                piece,
                capture: position.piece_type_at(to),
                promotion: None,
                flags: CAPTURE,
            });
        } else {
            moves.push(Move {
                from,
                to,
                piece,
                capture: None,
                promotion: None,
                flags: QUIET_MOVE,
            });
        }
    }
}

fn gen_king_moves(position: &Position, checkers: u64, moves: &mut impl MoveBuffer) {
    let us = position.side_to_move;
    let them = us.opposite();
    let king_sq = position.king_square(us);

    // Slider rays must see through our king, or it could step backwards
    // along a ray and still be in check.
    let blockers = position.occupied().clear_sq(king_sq);
    let targets = KING_ATTACKS[king_sq.index() as usize]
        & !position.occupancy(us)
        & !position.bb(them, Piece::King);

    for to in targets.squares() {
        if !is_square_attacked(position, to, them, blockers) {
            push_piece_moves(position, king_sq, Piece::King, to.bitboard(), moves);
        }
    }

    if checkers != 0 {
        return;
    }

    let occ = position.occupied();
    let (kingside_between, queenside_between) = match us {
        Color::White => (WHITE_KINGSIDE_BETWEEN, WHITE_QUEENSIDE_BETWEEN),
        Color::Black => (BLACK_KINGSIDE_BETWEEN, BLACK_QUEENSIDE_BETWEEN),
    };

    // King-side castle: f/g must be empty and unattacked.
    if position.has_kingside_castle(us) && occ & kingside_between == 0 {
        let transit = Square::from_index(king_sq.index() + 1);
        let dest = Square::from_index(king_sq.index() + 2);
        if !is_square_attacked(position, transit, them, occ)
            && !is_square_attacked(position, dest, them, occ)
        {
            moves.push(Move {
                from: king_sq,
                to: dest,
                piece: Piece::King,
                capture: None,
                promotion: None,
                flags: KINGSIDE_CASTLE,
            });
        }
    }

    // Queen-side castle: b/c/d must be empty, c/d unattacked. The rook's
    // transit over b is allowed to be attacked.
    if position.has_queenside_castle(us) && occ & queenside_between == 0 {
        let transit = Square::from_index(king_sq.index() - 1);
        let dest = Square::from_index(king_sq.index() - 2);
        if !is_square_attacked(position, transit, them, occ)
            && !is_square_attacked(position, dest, them, occ)
        {
            moves.push(Move {
                from: king_sq,
                to: dest,
                piece: Piece::King,
                capture: None,
                promotion: None,
                flags: QUEENSIDE_CASTLE,
            });
        }
    }
}

fn gen_knight_moves(
    position: &Position,
    check_mask: u64,
    pin_mask: u64,
    moves: &mut impl MoveBuffer,
) {
    let us = position.side_to_move;
    // Pinned knights can never move.
    let knights = position.bb(us, Piece::Knight) & !pin_mask;
    let friendly = position.occupancy(us);

    for from in knights.squares() {
        let targets = KNIGHT_ATTACKS[from.index() as usize] & !friendly & check_mask;
        push_piece_moves(position, from, Piece::Knight, targets, moves);
    }
}

/// Slider moves along one axis: `DIAGONAL` covers bishops and the
/// queen's diagonals, otherwise rooks and the queen's files/ranks.
/// Pieces pinned on the other axis cannot move here at all; pieces
/// pinned on this axis stay within their pin ray.
fn gen_slider_moves<const DIAGONAL: bool>(
    position: &Position,
    check_mask: u64,
    diagonal_pins: u64,
    linear_pins: u64,
    moves: &mut impl MoveBuffer,
) {
    let us = position.side_to_move;
    let friendly = position.occupancy(us);
    let occ = position.occupied();
    let queens = position.bb(us, Piece::Queen);

    let (movers, slide_pins, cross_pins) = if DIAGONAL {
        (
            (position.bb(us, Piece::Bishop) | queens) & !linear_pins,
            diagonal_pins,
            linear_pins,
        )
    } else {
        (
            (position.bb(us, Piece::Rook) | queens) & !diagonal_pins,
            linear_pins,
            diagonal_pins,
        )
    };
    debug_assert!(movers & cross_pins == 0);

    for from in movers.squares() {
        let idx = from.index() as usize;
        let mut attacks = if DIAGONAL {
            bishop_attacks(idx, occ)
        } else {
            rook_attacks(idx, occ)
        };
        attacks &= !friendly & check_mask;

        if slide_pins.has_sq(from) {
            attacks &= slide_pins;
        }

        let piece = if queens.has_sq(from) {
            Piece::Queen
        } else if DIAGONAL {
            Piece::Bishop
        } else {
            Piece::Rook
        };
        push_piece_moves(position, from, piece, attacks, moves);
    }
}

fn gen_pawn_moves(
    position: &Position,
    check_mask: u64,
    diagonal_pins: u64,
    linear_pins: u64,
    moves: &mut impl MoveBuffer,
) {
    let us = position.side_to_move;
    let them = us.opposite();
    let pawns = position.bb(us, Piece::Pawn);
    let occ = position.occupied();
    let empty = !occ;
    let enemy = position.opponent_occupancy(us) & !position.bb(them, Piece::King);

    let (start_rank, promo_rank) = match us {
        Color::White => (RANK_2, RANK_8),
        Color::Black => (RANK_7, RANK_1),
    };

    // ===== Pushes (diagonally pinned pawns cannot push) =====
    let push_pawns = pawns & !diagonal_pins;
    let single_to = match us {
        Color::White => push_pawns.north() & empty,
        Color::Black => push_pawns.south() & empty,
    };

    for to in (single_to & check_mask).squares() {
        let from = to.backward(us);
        if linear_pins.has_sq(from) && !linear_pins.has_sq(to) {
            continue;
        }
        if promo_rank.has_sq(to) {
            for promo in PROMOS {
                moves.push(Move {
                    from,
                    to,
                    piece: Piece::Pawn,
                    capture: None,
                    promotion: Some(promo),
                    flags: PROMOTION,
                });
            }
        } else {
            moves.push(Move {
                from,
                to,
                piece: Piece::Pawn,
                capture: None,
                promotion: None,
                flags: QUIET_MOVE,
            });
        }
    }

    // ===== Double pushes: both squares empty, origin on the start rank =====
    let double_to = match us {
        Color::White => ((push_pawns & start_rank).north() & empty).north() & empty,
        Color::Black => ((push_pawns & start_rank).south() & empty).south() & empty,
    };

    for to in (double_to & check_mask).squares() {
        let from = to.backward(us).backward(us);
        if linear_pins.has_sq(from) && !linear_pins.has_sq(to) {
            continue;
        }
        moves.push(Move {
            from,
            to,
            piece: Piece::Pawn,
            capture: None,
            promotion: None,
            flags: DOUBLE_PAWN_PUSH,
        });
    }

    // ===== Captures (linearly pinned pawns cannot capture) =====
    let capture_pawns = pawns & !linear_pins;
    for from in capture_pawns.squares() {
        let mut attacks = pawn_attacks(us, from.index() as usize) & enemy & check_mask;
        if diagonal_pins.has_sq(from) {
            attacks &= diagonal_pins;
        }
        for to in attacks.squares() {
            let captured = position.piece_type_at(to);
            if promo_rank.has_sq(to) {
                for promo in PROMOS {
                    moves.push(Move {
                        from,
                        to,
                        piece: Piece::Pawn,
                        capture: captured,
                        promotion: Some(promo),
                        flags: PROMOTION_CAPTURE,
                    });
                }
            } else {
                moves.push(Move {
                    from,
                    to,
                    piece: Piece::Pawn,
                    capture: captured,
                    promotion: None,
                    flags: CAPTURE,
                });
            }
        }
    }

    // ===== En passant =====
    if let Some(ep) = position.en_passant {
        let victim = ep.backward(us);

        // Under check the capture must take the checking pawn or land on
        // the blocking square.
        if check_mask == u64::MAX || check_mask.has_sq(victim) || check_mask.has_sq(ep) {
            let candidates = pawn_attacks(them, ep.index() as usize) & capture_pawns;
            for from in candidates.squares() {
                // Remove both pawns, occupy the target, and verify no
                // slider sees the king. This is the one case where two
                // pieces leave a rank at once.
                let occ_after = occ.clear_sq(from).clear_sq(victim).set_sq(ep);
                let k = position.king_square(us).index() as usize;

                let queens = position.bb(them, Piece::Queen);
                let line_sliders = position.bb(them, Piece::Rook) | queens;
                if rook_rays(k) & line_sliders != 0 && rook_attacks(k, occ_after) & line_sliders != 0
                {
                    continue;
                }
                let diag_sliders = position.bb(them, Piece::Bishop) | queens;
                if bishop_rays(k) & diag_sliders != 0
                    && bishop_attacks(k, occ_after) & diag_sliders != 0
                {
                    continue;
                }

                moves.push(Move {
                    from,
                    to: ep,
                    piece: Piece::Pawn,
                    capture: Some(Piece::Pawn),
                    promotion: None,
                    flags: EN_PASSANT,
                });
            }
        }
    }
}
