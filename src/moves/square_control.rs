use crate::bitboard::{FILE_A, FILE_H};
use crate::moves::king::KING_ATTACKS;
use crate::moves::knight::KNIGHT_ATTACKS;
use crate::moves::pawn::pawn_attacks;
use crate::moves::sliders::{bishop_attacks, queen_attacks, rook_attacks};
use crate::position::{Color, Piece, Position};
use crate::square::Square;

/// All squares *piece* of *color* attacks from *square* given `blockers`.
pub fn attacks_from(piece: Piece, color: Color, square: u8, blockers: u64) -> u64 {
    let sq = square as usize;

    match piece {
        Piece::Knight => KNIGHT_ATTACKS[sq],
        Piece::King => KING_ATTACKS[sq],
        Piece::Pawn => pawn_attacks(color, sq),
        Piece::Bishop => bishop_attacks(sq, blockers),
        Piece::Rook => rook_attacks(sq, blockers),
        Piece::Queen => queen_attacks(sq, blockers),
    }
}

/// Bitboard of `attacker`-side pieces attacking `square` under `occ`.
///
/// `occ` is the blocker set for slider rays; passing the occupancy with a
/// king removed answers "would this square still be attacked through the
/// king" for king-move legality.
pub fn attackers_to(position: &Position, square: Square, attacker: Color, occ: u64) -> u64 {
    let index = square.index() as usize;
    let mut attackers = 0u64;

    attackers |= pawn_attacks(attacker.opposite(), index) & position.bb(attacker, Piece::Pawn);
    attackers |= KNIGHT_ATTACKS[index] & position.bb(attacker, Piece::Knight);
    attackers |= KING_ATTACKS[index] & position.bb(attacker, Piece::King);

    let rook_rays = rook_attacks(index, occ);
    let bishop_rays = bishop_attacks(index, occ);
    let queens = position.bb(attacker, Piece::Queen);
    attackers |= rook_rays & (position.bb(attacker, Piece::Rook) | queens);
    attackers |= bishop_rays & (position.bb(attacker, Piece::Bishop) | queens);

    attackers
}

/// True if `attacker` controls `square` under the blocker set `occ`.
pub fn is_square_attacked(position: &Position, square: Square, attacker: Color, occ: u64) -> bool {
    let index = square.index();
    let target = 1u64 << index;

    let pawn_sources = match attacker {
        Color::White => ((target & !FILE_H) >> 7) | ((target & !FILE_A) >> 9),
        Color::Black => ((target & !FILE_A) << 7) | ((target & !FILE_H) << 9),
    };
    if pawn_sources & position.bb(attacker, Piece::Pawn) != 0 {
        return true;
    }
    if KNIGHT_ATTACKS[index as usize] & position.bb(attacker, Piece::Knight) != 0 {
        return true;
    }
    if KING_ATTACKS[index as usize] & position.bb(attacker, Piece::King) != 0 {
        return true;
    }

    let queens = position.bb(attacker, Piece::Queen);

    let rook_rays = rook_attacks(index as usize, occ);
    if rook_rays & (position.bb(attacker, Piece::Rook) | queens) != 0 {
        return true;
    }

    let bishop_rays = bishop_attacks(index as usize, occ);
    if bishop_rays & (position.bb(attacker, Piece::Bishop) | queens) != 0 {
        return true;
    }

    false
}

/// True if the king of `side` is attacked.
#[inline(always)]
pub fn in_check(position: &Position, side: Color) -> bool {
    let king_sq = position.king_square(side);
    is_square_attacked(position, king_sq, side.opposite(), position.occupied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::BitboardExt;

    fn from_fen(fen: &str) -> Position {
        fen.parse().expect("valid test FEN")
    }

    #[test]
    fn attacks_from_matches_piece_tables() {
        let d4 = Square::D4.index();
        assert_eq!(
            attacks_from(Piece::Knight, Color::White, d4, 0),
            KNIGHT_ATTACKS[d4 as usize]
        );
        assert_eq!(
            attacks_from(Piece::King, Color::Black, d4, 0),
            KING_ATTACKS[d4 as usize]
        );
        assert_eq!(
            attacks_from(Piece::Pawn, Color::White, d4, 0),
            pawn_attacks(Color::White, d4 as usize)
        );
        let blockers = Square::D6.bitboard();
        assert_eq!(
            attacks_from(Piece::Queen, Color::White, d4, blockers),
            rook_attacks(d4 as usize, blockers) | bishop_attacks(d4 as usize, blockers)
        );
    }

    #[test]
    fn startpos_controls_central_squares() {
        let p = Position::new();
        assert!(is_square_attacked(&p, Square::F3, Color::White, p.occupied()));
        assert!(is_square_attacked(&p, Square::F6, Color::Black, p.occupied()));
        assert!(!is_square_attacked(&p, Square::E4, Color::White, p.occupied()));
        assert!(!in_check(&p, Color::White));
        assert!(!in_check(&p, Color::Black));
    }

    #[test]
    fn sliders_are_blocked_by_occupancy() {
        // rook behind a pawn does not attack past it
        let p = from_fen("4k3/8/8/8/4p3/8/8/4R2K b - - 0 1");
        assert!(is_square_attacked(&p, Square::E4, Color::White, p.occupied()));
        assert!(!is_square_attacked(&p, Square::E5, Color::White, p.occupied()));
        // removing the pawn from the blocker set opens the file
        let occ = p.occupied().clear_sq(Square::E4);
        assert!(is_square_attacked(&p, Square::E5, Color::White, occ));
    }

    #[test]
    fn attackers_to_collects_all_attackers() {
        // e5 is hit by the d3 knight, e1 rook, h2 queen diagonal, and d4 pawn
        let p = from_fen("4k3/8/8/8/3P4/3N4/7Q/4R1K1 b - - 0 1");
        let attackers = attackers_to(&p, Square::E5, Color::White, p.occupied());
        assert!(attackers.has_sq(Square::D3));
        assert!(attackers.has_sq(Square::E1));
        assert!(attackers.has_sq(Square::H2));
        assert!(attackers.has_sq(Square::D4));
        assert_eq!(attackers.count(), 4);
    }

    #[test]
    fn in_check_detects_contact_and_discovered_lines() {
        let p = from_fen("4k3/8/8/8/8/8/3n4/4K3 w - - 0 1");
        assert!(!in_check(&p, Color::White));
        let p = from_fen("4k3/8/8/8/8/5n2/8/4K3 w - - 0 1");
        assert!(in_check(&p, Color::White));
        let p = from_fen("4k3/8/8/8/7b/8/8/4K3 w - - 0 1");
        assert!(in_check(&p, Color::White));
    }
}
