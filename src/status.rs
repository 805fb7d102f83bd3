use crate::bitboard::BitboardExt;
use crate::moves::square_control::in_check;
use crate::position::{Color, Piece, Position};

/// Summary verdict for a position, ranked from the automatic draws down
/// to the move-based outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InPlay,
    DrawFivefold,
    DrawSeventyFiveMove,
    DrawThreefold,
    DrawFiftyMove,
    DrawDeadPosition,
    Stalemate,
    Checkmate,
}

// Free helpers that do not live on Position (keeps position independent
// of the generator).
pub fn is_checkmate(position: &Position) -> bool {
    in_check(position, position.side_to_move) && position.legal_moves().is_empty()
}

pub fn is_stalemate(position: &Position) -> bool {
    !in_check(position, position.side_to_move) && position.legal_moves().is_empty()
}

/// Claimable draw: threefold repetition or the fifty-move rule, unless
/// the position is already checkmate. Insufficient material is *not*
/// folded in here; query `is_insufficient_material` separately.
pub fn is_draw(position: &Position) -> bool {
    (position.threefold() || position.fiftymoves()) && !is_checkmate(position)
}

/// The game cannot continue: no legal moves (mate or stalemate) or a draw.
pub fn is_terminal(position: &Position) -> bool {
    position.legal_moves().is_empty() || is_draw(position)
}

pub fn is_fivefold(position: &Position) -> bool {
    position.repetition_count() >= 5
}

pub fn is_seventyfive_move(position: &Position) -> bool {
    position.halfmove_clock >= 150
}

pub fn is_insufficient_material(position: &Position) -> bool {
    // Quick reject: any pawn/rook/queen on the board => mating material exists.
    let pawns = position.pieces[Piece::Pawn as usize];
    let rooks = position.pieces[Piece::Rook as usize];
    let queens = position.pieces[Piece::Queen as usize];
    if (pawns | rooks | queens) != 0 {
        return false;
    }

    // Count minor pieces
    let wb = position.bb(Color::White, Piece::Bishop).count();
    let wn = position.bb(Color::White, Piece::Knight).count();
    let bb = position.bb(Color::Black, Piece::Bishop).count();
    let bn = position.bb(Color::Black, Piece::Knight).count();

    let white_minors = wb + wn;
    let black_minors = bb + bn;
    let total_minors = white_minors + black_minors;

    // K vs K, or a single minor on the board
    if total_minors <= 1 {
        return true;
    }

    if total_minors == 2 {
        // Two knights on one side (KNN vs K) cannot force mate
        if wn == 2 || bn == 2 {
            return true;
        }
        // One minor each side cannot force mate
        if white_minors == 1 && black_minors == 1 {
            return true;
        }
        // KBB vs K and KBN vs K can mate
        return false;
    }

    // 3+ minors: conservatively call it live.
    false
}

/// Determine the game status for the current position.
///
/// Priority (highest → lowest):
///  1) `Checkmate` / `Stalemate` (a finished game outranks any claim)
///  2) `DrawFivefold`            (automatic)
///  3) `DrawSeventyFiveMove`     (automatic; halfmove_clock ≥ 150)
///  4) `DrawDeadPosition`        (insufficient material)
///  5) `DrawThreefold`           (claimable)
///  6) `DrawFiftyMove`           (claimable; halfmove_clock ≥ 100)
///  7) `InPlay`
pub fn position_status(position: &Position) -> GameStatus {
    let hmc = position.halfmove_clock;

    if position.legal_moves().is_empty() {
        return if in_check(position, position.side_to_move) {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        };
    }

    if is_fivefold(position) {
        return GameStatus::DrawFivefold;
    }
    if hmc >= 150 {
        return GameStatus::DrawSeventyFiveMove;
    }

    if is_insufficient_material(position) {
        return GameStatus::DrawDeadPosition;
    }

    if position.threefold() {
        return GameStatus::DrawThreefold;
    }
    if hmc >= 100 {
        return GameStatus::DrawFiftyMove;
    }

    GameStatus::InPlay
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_fen(fen: &str) -> Position {
        fen.parse().expect("valid test FEN")
    }

    #[test]
    fn startpos_is_in_play() {
        let p = Position::new();
        assert!(!is_checkmate(&p));
        assert!(!is_stalemate(&p));
        assert!(!is_draw(&p));
        assert!(!is_terminal(&p));
        assert_eq!(position_status(&p), GameStatus::InPlay);
    }

    #[test]
    fn back_rank_mate_is_checkmate() {
        let p = from_fen("6k1/5ppp/8/8/8/8/8/4R1K1 b - - 0 1");
        // not mate yet; after Re8 it is
        assert!(!is_checkmate(&p));

        let p = from_fen("4R1k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        assert!(is_checkmate(&p));
        assert!(!is_stalemate(&p));
        assert!(is_terminal(&p));
        assert_eq!(position_status(&p), GameStatus::Checkmate);
    }

    #[test]
    fn cornered_king_with_no_moves_is_stalemate() {
        let p = from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(is_stalemate(&p));
        assert!(!is_checkmate(&p));
        assert!(is_terminal(&p));
        assert_eq!(position_status(&p), GameStatus::Stalemate);
    }

    #[test]
    fn fifty_move_rule_reads_the_clock() {
        let p = from_fen("4k3/8/8/8/8/8/8/4K2R w - - 99 80");
        assert!(!p.fiftymoves());
        assert!(!is_draw(&p));

        let p = from_fen("4k3/8/8/8/8/8/8/4K2R w - - 100 80");
        assert!(p.fiftymoves());
        assert!(is_draw(&p));
        assert_eq!(position_status(&p), GameStatus::DrawFiftyMove);
    }

    #[test]
    fn bare_kings_are_dead_but_not_a_claimable_draw() {
        let p = from_fen("8/8/8/4k3/8/4K3/8/8 w - - 0 1");
        assert!(is_insufficient_material(&p));
        // is_draw stays repetition/fifty-move only
        assert!(!is_draw(&p));
        assert_eq!(position_status(&p), GameStatus::DrawDeadPosition);
    }

    #[test]
    fn king_and_pawn_is_not_insufficient() {
        let p = from_fen("8/8/8/4k3/4P3/4K3/8/8 w - - 0 1");
        assert!(!is_insufficient_material(&p));
        assert!(!is_draw(&p));
        assert_eq!(position_status(&p), GameStatus::InPlay);
    }

    #[test]
    fn minor_piece_endings_classify_correctly() {
        // single minor each way
        assert!(is_insufficient_material(&from_fen(
            "8/8/8/4k3/8/4KB2/8/8 w - - 0 1"
        )));
        assert!(is_insufficient_material(&from_fen(
            "8/8/8/4k3/8/4KN2/8/8 b - - 0 1"
        )));
        // two knights, same side
        assert!(is_insufficient_material(&from_fen(
            "8/8/8/4k3/8/2N1K3/8/1N6 w - - 0 1"
        )));
        // minor each side
        assert!(is_insufficient_material(&from_fen(
            "8/8/3b4/4k3/8/2N1K3/8/8 w - - 0 1"
        )));
        // bishop pair mates
        assert!(!is_insufficient_material(&from_fen(
            "8/8/8/4k3/8/3BKB2/8/8 w - - 0 1"
        )));
        // rook is always enough
        assert!(!is_insufficient_material(&from_fen(
            "8/8/8/4k3/8/4KR2/8/8 w - - 0 1"
        )));
    }
}
