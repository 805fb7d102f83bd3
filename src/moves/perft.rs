use tracing::{debug, instrument};

use crate::moves::movegen::generate_legal;
use crate::moves::square_control::in_check;
use crate::moves::types::Move;
use crate::position::Position;

const MAX_LOG_DEPTH: u32 = 3; // only trace details for shallow nodes
const MAX_PERFT_DEPTH: usize = 20;

/// Tagged node breakdown for debugging the generator: captures and
/// friends are counted on the edges into leaf nodes, checks and mates on
/// the leaves themselves.
pub struct PerftCounters {
    pub nodes: u64,
    pub captures: u64,
    pub ep_captures: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl PerftCounters {
    pub fn zero() -> Self {
        Self {
            nodes: 0,
            captures: 0,
            ep_captures: 0,
            castles: 0,
            promotions: 0,
            checks: 0,
            checkmates: 0,
        }
    }

    pub fn add(&mut self, o: &PerftCounters) {
        self.nodes += o.nodes;
        self.captures += o.captures;
        self.ep_captures += o.ep_captures;
        self.castles += o.castles;
        self.promotions += o.promotions;
        self.checks += o.checks;
        self.checkmates += o.checkmates;
    }
}

// One spare slot so the leaf scratch buffer exists at the deepest ply.
fn create_move_buffer_array() -> [Vec<Move>; MAX_PERFT_DEPTH + 1] {
    std::array::from_fn(|_| Vec::with_capacity(64))
}

// Recursive perft with per-ply reusable buffers. Depth 1 is answered by
// the generated move count without descending.
fn perft_recursive(
    position: &mut Position,
    depth: u32,
    ply: usize,
    buffers: &mut [Vec<Move>],
) -> u64 {
    if depth == 0 {
        return 1;
    }

    {
        let moves = &mut buffers[ply];
        generate_legal(position, moves);
    }

    let move_count = buffers[ply].len();
    if depth == 1 {
        return move_count as u64;
    }

    let mut nodes = 0;
    for i in 0..move_count {
        let mv = buffers[ply][i];
        position.make(mv);
        nodes += perft_recursive(position, depth - 1, ply + 1, buffers);
        position.unmake();
    }

    nodes
}

/// Count leaf nodes of the legal-move tree at `depth`.
#[instrument(skip(position), fields(depth))]
pub fn perft(position: &mut Position, depth: u32) -> u64 {
    if depth as usize > MAX_PERFT_DEPTH {
        panic!("Depth {} exceeds MAX_PERFT_DEPTH {}", depth, MAX_PERFT_DEPTH);
    }

    let mut buffers = create_move_buffer_array();
    perft_recursive(position, depth, 0, &mut buffers)
}

/// Perft split by root move, printing each root move's subtree count.
#[instrument(skip(position), fields(depth))]
pub fn perft_divide(position: &mut Position, depth: u32) -> u64 {
    if depth as usize > MAX_PERFT_DEPTH {
        panic!("Depth {} exceeds MAX_PERFT_DEPTH {}", depth, MAX_PERFT_DEPTH);
    }

    let mut buffers = create_move_buffer_array();

    {
        let moves = &mut buffers[0];
        generate_legal(position, moves);
        if depth <= MAX_LOG_DEPTH {
            debug!(depth, moves = moves.len(), "divide: root legal moves");
        }
    }

    let mut total = 0;
    let move_count = buffers[0].len();

    for i in 0..move_count {
        let mv = buffers[0][i];

        position.make(mv);
        let count = if depth <= 1 {
            1
        } else {
            perft_recursive(position, depth - 1, 1, &mut buffers)
        };
        position.unmake();

        if depth <= MAX_LOG_DEPTH {
            debug!(%mv, nodes = count, "divide: root child total");
        }

        println!("{}: {}", mv, count);
        total += count;
    }

    debug!(depth, total, "divide: total");
    println!("Total: {}", total);
    total
}

fn perft_count_recursive(
    position: &mut Position,
    depth: u32,
    ply: usize,
    out: &mut PerftCounters,
    buffers: &mut [Vec<Move>],
) {
    if depth == 0 {
        out.nodes += 1;
        return;
    }

    {
        let moves = &mut buffers[ply];
        generate_legal(position, moves);
    }

    let move_count = buffers[ply].len();
    for i in 0..move_count {
        let mv = buffers[ply][i];

        if depth == 1 {
            out.nodes += 1;
            if mv.is_capture() {
                out.captures += 1;
                if mv.is_en_passant() {
                    out.ep_captures += 1;
                }
            }
            if mv.is_castling() {
                out.castles += 1;
            }
            if mv.promotion.is_some() {
                out.promotions += 1;
            }

            position.make(mv);
            if in_check(position, position.side_to_move) {
                out.checks += 1;
                let scratch = &mut buffers[ply + 1];
                generate_legal(position, scratch);
                if scratch.is_empty() {
                    out.checkmates += 1;
                }
            }
            position.unmake();
            continue;
        }

        #[cfg(debug_assertions)]
        let hash_before = position.zobrist;

        position.make(mv);
        perft_count_recursive(position, depth - 1, ply + 1, out, buffers);
        position.unmake();

        #[cfg(debug_assertions)]
        {
            debug_assert_eq!(
                position.zobrist, hash_before,
                "zobrist changed across make/unmake"
            );
            debug_assert_eq!(
                position.compute_zobrist_full(),
                position.zobrist,
                "full recompute mismatch"
            );
        }
    }
}

/// Perft with the tagged breakdown of `PerftCounters`.
pub fn perft_count_with_breakdown(position: &mut Position, depth: u32, out: &mut PerftCounters) {
    if depth as usize > MAX_PERFT_DEPTH {
        panic!("Depth {} exceeds MAX_PERFT_DEPTH {}", depth, MAX_PERFT_DEPTH);
    }

    let mut buffers = create_move_buffer_array();
    perft_count_recursive(position, depth, 0, out, &mut buffers);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perft_depth_zero_is_one_leaf() {
        let mut p = Position::new();
        assert_eq!(perft(&mut p, 0), 1);
    }

    #[test]
    fn perft_depth_one_counts_legal_moves() {
        let mut p = Position::new();
        assert_eq!(perft(&mut p, 1), p.legal_moves().len() as u64);
    }

    #[test]
    fn perft_leaves_the_position_untouched() {
        let mut p = Position::new();
        let before = p.clone();
        perft(&mut p, 3);
        assert_eq!(p, before);
    }

    #[test]
    fn breakdown_matches_plain_perft() {
        let mut p = Position::new();
        let expected = perft(&mut p, 3);
        let mut counters = PerftCounters::zero();
        perft_count_with_breakdown(&mut p, 3, &mut counters);
        assert_eq!(counters.nodes, expected);
        assert_eq!(counters.captures, 34);
        assert_eq!(counters.checks, 12);
        assert_eq!(counters.checkmates, 0);
    }
}
