/// Square index from 0-based rank and file.
#[inline(always)]
pub const fn square_index(rank: usize, file: usize) -> usize {
    rank * 8 + file
}

/// Build a per-square attack table for a leaper from its rank/file deltas.
/// Destinations off the board are dropped, so nothing wraps across files.
pub(crate) const fn leaper_table(deltas: &[(i8, i8)]) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;
    while sq < 64 {
        let rank = (sq / 8) as i8;
        let file = (sq % 8) as i8;
        let mut i = 0usize;
        while i < deltas.len() {
            let (dr, df) = deltas[i];
            let r = rank + dr;
            let f = file + df;
            if r >= 0 && r < 8 && f >= 0 && f < 8 {
                table[sq] |= 1u64 << (r as u64 * 8 + f as u64);
            }
            i += 1;
        }
        sq += 1;
    }
    table
}
