//! Alignment path reconstruction
//!
//! Small bands are traced back directly from the op codes kept by the
//! proving pass. When the band is too large to keep in full, the same walk
//! is replayed block by block: a score-only pass stores the middle row of
//! the remaining rows as a checkpoint, the lower half is traced from the
//! final cell up to that row, then the upper half from where the walk
//! crossed it. Blocks small enough are recomputed from their checkpoint with
//! op codes. Row values do not depend on how a pass is split, so every op
//! code on the walk is the one a full history would hold and both modes
//! return the same path.
//!
//! Memory is one band row per recursion level plus one block of op codes;
//! time is `O(rows * width * log(rows))`.

use crate::band::Band;
use crate::banded::{BandHistory, BandedAligner, RowSnapshot};
use crate::cigar::CigarOp;
use crate::error::{QuickedError, QuickedResult};
use crate::kernel::{OP_DEL, OP_DIAG, OP_INS};
use crate::search::SearchOutcome;
use crate::sequence::SequenceView;
use std::iter::repeat;

/// Bookkeeping of one reconstruction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TracebackStats {
    /// Blocks traced back from op codes
    pub blocks: usize,
    /// Score-only checkpoint rows computed
    pub checkpoints: usize,
    /// Largest op-code block held at once, in bytes
    pub peak_history_bytes: usize,
}

pub struct PathReconstructor<'a, 'k> {
    aligner: &'a BandedAligner<'k>,
    cell_limit: usize,
}

impl<'a, 'k> PathReconstructor<'a, 'k> {
    /// `cell_limit` is the largest block of op codes held at once
    pub fn new(aligner: &'a BandedAligner<'k>, cell_limit: usize) -> Self {
        Self {
            aligner,
            cell_limit: cell_limit.max(1),
        }
    }

    /// Optimal path of a proven search
    pub fn reconstruct(
        &self,
        seqs: &SequenceView,
        outcome: &SearchOutcome,
    ) -> QuickedResult<(Vec<CigarOp>, TracebackStats)> {
        self.rebuild(
            seqs.pattern(),
            seqs.text(),
            outcome.band,
            outcome.history.as_ref(),
            outcome.score,
        )
    }

    /// Operations from `(0, 0)` to `(len(pattern), len(text))` of cost `score`.
    ///
    /// Uses `history` when the proving pass kept one, otherwise replays the
    /// walk from checkpoints within `band`.
    pub fn rebuild(
        &self,
        pattern: &[u8],
        text: &[u8],
        band: Band,
        history: Option<&BandHistory>,
        score: u32,
    ) -> QuickedResult<(Vec<CigarOp>, TracebackStats)> {
        let (n, m) = (pattern.len(), text.len());
        let mut stats = TracebackStats::default();
        let ops = match history {
            Some(history) => {
                stats.blocks = 1;
                stats.peak_history_bytes = history.bytes();
                trace_history(pattern, text, history)?
            }
            None => {
                let mut ops = Vec::with_capacity(n + m);
                let origin = self.aligner.origin_row(band, m)?;
                let col = self.trace_block(pattern, text, band, &origin, n, m, &mut ops, &mut stats)?;
                // Row 0 is reached by insertions only.
                ops.extend(repeat(CigarOp::Insertion).take(col));
                ops.reverse();
                ops
            }
        };
        verify_path(&ops, n, m, score)?;

        log::debug!(
            "reconstructed {} operations from {} block(s) and {} checkpoint(s), peak history {} bytes",
            ops.len(),
            stats.blocks,
            stats.checkpoints,
            stats.peak_history_bytes
        );
        Ok((ops, stats))
    }

    /// Walk from `(to_row, col)` up to the row of `from`, pushing operations
    /// in reverse order. Returns the column where the walk reaches that row.
    #[allow(clippy::too_many_arguments)]
    fn trace_block(
        &self,
        pattern: &[u8],
        text: &[u8],
        band: Band,
        from: &RowSnapshot,
        to_row: usize,
        col: usize,
        out: &mut Vec<CigarOp>,
        stats: &mut TracebackStats,
    ) -> QuickedResult<usize> {
        let rows = to_row - from.row();
        if rows == 0 {
            return Ok(col);
        }

        if rows == 1 || rows.saturating_mul(band.width()) <= self.cell_limit {
            let (_, history) = self.aligner.resume(pattern, text, band, from, to_row, true)?;
            let history = history.ok_or_else(|| QuickedError::invariant("block pass kept no op codes"))?;
            stats.blocks += 1;
            stats.peak_history_bytes = stats.peak_history_bytes.max(history.bytes());
            return walk(pattern, text, &history, from.row(), (to_row, col), out);
        }

        let mid = from.row() + rows / 2;
        let crossing = {
            let (checkpoint, _) = self.aligner.resume(pattern, text, band, from, mid, false)?;
            stats.checkpoints += 1;
            self.trace_block(pattern, text, band, &checkpoint, to_row, col, out, stats)?
        };
        self.trace_block(pattern, text, band, from, mid, crossing, out, stats)
    }
}

/// Follow op codes back from the final cell.
///
/// Ties were resolved by the kernel (diagonal, then deletion, then
/// insertion), so the walk is deterministic.
pub fn trace_history(pattern: &[u8], text: &[u8], history: &BandHistory) -> QuickedResult<Vec<CigarOp>> {
    let mut ops = Vec::with_capacity(pattern.len() + text.len());
    let col = walk(pattern, text, history, 0, (pattern.len(), text.len()), &mut ops)?;
    ops.extend(repeat(CigarOp::Insertion).take(col));
    ops.reverse();
    Ok(ops)
}

/// Follow op codes from `start` until the walk reaches `stop_row`; operations
/// are pushed last first. Returns the column reached on `stop_row`.
fn walk(
    pattern: &[u8],
    text: &[u8],
    history: &BandHistory,
    stop_row: usize,
    start: (usize, usize),
    out: &mut Vec<CigarOp>,
) -> QuickedResult<usize> {
    let (mut i, mut j) = start;
    while i > stop_row {
        match history.op(i, j) {
            OP_DIAG if j > 0 => {
                out.push(if pattern[i - 1] == text[j - 1] {
                    CigarOp::Match
                } else {
                    CigarOp::Mismatch
                });
                i -= 1;
                j -= 1;
            }
            OP_DEL => {
                out.push(CigarOp::Deletion);
                i -= 1;
            }
            OP_INS if j > 0 => {
                out.push(CigarOp::Insertion);
                j -= 1;
            }
            op => {
                return Err(QuickedError::invariant(format!(
                    "traceback hit op {} at cell ({}, {})",
                    op, i, j
                )))
            }
        }
    }
    Ok(j)
}

/// Consumed lengths and cost of a path must match the problem exactly
fn verify_path(ops: &[CigarOp], pattern_len: usize, text_len: usize, score: u32) -> QuickedResult<()> {
    let consumed_pattern = ops.iter().filter(|op| op.consumes_pattern()).count();
    let consumed_text = ops.iter().filter(|op| op.consumes_text()).count();
    if consumed_pattern != pattern_len || consumed_text != text_len {
        return Err(QuickedError::invariant(format!(
            "path consumes {}x{} symbols, expected {}x{}",
            consumed_pattern, consumed_text, pattern_len, text_len
        )));
    }
    let cost: u32 = ops.iter().map(|op| op.cost()).sum();
    if cost != score {
        return Err(QuickedError::invariant(format!(
            "path costs {} but the proven score is {}",
            cost, score
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banded::PassVerdict;
    use crate::cigar::Cigar;
    use crate::config::CigarGranularity;
    use crate::kernel::{LaneKernel, ScalarKernel};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn render(ops: &[CigarOp]) -> String {
        Cigar::from_ops(ops, CigarGranularity::Extended).to_string()
    }

    fn proven(aligner: &BandedAligner<'_>, pattern: &[u8], text: &[u8], band: Band) -> u32 {
        match aligner.run(pattern, text, band, false).unwrap().verdict() {
            PassVerdict::Proven(score) => score,
            PassVerdict::Inconclusive => panic!("band not proven"),
        }
    }

    /// Path from a full history and from checkpoints with `cell_limit`
    fn both_ways(aligner: &BandedAligner<'_>, pattern: &[u8], text: &[u8], band: Band, cell_limit: usize) -> (String, String) {
        let pass = aligner.run(pattern, text, band, true).unwrap();
        let score = pass.score.unwrap();
        let reconstructor = PathReconstructor::new(aligner, cell_limit);
        let (direct, _) = reconstructor.rebuild(pattern, text, band, pass.history.as_ref(), score).unwrap();
        let (replayed, _) = reconstructor.rebuild(pattern, text, band, None, score).unwrap();
        (render(&direct), render(&replayed))
    }

    #[test]
    fn test_history_traceback_places_deletion_first() {
        let aligner = BandedAligner::new(&ScalarKernel);
        let pattern = b"AAAAAAAAAA";
        let text = b"AAAAAAAAA";
        let band = Band::full(10, 9);
        let pass = aligner.run(pattern, text, band, true).unwrap();
        let ops = trace_history(pattern, text, pass.history.as_ref().unwrap()).unwrap();
        assert_eq!(render(&ops), "1D9M");
    }

    #[test]
    fn test_history_traceback_substitution() {
        let aligner = BandedAligner::new(&ScalarKernel);
        let pass = aligner.run(b"ACGT", b"ACTT", Band::from_bound(1, 4, 4), true).unwrap();
        let ops = trace_history(b"ACGT", b"ACTT", pass.history.as_ref().unwrap()).unwrap();
        assert_eq!(render(&ops), "2M1X1M");
    }

    #[test]
    fn test_checkpoints_keep_substitutions_preferred() {
        let aligner = BandedAligner::new(&ScalarKernel);
        assert_eq!(both_ways(&aligner, b"AC", b"CA", Band::full(2, 2), 1), ("2X".into(), "2X".into()));
        let (direct, replayed) = both_ways(&aligner, b"ACA", b"CAC", Band::full(3, 3), 1);
        assert_eq!(direct, "1I2M1D");
        assert_eq!(replayed, direct);
    }

    #[test]
    fn test_checkpoints_replay_the_full_history_walk() {
        let aligner = BandedAligner::new(&LaneKernel);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..60 {
            let n = rng.gen_range(0..80);
            let pattern: Vec<u8> = (0..n).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect();
            let mut text = Vec::with_capacity(n + 8);
            for &symbol in &pattern {
                match rng.gen_range(0..20) {
                    0 => {}
                    1 => text.push(b"ACGT"[rng.gen_range(0..4)]),
                    2 => text.extend([b"ACGT"[rng.gen_range(0..4)], symbol]),
                    _ => text.push(symbol),
                }
            }
            let band = Band::full(pattern.len(), text.len());
            for cell_limit in [1, 7, 64, 1 << 20] {
                let (direct, replayed) = both_ways(&aligner, &pattern, &text, band, cell_limit);
                assert_eq!(direct, replayed, "limit {}", cell_limit);
            }
        }
    }

    #[test]
    fn test_checkpoint_memory_stays_within_limit() {
        let aligner = BandedAligner::new(&ScalarKernel);
        let pattern = b"ACGTTGCAAGGCTTACGATCGATCGGATCCATGCA";
        let text = b"ACGTTGCAGGCTTTACGATCGTCGGATCCTATGCA";
        let band = Band::from_bound(6, pattern.len(), text.len());
        let score = proven(&aligner, pattern, text, band);

        let reconstructor = PathReconstructor::new(&aligner, 3 * band.width());
        let (ops, stats) = reconstructor.rebuild(pattern, text, band, None, score).unwrap();
        assert!(stats.blocks > 1);
        assert!(stats.checkpoints > 0);
        assert!(stats.peak_history_bytes <= 3 * band.width());

        let cigar = Cigar::from_ops(&ops, CigarGranularity::Extended);
        assert_eq!(cigar.check(pattern, text).unwrap(), score);
        assert_eq!(cigar.apply(pattern, text), text.to_vec());
    }

    #[test]
    fn test_wrong_score_is_an_invariant_error() {
        let aligner = BandedAligner::new(&ScalarKernel);
        let reconstructor = PathReconstructor::new(&aligner, 1 << 20);
        let err = reconstructor
            .rebuild(b"ACGT", b"ACTT", Band::full(4, 4), None, 0)
            .unwrap_err();
        assert!(matches!(err, QuickedError::InternalInvariant(_)));
    }

    #[test]
    fn test_empty_operands() {
        let aligner = BandedAligner::new(&ScalarKernel);
        let reconstructor = PathReconstructor::new(&aligner, 1);
        let (ops, _) = reconstructor.rebuild(b"", b"ACG", Band::full(0, 3), None, 3).unwrap();
        assert_eq!(render(&ops), "3I");
        let (ops, _) = reconstructor.rebuild(b"ACG", b"", Band::full(3, 0), None, 3).unwrap();
        assert_eq!(render(&ops), "3D");
    }
}
