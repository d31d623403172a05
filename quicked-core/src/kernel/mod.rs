//! Band numeric kernels
//!
//! A kernel turns one row of banded DP cells into the next. The aligner only
//! sees the [`BandKernel`] trait, so a dispatcher outside the engine can bind
//! whichever implementation suits the host CPU. Every implementation must
//! produce exactly the same cell values and op codes as [`ScalarKernel`].
//!
//! ## Row contract
//!
//! `prev` and `cur` hold `width + 1` cells; index `width` is always
//! `UNREACHABLE` so that `prev[k + 1]` is defined for the last offset. For
//! every live offset `k` in `first..=last`:
//!
//! ```text
//! diag = prev[k]     + (symbol != text[k - first])   match / substitution
//! up   = prev[k + 1] + 1                             deletion
//! left = cur[k - 1]  + 1                             insertion
//! cur[k] = min(diag, up, left), clamped to UNREACHABLE
//! ```
//!
//! Offsets outside the window are written as `UNREACHABLE` / `OP_NONE`.

mod lanes;
mod scalar;

pub use lanes::{LaneKernel, LANES};
pub use scalar::ScalarKernel;

use crate::band::UNREACHABLE;
use crate::config::KernelKind;

/// No predecessor (origin, or a cell outside the band)
pub const OP_NONE: u8 = 0;
/// Predecessor is `(i - 1, j - 1)`: match or substitution
pub const OP_DIAG: u8 = 1;
/// Predecessor is `(i - 1, j)`: deletion from the pattern
pub const OP_DEL: u8 = 2;
/// Predecessor is `(i, j - 1)`: insertion from the text
pub const OP_INS: u8 = 3;

/// Inputs of one DP row
#[derive(Debug, Clone, Copy)]
pub struct RowInput<'a> {
    /// Pattern symbol of this row, `pattern[i - 1]`
    pub symbol: u8,
    /// Text symbol facing each live offset, `text[j - 1]` (a sentinel for `j = 0`)
    pub text: &'a [u8],
    pub first: usize,
    pub last: usize,
}

/// Computes one banded DP row from the previous one
pub trait BandKernel: Send + Sync {
    fn name(&self) -> &'static str;

    fn compute_row(&self, input: &RowInput<'_>, prev: &[u32], cur: &mut [u32], ops: Option<&mut [u8]>);
}

/// Kernel for a configured kind
pub fn kernel_for(kind: KernelKind) -> Box<dyn BandKernel> {
    match kind {
        KernelKind::Lanes => Box::new(LaneKernel),
        KernelKind::Scalar => Box::new(ScalarKernel),
    }
}

/// Tie-break: diagonal, then deletion, then insertion
#[inline(always)]
pub(crate) fn select_op(value: u32, diag: u32, up: u32) -> u8 {
    if value >= UNREACHABLE {
        OP_NONE
    } else if value == diag {
        OP_DIAG
    } else if value == up {
        OP_DEL
    } else {
        OP_INS
    }
}

/// Reset the cells outside the live window
#[inline]
pub(crate) fn clear_outside(input: &RowInput<'_>, cur: &mut [u32], ops: Option<&mut [u8]>) {
    cur[..input.first].fill(UNREACHABLE);
    cur[input.last + 1..].fill(UNREACHABLE);
    if let Some(ops) = ops {
        ops[..input.first].fill(OP_NONE);
        ops[input.last + 1..].fill(OP_NONE);
    }
}
