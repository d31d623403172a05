//! Wide-lane kernel
//!
//! Processes `LANES` adjacent band cells per step with fixed-size lane
//! arrays, which the compiler lowers to vector instructions. The diagonal and
//! vertical terms are independent per lane. The in-row insertion chain
//! `cur[k] = min(cur[k], cur[k - 1] + 1)` is resolved inside a chunk with a
//! log-step prefix minimum and then seeded with the carry from the previous
//! chunk. Integer arithmetic is exact, so results equal the scalar kernel.

use super::{clear_outside, select_op, BandKernel, RowInput};
use crate::band::UNREACHABLE;

/// Cells per step
pub const LANES: usize = 8;

#[derive(Debug, Clone, Copy, Default)]
pub struct LaneKernel;

impl BandKernel for LaneKernel {
    fn name(&self) -> &'static str {
        "lanes-8"
    }

    fn compute_row(&self, input: &RowInput<'_>, prev: &[u32], cur: &mut [u32], mut ops: Option<&mut [u8]>) {
        clear_outside(input, cur, ops.as_deref_mut());

        let mut carry = UNREACHABLE;
        let mut start = input.first;
        while start <= input.last {
            let len = LANES.min(input.last + 1 - start);
            let text = &input.text[start - input.first..start - input.first + len];

            // Tail lanes stay unreachable so they never feed live lanes.
            let mut diag = [UNREACHABLE; LANES];
            let mut up = [UNREACHABLE; LANES];
            for l in 0..len {
                diag[l] = prev[start + l] + u32::from(input.symbol != text[l]);
                up[l] = prev[start + l + 1] + 1;
            }

            let mut v = [0u32; LANES];
            for l in 0..LANES {
                v[l] = diag[l].min(up[l]);
            }

            let mut shift = 1;
            while shift < LANES {
                for l in (shift..LANES).rev() {
                    v[l] = v[l].min(v[l - shift] + shift as u32);
                }
                shift <<= 1;
            }

            for (l, cell) in v.iter_mut().enumerate() {
                *cell = (*cell).min(carry + 1 + l as u32).min(UNREACHABLE);
            }

            cur[start..start + len].copy_from_slice(&v[..len]);
            if let Some(ops) = ops.as_deref_mut() {
                for l in 0..len {
                    ops[start + l] = select_op(v[l], diag[l], up[l]);
                }
            }

            carry = v[len - 1];
            start += len;
        }
    }
}
