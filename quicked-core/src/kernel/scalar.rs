//! Reference kernel, one cell at a time

use super::{clear_outside, select_op, BandKernel, RowInput};
use crate::band::UNREACHABLE;

#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarKernel;

impl BandKernel for ScalarKernel {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn compute_row(&self, input: &RowInput<'_>, prev: &[u32], cur: &mut [u32], mut ops: Option<&mut [u8]>) {
        clear_outside(input, cur, ops.as_deref_mut());

        let mut left = UNREACHABLE;
        for k in input.first..=input.last {
            let diag = prev[k] + u32::from(input.symbol != input.text[k - input.first]);
            let up = prev[k + 1] + 1;
            let value = diag.min(up).min(left + 1).min(UNREACHABLE);
            cur[k] = value;
            if let Some(ops) = ops.as_deref_mut() {
                ops[k] = select_op(value, diag, up);
            }
            left = value;
        }
    }
}
