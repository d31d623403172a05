//! One banded DP pass
//!
//! Runs the edit-distance recurrence over every row of a band with the bound
//! kernel, tracks how cheaply a path could escape the band, and optionally
//! keeps the op code of every band cell for traceback.

use crate::band::{Band, BandWindow, UNREACHABLE};
use crate::error::{try_alloc, QuickedError, QuickedResult};
use crate::kernel::{BandKernel, RowInput, OP_INS, OP_NONE};
use crate::sequence::SENTINEL;

/// Op codes of a band over rows `first_row..=last_row`, row-major
#[derive(Debug, Clone)]
pub struct BandHistory {
    band: Band,
    width: usize,
    first_row: usize,
    last_row: usize,
    ops: Vec<u8>,
}

impl BandHistory {
    pub fn band(&self) -> Band {
        self.band
    }

    pub fn first_row(&self) -> usize {
        self.first_row
    }

    pub fn last_row(&self) -> usize {
        self.last_row
    }

    /// Op code of cell `(row, col)`; `OP_NONE` outside the kept rows or the band
    pub fn op(&self, row: usize, col: usize) -> u8 {
        if row < self.first_row || row > self.last_row {
            return OP_NONE;
        }
        match self.band.offset(row, col) {
            Some(k) => self.ops[(row - self.first_row) * self.width + k],
            None => OP_NONE,
        }
    }

    pub fn bytes(&self) -> usize {
        self.ops.len()
    }
}

/// Outcome of a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassVerdict {
    /// The band score is the true edit distance
    Proven(u32),
    /// A path outside the band may be as cheap or cheaper
    Inconclusive,
}

#[derive(Debug, Clone)]
pub struct BandPass {
    pub band: Band,
    /// Score of the final cell, if it was reached inside the band
    pub score: Option<u32>,
    /// Lower bound on the cost of any path that leaves the band
    pub exit_bound: u32,
    pub history: Option<BandHistory>,
}

impl BandPass {
    pub fn verdict(&self) -> PassVerdict {
        match self.score {
            Some(score) if score < self.exit_bound => PassVerdict::Proven(score),
            _ => PassVerdict::Inconclusive,
        }
    }
}

/// Cell values of the last row of a sweep
#[derive(Debug, Clone)]
pub struct RowSnapshot {
    pub window: BandWindow,
    pub cells: Vec<u32>,
}

impl RowSnapshot {
    pub fn row(&self) -> usize {
        self.window.row
    }

    /// Value at column `col`, `UNREACHABLE` outside the window
    pub fn at_col(&self, col: usize) -> u32 {
        if col < self.window.first_col || col > self.window.col(self.window.last) {
            return UNREACHABLE;
        }
        self.cells[self.window.first + (col - self.window.first_col)]
    }
}

pub struct BandedAligner<'k> {
    kernel: &'k dyn BandKernel,
}

impl<'k> BandedAligner<'k> {
    pub fn new(kernel: &'k dyn BandKernel) -> Self {
        Self { kernel }
    }

    pub fn kernel_name(&self) -> &'static str {
        self.kernel.name()
    }

    /// Full pass of `pattern` against `text` over `band`.
    ///
    /// The band must contain diagonal 0 and the target diagonal.
    pub fn run(&self, pattern: &[u8], text: &[u8], band: Band, retain: bool) -> QuickedResult<BandPass> {
        let (n, m) = (pattern.len(), text.len());
        let target = m as isize - n as isize;
        if !band.contains(0) || !band.contains(target) {
            return Err(QuickedError::invariant(format!(
                "band [{}, {}] misses diagonal 0 or target diagonal {}",
                band.lo, band.hi, target
            )));
        }

        let width = band.width();
        let mut history_ops = if retain {
            Some(try_alloc(band.area(n), OP_NONE)?)
        } else {
            None
        };

        // A path leaving through the upper edge needs one insertion to step
        // out and hi + 1 - target deletions to come back; symmetrically for
        // the lower edge.
        let upper_return = (band.hi - target) as u32 + 2;
        let lower_return = (target - band.lo) as u32 + 2;
        let mut exit_bound = UNREACHABLE;

        let last = self.sweep(pattern, text, band, history_ops.as_deref_mut(), |window, cells| {
            if window.last == width - 1 && window.col(window.last) < m {
                let value = cells[window.last];
                if value < UNREACHABLE {
                    exit_bound = exit_bound.min(value + upper_return);
                }
            }
            if window.first == 0 && window.row < n {
                let value = cells[0];
                if value < UNREACHABLE {
                    exit_bound = exit_bound.min(value + lower_return);
                }
            }
        })?;

        let score = last.at_col(m);
        let pass = BandPass {
            band,
            score: (score < UNREACHABLE).then_some(score),
            exit_bound: exit_bound.min(UNREACHABLE),
            history: history_ops.map(|ops| BandHistory {
                band,
                width,
                first_row: 0,
                last_row: n,
                ops,
            }),
        };

        log::trace!(
            "band pass [{}, {}] ({} kernel, {}x{}): score={:?} exit_bound={}",
            band.lo,
            band.hi,
            self.kernel.name(),
            n,
            m,
            pass.score,
            pass.exit_bound
        );
        Ok(pass)
    }

    /// Row 0 of `band` against a text of `cols` symbols
    pub fn origin_row(&self, band: Band, cols: usize) -> QuickedResult<RowSnapshot> {
        self.origin(band, cols, None)
    }

    /// Continue from the stored row `from` down to row `to_row`.
    ///
    /// Row values only depend on the row above, so the result equals the
    /// rows of an uninterrupted pass. With `retain`, the op codes of rows
    /// `from.row() + 1..=to_row` are kept.
    pub fn resume(
        &self,
        pattern: &[u8],
        text: &[u8],
        band: Band,
        from: &RowSnapshot,
        to_row: usize,
        retain: bool,
    ) -> QuickedResult<(RowSnapshot, Option<BandHistory>)> {
        let first_row = from.row() + 1;
        if to_row < from.row() || to_row > pattern.len() {
            return Err(QuickedError::invariant(format!(
                "cannot resume from row {} to row {} of a {}-row pass",
                from.row(),
                to_row,
                pattern.len()
            )));
        }
        let width = band.width();
        let mut ops = if retain {
            Some(try_alloc((to_row - from.row()) * width, OP_NONE)?)
        } else {
            None
        };
        let last = self.advance(pattern, text, band, from.clone(), to_row, ops.as_deref_mut(), |_, _| {})?;
        let history = ops.map(|ops| BandHistory {
            band,
            width,
            first_row,
            last_row: to_row,
            ops,
        });
        Ok((last, history))
    }

    fn sweep<F>(
        &self,
        pattern: &[u8],
        text: &[u8],
        band: Band,
        ops: Option<&mut [u8]>,
        mut visit: F,
    ) -> QuickedResult<RowSnapshot>
    where
        F: FnMut(&BandWindow, &[u32]),
    {
        let width = band.width();
        let (head, tail) = match ops {
            Some(ops) => {
                let (head, tail) = ops.split_at_mut(width);
                (Some(head), Some(tail))
            }
            None => (None, None),
        };
        let origin = self.origin(band, text.len(), head)?;
        visit(&origin.window, &origin.cells);
        self.advance(pattern, text, band, origin, pattern.len(), tail, visit)
    }

    fn origin(&self, band: Band, cols: usize, ops: Option<&mut [u8]>) -> QuickedResult<RowSnapshot> {
        let window = band.window(0, cols).ok_or_else(|| outside(band, 0))?;
        let mut cells = try_alloc(band.width() + 1, UNREACHABLE)?;
        for k in window.first..=window.last {
            cells[k] = window.col(k) as u32;
        }
        if let Some(ops) = ops {
            for k in window.first..=window.last {
                ops[k] = if window.col(k) == 0 { OP_NONE } else { OP_INS };
            }
        }
        Ok(RowSnapshot { window, cells })
    }

    /// Rows `from.row() + 1..=to_row`; `ops` holds one band row per computed row
    fn advance<F>(
        &self,
        pattern: &[u8],
        text: &[u8],
        band: Band,
        from: RowSnapshot,
        to_row: usize,
        mut ops: Option<&mut [u8]>,
        mut visit: F,
    ) -> QuickedResult<RowSnapshot>
    where
        F: FnMut(&BandWindow, &[u32]),
    {
        let start = from.row();
        if to_row == start {
            return Ok(from);
        }
        let m = text.len();
        let width = band.width();

        // Text symbols of the columns these rows touch, `padded[j - lo_col]`
        // holding text[j - 1] and a sentinel for column 0.
        let lo_col = band.window(start + 1, m).ok_or_else(|| outside(band, start + 1))?.first_col;
        let top = band.window(to_row, m).ok_or_else(|| outside(band, to_row))?;
        let hi_col = top.col(top.last);
        let mut padded = try_alloc(hi_col - lo_col + 1, SENTINEL)?;
        for (j, slot) in (lo_col..=hi_col).zip(padded.iter_mut()) {
            if j > 0 {
                *slot = text[j - 1];
            }
        }

        let mut prev = try_alloc(width + 1, UNREACHABLE)?;
        let mut cur = from.cells;
        let mut window = from.window;
        for row in start + 1..=to_row {
            std::mem::swap(&mut prev, &mut cur);
            window = band.window(row, m).ok_or_else(|| outside(band, row))?;
            let offset = window.first_col - lo_col;
            let input = RowInput {
                symbol: pattern[row - 1],
                text: &padded[offset..offset + window.cells()],
                first: window.first,
                last: window.last,
            };
            let slot = row - start - 1;
            let row_ops = ops
                .as_deref_mut()
                .map(|ops| &mut ops[slot * width..(slot + 1) * width]);
            self.kernel.compute_row(&input, &prev, &mut cur, row_ops);
            visit(&window, &cur);
        }

        Ok(RowSnapshot { window, cells: cur })
    }
}

fn outside(band: Band, row: usize) -> QuickedError {
    QuickedError::invariant(format!("row {} has no cell inside band [{}, {}]", row, band.lo, band.hi))
}
