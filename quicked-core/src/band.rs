//! Band geometry
//!
//! A band is an inclusive range of diagonals `d = j - i` of the DP matrix.
//! Row `i` of a band of width `w` is stored at offsets `k = 0..w`, where
//! offset `k` holds column `j = i + lo + k`. Moving down one row therefore
//! shifts the window one column to the right, and the three neighbours of
//! cell `k` are `prev[k]` (diagonal), `prev[k + 1]` (up) and `cur[k - 1]`
//! (left).

use std::cmp::{max, min};

/// Value of a cell outside the band or outside the matrix.
///
/// Small enough that adding a few unit costs never overflows.
pub const UNREACHABLE: u32 = u32::MAX / 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub lo: isize,
    pub hi: isize,
}

/// Live offsets of one row of a band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandWindow {
    pub row: usize,
    /// First live offset
    pub first: usize,
    /// Last live offset (inclusive)
    pub last: usize,
    /// Column of the first live offset
    pub first_col: usize,
}

impl BandWindow {
    /// Number of live cells (never zero)
    pub fn cells(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn col(&self, offset: usize) -> usize {
        self.first_col + (offset - self.first)
    }
}

impl Band {
    /// Diagonal range clipped to a `rows x cols` problem
    /// (`rows` = pattern length, `cols` = text length).
    pub fn new(lo: isize, hi: isize, rows: usize, cols: usize) -> Self {
        Self {
            lo: max(lo, -(rows as isize)),
            hi: min(hi, cols as isize),
        }
    }

    /// Band implied by an edit bound: diagonals within `bound` of the main one
    pub fn from_bound(bound: usize, rows: usize, cols: usize) -> Self {
        let bound = min(bound, rows.max(cols)) as isize;
        Self::new(-bound, bound, rows, cols)
    }

    /// Every diagonal of the matrix
    pub fn full(rows: usize, cols: usize) -> Self {
        Self::new(-(rows as isize), cols as isize, rows, cols)
    }

    pub fn width(&self) -> usize {
        (self.hi - self.lo + 1) as usize
    }

    pub fn contains(&self, diagonal: isize) -> bool {
        self.lo <= diagonal && diagonal <= self.hi
    }

    pub fn is_full(&self, rows: usize, cols: usize) -> bool {
        self.lo <= -(rows as isize) && self.hi >= cols as isize
    }

    /// Number of stored cells for `rows + 1` DP rows
    pub fn area(&self, rows: usize) -> usize {
        (rows + 1).saturating_mul(self.width())
    }

    /// Offset of column `col` on row `row`, if it falls inside the band
    pub fn offset(&self, row: usize, col: usize) -> Option<usize> {
        let d = col as isize - row as isize;
        self.contains(d).then(|| (d - self.lo) as usize)
    }

    /// Live window of row `row` against a text of `cols` symbols
    pub fn window(&self, row: usize, cols: usize) -> Option<BandWindow> {
        let i = row as isize;
        let first = max(0, -(i + self.lo));
        let last = min(self.hi - self.lo, cols as isize - i - self.lo);
        if first > last {
            return None;
        }
        Some(BandWindow {
            row,
            first: first as usize,
            last: last as usize,
            first_col: (i + self.lo + first) as usize,
        })
    }

}
