//! CIGAR representation
//!
//! Operations are named from the pattern's point of view: `D` consumes a
//! pattern symbol only, `I` consumes a text symbol only, `M` and `X` consume
//! one of each.

use crate::config::CigarGranularity;
use crate::error::{QuickedError, QuickedResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CigarOp {
    Match,
    Mismatch,
    Insertion,
    Deletion,
}

impl CigarOp {
    pub const fn code(self) -> char {
        match self {
            Self::Match => 'M',
            Self::Mismatch => 'X',
            Self::Insertion => 'I',
            Self::Deletion => 'D',
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            b'M' => Some(Self::Match),
            b'X' => Some(Self::Mismatch),
            b'I' => Some(Self::Insertion),
            b'D' => Some(Self::Deletion),
            _ => None,
        }
    }

    #[inline(always)]
    pub const fn consumes_pattern(self) -> bool {
        matches!(self, Self::Match | Self::Mismatch | Self::Deletion)
    }

    #[inline(always)]
    pub const fn consumes_text(self) -> bool {
        matches!(self, Self::Match | Self::Mismatch | Self::Insertion)
    }

    /// Unit edit cost
    #[inline(always)]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Match => 0,
            _ => 1,
        }
    }
}

/// Run-length encoded alignment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cigar {
    runs: Vec<(CigarOp, u32)>,
}

impl Cigar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `count` copies of `op`, merging with the last run
    pub fn push(&mut self, op: CigarOp, count: u32) {
        if count == 0 {
            return;
        }
        match self.runs.last_mut() {
            Some((last, n)) if *last == op => *n += count,
            _ => self.runs.push((op, count)),
        }
    }

    /// Encode a sequence of single operations
    pub fn from_ops(ops: &[CigarOp], granularity: CigarGranularity) -> Self {
        let mut cigar = Self::new();
        for &op in ops {
            let op = match (granularity, op) {
                (CigarGranularity::Collapsed, CigarOp::Mismatch) => CigarOp::Match,
                _ => op,
            };
            cigar.push(op, 1);
        }
        cigar
    }

    pub fn runs(&self) -> &[(CigarOp, u32)] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Pattern symbols consumed (M, X, D)
    pub fn pattern_len(&self) -> usize {
        self.runs
            .iter()
            .filter(|(op, _)| op.consumes_pattern())
            .map(|&(_, n)| n as usize)
            .sum()
    }

    /// Text symbols consumed (M, X, I)
    pub fn text_len(&self) -> usize {
        self.runs
            .iter()
            .filter(|(op, _)| op.consumes_text())
            .map(|&(_, n)| n as usize)
            .sum()
    }

    /// Walk the alignment over both sequences and return its edit cost.
    ///
    /// Fails if consumed lengths differ from the sequence lengths or if an
    /// `X` run covers equal symbols. `M` runs are charged per mismatching
    /// position, which covers collapsed CIGARs.
    pub fn check(&self, pattern: &[u8], text: &[u8]) -> QuickedResult<u32> {
        if self.pattern_len() != pattern.len() || self.text_len() != text.len() {
            return Err(QuickedError::invariant(format!(
                "CIGAR {} consumes {}x{} symbols, sequences are {}x{}",
                self,
                self.pattern_len(),
                self.text_len(),
                pattern.len(),
                text.len()
            )));
        }

        let (mut i, mut j, mut cost) = (0usize, 0usize, 0u32);
        for &(op, count) in &self.runs {
            let count = count as usize;
            match op {
                CigarOp::Match => {
                    cost += pattern[i..i + count]
                        .iter()
                        .zip(&text[j..j + count])
                        .filter(|(a, b)| a != b)
                        .count() as u32;
                }
                CigarOp::Mismatch => {
                    if let Some(k) = (0..count).find(|&k| pattern[i + k] == text[j + k]) {
                        return Err(QuickedError::invariant(format!(
                            "mismatch at pattern {} / text {} covers equal symbols",
                            i + k,
                            j + k
                        )));
                    }
                    cost += count as u32;
                }
                CigarOp::Insertion | CigarOp::Deletion => cost += count as u32,
            }
            if op.consumes_pattern() {
                i += count;
            }
            if op.consumes_text() {
                j += count;
            }
        }
        Ok(cost)
    }

    /// Rewrite `pattern` with the alignment, taking substituted and inserted
    /// symbols from `text`. A correct alignment reproduces `text`.
    pub fn apply(&self, pattern: &[u8], text: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len());
        let (mut i, mut j) = (0usize, 0usize);
        for &(op, count) in &self.runs {
            let count = count as usize;
            match op {
                CigarOp::Match => out.extend(pattern.iter().skip(i).take(count)),
                CigarOp::Mismatch | CigarOp::Insertion => out.extend(text.iter().skip(j).take(count)),
                CigarOp::Deletion => {}
            }
            if op.consumes_pattern() {
                i += count;
            }
            if op.consumes_text() {
                j += count;
            }
        }
        out
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &(op, count) in &self.runs {
            write!(f, "{}{}", count, op.code())?;
        }
        Ok(())
    }
}

impl FromStr for Cigar {
    type Err = QuickedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || QuickedError::invalid_sequence(format!("malformed CIGAR {:?}", s));
        let mut cigar = Cigar::new();
        let mut count: Option<u32> = None;
        for byte in s.bytes() {
            if byte.is_ascii_digit() {
                let digit = u32::from(byte - b'0');
                count = Some(
                    count
                        .unwrap_or(0)
                        .checked_mul(10)
                        .and_then(|c| c.checked_add(digit))
                        .ok_or_else(malformed)?,
                );
            } else {
                let op = CigarOp::from_code(byte).ok_or_else(malformed)?;
                cigar.push(op, count.take().ok_or_else(malformed)?);
            }
        }
        if count.is_some() {
            return Err(malformed());
        }
        Ok(cigar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CigarOp::*;

    #[test]
    fn test_run_length_encoding() {
        let ops = [Match, Match, Mismatch, Match];
        assert_eq!(Cigar::from_ops(&ops, CigarGranularity::Extended).to_string(), "2M1X1M");
        assert_eq!(Cigar::from_ops(&ops, CigarGranularity::Collapsed).to_string(), "4M");
        assert_eq!(Cigar::from_ops(&[], CigarGranularity::Extended).to_string(), "");
    }

    #[test]
    fn test_consumed_lengths() {
        let cigar: Cigar = "3M2I1X4D".parse().unwrap();
        assert_eq!(cigar.pattern_len(), 8);
        assert_eq!(cigar.text_len(), 6);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("3M2".parse::<Cigar>().is_err());
        assert!("M".parse::<Cigar>().is_err());
        assert!("3Q".parse::<Cigar>().is_err());
        assert!("99999999999M".parse::<Cigar>().is_err());
    }

    #[test]
    fn test_parse_merges_runs() {
        let cigar: Cigar = "2M3M".parse().unwrap();
        assert_eq!(cigar.runs(), &[(Match, 5)]);
    }

    #[test]
    fn test_check_and_apply() {
        let cigar: Cigar = "2M1X1M".parse().unwrap();
        assert_eq!(cigar.check(b"ACGT", b"ACTT").unwrap(), 1);
        assert_eq!(cigar.apply(b"ACGT", b"ACTT"), b"ACTT".to_vec());

        let collapsed: Cigar = "4M".parse().unwrap();
        assert_eq!(collapsed.check(b"ACGT", b"ACTT").unwrap(), 1);

        let cigar: Cigar = "1D9M".parse().unwrap();
        assert_eq!(cigar.check(b"AAAAAAAAAA", b"AAAAAAAAA").unwrap(), 1);
        assert_eq!(cigar.apply(b"AAAAAAAAAA", b"AAAAAAAAA"), b"AAAAAAAAA".to_vec());
    }

    #[test]
    fn test_check_rejects_bad_alignments() {
        let short: Cigar = "3M".parse().unwrap();
        assert!(short.check(b"ACGT", b"ACGT").is_err());

        let false_mismatch: Cigar = "1X3M".parse().unwrap();
        assert!(false_mismatch.check(b"ACGT", b"ACGT").is_err());
    }
}
