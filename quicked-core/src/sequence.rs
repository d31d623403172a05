//! Validated view over a (pattern, text) pair

use crate::config::AlphabetMode;
use crate::error::{QuickedError, QuickedResult};

/// Text padding symbol; never equal to a validated symbol
pub(crate) const SENTINEL: u8 = 0;

/// Upper-cased, validated copies of the two sequences of one alignment.
///
/// Lives for a single `align` call. The caller's buffers are only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceView {
    pattern: Vec<u8>,
    text: Vec<u8>,
}

impl SequenceView {
    pub fn new(pattern: &[u8], text: &[u8], mode: AlphabetMode) -> QuickedResult<Self> {
        Ok(Self {
            pattern: normalize(pattern, mode, "pattern")?,
            text: normalize(text, mode, "text")?,
        })
    }

    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    pub fn pattern_len(&self) -> usize {
        self.pattern.len()
    }

    pub fn text_len(&self) -> usize {
        self.text.len()
    }

    /// Diagonal of the final cell, len(text) - len(pattern)
    pub fn target_diagonal(&self) -> isize {
        self.text.len() as isize - self.pattern.len() as isize
    }

    /// Trivial worst-case distance, len(pattern) + len(text)
    pub fn trivial_bound(&self) -> usize {
        self.pattern.len() + self.text.len()
    }
}

fn is_valid_symbol(symbol: u8, mode: AlphabetMode) -> bool {
    match mode {
        AlphabetMode::StrictDna => matches!(symbol.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N'),
        AlphabetMode::Permissive => symbol.is_ascii_graphic(),
    }
}

fn normalize(sequence: &[u8], mode: AlphabetMode, role: &str) -> QuickedResult<Vec<u8>> {
    if let Some(pos) = sequence.iter().position(|&s| !is_valid_symbol(s, mode)) {
        let symbol = sequence[pos];
        return Err(QuickedError::invalid_sequence(format!(
            "{} has invalid symbol {:?} (0x{:02x}) at position {} for {:?} alphabet",
            role,
            symbol as char,
            symbol,
            pos,
            mode
        )));
    }
    Ok(sequence.iter().map(u8::to_ascii_uppercase).collect())
}
