//! Aligner configuration
//!
//! Every option has a default tuned for sequencing reads (a few percent
//! divergence). Configurations can be loaded from JSON; missing fields fall
//! back to their defaults.

use crate::error::{QuickedError, QuickedResult};
use serde::{Deserialize, Serialize};

/// Which symbols `align` accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlphabetMode {
    /// A, C, G, T and N in either case
    #[default]
    StrictDna,
    /// Any printable ASCII symbol
    Permissive,
}

/// CIGAR output granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CigarGranularity {
    /// Matches (M) and mismatches (X) are distinguished
    #[default]
    Extended,
    /// Mismatches are folded into M
    Collapsed,
}

/// What to do when the bound search passes its cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Run one unbounded (full band) pass
    #[default]
    Unbounded,
    /// Report `QuickedError::BoundExhausted`
    HardFail,
}

/// Alignment strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Adaptive bound-and-align
    #[default]
    Quicked,
    /// Single pass with a fixed band taken from `bandwidth`; an unproven
    /// pass is handled by the fallback policy
    Banded,
    /// Unbounded pass with divide-and-conquer traceback in linear memory
    Hirschberg,
}

/// Numeric kernel bound by the aligner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KernelKind {
    /// Wide-lane kernel, several band cells per step
    #[default]
    Lanes,
    /// One cell at a time
    Scalar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignerConfig {
    #[serde(default)]
    pub alphabet: AlphabetMode,

    #[serde(default)]
    pub cigar: CigarGranularity,

    #[serde(default)]
    pub fallback: FallbackPolicy,

    #[serde(default)]
    pub algorithm: Algorithm,

    #[serde(default)]
    pub kernel: KernelKind,

    /// First bound to try: a fraction of the shorter length if in [0, 1],
    /// otherwise an absolute number of edits
    #[serde(default = "default_initial_bound")]
    pub initial_bound: f64,

    /// Bound multiplier after an inconclusive pass (at least 2)
    #[serde(default = "default_growth_factor")]
    pub growth_factor: f64,

    /// Largest bound the search may try before the fallback policy applies.
    /// `None` means the trivial worst case, len(pattern) + len(text).
    #[serde(default)]
    pub bound_cap: Option<usize>,

    /// Fixed bound for `Algorithm::Banded`, same convention as `initial_bound`
    #[serde(default = "default_bandwidth")]
    pub bandwidth: f64,

    /// Skip CIGAR reconstruction
    #[serde(default)]
    pub only_score: bool,

    /// Largest band area (cells) whose traceback is kept in full; larger
    /// problems are reconstructed by divide and conquer
    #[serde(default = "default_traceback_cell_limit")]
    pub traceback_cell_limit: usize,
}

fn default_initial_bound() -> f64 {
    0.01
}

fn default_growth_factor() -> f64 {
    2.0
}

fn default_bandwidth() -> f64 {
    0.15
}

fn default_traceback_cell_limit() -> usize {
    1 << 26
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            alphabet: AlphabetMode::default(),
            cigar: CigarGranularity::default(),
            fallback: FallbackPolicy::default(),
            algorithm: Algorithm::default(),
            kernel: KernelKind::default(),
            initial_bound: default_initial_bound(),
            growth_factor: default_growth_factor(),
            bound_cap: None,
            bandwidth: default_bandwidth(),
            only_score: false,
            traceback_cell_limit: default_traceback_cell_limit(),
        }
    }
}

impl AlignerConfig {
    /// Check option ranges
    pub fn validate(&self) -> QuickedResult<()> {
        if !self.initial_bound.is_finite() || self.initial_bound < 0.0 {
            return Err(QuickedError::invalid_config(format!(
                "initial_bound must be a non-negative number, got {}",
                self.initial_bound
            )));
        }
        if !self.bandwidth.is_finite() || self.bandwidth < 0.0 {
            return Err(QuickedError::invalid_config(format!(
                "bandwidth must be a non-negative number, got {}",
                self.bandwidth
            )));
        }
        if !self.growth_factor.is_finite() || self.growth_factor < 2.0 {
            return Err(QuickedError::invalid_config(format!(
                "growth_factor must be at least 2.0, got {}",
                self.growth_factor
            )));
        }
        if self.traceback_cell_limit == 0 {
            return Err(QuickedError::invalid_config(
                "traceback_cell_limit must be positive",
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> QuickedResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| QuickedError::invalid_config(format!("JSON parsing error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> QuickedResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| QuickedError::invalid_config(format!("JSON serialization error: {}", e)))
    }
}
