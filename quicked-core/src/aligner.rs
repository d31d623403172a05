//! Aligner facade
//!
//! `QuickedAligner` owns a configuration and a kernel and keeps the outcome
//! of the last `align` call. Scores and CIGARs are only handed out for a
//! call that succeeded.

use crate::banded::BandedAligner;
use crate::bound::BoundEstimator;
use crate::cigar::Cigar;
use crate::config::{AlignerConfig, Algorithm, CigarGranularity, FallbackPolicy, KernelKind};
use crate::error::{QuickedError, QuickedResult};
use crate::kernel::{kernel_for, BandKernel};
use crate::search::BoundAndAlign;
use crate::sequence::SequenceView;
use crate::traceback::PathReconstructor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest op-code block the traceback holds in Hirschberg mode
const HIRSCHBERG_LEAF_CELLS: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentResult {
    /// Edit distance
    pub score: u32,
    /// `None` for score-only alignments
    pub cigar: Option<Cigar>,
    /// Always true; unproven scores are never reported
    pub proven: bool,
    /// Banded passes run
    pub attempts: u32,
    pub final_bound: usize,
    /// The bound search was exhausted and the full matrix was used
    pub fell_back: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignerState {
    Empty,
    Aligned(AlignmentResult),
    Failed(QuickedError),
}

pub struct QuickedAligner {
    config: AlignerConfig,
    kernel: Box<dyn BandKernel>,
    state: AlignerState,
}

impl QuickedAligner {
    pub fn new() -> Self {
        let config = AlignerConfig::default();
        let kernel = kernel_for(config.kernel);
        Self {
            config,
            kernel,
            state: AlignerState::Empty,
        }
    }

    pub fn with_config(config: AlignerConfig) -> QuickedResult<Self> {
        let kernel = kernel_for(config.kernel);
        Self::with_kernel(config, kernel)
    }

    /// Bind an externally chosen kernel; `config.kernel` is ignored
    pub fn with_kernel(config: AlignerConfig, kernel: Box<dyn BandKernel>) -> QuickedResult<Self> {
        config.validate()?;
        log::debug!("aligner using the {} kernel", kernel.name());
        Ok(Self {
            config,
            kernel,
            state: AlignerState::Empty,
        })
    }

    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    pub fn kernel_name(&self) -> &'static str {
        self.kernel.name()
    }

    pub fn state(&self) -> &AlignerState {
        &self.state
    }

    /// Align `pattern` against `text` and keep the outcome.
    ///
    /// On failure the error is returned and remembered, except for
    /// allocation failures, which leave the previous outcome in place.
    pub fn align(&mut self, pattern: &[u8], text: &[u8]) -> QuickedResult<()> {
        let outcome = self.compute(pattern, text);
        if let Err(err) = &outcome {
            log::debug!("alignment of {}x{} failed: {}", pattern.len(), text.len(), err);
        }
        self.record(outcome)
    }

    fn record(&mut self, outcome: QuickedResult<AlignmentResult>) -> QuickedResult<()> {
        match outcome {
            Ok(result) => {
                self.state = AlignerState::Aligned(result);
                Ok(())
            }
            Err(err) => {
                if !err.preserves_previous_result() {
                    self.state = AlignerState::Failed(err.clone());
                }
                Err(err)
            }
        }
    }

    fn compute(&self, pattern: &[u8], text: &[u8]) -> QuickedResult<AlignmentResult> {
        let seqs = SequenceView::new(pattern, text, self.config.alphabet)?;
        let (n, m) = (seqs.pattern_len(), seqs.text_len());

        let aligner = BandedAligner::new(self.kernel.as_ref());
        let estimator = BoundEstimator::for_config(&self.config, n, m);
        let mut search = BoundAndAlign::new(&aligner, estimator, self.config.fallback);
        let (retain, leaf_cells) = match self.config.algorithm {
            Algorithm::Hirschberg => (false, self.config.traceback_cell_limit.min(HIRSCHBERG_LEAF_CELLS)),
            Algorithm::Quicked | Algorithm::Banded => (!self.config.only_score, self.config.traceback_cell_limit),
        };
        if retain {
            search = search.retain_history_up_to(self.config.traceback_cell_limit);
        }
        let outcome = search.run(&seqs)?;

        let cigar = if self.config.only_score {
            None
        } else {
            let (ops, _) = PathReconstructor::new(&aligner, leaf_cells).reconstruct(&seqs, &outcome)?;
            Some(Cigar::from_ops(&ops, self.config.cigar))
        };

        Ok(AlignmentResult {
            score: outcome.score,
            cigar,
            proven: true,
            attempts: outcome.attempts,
            final_bound: outcome.final_bound,
            fell_back: outcome.fell_back,
        })
    }

    pub fn result(&self) -> QuickedResult<&AlignmentResult> {
        match &self.state {
            AlignerState::Aligned(result) => Ok(result),
            AlignerState::Empty => Err(QuickedError::NoResult("no alignment has been run")),
            AlignerState::Failed(_) => Err(QuickedError::NoResult("the last alignment failed")),
        }
    }

    /// Edit distance of the last successful alignment
    pub fn score(&self) -> QuickedResult<u32> {
        self.result().map(|result| result.score)
    }

    /// CIGAR of the last successful alignment
    pub fn cigar(&self) -> QuickedResult<String> {
        self.result()?
            .cigar
            .as_ref()
            .map(Cigar::to_string)
            .ok_or(QuickedError::NoResult("the last alignment was score-only"))
    }

    pub fn last_error(&self) -> Option<&QuickedError> {
        match &self.state {
            AlignerState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.config.algorithm = algorithm;
    }

    pub fn set_only_score(&mut self, only_score: bool) {
        self.config.only_score = only_score;
    }

    /// Fixed bound used by `Algorithm::Banded`
    pub fn set_bandwidth(&mut self, bandwidth: f64) -> QuickedResult<()> {
        let config = AlignerConfig {
            bandwidth,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Switch between the scalar and lane kernels; replaces any kernel bound
    /// through `with_kernel`
    pub fn set_force_scalar(&mut self, force_scalar: bool) {
        let kind = if force_scalar { KernelKind::Scalar } else { KernelKind::Lanes };
        self.config.kernel = kind;
        self.kernel = kernel_for(kind);
    }

    pub fn set_cigar_granularity(&mut self, granularity: CigarGranularity) {
        self.config.cigar = granularity;
    }

    pub fn set_fallback_policy(&mut self, policy: FallbackPolicy) {
        self.config.fallback = policy;
    }
}

impl Default for QuickedAligner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for QuickedAligner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuickedAligner")
            .field("config", &self.config)
            .field("kernel", &self.kernel.name())
            .field("state", &self.state)
            .finish()
    }
}
