//! Bound-and-align search
//!
//! Guess an edit bound, align inside the band it implies and keep the result
//! only once the pass proves that no path outside the band can do better.
//! Otherwise the bound grows and the pass is repeated.
//!
//! Op codes are kept speculatively on the first pass only, since most pairs
//! are proven there. Later passes are score-only; when one of them proves,
//! its band is aligned once more with op codes. A search that grows pays one
//! extra pass instead of allocating a history for every inconclusive band.

use crate::band::Band;
use crate::banded::{BandHistory, BandPass, BandedAligner, PassVerdict};
use crate::bound::BoundEstimator;
use crate::config::FallbackPolicy;
use crate::error::{QuickedError, QuickedResult};
use crate::sequence::SequenceView;

/// Hard ceiling on bound proposals in one search
pub const MAX_ATTEMPTS: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Estimating { attempt: u32 },
    Aligning { attempt: u32, bound: usize },
    Proven { score: u32, bound: usize },
    ExhaustedFallback { last_bound: usize },
    Failed { last_bound: usize },
}

/// Proven result of a search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub score: u32,
    /// Band of the proving pass
    pub band: Band,
    /// Op codes of the proving pass, when they were kept
    pub history: Option<BandHistory>,
    /// Passes run, including the fallback pass
    pub attempts: u32,
    pub final_bound: usize,
    pub fell_back: bool,
    /// Passes that kept op codes, including a re-run of the proving band
    pub retained_passes: u32,
}

pub struct BoundAndAlign<'a, 'k> {
    aligner: &'a BandedAligner<'k>,
    estimator: BoundEstimator,
    fallback: FallbackPolicy,
    retain_limit: Option<usize>,
}

impl<'a, 'k> BoundAndAlign<'a, 'k> {
    pub fn new(aligner: &'a BandedAligner<'k>, estimator: BoundEstimator, fallback: FallbackPolicy) -> Self {
        Self {
            aligner,
            estimator,
            fallback,
            retain_limit: None,
        }
    }

    /// Keep traceback op codes for bands of at most `cells` cells
    pub fn retain_history_up_to(mut self, cells: usize) -> Self {
        self.retain_limit = Some(cells);
        self
    }

    fn retains(&self, band: Band, rows: usize) -> bool {
        self.retain_limit.map_or(false, |limit| band.area(rows) <= limit)
    }

    pub fn run(&self, seqs: &SequenceView) -> QuickedResult<SearchOutcome> {
        let (pattern, text) = (seqs.pattern(), seqs.text());
        let (n, m) = (seqs.pattern_len(), seqs.text_len());

        let mut state = SearchState::Estimating { attempt: 0 };
        let mut accepted: Option<BandPass> = None;
        let mut passes = 0u32;
        let mut retained = 0u32;
        let mut last_bound = 0usize;

        loop {
            let next = match state {
                SearchState::Estimating { attempt } => {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(QuickedError::invariant(format!(
                            "bound search did not settle after {} attempts",
                            attempt
                        )));
                    }
                    match self.estimator.propose(attempt) {
                        Some(bound) => SearchState::Aligning { attempt, bound },
                        None => match self.fallback {
                            FallbackPolicy::Unbounded => SearchState::ExhaustedFallback { last_bound },
                            FallbackPolicy::HardFail => SearchState::Failed { last_bound },
                        },
                    }
                }

                SearchState::Aligning { attempt, bound } => {
                    last_bound = bound;
                    let band = Band::from_bound(bound, n, m);
                    let retain = attempt == 0 && self.retains(band, n);
                    let pass = self.aligner.run(pattern, text, band, retain)?;
                    passes += 1;
                    retained += u32::from(retain);
                    match pass.verdict() {
                        PassVerdict::Proven(score) => {
                            accepted = Some(pass);
                            SearchState::Proven { score, bound }
                        }
                        PassVerdict::Inconclusive => SearchState::Estimating { attempt: attempt + 1 },
                    }
                }

                SearchState::Proven { score, bound } => {
                    let mut pass = accepted
                        .take()
                        .ok_or_else(|| QuickedError::invariant("proven state without a pass"))?;
                    if pass.history.is_none() && self.retains(pass.band, n) {
                        log::debug!("re-running proving band {:?} with op codes", pass.band);
                        pass = self.aligner.run(pattern, text, pass.band, true)?;
                        retained += 1;
                    }
                    return Ok(SearchOutcome {
                        score,
                        band: pass.band,
                        history: pass.history,
                        attempts: passes,
                        final_bound: bound,
                        fell_back: false,
                        retained_passes: retained,
                    });
                }

                SearchState::ExhaustedFallback { last_bound } => {
                    log::warn!(
                        "bound search exhausted at {} (cap {}), aligning {}x{} over the full matrix",
                        last_bound,
                        self.estimator.cap(),
                        n,
                        m
                    );
                    let band = Band::full(n, m);
                    let retain = self.retains(band, n);
                    let pass = self.aligner.run(pattern, text, band, retain)?;
                    passes += 1;
                    retained += u32::from(retain);
                    let score = match pass.verdict() {
                        PassVerdict::Proven(score) => score,
                        PassVerdict::Inconclusive => {
                            return Err(QuickedError::invariant("full band pass was not proven"))
                        }
                    };
                    return Ok(SearchOutcome {
                        score,
                        band,
                        history: pass.history,
                        attempts: passes,
                        final_bound: n.max(m),
                        fell_back: true,
                        retained_passes: retained,
                    });
                }

                SearchState::Failed { last_bound } => {
                    return Err(QuickedError::BoundExhausted {
                        bound: last_bound,
                        cap: self.estimator.cap(),
                    });
                }
            };

            log::debug!("bound search {:?} -> {:?}", state, next);
            state = next;
        }
    }
}
