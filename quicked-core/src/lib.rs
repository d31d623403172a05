//! QuickEd Core Library
//!
//! Exact edit-distance alignment by bound-and-align: guess an edit bound,
//! align inside the band it implies, and widen the band only when the pass
//! cannot prove its score optimal.

pub mod error;
pub mod config;
pub mod sequence;
pub mod band;
pub mod kernel;
pub mod banded;
pub mod bound;
pub mod search;
pub mod cigar;
pub mod traceback;
pub mod aligner;
#[cfg(feature = "batch")] pub mod batch;

// Re-export commonly used types and functions
pub use aligner::{AlignerState, AlignmentResult, QuickedAligner};
pub use cigar::{Cigar, CigarOp};
pub use config::{AlignerConfig, Algorithm, AlphabetMode, CigarGranularity, FallbackPolicy, KernelKind};
pub use error::{QuickedError, QuickedResult};
pub use kernel::{kernel_for, BandKernel, LaneKernel, ScalarKernel};
pub use sequence::SequenceView;
#[cfg(feature = "batch")]
pub use batch::align_batch;

/// Version information for the QuickEd core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
