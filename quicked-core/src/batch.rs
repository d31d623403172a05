//! Parallel alignment of independent pairs

use crate::aligner::{AlignmentResult, QuickedAligner};
use crate::config::AlignerConfig;
use crate::error::QuickedResult;
use rayon::prelude::*;

/// Align every `(pattern, text)` pair with `config`.
///
/// Each worker thread owns one aligner. Results are in input order; a
/// failing pair does not affect the others.
pub fn align_batch<P, T>(pairs: &[(P, T)], config: &AlignerConfig) -> QuickedResult<Vec<QuickedResult<AlignmentResult>>>
where
    P: AsRef<[u8]> + Sync,
    T: AsRef<[u8]> + Sync,
{
    config.validate()?;
    log::debug!("aligning a batch of {} pairs", pairs.len());

    let results = pairs
        .par_iter()
        .map_init(
            || QuickedAligner::with_config(config.clone()),
            |aligner, (pattern, text)| {
                let aligner = aligner.as_mut().map_err(|err| err.clone())?;
                aligner.align(pattern.as_ref(), text.as_ref())?;
                aligner.result().cloned()
            },
        )
        .collect();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuickedError;

    #[test]
    fn test_batch_keeps_order_and_isolates_failures() {
        let pairs: [(&[u8], &[u8]); 3] = [(b"ACGT", b"ACTT"), (b"ACGT", b"AC?T"), (b"", b"ACGT")];
        let results = align_batch(&pairs, &AlignerConfig::default()).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().score, 1);
        assert!(matches!(results[1], Err(QuickedError::InvalidSequence(_))));
        assert_eq!(results[2].as_ref().unwrap().score, 4);
    }

    #[test]
    fn test_batch_rejects_invalid_config() {
        let config = AlignerConfig {
            growth_factor: 0.5,
            ..Default::default()
        };
        let pairs: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
        assert!(align_batch(&pairs, &config).is_err());
    }
}
