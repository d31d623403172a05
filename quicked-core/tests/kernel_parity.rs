mod common;

use anyhow::Result;
use common::{related_pair, reference_distance};
use quicked_core::{AlignerConfig, AlignmentResult, KernelKind, QuickedAligner, ScalarKernel};

fn run(kind: KernelKind, config: &AlignerConfig, pattern: &[u8], text: &[u8]) -> Result<AlignmentResult> {
    let config = AlignerConfig {
        kernel: kind,
        ..config.clone()
    };
    let mut aligner = QuickedAligner::with_config(config)?;
    aligner.align(pattern, text)?;
    Ok(aligner.result()?.clone())
}

#[test]
fn lanes_and_scalar_agree_on_related_pairs() -> Result<()> {
    common::init_logging();
    let config = AlignerConfig::default();
    for seed in 0..24u64 {
        let len = 20 + (seed as usize * 37) % 400;
        let rate = [0.01, 0.05, 0.15, 0.4][seed as usize % 4];
        let (pattern, text) = related_pair(seed, len, rate);

        let lanes = run(KernelKind::Lanes, &config, &pattern, &text)?;
        let scalar = run(KernelKind::Scalar, &config, &pattern, &text)?;
        assert_eq!(lanes, scalar, "seed {}", seed);
        assert_eq!(lanes.score, reference_distance(&pattern, &text), "seed {}", seed);
    }
    Ok(())
}

#[test]
fn lanes_and_scalar_agree_under_divide_and_conquer() -> Result<()> {
    let config = AlignerConfig {
        traceback_cell_limit: 64,
        ..Default::default()
    };
    for seed in 100..112u64 {
        let (pattern, text) = related_pair(seed, 250, 0.08);
        let lanes = run(KernelKind::Lanes, &config, &pattern, &text)?;
        let scalar = run(KernelKind::Scalar, &config, &pattern, &text)?;
        assert_eq!(lanes, scalar, "seed {}", seed);
    }
    Ok(())
}

#[test]
fn externally_bound_kernel_is_used() -> Result<()> {
    let mut aligner = QuickedAligner::with_kernel(AlignerConfig::default(), Box::new(ScalarKernel))?;
    assert_eq!(aligner.kernel_name(), "scalar");
    aligner.align(b"GATTACA", b"GCATGCT")?;
    assert_eq!(aligner.score()?, 4);
    Ok(())
}
