#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DNA: [u8; 4] = [b'A', b'C', b'G', b'T'];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Quadratic Levenshtein distance, one row at a time
pub fn reference_distance(a: &[u8], b: &[u8]) -> u32 {
    let mut row: Vec<u32> = (0..=b.len() as u32).collect();
    for (i, &x) in a.iter().enumerate() {
        let mut diag = row[0];
        row[0] = i as u32 + 1;
        for (j, &y) in b.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = (diag + u32::from(x != y)).min(up + 1).min(row[j] + 1);
            diag = up;
        }
    }
    row[b.len()]
}

pub fn random_dna(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| DNA[rng.gen_range(0..4)]).collect()
}

/// Copy of `seq` with roughly `rate` of its positions edited
pub fn mutate(rng: &mut StdRng, seq: &[u8], rate: f64) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len() + seq.len() / 8);
    for &symbol in seq {
        if rng.gen_bool(rate) {
            match rng.gen_range(0..3) {
                0 => out.push(DNA[(DNA.iter().position(|&s| s == symbol).unwrap_or(0) + rng.gen_range(1..4)) % 4]),
                1 => {}
                _ => {
                    out.push(DNA[rng.gen_range(0..4)]);
                    out.push(symbol);
                }
            }
        } else {
            out.push(symbol);
        }
    }
    out
}

/// Related pair of sequences for a seed
pub fn related_pair(seed: u64, len: usize, rate: f64) -> (Vec<u8>, Vec<u8>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let pattern = random_dna(&mut rng, len);
    let text = mutate(&mut rng, &pattern, rate);
    (pattern, text)
}
