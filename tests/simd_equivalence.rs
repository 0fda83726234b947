#![cfg(feature = "simd")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ssdocr::lowlevel::{Kernel, ScalarKernel, SimdKernel};
use ssdocr::{generate_priors, CornerBox, PriorConfig, Variances};

#[test]
fn simd_decode_is_bit_identical_to_scalar() {
    let priors = generate_priors(&PriorConfig::card_ocr()).unwrap();
    let mut rng = StdRng::seed_from_u64(17);
    // Odd length exercises the scalar remainder.
    let count = priors.len() - 3;
    let locations: Vec<f32> = (0..count * 4)
        .map(|_| rng.random_range(-3.0f32..3.0))
        .collect();

    let mut scalar = vec![CornerBox::default(); count];
    let mut simd = vec![CornerBox::default(); count];
    ScalarKernel::decode_boxes(&locations, &priors[..count], Variances::default(), &mut scalar);
    SimdKernel::decode_boxes(&locations, &priors[..count], Variances::default(), &mut simd);

    assert_eq!(scalar, simd);
}
