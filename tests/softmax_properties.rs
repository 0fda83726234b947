use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ssdocr::softmax;

fn assert_distribution(row: &[f32]) {
    let sum: f32 = row.iter().sum();
    assert!((sum - 1.0).abs() <= 1e-5, "sum = {sum} for {row:?}");
    assert!(row.iter().all(|&p| (0.0..=1.0).contains(&p)));
}

#[test]
fn random_rows_are_distributions() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..1000 {
        let cols = rng.random_range(1..=16);
        let scale = 10f32.powi(rng.random_range(-3..=6));
        let row: Vec<f32> = (0..cols)
            .map(|_| rng.random_range(-1.0f32..1.0) * scale)
            .collect();
        assert_distribution(&softmax(&row));
    }
}

#[test]
fn all_equal_rows_are_uniform() {
    for value in [-1.0e6f32, 0.0, 3.5, 1.0e6] {
        let row = softmax(&[value; 11]);
        assert_distribution(&row);
        for p in row {
            assert!((p - 1.0 / 11.0).abs() < 1e-6);
        }
    }
}

#[test]
fn extreme_finite_values_do_not_overflow() {
    let row = softmax(&[f32::MAX, f32::MIN, 0.0, f32::MAX]);
    assert_distribution(&row);
    assert!((row[0] - 0.5).abs() < 1e-6);
    assert!((row[3] - 0.5).abs() < 1e-6);
}
