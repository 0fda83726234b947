use criterion::{criterion_group, criterion_main, Criterion};
use ssdocr::lowlevel::{ActiveKernel, Kernel};
use ssdocr::{
    generate_priors, run, suppress, CornerBox, ImageSize, PostprocessConfig, PriorConfig,
    SuppressConfig, TensorView, Variances, NUM_CLASSES,
};
use std::hint::black_box;

fn make_locations(anchors: usize) -> Vec<f32> {
    (0..anchors * 4)
        .map(|i| (((i * 37) % 101) as f32 / 50.0) - 1.0)
        .collect()
}

fn make_scores(anchors: usize) -> Vec<f32> {
    let mut scores = vec![0.0f32; anchors * NUM_CLASSES];
    for (anchor, row) in scores.chunks_exact_mut(NUM_CLASSES).enumerate() {
        row[0] = 4.0;
        // Roughly one anchor in seven looks like a digit.
        if anchor % 7 == 0 {
            row[0] = 0.0;
            row[1 + anchor % (NUM_CLASSES - 1)] = 6.0;
        }
    }
    scores
}

fn bench_postprocess(c: &mut Criterion) {
    let config = PriorConfig::card_ocr();
    c.bench_function("generate_priors_card_ocr", |b| {
        b.iter(|| black_box(generate_priors(&config).unwrap()));
    });

    let priors = generate_priors(&config).unwrap();
    let locations = make_locations(priors.len());
    let scores = make_scores(priors.len());
    let loc_view = TensorView::locations(&locations).unwrap();
    let score_view = TensorView::new(&scores, NUM_CLASSES).unwrap();
    let size = ImageSize::new(1280.0, 800.0);

    c.bench_function("decode_boxes", |b| {
        let mut out = vec![CornerBox::default(); priors.len()];
        b.iter(|| {
            ActiveKernel::decode_boxes(&locations, &priors, Variances::default(), &mut out);
            black_box(&out);
        });
    });

    c.bench_function("softmax_rows", |b| {
        let mut out = vec![0.0f32; scores.len()];
        b.iter(|| {
            ActiveKernel::softmax_rows(&scores, NUM_CLASSES, &mut out);
            black_box(&out);
        });
    });

    let mut boxes = vec![CornerBox::default(); priors.len()];
    ActiveKernel::decode_boxes(&locations, &priors, Variances::default(), &mut boxes);
    let mut probs = vec![0.0f32; scores.len()];
    ActiveKernel::softmax_rows(&scores, NUM_CLASSES, &mut probs);
    let prob_view = TensorView::new(&probs, NUM_CLASSES).unwrap();
    c.bench_function("suppress", |b| {
        b.iter(|| black_box(suppress(prob_view, &boxes, &SuppressConfig::default()).unwrap()));
    });

    c.bench_function("run_sequential", |b| {
        let cfg = PostprocessConfig::default();
        b.iter(|| black_box(run(loc_view, score_view, &priors, size, &cfg).unwrap()));
    });

    #[cfg(feature = "rayon")]
    {
        let cfg = PostprocessConfig {
            parallel: true,
            ..PostprocessConfig::default()
        };
        c.bench_function("run_parallel", |b| {
            b.iter(|| black_box(run(loc_view, score_view, &priors, size, &cfg).unwrap()));
        });
    }
}

criterion_group!(benches, bench_postprocess);
criterion_main!(benches);
