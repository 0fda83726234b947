use serde::Deserialize;
use ssdocr::lowlevel::to_corner_form;
use ssdocr::pipeline::run;
use ssdocr::tensor::LOCATION_COLS;
use ssdocr::{
    generate_priors, CenterBox, FeatureMap, ImageSize, PostprocessConfig, PriorConfig, TensorView,
};

// Two cells with a min square and a larger square each; background, "0" and "1".
const FIXTURE: &str = r#"{
    "image_width": 200.0,
    "image_height": 100.0,
    "classes": 3,
    "locations": [
        0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0
    ],
    "scores": [
        0.0, 8.0, 0.0,
        0.0, 6.0, 0.0,
        0.0, 0.0, 7.0,
        5.0, 0.0, 0.0
    ],
    "expected": [
        { "label": 1, "anchor": 0 },
        { "label": 2, "anchor": 2 }
    ]
}"#;

#[derive(Deserialize)]
struct Recorded {
    image_width: f32,
    image_height: f32,
    classes: usize,
    locations: Vec<f32>,
    scores: Vec<f32>,
    expected: Vec<Expected>,
}

#[derive(Deserialize)]
struct Expected {
    label: usize,
    anchor: usize,
}

fn fixture_priors() -> PriorConfig {
    PriorConfig {
        input_width: 100,
        input_height: 100,
        feature_maps: vec![FeatureMap {
            width: 2,
            height: 1,
            stride_x: 50.0,
            stride_y: 100.0,
            min_size: 20.0,
            max_size: 40.0,
            aspect_ratios: Vec::new(),
        }],
        clamp: false,
    }
}

#[test]
fn recorded_tensors_replay_to_expected_detections() {
    let recorded: Recorded = serde_json::from_str(FIXTURE).unwrap();
    let priors = generate_priors(&fixture_priors()).unwrap();
    assert_eq!(priors.len(), 4);

    let locations = TensorView::new(&recorded.locations, LOCATION_COLS).unwrap();
    let scores = TensorView::new(&recorded.scores, recorded.classes).unwrap();
    let size = ImageSize::new(recorded.image_width, recorded.image_height);
    let detections = run(locations, scores, &priors, size, &PostprocessConfig::default()).unwrap();

    // The larger square on the first cell overlaps the min square with IoU 0.5.
    assert_eq!(detections.len(), recorded.expected.len());
    for (det, want) in detections.iter().zip(&recorded.expected) {
        assert_eq!(det.label, want.label);
        assert!(det.confidence > 0.99);
        let prior = priors[want.anchor];
        let corner = to_corner_form(CenterBox {
            cx: prior.cx,
            cy: prior.cy,
            w: prior.w,
            h: prior.h,
        });
        assert!((det.x_min - corner.x_min * size.width).abs() < 1e-3);
        assert!((det.y_min - corner.y_min * size.height).abs() < 1e-3);
        assert!((det.x_max - corner.x_max * size.width).abs() < 1e-3);
        assert!((det.y_max - corner.y_max * size.height).abs() < 1e-3);
        assert_eq!(det.image_size, size);
    }
}

#[test]
fn recorded_background_rows_are_never_reported() {
    let mut recorded: Recorded = serde_json::from_str(FIXTURE).unwrap();
    for row in recorded.scores.chunks_exact_mut(recorded.classes) {
        row.copy_from_slice(&[9.0, 0.0, 0.0]);
    }
    let priors = generate_priors(&fixture_priors()).unwrap();
    let locations = TensorView::new(&recorded.locations, LOCATION_COLS).unwrap();
    let scores = TensorView::new(&recorded.scores, recorded.classes).unwrap();
    let size = ImageSize::new(recorded.image_width, recorded.image_height);
    let detections = run(locations, scores, &priors, size, &PostprocessConfig::default()).unwrap();
    assert!(detections.is_empty());
}
