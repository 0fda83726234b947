use clap::Parser;
use serde::{Deserialize, Serialize};
use ssdocr::{
    Detection, DetectionConfig, DetectionPipeline, FeatureMap, ImageSize, InferenceError,
    InputBuffer, PostprocessConfig, Predictor, PriorConfig, RawOutput, SuppressConfig,
};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode recorded SSD detector output (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize, Serialize)]
struct FeatureMapJson {
    width: usize,
    height: usize,
    stride_x: f32,
    stride_y: f32,
    min_size: f32,
    max_size: f32,
    aspect_ratios: Vec<f32>,
}

impl From<FeatureMapJson> for FeatureMap {
    fn from(value: FeatureMapJson) -> Self {
        Self {
            width: value.width,
            height: value.height,
            stride_x: value.stride_x,
            stride_y: value.stride_y,
            min_size: value.min_size,
            max_size: value.max_size,
            aspect_ratios: value.aspect_ratios,
        }
    }
}

impl From<&FeatureMap> for FeatureMapJson {
    fn from(value: &FeatureMap) -> Self {
        Self {
            width: value.width,
            height: value.height,
            stride_x: value.stride_x,
            stride_y: value.stride_y,
            min_size: value.min_size,
            max_size: value.max_size,
            aspect_ratios: value.aspect_ratios.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
struct PriorConfigJson {
    input_width: usize,
    input_height: usize,
    clamp: bool,
    feature_maps: Vec<FeatureMapJson>,
}

impl Default for PriorConfigJson {
    fn default() -> Self {
        let cfg = PriorConfig::card_ocr();
        Self {
            input_width: cfg.input_width,
            input_height: cfg.input_height,
            clamp: cfg.clamp,
            feature_maps: cfg.feature_maps.iter().map(FeatureMapJson::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
struct PostprocessConfigJson {
    center_variance: f32,
    size_variance: f32,
    prob_threshold: f32,
    iou_threshold: f32,
    candidate_size: usize,
    top_k: Option<usize>,
    parallel: bool,
}

impl Default for PostprocessConfigJson {
    fn default() -> Self {
        let cfg = PostprocessConfig::default();
        Self {
            center_variance: cfg.center_variance,
            size_variance: cfg.size_variance,
            prob_threshold: cfg.suppress.prob_threshold,
            iou_threshold: cfg.suppress.iou_threshold,
            candidate_size: cfg.suppress.candidate_size,
            top_k: cfg.suppress.top_k,
            parallel: cfg.parallel,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
struct Config {
    tensors_path: String,
    image_width: f32,
    image_height: f32,
    output_path: Option<String>,
    num_classes: usize,
    priors: PriorConfigJson,
    postprocess: PostprocessConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        let cfg = DetectionConfig::default();
        Self {
            tensors_path: String::new(),
            image_width: cfg.priors.input_width as f32,
            image_height: cfg.priors.input_height as f32,
            output_path: None,
            num_classes: cfg.num_classes,
            priors: PriorConfigJson::default(),
            postprocess: PostprocessConfigJson::default(),
        }
    }
}

impl Config {
    fn detection_config(self) -> DetectionConfig {
        DetectionConfig {
            priors: PriorConfig {
                input_width: self.priors.input_width,
                input_height: self.priors.input_height,
                clamp: self.priors.clamp,
                feature_maps: self
                    .priors
                    .feature_maps
                    .into_iter()
                    .map(FeatureMap::from)
                    .collect(),
            },
            num_classes: self.num_classes,
            postprocess: PostprocessConfig {
                center_variance: self.postprocess.center_variance,
                size_variance: self.postprocess.size_variance,
                suppress: SuppressConfig {
                    prob_threshold: self.postprocess.prob_threshold,
                    iou_threshold: self.postprocess.iou_threshold,
                    candidate_size: self.postprocess.candidate_size,
                    top_k: self.postprocess.top_k,
                },
                parallel: self.postprocess.parallel,
            },
        }
    }
}

/// Model output recorded to disk.
#[derive(Debug, Deserialize)]
struct RecordedTensors {
    locations: Vec<f32>,
    scores: Vec<f32>,
}

/// Predictor that hands back one recorded output regardless of input.
struct ReplayPredictor {
    output: RawOutput,
}

impl Predictor for ReplayPredictor {
    fn infer(&self, _input: &InputBuffer) -> Result<RawOutput, InferenceError> {
        Ok(self.output.clone())
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    label: usize,
    confidence: f32,
    x_min: f32,
    y_min: f32,
    x_max: f32,
    y_max: f32,
}

impl From<Detection> for DetectionRecord {
    fn from(value: Detection) -> Self {
        Self {
            label: value.label,
            confidence: value.confidence,
            x_min: value.x_min,
            y_min: value.y_min,
            x_max: value.x_max,
            y_max: value.y_max,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    image_width: f32,
    image_height: f32,
    detections: Vec<DetectionRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("ssdocr=debug".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{}", serde_json::to_string_pretty(&Config::default())?);
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.tensors_path.is_empty() {
        return Err("tensors_path must be set in the config".into());
    }

    let raw = fs::read_to_string(&config.tensors_path)?;
    let tensors: RecordedTensors = serde_json::from_str(&raw)?;
    let image_size = ImageSize::new(config.image_width, config.image_height);
    let output_path = config.output_path.clone();

    let predictor = ReplayPredictor {
        output: RawOutput {
            locations: tensors.locations,
            scores: tensors.scores,
        },
    };
    let pipeline = DetectionPipeline::new(predictor, config.detection_config())?;
    let (width, height) = pipeline.input_size();
    let detections = pipeline.predict(&InputBuffer::blank(width, height, 0), image_size)?;
    tracing::info!(count = detections.len(), "decoded detections");

    let output = Output {
        image_width: image_size.width,
        image_height: image_size.height,
        detections: detections.into_iter().map(DetectionRecord::from).collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
