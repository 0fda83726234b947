//! Anchor ("prior") generation for the SSD detector head.
//!
//! Priors are laid out feature map by feature map, then row by row, column by
//! column, and finally box by box within a cell. This order matches the row
//! order of the detector output tensors and must not change.

mod cache;

pub use cache::PriorCache;

use std::ops::Deref;
use std::sync::Arc;

use crate::trace::{trace_event, trace_span};
use crate::util::{SsdOcrError, SsdOcrResult};

/// Anchor box in center form, normalized to image fractions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prior {
    /// Center x in [0, 1].
    pub cx: f32,
    /// Center y in [0, 1].
    pub cy: f32,
    /// Width as a fraction of the input width.
    pub w: f32,
    /// Height as a fraction of the input height.
    pub h: f32,
}

/// One detector feature map and the boxes anchored on each of its cells.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMap {
    /// Number of cells along x.
    pub width: usize,
    /// Number of cells along y.
    pub height: usize,
    /// Input pixels per cell along x.
    pub stride_x: f32,
    /// Input pixels per cell along y.
    pub stride_y: f32,
    /// Side of the smallest square box, in input pixels.
    pub min_size: f32,
    /// Upper box size; the second square box uses `sqrt(min_size * max_size)`.
    pub max_size: f32,
    /// Extra boxes of `min_size` with height/width ratio `ar`.
    pub aspect_ratios: Vec<f32>,
}

impl FeatureMap {
    /// Returns the number of priors anchored on each cell.
    pub fn boxes_per_cell(&self) -> usize {
        2 + self.aspect_ratios.len()
    }

    /// Returns the number of priors generated for this map.
    pub fn num_priors(&self) -> usize {
        self.width * self.height * self.boxes_per_cell()
    }

    fn validate(&self) -> SsdOcrResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SsdOcrError::InvalidConfig {
                reason: "feature map dimensions must be non-zero",
            });
        }
        if !is_positive(self.stride_x) || !is_positive(self.stride_y) {
            return Err(SsdOcrError::InvalidConfig {
                reason: "feature map strides must be positive",
            });
        }
        if !is_positive(self.min_size) || !self.max_size.is_finite() {
            return Err(SsdOcrError::InvalidConfig {
                reason: "box sizes must be positive and finite",
            });
        }
        if self.max_size < self.min_size {
            return Err(SsdOcrError::InvalidConfig {
                reason: "max_size must not be below min_size",
            });
        }
        if !self.aspect_ratios.iter().all(|&ar| is_positive(ar)) {
            return Err(SsdOcrError::InvalidConfig {
                reason: "aspect ratios must be positive",
            });
        }
        Ok(())
    }
}

/// Grid, stride, and box-size table for one input resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct PriorConfig {
    /// Model input width in pixels.
    pub input_width: usize,
    /// Model input height in pixels.
    pub input_height: usize,
    /// Feature maps in output order.
    pub feature_maps: Vec<FeatureMap>,
    /// Clamp every prior coordinate to [0, 1].
    pub clamp: bool,
}

impl PriorConfig {
    /// Table for the 600x375 card digit detector.
    ///
    /// Produces 3420 priors: 38x24 and 19x12 cells with three boxes each.
    pub fn card_ocr() -> Self {
        Self {
            input_width: 600,
            input_height: 375,
            feature_maps: vec![
                FeatureMap {
                    width: 38,
                    height: 24,
                    stride_x: 16.0,
                    stride_y: 16.0,
                    min_size: 14.0,
                    max_size: 30.0,
                    aspect_ratios: vec![3.0],
                },
                FeatureMap {
                    width: 19,
                    height: 12,
                    stride_x: 31.0,
                    stride_y: 31.0,
                    min_size: 30.0,
                    max_size: 45.0,
                    aspect_ratios: vec![3.0],
                },
            ],
            clamp: true,
        }
    }

    /// Returns the total number of priors this config generates.
    pub fn num_priors(&self) -> usize {
        self.feature_maps.iter().map(FeatureMap::num_priors).sum()
    }

    /// Checks the table for values that would yield meaningless priors.
    ///
    /// An empty feature map list is accepted and yields zero priors.
    pub fn validate(&self) -> SsdOcrResult<()> {
        if self.input_width == 0 || self.input_height == 0 {
            return Err(SsdOcrError::InvalidConfig {
                reason: "input dimensions must be non-zero",
            });
        }
        for map in &self.feature_maps {
            map.validate()?;
        }
        Ok(())
    }
}

impl Default for PriorConfig {
    fn default() -> Self {
        Self::card_ocr()
    }
}

/// Immutable, cheaply clonable ordered set of priors.
#[derive(Clone, Debug, PartialEq)]
pub struct PriorSet {
    priors: Arc<[Prior]>,
}

impl PriorSet {
    /// Wraps an explicit prior list, e.g. one exported alongside a model.
    pub fn from_vec(priors: Vec<Prior>) -> Self {
        Self {
            priors: priors.into(),
        }
    }

    /// Returns the priors as a slice.
    pub fn as_slice(&self) -> &[Prior] {
        &self.priors
    }

    /// Returns true if both handles share the same allocation.
    pub fn ptr_eq(&self, other: &PriorSet) -> bool {
        Arc::ptr_eq(&self.priors, &other.priors)
    }
}

impl Deref for PriorSet {
    type Target = [Prior];

    fn deref(&self) -> &[Prior] {
        &self.priors
    }
}

/// Generates the prior set for `config`.
pub fn generate_priors(config: &PriorConfig) -> SsdOcrResult<PriorSet> {
    config.validate()?;
    Ok(generate_validated(config))
}

pub(crate) fn generate_validated(config: &PriorConfig) -> PriorSet {
    let _span = trace_span!("priors", maps = config.feature_maps.len()).entered();

    let input_w = config.input_width as f32;
    let input_h = config.input_height as f32;
    let mut priors = Vec::with_capacity(config.num_priors());

    for map in &config.feature_maps {
        let mid_size = (map.min_size * map.max_size).sqrt();
        let mut shapes = Vec::with_capacity(map.boxes_per_cell());
        shapes.push((map.min_size / input_w, map.min_size / input_h));
        shapes.push((mid_size / input_w, mid_size / input_h));
        for &ar in &map.aspect_ratios {
            let ratio = ar.sqrt();
            shapes.push((map.min_size / ratio / input_w, map.min_size * ratio / input_h));
        }

        for j in 0..map.height {
            let cy = (j as f32 + 0.5) * map.stride_y / input_h;
            for i in 0..map.width {
                let cx = (i as f32 + 0.5) * map.stride_x / input_w;
                for &(w, h) in &shapes {
                    let prior = Prior { cx, cy, w, h };
                    priors.push(if config.clamp { clamp_unit(prior) } else { prior });
                }
            }
        }
    }

    trace_event!("priors_generated", count = priors.len());
    PriorSet::from_vec(priors)
}

fn clamp_unit(prior: Prior) -> Prior {
    Prior {
        cx: prior.cx.clamp(0.0, 1.0),
        cy: prior.cy.clamp(0.0, 1.0),
        w: prior.w.clamp(0.0, 1.0),
        h: prior.h.clamp(0.0, 1.0),
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
