//! Box representations and overlap measures.
//!
//! Decoded boxes live in normalized image fractions until the pipeline scales
//! them to pixels.

pub mod codec;

pub use codec::{decode, encode, to_corner_form, Variances};

/// Box given by its center and size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CenterBox {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
}

impl CenterBox {
    /// Converts to `(xmin, ymin, xmax, ymax)` form.
    pub fn to_corner_form(self) -> CornerBox {
        to_corner_form(self)
    }
}

/// Axis-aligned box given by its minimum and maximum corners.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CornerBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl CornerBox {
    /// Creates a box from its corners.
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Returns the area, treating inverted extents as empty.
    pub fn area(&self) -> f32 {
        (self.x_max - self.x_min).max(0.0) * (self.y_max - self.y_min).max(0.0)
    }

    /// Returns true if every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.x_min.is_finite()
            && self.y_min.is_finite()
            && self.x_max.is_finite()
            && self.y_max.is_finite()
    }

    /// Converts back to center form.
    pub fn to_center_form(self) -> CenterBox {
        CenterBox {
            cx: (self.x_min + self.x_max) / 2.0,
            cy: (self.y_min + self.y_max) / 2.0,
            w: self.x_max - self.x_min,
            h: self.y_max - self.y_min,
        }
    }

    /// Returns the coordinates as `[x_min, y_min, x_max, y_max]`.
    pub fn to_array(self) -> [f32; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }
}

/// Intersection over union of two corner-form boxes, in [0, 1].
///
/// Boxes without area have IoU 0 with everything except an identical box.
/// Non-finite input yields NaN, which callers treat as "no overlap".
pub fn iou(a: &CornerBox, b: &CornerBox) -> f32 {
    if !a.is_finite() || !b.is_finite() {
        return f32::NAN;
    }
    let overlap = CornerBox {
        x_min: a.x_min.max(b.x_min),
        y_min: a.y_min.max(b.y_min),
        x_max: a.x_max.min(b.x_max),
        y_max: a.y_max.min(b.y_max),
    };
    let intersection = overlap.area();
    let union = a.area() + b.area() - intersection;
    if union > 0.0 {
        (intersection / union).clamp(0.0, 1.0)
    } else if a == b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{iou, CornerBox};

    #[test]
    fn iou_of_shifted_squares() {
        let a = CornerBox::new(0.0, 0.0, 10.0, 10.0);
        let b = CornerBox::new(1.0, 1.0, 11.0, 11.0);
        let expected = 81.0 / 119.0;
        assert!((iou(&a, &b) - expected).abs() < 1e-6);
        assert!((iou(&b, &a) - expected).abs() < 1e-6);
    }

    #[test]
    fn iou_of_disjoint_and_identical_boxes() {
        let a = CornerBox::new(0.0, 0.0, 1.0, 1.0);
        let b = CornerBox::new(2.0, 2.0, 3.0, 3.0);
        assert_eq!(iou(&a, &b), 0.0);
        assert_eq!(iou(&a, &a), 1.0);
    }

    #[test]
    fn zero_area_boxes() {
        let point = CornerBox::new(0.5, 0.5, 0.5, 0.5);
        let other = CornerBox::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(iou(&point, &other), 0.0);
        assert_eq!(iou(&point, &point), 1.0);
        let inverted = CornerBox::new(1.0, 1.0, 0.0, 0.0);
        assert_eq!(inverted.area(), 0.0);
        assert_eq!(iou(&inverted, &other), 0.0);
    }

    #[test]
    fn nan_coordinates_give_nan_iou() {
        let bad = CornerBox::new(f32::NAN, 0.0, 1.0, 1.0);
        let good = CornerBox::new(0.0, 0.0, 1.0, 1.0);
        assert!(!bad.is_finite());
        assert!(iou(&bad, &good).is_nan());
        assert!(iou(&good, &bad).is_nan());
    }
}
