//! Row-major 2D views over flat `f32` model outputs.
//!
//! The detector emits one row per anchor: four encoded offsets for the
//! location tensor and one logit per class for the score tensor. Rows are
//! contiguous and the row width is explicit, so a flat buffer with `n * cols`
//! elements is a tensor of shape `[n, cols]`. Zero rows is a valid shape.

use crate::util::{SsdOcrError, SsdOcrResult};

/// Width of a location row: `[dx, dy, dw, dh]`.
pub const LOCATION_COLS: usize = 4;

/// Borrowed `[rows, cols]` view into a contiguous row-major buffer.
#[derive(Copy, Clone, Debug)]
pub struct TensorView<'a> {
    data: &'a [f32],
    rows: usize,
    cols: usize,
}

impl<'a> TensorView<'a> {
    /// Creates a view whose row count is inferred from the buffer length.
    pub fn new(data: &'a [f32], cols: usize) -> SsdOcrResult<Self> {
        if cols == 0 || data.len() % cols != 0 {
            return Err(SsdOcrError::InvalidTensorShape {
                len: data.len(),
                cols,
            });
        }
        Ok(Self {
            data,
            rows: data.len() / cols,
            cols,
        })
    }

    /// Creates a location view with four offsets per anchor.
    pub fn locations(data: &'a [f32]) -> SsdOcrResult<Self> {
        Self::new(data, LOCATION_COLS)
    }

    /// Returns the number of rows (anchors).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the row width.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns true when the view has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Returns the backing slice.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns row `index` if it is within bounds.
    pub fn row(&self, index: usize) -> Option<&'a [f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.cols;
        self.data.get(start..start + self.cols)
    }

    /// Returns the element at `(row, col)` if it is within bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if col >= self.cols {
            return None;
        }
        self.row(row).map(|r| r[col])
    }

    /// Iterates over rows in order.
    pub fn iter_rows(&self) -> std::slice::ChunksExact<'a, f32> {
        self.data.chunks_exact(self.cols)
    }
}

/// Owned contiguous `[rows, cols]` tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
}

impl Tensor {
    /// Wraps a flat buffer, inferring the row count.
    pub fn new(data: Vec<f32>, cols: usize) -> SsdOcrResult<Self> {
        let rows = TensorView::new(&data, cols)?.rows();
        Ok(Self { data, rows, cols })
    }

    /// Allocates a zero-filled tensor.
    pub(crate) fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Returns a borrowed view.
    pub fn view(&self) -> TensorView<'_> {
        TensorView {
            data: &self.data,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Returns the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the row width.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the backing data in row-major order.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the tensor and returns its buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}
