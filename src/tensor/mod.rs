//! Dense tensor storage for node features and layer parameters.
//!
//! Graph layers in this crate operate on row-major `f32` tensors. A node
//! feature matrix is a 2-D tensor `[num_nodes, features]`; a stacked
//! prediction sequence is 3-D `[time, num_nodes, features]`.
//!
//! Storage is a flat `Vec<f32>`; the dense algebra (matmul, transpose,
//! element-wise and broadcast ops, concatenation) runs on `ndarray` views
//! over that buffer.

use std::fmt;

use ndarray::{concatenate, Array2, ArrayD, ArrayView2, ArrayViewD, Axis, IxDyn, Zip};

use crate::error::{GraphNetsError, Result};

/// A dense, row-major `f32` tensor.
///
/// # Example
///
/// ```
/// use graphnets::tensor::Tensor;
///
/// let x = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
/// assert_eq!(x.shape(), &[2, 2]);
/// assert_eq!(x.row(1), &[3.0, 4.0]);
/// ```
#[derive(Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    shape: Vec<usize>,
}

impl Tensor {
    /// Create a new tensor from a slice with the given shape.
    ///
    /// # Panics
    ///
    /// Panics if the data length doesn't match the product of shape dimensions.
    #[must_use]
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        let expected_len: usize = shape.iter().product();
        assert_eq!(
            data.len(),
            expected_len,
            "Data length {} doesn't match shape {:?} (expected {})",
            data.len(),
            shape,
            expected_len
        );

        Self {
            data: data.to_vec(),
            shape: shape.to_vec(),
        }
    }

    /// Create a tensor from owned data, reporting a length mismatch as an error.
    pub fn from_vec(data: Vec<f32>, shape: &[usize]) -> Result<Self> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(GraphNetsError::dimension_mismatch(
                "tensor elements",
                expected_len,
                data.len(),
            ));
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
        })
    }

    /// Create a 1-D tensor from a slice.
    #[must_use]
    pub fn from_slice(data: &[f32]) -> Self {
        Self::new(data, &[data.len()])
    }

    /// Create a tensor filled with `value`.
    #[must_use]
    pub fn full(shape: &[usize], value: f32) -> Self {
        let len: usize = shape.iter().product();
        Self {
            data: vec![value; len],
            shape: shape.to_vec(),
        }
    }

    /// Create a tensor filled with zeros.
    #[must_use]
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, 0.0)
    }

    /// Create a tensor filled with ones.
    #[must_use]
    pub fn ones(shape: &[usize]) -> Self {
        Self::full(shape, 1.0)
    }

    /// Create a zero tensor with the same shape as `other`.
    #[must_use]
    pub fn zeros_like(other: &Tensor) -> Self {
        Self::zeros(&other.shape)
    }

    /// Shape of the tensor.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Size of dimension `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= ndim()`.
    #[must_use]
    pub fn dim(&self, axis: usize) -> usize {
        self.shape[axis]
    }

    /// Total number of elements.
    #[must_use]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Underlying data.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable access to the underlying data.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume the tensor and return its data.
    #[must_use]
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Row `i` of a 2-D tensor (or the `i`-th slice along axis 0 otherwise).
    #[must_use]
    pub fn row(&self, i: usize) -> &[f32] {
        let width = self.numel() / self.shape[0].max(1);
        &self.data[i * width..(i + 1) * width]
    }

    /// Borrow the tensor as an n-dimensional `ndarray` view.
    #[must_use]
    pub fn as_array(&self) -> ArrayViewD<'_, f32> {
        ArrayViewD::from_shape(IxDyn(&self.shape), &self.data)
            .expect("tensor length matches its shape")
    }

    fn as_matrix(&self) -> ArrayView2<'_, f32> {
        ArrayView2::from_shape((self.shape[0], self.shape[1]), &self.data)
            .expect("valid matrix dimensions")
    }

    /// Build a tensor from an owned `ndarray` array in any memory layout.
    #[must_use]
    pub fn from_array(array: ArrayD<f32>) -> Self {
        let shape = array.shape().to_vec();
        let data = if array.is_standard_layout() {
            array.into_raw_vec()
        } else {
            array.iter().copied().collect()
        };
        Self { data, shape }
    }

    /// Reshape to `shape` (same element count).
    ///
    /// # Panics
    ///
    /// Panics if the element count differs.
    #[must_use]
    pub fn view(&self, shape: &[usize]) -> Tensor {
        Tensor::new(&self.data, shape)
    }

    /// Matrix product of two 2-D tensors: `[m, k] x [k, n] -> [m, n]`.
    ///
    /// # Panics
    ///
    /// Panics if either operand is not 2-D or the inner dimensions differ.
    #[must_use]
    pub fn matmul(&self, other: &Tensor) -> Tensor {
        assert!(
            self.ndim() == 2 && other.ndim() == 2,
            "matmul expects 2D tensors, got {:?} and {:?}",
            self.shape,
            other.shape
        );
        let (k, k2) = (self.shape[1], other.shape[0]);
        assert_eq!(k, k2, "matmul inner dimensions differ: {k} vs {k2}");

        Tensor::from(self.as_matrix().dot(&other.as_matrix()))
    }

    /// Transpose of a 2-D tensor.
    #[must_use]
    pub fn transpose(&self) -> Tensor {
        assert_eq!(self.ndim(), 2, "transpose expects a 2D tensor");
        Tensor::from(self.as_matrix().t().to_owned())
    }

    fn zip_with(&self, other: &Tensor, op: impl Fn(f32, f32) -> f32) -> Tensor {
        assert_eq!(
            self.shape, other.shape,
            "element-wise operands differ in shape"
        );
        let out = Zip::from(&self.as_array())
            .and(&other.as_array())
            .map_collect(|&a, &b| op(a, b));
        Tensor::from_array(out)
    }

    /// Element-wise sum.
    #[must_use]
    pub fn add(&self, other: &Tensor) -> Tensor {
        self.zip_with(other, |a, b| a + b)
    }

    /// Element-wise difference.
    #[must_use]
    pub fn sub(&self, other: &Tensor) -> Tensor {
        self.zip_with(other, |a, b| a - b)
    }

    /// Element-wise (Hadamard) product.
    #[must_use]
    pub fn mul(&self, other: &Tensor) -> Tensor {
        self.zip_with(other, |a, b| a * b)
    }

    /// Multiply every element by `factor`.
    #[must_use]
    pub fn scale(&self, factor: f32) -> Tensor {
        self.map(|v| v * factor)
    }

    /// Apply `f` to every element.
    #[must_use]
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Tensor {
        Tensor {
            data: self.data.iter().map(|&v| f(v)).collect(),
            shape: self.shape.clone(),
        }
    }

    /// Add a 1-D `bias` across the last dimension.
    ///
    /// # Panics
    ///
    /// Panics if `bias` length differs from the last dimension.
    #[must_use]
    pub fn broadcast_add(&self, bias: &Tensor) -> Tensor {
        let width = *self.shape.last().unwrap_or(&0);
        assert_eq!(
            bias.numel(),
            width,
            "bias length {} doesn't match last dimension {}",
            bias.numel(),
            width
        );
        let bias = ArrayViewD::from_shape(IxDyn(&[width]), &bias.data)
            .expect("bias length checked above");
        Tensor::from_array(&self.as_array() + &bias)
    }

    /// Rectified linear unit.
    #[must_use]
    pub fn relu(&self) -> Tensor {
        self.map(|v| v.max(0.0))
    }

    /// Logistic sigmoid.
    #[must_use]
    pub fn sigmoid(&self) -> Tensor {
        self.map(|v| 1.0 / (1.0 + (-v).exp()))
    }

    /// Hyperbolic tangent.
    #[must_use]
    pub fn tanh(&self) -> Tensor {
        self.map(f32::tanh)
    }

    /// `1 - x` element-wise.
    #[must_use]
    pub fn one_minus(&self) -> Tensor {
        self.map(|v| 1.0 - v)
    }

    /// Concatenate two 2-D tensors along the feature axis.
    ///
    /// # Panics
    ///
    /// Panics if the row counts differ.
    #[must_use]
    pub fn concat_cols(&self, other: &Tensor) -> Tensor {
        assert!(self.ndim() == 2 && other.ndim() == 2, "concat_cols expects 2D tensors");
        assert_eq!(self.shape[0], other.shape[0], "concat_cols row counts differ");
        let joined = concatenate(Axis(1), &[self.as_matrix(), other.as_matrix()])
            .expect("row counts checked above");
        Tensor::from(joined)
    }

    /// Stack equally shaped tensors along a new leading axis.
    pub fn stack(tensors: &[Tensor]) -> Result<Tensor> {
        let first = tensors
            .first()
            .ok_or_else(|| GraphNetsError::empty_input("stack requires at least one tensor"))?;

        let mut data = Vec::with_capacity(first.numel() * tensors.len());
        for t in tensors {
            if t.shape != first.shape {
                return Err(GraphNetsError::shape_mismatch("stack", &first.shape, &t.shape));
            }
            data.extend_from_slice(&t.data);
        }

        let mut shape = Vec::with_capacity(first.ndim() + 1);
        shape.push(tensors.len());
        shape.extend_from_slice(&first.shape);
        Ok(Tensor { data, shape })
    }

    /// Sum of all elements.
    #[must_use]
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Mean of all elements (0.0 for an empty tensor).
    #[must_use]
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            0.0
        } else {
            self.sum() / self.data.len() as f32
        }
    }

    /// Smallest element (`+inf` for an empty tensor).
    #[must_use]
    pub fn min(&self) -> f32 {
        self.data.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Largest element (`-inf` for an empty tensor).
    #[must_use]
    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }
}

impl From<Array2<f32>> for Tensor {
    fn from(array: Array2<f32>) -> Self {
        Self::from_array(array.into_dyn())
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("numel", &self.numel())
            .finish_non_exhaustive()
    }
}
