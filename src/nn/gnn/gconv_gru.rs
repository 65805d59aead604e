use super::cheb::{ChebConv, ChebNormalization, ScaledLaplacian};
use super::{check_node_features, EdgeIndex, GraphModule};
use crate::error::{GraphNetsError, Result};
use crate::nn::init::derive_seed;
use crate::tensor::Tensor;

/// Graph-convolutional Gated Recurrent Unit (Seo et al., 2018).
///
/// A GRU whose input and hidden transforms are Chebyshev graph convolutions:
///
/// ```text
/// Z  = σ(Cxz(X) + Chz(H))              // update gate
/// R  = σ(Cxr(X) + Chr(H))              // reset gate
/// H~ = tanh(Cxh(X) + Chh(H ⊙ R))       // candidate
/// H' = Z ⊙ H + (1 - Z) ⊙ H~
/// ```
///
/// The hidden state starts at zero when none is given.
///
/// # Example
/// ```
/// use graphnets::nn::gnn::{EdgeIndex, GConvGRU};
/// use graphnets::tensor::Tensor;
///
/// let cell = GConvGRU::with_seed(3, 6, 2, Some(0));
/// let edges = EdgeIndex::ring(4);
/// let x = Tensor::ones(&[4, 3]);
/// let h1 = cell.forward_step(&x, &edges, None).expect("valid input");
/// let h2 = cell.forward_step(&x, &edges, Some(&h1)).expect("valid input");
/// assert_eq!(h2.shape(), &[4, 6]);
/// ```
#[derive(Debug, Clone)]
pub struct GConvGRU {
    in_features: usize,
    out_features: usize,
    k: usize,
    normalization: ChebNormalization,
    conv_x_z: ChebConv,
    conv_h_z: ChebConv,
    conv_x_r: ChebConv,
    conv_h_r: ChebConv,
    conv_x_h: ChebConv,
    conv_h_h: ChebConv,
}

impl GConvGRU {
    /// Create a new cell with Chebyshev filter size `k`.
    ///
    /// # Panics
    ///
    /// Panics if `k == 0`.
    #[must_use]
    pub fn new(in_features: usize, out_features: usize, k: usize) -> Self {
        Self::with_seed(in_features, out_features, k, None)
    }

    /// Create a cell with deterministic initialization.
    #[must_use]
    pub fn with_seed(in_features: usize, out_features: usize, k: usize, seed: Option<u64>) -> Self {
        let conv = |i: u64, fan_in: usize| {
            ChebConv::with_seed(fan_in, out_features, k, derive_seed(seed, i))
        };

        Self {
            in_features,
            out_features,
            k,
            normalization: ChebNormalization::Sym,
            conv_x_z: conv(0, in_features),
            conv_h_z: conv(1, out_features),
            conv_x_r: conv(2, in_features),
            conv_h_r: conv(3, out_features),
            conv_x_h: conv(4, in_features),
            conv_h_h: conv(5, out_features),
        }
    }

    /// Set the Laplacian normalization of all six convolutions.
    #[must_use]
    pub fn with_normalization(mut self, normalization: ChebNormalization) -> Self {
        self.normalization = normalization;
        for conv in self.convs_mut() {
            *conv = conv.clone().with_normalization(normalization);
        }
        self
    }

    /// Input feature dimension.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Hidden state (and output) dimension.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.out_features
    }

    /// Chebyshev filter size.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    fn convs(&self) -> [&ChebConv; 6] {
        [
            &self.conv_x_z,
            &self.conv_h_z,
            &self.conv_x_r,
            &self.conv_h_r,
            &self.conv_x_h,
            &self.conv_h_h,
        ]
    }

    fn convs_mut(&mut self) -> [&mut ChebConv; 6] {
        [
            &mut self.conv_x_z,
            &mut self.conv_h_z,
            &mut self.conv_x_r,
            &mut self.conv_h_r,
            &mut self.conv_x_h,
            &mut self.conv_h_h,
        ]
    }

    /// One recurrent step. Returns the new hidden state `[num_nodes, out]`.
    pub fn forward_step(&self, x: &Tensor, edges: &EdgeIndex, h: Option<&Tensor>) -> Result<Tensor> {
        self.forward_step_with_lambda(x, edges, h, None)
    }

    /// One recurrent step with an explicit largest Laplacian eigenvalue.
    pub fn forward_step_with_lambda(
        &self,
        x: &Tensor,
        edges: &EdgeIndex,
        h: Option<&Tensor>,
        lambda_max: Option<f32>,
    ) -> Result<Tensor> {
        check_node_features(x, edges, self.in_features)?;

        let expected = [x.dim(0), self.out_features];
        let h = match h {
            Some(h) if h.shape() != expected => {
                return Err(GraphNetsError::shape_mismatch("hidden state", &expected, h.shape()))
            }
            Some(h) => h.clone(),
            None => Tensor::zeros(&expected),
        };

        // One Laplacian serves all six convolutions
        let lap = ScaledLaplacian::build(edges, self.normalization, lambda_max)?;

        let z = self
            .conv_x_z
            .propagate(x, &lap)
            .add(&self.conv_h_z.propagate(&h, &lap))
            .sigmoid();
        let r = self
            .conv_x_r
            .propagate(x, &lap)
            .add(&self.conv_h_r.propagate(&h, &lap))
            .sigmoid();
        let h_tilde = self
            .conv_x_h
            .propagate(x, &lap)
            .add(&self.conv_h_h.propagate(&h.mul(&r), &lap))
            .tanh();

        Ok(z.mul(&h).add(&z.one_minus().mul(&h_tilde)))
    }

    /// All learnable parameters.
    #[must_use]
    pub fn parameters(&self) -> Vec<&Tensor> {
        self.convs().into_iter().flat_map(|c| c.parameters()).collect()
    }

    /// Mutable access to all learnable parameters.
    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.convs_mut()
            .into_iter()
            .flat_map(|c| c.parameters_mut())
            .collect()
    }

    /// Total number of learnable scalars.
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.numel()).sum()
    }
}
