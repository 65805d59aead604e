use serde::{Deserialize, Serialize};

use super::{check_node_features, EdgeIndex, GraphModule};
use crate::error::{GraphNetsError, Result};
use crate::nn::init::{derive_seed, xavier_uniform, zeros};
use crate::tensor::Tensor;

/// Graph Laplacian used by [`ChebConv`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChebNormalization {
    /// `L = I - D^(-1/2) A D^(-1/2)`
    #[default]
    Sym,
    /// `L = I - D^(-1) A`
    Rw,
    /// `L = D - A`
    None,
}

/// Scaled Laplacian `L_hat = 2 L / lambda_max - I` stored as off-diagonal
/// edge coefficients plus a dense diagonal.
#[derive(Debug, Clone)]
pub(crate) struct ScaledLaplacian {
    edges: Vec<(usize, usize, f32)>,
    diag: Vec<f32>,
}

impl ScaledLaplacian {
    pub(crate) fn build(
        edges: &EdgeIndex,
        normalization: ChebNormalization,
        lambda_max: Option<f32>,
    ) -> Result<Self> {
        let lambda_max = match (normalization, lambda_max) {
            (_, Some(l)) => l,
            (ChebNormalization::Sym, None) => 2.0,
            (_, None) => {
                return Err(GraphNetsError::invalid_hyperparameter(
                    "lambda_max",
                    "none",
                    "an explicit value when normalization is not sym",
                ))
            }
        };
        if !(lambda_max > 0.0) {
            return Err(GraphNetsError::invalid_hyperparameter(
                "lambda_max",
                lambda_max,
                "lambda_max > 0",
            ));
        }

        let graph = edges.remove_self_loops();
        let deg = graph.out_degrees();
        let scale = 2.0 / lambda_max;
        let inv = |d: f32, p: f32| if d > 0.0 { d.powf(p) } else { 0.0 };

        let scaled: Vec<(usize, usize, f32)> = graph
            .iter()
            .map(|(s, t, w)| {
                let l = match normalization {
                    ChebNormalization::Sym => -inv(deg[s], -0.5) * w * inv(deg[t], -0.5),
                    ChebNormalization::Rw => -inv(deg[s], -1.0) * w,
                    ChebNormalization::None => -w,
                };
                (s, t, scale * l)
            })
            .collect();

        let diag = match normalization {
            ChebNormalization::None => deg.iter().map(|&d| scale * d - 1.0).collect(),
            _ => vec![scale - 1.0; graph.num_nodes()],
        };

        Ok(Self {
            edges: scaled,
            diag,
        })
    }

    /// `L_hat x` for a node feature matrix.
    pub(crate) fn apply(&self, x: &Tensor) -> Tensor {
        let f = x.dim(1);
        let xd = x.data();
        let mut out: Vec<f32> = xd
            .chunks(f.max(1))
            .zip(&self.diag)
            .flat_map(|(row, &d)| row.iter().map(move |&v| d * v))
            .collect();
        out.resize(xd.len(), 0.0);

        for &(s, t, c) in &self.edges {
            if c == 0.0 {
                continue;
            }
            for k in 0..f {
                out[t * f + k] += c * xd[s * f + k];
            }
        }
        Tensor::new(&out, x.shape())
    }
}

/// Chebyshev spectral graph convolution (Defferrard et al., 2016).
///
/// ```text
/// T0 = X,  T1 = L_hat X,  Tk = 2 L_hat T(k-1) - T(k-2)
/// X' = sum_k Tk Wk + b
/// ```
///
/// `K` is the filter size: `K = 1` uses only the node's own features, each
/// further term reaches one more hop.
///
/// # Example
/// ```
/// use graphnets::nn::gnn::{ChebConv, EdgeIndex, GraphModule};
/// use graphnets::tensor::Tensor;
///
/// let conv = ChebConv::with_seed(4, 8, 2, Some(0));
/// let edges = EdgeIndex::ring(5);
/// let out = conv.forward(&Tensor::ones(&[5, 4]), &edges).expect("valid input");
/// assert_eq!(out.shape(), &[5, 8]);
/// ```
#[derive(Debug, Clone)]
pub struct ChebConv {
    in_features: usize,
    out_features: usize,
    /// One weight `[in_features, out_features]` per Chebyshev term
    weights: Vec<Tensor>,
    bias: Option<Tensor>,
    normalization: ChebNormalization,
}

impl ChebConv {
    /// Create a new Chebyshev convolution with `k` terms.
    ///
    /// # Panics
    ///
    /// Panics if `k == 0`.
    #[must_use]
    pub fn new(in_features: usize, out_features: usize, k: usize) -> Self {
        Self::with_seed(in_features, out_features, k, None)
    }

    /// Create a Chebyshev convolution with deterministic initialization.
    #[must_use]
    pub fn with_seed(in_features: usize, out_features: usize, k: usize, seed: Option<u64>) -> Self {
        assert!(k > 0, "ChebConv filter size K must be at least 1");
        let weights = (0..k)
            .map(|i| {
                xavier_uniform(
                    &[in_features, out_features],
                    in_features,
                    out_features,
                    derive_seed(seed, i as u64),
                )
            })
            .collect();

        Self {
            in_features,
            out_features,
            weights,
            bias: Some(zeros(&[out_features])),
            normalization: ChebNormalization::Sym,
        }
    }

    /// Set the Laplacian normalization.
    #[must_use]
    pub fn with_normalization(mut self, normalization: ChebNormalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Disable bias.
    #[must_use]
    pub fn without_bias(mut self) -> Self {
        self.bias = None;
        self
    }

    /// Number of Chebyshev terms.
    #[must_use]
    pub fn k(&self) -> usize {
        self.weights.len()
    }

    /// Input feature dimension.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Output feature dimension.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.out_features
    }

    /// Laplacian normalization.
    #[must_use]
    pub fn normalization(&self) -> ChebNormalization {
        self.normalization
    }

    /// Forward pass with an explicit largest Laplacian eigenvalue.
    pub fn forward_with_lambda(
        &self,
        x: &Tensor,
        edges: &EdgeIndex,
        lambda_max: Option<f32>,
    ) -> Result<Tensor> {
        check_node_features(x, edges, self.in_features)?;
        let laplacian = ScaledLaplacian::build(edges, self.normalization, lambda_max)?;
        Ok(self.propagate(x, &laplacian))
    }

    pub(crate) fn propagate(&self, x: &Tensor, laplacian: &ScaledLaplacian) -> Tensor {
        let mut tx_0 = x.clone();
        let mut out = tx_0.matmul(&self.weights[0]);

        if self.weights.len() > 1 {
            let mut tx_1 = laplacian.apply(x);
            out = out.add(&tx_1.matmul(&self.weights[1]));

            for w in &self.weights[2..] {
                let tx_2 = laplacian.apply(&tx_1).scale(2.0).sub(&tx_0);
                out = out.add(&tx_2.matmul(w));
                tx_0 = tx_1;
                tx_1 = tx_2;
            }
        }

        match &self.bias {
            Some(b) => out.broadcast_add(b),
            None => out,
        }
    }
}

impl GraphModule for ChebConv {
    fn forward(&self, x: &Tensor, edges: &EdgeIndex) -> Result<Tensor> {
        self.forward_with_lambda(x, edges, None)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut p: Vec<&Tensor> = self.weights.iter().collect();
        p.extend(self.bias.as_ref());
        p
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut p: Vec<&mut Tensor> = self.weights.iter_mut().collect();
        p.extend(self.bias.as_mut());
        p
    }
}
