use super::*;

/// Graph-mode layer normalization.
///
/// Treats a whole node feature matrix `[num_nodes, features]` as one sample:
/// the mean and population standard deviation are taken over every node and
/// channel, then a per-channel affine transform is applied.
///
/// ```text
/// y = (x - mean(X)) / (std(X) + eps) * gamma + beta
/// ```
#[derive(Debug)]
pub struct GraphLayerNorm {
    features: usize,
    eps: f32,
    weight: Tensor,
    bias: Tensor,
}

impl GraphLayerNorm {
    /// Create a new graph-mode layer norm over `features` channels.
    #[must_use]
    pub fn new(features: usize) -> Self {
        Self {
            features,
            eps: 1e-5,
            weight: constant(&[features], 1.0),
            bias: zeros(&[features]),
        }
    }
}

impl Module for GraphLayerNorm {
    fn forward(&self, input: &Tensor) -> Tensor {
        assert_eq!(input.ndim(), 2, "GraphLayerNorm expects [nodes, features]");
        assert_eq!(
            input.dim(1),
            self.features,
            "GraphLayerNorm expected {} features, got {}",
            self.features,
            input.dim(1)
        );

        let mean = input.mean();
        let centered = input.map(|v| v - mean);
        let var = centered.data().iter().map(|v| v * v).sum::<f32>() / centered.numel().max(1) as f32;
        let denom = var.sqrt() + self.eps;

        centered
            .map(|v| v / denom)
            .mul(&self.broadcast_rows(&self.weight, input.dim(0)))
            .broadcast_add(&self.bias)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.weight, &self.bias]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weight, &mut self.bias]
    }
}

impl GraphLayerNorm {
    fn broadcast_rows(&self, v: &Tensor, rows: usize) -> Tensor {
        let mut data = Vec::with_capacity(rows * self.features);
        for _ in 0..rows {
            data.extend_from_slice(v.data());
        }
        Tensor::new(&data, &[rows, self.features])
    }
}

/// Running statistics tracked by [`BatchNorm1d`].
#[derive(Debug, Clone)]
struct RunningStats {
    mean: Vec<f32>,
    var: Vec<f32>,
}

/// Batch Normalization over nodes (Ioffe & Szegedy, 2015).
///
/// In training mode each channel is normalized with the statistics of the
/// current node set and the running statistics are updated with `momentum`.
/// In evaluation mode the running statistics are used.
#[derive(Debug)]
pub struct BatchNorm1d {
    num_features: usize,
    eps: f32,
    momentum: f32,
    weight: Tensor,
    bias: Tensor,
    running: Mutex<RunningStats>,
    training: bool,
}

impl BatchNorm1d {
    /// Create a new `BatchNorm1d` layer.
    #[must_use]
    pub fn new(num_features: usize) -> Self {
        Self {
            num_features,
            eps: 1e-5,
            momentum: 0.1,
            weight: constant(&[num_features], 1.0),
            bias: zeros(&[num_features]),
            running: Mutex::new(RunningStats {
                mean: vec![0.0; num_features],
                var: vec![1.0; num_features],
            }),
            training: true,
        }
    }

    /// Set momentum for running statistics update.
    #[must_use]
    pub fn with_momentum(mut self, momentum: f32) -> Self {
        self.momentum = momentum;
        self
    }

    /// Snapshot of the running mean.
    #[must_use]
    pub fn running_mean(&self) -> Vec<f32> {
        self.running.lock().expect("BatchNorm stats lock poisoned").mean.clone()
    }

    /// Snapshot of the running variance.
    #[must_use]
    pub fn running_var(&self) -> Vec<f32> {
        self.running.lock().expect("BatchNorm stats lock poisoned").var.clone()
    }

    fn batch_stats(&self, input: &Tensor) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
        let (rows, f) = (input.dim(0), self.num_features);
        let data = input.data();
        let mut mean = vec![0.0f32; f];
        for r in 0..rows {
            for c in 0..f {
                mean[c] += data[r * f + c];
            }
        }
        for m in &mut mean {
            *m /= rows.max(1) as f32;
        }

        let mut sq = vec![0.0f32; f];
        for r in 0..rows {
            for c in 0..f {
                sq[c] += (data[r * f + c] - mean[c]).powi(2);
            }
        }
        let biased: Vec<f32> = sq.iter().map(|s| s / rows.max(1) as f32).collect();
        let unbiased: Vec<f32> = if rows > 1 {
            sq.iter().map(|s| s / (rows - 1) as f32).collect()
        } else {
            biased.clone()
        };
        (mean, biased, unbiased)
    }
}

impl Module for BatchNorm1d {
    fn forward(&self, input: &Tensor) -> Tensor {
        assert_eq!(input.ndim(), 2, "BatchNorm1d expects [nodes, features]");
        assert_eq!(
            input.dim(1),
            self.num_features,
            "Expected {} features, got {}",
            self.num_features,
            input.dim(1)
        );

        let (mean, var) = if self.training {
            let (mean, biased, unbiased) = self.batch_stats(input);
            let mut running = self.running.lock().expect("BatchNorm stats lock poisoned");
            for c in 0..self.num_features {
                running.mean[c] = (1.0 - self.momentum) * running.mean[c] + self.momentum * mean[c];
                running.var[c] = (1.0 - self.momentum) * running.var[c] + self.momentum * unbiased[c];
            }
            (mean, biased)
        } else {
            let running = self.running.lock().expect("BatchNorm stats lock poisoned");
            (running.mean.clone(), running.var.clone())
        };

        let f = self.num_features;
        let (gamma, beta) = (self.weight.data(), self.bias.data());
        let mut out = input.data().to_vec();
        for (i, v) in out.iter_mut().enumerate() {
            let c = i % f;
            *v = (*v - mean[c]) / (var[c] + self.eps).sqrt() * gamma[c] + beta[c];
        }
        Tensor::new(&out, input.shape())
    }

    fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.weight, &self.bias]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weight, &mut self.bias]
    }

    fn train(&mut self) {
        self.training = true;
    }

    fn eval(&mut self) {
        self.training = false;
    }

    fn training(&self) -> bool {
        self.training
    }
}
