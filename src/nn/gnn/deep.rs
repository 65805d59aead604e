use serde::{Deserialize, Serialize};

use super::{check_node_features, EdgeIndex, GENConv, GraphModule};
use crate::error::Result;
use crate::nn::{Dropout, LayerNorm, Module, ReLU};
use crate::tensor::Tensor;

/// Skip-connection style of a [`DeepGCNLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeepBlock {
    /// Pre-activation residual: `x + conv(dropout(act(norm(x))))`
    #[default]
    #[serde(rename = "res+")]
    ResPlus,
    /// `x + act(norm(conv(x)))`
    Res,
    /// `concat(x, act(norm(conv(x))))`
    Dense,
    /// `act(norm(conv(x)))`
    Plain,
}

/// DeepGCN block (Li et al., 2020) around a [`GENConv`].
///
/// Norm and activation are optional. Dropout is applied before the
/// convolution for [`DeepBlock::ResPlus`] and after the skip connection for
/// every other block.
pub struct DeepGCNLayer {
    conv: GENConv,
    norm: Option<LayerNorm>,
    act: Option<ReLU>,
    dropout: Dropout,
    block: DeepBlock,
    ckpt_grad: bool,
    training: bool,
}

impl DeepGCNLayer {
    /// Wrap `conv` with the given parts.
    ///
    /// # Panics
    ///
    /// Panics if `dropout` is outside `[0, 1)`.
    #[must_use]
    pub fn new(
        conv: GENConv,
        norm: Option<LayerNorm>,
        act: Option<ReLU>,
        block: DeepBlock,
        dropout: f32,
        seed: Option<u64>,
    ) -> Self {
        Self {
            conv,
            norm,
            act,
            dropout: Dropout::with_optional_seed(dropout, seed),
            block,
            ckpt_grad: false,
            training: true,
        }
    }

    /// Mark the convolution for gradient checkpointing.
    ///
    /// Forward outputs are unaffected.
    #[must_use]
    pub fn with_ckpt_grad(mut self, ckpt_grad: bool) -> Self {
        self.ckpt_grad = ckpt_grad;
        self
    }

    /// The wrapped convolution.
    #[must_use]
    pub fn conv(&self) -> &GENConv {
        &self.conv
    }

    /// The normalization layer, if any.
    #[must_use]
    pub fn norm(&self) -> Option<&LayerNorm> {
        self.norm.as_ref()
    }

    /// The activation, if any.
    #[must_use]
    pub fn act(&self) -> Option<&ReLU> {
        self.act.as_ref()
    }

    /// Block style.
    #[must_use]
    pub fn block(&self) -> DeepBlock {
        self.block
    }

    /// Dropout probability.
    #[must_use]
    pub fn dropout(&self) -> f32 {
        self.dropout.probability()
    }

    /// Whether checkpointing was requested.
    #[must_use]
    pub fn ckpt_grad(&self) -> bool {
        self.ckpt_grad
    }

    /// `act(norm(x))` with missing parts skipped.
    #[must_use]
    pub fn norm_act(&self, x: &Tensor) -> Tensor {
        let x = match &self.norm {
            Some(norm) => norm.forward(x),
            None => x.clone(),
        };
        match &self.act {
            Some(act) => act.forward(&x),
            None => x,
        }
    }
}

impl GraphModule for DeepGCNLayer {
    fn forward(&self, x: &Tensor, edges: &EdgeIndex) -> Result<Tensor> {
        // Pre-activation blocks touch the norm before the conv sees `x`.
        check_node_features(x, edges, self.conv.in_features())?;
        match self.block {
            DeepBlock::ResPlus => {
                let h = self.dropout.forward(&self.norm_act(x));
                let h = self.conv.forward(&h, edges)?;
                Ok(x.add(&h))
            }
            DeepBlock::Res => {
                let h = self.norm_act(&self.conv.forward(x, edges)?);
                Ok(self.dropout.forward(&x.add(&h)))
            }
            DeepBlock::Dense => {
                let h = self.norm_act(&self.conv.forward(x, edges)?);
                Ok(self.dropout.forward(&x.concat_cols(&h)))
            }
            DeepBlock::Plain => {
                let h = self.norm_act(&self.conv.forward(x, edges)?);
                Ok(self.dropout.forward(&h))
            }
        }
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut p = self.conv.parameters();
        if let Some(norm) = &self.norm {
            p.extend(norm.parameters());
        }
        p
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut p = self.conv.parameters_mut();
        if let Some(norm) = self.norm.as_mut() {
            p.extend(norm.parameters_mut());
        }
        p
    }

    fn train(&mut self) {
        self.training = true;
        self.conv.train();
        self.dropout.train();
    }

    fn eval(&mut self) {
        self.training = false;
        self.conv.eval();
        self.dropout.eval();
    }

    fn training(&self) -> bool {
        self.training
    }
}

impl std::fmt::Debug for DeepGCNLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepGCNLayer")
            .field("block", &self.block)
            .field("conv", &self.conv)
            .field("dropout", &self.dropout.probability())
            .field("ckpt_grad", &self.ckpt_grad)
            .finish()
    }
}
