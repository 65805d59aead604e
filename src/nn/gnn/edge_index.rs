use crate::error::{GraphNetsError, Result};

/// Directed edge list in COO format.
///
/// Messages flow from `source` to `target`. Undirected graphs list each edge
/// in both directions. Weights default to `1.0`.
///
/// # Example
/// ```
/// use graphnets::nn::gnn::EdgeIndex;
///
/// let edges = EdgeIndex::from_edge_index(&[[0, 1], [1, 2], [2, 0]], 3);
/// assert_eq!(edges.num_nodes(), 3);
/// assert_eq!(edges.num_edges(), 3);
/// assert_eq!(edges.in_degrees(), vec![1.0, 1.0, 1.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeIndex {
    num_nodes: usize,
    src: Vec<usize>,
    tgt: Vec<usize>,
    weights: Option<Vec<f32>>,
}

impl EdgeIndex {
    /// Create an edge index from `[source, target]` pairs.
    #[must_use]
    pub fn from_edge_index(edges: &[[usize; 2]], num_nodes: usize) -> Self {
        Self {
            num_nodes,
            src: edges.iter().map(|e| e[0]).collect(),
            tgt: edges.iter().map(|e| e[1]).collect(),
            weights: None,
        }
    }

    /// Create an edge index from separate source and target vectors.
    pub fn from_coo(src: Vec<usize>, tgt: Vec<usize>, num_nodes: usize) -> Result<Self> {
        if src.len() != tgt.len() {
            return Err(GraphNetsError::dimension_mismatch(
                "edge targets",
                src.len(),
                tgt.len(),
            ));
        }
        Ok(Self {
            num_nodes,
            src,
            tgt,
            weights: None,
        })
    }

    /// Attach per-edge weights.
    pub fn with_weights(mut self, weights: Vec<f32>) -> Result<Self> {
        if weights.len() != self.src.len() {
            return Err(GraphNetsError::dimension_mismatch(
                "edge weights",
                self.src.len(),
                weights.len(),
            ));
        }
        self.weights = Some(weights);
        Ok(self)
    }

    /// Check that every endpoint refers to an existing node.
    pub fn validate(&self) -> Result<()> {
        if let Some(&bad) = self
            .src
            .iter()
            .chain(&self.tgt)
            .find(|&&n| n >= self.num_nodes)
        {
            return Err(GraphNetsError::IndexOutOfBounds {
                index: bad,
                len: self.num_nodes,
            });
        }
        Ok(())
    }

    /// Number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.src.len()
    }

    /// Edge sources.
    #[must_use]
    pub fn sources(&self) -> &[usize] {
        &self.src
    }

    /// Edge targets.
    #[must_use]
    pub fn targets(&self) -> &[usize] {
        &self.tgt
    }

    /// Weight of edge `e` (1.0 when unweighted).
    #[must_use]
    pub fn weight(&self, e: usize) -> f32 {
        self.weights
            .as_ref()
            .and_then(|w| w.get(e).copied())
            .unwrap_or(1.0)
    }

    /// Iterate `(source, target, weight)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        self.src
            .iter()
            .zip(&self.tgt)
            .enumerate()
            .map(|(e, (&s, &t))| (s, t, self.weight(e)))
    }

    /// Add a self-loop with weight `fill` to every node that lacks one.
    ///
    /// Existing self-loops keep their weight.
    #[must_use]
    pub fn add_remaining_self_loops(&self, fill: f32) -> Self {
        let mut has_loop = vec![false; self.num_nodes];
        for (&s, &t) in self.src.iter().zip(&self.tgt) {
            if s == t && s < self.num_nodes {
                has_loop[s] = true;
            }
        }

        let mut out = self.clone();
        let mut weights = self.weights.clone();
        for node in (0..self.num_nodes).filter(|&n| !has_loop[n]) {
            out.src.push(node);
            out.tgt.push(node);
            if let Some(w) = weights.as_mut() {
                w.push(fill);
            }
        }

        // Unweighted graphs only need explicit weights when the fill differs
        if weights.is_none() && fill != 1.0 {
            let mut w = vec![1.0; self.num_edges()];
            w.resize(out.num_edges(), fill);
            weights = Some(w);
        }
        out.weights = weights;
        out
    }

    /// Drop every edge whose source equals its target.
    #[must_use]
    pub fn remove_self_loops(&self) -> Self {
        let keep: Vec<usize> = (0..self.num_edges())
            .filter(|&e| self.src[e] != self.tgt[e])
            .collect();
        Self {
            num_nodes: self.num_nodes,
            src: keep.iter().map(|&e| self.src[e]).collect(),
            tgt: keep.iter().map(|&e| self.tgt[e]).collect(),
            weights: self
                .weights
                .as_ref()
                .map(|w| keep.iter().map(|&e| w[e]).collect()),
        }
    }

    /// Whether any edge is a self-loop.
    #[must_use]
    pub fn has_self_loops(&self) -> bool {
        self.src.iter().zip(&self.tgt).any(|(s, t)| s == t)
    }

    /// Weighted in-degree of each node (sum over incoming edges).
    #[must_use]
    pub fn in_degrees(&self) -> Vec<f32> {
        let mut degrees = vec![0.0f32; self.num_nodes];
        for (_, t, w) in self.iter() {
            if t < self.num_nodes {
                degrees[t] += w;
            }
        }
        degrees
    }

    /// Weighted out-degree of each node (sum over outgoing edges).
    #[must_use]
    pub fn out_degrees(&self) -> Vec<f32> {
        let mut degrees = vec![0.0f32; self.num_nodes];
        for (s, _, w) in self.iter() {
            if s < self.num_nodes {
                degrees[s] += w;
            }
        }
        degrees
    }

    /// Targets reachable from `node` over one outgoing edge.
    #[must_use]
    pub fn neighbors(&self, node: usize) -> Vec<usize> {
        self.src
            .iter()
            .zip(&self.tgt)
            .filter(|(&s, _)| s == node)
            .map(|(_, &t)| t)
            .collect()
    }

    /// Undirected ring over `num_nodes` nodes (both directions per edge).
    #[must_use]
    pub fn ring(num_nodes: usize) -> Self {
        let mut edges = Vec::with_capacity(num_nodes * 2);
        if num_nodes > 1 {
            for i in 0..num_nodes {
                let j = (i + 1) % num_nodes;
                if num_nodes == 2 && i == 1 {
                    break;
                }
                edges.push([i, j]);
                edges.push([j, i]);
            }
        }
        Self::from_edge_index(&edges, num_nodes)
    }
}
