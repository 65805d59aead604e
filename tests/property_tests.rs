//! Property-based tests using proptest.
//!
//! These tests verify invariants of the graph layers and models.

use graphnets::nn::gnn::{ChebConv, GCNConv, GConvGRU, GENConv, GenAggregation, GenConvOptions};
use graphnets::nn::{Dropout, NormKind};
use graphnets::prelude::*;
use proptest::prelude::*;

// Strategy for node feature matrices
fn features_strategy(nodes: usize, cols: usize) -> impl Strategy<Value = Tensor> {
    proptest::collection::vec(-5.0f32..5.0, nodes * cols)
        .prop_map(move |data| Tensor::new(&data, &[nodes, cols]))
}

// Strategy for random directed edge lists over `nodes` nodes
fn edges_strategy(nodes: usize) -> impl Strategy<Value = EdgeIndex> {
    proptest::collection::vec((0..nodes, 0..nodes), 0..(nodes * 3)).prop_map(move |pairs| {
        let edges: Vec<[usize; 2]> = pairs.into_iter().map(|(s, t)| [s, t]).collect();
        EdgeIndex::from_edge_index(&edges, nodes)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn self_loops_cover_every_node(edges in edges_strategy(6)) {
        let looped = edges.add_remaining_self_loops(1.0);
        let mut seen = [false; 6];
        for (s, t, _) in looped.iter() {
            if s == t {
                seen[s] = true;
            }
        }
        prop_assert!(seen.iter().all(|&b| b));
        prop_assert!(!looped.remove_self_loops().has_self_loops());
    }

    #[test]
    fn gcn_output_shape_and_finite(x in features_strategy(6, 4), edges in edges_strategy(6)) {
        let gcn = GCNConv::with_seed(4, 3, Some(1));
        let out = gcn.forward(&x, &edges).unwrap();
        prop_assert_eq!(out.shape(), &[6, 3]);
        prop_assert!(out.data().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn gcn_is_linear_in_features(x in features_strategy(5, 2), edges in edges_strategy(5), s in -3.0f32..3.0) {
        let gcn = GCNConv::with_seed(2, 2, Some(2)).without_bias();
        let a = gcn.forward(&x.scale(s), &edges).unwrap();
        let b = gcn.forward(&x, &edges).unwrap().scale(s);
        for (u, v) in a.data().iter().zip(b.data()) {
            prop_assert!((u - v).abs() < 1e-3);
        }
    }

    #[test]
    fn cheb_k1_is_graph_independent(x in features_strategy(5, 3), e1 in edges_strategy(5), e2 in edges_strategy(5)) {
        let conv = ChebConv::with_seed(3, 2, 1, Some(3));
        prop_assert_eq!(conv.forward(&x, &e1).unwrap(), conv.forward(&x, &e2).unwrap());
    }

    #[test]
    fn gru_state_is_bounded(x in features_strategy(5, 2), edges in edges_strategy(5), steps in 1usize..5) {
        let cell = GConvGRU::with_seed(2, 3, 2, Some(4));
        let mut h: Option<Tensor> = None;
        for _ in 0..steps {
            h = Some(cell.forward_step(&x, &edges, h.as_ref()).unwrap());
        }
        let h = h.unwrap();
        // Convex combination of the previous state and a tanh candidate
        prop_assert!(h.data().iter().all(|v| v.abs() <= 1.0));
    }

    #[test]
    fn gen_conv_aggregations_are_finite(x in features_strategy(5, 2), edges in edges_strategy(5)) {
        let options = |aggregation| GenConvOptions {
            aggregation,
            norm: NormKind::None,
            ..GenConvOptions::default()
        };
        let out = |aggregation| {
            GENConv::with_options(2, 2, options(aggregation), Some(5))
                .forward(&x, &edges)
                .unwrap()
        };
        let soft = out(GenAggregation::Softmax { t: 1.0, learn_t: false });
        let mean = out(GenAggregation::Mean);
        let max = out(GenAggregation::Max);
        prop_assert_eq!(soft.shape(), mean.shape());
        prop_assert_eq!(soft.shape(), max.shape());
        for agg in [&soft, &mean, &max] {
            prop_assert!(agg.data().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn dropout_keeps_or_scales(p in 0.05f32..0.9, seed in any::<u64>()) {
        let dropout = Dropout::with_seed(p, seed);
        let x = Tensor::ones(&[8, 8]);
        let out = dropout.forward(&x);
        let scale = 1.0 / (1.0 - p);
        for &v in out.data() {
            prop_assert!(v == 0.0 || (v - scale).abs() < 1e-3);
        }
    }

    #[test]
    fn recurrent_output_shape(steps in 1usize..4, nodes in 2usize..6) {
        let model = RecurrentGCN::with_seed(2, 2, Some(8));
        let xs = vec![Tensor::ones(&[nodes, 2]); steps];
        let out = model.forward(&xs, &EdgeIndex::ring(nodes)).unwrap();
        prop_assert_eq!(out.shape(), &[steps, nodes, 2]);
    }
}
