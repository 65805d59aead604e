use super::*;
use crate::nn::gnn::GraphModule;
use crate::nn::Module;

fn snapshots(steps: usize, nodes: usize, features: usize) -> Vec<Tensor> {
    (0..steps)
        .map(|t| {
            let data: Vec<f32> = (0..nodes * features)
                .map(|i| ((i + 7 * t) as f32 * 0.37).sin())
                .collect();
            Tensor::new(&data, &[nodes, features])
        })
        .collect()
}

// ==================== unroll ====================

#[test]
fn test_unroll_threads_hidden_state() {
    let layers = vec![GConvGRU::with_seed(2, 3, 1, Some(1))];
    let edges = EdgeIndex::ring(4);
    let x = snapshots(1, 4, 2).remove(0);
    let steps = vec![x.clone(), x.clone()];

    let out = unroll(&layers, &steps, &edges, Tensor::clone).unwrap();
    assert_eq!(out.shape(), &[2, 4, 3]);

    let h1 = layers[0].forward_step(&x, &edges, None).unwrap();
    let h2 = layers[0].forward_step(&x, &edges, Some(&h1)).unwrap();
    assert_eq!(&out.data()[..12], h1.data());
    assert_eq!(&out.data()[12..], h2.data());
}

#[test]
fn test_unroll_applies_relu_after_first_layer() {
    let layers = vec![
        GConvGRU::with_seed(2, 3, 1, Some(1)),
        GConvGRU::with_seed(3, 3, 1, Some(2)),
    ];
    let out = unroll(&layers, &snapshots(3, 4, 2), &EdgeIndex::ring(4), Tensor::clone).unwrap();
    assert!(out.data().iter().all(|&v| v >= 0.0));
}

#[test]
fn test_unroll_empty_sequence() {
    let layers = vec![GConvGRU::new(2, 3, 1)];
    let err = unroll(&layers, &[], &EdgeIndex::ring(3), Tensor::clone).unwrap_err();
    assert!(matches!(err, GraphNetsError::EmptyInput { .. }));
}

// ==================== RecurrentGCN ====================

#[test]
fn test_recurrent_gcn_layer_widths() {
    let model = RecurrentGCN::new(5, 2);
    let widths: Vec<(usize, usize)> = model
        .layers()
        .iter()
        .map(|l| (l.in_features(), l.out_features()))
        .collect();
    assert_eq!(widths, vec![(5, 256), (256, 128), (128, 64), (64, 32), (32, 2)]);
    assert!(model.layers().iter().all(|l| l.k() == 1));
}

#[test]
fn test_recurrent_gcn_forward_shape() {
    let model = RecurrentGCN::with_seed(3, 2, Some(42));
    let out = model.forward(&snapshots(4, 5, 3), &EdgeIndex::ring(5)).unwrap();
    assert_eq!(out.shape(), &[4, 5, 2]);
    assert!(out.data().iter().all(|&v| v >= 0.0 && v.is_finite()));
}

#[test]
fn test_recurrent_gcn_seeded_is_deterministic() {
    let edges = EdgeIndex::ring(5);
    let xs = snapshots(3, 5, 3);
    let a = RecurrentGCN::with_seed(3, 2, Some(7)).forward(&xs, &edges).unwrap();
    let b = RecurrentGCN::with_seed(3, 2, Some(7)).forward(&xs, &edges).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_recurrent_gcn_rejects_wrong_features() {
    let model = RecurrentGCN::with_seed(3, 2, Some(0));
    let err = model
        .forward(&snapshots(2, 5, 4), &EdgeIndex::ring(5))
        .unwrap_err();
    assert!(matches!(err, GraphNetsError::DimensionMismatch { .. }));
}

// ==================== ScalableRecurrentGCN ====================

#[test]
fn test_scalable_last_width_is_replaced() {
    let model = ScalableRecurrentGCN::with_config(4, 3, &[8, 6, 5], 2, Some(0));
    let widths: Vec<(usize, usize)> = model
        .layers()
        .iter()
        .map(|l| (l.in_features(), l.out_features()))
        .collect();
    assert_eq!(widths, vec![(4, 8), (8, 6), (6, 3)]);
    assert!(model.layers().iter().all(|l| l.k() == 2));
}

#[test]
fn test_scalable_defaults() {
    let config = ScalableRecurrentGcnConfig::new(2);
    assert_eq!(config.output_dim, 2);
    assert_eq!(config.neighborhood_size, 2);
    assert_eq!(config.hidden_dim_sequence, vec![1024, 512, 768, 256, 128, 64, 64]);
}

#[test]
fn test_scalable_eval_is_deterministic() {
    let mut model = ScalableRecurrentGCN::with_config(3, 2, &[6, 4, 4], 2, Some(3));
    assert!(model.training());
    model.eval();
    assert!(!model.training());

    let edges = EdgeIndex::ring(4);
    let xs = snapshots(3, 4, 3);
    let a = model.forward(&xs, &edges).unwrap();
    let b = model.forward(&xs, &edges).unwrap();
    assert_eq!(a.shape(), &[3, 4, 2]);
    assert_eq!(a, b);
}

#[test]
fn test_scalable_prediction_dropout_in_training() {
    let mut model = ScalableRecurrentGCN::with_config(3, 2, &[6, 4, 4], 1, Some(3));
    let edges = EdgeIndex::ring(10);
    let xs = snapshots(4, 10, 3);

    model.eval();
    let clean = model.forward(&xs, &edges).unwrap();
    model.train();
    let noisy = model.forward(&xs, &edges).unwrap();
    assert_eq!(noisy.shape(), clean.shape());

    let scale = 1.0 / (1.0 - ScalableRecurrentGCN::PREDICTION_DROPOUT);
    let mut dropped = 0;
    for (&n, &c) in noisy.data().iter().zip(clean.data()) {
        if n == 0.0 && c != 0.0 {
            dropped += 1;
        } else {
            assert!((n - c * scale).abs() < 1e-5, "{n} vs {c} * {scale}");
        }
    }
    assert!(dropped > 0);
}

#[test]
#[should_panic(expected = "at least two hidden widths")]
fn test_scalable_single_width_panics() {
    let _ = ScalableRecurrentGCN::with_config(3, 2, &[8], 2, None);
}

// ==================== ConvGraphNet ====================

#[test]
fn test_conv_graph_net_structure() {
    let model = ConvGraphNet::new(6);
    assert_eq!(model.num_layers(), 5);
    assert_eq!(model.input_dim(), 6);
    assert_eq!(model.output_dim(), 1);
    assert_eq!(model.last_layer().in_features(), 64);
}

#[test]
fn test_conv_graph_net_parameters() {
    let model = ConvGraphNet::with_config(4, &[8, 3], 2, Some(0));
    let expected = (4 * 8 + 8) + (8 * 3 + 3) + (3 * 2 + 2);
    assert_eq!(model.num_parameters(), expected);
}

#[test]
fn test_conv_graph_net_forward() {
    let model = ConvGraphNet::with_config(3, &[8, 4], 2, Some(5));
    let x = snapshots(1, 6, 3).remove(0);
    let edges = EdgeIndex::ring(6);
    let out = model.forward(&x, &edges).unwrap();
    assert_eq!(out.shape(), &[6, 2]);

    // Manual composition of the same layers
    let mut h = x.clone();
    for layer in model.layers() {
        h = layer.forward(&h, &edges).unwrap().relu();
    }
    let expected = model.last_layer().forward(&h, &edges).unwrap();
    assert_eq!(out, expected);
}

// ==================== DeeperGCN ====================

#[test]
fn test_deeper_gcn_structure() {
    let model = DeeperGCN::new(5, 8, 3, 4);
    assert_eq!(model.layers().len(), 4);
    assert_eq!(model.num_features(), 5);
    assert_eq!(model.out_channels(), 3);

    let ckpt: Vec<bool> = model.layers().iter().map(|l| l.ckpt_grad()).collect();
    assert_eq!(ckpt, vec![true, true, false, true]);

    for layer in model.layers() {
        assert_eq!(layer.block(), crate::nn::gnn::DeepBlock::ResPlus);
        assert!((layer.dropout() - 0.1).abs() < f32::EPSILON);
        assert_eq!(layer.conv().temperature(), Some(1.0));
    }
    // Only the blocks learn their temperature
    assert_eq!(model.final_conv().options().aggregation, crate::nn::gnn::GenAggregation::default());
}

#[test]
fn test_deeper_gcn_forward_eval() {
    let mut model = DeeperGCN::with_seed(3, 8, 2, 3, Some(11));
    model.eval();
    let edges = EdgeIndex::ring(5);
    let x = snapshots(1, 5, 3).remove(0);

    let a = model.forward(&x, &edges).unwrap();
    let b = model.forward(&x, &edges).unwrap();
    assert_eq!(a.shape(), &[5, 2]);
    assert_eq!(a, b);
    assert!(a.data().iter().all(|v| v.is_finite()));
}

#[test]
fn test_deeper_gcn_forward_order() {
    let mut model = DeeperGCN::with_seed(3, 4, 2, 3, Some(5));
    model.eval();
    // Make the first block's norm distinguishable from the others.
    {
        let mut params = model.layers_mut()[0].parameters_mut();
        let n = params.len();
        *params[n - 2] = Tensor::new(&[2.0, 0.5, 1.5, 3.0], &[4]);
        *params[n - 1] = Tensor::new(&[0.1, -0.2, 0.3, 0.0], &[4]);
    }
    let edges = EdgeIndex::ring(5);
    let x = snapshots(1, 5, 3).remove(0);

    let layers = model.layers();
    let mut h = model.node_encoder().forward(&x);
    h = layers[0].conv().forward(&h, &edges).unwrap();
    for layer in &layers[1..] {
        h = layer.forward(&h, &edges).unwrap();
    }
    let expected = model
        .final_conv()
        .forward(&layers[0].norm_act(&h), &edges)
        .unwrap();
    assert_eq!(model.forward(&x, &edges).unwrap(), expected);

    let last_norm = model
        .final_conv()
        .forward(&layers[2].norm_act(&h), &edges)
        .unwrap();
    assert_ne!(expected, last_norm);
}

#[test]
fn test_deeper_gcn_single_layer() {
    let mut model = DeeperGCN::with_seed(3, 4, 2, 1, Some(1));
    model.eval();
    let out = model
        .forward(&snapshots(1, 4, 3).remove(0), &EdgeIndex::ring(4))
        .unwrap();
    assert_eq!(out.shape(), &[4, 2]);
}

#[test]
fn test_deeper_gcn_rejects_wrong_width() {
    let model = DeeperGCN::with_seed(3, 4, 2, 2, Some(1));
    let err = model
        .forward(&Tensor::ones(&[4, 5]), &EdgeIndex::ring(4))
        .unwrap_err();
    assert!(matches!(err, GraphNetsError::DimensionMismatch { .. }));
}

#[test]
fn test_deeper_gcn_train_eval() {
    let mut model = DeeperGCN::with_seed(3, 4, 2, 2, Some(1));
    assert!(model.training());
    model.eval();
    assert!(!model.training());
    assert!(model.layers().iter().all(|l| !l.training()));
    model.train();
    assert!(model.final_conv().training());
}

// ==================== ModelConfig / GraphNet ====================

#[test]
fn test_config_defaults_from_json() {
    let config = ModelConfig::from_json_str(r#"{ "model": "recurrent_gcn", "node_features": 4 }"#)
        .unwrap();
    assert_eq!(config, ModelConfig::RecurrentGcn(RecurrentGcnConfig::new(4)));

    let config = ModelConfig::from_json_str(r#"{ "model": "scalable_recurrent_gcn", "node_features": 4 }"#)
        .unwrap();
    assert_eq!(
        config,
        ModelConfig::ScalableRecurrentGcn(ScalableRecurrentGcnConfig::new(4))
    );

    let config = ModelConfig::from_json_str(r#"{ "model": "conv_graph_net", "input_dim": 4 }"#).unwrap();
    assert_eq!(config, ModelConfig::ConvGraphNet(ConvGraphNetConfig::new(4)));
}

#[test]
fn test_config_rejects_unknown_model() {
    let err = ModelConfig::from_json_str(r#"{ "model": "transformer", "node_features": 4 }"#)
        .unwrap_err();
    assert!(matches!(err, GraphNetsError::Serialization(_)));
}

#[test]
fn test_config_validation() {
    let cases = [
        r#"{ "model": "recurrent_gcn", "node_features": 0 }"#,
        r#"{ "model": "conv_graph_net", "input_dim": 3, "hidden_dim_sequence": [] }"#,
        r#"{ "model": "conv_graph_net", "input_dim": 3, "hidden_dim_sequence": [4, 0] }"#,
        r#"{ "model": "deeper_gcn", "num_features": 3, "hidden_channels": 4, "out_channels": 2, "num_layers": 0 }"#,
        r#"{ "model": "scalable_recurrent_gcn", "node_features": 3, "hidden_dim_sequence": [8] }"#,
        r#"{ "model": "scalable_recurrent_gcn", "node_features": 3, "neighborhood_size": 0 }"#,
    ];
    for json in cases {
        let err = ModelConfig::from_json_str(json).unwrap_err();
        assert!(
            matches!(err, GraphNetsError::InvalidHyperparameter { .. }),
            "{json}: {err}"
        );
    }
}

#[test]
fn test_config_round_trip_with_seed() {
    let config = ModelConfig::DeeperGcn(DeeperGcnConfig {
        num_features: 3,
        hidden_channels: 4,
        out_channels: 2,
        num_layers: 2,
        seed: None,
    })
    .with_seed(Some(9));
    assert_eq!(config.seed(), Some(9));
    assert_eq!(config.input_features(), 3);

    let json = config.to_json_string().unwrap();
    assert!(json.contains("\"model\": \"deeper_gcn\""));
    assert_eq!(ModelConfig::from_json_str(&json).unwrap(), config);
}

#[test]
fn test_graph_net_static_models_run_per_snapshot() {
    let config = ModelConfig::ConvGraphNet(ConvGraphNetConfig {
        input_dim: 3,
        hidden_dim_sequence: vec![4],
        output_dim: 2,
        seed: Some(5),
    });
    let net = config.build().unwrap();
    assert!(!net.is_recurrent());

    let edges = EdgeIndex::ring(4);
    let xs = snapshots(3, 4, 3);
    let out = net.forward_sequence(&xs, &edges).unwrap();
    assert_eq!(out.shape(), &[3, 4, 2]);

    let single = config.build().unwrap().forward_sequence(&xs[2..], &edges).unwrap();
    assert_eq!(&out.data()[16..], single.data());
}

#[test]
fn test_graph_net_all_models_shapes() {
    let configs = [
        r#"{ "model": "recurrent_gcn", "node_features": 3, "seed": 1 }"#,
        r#"{ "model": "conv_graph_net", "input_dim": 3, "hidden_dim_sequence": [8, 4], "output_dim": 2, "seed": 1 }"#,
        r#"{ "model": "deeper_gcn", "num_features": 3, "hidden_channels": 4, "out_channels": 2, "num_layers": 2, "seed": 1 }"#,
        r#"{ "model": "scalable_recurrent_gcn", "node_features": 3, "hidden_dim_sequence": [8, 4, 4], "seed": 1 }"#,
    ];
    let edges = EdgeIndex::ring(5);
    let xs = snapshots(2, 5, 3);
    for json in configs {
        let mut net = ModelConfig::from_json_str(json).unwrap().build().unwrap();
        net.eval();
        let out = net.forward_sequence(&xs, &edges).unwrap();
        assert_eq!(out.shape(), &[2, 5, 2], "{}", net.kind());

        let summary = net.summary();
        assert_eq!(summary.model, net.kind());
        assert_eq!(summary.parameters, net.num_parameters());
        assert!(summary.parameters > 0);
    }
}

#[test]
fn test_graph_net_empty_sequence() {
    let net = ModelConfig::ConvGraphNet(ConvGraphNetConfig::new(3))
        .build()
        .unwrap();
    let err = net.forward_sequence(&[], &EdgeIndex::ring(3)).unwrap_err();
    assert!(matches!(err, GraphNetsError::EmptyInput { .. }));
}
