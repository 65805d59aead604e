//! End-to-end tests: JSON configs on disk, model construction and forward
//! passes over snapshot sequences.

use std::io::Write;

use graphnets::prelude::*;
use tempfile::NamedTempFile;

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(json.as_bytes()).expect("write config");
    file.flush().expect("flush config");
    file
}

fn snapshots(steps: usize, nodes: usize, features: usize) -> Vec<Tensor> {
    (0..steps)
        .map(|t| {
            let data: Vec<f32> = (0..nodes * features)
                .map(|i| ((i * 3 + t) as f32 * 0.21).cos())
                .collect();
            Tensor::new(&data, &[nodes, features])
        })
        .collect()
}

#[test]
fn test_config_file_builds_and_runs() {
    let file = write_config(
        r#"{
            "model": "scalable_recurrent_gcn",
            "node_features": 4,
            "output_dim": 3,
            "hidden_dim_sequence": [16, 8, 8],
            "neighborhood_size": 2,
            "seed": 17
        }"#,
    );

    let config = ModelConfig::from_json_file(file.path()).expect("valid config");
    assert_eq!(config.input_features(), 4);

    let mut model = config.build().expect("build");
    model.eval();
    let out = model
        .forward_sequence(&snapshots(6, 10, 4), &EdgeIndex::ring(10))
        .expect("forward");
    assert_eq!(out.shape(), &[6, 10, 3]);
}

#[test]
fn test_missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = ModelConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, GraphNetsError::Io(_)));
}

#[test]
fn test_malformed_config_file_is_serialization_error() {
    let file = write_config(r#"{ "model": "recurrent_gcn", "node_features": "#);
    let err = ModelConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, GraphNetsError::Serialization(_)));
}

#[test]
fn test_same_seed_same_predictions() {
    let json = r#"{ "model": "deeper_gcn", "num_features": 3, "hidden_channels": 8,
                   "out_channels": 2, "num_layers": 3, "seed": 99 }"#;
    let edges = EdgeIndex::ring(6);
    let xs = snapshots(2, 6, 3);

    let run = || {
        let mut model = ModelConfig::from_json_str(json).unwrap().build().unwrap();
        model.eval();
        model.forward_sequence(&xs, &edges).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_recurrent_prediction_depends_on_history() {
    // Eval mode disables prediction dropout, so only hidden state differs
    let mut model = ScalableRecurrentGCN::with_config(3, 4, &[6, 6], 1, Some(5));
    model.eval();

    let edges = EdgeIndex::ring(5);
    let xs = snapshots(3, 5, 3);
    let full = model.forward(&xs, &edges).unwrap();
    let last_only = model.forward(&xs[2..], &edges).unwrap();

    let last_step = &full.data()[2 * 5 * 4..];
    assert_eq!(last_only.shape(), &[1, 5, 4]);
    assert_ne!(last_step, last_only.data());
}

#[test]
fn test_recurrent_gcn_handles_weighted_graph() {
    let edges = EdgeIndex::from_edge_index(&[[0, 1], [1, 0], [1, 2], [2, 1], [2, 3], [3, 2]], 4)
        .with_weights(vec![0.5, 0.5, 2.0, 2.0, 1.0, 1.0])
        .unwrap();
    let model = RecurrentGCN::with_seed(2, 2, Some(3));
    let out = model.forward(&snapshots(3, 4, 2), &edges).unwrap();
    assert_eq!(out.shape(), &[3, 4, 2]);
    assert!(out.data().iter().all(|v| v.is_finite() && *v >= 0.0));
}

#[test]
fn test_invalid_edges_are_reported() {
    let model = RecurrentGCN::with_seed(2, 2, Some(3));
    let edges = EdgeIndex::from_edge_index(&[[0, 9]], 4);
    let err = model.forward(&snapshots(1, 4, 2), &edges).unwrap_err();
    assert!(matches!(err, GraphNetsError::IndexOutOfBounds { index: 9, len: 4 }));
}

#[test]
fn test_deeper_gcn_training_and_eval_differ() {
    let edges = EdgeIndex::ring(8);
    let x = snapshots(1, 8, 3).remove(0);

    let mut eval = DeeperGCN::with_seed(3, 8, 2, 2, Some(4));
    eval.eval();
    let train = DeeperGCN::with_seed(3, 8, 2, 2, Some(4));
    assert!(train.training());

    let a = eval.forward(&x, &edges).unwrap();
    let b = train.forward(&x, &edges).unwrap();
    assert_eq!(a.shape(), b.shape());
    assert_ne!(a, b);
}

#[test]
fn test_summary_serializes_to_json() {
    let model = ModelConfig::from_json_str(r#"{ "model": "conv_graph_net", "input_dim": 2, "hidden_dim_sequence": [4] }"#)
        .unwrap()
        .build()
        .unwrap();
    let json = serde_json::to_value(model.summary()).unwrap();
    assert_eq!(json["model"], "conv_graph_net");
    assert_eq!(json["layers"], 2);
    assert_eq!(json["parameters"], (2 * 4 + 4) + (4 + 1));
    assert_eq!(json["recurrent"], false);
}

#[test]
fn test_final_conv_is_a_graph_module() {
    let model = DeeperGCN::with_seed(3, 4, 2, 1, Some(0));
    let conv: &dyn GraphModule = model.final_conv();
    assert!(conv.num_parameters() > 0);
}
