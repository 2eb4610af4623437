use oxinet::{Error, NetworkConfig, NeuralNetwork, Shape};
use oxinet_data::Dataset;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn or_dataset() -> Dataset {
    vec![
        (vec![0.0, 0.0], vec![0.0]),
        (vec![0.0, 1.0], vec![1.0]),
        (vec![1.0, 0.0], vec![1.0]),
        (vec![1.0, 1.0], vec![1.0]),
    ]
    .into_iter()
    .collect()
}

fn network(topology: Vec<usize>, memory_depth: usize, seed: u64) -> NeuralNetwork {
    let config = NetworkConfig {
        learning_rate: 0.5,
        memory_depth,
        ..NetworkConfig::new(topology)
    };
    NeuralNetwork::new(&config, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap()
}

#[test]
fn training_on_dataset_lowers_error() {
    let dataset = or_dataset();
    let mut network = network(vec![2, 3, 1], 0, 0);

    let before = network.error_stats(&dataset).unwrap();
    network.train_on_dataset(&dataset, 500).unwrap();
    let after = network.error_stats(&dataset).unwrap();

    assert!(after.mean < before.mean);
    assert!(after.maximum >= after.median && after.median >= after.minimum);
}

#[test]
fn dataset_shape_mismatch() {
    let mut dataset = or_dataset();
    dataset.add(vec![1.0], vec![1.0]);
    let mut network = network(vec![2, 1], 0, 1);
    assert!(matches!(
        network.train_on_dataset(&dataset, 1),
        Err(Error::ShapeMismatch(Shape::Length {
            expected: 2,
            found: 1
        }))
    ));
}

#[test]
fn saved_network_and_dataset_reload() {
    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("or.txt");
    let network_path = dir.path().join("or.net");

    let dataset = or_dataset();
    dataset.save(&dataset_path, false).unwrap();
    let mut network = network(vec![2, 2, 1], 2, 2);
    network.train_on_dataset(&dataset, 20).unwrap();
    network.clear_memory();
    network.save(&network_path, false).unwrap();

    let reloaded_dataset = Dataset::from_file(&dataset_path).unwrap();
    let mut reloaded = NeuralNetwork::load(&network_path).unwrap();
    assert_eq!(reloaded.topology(), network.topology());
    assert_eq!(
        reloaded.error_stats(&reloaded_dataset).unwrap(),
        network.error_stats(&dataset).unwrap()
    );

    assert!(matches!(
        network.save(&network_path, false),
        Err(Error::AlreadyExists(_))
    ));
    assert!(matches!(
        NeuralNetwork::load(dir.path().join("missing.net")),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn evolved_children_keep_topology() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let dataset = or_dataset();
    let mut parent = network(vec![2, 4, 1], 1, 3);

    for _ in 0..3 {
        let mut generation = parent.generate_generation(6, 0.2, &mut rng).unwrap();
        let mut scores = generation
            .iter_mut()
            .map(|n| {
                n.clear_memory();
                n.error_stats(&dataset).unwrap().mean
            })
            .enumerate()
            .collect::<Vec<_>>();
        scores.sort_by(|(_, a), (_, b)| a.total_cmp(b));
        parent = generation[scores[0].0]
            .pair_with(&generation[scores[1].0], 0.5, &mut rng)
            .unwrap();
        assert_eq!(parent.topology(), &[2, 4, 1]);
    }
}

#[test]
fn serde_json_round_trip() {
    let mut network = network(vec![3, 2, 2], 1, 4);
    let json = serde_json::to_string(&network).unwrap();
    let mut restored: NeuralNetwork = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, network);
    assert_eq!(
        restored.forward(&[0.1, 0.2, 0.3]).unwrap(),
        network.forward(&[0.1, 0.2, 0.3]).unwrap()
    );
}
