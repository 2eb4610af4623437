use oxinet::{NetworkConfig, NeuralNetwork, DEFAULT_DEVIATION, DEFAULT_DOMINANCE};
use oxinet_data::Dataset;

use std::error::Error;

use log::{info, warn};
use rand::Rng;
use rayon::prelude::*;

// Allowed error margin for network answers.
const ERROR_MARGIN: f64 = 0.3;
const EPOCHS: usize = 4000;
const GENERATIONS: usize = 300;
const GENERATION_SIZE: usize = 50;

fn xor_dataset() -> Dataset {
    vec![
        (vec![0.0, 0.0], vec![0.0]),
        (vec![0.0, 1.0], vec![1.0]),
        (vec![1.0, 0.0], vec![1.0]),
        (vec![1.0, 1.0], vec![0.0]),
    ]
    .into_iter()
    .collect()
}

fn solves_xor(network: &mut NeuralNetwork, dataset: &Dataset) -> oxinet::Result<bool> {
    for (inputs, corrects) in dataset.iter() {
        if (network.forward(inputs)?[0] - corrects[0]).abs() >= ERROR_MARGIN {
            return Ok(false);
        }
    }
    Ok(true)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let dataset = xor_dataset();
    let config = NetworkConfig {
        learning_rate: 0.5,
        ..NetworkConfig::new(vec![2, 4, 1])
    };
    info!("network config: {}", ron::to_string(&config)?);

    let mut rng = rand::thread_rng();
    let trained = backprop_test(&config, &dataset, &mut rng)?;
    let champion = evolution_test(trained, &dataset, &mut rng)?;
    persistence_test(champion, &dataset)?;
    Ok(())
}

fn backprop_test<R: Rng>(
    config: &NetworkConfig,
    dataset: &Dataset,
    rng: &mut R,
) -> oxinet::Result<NeuralNetwork> {
    let mut network = NeuralNetwork::new(config, rng)?;
    for round in 1..=4 {
        network.train_on_dataset(dataset, EPOCHS / 4)?;
        info!(
            "after {} epochs: {:?}",
            round * EPOCHS / 4,
            network.error_stats(dataset)?
        );
    }
    if solves_xor(&mut network, dataset)? {
        info!("backpropagation solved XOR");
    } else {
        warn!("backpropagation didn't solve XOR, evolving from here");
    }
    Ok(network)
}

fn evolution_test<R: Rng>(
    mut parent: NeuralNetwork,
    dataset: &Dataset,
    rng: &mut R,
) -> oxinet::Result<NeuralNetwork> {
    for generation_index in 0..GENERATIONS {
        let mut generation = parent.generate_generation(GENERATION_SIZE, DEFAULT_DEVIATION, rng)?;
        let mut scores = generation
            .par_iter_mut()
            .map(|network| network.error_stats(dataset).map(|stats| stats.mean))
            .collect::<oxinet::Result<Vec<_>>>()?
            .into_iter()
            .enumerate()
            .collect::<Vec<_>>();
        scores.sort_by(|(_, a), (_, b)| a.total_cmp(b));

        let (best, best_error) = scores[0];
        let (second, _) = scores[1];
        let mut child = generation[best].pair_with(&generation[second], DEFAULT_DOMINANCE, rng)?;
        let child_error = child.error_stats(dataset)?.mean;

        parent = if child_error < best_error {
            child
        } else {
            generation.swap_remove(best)
        };
        if solves_xor(&mut parent, dataset)? {
            info!("evolution solved XOR at generation {}", generation_index);
            return Ok(parent);
        }
    }
    warn!("no solution found after {} generations", GENERATIONS);
    Ok(parent)
}

fn persistence_test(mut champion: NeuralNetwork, dataset: &Dataset) -> Result<(), Box<dyn Error>> {
    info!("champion: {}", ron::to_string(&champion)?);

    let path = std::env::temp_dir().join("xor-champion.net");
    champion.save(&path, true)?;
    let mut reloaded = NeuralNetwork::load(&path)?;
    for (inputs, corrects) in dataset.iter() {
        let (original, restored) = (champion.forward(inputs)?, reloaded.forward(inputs)?);
        info!(
            "{:?} -> {:.3} (expected {}, reloaded {:.3})",
            inputs, original[0], corrects[0], restored[0]
        );
    }
    Ok(())
}
