//! A small sigmoid neural network engine.
//!
//! Networks are stacks of fully-connected logistic layers, trained
//! online by backpropagation. Neurons may optionally remember their
//! last few outputs and feed them back into their own activation.
//!
//! Besides gradient training, networks expose the variation operators
//! of a genetic search: cloning, mutation, generation of mutated
//! offspring, and uniform crossover between networks of the same
//! topology. Selection and fitness evaluation are left to the caller.
//! Every random draw comes from a generator supplied by the caller.
//!
//! Networks can be saved to and loaded from a plain text format that
//! round-trips every parameter exactly. Training data can be supplied
//! through the [`TrainingSet`] trait, implemented by slices of example
//! pairs and by the `Dataset` type of the
//! [`OxiNet-Data`](https://crates.io/crates/oxinet-data) crate.
//!
//! # Example usage: backpropagation followed by evolution
//! ```
//! use oxinet::{NetworkConfig, NeuralNetwork, DEFAULT_DEVIATION, DEFAULT_DOMINANCE};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let examples = vec![
//!     (vec![0.0, 0.0], vec![0.0]),
//!     (vec![0.0, 1.0], vec![1.0]),
//!     (vec![1.0, 0.0], vec![1.0]),
//!     (vec![1.0, 1.0], vec![0.0]),
//! ];
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let config = NetworkConfig {
//!     learning_rate: 0.5,
//!     ..NetworkConfig::new(vec![2, 4, 1])
//! };
//! let mut network = NeuralNetwork::new(&config, &mut rng).unwrap();
//! network.train_on_dataset(&examples[..], 100).unwrap();
//!
//! let mut best = network;
//! for _ in 0..5 {
//!     let mut generation = best.generate_generation(10, DEFAULT_DEVIATION, &mut rng).unwrap();
//!     let mut scores = generation
//!         .iter_mut()
//!         .map(|n| n.error_stats(&examples[..]).unwrap().mean)
//!         .enumerate()
//!         .collect::<Vec<_>>();
//!     scores.sort_by(|(_, a), (_, b)| a.total_cmp(b));
//!
//!     let child = generation[scores[0].0]
//!         .pair_with(&generation[scores[1].0], DEFAULT_DOMINANCE, &mut rng)
//!         .unwrap();
//!     best = generation.swap_remove(scores[0].0);
//!     assert_eq!(child.topology(), best.topology());
//! }
//! ```

pub mod errors;
pub mod files;
pub mod layers;
pub mod networks;
pub mod neurons;
mod rng;
pub mod stats;
pub mod training_set;

pub use errors::{Error, Result, Shape, UnpackError};
pub use networks::*;
pub use stats::Stats;
pub use training_set::{ExampleKind, TrainingSet};
