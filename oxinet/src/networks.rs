//! A network is a stack of fully-connected layers.
//!
//! Raw inputs are squashed through the logistic function before
//! reaching the first layer, and each layer's outputs become the
//! next layer's inputs. Networks learn online by backpropagation,
//! and can be mutated and paired to breed new candidate networks
//! for an external evolutionary search.
mod config;
mod persistence;

pub use config::{NetworkConfig, DEFAULT_DEVIATION, DEFAULT_DOMINANCE, DEFAULT_LEARNING_RATE};
pub use persistence::LAYER_SENTINEL;

use crate::errors::{Error, Result, Shape};
use crate::layers::NeuronsLayer;
use crate::neurons::sigmoid;
use crate::stats::Stats;
use crate::training_set::{ExampleKind, TrainingSet};
use config::{check_learning_rate, check_topology};

use log::{debug, trace, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A layered sigmoid neural network.
///
/// Supports Serde for convenient embedding in other formats;
/// the dedicated text format is handled by [`save`] and [`load`].
/// Deserialization fails unless the layers match the topology.
///
/// [`save`]: NeuralNetwork::save
/// [`load`]: NeuralNetwork::load
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "NetworkData")]
pub struct NeuralNetwork {
    topology: Vec<usize>,
    learning_rate: f64,
    layers: Vec<NeuronsLayer>,
}

#[derive(Deserialize)]
struct NetworkData {
    topology: Vec<usize>,
    learning_rate: f64,
    layers: Vec<NeuronsLayer>,
}

impl TryFrom<NetworkData> for NeuralNetwork {
    type Error = Error;

    fn try_from(data: NetworkData) -> Result<NeuralNetwork> {
        check_topology(&data.topology)?;
        check_learning_rate(data.learning_rate)?;
        if data.layers.len() != data.topology.len() - 1 {
            return Err(Error::invalid_argument(format!(
                "topology {:?} requires {} layers, found {}",
                data.topology,
                data.topology.len() - 1,
                data.layers.len()
            )));
        }
        for (index, (layer, widths)) in data.layers.iter().zip(data.topology.windows(2)).enumerate() {
            if layer.input_count() != widths[0] || layer.len() != widths[1] {
                return Err(Error::invalid_argument(format!(
                    "layer {} has {} neurons of {} inputs, topology requires {} of {}",
                    index,
                    layer.len(),
                    layer.input_count(),
                    widths[1],
                    widths[0]
                )));
            }
        }
        Ok(NeuralNetwork {
            topology: data.topology,
            learning_rate: data.learning_rate,
            layers: data.layers,
        })
    }
}

impl NeuralNetwork {
    /// Creates a new randomly initialized network
    /// with the specified configuration.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the
    /// configuration [isn't valid].
    ///
    /// [isn't valid]: NetworkConfig::validate
    ///
    /// # Examples
    /// ```
    /// use oxinet::{NetworkConfig, NeuralNetwork};
    ///
    /// let config = NetworkConfig::new(vec![6, 4, 6, 3]);
    /// let network = NeuralNetwork::new(&config, &mut rand::thread_rng()).unwrap();
    ///
    /// assert_eq!(network.layers().len(), 3);
    /// assert_eq!(network.input_count(), 6);
    /// assert_eq!(network.output_count(), 3);
    /// ```
    pub fn new<R: Rng + ?Sized>(config: &NetworkConfig, rng: &mut R) -> Result<NeuralNetwork> {
        config.validate()?;
        let mut network = NeuralNetwork {
            topology: vec![],
            learning_rate: config.learning_rate,
            layers: vec![],
        };
        network.build_topology(&config.topology, config.memory_depth, rng)?;
        debug!(
            "built network with topology {:?}, memory depth {}",
            network.topology, config.memory_depth
        );
        Ok(network)
    }

    /// Replaces every layer with freshly initialized ones
    /// following `topology`: layer `i` takes `topology[i]`
    /// inputs and has `topology[i + 1]` neurons.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `topology` has fewer
    /// than 2 elements or contains a 0. The network is left
    /// untouched in that case.
    ///
    /// # Examples
    /// ```
    /// use oxinet::{NetworkConfig, NeuralNetwork};
    ///
    /// let mut rng = rand::thread_rng();
    /// let mut network = NeuralNetwork::new(&NetworkConfig::default(), &mut rng).unwrap();
    ///
    /// network.build_topology(&[3, 5, 2], 1, &mut rng).unwrap();
    /// assert_eq!(network.topology(), &[3, 5, 2]);
    /// assert_eq!(network.layers()[1].input_count(), 5);
    ///
    /// assert!(network.build_topology(&[3], 0, &mut rng).is_err());
    /// ```
    pub fn build_topology<R: Rng + ?Sized>(
        &mut self,
        topology: &[usize],
        memory_depth: usize,
        rng: &mut R,
    ) -> Result<()> {
        check_topology(topology)?;
        self.topology = topology.to_vec();
        self.layers = topology
            .windows(2)
            .map(|widths| NeuronsLayer::new(widths[1], memory_depth, widths[0], rng))
            .collect();
        Ok(())
    }

    /// Returns the network's outputs for `inputs`.
    ///
    /// The inputs are squashed through the logistic function
    /// before being fed to the first layer. Layer caches, and the
    /// history of neurons with memory, are updated.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if the length of
    /// `inputs` differs from the network's input count.
    ///
    /// # Examples
    /// ```
    /// use oxinet::{NetworkConfig, NeuralNetwork};
    ///
    /// let mut network =
    ///     NeuralNetwork::new(&NetworkConfig::new(vec![2, 3]), &mut rand::thread_rng()).unwrap();
    ///
    /// let outputs = network.forward(&[0.5, -4.0]).unwrap();
    /// assert_eq!(outputs.len(), 3);
    /// assert!(outputs.iter().all(|o| (0.0..=1.0).contains(o)));
    ///
    /// assert!(network.forward(&[0.5]).is_err());
    /// ```
    pub fn forward(&mut self, inputs: &[f64]) -> Result<Vec<f64>> {
        self.check_input_shape(inputs)?;
        let mut signal: Vec<f64> = inputs.iter().copied().map(sigmoid).collect();
        for layer in self.layers.iter_mut() {
            signal = layer.forward(&signal);
        }
        Ok(signal)
    }

    /// Performs a single step of online backpropagation:
    /// a forward pass on `inputs`, followed by a backward
    /// pass of the raw error `corrects - outputs` through
    /// every layer, from last to first.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if either vector's length
    /// differs from the network's input or output count, or
    /// [`Error::InvalidArgument`] if `learning_rate` isn't positive
    /// and finite. The network is left untouched in both cases.
    pub fn train_once(&mut self, inputs: &[f64], corrects: &[f64], learning_rate: f64) -> Result<()> {
        check_learning_rate(learning_rate)?;
        self.check_input_shape(inputs)?;
        self.check_output_shape(corrects)?;

        let outputs = self.forward(inputs)?;
        let mut errors: Vec<f64> = corrects
            .iter()
            .zip(outputs.iter())
            .map(|(correct, output)| correct - output)
            .collect();
        trace!("output errors {:?}", errors);

        for layer in self.layers.iter_mut().rev() {
            errors = layer.backward(&errors, learning_rate);
        }
        Ok(())
    }

    /// Trains the network on every example of `dataset`, in order,
    /// repeating the whole pass `iterations` times. Uses the network's
    /// own learning rate.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if any example doesn't fit the
    /// network. All examples are checked before any training happens.
    ///
    /// # Examples
    /// ```
    /// use oxinet::{NetworkConfig, NeuralNetwork};
    /// use oxinet_data::Dataset;
    ///
    /// let mut dataset = Dataset::new();
    /// dataset.add(vec![0.0, 1.0], vec![1.0]);
    /// dataset.add(vec![1.0, 1.0], vec![0.0]);
    ///
    /// let config = NetworkConfig {
    ///     learning_rate: 0.5,
    ///     ..NetworkConfig::new(vec![2, 3, 1])
    /// };
    /// let mut network = NeuralNetwork::new(&config, &mut rand::thread_rng()).unwrap();
    ///
    /// let before = network.error_stats(&dataset).unwrap().mean;
    /// network.train_on_dataset(&dataset, 200).unwrap();
    /// assert!(network.error_stats(&dataset).unwrap().mean < before);
    /// ```
    pub fn train_on_dataset<T>(&mut self, dataset: &T, iterations: usize) -> Result<()>
    where
        T: TrainingSet + ?Sized,
    {
        if dataset.is_empty() {
            warn!("training on an empty dataset");
        }
        self.check_dataset_shape(dataset)?;

        for epoch in 0..iterations {
            for index in 0..dataset.len() {
                self.train_once(
                    dataset.get(index, ExampleKind::Inputs),
                    dataset.get(index, ExampleKind::Corrects),
                    self.learning_rate,
                )?;
            }
            trace!("epoch {} of {} complete", epoch + 1, iterations);
        }
        debug!(
            "trained {} epochs over {} examples",
            iterations,
            dataset.len()
        );
        Ok(())
    }

    /// Trains the network on a single example pair,
    /// `iterations` times in a row, using the
    /// network's own learning rate.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if the example doesn't fit the network.
    pub fn train_on_example(
        &mut self,
        inputs: &[f64],
        corrects: &[f64],
        iterations: usize,
    ) -> Result<()> {
        self.check_input_shape(inputs)?;
        self.check_output_shape(corrects)?;
        for _ in 0..iterations {
            self.train_once(inputs, corrects, self.learning_rate)?;
        }
        Ok(())
    }

    /// Returns statistics of the mean squared error of the
    /// network's outputs over each example of `dataset`.
    ///
    /// Neurons with memory are affected by the evaluation,
    /// as with any other forward pass.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for an empty dataset, or
    /// [`Error::ShapeMismatch`] if any example doesn't fit the network.
    pub fn error_stats<T>(&mut self, dataset: &T) -> Result<Stats>
    where
        T: TrainingSet + ?Sized,
    {
        self.check_dataset_shape(dataset)?;
        let mut errors = Vec::with_capacity(dataset.len());
        for index in 0..dataset.len() {
            let outputs = self.forward(dataset.get(index, ExampleKind::Inputs))?;
            let corrects = dataset.get(index, ExampleKind::Corrects);
            let squared_error: f64 = corrects
                .iter()
                .zip(outputs.iter())
                .map(|(correct, output)| (correct - output).powi(2))
                .sum();
            errors.push(squared_error / outputs.len() as f64);
        }
        Stats::from_values(errors)
            .ok_or_else(|| Error::invalid_argument("cannot compute errors over an empty dataset"))
    }

    /// Returns `count` networks derived from this one: the first an
    /// exact clone, the rest clones [mutated] by up to `deviation`.
    ///
    /// [mutated]: NeuralNetwork::mutate
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `count` is 0
    /// or `deviation` isn't positive.
    ///
    /// # Examples
    /// ```
    /// use oxinet::{NetworkConfig, NeuralNetwork};
    ///
    /// let mut rng = rand::thread_rng();
    /// let network = NeuralNetwork::new(&NetworkConfig::new(vec![2, 2]), &mut rng).unwrap();
    ///
    /// let generation = network.generate_generation(5, 0.1, &mut rng).unwrap();
    /// assert_eq!(generation.len(), 5);
    /// assert_eq!(generation[0], network);
    /// assert!(generation[1..].iter().all(|n| n.topology() == network.topology()));
    /// ```
    pub fn generate_generation<R: Rng + ?Sized>(
        &self,
        count: usize,
        deviation: f64,
        rng: &mut R,
    ) -> Result<Vec<NeuralNetwork>> {
        if count == 0 {
            return Err(Error::invalid_argument(
                "generation count must be greater than zero",
            ));
        }
        if !(deviation > 0.0) {
            return Err(Error::invalid_argument(format!(
                "deviation must be greater than zero, got {}",
                deviation
            )));
        }

        let mut generation = Vec::with_capacity(count);
        generation.push(self.clone());
        generation.extend((1..count).map(|_| {
            let mut mutant = self.clone();
            mutant.mutate(deviation, rng);
            mutant
        }));
        debug!(
            "generated {} networks with deviation {}",
            count, deviation
        );
        Ok(generation)
    }

    /// Nudges every weight, feedback weight and bias in the
    /// network by an independent random amount in
    /// `(-deviation, deviation)`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, deviation: f64, rng: &mut R) {
        for layer in self.layers.iter_mut() {
            layer.mutate(deviation, rng);
        }
    }

    /// Combines the network with an `other` network of the same
    /// topology and returns their child. Each parameter of the
    /// child is taken from `other` with probability `dominance`,
    /// and from `self` otherwise.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if the topologies differ or
    /// if neurons at the same position have different memory depths,
    /// or [`Error::InvalidArgument`] if `dominance` isn't in `[0, 1]`.
    ///
    /// # Examples
    /// ```
    /// use oxinet::{NetworkConfig, NeuralNetwork};
    ///
    /// let mut rng = rand::thread_rng();
    /// let config = NetworkConfig::new(vec![3, 2, 1]);
    /// let mother = NeuralNetwork::new(&config, &mut rng).unwrap();
    /// let father = NeuralNetwork::new(&config, &mut rng).unwrap();
    ///
    /// assert_eq!(mother.pair_with(&father, 0.0, &mut rng).unwrap(), mother);
    /// assert_eq!(mother.pair_with(&father, 1.0, &mut rng).unwrap(), father);
    ///
    /// let stranger = NeuralNetwork::new(&NetworkConfig::new(vec![3, 1]), &mut rng).unwrap();
    /// assert!(mother.pair_with(&stranger, 0.5, &mut rng).is_err());
    /// ```
    pub fn pair_with<R: Rng + ?Sized>(
        &self,
        other: &NeuralNetwork,
        dominance: f64,
        rng: &mut R,
    ) -> Result<NeuralNetwork> {
        self.check_pairable(other)?;
        if !(0.0..=1.0).contains(&dominance) {
            return Err(Error::invalid_argument(format!(
                "dominance must be between 0 and 1, got {}",
                dominance
            )));
        }

        let layers = self
            .layers
            .iter()
            .zip(other.layers.iter())
            .map(|(layer, other_layer)| layer.pair_with(other_layer, dominance, rng))
            .collect();
        debug!("paired networks with dominance {}", dominance);
        Ok(NeuralNetwork {
            topology: self.topology.clone(),
            learning_rate: self.learning_rate,
            layers,
        })
    }

    /// Forgets the previous outputs of every neuron.
    pub fn clear_memory(&mut self) {
        for layer in self.layers.iter_mut() {
            layer.clear_memory();
        }
    }

    /// Returns the cached outputs of a layer, counting from the
    /// output layer (index 0) backwards. The slice is empty if no
    /// forward pass has taken place since the network was created.
    ///
    /// Returns `None` if there's no such layer.
    ///
    /// # Examples
    /// ```
    /// use oxinet::{NetworkConfig, NeuralNetwork};
    ///
    /// let mut network =
    ///     NeuralNetwork::new(&NetworkConfig::new(vec![2, 4, 1]), &mut rand::thread_rng()).unwrap();
    /// let outputs = network.forward(&[1.0, 0.0]).unwrap();
    ///
    /// assert_eq!(network.last_outputs_of_layer(0).unwrap(), &outputs[..]);
    /// assert_eq!(network.last_outputs_of_layer(1).unwrap().len(), 4);
    /// assert!(network.last_outputs_of_layer(2).is_none());
    /// ```
    pub fn last_outputs_of_layer(&self, index_from_output: usize) -> Option<&[f64]> {
        self.layers
            .iter()
            .rev()
            .nth(index_from_output)
            .map(NeuronsLayer::last_outputs)
    }

    /// Returns the layer widths, inputs first.
    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    /// Returns the number of inputs.
    pub fn input_count(&self) -> usize {
        self.topology[0]
    }

    /// Returns the number of outputs.
    pub fn output_count(&self) -> usize {
        self.topology[self.topology.len() - 1]
    }

    /// Returns the learning rate used by [`train_on_dataset`]
    /// and [`train_on_example`].
    ///
    /// [`train_on_dataset`]: NeuralNetwork::train_on_dataset
    /// [`train_on_example`]: NeuralNetwork::train_on_example
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Sets the network's learning rate.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if
    /// `learning_rate` isn't positive and finite.
    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<()> {
        check_learning_rate(learning_rate)?;
        self.learning_rate = learning_rate;
        Ok(())
    }

    /// Returns the network's layers, first to last.
    pub fn layers(&self) -> &[NeuronsLayer] {
        &self.layers
    }

    fn check_input_shape(&self, inputs: &[f64]) -> Result<()> {
        check_length(self.input_count(), inputs)
    }

    fn check_output_shape(&self, corrects: &[f64]) -> Result<()> {
        check_length(self.output_count(), corrects)
    }

    fn check_pairable(&self, other: &NeuralNetwork) -> Result<()> {
        if self.topology != other.topology {
            return Err(Error::ShapeMismatch(Shape::Topology {
                expected: self.topology.clone(),
                found: other.topology.clone(),
            }));
        }
        // Equal topologies imply equal weight counts.
        for (layer_index, (layer, other_layer)) in self.layers.iter().zip(&other.layers).enumerate() {
            for (neuron_index, (neuron, other_neuron)) in
                layer.neurons().iter().zip(other_layer.neurons()).enumerate()
            {
                if neuron.memory_depth() != other_neuron.memory_depth() {
                    return Err(Error::ShapeMismatch(Shape::MemoryDepth {
                        layer: layer_index,
                        neuron: neuron_index,
                        expected: neuron.memory_depth(),
                        found: other_neuron.memory_depth(),
                    }));
                }
            }
        }
        Ok(())
    }

    fn check_dataset_shape<T>(&self, dataset: &T) -> Result<()>
    where
        T: TrainingSet + ?Sized,
    {
        (0..dataset.len()).try_for_each(|index| {
            self.check_input_shape(dataset.get(index, ExampleKind::Inputs))?;
            self.check_output_shape(dataset.get(index, ExampleKind::Corrects))
        })
    }
}

fn check_length(expected: usize, values: &[f64]) -> Result<()> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(Error::ShapeMismatch(Shape::Length {
            expected,
            found: values.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neurons::Neuron;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn network(topology: &[usize], memory_depth: usize, seed: u64) -> NeuralNetwork {
        let config = NetworkConfig {
            topology: topology.to_vec(),
            learning_rate: 0.1,
            memory_depth,
        };
        NeuralNetwork::new(&config, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap()
    }

    fn all_parameters(network: &NeuralNetwork) -> Vec<f64> {
        network
            .layers()
            .iter()
            .flat_map(|l| l.neurons())
            .flat_map(|n| {
                n.weights()
                    .iter()
                    .chain(n.feedback_weights())
                    .copied()
                    .chain(std::iter::once(n.bias()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn new_shapes_layers_from_topology() {
        let network = network(&[6, 4, 6, 3], 2, 0);
        assert_eq!(network.layers().len(), 3);
        for (i, layer) in network.layers().iter().enumerate() {
            assert_eq!(layer.input_count(), network.topology()[i]);
            assert_eq!(layer.len(), network.topology()[i + 1]);
            assert!(layer.neurons().iter().all(|n| n.memory_depth() == 2));
        }
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for topology in [vec![], vec![2], vec![2, 0], vec![0, 2]] {
            assert!(matches!(
                NeuralNetwork::new(&NetworkConfig::new(topology), &mut rng),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn same_seed_same_network() {
        assert_eq!(network(&[3, 4, 2], 1, 42), network(&[3, 4, 2], 1, 42));
        assert_ne!(network(&[3, 4, 2], 1, 42), network(&[3, 4, 2], 1, 43));
    }

    #[test]
    fn forward_squashes_inputs_first() {
        let mut network = NeuralNetwork {
            topology: vec![1, 1],
            learning_rate: 0.1,
            layers: vec![NeuronsLayer::from_neurons(vec![Neuron::from_parts(
                vec![1.0],
                0.0,
                vec![],
            )])],
        };
        assert_eq!(network.forward(&[2.0]).unwrap(), vec![sigmoid(sigmoid(2.0))]);
    }

    #[test]
    fn forward_shape_mismatch() {
        let mut network = network(&[3, 2], 0, 1);
        assert!(matches!(
            network.forward(&[1.0, 2.0]),
            Err(Error::ShapeMismatch(Shape::Length {
                expected: 3,
                found: 2
            }))
        ));
    }

    #[test]
    fn forward_is_deterministic_without_memory() {
        let mut network = network(&[3, 5, 2], 0, 2);
        let inputs = [0.3, -1.2, 4.0];
        let first = network.forward(&inputs).unwrap();
        assert_eq!(network.forward(&inputs).unwrap(), first);
    }

    #[test]
    fn forward_with_memory_depends_on_history() {
        let mut network = network(&[3, 5, 2], 2, 2);
        let inputs = [0.3, -1.2, 4.0];
        let first = network.forward(&inputs).unwrap();
        assert_ne!(network.forward(&inputs).unwrap(), first);

        network.clear_memory();
        assert_eq!(network.forward(&inputs).unwrap(), first);
    }

    #[test]
    fn clone_is_independent() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut original = network(&[2, 3, 2], 0, 3);
        let mut clone = original.clone();
        let inputs = [0.7, -0.1];
        let expected = original.forward(&inputs).unwrap();
        assert_eq!(clone.forward(&inputs).unwrap(), expected);

        clone.mutate(0.5, &mut rng);
        clone.train_once(&inputs, &[1.0, 0.0], 0.5).unwrap();
        assert_eq!(original.forward(&inputs).unwrap(), expected);
        assert_ne!(clone.forward(&inputs).unwrap(), expected);
    }

    #[test]
    fn train_once_moves_output_towards_target() {
        let mut network = network(&[2, 3, 1], 0, 4);
        let inputs = [0.5, 0.25];
        let before = network.forward(&inputs).unwrap()[0];
        network.train_once(&inputs, &[0.0], 0.5).unwrap();
        let after = network.forward(&inputs).unwrap()[0];
        assert!(after < before);
    }

    #[test]
    fn train_once_rejects_bad_targets_without_training() {
        let mut network = network(&[2, 1], 0, 5);
        let before = network.clone();
        assert!(matches!(
            network.train_once(&[0.5, 0.5], &[1.0, 0.0], 0.5),
            Err(Error::ShapeMismatch(Shape::Length {
                expected: 1,
                found: 2
            }))
        ));
        assert_eq!(network, before);
    }

    #[test]
    fn train_once_rejects_bad_learning_rates_without_training() {
        let mut network = network(&[2, 1], 0, 5);
        let before = network.clone();
        for learning_rate in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                network.train_once(&[0.5, 0.5], &[1.0], learning_rate),
                Err(Error::InvalidArgument(_))
            ));
        }
        assert_eq!(network, before);
    }

    #[test]
    fn train_once_backpropagates_averaged_errors() {
        // Output layer of two neurons: the hidden layer receives
        // the average of their input errors.
        let hidden = Neuron::from_parts(vec![1.0], 0.0, vec![]);
        let outputs = vec![
            Neuron::from_parts(vec![2.0], 0.0, vec![]),
            Neuron::from_parts(vec![4.0], 0.0, vec![]),
        ];
        let mut network = NeuralNetwork {
            topology: vec![1, 1, 2],
            learning_rate: 1.0,
            layers: vec![
                NeuronsLayer::from_neurons(vec![hidden.clone()]),
                NeuronsLayer::from_neurons(outputs),
            ],
        };
        let results = network.forward(&[0.0]).unwrap();
        let hidden_output = network.last_outputs_of_layer(1).unwrap()[0];
        let hidden_input = sigmoid(0.0);

        network.train_once(&[0.0], &[1.0, 1.0], 1.0).unwrap();

        let errors = [1.0 - results[0], 1.0 - results[1]];
        let hidden_error = (errors[0] * 2.0 + errors[1] * 4.0) / 2.0;
        let gradient = hidden_error * hidden_output * (1.0 - hidden_output);
        let trained = &network.layers()[0].neurons()[0];
        assert!((trained.bias() - gradient).abs() < 1e-12);
        assert!((trained.weights()[0] - (1.0 + gradient * hidden_input)).abs() < 1e-12);
    }

    #[test]
    fn single_neuron_converges() {
        let mut network = network(&[1, 1], 0, 21);
        let mut squared_errors = Vec::with_capacity(1000);
        for _ in 0..1000 {
            let output = network.forward(&[1.0]).unwrap()[0];
            squared_errors.push((1.0 - output).powi(2));
            network.train_once(&[1.0], &[1.0], 0.1).unwrap();
        }

        let output = network.forward(&[1.0]).unwrap()[0];
        assert!(output > 0.93, "output {}", output);

        let window_means: Vec<f64> = squared_errors
            .chunks(50)
            .map(|w| w.iter().sum::<f64>() / w.len() as f64)
            .collect();
        assert!(window_means.windows(2).all(|pair| pair[1] <= pair[0]));
    }

    #[test]
    fn train_on_dataset_checks_every_example_first() {
        let mut network = network(&[2, 1], 0, 6);
        let before = network.clone();
        let examples = vec![
            (vec![0.0, 1.0], vec![1.0]),
            (vec![0.0], vec![1.0]),
        ];
        assert!(network.train_on_dataset(&examples[..], 10).is_err());
        assert_eq!(network, before);
    }

    #[test]
    fn train_on_dataset_zero_iterations() {
        let mut network = network(&[2, 1], 0, 6);
        let before = network.clone();
        let examples = vec![(vec![0.0, 1.0], vec![1.0])];
        network.train_on_dataset(&examples[..], 0).unwrap();
        assert_eq!(network.layers()[0].neurons(), before.layers()[0].neurons());
    }

    #[test]
    fn train_on_example_reduces_error() {
        let mut network = network(&[2, 2, 1], 0, 7);
        let examples = vec![(vec![1.0, -1.0], vec![0.1])];
        let before = network.error_stats(&examples[..]).unwrap().mean;
        network.train_on_example(&[1.0, -1.0], &[0.1], 100).unwrap();
        assert!(network.error_stats(&examples[..]).unwrap().mean < before);
    }

    #[test]
    fn error_stats_on_empty_dataset() {
        let mut network = network(&[1, 1], 0, 8);
        let examples: Vec<(Vec<f64>, Vec<f64>)> = vec![];
        assert!(matches!(
            network.error_stats(&examples[..]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn generate_generation_elite_and_mutants() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let parent = network(&[3, 4, 2], 1, 9);
        let generation = parent.generate_generation(5, 0.1, &mut rng).unwrap();
        assert_eq!(generation.len(), 5);
        assert_eq!(all_parameters(&generation[0]), all_parameters(&parent));
        for mutant in &generation[1..] {
            assert_eq!(mutant.topology(), parent.topology());
            let (mutated, original) = (all_parameters(mutant), all_parameters(&parent));
            assert!(mutated.iter().zip(&original).any(|(m, o)| m != o));
            assert!(mutated.iter().zip(&original).all(|(m, o)| (m - o).abs() < 0.1));
        }
    }

    #[test]
    fn generate_generation_rejects_bad_arguments() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let parent = network(&[1, 1], 0, 10);
        for (count, deviation) in [(0, 0.1), (3, 0.0), (3, -1.0), (3, f64::NAN)] {
            assert!(matches!(
                parent.generate_generation(count, deviation, &mut rng),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn generate_generation_leaves_parent_untouched() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let parent = network(&[2, 2], 0, 11);
        let copy = parent.clone();
        parent.generate_generation(4, 1.0, &mut rng).unwrap();
        assert_eq!(parent, copy);
    }

    #[test]
    fn pair_with_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let a = network(&[4, 3, 2], 2, 12);
        let b = network(&[4, 3, 2], 2, 13);
        assert_eq!(
            all_parameters(&a.pair_with(&b, 0.0, &mut rng).unwrap()),
            all_parameters(&a)
        );
        assert_eq!(
            all_parameters(&a.pair_with(&b, 1.0, &mut rng).unwrap()),
            all_parameters(&b)
        );
    }

    #[test]
    fn pair_with_keeps_self_learning_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(14);
        let a = network(&[2, 2], 0, 14);
        let mut b = network(&[2, 2], 0, 15);
        b.set_learning_rate(0.9).unwrap();
        assert_eq!(a.pair_with(&b, 1.0, &mut rng).unwrap().learning_rate(), 0.1);
    }

    #[test]
    fn pair_with_rejects_mismatches() {
        let mut rng = ChaCha8Rng::seed_from_u64(16);
        let a = network(&[2, 3, 1], 0, 16);
        let b = network(&[2, 4, 1], 0, 17);
        assert!(matches!(
            a.pair_with(&b, 0.5, &mut rng),
            Err(Error::ShapeMismatch(Shape::Topology { .. }))
        ));
        let c = network(&[2, 3, 1], 0, 18);
        for dominance in [-0.1, 1.1, f64::NAN] {
            assert!(matches!(
                a.pair_with(&c, dominance, &mut rng),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn pair_with_rejects_differing_memory_depths() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let a = network(&[2, 2, 1], 2, 21);
        let b = network(&[2, 2, 1], 0, 22);
        assert!(matches!(
            a.pair_with(&b, 0.5, &mut rng),
            Err(Error::ShapeMismatch(Shape::MemoryDepth {
                layer: 0,
                neuron: 0,
                expected: 2,
                found: 0
            }))
        ));
        assert!(matches!(
            b.pair_with(&a, 0.5, &mut rng),
            Err(Error::ShapeMismatch(Shape::MemoryDepth {
                expected: 0,
                found: 2,
                ..
            }))
        ));
    }

    #[test]
    fn set_learning_rate_validates() {
        let mut network = network(&[1, 1], 0, 19);
        assert!(network.set_learning_rate(0.0).is_err());
        assert_eq!(network.learning_rate(), 0.1);
        network.set_learning_rate(0.3).unwrap();
        assert_eq!(network.learning_rate(), 0.3);
    }

    #[test]
    fn serde_round_trip() {
        let network = network(&[3, 2, 1], 1, 20);
        let json = serde_json::to_string(&network).unwrap();
        assert_eq!(serde_json::from_str::<NeuralNetwork>(&json).unwrap(), network);
    }

    #[test]
    fn deserialize_rejects_inconsistent_networks() {
        let layer = r#"{"neurons":[{"weights":[0.5,0.5],"bias":0.0,"feedback_weights":[]}]}"#;
        let valid = format!(r#"{{"topology":[2,1],"learning_rate":0.1,"layers":[{}]}}"#, layer);
        assert!(serde_json::from_str::<NeuralNetwork>(&valid).is_ok());

        for json in [
            r#"{"topology":[],"learning_rate":0.1,"layers":[]}"#.to_string(),
            r#"{"topology":[2,1],"learning_rate":0.1,"layers":[]}"#.to_string(),
            format!(r#"{{"topology":[2,1],"learning_rate":-1.0,"layers":[{}]}}"#, layer),
            format!(r#"{{"topology":[3,1],"learning_rate":0.1,"layers":[{}]}}"#, layer),
            format!(r#"{{"topology":[2,2],"learning_rate":0.1,"layers":[{}]}}"#, layer),
            r#"{"topology":[2,1],"learning_rate":0.1,"layers":[{"neurons":[]}]}"#.to_string(),
        ] {
            assert!(serde_json::from_str::<NeuralNetwork>(&json).is_err(), "{}", json);
        }
    }
}
