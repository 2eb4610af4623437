//! A layer is a fully-connected row of neurons
//! sharing the same inputs.
use crate::errors::UnpackError;
use crate::neurons::Neuron;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// An ordered collection of neurons with identical input width.
///
/// The inputs and outputs of the latest forward pass are
/// cached for use by the following backward pass.
#[derive(PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "LayerData")]
pub struct NeuronsLayer {
    neurons: Vec<Neuron>,
    #[serde(skip)]
    last_inputs: Vec<f64>,
    #[serde(skip)]
    last_outputs: Vec<f64>,
}

#[derive(Deserialize)]
struct LayerData {
    neurons: Vec<Neuron>,
}

impl TryFrom<LayerData> for NeuronsLayer {
    type Error = UnpackError;

    fn try_from(data: LayerData) -> Result<NeuronsLayer, UnpackError> {
        let input_count = data
            .neurons
            .first()
            .ok_or(UnpackError::EmptyLayer)?
            .weights()
            .len();
        if let Some((index, neuron)) = data
            .neurons
            .iter()
            .enumerate()
            .find(|(_, n)| n.weights().len() != input_count)
        {
            return Err(UnpackError::Neuron {
                index,
                source: Box::new(UnpackError::WeightCount {
                    expected: input_count,
                    found: neuron.weights().len(),
                }),
            });
        }
        Ok(NeuronsLayer::from_neurons(data.neurons))
    }
}

impl NeuronsLayer {
    /// Returns a layer of `width` randomly initialized neurons,
    /// each taking `input_count` inputs and remembering
    /// `memory_depth` previous outputs.
    ///
    /// # Examples
    /// ```
    /// use oxinet::layers::NeuronsLayer;
    ///
    /// let layer = NeuronsLayer::new(4, 0, 3, &mut rand::thread_rng());
    /// assert_eq!(layer.len(), 4);
    /// assert_eq!(layer.input_count(), 3);
    /// ```
    pub fn new<R: Rng + ?Sized>(
        width: usize,
        memory_depth: usize,
        input_count: usize,
        rng: &mut R,
    ) -> NeuronsLayer {
        NeuronsLayer::from_neurons(
            (0..width)
                .map(|_| Neuron::new(input_count, memory_depth, rng))
                .collect(),
        )
    }

    /// Returns a layer made of the given neurons.
    ///
    /// # Panics
    /// This function panics if `neurons` is empty, or if
    /// the neurons don't all have the same weight count.
    pub fn from_neurons(neurons: Vec<Neuron>) -> NeuronsLayer {
        assert!(!neurons.is_empty(), "attempted to create an empty layer");
        let input_count = neurons[0].weights().len();
        assert!(
            neurons.iter().all(|n| n.weights().len() == input_count),
            "neurons of differing input widths in the same layer"
        );
        NeuronsLayer {
            neurons,
            last_inputs: vec![],
            last_outputs: vec![],
        }
    }

    /// Activates every neuron on `inputs`, in order,
    /// and returns their outputs.
    ///
    /// # Panics
    /// This function panics if the length of `inputs`
    /// differs from the layer's input width.
    ///
    /// # Examples
    /// ```
    /// use oxinet::layers::NeuronsLayer;
    ///
    /// let mut layer = NeuronsLayer::new(2, 0, 3, &mut rand::thread_rng());
    /// let outputs = layer.forward(&[0.1, 0.2, 0.3]);
    ///
    /// assert_eq!(outputs.len(), 2);
    /// assert_eq!(layer.last_inputs(), &[0.1, 0.2, 0.3]);
    /// assert_eq!(layer.last_outputs(), &outputs[..]);
    /// ```
    pub fn forward(&mut self, inputs: &[f64]) -> Vec<f64> {
        let outputs: Vec<f64> = self.neurons.iter_mut().map(|n| n.activate(inputs)).collect();
        self.last_inputs.clear();
        self.last_inputs.extend_from_slice(inputs);
        self.last_outputs.clone_from(&outputs);
        outputs
    }

    /// Trains every neuron on its corresponding `output_errors` entry,
    /// using the cached values of the last forward pass, and returns the
    /// error attributed to each of the layer's inputs.
    ///
    /// The input errors reported by each neuron are averaged,
    /// not summed, over the neurons of the layer.
    ///
    /// # Panics
    /// This function panics if the length of `output_errors` differs
    /// from the layer's width, or if no forward pass has taken place.
    ///
    /// # Examples
    /// ```
    /// use oxinet::layers::NeuronsLayer;
    /// use oxinet::neurons::Neuron;
    ///
    /// let mut layer = NeuronsLayer::from_neurons(vec![
    ///     Neuron::from_parts(vec![3.0, 8.0], 0.0, vec![]),
    ///     Neuron::from_parts(vec![1.0, 4.0], 0.0, vec![]),
    /// ]);
    /// layer.forward(&[0.0, 0.0]);
    ///
    /// // The average of both neurons' opinions.
    /// assert_eq!(layer.backward(&[1.0, 1.0], 0.1), vec![2.0, 6.0]);
    /// ```
    pub fn backward(&mut self, output_errors: &[f64], learning_rate: f64) -> Vec<f64> {
        assert_eq!(
            output_errors.len(),
            self.neurons.len(),
            "{} errors given for layer of {} neurons",
            output_errors.len(),
            self.neurons.len()
        );
        assert_eq!(
            self.last_outputs.len(),
            self.neurons.len(),
            "backward pass on layer without a cached forward pass"
        );

        let mut input_errors = vec![0.0; self.last_inputs.len()];
        for ((neuron, error), last_output) in self
            .neurons
            .iter_mut()
            .zip(output_errors)
            .zip(&self.last_outputs)
        {
            let neuron_errors = neuron.train(*error, &self.last_inputs, *last_output, learning_rate);
            for (total, e) in input_errors.iter_mut().zip(neuron_errors) {
                *total += e;
            }
        }

        let neuron_count = self.neurons.len() as f64;
        for e in input_errors.iter_mut() {
            *e /= neuron_count;
        }
        input_errors
    }

    /// Mutates every neuron in the layer.
    /// See [`Neuron::mutate`].
    pub fn mutate<R: Rng + ?Sized>(&mut self, deviation: f64, rng: &mut R) {
        for neuron in self.neurons.iter_mut() {
            neuron.mutate(deviation, rng);
        }
    }

    /// Pairs each neuron with the neuron at the same
    /// position in `other`, returning the resulting layer.
    /// See [`Neuron::pair_with`].
    pub fn pair_with<R: Rng + ?Sized>(
        &self,
        other: &NeuronsLayer,
        dominance: f64,
        rng: &mut R,
    ) -> NeuronsLayer {
        debug_assert_eq!(self.neurons.len(), other.neurons.len());
        NeuronsLayer::from_neurons(
            self.neurons
                .iter()
                .zip(other.neurons.iter())
                .map(|(neuron, other_neuron)| neuron.pair_with(other_neuron, dominance, rng))
                .collect(),
        )
    }

    /// Encodes each neuron as a line, in order.
    /// See [`Neuron::pack`].
    pub fn pack(&self) -> Vec<String> {
        self.neurons.iter().map(Neuron::pack).collect()
    }

    /// Decodes a layer from one line per neuron,
    /// checking every neuron takes `input_count` inputs.
    ///
    /// # Errors
    /// Returns [`UnpackError::EmptyLayer`] if there are no lines,
    /// or [`UnpackError::Neuron`] with the index of the first
    /// line that fails to decode or has the wrong weight count.
    ///
    /// # Examples
    /// ```
    /// use oxinet::layers::NeuronsLayer;
    ///
    /// let layer = NeuronsLayer::unpack(&["0 1 2", "0.5 3 4|0.25"], 2).unwrap();
    /// assert_eq!(layer.len(), 2);
    /// assert_eq!(layer.neurons()[1].memory_depth(), 1);
    ///
    /// assert!(NeuronsLayer::unpack(&["0 1 2 3"], 2).is_err());
    /// ```
    pub fn unpack<S: AsRef<str>>(lines: &[S], input_count: usize) -> Result<NeuronsLayer, UnpackError> {
        if lines.is_empty() {
            return Err(UnpackError::EmptyLayer);
        }
        let neurons = lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                Neuron::unpack(line.as_ref())
                    .and_then(|neuron| {
                        if neuron.weights().len() == input_count {
                            Ok(neuron)
                        } else {
                            Err(UnpackError::WeightCount {
                                expected: input_count,
                                found: neuron.weights().len(),
                            })
                        }
                    })
                    .map_err(|e| UnpackError::Neuron {
                        index,
                        source: Box::new(e),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NeuronsLayer::from_neurons(neurons))
    }

    /// Forgets the previous outputs of every neuron.
    pub fn clear_memory(&mut self) {
        for neuron in self.neurons.iter_mut() {
            neuron.clear_memory();
        }
    }

    /// Returns the layer's neurons.
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Returns the number of neurons in the layer.
    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    /// Always `false`: construction, unpacking and
    /// deserialization all reject empty layers.
    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    /// Returns the number of inputs each neuron takes.
    pub fn input_count(&self) -> usize {
        self.neurons[0].weights().len()
    }

    /// Returns the inputs of the last forward pass,
    /// or an empty slice if there hasn't been one.
    pub fn last_inputs(&self) -> &[f64] {
        &self.last_inputs
    }

    /// Returns the outputs of the last forward pass,
    /// or an empty slice if there hasn't been one.
    pub fn last_outputs(&self) -> &[f64] {
        &self.last_outputs
    }
}

impl Clone for NeuronsLayer {
    /// Clones the layer's neurons. The clone
    /// starts without cached inputs and outputs.
    fn clone(&self) -> NeuronsLayer {
        NeuronsLayer::from_neurons(self.neurons.clone())
    }
}
