//! Neurons are the computational units of a network.
//!
//! A neuron computes a weighted sum of its inputs plus its bias,
//! optionally adds a weighted sum of its own most recent outputs
//! (its _memory_), and squashes the result through a logistic
//! activation. A memory depth of 0 yields a plain feedforward unit.
use crate::errors::UnpackError;
use crate::files::{format_values, parse_values};
use crate::rng;

use rand::Rng;
use serde::{Deserialize, Serialize};

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Logistic activation, `1 / (1 + e^-x)`.
///
/// # Examples
/// ```
/// use oxinet::neurons::sigmoid;
///
/// assert_eq!(sigmoid(0.0), 0.5);
/// assert!(sigmoid(10.0) > 0.99);
/// ```
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Derivative of the logistic function,
/// expressed in terms of its output.
fn sigmoid_derivative(output: f64) -> f64 {
    output * (1.0 - output)
}

/// A sigmoid unit with an optional bounded memory
/// of its own previous outputs.
///
/// The weights, bias and feedback weights make up the
/// neuron's genome. The output history is runtime state:
/// it is neither cloned nor serialized.
#[derive(PartialEq, Debug, Serialize, Deserialize)]
pub struct Neuron {
    weights: Box<[f64]>,
    bias: f64,
    feedback_weights: Box<[f64]>,
    // Most recent output first.
    #[serde(skip)]
    history: VecDeque<f64>,
}

impl Neuron {
    /// Returns a neuron taking `input_count` inputs and remembering
    /// its last `memory_depth` outputs. All weights and the bias are
    /// drawn uniformly from `[0, 1)`.
    ///
    /// # Examples
    /// ```
    /// use oxinet::neurons::Neuron;
    ///
    /// let neuron = Neuron::new(3, 2, &mut rand::thread_rng());
    /// assert_eq!(neuron.weights().len(), 3);
    /// assert_eq!(neuron.memory_depth(), 2);
    /// assert!(neuron.history().is_empty());
    /// ```
    pub fn new<R: Rng + ?Sized>(input_count: usize, memory_depth: usize, rng: &mut R) -> Neuron {
        let weights = (0..input_count).map(|_| rng.gen::<f64>()).collect();
        let feedback_weights = (0..memory_depth).map(|_| rng.gen::<f64>()).collect();
        Neuron {
            weights,
            bias: rng.gen(),
            feedback_weights,
            history: VecDeque::with_capacity(memory_depth),
        }
    }

    /// Returns a neuron with the given parameters and an empty history.
    ///
    /// # Examples
    /// ```
    /// use oxinet::neurons::{sigmoid, Neuron};
    ///
    /// let mut neuron = Neuron::from_parts(vec![1.0, -1.0], 0.5, vec![]);
    /// assert_eq!(neuron.activate(&[2.0, 1.0]), sigmoid(2.0 - 1.0 + 0.5));
    /// ```
    pub fn from_parts(weights: Vec<f64>, bias: f64, feedback_weights: Vec<f64>) -> Neuron {
        let memory_depth = feedback_weights.len();
        Neuron {
            weights: weights.into(),
            bias,
            feedback_weights: feedback_weights.into(),
            history: VecDeque::with_capacity(memory_depth),
        }
    }

    /// Computes the neuron's output for `inputs`, recording it
    /// in the neuron's history if it has any memory.
    ///
    /// # Panics
    /// This function panics if the length of `inputs`
    /// differs from the neuron's weight count.
    ///
    /// # Examples
    /// ```
    /// use oxinet::neurons::{sigmoid, Neuron};
    ///
    /// let mut neuron = Neuron::from_parts(vec![1.0], 0.0, vec![2.0]);
    ///
    /// let first = neuron.activate(&[1.0]);
    /// assert_eq!(first, sigmoid(1.0));
    ///
    /// // The previous output now feeds back in.
    /// assert_eq!(neuron.activate(&[1.0]), sigmoid(1.0 + 2.0 * first));
    /// ```
    pub fn activate(&mut self, inputs: &[f64]) -> f64 {
        assert_eq!(
            inputs.len(),
            self.weights.len(),
            "neuron with {} weights activated with {} inputs",
            self.weights.len(),
            inputs.len()
        );
        let mut sum = 0.0;
        for (input, weight) in inputs.iter().zip(self.weights.iter()) {
            sum += input * weight;
        }
        for (past_output, weight) in self.history.iter().zip(self.feedback_weights.iter()) {
            sum += past_output * weight;
        }
        sum += self.bias;

        let output = sigmoid(sum);
        if !self.feedback_weights.is_empty() {
            self.history.push_front(output);
            self.history.truncate(self.feedback_weights.len());
        }
        output
    }

    /// Adjusts the neuron's parameters for the given output `error`,
    /// and returns the error attributed to each of its inputs.
    ///
    /// `last_inputs` and `last_output` must be those of the
    /// activation being corrected. Input errors are computed
    /// with the weights as they were _before_ this update.
    ///
    /// # Panics
    /// This function panics if the length of `last_inputs`
    /// differs from the neuron's weight count.
    ///
    /// # Examples
    /// ```
    /// use oxinet::neurons::Neuron;
    ///
    /// let mut neuron = Neuron::from_parts(vec![2.0, -1.0], 0.0, vec![]);
    /// let output = neuron.activate(&[1.0, 1.0]);
    ///
    /// let input_errors = neuron.train(0.5, &[1.0, 1.0], output, 0.1);
    /// assert_eq!(input_errors, vec![0.5 * 2.0, 0.5 * -1.0]);
    ///
    /// let gradient = 0.5 * (output * (1.0 - output)) * 0.1;
    /// assert_eq!(neuron.weights(), &[2.0 + gradient, -1.0 + gradient]);
    /// assert_eq!(neuron.bias(), gradient);
    /// ```
    pub fn train(
        &mut self,
        error: f64,
        last_inputs: &[f64],
        last_output: f64,
        learning_rate: f64,
    ) -> Vec<f64> {
        assert_eq!(
            last_inputs.len(),
            self.weights.len(),
            "neuron with {} weights trained on {} inputs",
            self.weights.len(),
            last_inputs.len()
        );
        let gradient = error * sigmoid_derivative(last_output) * learning_rate;

        let input_errors = self
            .weights
            .iter_mut()
            .zip(last_inputs)
            .map(|(weight, input)| {
                let input_error = error * *weight;
                *weight += gradient * input;
                input_error
            })
            .collect();

        for (weight, past_output) in self.feedback_weights.iter_mut().zip(self.history.iter()) {
            *weight += gradient * past_output;
        }
        self.bias += gradient;

        input_errors
    }

    /// Nudges every weight, feedback weight and the bias
    /// by an independent random amount in `(-deviation, deviation)`.
    ///
    /// # Examples
    /// ```
    /// use oxinet::neurons::Neuron;
    ///
    /// let mut rng = rand::thread_rng();
    /// let mut neuron = Neuron::new(4, 1, &mut rng);
    /// let original = neuron.clone();
    ///
    /// neuron.mutate(0.1, &mut rng);
    ///
    /// for (new, old) in neuron.weights().iter().zip(original.weights()) {
    ///     assert!((new - old).abs() < 0.1);
    /// }
    /// assert!((neuron.bias() - original.bias()).abs() < 0.1);
    /// ```
    pub fn mutate<R: Rng + ?Sized>(&mut self, deviation: f64, rng: &mut R) {
        for weight in self
            .weights
            .iter_mut()
            .chain(self.feedback_weights.iter_mut())
        {
            *weight += rng::signed_deviation(rng, deviation);
        }
        self.bias += rng::signed_deviation(rng, deviation);
    }

    /// Combines the neuron with `other` and returns their child.
    ///
    /// The child starts as a clone of `self`; each weight, feedback
    /// weight and the bias is then independently replaced by `other`'s
    /// with probability `dominance`.
    ///
    /// Both neurons are expected to have the same
    /// weight and feedback weight counts.
    ///
    /// # Examples
    /// ```
    /// use oxinet::neurons::Neuron;
    ///
    /// let mut rng = rand::thread_rng();
    /// let a = Neuron::from_parts(vec![0.0, 0.0], 0.0, vec![]);
    /// let b = Neuron::from_parts(vec![1.0, 1.0], 1.0, vec![]);
    ///
    /// assert_eq!(a.pair_with(&b, 0.0, &mut rng), a);
    /// assert_eq!(a.pair_with(&b, 1.0, &mut rng), b);
    /// ```
    pub fn pair_with<R: Rng + ?Sized>(&self, other: &Neuron, dominance: f64, rng: &mut R) -> Neuron {
        debug_assert_eq!(self.weights.len(), other.weights.len());
        debug_assert_eq!(self.feedback_weights.len(), other.feedback_weights.len());

        let mut child = self.clone();
        for (gene, other_gene) in child
            .weights
            .iter_mut()
            .zip(other.weights.iter())
            .chain(child.feedback_weights.iter_mut().zip(other.feedback_weights.iter()))
        {
            if rng::gen_chance(rng, dominance) {
                *gene = *other_gene;
            }
        }
        if rng::gen_chance(rng, dominance) {
            child.bias = other.bias;
        }
        child
    }

    /// Encodes the neuron as `"<bias> <w0> ... <wn>"`, followed by
    /// `"|<fw0> ... <fwm>"` if it has any feedback weights.
    ///
    /// # Examples
    /// ```
    /// use oxinet::neurons::Neuron;
    ///
    /// let neuron = Neuron::from_parts(vec![0.25, -1.0], 0.5, vec![0.75]);
    /// assert_eq!(neuron.pack(), "0.5 0.25 -1|0.75");
    ///
    /// let neuron = Neuron::from_parts(vec![0.25, -1.0], 0.5, vec![]);
    /// assert_eq!(neuron.pack(), "0.5 0.25 -1");
    /// ```
    pub fn pack(&self) -> String {
        self.to_string()
    }

    /// Decodes a neuron from a line produced by [`pack`].
    /// A line without `|` yields a neuron without memory.
    ///
    /// [`pack`]: Neuron::pack
    ///
    /// # Errors
    /// Returns an error if the bias isn't followed by a space,
    /// or if any value isn't a number.
    ///
    /// # Examples
    /// ```
    /// use oxinet::neurons::Neuron;
    ///
    /// let neuron = Neuron::unpack("0.5 0.25 -1|0.75 0.125").unwrap();
    /// assert_eq!(neuron.bias(), 0.5);
    /// assert_eq!(neuron.weights(), &[0.25, -1.0]);
    /// assert_eq!(neuron.feedback_weights(), &[0.75, 0.125]);
    /// ```
    pub fn unpack(line: &str) -> Result<Neuron, UnpackError> {
        let (bias, rest) = line.split_once(' ').ok_or(UnpackError::MissingSeparator)?;
        let bias = bias
            .parse::<f64>()
            .map_err(|_| UnpackError::InvalidNumber(bias.to_string()))?;
        let (weights, feedback_weights) = match rest.rfind('|') {
            Some(separator) => (
                parse_values(&rest[..separator])?,
                parse_values(&rest[separator + 1..])?,
            ),
            None => (parse_values(rest)?, vec![]),
        };
        Ok(Neuron::from_parts(weights, bias, feedback_weights))
    }

    /// Forgets all previous outputs.
    pub fn clear_memory(&mut self) {
        self.history.clear();
    }

    /// Returns the neuron's input weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Returns the neuron's bias.
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Returns the weights applied to the neuron's previous outputs.
    pub fn feedback_weights(&self) -> &[f64] {
        &self.feedback_weights
    }

    /// Returns the neuron's remembered outputs, most recent first.
    pub fn history(&self) -> &VecDeque<f64> {
        &self.history
    }

    /// Returns the number of previous outputs the neuron remembers.
    pub fn memory_depth(&self) -> usize {
        self.feedback_weights.len()
    }
}

impl Clone for Neuron {
    /// Copies the neuron's parameters. The clone
    /// starts with an empty history.
    fn clone(&self) -> Neuron {
        Neuron::from_parts(
            self.weights.to_vec(),
            self.bias,
            self.feedback_weights.to_vec(),
        )
    }
}

impl fmt::Display for Neuron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.bias, format_values(&self.weights))?;
        if !self.feedback_weights.is_empty() {
            write!(f, "|{}", format_values(&self.feedback_weights))?;
        }
        Ok(())
    }
}

impl FromStr for Neuron {
    type Err = UnpackError;

    fn from_str(s: &str) -> Result<Neuron, UnpackError> {
        Neuron::unpack(s)
    }
}
