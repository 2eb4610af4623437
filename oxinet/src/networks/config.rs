use crate::errors::{Error, Result};

use serde::{Deserialize, Serialize};

/// Learning rate used when none is specified.
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;
/// Customary mutation deviation for [`generate_generation`].
///
/// [`generate_generation`]: crate::NeuralNetwork::generate_generation
pub const DEFAULT_DEVIATION: f64 = 0.1;
/// Customary dominance for [`pair_with`].
///
/// [`pair_with`]: crate::NeuralNetwork::pair_with
pub const DEFAULT_DOMINANCE: f64 = 0.5;

/// Configuration data for network construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Layer widths, inputs first. Element 0 is the number
    /// of network inputs, each following element the number
    /// of neurons in the next layer. Must contain at least 2
    /// elements, all nonzero.
    pub topology: Vec<usize>,
    /// Scales every weight update during training.
    /// Must be positive and finite.
    pub learning_rate: f64,
    /// Number of previous outputs each neuron remembers
    /// and feeds back into its own activation.
    /// 0 disables neuron memory entirely.
    pub memory_depth: usize,
}

impl NetworkConfig {
    /// Returns a configuration with the given topology, the
    /// [default learning rate], and no neuron memory.
    ///
    /// [default learning rate]: DEFAULT_LEARNING_RATE
    ///
    /// # Examples
    /// ```
    /// use oxinet::NetworkConfig;
    ///
    /// let config = NetworkConfig {
    ///     learning_rate: 0.5,
    ///     ..NetworkConfig::new(vec![2, 3, 1])
    /// };
    /// assert_eq!(config.memory_depth, 0);
    /// ```
    pub fn new(topology: Vec<usize>) -> NetworkConfig {
        NetworkConfig {
            topology,
            learning_rate: DEFAULT_LEARNING_RATE,
            memory_depth: 0,
        }
    }

    /// Checks the configuration describes a buildable network.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the topology has fewer
    /// than 2 elements or contains a 0, or if the learning rate
    /// isn't positive and finite.
    pub fn validate(&self) -> Result<()> {
        check_topology(&self.topology)?;
        check_learning_rate(self.learning_rate)
    }
}

impl Default for NetworkConfig {
    fn default() -> NetworkConfig {
        NetworkConfig::new(vec![1, 1])
    }
}

pub(crate) fn check_topology(topology: &[usize]) -> Result<()> {
    if topology.len() < 2 {
        Err(Error::invalid_argument(format!(
            "topology must contain at least 2 elements, got {:?}",
            topology
        )))
    } else if topology.contains(&0) {
        Err(Error::invalid_argument(format!(
            "every topology element must be greater than zero, got {:?}",
            topology
        )))
    } else {
        Ok(())
    }
}

pub(crate) fn check_learning_rate(learning_rate: f64) -> Result<()> {
    if learning_rate > 0.0 && learning_rate.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "learning rate must be positive and finite, got {}",
            learning_rate
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_topology() {
        assert!(NetworkConfig::new(vec![3]).validate().is_err());
        assert!(NetworkConfig::new(vec![]).validate().is_err());
    }

    #[test]
    fn rejects_empty_layer() {
        assert!(matches!(
            NetworkConfig::new(vec![2, 0, 1]).validate(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_bad_learning_rate() {
        for learning_rate in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let config = NetworkConfig {
                learning_rate,
                ..NetworkConfig::default()
            };
            assert!(config.validate().is_err(), "{}", learning_rate);
        }
    }

    #[test]
    fn serde_round_trip() {
        let config = NetworkConfig {
            topology: vec![4, 3, 2],
            learning_rate: 0.25,
            memory_depth: 2,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<NetworkConfig>(&json).unwrap(), config);
    }
}
