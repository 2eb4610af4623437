use serde::{Deserialize, Serialize};

/// Selects one half of an example pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExampleKind {
    /// The values fed into the network.
    Inputs,
    /// The values the network should output.
    Corrects,
}

/// An interface for ordered collections of input/correct-output
/// example pairs that networks can be trained on.
///
/// Training visits examples in index order.
pub trait TrainingSet {
    /// Returns the number of examples.
    fn len(&self) -> usize;

    /// Returns one half of the example at `index`.
    ///
    /// Implementations may panic if `index` is out of range.
    fn get(&self, index: usize, kind: ExampleKind) -> &[f64];

    /// Returns `true` if there are no examples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Slices of `(inputs, corrects)` tuples are the
/// simplest training sets.
///
/// # Examples
/// ```
/// use oxinet::{ExampleKind, TrainingSet};
///
/// let examples = vec![(vec![0.0, 1.0], vec![1.0])];
/// let set: &[_] = &examples;
///
/// assert_eq!(set.len(), 1);
/// assert_eq!(TrainingSet::get(set, 0, ExampleKind::Corrects), &[1.0]);
/// ```
impl TrainingSet for [(Vec<f64>, Vec<f64>)] {
    fn len(&self) -> usize {
        <[_]>::len(self)
    }

    fn get(&self, index: usize, kind: ExampleKind) -> &[f64] {
        let (inputs, corrects) = &self[index];
        match kind {
            ExampleKind::Inputs => inputs.as_slice(),
            ExampleKind::Corrects => corrects.as_slice(),
        }
    }
}
