//! # OxiNet-Data
//! An ordered container of input/correct-output example pairs, for
//! training [`OxiNet`](https://crates.io/crates/oxinet) networks.
//!
//! [`Dataset`] implements `oxinet`'s [`TrainingSet`] trait, and can be
//! saved to and loaded from a plain text format of alternating lines:
//! each example's inputs, then its correct outputs, each line a list of
//! numbers separated by single spaces.
//!
//! # Example usage
//! ```
//! use oxinet::{NetworkConfig, NeuralNetwork};
//! use oxinet_data::{Dataset, ExampleKind};
//!
//! let mut dataset = Dataset::new();
//! dataset.add(vec![0.0, 1.0], vec![1.0]);
//! dataset.add(vec![1.0, 1.0], vec![0.0]);
//! assert_eq!(dataset[(1, ExampleKind::Inputs)], [1.0, 1.0]);
//!
//! let mut buffer = vec![];
//! dataset.write_to(&mut buffer).unwrap();
//! assert_eq!(String::from_utf8(buffer).unwrap(), "0 1\n1\n1 1\n0\n");
//!
//! let mut network =
//!     NeuralNetwork::new(&NetworkConfig::new(vec![2, 1]), &mut rand::thread_rng()).unwrap();
//! network.train_on_dataset(&dataset, 10).unwrap();
//! ```
use oxinet::files::{self, format_values, parse_values};
use oxinet::{Error, Result, TrainingSet};

pub use oxinet::ExampleKind;

use log::debug;
use serde::{Deserialize, Serialize};

use std::io::{BufRead, Write};
use std::ops::{Index, IndexMut};
use std::path::Path;

/// An ordered list of example pairs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    examples: Vec<(Vec<f64>, Vec<f64>)>,
}

impl Dataset {
    /// Returns an empty dataset.
    pub fn new() -> Dataset {
        Dataset::default()
    }

    /// Reads a dataset from a file written by [`save`].
    ///
    /// [`save`]: Dataset::save
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the file doesn't exist, or
    /// [`Error::Malformed`] if its contents aren't a valid dataset.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        let dataset = Dataset::read_from(files::open(path)?)?;
        debug!("read {} examples from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Appends an example pair.
    pub fn add(&mut self, inputs: Vec<f64>, corrects: Vec<f64>) {
        self.examples.push((inputs, corrects));
    }

    /// Removes the example at `index`, shifting
    /// all following examples down by one.
    ///
    /// # Panics
    /// This function panics if `index` is out of range.
    pub fn remove_at(&mut self, index: usize) {
        self.examples.remove(index);
    }

    /// Returns one half of the example at `index`.
    ///
    /// # Panics
    /// This function panics if `index` is out of range.
    pub fn get(&self, index: usize, kind: ExampleKind) -> &[f64] {
        let (inputs, corrects) = &self.examples[index];
        match kind {
            ExampleKind::Inputs => inputs.as_slice(),
            ExampleKind::Corrects => corrects.as_slice(),
        }
    }

    /// Replaces one half of the example at `index`.
    ///
    /// # Panics
    /// This function panics if `index` is out of range.
    ///
    /// # Examples
    /// ```
    /// use oxinet_data::{Dataset, ExampleKind};
    ///
    /// let mut dataset = Dataset::new();
    /// dataset.add(vec![0.0], vec![0.0]);
    /// dataset.set(0, ExampleKind::Corrects, vec![1.0, 0.5]);
    /// assert_eq!(dataset.get(0, ExampleKind::Corrects), &[1.0, 0.5]);
    /// ```
    pub fn set(&mut self, index: usize, kind: ExampleKind, values: Vec<f64>) {
        let (inputs, corrects) = &mut self.examples[index];
        match kind {
            ExampleKind::Inputs => *inputs = values,
            ExampleKind::Corrects => *corrects = values,
        }
    }

    /// Returns the number of examples.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Returns `true` if there are no examples.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Returns an iterator over `(inputs, corrects)` pairs, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&[f64], &[f64])> {
        self.examples
            .iter()
            .map(|(inputs, corrects)| (inputs.as_slice(), corrects.as_slice()))
    }

    /// Writes the dataset to `path`.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyExists`] if the file exists and
    /// `overwrite` is `false`, or [`Error::Io`] if writing fails.
    pub fn save(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        let mut writer = files::create(path, overwrite)?;
        self.write_to(&mut writer)?;
        writer.flush()?;
        debug!("saved {} examples to {}", self.len(), path.display());
        Ok(())
    }

    /// Replaces the dataset's contents with those of a file
    /// written by [`save`]. The dataset is left unchanged
    /// if loading fails.
    ///
    /// [`save`]: Dataset::save
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the file doesn't exist, or
    /// [`Error::Malformed`] if its contents aren't a valid dataset.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        *self = Dataset::from_file(path)?;
        Ok(())
    }

    /// Writes every example as two lines: its inputs, then its
    /// correct outputs. An empty vector is written as an empty line.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for (inputs, corrects) in self.iter() {
            writeln!(writer, "{}", format_values(inputs))?;
            writeln!(writer, "{}", format_values(corrects))?;
        }
        Ok(())
    }

    /// Reads a dataset in the format produced by [`write_to`].
    ///
    /// [`write_to`]: Dataset::write_to
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] with the 1-based line number if a
    /// line holds something other than numbers separated by single
    /// spaces, or if the last example has no correct-outputs line.
    pub fn read_from<R: BufRead>(reader: R) -> Result<Dataset> {
        let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        if lines.len() % 2 != 0 {
            return Err(Error::Malformed {
                line: lines.len() + 1,
                reason: format!("example {} has no correct outputs", lines.len() / 2),
            });
        }

        let parse = |index: usize| -> Result<Vec<f64>> {
            let line = lines[index].trim_end_matches('\r');
            if line.is_empty() {
                return Ok(vec![]);
            }
            parse_values(line).map_err(|e| Error::Malformed {
                line: index + 1,
                reason: e.to_string(),
            })
        };
        let examples = (0..lines.len())
            .step_by(2)
            .map(|i| -> Result<_> { Ok((parse(i)?, parse(i + 1)?)) })
            .collect::<Result<Vec<_>>>()?;
        Ok(Dataset { examples })
    }
}

impl TrainingSet for Dataset {
    fn len(&self) -> usize {
        self.examples.len()
    }

    fn get(&self, index: usize, kind: ExampleKind) -> &[f64] {
        Dataset::get(self, index, kind)
    }
}

impl Index<(usize, ExampleKind)> for Dataset {
    type Output = [f64];

    fn index(&self, (index, kind): (usize, ExampleKind)) -> &[f64] {
        Dataset::get(self, index, kind)
    }
}

impl IndexMut<(usize, ExampleKind)> for Dataset {
    fn index_mut(&mut self, (index, kind): (usize, ExampleKind)) -> &mut [f64] {
        let (inputs, corrects) = &mut self.examples[index];
        match kind {
            ExampleKind::Inputs => inputs.as_mut_slice(),
            ExampleKind::Corrects => corrects.as_mut_slice(),
        }
    }
}

impl FromIterator<(Vec<f64>, Vec<f64>)> for Dataset {
    fn from_iter<I: IntoIterator<Item = (Vec<f64>, Vec<f64>)>>(iter: I) -> Dataset {
        Dataset {
            examples: iter.into_iter().collect(),
        }
    }
}

impl Extend<(Vec<f64>, Vec<f64>)> for Dataset {
    fn extend<I: IntoIterator<Item = (Vec<f64>, Vec<f64>)>>(&mut self, iter: I) {
        self.examples.extend(iter);
    }
}
