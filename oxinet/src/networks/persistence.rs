use super::config::{check_learning_rate, check_topology};
use super::NeuralNetwork;
use crate::errors::{Error, Result, UnpackError};
use crate::files;
use crate::layers::NeuronsLayer;

use log::debug;

use std::io::{BufRead, Write};
use std::path::Path;

/// Line terminating each layer's group of neuron lines.
pub const LAYER_SENTINEL: &str = "END LAYER";

impl NeuralNetwork {
    /// Writes the network to `path` in its text format.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyExists`] if the file exists and
    /// `overwrite` is `false`, or [`Error::Io`] if writing fails.
    pub fn save(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        let mut writer = files::create(path, overwrite)?;
        self.write_to(&mut writer)?;
        writer.flush()?;
        debug!("saved network {:?} to {}", self.topology, path.display());
        Ok(())
    }

    /// Reads a network from a file written by [`save`].
    ///
    /// [`save`]: NeuralNetwork::save
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the file doesn't exist, or
    /// [`Error::Malformed`] if its contents aren't a valid network.
    pub fn load(path: impl AsRef<Path>) -> Result<NeuralNetwork> {
        let path = path.as_ref();
        let network = NeuralNetwork::read_from(files::open(path)?)?;
        debug!("loaded network {:?} from {}", network.topology, path.display());
        Ok(network)
    }

    /// Writes the network in its text format: the topology on the
    /// first line, the learning rate on the second, then one line
    /// per neuron with each layer's group closed by [`LAYER_SENTINEL`].
    ///
    /// # Examples
    /// ```
    /// use oxinet::NeuralNetwork;
    ///
    /// let network = NeuralNetwork::read_from("2 1\n0.5\n0.25 1 -1|0.5\nEND LAYER\n".as_bytes())
    ///     .unwrap();
    ///
    /// let mut buffer = vec![];
    /// network.write_to(&mut buffer).unwrap();
    /// assert_eq!(
    ///     String::from_utf8(buffer).unwrap(),
    ///     "2 1\n0.5\n0.25 1 -1|0.5\nEND LAYER\n"
    /// );
    /// ```
    ///
    /// # Errors
    /// Returns [`Error::Io`] if writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let topology = self
            .topology
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{}", topology)?;
        writeln!(writer, "{}", self.learning_rate)?;
        for layer in &self.layers {
            for line in layer.pack() {
                writeln!(writer, "{}", line)?;
            }
            writeln!(writer, "{}", LAYER_SENTINEL)?;
        }
        Ok(())
    }

    /// Reads a network in the format produced by [`write_to`].
    ///
    /// Blank lines are allowed between layer groups and after
    /// the last one. Neurons are restored with empty history.
    ///
    /// [`write_to`]: NeuralNetwork::write_to
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] with the 1-based number of the
    /// offending line if the topology, learning rate or any neuron
    /// fails to decode, if a layer group is unterminated or holds the
    /// wrong number of neurons, or if the number of layer groups
    /// doesn't match the topology.
    pub fn read_from<R: BufRead>(reader: R) -> Result<NeuralNetwork> {
        let lines = reader
            .lines()
            .map(|line| line.map(|l| l.trim_end_matches('\r').to_string()))
            .collect::<std::io::Result<Vec<_>>>()?;

        let topology = lines
            .first()
            .ok_or_else(|| Error::malformed(1, "missing topology"))
            .and_then(|line| parse_topology(line).map_err(|reason| Error::malformed(1, reason)))?;
        let learning_rate = lines
            .get(1)
            .ok_or_else(|| Error::malformed(2, "missing learning rate"))
            .and_then(|line| {
                parse_learning_rate(line).map_err(|reason| Error::malformed(2, reason))
            })?;

        let mut layers = Vec::with_capacity(topology.len() - 1);
        // Index into `lines`; the line number is one more.
        let mut cursor = 2;
        for (layer_index, widths) in topology.windows(2).enumerate() {
            while lines.get(cursor).map_or(false, |l| l.trim().is_empty()) {
                cursor += 1;
            }
            if cursor == lines.len() {
                return Err(Error::malformed(
                    cursor + 1,
                    format!(
                        "expected {} layers, found {}",
                        topology.len() - 1,
                        layer_index
                    ),
                ));
            }

            let group_start = cursor;
            let group_end = lines[group_start..]
                .iter()
                .position(|l| l == LAYER_SENTINEL)
                .map(|offset| group_start + offset)
                .ok_or_else(|| {
                    Error::malformed(
                        lines.len() + 1,
                        format!("layer {} is missing {:?}", layer_index, LAYER_SENTINEL),
                    )
                })?;

            let group = &lines[group_start..group_end];
            if group.len() != widths[1] {
                return Err(Error::malformed(
                    group_start + 1,
                    format!(
                        "layer {} has {} neurons, topology requires {}",
                        layer_index,
                        group.len(),
                        widths[1]
                    ),
                ));
            }
            let layer = NeuronsLayer::unpack(group, widths[0]).map_err(|e| match e {
                UnpackError::Neuron { index, source } => {
                    Error::malformed(group_start + index + 1, source)
                }
                other => Error::malformed(group_start + 1, other),
            })?;
            layers.push(layer);
            cursor = group_end + 1;
        }

        if let Some(offset) = lines[cursor..].iter().position(|l| !l.trim().is_empty()) {
            return Err(Error::malformed(
                cursor + offset + 1,
                "unexpected content after the last layer",
            ));
        }

        Ok(NeuralNetwork {
            topology,
            learning_rate,
            layers,
        })
    }
}

fn parse_topology(line: &str) -> std::result::Result<Vec<usize>, String> {
    let topology = line
        .split(' ')
        .map(|token| {
            token
                .parse::<usize>()
                .map_err(|_| format!("{:?} is not a layer width", token))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    check_topology(&topology).map_err(|e| e.to_string())?;
    Ok(topology)
}

fn parse_learning_rate(line: &str) -> std::result::Result<f64, String> {
    let learning_rate = line
        .parse::<f64>()
        .map_err(|_| format!("{:?} is not a learning rate", line))?;
    check_learning_rate(learning_rate).map_err(|e| e.to_string())?;
    Ok(learning_rate)
}
