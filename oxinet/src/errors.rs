use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Specialized result type for network operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by network construction, training,
/// genetic operators and persistence.
#[derive(Debug)]
pub enum Error {
    /// A vector or network didn't have the shape required by the operation.
    ShapeMismatch(Shape),
    /// A parameter was outside of its allowed range.
    InvalidArgument(String),
    /// The file to be read doesn't exist.
    NotFound(PathBuf),
    /// The file to be written already exists, and overwriting wasn't allowed.
    AlreadyExists(PathBuf),
    /// The file or stream contents couldn't be decoded.
    /// `line` is 1-based.
    Malformed { line: usize, reason: String },
    /// Any other I/O failure.
    Io(io::Error),
}

impl Error {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Error {
        Error::InvalidArgument(reason.into())
    }

    pub(crate) fn malformed(line: usize, reason: impl fmt::Display) -> Error {
        Error::Malformed {
            line,
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch(shape) => write!(f, "shape mismatch: {}", shape),
            Self::InvalidArgument(reason) => write!(f, "invalid argument: {}", reason),
            Self::NotFound(path) => write!(f, "file {} not found", path.display()),
            Self::AlreadyExists(path) => write!(
                f,
                "file {} already exists and overwriting is disabled",
                path.display()
            ),
            Self::Malformed { line, reason } => write!(f, "malformed line {}: {}", line, reason),
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Io(e)
    }
}

/// The particular way in which shapes differed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// A vector's length didn't match the width it was fed into.
    Length { expected: usize, found: usize },
    /// Crossover was attempted between networks of differing topologies.
    Topology {
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    /// Crossover was attempted between networks whose neurons at
    /// the same position remember different numbers of outputs.
    MemoryDepth {
        layer: usize,
        neuron: usize,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length { expected, found } => write!(
                f,
                "vector of length {} given where length {} was expected",
                found, expected
            ),
            Self::Topology { expected, found } => write!(
                f,
                "network with topology {:?} is not a clone of network with topology {:?}",
                found, expected
            ),
            Self::MemoryDepth {
                layer,
                neuron,
                expected,
                found,
            } => write!(
                f,
                "neuron {} of layer {} has memory depth {}, expected {}",
                neuron, layer, found, expected
            ),
        }
    }
}

/// An error type indicating a neuron or layer couldn't
/// be decoded from its text lines or deserialized.
#[derive(Debug, Clone, PartialEq)]
pub enum UnpackError {
    /// No space separates the bias from the weights.
    MissingSeparator,
    /// A token isn't a floating-point number.
    InvalidNumber(String),
    /// The neuron's weight count doesn't match the layer's input width.
    WeightCount { expected: usize, found: usize },
    /// A layer was given no neuron lines.
    EmptyLayer,
    /// The neuron at `index` within a layer failed to unpack.
    Neuron {
        index: usize,
        source: Box<UnpackError>,
    },
}

impl fmt::Display for UnpackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator => write!(f, "no space between bias and weights"),
            Self::InvalidNumber(token) => write!(f, "{:?} is not a number", token),
            Self::WeightCount { expected, found } => write!(
                f,
                "neuron has {} weights, layer input width is {}",
                found, expected
            ),
            Self::EmptyLayer => write!(f, "layer has no neurons"),
            Self::Neuron { index, source } => write!(f, "neuron {}: {}", index, source),
        }
    }
}

impl error::Error for UnpackError {}
