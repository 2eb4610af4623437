//! File handling and number-list encoding shared by
//! the network and dataset text formats.
use crate::errors::{Error, Result, UnpackError};

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

/// Opens `path` for writing, truncating it if `overwrite` is set.
///
/// # Errors
/// Returns [`Error::AlreadyExists`] if the file exists
/// and `overwrite` is `false`.
pub fn create(path: &Path, overwrite: bool) -> Result<BufWriter<File>> {
    let file = if overwrite {
        File::create(path)
    } else {
        OpenOptions::new().write(true).create_new(true).open(path)
    };
    match file {
        Ok(file) => Ok(BufWriter::new(file)),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(Error::AlreadyExists(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Opens `path` for buffered reading.
///
/// # Errors
/// Returns [`Error::NotFound`] if the file doesn't exist.
pub fn open(path: &Path) -> Result<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::NotFound(path.to_path_buf())),
        Err(e) => Err(e.into()),
    }
}

/// Joins values with single spaces. Uses the shortest
/// representation that parses back to the same `f64`.
///
/// # Examples
/// ```
/// use oxinet::files::format_values;
///
/// assert_eq!(format_values(&[0.5, -2.0, 0.1]), "0.5 -2 0.1");
/// ```
pub fn format_values(values: &[f64]) -> String {
    values
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a list of numbers separated by single spaces.
///
/// # Errors
/// Returns [`UnpackError::InvalidNumber`] with the
/// offending token if any token fails to parse.
///
/// # Examples
/// ```
/// use oxinet::files::parse_values;
///
/// assert_eq!(parse_values("0.5 -2 0.1").unwrap(), vec![0.5, -2.0, 0.1]);
/// assert!(parse_values("0.5  1").is_err());
/// ```
pub fn parse_values(line: &str) -> std::result::Result<Vec<f64>, UnpackError> {
    line.split(' ')
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| UnpackError::InvalidNumber(token.to_string()))
        })
        .collect()
}
