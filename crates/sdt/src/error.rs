//! Error types for SDT marshalling, map class lookup and validation.
//!
//! Note that [`DecodeError`] never escapes the public unmarshalling entry
//! points: a malformed node is returned as a literal scalar instead. The
//! error exists so the parser can be written as an ordinary `Result`
//! pipeline and so the reason for a fallback can be logged.

use thiserror::Error;

/// Error while parsing marshalled data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("no colon delimiter found while reading {context}")]
    MissingDelimiter { context: &'static str },

    #[error("invalid length field {text:?} in {context}")]
    InvalidLength { context: &'static str, text: String },

    #[error("{context} declares {declared} characters but {actual} remain")]
    LengthMismatch {
        context: &'static str,
        declared: usize,
        actual: usize,
    },

    #[error("unexpected end of data while reading {context}")]
    UnexpectedEnd { context: &'static str },

    #[error("map class {name:?} is not defined in the context")]
    UnknownMapClass { name: String },

    #[error("map class {name:?} has {keys} keys but the instance carries more values")]
    TooManyFields { name: String, keys: usize },

    #[error("malformed map class map: {reason}")]
    MalformedMapClassMap { reason: &'static str },

    #[error("nesting depth exceeds maximum {max}")]
    NestingTooDeep { max: usize },
}

/// Error looking up a map class definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapClassError {
    #[error("map class {name:?} does not exist")]
    DoesNotExist { name: String },
}

/// Error during caller-level validation of a value tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("map class {name:?} is not defined in the context")]
    UnknownMapClass { name: String },

    #[error("instance of {class:?} is missing field {key:?}")]
    MissingField { class: String, key: String },

    #[error("instance of {class:?} has field {key:?} which the map class does not declare")]
    UnexpectedField { class: String, key: String },
}

impl From<MapClassError> for ValidationError {
    fn from(err: MapClassError) -> Self {
        match err {
            MapClassError::DoesNotExist { name } => ValidationError::UnknownMapClass { name },
        }
    }
}
