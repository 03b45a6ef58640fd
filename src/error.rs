//! Error types for simplification.

use thiserror::Error;

/// Everything that can go wrong before a simplification starts.
///
/// Every variant is raised before any copy or mutation takes place, so an
/// error never leaves a half-simplified geometry behind.
#[derive(Error, Debug)]
pub enum Error {
    /// The top-level value was not a JSON object.
    #[error("expected an object, got {0}")]
    NotAnObject(&'static str),

    /// The object's `type` member was missing or isn't one of the nine GeoJSON kinds.
    #[error("expected a GeoJSON object, got {}", describe_tag(.0))]
    UnknownType(Option<String>),

    /// The object had a recognised `type` but its members didn't fit it.
    #[error("malformed GeoJSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The `tolerance` option was not a finite number greater than zero.
    #[error("tolerance must be a finite number greater than 0, got {0}")]
    Tolerance(f64),

    /// The `fraction` option was not a finite number greater than zero.
    #[error("fraction must be a finite number greater than 0, got {0}")]
    Fraction(f64),

    /// The `fraction` option was larger than one.
    #[error("fraction must not be greater than 1, got {0}")]
    FractionAboveOne(f64),

    /// At least one of the positions was infinite.
    #[error("one of the positions was infinite")]
    Infinity,

    /// At least one of the positions was not a number.
    #[error("one of the positions had a NaN")]
    NaN,
}

fn describe_tag(tag: &Option<String>) -> String {
    match tag {
        Some(tag) => format!("an object with type {tag:?}"),
        None => "an object without a type".to_owned(),
    }
}

impl Error {
    /// Is this a complaint about the shape of the input value itself?
    pub fn is_type_error(&self) -> bool {
        matches!(self, Error::NotAnObject(_) | Error::UnknownType(_))
    }

    /// Is this a complaint about an out-of-domain option or coordinate?
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Error::Tolerance(_)
                | Error::Fraction(_)
                | Error::FractionAboveOne(_)
                | Error::Infinity
                | Error::NaN
        )
    }
}

/// Result type alias for simplification.
pub type Result<T> = std::result::Result<T, Error>;
