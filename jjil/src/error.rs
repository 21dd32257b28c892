use crate::image::{PixelFormat, Size};

/// Failures raised by stages, joins and the fixed-point math helpers.
///
/// Every variant carries the name of the failing operation and the operands
/// involved so the message is enough to diagnose the call site.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{stage}: expected {expected} image, got {found}")]
    FormatMismatch {
        stage: &'static str,
        expected: PixelFormat,
        found: PixelFormat,
    },

    #[error("{stage}: image size mismatch, expected {expected}, got {found}")]
    SizeMismatch {
        stage: &'static str,
        expected: Size,
        found: Size,
    },

    #[error("{stage}: parameter '{name}' out of range: {value}")]
    ParameterOutOfRange {
        stage: &'static str,
        name: &'static str,
        value: String,
    },

    #[error("{stage}: image {size} is smaller than the required {required}")]
    ImageTooSmall {
        stage: &'static str,
        size: Size,
        required: Size,
    },

    #[error("{stage}: no output available")]
    Empty { stage: &'static str },

    #[error("{what} index {index} out of bounds (count {count})")]
    OutOfBounds {
        what: &'static str,
        index: usize,
        count: usize,
    },

    #[error("division by zero: {context}")]
    DivideByZero { context: String },

    #[error("arithmetic overflow: {context}")]
    Overflow { context: String },

    #[error("square root of negative value {value}")]
    SqrtOfNegative { value: i64 },

    #[error("invalid polygon: {reason}")]
    InvalidPolygon { reason: String },
}

impl Error {
    pub(crate) fn parameter(
        stage: &'static str,
        name: &'static str,
        value: impl std::fmt::Display,
    ) -> Self {
        Error::ParameterOutOfRange {
            stage,
            name,
            value: value.to_string(),
        }
    }

    pub(crate) fn divide_by_zero(context: impl Into<String>) -> Self {
        Error::DivideByZero {
            context: context.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        Error::Overflow {
            context: context.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
