use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NurbsError {
    #[error("Shape mismatch: {what} expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid degree: {axis} degree must be at least 1, derived {degree}")]
    InvalidDegree { axis: &'static str, degree: isize },

    #[error("Knot span {span} out of range (valid spans are 0..={max})")]
    SpanOutOfRange { span: usize, max: usize },

    #[error("Parameter {parameter} outside knot span {span} [{lower}, {upper}]")]
    ParameterOutOfSpan {
        parameter: f64,
        span: usize,
        lower: f64,
        upper: f64,
    },

    #[error("Parameter {parameter} is not finite")]
    NonFiniteParameter { parameter: f64 },

    #[error("Knot span {span} has zero length (both ends at {knot})")]
    DegenerateSpan { span: usize, knot: f64 },

    #[error("Index {index} out of bounds (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Knot vector decreases at index {index}")]
    KnotsNotMonotonic { index: usize },

    #[error("Weight at index {index} is not positive")]
    NonPositiveWeight { index: usize },
}

pub type Result<T> = std::result::Result<T, NurbsError>;
