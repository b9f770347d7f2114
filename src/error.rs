use thiserror::Error;

use crate::geometry::BoundaryId;

/// Failure to compile an expression string into a parsed function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedCharacter { ch: char, pos: usize },
    #[error("invalid number literal '{literal}' at position {pos}")]
    InvalidNumber { literal: String, pos: usize },
    #[error("expected {expected} at position {pos}, found '{found}'")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        pos: usize,
    },
    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("unknown variable or constant '{0}'")]
    UnknownSymbol(String),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("function '{name}' takes {expected} argument(s), found {found}")]
    ArgumentCount {
        name: String,
        expected: &'static str,
        found: usize,
    },
    #[error("empty expression")]
    Empty,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read parameter file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed parameter file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("entry '{0}' was not declared")]
    Undeclared(String),
    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
    #[error("cannot parse component {component} of the function expression: {source}")]
    Expression {
        component: usize,
        #[source]
        source: ParseError,
    },
    #[error("function expression has {found} component(s) but {expected} are required")]
    ComponentCount { expected: usize, found: usize },
    #[error("function needs {expected} variable names (coordinates and time), found {found}")]
    VariableCount { expected: usize, found: usize },
    #[error("invalid variable or constant name '{0}'")]
    InvalidName(String),
    #[error("unknown coordinate system '{0}', expected one of cartesian|spherical|depth")]
    UnknownCoordinateSystem(String),
    #[error("unknown {kind} '{name}'")]
    UnknownModel { kind: &'static str, name: String },
    #[error("unknown boundary name '{0}'")]
    UnknownBoundary(String),
    #[error("model '{model}' requires a {geometry} geometry")]
    IncompatibleGeometry {
        model: &'static str,
        geometry: &'static str,
    },
    #[error("dimension {0} is not supported")]
    UnsupportedDimension(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("component index {index} is out of range for {n_components} component(s)")]
    ComponentOutOfRange { index: usize, n_components: usize },
    #[error("division by zero while evaluating component {component}")]
    DivisionByZero { component: usize },
    #[error("component {component} evaluated to a non-finite value ({value})")]
    NonFinite { component: usize, value: f64 },
    #[error("no composition is defined on boundary {0}")]
    UnknownBoundary(BoundaryId),
}
