//! Boundary composition for finite-element convection solvers.
//!
//! The main entry point is [`boundary::FunctionBoundary`], which evaluates a
//! user-written expression of position and time at boundary points, in
//! Cartesian, spherical or depth coordinates. The other boundary models,
//! the geometry models and the expression engine exist to serve it.

pub mod boundary;
pub mod coordinates;
pub mod error;
pub mod function_parser;
pub mod geometry;
pub mod io;
pub mod simulator;

pub use boundary::{BoundaryComposition, BoundaryCompositionModel, FunctionBoundary};
pub use coordinates::CoordinateSystem;
pub use error::{ConfigError, EvaluationError, ParseError};
pub use function_parser::ParsedFunction;
pub use geometry::{BoundaryId, GeometryModel};
