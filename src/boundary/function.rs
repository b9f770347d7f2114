//! Boundary composition given by a closed-form expression of position and
//! time, evaluated in a user-selected coordinate system.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, warn};
use nalgebra::Point;

use super::BoundaryComposition;
use crate::coordinates::{CoordinateSystem, cartesian_to_other_coordinates};
use crate::error::{ConfigError, EvaluationError};
use crate::function_parser::{ParsedFunction, parse_constants};
use crate::geometry::{BoundaryId, GeometryModel};
use crate::io::param_parser::{ParameterHandler, Pattern};
use crate::simulator::{SimulatorContext, YEAR_IN_SECONDS};

#[derive(Clone, Debug)]
pub struct FunctionBoundary<const DIM: usize> {
    function: ParsedFunction<DIM>,
    min_composition: f64,
    max_composition: f64,
    coordinate_system: CoordinateSystem,
    geometry: Arc<dyn GeometryModel<DIM>>,
    time_scale: f64,
}

impl<const DIM: usize> FunctionBoundary<DIM> {
    pub fn new(
        function: ParsedFunction<DIM>,
        min_composition: f64,
        max_composition: f64,
        coordinate_system: CoordinateSystem,
        geometry: Arc<dyn GeometryModel<DIM>>,
    ) -> Self {
        Self {
            function,
            min_composition,
            max_composition,
            coordinate_system,
            geometry,
            time_scale: 1.0,
        }
    }

    /// Hand time to the function in years instead of seconds.
    pub fn with_time_in_years(mut self, convert: bool) -> Self {
        self.time_scale = if convert { YEAR_IN_SECONDS } else { 1.0 };
        self
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }

    pub fn function(&self) -> &ParsedFunction<DIM> {
        &self.function
    }

    /// Expects `prm` inside the `Boundary composition model` subsection.
    pub fn declare_parameters(prm: &mut ParameterHandler) {
        prm.enter_subsection("Function");
        prm.declare_entry(
            "Coordinate system",
            "cartesian",
            Pattern::Selection(CoordinateSystem::NAMES),
            "Coordinates the function expression is written in: cartesian, spherical \
             (radius, longitude, polar angle) or depth (depth below the surface \
             followed by the tangential coordinates).",
        );
        prm.declare_entry(
            "Variable names",
            ParsedFunction::<DIM>::default_variable_names(),
            Pattern::Anything,
            "Comma-separated names of the coordinates followed by the name of time.",
        );
        prm.declare_entry(
            "Function expression",
            "0",
            Pattern::Anything,
            "One expression per compositional field, separated by semicolons.",
        );
        prm.declare_entry(
            "Function constants",
            "",
            Pattern::Anything,
            "Constants usable in the expression, as name=value pairs separated by commas.",
        );
        prm.declare_entry(
            "Minimal composition",
            "0",
            Pattern::Double,
            "Lower bound reported for the boundary composition.",
        );
        prm.declare_entry(
            "Maximal composition",
            "1",
            Pattern::Double,
            "Upper bound reported for the boundary composition.",
        );
        prm.leave_subsection();
    }

    /// Expects `prm` inside the `Boundary composition model` subsection.
    pub fn parse_parameters(
        prm: &mut ParameterHandler,
        context: &SimulatorContext<DIM>,
    ) -> Result<Self, ConfigError> {
        prm.enter_subsection("Function");
        let boundary = Self::parse_function_subsection(prm, context);
        prm.leave_subsection();
        boundary
    }

    fn parse_function_subsection(
        prm: &mut ParameterHandler,
        context: &SimulatorContext<DIM>,
    ) -> Result<Self, ConfigError> {
        let n_components = context.n_compositional_fields;
        // the default expression depends on the number of fields
        prm.declare_entry(
            "Function expression",
            &ParsedFunction::<DIM>::default_expression(n_components),
            Pattern::Anything,
            "One expression per compositional field, separated by semicolons.",
        );
        let coordinate_system: CoordinateSystem = prm.get("Coordinate system")?.parse()?;
        let constants = parse_constants(&prm.get("Function constants")?)?;
        let function = ParsedFunction::new(
            &prm.get("Variable names")?,
            &prm.get("Function expression")?,
            &constants,
            n_components,
        )?;
        let min_composition = prm.get_double("Minimal composition")?;
        let max_composition = prm.get_double("Maximal composition")?;
        if min_composition > max_composition {
            warn!(
                "minimal composition {min_composition} exceeds maximal composition {max_composition}"
            );
        }
        debug!(
            "function boundary composition: {n_components} component(s) of ({}) in {coordinate_system} coordinates",
            function.variable_names().join(", ")
        );
        Ok(Self::new(
            function,
            min_composition,
            max_composition,
            coordinate_system,
            context.geometry.clone(),
        )
        .with_time_in_years(context.convert_output_to_years))
    }
}

impl<const DIM: usize> BoundaryComposition<DIM> for FunctionBoundary<DIM> {
    /// The boundary indicator is not consulted; every boundary sees the same
    /// function.
    fn boundary_composition(
        &self,
        _boundary_indicator: BoundaryId,
        position: &Point<f64, DIM>,
        component: usize,
    ) -> Result<f64, EvaluationError> {
        let point =
            cartesian_to_other_coordinates(position, self.coordinate_system, self.geometry.as_ref());
        self.function.value(&point, component)
    }

    fn update(&mut self, time: f64) {
        self.function.set_time(time / self.time_scale);
    }

    /// The configured bound, whatever the fixed boundaries are.
    fn minimal_composition(&self, _fixed_boundary_ids: &BTreeSet<BoundaryId>) -> f64 {
        self.min_composition
    }

    /// The configured bound, whatever the fixed boundaries are.
    fn maximal_composition(&self, _fixed_boundary_ids: &BTreeSet<BoundaryId>) -> f64 {
        self.max_composition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoxGeometry, SphericalShell};
    use crate::simulator;
    use approx::assert_relative_eq;
    use hashbrown::HashMap;

    fn unit_box() -> Arc<dyn GeometryModel<2>> {
        Arc::new(BoxGeometry::<2>::new([0.0, 0.0], [1.0, 1.0]).unwrap())
    }

    fn boundary2d(expression: &str, coordinate_system: CoordinateSystem) -> FunctionBoundary<2> {
        let function = ParsedFunction::new("x,y,t", expression, &HashMap::new(), 1).unwrap();
        FunctionBoundary::new(function, 0.0, 1.0, coordinate_system, unit_box())
    }

    fn from_json(json: &str) -> Result<FunctionBoundary<2>, ConfigError> {
        let mut prm = ParameterHandler::new();
        simulator::declare_parameters(&mut prm);
        prm.enter_subsection("Boundary composition model");
        FunctionBoundary::<2>::declare_parameters(&mut prm);
        prm.leave_subsection();
        prm.read_json_str(json)?;
        let context = SimulatorContext::<2>::parse_parameters(&mut prm)?;
        prm.enter_subsection("Boundary composition model");
        let boundary = FunctionBoundary::parse_parameters(&mut prm, &context);
        prm.leave_subsection();
        boundary
    }

    #[test]
    fn test_cartesian_expression() {
        let boundary = boundary2d("x^2+y^2", CoordinateSystem::Cartesian);
        let value = boundary
            .boundary_composition(0, &Point::from([3.0, 4.0]), 0)
            .unwrap();
        assert_eq!(value, 25.0);
    }

    #[test]
    fn test_depth_expression() {
        let geometry: Arc<dyn GeometryModel<2>> =
            Arc::new(BoxGeometry::<2>::new([0.0, 0.0], [100000.0, 10000.0]).unwrap());
        let function = ParsedFunction::new("depth,x,t", "depth/1000", &HashMap::new(), 1).unwrap();
        let boundary = FunctionBoundary::new(function, 0.0, 1.0, CoordinateSystem::Depth, geometry);
        let value = boundary
            .boundary_composition(2, &Point::from([2500.0, 5000.0]), 0)
            .unwrap();
        assert_relative_eq!(value, 5.0);
    }

    #[test]
    fn test_spherical_expression() {
        let geometry: Arc<dyn GeometryModel<2>> = Arc::new(SphericalShell::<2>::new(1.0, 2.0).unwrap());
        let function = ParsedFunction::new("r,phi,t", "r * cos(phi)", &HashMap::new(), 1).unwrap();
        let boundary =
            FunctionBoundary::new(function, 0.0, 1.0, CoordinateSystem::Spherical, geometry);
        let value = boundary
            .boundary_composition(1, &Point::from([-2.0, 0.0]), 0)
            .unwrap();
        assert_relative_eq!(value, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_latest_update_wins() {
        let mut boundary = boundary2d("t", CoordinateSystem::Cartesian);
        let position = Point::from([0.5, 1.0]);
        assert_eq!(boundary.boundary_composition(3, &position, 0).unwrap(), 0.0);
        boundary.update(3.5);
        assert_eq!(boundary.boundary_composition(3, &position, 0).unwrap(), 3.5);
        boundary.update(4.0);
        assert_eq!(boundary.boundary_composition(0, &position, 0).unwrap(), 4.0);
    }

    #[test]
    fn test_update_in_years() {
        let mut boundary = boundary2d("t", CoordinateSystem::Cartesian).with_time_in_years(true);
        boundary.update(2.0 * YEAR_IN_SECONDS);
        let value = boundary
            .boundary_composition(0, &Point::from([0.0, 0.0]), 0)
            .unwrap();
        assert_relative_eq!(value, 2.0);
    }

    #[test]
    fn test_repeated_evaluation_is_identical() {
        let mut boundary = boundary2d("sin(x*y + t) / (1 + x^2)", CoordinateSystem::Cartesian);
        boundary.update(0.7);
        let position = Point::from([0.3, 0.9]);
        let first = boundary.boundary_composition(1, &position, 0).unwrap();
        for id in 0..4 {
            let again = boundary.boundary_composition(id, &position, 0).unwrap();
            assert_eq!(again.to_bits(), first.to_bits());
        }
    }

    #[test]
    fn test_component_out_of_range() {
        let function = ParsedFunction::new("x,y,t", "x; y", &HashMap::new(), 2).unwrap();
        let boundary =
            FunctionBoundary::new(function, 0.0, 1.0, CoordinateSystem::Cartesian, unit_box());
        let position = Point::from([0.25, 0.75]);
        assert_eq!(boundary.boundary_composition(0, &position, 1).unwrap(), 0.75);
        for component in [2, 3, 100] {
            assert_eq!(
                boundary.boundary_composition(0, &position, component),
                Err(EvaluationError::ComponentOutOfRange {
                    index: component,
                    n_components: 2
                })
            );
        }
    }

    #[test]
    fn test_expression_faults_propagate() {
        let boundary = boundary2d("1/x", CoordinateSystem::Cartesian);
        assert_eq!(
            boundary.boundary_composition(0, &Point::from([0.0, 0.5]), 0),
            Err(EvaluationError::DivisionByZero { component: 0 })
        );
    }

    #[test]
    fn test_bounds_ignore_boundary_ids() {
        let function = ParsedFunction::new("x,y,t", "10*x", &HashMap::new(), 1).unwrap();
        let boundary =
            FunctionBoundary::new(function, 0.1, 0.9, CoordinateSystem::Cartesian, unit_box());
        let none = BTreeSet::new();
        let some = BTreeSet::from([0, 3]);
        let all = BTreeSet::from([0, 1, 2, 3, 42]);
        assert_eq!(boundary.minimal_composition(&none), 0.1);
        assert_eq!(boundary.minimal_composition(&none), boundary.minimal_composition(&all));
        assert_eq!(boundary.maximal_composition(&some), 0.9);
        assert_eq!(boundary.maximal_composition(&all), 0.9);
    }

    #[test]
    fn test_parse_parameters() {
        let boundary = from_json(
            r#"{"Compositional fields": {"Number of fields": 2},
                "Boundary composition model": {"Function": {
                    "Coordinate system": "depth",
                    "Variable names": "d,x,t",
                    "Function constants": "scale=1000",
                    "Function expression": "d/scale; x + t",
                    "Minimal composition": 0.1,
                    "Maximal composition": 0.9}}}"#,
        )
        .unwrap();
        assert_eq!(boundary.coordinate_system(), CoordinateSystem::Depth);
        assert_eq!(boundary.function().n_components(), 2);
        assert_eq!(boundary.minimal_composition(&BTreeSet::new()), 0.1);
        assert_eq!(boundary.maximal_composition(&BTreeSet::from([1])), 0.9);
        let value = boundary
            .boundary_composition(2, &Point::from([0.5, 0.25]), 0)
            .unwrap();
        assert_relative_eq!(value, 0.75 / 1000.0);
    }

    #[test]
    fn test_default_parameters() {
        let boundary = from_json(r#"{"Compositional fields": {"Number of fields": 3}}"#).unwrap();
        assert_eq!(boundary.coordinate_system(), CoordinateSystem::Cartesian);
        assert_eq!(boundary.function().n_components(), 3);
        assert_eq!(boundary.minimal_composition(&BTreeSet::new()), 0.0);
        assert_eq!(boundary.maximal_composition(&BTreeSet::new()), 1.0);
        let value = boundary
            .boundary_composition(0, &Point::from([0.5, 0.5]), 2)
            .unwrap();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_configuration_errors() {
        let malformed = from_json(
            r#"{"Boundary composition model": {"Function": {"Function expression": "x^"}}}"#,
        );
        assert!(matches!(malformed, Err(ConfigError::Expression { component: 0, .. })));

        let arity = from_json(
            r#"{"Compositional fields": {"Number of fields": 2},
                "Boundary composition model": {"Function": {"Function expression": "x"}}}"#,
        );
        assert!(matches!(
            arity,
            Err(ConfigError::ComponentCount { expected: 2, found: 1 })
        ));

        let coordinates = from_json(
            r#"{"Boundary composition model": {"Function": {"Coordinate system": "polar"}}}"#,
        );
        assert!(matches!(coordinates, Err(ConfigError::InvalidValue { .. })));
    }
}
