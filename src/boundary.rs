//! Boundary composition models: the value each compositional field takes on
//! the parts of the boundary with a fixed (Dirichlet) composition.
//!
//! The host calls [`BoundaryComposition::update`] once at the start of every
//! time step and only then evaluates boundary points for that step. `update`
//! takes `&mut self` and evaluation `&self`, so a model shared across worker
//! threads during a step cannot be updated until the step's evaluations are
//! done.

pub mod box_composition;
pub mod function;
pub mod spherical_constant;

use std::borrow::Borrow;
use std::collections::BTreeSet;

use log::info;
use nalgebra::Point;
use ndarray::Array1;

use crate::error::{ConfigError, EvaluationError};
use crate::geometry::{BoundaryId, GeometryModel};
use crate::io::param_parser::{ParameterHandler, Pattern};
use crate::simulator::SimulatorContext;
pub use box_composition::BoxBoundary;
pub use function::FunctionBoundary;
pub use spherical_constant::SphericalConstantBoundary;

pub trait BoundaryComposition<const DIM: usize>: Send + Sync {
    /// Composition of field `component` at a Cartesian boundary point.
    fn boundary_composition(
        &self,
        boundary_indicator: BoundaryId,
        position: &Point<f64, DIM>,
        component: usize,
    ) -> Result<f64, EvaluationError>;

    /// Announce the model time of the coming evaluations.
    fn update(&mut self, _time: f64) {}

    fn minimal_composition(&self, fixed_boundary_ids: &BTreeSet<BoundaryId>) -> f64;

    fn maximal_composition(&self, fixed_boundary_ids: &BTreeSet<BoundaryId>) -> f64;
}

/// Smallest or largest value of any field over the given boundaries, or
/// over every boundary when `ids` is empty. Ids without values are skipped.
fn extremum_over<V: Borrow<Array1<f64>>>(
    values: &[V],
    ids: &BTreeSet<BoundaryId>,
    init: f64,
    pick: fn(f64, f64) -> f64,
) -> f64 {
    let selected: Vec<&V> = if ids.is_empty() {
        values.iter().collect()
    } else {
        ids.iter().filter_map(|id| values.get(*id as usize)).collect()
    };
    selected
        .into_iter()
        .flat_map(|v| <V as Borrow<Array1<f64>>>::borrow(v).iter().copied())
        .fold(init, pick)
}

#[derive(Clone, Debug)]
pub enum BoundaryCompositionModel<const DIM: usize> {
    Function(FunctionBoundary<DIM>),
    Box(BoxBoundary<DIM>),
    SphericalConstant(SphericalConstantBoundary<DIM>),
}

impl<const DIM: usize> BoundaryCompositionModel<DIM> {
    pub const NAMES: &'static [&'static str] = &["function", "box", "spherical constant"];

    pub fn name(&self) -> &'static str {
        match self {
            BoundaryCompositionModel::Function(_) => "function",
            BoundaryCompositionModel::Box(_) => "box",
            BoundaryCompositionModel::SphericalConstant(_) => "spherical constant",
        }
    }

    fn inner(&self) -> &dyn BoundaryComposition<DIM> {
        match self {
            BoundaryCompositionModel::Function(model) => model,
            BoundaryCompositionModel::Box(model) => model,
            BoundaryCompositionModel::SphericalConstant(model) => model,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn BoundaryComposition<DIM> {
        match self {
            BoundaryCompositionModel::Function(model) => model,
            BoundaryCompositionModel::Box(model) => model,
            BoundaryCompositionModel::SphericalConstant(model) => model,
        }
    }
}

impl<const DIM: usize> BoundaryComposition<DIM> for BoundaryCompositionModel<DIM> {
    fn boundary_composition(
        &self,
        boundary_indicator: BoundaryId,
        position: &Point<f64, DIM>,
        component: usize,
    ) -> Result<f64, EvaluationError> {
        self.inner()
            .boundary_composition(boundary_indicator, position, component)
    }

    fn update(&mut self, time: f64) {
        self.inner_mut().update(time);
    }

    fn minimal_composition(&self, fixed_boundary_ids: &BTreeSet<BoundaryId>) -> f64 {
        self.inner().minimal_composition(fixed_boundary_ids)
    }

    fn maximal_composition(&self, fixed_boundary_ids: &BTreeSet<BoundaryId>) -> f64 {
        self.inner().maximal_composition(fixed_boundary_ids)
    }
}

pub fn declare_parameters<const DIM: usize>(prm: &mut ParameterHandler) {
    prm.enter_subsection("Boundary composition model");
    prm.declare_entry(
        "Model name",
        "function",
        Pattern::Selection(BoundaryCompositionModel::<DIM>::NAMES),
        "Which boundary composition model to use.",
    );
    prm.declare_entry(
        "Fixed composition boundary indicators",
        "",
        Pattern::List,
        "Boundaries, by name or number, on which the composition is prescribed.",
    );
    FunctionBoundary::<DIM>::declare_parameters(prm);
    BoxBoundary::<DIM>::declare_parameters(prm);
    SphericalConstantBoundary::<DIM>::declare_parameters(prm);
    prm.leave_subsection();
}

/// Build the model selected in the parameter file.
pub fn create_boundary_composition_model<const DIM: usize>(
    prm: &mut ParameterHandler,
    context: &SimulatorContext<DIM>,
) -> Result<BoundaryCompositionModel<DIM>, ConfigError> {
    prm.enter_subsection("Boundary composition model");
    let model = prm.get("Model name").and_then(|name| match name.as_str() {
        "function" => {
            FunctionBoundary::parse_parameters(prm, context).map(BoundaryCompositionModel::Function)
        }
        "box" => BoxBoundary::parse_parameters(prm, context).map(BoundaryCompositionModel::Box),
        "spherical constant" => SphericalConstantBoundary::parse_parameters(prm, context)
            .map(BoundaryCompositionModel::SphericalConstant),
        other => Err(ConfigError::UnknownModel {
            kind: "boundary composition model",
            name: other.to_string(),
        }),
    });
    prm.leave_subsection();
    let model = model?;
    info!("boundary composition model: {}", model.name());
    Ok(model)
}

pub fn parse_fixed_boundary_indicators<const DIM: usize>(
    prm: &mut ParameterHandler,
    geometry: &dyn GeometryModel<DIM>,
) -> Result<BTreeSet<BoundaryId>, ConfigError> {
    prm.enter_subsection("Boundary composition model");
    let names = prm.get_list("Fixed composition boundary indicators");
    prm.leave_subsection();
    names?
        .iter()
        .map(|name| geometry.translate_symbolic_boundary_name(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoxGeometry;
    use crate::simulator;

    fn setup(json: &str) -> (ParameterHandler, SimulatorContext<2>) {
        let mut prm = ParameterHandler::new();
        simulator::declare_parameters(&mut prm);
        declare_parameters::<2>(&mut prm);
        prm.read_json_str(json).unwrap();
        let context = SimulatorContext::<2>::parse_parameters(&mut prm).unwrap();
        (prm, context)
    }

    #[test]
    fn test_function_model_through_enum() {
        let (mut prm, context) = setup(
            r#"{"Boundary composition model": {
                "Model name": "function",
                "Fixed composition boundary indicators": "top, 2",
                "Function": {"Function expression": "x + t"}}}"#,
        );
        let mut model = create_boundary_composition_model(&mut prm, &context).unwrap();
        assert_eq!(model.name(), "function");
        model.update(2.0);
        let value = model
            .boundary_composition(3, &Point::from([0.5, 1.0]), 0)
            .unwrap();
        assert_eq!(value, 2.5);
        let fixed = parse_fixed_boundary_indicators(&mut prm, context.geometry.as_ref()).unwrap();
        assert_eq!(fixed, BTreeSet::from([2, 3]));
        assert_eq!(model.minimal_composition(&fixed), 0.0);
        assert_eq!(model.maximal_composition(&fixed), 1.0);
    }

    #[test]
    fn test_box_model_through_enum() {
        let (mut prm, context) = setup(
            r#"{"Boundary composition model": {
                "Model name": "box",
                "Box": {"Bottom composition": 1, "Top composition": 0.25}}}"#,
        );
        let model = create_boundary_composition_model(&mut prm, &context).unwrap();
        assert_eq!(model.name(), "box");
        let fixed = BTreeSet::from([2, 3]);
        assert_eq!(model.minimal_composition(&fixed), 0.25);
        assert_eq!(model.maximal_composition(&fixed), 1.0);
    }

    #[test]
    fn test_geometry_mismatch() {
        let (mut prm, context) =
            setup(r#"{"Boundary composition model": {"Model name": "spherical constant"}}"#);
        assert!(matches!(
            create_boundary_composition_model(&mut prm, &context),
            Err(ConfigError::IncompatibleGeometry { .. })
        ));
    }

    #[test]
    fn test_unknown_fixed_boundary() {
        let (mut prm, _) = setup(
            r#"{"Boundary composition model": {"Fixed composition boundary indicators": ["outer"]}}"#,
        );
        let geometry = BoxGeometry::<2>::new([0.0; 2], [1.0; 2]).unwrap();
        assert!(matches!(
            parse_fixed_boundary_indicators::<2>(&mut prm, &geometry),
            Err(ConfigError::UnknownBoundary(_))
        ));
    }

    #[test]
    fn test_parallel_evaluation_between_updates() {
        let (mut prm, context) = setup(
            r#"{"Boundary composition model": {"Function": {"Function expression": "x * t"}}}"#,
        );
        let mut model = create_boundary_composition_model(&mut prm, &context).unwrap();
        for step in 1..=3 {
            let time = step as f64;
            model.update(time);
            let shared = &model;
            let results: Vec<f64> = std::thread::scope(|scope| {
                let handles: Vec<_> = (0..4)
                    .map(|i| {
                        scope.spawn(move || {
                            shared
                                .boundary_composition(0, &Point::from([i as f64, 0.0]), 0)
                                .unwrap()
                        })
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });
            assert_eq!(results, vec![0.0, time, 2.0 * time, 3.0 * time]);
        }
    }
}
