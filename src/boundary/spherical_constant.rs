use std::collections::BTreeSet;

use ndarray::Array1;
use nalgebra::Point;

use super::{BoundaryComposition, extremum_over};
use crate::error::{ConfigError, EvaluationError};
use crate::geometry::BoundaryId;
use crate::io::param_parser::{ParameterHandler, Pattern};
use crate::simulator::SimulatorContext;

/// One composition on the inner and one on the outer surface of a shell,
/// shared by all fields.
#[derive(Clone, Debug)]
pub struct SphericalConstantBoundary<const DIM: usize> {
    inner: Array1<f64>,
    outer: Array1<f64>,
}

impl<const DIM: usize> SphericalConstantBoundary<DIM> {
    pub fn new(inner_composition: f64, outer_composition: f64, n_fields: usize) -> Self {
        Self {
            inner: Array1::from_elem(n_fields, inner_composition),
            outer: Array1::from_elem(n_fields, outer_composition),
        }
    }

    pub fn declare_parameters(prm: &mut ParameterHandler) {
        prm.enter_subsection("Spherical constant");
        prm.declare_entry("Inner composition", "1", Pattern::Double, "Composition at the inner boundary.");
        prm.declare_entry("Outer composition", "0", Pattern::Double, "Composition at the outer boundary.");
        prm.leave_subsection();
    }

    pub fn parse_parameters(
        prm: &mut ParameterHandler,
        context: &SimulatorContext<DIM>,
    ) -> Result<Self, ConfigError> {
        if context.geometry.name() != "spherical shell" {
            return Err(ConfigError::IncompatibleGeometry {
                model: "spherical constant",
                geometry: "spherical shell",
            });
        }
        prm.enter_subsection("Spherical constant");
        let values = prm
            .get_double("Inner composition")
            .and_then(|inner| Ok((inner, prm.get_double("Outer composition")?)));
        prm.leave_subsection();
        let (inner, outer) = values?;
        Ok(Self::new(inner, outer, context.n_compositional_fields))
    }

    fn surfaces(&self) -> [&Array1<f64>; 2] {
        [&self.inner, &self.outer]
    }
}

impl<const DIM: usize> BoundaryComposition<DIM> for SphericalConstantBoundary<DIM> {
    fn boundary_composition(
        &self,
        boundary_indicator: BoundaryId,
        _position: &Point<f64, DIM>,
        component: usize,
    ) -> Result<f64, EvaluationError> {
        let values = match boundary_indicator {
            0 => &self.inner,
            1 => &self.outer,
            other => return Err(EvaluationError::UnknownBoundary(other)),
        };
        values
            .get(component)
            .copied()
            .ok_or(EvaluationError::ComponentOutOfRange {
                index: component,
                n_components: values.len(),
            })
    }

    fn minimal_composition(&self, fixed_boundary_ids: &BTreeSet<BoundaryId>) -> f64 {
        extremum_over(&self.surfaces(), fixed_boundary_ids, f64::INFINITY, f64::min)
    }

    fn maximal_composition(&self, fixed_boundary_ids: &BTreeSet<BoundaryId>) -> f64 {
        extremum_over(&self.surfaces(), fixed_boundary_ids, f64::NEG_INFINITY, f64::max)
    }
}
