use std::collections::BTreeSet;

use ndarray::Array1;
use nalgebra::Point;

use super::{BoundaryComposition, extremum_over};
use crate::error::{ConfigError, EvaluationError};
use crate::geometry::BoundaryId;
use crate::io::param_parser::{ParameterHandler, Pattern};
use crate::simulator::SimulatorContext;

const SIDES: [&str; 6] = ["Left", "Right", "Front", "Back", "Bottom", "Top"];

fn side_names(dim: usize) -> Vec<&'static str> {
    if dim == 2 {
        vec!["Left", "Right", "Bottom", "Top"]
    } else {
        SIDES.to_vec()
    }
}

/// Constant composition on each side of a box, one value per field.
#[derive(Clone, Debug)]
pub struct BoxBoundary<const DIM: usize> {
    /// Indexed by boundary id, then by field.
    pub compositions: Vec<Array1<f64>>,
}

impl<const DIM: usize> BoxBoundary<DIM> {
    pub fn declare_parameters(prm: &mut ParameterHandler) {
        prm.enter_subsection("Box");
        for side in SIDES {
            prm.declare_entry(
                &format!("{side} composition"),
                "0",
                Pattern::List,
                "Composition on this side of the box, one value per field; a single \
                 value applies to every field.",
            );
        }
        prm.leave_subsection();
    }

    pub fn parse_parameters(
        prm: &mut ParameterHandler,
        context: &SimulatorContext<DIM>,
    ) -> Result<Self, ConfigError> {
        if context.geometry.name() != "box" {
            return Err(ConfigError::IncompatibleGeometry {
                model: "box",
                geometry: "box",
            });
        }
        prm.enter_subsection("Box");
        let compositions = side_names(DIM)
            .into_iter()
            .map(|side| read_values(prm, side, context.n_compositional_fields))
            .collect::<Result<Vec<_>, _>>();
        prm.leave_subsection();
        Ok(Self {
            compositions: compositions?,
        })
    }
}

fn read_values(
    prm: &ParameterHandler,
    side: &str,
    n_fields: usize,
) -> Result<Array1<f64>, ConfigError> {
    let key = format!("{side} composition");
    let items = prm.get_list(&key)?;
    let values = items
        .iter()
        .map(|item| {
            item.parse::<f64>().map_err(|_| ConfigError::InvalidValue {
                key: key.clone(),
                value: item.clone(),
                reason: "not a floating point number".to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    match values.len() {
        1 => Ok(Array1::from_elem(n_fields, values[0])),
        n if n == n_fields => Ok(Array1::from(values)),
        n => Err(ConfigError::InvalidValue {
            key,
            value: items.join(", "),
            reason: format!("expected 1 or {n_fields} values, found {n}"),
        }),
    }
}

impl<const DIM: usize> BoundaryComposition<DIM> for BoxBoundary<DIM> {
    fn boundary_composition(
        &self,
        boundary_indicator: BoundaryId,
        _position: &Point<f64, DIM>,
        component: usize,
    ) -> Result<f64, EvaluationError> {
        let values = self
            .compositions
            .get(boundary_indicator as usize)
            .ok_or(EvaluationError::UnknownBoundary(boundary_indicator))?;
        values
            .get(component)
            .copied()
            .ok_or(EvaluationError::ComponentOutOfRange {
                index: component,
                n_components: values.len(),
            })
    }

    fn minimal_composition(&self, fixed_boundary_ids: &BTreeSet<BoundaryId>) -> f64 {
        extremum_over(&self.compositions, fixed_boundary_ids, f64::INFINITY, f64::min)
    }

    fn maximal_composition(&self, fixed_boundary_ids: &BTreeSet<BoundaryId>) -> f64 {
        extremum_over(&self.compositions, fixed_boundary_ids, f64::NEG_INFINITY, f64::max)
    }
}
