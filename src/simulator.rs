use std::sync::Arc;

use log::debug;

use crate::error::ConfigError;
use crate::geometry::{self, GeometryModel};
use crate::io::param_parser::{ParameterHandler, Pattern};

pub const YEAR_IN_SECONDS: f64 = 60.0 * 60.0 * 24.0 * 365.2425;

/// Read-only view of the simulation that boundary models are built against.
#[derive(Clone, Debug)]
pub struct SimulatorContext<const DIM: usize> {
    pub geometry: Arc<dyn GeometryModel<DIM>>,
    pub n_compositional_fields: usize,
    pub convert_output_to_years: bool,
}

impl<const DIM: usize> SimulatorContext<DIM> {
    pub fn new(geometry: Arc<dyn GeometryModel<DIM>>, n_compositional_fields: usize) -> Self {
        Self {
            geometry,
            n_compositional_fields,
            convert_output_to_years: false,
        }
    }

    /// Expects `prm` at the top level.
    pub fn parse_parameters(prm: &mut ParameterHandler) -> Result<Self, ConfigError> {
        let convert_output_to_years = prm.get_bool("Use years in output instead of seconds")?;
        prm.enter_subsection("Compositional fields");
        let n_fields = prm.get_integer("Number of fields");
        prm.leave_subsection();
        let geometry = geometry::create_geometry_model::<DIM>(prm)?;
        let context = Self {
            geometry,
            n_compositional_fields: n_fields? as usize,
            convert_output_to_years,
        };
        debug!(
            "{} compositional field(s), time in {}",
            context.n_compositional_fields,
            if convert_output_to_years { "years" } else { "seconds" }
        );
        Ok(context)
    }
}

pub fn declare_parameters(prm: &mut ParameterHandler) {
    prm.declare_entry(
        "Dimension",
        "2",
        Pattern::Selection(&["2", "3"]),
        "Spatial dimension of the domain.",
    );
    prm.declare_entry(
        "Use years in output instead of seconds",
        "false",
        Pattern::Bool,
        "Interpret the simulation time in years when handing it to boundary functions.",
    );
    prm.enter_subsection("Compositional fields");
    prm.declare_entry(
        "Number of fields",
        "1",
        Pattern::Integer { min: 1 },
        "Number of compositional fields, one boundary value each.",
    );
    prm.leave_subsection();
    geometry::declare_parameters(prm);
}
