//! Geometry models providing the depth and boundary naming used by the
//! boundary composition models.

use std::fmt;
use std::sync::Arc;

use log::debug;
use nalgebra::Point;

use crate::coordinates::cartesian_to_spherical;
use crate::error::ConfigError;
use crate::io::param_parser::{ParameterHandler, Pattern};

pub type BoundaryId = u32;

pub trait GeometryModel<const DIM: usize>: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Distance below the outer surface, clamped to `[0, maximal_depth]`.
    fn depth(&self, position: &Point<f64, DIM>) -> f64;

    fn maximal_depth(&self) -> f64;

    /// Depth first, followed by the tangential coordinates of the geometry.
    fn depth_coordinates(&self, position: &Point<f64, DIM>) -> [f64; DIM];

    /// Symbolic boundary names, indexed by boundary id.
    fn boundary_names(&self) -> &'static [&'static str];

    /// Accepts either a symbolic name (`"top"`) or a numeric id (`"3"`).
    fn translate_symbolic_boundary_name(&self, name: &str) -> Result<BoundaryId, ConfigError> {
        let name = name.trim();
        let names = self.boundary_names();
        if let Some(id) = names.iter().position(|n| *n == name) {
            return Ok(id as BoundaryId);
        }
        match name.parse::<BoundaryId>() {
            Ok(id) if (id as usize) < names.len() => Ok(id),
            _ => Err(ConfigError::UnknownBoundary(name.to_string())),
        }
    }
}

fn check_dimension(dim: usize) -> Result<(), ConfigError> {
    if dim == 2 || dim == 3 {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedDimension(dim))
    }
}

#[derive(Clone, Debug)]
pub struct BoxGeometry<const DIM: usize> {
    pub origin: [f64; DIM],
    pub extents: [f64; DIM],
}

impl<const DIM: usize> BoxGeometry<DIM> {
    pub fn new(origin: [f64; DIM], extents: [f64; DIM]) -> Result<Self, ConfigError> {
        check_dimension(DIM)?;
        if let Some(extent) = extents.iter().find(|e| !(**e > 0.0)) {
            return Err(ConfigError::InvalidValue {
                key: "Geometry model/Box".to_string(),
                value: extent.to_string(),
                reason: "extents must be positive".to_string(),
            });
        }
        Ok(Self { origin, extents })
    }

    fn top(&self) -> f64 {
        self.origin[DIM - 1] + self.extents[DIM - 1]
    }
}

impl<const DIM: usize> GeometryModel<DIM> for BoxGeometry<DIM> {
    fn name(&self) -> &'static str {
        "box"
    }

    fn depth(&self, position: &Point<f64, DIM>) -> f64 {
        (self.top() - position[DIM - 1]).clamp(0.0, self.maximal_depth())
    }

    fn maximal_depth(&self) -> f64 {
        self.extents[DIM - 1]
    }

    fn depth_coordinates(&self, position: &Point<f64, DIM>) -> [f64; DIM] {
        let mut coordinates = [0.0; DIM];
        coordinates[0] = self.depth(position);
        coordinates[1..].copy_from_slice(&position.coords.as_slice()[..DIM - 1]);
        coordinates
    }

    fn boundary_names(&self) -> &'static [&'static str] {
        if DIM == 2 {
            &["left", "right", "bottom", "top"]
        } else {
            &["left", "right", "front", "back", "bottom", "top"]
        }
    }
}

#[derive(Clone, Debug)]
pub struct SphericalShell<const DIM: usize> {
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl<const DIM: usize> SphericalShell<DIM> {
    pub fn new(inner_radius: f64, outer_radius: f64) -> Result<Self, ConfigError> {
        check_dimension(DIM)?;
        if !(inner_radius >= 0.0 && outer_radius > inner_radius) {
            return Err(ConfigError::InvalidValue {
                key: "Geometry model/Spherical shell".to_string(),
                value: format!("{inner_radius}, {outer_radius}"),
                reason: "radii must satisfy 0 <= inner < outer".to_string(),
            });
        }
        Ok(Self {
            inner_radius,
            outer_radius,
        })
    }
}

impl<const DIM: usize> GeometryModel<DIM> for SphericalShell<DIM> {
    fn name(&self) -> &'static str {
        "spherical shell"
    }

    fn depth(&self, position: &Point<f64, DIM>) -> f64 {
        (self.outer_radius - position.coords.norm()).clamp(0.0, self.maximal_depth())
    }

    fn maximal_depth(&self) -> f64 {
        self.outer_radius - self.inner_radius
    }

    fn depth_coordinates(&self, position: &Point<f64, DIM>) -> [f64; DIM] {
        let mut coordinates = cartesian_to_spherical(position);
        coordinates[0] = self.depth(position);
        coordinates
    }

    fn boundary_names(&self) -> &'static [&'static str] {
        &["inner", "outer"]
    }
}

const AXES: [&str; 3] = ["X", "Y", "Z"];

pub fn declare_parameters(prm: &mut ParameterHandler) {
    prm.enter_subsection("Geometry model");
    prm.declare_entry(
        "Model name",
        "box",
        Pattern::Selection(&["box", "spherical shell"]),
        "Shape of the computational domain.",
    );
    prm.enter_subsection("Box");
    for axis in AXES {
        prm.declare_entry(
            &format!("{axis} extent"),
            "1",
            Pattern::Double,
            "Extent of the box along this axis.",
        );
        prm.declare_entry(
            &format!("Box origin {axis} coordinate"),
            "0",
            Pattern::Double,
            "Coordinate of the lower corner of the box along this axis.",
        );
    }
    prm.leave_subsection();
    prm.enter_subsection("Spherical shell");
    prm.declare_entry("Inner radius", "3481000", Pattern::Double, "Inner radius of the shell.");
    prm.declare_entry("Outer radius", "6336000", Pattern::Double, "Outer radius of the shell.");
    prm.leave_subsection();
    prm.leave_subsection();
}

pub fn create_geometry_model<const DIM: usize>(
    prm: &mut ParameterHandler,
) -> Result<Arc<dyn GeometryModel<DIM>>, ConfigError> {
    prm.enter_subsection("Geometry model");
    let geometry = parse_geometry_model::<DIM>(prm);
    prm.leave_subsection();
    geometry
}

fn parse_geometry_model<const DIM: usize>(
    prm: &mut ParameterHandler,
) -> Result<Arc<dyn GeometryModel<DIM>>, ConfigError> {
    check_dimension(DIM)?;
    let model_name = prm.get("Model name")?;
    let geometry: Arc<dyn GeometryModel<DIM>> = match model_name.as_str() {
        "box" => {
            prm.enter_subsection("Box");
            let mut origin = [0.0; DIM];
            let mut extents = [0.0; DIM];
            let mut read = || -> Result<(), ConfigError> {
                for d in 0..DIM {
                    extents[d] = prm.get_double(&format!("{} extent", AXES[d]))?;
                    origin[d] = prm.get_double(&format!("Box origin {} coordinate", AXES[d]))?;
                }
                Ok(())
            };
            let result = read();
            prm.leave_subsection();
            result?;
            Arc::new(BoxGeometry::new(origin, extents)?)
        }
        "spherical shell" => {
            prm.enter_subsection("Spherical shell");
            let radii = prm
                .get_double("Inner radius")
                .and_then(|inner| Ok((inner, prm.get_double("Outer radius")?)));
            prm.leave_subsection();
            let (inner, outer) = radii?;
            Arc::new(SphericalShell::new(inner, outer)?)
        }
        other => {
            return Err(ConfigError::UnknownModel {
                kind: "geometry model",
                name: other.to_string(),
            });
        }
    };
    debug!("geometry model: {geometry:?}");
    Ok(geometry)
}
