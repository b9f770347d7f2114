use nalgebra::Point;

use crate::error::ConfigError;
use crate::geometry::{BoundaryId, GeometryModel};

/// Parse `boundary: c0 c1 [c2]; boundary: ...` into boundary points.
/// Coordinates may be separated by spaces or commas.
pub fn parse_sample_points<const DIM: usize>(
    text: &str,
    geometry: &dyn GeometryModel<DIM>,
) -> Result<Vec<(BoundaryId, Point<f64, DIM>)>, ConfigError> {
    let invalid = |entry: &str, reason: String| ConfigError::InvalidValue {
        key: "Sample points".to_string(),
        value: entry.to_string(),
        reason,
    };
    let mut points = Vec::new();
    for entry in text.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (boundary, coordinates) = entry
            .split_once(':')
            .ok_or_else(|| invalid(entry, "expected boundary: coordinates".to_string()))?;
        let boundary_id = geometry.translate_symbolic_boundary_name(boundary)?;
        let values = coordinates
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|c| !c.is_empty())
            .map(|c| c.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| invalid(entry, e.to_string()))?;
        if values.len() != DIM {
            return Err(invalid(
                entry,
                format!("expected {DIM} coordinates, found {}", values.len()),
            ));
        }
        let mut position = Point::<f64, DIM>::origin();
        position.coords.copy_from_slice(&values);
        points.push((boundary_id, position));
    }
    Ok(points)
}
