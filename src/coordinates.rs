use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use nalgebra::Point;

use crate::error::ConfigError;
use crate::geometry::GeometryModel;

/// Coordinate representation a boundary expression is written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CoordinateSystem {
    #[default]
    Cartesian,
    Spherical,
    Depth,
}

impl CoordinateSystem {
    pub const NAMES: &'static [&'static str] = &["cartesian", "spherical", "depth"];
}

impl FromStr for CoordinateSystem {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cartesian" => Ok(CoordinateSystem::Cartesian),
            "spherical" => Ok(CoordinateSystem::Spherical),
            "depth" => Ok(CoordinateSystem::Depth),
            other => Err(ConfigError::UnknownCoordinateSystem(other.to_string())),
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoordinateSystem::Cartesian => "cartesian",
            CoordinateSystem::Spherical => "spherical",
            CoordinateSystem::Depth => "depth",
        };
        f.write_str(name)
    }
}

/// Cartesian to `(r, phi)` in 2D or `(r, phi, theta)` in 3D.
///
/// `phi` is the longitude in `[0, 2pi)` and `theta` the polar angle measured
/// from the positive z axis, in `[0, pi]`. At the origin the angles are zero,
/// and on the polar axis `phi` is zero.
pub fn cartesian_to_spherical<const DIM: usize>(position: &Point<f64, DIM>) -> [f64; DIM] {
    let mut scoord = [0.0; DIM];
    let radius = position.coords.norm();
    scoord[0] = radius;
    let mut phi = position[1].atan2(position[0]);
    if phi < 0.0 {
        phi += 2.0 * PI;
    }
    scoord[1] = phi;
    if DIM == 3 {
        scoord[2] = if radius > 0.0 {
            (position[2] / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };
    }
    scoord
}

pub fn spherical_to_cartesian<const DIM: usize>(scoord: &[f64; DIM]) -> Point<f64, DIM> {
    let mut position = Point::<f64, DIM>::origin();
    let (radius, phi) = (scoord[0], scoord[1]);
    if DIM == 2 {
        position[0] = radius * phi.cos();
        position[1] = radius * phi.sin();
    } else {
        let theta = scoord[2];
        position[0] = radius * theta.sin() * phi.cos();
        position[1] = radius * theta.sin() * phi.sin();
        position[2] = radius * theta.cos();
    }
    position
}

/// Express a Cartesian boundary point in the requested coordinate system.
pub fn cartesian_to_other_coordinates<const DIM: usize>(
    position: &Point<f64, DIM>,
    coordinate_system: CoordinateSystem,
    geometry: &dyn GeometryModel<DIM>,
) -> [f64; DIM] {
    match coordinate_system {
        CoordinateSystem::Cartesian => std::array::from_fn(|i| position[i]),
        CoordinateSystem::Spherical => cartesian_to_spherical(position),
        CoordinateSystem::Depth => geometry.depth_coordinates(position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoxGeometry;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case("cartesian", CoordinateSystem::Cartesian)]
    #[case("spherical", CoordinateSystem::Spherical)]
    #[case(" depth ", CoordinateSystem::Depth)]
    fn test_parse_coordinate_system(#[case] name: &str, #[case] expected: CoordinateSystem) {
        assert_eq!(name.parse::<CoordinateSystem>().unwrap(), expected);
        assert_eq!(expected.to_string(), name.trim());
    }

    #[test]
    fn test_unknown_coordinate_system() {
        assert!(matches!(
            "polar".parse::<CoordinateSystem>(),
            Err(ConfigError::UnknownCoordinateSystem(name)) if name == "polar"
        ));
    }

    #[test]
    fn test_spherical_2d() {
        let scoord = cartesian_to_spherical(&Point::from([0.0, -2.0]));
        assert_relative_eq!(scoord[0], 2.0);
        assert_relative_eq!(scoord[1], 1.5 * PI);
    }

    #[test]
    fn test_spherical_3d() {
        let scoord = cartesian_to_spherical(&Point::from([1.0, 1.0, 2.0_f64.sqrt()]));
        assert_relative_eq!(scoord[0], 2.0);
        assert_relative_eq!(scoord[1], 0.25 * PI);
        assert_relative_eq!(scoord[2], 0.25 * PI, epsilon = 1e-12);
    }

    #[test]
    fn test_spherical_round_trip() {
        let points2d = [[3.0, 4.0], [-1.5, 0.2], [-0.3, -7.0], [2.0, -1e-3]];
        for p in points2d {
            let position = Point::from(p);
            let back = spherical_to_cartesian(&cartesian_to_spherical(&position));
            assert_relative_eq!(back, position, epsilon = 1e-12);
        }
        let points3d = [
            [1.0, 2.0, 3.0],
            [-4.0, 0.5, -2.0],
            [0.1, -0.1, 10.0],
            [-6371.0, 3000.0, 12.5],
        ];
        for p in points3d {
            let position = Point::from(p);
            let back = spherical_to_cartesian(&cartesian_to_spherical(&position));
            assert_relative_eq!(back, position, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_singularities_are_finite() {
        let origin = cartesian_to_spherical(&Point::from([0.0, 0.0, 0.0]));
        assert_eq!(origin, [0.0, 0.0, 0.0]);
        let pole = cartesian_to_spherical(&Point::from([0.0, 0.0, -5.0]));
        assert_relative_eq!(pole[0], 5.0);
        assert_relative_eq!(pole[2], PI);
        let back = spherical_to_cartesian(&pole);
        assert_relative_eq!(back, Point::from([0.0, 0.0, -5.0]), epsilon = 1e-12);
    }

    #[test]
    fn test_cartesian_is_identity() {
        let geometry = BoxGeometry::<2>::new([0.0, 0.0], [10.0, 5.0]).unwrap();
        let position = Point::from([3.0, 4.0]);
        assert_eq!(
            cartesian_to_other_coordinates(&position, CoordinateSystem::Cartesian, &geometry),
            [3.0, 4.0]
        );
    }
}
