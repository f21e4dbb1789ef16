//! Named sketch workplanes
//!
//! Each plane is described by its local x direction and its normal; the local
//! y direction is `normal × x`. Coordinates inside a plane are `(u, v)` along
//! the local x and y directions and `w` along the normal.

use std::fmt;
use std::str::FromStr;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::kernel::CadError;

/// One of the six axis-aligned named workplanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Workplane {
    #[default]
    XY,
    XZ,
    YZ,
    YX,
    ZX,
    ZY,
}

impl Workplane {
    pub const ALL: &'static [Workplane] = &[
        Workplane::XY,
        Workplane::XZ,
        Workplane::YZ,
        Workplane::YX,
        Workplane::ZX,
        Workplane::ZY,
    ];

    /// Local x direction in world coordinates
    pub fn x_dir(self) -> DVec3 {
        match self {
            Workplane::XY | Workplane::XZ => DVec3::X,
            Workplane::YZ | Workplane::YX => DVec3::Y,
            Workplane::ZX | Workplane::ZY => DVec3::Z,
        }
    }

    /// Plane normal in world coordinates
    pub fn normal(self) -> DVec3 {
        match self {
            Workplane::XY => DVec3::Z,
            Workplane::XZ => DVec3::NEG_Y,
            Workplane::YZ => DVec3::X,
            Workplane::YX => DVec3::NEG_Z,
            Workplane::ZX => DVec3::Y,
            Workplane::ZY => DVec3::NEG_X,
        }
    }

    /// Local y direction in world coordinates
    pub fn y_dir(self) -> DVec3 {
        self.normal().cross(self.x_dir())
    }

    /// Map plane coordinates to a world point
    pub fn to_world(self, u: f64, v: f64, w: f64) -> DVec3 {
        self.x_dir() * u + self.y_dir() * v + self.normal() * w
    }

    /// Map a point drawn in the plane (at `w = 0`) to world coordinates
    pub fn point_to_world(self, p: DVec2) -> DVec3 {
        self.to_world(p.x, p.y, 0.0)
    }

    /// Map a world point to plane coordinates `(u, v, w)`
    pub fn to_local(self, p: DVec3) -> DVec3 {
        DVec3::new(
            p.dot(self.x_dir()),
            p.dot(self.y_dir()),
            p.dot(self.normal()),
        )
    }

    /// Letter of the world axis the local x direction runs along
    pub fn first_axis(self) -> char {
        match self {
            Workplane::XY | Workplane::XZ => 'X',
            Workplane::YZ | Workplane::YX => 'Y',
            Workplane::ZX | Workplane::ZY => 'Z',
        }
    }

    /// The other plane sharing this plane's first axis
    pub fn sibling(self) -> Workplane {
        match self {
            Workplane::XY => Workplane::XZ,
            Workplane::XZ => Workplane::XY,
            Workplane::YZ => Workplane::YX,
            Workplane::YX => Workplane::YZ,
            Workplane::ZX => Workplane::ZY,
            Workplane::ZY => Workplane::ZX,
        }
    }

    /// Whether the local y direction is the world Z axis
    pub fn is_vertical(self) -> bool {
        self.y_dir().z > 0.5
    }

    pub fn name(self) -> &'static str {
        match self {
            Workplane::XY => "XY",
            Workplane::XZ => "XZ",
            Workplane::YZ => "YZ",
            Workplane::YX => "YX",
            Workplane::ZX => "ZX",
            Workplane::ZY => "ZY",
        }
    }
}

impl fmt::Display for Workplane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Workplane {
    type Err = CadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Workplane::ALL
            .iter()
            .copied()
            .find(|plane| plane.name() == upper)
            .ok_or_else(|| CadError::InvalidParameter(format!("unknown workplane '{}'", s)))
    }
}

/// Index (0 = X, 1 = Y, 2 = Z) and sign of an axis-aligned unit vector
pub(crate) fn axis_of(dir: DVec3) -> (usize, f64) {
    let abs = dir.abs();
    if abs.x >= abs.y && abs.x >= abs.z {
        (0, dir.x.signum())
    } else if abs.y >= abs.z {
        (1, dir.y.signum())
    } else {
        (2, dir.z.signum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_are_right_handed() {
        for plane in Workplane::ALL {
            let x = plane.x_dir();
            let y = plane.y_dir();
            let n = plane.normal();
            assert!((x.cross(y) - n).length() < 1e-12, "{} is not right handed", plane);
            assert_eq!(x.dot(y), 0.0);
        }
    }

    #[test]
    fn test_xz_points_up() {
        assert_eq!(Workplane::XZ.y_dir(), DVec3::Z);
        assert_eq!(Workplane::YZ.y_dir(), DVec3::Z);
        assert!(Workplane::XZ.is_vertical());
        assert!(!Workplane::XY.is_vertical());
        assert_eq!(Workplane::XY.y_dir(), DVec3::Y);
    }

    #[test]
    fn test_local_roundtrip() {
        let p = DVec3::new(1.0, -2.0, 3.5);
        for plane in Workplane::ALL {
            let local = plane.to_local(p);
            let back = plane.to_world(local.x, local.y, local.z);
            assert!((back - p).length() < 1e-12);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("xz".parse::<Workplane>().unwrap(), Workplane::XZ);
        assert_eq!(" ZY ".parse::<Workplane>().unwrap(), Workplane::ZY);
        assert!("XX".parse::<Workplane>().is_err());
    }

    #[test]
    fn test_siblings_share_first_axis() {
        for plane in Workplane::ALL {
            assert_eq!(plane.first_axis(), plane.sibling().first_axis());
            assert_ne!(*plane, plane.sibling());
        }
    }
}
