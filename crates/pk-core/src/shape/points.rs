//! Profile points and the edge chains built from them

use glam::DVec2;
use pk_cad::Profile;
use serde::{Deserialize, Serialize};

use super::{ShapeError, ShapeResult};

/// Kind of edge leaving a profile point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connection {
    #[default]
    Straight,
    Spline,
    /// Three-point arcs; consecutive circle points pair up as `mid, end`
    Circle,
}

/// A 2D profile point with the connection to the following point
///
/// The connection of the last point closes the profile back to the first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub connection: Connection,
}

impl ProfilePoint {
    pub fn new(x: f64, y: f64, connection: Connection) -> Self {
        Self { x, y, connection }
    }

    pub fn straight(x: f64, y: f64) -> Self {
        Self::new(x, y, Connection::Straight)
    }

    pub fn spline(x: f64, y: f64) -> Self {
        Self::new(x, y, Connection::Spline)
    }

    pub fn circle(x: f64, y: f64) -> Self {
        Self::new(x, y, Connection::Circle)
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// Tag every coordinate pair with one connection type
pub fn with_connection(points: &[(f64, f64)], connection: Connection) -> Vec<ProfilePoint> {
    points
        .iter()
        .map(|&(x, y)| ProfilePoint::new(x, y, connection))
        .collect()
}

/// Build a closed profile from connected points
///
/// Consecutive points with the same connection form one edge chain that ends
/// at the first point of the next chain (or wraps to the start).
pub fn profile_from_points(points: &[ProfilePoint]) -> ShapeResult<Profile> {
    if points.len() < 2 {
        return Err(ShapeError::InvalidPoints(format!(
            "a profile needs at least 2 points, got {}",
            points.len()
        )));
    }
    if let Some(p) = points.iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(ShapeError::InvalidPoints(format!(
            "non-finite profile point ({}, {})",
            p.x, p.y
        )));
    }

    let n = points.len();
    // Start at a change of connection so no chain is split by the wrap-around
    let first = (0..n)
        .find(|&i| points[i].connection != points[(i + n - 1) % n].connection)
        .unwrap_or(0);
    let ordered: Vec<ProfilePoint> = (0..n).map(|i| points[(first + i) % n]).collect();

    let mut profile = Profile::new(ordered[0].position());
    let mut i = 0;
    while i < n {
        let connection = ordered[i].connection;
        let mut j = i + 1;
        while j < n && ordered[j].connection == connection {
            j += 1;
        }
        // Chain covers ordered[i..=j], with index n meaning the first point again
        let chain: Vec<DVec2> = (i + 1..=j).map(|k| ordered[k % n].position()).collect();
        profile = match connection {
            Connection::Straight => chain.into_iter().fold(profile, Profile::line_to),
            Connection::Spline => profile.spline_through(chain),
            Connection::Circle => {
                if chain.len() % 2 != 0 {
                    return Err(ShapeError::InvalidPoints(format!(
                        "circle connections need pairs of mid and end points, \
                         chain starting at ({}, {}) has {} edges",
                        ordered[i].x,
                        ordered[i].y,
                        chain.len()
                    )));
                }
                chain
                    .chunks(2)
                    .fold(profile, |p, pair| p.arc_to(pair[0], pair[1]))
            }
        };
        i = j;
    }
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pk_cad::{Edge, KernelSettings};

    fn square(connection: Connection) -> Vec<ProfilePoint> {
        with_connection(
            &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            connection,
        )
    }

    #[test]
    fn test_straight_profile() {
        let profile = profile_from_points(&square(Connection::Straight)).unwrap();
        assert_eq!(profile.edges().len(), 4);
        let polygon = profile.to_polygon(&KernelSettings::default()).unwrap();
        assert_relative_eq!(polygon.area(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_spline_profile_is_one_chain() {
        let profile = profile_from_points(&square(Connection::Spline)).unwrap();
        assert_eq!(profile.edges().len(), 1);
        assert!(matches!(&profile.edges()[0], Edge::Spline(pts) if pts.len() == 4));
    }

    #[test]
    fn test_mixed_profile_keeps_every_point() {
        let points = vec![
            ProfilePoint::straight(0.0, 0.0),
            ProfilePoint::straight(10.0, 0.0),
            ProfilePoint::spline(10.0, 10.0),
            ProfilePoint::spline(5.0, 12.0),
            ProfilePoint::straight(0.0, 10.0),
        ];
        let profile = profile_from_points(&points).unwrap();
        // starts at the first change of connection
        assert_eq!(profile.start(), DVec2::new(10.0, 10.0));
        let polygon = profile.to_polygon(&KernelSettings::default()).unwrap();
        for p in &points {
            assert!(
                polygon
                    .points()
                    .iter()
                    .any(|q| q.distance(p.position()) < 1e-9)
            );
        }
    }

    #[test]
    fn test_circle_profile() {
        let points = vec![
            ProfilePoint::circle(10.0, 0.0),
            ProfilePoint::circle(0.0, 10.0),
            ProfilePoint::circle(-10.0, 0.0),
            ProfilePoint::circle(0.0, -10.0),
        ];
        let profile = profile_from_points(&points).unwrap();
        assert_eq!(profile.edges().len(), 2);
        let settings = KernelSettings::default().with_arc_step_degrees(0.5);
        let area = profile.to_polygon(&settings).unwrap().area();
        assert_relative_eq!(area, std::f64::consts::PI * 100.0, max_relative = 1e-3);
    }

    #[test]
    fn test_odd_circle_chain_rejected() {
        let points = vec![
            ProfilePoint::circle(10.0, 0.0),
            ProfilePoint::circle(0.0, 10.0),
            ProfilePoint::straight(-10.0, 0.0),
        ];
        // circle chain (10,0) -> (0,10) -> (-10,0) is one arc: fine
        assert!(profile_from_points(&points).is_ok());

        let points = vec![
            ProfilePoint::circle(10.0, 0.0),
            ProfilePoint::straight(0.0, 10.0),
            ProfilePoint::straight(-10.0, 0.0),
        ];
        assert!(matches!(
            profile_from_points(&points),
            Err(ShapeError::InvalidPoints(_))
        ));
    }
}
