//! Shape behaviour across sweep, placement and boolean operations

use approx::assert_relative_eq;
use pk_cad::{CadKernel, CsgKernel, Workplane};
use pk_core::{Shape, ShapeError};

fn square(half: f64) -> Vec<(f64, f64)> {
    vec![(-half, half), (half, half), (half, -half), (-half, -half)]
}

fn swept_square(half: f64, height: f64) -> Shape {
    Shape::sweep_straight(&square(half), &[(100.0, 0.0), (150.0, height / 2.0), (100.0, height)])
}

#[test]
fn test_sweep_volume_follows_section_and_length() {
    let kernel = CsgKernel::default();
    let base = swept_square(10.0, 600.0).volume(&kernel).unwrap();
    assert_relative_eq!(base, 20.0 * 20.0 * 600.0, max_relative = 1e-6);

    let doubled_face = swept_square(20.0, 600.0).volume(&kernel).unwrap();
    assert_relative_eq!(doubled_face, 4.0 * base, max_relative = 1e-6);

    let half_length = swept_square(10.0, 300.0).volume(&kernel).unwrap();
    assert_relative_eq!(half_length * 2.0, base, max_relative = 1e-6);
}

#[test]
fn test_sweep_placed_at_four_azimuths() {
    let kernel = CsgKernel::default();
    let single = swept_square(10.0, 600.0);
    let placed = single.clone().with_azimuth(vec![0.0, 90.0, 180.0, 270.0]);
    assert_relative_eq!(
        placed.volume(&kernel).unwrap(),
        4.0 * single.volume(&kernel).unwrap(),
        max_relative = 1e-6
    );
    let bbox = placed.bounding_box(&kernel).unwrap();
    assert!(bbox.min.x < -100.0 && bbox.min.y < -100.0);
}

#[test]
fn test_sweep_workplane_must_differ_from_path() {
    let kernel = CsgKernel::default();
    let shape = swept_square(10.0, 600.0).with_workplane(Workplane::XZ);
    assert!(matches!(
        shape.solid(&kernel),
        Err(ShapeError::InvalidWorkplane(_))
    ));
    let mismatched = swept_square(10.0, 600.0).with_path_workplane(Workplane::YZ);
    assert!(matches!(
        mismatched.validate(),
        Err(ShapeError::InvalidWorkplane(_))
    ));
}

#[test]
fn test_cut_removes_tool_volume() {
    let kernel = CsgKernel::default();
    let outer_points = [(100.0, 100.0), (200.0, 100.0), (200.0, -100.0), (100.0, -100.0)];
    let inner_points = [(120.0, 50.0), (180.0, 50.0), (180.0, -50.0), (120.0, -50.0)];
    let outer = Shape::rotate_straight(&outer_points, 360.0);
    let inner = Shape::rotate_straight(&inner_points, 360.0);
    let cut = outer.clone().with_cut(inner.clone());
    assert_relative_eq!(
        cut.volume(&kernel).unwrap(),
        outer.volume(&kernel).unwrap() - inner.volume(&kernel).unwrap(),
        max_relative = 5e-3
    );
}

#[test]
fn test_sector_of_rotated_shape() {
    let kernel = CsgKernel::default();
    let points = [(100.0, 50.0), (200.0, 50.0), (200.0, -50.0), (100.0, -50.0)];
    let full = Shape::rotate_straight(&points, 360.0).volume(&kernel).unwrap();
    let quarter = Shape::rotate_straight(&points, 90.0).volume(&kernel).unwrap();
    assert_relative_eq!(quarter * 4.0, full, max_relative = 1e-6);
}

#[test]
fn test_export_stl() {
    let kernel = CsgKernel::default();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("ring.stl");
    let points = [(100.0, 50.0), (200.0, 50.0), (200.0, -50.0), (100.0, -50.0)];
    Shape::rotate_straight(&points, 180.0)
        .export_stl(&kernel, &path)
        .unwrap();
    assert!(path.exists());
    assert!(pk_core::export::load_stl_triangle_count(&path).unwrap() > 0);
    assert_eq!(kernel.name(), "csg");
}
