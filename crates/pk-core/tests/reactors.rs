//! Parametric reactors built and exported end to end

use pk_cad::{CadKernel, CsgKernel, KernelSettings};
use pk_core::{
    BallReactor, ExportOptions, NeutronicsEntry, ParametricReactor, ReactorDesign,
    SubmersionTokamak,
};

fn coarse_kernel() -> CsgKernel {
    CsgKernel::new(
        KernelSettings::default()
            .with_spline_segments(4)
            .with_revolve_segments(24)
            .with_volume_resolution(40),
    )
}

#[test]
fn test_ball_reactor_export() {
    let kernel = coarse_kernel();
    let reactor = BallReactor::default().reactor().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let options = ExportOptions {
        output_dir: dir.path().to_path_buf(),
        ..ExportOptions::default()
    };
    let summary = reactor.export(&kernel, &options).unwrap();

    // nine shapes plus the graveyard
    assert_eq!(summary.stl_files.len(), 10);
    for name in ["plasma", "divertor", "firstwall", "blanket", "blanket_rear_wall", "tf_coil"] {
        assert!(dir.path().join(format!("{}.stl", name)).exists(), "{} missing", name);
    }

    let manifest = std::fs::read_to_string(summary.neutronics_description.unwrap()).unwrap();
    let entries: Vec<NeutronicsEntry> = serde_json::from_str(&manifest).unwrap();
    assert_eq!(entries.len(), 9);
    assert!(entries.iter().all(|e| e.material != "DT_plasma"));
    assert_eq!(entries.last().unwrap().material, "Graveyard");
}

#[test]
fn test_ball_reactor_layers_stay_outside_center_column() {
    let kernel = coarse_kernel();
    let ball = BallReactor::default();
    let divertor_end = ball.divertor_radii().y;
    let reactor = ball.reactor().unwrap();
    for built in reactor.build(&kernel).unwrap() {
        if ["firstwall", "blanket", "blanket_rear_wall"].contains(&built.shape.name.as_str()) {
            let bbox = kernel.bounding_box(&built.solid);
            assert!(bbox.max.x > divertor_end, "{} is empty", built.shape.name);
            assert!(
                !kernel.contains(&built.solid, glam::DVec3::new(divertor_end - 1.0, 0.0, 0.0)),
                "{} reaches into the center column",
                built.shape.name
            );
        }
    }
}

#[test]
fn test_submersion_volumes() {
    let kernel = coarse_kernel();
    let reactor = SubmersionTokamak::default().reactor().unwrap();
    let volumes = reactor.volumes(&kernel).unwrap();
    assert_eq!(volumes.len(), 12);
    for (name, volume) in &volumes {
        assert!(*volume > 0.0, "{} has no volume", name);
    }
    let bbox = reactor.bounding_box(&kernel).unwrap();
    // PF coils sit outside the TF coils at radius 705 ± 15
    assert!(bbox.max.x >= 720.0 - 1e-6);
}

#[test]
fn test_design_file_drives_build() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("submersion.ron");
    let mut design = ReactorDesign::template("submersion").unwrap();
    design.kernel = KernelSettings::default()
        .with_spline_segments(4)
        .with_revolve_segments(24)
        .with_volume_resolution(40);
    design.output.output_dir = dir.path().join("out");
    design.output.include_graveyard = false;
    design.output.include_plasma = true;
    design.save(&path).unwrap();

    let loaded = ReactorDesign::load(&path).unwrap();
    let reactor = loaded.reactor().unwrap();
    assert_eq!(reactor.name, "submersion_tokamak");
    let summary = reactor.export(&loaded.kernel(), &loaded.output).unwrap();
    assert_eq!(summary.stl_files.len(), 12);
    assert!(dir.path().join("out").join("supports.stl").exists());
    assert!(!dir.path().join("out").join("graveyard.stl").exists());
}
