use approx::assert_relative_eq;
use ndarray::{Array1, ArrayD, IxDyn};
use sarwind::core::dispatch::{evaluate_broadcast, evaluate_grid};
use sarwind::core::gmf::cmod5;
use sarwind::types::{db_to_linear, AxisRange, Polarization, Units, WindError};
use sarwind::{LutRequest, ModelRegistry};
use std::time::Instant;

#[test]
fn test_registry_lut_matches_kernel() {
    let _ = env_logger::builder().is_test(true).try_init();
    let registry = ModelRegistry::with_builtin_gmfs();

    let request = LutRequest {
        inc_range: Some(AxisRange::new(25.0, 27.0)),
        wspd_range: Some(AxisRange::new(5.0, 8.0)),
        phi_range: Some(AxisRange::new(0.0, 30.0)),
        allow_interp: true,
        units: Units::Db,
    };

    let start = Instant::now();
    let lut = registry
        .get_lut("gmf_cmod5", &request)
        .expect("Failed to build LUT");
    println!("LUT {:?} built in {:.3}s", lut.values().dim(), start.elapsed().as_secs_f64());

    assert_eq!(lut.values().dim(), (21, 31, 31));
    assert_eq!(lut.units(), Units::Db);

    // grid nodes shared with the coarse grid are exact kernel values
    let i = 10; // 26.0 deg
    let j = 10; // 6.0 m/s
    let k = 15; // 15 deg
    assert_relative_eq!(lut.incidence()[i], 26.0, epsilon = 1e-9);
    assert_relative_eq!(lut.wspd()[j], 6.0, epsilon = 1e-9);
    assert_relative_eq!(lut.phi().expect("phi axis")[k], 15.0, epsilon = 1e-9);
    assert_relative_eq!(
        db_to_linear(lut.values()[[i, j, k]]),
        cmod5(26.0, 6.0, 15.0),
        max_relative = 1e-9
    );

    // interpolated nodes stay close to the kernel
    for &(inc, wspd, phi) in &[(25.1, 5.3, 7.0), (26.7, 7.9, 29.0)] {
        let i = ((inc - 25.0) / 0.1f64).round() as usize;
        let j = ((wspd - 5.0) / 0.1f64).round() as usize;
        let k = phi as usize;
        let expected = 10.0 * cmod5(inc, wspd, phi).log10();
        assert!((lut.values()[[i, j, k]] - expected).abs() < 0.05);
    }
}

#[test]
fn test_crosspol_lut_is_2d() {
    let registry = ModelRegistry::with_builtin_gmfs();
    let request = LutRequest {
        inc_range: Some(AxisRange::new(30.0, 31.0)),
        wspd_range: Some(AxisRange::new(5.0, 6.0)),
        ..LutRequest::with_units(Units::Linear)
    };
    let lut = registry.get_lut("gmf_c2po", &request).expect("Failed to build LUT");
    assert_eq!(lut.ndim(), 2);
    assert_eq!(lut.values_2d().expect("2D values").dim(), (11, 11));
    assert!(lut.values().iter().all(|&v| v > 0.0));

    assert!(registry
        .available_models(Some(Polarization::VH))
        .iter()
        .all(|m| m.is_crosspol()));
}

#[test]
fn test_table_only_model() {
    let registry = ModelRegistry::with_builtin_gmfs();
    assert!(matches!(
        registry.get_lut("gmf_cmodms1ahw", &LutRequest::default()),
        Err(WindError::KernelUnavailable(_))
    ));
}

#[test]
fn test_dispatch_paths_agree() {
    let inc = Array1::linspace(20.0, 40.0, 5);
    let wspd = Array1::linspace(2.0, 20.0, 4);
    let phi = Array1::linspace(0.0, 180.0, 3);
    let grid = evaluate_grid(cmod5, inc.view(), wspd.view(), Some(phi.view()));

    // same coordinates laid out as broadcastable scene arrays
    let inc_b = inc.clone().into_shape(IxDyn(&[5, 1, 1])).expect("reshape");
    let wspd_b = wspd.clone().into_shape(IxDyn(&[1, 4, 1])).expect("reshape");
    let phi_b: ArrayD<f64> = phi.clone().into_shape(IxDyn(&[1, 1, 3])).expect("reshape");
    let scene = evaluate_broadcast(cmod5, inc_b.view(), wspd_b.view(), Some(phi_b.view()))
        .expect("Failed to broadcast");

    assert_eq!(scene.shape(), grid.shape());
    for (a, b) in scene.iter().zip(grid.iter()) {
        assert_relative_eq!(*a, *b);
    }
}
