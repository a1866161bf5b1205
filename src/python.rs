//! Python bindings

use crate::core::{
    evaluate_broadcast, invert_from_model, nesz_flattening, wind_to_img_array, InversionInput,
    InversionParams, LutRequest, ModelPair, ModelRegistry, WindConvention,
};
use crate::types::{AxisRange, Polarization, Units, WindError};
use num_complex::Complex64;
use numpy::{IntoPyArray, PyArray1, PyArray2, PyArrayDyn, PyReadonlyArray2, PyReadonlyArrayDyn};
use pyo3::prelude::*;

fn to_py_err(e: WindError) -> PyErr {
    match e {
        WindError::UnknownModel(_)
        | WindError::UnsupportedUnits(_)
        | WindError::InvalidPolarization(_)
        | WindError::UnknownConvention(_)
        | WindError::InvalidRange { .. }
        | WindError::MissingCrossPolModel
        | WindError::WrongPolarization { .. }
        | WindError::ShapeMismatch(_) => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}", e))
        }
        _ => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)),
    }
}

fn to_range(range: Option<(f64, f64)>) -> Option<AxisRange> {
    range.map(|(min, max)| AxisRange::new(min, max))
}

/// Python module definition
#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(available_models, m)?)?;
    m.add_function(wrap_pyfunction!(gmf_lut, m)?)?;
    m.add_function(wrap_pyfunction!(gmf_evaluate, m)?)?;
    m.add_function(wrap_pyfunction!(invert, m)?)?;
    m.add_function(wrap_pyfunction!(wind_to_img, m)?)?;
    m.add_function(wrap_pyfunction!(flatten_nesz, m)?)?;
    Ok(())
}

/// Names of the built-in models, optionally restricted to one polarization
#[pyfunction]
#[pyo3(signature = (pol=None))]
fn available_models(pol: Option<&str>) -> PyResult<Vec<String>> {
    let pol = pol
        .map(|p| p.parse::<Polarization>())
        .transpose()
        .map_err(to_py_err)?;
    Ok(ModelRegistry::with_builtin_gmfs()
        .available_models(pol)
        .into_iter()
        .map(|m| m.name().to_string())
        .collect())
}

/// LUT of a built-in model as (incidence, wspd, phi or None, values)
#[pyfunction]
#[pyo3(signature = (
    name,
    units="dB",
    inc_range=None,
    wspd_range=None,
    phi_range=None,
    allow_interp=true
))]
fn gmf_lut<'py>(
    py: Python<'py>,
    name: &str,
    units: &str,
    inc_range: Option<(f64, f64)>,
    wspd_range: Option<(f64, f64)>,
    phi_range: Option<(f64, f64)>,
    allow_interp: bool,
) -> PyResult<(
    &'py PyArray1<f64>,
    &'py PyArray1<f64>,
    Option<&'py PyArray1<f64>>,
    &'py PyArrayDyn<f64>,
)> {
    let request = LutRequest {
        inc_range: to_range(inc_range),
        wspd_range: to_range(wspd_range),
        phi_range: to_range(phi_range),
        allow_interp,
        units: units.parse::<Units>().map_err(to_py_err)?,
    };

    let registry = ModelRegistry::with_builtin_gmfs();
    let lut = py
        .allow_threads(|| registry.get_lut(name, &request))
        .map_err(to_py_err)?;

    let values = match lut.values_2d() {
        Some(values) => values.to_owned().into_dyn(),
        None => lut.values().clone().into_dyn(),
    };

    Ok((
        lut.incidence().clone().into_pyarray(py),
        lut.wspd().clone().into_pyarray(py),
        lut.phi().map(|phi| phi.clone().into_pyarray(py)),
        values.into_pyarray(py),
    ))
}

/// Linear sigma0 of a built-in GMF over broadcastable arrays
#[pyfunction]
#[pyo3(signature = (name, inc, wspd, phi=None))]
fn gmf_evaluate<'py>(
    py: Python<'py>,
    name: &str,
    inc: PyReadonlyArrayDyn<f64>,
    wspd: PyReadonlyArrayDyn<f64>,
    phi: Option<PyReadonlyArrayDyn<f64>>,
) -> PyResult<&'py PyArrayDyn<f64>> {
    let registry = ModelRegistry::with_builtin_gmfs();
    let kernel = match registry.resolve(name).map_err(to_py_err)? {
        crate::core::Model::Gmf(gmf) => gmf.kernel().map_err(to_py_err)?,
        crate::core::Model::Tabulated(_) => {
            return Err(to_py_err(WindError::KernelUnavailable(name.to_string())))
        }
    };

    let result = evaluate_broadcast(
        kernel,
        inc.as_array(),
        wspd.as_array(),
        phi.as_ref().map(|p| p.as_array()),
    )
    .map_err(to_py_err)?;
    Ok(result.into_pyarray(py))
}

/// Wind speed from co-pol (and optionally cross-pol) linear sigma0
#[pyfunction]
#[pyo3(signature = (
    inc,
    sigma0_co,
    ancillary_wind,
    model,
    sigma0_cr=None,
    nesz_cr=None,
    crosspol_model=None
))]
#[allow(clippy::too_many_arguments)]
fn invert<'py>(
    py: Python<'py>,
    inc: PyReadonlyArrayDyn<f64>,
    sigma0_co: PyReadonlyArrayDyn<f64>,
    ancillary_wind: PyReadonlyArrayDyn<Complex64>,
    model: &str,
    sigma0_cr: Option<PyReadonlyArrayDyn<f64>>,
    nesz_cr: Option<PyReadonlyArrayDyn<f64>>,
    crosspol_model: Option<&str>,
) -> PyResult<&'py PyArrayDyn<f64>> {
    let registry = ModelRegistry::with_builtin_gmfs();
    let models = ModelPair {
        copol: model.to_string(),
        crosspol: crosspol_model.map(str::to_string),
    };

    let input = match (&sigma0_cr, &nesz_cr) {
        (Some(sigma0_cr), Some(nesz_cr)) => InversionInput::DualPol {
            inc: inc.as_array(),
            sigma0_co: sigma0_co.as_array(),
            sigma0_cr: sigma0_cr.as_array(),
            nesz_cr: nesz_cr.as_array(),
            ancillary_wind: ancillary_wind.as_array(),
        },
        (None, None) => InversionInput::CoPol {
            inc: inc.as_array(),
            sigma0_co: sigma0_co.as_array(),
            ancillary_wind: ancillary_wind.as_array(),
        },
        _ => {
            return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(
                "sigma0_cr and nesz_cr must be given together",
            ))
        }
    };

    let wspd = py
        .allow_threads(|| {
            invert_from_model(&registry, input, &models, InversionParams::default())
        })
        .map_err(to_py_err)?;
    Ok(wspd.into_pyarray(py))
}

/// Complex ancillary wind in image geometry
#[pyfunction]
#[pyo3(signature = (u, v, ground_heading, convention="antenna"))]
fn wind_to_img<'py>(
    py: Python<'py>,
    u: PyReadonlyArrayDyn<f64>,
    v: PyReadonlyArrayDyn<f64>,
    ground_heading: PyReadonlyArrayDyn<f64>,
    convention: &str,
) -> PyResult<&'py PyArrayDyn<Complex64>> {
    let convention: WindConvention = convention.parse().map_err(to_py_err)?;
    let wind = wind_to_img_array(u.as_array(), v.as_array(), ground_heading.as_array(), convention)
        .map_err(to_py_err)?;
    Ok(wind.into_pyarray(py))
}

/// Flattened NESZ over a 2D (atrack, xtrack) field
#[pyfunction]
fn flatten_nesz<'py>(
    py: Python<'py>,
    noise: PyReadonlyArray2<f64>,
    inc: PyReadonlyArray2<f64>,
) -> PyResult<&'py PyArray2<f64>> {
    let flat = nesz_flattening(noise.as_array(), inc.as_array()).map_err(to_py_err)?;
    Ok(flat.into_pyarray(py))
}
