//! Elementwise application of a GMF kernel over scalar, axis and scene inputs
//!
//! The three entry points only differ in how they iterate; all of them call
//! the same kernel and return the same numbers for the same coordinates.

use crate::core::gmf::GmfKernel;
use crate::types::{WindError, WindResult};
use ndarray::{Array1, Array3, ArrayD, ArrayView1, ArrayViewD, Axis, IxDyn, Zip};

/// Single point evaluation. A missing direction is passed to the kernel as NaN.
pub fn evaluate_scalar(kernel: GmfKernel, inc: f64, wspd: f64, phi: Option<f64>) -> f64 {
    kernel(inc, wspd, phi.unwrap_or(f64::NAN))
}

/// Outer-product evaluation over independent 1D axes, shape (inc, wspd, phi).
///
/// Without a direction axis the result keeps a trailing singleton axis fed
/// with NaN directions. This is the path that builds LUTs; grid cells are
/// filled in parallel.
pub fn evaluate_outer(
    kernel: GmfKernel,
    inc: ArrayView1<f64>,
    wspd: ArrayView1<f64>,
    phi: Option<ArrayView1<f64>>,
) -> Array3<f64> {
    let phi = match phi {
        Some(phi) => phi.to_owned(),
        None => Array1::from_elem(1, f64::NAN),
    };

    log::debug!(
        "Evaluating GMF on {}x{}x{} grid",
        inc.len(),
        wspd.len(),
        phi.len()
    );

    let mut values = Array3::<f64>::zeros((inc.len(), wspd.len(), phi.len()));
    let fill = |(i, j, k): (usize, usize, usize), v: &mut f64| {
        *v = kernel(inc[i], wspd[j], phi[k]);
    };

    #[cfg(feature = "parallel")]
    Zip::indexed(&mut values).par_for_each(fill);
    #[cfg(not(feature = "parallel"))]
    Zip::indexed(&mut values).for_each(fill);

    values
}

/// Outer-product evaluation with the direction axis squeezed away when absent,
/// so non-directional models return a 2D array.
pub fn evaluate_grid(
    kernel: GmfKernel,
    inc: ArrayView1<f64>,
    wspd: ArrayView1<f64>,
    phi: Option<ArrayView1<f64>>,
) -> ArrayD<f64> {
    let squeeze_phi = phi.is_none();
    let values = evaluate_outer(kernel, inc, wspd, phi);
    if squeeze_phi {
        values.index_axis_move(Axis(2), 0).into_dyn()
    } else {
        values.into_dyn()
    }
}

/// Broadcast elementwise evaluation over scene arrays.
///
/// Inputs follow numpy broadcasting rules; the output has the broadcast shape.
/// A missing direction is synthesized as NaN.
pub fn evaluate_broadcast(
    kernel: GmfKernel,
    inc: ArrayViewD<f64>,
    wspd: ArrayViewD<f64>,
    phi: Option<ArrayViewD<f64>>,
) -> WindResult<ArrayD<f64>> {
    let mut shape = broadcast_shape(inc.shape(), wspd.shape())?;
    if let Some(phi) = &phi {
        shape = broadcast_shape(&shape, phi.shape())?;
    }
    let dim = IxDyn(&shape);

    let phi: ArrayD<f64> = match phi {
        Some(phi) => phi.to_owned(),
        None => ArrayD::from_elem(dim.clone(), f64::NAN),
    };
    let phi = phi.view();

    let inc_b = broadcast_to(&inc, &dim, "incidence")?;
    let wspd_b = broadcast_to(&wspd, &dim, "wspd")?;
    let phi_b = broadcast_to(&phi, &dim, "phi")?;

    let zip = Zip::from(&inc_b).and(&wspd_b).and(&phi_b);

    #[cfg(feature = "parallel")]
    let values = zip.par_map_collect(|&i, &w, &p| kernel(i, w, p));
    #[cfg(not(feature = "parallel"))]
    let values = zip.map_collect(|&i, &w, &p| kernel(i, w, p));

    Ok(values)
}

fn broadcast_to<'a>(
    array: &'a ArrayViewD<f64>,
    dim: &IxDyn,
    label: &str,
) -> WindResult<ArrayViewD<'a, f64>> {
    array.broadcast(dim.clone()).ok_or_else(|| {
        WindError::ShapeMismatch(format!(
            "cannot broadcast {} of shape {:?} to {:?}",
            label,
            array.shape(),
            dim
        ))
    })
}

/// Numpy-style broadcast of two shapes
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> WindResult<Vec<usize>> {
    let ndim = a.len().max(b.len());
    let mut shape = vec![0; ndim];
    for i in 0..ndim {
        let da = if i < ndim - a.len() { 1 } else { a[i - (ndim - a.len())] };
        let db = if i < ndim - b.len() { 1 } else { b[i - (ndim - b.len())] };
        shape[i] = match (da, db) {
            (x, y) if x == y => x,
            (1, y) => y,
            (x, 1) => x,
            _ => {
                return Err(WindError::ShapeMismatch(format!(
                    "shapes {:?} and {:?} are not broadcastable",
                    a, b
                )))
            }
        };
    }
    Ok(shape)
}
