//! Multilinear interpolation on rectilinear LUT grids

use crate::types::{WindError, WindResult};
use ndarray::{Array3, ArrayView1, ArrayView3, Zip};

/// Relative tolerance (in grid steps) for points sitting on the domain bounds
const BOUNDS_TOLERANCE: f64 = 1e-6;

/// Bracketing indices and fractional weights of target points along one axis
#[derive(Debug, Clone)]
pub struct AxisWeights {
    lower: Vec<usize>,
    upper: Vec<usize>,
    frac: Vec<f64>,
}

impl AxisWeights {
    /// Compute weights of `targets` on the ascending `axis`.
    ///
    /// Targets outside the axis domain are an error: callers must pad the
    /// source grid rather than extrapolate.
    pub fn new(
        axis: ArrayView1<f64>,
        targets: ArrayView1<f64>,
        lut_name: &str,
        axis_name: &str,
    ) -> WindResult<Self> {
        let n = axis.len();
        if n == 0 {
            return Err(WindError::Interpolation {
                name: lut_name.to_string(),
                reason: format!("empty {} axis", axis_name),
            });
        }

        let mut weights = Self {
            lower: Vec::with_capacity(targets.len()),
            upper: Vec::with_capacity(targets.len()),
            frac: Vec::with_capacity(targets.len()),
        };

        for &t in targets.iter() {
            match bracket(axis, t) {
                Some((lo, hi, frac)) => {
                    weights.lower.push(lo);
                    weights.upper.push(hi);
                    weights.frac.push(frac);
                }
                None => {
                    return Err(WindError::Interpolation {
                        name: lut_name.to_string(),
                        reason: format!(
                            "{} {} outside of [{}, {}]",
                            axis_name,
                            t,
                            axis[0],
                            axis[n - 1]
                        ),
                    })
                }
            }
        }

        Ok(weights)
    }

    /// Weights for a singleton axis (e.g. the missing direction of cross-pol LUTs)
    pub fn singleton() -> Self {
        Self {
            lower: vec![0],
            upper: vec![0],
            frac: vec![0.0],
        }
    }

    pub fn len(&self) -> usize {
        self.frac.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frac.is_empty()
    }
}

/// Lower index, upper index and fraction of `t` on `axis`, None when out of bounds
fn bracket(axis: ArrayView1<f64>, t: f64) -> Option<(usize, usize, f64)> {
    let n = axis.len();
    if t.is_nan() {
        return None;
    }
    if n == 1 {
        let tol = BOUNDS_TOLERANCE * axis[0].abs().max(1.0);
        return if (t - axis[0]).abs() <= tol {
            Some((0, 0, 0.0))
        } else {
            None
        };
    }

    let first_step = axis[1] - axis[0];
    let last_step = axis[n - 1] - axis[n - 2];
    if t < axis[0] - BOUNDS_TOLERANCE * first_step || t > axis[n - 1] + BOUNDS_TOLERANCE * last_step
    {
        return None;
    }

    let upper = axis
        .iter()
        .position(|&x| x > t)
        .unwrap_or(n)
        .clamp(1, n - 1);
    let lower = upper - 1;
    let frac = ((t - axis[lower]) / (axis[upper] - axis[lower])).clamp(0.0, 1.0);
    Some((lower, upper, frac))
}

/// Trilinear interpolation of `values` (inc, wspd, phi) onto the target grid
pub fn interp3(
    values: ArrayView3<f64>,
    w_inc: &AxisWeights,
    w_wspd: &AxisWeights,
    w_phi: &AxisWeights,
) -> Array3<f64> {
    let mut out = Array3::<f64>::zeros((w_inc.len(), w_wspd.len(), w_phi.len()));

    let fill = |(i, j, k): (usize, usize, usize), v: &mut f64| {
        *v = interp_cell(&values, w_inc, i, w_wspd, j, w_phi, k);
    };

    #[cfg(feature = "parallel")]
    Zip::indexed(&mut out).par_for_each(fill);
    #[cfg(not(feature = "parallel"))]
    Zip::indexed(&mut out).for_each(fill);

    out
}

fn interp_cell(
    values: &ArrayView3<f64>,
    w_inc: &AxisWeights,
    i: usize,
    w_wspd: &AxisWeights,
    j: usize,
    w_phi: &AxisWeights,
    k: usize,
) -> f64 {
    let (i0, i1, fi) = (w_inc.lower[i], w_inc.upper[i], w_inc.frac[i]);
    let (j0, j1, fj) = (w_wspd.lower[j], w_wspd.upper[j], w_wspd.frac[j]);
    let (k0, k1, fk) = (w_phi.lower[k], w_phi.upper[k], w_phi.frac[k]);

    let lerp = |a: f64, b: f64, f: f64| if f == 0.0 { a } else { a * (1.0 - f) + b * f };

    let c00 = lerp(values[[i0, j0, k0]], values[[i0, j0, k1]], fk);
    let c01 = lerp(values[[i0, j1, k0]], values[[i0, j1, k1]], fk);
    let c10 = lerp(values[[i1, j0, k0]], values[[i1, j0, k1]], fk);
    let c11 = lerp(values[[i1, j1, k0]], values[[i1, j1, k1]], fk);

    let c0 = lerp(c00, c01, fj);
    let c1 = lerp(c10, c11, fj);

    lerp(c0, c1, fi)
}

/// Interpolate a single point, NaN when outside the grid
pub fn interp_point(
    values: ArrayView3<f64>,
    inc_axis: ArrayView1<f64>,
    wspd_axis: ArrayView1<f64>,
    phi_axis: Option<ArrayView1<f64>>,
    point: (f64, f64, Option<f64>),
) -> f64 {
    let (inc, wspd, phi) = point;
    let bracketed = (|| {
        let bi = bracket(inc_axis, inc)?;
        let bw = bracket(wspd_axis, wspd)?;
        let bp = match (phi_axis, phi) {
            (Some(axis), Some(p)) => bracket(axis, p)?,
            (Some(_), None) => return None,
            (None, _) => (0, 0, 0.0),
        };
        Some((bi, bw, bp))
    })();

    match bracketed {
        Some((bi, bw, bp)) => {
            let single = |(lo, hi, frac): (usize, usize, f64)| AxisWeights {
                lower: vec![lo],
                upper: vec![hi],
                frac: vec![frac],
            };
            interp_cell(&values, &single(bi), 0, &single(bw), 0, &single(bp), 0)
        }
        None => f64::NAN,
    }
}
