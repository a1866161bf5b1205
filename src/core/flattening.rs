//! NESZ flattening
//!
//! Noise equivalent sigma0 annotated in products shows scalloping and burst
//! steps along the swath. Each along-track line is replaced by a straight
//! line (in dB) versus incidence, lowered by 1 dB.

use crate::types::{WindError, WindResult};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};

/// Flatten a 2D (atrack, xtrack) noise field against incidence.
///
/// NaN noise samples are replaced by the mean of their column before the
/// fit. Lines with fewer than two usable samples come out as NaN.
pub fn nesz_flattening(noise: ArrayView2<f64>, inc: ArrayView2<f64>) -> WindResult<Array2<f64>> {
    if noise.shape() != inc.shape() {
        return Err(WindError::ShapeMismatch(format!(
            "noise {:?} vs incidence {:?}",
            noise.shape(),
            inc.shape()
        )));
    }

    let noise_mean = nanmean_columns(noise);
    // incidence barely changes along track
    let inc_mean = nanmean_columns(inc);

    let mut flat = Array2::from_elem(noise.dim(), f64::NAN);
    let zip = Zip::from(flat.rows_mut()).and(noise.rows());

    #[cfg(feature = "parallel")]
    zip.par_for_each(|mut out, row| {
        out.assign(&flatten_row(row, noise_mean.view(), inc_mean.view()));
    });
    #[cfg(not(feature = "parallel"))]
    zip.for_each(|mut out, row| {
        out.assign(&flatten_row(row, noise_mean.view(), inc_mean.view()));
    });

    log::debug!("Flattened NESZ over {} lines", noise.nrows());
    Ok(flat)
}

fn nanmean_columns(values: ArrayView2<f64>) -> Array1<f64> {
    values.map_axis(Axis(0), |col| {
        let (sum, count) = col
            .iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    })
}

fn flatten_row(
    row: ArrayView1<f64>,
    noise_mean: ArrayView1<f64>,
    inc: ArrayView1<f64>,
) -> Array1<f64> {
    let noise_db: Vec<f64> = row
        .iter()
        .zip(noise_mean.iter())
        .map(|(&n, &m)| {
            let filled = if n.is_nan() { m } else { n };
            10.0 * filled.log10()
        })
        .collect();

    let points: Vec<(f64, f64)> = inc
        .iter()
        .zip(noise_db.iter())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect();

    match fit_line(&points) {
        Some((slope, intercept)) => inc.mapv(|x| 10f64.powf((slope * x + intercept - 1.0) / 10.0)),
        None => Array1::from_elem(row.len(), f64::NAN),
    }
}

/// Least squares line through `points`; None with fewer than two points
fn fit_line(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    let sxy: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();

    // all samples at the same incidence: flat line through the mean
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    Some((slope, mean_y - slope * mean_x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_fit_line() {
        let (a, b) = fit_line(&[(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)]).unwrap();
        assert_relative_eq!(a, 2.0, epsilon = 1e-12);
        assert_relative_eq!(b, 1.0, epsilon = 1e-12);
        assert!(fit_line(&[(1.0, 1.0)]).is_none());
    }

    #[test]
    fn test_linear_noise_lowered_by_1db() {
        // noise exactly linear in dB: output is the input minus 1 dB
        let inc = Array2::from_shape_fn((3, 5), |(_, j)| 30.0 + j as f64);
        let noise = inc.mapv(|x| 10f64.powf((-0.2 * x - 20.0) / 10.0));
        let flat = nesz_flattening(noise.view(), inc.view()).unwrap();
        for ((i, j), &v) in flat.indexed_iter() {
            assert_relative_eq!(v, noise[[i, j]] * 10f64.powf(-0.1), max_relative = 1e-9);
        }
    }

    #[test]
    fn test_nan_filled_by_column_mean() {
        let inc = Array2::from_shape_fn((2, 4), |(_, j)| 30.0 + j as f64);
        let mut noise = inc.mapv(|x| 10f64.powf((-0.5 * x) / 10.0));
        let reference = nesz_flattening(noise.view(), inc.view()).unwrap();

        noise[[1, 2]] = f64::NAN;
        let flat = nesz_flattening(noise.view(), inc.view()).unwrap();
        for (a, b) in flat.iter().zip(reference.iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_all_nan_row_and_shape() {
        let inc = array![[30.0, 31.0], [30.0, 31.0]];
        let noise = Array2::from_elem((2, 2), f64::NAN);
        let flat = nesz_flattening(noise.view(), inc.view()).unwrap();
        assert!(flat.iter().all(|v| v.is_nan()));

        let bad = Array2::from_elem((3, 2), 1e-3);
        assert!(matches!(
            nesz_flattening(bad.view(), inc.view()),
            Err(WindError::ShapeMismatch(_))
        ));
    }
}
