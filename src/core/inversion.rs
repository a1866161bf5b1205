//! Wind speed inversion by cost function minimisation against GMF LUTs
//!
//! Each pixel is independent: the co-pol LUT slice at the nearest incidence
//! is searched for the (wspd, phi) cell that best explains both the observed
//! sigma0 and the ancillary wind. When cross-pol sigma0 is available, the
//! co-pol estimate is refined by a 1D search against the cross-pol LUT.

use crate::core::lut_builder::LutRequest;
use crate::core::registry::ModelRegistry;
use crate::types::{
    db_to_linear, linear_to_db, nearest_index, AncillaryWind, Lut, Units, WindError, WindResult,
    WindSpeedField,
};
use ndarray::{s, Array, Array1, Array2, Array3, ArrayView, ArrayView2, Axis, Dimension, Zip};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Regularisation scales of the cost function. Defaults are the operational values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InversionParams {
    /// Co-pol sigma0 confidence (dB)
    pub dsig_co: f64,
    /// Ancillary wind confidence, antenna component (m/s)
    pub d_antenna: f64,
    /// Ancillary wind confidence, azimuth component (m/s)
    pub d_azi: f64,
    /// Confidence in the co-pol first guess during cross-pol refinement (m/s)
    pub dwspd_fg: f64,
    /// Cross-pol result is only used when both estimates exceed this speed (m/s)
    pub dual_pol_min_wspd: f64,
    /// A direction axis spanning 180 +/- this many degrees is treated as symmetric
    pub phi_symmetry_tolerance: f64,
    /// Cross-pol confidence is `(nesz_scale / snr) ^ nesz_exponent`
    pub nesz_scale: f64,
    pub nesz_exponent: f64,
}

impl Default for InversionParams {
    fn default() -> Self {
        Self {
            dsig_co: 0.1,
            d_antenna: 2.0,
            d_azi: 2.0,
            dwspd_fg: 2.0,
            dual_pol_min_wspd: 5.0,
            phi_symmetry_tolerance: 2.0,
            nesz_scale: 1.25,
            nesz_exponent: 4.0,
        }
    }
}

/// Co-pol and optional cross-pol model names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPair {
    pub copol: String,
    pub crosspol: Option<String>,
}

impl ModelPair {
    pub fn copol(name: &str) -> Self {
        Self {
            copol: name.to_string(),
            crosspol: None,
        }
    }

    pub fn dualpol(copol: &str, crosspol: &str) -> Self {
        Self {
            copol: copol.to_string(),
            crosspol: Some(crosspol.to_string()),
        }
    }
}

/// Co-pol LUT prepared for the grid search
#[derive(Debug, Clone)]
struct CoPolTable {
    incidence: Vec<f64>,
    wspd: Array1<f64>,
    /// (incidence, wspd, phi), dB
    sigma0_db: Array3<f64>,
    /// LUT wind projected on the antenna axis, (wspd, phi)
    wspd_antenna: Array2<f64>,
    /// LUT wind projected on the azimuth axis, (wspd, phi)
    wspd_azi: Array2<f64>,
    phi_symmetric: bool,
}

impl CoPolTable {
    fn new(lut: Lut, params: &InversionParams) -> WindResult<Self> {
        let phi = match lut.phi() {
            Some(phi) => phi.clone(),
            None => {
                return Err(WindError::WrongPolarization {
                    name: lut.name().to_string(),
                    expected: "co-pol (incidence, wspd, phi)".to_string(),
                })
            }
        };
        let phi_symmetric = lut.is_phi_symmetric(params.phi_symmetry_tolerance);
        let lut = lut.into_units(Units::Db);

        let shape = (lut.wspd().len(), phi.len());
        let wspd = lut.wspd().clone();
        let wspd_antenna =
            Array2::from_shape_fn(shape, |(i, j)| wspd[i] * phi[j].to_radians().cos());
        let wspd_azi = Array2::from_shape_fn(shape, |(i, j)| wspd[i] * phi[j].to_radians().sin());

        log::debug!(
            "Co-pol LUT '{}' {:?}, symmetric direction axis: {}",
            lut.name(),
            lut.values().dim(),
            phi_symmetric
        );

        Ok(Self {
            incidence: lut.incidence().to_vec(),
            wspd,
            sigma0_db: lut.values,
            wspd_antenna,
            wspd_azi,
            phi_symmetric,
        })
    }
}

/// Cross-pol LUT prepared for the 1D search
#[derive(Debug, Clone)]
struct CrossPolTable {
    incidence: Vec<f64>,
    wspd: Array1<f64>,
    /// (incidence, wspd), dB
    sigma0_db: Array2<f64>,
}

impl CrossPolTable {
    fn new(lut: Lut) -> WindResult<Self> {
        if lut.phi().is_some() {
            return Err(WindError::WrongPolarization {
                name: lut.name().to_string(),
                expected: "cross-pol (incidence, wspd)".to_string(),
            });
        }
        let lut = lut.into_units(Units::Db);
        Ok(Self {
            incidence: lut.incidence().to_vec(),
            wspd: lut.wspd().clone(),
            sigma0_db: lut.values.index_axis_move(Axis(2), 0),
        })
    }
}

/// Per-pixel wind inversion against prepared LUTs.
///
/// The inverter is read-only once built and is shared by all worker threads.
#[derive(Debug, Clone)]
pub struct WindInverter {
    copol: CoPolTable,
    crosspol: Option<CrossPolTable>,
    params: InversionParams,
}

impl WindInverter {
    /// Build from already constructed LUTs (any units)
    pub fn new(
        copol_lut: Lut,
        crosspol_lut: Option<Lut>,
        params: InversionParams,
    ) -> WindResult<Self> {
        let copol = CoPolTable::new(copol_lut, &params)?;
        let crosspol = crosspol_lut.map(CrossPolTable::new).transpose()?;
        Ok(Self {
            copol,
            crosspol,
            params,
        })
    }

    /// Resolve models and build their LUTs. The cross-pol LUT is only built
    /// when `with_crosspol` is set.
    pub fn from_registry(
        registry: &ModelRegistry,
        models: &ModelPair,
        with_crosspol: bool,
        params: InversionParams,
    ) -> WindResult<Self> {
        let request = LutRequest::with_units(Units::Db);

        let copol_model = registry.resolve(&models.copol)?;
        if !copol_model.is_copol() {
            return Err(WindError::WrongPolarization {
                name: models.copol.clone(),
                expected: "co-pol".to_string(),
            });
        }

        let crosspol_model = if with_crosspol {
            let name = models
                .crosspol
                .as_ref()
                .ok_or(WindError::MissingCrossPolModel)?;
            let model = registry.resolve(name)?;
            if !model.is_crosspol() {
                return Err(WindError::WrongPolarization {
                    name: name.clone(),
                    expected: "cross-pol".to_string(),
                });
            }
            Some(model)
        } else {
            None
        };

        // both tables are independent, build them concurrently
        let (copol_lut, crosspol_lut) = rayon::join(
            || copol_model.to_lut_with(&request),
            || crosspol_model.map(|m| m.to_lut_with(&request)).transpose(),
        );

        let copol_lut = copol_lut?;
        let crosspol_lut = crosspol_lut?;
        Self::new(copol_lut, crosspol_lut, params)
    }

    pub fn params(&self) -> &InversionParams {
        &self.params
    }

    pub fn has_crosspol(&self) -> bool {
        self.crosspol.is_some()
    }

    /// Invert one pixel. Backscatter inputs are linear; pass NaN cross-pol
    /// values for a co-pol only inversion.
    pub fn invert_pixel(
        &self,
        inc: f64,
        sigma0_co: f64,
        sigma0_cr: f64,
        nesz_cr: f64,
        ancillary_wind: AncillaryWind,
    ) -> f64 {
        if sigma0_co.is_nan() || inc.is_nan() {
            return f64::NAN;
        }

        let mut wspd = self.copol_wspd(inc, linear_to_db(sigma0_co), ancillary_wind);
        if wspd.is_nan() {
            return wspd;
        }

        if let (Some(crosspol), false) = (&self.crosspol, sigma0_cr.is_nan()) {
            if let Some(wspd_dual) = self.dualpol_wspd(crosspol, inc, wspd, sigma0_cr, nesz_cr) {
                // cross-pol is unreliable at low wind: keep the co-pol estimate there
                let threshold = self.params.dual_pol_min_wspd;
                if wspd_dual > threshold && wspd > threshold {
                    wspd = wspd_dual;
                }
            }
        }

        wspd
    }

    /// Co-pol grid search over (wspd, phi); NaN when no cell has a finite cost
    fn copol_wspd(&self, inc: f64, sigma0_co_db: f64, ancillary_wind: AncillaryWind) -> f64 {
        let co = &self.copol;
        let p = &self.params;

        let i_inc = match nearest_index(&co.incidence, inc) {
            Some(i) => i,
            None => return f64::NAN,
        };
        let lut = co.sigma0_db.index_axis(Axis(0), i_inc);

        let m_antenna = ancillary_wind.re;
        let m_azi = if co.phi_symmetric {
            ancillary_wind.im.abs()
        } else {
            ancillary_wind.im
        };

        let mut best: Option<(f64, usize)> = None;
        for ((i_wspd, i_phi), &sigma0_lut) in lut.indexed_iter() {
            let j_wind = ((co.wspd_antenna[[i_wspd, i_phi]] - m_antenna) / p.d_antenna).powi(2)
                + ((co.wspd_azi[[i_wspd, i_phi]] - m_azi) / p.d_azi).powi(2);
            let j_sig = ((sigma0_lut - sigma0_co_db) / p.dsig_co).powi(2);
            let cost = j_wind + j_sig;
            if cost.is_nan() {
                continue;
            }
            if best.map_or(true, |(b, _)| cost < b) {
                best = Some((cost, i_wspd));
            }
        }

        best.map_or(f64::NAN, |(_, i_wspd)| co.wspd[i_wspd])
    }

    /// Cross-pol 1D search; None when no wind speed has a finite cost
    fn dualpol_wspd(
        &self,
        cr: &CrossPolTable,
        inc: f64,
        wspd_co: f64,
        sigma0_cr: f64,
        nesz_cr: f64,
    ) -> Option<f64> {
        let p = &self.params;
        let i_inc = nearest_index(&cr.incidence, inc)?;
        let lut = cr.sigma0_db.row(i_inc);

        let sigma0_cr_db = linear_to_db(sigma0_cr);
        let snr = db_to_linear(sigma0_cr_db) / db_to_linear(linear_to_db(nesz_cr));
        // confidence degrades quickly when the signal approaches the noise floor
        let dsig_cr = (p.nesz_scale / snr).powf(p.nesz_exponent);

        let mut best: Option<(f64, usize)> = None;
        for (i_wspd, (&sigma0_lut, &wspd_lut)) in lut.iter().zip(cr.wspd.iter()).enumerate() {
            let j_sig = ((sigma0_lut - sigma0_cr_db) / dsig_cr).powi(2);
            let j_wind = ((wspd_lut - wspd_co) / p.dwspd_fg).powi(2);
            let cost = j_sig + j_wind;
            if cost.is_nan() {
                continue;
            }
            if best.map_or(true, |(b, _)| cost < b) {
                best = Some((cost, i_wspd));
            }
        }

        best.map(|(_, i_wspd)| cr.wspd[i_wspd])
    }

    /// Co-pol only inversion over a scene
    pub fn invert_copol<D: Dimension>(
        &self,
        inc: ArrayView<f64, D>,
        sigma0_co: ArrayView<f64, D>,
        ancillary_wind: ArrayView<AncillaryWind, D>,
    ) -> WindResult<Array<f64, D>> {
        check_shape(inc.shape(), sigma0_co.shape(), "sigma0_co")?;
        check_shape(inc.shape(), ancillary_wind.shape(), "ancillary_wind")?;

        let start = Instant::now();
        log::info!("Inverting {} pixels (co-pol)", inc.len());

        let zip = Zip::from(inc).and(sigma0_co).and(ancillary_wind);
        let invert = |&i: &f64, &s: &f64, &w: &AncillaryWind| {
            self.invert_pixel(i, s, f64::NAN, f64::NAN, w)
        };

        #[cfg(feature = "parallel")]
        let wspd = zip.par_map_collect(invert);
        #[cfg(not(feature = "parallel"))]
        let wspd = zip.map_collect(invert);

        log::info!("Co-pol inversion completed in {:.3}s", start.elapsed().as_secs_f64());
        Ok(wspd)
    }

    /// Dual-pol inversion over a scene. Pixels with NaN cross-pol sigma0 fall
    /// back to the co-pol estimate.
    pub fn invert_dualpol<D: Dimension>(
        &self,
        inc: ArrayView<f64, D>,
        sigma0_co: ArrayView<f64, D>,
        sigma0_cr: ArrayView<f64, D>,
        nesz_cr: ArrayView<f64, D>,
        ancillary_wind: ArrayView<AncillaryWind, D>,
    ) -> WindResult<Array<f64, D>> {
        check_shape(inc.shape(), sigma0_co.shape(), "sigma0_co")?;
        check_shape(inc.shape(), sigma0_cr.shape(), "sigma0_cr")?;
        check_shape(inc.shape(), nesz_cr.shape(), "nesz_cr")?;
        check_shape(inc.shape(), ancillary_wind.shape(), "ancillary_wind")?;

        if !self.has_crosspol() && sigma0_cr.iter().any(|v| !v.is_nan()) {
            return Err(WindError::MissingCrossPolModel);
        }

        let start = Instant::now();
        log::info!(
            "Inverting {} pixels (dual-pol, cross-pol LUT: {})",
            inc.len(),
            self.has_crosspol()
        );

        let zip = Zip::from(inc)
            .and(sigma0_co)
            .and(sigma0_cr)
            .and(nesz_cr)
            .and(ancillary_wind);
        let invert = |&i: &f64, &s_co: &f64, &s_cr: &f64, &n: &f64, &w: &AncillaryWind| {
            self.invert_pixel(i, s_co, s_cr, n, w)
        };

        #[cfg(feature = "parallel")]
        let wspd = zip.par_map_collect(invert);
        #[cfg(not(feature = "parallel"))]
        let wspd = zip.map_collect(invert);

        log::info!("Dual-pol inversion completed in {:.3}s", start.elapsed().as_secs_f64());
        Ok(wspd)
    }

    /// Dual-pol inversion of a 2D scene processed in blocks of `chunk_rows` lines
    pub fn invert_dualpol_chunked(
        &self,
        inc: ArrayView2<f64>,
        sigma0_co: ArrayView2<f64>,
        sigma0_cr: ArrayView2<f64>,
        nesz_cr: ArrayView2<f64>,
        ancillary_wind: ArrayView2<AncillaryWind>,
        chunk_rows: usize,
    ) -> WindResult<WindSpeedField> {
        check_shape(inc.shape(), sigma0_co.shape(), "sigma0_co")?;
        check_shape(inc.shape(), sigma0_cr.shape(), "sigma0_cr")?;
        check_shape(inc.shape(), nesz_cr.shape(), "nesz_cr")?;
        check_shape(inc.shape(), ancillary_wind.shape(), "ancillary_wind")?;

        let chunk_rows = chunk_rows.max(1);
        let rows = inc.nrows();
        let mut wspd = Array2::from_elem(inc.dim(), f64::NAN);

        log::debug!("Chunked inversion: {} rows in blocks of {}", rows, chunk_rows);

        for start in (0..rows).step_by(chunk_rows) {
            let end = (start + chunk_rows).min(rows);
            let block = self.invert_dualpol(
                inc.slice(s![start..end, ..]),
                sigma0_co.slice(s![start..end, ..]),
                sigma0_cr.slice(s![start..end, ..]),
                nesz_cr.slice(s![start..end, ..]),
                ancillary_wind.slice(s![start..end, ..]),
            )?;
            wspd.slice_mut(s![start..end, ..]).assign(&block);
        }

        Ok(wspd)
    }
}

fn check_shape(expected: &[usize], actual: &[usize], label: &str) -> WindResult<()> {
    if expected != actual {
        return Err(WindError::ShapeMismatch(format!(
            "{} has shape {:?}, expected {:?}",
            label, actual, expected
        )));
    }
    Ok(())
}

/// Observations handed to [`invert_from_model`]. Backscatter is linear.
#[derive(Debug, Clone)]
pub enum InversionInput<'a, D: Dimension> {
    CoPol {
        inc: ArrayView<'a, f64, D>,
        sigma0_co: ArrayView<'a, f64, D>,
        ancillary_wind: ArrayView<'a, AncillaryWind, D>,
    },
    DualPol {
        inc: ArrayView<'a, f64, D>,
        sigma0_co: ArrayView<'a, f64, D>,
        sigma0_cr: ArrayView<'a, f64, D>,
        nesz_cr: ArrayView<'a, f64, D>,
        ancillary_wind: ArrayView<'a, AncillaryWind, D>,
    },
}

/// Resolve models, build their LUTs and invert the whole scene.
///
/// Model and LUT errors abort before any pixel is processed. The cross-pol
/// LUT is only built when some cross-pol sigma0 is valid.
pub fn invert_from_model<D: Dimension>(
    registry: &ModelRegistry,
    input: InversionInput<'_, D>,
    models: &ModelPair,
    params: InversionParams,
) -> WindResult<Array<f64, D>> {
    match input {
        InversionInput::CoPol {
            inc,
            sigma0_co,
            ancillary_wind,
        } => {
            let inverter = WindInverter::from_registry(registry, models, false, params)?;
            inverter.invert_copol(inc, sigma0_co, ancillary_wind)
        }
        InversionInput::DualPol {
            inc,
            sigma0_co,
            sigma0_cr,
            nesz_cr,
            ancillary_wind,
        } => {
            let with_crosspol = sigma0_cr.iter().any(|v| !v.is_nan());
            if !with_crosspol {
                log::warn!("No valid cross-pol sigma0, falling back to co-pol inversion");
            }
            let inverter = WindInverter::from_registry(registry, models, with_crosspol, params)?;
            inverter.invert_dualpol(inc, sigma0_co, sigma0_cr, nesz_cr, ancillary_wind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array1, Array3};
    use num_complex::Complex64;

    /// Co-pol LUT depending on wind speed only: -30 + 2 * wspd dB
    fn flat_copol_lut() -> Lut {
        let inc = array![29.0, 30.0, 31.0];
        let wspd = Array1::range(0.0, 21.0, 1.0);
        let phi = Array1::range(0.0, 181.0, 5.0);
        let values = Array3::from_shape_fn((inc.len(), wspd.len(), phi.len()), |(_, j, _)| {
            -30.0 + 2.0 * wspd[j]
        });
        Lut::new("test_copol", Units::Db, inc, wspd, Some(phi), values).unwrap()
    }

    /// Cross-pol LUT: -40 + wspd dB
    fn crosspol_lut() -> Lut {
        let inc = array![29.0, 30.0, 31.0];
        let wspd = Array1::range(0.0, 21.0, 1.0);
        let values =
            Array3::from_shape_fn((inc.len(), wspd.len(), 1), |(_, j, _)| -40.0 + wspd[j]);
        Lut::new("test_crosspol", Units::Db, inc, wspd, None, values).unwrap()
    }

    fn inverter() -> WindInverter {
        WindInverter::new(flat_copol_lut(), Some(crosspol_lut()), InversionParams::default())
            .unwrap()
    }

    fn copol_sigma0(wspd: f64) -> f64 {
        db_to_linear(-30.0 + 2.0 * wspd)
    }

    #[test]
    fn test_default_params() {
        let p = InversionParams::default();
        assert_eq!(p.dsig_co, 0.1);
        assert_eq!((p.d_antenna, p.d_azi, p.dwspd_fg), (2.0, 2.0, 2.0));
        assert_eq!(p.dual_pol_min_wspd, 5.0);
        assert_eq!((p.nesz_scale, p.nesz_exponent), (1.25, 4.0));
        assert_eq!(p.phi_symmetry_tolerance, 2.0);

        let inv = inverter();
        assert_eq!(inv.params().dsig_co, 0.1);
        assert!(inv.has_crosspol());
        let copol_only = WindInverter::new(flat_copol_lut(), None, p).unwrap();
        assert!(!copol_only.has_crosspol());
    }

    #[test]
    fn test_nan_guard() {
        let inv = inverter();
        let wind = Complex64::new(5.0, 0.0);
        assert!(inv.invert_pixel(f64::NAN, 0.1, 0.001, 1e-5, wind).is_nan());
        assert!(inv.invert_pixel(30.0, f64::NAN, 0.001, 1e-5, wind).is_nan());
    }

    #[test]
    fn test_copol_estimate() {
        let inv = inverter();
        let wspd = inv.invert_pixel(
            30.2,
            copol_sigma0(7.0),
            f64::NAN,
            f64::NAN,
            Complex64::new(7.0, 0.0),
        );
        assert_relative_eq!(wspd, 7.0);
    }

    #[test]
    fn test_nan_ancillary_wind_gives_nan() {
        let inv = inverter();
        let wspd = inv.invert_pixel(
            30.0,
            copol_sigma0(7.0),
            f64::NAN,
            f64::NAN,
            Complex64::new(f64::NAN, f64::NAN),
        );
        assert!(wspd.is_nan());
    }

    #[test]
    fn test_dualpol_threshold() {
        let inv = inverter();
        let sigma0_cr = db_to_linear(-32.0); // 8 m/s on the cross-pol LUT
        let nesz_cr = sigma0_cr / 100.0;

        // co-pol 4 m/s: below threshold, co-pol kept
        let wind = Complex64::new(4.0, 0.0);
        let wspd = inv.invert_pixel(30.0, copol_sigma0(4.0), sigma0_cr, nesz_cr, wind);
        assert_relative_eq!(wspd, 4.0);

        // co-pol 6 m/s: both above threshold, cross-pol wins
        let wind = Complex64::new(6.0, 0.0);
        let wspd = inv.invert_pixel(30.0, copol_sigma0(6.0), sigma0_cr, nesz_cr, wind);
        assert_relative_eq!(wspd, 8.0);
    }

    #[test]
    fn test_noisy_crosspol_pulled_to_first_guess() {
        let inv = inverter();
        let sigma0_cr = db_to_linear(-32.0);
        // signal below the noise floor: cross-pol cost is flat, first guess dominates
        let nesz_cr = 4.0 * sigma0_cr;
        let wind = Complex64::new(6.0, 0.0);
        let wspd = inv.invert_pixel(30.0, copol_sigma0(6.0), sigma0_cr, nesz_cr, wind);
        assert_relative_eq!(wspd, 6.0);
    }

    #[test]
    fn test_nan_nesz_keeps_copol() {
        let inv = inverter();
        let wspd = inv.invert_pixel(
            30.0,
            copol_sigma0(6.0),
            db_to_linear(-32.0),
            f64::NAN,
            Complex64::new(6.0, 0.0),
        );
        assert_relative_eq!(wspd, 6.0);
    }

    #[test]
    fn test_wrong_lut_dimensions() {
        let err = WindInverter::new(crosspol_lut(), None, InversionParams::default());
        assert!(matches!(err, Err(WindError::WrongPolarization { .. })));

        let err = WindInverter::new(
            flat_copol_lut(),
            Some(flat_copol_lut()),
            InversionParams::default(),
        );
        assert!(matches!(err, Err(WindError::WrongPolarization { .. })));
    }

    #[test]
    fn test_shape_mismatch() {
        let inv = inverter();
        let inc = Array2::from_elem((2, 2), 30.0);
        let sigma0 = Array2::from_elem((2, 3), copol_sigma0(5.0));
        let wind = Array2::from_elem((2, 2), Complex64::new(5.0, 0.0));
        let err = inv.invert_copol(inc.view(), sigma0.view(), wind.view());
        assert!(matches!(err, Err(WindError::ShapeMismatch(_))));
    }

    #[test]
    fn test_crosspol_without_model() {
        let inv = WindInverter::new(flat_copol_lut(), None, InversionParams::default()).unwrap();
        let inc = Array2::from_elem((2, 2), 30.0);
        let sigma0 = Array2::from_elem((2, 2), copol_sigma0(5.0));
        let cr = Array2::from_elem((2, 2), 1e-3);
        let wind = Array2::from_elem((2, 2), Complex64::new(5.0, 0.0));
        let err = inv.invert_dualpol(inc.view(), sigma0.view(), cr.view(), cr.view(), wind.view());
        assert!(matches!(err, Err(WindError::MissingCrossPolModel)));

        // all-NaN cross-pol is a plain co-pol inversion
        let cr = Array2::from_elem((2, 2), f64::NAN);
        let wspd = inv
            .invert_dualpol(inc.view(), sigma0.view(), cr.view(), cr.view(), wind.view())
            .unwrap();
        assert!(wspd.iter().all(|&w| (w - 5.0).abs() < 1e-12));
    }
}
