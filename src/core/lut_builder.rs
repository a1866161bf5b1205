//! LUT construction from analytical GMFs
//!
//! The GMF is sampled on a padded grid, optionally upsampled by multilinear
//! interpolation, then cropped to the exact requested range.

use crate::core::dispatch::evaluate_outer;
use crate::core::gmf::GmfDescriptor;
use crate::core::interp::{interp3, AxisWeights};
use crate::types::{AxisRange, Lut, Units, WindError, WindResult};
use ndarray::{Array1, Array3, Axis};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Grid padding, in steps, on each side of the requested range
pub const PAD_STEPS: i64 = 2;

/// Tolerance used when comparing grid coordinates to range bounds
const GRID_TOLERANCE: f64 = 1e-9;

/// Grid steps of a LUT (degrees, m/s, degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LutSteps {
    pub inc: f64,
    pub wspd: f64,
    pub phi: f64,
}

impl LutSteps {
    /// Coarse grid sampled from the GMF before upsampling
    pub const LOW_RES: LutSteps = LutSteps {
        inc: 0.2,
        wspd: 0.5,
        phi: 1.0,
    };

    /// Final LUT resolution
    pub const HIGH_RES: LutSteps = LutSteps {
        inc: 0.1,
        wspd: 0.1,
        phi: 1.0,
    };
}

/// LUT construction request. Missing ranges default to the model valid ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LutRequest {
    pub inc_range: Option<AxisRange>,
    pub wspd_range: Option<AxisRange>,
    pub phi_range: Option<AxisRange>,
    /// Sample at low resolution and upsample by interpolation
    pub allow_interp: bool,
    pub units: Units,
}

impl Default for LutRequest {
    fn default() -> Self {
        Self {
            inc_range: None,
            wspd_range: None,
            phi_range: None,
            allow_interp: true,
            units: Units::Db,
        }
    }
}

impl LutRequest {
    pub fn with_units(units: Units) -> Self {
        Self {
            units,
            ..Self::default()
        }
    }
}

/// Uniform axis `range.min + k * step`, extended by `pad` steps on each side.
///
/// Points below `floor` are dropped (wind speed cannot be negative).
pub fn uniform_axis(range: AxisRange, step: f64, pad: i64, floor: Option<f64>) -> Array1<f64> {
    let n_steps = (range.width() / step + GRID_TOLERANCE).floor() as i64;
    (-pad..=n_steps + pad)
        .map(|k| range.min + k as f64 * step)
        .filter(|&v| floor.map_or(true, |f| v >= f - GRID_TOLERANCE))
        .collect()
}

/// Indices of axis values inside `range` (inclusive)
fn crop_indices(axis: &Array1<f64>, range: AxisRange, step: f64) -> Vec<usize> {
    let tolerance = GRID_TOLERANCE * step.max(1.0);
    axis.iter()
        .enumerate()
        .filter(|&(_, &v)| range.contains(v, tolerance))
        .map(|(i, _)| i)
        .collect()
}

/// Build a LUT for an analytical GMF
pub fn build_gmf_lut(descriptor: &GmfDescriptor, request: &LutRequest) -> WindResult<Lut> {
    let kernel = descriptor.kernel()?;
    let name = descriptor.name.as_str();

    let inc_range = request.inc_range.unwrap_or(descriptor.inc_range);
    let wspd_range = request.wspd_range.unwrap_or(descriptor.wspd_range);
    // Cross-pol models have no direction dependency
    let phi_range = descriptor
        .phi_range
        .map(|default| request.phi_range.unwrap_or(default));

    inc_range.validate("incidence")?;
    wspd_range.validate("wspd")?;
    if let Some(phi_range) = phi_range {
        phi_range.validate("phi")?;
    }
    if wspd_range.min < 0.0 {
        return Err(WindError::InvalidRange {
            axis: "wspd".to_string(),
            min: wspd_range.min,
            max: wspd_range.max,
        });
    }

    if !within(descriptor.inc_range, inc_range) || !within(descriptor.wspd_range, wspd_range) {
        log::warn!(
            "Requested range for '{}' exceeds model validity (inc {:?}, wspd {:?})",
            name,
            descriptor.inc_range,
            descriptor.wspd_range
        );
    }

    let start = Instant::now();
    log::info!(
        "Building LUT '{}': inc {:?}, wspd {:?}, phi {:?}, interp={}",
        name,
        inc_range,
        wspd_range,
        phi_range,
        request.allow_interp
    );

    let steps = if request.allow_interp {
        LutSteps::LOW_RES
    } else {
        LutSteps::HIGH_RES
    };

    let inc = uniform_axis(inc_range, steps.inc, PAD_STEPS, None);
    let wspd = uniform_axis(wspd_range, steps.wspd, PAD_STEPS, Some(0.0));
    let phi = phi_range.map(|r| uniform_axis(r, steps.phi, PAD_STEPS, None));

    let raw = evaluate_outer(kernel, inc.view(), wspd.view(), phi.as_ref().map(|p| p.view()));

    let (inc, wspd, phi, values) = if request.allow_interp {
        upsample(name, raw, &inc, &wspd, phi.as_ref(), inc_range, wspd_range, phi_range)?
    } else {
        (inc, wspd, phi, raw)
    };

    let lut = crop(
        name,
        values,
        inc,
        wspd,
        phi,
        inc_range,
        wspd_range,
        phi_range,
        LutSteps::HIGH_RES,
    )?;

    let nan_count = lut.count_nan();
    if nan_count > 0 {
        log::debug!("LUT '{}' has {} NaN values", name, nan_count);
        return Err(WindError::NanInLut(name.to_string()));
    }

    log::info!(
        "LUT '{}' built: {}x{}x{} in {:.3}s",
        name,
        lut.incidence.len(),
        lut.wspd.len(),
        lut.values.dim().2,
        start.elapsed().as_secs_f64()
    );

    Ok(lut.into_units(request.units))
}

fn within(valid: AxisRange, requested: AxisRange) -> bool {
    requested.min >= valid.min - GRID_TOLERANCE && requested.max <= valid.max + GRID_TOLERANCE
}

type LutParts = (Array1<f64>, Array1<f64>, Option<Array1<f64>>, Array3<f64>);

/// Interpolate the padded low resolution grid onto the high resolution grid
#[allow(clippy::too_many_arguments)]
fn upsample(
    name: &str,
    raw: Array3<f64>,
    inc: &Array1<f64>,
    wspd: &Array1<f64>,
    phi: Option<&Array1<f64>>,
    inc_range: AxisRange,
    wspd_range: AxisRange,
    phi_range: Option<AxisRange>,
) -> WindResult<LutParts> {
    let hr = LutSteps::HIGH_RES;
    let inc_hr = uniform_axis(inc_range, hr.inc, 0, None);
    let wspd_hr = uniform_axis(wspd_range, hr.wspd, 0, None);
    let phi_hr = phi_range.map(|r| uniform_axis(r, hr.phi, 0, None));

    let w_inc = AxisWeights::new(inc.view(), inc_hr.view(), name, "incidence")?;
    let w_wspd = AxisWeights::new(wspd.view(), wspd_hr.view(), name, "wspd")?;
    let w_phi = match (phi, &phi_hr) {
        (Some(phi), Some(phi_hr)) => AxisWeights::new(phi.view(), phi_hr.view(), name, "phi")?,
        _ => AxisWeights::singleton(),
    };

    log::debug!(
        "Upsampling LUT '{}' from {:?} to {}x{}x{}",
        name,
        raw.dim(),
        w_inc.len(),
        w_wspd.len(),
        w_phi.len()
    );

    let values = interp3(raw.view(), &w_inc, &w_wspd, &w_phi);
    Ok((inc_hr, wspd_hr, phi_hr, values))
}

/// Drop grid points outside the requested ranges
#[allow(clippy::too_many_arguments)]
fn crop(
    name: &str,
    values: Array3<f64>,
    inc: Array1<f64>,
    wspd: Array1<f64>,
    phi: Option<Array1<f64>>,
    inc_range: AxisRange,
    wspd_range: AxisRange,
    phi_range: Option<AxisRange>,
    steps: LutSteps,
) -> WindResult<Lut> {
    let i_inc = crop_indices(&inc, inc_range, steps.inc);
    let i_wspd = crop_indices(&wspd, wspd_range, steps.wspd);

    let mut cropped = values
        .select(Axis(0), &i_inc)
        .select(Axis(1), &i_wspd);
    let inc = inc.select(Axis(0), &i_inc);
    let wspd = wspd.select(Axis(0), &i_wspd);

    let phi = match (phi, phi_range) {
        (Some(phi), Some(range)) => {
            let i_phi = crop_indices(&phi, range, steps.phi);
            cropped = cropped.select(Axis(2), &i_phi);
            Some(phi.select(Axis(0), &i_phi))
        }
        _ => None,
    };

    if cropped.is_empty() {
        return Err(WindError::MalformedLut {
            name: name.to_string(),
            reason: "requested range contains no grid point".to_string(),
        });
    }

    Lut::new(name, Units::Linear, inc, wspd, phi, cropped)
}
