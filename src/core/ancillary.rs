//! Projection of geographic ancillary wind into image geometry

use crate::types::{AncillaryWind, WindError, WindResult};
use ndarray::{Array, ArrayView, Dimension, Zip};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Component ordering of the complex ancillary wind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindConvention {
    /// real = antenna (cross track), imag = azimuth (along track)
    #[default]
    Antenna,
    /// real = azimuth (along track), imag = antenna (cross track)
    Azimuth,
}

impl FromStr for WindConvention {
    type Err = WindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "antenna" => Ok(WindConvention::Antenna),
            "azimuth" => Ok(WindConvention::Azimuth),
            other => Err(WindError::UnknownConvention(other.to_string())),
        }
    }
}

/// Rotate a geographic wind vector (u eastward, v northward, m/s) into the
/// image frame given the ground heading of the platform (degrees).
pub fn wind_to_img(
    u: f64,
    v: f64,
    ground_heading: f64,
    convention: WindConvention,
) -> AncillaryWind {
    let azimuth = Complex64::from_polar(
        u.hypot(v),
        u.atan2(v) - ground_heading.to_radians(),
    );
    match convention {
        WindConvention::Azimuth => azimuth,
        WindConvention::Antenna => Complex64::new(azimuth.im, azimuth.re),
    }
}

/// Element-wise [`wind_to_img`] over arrays of identical shape
pub fn wind_to_img_array<D: Dimension>(
    u: ArrayView<f64, D>,
    v: ArrayView<f64, D>,
    ground_heading: ArrayView<f64, D>,
    convention: WindConvention,
) -> WindResult<Array<AncillaryWind, D>> {
    if u.shape() != v.shape() || u.shape() != ground_heading.shape() {
        return Err(WindError::ShapeMismatch(format!(
            "u {:?}, v {:?}, ground_heading {:?}",
            u.shape(),
            v.shape(),
            ground_heading.shape()
        )));
    }
    Ok(Zip::from(u)
        .and(v)
        .and(ground_heading)
        .map_collect(|&u, &v, &h| wind_to_img(u, v, h, convention)))
}
