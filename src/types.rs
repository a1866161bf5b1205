use ndarray::{Array1, Array2, Array3, ArrayView2, Axis};
use num_complex::Complex64;
use num_traits::Float;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 2D wind speed field (atrack x xtrack), m/s
pub type WindSpeedField = Array2<f64>;

/// Ancillary wind as a complex number (real = antenna component, imag = azimuth component)
pub type AncillaryWind = Complex64;

/// Floor applied before taking a logarithm, avoids -inf on zero backscatter
pub const DB_EPSILON: f64 = 1e-15;

/// Units of a backscatter array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Units {
    Linear,
    #[serde(rename = "dB")]
    Db,
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Units::Linear => write!(f, "linear"),
            Units::Db => write!(f, "dB"),
        }
    }
}

impl FromStr for Units {
    type Err = WindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Units::Linear),
            "dB" => Ok(Units::Db),
            other => Err(WindError::UnsupportedUnits(other.to_string())),
        }
    }
}

/// Linear power to dB. NaN stays NaN, zero is clamped to `DB_EPSILON`.
pub fn linear_to_db<F: Float>(linear: F) -> F {
    if linear.is_nan() {
        return linear;
    }
    let eps = F::from(DB_EPSILON).unwrap_or_else(F::min_positive_value);
    F::from(10.0).unwrap_or_else(F::one) * linear.max(eps).log10()
}

/// dB to linear power
pub fn db_to_linear<F: Float>(db: F) -> F {
    let ten = F::from(10.0).unwrap_or_else(F::one);
    ten.powf(db / ten)
}

/// Polarization channels handled by the GMFs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarization {
    VV,
    VH,
    HV,
    HH,
}

impl Polarization {
    /// Same transmit and receive polarization
    pub fn is_copol(&self) -> bool {
        matches!(self, Polarization::VV | Polarization::HH)
    }

    pub fn is_crosspol(&self) -> bool {
        !self.is_copol()
    }
}

impl std::fmt::Display for Polarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarization::VV => write!(f, "VV"),
            Polarization::VH => write!(f, "VH"),
            Polarization::HV => write!(f, "HV"),
            Polarization::HH => write!(f, "HH"),
        }
    }
}

impl FromStr for Polarization {
    type Err = WindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "VV" => Ok(Polarization::VV),
            "VH" => Ok(Polarization::VH),
            "HV" => Ok(Polarization::HV),
            "HH" => Ok(Polarization::HH),
            _ => Err(WindError::InvalidPolarization(s.to_string())),
        }
    }
}

/// Inclusive coordinate range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Inclusive containment with a tolerance on both bounds
    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        value >= self.min - tolerance && value <= self.max + tolerance
    }

    pub fn validate(&self, axis: &str) -> WindResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(WindError::InvalidRange {
                axis: axis.to_string(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Dense backscatter lookup table over (incidence, wspd[, phi]).
///
/// Values are always stored as a 3D array; cross-pol tables (no direction
/// dependency) keep a trailing singleton axis and report `ndim() == 2`.
#[derive(Debug, Clone)]
pub struct Lut {
    pub(crate) name: String,
    pub(crate) units: Units,
    pub(crate) incidence: Array1<f64>,
    pub(crate) wspd: Array1<f64>,
    pub(crate) phi: Option<Array1<f64>>,
    pub(crate) values: Array3<f64>,
}

impl Lut {
    /// Assemble a LUT, checking that the value shape agrees with the axes
    pub fn new(
        name: &str,
        units: Units,
        incidence: Array1<f64>,
        wspd: Array1<f64>,
        phi: Option<Array1<f64>>,
        values: Array3<f64>,
    ) -> WindResult<Self> {
        let expected = (
            incidence.len(),
            wspd.len(),
            phi.as_ref().map_or(1, |p| p.len()),
        );
        if values.dim() != expected {
            return Err(WindError::MalformedLut {
                name: name.to_string(),
                reason: format!(
                    "values shape {:?} does not match axes {:?}",
                    values.dim(),
                    expected
                ),
            });
        }

        Ok(Self {
            name: name.to_string(),
            units,
            incidence,
            wspd,
            phi,
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn incidence(&self) -> &Array1<f64> {
        &self.incidence
    }

    pub fn wspd(&self) -> &Array1<f64> {
        &self.wspd
    }

    pub fn phi(&self) -> Option<&Array1<f64>> {
        self.phi.as_ref()
    }

    /// Raw values, shape (incidence, wspd, phi or 1)
    pub fn values(&self) -> &Array3<f64> {
        &self.values
    }

    /// 3 for direction-dependent tables, 2 otherwise
    pub fn ndim(&self) -> usize {
        if self.phi.is_some() {
            3
        } else {
            2
        }
    }

    /// Values without the singleton direction axis of 2D tables
    pub fn values_2d(&self) -> Option<ArrayView2<'_, f64>> {
        match self.phi {
            Some(_) => None,
            None => Some(self.values.index_axis(Axis(2), 0)),
        }
    }

    pub fn count_nan(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Direction axis spans effectively 180 degrees (no upwind/downwind asymmetry)
    pub fn is_phi_symmetric(&self, tolerance: f64) -> bool {
        match &self.phi {
            Some(phi) if !phi.is_empty() => {
                let span = AxisRange::new(phi[0], phi[phi.len() - 1]).width();
                (180.0 - span).abs() < tolerance
            }
            _ => false,
        }
    }

    /// Convert to the requested units; no-op when already there
    pub fn into_units(mut self, units: Units) -> Self {
        if self.units == units {
            return self;
        }
        match units {
            Units::Db => self.values.mapv_inplace(linear_to_db),
            Units::Linear => self.values.mapv_inplace(db_to_linear),
        }
        self.units = units;
        self
    }
}

/// Index of the axis value closest to `value`; ties go to the lower index.
///
/// `axis` must be ascending. Returns None for an empty axis or NaN input.
pub fn nearest_index(axis: &[f64], value: f64) -> Option<usize> {
    if axis.is_empty() || value.is_nan() {
        return None;
    }
    let upper = axis.partition_point(|&x| x < value);
    if upper == 0 {
        return Some(0);
    }
    if upper == axis.len() {
        return Some(axis.len() - 1);
    }
    let lower = upper - 1;
    if (value - axis[lower]).abs() <= (axis[upper] - value).abs() {
        Some(lower)
    } else {
        Some(upper)
    }
}

/// Error types for wind retrieval
#[derive(Debug, thiserror::Error)]
pub enum WindError {
    #[error("Unknown model '{0}'")]
    UnknownModel(String),

    #[error("No analytical kernel available for model '{0}'")]
    KernelUnavailable(String),

    #[error("Model '{0}' is already registered")]
    DuplicateModel(String),

    #[error("Unknown units '{0}'. Allowed are 'linear' or 'dB'")]
    UnsupportedUnits(String),

    #[error("Invalid polarization: {0}")]
    InvalidPolarization(String),

    #[error("Unknown wind convention '{0}'. Allowed are 'antenna' or 'azimuth'")]
    UnknownConvention(String),

    #[error("Invalid {axis} range [{min}, {max}]")]
    InvalidRange { axis: String, min: f64, max: f64 },

    #[error("Cross-pol data provided but no cross-pol model given")]
    MissingCrossPolModel,

    #[error("Model '{name}' is not a {expected} model")]
    WrongPolarization { name: String, expected: String },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Found NaNs in LUT '{0}'")]
    NanInLut(String),

    #[error("LUT '{0}' not found")]
    LutNotFound(String),

    #[error("Malformed LUT '{name}': {reason}")]
    MalformedLut { name: String, reason: String },

    #[error("Interpolation error in LUT '{name}': {reason}")]
    Interpolation { name: String, reason: String },
}

/// Result type for wind retrieval operations
pub type WindResult<T> = Result<T, WindError>;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    #[test]
    fn test_db_round_trip() {
        for &x in &[1e-6, 0.0123, 0.5, 1.0, 42.0] {
            assert_relative_eq!(db_to_linear(linear_to_db(x)), x, max_relative = 1e-12);
        }
        assert_relative_eq!(linear_to_db(100.0f32), 20.0f32);
    }

    #[test]
    fn test_db_epsilon_and_nan() {
        assert_relative_eq!(linear_to_db(0.0), -150.0);
        assert!(linear_to_db(f64::NAN).is_nan());
    }

    #[test]
    fn test_units_parsing() {
        assert_eq!("dB".parse::<Units>().unwrap(), Units::Db);
        assert_eq!("linear".parse::<Units>().unwrap(), Units::Linear);
        assert!(matches!(
            "db".parse::<Units>(),
            Err(WindError::UnsupportedUnits(_))
        ));
    }

    #[test]
    fn test_polarization() {
        let vv: Polarization = "vv".parse().unwrap();
        assert!(vv.is_copol());
        assert!(Polarization::VH.is_crosspol());
        assert!("XX".parse::<Polarization>().is_err());
    }

    #[test]
    fn test_nearest_index() {
        let axis = [20.0, 20.5, 21.0, 21.5];
        assert_eq!(nearest_index(&axis, 10.0), Some(0));
        assert_eq!(nearest_index(&axis, 20.7), Some(1));
        assert_eq!(nearest_index(&axis, 20.75), Some(1));
        assert_eq!(nearest_index(&axis, 20.8), Some(2));
        assert_eq!(nearest_index(&axis, 99.0), Some(3));
        assert_eq!(nearest_index(&axis, f64::NAN), None);
        assert_eq!(nearest_index(&[], 1.0), None);
    }

    #[test]
    fn test_lut_units_idempotent() {
        let lut = Lut::new(
            "test",
            Units::Linear,
            Array1::from(vec![30.0]),
            Array1::from(vec![5.0, 10.0]),
            None,
            Array3::from_elem((1, 2, 1), 0.01),
        )
        .unwrap();

        let db = lut.into_units(Units::Db);
        assert_relative_eq!(db.values()[[0, 1, 0]], -20.0, epsilon = 1e-12);
        let db_again = db.clone().into_units(Units::Db);
        assert_eq!(db.values(), db_again.values());
        let lin = db_again.into_units(Units::Linear);
        assert_relative_eq!(lin.values()[[0, 0, 0]], 0.01, max_relative = 1e-12);
        assert_eq!(lin.ndim(), 2);
        assert!(lin.values_2d().is_some());
    }

    #[test]
    fn test_lut_shape_mismatch() {
        let result = Lut::new(
            "bad",
            Units::Db,
            Array1::from(vec![30.0, 31.0]),
            Array1::from(vec![5.0]),
            None,
            Array3::zeros((1, 1, 1)),
        );
        assert!(matches!(result, Err(WindError::MalformedLut { .. })));
    }

    #[test]
    fn test_phi_symmetry() {
        let make = |max: f64| {
            let phi = Array1::linspace(0.0, max, 4);
            Lut::new(
                "sym",
                Units::Db,
                Array1::from(vec![30.0]),
                Array1::from(vec![5.0]),
                Some(phi),
                Array3::zeros((1, 1, 4)),
            )
            .unwrap()
        };
        assert!(make(180.0).is_phi_symmetric(2.0));
        assert!(make(178.5).is_phi_symmetric(2.0));
        assert!(!make(178.0).is_phi_symmetric(2.0));
        assert!(!make(360.0).is_phi_symmetric(2.0));
        assert_eq!(AxisRange::new(10.0, 190.0).width(), 180.0);
    }
}
