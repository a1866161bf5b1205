//! Tabulated LUT providers
//!
//! A store hands out raw tables keyed by model name. Tables are validated
//! for units, dimension names, shapes and axis ordering before they become a
//! [`Lut`].

use crate::types::{Lut, Units, WindError, WindResult};
use ndarray::{Array1, Array3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw tabulated LUT as delivered by external storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabulatedLutData {
    /// "linear" or "dB"
    pub units: String,
    /// ("incidence", "wspd") or ("incidence", "wspd", "phi")
    pub dims: Vec<String>,
    pub incidence: Vec<f64>,
    pub wspd: Vec<f64>,
    pub phi: Option<Vec<f64>>,
    /// Row-major values following `dims`
    pub values: Vec<f64>,
}

impl TabulatedLutData {
    /// Validate and convert into a [`Lut`]
    pub fn into_lut(self, name: &str) -> WindResult<Lut> {
        let malformed = |reason: String| WindError::MalformedLut {
            name: name.to_string(),
            reason,
        };

        let units: Units = self
            .units
            .parse()
            .map_err(|_| malformed(format!("unknown units '{}'", self.units)))?;

        let dims: Vec<&str> = self.dims.iter().map(String::as_str).collect();
        match (dims.as_slice(), &self.phi) {
            (["incidence", "wspd"], None) | (["incidence", "wspd", "phi"], Some(_)) => {}
            _ => {
                return Err(malformed(format!(
                    "bad dims {:?} (phi axis present: {})",
                    self.dims,
                    self.phi.is_some()
                )))
            }
        }

        check_ascending(&self.incidence, "incidence").map_err(malformed)?;
        check_ascending(&self.wspd, "wspd").map_err(malformed)?;
        if let Some(phi) = &self.phi {
            check_ascending(phi, "phi").map_err(malformed)?;
        }

        let shape = (
            self.incidence.len(),
            self.wspd.len(),
            self.phi.as_ref().map_or(1, Vec::len),
        );
        let values = Array3::from_shape_vec(shape, self.values).map_err(|e| {
            malformed(format!("values do not match axes {:?}: {}", shape, e))
        })?;

        if values.iter().any(|v| v.is_nan()) {
            return Err(WindError::NanInLut(name.to_string()));
        }

        Lut::new(
            name,
            units,
            Array1::from(self.incidence),
            Array1::from(self.wspd),
            self.phi.map(Array1::from),
            values,
        )
    }
}

fn check_ascending(axis: &[f64], label: &str) -> Result<(), String> {
    if axis.is_empty() {
        return Err(format!("empty {} axis", label));
    }
    if axis.windows(2).any(|w| !(w[1] > w[0])) {
        return Err(format!("{} axis is not strictly ascending", label));
    }
    Ok(())
}

/// Read-only provider of tabulated LUTs
pub trait LutStore: Send + Sync {
    /// Raw table for `name`; `LutNotFound` when the store has no such table
    fn fetch(&self, name: &str) -> WindResult<TabulatedLutData>;

    /// Names of available tables
    fn names(&self) -> Vec<String>;

    /// Fetch and validate
    fn load(&self, name: &str) -> WindResult<Lut> {
        log::debug!("Loading tabulated LUT '{}'", name);
        self.fetch(name)?.into_lut(name)
    }
}

/// LUT store backed by a map held in memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryLutStore {
    tables: HashMap<String, TabulatedLutData>,
}

impl InMemoryLutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, table: TabulatedLutData) {
        self.tables.insert(name.to_string(), table);
    }

    pub fn with_table(mut self, name: &str, table: TabulatedLutData) -> Self {
        self.insert(name, table);
        self
    }
}

impl LutStore for InMemoryLutStore {
    fn fetch(&self, name: &str) -> WindResult<TabulatedLutData> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| WindError::LutNotFound(name.to_string()))
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }
}
