//! sarwind: ocean surface wind speed retrieval from SAR backscatter
//!
//! This library builds backscatter lookup tables from geophysical model
//! functions (GMFs) or tabulated models, and inverts calibrated co-pol and
//! cross-pol sigma0 into wind speed with a per-pixel cost function.

pub mod types;
pub mod io;
pub mod core;

#[cfg(feature = "python")]
mod python;

// Re-export main types and functions for easier access
pub use types::{
    AncillaryWind, AxisRange, Lut, Polarization, Units, WindError, WindResult, WindSpeedField,
};

pub use crate::core::{
    invert_from_model, nesz_flattening, wind_to_img, InversionInput, InversionParams, LutRequest,
    Model, ModelPair, ModelRegistry, WindConvention, WindInverter,
};

pub use io::{InMemoryLutStore, LutStore, TabulatedLutData};
