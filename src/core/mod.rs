//! Core wind retrieval modules

pub mod gmf;
pub mod dispatch;
pub mod interp;
pub mod lut_builder;
pub mod model;
pub mod registry;
pub mod inversion;
pub mod ancillary;
pub mod flattening;

// Re-export main types
pub use gmf::{builtin_gmfs, cmod5, cmod5n, c2po, GmfDescriptor, GmfKernel};
pub use dispatch::{evaluate_broadcast, evaluate_grid, evaluate_outer, evaluate_scalar};
pub use lut_builder::{build_gmf_lut, LutRequest, LutSteps};
pub use model::{Model, TabulatedModel};
pub use registry::{ModelRegistry, ModelRegistryBuilder};
pub use inversion::{invert_from_model, InversionInput, InversionParams, ModelPair, WindInverter};
pub use ancillary::{wind_to_img, wind_to_img_array, WindConvention};
pub use flattening::nesz_flattening;
