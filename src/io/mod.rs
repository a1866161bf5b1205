//! Input sources for the wind retrieval

pub mod lut_store;

pub use lut_store::{InMemoryLutStore, LutStore, TabulatedLutData};
