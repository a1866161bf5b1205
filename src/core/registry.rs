//! Model registry
//!
//! Models are registered once through [`ModelRegistryBuilder`]; the built
//! [`ModelRegistry`] is immutable and can be shared across threads.

use crate::core::gmf::{builtin_gmfs, GmfDescriptor};
use crate::core::lut_builder::LutRequest;
use crate::core::model::{Model, TabulatedModel};
use crate::io::LutStore;
use crate::types::{Lut, Polarization, WindError, WindResult};
use std::collections::BTreeMap;

/// Collects models before freezing them into a [`ModelRegistry`]
#[derive(Debug, Default)]
pub struct ModelRegistryBuilder {
    models: BTreeMap<String, Model>,
}

impl ModelRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model; names must be unique
    pub fn register(&mut self, model: Model) -> WindResult<()> {
        let name = model.name().to_string();
        if self.models.contains_key(&name) {
            return Err(WindError::DuplicateModel(name));
        }
        log::debug!("Registering model {}", model);
        self.models.insert(name, model);
        Ok(())
    }

    pub fn register_gmf(&mut self, descriptor: GmfDescriptor) -> WindResult<()> {
        self.register(Model::Gmf(descriptor))
    }

    /// Load a table from `store` and register it as a tabulated model
    pub fn register_tabulated(
        &mut self,
        name: &str,
        pol: Polarization,
        store: &dyn LutStore,
    ) -> WindResult<()> {
        if self.models.contains_key(name) {
            return Err(WindError::DuplicateModel(name.to_string()));
        }
        let lut = store.load(name)?;
        if pol.is_copol() != (lut.ndim() == 3) {
            return Err(WindError::MalformedLut {
                name: name.to_string(),
                reason: format!("{} table with {} dimensions", pol, lut.ndim()),
            });
        }
        self.register(Model::Tabulated(TabulatedModel::new(name, pol, lut)))
    }

    /// Register every GMF shipped with the crate
    pub fn with_builtin_gmfs(mut self) -> WindResult<Self> {
        for descriptor in builtin_gmfs() {
            self.register_gmf(descriptor)?;
        }
        Ok(self)
    }

    pub fn build(self) -> ModelRegistry {
        log::info!("Model registry ready with {} models", self.models.len());
        ModelRegistry {
            models: self.models,
        }
    }
}

/// Immutable name -> model mapping
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, Model>,
}

impl ModelRegistry {
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::new()
    }

    /// Registry holding only the built-in GMFs
    pub fn with_builtin_gmfs() -> Self {
        let mut builder = ModelRegistryBuilder::new();
        for descriptor in builtin_gmfs() {
            builder
                .models
                .insert(descriptor.name.clone(), Model::Gmf(descriptor));
        }
        builder.build()
    }

    /// Resolve a model by name
    pub fn resolve(&self, name: &str) -> WindResult<&Model> {
        self.models
            .get(name)
            .ok_or_else(|| WindError::UnknownModel(name.to_string()))
    }

    /// Registered models, optionally filtered by polarization
    pub fn available_models(&self, pol: Option<Polarization>) -> Vec<&Model> {
        self.models
            .values()
            .filter(|model| pol.map_or(true, |p| model.pol() == p))
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Resolve `name` and produce its LUT
    pub fn get_lut(&self, name: &str, request: &LutRequest) -> WindResult<Lut> {
        self.resolve(name)?.to_lut_with(request)
    }
}
